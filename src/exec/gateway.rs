//! Sandboxed external-process execution gateway
//!
//! Format plugins (package-index generators and the like) need to run a small
//! set of external tools over repository content. This gateway is the trust
//! boundary in front of the OS process facility: only allow-listed executable
//! names run, and nothing under the application's managed working directory
//! may be used as a disguised executable.
//!
//! Argument content itself is not sanitized here - the invoking task is
//! trusted to construct well-formed arguments. Arguments are passed as an
//! argv vector, never re-parsed from a flat string.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWrite;
use tokio::process::Command;

use crate::exec::error::ExecError;

/// Default allow-list: package-metadata tools
pub const DEFAULT_ALLOWED: &str = "createrepo,mergerepo";

/// Immutable gateway configuration, fixed for the gateway's lifetime
#[derive(Debug, Clone)]
pub struct ExecConfig {
    allowed: BTreeSet<String>,
    work_dir: PathBuf,
}

impl ExecConfig {
    /// Parse a comma-separated executable list plus the managed
    /// working-directory root.
    ///
    /// Entries are trimmed; empty entries are dropped. The work dir is made
    /// absolute up front so path checks compare like with like.
    pub fn new(allowed: &str, work_dir: impl Into<PathBuf>) -> Self {
        let allowed = allowed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let work_dir = work_dir.into();
        let work_dir = std::path::absolute(&work_dir).unwrap_or(work_dir);

        Self { allowed, work_dir }
    }

    /// Default allow-list against the given managed working directory
    pub fn with_defaults(work_dir: impl Into<PathBuf>) -> Self {
        Self::new(DEFAULT_ALLOWED, work_dir)
    }

    /// The allow-listed executable base names
    pub fn allowed(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    /// The managed working-directory root
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

/// Executes allow-listed external tools, streaming their output.
///
/// Stateless between calls; concurrent calls are independent.
pub struct CommandLineExecutor {
    config: ExecConfig,
}

impl CommandLineExecutor {
    pub fn new(config: ExecConfig) -> Self {
        Self { config }
    }

    /// Run `command` with `args`, streaming stdout/stderr into the caller's
    /// sinks, and return the exit code.
    ///
    /// Both pipes are drained concurrently with the child, so a tool writing
    /// large volumes to both streams cannot deadlock. A nonzero exit code is
    /// returned as the value; `ExecError` means the command was rejected,
    /// could not start, or a sink failed mid-stream.
    pub async fn execute<O, E>(
        &self,
        command: &str,
        args: &[String],
        out: &mut O,
        err: &mut E,
    ) -> Result<i32, ExecError>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let accepted = self.clean_command(command)?;
        tracing::debug!("executing command: {} {:?}", accepted.display(), args);

        let mut child = Command::new(&accepted)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Launch {
                command: command.to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| ExecError::Launch {
            command: command.to_string(),
            source: std::io::Error::other("child stdout not captured"),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| ExecError::Launch {
            command: command.to_string(),
            source: std::io::Error::other("child stderr not captured"),
        })?;

        let pump_out = async { tokio::io::copy(&mut stdout, out).await.map_err(ExecError::Stream) };
        let pump_err = async { tokio::io::copy(&mut stderr, err).await.map_err(ExecError::Stream) };
        let wait = async {
            child.wait().await.map_err(|source| ExecError::Launch {
                command: command.to_string(),
                source,
            })
        };

        let (_, _, status) = tokio::try_join!(pump_out, pump_err, wait)?;

        // Terminated-by-signal has no code on unix; report it as -1
        let exit_value = status.code().unwrap_or(-1);
        tracing::debug!("execution finished with exit code: {}", exit_value);
        Ok(exit_value)
    }

    /// [`execute`](Self::execute) for call sites holding a flat parameter
    /// string; splits on whitespace (no shell quoting rules applied).
    pub async fn execute_line<O, E>(
        &self,
        command: &str,
        params: &str,
        out: &mut O,
        err: &mut E,
    ) -> Result<i32, ExecError>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let args: Vec<String> = params.split_whitespace().map(str::to_string).collect();
        self.execute(command, &args, out, err).await
    }

    /// Validate a requested command against the allow-list and path sandbox.
    ///
    /// In order:
    /// 1. A bare allow-listed name is accepted as-is - it will be resolved by
    ///    the OS's own executable search, not treated as a path.
    /// 2. Anything else is resolved to an absolute path:
    ///    a. inside the managed working directory: rejected, regardless of
    ///       the file's name - the directory check takes precedence;
    ///    b. base name not in the allow-list: rejected;
    ///    c. otherwise the absolute path is accepted.
    fn clean_command(&self, command: &str) -> Result<PathBuf, ExecError> {
        if self.config.allowed.contains(command) {
            return Ok(PathBuf::from(command));
        }

        let unauthorized = || ExecError::Unauthorized {
            command: command.to_string(),
        };

        let absolute = std::path::absolute(Path::new(command)).map_err(|_| unauthorized())?;

        if absolute.starts_with(&self.config.work_dir) {
            tracing::warn!(
                "attempt to execute command with illegal path {}",
                absolute.display()
            );
            return Err(unauthorized());
        }

        let name = absolute
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| unauthorized())?;
        if !self.config.allowed.contains(name) {
            tracing::warn!("attempt to execute illegal command {}", absolute.display());
            return Err(unauthorized());
        }

        Ok(absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(allowed: &str, work_dir: &str) -> CommandLineExecutor {
        CommandLineExecutor::new(ExecConfig::new(allowed, work_dir))
    }

    #[test]
    fn test_config_parsing() {
        let config = ExecConfig::new(" createrepo , mergerepo ,, ", "/var/depot/work");
        assert_eq!(config.allowed().len(), 2);
        assert!(config.allowed().contains("createrepo"));
        assert!(config.allowed().contains("mergerepo"));
    }

    #[test]
    fn test_bare_allowed_name_accepted() {
        let exec = executor("createrepo,mergerepo", "/var/depot/work");
        let accepted = exec.clean_command("createrepo").unwrap();
        assert_eq!(accepted, PathBuf::from("createrepo"));
    }

    #[test]
    fn test_bare_unlisted_name_rejected() {
        let exec = executor("createrepo,mergerepo", "/var/depot/work");
        let err = exec.clean_command("rm").unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized { .. }));
    }

    #[test]
    fn test_path_under_work_dir_rejected() {
        let exec = executor("createrepo,mergerepo", "/var/depot/work");
        // The basename IS allow-listed; the directory check takes precedence
        let err = exec
            .clean_command("/var/depot/work/uploads/createrepo")
            .unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized { .. }));
    }

    #[test]
    fn test_outside_path_with_allowed_name_accepted() {
        let exec = executor("createrepo,mergerepo", "/var/depot/work");
        let accepted = exec.clean_command("/usr/local/bin/createrepo").unwrap();
        assert_eq!(accepted, PathBuf::from("/usr/local/bin/createrepo"));
    }

    #[test]
    fn test_outside_path_with_unlisted_name_rejected() {
        let exec = executor("createrepo,mergerepo", "/var/depot/work");
        let err = exec.clean_command("/usr/bin/rm").unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_streams_output() {
        let exec = executor("echo", "/var/depot/work");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = exec
            .execute("echo", &["hello".to_string(), "world".to_string()], &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
        assert!(err.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_line_splits_params() {
        let exec = executor("echo", "/var/depot/work");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = exec
            .execute_line("echo", "a  b   c", &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "a b c\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_a_result_not_an_error() {
        let exec = executor("false", "/var/depot/work");
        let mut out = tokio::io::sink();
        let mut err = tokio::io::sink();

        let code = exec.execute("false", &[], &mut out, &mut err).await.unwrap();
        assert_ne!(code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_binary_is_launch_failure() {
        let exec = executor("no-such-tool-anywhere", "/var/depot/work");
        let mut out = tokio::io::sink();
        let mut err = tokio::io::sink();

        let result = exec
            .execute("no-such-tool-anywhere", &[], &mut out, &mut err)
            .await;
        assert!(matches!(result, Err(ExecError::Launch { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rejection_spawns_nothing() {
        let exec = executor("createrepo", "/var/depot/work");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = exec
            .execute("rm", &["-rf".to_string(), "/".to_string()], &mut out, &mut err)
            .await;
        assert!(matches!(result, Err(ExecError::Unauthorized { .. })));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_both_streams_drained_concurrently() {
        // A child writing well past the pipe buffer on both streams at once
        // deadlocks if the pipes are drained sequentially.
        let exec = executor("sh", "/var/depot/work");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let script = "i=0; while [ $i -lt 20000 ]; do echo oooooooooooooooo; echo eeeeeeeeeeeeeeee 1>&2; i=$((i+1)); done";
        let code = exec
            .execute("sh", &["-c".to_string(), script.to_string()], &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(out.len(), 20000 * 17);
        assert_eq!(err.len(), 20000 * 17);
    }
}
