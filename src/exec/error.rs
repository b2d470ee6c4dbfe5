//! Typed errors for the process execution gateway
//!
//! Callers must be able to tell "refused to even try" from "the tool ran
//! (or failed to start)": `Unauthorized` is raised before any process is
//! spawned and is final for that call.

use std::io;

/// Errors returned by [`CommandLineExecutor`](crate::exec::CommandLineExecutor).
///
/// A nonzero exit code is not an error here - it is the successful result of
/// running the tool, returned as the exit value.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Rejected by the allow-list / path-sandbox check; nothing was executed
    #[error("attempt to execute unsupported executable {command:?}")]
    Unauthorized { command: String },

    /// The OS could not start the process (missing binary, permission denied)
    #[error("failed to launch {command:?}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Copying stdout/stderr to a caller sink failed mid-stream
    #[error("i/o error while streaming process output: {0}")]
    Stream(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ExecError::Unauthorized {
            command: "rm".to_string(),
        };
        assert_eq!(err.to_string(), "attempt to execute unsupported executable \"rm\"");
    }
}
