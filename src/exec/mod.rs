//! External-process execution gateway

pub mod error;
pub mod gateway;

pub use error::ExecError;
pub use gateway::{CommandLineExecutor, ExecConfig, DEFAULT_ALLOWED};
