//! Mock collaborators for testing

mod upstream;

pub use upstream::MockUpstream;
