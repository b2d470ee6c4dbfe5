//! Filesystem implementations

mod blob;

pub use blob::FsBlobStore;
