//! In-memory implementations

mod blob;

pub use blob::MemoryBlobStore;
