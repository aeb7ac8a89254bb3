pub mod client;
pub mod memory;
pub mod s3;

pub use client::{ObjectMeta, ObjectStore, StorageError, content_type_for, object_url};
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;
