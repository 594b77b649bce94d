//! Blob storage for uploaded files.
//!
//! [`FileStorage`] is the seam the upload flow writes through. [`LocalDisk`]
//! keeps blobs on the local filesystem via `OpenDAL`; [`MockFileStorage`] keeps
//! them in memory for tests.

mod local;
mod mock;
mod traits;
mod types;

pub use local::LocalDisk;
pub use mock::MockFileStorage;
pub use traits::{FileStorage, OpenDALDisk};
pub use types::{FileMetadata, FileStorageError, FileUploadRequest};
