//! Image upload flow: validation, blob write and metadata record.
//!
//! The HTTP layer extracts an [`UploadInput`] from the multipart form and
//! hands it to [`store_upload`]. Every rejection is an [`UploadError`].

mod error;
mod store;
mod validation;

pub use error::UploadError;
pub use store::{UploadInput, store_upload};
pub use validation::{
    build_storage_name, normalize_content_type, public_url, validate_content_type, validate_size,
};
