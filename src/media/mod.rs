//! Photo storage and reference normalization
//!
//! This module provides:
//! - `normalize_photo` — canonicalizes stored photo references for API
//!   responses and outbound change events
//! - `MediaStore` / `DiskMediaStore` — upload/delete collaborator used by
//!   the CRUD layer

pub mod photo;
mod store;

pub use photo::{normalize_photo, UPLOAD_FOLDER};
pub use store::{DiskMediaStore, MediaError, MediaStore};
