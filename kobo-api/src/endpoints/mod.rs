//! API endpoint modules organized by resource.
//!
//! Each module adds the operations for one resource to `ApiClient`.

pub mod assets;
pub mod attachments;
pub mod media;
pub mod submissions;
