//! Shared types for the prefetch workspace: candidates, resource kinds,
//! link-target qualification and fetch errors.

pub mod error;
pub mod target;
pub mod types;

pub use error::PrefetchError;
pub use target::{TargetRejection, is_image_path, qualify_page_target, strip_fragment};
pub use types::{ImageTier, OutputFormat, PreloadCandidate, ResourceKind};
