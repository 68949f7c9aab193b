//! Utility modules.
pub mod file;
pub use file::{ensure_dir, file_name, has_extension, list_files, sibling_with_suffix};
