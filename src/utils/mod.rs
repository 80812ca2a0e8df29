//! Shared utilities: install paths, binary validation, shell profile edits.

pub mod binary;
pub mod profile;

pub use binary::{validate_binary, BinaryError, CoinPaths};
pub use profile::{add_bin_folder_to_profile, export_path_line};
