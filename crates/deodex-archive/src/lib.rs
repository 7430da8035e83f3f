//! Zip container helpers for APK and JAR files.
//!
//! - `probe.rs` - read-only inspection (`classes.dex` presence)
//! - `sanitize.rs` - entry name validation
//! - `append.rs` - appending stored entries to an open archive

pub use append::{NewEntry, append_entries};
pub use error::{Error, Result};
pub use probe::{CLASSES_DEX, entry_names, has_entry, is_deodexed};
pub use sanitize::validate_entry_name;

mod append;
mod error;
mod probe;
mod sanitize;
