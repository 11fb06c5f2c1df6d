//! Output writers for profile data.
//!
//! This module handles writing data to disk in various formats:
//! - JSON profiles
//! - Collapsed stack text

pub mod json;
pub mod profile;

// Re-export main functions
pub use json::{read_profile, write_profile, write_text};
pub use profile::GasProfile;
