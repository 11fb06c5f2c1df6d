//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod profile;
pub mod utils;

// Re-export main command functions
pub use models::{ProfileArgs, ProfileOptions};
pub use profile::{build_profile, execute_profile, generate_text_summary, validate_args};
pub use utils::{display_schema, display_version, validate_profile_file};
