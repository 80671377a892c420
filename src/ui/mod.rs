//! User interface module - console presentation of pipeline results.

pub mod formatter;

pub use formatter::{
    describe_bump, display_boundary_warning, display_error, display_release_check,
    display_release_outcome, display_status, display_success, format_release_check,
    format_release_outcome,
};
