pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod persistence;
pub mod probe;
pub mod registry;
pub mod ui;
pub mod version;

pub use error::{ReleaseError, Result};
