//! Entry-point workflows shared by the binary

pub mod orchestration;

pub use orchestration::{
    check_release_needed, release_if_changed, ReleaseCheck, ReleaseOptions, ReleaseOutcome,
};
