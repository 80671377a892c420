//! Analysis of the last commit's manifest diff

pub mod diff_analyzer;

pub use diff_analyzer::{
    classify_diff, count_version_lines, was_version_bumped, DiffAnalyzer, DiffSignal,
};
