//! CLI plumbing for the premerge binary.

pub mod context;
pub mod progress;
pub mod run;
pub mod style;

pub use progress::CliBuildLog;
