//! Build log sink writing styled lines to the terminal.

use crate::cli::style::Stylize;
use anstream::println;
use premerge::progress::BuildLog;

/// [`BuildLog`] implementation for interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliBuildLog;

impl BuildLog for CliBuildLog {
    fn message(&self, text: &str) {
        println!("  {text}");
    }

    fn warning(&self, text: &str) {
        println!("  {}", text.warn());
    }

    fn error(&self, text: &str) {
        println!("  {}", text.alert());
    }
}
