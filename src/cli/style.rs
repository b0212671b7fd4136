//! Styled terminal output helpers.

use owo_colors::OwoColorize;

/// Extension methods producing styled strings for terminal output.
pub trait Stylize {
    /// De-emphasized detail text.
    fn muted(&self) -> String;
    /// Highlighted value, e.g. a branch name.
    fn accent(&self) -> String;
    /// Emphasized label.
    fn emphasis(&self) -> String;
    /// Positive outcome.
    fn success(&self) -> String;
    /// Recoverable problem.
    fn warn(&self) -> String;
    /// Failure.
    fn alert(&self) -> String;
}

impl<T: AsRef<str>> Stylize for T {
    fn muted(&self) -> String {
        self.as_ref().dimmed().to_string()
    }

    fn accent(&self) -> String {
        self.as_ref().cyan().to_string()
    }

    fn emphasis(&self) -> String {
        self.as_ref().bold().to_string()
    }

    fn success(&self) -> String {
        self.as_ref().green().to_string()
    }

    fn warn(&self) -> String {
        self.as_ref().yellow().to_string()
    }

    fn alert(&self) -> String {
        self.as_ref().red().to_string()
    }
}

/// Green check mark.
pub fn check() -> String {
    "✓".green().to_string()
}
