//! Output styling for the shell and the one-shot commands.
//!
//! Status lines start with a coloured glyph so outcomes stay readable when
//! colours are off (piped output, `NO_COLOR`).

use console::Style;

/// Glyph and colour for each kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Error,
    Warning,
    Step,
}

impl Status {
    fn glyph(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Warning => "⚠",
            Self::Step => "→",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Success => Style::new().green(),
            Self::Error => Style::new().red(),
            Self::Warning => Style::new().yellow(),
            Self::Step => Style::new().cyan(),
        }
    }

    fn line(self, msg: &str) -> String {
        format!("{} {}", self.style().apply_to(self.glyph()), msg)
    }
}

pub fn success(msg: &str) -> String {
    Status::Success.line(msg)
}

pub fn error(msg: &str) -> String {
    Status::Error.line(msg)
}

pub fn warn(msg: &str) -> String {
    Status::Warning.line(msg)
}

/// One step of a running merge.
pub fn step(msg: &str) -> String {
    Status::Step.line(msg)
}

/// Section title, e.g. the help listing.
pub fn header(text: &str) -> String {
    Style::new().bold().apply_to(text).to_string()
}

/// Secondary detail such as conflicted file paths.
pub fn dim(text: &str) -> String {
    Style::new().dim().apply_to(text).to_string()
}

pub fn branch(name: &str) -> String {
    Style::new().magenta().bold().apply_to(name).to_string()
}
