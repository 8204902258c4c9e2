//! Stylesheet for terminal output.

use owo_colors::Style;

/// Colors used by [`super::OutputContext`] and the plan renderer.
///
/// `Default` is the uncolored sheet; [`Styles::colorize`] switches it on.
#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Keys in key/value lines
    pub dim: Style,
    /// Region headers
    pub header: Style,
    pub step: Style,
    /// `+` marker for services a plan would build
    pub added: Style,
    /// `-` marker for services a plan would remove
    pub removed: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        *self = Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
            step: Style::new().cyan(),
            added: Style::new().bright_green(),
            removed: Style::new().bright_red(),
        };
    }
}
