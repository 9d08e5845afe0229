//! Stylesheet for terminal output.

use owo_colors::Style;

/// One style per kind of line kiln prints.
///
/// `Default` is fully plain; [`Styles::colored`] is used on a color terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Step markers in non-TTY progress output.
    pub step: Style,
    /// Secondary text: summary keys, rendered file contents.
    pub dim: Style,
    /// Step names in plans.
    pub bold: Style,
    pub header: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
            step: Style::new().cyan(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().underline(),
        }
    }
}
