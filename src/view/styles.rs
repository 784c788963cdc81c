//! Table styling configuration.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colors are disabled when the `NO_COLOR` environment variable is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Read `NO_COLOR` from the environment (any value disables colors).
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Explicitly enabled or disabled colors.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== TableStyles =====

/// Styles for the parts of the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyles {
    /// Column labels.
    pub header: Style,
    /// Label of the selected column.
    pub selected_header: Style,
    /// Body cells.
    pub cell: Style,
    /// "No data" placeholder.
    pub placeholder: Style,
    /// Status bar.
    pub status: Style,
    /// Status bar while a filter is being typed.
    pub filter_input: Style,
}

impl TableStyles {
    /// Create styles for the given color configuration.
    ///
    /// Without colors only modifiers (bold, reversed, italic) are used so the
    /// selection stays visible.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let reversed = Style::default().add_modifier(Modifier::REVERSED);
        if config.colors_enabled() {
            Self {
                header: bold.fg(Color::Cyan),
                selected_header: bold.fg(Color::Black).bg(Color::Cyan),
                cell: Style::default(),
                placeholder: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                status: Style::default().fg(Color::Gray),
                filter_input: Style::default().fg(Color::Yellow),
            }
        } else {
            Self {
                header: bold,
                selected_header: bold.patch(reversed),
                cell: Style::default(),
                placeholder: Style::default().add_modifier(Modifier::ITALIC),
                status: Style::default(),
                filter_input: bold,
            }
        }
    }
}

impl Default for TableStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }
}
