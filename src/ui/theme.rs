//! # Theme System
//!
//! Every color a screen draws comes from a [`Theme`] field, so the
//! palette can be changed from the config file (`"theme": "Nord"`).
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default)
//! - **Catppuccin Macchiato**
//! - **Catppuccin Frappe**
//! - **Catppuccin Latte** - the light flavour
//! - **Dracula**
//! - **Nord**
//! - **Tokyo Night**
//! - **Gruvbox Dark**

use crate::nav::ValueKind;
use ratatui::style::Color;

/// All colors used by the screens, grouped by semantic role.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Name matched against the `theme` config key.
    pub name: &'static str,

    pub bg: Color,
    /// Primary text.
    pub fg: Color,
    /// Hints, footers and the status line.
    pub fg_dim: Color,

    /// Borders and titles.
    pub accent: Color,
    /// Search prompt text.
    pub secondary: Color,

    /// Confirmations on the status line ("Exported ...").
    pub success: Color,
    /// Failures on the status line and the "(no match)" hint.
    pub error: Color,

    /// Background of the selected row.
    pub selection_bg: Color,

    // -- Search highlight --
    pub match_bg: Color,
    pub match_fg: Color,

    // -- JSON tree --
    pub json_key: Color,
    pub json_string: Color,
    pub json_number: Color,
    pub json_boolean: Color,
    pub json_null: Color,

    // -- Transcript authors --
    pub author_user: Color,
    pub author_assistant: Color,
}

impl Theme {
    /// Every built-in palette, default first.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Look up a palette by its config name, ignoring case and surrounding
    /// whitespace.
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }

    /// Color of a JSON value preview. Containers use the plain text color.
    pub fn kind_color(&self, kind: ValueKind) -> Color {
        match kind {
            ValueKind::String => self.json_string,
            ValueKind::Number => self.json_number,
            ValueKind::Boolean => self.json_boolean,
            ValueKind::Null => self.json_null,
            ValueKind::Object | ValueKind::Array => self.fg,
        }
    }

    /// Color of a transcript header for `author`.
    pub fn author_color(&self, author: &str) -> Color {
        match author {
            "user" => self.author_user,
            "assistant" => self.author_assistant,
            _ => self.secondary,
        }
    }
}

// Palettes. The first entry is the default.

static BUILT_IN_THEMES: [Theme; 8] = [
    // Catppuccin Mocha
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),                // base
        fg: Color::Rgb(205, 214, 244),             // text
        fg_dim: Color::Rgb(108, 112, 134),         // overlay0
        accent: Color::Rgb(137, 180, 250),         // blue
        secondary: Color::Rgb(249, 226, 175),      // yellow
        success: Color::Rgb(166, 227, 161),        // green
        error: Color::Rgb(243, 139, 168),          // red
        selection_bg: Color::Rgb(69, 71, 90),      // surface1
        match_bg: Color::Rgb(249, 226, 175),       // yellow
        match_fg: Color::Rgb(17, 17, 27),          // crust
        json_key: Color::Rgb(180, 190, 254),       // lavender
        json_string: Color::Rgb(166, 227, 161),    // green
        json_number: Color::Rgb(250, 179, 135),    // peach
        json_boolean: Color::Rgb(203, 166, 247),   // mauve
        json_null: Color::Rgb(108, 112, 134),      // overlay0
        author_user: Color::Rgb(137, 220, 235),    // sky
        author_assistant: Color::Rgb(245, 194, 231), // pink
    },
    // Catppuccin Macchiato
    Theme {
        name: "Catppuccin Macchiato",
        bg: Color::Rgb(36, 39, 58),
        fg: Color::Rgb(202, 211, 245),
        fg_dim: Color::Rgb(110, 115, 141),
        accent: Color::Rgb(138, 173, 244),
        secondary: Color::Rgb(238, 212, 159),
        success: Color::Rgb(166, 218, 149),
        error: Color::Rgb(237, 135, 150),
        selection_bg: Color::Rgb(73, 77, 100),
        match_bg: Color::Rgb(238, 212, 159),
        match_fg: Color::Rgb(24, 25, 38),
        json_key: Color::Rgb(183, 189, 248),
        json_string: Color::Rgb(166, 218, 149),
        json_number: Color::Rgb(245, 169, 127),
        json_boolean: Color::Rgb(198, 160, 246),
        json_null: Color::Rgb(110, 115, 141),
        author_user: Color::Rgb(145, 215, 227),
        author_assistant: Color::Rgb(245, 189, 230),
    },
    // Catppuccin Frappe
    Theme {
        name: "Catppuccin Frappe",
        bg: Color::Rgb(48, 52, 70),
        fg: Color::Rgb(198, 208, 245),
        fg_dim: Color::Rgb(115, 121, 148),
        accent: Color::Rgb(140, 170, 238),
        secondary: Color::Rgb(229, 200, 144),
        success: Color::Rgb(166, 209, 137),
        error: Color::Rgb(231, 130, 132),
        selection_bg: Color::Rgb(81, 87, 109),
        match_bg: Color::Rgb(229, 200, 144),
        match_fg: Color::Rgb(35, 38, 52),
        json_key: Color::Rgb(186, 187, 241),
        json_string: Color::Rgb(166, 209, 137),
        json_number: Color::Rgb(239, 159, 118),
        json_boolean: Color::Rgb(202, 158, 230),
        json_null: Color::Rgb(115, 121, 148),
        author_user: Color::Rgb(153, 209, 219),
        author_assistant: Color::Rgb(244, 184, 228),
    },
    // Catppuccin Latte
    Theme {
        name: "Catppuccin Latte",
        bg: Color::Rgb(239, 241, 245),
        fg: Color::Rgb(76, 79, 105),
        fg_dim: Color::Rgb(156, 160, 176),
        accent: Color::Rgb(30, 102, 245),
        secondary: Color::Rgb(223, 142, 29),
        success: Color::Rgb(64, 160, 43),
        error: Color::Rgb(210, 15, 57),
        selection_bg: Color::Rgb(188, 192, 204),
        match_bg: Color::Rgb(223, 142, 29),
        match_fg: Color::Rgb(220, 224, 232),
        json_key: Color::Rgb(114, 135, 253),
        json_string: Color::Rgb(64, 160, 43),
        json_number: Color::Rgb(254, 100, 11),
        json_boolean: Color::Rgb(136, 57, 239),
        json_null: Color::Rgb(156, 160, 176),
        author_user: Color::Rgb(4, 165, 229),
        author_assistant: Color::Rgb(234, 118, 203),
    },
    // Dracula
    Theme {
        name: "Dracula",
        bg: Color::Rgb(40, 42, 54),
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(189, 147, 249), // purple
        secondary: Color::Rgb(241, 250, 140),
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
        selection_bg: Color::Rgb(68, 71, 90),
        match_bg: Color::Rgb(241, 250, 140),
        match_fg: Color::Rgb(40, 42, 54),
        json_key: Color::Rgb(139, 233, 253),
        json_string: Color::Rgb(80, 250, 123),
        json_number: Color::Rgb(255, 184, 108),
        json_boolean: Color::Rgb(189, 147, 249),
        json_null: Color::Rgb(98, 114, 164),
        author_user: Color::Rgb(139, 233, 253),
        author_assistant: Color::Rgb(255, 121, 198),
    },
    // Nord
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),
        secondary: Color::Rgb(235, 203, 139),
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
        selection_bg: Color::Rgb(67, 76, 94),
        match_bg: Color::Rgb(235, 203, 139),
        match_fg: Color::Rgb(46, 52, 64),
        json_key: Color::Rgb(129, 161, 193),
        json_string: Color::Rgb(163, 190, 140),
        json_number: Color::Rgb(208, 135, 112),
        json_boolean: Color::Rgb(180, 142, 173),
        json_null: Color::Rgb(76, 86, 106),
        author_user: Color::Rgb(143, 188, 187),
        author_assistant: Color::Rgb(180, 142, 173),
    },
    // Tokyo Night
    Theme {
        name: "Tokyo Night",
        bg: Color::Rgb(26, 27, 38),
        fg: Color::Rgb(169, 177, 214),
        fg_dim: Color::Rgb(86, 95, 137),
        accent: Color::Rgb(122, 162, 247),
        secondary: Color::Rgb(224, 175, 104),
        success: Color::Rgb(158, 206, 106),
        error: Color::Rgb(247, 118, 142),
        selection_bg: Color::Rgb(41, 46, 66),
        match_bg: Color::Rgb(224, 175, 104),
        match_fg: Color::Rgb(26, 27, 38),
        json_key: Color::Rgb(125, 207, 255),
        json_string: Color::Rgb(158, 206, 106),
        json_number: Color::Rgb(255, 158, 100),
        json_boolean: Color::Rgb(187, 154, 247),
        json_null: Color::Rgb(86, 95, 137),
        author_user: Color::Rgb(125, 207, 255),
        author_assistant: Color::Rgb(187, 154, 247),
    },
    // Gruvbox Dark
    Theme {
        name: "Gruvbox Dark",
        bg: Color::Rgb(40, 40, 40),
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(131, 165, 152),
        secondary: Color::Rgb(250, 189, 47),
        success: Color::Rgb(184, 187, 38),
        error: Color::Rgb(251, 73, 52),
        selection_bg: Color::Rgb(80, 73, 69),
        match_bg: Color::Rgb(250, 189, 47),
        match_fg: Color::Rgb(40, 40, 40),
        json_key: Color::Rgb(131, 165, 152),
        json_string: Color::Rgb(184, 187, 38),
        json_number: Color::Rgb(254, 128, 25),
        json_boolean: Color::Rgb(211, 134, 155),
        json_null: Color::Rgb(146, 131, 116),
        author_user: Color::Rgb(142, 192, 124),
        author_assistant: Color::Rgb(211, 134, 155),
    },
];
