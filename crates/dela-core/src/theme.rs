//! Color themes.
//!
//! A theme is a named set of style variables. The engine only stores the
//! selected id; front-ends look up the variables here.

use serde::Serialize;

/// A named set of style variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub vars: &'static [(&'static str, &'static str)],
}

/// All themes; the first is the default
pub const THEMES: [Theme; 3] = [
    Theme {
        id: "de-la",
        name: "De La Birthday (Gold)",
        vars: &[
            ("--bg", "#0b0b10"),
            ("--panel", "#171418"),
            ("--panel2", "#241c10"),
            ("--accent", "#f0c23a"),
            ("--tileRadius", "14px"),
        ],
    },
    Theme {
        id: "classic",
        name: "Classic",
        vars: &[
            ("--bg", "#0f0f12"),
            ("--panel", "#17171c"),
            ("--panel2", "#1e1e25"),
            ("--accent", "#53d769"),
            ("--tileRadius", "12px"),
        ],
    },
    Theme {
        id: "chalk",
        name: "Chalkboard",
        vars: &[
            ("--bg", "#0b1210"),
            ("--panel", "#0f1915"),
            ("--panel2", "#111f19"),
            ("--accent", "#7ee3c1"),
            ("--tileRadius", "10px"),
        ],
    },
];

impl Theme {
    /// The default theme
    pub fn default_theme() -> &'static Theme {
        &THEMES[0]
    }

    /// Look up a theme by id, falling back to the default
    pub fn resolve(id: &str) -> &'static Theme {
        THEMES
            .iter()
            .find(|t| t.id == id)
            .unwrap_or_else(|| Self::default_theme())
    }

    /// Value of a style variable
    pub fn var(&self, name: &str) -> Option<&'static str> {
        self.vars.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

/// Id of the default theme
pub fn default_theme_id() -> String {
    Theme::default_theme().id.to_string()
}
