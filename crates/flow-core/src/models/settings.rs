//! Application settings model

use serde::{Deserialize, Serialize};

/// Smallest allowed editor font size.
pub const MIN_FONT_SIZE: u32 = 14;
/// Largest allowed editor font size.
pub const MAX_FONT_SIZE: u32 = 48;

/// Editor font family options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// System sans-serif stack
    Sans,
    #[default]
    Lato,
    Serif,
    Mono,
}

/// Theme options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Application settings, one document per identity scope.
///
/// Persisted as camelCase JSON, matching the guest settings record and the
/// remote settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Editor font size in pixels, bounded 14-48
    pub font_size: u32,
    pub font_family: FontFamily,
    pub theme: Theme,
    /// Fade the chrome away while a timed session is in progress
    pub is_zen_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            font_size: 22,
            font_family: FontFamily::Lato,
            theme: Theme::Dark,
            is_zen_mode: false,
        }
    }
}

impl AppSettings {
    /// Set the font size, clamped to the allowed bounds.
    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    /// Clamp any out-of-range values loaded from storage.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }
}
