//! Display settings
//!
//! Theme and text size preferences. Both are stored as bare strings and
//! validated against the known variants on load.

use crate::config::keys;
use crate::data::prefs::Preference;
use crate::error::{CivicsError, Result};
use std::fmt;
use std::str::FromStr;

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Follow system theme
    #[default]
    System,
    /// Always light theme
    Light,
    /// Always dark theme
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::System, Theme::Light, Theme::Dark];

    /// Stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Check if this theme prefers dark mode
    pub fn is_dark(&self) -> bool {
        match self {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::System => false, // no OS appearance query on this side
        }
    }

    /// Flip between light and dark; system switches to dark
    pub fn toggled(&self) -> Theme {
        if self.is_dark() {
            Theme::Light
        } else {
            Theme::Dark
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CivicsError;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CivicsError::malformed(keys::THEME, format!("unknown theme {:?}", s)))
    }
}

impl Preference for Theme {
    const KEY: &'static str = keys::THEME;

    fn encode(&self) -> Result<String> {
        Ok(self.as_str().to_string())
    }

    fn decode(raw: &str) -> Result<Self> {
        raw.parse()
    }
}

/// Text size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    Small,
    #[default]
    Default,
    Large,
    ExtraLarge,
}

impl TextSize {
    /// Options in display order
    pub const ALL: [TextSize; 4] = [
        TextSize::Small,
        TextSize::Default,
        TextSize::Large,
        TextSize::ExtraLarge,
    ];

    /// Stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSize::Small => "small",
            TextSize::Default => "default",
            TextSize::Large => "large",
            TextSize::ExtraLarge => "extra-large",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TextSize::Small => "Small",
            TextSize::Default => "Default",
            TextSize::Large => "Large",
            TextSize::ExtraLarge => "Extra Large",
        }
    }

    /// Font scale factor relative to the default size
    pub fn multiplier(&self) -> f32 {
        match self {
            TextSize::Small => 0.85,
            TextSize::Default => 1.0,
            TextSize::Large => 1.15,
            TextSize::ExtraLarge => 1.3,
        }
    }
}

impl fmt::Display for TextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextSize {
    type Err = CivicsError;

    fn from_str(s: &str) -> Result<Self> {
        TextSize::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CivicsError::malformed(keys::TEXT_SIZE, format!("unknown text size {:?}", s))
            })
    }
}

impl Preference for TextSize {
    const KEY: &'static str = keys::TEXT_SIZE;

    fn encode(&self) -> Result<String> {
        Ok(self.as_str().to_string())
    }

    fn decode(raw: &str) -> Result<Self> {
        raw.parse()
    }
}
