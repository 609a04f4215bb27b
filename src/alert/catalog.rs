//! Alert types and their default presentation

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const ICON_BASE: &str = "https://ci.concourse-ci.org/public/images";

/// Build event an alert reports on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlertType {
    Success,
    Failed,
    Started,
    Aborted,
    Fixed,
    Broke,
    Errored,
    #[default]
    Default,
}

impl AlertType {
    pub const ALL: [AlertType; 8] = [
        AlertType::Success,
        AlertType::Failed,
        AlertType::Started,
        AlertType::Aborted,
        AlertType::Fixed,
        AlertType::Broke,
        AlertType::Errored,
        AlertType::Default,
    ];

    /// Parse a `alert_type` token. Matching is exact; anything else is `Default`.
    pub fn parse(token: &str) -> Self {
        match token {
            "success" => AlertType::Success,
            "failed" => AlertType::Failed,
            "started" => AlertType::Started,
            "aborted" => AlertType::Aborted,
            "fixed" => AlertType::Fixed,
            "broke" => AlertType::Broke,
            "errored" => AlertType::Errored,
            _ => AlertType::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Success => "success",
            AlertType::Failed => "failed",
            AlertType::Started => "started",
            AlertType::Aborted => "aborted",
            AlertType::Fixed => "fixed",
            AlertType::Broke => "broke",
            AlertType::Errored => "errored",
            AlertType::Default => "default",
        }
    }

    /// Types that only fire when the job's status changed
    pub fn is_transition(&self) -> bool {
        matches!(self, AlertType::Fixed | AlertType::Broke)
    }

    pub fn catalog_entry(&self) -> CatalogEntry {
        lookup(*self)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 24-bit RGB color as used in Discord embeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const MAX: u32 = 0xFF_FF_FF;

    /// Fallback when no type-specific color applies (`#35495c`)
    pub const DEFAULT: Color = Color(0x35495c);

    pub const fn from_rgb(value: u32) -> Self {
        Color(value & Self::MAX)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color '{0}'")]
pub struct InvalidColor(pub String);

impl FromStr for Color {
    type Err = InvalidColor;

    /// Accepts an optional `#` followed by one to six hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.is_empty() || hex.len() > 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Defaults for one alert type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub color: Color,
    pub icon_url: String,
    pub default_message: &'static str,
}

fn entry(color: u32, icon: &str, default_message: &'static str) -> CatalogEntry {
    CatalogEntry {
        color: Color::from_rgb(color),
        icon_url: format!("{}/favicon-{}.png", ICON_BASE, icon),
        default_message,
    }
}

pub fn lookup(alert_type: AlertType) -> CatalogEntry {
    match alert_type {
        AlertType::Success => entry(0x32cd32, "succeeded", "Success"),
        AlertType::Failed => entry(0xd00000, "failed", "Failed"),
        AlertType::Started => entry(0xf7cd42, "started", "Started"),
        AlertType::Aborted => entry(0x8d4b32, "aborted", "Aborted"),
        AlertType::Fixed => entry(0x32cd32, "succeeded", "Fixed"),
        AlertType::Broke => entry(0xd00000, "failed", "Broke"),
        AlertType::Errored => entry(0xf5a623, "errored", "Errored"),
        AlertType::Default => CatalogEntry {
            color: Color::DEFAULT,
            icon_url: format!("{}/favicon-pending.png", ICON_BASE),
            default_message: "",
        },
    }
}
