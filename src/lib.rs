//! Rank Card Renderer
//!
//! A stateless, single-call renderer that composes a fixed-layout "rank card"
//! (level, rank, XP progress, avatar, presence status) onto a raster surface
//! and returns an encoded PNG buffer, ready to attach to a chat message.
//!
//! # Features
//!
//! - **Immutable theming**: [`CardConfig`] is a value built through chained
//!   `with_*` transformations; card instances never share mutable state
//! - **Explicit font service**: fonts are registered on a [`FontRegistry`]
//!   that is injected into the render call, not hidden module state
//! - **Async only at the edge**: the image fetch is the single suspension
//!   point; every drawing step is synchronous, pure computation
//!
//! # Example
//!
//! ```no_run
//! use rankcard::{CardConfig, CardInput, FontRegistry, ImageSource, StatusKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fonts = FontRegistry::new();
//! let config = CardConfig::default()
//!     .with_background_color("#23272a")
//!     .with_bar_fill_color("#ffffff");
//!
//! let input = CardInput {
//!     level: 5,
//!     rank: Some(3),
//!     username: "Test".to_string(),
//!     discriminator: "0001".to_string(),
//!     status: StatusKind::Online,
//!     avatar: ImageSource::Url("https://cdn.example.com/avatar.png".to_string()),
//! };
//!
//! let card = rankcard::render_card(&input, |level| 100 * i64::from(level), &config, &fonts).await?;
//! std::fs::write("card.png", &card.png_data)?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{
    AvatarArea, Background, BarFill, CardConfig, Overlay, Piece, ProgressBar, StatusIndicator,
    StatusStyle, TextStyle,
};

pub mod fonts;
pub use fonts::{FontRegistry, FontSpec};

pub mod source;
pub use source::ImageSource;

pub mod rendering;
pub use rendering::{render_card, RenderedCard};

/// Presence status of the card's subject.
///
/// Each status is bound to a fixed display color. Parsing an unknown status
/// string is rejected up front ([`Error::Configuration`]) so the renderer
/// itself only ever sees one of these five values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Online,
    Idle,
    Dnd,
    Offline,
    Streaming,
}

impl StatusKind {
    /// The fixed display color for this status.
    pub fn color(self) -> &'static str {
        match self {
            Self::Online => "#43b581",
            Self::Idle => "#faa61a",
            Self::Dnd => "#f04747",
            Self::Offline => "#747f8d",
            Self::Streaming => "#593695",
        }
    }
}

impl FromStr for StatusKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "offline" => Ok(Self::Offline),
            "streaming" => Ok(Self::Streaming),
            other => Err(Error::Configuration(format!("unknown presence status: {other}"))),
        }
    }
}

/// Per-render input data.
///
/// The XP curve is supplied separately to [`render_card`] as a closure; the
/// renderer evaluates it at `level` and `level + 1` to derive the current and
/// required XP totals.
#[derive(Debug, Clone)]
pub struct CardInput {
    /// Current level (non-negative by construction)
    pub level: u32,
    /// Leaderboard rank; the rank piece is only shown when this is present
    pub rank: Option<u32>,
    /// Display name, shortened to the configured maximum length
    pub username: String,
    /// Tag shown after the username, rendered as `#<discriminator>`
    pub discriminator: String,
    /// Presence status, drawn as a ring or dot next to the avatar
    pub status: StatusKind,
    /// Where to load the avatar image from
    pub avatar: ImageSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_colors_are_fixed() {
        assert_eq!(StatusKind::Online.color(), "#43b581");
        assert_eq!(StatusKind::Idle.color(), "#faa61a");
        assert_eq!(StatusKind::Dnd.color(), "#f04747");
        assert_eq!(StatusKind::Offline.color(), "#747f8d");
        assert_eq!(StatusKind::Streaming.color(), "#593695");
    }

    #[test]
    fn status_parse_rejects_unknown_keys() {
        assert_eq!("online".parse::<StatusKind>().unwrap(), StatusKind::Online);
        assert_eq!("dnd".parse::<StatusKind>().unwrap(), StatusKind::Dnd);
        assert!(matches!(
            "invisible".parse::<StatusKind>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn status_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&StatusKind::Streaming).unwrap();
        assert_eq!(json, "\"streaming\"");
        let back: StatusKind = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(back, StatusKind::Idle);
    }
}
