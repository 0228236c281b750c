//! Card theme configuration
//!
//! [`CardConfig`] is an immutable value: every `with_*` method consumes the
//! config and returns a new one, so two cards derived from a shared base
//! theme can never observe each other's changes.
//!
//! Setters perform no validation beyond their types. Color strings are
//! carried uninterpreted and parsed when the card is rasterized; a malformed
//! color surfaces there as [`crate::Error::Configuration`].

use serde::{Deserialize, Serialize};

use crate::source::ImageSource;

/// Canvas background: a solid color or an image scaled to the canvas bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    Color(String),
    Image(ImageSource),
}

/// Progress bar fill: a flat color or an evenly-spaced multi-stop gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BarFill {
    Color(String),
    Gradient(Vec<String>),
}

/// Semi-transparent rectangle drawn inset from the canvas edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub color: String,
    /// Global alpha for the overlay draw, expected in `[0, 1]`
    pub opacity: f32,
    pub visible: bool,
}

/// Progress bar geometry and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBar {
    /// Semicircular caps on both ends instead of square ones
    pub rounded: bool,
    pub track_color: String,
    pub fill: BarFill,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Placement of the avatar and its circular clip region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarArea {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub clip_radius: f32,
}

/// How the presence status is drawn relative to the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusIndicator {
    /// Stroke a ring around the avatar's clip circle
    Ring,
    /// Fill a small circle at the avatar's lower right
    Dot,
}

/// Presence indicator style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusStyle {
    pub visible: bool,
    pub indicator: StatusIndicator,
    /// Stroke width of the ring variant
    pub line_width: f32,
    /// Overrides the status' fixed color when set
    pub color: Option<String>,
}

/// A single labeled, styleable renderable value (level, rank).
///
/// Owned exclusively by [`CardConfig`]; the value carried here is the label
/// text, the numeric value comes from the render input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece<T> {
    pub value: T,
    pub color: String,
    pub font_size: f32,
    pub visible: bool,
}

/// Color and size for a plain text run (username, tag, XP counter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: String,
    pub font_size: f32,
}

/// Complete visual configuration for one card.
///
/// Serializable so bot themes can live in JSON files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
    pub background: Background,
    pub overlay: Overlay,
    pub bar: ProgressBar,
    pub avatar: AvatarArea,
    pub status: StatusStyle,
    /// Level piece; the carried value is the label text
    pub level: Piece<String>,
    /// Rank piece; shown only when the input supplies a rank
    pub rank: Piece<String>,
    pub username: TextStyle,
    pub tag: TextStyle,
    pub xp: TextStyle,
    /// Usernames longer than this are shortened with a trailing ellipsis
    pub username_max_len: usize,
    /// Strip diacritics from the username before shortening it
    pub strip_accents: bool,
    /// Font family looked up in the registry for every text run
    pub font_family: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 934,
            height: 282,
            background: Background::Color("#23272a".to_string()),
            overlay: Overlay {
                color: "#333640".to_string(),
                opacity: 0.5,
                visible: true,
            },
            bar: ProgressBar {
                rounded: true,
                track_color: "#484b4e".to_string(),
                fill: BarFill::Color("#ffffff".to_string()),
                x: 275.5,
                y: 183.75,
                width: 596.5,
                height: 37.5,
            },
            avatar: AvatarArea {
                x: 70.0,
                y: 50.0,
                size: 180.0,
                clip_radius: 90.0,
            },
            status: StatusStyle {
                visible: true,
                indicator: StatusIndicator::Dot,
                line_width: 8.0,
                color: None,
            },
            level: Piece {
                value: "LEVEL".to_string(),
                color: "#f3f3f3".to_string(),
                font_size: 36.0,
                visible: true,
            },
            rank: Piece {
                value: "RANK".to_string(),
                color: "#f3f3f3".to_string(),
                font_size: 36.0,
                visible: true,
            },
            username: TextStyle {
                color: "#ffffff".to_string(),
                font_size: 38.0,
            },
            tag: TextStyle {
                color: "#7f8384".to_string(),
                font_size: 28.0,
            },
            xp: TextStyle {
                color: "#ffffff".to_string(),
                font_size: 28.0,
            },
            username_max_len: 15,
            strip_accents: false,
            font_family: "Manrope".to_string(),
        }
    }
}

impl CardConfig {
    /// Canvas dimensions in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_background_color(self, color: impl Into<String>) -> Self {
        self.with_background(Background::Color(color.into()))
    }

    pub fn with_background_image(self, source: ImageSource) -> Self {
        self.with_background(Background::Image(source))
    }

    pub fn with_overlay(mut self, color: impl Into<String>, opacity: f32, visible: bool) -> Self {
        self.overlay = Overlay {
            color: color.into(),
            opacity,
            visible,
        };
        self
    }

    pub fn with_bar_fill(mut self, fill: BarFill) -> Self {
        self.bar.fill = fill;
        self
    }

    pub fn with_bar_fill_color(self, color: impl Into<String>) -> Self {
        self.with_bar_fill(BarFill::Color(color.into()))
    }

    pub fn with_bar_gradient(self, stops: Vec<String>) -> Self {
        self.with_bar_fill(BarFill::Gradient(stops))
    }

    pub fn with_bar_track_color(mut self, color: impl Into<String>) -> Self {
        self.bar.track_color = color.into();
        self
    }

    pub fn with_rounded_bar(mut self, rounded: bool) -> Self {
        self.bar.rounded = rounded;
        self
    }

    pub fn with_status_indicator(mut self, indicator: StatusIndicator) -> Self {
        self.status.indicator = indicator;
        self
    }

    pub fn with_status_visible(mut self, visible: bool) -> Self {
        self.status.visible = visible;
        self
    }

    /// Force a specific indicator color instead of the status' fixed one.
    pub fn with_status_color(mut self, color: impl Into<String>) -> Self {
        self.status.color = Some(color.into());
        self
    }

    pub fn with_level_style(mut self, color: impl Into<String>, font_size: f32, visible: bool) -> Self {
        self.level.color = color.into();
        self.level.font_size = font_size;
        self.level.visible = visible;
        self
    }

    pub fn with_level_label(mut self, label: impl Into<String>) -> Self {
        self.level.value = label.into();
        self
    }

    pub fn with_rank_style(mut self, color: impl Into<String>, font_size: f32, visible: bool) -> Self {
        self.rank.color = color.into();
        self.rank.font_size = font_size;
        self.rank.visible = visible;
        self
    }

    pub fn with_rank_label(mut self, label: impl Into<String>) -> Self {
        self.rank.value = label.into();
        self
    }

    pub fn with_username_style(mut self, color: impl Into<String>, font_size: f32) -> Self {
        self.username = TextStyle {
            color: color.into(),
            font_size,
        };
        self
    }

    pub fn with_tag_style(mut self, color: impl Into<String>, font_size: f32) -> Self {
        self.tag = TextStyle {
            color: color.into(),
            font_size,
        };
        self
    }

    pub fn with_xp_style(mut self, color: impl Into<String>, font_size: f32) -> Self {
        self.xp = TextStyle {
            color: color.into(),
            font_size,
        };
        self
    }

    pub fn with_username_max_len(mut self, max_len: usize) -> Self {
        self.username_max_len = max_len;
        self
    }

    pub fn with_strip_accents(mut self, strip: bool) -> Self {
        self.strip_accents = strip;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }
}
