//! Paint command set
//!
//! Layout resolution produces a flat display list of these commands; the
//! raster surface executes them in order. Commands are self-contained data,
//! so the split between "decide what to draw" and "draw it" stays testable
//! without a surface.

use std::sync::Arc;

use image::RgbaImage;

use crate::config::BarFill;

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone)]
pub enum PaintCommand {
    /// Opaque solid fill
    SolidRect { rect: Rect, color: String },
    /// Fill drawn with an explicit global alpha (the overlay step)
    AlphaRect { rect: Rect, color: String, opacity: f32 },
    /// Image scaled to the given bounds (image backgrounds)
    Image { rect: Rect, image: Arc<RgbaImage> },
    /// Image composited inside a circular clip (the avatar)
    CircleImage {
        cx: f32,
        cy: f32,
        radius: f32,
        image: Arc<RgbaImage>,
    },
    /// Filled circle (status dot)
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: String,
    },
    /// Stroked circle (status ring)
    Ring {
        cx: f32,
        cy: f32,
        radius: f32,
        line_width: f32,
        color: String,
    },
    /// One progress-bar segment: the track or the fill.
    ///
    /// When `rounded`, both ends get semicircular caps and the end cap's
    /// radius is scaled by `cap_overshoot`. Gradient fills are mapped across
    /// `gradient_span` rather than the segment's own rect, so a partial fill
    /// shows the same gradient as a full one.
    BarSegment {
        rect: Rect,
        fill: BarFill,
        gradient_span: Rect,
        rounded: bool,
        cap_overshoot: f32,
    },
    /// Text run; `y` is the baseline, `x` is already alignment-resolved.
    Text {
        x: f32,
        y: f32,
        text: String,
        color: String,
        font_size: f32,
        family: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_segment_carries_overshoot() {
        let cmd = PaintCommand::BarSegment {
            rect: Rect::new(0.0, 0.0, 100.0, 20.0),
            fill: BarFill::Color("#ffffff".to_string()),
            gradient_span: Rect::new(0.0, 0.0, 100.0, 20.0),
            rounded: true,
            cap_overshoot: 1.031,
        };
        match cmd {
            PaintCommand::BarSegment { cap_overshoot, rounded, .. } => {
                assert!(rounded);
                assert!((cap_overshoot - 1.031).abs() < f32::EPSILON);
            }
            _ => panic!("unexpected"),
        }
    }
}
