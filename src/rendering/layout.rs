//! Layout resolution
//!
//! Turns input data + theme config + font metrics into a positioned display
//! list. Everything here is synchronous, pure computation; images arrive
//! already loaded and the only queries made are text measurements.

use std::sync::Arc;

use image::RgbaImage;
use rusttype::{point, Font, Scale};

use crate::config::{Background, BarFill, CardConfig};
use crate::fonts::FontRegistry;
use crate::rendering::paint::{PaintCommand, Rect};
use crate::CardInput;

/// Empirical scale applied to the track's end-cap radius when the bar is
/// rounded. A visual tweak, not a derived value.
pub const TRACK_CAP_OVERSHOOT: f32 = 1.031;

/// Inset of the overlay rectangle from each canvas edge.
const OVERLAY_INSET: f32 = 20.0;
/// Baseline shared by the username, tag, and XP counter.
const TEXT_BASELINE_Y: f32 = 150.0;
/// Baseline of the level/rank header row.
const HEADER_BASELINE_Y: f32 = 96.0;
/// Right margin the header row is aligned against.
const RIGHT_MARGIN: f32 = 50.0;
/// Gap between a piece's label and its value.
const LABEL_GAP: f32 = 8.0;
/// Gap between the rank and level pieces.
const PIECE_GAP: f32 = 30.0;
/// Gap between the username and its tag.
const TAG_GAP: f32 = 8.0;

/// XP totals derived from the caller's curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpTotals {
    pub current: i64,
    pub required: i64,
}

/// Width of the progress-bar fill for the given XP totals.
///
/// `required <= 0` counts as a completed bar; the result is always within
/// `[0, bar_width]`.
pub fn progress_width(current_xp: i64, required_xp: i64, bar_width: f32) -> f32 {
    if required_xp <= 0 {
        return bar_width;
    }
    let fraction = (current_xp as f64 / required_xp as f64).clamp(0.0, 1.0);
    (fraction * f64::from(bar_width)) as f32
}

/// Shorten a name to `max_len` characters, ellipsis included.
///
/// Idempotent: a shortened name is exactly `max_len` characters and passes
/// through unchanged on a second application.
pub fn shorten(name: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

/// Fold common Latin diacritics to their ASCII base letter.
///
/// Covers the Latin-1 Supplement range; anything else passes through.
pub fn strip_accents(s: &str) -> String {
    s.chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'À'..='Å' => 'A',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => c,
    }
}

/// Advance width of `text` at the given pixel size.
pub fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    let scale = Scale::uniform(px);
    font.layout(text, scale, point(0.0, 0.0))
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .last()
        .unwrap_or(0.0)
}

/// Resolve the full display list for one card, in fixed draw order:
/// background, overlay, name row, avatar, status indicator, progress bar,
/// level/rank header.
///
/// Text steps require the configured font family; when it is not registered
/// they are skipped with a warning so font-less environments still render.
pub fn layout_card(
    input: &CardInput,
    xp: XpTotals,
    config: &CardConfig,
    fonts: &FontRegistry,
    avatar: Arc<RgbaImage>,
    background: Option<Arc<RgbaImage>>,
) -> Vec<PaintCommand> {
    let mut commands = Vec::new();
    let canvas = Rect::new(0.0, 0.0, config.width as f32, config.height as f32);

    let font = fonts.get(&config.font_family);
    if font.is_none() {
        log::warn!(
            "font family {:?} is not registered; text steps will be skipped",
            config.font_family
        );
    }

    // 1. Background
    match (&config.background, background) {
        (Background::Color(color), _) => commands.push(PaintCommand::SolidRect {
            rect: canvas,
            color: color.clone(),
        }),
        (Background::Image(_), Some(image)) => {
            commands.push(PaintCommand::Image { rect: canvas, image });
        }
        (Background::Image(_), None) => {
            log::warn!("background image was not loaded; leaving the canvas bare");
        }
    }

    // 2. Overlay
    if config.overlay.visible {
        commands.push(PaintCommand::AlphaRect {
            rect: Rect::new(
                OVERLAY_INSET,
                OVERLAY_INSET,
                canvas.width - 2.0 * OVERLAY_INSET,
                canvas.height - 2.0 * OVERLAY_INSET,
            ),
            color: config.overlay.color.clone(),
            opacity: config.overlay.opacity,
        });
    }

    // 3. Name row: username, tag, XP counter
    if let Some(font) = &font {
        let mut name = input.username.clone();
        if config.strip_accents {
            name = strip_accents(&name);
        }
        let name = shorten(&name, config.username_max_len);
        let name_width = text_width(font, config.username.font_size, &name);
        commands.push(PaintCommand::Text {
            x: config.bar.x,
            y: TEXT_BASELINE_Y,
            text: name,
            color: config.username.color.clone(),
            font_size: config.username.font_size,
            family: config.font_family.clone(),
        });

        commands.push(PaintCommand::Text {
            x: config.bar.x + name_width + TAG_GAP,
            y: TEXT_BASELINE_Y,
            text: format!("#{}", input.discriminator),
            color: config.tag.color.clone(),
            font_size: config.tag.font_size,
            family: config.font_family.clone(),
        });

        let counter = format!("{} / {} XP", xp.current, xp.required);
        let counter_width = text_width(font, config.xp.font_size, &counter);
        commands.push(PaintCommand::Text {
            x: config.bar.x + config.bar.width - counter_width,
            y: TEXT_BASELINE_Y,
            text: counter,
            color: config.xp.color.clone(),
            font_size: config.xp.font_size,
            family: config.font_family.clone(),
        });
    }

    // 4. Avatar inside its clip circle
    let avatar_cx = config.avatar.x + config.avatar.size / 2.0;
    let avatar_cy = config.avatar.y + config.avatar.size / 2.0;
    commands.push(PaintCommand::CircleImage {
        cx: avatar_cx,
        cy: avatar_cy,
        radius: config.avatar.clip_radius,
        image: avatar,
    });

    // 5. Status indicator
    if config.status.visible {
        let color = config
            .status
            .color
            .clone()
            .unwrap_or_else(|| input.status.color().to_string());
        match config.status.indicator {
            crate::config::StatusIndicator::Ring => commands.push(PaintCommand::Ring {
                cx: avatar_cx,
                cy: avatar_cy,
                radius: config.avatar.clip_radius + config.status.line_width / 2.0,
                line_width: config.status.line_width,
                color,
            }),
            crate::config::StatusIndicator::Dot => {
                // Lower-right point of the clip circle, 45 degrees out
                let offset = config.avatar.clip_radius * std::f32::consts::FRAC_1_SQRT_2;
                commands.push(PaintCommand::Circle {
                    cx: avatar_cx + offset,
                    cy: avatar_cy + offset,
                    radius: config.status.line_width * 2.5,
                    color,
                });
            }
        }
    }

    // 6. Progress bar: track, then fill
    let bar_rect = Rect::new(config.bar.x, config.bar.y, config.bar.width, config.bar.height);
    commands.push(PaintCommand::BarSegment {
        rect: bar_rect,
        fill: BarFill::Color(config.bar.track_color.clone()),
        gradient_span: bar_rect,
        rounded: config.bar.rounded,
        cap_overshoot: TRACK_CAP_OVERSHOOT,
    });
    let fill_width = progress_width(xp.current, xp.required, config.bar.width);
    commands.push(PaintCommand::BarSegment {
        rect: Rect::new(config.bar.x, config.bar.y, fill_width, config.bar.height),
        fill: config.bar.fill.clone(),
        gradient_span: bar_rect,
        rounded: config.bar.rounded,
        cap_overshoot: 1.0,
    });

    // 7. Level / rank header, right-aligned from the card edge
    if let Some(font) = &font {
        let mut cursor = canvas.width - RIGHT_MARGIN;
        if config.level.visible {
            cursor = push_piece(
                &mut commands,
                font,
                cursor,
                &config.level.value,
                &input.level.to_string(),
                &config.level.color,
                config.level.font_size,
                &config.font_family,
            );
            cursor -= PIECE_GAP;
        }
        if config.rank.visible {
            if let Some(rank) = input.rank {
                push_piece(
                    &mut commands,
                    font,
                    cursor,
                    &config.rank.value,
                    &rank.to_string(),
                    &config.rank.color,
                    config.rank.font_size,
                    &config.font_family,
                );
            }
        }
    }

    commands
}

/// Lay out one `LABEL value` pair ending at `right_edge`; returns the new
/// cursor position left of the label.
#[allow(clippy::too_many_arguments)]
fn push_piece(
    commands: &mut Vec<PaintCommand>,
    font: &Font<'_>,
    right_edge: f32,
    label: &str,
    value: &str,
    color: &str,
    font_size: f32,
    family: &str,
) -> f32 {
    let mut cursor = right_edge - text_width(font, font_size, value);
    commands.push(PaintCommand::Text {
        x: cursor,
        y: HEADER_BASELINE_Y,
        text: value.to_string(),
        color: color.to_string(),
        font_size,
        family: family.to_string(),
    });
    cursor -= LABEL_GAP + text_width(font, font_size, label);
    commands.push(PaintCommand::Text {
        x: cursor,
        y: HEADER_BASELINE_Y,
        text: label.to_string(),
        color: color.to_string(),
        font_size,
        family: family.to_string(),
    });
    cursor
}
