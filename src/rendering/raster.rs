//! Raster surface
//!
//! Executes a resolved display list against a tiny-skia pixmap and encodes
//! the result as PNG. One [`Surface`] belongs to exactly one render call;
//! it is never shared between logical draw sequences.

use image::RgbaImage;
use rusttype::{point, Font, Scale};
use tiny_skia::{
    Color, ColorU8, FillRule, GradientStop, LinearGradient, Mask, Paint, Path, PathBuilder,
    Pixmap, Point, PremultipliedColorU8, Rect as SkRect, Shader, SpreadMode, Stroke, Transform,
};

use crate::config::BarFill;
use crate::error::{Error, Result};
use crate::fonts::FontRegistry;
use crate::rendering::paint::{PaintCommand, Rect};

/// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` into straight-alpha channels.
pub fn parse_color(s: &str) -> Result<ColorU8> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || Error::Configuration(format!("malformed color string: {s}"));
    let channel = |slice: &str| u8::from_str_radix(slice, 16).map_err(|_| bad());
    match hex.len() {
        3 => {
            let mut c = [0u8; 3];
            for (i, ch) in hex.chars().enumerate() {
                let v = channel(&ch.to_string())?;
                c[i] = v << 4 | v;
            }
            Ok(ColorU8::from_rgba(c[0], c[1], c[2], 255))
        }
        6 => Ok(ColorU8::from_rgba(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        )),
        8 => Ok(ColorU8::from_rgba(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => Err(bad()),
    }
}

fn to_color(c: ColorU8) -> Color {
    Color::from_rgba8(c.red(), c.green(), c.blue(), c.alpha())
}

/// Convert straight-alpha RGBA8 image data into a premultiplied pixmap.
fn pixmap_from_image(image: &RgbaImage) -> Result<Pixmap> {
    let size = tiny_skia::IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| Error::ImageDecode("zero-sized image".to_string()))?;
    let mut data = image.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        px[0] = ((u16::from(px[0]) * a) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a) / 255) as u8;
    }
    Pixmap::from_vec(data, size)
        .ok_or_else(|| Error::ImageDecode("image data does not match its size".to_string()))
}

/// Capsule path for a rounded bar segment: a cap circle at each end joined
/// by a rectangle. `cap_overshoot` scales the end cap's radius only.
fn capsule_path(rect: Rect, cap_overshoot: f32) -> Option<Path> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let r = rect.height / 2.0;
    let cy = rect.y + r;
    let mut pb = PathBuilder::new();
    if rect.width <= rect.height {
        // A fill shorter than one cap collapses to its left cap
        pb.push_circle(rect.x + r, cy, r);
    } else {
        pb.push_circle(rect.x + r, cy, r);
        pb.push_circle(rect.x + rect.width - r, cy, r * cap_overshoot);
        pb.push_rect(SkRect::from_xywh(rect.x + r, rect.y, rect.width - 2.0 * r, rect.height)?);
    }
    pb.finish()
}

/// A single-use raster surface.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Configuration(format!("invalid canvas size {width}x{height}")))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha probe of one pixel, mainly for tests.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = (y * self.width() + x) as usize;
        let px = self.pixmap.pixels()[idx].demultiply();
        Some((px.red(), px.green(), px.blue(), px.alpha()))
    }

    /// Execute the display list in order. Fails fast on the first malformed
    /// color or gradient; nothing is returned half-drawn to the caller.
    pub fn execute(&mut self, commands: &[PaintCommand], fonts: &FontRegistry) -> Result<()> {
        for command in commands {
            self.execute_one(command, fonts)?;
        }
        Ok(())
    }

    fn execute_one(&mut self, command: &PaintCommand, fonts: &FontRegistry) -> Result<()> {
        match command {
            PaintCommand::SolidRect { rect, color } => {
                let paint = solid_paint(to_color(parse_color(color)?));
                if let Some(sk) = SkRect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
                    self.pixmap.fill_rect(sk, &paint, Transform::identity(), None);
                }
            }
            PaintCommand::AlphaRect { rect, color, opacity } => {
                let opacity = opacity.clamp(0.0, 1.0);
                let base = parse_color(color)?;
                let alpha = (f32::from(base.alpha()) * opacity).round() as u8;
                let paint = solid_paint(Color::from_rgba8(base.red(), base.green(), base.blue(), alpha));
                if let Some(sk) = SkRect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
                    self.pixmap.fill_rect(sk, &paint, Transform::identity(), None);
                }
            }
            PaintCommand::Image { rect, image } => {
                let scaled = image::imageops::resize(
                    image.as_ref(),
                    rect.width.max(1.0) as u32,
                    rect.height.max(1.0) as u32,
                    image::imageops::FilterType::Lanczos3,
                );
                let pixmap = pixmap_from_image(&scaled)?;
                self.pixmap.draw_pixmap(
                    rect.x as i32,
                    rect.y as i32,
                    pixmap.as_ref(),
                    &tiny_skia::PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            PaintCommand::CircleImage { cx, cy, radius, image } => {
                let diameter = (radius * 2.0).max(1.0) as u32;
                let scaled = image::imageops::resize(
                    image.as_ref(),
                    diameter,
                    diameter,
                    image::imageops::FilterType::Lanczos3,
                );
                let pixmap = pixmap_from_image(&scaled)?;
                let mut mask = Mask::new(self.width(), self.height())
                    .ok_or_else(|| Error::Configuration("empty canvas".to_string()))?;
                if let Some(circle) = PathBuilder::from_circle(*cx, *cy, *radius) {
                    mask.fill_path(&circle, FillRule::Winding, true, Transform::identity());
                }
                self.pixmap.draw_pixmap(
                    (cx - radius) as i32,
                    (cy - radius) as i32,
                    pixmap.as_ref(),
                    &tiny_skia::PixmapPaint::default(),
                    Transform::identity(),
                    Some(&mask),
                );
            }
            PaintCommand::Circle { cx, cy, radius, color } => {
                let paint = solid_paint(to_color(parse_color(color)?));
                if let Some(circle) = PathBuilder::from_circle(*cx, *cy, *radius) {
                    self.pixmap
                        .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            PaintCommand::Ring { cx, cy, radius, line_width, color } => {
                let paint = solid_paint(to_color(parse_color(color)?));
                let stroke = Stroke {
                    width: *line_width,
                    ..Stroke::default()
                };
                if let Some(circle) = PathBuilder::from_circle(*cx, *cy, *radius) {
                    self.pixmap
                        .stroke_path(&circle, &paint, &stroke, Transform::identity(), None);
                }
            }
            PaintCommand::BarSegment { rect, fill, gradient_span, rounded, cap_overshoot } => {
                if rect.width <= 0.0 {
                    return Ok(());
                }
                let paint = bar_paint(fill, *gradient_span)?;
                if *rounded {
                    if let Some(path) = capsule_path(*rect, *cap_overshoot) {
                        self.pixmap
                            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                    }
                } else if let Some(sk) = SkRect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
                    self.pixmap.fill_rect(sk, &paint, Transform::identity(), None);
                }
            }
            PaintCommand::Text { x, y, text, color, font_size, family } => {
                let Some(font) = fonts.get(family) else {
                    log::warn!("font family {family:?} missing at draw time; skipping text run");
                    return Ok(());
                };
                let color = parse_color(color)?;
                self.draw_text(&font, text, *x, *y, *font_size, color);
            }
        }
        Ok(())
    }

    /// Rasterize glyphs straight into the pixmap, blending by coverage.
    fn draw_text(&mut self, font: &Font<'_>, text: &str, x: f32, baseline: f32, px: f32, color: ColorU8) {
        let width = self.width();
        let height = self.height();
        let scale = Scale::uniform(px);
        let glyphs: Vec<_> = font.layout(text, scale, point(x, baseline)).collect();
        let pixels = self.pixmap.pixels_mut();
        for glyph in glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px_x = gx as i32 + bb.min.x;
                let px_y = gy as i32 + bb.min.y;
                if px_x < 0 || px_y < 0 || px_x as u32 >= width || px_y as u32 >= height {
                    return;
                }
                let sa = coverage * f32::from(color.alpha()) / 255.0;
                if sa <= 0.0 {
                    return;
                }
                let idx = (px_y as u32 * width + px_x as u32) as usize;
                let dst = pixels[idx];
                let inv = 1.0 - sa;
                let a = (sa * 255.0 + f32::from(dst.alpha()) * inv).round() as u8;
                let r = ((f32::from(color.red()) * sa + f32::from(dst.red()) * inv).round() as u8).min(a);
                let g = ((f32::from(color.green()) * sa + f32::from(dst.green()) * inv).round() as u8).min(a);
                let b = ((f32::from(color.blue()) * sa + f32::from(dst.blue()) * inv).round() as u8).min(a);
                if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, a) {
                    pixels[idx] = blended;
                }
            });
        }
    }

    /// Encode the finished surface as PNG.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.pixmap.encode_png().map_err(|e| Error::Encode(e.to_string()))
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.shader = Shader::SolidColor(color);
    paint.anti_alias = true;
    paint
}

fn bar_paint(fill: &BarFill, span: Rect) -> Result<Paint<'static>> {
    match fill {
        BarFill::Color(color) => Ok(solid_paint(to_color(parse_color(color)?))),
        BarFill::Gradient(colors) => {
            if colors.is_empty() {
                return Err(Error::Configuration("gradient needs at least one stop".to_string()));
            }
            if colors.len() == 1 {
                return Ok(solid_paint(to_color(parse_color(&colors[0])?)));
            }
            let last = (colors.len() - 1) as f32;
            let stops = colors
                .iter()
                .enumerate()
                .map(|(i, c)| Ok(GradientStop::new(i as f32 / last, to_color(parse_color(c)?))))
                .collect::<Result<Vec<_>>>()?;
            let shader = LinearGradient::new(
                Point::from_xy(span.x, span.y),
                Point::from_xy(span.x + span.width, span.y),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
            .ok_or_else(|| Error::Configuration("degenerate gradient span".to_string()))?;
            let mut paint = Paint::default();
            paint.shader = shader;
            paint.anti_alias = true;
            Ok(paint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::paint::Rect;

    #[test]
    fn parse_color_forms() {
        let c = parse_color("#102030").unwrap();
        assert_eq!((c.red(), c.green(), c.blue(), c.alpha()), (0x10, 0x20, 0x30, 255));
        let c = parse_color("#abc").unwrap();
        assert_eq!((c.red(), c.green(), c.blue()), (0xaa, 0xbb, 0xcc));
        let c = parse_color("#10203040").unwrap();
        assert_eq!(c.alpha(), 0x40);
    }

    #[test]
    fn parse_color_rejects_garbage() {
        for bad in ["", "#", "#12345", "#xyzxyz", "red"] {
            assert!(matches!(parse_color(bad), Err(Error::Configuration(_))), "{bad}");
        }
    }

    #[test]
    fn solid_fill_probes_exactly() {
        let mut surface = Surface::new(10, 8).unwrap();
        let fonts = FontRegistry::new();
        surface
            .execute(
                &[PaintCommand::SolidRect {
                    rect: Rect::new(0.0, 0.0, 10.0, 8.0),
                    color: "#102030".to_string(),
                }],
                &fonts,
            )
            .unwrap();
        assert_eq!(surface.pixel(5, 4), Some((0x10, 0x20, 0x30, 255)));
    }

    #[test]
    fn zero_opacity_overlay_leaves_pixels_untouched() {
        let mut surface = Surface::new(10, 8).unwrap();
        let fonts = FontRegistry::new();
        surface
            .execute(
                &[
                    PaintCommand::SolidRect {
                        rect: Rect::new(0.0, 0.0, 10.0, 8.0),
                        color: "#40506a".to_string(),
                    },
                    PaintCommand::AlphaRect {
                        rect: Rect::new(0.0, 0.0, 10.0, 8.0),
                        color: "#000000".to_string(),
                        opacity: 0.0,
                    },
                ],
                &fonts,
            )
            .unwrap();
        assert_eq!(surface.pixel(3, 3), Some((0x40, 0x50, 0x6a, 255)));
    }

    #[test]
    fn rounded_track_misses_the_corner() {
        let mut surface = Surface::new(60, 30).unwrap();
        let fonts = FontRegistry::new();
        surface
            .execute(
                &[PaintCommand::BarSegment {
                    rect: Rect::new(0.0, 0.0, 60.0, 20.0),
                    fill: BarFill::Color("#ffffff".to_string()),
                    gradient_span: Rect::new(0.0, 0.0, 60.0, 20.0),
                    rounded: true,
                    cap_overshoot: 1.0,
                }],
                &fonts,
            )
            .unwrap();
        // Center of the capsule is painted, the square corner is not
        assert_eq!(surface.pixel(30, 10).unwrap().3, 255);
        assert_eq!(surface.pixel(0, 0).unwrap().3, 0);
    }

    #[test]
    fn gradient_sweeps_between_stops() {
        let mut surface = Surface::new(100, 10).unwrap();
        let fonts = FontRegistry::new();
        surface
            .execute(
                &[PaintCommand::BarSegment {
                    rect: Rect::new(0.0, 0.0, 100.0, 10.0),
                    fill: BarFill::Gradient(vec!["#ff0000".to_string(), "#0000ff".to_string()]),
                    gradient_span: Rect::new(0.0, 0.0, 100.0, 10.0),
                    rounded: false,
                    cap_overshoot: 1.0,
                }],
                &fonts,
            )
            .unwrap();
        let (r0, _, b0, _) = surface.pixel(2, 5).unwrap();
        let (r1, _, b1, _) = surface.pixel(97, 5).unwrap();
        assert!(r0 > 200 && b0 < 60, "left end should be red, got {r0},{b0}");
        assert!(b1 > 200 && r1 < 60, "right end should be blue, got {r1},{b1}");
    }

    #[test]
    fn empty_gradient_is_a_configuration_error() {
        let mut surface = Surface::new(10, 10).unwrap();
        let fonts = FontRegistry::new();
        let err = surface
            .execute(
                &[PaintCommand::BarSegment {
                    rect: Rect::new(0.0, 0.0, 10.0, 5.0),
                    fill: BarFill::Gradient(Vec::new()),
                    gradient_span: Rect::new(0.0, 0.0, 10.0, 5.0),
                    rounded: false,
                    cap_overshoot: 1.0,
                }],
                &fonts,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn malformed_color_fails_the_render() {
        let mut surface = Surface::new(10, 10).unwrap();
        let fonts = FontRegistry::new();
        let err = surface
            .execute(
                &[PaintCommand::SolidRect {
                    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                    color: "not-a-color".to_string(),
                }],
                &fonts,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(matches!(Surface::new(0, 10), Err(Error::Configuration(_))));
    }
}
