//! Smoke tests for the full render call

use image::{ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;

use rankcard::{CardConfig, CardInput, FontRegistry, ImageSource, StatusIndicator, StatusKind};

fn avatar_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(64, 64, Rgba([200, 30, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

fn test_input() -> CardInput {
    CardInput {
        level: 5,
        rank: Some(3),
        username: "Test".to_string(),
        discriminator: "0001".to_string(),
        status: StatusKind::Online,
        avatar: ImageSource::Bytes(avatar_png()),
    }
}

#[tokio::test]
async fn default_card_round_trips() -> anyhow::Result<()> {
    let fonts = FontRegistry::new();
    let config = CardConfig::default();
    let card = rankcard::render_card(&test_input(), |l| 100 * i64::from(l), &config, &fonts).await?;

    assert!(!card.png_data.is_empty());
    assert_eq!((card.width, card.height), (934, 282));

    let decoded = image::load_from_memory(&card.png_data)?;
    assert_eq!((decoded.width(), decoded.height()), (934, 282));
    Ok(())
}

#[tokio::test]
async fn custom_canvas_size_is_respected() {
    let fonts = FontRegistry::new();
    let config = CardConfig::default().with_size(640, 200);
    let card = rankcard::render_card(&test_input(), |l| 100 * i64::from(l), &config, &fonts)
        .await
        .unwrap();
    let decoded = image::load_from_memory(&card.png_data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (640, 200));
}

#[tokio::test]
async fn gradient_bar_and_ring_indicator_render() {
    let fonts = FontRegistry::new();
    let config = CardConfig::default()
        .with_bar_gradient(vec!["#ff0000".into(), "#ffff00".into(), "#00ff00".into()])
        .with_status_indicator(StatusIndicator::Ring);
    let card = rankcard::render_card(&test_input(), |l| 100 * i64::from(l), &config, &fonts)
        .await
        .unwrap();
    assert!(!card.png_data.is_empty());
}

#[tokio::test]
async fn missing_rank_still_renders() {
    let fonts = FontRegistry::new();
    let config = CardConfig::default();
    let mut input = test_input();
    input.rank = None;
    let card = rankcard::render_card(&input, |l| 100 * i64::from(l), &config, &fonts)
        .await
        .unwrap();
    assert_eq!((card.width, card.height), (934, 282));
}

#[tokio::test]
async fn square_bar_variant_renders() {
    let fonts = FontRegistry::new();
    let config = CardConfig::default().with_rounded_bar(false);
    let card = rankcard::render_card(&test_input(), |l| 100 * i64::from(l), &config, &fonts)
        .await
        .unwrap();
    assert!(!card.png_data.is_empty());
}

#[tokio::test]
async fn image_background_loads_concurrently_with_avatar() {
    use base64::Engine as _;

    let fonts = FontRegistry::new();
    let bg = RgbaImage::from_pixel(32, 16, Rgba([5, 5, 5, 255]));
    let mut out = Cursor::new(Vec::new());
    bg.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(out.into_inner());
    let config = CardConfig::default()
        .with_background_image(ImageSource::Url(format!("data:image/png;base64,{encoded}")));

    let card = rankcard::render_card(&test_input(), |l| 100 * i64::from(l), &config, &fonts)
        .await
        .unwrap();
    assert_eq!((card.width, card.height), (934, 282));
}
