//! Rendering pipeline
//!
//! `layout` resolves a display list, `paint` defines its commands, `raster`
//! executes them. [`render_card`] ties the three together around the single
//! asynchronous step, the image loads.

pub mod layout;
pub mod paint;
pub mod raster;

use std::sync::Arc;

use crate::config::Background;
use crate::error::{Error, Result};
use crate::fonts::FontRegistry;
use crate::{CardConfig, CardInput};

use layout::XpTotals;
use raster::Surface;

/// A finished card: an encoded PNG buffer plus its pixel dimensions.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// Render one card.
///
/// The XP curve is evaluated at `level` and `level + 1` to derive the
/// current and required totals; a negative curve value fails fast rather
/// than producing a nonsensical progress fraction. The avatar (and the
/// background, when it is an image) are loaded concurrently; every other
/// step is synchronous. On any failure the whole render is rejected, no
/// partial buffer is returned.
pub async fn render_card<F>(
    input: &CardInput,
    xp_for_level: F,
    config: &CardConfig,
    fonts: &FontRegistry,
) -> Result<RenderedCard>
where
    F: Fn(u32) -> i64,
{
    let next_level = input
        .level
        .checked_add(1)
        .ok_or_else(|| Error::Input(format!("level {} has no successor", input.level)))?;
    let current = xp_for_level(input.level);
    let required = xp_for_level(next_level);
    if current < 0 || required < 0 {
        return Err(Error::Input(format!(
            "xp curve returned a negative total ({current} / {required})"
        )));
    }

    let client = reqwest::Client::new();
    let (avatar, background) = match &config.background {
        Background::Image(source) => {
            let (avatar, background) =
                futures::try_join!(input.avatar.load(&client), source.load(&client))?;
            (avatar, Some(background))
        }
        Background::Color(_) => (input.avatar.load(&client).await?, None),
    };

    let commands = layout::layout_card(
        input,
        XpTotals { current, required },
        config,
        fonts,
        Arc::new(avatar),
        background.map(Arc::new),
    );
    log::debug!(
        "resolved {} paint commands for a {}x{} card",
        commands.len(),
        config.width,
        config.height
    );

    let mut surface = Surface::new(config.width, config.height)?;
    surface.execute(&commands, fonts)?;
    let (width, height) = (surface.width(), surface.height());
    Ok(RenderedCard {
        width,
        height,
        png_data: surface.finish()?,
    })
}
