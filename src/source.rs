//! Image sources for avatars and backgrounds
//!
//! A source is either a URL (`http(s)` or a base64 `data:` URL) or a raw
//! byte buffer the caller already holds. Loading decodes to RGBA8; any
//! fetch or decode failure rejects the whole render, no partial card is
//! ever produced.

use base64::Engine as _;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// `http(s)` URL or `data:` URL with a base64 payload
    Url(String),
    /// Raw encoded image bytes (PNG, JPEG, WebP, ...)
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Fetch (if needed) and decode this source to RGBA8.
    ///
    /// This is the renderer's only suspension point; `Bytes` and `data:`
    /// sources never touch the network.
    pub async fn load(&self, client: &reqwest::Client) -> Result<RgbaImage> {
        let bytes = match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Url(raw) => {
                let parsed = url::Url::parse(raw)
                    .map_err(|e| Error::ImageLoad(format!("invalid url {raw}: {e}")))?;
                match parsed.scheme() {
                    "data" => decode_data_url(raw)?,
                    "http" | "https" => fetch(client, raw).await?,
                    scheme => {
                        return Err(Error::ImageLoad(format!(
                            "unsupported url scheme: {scheme}"
                        )))
                    }
                }
            }
        };
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::ImageLoad(format!("{url}: {e}")))?
        .error_for_status()
        .map_err(|e| Error::ImageLoad(format!("{url}: {e}")))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::ImageLoad(format!("{url}: {e}")))?;
    log::debug!("fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

fn decode_data_url(raw: &str) -> Result<Vec<u8>> {
    let payload_at = raw
        .find(',')
        .ok_or_else(|| Error::ImageLoad("data url has no payload".to_string()))?;
    let (header, payload) = raw.split_at(payload_at);
    if !header.contains(";base64") {
        return Err(Error::ImageLoad(
            "only base64 data urls are supported".to_string(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(&payload[1..])
        .map_err(|e| Error::ImageLoad(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use image::{ImageOutputFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn bytes_source_decodes() {
        let client = reqwest::Client::new();
        let source = ImageSource::Bytes(png_bytes(4, 6, [10, 20, 30, 255]));
        let img = source.load(&client).await.unwrap();
        assert_eq!((img.width(), img.height()), (4, 6));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[tokio::test]
    async fn data_url_source_decodes() {
        let client = reqwest::Client::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2, [1, 2, 3, 255]));
        let source = ImageSource::Url(format!("data:image/png;base64,{encoded}"));
        let img = source.load(&client).await.unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
    }

    #[tokio::test]
    async fn garbage_bytes_are_a_decode_error() {
        let client = reqwest::Client::new();
        let source = ImageSource::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            source.load(&client).await,
            Err(Error::ImageDecode(_))
        ));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_a_load_error() {
        let client = reqwest::Client::new();
        let source = ImageSource::Url("ftp://example.com/a.png".to_string());
        assert!(matches!(source.load(&client).await, Err(Error::ImageLoad(_))));
    }
}
