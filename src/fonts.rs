//! Font registration service
//!
//! Fonts are process-wide in spirit (register once, render many times) but
//! the registry itself is an explicit value injected into the render call
//! rather than hidden module state. Registration is idempotent: registering
//! a family that is already known is a no-op, so callers can blindly
//! "ensure registered" before every render.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use rusttype::Font;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A font file to register before drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub path: PathBuf,
    pub family: String,
    /// Optional weight refinement, folded into the lookup key (`"Family Bold"`)
    pub weight: Option<String>,
    /// Optional style refinement, folded into the lookup key
    pub style: Option<String>,
}

impl FontSpec {
    pub fn new(path: impl Into<PathBuf>, family: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            family: family.into(),
            weight: None,
            style: None,
        }
    }

    /// The registry key this spec registers under.
    pub fn key(&self) -> String {
        let mut key = self.family.clone();
        if let Some(weight) = &self.weight {
            key.push(' ');
            key.push_str(weight);
        }
        if let Some(style) = &self.style {
            key.push(' ');
            key.push_str(style);
        }
        key
    }
}

/// Registry of parsed fonts keyed by family name.
///
/// Read-mostly and lock-guarded, so one shared registry can serve
/// concurrent renders.
#[derive(Default)]
pub struct FontRegistry {
    fonts: RwLock<HashMap<String, Arc<Font<'static>>>>,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fonts = self.fonts.read().expect("font registry lock poisoned");
        f.debug_struct("FontRegistry")
            .field("families", &fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register a font file. A no-op when the key is already known.
    pub fn register(&self, spec: &FontSpec) -> Result<()> {
        let key = spec.key();
        if self.contains(&key) {
            return Ok(());
        }
        let bytes = std::fs::read(&spec.path)
            .map_err(|e| Error::Font(format!("{}: {e}", spec.path.display())))?;
        self.register_bytes(&key, bytes)
    }

    /// Register an in-memory font under a family name.
    pub fn register_bytes(&self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let mut fonts = self.fonts.write().expect("font registry lock poisoned");
        if fonts.contains_key(family) {
            return Ok(());
        }
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| Error::Font(format!("unparsable font data for family {family}")))?;
        fonts.insert(family.to_string(), Arc::new(font));
        Ok(())
    }

    /// Look up a registered font by family name.
    pub fn get(&self, family: &str) -> Option<Arc<Font<'static>>> {
        self.fonts
            .read()
            .expect("font registry lock poisoned")
            .get(family)
            .cloned()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts
            .read()
            .expect("font registry lock poisoned")
            .contains_key(family)
    }
}
