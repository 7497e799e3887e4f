//! Optional trait-icon capability.
//!
//! Another addon may ship its own trait icons and colors. Whether it is
//! there is decided once at startup: [`detect_icon_provider`] hands back a
//! catalog-backed provider when the addon's catalog is readable and a null
//! provider otherwise. Nothing downstream checks which one it got.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::palette::Rgba;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitIcon {
    #[serde(rename = "trait")]
    pub trait_title: String,
    /// Resource path of the icon, opaque to the overlay.
    pub icon: String,
    #[serde(default)]
    pub color: Option<Rgba>,
}

pub trait IconProvider: std::fmt::Debug {
    fn name(&self) -> &str;

    /// Whether the provider has finished loading its icons.
    fn is_loaded(&self) -> bool;

    fn trait_icon(&self, trait_title: &str) -> Option<&TraitIcon>;
}

/// Stands in when no icon addon is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIconProvider;

impl IconProvider for NullIconProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn is_loaded(&self) -> bool {
        false
    }

    fn trait_icon(&self, _trait_title: &str) -> Option<&TraitIcon> {
        None
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    provider: String,
    #[serde(default)]
    version: String,
    traits: Vec<TraitIcon>,
}

/// Icons read from the addon's JSON catalog.
#[derive(Debug, Clone)]
pub struct CatalogIconProvider {
    provider: String,
    version: String,
    icons: HashMap<String, TraitIcon>,
}

impl CatalogIconProvider {
    pub fn from_icons(provider: &str, icons: impl IntoIterator<Item = TraitIcon>) -> Self {
        Self {
            provider: provider.to_string(),
            version: String::new(),
            icons: icons
                .into_iter()
                .map(|icon| (icon.trait_title.clone(), icon))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading icon catalog: {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&json)
            .with_context(|| format!("parsing icon catalog: {}", path.display()))?;
        let mut catalog = Self::from_icons(&file.provider, file.traits);
        catalog.version = file.version;
        Ok(catalog)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl IconProvider for CatalogIconProvider {
    fn name(&self) -> &str {
        &self.provider
    }

    fn is_loaded(&self) -> bool {
        !self.icons.is_empty()
    }

    fn trait_icon(&self, trait_title: &str) -> Option<&TraitIcon> {
        self.icons.get(trait_title)
    }
}

/// Picks the icon provider for this session. Never fails: a missing or
/// unreadable catalog falls back to [`NullIconProvider`].
pub fn detect_icon_provider(catalog: Option<&Path>) -> Box<dyn IconProvider> {
    let Some(path) = catalog else {
        debug!("no icon catalog configured");
        return Box::new(NullIconProvider);
    };
    if !path.exists() {
        info!(path = %path.display(), "icon catalog not found, using stock icons");
        return Box::new(NullIconProvider);
    }
    match CatalogIconProvider::load(path) {
        Ok(catalog) => {
            info!(
                provider = catalog.name(),
                version = catalog.version(),
                traits = catalog.len(),
                "icon provider found"
            );
            Box::new(catalog)
        }
        Err(err) => {
            warn!("unable to load icon catalog: {err:#}");
            Box::new(NullIconProvider)
        }
    }
}
