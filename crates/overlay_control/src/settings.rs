//! Overlay settings: the persisted defaults file, the in-game settings
//! page, and the shared handle both sides read.

use anyhow::{Context, Result};
use overlay_core::ReconcileConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::palette::TraitPalette;

pub const MIN_RELOAD_DELAY: u32 = 3;
pub const MAX_RELOAD_DELAY: u32 = 20;
pub const DEFAULT_RELOAD_DELAY: u32 = 5;
/// Safety refresh roughly every ten seconds at 60 frames per second.
pub const DEFAULT_REFRESH_INTERVAL_TICKS: u64 = 600;

#[allow(clippy::struct_excessive_bools)] // one toggle per settings-page checkbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Show trait and level without hovering.
    pub always_show: bool,
    /// Icons instead of a text label for the trait.
    pub use_icon: bool,
    pub extended_tooltips: bool,
    /// Highlight the crew member's part while hovering their portrait.
    pub hover_highlight: bool,
    pub transfer_button: bool,
    /// Debounce delay, in ticks, before a reconciliation pass.
    pub reload_delay: u32,
    /// Ticks between unprompted refreshes. 0 disables them.
    pub refresh_interval_ticks: u64,
    pub palette: TraitPalette,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            always_show: true,
            use_icon: true,
            extended_tooltips: true,
            hover_highlight: true,
            transfer_button: true,
            reload_delay: DEFAULT_RELOAD_DELAY,
            refresh_interval_ticks: DEFAULT_REFRESH_INTERVAL_TICKS,
            palette: TraitPalette::default(),
        }
    }
}

impl OverlaySettings {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings file: {}", path.display()))?;
        Ok(settings.sanitized())
    }

    /// Loads `path`, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "settings file not found, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "settings file loaded");
                settings
            }
            Err(err) => {
                warn!("{err:#}; using defaults");
                Self::default()
            }
        }
    }

    /// Writes through a temp file so a crash never leaves half a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating settings directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        let tmp = path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("syncing {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("renaming settings file to {}", path.display()))?;
        Ok(())
    }

    /// Clamps the reload delay into the range the settings page offers.
    pub fn sanitized(mut self) -> Self {
        self.reload_delay = self.reload_delay.clamp(MIN_RELOAD_DELAY, MAX_RELOAD_DELAY);
        self
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig::with_delay(self.reload_delay.clamp(MIN_RELOAD_DELAY, MAX_RELOAD_DELAY))
    }
}

/// One settings value shared by the overlay and the host's settings page.
pub type SharedSettings = Arc<RwLock<OverlaySettings>>;

pub fn shared(settings: OverlaySettings) -> SharedSettings {
    Arc::new(RwLock::new(settings.sanitized()))
}

/// The per-game settings page.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub always_show: bool,
    pub use_icon: bool,
    pub extended_tooltips: bool,
    pub hover_highlight: bool,
    pub transfer_button: bool,
    pub reload_delay: u32,
    /// Also save these choices as the defaults for new games.
    pub use_as_default: bool,
}

impl GameSettings {
    /// A new game starts from the saved defaults.
    pub fn from_defaults(settings: &OverlaySettings) -> Self {
        Self {
            always_show: settings.always_show,
            use_icon: settings.use_icon,
            extended_tooltips: settings.extended_tooltips,
            hover_highlight: settings.hover_highlight,
            transfer_button: settings.transfer_button,
            reload_delay: settings.reload_delay,
            use_as_default: false,
        }
    }
}

/// Copies the game's settings into the shared settings. When the player
/// asked for them to become the defaults, also saves to `defaults_path`.
///
/// Returns whether a file was written.
pub fn apply_game_settings(
    shared: &SharedSettings,
    game: &GameSettings,
    defaults_path: Option<&Path>,
) -> Result<bool> {
    let snapshot = {
        let mut settings = shared.write();
        settings.always_show = game.always_show;
        settings.use_icon = game.use_icon;
        settings.extended_tooltips = game.extended_tooltips;
        settings.hover_highlight = game.hover_highlight;
        settings.transfer_button = game.transfer_button;
        settings.reload_delay = game.reload_delay.clamp(MIN_RELOAD_DELAY, MAX_RELOAD_DELAY);
        settings.clone()
    };

    match defaults_path {
        Some(path) if game.use_as_default => {
            snapshot.save(path)?;
            info!(path = %path.display(), "settings file saved");
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgba;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: OverlaySettings =
            serde_json::from_str(r#"{"use_icon": false, "reload_delay": 8}"#).unwrap();
        assert!(!settings.use_icon);
        assert!(settings.always_show);
        assert_eq!(settings.reload_delay, 8);
        assert_eq!(settings.refresh_interval_ticks, DEFAULT_REFRESH_INTERVAL_TICKS);
        assert_eq!(settings.palette, TraitPalette::default());
    }

    #[test]
    fn reload_delay_is_clamped() {
        let low = OverlaySettings {
            reload_delay: 0,
            ..OverlaySettings::default()
        };
        assert_eq!(low.sanitized().reload_delay, MIN_RELOAD_DELAY);
        let high = OverlaySettings {
            reload_delay: 99,
            ..OverlaySettings::default()
        };
        assert_eq!(high.reconcile_config().delay_ticks, MAX_RELOAD_DELAY);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PluginData").join("settings.json");
        let mut settings = OverlaySettings {
            hover_highlight: false,
            reload_delay: 12,
            ..OverlaySettings::default()
        };
        settings
            .palette
            .traits
            .insert("Botanist".to_string(), Rgba::rgb(1, 2, 3));
        settings.save(&path).unwrap();
        assert_eq!(OverlaySettings::load(&path).unwrap(), settings);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn save_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("PluginData");
        std::fs::write(&blocker, "").unwrap();
        let err = OverlaySettings::default()
            .save(&blocker.join("settings.json"))
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("creating settings directory"), "{msg}");
        assert!(msg.contains("PluginData"), "{msg}");
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(OverlaySettings::load(&path).is_err());
        assert_eq!(OverlaySettings::load_or_default(&path), OverlaySettings::default());
        assert_eq!(
            OverlaySettings::load_or_default(&dir.path().join("absent.json")),
            OverlaySettings::default()
        );
    }

    #[test]
    fn game_settings_apply_without_saving() {
        let shared = shared(OverlaySettings::default());
        let mut game = GameSettings::from_defaults(&shared.read());
        game.use_icon = false;
        game.reload_delay = 1;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(!apply_game_settings(&shared, &game, Some(&path)).unwrap());
        assert!(!path.exists());
        assert!(!shared.read().use_icon);
        assert_eq!(shared.read().reload_delay, MIN_RELOAD_DELAY);
    }

    #[test]
    fn game_settings_saved_as_default() {
        let shared = shared(OverlaySettings::default());
        let mut game = GameSettings::from_defaults(&shared.read());
        game.transfer_button = false;
        game.use_as_default = true;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(apply_game_settings(&shared, &game, Some(&path)).unwrap());
        assert!(!OverlaySettings::load(&path).unwrap().transfer_button);
    }
}
