//! `overlay_control` — crew portrait overlay built on `overlay_core`.
//!
//! Maps host signals onto the view cache, builds portrait views with their
//! icons, colors, tooltips, and attachments, and owns the settings the
//! player can change in game.

pub mod context;
pub mod host;
pub mod icons;
pub mod palette;
pub mod settings;
pub mod signals;
pub mod tooltip;
pub mod view;

pub use context::{FrameOutcome, OverlayContext, OverlayStats, PassSummary, PortraitCache};
pub use host::{CrewHandle, CrewRecord, HostGallery, PartId, Roster};
pub use icons::{detect_icon_provider, CatalogIconProvider, IconProvider, NullIconProvider, TraitIcon};
pub use palette::{Rgba, TraitPalette};
pub use settings::{apply_game_settings, shared, GameSettings, OverlaySettings, SharedSettings};
pub use signals::{CameraMode, HostSignal, SignalEffect};
pub use tooltip::Tooltip;
pub use view::{Attachment, CrewPortraitView, IconSource, PortraitViewFactory};
