//! The overlay's per-session state and its frame loop.

use overlay_core::{EntityKey, ReconcileReport, ReconciledViewCache, SlotOrder, ViewEntry};
use serde::Serialize;
use tracing::{debug, info};

use crate::host::{CrewHandle, HostGallery};
use crate::icons::IconProvider;
use crate::settings::SharedSettings;
use crate::signals::{CameraMode, HostSignal, SignalEffect};
use crate::view::{CrewPortraitView, PortraitViewFactory};

pub type PortraitCache = ReconciledViewCache<CrewHandle, CrewPortraitView>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlayStats {
    pub signals: u64,
    pub passes: u64,
    pub clean_passes: u64,
    pub rebuilds: u64,
    pub views_built: u64,
    pub views_released: u64,
    pub attachments_released: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: u64,
    pub clean: bool,
    pub evicted: Vec<EntityKey>,
}

/// What one call to [`OverlayContext::update`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub tick: u64,
    pub pass: Option<PassSummary>,
    pub added: Vec<EntityKey>,
    /// The visible portraits were recomputed this frame.
    pub reselected: bool,
}

/// Everything the overlay keeps between frames. One per scene.
#[derive(Debug)]
pub struct OverlayContext {
    cache: PortraitCache,
    icons: Box<dyn IconProvider>,
    settings: SharedSettings,
    camera: CameraMode,
    ticks: u64,
    /// Views were dropped wholesale; rebuild only once the armed pass fires.
    awaiting_rebuild: bool,
    stats: OverlayStats,
}

impl OverlayContext {
    pub fn new(settings: SharedSettings, icons: Box<dyn IconProvider>) -> Self {
        let config = settings.read().reconcile_config();
        info!(
            icons = icons.name(),
            delay_ticks = config.delay_ticks,
            "overlay started"
        );
        Self {
            cache: PortraitCache::new(config),
            icons,
            settings,
            camera: CameraMode::default(),
            ticks: 0,
            awaiting_rebuild: false,
            stats: OverlayStats::default(),
        }
    }

    pub fn cache(&self) -> &PortraitCache {
        &self.cache
    }

    pub fn camera(&self) -> CameraMode {
        self.camera
    }

    pub fn stats(&self) -> &OverlayStats {
        &self.stats
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn icons(&self) -> &dyn IconProvider {
        self.icons.as_ref()
    }

    pub fn handle_signal(&mut self, signal: HostSignal) {
        self.stats.signals += 1;
        if let HostSignal::CameraModeChanged(mode) = signal {
            self.camera = mode;
        }
        debug!(?signal, tick = self.ticks, "host signal");
        match signal.effect() {
            SignalEffect::Reconcile { clean } => self.request(clean),
            SignalEffect::Rebuild => {
                let dropped = self.cache.clear();
                self.stats.rebuilds += 1;
                self.release(dropped);
                self.awaiting_rebuild = true;
                self.request(false);
            }
        }
    }

    /// Advances one frame against the host's gallery.
    pub fn update(&mut self, gallery: &impl HostGallery) -> FrameOutcome {
        self.ticks += 1;
        let mut outcome = FrameOutcome {
            tick: self.ticks,
            ..FrameOutcome::default()
        };

        if let Some(report) = self.cache.tick() {
            self.awaiting_rebuild = false;
            outcome.pass = Some(self.finish_pass(report));
        }

        let interval = self.settings.read().refresh_interval_ticks;
        if interval > 0 && self.ticks % interval == 0 && !self.cache.is_pending() {
            debug!(tick = self.ticks, "periodic refresh");
            self.request(false);
        }

        if !gallery.is_ready() {
            return outcome;
        }

        if self.cache.is_stale() && !self.awaiting_rebuild {
            let settings = self.settings.read();
            let mut factory = PortraitViewFactory::new(&settings, self.icons.as_ref());
            let report = self.cache.observe(gallery.active_crew(), &mut factory);
            if !report.skipped.is_empty() {
                debug!(skipped = ?report.skipped, "crew without a view yet");
            }
            self.stats.views_built += report.added.len() as u64;
            outcome.added = report.added;
        }

        outcome.reselected = self.cache.select_active_subset(
            gallery.start_index(),
            gallery.visible_slots(),
            &SlotOrder::Gallery,
        );
        outcome
    }

    /// Portraits to draw this frame, in slot order. Empty while the camera
    /// hides the overlay.
    pub fn visible_portraits(&self) -> Vec<&CrewPortraitView> {
        if !self.camera.shows_overlay() {
            return Vec::new();
        }
        self.portraits()
    }

    /// The active portraits regardless of camera.
    pub fn portraits(&self) -> Vec<&CrewPortraitView> {
        self.cache.active_views().map(ViewEntry::view).collect()
    }

    fn request(&mut self, clean: bool) {
        let config = self.settings.read().reconcile_config();
        if config != *self.cache.config() {
            self.cache.set_config(config);
        }
        self.cache.request_reconcile(clean);
    }

    fn finish_pass(&mut self, report: ReconcileReport<CrewHandle, CrewPortraitView>) -> PassSummary {
        self.stats.passes += 1;
        if report.clean {
            self.stats.clean_passes += 1;
        }
        let evicted: Vec<EntityKey> = report.evicted.iter().map(|e| e.key().clone()).collect();
        debug!(
            pass = report.pass,
            clean = report.clean,
            evicted = evicted.len(),
            "reconciliation pass"
        );
        self.release(report.evicted);
        PassSummary {
            pass: report.pass,
            clean: report.clean,
            evicted,
        }
    }

    /// Drops views and everything attached to them.
    fn release(&mut self, entries: Vec<ViewEntry<CrewHandle, CrewPortraitView>>) {
        for entry in entries {
            let view = entry.into_view();
            debug!(crew = %view.name, attachments = view.attachments.len(), "view released");
            self.stats.views_released += 1;
            self.stats.attachments_released += view.attachments.len() as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CrewRecord, Roster};
    use crate::icons::NullIconProvider;
    use crate::settings::{shared, OverlaySettings};

    fn context() -> OverlayContext {
        OverlayContext::new(shared(OverlaySettings::default()), Box::new(NullIconProvider))
    }

    fn roster(names: &[&str]) -> Roster {
        Roster::with_crew(3, names.iter().map(|n| CrewRecord::new(n, "Pilot", 1)))
    }

    fn names(ctx: &OverlayContext) -> Vec<String> {
        ctx.visible_portraits().iter().map(|v| v.name.clone()).collect()
    }

    #[test]
    fn first_frame_builds_and_orders_portraits() {
        let mut ctx = context();
        let outcome = ctx.update(&roster(&["a", "b", "c"]));
        assert_eq!(outcome.added.len(), 3);
        assert!(outcome.reselected);
        assert_eq!(names(&ctx), ["a", "c", "b"]);
    }

    #[test]
    fn settled_frames_do_no_work() {
        let mut ctx = context();
        let gallery = roster(&["a", "b"]);
        ctx.update(&gallery);
        let generation = ctx.cache().generation();
        let outcome = ctx.update(&gallery);
        assert!(outcome.added.is_empty());
        assert!(!outcome.reselected);
        assert_eq!(ctx.cache().generation(), generation);
    }

    #[test]
    fn camera_hides_and_restores_portraits() {
        let mut ctx = context();
        ctx.update(&roster(&["a"]));
        ctx.handle_signal(HostSignal::CameraModeChanged(CameraMode::Map));
        assert!(ctx.visible_portraits().is_empty());
        assert_eq!(ctx.portraits().len(), 1);
        ctx.handle_signal(HostSignal::CameraModeChanged(CameraMode::Flight));
        assert_eq!(names(&ctx), ["a"]);
    }

    #[test]
    fn rebuild_releases_everything_at_once() {
        let mut ctx = context();
        ctx.update(&roster(&["a", "b"]));
        ctx.handle_signal(HostSignal::VesselChanged);
        assert!(ctx.cache().is_empty());
        assert!(ctx.cache().is_pending());
        assert_eq!(ctx.stats().views_released, 2);
        assert_eq!(ctx.stats().rebuilds, 1);

        let outcome = ctx.update(&roster(&["a", "b"]));
        assert!(outcome.added.is_empty());
        assert!(ctx.cache().is_empty());
        assert!(ctx.cache().is_pending());
    }

    #[test]
    fn unready_host_only_ticks() {
        struct Loading;
        impl HostGallery for Loading {
            fn active_crew(&self) -> Vec<CrewHandle> {
                panic!("gallery read while loading")
            }
            fn start_index(&self) -> usize {
                0
            }
            fn is_ready(&self) -> bool {
                false
            }
        }
        let mut ctx = context();
        let outcome = ctx.update(&Loading);
        assert_eq!(outcome.tick, 1);
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn periodic_refresh_arms_plain_pass() {
        let settings = OverlaySettings {
            refresh_interval_ticks: 4,
            ..OverlaySettings::default()
        };
        let mut ctx = OverlayContext::new(shared(settings), Box::new(NullIconProvider));
        let gallery = roster(&["a"]);
        for _ in 0..4 {
            ctx.update(&gallery);
        }
        assert!(ctx.cache().is_pending());
        for _ in 0..5 {
            ctx.update(&gallery);
        }
        assert_eq!(ctx.stats().passes, 1);
        assert_eq!(ctx.stats().clean_passes, 0);
    }

    #[test]
    fn reload_delay_follows_settings() {
        let settings = shared(OverlaySettings::default());
        let mut ctx = OverlayContext::new(settings.clone(), Box::new(NullIconProvider));
        settings.write().reload_delay = 10;
        ctx.handle_signal(HostSignal::ContractsUpdated);
        assert_eq!(ctx.cache().config().delay_ticks, 10);
        assert_eq!(ctx.cache().pending().remaining(), Some(10));
    }
}
