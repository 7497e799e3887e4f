//! Per-crew portrait views and the factory that builds them.

use overlay_core::ViewFactory;
use serde::Serialize;
use smallvec::SmallVec;

use crate::host::{CrewHandle, CrewRecord, PartId};
use crate::icons::IconProvider;
use crate::palette::Rgba;
use crate::settings::OverlaySettings;
use crate::tooltip::{experience_tooltip, trait_tooltip, Tooltip};

pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum IconSource {
    /// Icon supplied by the icon provider.
    Provider(String),
    /// The overlay's own trait icon.
    Stock,
    /// Text label instead of an icon.
    Label,
}

/// Auxiliary UI objects owned by a view. They go away with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    TraitIcon,
    LevelBar,
    Tooltip,
    PartHighlight(PartId),
    TransferButton(PartId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewPortraitView {
    pub name: String,
    pub trait_title: String,
    pub level: u8,
    pub color: Rgba,
    pub icon: IconSource,
    /// Trait and level shown without hovering.
    pub pinned: bool,
    pub trait_tooltip: Tooltip,
    pub experience_tooltip: Tooltip,
    pub attachments: SmallVec<[Attachment; 4]>,
}

impl CrewPortraitView {
    pub fn build(crew: &CrewRecord, settings: &OverlaySettings, icons: &dyn IconProvider) -> Self {
        let provided = if icons.is_loaded() {
            icons.trait_icon(&crew.trait_title)
        } else {
            None
        };
        let color = provided
            .and_then(|icon| icon.color)
            .unwrap_or_else(|| settings.palette.color_for(&crew.trait_title));
        let icon = match provided {
            _ if !settings.use_icon => IconSource::Label,
            Some(icon) => IconSource::Provider(icon.icon.clone()),
            None => IconSource::Stock,
        };
        let level = crew.experience_level.min(MAX_LEVEL);

        let mut attachments = SmallVec::new();
        if icon != IconSource::Label {
            attachments.push(Attachment::TraitIcon);
        }
        attachments.push(Attachment::LevelBar);
        attachments.push(Attachment::Tooltip);
        if let Some(part) = crew.part {
            if settings.hover_highlight {
                attachments.push(Attachment::PartHighlight(part));
            }
            if settings.transfer_button {
                attachments.push(Attachment::TransferButton(part));
            }
        }

        Self {
            name: crew.name.clone(),
            trait_title: crew.trait_title.clone(),
            level,
            color,
            icon,
            pinned: settings.always_show,
            trait_tooltip: trait_tooltip(crew, settings.extended_tooltips),
            experience_tooltip: experience_tooltip(crew, level, settings.extended_tooltips),
            attachments,
        }
    }

    /// One-line form used by logs and the scenario driver.
    pub fn summary(&self) -> String {
        format!("{} [{} {}] {}", self.name, self.trait_title, self.level, self.color)
    }
}

/// Builds views from live handles. A handle whose record is gone yields no
/// view; the cache retries it on the next pass.
pub struct PortraitViewFactory<'a> {
    settings: &'a OverlaySettings,
    icons: &'a dyn IconProvider,
}

impl<'a> PortraitViewFactory<'a> {
    pub fn new(settings: &'a OverlaySettings, icons: &'a dyn IconProvider) -> Self {
        Self { settings, icons }
    }
}

impl ViewFactory<CrewHandle, CrewPortraitView> for PortraitViewFactory<'_> {
    fn build(&mut self, source: &CrewHandle) -> Option<CrewPortraitView> {
        let crew = source.upgrade()?;
        Some(CrewPortraitView::build(&crew, self.settings, self.icons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::{CatalogIconProvider, NullIconProvider, TraitIcon};
    use std::rc::Rc;

    fn catalog() -> CatalogIconProvider {
        CatalogIconProvider::from_icons(
            "trait_icons",
            [TraitIcon {
                trait_title: "Pilot".to_string(),
                icon: "icons/pilot.png".to_string(),
                color: Some(Rgba::rgb(1, 2, 3)),
            }],
        )
    }

    #[test]
    fn stock_icon_and_palette_without_provider() {
        let crew = CrewRecord::new("jeb", "Pilot", 3);
        let view = CrewPortraitView::build(&crew, &OverlaySettings::default(), &NullIconProvider);
        assert_eq!(view.icon, IconSource::Stock);
        assert_eq!(view.color, Rgba::rgb(0xdb, 0x58, 0x56));
        assert_eq!(view.level, 3);
        assert!(view.pinned);
    }

    #[test]
    fn provider_icon_and_color_take_precedence() {
        let crew = CrewRecord::new("jeb", "Pilot", 3);
        let view = CrewPortraitView::build(&crew, &OverlaySettings::default(), &catalog());
        assert_eq!(view.icon, IconSource::Provider("icons/pilot.png".to_string()));
        assert_eq!(view.color, Rgba::rgb(1, 2, 3));
    }

    #[derive(Debug)]
    struct Unloaded(CatalogIconProvider);

    impl IconProvider for Unloaded {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn is_loaded(&self) -> bool {
            false
        }

        fn trait_icon(&self, trait_title: &str) -> Option<&TraitIcon> {
            self.0.trait_icon(trait_title)
        }
    }

    #[test]
    fn unloaded_provider_is_not_queried() {
        let crew = CrewRecord::new("jeb", "Pilot", 3);
        let view =
            CrewPortraitView::build(&crew, &OverlaySettings::default(), &Unloaded(catalog()));
        assert_eq!(view.icon, IconSource::Stock);
        assert_eq!(view.color, Rgba::rgb(0xdb, 0x58, 0x56));
    }

    #[test]
    fn empty_catalog_uses_stock_icon() {
        let crew = CrewRecord::new("jeb", "Pilot", 3);
        let empty = CatalogIconProvider::from_icons("trait_icons", Vec::new());
        assert!(!empty.is_loaded());
        let view = CrewPortraitView::build(&crew, &OverlaySettings::default(), &empty);
        assert_eq!(view.icon, IconSource::Stock);
        assert_eq!(view.color, Rgba::rgb(0xdb, 0x58, 0x56));
    }

    #[test]
    fn provider_without_trait_falls_back_to_stock() {
        let crew = CrewRecord::new("bill", "Engineer", 1);
        let view = CrewPortraitView::build(&crew, &OverlaySettings::default(), &catalog());
        assert_eq!(view.icon, IconSource::Stock);
        assert_eq!(view.color, Rgba::rgb(0xd5, 0xb6, 0x0a));
    }

    #[test]
    fn label_mode_drops_trait_icon_attachment() {
        let crew = CrewRecord::new("jeb", "Pilot", 3);
        let settings = OverlaySettings {
            use_icon: false,
            ..OverlaySettings::default()
        };
        let view = CrewPortraitView::build(&crew, &settings, &catalog());
        assert_eq!(view.icon, IconSource::Label);
        assert!(!view.attachments.contains(&Attachment::TraitIcon));
    }

    #[test]
    fn seated_crew_gets_part_attachments() {
        let crew = CrewRecord::new("val", "Pilot", 9).in_part(PartId(7));
        let view = CrewPortraitView::build(&crew, &OverlaySettings::default(), &NullIconProvider);
        assert_eq!(view.level, MAX_LEVEL);
        assert!(view.attachments.contains(&Attachment::PartHighlight(PartId(7))));
        assert!(view.attachments.contains(&Attachment::TransferButton(PartId(7))));

        let settings = OverlaySettings {
            hover_highlight: false,
            transfer_button: false,
            ..OverlaySettings::default()
        };
        let view = CrewPortraitView::build(&crew, &settings, &NullIconProvider);
        assert_eq!(
            view.attachments.as_slice(),
            &[Attachment::TraitIcon, Attachment::LevelBar, Attachment::Tooltip]
        );
    }

    #[test]
    fn factory_skips_dead_handles() {
        let settings = OverlaySettings::default();
        let mut factory = PortraitViewFactory::new(&settings, &NullIconProvider);
        let record = Rc::new(CrewRecord::new("bob", "Scientist", 1));
        let handle = CrewHandle::new(&record);
        assert!(factory.build(&handle).is_some());
        drop(record);
        assert!(factory.build(&handle).is_none());
    }
}
