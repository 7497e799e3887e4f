//! Host change signals and what each one asks of the view cache.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Flight,
    External,
    Map,
    Internal,
    Iva,
}

impl CameraMode {
    /// Portraits are hidden by the host in map and interior views.
    pub fn shows_overlay(self) -> bool {
        matches!(self, Self::Flight | Self::External)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "mode", rename_all = "snake_case")]
pub enum HostSignal {
    /// Parts were added, removed, or destroyed on the active vessel.
    VesselModified,
    /// Control switched to a different vessel.
    VesselChanged,
    CameraModeChanged(CameraMode),
    CrewTransferred,
    ContractsUpdated,
    /// The scene was reloaded; every host object was recreated.
    SceneReplaced,
    SettingsApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEffect {
    /// Debounced pass; `clean` prunes views of departed crew.
    Reconcile { clean: bool },
    /// Drop every view now, then rebuild after the debounce.
    Rebuild,
}

impl HostSignal {
    pub fn effect(self) -> SignalEffect {
        match self {
            Self::VesselModified | Self::CrewTransferred => SignalEffect::Reconcile { clean: true },
            Self::CameraModeChanged(_) | Self::ContractsUpdated => {
                SignalEffect::Reconcile { clean: false }
            }
            Self::VesselChanged | Self::SceneReplaced | Self::SettingsApplied => {
                SignalEffect::Rebuild
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_changes_request_clean_pass() {
        assert_eq!(
            HostSignal::CrewTransferred.effect(),
            SignalEffect::Reconcile { clean: true }
        );
        assert_eq!(
            HostSignal::VesselModified.effect(),
            SignalEffect::Reconcile { clean: true }
        );
    }

    #[test]
    fn layout_changes_request_plain_pass() {
        assert_eq!(
            HostSignal::CameraModeChanged(CameraMode::Map).effect(),
            SignalEffect::Reconcile { clean: false }
        );
        assert_eq!(
            HostSignal::ContractsUpdated.effect(),
            SignalEffect::Reconcile { clean: false }
        );
    }

    #[test]
    fn identity_changes_rebuild() {
        assert_eq!(HostSignal::VesselChanged.effect(), SignalEffect::Rebuild);
        assert_eq!(HostSignal::SceneReplaced.effect(), SignalEffect::Rebuild);
    }

    #[test]
    fn camera_visibility() {
        assert!(CameraMode::Flight.shows_overlay());
        assert!(CameraMode::External.shows_overlay());
        assert!(!CameraMode::Map.shows_overlay());
        assert!(!CameraMode::Iva.shows_overlay());
        assert!(!CameraMode::Internal.shows_overlay());
    }

    #[test]
    fn signals_parse_from_json() {
        let signal: HostSignal =
            serde_json::from_str(r#"{"signal": "camera_mode_changed", "mode": "map"}"#).unwrap();
        assert_eq!(signal, HostSignal::CameraModeChanged(CameraMode::Map));
        let signal: HostSignal = serde_json::from_str(r#"{"signal": "crew_transferred"}"#).unwrap();
        assert_eq!(signal, HostSignal::CrewTransferred);
    }
}
