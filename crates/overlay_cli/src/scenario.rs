use anyhow::{bail, Context, Result};
use overlay_control::{CrewRecord, GameSettings, HostSignal};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub ticks: u64,
    /// Visible portrait slots.
    #[serde(default = "default_slots")]
    pub slots: usize,
    /// Settings file, relative to the scenario file.
    #[serde(default)]
    pub settings: Option<PathBuf>,
    /// Icon catalog, relative to the scenario file.
    #[serde(default)]
    pub icon_catalog: Option<PathBuf>,
    #[serde(default)]
    pub crew: Vec<CrewRecord>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_slots() -> usize {
    3
}

/// An action applied right before the frame for `tick` runs.
#[derive(Debug, Deserialize)]
pub struct Step {
    pub tick: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddCrew { crew: CrewRecord },
    RemoveCrew { name: String },
    Signal { signal: HostSignal },
    Scroll { start: usize },
    /// Applies in-game settings, then signals the change.
    ApplySettings { settings: GameSettings },
}

impl Scenario {
    /// Steps in tick order; steps sharing a tick keep file order.
    pub fn ordered_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.tick);
        steps
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let mut scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.name.is_empty() {
        bail!("scenario 'name' must not be empty");
    }
    if scenario.ticks == 0 {
        bail!("scenario 'ticks' must be > 0");
    }
    if scenario.slots == 0 {
        bail!("scenario 'slots' must be > 0");
    }
    let mut names = HashSet::new();
    for crew in &scenario.crew {
        if !names.insert(crew.name.as_str()) {
            bail!("scenario 'crew' lists '{}' twice", crew.name);
        }
    }
    if let Some(step) = scenario.steps.iter().find(|s| s.tick > scenario.ticks) {
        bail!(
            "step at tick {} is past the scenario's {} ticks",
            step.tick,
            scenario.ticks
        );
    }

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    scenario.settings = scenario.settings.map(|p| base.join(p));
    scenario.icon_catalog = scenario.icon_catalog.map(|p| base.join(p));
    Ok(scenario)
}
