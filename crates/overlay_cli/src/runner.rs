use anyhow::Result;
use overlay_control::{
    apply_game_settings, detect_icon_provider, shared, FrameOutcome, HostGallery, HostSignal,
    OverlayContext, OverlaySettings, OverlayStats, Roster, SharedSettings,
};
use overlay_core::EntityKey;
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

use crate::scenario::{Action, Scenario};

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub ticks: u64,
    pub icon_provider: String,
    pub stats: OverlayStats,
    pub cached: usize,
    pub portraits: Vec<String>,
}

/// Replays `scenario` frame by frame, writing one line per pass and per
/// change of the visible portraits.
pub fn run_scenario(
    scenario: &Scenario,
    print_every: u64,
    out: &mut impl Write,
) -> Result<RunSummary> {
    let settings = shared(match &scenario.settings {
        Some(path) => OverlaySettings::load_or_default(path),
        None => OverlaySettings::default(),
    });
    let icons = detect_icon_provider(scenario.icon_catalog.as_deref());
    let mut ctx = OverlayContext::new(settings.clone(), icons);
    let mut roster = Roster::with_crew(scenario.slots, scenario.crew.iter().cloned());

    writeln!(
        out,
        "Scenario '{}': {} ticks, {} crew, {} slots, icons={}",
        scenario.name,
        scenario.ticks,
        roster.len(),
        roster.visible_slots(),
        ctx.icons().name(),
    )?;

    let steps = scenario.ordered_steps();
    let mut next_step = 0;
    let mut shown_generation = None;

    for tick in 1..=scenario.ticks {
        while let Some(step) = steps.get(next_step).filter(|s| s.tick <= tick) {
            apply_action(&step.action, &mut ctx, &mut roster, &settings);
            next_step += 1;
        }

        let outcome = ctx.update(&roster);
        print_pass(out, &outcome)?;

        let generation = ctx.cache().generation();
        if shown_generation != Some(generation) {
            shown_generation = Some(generation);
            writeln!(out, "[tick={tick:04}] {}", portrait_line(&ctx))?;
        } else if print_every > 0 && tick % print_every == 0 {
            writeln!(
                out,
                "[tick={tick:04}] cached={} pending={}",
                ctx.cache().len(),
                ctx.cache().is_pending()
            )?;
        }
    }

    let summary = RunSummary {
        scenario: scenario.name.clone(),
        ticks: scenario.ticks,
        icon_provider: ctx.icons().name().to_string(),
        stats: ctx.stats().clone(),
        cached: ctx.cache().len(),
        portraits: ctx.visible_portraits().iter().map(|v| v.summary()).collect(),
    };
    info!(
        passes = summary.stats.passes,
        views_built = summary.stats.views_built,
        "scenario finished"
    );
    Ok(summary)
}

fn apply_action(
    action: &Action,
    ctx: &mut OverlayContext,
    roster: &mut Roster,
    settings: &SharedSettings,
) {
    match action {
        Action::AddCrew { crew } => roster.board(crew.clone()),
        Action::RemoveCrew { name } => {
            if !roster.disembark(name) {
                warn!(crew = %name, "remove_crew: no such crew member");
            }
        }
        Action::Signal { signal } => ctx.handle_signal(*signal),
        Action::Scroll { start } => roster.scroll_to(*start),
        Action::ApplySettings { settings: game } => {
            if let Err(err) = apply_game_settings(settings, game, None) {
                warn!("applying settings failed: {err:#}");
            }
            ctx.handle_signal(HostSignal::SettingsApplied);
        }
    }
}

fn print_pass(out: &mut impl Write, outcome: &FrameOutcome) -> Result<()> {
    let Some(pass) = &outcome.pass else {
        return Ok(());
    };
    let evicted: Vec<&str> = pass.evicted.iter().map(EntityKey::as_str).collect();
    writeln!(
        out,
        "[tick={:04}] pass #{} {} evicted=[{}]",
        outcome.tick,
        pass.pass,
        if pass.clean { "clean" } else { "plain" },
        evicted.join(", ")
    )?;
    Ok(())
}

fn portrait_line(ctx: &OverlayContext) -> String {
    if !ctx.camera().shows_overlay() {
        return format!("hidden ({:?} camera)", ctx.camera());
    }
    let portraits: Vec<String> = ctx.visible_portraits().iter().map(|v| v.summary()).collect();
    if portraits.is_empty() {
        "portraits: none".to_string()
    } else {
        format!("portraits: {}", portraits.join(" | "))
    }
}
