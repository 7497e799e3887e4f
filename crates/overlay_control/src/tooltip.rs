//! Tooltip text for portrait icons.

use serde::Serialize;

use crate::host::CrewRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipSection {
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub heading: String,
    pub sections: Vec<TooltipSection>,
}

impl Tooltip {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            sections: Vec::new(),
        }
    }

    /// Adds a section unless `body` is blank.
    fn section(&mut self, title: Option<&str>, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        self.sections.push(TooltipSection {
            title: title.map(ToString::to_string),
            body: body.to_string(),
        });
    }

    /// Rich-text form with `<b>` headings, one block per line.
    pub fn to_rich_text(&self) -> String {
        let mut text = format!("<b>{}</b>", self.heading);
        for section in &self.sections {
            if let Some(title) = &section.title {
                text.push_str(&format!("\n<b>{title}</b>"));
            }
            text.push('\n');
            text.push_str(&section.body);
        }
        text
    }
}

/// Title, description, and (extended) effects of the crew member's trait.
pub fn trait_tooltip(crew: &CrewRecord, extended: bool) -> Tooltip {
    let mut tip = Tooltip::new(&crew.trait_title);
    tip.section(None, &crew.trait_description);
    if extended {
        tip.section(Some("Effects"), &crew.trait_effects);
    }
    tip
}

/// Name and experience level; extended tooltips add the career and current
/// flight logs.
pub fn experience_tooltip(crew: &CrewRecord, level: u8, extended: bool) -> Tooltip {
    let mut tip = Tooltip::new(&crew.name);
    tip.section(None, &format!("Level {level}"));
    if extended {
        tip.section(Some("Career Log:"), &crew.career_log.join("\n"));
        tip.section(Some("Current Flight:"), &crew.flight_log.join("\n"));
    }
    tip
}
