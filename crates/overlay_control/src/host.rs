//! Host-side crew records, the handles the overlay keeps to them, and the
//! gallery seam the overlay reads the current crew from.

use overlay_core::{EntityKey, SourceHandle, DEFAULT_WINDOW_LEN};
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(pub u32);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "part_{}", self.0)
    }
}

/// A crew member as the host knows it. The host owns these; the overlay
/// only holds weak links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewRecord {
    pub name: String,
    #[serde(rename = "trait")]
    pub trait_title: String,
    #[serde(default)]
    pub trait_description: String,
    #[serde(default)]
    pub trait_effects: String,
    #[serde(default)]
    pub experience_level: u8,
    #[serde(default)]
    pub career_log: Vec<String>,
    #[serde(default)]
    pub flight_log: Vec<String>,
    /// The part the crew member is seated in, if any.
    #[serde(default)]
    pub part: Option<PartId>,
}

impl CrewRecord {
    pub fn new(name: &str, trait_title: &str, experience_level: u8) -> Self {
        Self {
            name: name.to_string(),
            trait_title: trait_title.to_string(),
            trait_description: String::new(),
            trait_effects: String::new(),
            experience_level,
            career_log: Vec::new(),
            flight_log: Vec::new(),
            part: None,
        }
    }

    pub fn in_part(mut self, part: PartId) -> Self {
        self.part = Some(part);
        self
    }
}

/// Weak link from a cached view back to its host record.
#[derive(Debug, Clone)]
pub struct CrewHandle {
    key: EntityKey,
    record: Weak<CrewRecord>,
}

impl CrewHandle {
    pub fn new(record: &Rc<CrewRecord>) -> Self {
        Self {
            key: EntityKey(record.name.clone()),
            record: Rc::downgrade(record),
        }
    }

    pub fn upgrade(&self) -> Option<Rc<CrewRecord>> {
        self.record.upgrade()
    }
}

impl SourceHandle for CrewHandle {
    fn key(&self) -> EntityKey {
        self.key.clone()
    }

    fn is_valid(&self) -> bool {
        self.record.strong_count() > 0
    }
}

/// The host's portrait gallery.
pub trait HostGallery {
    /// Crew currently shown, in gallery order.
    fn active_crew(&self) -> Vec<CrewHandle>;

    /// Index of the first visible portrait.
    fn start_index(&self) -> usize;

    fn visible_slots(&self) -> usize {
        DEFAULT_WINDOW_LEN
    }

    /// False while the host is still loading; the overlay then only ticks.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Simple owned gallery: an ordered crew list plus a scroll position.
///
/// Dropping a record from the roster destroys it, which is what makes the
/// overlay's handles go stale.
#[derive(Debug, Default)]
pub struct Roster {
    crew: Vec<Rc<CrewRecord>>,
    start: usize,
    slots: usize,
}

impl Roster {
    pub fn new(slots: usize) -> Self {
        Self {
            crew: Vec::new(),
            start: 0,
            slots,
        }
    }

    pub fn with_crew(slots: usize, crew: impl IntoIterator<Item = CrewRecord>) -> Self {
        let mut roster = Self::new(slots);
        for record in crew {
            roster.board(record);
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.crew.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crew.is_empty()
    }

    /// Adds a crew member at the end of the gallery, replacing any record
    /// with the same name.
    pub fn board(&mut self, record: CrewRecord) {
        self.crew.retain(|c| c.name != record.name);
        self.crew.push(Rc::new(record));
    }

    /// Removes and destroys a crew member. Returns false if unknown.
    pub fn disembark(&mut self, name: &str) -> bool {
        let before = self.crew.len();
        self.crew.retain(|c| c.name != name);
        self.clamp_start();
        self.crew.len() != before
    }

    /// Replaces the whole crew, as when the active vessel changes.
    pub fn replace(&mut self, crew: impl IntoIterator<Item = CrewRecord>) {
        self.crew = crew.into_iter().map(Rc::new).collect();
        self.start = 0;
    }

    pub fn scroll_to(&mut self, start: usize) {
        self.start = start;
        self.clamp_start();
    }

    fn clamp_start(&mut self) {
        let last = self.crew.len().saturating_sub(1);
        self.start = self.start.min(last);
    }
}

impl HostGallery for Roster {
    fn active_crew(&self) -> Vec<CrewHandle> {
        self.crew.iter().map(CrewHandle::new).collect()
    }

    fn start_index(&self) -> usize {
        self.start
    }

    fn visible_slots(&self) -> usize {
        if self.slots == 0 {
            DEFAULT_WINDOW_LEN
        } else {
            self.slots
        }
    }
}
