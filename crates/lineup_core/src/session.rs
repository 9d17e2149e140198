//! Presentation Session
//!
//! One open presentation: owns the roster, the playback machine, the reveal
//! tracker and the edit-mode selection, and is the only thing that mutates
//! them. Commands read the session clock; nothing here blocks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::PlaybackConfig;
use crate::dto::ProjectData;
use crate::error::{LineupError, Result};
use crate::i18n::RosterLocalizer;
use crate::playback::{Clock, Millis, PlaybackEvent, PlaybackMachine, PlaybackPhase, PlaybackState};
use crate::render::{render, ItemVisual};
use crate::reveal::{RevealState, RevealTracker};
use crate::roster::{build_roster, Item};
use crate::template::{CatalogEntry, GroupId, Template, TemplateCatalog, TemplateLayout};

/// Everything a view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionSnapshot {
    pub template_id: String,
    pub phase: PlaybackPhase,
    #[serde(flatten)]
    pub playback: PlaybackState,
    pub selected_index: Option<usize>,
    pub edit_mode: bool,
    pub current_group: Option<GroupId>,
    pub group_name: Option<String>,
    pub progress: f32,
    pub reveal: RevealState,
    pub visuals: Vec<ItemVisual>,
}

pub struct PresentationSession {
    template: Template,
    layout: TemplateLayout,
    roster: Vec<Item>,
    localizer: RosterLocalizer,
    machine: PlaybackMachine,
    reveal: RevealTracker,
    edit_mode: bool,
    selected_index: Option<usize>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for PresentationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationSession")
            .field("template", &self.template.id)
            .field("roster_len", &self.roster.len())
            .field("machine", &self.machine)
            .field("reveal", &self.reveal)
            .field("edit_mode", &self.edit_mode)
            .field("selected_index", &self.selected_index)
            .finish()
    }
}

impl PresentationSession {
    pub fn new(
        entry: &CatalogEntry,
        items: &[Item],
        config: &PlaybackConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let localizer = RosterLocalizer::with_builtin(&config.locale)?;
        let roster = build_roster(&entry.template, items, &localizer);
        if roster.len() != entry.layout.len() {
            return Err(LineupError::InvalidTemplate(format!(
                "{}: roster of {} for layout of {}",
                entry.template.id,
                roster.len(),
                entry.layout.len()
            )));
        }

        let machine = PlaybackMachine::new(roster.len(), config.advance_interval_ms, config.resume_policy);
        let mut session = Self {
            template: entry.template.clone(),
            layout: entry.layout.clone(),
            roster,
            localizer,
            machine,
            reveal: RevealTracker::new(),
            edit_mode: false,
            selected_index: None,
            clock,
        };
        session.sync_reveal();

        log::info!(
            "Session opened for {} ({} items, {} supplied)",
            session.template.id,
            session.roster.len(),
            items.len()
        );
        Ok(session)
    }

    pub fn from_project(
        project: &ProjectData,
        catalog: &TemplateCatalog,
        config: &PlaybackConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let entry = catalog.get(&project.template_id)?;
        Self::new(entry, &project.items, config, clock)
    }

    // ========================
    // Commands
    // ========================

    pub fn play(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.play(now));
        self.sync_reveal();
        events
    }

    pub fn pause(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.pause(now));
        self.sync_reveal();
        events
    }

    pub fn resume(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.resume(now));
        self.sync_reveal();
        events
    }

    /// Back to the first item. Due advances fire first so the groups they
    /// reach are recorded as shown.
    pub fn reset(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.reset());
        self.sync_reveal();
        events
    }

    /// Return to the never-played state; clears the reveal sets. No catch-up,
    /// whatever it would reveal is cleared anyway.
    pub fn full_reset(&mut self) -> Vec<PlaybackEvent> {
        let events: Vec<_> = self.machine.full_reset().into_iter().collect();
        self.sync_reveal();
        events
    }

    /// Manual next item
    pub fn step_forward(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.step_forward(now));
        self.sync_reveal();
        events
    }

    /// Manual previous item
    pub fn step_back(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        let mut events = self.catch_up(now);
        events.extend(self.machine.step_back(now));
        self.sync_reveal();
        events
    }

    /// Fire every timer that is due on the session clock
    pub fn tick(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now_ms();
        self.catch_up(now)
    }

    /// View teardown. No advance fires afterwards.
    pub fn teardown(&mut self) -> Vec<PlaybackEvent> {
        self.machine.teardown().into_iter().collect()
    }

    /// Edit-mode selection. Never touches playback or reveal state.
    pub fn select_item(&mut self, index: usize) -> Result<()> {
        if index >= self.roster.len() {
            return Err(LineupError::IndexOutOfRange { index, len: self.roster.len() });
        }
        self.selected_index = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
    }

    /// Signal from the view that the entrance animation for `group` finished
    pub fn animation_completed(&mut self, group: GroupId) -> bool {
        self.reveal.animation_completed(group)
    }

    /// Replace one roster slot, e.g. after an edit was saved
    pub fn update_item(&mut self, index: usize, mut item: Item) -> Result<()> {
        let len = self.roster.len();
        let slot = self.roster.get_mut(index).ok_or(LineupError::IndexOutOfRange { index, len })?;
        item.order = index as i64;
        *slot = item;
        Ok(())
    }

    // ========================
    // Observations
    // ========================

    pub fn state(&self) -> &PlaybackState {
        self.machine.state()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.machine.phase()
    }

    pub fn current_index(&self) -> usize {
        self.machine.state().current_index
    }

    pub fn is_playing(&self) -> bool {
        self.machine.state().is_playing
    }

    pub fn is_paused(&self) -> bool {
        self.machine.state().is_paused
    }

    pub fn has_played_once(&self) -> bool {
        self.machine.state().has_played_once
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn progress(&self) -> f32 {
        self.machine.progress()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    pub fn roster(&self) -> &[Item] {
        &self.roster
    }

    pub fn reveal(&self) -> &RevealTracker {
        &self.reveal
    }

    pub fn machine(&self) -> &PlaybackMachine {
        &self.machine
    }

    pub fn current_item(&self) -> Result<&Item> {
        if self.roster.is_empty() {
            return Err(LineupError::EmptyRoster);
        }
        let index = self.current_index();
        self.roster.get(index).ok_or(LineupError::IndexOutOfRange { index, len: self.roster.len() })
    }

    pub fn current_group(&self) -> Option<GroupId> {
        if self.roster.is_empty() {
            return None;
        }
        self.layout.group_of(self.current_index()).ok()
    }

    /// Localized banner text for the current group
    pub fn group_display_name(&self) -> Option<String> {
        self.current_group().map(|g| self.localizer.group_name(g))
    }

    pub fn visuals(&self) -> Result<Vec<ItemVisual>> {
        render(
            &self.layout,
            &self.roster,
            self.machine.state(),
            &self.reveal,
            self.edit_mode,
            self.selected_index,
        )
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(SessionSnapshot {
            template_id: self.template.id.clone(),
            phase: self.phase(),
            playback: *self.machine.state(),
            selected_index: self.selected_index,
            edit_mode: self.edit_mode,
            current_group: self.current_group(),
            group_name: self.group_display_name(),
            progress: self.progress(),
            reveal: self.reveal.state().clone(),
            visuals: self.visuals()?,
        })
    }

    // Fires one timer at a time so the reveal tracker sees every group the
    // index passes through.
    fn catch_up(&mut self, now: Millis) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.machine.fire_due(now) {
            events.push(event);
            self.sync_reveal();
        }
        events
    }

    fn sync_reveal(&mut self) {
        let group = self.current_group();
        self.reveal.observe(self.machine.state(), group);
    }
}
