//! Group Reveal Tracker
//!
//! Remembers which groups have been in focus and which have finished their
//! entrance animation. Both sets only grow until the session goes back to the
//! never-played state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::playback::PlaybackState;
use crate::template::GroupId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RevealState {
    pub shown_groups: BTreeSet<GroupId>,
    pub animated_groups: BTreeSet<GroupId>,
}

#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    state: RevealState,
    current_group: Option<GroupId>,
    is_active: bool,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest playback state. Call after every transition and after
    /// every individual timer fire so no group is skipped.
    pub fn observe(&mut self, playback: &PlaybackState, current_group: Option<GroupId>) {
        self.current_group = current_group;
        self.is_active = playback.is_playing || playback.has_played_once;

        if !playback.is_playing && !playback.has_played_once {
            if !self.state.shown_groups.is_empty() || !self.state.animated_groups.is_empty() {
                log::debug!("Clearing reveal state");
            }
            self.state.shown_groups.clear();
            self.state.animated_groups.clear();
            return;
        }

        if playback.is_running() {
            if let Some(group) = current_group {
                if self.state.shown_groups.insert(group) {
                    log::debug!("Group {} revealed", group.short_name());
                }
            }
        }
    }

    /// The view finished the entrance animation for `group`. Only accepted for
    /// the current group of an active session.
    pub fn animation_completed(&mut self, group: GroupId) -> bool {
        if !self.is_active || self.current_group != Some(group) {
            log::warn!(
                "Ignoring animation completion for {} (current {:?}, active {})",
                group.short_name(),
                self.current_group.map(|g| g.short_name()),
                self.is_active
            );
            return false;
        }
        self.state.animated_groups.insert(group)
    }

    pub fn has_been_shown(&self, group: GroupId) -> bool {
        self.state.shown_groups.contains(&group)
    }

    pub fn has_animated(&self, group: GroupId) -> bool {
        self.state.animated_groups.contains(&group)
    }

    pub fn is_current_group(&self, group: GroupId) -> bool {
        self.current_group == Some(group)
    }

    pub fn current_group(&self) -> Option<GroupId> {
        self.current_group
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }
}
