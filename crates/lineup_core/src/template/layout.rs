// crates/lineup_core/src/template/layout.rs
// Static slot tables and position groups for each template type

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::TemplateType;
use crate::error::{LineupError, Result};

/// Position groups. Soccer groups span several slots, baseball groups are one
/// slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum GroupId {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defence,
    #[serde(rename = "MF")]
    Midfield,
    #[serde(rename = "FW")]
    Forwards,
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
}

impl GroupId {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Goalkeeper => "GK",
            Self::Defence => "DF",
            Self::Midfield => "MF",
            Self::Forwards => "FW",
            Self::Pitcher => "P",
            Self::Catcher => "C",
            Self::FirstBase => "1B",
            Self::SecondBase => "2B",
            Self::ThirdBase => "3B",
            Self::Shortstop => "SS",
            Self::LeftField => "LF",
            Self::CenterField => "CF",
            Self::RightField => "RF",
        }
    }

    /// Fluent message id for the banner shown while this group is in focus
    pub fn message_id(&self) -> &'static str {
        match self {
            Self::Goalkeeper => "group-goalkeeper",
            Self::Defence => "group-defence",
            Self::Midfield => "group-midfield",
            Self::Forwards => "group-forwards",
            Self::Pitcher => "group-pitcher",
            Self::Catcher => "group-catcher",
            Self::FirstBase => "group-first-base",
            Self::SecondBase => "group-second-base",
            Self::ThirdBase => "group-third-base",
            Self::Shortstop => "group-shortstop",
            Self::LeftField => "group-left-field",
            Self::CenterField => "group-center-field",
            Self::RightField => "group-right-field",
        }
    }
}

/// One slot on the field, in percent-of-container coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PositionSlot {
    pub slot: usize,
    pub group: GroupId,
    pub x: f32, // 0.0 = left edge, 100.0 = right edge
    pub y: f32, // 0.0 = far end (top), 100.0 = near end (bottom)
}

impl PositionSlot {
    pub fn new(slot: usize, group: GroupId, x: f32, y: f32) -> Self {
        Self { slot, group, x, y }
    }

    pub fn in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }

    pub fn label(&self) -> &'static str {
        self.group.short_name()
    }
}

/// A group together with the consecutive slot range it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GroupSpan {
    pub group: GroupId,
    pub start: usize,
    pub end: usize,
}

impl GroupSpan {
    pub fn new(group: GroupId, start: usize, end: usize) -> Self {
        Self { group, start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Complete layout for one template type: slot coordinates plus the ordered
/// group partition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateLayout {
    pub template_type: TemplateType,
    pub slots: Vec<PositionSlot>,
    pub group_order: Vec<GroupSpan>,
}

impl TemplateLayout {
    pub fn new(template_type: TemplateType, slots: Vec<PositionSlot>, group_order: Vec<GroupSpan>) -> Self {
        Self { template_type, slots, group_order }
    }

    /// Layout for a template type
    pub fn for_type(template_type: TemplateType) -> TemplateLayout {
        match template_type {
            TemplateType::Soccer => Self::create_soccer(),
            TemplateType::Baseball => Self::create_baseball(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position_of(&self, index: usize) -> Result<&PositionSlot> {
        self.slots.get(index).ok_or(LineupError::IndexOutOfRange { index, len: self.slots.len() })
    }

    pub fn group_of(&self, index: usize) -> Result<GroupId> {
        self.group_order
            .iter()
            .find(|span| span.contains(index))
            .map(|span| span.group)
            .ok_or(LineupError::IndexOutOfRange { index, len: self.slots.len() })
    }

    pub fn span_of(&self, group: GroupId) -> Option<&GroupSpan> {
        self.group_order.iter().find(|span| span.group == group)
    }

    pub fn group_members(&self, group: GroupId) -> Range<usize> {
        self.span_of(group).map(GroupSpan::range).unwrap_or(0..0)
    }

    /// Group spans in presentation order
    pub fn group_order(&self) -> &[GroupSpan] {
        &self.group_order
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.group_order.iter().map(|span| span.group)
    }

    /// Check that the groups partition `[0, expected_len)` in order and that
    /// every slot is tagged with the group that owns its index.
    pub fn validate(&self, expected_len: usize) -> Result<()> {
        if self.slots.len() != expected_len {
            return Err(LineupError::InvalidTemplate(format!(
                "{:?}: {} position slots for {} items",
                self.template_type,
                self.slots.len(),
                expected_len
            )));
        }

        let mut cursor = 0;
        for span in &self.group_order {
            if span.is_empty() {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: group {} is empty",
                    self.template_type,
                    span.group.short_name()
                )));
            }
            if span.start != cursor {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: group {} starts at {} but previous group ended at {}",
                    self.template_type,
                    span.group.short_name(),
                    span.start,
                    cursor
                )));
            }
            cursor = span.end;
        }
        if cursor != expected_len {
            return Err(LineupError::InvalidTemplate(format!(
                "{:?}: groups cover [0, {}) but template has {} items",
                self.template_type, cursor, expected_len
            )));
        }

        for (i, slot) in self.slots.iter().enumerate() {
            if slot.slot != i {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: slot table entry {} is numbered {}",
                    self.template_type, i, slot.slot
                )));
            }
            if !slot.in_bounds() {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: slot {} at ({}, {}) is outside the field",
                    self.template_type, i, slot.x, slot.y
                )));
            }
            let owner = self.group_of(i)?;
            if slot.group != owner {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: slot {} tagged {} but owned by {}",
                    self.template_type,
                    i,
                    slot.group.short_name(),
                    owner.short_name()
                )));
            }
        }

        let mut seen = Vec::with_capacity(self.group_order.len());
        for group in self.groups() {
            if seen.contains(&group) {
                return Err(LineupError::InvalidTemplate(format!(
                    "{:?}: group {} listed twice",
                    self.template_type,
                    group.short_name()
                )));
            }
            seen.push(group);
        }

        Ok(())
    }

    // ============================================================================
    // Layout Definitions
    // ============================================================================

    /// Soccer, perspective pitch: 1 GK, 4 DF, 3 MF, 3 FW
    fn create_soccer() -> TemplateLayout {
        use GroupId::*;
        TemplateLayout::new(
            TemplateType::Soccer,
            vec![
                PositionSlot::new(0, Goalkeeper, 47.5, 15.0),
                PositionSlot::new(1, Defence, 29.0, 30.0),
                PositionSlot::new(2, Defence, 40.5, 30.0),
                PositionSlot::new(3, Defence, 54.0, 30.0),
                PositionSlot::new(4, Defence, 65.5, 30.0),
                PositionSlot::new(5, Midfield, 33.5, 51.0),
                PositionSlot::new(6, Midfield, 47.5, 51.0),
                PositionSlot::new(7, Midfield, 61.0, 51.0),
                PositionSlot::new(8, Forwards, 33.5, 70.0),
                PositionSlot::new(9, Forwards, 47.5, 70.0),
                PositionSlot::new(10, Forwards, 61.0, 70.0),
            ],
            vec![
                GroupSpan::new(Goalkeeper, 0, 1),
                GroupSpan::new(Defence, 1, 5),
                GroupSpan::new(Midfield, 5, 8),
                GroupSpan::new(Forwards, 8, 11),
            ],
        )
    }

    /// Baseball diamond, one group per fielding position
    fn create_baseball() -> TemplateLayout {
        use GroupId::*;
        let slots = vec![
            PositionSlot::new(0, Pitcher, 50.0, 85.0),
            PositionSlot::new(1, Catcher, 55.0, 70.0),
            PositionSlot::new(2, FirstBase, 65.0, 55.0),
            PositionSlot::new(3, SecondBase, 50.0, 40.0),
            PositionSlot::new(4, ThirdBase, 35.0, 55.0),
            PositionSlot::new(5, Shortstop, 42.0, 48.0),
            PositionSlot::new(6, LeftField, 25.0, 25.0),
            PositionSlot::new(7, CenterField, 50.0, 15.0),
            PositionSlot::new(8, RightField, 75.0, 25.0),
        ];
        let group_order = slots.iter().map(|s| GroupSpan::new(s.group, s.slot, s.slot + 1)).collect();
        TemplateLayout::new(TemplateType::Baseball, slots, group_order)
    }
}
