//! Presentation Renderer
//!
//! Pure mapping from session state to a target visual per item. Easing and
//! interpolation between targets belong to whatever draws them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::playback::PlaybackState;
use crate::reveal::RevealTracker;
use crate::roster::Item;
use crate::template::TemplateLayout;

/// Focus row center, percent of container
pub const FOCUS_CENTER_X: f32 = 46.0;
pub const FOCUS_Y: f32 = 48.0;
/// Upper bound on gap between neighbours in the focus row
pub const FOCUS_MAX_SPACING: f32 = 22.0;
/// Total width the focus row may spread over
pub const FOCUS_SPREAD: f32 = 55.0;
pub const FOCUS_SCALE: f32 = 2.0;
/// Scale multiplier for the outermost members of a focused group
pub const FOCUS_EDGE_MULTIPLIER: f32 = 0.9;

pub const DIMMED_OPACITY: f32 = 0.6;
pub const SELECTED_SCALE_BOOST: f32 = 1.1;

pub const Z_BASE: u8 = 20;
pub const Z_FOCUS: u8 = 30;
pub const Z_SELECTED: u8 = 50;

/// How a focused item should reach its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntranceMode {
    /// First appearance of the group this run: play the full entrance
    Full,
    /// Already animated (or paused): go straight to the final state
    Settled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemVisual {
    pub id: String,
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub z_order: u8,
    /// False means draw the slot number instead of image and name
    pub show_real_content: bool,
    pub focused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrance: Option<EntranceMode>,
}

/// Near/far scale: items lower on the field are closer and larger
pub fn perspective_scale(y: f32) -> f32 {
    0.7 + (y / 100.0) * 0.5
}

/// X coordinate of member `slot` in a focus row of `group_size`
pub fn focus_row_x(slot: usize, group_size: usize) -> f32 {
    if group_size <= 1 {
        return FOCUS_CENTER_X;
    }
    let gaps = (group_size - 1) as f32;
    let spacing = FOCUS_MAX_SPACING.min(FOCUS_SPREAD / gaps);
    let start = FOCUS_CENTER_X - spacing * gaps / 2.0;
    start + spacing * slot as f32
}

/// Compute the target visual for every roster item, in roster order
pub fn render(
    layout: &TemplateLayout,
    roster: &[Item],
    playback: &PlaybackState,
    reveal: &RevealTracker,
    edit_mode: bool,
    selected_index: Option<usize>,
) -> Result<Vec<ItemVisual>> {
    let session_active = playback.is_playing || playback.has_played_once;
    let current_group = if roster.is_empty() { None } else { Some(layout.group_of(playback.current_index)?) };
    let focus_members = current_group.map(|g| layout.group_members(g)).unwrap_or(0..0);

    roster
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let slot = layout.position_of(index)?;
            let group = layout.group_of(index)?;
            let depth_scale = perspective_scale(slot.y);

            if edit_mode {
                let selected = selected_index == Some(index);
                return Ok(ItemVisual {
                    id: item.id.clone(),
                    index,
                    x: slot.x,
                    y: slot.y,
                    scale: if selected { depth_scale * SELECTED_SCALE_BOOST } else { depth_scale },
                    opacity: 1.0,
                    z_order: if selected { Z_SELECTED } else { Z_BASE },
                    show_real_content: true,
                    focused: false,
                    entrance: None,
                });
            }

            if session_active && current_group == Some(group) {
                let group_size = focus_members.len();
                let member = index - focus_members.start;
                let is_edge = group_size >= 2 && (member == 0 || member == group_size - 1);
                let multiplier = if is_edge { FOCUS_EDGE_MULTIPLIER } else { 1.0 };
                let entrance = if playback.is_running() && !reveal.has_animated(group) {
                    EntranceMode::Full
                } else {
                    EntranceMode::Settled
                };

                return Ok(ItemVisual {
                    id: item.id.clone(),
                    index,
                    x: focus_row_x(member, group_size),
                    y: FOCUS_Y,
                    scale: FOCUS_SCALE * multiplier,
                    opacity: 1.0,
                    z_order: Z_FOCUS,
                    show_real_content: true,
                    focused: true,
                    entrance: Some(entrance),
                });
            }

            Ok(ItemVisual {
                id: item.id.clone(),
                index,
                x: slot.x,
                y: slot.y,
                scale: depth_scale,
                opacity: DIMMED_OPACITY,
                z_order: Z_BASE,
                show_real_content: reveal.has_been_shown(group),
                focused: false,
                entrance: None,
            })
        })
        .collect()
}
