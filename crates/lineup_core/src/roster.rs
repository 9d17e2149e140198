//! Roster construction
//!
//! Turns whatever the roster source returned into an order-complete list with
//! exactly one item per template slot.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::i18n::RosterLocalizer;
use crate::template::Template;

/// Ids with this prefix belong to items the roster source has not stored yet
pub const TEMP_ID_PREFIX: &str = "temp-";
pub const PLACEHOLDER_ID_PREFIX: &str = "placeholder-";

/// One entry in the lineup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Empty means no image
    #[serde(default)]
    pub image_url: String,
    pub order: i64,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image_url: String::new(),
            order,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Unsaved item with a fresh `temp-` id
    pub fn temporary(order: i64) -> Self {
        Self::new(format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4()), "", order)
    }

    pub fn placeholder(index: usize, name: String) -> Self {
        Self::new(format!("{}{}", PLACEHOLDER_ID_PREFIX, index), name, index as i64)
    }

    pub fn is_temporary(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_ID_PREFIX)
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}

/// Build the order-complete roster for `template`.
///
/// Slot `i` takes the first supplied item with `order == i`; empty slots get a
/// placeholder. Items with an order outside the template are dropped.
pub fn build_roster(template: &Template, items: &[Item], localizer: &RosterLocalizer) -> Vec<Item> {
    let n = template.item_count;
    let mut slots: Vec<Option<&Item>> = vec![None; n];

    for item in items {
        let slot = usize::try_from(item.order).ok().filter(|&i| i < n);
        match slot {
            Some(i) if slots[i].is_none() => slots[i] = Some(item),
            Some(i) => log::warn!(
                "Item {} duplicates order {} in {} roster, keeping {}",
                item.id,
                i,
                template.id,
                slots[i].map(|kept| kept.id.as_str()).unwrap_or_default()
            ),
            None => log::warn!(
                "Item {} has order {} outside {} roster of {}",
                item.id,
                item.order,
                template.id,
                n
            ),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| match slot {
            Some(item) => item.clone(),
            None => Item::placeholder(i, localizer.placeholder_name(i)),
        })
        .collect()
}
