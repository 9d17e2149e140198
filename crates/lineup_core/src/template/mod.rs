// crates/lineup_core/src/template/mod.rs
// Template catalog: slideshow shapes and their static layouts

pub mod layout;

pub use layout::{GroupId, GroupSpan, PositionSlot, TemplateLayout};

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{LineupError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Soccer,
    Baseball,
}

impl TemplateType {
    pub fn item_count(&self) -> usize {
        match self {
            Self::Soccer => 11,
            Self::Baseball => 9,
        }
    }

    pub fn animation_type(&self) -> &'static str {
        match self {
            Self::Soccer => "slide-formation",
            Self::Baseball => "diamond-lineup",
        }
    }
}

/// Slideshow shape as stored alongside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub item_count: usize,
    pub animation_type: String,
}

impl Template {
    pub fn new(id: &str, name: &str, template_type: TemplateType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            template_type,
            item_count: template_type.item_count(),
            animation_type: template_type.animation_type().to_string(),
        }
    }
}

/// Template plus its validated layout
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CatalogEntry {
    pub template: Template,
    pub layout: TemplateLayout,
}

impl CatalogEntry {
    /// Pair a template with its layout, failing if the layout does not cover
    /// exactly `item_count` slots.
    pub fn new(template: Template, layout: TemplateLayout) -> Result<Self> {
        if template.item_count != template.template_type.item_count() {
            return Err(LineupError::InvalidTemplate(format!(
                "{}: item count {} does not match {:?} ({})",
                template.id,
                template.item_count,
                template.template_type,
                template.template_type.item_count()
            )));
        }
        if layout.template_type != template.template_type {
            return Err(LineupError::InvalidTemplate(format!(
                "{}: layout is for {:?}",
                template.id, layout.template_type
            )));
        }
        layout.validate(template.item_count)?;
        Ok(Self { template, layout })
    }
}

/// Read-only set of templates, loaded once per process
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TemplateCatalog {
    entries: Vec<CatalogEntry>,
}

/// Built-in catalog. The tables are static, so a failure here is a build
/// defect and aborts at first use.
pub static TEMPLATE_CATALOG: Lazy<TemplateCatalog> =
    Lazy::new(|| TemplateCatalog::builtin().expect("built-in template catalog must be valid"));

impl TemplateCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.template.id == entry.template.id) {
                return Err(LineupError::InvalidTemplate(format!(
                    "duplicate template id {}",
                    entry.template.id
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn builtin() -> Result<Self> {
        let entries = vec![
            CatalogEntry::new(
                Template::new("soccer", "サッカー", TemplateType::Soccer),
                TemplateLayout::for_type(TemplateType::Soccer),
            )?,
            CatalogEntry::new(
                Template::new("baseball", "野球", TemplateType::Baseball),
                TemplateLayout::for_type(TemplateType::Baseball),
            )?,
        ];
        Self::new(entries)
    }

    pub fn get(&self, template_id: &str) -> Result<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.template.id == template_id)
            .ok_or_else(|| LineupError::UnknownTemplate(template_id.to_string()))
    }

    pub fn by_type(&self, template_type: TemplateType) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.template.template_type == template_type)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.entries.iter().map(|e| &e.template)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
