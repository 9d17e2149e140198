//! # lineup_core - Lineup Introduction Playback Engine
//!
//! Drives a slideshow that introduces a team lineup one member at a time on a
//! formation diagram.
//!
//! ## Features
//! - Tick-driven playback with exactly one pending advance timer
//! - Sticky per-group reveal state across replays
//! - Pure renderer from (layout, roster, playback, reveal) to item visuals
//! - JSON API for view and tooling integration

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod i18n;
pub mod playback;
pub mod render;
pub mod reveal;
pub mod roster;
pub mod session;
pub mod template;
pub mod upload;

// Re-export main API functions
pub use api::{dto_schemas_json, render_json, roster_json, templates_json, ScriptCommand};
pub use error::{LineupError, Result};

pub use config::{load_config_from_env, PlaybackConfig, ResumePolicy};
pub use dto::ProjectData;
pub use i18n::RosterLocalizer;
pub use playback::{Clock, ManualClock, PlaybackEvent, PlaybackMachine, PlaybackPhase, PlaybackState, SystemClock};
pub use render::{render, EntranceMode, ItemVisual};
pub use reveal::{RevealState, RevealTracker};
pub use roster::{build_roster, Item};
pub use session::{PresentationSession, SessionSnapshot};
pub use template::{GroupId, Template, TemplateCatalog, TemplateLayout, TemplateType, TEMPLATE_CATALOG};
pub use upload::{ImagePolicy, UploadError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
