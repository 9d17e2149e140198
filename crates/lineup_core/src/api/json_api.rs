// 라인업 JSON API
use serde::{Deserialize, Serialize};

use crate::config::PlaybackConfig;
use crate::dto::{ApiResponse, CreateItemInput, CreateProjectInput, ImageUploadInput, ProjectData, UpdateItemInput};
use crate::error::LineupError;
use crate::i18n::RosterLocalizer;
use crate::playback::{Clock, ManualClock, Millis, PlaybackEvent};
use crate::roster::{build_roster, Item};
use crate::session::{PresentationSession, SessionSnapshot};
use crate::template::{GroupId, PositionSlot, Template, TEMPLATE_CATALOG};
use crate::SCHEMA_VERSION;

/// Roster request - built from a stored project
#[derive(Debug, Deserialize)]
pub struct RosterRequest {
    pub schema_version: u8,
    pub project: ProjectData,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub schema_version: u8,
    pub template: Template,
    pub items: Vec<RosterSlot>,
}

/// One filled slot with its layout position
#[derive(Debug, Serialize)]
pub struct RosterSlot {
    #[serde(flatten)]
    pub item: Item,
    pub position: PositionSlot,
    pub is_placeholder: bool,
}

/// Scripted playback request, replayed against a simulated clock
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub schema_version: u8,
    pub project: ProjectData,
    #[serde(default)]
    pub config: Option<PlaybackConfig>,
    #[serde(default)]
    pub commands: Vec<ScriptCommand>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptCommand {
    Play,
    Pause,
    Resume,
    Reset,
    FullReset,
    /// Manual previous/next item
    Step { direction: StepDirection },
    /// Advance the simulated clock and fire due timers
    Wait { ms: Millis },
    Select { index: usize },
    EditMode { enabled: bool },
    AnimationCompleted { group: GroupId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Forward,
    Back,
}

#[derive(Debug, Serialize)]
pub struct TimedEvent {
    pub at_ms: Millis,
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub schema_version: u8,
    pub elapsed_ms: Millis,
    pub events: Vec<TimedEvent>,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub schema_version: u8,
    pub templates: Vec<Template>,
}

fn check_version(version: u8) -> Result<(), String> {
    if version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", version));
    }
    Ok(())
}

/// JSON API - template catalog
pub fn templates_json() -> Result<String, String> {
    let response = TemplatesResponse {
        schema_version: SCHEMA_VERSION,
        templates: TEMPLATE_CATALOG.templates().cloned().collect(),
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}

/// JSON API - fill a project's items into a complete roster
pub fn roster_json(request_json: &str) -> Result<String, String> {
    let request: RosterRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;
    check_version(request.schema_version)?;

    let entry = TEMPLATE_CATALOG.get(&request.project.template_id).map_err(|e| e.to_string())?;
    let locale = request.locale.as_deref().unwrap_or(crate::i18n::FALLBACK_LOCALE);
    let localizer = RosterLocalizer::with_builtin(locale).map_err(|e| e.to_string())?;

    let roster = build_roster(&entry.template, &request.project.items, &localizer);
    let items = roster
        .into_iter()
        .zip(&entry.layout.slots)
        .map(|(item, position)| RosterSlot { is_placeholder: item.is_placeholder(), item, position: *position })
        .collect();

    let response = RosterResponse { schema_version: SCHEMA_VERSION, template: entry.template.clone(), items };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}

/// JSON API - replay a command script and return the final frame
pub fn render_json(request_json: &str) -> Result<String, String> {
    let request: RenderRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;
    check_version(request.schema_version)?;

    let config = request.config.unwrap_or_default();
    let clock = ManualClock::new();
    let mut session = PresentationSession::from_project(
        &request.project,
        &TEMPLATE_CATALOG,
        &config,
        Box::new(clock.clone()),
    )
    .map_err(|e| e.to_string())?;

    let mut events = Vec::new();
    for command in &request.commands {
        let fired = run_command(&mut session, &clock, command).map_err(|e| e.to_string())?;
        let at_ms = clock.now_ms();
        events.extend(fired.into_iter().map(|event| TimedEvent { at_ms, event }));
    }

    let snapshot = session.snapshot().map_err(|e| e.to_string())?;
    let response = RenderResponse { schema_version: SCHEMA_VERSION, elapsed_ms: clock.now_ms(), events, snapshot };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}

/// Apply one scripted command to `session`
pub fn run_command(
    session: &mut PresentationSession,
    clock: &ManualClock,
    command: &ScriptCommand,
) -> Result<Vec<PlaybackEvent>, LineupError> {
    let events = match command {
        ScriptCommand::Play => session.play(),
        ScriptCommand::Pause => session.pause(),
        ScriptCommand::Resume => session.resume(),
        ScriptCommand::Reset => session.reset(),
        ScriptCommand::FullReset => session.full_reset(),
        ScriptCommand::Step { direction: StepDirection::Forward } => session.step_forward(),
        ScriptCommand::Step { direction: StepDirection::Back } => session.step_back(),
        ScriptCommand::Wait { ms } => {
            clock.advance(*ms);
            session.tick()
        }
        ScriptCommand::Select { index } => {
            session.select_item(*index)?;
            Vec::new()
        }
        ScriptCommand::EditMode { enabled } => {
            session.set_edit_mode(*enabled);
            Vec::new()
        }
        ScriptCommand::AnimationCompleted { group } => {
            session.animation_completed(*group);
            Vec::new()
        }
    };
    Ok(events)
}

/// JSON schemas of the roster-source DTOs, keyed by type name
pub fn dto_schemas_json() -> Result<String, String> {
    let schemas = serde_json::json!({
        "ProjectData": schemars::schema_for!(ProjectData),
        "CreateProjectInput": schemars::schema_for!(CreateProjectInput),
        "CreateItemInput": schemars::schema_for!(CreateItemInput),
        "UpdateItemInput": schemars::schema_for!(UpdateItemInput),
        "ImageUploadInput": schemars::schema_for!(ImageUploadInput),
        "PlaybackConfig": schemars::schema_for!(PlaybackConfig),
        "SessionSnapshot": schemars::schema_for!(SessionSnapshot),
        "ApiResponse": schemars::schema_for!(ApiResponse<ProjectData>),
    });
    serde_json::to_string_pretty(&schemas).map_err(|e| format!("Failed to serialize schemas: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn project(template_id: &str, items: Value) -> Value {
        json!({
            "id": "5d1f6a52-8f0e-4c1e-9b0f-2f7a3c8d9e10",
            "templateId": template_id,
            "items": items,
            "createdAt": "2026-05-01T09:00:00Z",
            "lastAccessedAt": "2026-05-02T09:00:00Z"
        })
    }

    #[test]
    fn test_templates_json() {
        let response: Value = serde_json::from_str(&templates_json().unwrap()).unwrap();
        assert_eq!(response["schema_version"], 1);
        let templates = response["templates"].as_array().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0]["id"], "soccer");
        assert_eq!(templates[0]["itemCount"], 11);
    }

    #[test]
    fn test_roster_json_backfills() {
        let request = json!({
            "schema_version": 1,
            "project": project("soccer", json!([{"id": "gk", "name": "Keeper", "order": 0}])),
            "locale": "ja-JP"
        });
        let response: Value = serde_json::from_str(&roster_json(&request.to_string()).unwrap()).unwrap();
        let items = response["items"].as_array().unwrap();
        assert_eq!(items.len(), 11);
        assert_eq!(items[0]["id"], "gk");
        assert_eq!(items[0]["is_placeholder"], false);
        assert_eq!(items[0]["position"]["group"], "GK");
        assert_eq!(items[1]["name"], "選手 2");
        assert_eq!(items[1]["is_placeholder"], true);
    }

    #[test]
    fn test_roster_json_errors() {
        let bad_version = json!({"schema_version": 9, "project": project("soccer", json!([]))});
        assert!(roster_json(&bad_version.to_string()).unwrap_err().contains("schema version"));

        let unknown = json!({"schema_version": 1, "project": project("cricket", json!([]))});
        assert!(roster_json(&unknown.to_string()).unwrap_err().contains("cricket"));

        assert!(roster_json("{not json").unwrap_err().starts_with("Invalid request JSON"));
    }

    #[test]
    fn test_render_json_replays_script() {
        let request = json!({
            "schema_version": 1,
            "project": project("soccer", json!([])),
            "commands": [
                {"type": "play"},
                {"type": "animation_completed", "group": "GK"},
                {"type": "wait", "ms": 4000},
                {"type": "pause"},
                {"type": "wait", "ms": 60000}
            ]
        });
        let response: Value = serde_json::from_str(&render_json(&request.to_string()).unwrap()).unwrap();
        assert_eq!(response["elapsed_ms"], 64000);

        let events = response["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["event"], "started");
        assert_eq!(events[1]["event"], "advanced");
        assert_eq!(events[1]["at_ms"], 4000);
        assert_eq!(events[2]["event"], "paused");

        let snapshot = &response["snapshot"];
        assert_eq!(snapshot["phase"], "paused");
        assert_eq!(snapshot["current_index"], 1);
        assert_eq!(snapshot["current_group"], "DF");
        assert_eq!(snapshot["reveal"]["animated_groups"], json!(["GK"]));
    }

    #[test]
    fn test_render_json_manual_steps() {
        let request = json!({
            "schema_version": 1,
            "project": project("baseball", json!([])),
            "commands": [
                {"type": "step", "direction": "back"},
                {"type": "play"},
                {"type": "step", "direction": "forward"},
                {"type": "step", "direction": "forward"},
                {"type": "step", "direction": "back"}
            ]
        });
        let response: Value = serde_json::from_str(&render_json(&request.to_string()).unwrap()).unwrap();
        let events = response["events"].as_array().unwrap();
        // The first back step is clamped at index 0 and emits nothing
        assert_eq!(events.len(), 4);
        assert_eq!(events[1]["event"], "stepped");
        assert_eq!(events[3]["from"], 2);
        assert_eq!(events[3]["to"], 1);
        assert_eq!(response["snapshot"]["current_index"], 1);
        assert_eq!(response["snapshot"]["reveal"]["shown_groups"], json!(["P", "C", "1B"]));
    }

    #[test]
    fn test_render_json_select_out_of_range() {
        let request = json!({
            "schema_version": 1,
            "project": project("baseball", json!([])),
            "commands": [{"type": "edit_mode", "enabled": true}, {"type": "select", "index": 9}]
        });
        let err = render_json(&request.to_string()).unwrap_err();
        assert!(err.contains("out of range"), "{}", err);
    }

    #[test]
    fn test_render_json_rejects_bad_config() {
        let request = json!({
            "schema_version": 1,
            "project": project("soccer", json!([])),
            "config": {"advance_interval_ms": 10}
        });
        assert!(render_json(&request.to_string()).is_err());
    }

    #[test]
    fn test_dto_schemas_json() {
        let schemas: Value = serde_json::from_str(&dto_schemas_json().unwrap()).unwrap();
        assert!(schemas["ProjectData"]["properties"]["templateId"].is_object());
        assert!(schemas["CreateItemInput"]["properties"]["order"].is_object());
    }
}
