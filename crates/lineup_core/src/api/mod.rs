pub mod json_api;

pub use json_api::{
    dto_schemas_json, render_json, roster_json, run_command, templates_json, RenderRequest,
    RenderResponse, RosterRequest, RosterResponse, ScriptCommand, StepDirection,
};
