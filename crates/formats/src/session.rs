//! Recorded sketch sessions.
//!
//! A session file scripts one drawing or edit session end to end: the
//! geometry kind, the screen-to-world pick table, and the ordered input
//! steps. Replaying a session through the scripted host doubles is fully
//! deterministic, which is what the CLI and the scenario fixtures rely on.

use foundation::math::{Geodetic, Vec2, geodetic_to_ecef};
use scene::host::InputEvent;
use scene::scripted::{FlatTerrain, PlanarProjector, ScriptedPicker};
use serde::Deserialize;
use sketch::edit::EditTarget;
use sketch::kind::GeometryKind;

#[derive(Debug)]
pub enum SessionError {
    Json(String),
    UnknownKind(String),
    InvalidStep { index: usize, reason: String },
    InvalidEditTarget { reason: String },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Json(reason) => write!(f, "JSON parse error: {reason}"),
            SessionError::UnknownKind(kind) => write!(f, "unknown geometry kind: {kind}"),
            SessionError::InvalidStep { index, reason } => {
                write!(f, "invalid step at index {index}: {reason}")
            }
            SessionError::InvalidEditTarget { reason } => {
                write!(f, "invalid edit target: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// One replay step: a pointer event, or a control action a UI would drive.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    Input(InputEvent),
    Finish,
    Deactivate,
}

/// A parsed, validated session ready to drive the controller.
#[derive(Debug)]
pub struct Session {
    pub name: Option<String>,
    pub kind: GeometryKind,
    pub min_points_stop: bool,
    pub line_clamp_to_ground: bool,
    pub edit: Option<EditTarget>,
    pub picker: ScriptedPicker,
    pub projector: PlanarProjector,
    pub terrain: FlatTerrain,
    pub steps: Vec<SessionStep>,
}

impl Session {
    pub fn from_json_str(payload: &str) -> Result<Self, SessionError> {
        let file: SessionFile =
            serde_json::from_str(payload).map_err(|e| SessionError::Json(e.to_string()))?;
        Self::from_file(file)
    }

    fn from_file(file: SessionFile) -> Result<Self, SessionError> {
        let kind = GeometryKind::parse(&file.kind)
            .ok_or_else(|| SessionError::UnknownKind(file.kind.clone()))?;

        let mut picker = ScriptedPicker::new(file.pick_tolerance_px);
        for pick in &file.picks {
            picker.insert_geodetic(
                Vec2::new(pick.screen[0], pick.screen[1]),
                Geodetic::from_degrees(pick.lat_deg, pick.lon_deg, pick.alt_m),
            );
        }

        let edit = match file.edit {
            None => None,
            Some(entry) => {
                let positions = entry
                    .positions
                    .iter()
                    .map(|&[lon_deg, lat_deg, alt_m]| {
                        geodetic_to_ecef(Geodetic::from_degrees(lat_deg, lon_deg, alt_m))
                    })
                    .collect::<Vec<_>>();
                if positions.len() < kind.min_points() {
                    return Err(SessionError::InvalidEditTarget {
                        reason: format!(
                            "{} positions for kind {}",
                            positions.len(),
                            kind.display_name()
                        ),
                    });
                }
                Some(EditTarget { kind, positions })
            }
        };

        let mut steps = Vec::with_capacity(file.steps.len());
        for (index, step) in file.steps.iter().enumerate() {
            steps.push(parse_step(index, step)?);
        }

        Ok(Self {
            name: file.name,
            kind,
            min_points_stop: file.min_points_stop,
            line_clamp_to_ground: file.line_clamp_to_ground,
            edit,
            picker,
            projector: PlanarProjector::new(file.projector_px_per_deg),
            terrain: FlatTerrain::new(file.terrain_height_m),
            steps,
        })
    }
}

fn parse_step(index: usize, step: &StepEntry) -> Result<SessionStep, SessionError> {
    let screen = |index: usize| -> Result<Vec2, SessionError> {
        let [x, y] = step.screen.ok_or(SessionError::InvalidStep {
            index,
            reason: "pointer step requires a screen position".to_string(),
        })?;
        Ok(Vec2::new(x, y))
    };

    match step.event.as_str() {
        "left_click" => Ok(SessionStep::Input(InputEvent::LeftClick(screen(index)?))),
        "double_click" => Ok(SessionStep::Input(InputEvent::DoubleClick(screen(index)?))),
        "left_down" => Ok(SessionStep::Input(InputEvent::LeftDown(screen(index)?))),
        "left_up" => Ok(SessionStep::Input(InputEvent::LeftUp(screen(index)?))),
        "mouse_move" => Ok(SessionStep::Input(InputEvent::MouseMove(screen(index)?))),
        "finish" => Ok(SessionStep::Finish),
        "deactivate" => Ok(SessionStep::Deactivate),
        other => Err(SessionError::InvalidStep {
            index,
            reason: format!("unknown event: {other}"),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    name: Option<String>,
    kind: String,
    #[serde(default)]
    min_points_stop: bool,
    #[serde(default)]
    line_clamp_to_ground: bool,
    #[serde(default = "default_pick_tolerance_px")]
    pick_tolerance_px: f64,
    #[serde(default = "default_projector_px_per_deg")]
    projector_px_per_deg: f64,
    #[serde(default)]
    terrain_height_m: f64,
    #[serde(default)]
    edit: Option<EditSpec>,
    #[serde(default)]
    picks: Vec<PickEntry>,
    steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
struct EditSpec {
    /// `[lon_deg, lat_deg, alt_m]` per vertex.
    positions: Vec<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
struct PickEntry {
    screen: [f64; 2],
    lon_deg: f64,
    lat_deg: f64,
    #[serde(default)]
    alt_m: f64,
}

#[derive(Debug, Deserialize)]
struct StepEntry {
    event: String,
    #[serde(default)]
    screen: Option<[f64; 2]>,
}

fn default_pick_tolerance_px() -> f64 {
    2.0
}

fn default_projector_px_per_deg() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionError, SessionStep};
    use pretty_assertions::assert_eq;
    use scene::host::{InputEvent, SurfacePicker};
    use sketch::kind::GeometryKind;

    #[test]
    fn parses_a_minimal_session() {
        let payload = r#"{
            "kind": "line",
            "picks": [
                { "screen": [0.0, 0.0], "lon_deg": 7.0, "lat_deg": 46.0 },
                { "screen": [10.0, 0.0], "lon_deg": 7.1, "lat_deg": 46.0 }
            ],
            "steps": [
                { "event": "left_click", "screen": [0.0, 0.0] },
                { "event": "left_click", "screen": [10.0, 0.0] },
                { "event": "double_click", "screen": [10.0, 0.0] }
            ]
        }"#;

        let session = Session::from_json_str(payload).expect("parses");
        assert_eq!(session.kind, GeometryKind::Line);
        assert_eq!(session.steps.len(), 3);
        assert_eq!(
            session.steps[2],
            SessionStep::Input(InputEvent::DoubleClick(foundation::math::Vec2::new(
                10.0, 0.0
            )))
        );
        assert!(
            session
                .picker
                .pick_surface(foundation::math::Vec2::new(0.0, 0.0))
                .is_some()
        );
    }

    #[test]
    fn control_steps_need_no_screen_position() {
        let payload = r#"{
            "kind": "polygon",
            "steps": [ { "event": "finish" }, { "event": "deactivate" } ]
        }"#;
        let session = Session::from_json_str(payload).expect("parses");
        assert_eq!(
            session.steps,
            vec![SessionStep::Finish, SessionStep::Deactivate]
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let payload = r#"{ "kind": "circle", "steps": [] }"#;
        match Session::from_json_str(payload) {
            Err(SessionError::UnknownKind(kind)) => assert_eq!(kind, "circle"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn pointer_step_without_screen_is_rejected() {
        let payload = r#"{ "kind": "line", "steps": [ { "event": "left_click" } ] }"#;
        match Session::from_json_str(payload) {
            Err(SessionError::InvalidStep { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected InvalidStep, got {other:?}"),
        }
    }

    #[test]
    fn unknown_event_reports_its_index() {
        let payload = r#"{
            "kind": "line",
            "steps": [ { "event": "finish" }, { "event": "wheel", "screen": [0.0, 0.0] } ]
        }"#;
        match Session::from_json_str(payload) {
            Err(SessionError::InvalidStep { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("wheel"));
            }
            other => panic!("expected InvalidStep, got {other:?}"),
        }
    }

    #[test]
    fn edit_target_positions_are_validated_against_the_kind() {
        let payload = r#"{
            "kind": "polygon",
            "edit": { "positions": [[7.0, 46.0, 0.0], [7.1, 46.0, 0.0]] },
            "steps": []
        }"#;
        match Session::from_json_str(payload) {
            Err(SessionError::InvalidEditTarget { .. }) => {}
            other => panic!("expected InvalidEditTarget, got {other:?}"),
        }
    }

    #[test]
    fn edit_target_parses_geodetic_positions() {
        let payload = r#"{
            "kind": "line",
            "edit": { "positions": [[7.0, 46.0, 100.0], [7.1, 46.0, 100.0]] },
            "steps": []
        }"#;
        let session = Session::from_json_str(payload).expect("parses");
        let target = session.edit.expect("edit target");
        assert_eq!(target.kind, GeometryKind::Line);
        assert_eq!(target.positions.len(), 2);
    }
}
