use std::env;
use std::fs;

use foundation::math::{Vec3, ecef_to_geodetic};
use formats::{Session, SessionStep};
use scene::host::Host;
use serde_json::{Value, json};
use sketch::measure::SegmentMeasure;
use sketch::{DrawController, DrawEvent, DrawOptions, StampedEvent};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "replay" => cmd_replay(args),
        _ => Err(usage()),
    }
}

/// Replays a recorded session through the scripted host doubles and prints
/// every emitted event as one JSON line on stdout.
fn cmd_replay(args: Vec<String>) -> Result<(), String> {
    // terramark replay <session.json>
    if args.len() != 1 {
        return Err(usage());
    }
    let path = &args[0];
    let payload = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    let session =
        Session::from_json_str(&payload).map_err(|e| format!("failed to parse {path}: {e}"))?;

    let mut controller = DrawController::new(DrawOptions::default());
    controller.set_kind(session.kind);
    controller.min_points_stop = session.min_points_stop;
    controller.line_clamp_to_ground = session.line_clamp_to_ground;
    if let Some(target) = session.edit.clone() {
        controller.set_edit_target(target);
    }

    let host = Host {
        picker: &session.picker,
        projector: &session.projector,
        terrain: &session.terrain,
    };

    controller.activate(&host);
    print_events(controller.drain_events());

    for step in &session.steps {
        match step {
            SessionStep::Input(input) => controller.handle_input(*input, &host),
            SessionStep::Finish => controller.finish_drawing(),
            SessionStep::Deactivate => controller.deactivate(),
        }
        print_events(controller.drain_events());
    }

    Ok(())
}

fn print_events(events: Vec<StampedEvent>) {
    for event in events {
        println!("{}", event_value(&event));
    }
}

fn event_value(stamped: &StampedEvent) -> Value {
    let (name, data) = match &stamped.event {
        DrawEvent::Info {
            kind,
            in_progress,
            total_length_m,
            segments,
        } => (
            "info",
            json!({
                "kind": kind.display_name(),
                "in_progress": in_progress,
                "total_length_m": total_length_m,
                "segments": segments.iter().map(segment_value).collect::<Vec<_>>(),
            }),
        ),
        DrawEvent::Started { kind } => ("started", json!({ "kind": kind.display_name() })),
        DrawEvent::Ended {
            kind,
            positions,
            measurements,
        } => (
            "ended",
            json!({
                "kind": kind.display_name(),
                "positions": positions.iter().map(|p| position_value(*p)).collect::<Vec<_>>(),
                "perimeter_m": measurements.perimeter_m,
                "area_m2": measurements.area_m2,
                "segments": measurements.segments.iter().map(segment_value).collect::<Vec<_>>(),
            }),
        ),
        DrawEvent::Failed { error } => ("failed", json!({ "error": error.to_string() })),
        DrawEvent::StateChanged { active } => ("statechanged", json!({ "active": active })),
        DrawEvent::PointerDown => ("pointerdown", json!({})),
        DrawEvent::PointerUp => ("pointerup", json!({})),
    };
    json!({ "seq": stamped.seq, "event": name, "data": data })
}

fn segment_value(segment: &SegmentMeasure) -> Value {
    json!({
        "length_m": segment.length_m,
        "east_m": segment.east_m,
        "north_m": segment.north_m,
        "height_m": segment.height_m,
    })
}

/// Positions print as `[lon_deg, lat_deg, alt_m]`, matching the session
/// file's own convention.
fn position_value(position: Vec3) -> Value {
    let geo = ecef_to_geodetic(position);
    json!([geo.lon_deg(), geo.lat_deg(), geo.alt_m])
}

fn usage() -> String {
    [
        "usage:",
        "  terramark replay <session.json>",
        "",
        "Replays a recorded sketch session and prints emitted events as JSON lines.",
        "Sample sessions live in crates/tools/sessions/.",
    ]
    .join("\n")
}
