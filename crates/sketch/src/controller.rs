use foundation::math::{Vec2, Vec3};
use scene::host::{Host, InputEvent};
use scene::overlay::{Fill, Label, Marker, MarkerRole, Overlay, Polyline};

use crate::edit::{EditSession, EditTarget};
use crate::events::{DrawError, DrawEvent, EventOutbox, StampedEvent};
use crate::geometry::rectanglify;
use crate::kind::GeometryKind;
use crate::measure::{dimension_label, measure_geometry, measure_segments};
use crate::options::DrawOptions;

/// The sketching engine: one stateful controller per host view.
///
/// A controller is constructed once and armed (`activate`) many times; each
/// activation is one drawing or one edit session. All mutation happens
/// synchronously inside `handle_input`, driven by the host's input pass.
/// Results leave through the typed event outbox (`drain_events`); the
/// transient visuals live in the owned [`Overlay`] and are read back by the
/// renderer via snapshot extraction.
#[derive(Debug)]
pub struct DrawController {
    kind: Option<GeometryKind>,
    active: bool,
    options: DrawOptions,

    /// Stop automatically once the kind's minimum vertex count is reached.
    pub min_points_stop: bool,
    /// Drape line strokes onto the terrain instead of absolute heights.
    pub line_clamp_to_ground: bool,

    points: Vec<Vec3>,
    preview: Option<Vec3>,
    distances: Vec<f64>,

    overlay: Overlay,
    vertex_markers: Vec<scene::entity::EntityId>,
    preview_marker: Option<scene::entity::EntityId>,
    stroke_entity: Option<scene::entity::EntityId>,
    fill_entity: Option<scene::entity::EntityId>,
    label_entity: Option<scene::entity::EntityId>,

    edit: Option<EditSession>,
    pending_edit: Option<EditTarget>,

    events: EventOutbox,
    render_requested: bool,
}

impl DrawController {
    pub fn new(options: DrawOptions) -> Self {
        Self {
            kind: None,
            active: false,
            options: options.sanitized(),
            min_points_stop: false,
            line_clamp_to_ground: false,
            points: Vec::new(),
            preview: None,
            distances: Vec::new(),
            overlay: Overlay::new(),
            vertex_markers: Vec::new(),
            preview_marker: None,
            stroke_entity: None,
            fill_entity: None,
            label_entity: None,
            edit: None,
            pending_edit: None,
            events: EventOutbox::new(),
            render_requested: false,
        }
    }

    pub fn set_kind(&mut self, kind: GeometryKind) {
        self.kind = Some(kind);
    }

    pub fn kind(&self) -> Option<GeometryKind> {
        self.kind
    }

    /// Binds an existing geometry for reshaping; takes effect on the next
    /// `activate`, which then enters edit mode instead of create mode.
    pub fn set_edit_target(&mut self, target: EditTarget) {
        self.pending_edit = Some(target);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Committed vertices of the session in progress (live edit positions
    /// while editing).
    pub fn positions(&self) -> &[Vec3] {
        match &self.edit {
            Some(edit) => edit.positions(),
            None => &self.points,
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn events(&self) -> &[StampedEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<StampedEvent> {
        self.events.drain()
    }

    /// True once since the last call if the overlay changed and the host
    /// should re-extract and redraw.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    /// Arms the controller for one session.
    ///
    /// Requires a kind (or a bound edit target, whose kind then wins). An
    /// already-active session is deactivated first; two sessions never
    /// overlap.
    pub fn activate(&mut self, host: &Host<'_>) {
        if self.active {
            self.deactivate();
        }

        if let Some(target) = self.pending_edit.take() {
            let Some(session) =
                EditSession::begin(target, &mut self.overlay, &self.options, host.terrain)
            else {
                return;
            };
            let kind = session.kind();
            self.kind = Some(kind);
            self.edit = Some(session);
            self.active = true;
            self.events.emit(DrawEvent::StateChanged { active: true });
            self.emit_info(kind, true);
            self.render_requested = true;
            return;
        }

        let Some(kind) = self.kind else {
            return;
        };
        self.active = true;
        self.events.emit(DrawEvent::StateChanged { active: true });
        self.emit_info(kind, true);
    }

    /// Disarms the controller and clears the session. Idempotent; emits
    /// `StateChanged` only on an actual transition.
    pub fn deactivate(&mut self) {
        self.clear();
        if self.active {
            self.active = false;
            self.events.emit(DrawEvent::StateChanged { active: false });
        }
    }

    /// Resets points, distances, preview, sketch entities, and any edit
    /// binding. Idempotent and callable with zero active entities; does not
    /// change the armed kind or the active flag.
    pub fn clear(&mut self) {
        self.points.clear();
        self.distances.clear();
        self.preview = None;
        self.vertex_markers.clear();
        self.preview_marker = None;
        self.stroke_entity = None;
        self.fill_entity = None;
        self.label_entity = None;
        self.edit = None;
        self.pending_edit = None;
        self.overlay.clear();
    }

    pub fn handle_input(&mut self, input: InputEvent, host: &Host<'_>) {
        if !self.active {
            return;
        }

        if let Some(edit) = self.edit.as_mut() {
            let mutated = match input {
                InputEvent::LeftDown(screen) => {
                    edit.on_left_down(screen, &mut self.overlay, host, &mut self.events)
                }
                InputEvent::MouseMove(screen) => {
                    edit.on_mouse_move(screen, &mut self.overlay, host, &mut self.events)
                }
                InputEvent::LeftUp(screen) => {
                    edit.on_left_up(screen, &mut self.overlay, host, &mut self.events)
                }
                InputEvent::LeftClick(_) | InputEvent::DoubleClick(_) => false,
            };
            if mutated {
                self.render_requested = true;
            }
            return;
        }

        match input {
            InputEvent::LeftClick(screen) => self.on_left_click(screen, host),
            InputEvent::MouseMove(screen) => self.on_mouse_move(screen, host),
            InputEvent::DoubleClick(_) => self.on_double_click(),
            InputEvent::LeftDown(_) | InputEvent::LeftUp(_) => {}
        }
    }

    /// Forces the finishing path, as a UI "done" button would. In edit mode
    /// this reports the reshaped geometry and ends the session.
    pub fn finish_drawing(&mut self) {
        if !self.active {
            return;
        }
        if let Some(edit) = &self.edit {
            let kind = edit.kind();
            let positions = edit.positions().to_vec();
            self.finish_with(kind, positions);
            return;
        }
        let Some(kind) = self.kind else {
            return;
        };
        self.finish(kind);
    }

    fn on_left_click(&mut self, screen: Vec2, host: &Host<'_>) {
        let Some(kind) = self.kind else {
            return;
        };
        // A click that misses the surface is a routine no-op, not an error.
        let Some(world) = host.picker.pick_surface(screen) else {
            return;
        };

        if self.points.is_empty() {
            self.points.push(world);
            self.create_sketch_entities(kind, world);
            self.events.emit(DrawEvent::Started { kind });
            self.emit_info(kind, true);
            if kind == GeometryKind::Point {
                self.finish(kind);
                return;
            }
        } else {
            let Some(&previous) = self.points.last() else {
                return;
            };
            self.points.push(world);
            self.distances.push(previous.distance(world));
            self.spawn_vertex_marker(world);
            self.emit_info(kind, true);

            let committed = self.points.len();
            let auto_finish = match kind {
                GeometryKind::Rectangle => committed == 3,
                GeometryKind::Line => self.min_points_stop && committed >= 2,
                GeometryKind::Polygon => self.min_points_stop && committed >= 3,
                GeometryKind::Point => false,
            };
            if auto_finish {
                self.finish(kind);
                return;
            }
        }

        self.refresh_preview_shape(kind);
        self.render_requested = true;
    }

    fn on_mouse_move(&mut self, screen: Vec2, host: &Host<'_>) {
        let Some(kind) = self.kind else {
            return;
        };
        let Some(world) = host.picker.pick_surface(screen) else {
            return;
        };
        self.preview = Some(world);
        if self.points.is_empty() {
            return;
        }
        if let Some(marker) = self.preview_marker {
            self.overlay.set_marker_position(marker, world);
        }
        self.refresh_preview_shape(kind);
        self.render_requested = true;
    }

    fn on_double_click(&mut self) {
        let Some(kind) = self.kind else {
            return;
        };
        if self.points.is_empty() {
            return;
        }
        // The double-click position itself is not committed; point and
        // rectangle sessions finish through their own rules.
        if matches!(kind, GeometryKind::Line | GeometryKind::Polygon) {
            self.finish(kind);
        }
    }

    fn finish(&mut self, kind: GeometryKind) {
        if self.points.len() < kind.min_points() {
            self.events.emit(DrawEvent::Failed {
                error: DrawError::NeedMorePoints,
            });
            return;
        }
        let positions = if kind == GeometryKind::Rectangle {
            rectanglify(&self.points)
        } else {
            self.points.clone()
        };
        self.finish_with(kind, positions);
    }

    fn finish_with(&mut self, kind: GeometryKind, positions: Vec<Vec3>) {
        let measurements = measure_geometry(kind, &positions);
        self.events.emit(DrawEvent::Info {
            kind,
            in_progress: false,
            total_length_m: measurements.perimeter_m,
            segments: measurements.segments.clone(),
        });
        self.events.emit(DrawEvent::Ended {
            kind,
            positions,
            measurements,
        });
        self.clear();
        self.active = false;
        self.events.emit(DrawEvent::StateChanged { active: false });
        self.render_requested = true;
    }

    fn emit_info(&mut self, kind: GeometryKind, in_progress: bool) {
        let segments = measure_segments(&self.points);
        let total_length_m = segments.iter().map(|s| s.length_m).sum();
        self.events.emit(DrawEvent::Info {
            kind,
            in_progress,
            total_length_m,
            segments,
        });
    }

    fn create_sketch_entities(&mut self, kind: GeometryKind, first: Vec3) {
        self.spawn_vertex_marker(first);
        if kind == GeometryKind::Point {
            return;
        }

        let stroke = self.overlay.spawn();
        let mut stroke_style = self.options.stroke;
        if kind == GeometryKind::Line {
            stroke_style.clamp_to_ground = self.line_clamp_to_ground;
        }
        self.overlay.set_polyline(
            stroke,
            Polyline {
                positions: Vec::new(),
                style: stroke_style,
            },
        );
        self.stroke_entity = Some(stroke);

        if kind.is_closed() {
            let fill = self.overlay.spawn();
            self.overlay.set_fill(
                fill,
                Fill {
                    positions: Vec::new(),
                    style: self.options.fill,
                },
            );
            self.fill_entity = Some(fill);
        }

        let label = self.overlay.spawn();
        self.overlay.set_label(
            label,
            Label {
                position: first,
                text: String::new(),
                style: self.options.label.clone(),
            },
        );
        self.label_entity = Some(label);

        let preview = self.overlay.spawn();
        self.overlay.set_marker(
            preview,
            Marker {
                position: first,
                style: self.options.preview_marker,
                role: MarkerRole::Preview,
            },
        );
        self.preview_marker = Some(preview);
    }

    fn spawn_vertex_marker(&mut self, position: Vec3) {
        let entity = self.overlay.spawn();
        self.overlay.set_marker(
            entity,
            Marker {
                position,
                style: self.options.vertex_marker,
                role: MarkerRole::Vertex,
            },
        );
        self.vertex_markers.push(entity);
    }

    /// Committed points plus the floating preview point, normalized for
    /// display. `None` hides the preview shape entirely: a rectangle with 3
    /// committed corners plus the floating point would otherwise draw a
    /// confusing unnormalized closing loop.
    fn preview_positions(&self, kind: GeometryKind) -> Option<Vec<Vec3>> {
        let mut positions = self.points.clone();
        if let Some(p) = self.preview {
            positions.push(p);
        }
        if kind == GeometryKind::Rectangle {
            if positions.len() > 3 {
                return None;
            }
            if positions.len() == 3 {
                positions = rectanglify(&positions);
            }
        }
        Some(positions)
    }

    fn refresh_preview_shape(&mut self, kind: GeometryKind) {
        let positions = self.preview_positions(kind);

        if let Some(stroke) = self.stroke_entity {
            let mut line = positions.clone().unwrap_or_default();
            if kind.is_closed() && line.len() >= 3 {
                let first = line[0];
                line.push(first);
            }
            if line.len() < 2 {
                line.clear();
            }
            self.overlay.set_polyline_positions(stroke, line);
        }

        if let Some(fill) = self.fill_entity {
            let ring = match &positions {
                Some(p) if kind.is_closed() && p.len() >= 3 => p.clone(),
                _ => Vec::new(),
            };
            self.overlay.set_fill_positions(fill, ring);
        }

        self.update_label(kind);
    }

    fn update_label(&mut self, kind: GeometryKind) {
        let Some(label) = self.label_entity else {
            return;
        };
        let Some(position) = self.preview.or_else(|| self.points.last().copied()) else {
            return;
        };

        let text = match kind {
            GeometryKind::Rectangle => {
                let mut raw = self.points.clone();
                if let Some(p) = self.preview {
                    raw.push(p);
                }
                if raw.len() == 3 {
                    let corners = rectanglify(&raw);
                    let width = corners[0].distance(corners[1]);
                    let height = corners[1].distance(corners[2]);
                    dimension_label(kind, &[width, height])
                } else {
                    dimension_label(kind, &[])
                }
            }
            GeometryKind::Point => String::new(),
            _ => {
                let mut distances = self.distances.clone();
                if let (Some(last), Some(p)) = (self.points.last(), self.preview) {
                    distances.push(last.distance(p));
                }
                dimension_label(kind, &distances)
            }
        };

        self.overlay.set_label(
            label,
            Label {
                position,
                text,
                style: self.options.label.clone(),
            },
        );
    }
}
