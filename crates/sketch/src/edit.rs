use foundation::math::{LocalFrame, Vec2, Vec3, ecef_to_geodetic, geodetic_to_ecef};
use scene::entity::EntityId;
use scene::host::{Host, TerrainSampler};
use scene::overlay::{Fill, Marker, MarkerRole, Overlay, Polyline};
use scene::pick::pick_marker;
use scene::style::MarkerStyle;

use crate::events::{DrawEvent, EventOutbox};
use crate::geometry::{
    drag_rectangle_corner, halfway, rectangle_center, rotate_rectangle, wrap_angle_rad,
};
use crate::kind::GeometryKind;
use crate::options::DrawOptions;

/// Pixel radius used to grab vertex and handle markers.
const MARKER_PICK_RADIUS_PX: f64 = 12.0;

/// A persisted geometry bound for reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTarget {
    pub kind: GeometryKind,
    pub positions: Vec<Vec3>,
}

#[derive(Debug, Copy, Clone)]
struct Drag {
    moved: bool,
    kind: DragKind,
}

#[derive(Debug, Copy, Clone)]
enum DragKind {
    Vertex { vertex: usize, promoted: bool },
    Rotate { last_bearing: f64 },
}

/// One edit session over a bound geometry.
///
/// Markers live in a single ordered array: for line/polygon they interleave
/// as vertex, midpoint handle, vertex, ... (polygons append the closing
/// handle), so a marker's logical vertex or segment index is its array
/// position divided by two. Nothing stores an index that could go stale.
#[derive(Debug)]
pub(crate) struct EditSession {
    kind: GeometryKind,
    positions: Vec<Vec3>,
    markers: Vec<EntityId>,
    rotate_handle: Option<EntityId>,
    stroke: Option<EntityId>,
    fill: Option<EntityId>,
    /// Height of a point geometry above the terrain, captured at bind time.
    ground_offset_m: f64,
    drag: Option<Drag>,
    options: DrawOptions,
}

impl EditSession {
    /// Materializes the target's vertices (and handles) as sketch markers.
    ///
    /// Returns `None` for an invalid target: too few vertices for the kind,
    /// or a rectangle without exactly 4 corners.
    pub(crate) fn begin(
        target: EditTarget,
        overlay: &mut Overlay,
        options: &DrawOptions,
        terrain: &dyn TerrainSampler,
    ) -> Option<Self> {
        let EditTarget { kind, positions } = target;
        let valid = match kind {
            GeometryKind::Rectangle => positions.len() == 4,
            _ => positions.len() >= kind.min_points(),
        };
        if !valid {
            return None;
        }

        let ground_offset_m = if kind == GeometryKind::Point {
            let geo = ecef_to_geodetic(positions[0]);
            geo.alt_m - terrain.surface_height(geo.lat_rad, geo.lon_rad)
        } else {
            0.0
        };

        let mut session = Self {
            kind,
            positions,
            markers: Vec::new(),
            rotate_handle: None,
            stroke: None,
            fill: None,
            ground_offset_m,
            drag: None,
            options: options.clone(),
        };

        if kind != GeometryKind::Point {
            let stroke = overlay.spawn();
            overlay.set_polyline(
                stroke,
                Polyline {
                    positions: Vec::new(),
                    style: options.stroke,
                },
            );
            session.stroke = Some(stroke);
        }
        if kind.is_closed() {
            let fill = overlay.spawn();
            overlay.set_fill(
                fill,
                Fill {
                    positions: Vec::new(),
                    style: options.fill,
                },
            );
            session.fill = Some(fill);
        }

        session.rebuild_markers(overlay);
        session.refresh_shape(overlay);
        Some(session)
    }

    pub(crate) fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub(crate) fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub(crate) fn on_left_down(
        &mut self,
        screen: Vec2,
        overlay: &mut Overlay,
        host: &Host<'_>,
        events: &mut EventOutbox,
    ) -> bool {
        let Some(hit) = pick_marker(overlay, screen, host.projector, MARKER_PICK_RADIUS_PX) else {
            return false;
        };

        match hit.role {
            MarkerRole::RotateHandle => {
                let Some(world) = host.picker.pick_surface(screen) else {
                    return false;
                };
                let Some(corners) = self.rectangle_corners() else {
                    return false;
                };
                let frame = LocalFrame::at(ecef_to_geodetic(rectangle_center(&corners)));
                self.drag = Some(Drag {
                    moved: false,
                    kind: DragKind::Rotate {
                        last_bearing: frame.bearing_rad(world),
                    },
                });
            }
            MarkerRole::VirtualHandle => {
                let Some(array_idx) = self.array_index_of(hit.entity) else {
                    return false;
                };
                let Some(segment) = self.segment_of_array(array_idx) else {
                    return false;
                };
                let Some(position) = overlay.marker(hit.entity).map(|m| m.position) else {
                    return false;
                };
                // Promotion: the pressed handle becomes a real vertex and
                // splits into two new handles on either side; the drag then
                // continues as a normal vertex drag.
                self.positions.insert(segment + 1, position);
                self.rebuild_markers(overlay);
                self.refresh_shape(overlay);
                self.drag = Some(Drag {
                    moved: false,
                    kind: DragKind::Vertex {
                        vertex: segment + 1,
                        promoted: true,
                    },
                });
            }
            MarkerRole::Vertex => {
                let Some(array_idx) = self.array_index_of(hit.entity) else {
                    return false;
                };
                let Some(vertex) = self.vertex_of_array(array_idx) else {
                    return false;
                };
                self.drag = Some(Drag {
                    moved: false,
                    kind: DragKind::Vertex {
                        vertex,
                        promoted: false,
                    },
                });
            }
            MarkerRole::Preview => return false,
        }

        events.emit(DrawEvent::PointerDown);
        true
    }

    pub(crate) fn on_mouse_move(
        &mut self,
        screen: Vec2,
        overlay: &mut Overlay,
        host: &Host<'_>,
        _events: &mut EventOutbox,
    ) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(world) = host.picker.pick_surface(screen) else {
            return false;
        };

        let next_kind = match drag.kind {
            DragKind::Vertex { vertex, promoted } => {
                self.move_vertex(vertex, world, overlay, host);
                DragKind::Vertex { vertex, promoted }
            }
            DragKind::Rotate { last_bearing } => {
                let bearing = self.rotate_to(world, last_bearing, overlay);
                DragKind::Rotate {
                    last_bearing: bearing,
                }
            }
        };

        self.drag = Some(Drag {
            moved: true,
            kind: next_kind,
        });
        self.refresh_shape(overlay);
        true
    }

    pub(crate) fn on_left_up(
        &mut self,
        _screen: Vec2,
        overlay: &mut Overlay,
        _host: &Host<'_>,
        events: &mut EventOutbox,
    ) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };

        if !drag.moved {
            if let DragKind::Vertex {
                vertex,
                promoted: false,
            } = drag.kind
            {
                self.try_delete_vertex(vertex, overlay);
            }
        }

        events.emit(DrawEvent::PointerUp);
        true
    }

    fn move_vertex(&mut self, vertex: usize, world: Vec3, overlay: &mut Overlay, host: &Host<'_>) {
        match self.kind {
            GeometryKind::Point => {
                // Preserve the ground offset captured at bind time instead of
                // translating the raw height.
                let geo = ecef_to_geodetic(world);
                let alt = host.terrain.surface_height(geo.lat_rad, geo.lon_rad)
                    + self.ground_offset_m;
                let adjusted = geodetic_to_ecef(geo.with_alt(alt));
                self.positions[0] = adjusted;
                if let Some(&marker) = self.markers.first() {
                    overlay.set_marker_position(marker, adjusted);
                }
            }
            GeometryKind::Rectangle => {
                let Some(corners) = self.rectangle_corners() else {
                    return;
                };
                if vertex >= 4 {
                    return;
                }
                let out = drag_rectangle_corner(&corners, vertex, world, host.projector);
                self.positions = out.to_vec();
                self.update_rectangle_markers(overlay);
            }
            GeometryKind::Line | GeometryKind::Polygon => {
                if vertex >= self.positions.len() {
                    return;
                }
                self.positions[vertex] = world;
                if let Some(&marker) = self.markers.get(vertex * 2) {
                    overlay.set_marker_position(marker, world);
                }
                self.refresh_virtual_positions(overlay);
            }
        }
    }

    fn rotate_to(&mut self, world: Vec3, last_bearing: f64, overlay: &mut Overlay) -> f64 {
        let Some(corners) = self.rectangle_corners() else {
            return last_bearing;
        };
        let center = rectangle_center(&corners);
        let frame = LocalFrame::at(ecef_to_geodetic(center));
        let bearing = frame.bearing_rad(world);
        let delta = wrap_angle_rad(bearing - last_bearing);
        let rotated = rotate_rectangle(&corners, center, delta);
        self.positions = rotated.to_vec();
        self.update_rectangle_markers(overlay);
        bearing
    }

    /// Deletion guard: only line/polygon vertices, and never below the
    /// kind's minimum. A rejected deletion mutates nothing.
    fn try_delete_vertex(&mut self, vertex: usize, overlay: &mut Overlay) -> bool {
        if !matches!(self.kind, GeometryKind::Line | GeometryKind::Polygon) {
            return false;
        }
        if self.positions.len() <= self.kind.min_points() {
            return false;
        }
        if vertex >= self.positions.len() {
            return false;
        }
        self.positions.remove(vertex);
        self.rebuild_markers(overlay);
        self.refresh_shape(overlay);
        true
    }

    /// Despawns and re-materializes all markers from the current positions.
    /// Index bookkeeping cannot go stale because it is derived from array
    /// order on every lookup.
    fn rebuild_markers(&mut self, overlay: &mut Overlay) {
        for &marker in &self.markers {
            overlay.despawn(marker);
        }
        self.markers.clear();
        if let Some(handle) = self.rotate_handle.take() {
            overlay.despawn(handle);
        }

        let positions = self.positions.clone();
        let n = positions.len();
        match self.kind {
            GeometryKind::Point | GeometryKind::Rectangle => {
                for &position in &positions {
                    let id = spawn_marker(
                        overlay,
                        position,
                        self.options.vertex_marker,
                        MarkerRole::Vertex,
                    );
                    self.markers.push(id);
                }
                if self.kind == GeometryKind::Rectangle {
                    if let Some(corners) = self.rectangle_corners() {
                        let id = spawn_marker(
                            overlay,
                            rectangle_center(&corners),
                            self.options.rotate_marker,
                            MarkerRole::RotateHandle,
                        );
                        self.rotate_handle = Some(id);
                    }
                }
            }
            GeometryKind::Line | GeometryKind::Polygon => {
                for (i, &position) in positions.iter().enumerate() {
                    let id = spawn_marker(
                        overlay,
                        position,
                        self.options.vertex_marker,
                        MarkerRole::Vertex,
                    );
                    self.markers.push(id);

                    let has_segment = if self.kind == GeometryKind::Line {
                        i + 1 < n
                    } else {
                        n >= 2
                    };
                    if has_segment {
                        let next = positions[(i + 1) % n];
                        let id = spawn_marker(
                            overlay,
                            halfway(position, next),
                            self.options.virtual_marker,
                            MarkerRole::VirtualHandle,
                        );
                        self.markers.push(id);
                    }
                }
            }
        }
    }

    fn refresh_virtual_positions(&self, overlay: &mut Overlay) {
        if !matches!(self.kind, GeometryKind::Line | GeometryKind::Polygon) {
            return;
        }
        let n = self.positions.len();
        for (array_idx, &entity) in self.markers.iter().enumerate() {
            if array_idx % 2 == 1 {
                let segment = array_idx / 2;
                let next = (segment + 1) % n;
                overlay.set_marker_position(
                    entity,
                    halfway(self.positions[segment], self.positions[next]),
                );
            }
        }
    }

    fn update_rectangle_markers(&self, overlay: &mut Overlay) {
        for (i, &marker) in self.markers.iter().enumerate() {
            if let Some(&position) = self.positions.get(i) {
                overlay.set_marker_position(marker, position);
            }
        }
        if let (Some(handle), Some(corners)) = (self.rotate_handle, self.rectangle_corners()) {
            overlay.set_marker_position(handle, rectangle_center(&corners));
        }
    }

    fn refresh_shape(&self, overlay: &mut Overlay) {
        if let Some(stroke) = self.stroke {
            let mut line = self.positions.clone();
            if self.kind.is_closed() && line.len() >= 3 {
                let first = line[0];
                line.push(first);
            }
            overlay.set_polyline_positions(stroke, line);
        }
        if let Some(fill) = self.fill {
            overlay.set_fill_positions(fill, self.positions.clone());
        }
    }

    fn rectangle_corners(&self) -> Option<[Vec3; 4]> {
        if self.kind != GeometryKind::Rectangle || self.positions.len() != 4 {
            return None;
        }
        Some([
            self.positions[0],
            self.positions[1],
            self.positions[2],
            self.positions[3],
        ])
    }

    fn array_index_of(&self, entity: EntityId) -> Option<usize> {
        self.markers.iter().position(|&m| m == entity)
    }

    fn vertex_of_array(&self, array_idx: usize) -> Option<usize> {
        match self.kind {
            GeometryKind::Point | GeometryKind::Rectangle => Some(array_idx),
            GeometryKind::Line | GeometryKind::Polygon => {
                (array_idx % 2 == 0).then_some(array_idx / 2)
            }
        }
    }

    fn segment_of_array(&self, array_idx: usize) -> Option<usize> {
        match self.kind {
            GeometryKind::Point | GeometryKind::Rectangle => None,
            GeometryKind::Line | GeometryKind::Polygon => {
                (array_idx % 2 == 1).then_some(array_idx / 2)
            }
        }
    }
}

fn spawn_marker(
    overlay: &mut Overlay,
    position: Vec3,
    style: MarkerStyle,
    role: MarkerRole,
) -> EntityId {
    let entity = overlay.spawn();
    overlay.set_marker(
        entity,
        Marker {
            position,
            style,
            role,
        },
    );
    entity
}
