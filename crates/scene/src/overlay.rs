use foundation::handles::Handle;
use foundation::math::Vec3;

use crate::entity::EntityId;
use crate::style::{FillStyle, LabelStyle, MarkerStyle, PolylineStyle};

/// What a marker stands for in the sketch interaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    /// A committed vertex of the sketched geometry.
    Vertex,
    /// Synthetic midpoint handle offered as an insertion target.
    VirtualHandle,
    /// Rotation handle at a rectangle's center.
    RotateHandle,
    /// The floating point tracking the cursor; never pickable.
    Preview,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub style: MarkerStyle,
    pub role: MarkerRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub positions: Vec<Vec3>,
    pub style: PolylineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub positions: Vec<Vec3>,
    pub style: FillStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub position: Vec3,
    pub text: String,
    pub style: LabelStyle,
}

/// Dense store for the transient sketch visuals of one drawing/edit session.
///
/// Entities are addressed by generational id; `clear` bumps the generation so
/// ids from a previous session can never reach the new session's components.
///
/// Ordering contract:
/// - All iteration methods yield entities in ascending `EntityId::index()`.
#[derive(Debug, Default)]
pub struct Overlay {
    next_index: u32,
    generation: u32,
    markers: Vec<Option<Marker>>,
    polylines: Vec<Option<Polyline>>,
    fills: Vec<Option<Fill>>,
    labels: Vec<Option<Label>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, self.generation));
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        id
    }

    pub fn set_marker(&mut self, entity: EntityId, marker: Marker) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        self.markers[idx] = Some(marker);
    }

    pub fn set_marker_position(&mut self, entity: EntityId, position: Vec3) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        if let Some(marker) = self.markers[idx].as_mut() {
            marker.position = position;
        }
    }

    pub fn marker(&self, entity: EntityId) -> Option<&Marker> {
        let idx = self.live_index(entity)?;
        self.markers[idx].as_ref()
    }

    pub fn set_polyline(&mut self, entity: EntityId, polyline: Polyline) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        self.polylines[idx] = Some(polyline);
    }

    pub fn set_polyline_positions(&mut self, entity: EntityId, positions: Vec<Vec3>) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        if let Some(polyline) = self.polylines[idx].as_mut() {
            polyline.positions = positions;
        }
    }

    pub fn polyline(&self, entity: EntityId) -> Option<&Polyline> {
        let idx = self.live_index(entity)?;
        self.polylines[idx].as_ref()
    }

    pub fn set_fill(&mut self, entity: EntityId, fill: Fill) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        self.fills[idx] = Some(fill);
    }

    pub fn set_fill_positions(&mut self, entity: EntityId, positions: Vec<Vec3>) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        if let Some(fill) = self.fills[idx].as_mut() {
            fill.positions = positions;
        }
    }

    pub fn fill(&self, entity: EntityId) -> Option<&Fill> {
        let idx = self.live_index(entity)?;
        self.fills[idx].as_ref()
    }

    pub fn set_label(&mut self, entity: EntityId, label: Label) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        self.labels[idx] = Some(label);
    }

    pub fn label(&self, entity: EntityId) -> Option<&Label> {
        let idx = self.live_index(entity)?;
        self.labels[idx].as_ref()
    }

    /// Removes every component attached to `entity`. Stale ids are a no-op.
    pub fn despawn(&mut self, entity: EntityId) {
        let Some(idx) = self.live_index(entity) else {
            return;
        };
        self.markers[idx] = None;
        self.polylines[idx] = None;
        self.fills[idx] = None;
        self.labels[idx] = None;
    }

    /// Drops all entities and invalidates every outstanding id.
    ///
    /// Idempotent; safe to call with zero live entities.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.polylines.clear();
        self.fills.clear();
        self.labels.clear();
        self.next_index = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_empty(&self) -> bool {
        self.markers.iter().all(Option::is_none)
            && self.polylines.iter().all(Option::is_none)
            && self.fills.iter().all(Option::is_none)
            && self.labels.iter().all(Option::is_none)
    }

    pub fn markers(&self) -> impl Iterator<Item = (EntityId, &Marker)> {
        self.markers
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| Some((self.id_at(idx), m.as_ref()?)))
    }

    pub fn polylines(&self) -> impl Iterator<Item = (EntityId, &Polyline)> {
        self.polylines
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| Some((self.id_at(idx), p.as_ref()?)))
    }

    pub fn fills(&self) -> impl Iterator<Item = (EntityId, &Fill)> {
        self.fills
            .iter()
            .enumerate()
            .filter_map(|(idx, f)| Some((self.id_at(idx), f.as_ref()?)))
    }

    pub fn labels(&self) -> impl Iterator<Item = (EntityId, &Label)> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(idx, l)| Some((self.id_at(idx), l.as_ref()?)))
    }

    fn id_at(&self, idx: usize) -> EntityId {
        EntityId(Handle::new(idx as u32, self.generation))
    }

    fn live_index(&self, entity: EntityId) -> Option<usize> {
        if entity.generation() != self.generation {
            return None;
        }
        let idx = entity.index() as usize;
        if idx >= self.markers.len() {
            return None;
        }
        Some(idx)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.markers.len() <= idx {
            self.markers.resize(idx + 1, None);
            self.polylines.resize_with(idx + 1, || None);
            self.fills.resize_with(idx + 1, || None);
            self.labels.resize_with(idx + 1, || None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Marker, MarkerRole, Overlay, Polyline};
    use crate::style::{MarkerStyle, PolylineStyle};
    use foundation::math::Vec3;

    fn vertex(position: Vec3) -> Marker {
        Marker {
            position,
            style: MarkerStyle::default(),
            role: MarkerRole::Vertex,
        }
    }

    #[test]
    fn spawn_set_get() {
        let mut overlay = Overlay::new();
        let e = overlay.spawn();
        overlay.set_marker(e, vertex(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(overlay.marker(e).unwrap().position, Vec3::new(1.0, 2.0, 3.0));

        overlay.set_marker_position(e, Vec3::ZERO);
        assert_eq!(overlay.marker(e).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn markers_iterate_in_ascending_index_order() {
        let mut overlay = Overlay::new();
        let a = overlay.spawn();
        let b = overlay.spawn();
        let c = overlay.spawn();
        overlay.set_marker(c, vertex(Vec3::ZERO));
        overlay.set_marker(a, vertex(Vec3::ZERO));
        overlay.set_marker(b, vertex(Vec3::ZERO));

        let order: Vec<u32> = overlay.markers().map(|(e, _)| e.index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn despawn_removes_all_components() {
        let mut overlay = Overlay::new();
        let e = overlay.spawn();
        overlay.set_marker(e, vertex(Vec3::ZERO));
        overlay.set_polyline(
            e,
            Polyline {
                positions: vec![Vec3::ZERO],
                style: PolylineStyle::default(),
            },
        );
        overlay.despawn(e);
        assert!(overlay.marker(e).is_none());
        assert!(overlay.polyline(e).is_none());
        assert!(overlay.is_empty());
    }

    #[test]
    fn clear_is_idempotent_and_invalidates_stale_ids() {
        let mut overlay = Overlay::new();
        let stale = overlay.spawn();
        overlay.set_marker(stale, vertex(Vec3::ZERO));

        overlay.clear();
        overlay.clear();
        assert!(overlay.is_empty());

        // A stale id must neither read nor write the new session's storage.
        let fresh = overlay.spawn();
        overlay.set_marker_position(stale, Vec3::new(9.0, 9.0, 9.0));
        assert!(overlay.marker(stale).is_none());
        assert!(overlay.marker(fresh).is_none());
    }
}
