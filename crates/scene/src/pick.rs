use foundation::math::Vec2;
use foundation::math::precision::stable_total_cmp_f64;

use crate::entity::EntityId;
use crate::host::ScreenProjector;
use crate::overlay::{MarkerRole, Overlay};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerHit {
    pub entity: EntityId,
    pub role: MarkerRole,
    pub distance_px: f64,
}

/// Deterministic screen-space marker picking.
///
/// Ordering contract:
/// - The nearest marker within `radius_px` wins.
/// - Ties on distance break toward the lower `EntityId::index()`.
/// - Distances compare via the stable f64 ordering.
///
/// Notes:
/// - `Preview` markers are never pickable.
/// - Markers the projector cannot place on screen are ignored.
pub fn pick_marker(
    overlay: &Overlay,
    screen: Vec2,
    projector: &dyn ScreenProjector,
    radius_px: f64,
) -> Option<MarkerHit> {
    let mut best: Option<MarkerHit> = None;

    for (entity, marker) in overlay.markers() {
        if marker.role == MarkerRole::Preview {
            continue;
        }
        let Some(projected) = projector.world_to_screen(marker.position) else {
            continue;
        };
        let distance_px = projected.distance(screen);
        if distance_px > radius_px {
            continue;
        }

        let candidate = MarkerHit {
            entity,
            role: marker.role,
            distance_px,
        };
        best = match best {
            None => Some(candidate),
            Some(current) => {
                let ord = stable_total_cmp_f64(distance_px, current.distance_px)
                    .then_with(|| entity.index().cmp(&current.entity.index()));
                if ord.is_lt() { Some(candidate) } else { Some(current) }
            }
        };
    }

    best
}
