//! Deterministic host doubles.
//!
//! These are shipping fixtures, not test-only helpers: the replay CLI drives
//! the engine with exactly these implementations, and the scenario tests use
//! the same ones so recorded sessions behave identically in both places.

use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Geodetic, Vec2, Vec3, ecef_to_geodetic, geodetic_to_ecef};

use crate::host::{ScreenProjector, SurfacePicker, TerrainSampler};

/// Surface picker backed by a finite screen-to-world table.
///
/// A pick resolves to the nearest scripted entry within `tolerance_px`;
/// ties break toward the earlier entry. Anything farther is a miss, which
/// is how sessions script clicking off the globe.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    entries: Vec<(Vec2, Vec3)>,
    tolerance_px: f64,
}

impl ScriptedPicker {
    pub fn new(tolerance_px: f64) -> Self {
        Self {
            entries: Vec::new(),
            tolerance_px,
        }
    }

    pub fn insert(&mut self, screen: Vec2, world: Vec3) {
        self.entries.push((screen, world));
    }

    pub fn insert_geodetic(&mut self, screen: Vec2, geodetic: Geodetic) {
        self.insert(screen, geodetic_to_ecef(geodetic));
    }
}

impl SurfacePicker for ScriptedPicker {
    fn pick_surface(&self, screen: Vec2) -> Option<Vec3> {
        let mut best: Option<(f64, Vec3)> = None;
        for (at, world) in &self.entries {
            let d = at.distance(screen);
            if d > self.tolerance_px {
                continue;
            }
            best = match best {
                None => Some((d, *world)),
                Some((bd, bw)) => {
                    if stable_total_cmp_f64(d, bd).is_lt() {
                        Some((d, *world))
                    } else {
                        Some((bd, bw))
                    }
                }
            };
        }
        best.map(|(_, world)| world)
    }
}

/// Equirectangular screen projection: `x = lon_deg * s`, `y = -lat_deg * s`.
///
/// Screen y grows downward, hence the negated latitude. Every surface point
/// projects; there is no behind-the-camera case in this projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanarProjector {
    px_per_deg: f64,
}

impl PlanarProjector {
    pub fn new(px_per_deg: f64) -> Self {
        Self { px_per_deg }
    }
}

impl ScreenProjector for PlanarProjector {
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let geo = ecef_to_geodetic(world);
        Some(Vec2::new(
            geo.lon_deg() * self.px_per_deg,
            -geo.lat_deg() * self.px_per_deg,
        ))
    }
}

/// Terrain with one constant surface height everywhere.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FlatTerrain {
    pub height_m: f64,
}

impl FlatTerrain {
    pub fn new(height_m: f64) -> Self {
        Self { height_m }
    }
}

impl TerrainSampler for FlatTerrain {
    fn surface_height(&self, _lat_rad: f64, _lon_rad: f64) -> f64 {
        self.height_m
    }
}
