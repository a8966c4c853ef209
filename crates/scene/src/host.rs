//! Capability seam toward the host rendering engine.
//!
//! The sketch engine never talks to a camera, a scene graph, or a GPU. It
//! consumes these three narrow traits plus the [`InputEvent`] stream the
//! host's input pass delivers, which is what makes the whole engine
//! drivable by scripted doubles (see [`crate::scripted`]).

use foundation::math::{Vec2, Vec3};

/// Resolves a 2D screen position to a point on the terrain/globe surface.
pub trait SurfacePicker {
    /// `None` means the position does not hit the surface (clicked off-globe).
    fn pick_surface(&self, screen: Vec2) -> Option<Vec3>;
}

/// Projects ECEF world positions into screen space.
pub trait ScreenProjector {
    /// `None` means the point is not projectable (behind the camera).
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;
}

/// Samples terrain surface height.
pub trait TerrainSampler {
    /// Terrain height above the ellipsoid at a geodetic position, in meters.
    fn surface_height(&self, lat_rad: f64, lon_rad: f64) -> f64;
}

/// Bundle of host capabilities handed to the engine per input event.
#[derive(Copy, Clone)]
pub struct Host<'a> {
    pub picker: &'a dyn SurfacePicker,
    pub projector: &'a dyn ScreenProjector,
    pub terrain: &'a dyn TerrainSampler,
}

/// Pointer events as delivered by the host input dispatcher.
///
/// Double-click is a first-class event here; the engine performs no
/// timer-based single/double-click inference of its own.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    LeftClick(Vec2),
    DoubleClick(Vec2),
    LeftDown(Vec2),
    LeftUp(Vec2),
    MouseMove(Vec2),
}

impl InputEvent {
    pub fn screen(&self) -> Vec2 {
        match *self {
            InputEvent::LeftClick(p)
            | InputEvent::DoubleClick(p)
            | InputEvent::LeftDown(p)
            | InputEvent::LeftUp(p)
            | InputEvent::MouseMove(p) => p,
        }
    }
}
