use super::{Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up offsets (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// East-North-Up tangent frame anchored at a geodetic origin.
///
/// The basis is computed once at construction; one frame is typically reused
/// for every point of a segment, rotation, or area computation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    origin_ecef: Vec3,
    east: Vec3,
    north: Vec3,
    up: Vec3,
}

impl LocalFrame {
    pub fn at(origin: Geodetic) -> Self {
        let sin_lat = origin.lat_rad.sin();
        let cos_lat = origin.lat_rad.cos();
        let sin_lon = origin.lon_rad.sin();
        let cos_lon = origin.lon_rad.cos();

        Self {
            origin_ecef: geodetic_to_ecef(origin),
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    pub fn origin_ecef(&self) -> Vec3 {
        self.origin_ecef
    }

    pub fn to_local(&self, point: Vec3) -> Enu {
        let d = point - self.origin_ecef;
        Enu::new(d.dot(self.east), d.dot(self.north), d.dot(self.up))
    }

    pub fn from_local(&self, enu: Enu) -> Vec3 {
        self.origin_ecef + self.east * enu.east + self.north * enu.north + self.up * enu.up
    }

    /// Compass bearing of `point` as seen from the frame origin, in radians.
    ///
    /// 0 is north, increasing clockwise through east.
    pub fn bearing_rad(&self, point: Vec3) -> f64 {
        let enu = self.to_local(point);
        enu.east.atan2(enu.north)
    }
}
