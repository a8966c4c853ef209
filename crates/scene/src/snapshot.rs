use earcutr::earcut;
use foundation::math::{Vec3, WGS84_A, WGS84_B};

use crate::entity::EntityId;
use crate::overlay::{MarkerRole, Overlay};
use crate::style::{FillStyle, LabelStyle, MarkerStyle, PolylineStyle};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerVisual {
    pub entity: EntityId,
    pub position: Vec3,
    pub role: MarkerRole,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineVisual {
    pub positions: Vec<Vec3>,
    pub style: PolylineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillVisual {
    // Flat triangle list (3 vertices per triangle) in world coordinates.
    pub triangles: Vec<Vec3>,
    pub style: FillStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelVisual {
    pub position: Vec3,
    pub text: String,
    pub style: LabelStyle,
}

/// Render-ready view of the sketch overlay.
///
/// The host renderer pulls a snapshot on its own cadence; the overlay store
/// itself never talks to the GPU.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverlaySnapshot {
    pub markers: Vec<MarkerVisual>,
    pub polylines: Vec<PolylineVisual>,
    pub fills: Vec<FillVisual>,
    pub labels: Vec<LabelVisual>,
}

pub fn extract(overlay: &Overlay) -> OverlaySnapshot {
    let mut out = OverlaySnapshot::default();

    for (entity, marker) in overlay.markers() {
        out.markers.push(MarkerVisual {
            entity,
            position: marker.position,
            role: marker.role,
            style: marker.style,
        });
    }

    for (_entity, polyline) in overlay.polylines() {
        if polyline.positions.len() < 2 {
            continue;
        }
        out.polylines.push(PolylineVisual {
            positions: polyline.positions.clone(),
            style: polyline.style,
        });
    }

    for (_entity, fill) in overlay.fills() {
        let triangles = triangulate_ring(&fill.positions);
        if triangles.is_empty() {
            continue;
        }
        out.fills.push(FillVisual {
            triangles,
            style: fill.style,
        });
    }

    for (_entity, label) in overlay.labels() {
        if label.text.is_empty() {
            continue;
        }
        out.labels.push(LabelVisual {
            position: label.position,
            text: label.text.clone(),
            style: label.style.clone(),
        });
    }

    out
}

/// Triangulates one ring of world-space vertices into a flat triangle list.
///
/// The ring is flattened into the local tangent plane at its centroid and
/// ear-cut there; a closing duplicate vertex is dropped first. Rings with
/// fewer than 3 distinct vertices produce no triangles.
pub fn triangulate_ring(ring: &[Vec3]) -> Vec<Vec3> {
    let mut vertices: Vec<Vec3> = ring.to_vec();
    drop_closing_duplicate(&mut vertices);
    if vertices.len() < 3 {
        return Vec::new();
    }

    let origin = centroid(&vertices);
    let Some(normal) = ellipsoid_normal_ecef(origin) else {
        return Vec::new();
    };

    // Tangent basis around the ellipsoid normal.
    let up_ref = if normal.z.abs() < 0.99 {
        Vec3::new(0.0, 0.0, 1.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    let Some(east) = up_ref.cross(normal).normalize() else {
        return Vec::new();
    };
    let north = normal.cross(east);

    let mut coords_2d: Vec<f64> = Vec::with_capacity(vertices.len() * 2);
    for p in &vertices {
        let v = *p - origin;
        coords_2d.push(v.dot(east));
        coords_2d.push(v.dot(north));
    }

    let indices = match earcut(&coords_2d, &[], 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };

    let mut out: Vec<Vec3> = Vec::with_capacity(indices.len());
    for idx in indices {
        if let Some(v) = vertices.get(idx) {
            out.push(*v);
        }
    }
    out
}

fn drop_closing_duplicate(points: &mut Vec<Vec3>) {
    if points.len() >= 2 {
        let first = points[0];
        let last = *points.last().unwrap();
        if (first.x - last.x).abs() < 1e-9
            && (first.y - last.y).abs() < 1e-9
            && (first.z - last.z).abs() < 1e-9
        {
            points.pop();
        }
    }
}

fn ellipsoid_normal_ecef(p: Vec3) -> Option<Vec3> {
    // WGS84 ellipsoid in ECEF: x/y semi-axis = A, z semi-axis = B.
    // Normal is the gradient of (x^2/A^2 + y^2/A^2 + z^2/B^2).
    let a2 = WGS84_A * WGS84_A;
    let b2 = WGS84_B * WGS84_B;
    Vec3::new(p.x / a2, p.y / a2, p.z / b2).normalize()
}

fn centroid(vertices: &[Vec3]) -> Vec3 {
    let mut sum = Vec3::ZERO;
    for v in vertices {
        sum = sum + *v;
    }
    sum * (1.0 / vertices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::{extract, triangulate_ring};
    use crate::overlay::{Fill, Label, Marker, MarkerRole, Overlay, Polyline};
    use crate::style::{FillStyle, LabelStyle, MarkerStyle, PolylineStyle};
    use foundation::math::{Geodetic, Vec3, geodetic_to_ecef};

    fn surface(lat_deg: f64, lon_deg: f64) -> Vec3 {
        geodetic_to_ecef(Geodetic::from_degrees(lat_deg, lon_deg, 0.0))
    }

    #[test]
    fn square_ring_triangulates_into_two_triangles() {
        let ring = vec![
            surface(0.0, 0.0),
            surface(0.0, 0.01),
            surface(0.01, 0.01),
            surface(0.01, 0.0),
        ];
        let triangles = triangulate_ring(&ring);
        assert_eq!(triangles.len(), 6);
    }

    #[test]
    fn closing_duplicate_is_dropped_before_triangulation() {
        let mut ring = vec![
            surface(0.0, 0.0),
            surface(0.0, 0.01),
            surface(0.01, 0.005),
        ];
        ring.push(ring[0]);
        let triangles = triangulate_ring(&ring);
        assert_eq!(triangles.len(), 3);
    }

    #[test]
    fn degenerate_rings_produce_no_triangles() {
        assert!(triangulate_ring(&[]).is_empty());
        assert!(triangulate_ring(&[surface(0.0, 0.0), surface(0.0, 0.01)]).is_empty());
    }

    #[test]
    fn extract_skips_empty_text_and_short_lines() {
        let mut overlay = Overlay::new();

        let m = overlay.spawn();
        overlay.set_marker(
            m,
            Marker {
                position: surface(0.0, 0.0),
                style: MarkerStyle::default(),
                role: MarkerRole::Vertex,
            },
        );

        let short = overlay.spawn();
        overlay.set_polyline(
            short,
            Polyline {
                positions: vec![surface(0.0, 0.0)],
                style: PolylineStyle::default(),
            },
        );

        let blank = overlay.spawn();
        overlay.set_label(
            blank,
            Label {
                position: surface(0.0, 0.0),
                text: String::new(),
                style: LabelStyle::default(),
            },
        );

        let fill = overlay.spawn();
        overlay.set_fill(
            fill,
            Fill {
                positions: vec![surface(0.0, 0.0), surface(0.0, 0.01), surface(0.01, 0.005)],
                style: FillStyle::default(),
            },
        );

        let snap = extract(&overlay);
        assert_eq!(snap.markers.len(), 1);
        assert!(snap.polylines.is_empty());
        assert!(snap.labels.is_empty());
        assert_eq!(snap.fills.len(), 1);
        assert_eq!(snap.fills[0].triangles.len(), 3);
    }
}
