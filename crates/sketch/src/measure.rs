use foundation::math::{LocalFrame, Vec3, ecef_to_geodetic};
use scene::snapshot::triangulate_ring;

use crate::kind::GeometryKind;

/// One straight segment of a sketched geometry.
///
/// `length_m` is the straight-line ECEF distance; the deltas are expressed
/// in the local East-North-Up frame anchored at the segment's first point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentMeasure {
    pub length_m: f64,
    pub east_m: f64,
    pub north_m: f64,
    pub height_m: f64,
}

/// Finished-geometry measurement report.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub kind: GeometryKind,
    pub segments: Vec<SegmentMeasure>,
    pub perimeter_m: f64,
    /// Present for closed kinds only.
    pub area_m2: Option<f64>,
}

pub fn measure_segment(from: Vec3, to: Vec3) -> SegmentMeasure {
    let frame = LocalFrame::at(ecef_to_geodetic(from));
    let enu = frame.to_local(to);
    SegmentMeasure {
        length_m: from.distance(to),
        east_m: enu.east,
        north_m: enu.north,
        height_m: enu.up,
    }
}

/// One measure per consecutive pair.
///
/// Parity contract: `result.len() == max(0, points.len() - 1)`; the closing
/// segment of a closed kind is not included here (see [`measure_geometry`]).
pub fn measure_segments(points: &[Vec3]) -> Vec<SegmentMeasure> {
    points
        .windows(2)
        .map(|pair| measure_segment(pair[0], pair[1]))
        .collect()
}

/// Full report for a finished geometry.
///
/// Closed kinds get the closing segment (last back to first) appended and an
/// area; `perimeter_m` sums every reported segment.
pub fn measure_geometry(kind: GeometryKind, points: &[Vec3]) -> Measurements {
    let mut segments = measure_segments(points);
    if kind.is_closed() && points.len() >= 3 {
        segments.push(measure_segment(points[points.len() - 1], points[0]));
    }

    let perimeter_m = segments.iter().map(|s| s.length_m).sum();
    let area_m2 = if kind.is_closed() && points.len() >= 3 {
        Some(ring_area_m2(points))
    } else {
        None
    };

    Measurements {
        kind,
        segments,
        perimeter_m,
        area_m2,
    }
}

/// Area of a closed ring, via tangent-plane triangulation.
///
/// Triangulating first (rather than a shoelace over the raw ring) keeps
/// concave rings correct and reuses the exact triangles the renderer fills.
pub fn ring_area_m2(ring: &[Vec3]) -> f64 {
    let triangles = triangulate_ring(ring);
    let mut area = 0.0;
    for triangle in triangles.chunks_exact(3) {
        let ab = triangle[1] - triangle[0];
        let ac = triangle[2] - triangle[0];
        area += ab.cross(ac).length() * 0.5;
    }
    area
}

/// Text shown on the running dimension label.
///
/// Rectangles format their two side lengths as `"{w}km x {h}km"`; every
/// other kind sums the recorded distances as `"{name}: {sum}km"`. A
/// rectangle without exactly two recorded distances yields the empty string
/// so partially-initialized state never reaches the UI.
pub fn dimension_label(kind: GeometryKind, distances_m: &[f64]) -> String {
    match kind {
        GeometryKind::Rectangle => {
            if distances_m.len() != 2 {
                return String::new();
            }
            format!(
                "{:.2}km x {:.2}km",
                distances_m[0] / 1000.0,
                distances_m[1] / 1000.0
            )
        }
        _ => {
            let sum_m: f64 = distances_m.iter().sum();
            format!("{}: {:.2}km", kind.display_name(), sum_m / 1000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{dimension_label, measure_geometry, measure_segments, ring_area_m2};
    use crate::kind::GeometryKind;
    use foundation::math::{Enu, Geodetic, LocalFrame, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn local_points(offsets: &[(f64, f64, f64)]) -> (LocalFrame, Vec<Vec3>) {
        let frame = LocalFrame::at(Geodetic::from_degrees(46.0, 7.0, 0.0));
        let points = offsets
            .iter()
            .map(|&(e, n, u)| frame.from_local(Enu::new(e, n, u)))
            .collect();
        (frame, points)
    }

    #[test]
    fn segment_parity() {
        let (_, points) = local_points(&[(0.0, 0.0, 0.0), (100.0, 0.0, 0.0), (100.0, 50.0, 0.0)]);
        assert!(measure_segments(&points[..0]).is_empty());
        assert!(measure_segments(&points[..1]).is_empty());
        assert_eq!(measure_segments(&points[..2]).len(), 1);
        assert_eq!(measure_segments(&points).len(), 2);
    }

    #[test]
    fn segment_deltas_match_the_local_frame() {
        let (_, points) = local_points(&[(0.0, 0.0, 0.0), (300.0, 400.0, 0.0)]);
        let segments = measure_segments(&points);
        assert_eq!(segments.len(), 1);
        assert_close(segments[0].length_m, 500.0, 1e-6);
        assert_close(segments[0].east_m, 300.0, 1e-6);
        assert_close(segments[0].north_m, 400.0, 1e-6);
        assert_close(segments[0].height_m, 0.0, 1e-6);
    }

    #[test]
    fn height_delta_is_reported() {
        let (_, points) = local_points(&[(0.0, 0.0, 10.0), (0.0, 0.0, 250.0)]);
        let segments = measure_segments(&points);
        assert_close(segments[0].height_m, 240.0, 1e-6);
        assert_close(segments[0].length_m, 240.0, 1e-6);
    }

    #[test]
    fn polygon_report_includes_the_closing_segment() {
        let (_, points) = local_points(&[
            (0.0, 0.0, 0.0),
            (100.0, 0.0, 0.0),
            (100.0, 100.0, 0.0),
            (0.0, 100.0, 0.0),
        ]);
        let report = measure_geometry(GeometryKind::Polygon, &points);
        assert_eq!(report.segments.len(), 4);
        assert_close(report.perimeter_m, 400.0, 1e-3);
        assert_close(report.area_m2.expect("area"), 10_000.0, 1.0);
    }

    #[test]
    fn line_report_has_no_area_and_no_closing_segment() {
        let (_, points) = local_points(&[(0.0, 0.0, 0.0), (100.0, 0.0, 0.0), (200.0, 0.0, 0.0)]);
        let report = measure_geometry(GeometryKind::Line, &points);
        assert_eq!(report.segments.len(), 2);
        assert_close(report.perimeter_m, 200.0, 1e-3);
        assert!(report.area_m2.is_none());
    }

    #[test]
    fn concave_ring_area_is_not_overcounted() {
        // An L-shape: a 200m x 200m square minus a 100m x 100m corner bite.
        let (_, points) = local_points(&[
            (0.0, 0.0, 0.0),
            (200.0, 0.0, 0.0),
            (200.0, 100.0, 0.0),
            (100.0, 100.0, 0.0),
            (100.0, 200.0, 0.0),
            (0.0, 200.0, 0.0),
        ]);
        assert_close(ring_area_m2(&points), 30_000.0, 2.0);
    }

    #[test]
    fn rectangle_label_needs_exactly_two_distances() {
        assert_eq!(
            dimension_label(GeometryKind::Rectangle, &[1500.0, 250.0]),
            "1.50km x 0.25km"
        );
        assert_eq!(dimension_label(GeometryKind::Rectangle, &[1500.0]), "");
        assert_eq!(dimension_label(GeometryKind::Rectangle, &[]), "");
    }

    #[test]
    fn other_labels_sum_their_distances() {
        assert_eq!(
            dimension_label(GeometryKind::Line, &[400.0, 600.0]),
            "Line: 1.00km"
        );
        assert_eq!(
            dimension_label(GeometryKind::Polygon, &[250.0]),
            "Polygon: 0.25km"
        );
    }
}
