//! Pure geometry helpers for the sketch tools.
//!
//! Everything here is stateless and unit-tested directly; the controller and
//! the edit engine are thin orchestration over these functions.

use foundation::math::{Enu, LocalFrame, Vec2, Vec3, ecef_to_geodetic};
use scene::host::ScreenProjector;

/// Normalizes 3 free corners into 4 rectangle corners.
///
/// With `[a, b, c]` as input, `a`/`b` span the fixed base edge and `c` is the
/// free-dragged point. The result is `[a, b, bp, ap]` where `m` is the foot
/// of the perpendicular from `c` onto the base, `ap = c - (m - a)` sits above
/// `a`, and `bp = ap + (b - a)` sits above `b`.
///
/// Identity law: any input length other than 3 is returned unchanged.
pub fn rectanglify(points: &[Vec3]) -> Vec<Vec3> {
    if points.len() != 3 {
        return points.to_vec();
    }
    let (a, b, c) = (points[0], points[1], points[2]);

    let ab = b - a;
    let ac = c - a;
    let base_len2 = ab.dot(ab);
    let m = if base_len2 > 0.0 {
        a + ab * (ac.dot(ab) / base_len2)
    } else {
        a
    };

    let ap = c - (m - a);
    let bp = ap + ab;
    vec![a, b, bp, ap]
}

/// Midpoint of two world positions; where virtual insertion handles live.
pub fn halfway(a: Vec3, b: Vec3) -> Vec3 {
    a.midpoint(b)
}

/// Center of a 4-corner rectangle.
pub fn rectangle_center(corners: &[Vec3; 4]) -> Vec3 {
    (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25
}

/// Proper 2D segment intersection, including collinear overlap and
/// endpoint touching.
pub fn segments_intersect_2d(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Whether the quad `q0-q1-q2-q3` self-intersects, i.e. either pair of
/// opposite edges crosses. Adjacent edges share an endpoint and are not
/// tested against each other.
pub fn quad_self_intersects(q: &[Vec2; 4]) -> bool {
    segments_intersect_2d(q[0], q[1], q[2], q[3]) || segments_intersect_2d(q[1], q[2], q[3], q[0])
}

/// Opposite-corner-preserving rectangle resize.
///
/// The diagonal opposite of the dragged corner stays fixed. Both adjacent
/// corners are scaled about the diagonal midpoint by the ratio of the new to
/// the old half-diagonal. The negate step is screen-space-aware on purpose:
/// whether an adjacent corner must flip to the mirrored side of the new
/// diagonal depends on the apparent 2D topology under the current camera
/// projection, so the test runs on projected corners. Corners the projector
/// cannot place on screen leave the candidate untouched.
pub fn drag_rectangle_corner(
    corners: &[Vec3; 4],
    dragged: usize,
    new_position: Vec3,
    projector: &dyn ScreenProjector,
) -> [Vec3; 4] {
    debug_assert!(dragged < 4);
    let opposite = (dragged + 2) % 4;
    let adj_a = (dragged + 1) % 4;
    let adj_b = (dragged + 3) % 4;

    let o = corners[opposite];
    let mid0 = corners[dragged].midpoint(o);
    let mid1 = new_position.midpoint(o);
    let half0 = corners[dragged].distance(mid0);
    let half1 = new_position.distance(mid1);
    let scale = if half0 > 0.0 { half1 / half0 } else { 1.0 };

    let mut out = *corners;
    out[dragged] = new_position;
    out[adj_a] = mid1 + (corners[adj_a] - mid0) * scale;
    out[adj_b] = mid1 + (corners[adj_b] - mid0) * scale;

    if let Some(q) = project_quad(&out, projector) {
        if quad_self_intersects(&q) {
            out[adj_a] = mid1 - (corners[adj_a] - mid0) * scale;
        }
    }
    if let Some(q) = project_quad(&out, projector) {
        if quad_self_intersects(&q) {
            out[adj_b] = mid1 - (corners[adj_b] - mid0) * scale;
        }
    }

    out
}

/// Rotates rectangle corners about `center` in the center's local tangent
/// plane. Bearings increase by `delta_rad`; each corner's height offset in
/// the frame is preserved. A tangent-plane approximation, fine for
/// rectangles small relative to the globe.
pub fn rotate_rectangle(corners: &[Vec3; 4], center: Vec3, delta_rad: f64) -> [Vec3; 4] {
    let frame = LocalFrame::at(ecef_to_geodetic(center));
    let (sin_d, cos_d) = delta_rad.sin_cos();

    let mut out = *corners;
    for corner in &mut out {
        let enu = frame.to_local(*corner);
        let east = enu.east * cos_d + enu.north * sin_d;
        let north = enu.north * cos_d - enu.east * sin_d;
        *corner = frame.from_local(Enu::new(east, north, enu.up));
    }
    out
}

/// Wraps an angle difference into `(-pi, pi]`.
pub fn wrap_angle_rad(delta: f64) -> f64 {
    use std::f64::consts::PI;
    let wrapped = (delta + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI { PI } else { wrapped }
}

fn project_quad(corners: &[Vec3; 4], projector: &dyn ScreenProjector) -> Option<[Vec2; 4]> {
    Some([
        projector.world_to_screen(corners[0])?,
        projector.world_to_screen(corners[1])?,
        projector.world_to_screen(corners[2])?,
        projector.world_to_screen(corners[3])?,
    ])
}

fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::{
        drag_rectangle_corner, halfway, quad_self_intersects, rectangle_center, rectanglify,
        rotate_rectangle, segments_intersect_2d, wrap_angle_rad,
    };
    use foundation::math::{Enu, Geodetic, LocalFrame, Vec2, Vec3};
    use scene::scripted::PlanarProjector;

    fn assert_close_v3(a: Vec3, b: Vec3, eps: f64) {
        assert!(
            a.distance(b) <= eps,
            "expected {a:?} ~= {b:?} (diff {})",
            a.distance(b)
        );
    }

    #[test]
    fn rectanglify_identity_for_non_triples() {
        let two = vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(rectanglify(&two), two);

        let four = vec![Vec3::ZERO; 4];
        assert_eq!(rectanglify(&four), four);

        assert!(rectanglify(&[]).is_empty());
    }

    #[test]
    fn rectanglify_derives_the_documented_corners() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(4.0, 0.0, 0.0);
        let c = Vec3::new(1.0, 3.0, 0.0);
        let corners = rectanglify(&[a, b, c]);
        assert_eq!(corners.len(), 4);
        assert_eq!(corners[0], a);
        assert_eq!(corners[1], b);
        assert_eq!(corners[2], Vec3::new(4.0, 3.0, 0.0));
        assert_eq!(corners[3], Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn rectanglify_closure_and_perpendicularity() {
        let a = Vec3::new(2.0, -1.0, 0.5);
        let b = Vec3::new(7.0, 3.0, -0.25);
        let c = Vec3::new(3.0, 6.0, 2.0);
        let corners = rectanglify(&[a, b, c]);

        // bp - b == ap - a (parallelogram closure).
        assert_close_v3(corners[2] - corners[1], corners[3] - corners[0], 1e-12);
        // ap - a is perpendicular to the base edge.
        assert!((corners[3] - corners[0]).dot(b - a).abs() < 1e-9);
    }

    #[test]
    fn rectanglify_degenerate_base_does_not_blow_up() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let c = Vec3::new(2.0, 2.0, 2.0);
        let corners = rectanglify(&[a, a, c]);
        assert_eq!(corners.len(), 4);
        assert!(corners.iter().all(|p| p.x.is_finite()));
    }

    #[test]
    fn halfway_is_the_midpoint() {
        let h = halfway(Vec3::ZERO, Vec3::new(2.0, -4.0, 8.0));
        assert_eq!(h, Vec3::new(1.0, -2.0, 4.0));
    }

    #[test]
    fn segment_intersection_cases() {
        let o = Vec2::new(0.0, 0.0);
        // Proper crossing.
        assert!(segments_intersect_2d(
            o,
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0)
        ));
        // Disjoint parallels.
        assert!(!segments_intersect_2d(
            o,
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0)
        ));
        // Collinear overlap.
        assert!(segments_intersect_2d(
            o,
            Vec2::new(3.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(5.0, 0.0)
        ));
        // Touching at an endpoint.
        assert!(segments_intersect_2d(
            o,
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 0.0)
        ));
        // Near miss.
        assert!(!segments_intersect_2d(
            o,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.1, 0.1),
            Vec2::new(2.0, 1.0)
        ));
    }

    #[test]
    fn quad_self_intersection() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!(!quad_self_intersects(&square));

        // Bowtie: opposite edges cross.
        let bowtie = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!(quad_self_intersects(&bowtie));
    }

    fn surface_rectangle(frame: &LocalFrame, east_m: f64, north_m: f64) -> [Vec3; 4] {
        [
            frame.from_local(Enu::new(-east_m, -north_m, 0.0)),
            frame.from_local(Enu::new(east_m, -north_m, 0.0)),
            frame.from_local(Enu::new(east_m, north_m, 0.0)),
            frame.from_local(Enu::new(-east_m, north_m, 0.0)),
        ]
    }

    #[test]
    fn corner_drag_keeps_the_opposite_corner_fixed() {
        let frame = LocalFrame::at(Geodetic::from_degrees(46.0, 7.0, 0.0));
        let corners = surface_rectangle(&frame, 100.0, 50.0);
        let projector = PlanarProjector::new(1000.0);

        let new_pos = frame.from_local(Enu::new(-200.0, -120.0, 0.0));
        let out = drag_rectangle_corner(&corners, 0, new_pos, &projector);

        assert_eq!(out[2], corners[2]);
        assert_close_v3(out[0], new_pos, 1e-9);

        // Adjacent corners scale about the diagonal midpoint.
        let mid0 = corners[0].midpoint(corners[2]);
        let mid1 = new_pos.midpoint(corners[2]);
        let scale = new_pos.distance(mid1) / corners[0].distance(mid0);
        assert!((out[1].distance(mid1) / corners[1].distance(mid0) - scale).abs() < 1e-9);
        assert!((out[3].distance(mid1) / corners[3].distance(mid0) - scale).abs() < 1e-9);
    }

    #[test]
    fn corner_drag_result_is_a_simple_quad_on_screen() {
        let frame = LocalFrame::at(Geodetic::from_degrees(10.0, 20.0, 0.0));
        let corners = surface_rectangle(&frame, 80.0, 80.0);
        let projector = PlanarProjector::new(10_000.0);

        for (east, north) in [(300.0, 10.0), (-40.0, -300.0), (150.0, 150.0)] {
            let new_pos = frame.from_local(Enu::new(east, north, 0.0));
            let out = drag_rectangle_corner(&corners, 0, new_pos, &projector);
            let q = [
                projector_screen(&projector, out[0]),
                projector_screen(&projector, out[1]),
                projector_screen(&projector, out[2]),
                projector_screen(&projector, out[3]),
            ];
            assert!(!quad_self_intersects(&q), "flipped for ({east}, {north})");
        }
    }

    fn projector_screen(projector: &PlanarProjector, world: Vec3) -> Vec2 {
        use scene::host::ScreenProjector;
        projector.world_to_screen(world).expect("projects")
    }

    #[test]
    fn rotation_by_quarter_turn_permutes_a_square() {
        let frame = LocalFrame::at(Geodetic::from_degrees(-33.0, 151.0, 0.0));
        let corners = surface_rectangle(&frame, 60.0, 60.0);
        let center = rectangle_center(&corners);

        let out = rotate_rectangle(&corners, center, std::f64::consts::FRAC_PI_2);
        // Bearing +90 degrees maps the north-east corner onto the south-east one.
        assert_close_v3(out[2], corners[1], 1e-6);
        assert_close_v3(out[1], corners[0], 1e-6);

        // Center is preserved.
        assert_close_v3(rectangle_center(&out), center, 1e-6);
    }

    #[test]
    fn wrap_angle_stays_in_half_open_interval() {
        use std::f64::consts::PI;
        assert!((wrap_angle_rad(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle_rad(-3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle_rad(0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle_rad(-0.5) + 0.5).abs() < 1e-12);
    }
}
