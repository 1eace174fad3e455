//! Geometric predicates: circumcircle construction and containment tests.

use crate::point::Point;
use nalgebra::Vector2;

/// Used to represent a number very close to 0 without being 0,
/// for divide-by-zero problems.
pub const EPSILON: f64 = 1e-8;

/// The circumscribed circle of a triangle, center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// Computes the circumcircle of the triangle `p1 p2 p3` by intersecting two
/// perpendicular bisectors.
///
/// The branch is selected so that no bisector slope is computed across a
/// (nearly) horizontal triangle side: if the first pair of corners is
/// y-aligned within [EPSILON], the bisector of the second pair carries the
/// slope, and symmetrically for the second pair.
///
/// Corners that are exactly collinear have no circumcircle; the solver then
/// yields a non-finite center, which the containment test's degeneracy guard
/// only partially rejects (near-collinearity by y-alignment). This is a known
/// limitation, not silently repaired.
pub fn circumcircle(p1: Point, p2: Point, p3: Point) -> Circle {
    let v1 = Vector2::new(p1.x, p1.y);
    let v2 = Vector2::new(p2.x, p2.y);
    let v3 = Vector2::new(p3.x, p3.y);

    let center = if (p2.y - p1.y).abs() < EPSILON {
        let m2 = -(p3.x - p2.x) / (p3.y - p2.y);
        let mid23 = (v2 + v3) / 2.0;
        let x = (p2.x + p1.x) / 2.0;
        let y = m2 * (x - mid23.x) + mid23.y;
        Vector2::new(x, y)
    } else if (p3.y - p2.y).abs() < EPSILON {
        let m1 = -(p2.x - p1.x) / (p2.y - p1.y);
        let mid12 = (v1 + v2) / 2.0;
        let x = (p3.x + p2.x) / 2.0;
        let y = m1 * (x - mid12.x) + mid12.y;
        Vector2::new(x, y)
    } else {
        let m1 = -(p2.x - p1.x) / (p2.y - p1.y);
        let m2 = -(p3.x - p2.x) / (p3.y - p2.y);
        let mid12 = (v1 + v2) / 2.0;
        let mid23 = (v2 + v3) / 2.0;
        let x = (m1 * mid12.x - m2 * mid23.x + mid23.y - mid12.y) / (m1 - m2);
        let y = m1 * (x - mid12.x) + mid12.y;
        Vector2::new(x, y)
    };

    let radius = (v1 - center).norm();

    Circle {
        center: Point::new(center.x, center.y),
        radius,
    }
}

/// Checks whether `p` lies in the circumcircle of a triangle with the given
/// `corners` and cached `circle`.
///
/// Points outside the circle's axis-aligned bounding square are rejected
/// fast; interior candidates are compared by squared distance against the
/// squared radius. Triangles whose corners are nearly collinear by
/// y-alignment (both consecutive y-differences below [EPSILON]) contain
/// nothing; their cached circle is unusable.
///
/// The comparison is inclusive, matching the cavity semantics of the
/// incremental algorithm: a point exactly on the circle invalidates the
/// triangle.
pub fn circumcircle_contains(circle: &Circle, corners: &[Point; 3], p: Point) -> bool {
    let left = circle.center.x - circle.radius;
    let right = circle.center.x + circle.radius;
    let top = circle.center.y - circle.radius;
    let bottom = circle.center.y + circle.radius;

    if p.x < left || p.x > right || p.y < top || p.y > bottom {
        return false;
    }

    let [p1, p2, p3] = corners;
    if (p1.y - p2.y).abs() < EPSILON && (p2.y - p3.y).abs() < EPSILON {
        return false;
    }

    let rsqr = circle.radius * circle.radius;

    let dx = p.x - circle.center.x;
    let dy = p.y - circle.center.y;
    let drsqr = dx * dx + dy * dy;

    drsqr <= rsqr
}

/// Checks whether `p` lies strictly inside the circle, with a small relative
/// slack so that cocircular point configurations do not register as
/// violations. Used by the Delaunay validity checks.
pub fn circle_strictly_contains(circle: &Circle, p: Point) -> bool {
    let rsqr = circle.radius * circle.radius;

    let dx = p.x - circle.center.x;
    let dy = p.y - circle.center.y;
    let drsqr = dx * dx + dy * dy;

    drsqr < rsqr * (1.0 - EPSILON)
}

/// Orientation of the triple `(a, b, c)`: positive for counter-clockwise,
/// negative for clockwise, zero for exactly collinear.
pub fn orient2d(a: Point, b: Point, c: Point) -> f64 {
    robust::orient2d(
        robust::Coord { x: a.x, y: a.y },
        robust::Coord { x: b.x, y: b.y },
        robust::Coord { x: c.x, y: c.y },
    )
}
