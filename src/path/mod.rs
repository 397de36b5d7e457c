//!
//! Cubic-bezier path flattening. Leaf module: no dependency on the kinematics,
//! it only refines a path until every segment is straight enough to plot as a
//! line. Coordinates are in the same units as the canvas.
//!

pub mod error;

use error::FlattenError;

///
/// A 2D point, in canvas units.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// The midpoint between this point and another.
    fn midpoint(self, other: Point) -> Point {
        Point { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

///
/// One anchor of a cubic-bezier path, carrying its incoming and outgoing
/// control points. A path is an ordered sequence of these; the segment
/// between vertex `i-1` and vertex `i` is the cubic
/// `(sp[i-1].point, sp[i-1].ctrl_out, sp[i].ctrl_in, sp[i].point)`.
///
/// # Fields:
/// - `ctrl_in`: The control point shaping the curve arriving at this anchor
/// - `point`: The anchor point itself, on the curve
/// - `ctrl_out`: The control point shaping the curve leaving this anchor
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathVertex {
    pub ctrl_in: Point,
    pub point: Point,
    pub ctrl_out: Point,
}

impl PathVertex {
    pub fn new(ctrl_in: Point, point: Point, ctrl_out: Point) -> PathVertex {
        PathVertex { ctrl_in, point, ctrl_out }
    }

    ///
    /// A vertex whose control points coincide with its anchor; two of these
    /// in a row describe a straight segment.
    ///
    pub fn corner(point: Point) -> PathVertex {
        PathVertex { ctrl_in: point, point, ctrl_out: point }
    }
}

///
/// Refines a bezier path in place until every segment deviates from the chord
/// between its endpoints by no more than `flat`.
///
/// The algorithm walks an index along the growing sequence: a segment within
/// tolerance is accepted and the index advances; otherwise the segment is
/// split at t = 0.5 by de Casteljau subdivision, the midpoint is inserted as
/// a new vertex, and the first half is re-tested in place. Deliberately a
/// loop, never a recursion: deeply nested curves must not be able to blow the
/// call stack. Each split strictly reduces the deviation of both halves, so
/// the walk terminates for any positive tolerance.
///
/// # Parameters:
/// - `path`: The vertex sequence to refine, mutated in place
/// - `flat`: The flatness tolerance; must be positive
///
/// # Returns:
/// - Void if the path was flattened
/// - A `FlattenError` if the tolerance can never be met
///
pub fn flatten(path: &mut Vec<PathVertex>, flat: f64) -> Result<(), FlattenError> {
    // a zero/negative/NaN tolerance would loop forever, fail fast instead
    if !(flat > 0.0) {
        return Err(FlattenError::InvalidTolerance(flat));
    }

    let mut i = 1;
    while i < path.len() {
        let p0 = path[i - 1].point;
        let p1 = path[i - 1].ctrl_out;
        let p2 = path[i].ctrl_in;
        let p3 = path[i].point;

        if max_chord_deviation(p0, p1, p2, p3) <= flat {
            i += 1;
            continue;
        }

        // de Casteljau split at t = 0.5: the halves are
        // (p0, p01, p012, p0123) and (p0123, p123, p23, p3)
        let p01 = p0.midpoint(p1);
        let p12 = p1.midpoint(p2);
        let p23 = p2.midpoint(p3);
        let p012 = p01.midpoint(p12);
        let p123 = p12.midpoint(p23);
        let p0123 = p012.midpoint(p123);

        path[i - 1].ctrl_out = p01;
        path[i].ctrl_in = p23;
        path.insert(i, PathVertex::new(p012, p0123, p123));
    }

    Ok(())
}

///
/// The maximum deviation of a cubic segment from the chord between its
/// endpoints, measured as the larger perpendicular distance of the two
/// control points from the p0-p3 chord. Zero deviation means the segment
/// already is the chord.
///
/// # Parameters:
/// - `p0`: The segment's start anchor
/// - `p1`: The outgoing control point of the start anchor
/// - `p2`: The incoming control point of the end anchor
/// - `p3`: The segment's end anchor
///
/// # Returns:
/// - The deviation bound, in canvas units
///
pub fn max_chord_deviation(p0: Point, p1: Point, p2: Point, p3: Point) -> f64 {
    f64::max(distance_to_segment(p1, p0, p3), distance_to_segment(p2, p0, p3))
}

/// Distance from a point to the closed segment a-b.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq == 0.0 {
        return f64::hypot(p.x - a.x, p.y - a.y);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    f64::hypot(p.x - (a.x + t * dx), p.y - (a.y + t * dy))
}

///
/// Tests relating to path flattening.
///
#[cfg(test)]
mod tests {
    use super::*;

    /// A single strongly-curved cubic from (0,0) to (200,200).
    fn curve() -> Vec<PathVertex> {
        vec![
            PathVertex::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
            PathVertex::new(
                Point::new(100.0, 200.0),
                Point::new(200.0, 200.0),
                Point::new(200.0, 200.0),
            ),
        ]
    }

    fn all_segments_flat(path: &[PathVertex], flat: f64) -> bool {
        (1..path.len()).all(|i| {
            max_chord_deviation(
                path[i - 1].point,
                path[i - 1].ctrl_out,
                path[i].ctrl_in,
                path[i].point,
            ) <= flat
        })
    }

    #[test]
    fn flattening_meets_tolerance() {
        for flat in [5.0, 0.5, 0.05] {
            let mut path = curve();
            flatten(&mut path, flat).unwrap();
            assert!(all_segments_flat(&path, flat));
        }
    }

    #[test]
    fn tighter_tolerance_yields_more_points() {
        let mut coarse = curve();
        let mut medium = curve();
        let mut fine = curve();
        flatten(&mut coarse, 5.0).unwrap();
        flatten(&mut medium, 0.5).unwrap();
        flatten(&mut fine, 0.05).unwrap();

        assert_eq!(coarse.len(), 7);
        assert!(medium.len() >= coarse.len());
        assert!(fine.len() >= medium.len());
    }

    #[test]
    fn flattening_is_idempotent() {
        let mut path = curve();
        flatten(&mut path, 0.5).unwrap();

        let once = path.clone();
        flatten(&mut path, 0.5).unwrap();
        assert_eq!(path, once);

        // a looser tolerance must not refine further either
        flatten(&mut path, 5.0).unwrap();
        assert_eq!(path, once);
    }

    #[test]
    fn straight_segments_are_untouched() {
        let mut line = vec![
            PathVertex::corner(Point::new(0.0, 0.0)),
            PathVertex::corner(Point::new(30.0, 30.0)),
        ];
        flatten(&mut line, 0.1).unwrap();
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn endpoints_are_preserved() {
        let mut path = curve();
        flatten(&mut path, 0.05).unwrap();
        assert_eq!(path.first().unwrap().point, Point::new(0.0, 0.0));
        assert_eq!(path.last().unwrap().point, Point::new(200.0, 200.0));
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        assert!(flatten(&mut curve(), 0.0).is_err());
        assert!(flatten(&mut curve(), -1.0).is_err());
        assert!(flatten(&mut curve(), f64::NAN).is_err());
    }

    #[test]
    fn empty_and_single_vertex_paths_are_fine() {
        let mut empty: Vec<PathVertex> = vec![];
        flatten(&mut empty, 0.2).unwrap();
        assert!(empty.is_empty());

        let mut single = vec![PathVertex::corner(Point::new(1.0, 2.0))];
        flatten(&mut single, 0.2).unwrap();
        assert_eq!(single.len(), 1);
    }
}
