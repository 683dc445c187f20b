//! Edge-intersection-per-scanline triangle fill and DDA line rasterization.

use crate::interpolation::{InterpolationPoint, ViewportPoint};

/// An (x, y) point where a polygon edge crosses a scanline.
#[derive(Clone, Copy, Debug)]
struct IntersectionPoint {
    x: f32,
    y: f32,
}

/// One edge of a polygon in viewport space, with its axis-aligned bounds
/// precomputed for the scanline-intersection tolerance test.
struct PolygonEdge {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl PolygonEdge {
    const EPSILON: f32 = 0.001;

    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    fn point_is_within_line_segment(&self, x: f32, y: f32) -> bool {
        (self.min_x - Self::EPSILON <= x && x <= self.max_x + Self::EPSILON)
            && (self.min_y - Self::EPSILON <= y && y <= self.max_y + Self::EPSILON)
    }

    fn intersection_with_scanline(&self, scanline_y: f32) -> Option<IntersectionPoint> {
        if (self.y2 - self.y1).abs() == 0.0 {
            return None;
        }

        if (self.x2 - self.x1).abs() == 0.0 {
            return self
                .point_is_within_line_segment(self.x2, scanline_y)
                .then_some(IntersectionPoint { x: self.x2, y: scanline_y });
        }

        let k = (self.y2 - self.y1) / (self.x2 - self.x1);
        let b = (self.y1 * self.x2 - self.y2 * self.x1) / (self.x2 - self.x1);
        let x = (scanline_y - b) / k;

        self.point_is_within_line_segment(x, scanline_y)
            .then_some(IntersectionPoint { x, y: scanline_y })
    }
}

fn triangle_edges(first: &ViewportPoint, second: &ViewportPoint, third: &ViewportPoint) -> [PolygonEdge; 3] {
    [
        PolygonEdge::new(first.x as f32, first.y as f32, second.x as f32, second.y as f32),
        PolygonEdge::new(second.x as f32, second.y as f32, third.x as f32, third.y as f32),
        PolygonEdge::new(third.x as f32, third.y as f32, first.x as f32, first.y as f32),
    ]
}

fn intersection_points(edges: &[PolygonEdge; 3], scanline_y: f32) -> Vec<IntersectionPoint> {
    let mut points: Vec<IntersectionPoint> =
        edges.iter().filter_map(|edge| edge.intersection_with_scanline(scanline_y)).collect();

    if points.len() == 3 {
        try_fix_three_points_intersection_case(&mut points);
    }

    points
}

/// A scanline passing exactly through a vertex produces a spurious third
/// intersection; drop whichever of the two closest is the duplicate.
fn try_fix_three_points_intersection_case(points: &mut Vec<IntersectionPoint>) {
    points.sort_by(|lhs, rhs| lhs.x.partial_cmp(&rhs.x).unwrap());

    const EPSILON: f32 = 0.1;
    if (points[0].x - points[1].x).abs() < EPSILON && (points[0].y - points[1].y).abs() < EPSILON {
        points.remove(0);
    } else if (points[1].x - points[2].x).abs() < EPSILON && (points[1].y - points[2].y).abs() < EPSILON {
        points.remove(1);
    }
}

/// Fill points for a triangle, in scanline order, one per covered pixel.
///
/// Rows whose intersection count isn't exactly two after the three-point
/// fix are skipped, matching the source's conservative fill rule.
pub fn triangle_fill_points(
    first: &ViewportPoint,
    second: &ViewportPoint,
    third: &ViewportPoint,
) -> Vec<InterpolationPoint> {
    let min_scanline_y = first.y.min(second.y).min(third.y).floor() as f32;
    let max_scanline_y = first.y.max(second.y).max(third.y).ceil() as f32;

    let edges = triangle_edges(first, second, third);
    let mut points = Vec::new();

    let mut scanline_y = min_scanline_y;
    while scanline_y < max_scanline_y {
        let mut row = intersection_points(&edges, scanline_y);
        row.sort_by(|lhs, rhs| lhs.x.partial_cmp(&rhs.x).unwrap());

        if row.len() == 2 {
            let min_x = row[0].x as i64;
            let max_x = row[1].x as i64;
            for x in min_x..=max_x {
                points.push(InterpolationPoint { x: x as f64, y: scanline_y as f64, z: -1.0 });
            }
        }

        scanline_y = (scanline_y + 1.0).floor();
    }

    points
}

/// Fill points for a line segment: `max(|dx|, |dy|) + 1` evenly spaced
/// integer-rounded samples.
pub fn line_fill_points(first: &ViewportPoint, second: &ViewportPoint) -> Vec<InterpolationPoint> {
    let delta_x = second.x - first.x;
    let delta_y = second.y - first.y;
    let steps = delta_x.abs().max(delta_y.abs()) as i64 + 1;

    let x_accretion = delta_x / steps as f64;
    let y_accretion = delta_y / steps as f64;

    let mut x = first.x;
    let mut y = first.y;
    let mut points = Vec::with_capacity(steps as usize);
    for _ in 1..=steps {
        x += x_accretion;
        y += y_accretion;
        points.push(InterpolationPoint { x: x.round(), y: y.round(), z: 0.0 });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(x: f64, y: f64) -> ViewportPoint {
        ViewportPoint { x, y, z: 0.0, inv_w: 1.0 }
    }

    #[test]
    fn fill_covers_the_interior_of_a_right_triangle() {
        let points = triangle_fill_points(&corner(0.0, 0.0), &corner(4.0, 0.0), &corner(0.0, 4.0));
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.x >= 0.0 && p.y >= 0.0));
    }

    #[test]
    fn degenerate_flat_triangle_yields_no_fill_points() {
        let points = triangle_fill_points(&corner(0.0, 0.0), &corner(4.0, 0.0), &corner(2.0, 0.0));
        assert!(points.is_empty());
    }

    #[test]
    fn line_fill_hits_both_endpoints_rounded() {
        let points = line_fill_points(&corner(0.0, 0.0), &corner(3.0, 0.0));
        assert_eq!(points.last().unwrap().x, 3.0);
    }

    #[test]
    fn three_point_intersection_case_collapses_to_two() {
        let mut points = vec![
            IntersectionPoint { x: 1.0, y: 5.0 },
            IntersectionPoint { x: 1.02, y: 5.0 },
            IntersectionPoint { x: 3.0, y: 5.0 },
        ];
        try_fix_three_points_intersection_case(&mut points);
        assert_eq!(points.len(), 2);
    }
}
