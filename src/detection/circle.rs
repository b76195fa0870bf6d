//! Minimal enclosing circle of a pixel region.
//!
//! The region is first reduced to its convex hull (monotone chain), then
//! the incremental Welzl construction runs over the hull vertices. The
//! enclosing circle of the hull equals that of the whole region.

use super::Point2D;

const EPSILON: f64 = 1e-7;

/// A circle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Circle center.
    pub center: Point2D,
    /// Circle radius.
    pub radius: f64,
}

impl Circle {
    fn contains(&self, p: &Point2D) -> bool {
        self.center.distance(p) <= self.radius + EPSILON
    }

    fn from_two(a: &Point2D, b: &Point2D) -> Self {
        let center = Point2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        Self {
            center,
            radius: center.distance(a),
        }
    }

    fn from_three(a: &Point2D, b: &Point2D, c: &Point2D) -> Self {
        let bx = b.x - a.x;
        let by = b.y - a.y;
        let cx = c.x - a.x;
        let cy = c.y - a.y;
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < EPSILON {
            // Collinear: the widest pair spans the others.
            let candidates = [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)];
            let mut widest = candidates[0];
            for circle in &candidates[1..] {
                if circle.radius > widest.radius {
                    widest = *circle;
                }
            }
            return widest;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = Point2D::new(a.x + ux, a.y + uy);
        Self {
            center,
            radius: ux.hypot(uy),
        }
    }
}

/// Smallest circle containing every point, or `None` for an empty input.
pub fn min_enclosing_circle(points: &[Point2D]) -> Option<Circle> {
    let hull = convex_hull(points);
    let first = hull.first()?;
    let mut circle = Circle {
        center: *first,
        radius: 0.0,
    };

    for i in 1..hull.len() {
        if circle.contains(&hull[i]) {
            continue;
        }
        circle = Circle {
            center: hull[i],
            radius: 0.0,
        };
        for j in 0..i {
            if circle.contains(&hull[j]) {
                continue;
            }
            circle = Circle::from_two(&hull[i], &hull[j]);
            for k in 0..j {
                if !circle.contains(&hull[k]) {
                    circle = Circle::from_three(&hull[i], &hull[j], &hull[k]);
                }
            }
        }
    }

    Some(circle)
}

fn cross(o: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull vertices in counter-clockwise order (monotone chain).
pub fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2D> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2D> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
