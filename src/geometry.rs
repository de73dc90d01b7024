/// Tolerance for point-in-circle checks, in pixels
const CONTAINS_EPS: f32 = 1e-3;

/// A circle in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: (f32, f32),
    pub radius: f32,
}

impl Circle {
    fn from_diameter(a: (f32, f32), b: (f32, f32)) -> Self {
        let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        Self {
            center,
            radius: distance(center, a),
        }
    }

    fn contains(&self, p: (f32, f32)) -> bool {
        distance(self.center, p) <= self.radius + CONTAINS_EPS
    }
}

/// Euclidean distance between two points
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Signed shoelace area of a closed polygon, returned as its absolute value.
/// Degenerate polygons (fewer than 3 vertices, or all collinear) yield 0.
pub fn polygon_area(points: &[(f32, f32)]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0f64;
    for (i, &(x0, y0)) in points.iter().enumerate() {
        let (x1, y1) = points[(i + 1) % points.len()];
        doubled += x0 as f64 * y1 as f64 - x1 as f64 * y0 as f64;
    }
    (doubled.abs() / 2.0) as f32
}

/// Smallest circle enclosing all of `points`, or `None` for an empty slice.
///
/// Incremental Welzl walk: whenever a point falls outside the current circle
/// it is pinned to the boundary and the earlier points are re-checked.
/// Quadratic in the worst case, which is fine for the convex-hull-sized
/// inputs the locator feeds it.
pub fn min_enclosing_circle(points: &[(f32, f32)]) -> Option<Circle> {
    let (&first, rest) = points.split_first()?;
    let mut circle = Circle {
        center: first,
        radius: 0.0,
    };
    for (i, &p) in rest.iter().enumerate() {
        if circle.contains(p) {
            continue;
        }
        circle = Circle {
            center: p,
            radius: 0.0,
        };
        for (j, &q) in points[..=i].iter().enumerate() {
            if circle.contains(q) {
                continue;
            }
            circle = Circle::from_diameter(p, q);
            for &r in &points[..j] {
                if circle.contains(r) {
                    continue;
                }
                circle = circumcircle(p, q, r).unwrap_or_else(|| widest_pair_circle(p, q, r));
            }
        }
    }
    Some(circle)
}

/// Circle through three points; `None` when they are (nearly) collinear
fn circumcircle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Option<Circle> {
    let (ax, ay) = (a.0 as f64, a.1 as f64);
    let (bx, by) = (b.0 as f64, b.1 as f64);
    let (cx, cy) = (c.0 as f64, c.1 as f64);

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-9 {
        return None;
    }

    let a_sq = ax * ax + ay * ay;
    let b_sq = bx * bx + by * by;
    let c_sq = cx * cx + cy * cy;
    let ux = (a_sq * (by - cy) + b_sq * (cy - ay) + c_sq * (ay - by)) / d;
    let uy = (a_sq * (cx - bx) + b_sq * (ax - cx) + c_sq * (bx - ax)) / d;

    let center = (ux as f32, uy as f32);
    Some(Circle {
        center,
        radius: distance(center, a),
    })
}

/// Enclosing circle of a collinear triple: the diameter of its extreme pair
fn widest_pair_circle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Circle {
    let pairs = [(a, b), (a, c), (b, c)];
    let (p, q) = pairs
        .into_iter()
        .max_by(|(p0, q0), (p1, q1)| {
            distance(*p0, *q0)
                .partial_cmp(&distance(*p1, *q1))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap();
    Circle::from_diameter(p, q)
}
