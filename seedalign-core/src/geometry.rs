//! Planar distance helpers used when scoring matches against a search
//! space diagonal.

/// Distance from the point `(px, py)` to the infinite line through
/// `(x1, y1)` and `(x2, y2)`.
pub fn dist_point_to_line(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x2 == x1 {
        // Vertical line; the slope form below would divide by zero.
        return (px - x1).abs();
    }

    let a = (y2 - y1) / (x2 - x1);
    let b = y1 - a * x1;

    (a * px + b - py).abs() / (a * a + 1.0).sqrt()
}

/// Euclidean distance between two points.
pub fn dist_point_to_point(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}
