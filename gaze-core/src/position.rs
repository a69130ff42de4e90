use serde::{Deserialize, Serialize};

/// Screen coordinates in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// True when either axis differs from `other` by more than `threshold`.
    pub fn deviates(&self, other: Position, threshold: f64) -> bool {
        (self.x - other.x).abs() > threshold || (self.y - other.y).abs() > threshold
    }

    /// Mean of a set of positions, `None` for an empty set.
    pub fn mean(points: &[Position]) -> Option<Position> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Position::new(sx / n, sy / n))
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (f64, f64) {
    fn from(p: Position) -> Self {
        (p.x, p.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Display resolution in pixels, fixed for the lifetime of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(100.0, 100.0);
        assert_eq!(a.distance(Position::new(103.0, 104.0)), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn deviation_checks_each_axis() {
        let a = Position::new(10.0, 10.0);
        assert!(!a.deviates(Position::new(20.0, 0.0), 10.0));
        assert!(a.deviates(Position::new(20.5, 10.0), 10.0));
        assert!(a.deviates(Position::new(10.0, -0.5), 10.0));
    }

    #[test]
    fn mean_of_points() {
        assert_eq!(Position::mean(&[]), None);
        let m = Position::mean(&[Position::new(0.0, 0.0), Position::new(10.0, 20.0)]);
        assert_eq!(m, Some(Position::new(5.0, 10.0)));
    }

    #[test]
    fn center_of_resolution() {
        assert_eq!(
            Resolution::new(1024, 768).center(),
            Position::new(512.0, 384.0)
        );
        assert_eq!(Resolution::new(1, 1).center(), Position::new(0.5, 0.5));
    }
}
