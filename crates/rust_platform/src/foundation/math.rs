//! Math types used by the platform API
//!
//! Sizes and positions are integer pixel vectors; scroll and scale values
//! are float vectors. All of them come from nalgebra.

pub use nalgebra::Vector2;

/// Integer 2D vector (pixels)
pub type Vector2i = Vector2<i32>;

/// Float 2D vector
pub type Vec2 = Vector2<f32>;

/// Axis-aligned integer rectangle given by its min (inclusive) and max
/// (exclusive) corners.
///
/// Corner arithmetic saturates at the `i32` range, so boxes near the edge
/// of the coordinate space shrink instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Box2i {
    /// Top-left corner
    pub min: Vector2i,
    /// Bottom-right corner
    pub max: Vector2i,
}

impl Box2i {
    /// Create a box from its corners
    pub fn new(min: Vector2i, max: Vector2i) -> Self {
        Self { min, max }
    }

    /// Create a box from a position and a size
    pub fn from_position_size(position: Vector2i, size: Vector2i) -> Self {
        Self {
            min: position,
            max: saturating_add(position, size),
        }
    }

    /// Width and height of the box
    pub fn size(&self) -> Vector2i {
        Vector2i::new(self.width(), self.height())
    }

    /// Box width
    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x)
    }

    /// Box height
    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y)
    }

    /// True if `other` lies entirely within this box
    pub fn contains_box(&self, other: &Box2i) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// True if the two boxes share any area
    pub fn intersects(&self, other: &Box2i) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Clamp this box so it lies within `bounds`. Inverted bounds are
    /// treated as empty at their min corner.
    pub fn clamped_to(&self, bounds: &Box2i) -> Box2i {
        let high = Vector2i::new(bounds.max.x.max(bounds.min.x), bounds.max.y.max(bounds.min.y));
        let min = Vector2i::new(
            self.min.x.clamp(bounds.min.x, high.x),
            self.min.y.clamp(bounds.min.y, high.y),
        );
        let max = Vector2i::new(
            self.max.x.clamp(min.x, high.x),
            self.max.y.clamp(min.y, high.y),
        );
        Box2i { min, max }
    }
}

/// Component-wise addition clamped to the `i32` range
pub fn saturating_add(a: Vector2i, b: Vector2i) -> Vector2i {
    Vector2i::new(a.x.saturating_add(b.x), a.y.saturating_add(b.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_containment_and_overlap() {
        let screen = Box2i::from_position_size(Vector2i::new(0, 0), Vector2i::new(1920, 1080));
        let work = Box2i::new(Vector2i::new(0, 0), Vector2i::new(1920, 1040));
        let right = Box2i::from_position_size(Vector2i::new(1920, 0), Vector2i::new(1280, 1024));

        assert!(screen.contains_box(&work));
        assert!(!screen.intersects(&right));
        assert_eq!(right.width(), 1280);
        assert_eq!(right.size(), Vector2i::new(1280, 1024));
    }

    #[test]
    fn test_clamped_to_bounds() {
        let screen = Box2i::from_position_size(Vector2i::new(0, 0), Vector2i::new(800, 600));
        let oversized = Box2i::new(Vector2i::new(-10, 20), Vector2i::new(900, 700));
        let clamped = oversized.clamped_to(&screen);

        assert_eq!(clamped, Box2i::new(Vector2i::new(0, 20), Vector2i::new(800, 600)));
        assert!(screen.contains_box(&clamped));
    }

    #[test]
    fn test_boxes_at_the_coordinate_limit_saturate() {
        let far = Box2i::from_position_size(Vector2i::new(i32::MAX - 10, 0), Vector2i::new(1920, 1080));
        assert_eq!(far.max, Vector2i::new(i32::MAX, 1080));
        assert_eq!(far.width(), 10);

        let wide = Box2i::new(Vector2i::new(i32::MIN, 0), Vector2i::new(i32::MAX, 1));
        assert_eq!(wide.width(), i32::MAX);
    }

    #[test]
    fn test_clamping_to_inverted_bounds_is_empty() {
        let inverted = Box2i::new(Vector2i::new(1920, 0), Vector2i::new(1820, 50));
        let area = Box2i::new(Vector2i::new(1920, 0), Vector2i::new(2000, 40));
        let clamped = area.clamped_to(&inverted);

        assert_eq!(clamped.min, Vector2i::new(1920, 0));
        assert_eq!(clamped.width(), 0);
        assert_eq!(clamped.height(), 40);
    }
}
