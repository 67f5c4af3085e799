/*! Geometry types in device-independent pixels (dp). */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Sampling resolution per axis for lens overlap estimation.
pub(crate) const LENS_SAMPLES_PER_AXIS: u32 = 8;

/// A 2D point in page coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS, Default)]
#[ts(export)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Euclidean distance to another point.
  pub fn distance_to(&self, other: Point) -> f64 {
    (self.x - other.x).hypot(self.y - other.y)
  }

  /// Check if this point is more than `threshold` away from another (Euclidean).
  pub fn moved_from(&self, other: Point, threshold: f64) -> bool {
    self.distance_to(other) > threshold
  }

  /// Divide raw device-pixel coordinates by the display density.
  ///
  /// ```
  /// use tacto::Point;
  ///
  /// let dp = Point::new(300.0, 90.0).scaled_down(3.0);
  /// assert_eq!(dp, Point::new(100.0, 30.0));
  /// ```
  pub fn scaled_down(&self, pixel_ratio: f64) -> Point {
    if pixel_ratio > 0.0 && pixel_ratio.is_finite() {
      Point::new(self.x / pixel_ratio, self.y / pixel_ratio)
    } else {
      *self
    }
  }
}

/// Rectangle bounds: top-left corner plus size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Bounds {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

impl Bounds {
  pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
    Self { x, y, w, h }
  }

  /// Both dimensions strictly positive and every value finite.
  pub fn is_valid(&self) -> bool {
    self.x.is_finite()
      && self.y.is_finite()
      && self.w.is_finite()
      && self.h.is_finite()
      && self.w > 0.0
      && self.h > 0.0
  }

  pub fn center(&self) -> Point {
    Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
  }

  /// Area, never below one square dp.
  pub fn area(&self) -> f64 {
    (self.w * self.h).max(1.0)
  }

  pub fn bbox(&self) -> BoundingBox {
    BoundingBox {
      left: self.x,
      top: self.y,
      right: self.x + self.w,
      bottom: self.y + self.h,
    }
  }

  /// Check if a point is contained within these bounds (edges inclusive).
  pub fn contains(&self, point: Point) -> bool {
    self.bbox().contains(point)
  }

  /// Estimated area of the intersection between these bounds and a circle.
  pub fn lens_overlap(&self, lens: Circle) -> f64 {
    lens.overlap_area(self)
  }
}

/// Edge representation of a rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct BoundingBox {
  pub left: f64,
  pub top: f64,
  pub right: f64,
  pub bottom: f64,
}

impl BoundingBox {
  pub fn contains(&self, point: Point) -> bool {
    point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
  }

  /// Grow every edge outwards by `margin`.
  pub fn expanded(&self, margin: f64) -> BoundingBox {
    BoundingBox {
      left: self.left - margin,
      top: self.top - margin,
      right: self.right + margin,
      bottom: self.bottom + margin,
    }
  }

  /// Intersection of two boxes, or `None` if they don't overlap with positive area.
  pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
    let clipped = BoundingBox {
      left: self.left.max(other.left),
      top: self.top.max(other.top),
      right: self.right.min(other.right),
      bottom: self.bottom.min(other.bottom),
    };
    (clipped.right > clipped.left && clipped.bottom > clipped.top).then_some(clipped)
  }

  pub fn width(&self) -> f64 {
    self.right - self.left
  }

  pub fn height(&self) -> f64 {
    self.bottom - self.top
  }
}

/// A circular query region (the magnifier lens).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Circle {
  pub center: Point,
  pub radius: f64,
}

impl Circle {
  pub const fn new(center: Point, radius: f64) -> Self {
    Self { center, radius }
  }

  pub fn contains(&self, point: Point) -> bool {
    self.center.distance_to(point) <= self.radius
  }

  pub fn bbox(&self) -> BoundingBox {
    BoundingBox {
      left: self.center.x - self.radius,
      top: self.center.y - self.radius,
      right: self.center.x + self.radius,
      bottom: self.center.y + self.radius,
    }
  }

  /// Approximate circle/rectangle intersection area.
  ///
  /// Stratified sampling: the rectangle is clipped to the circle's bounding
  /// box and split into an 8x8 grid; each cell whose center falls inside the
  /// circle contributes its full area.
  pub fn overlap_area(&self, bounds: &Bounds) -> f64 {
    if self.radius <= 0.0 {
      return 0.0;
    }
    let Some(region) = bounds.bbox().intersection(&self.bbox()) else {
      return 0.0;
    };

    let n = LENS_SAMPLES_PER_AXIS;
    let step_x = region.width() / f64::from(n);
    let step_y = region.height() / f64::from(n);
    let mut inside = 0u32;

    for i in 0..n {
      for j in 0..n {
        let sample = Point::new(
          region.left + (f64::from(i) + 0.5) * step_x,
          region.top + (f64::from(j) + 0.5) * step_y,
        );
        if self.contains(sample) {
          inside += 1;
        }
      }
    }

    f64::from(inside) * step_x * step_y
  }

  /// Overlap area relative to the rectangle's own area (0.0..=1.0).
  pub fn overlap_ratio(&self, bounds: &Bounds) -> f64 {
    (self.overlap_area(bounds) / bounds.area()).clamp(0.0, 1.0)
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  fn coord() -> impl Strategy<Value = f64> {
    -2000.0..2000.0f64
  }

  fn dimension() -> impl Strategy<Value = f64> {
    1.0..1000.0f64
  }

  proptest! {
    /// Strictly interior points are always contained
    #[test]
    fn interior_points_contained(
      x in coord(), y in coord(), w in dimension(), h in dimension(),
      fx in 0.01..0.99f64, fy in 0.01..0.99f64
    ) {
      let bounds = Bounds { x, y, w, h };
      prop_assert!(bounds.contains(Point::new(x + fx * w, y + fy * h)));
    }

    /// Overlap never exceeds the rectangle's area
    #[test]
    fn overlap_bounded_by_area(
      x in coord(), y in coord(), w in dimension(), h in dimension(),
      cx in coord(), cy in coord(), r in 0.0..500.0f64
    ) {
      let bounds = Bounds { x, y, w, h };
      let overlap = Circle::new(Point::new(cx, cy), r).overlap_area(&bounds);
      prop_assert!(overlap >= 0.0);
      prop_assert!(overlap <= bounds.area() + 1e-6);
    }

    /// moved_from is symmetric
    #[test]
    fn moved_from_symmetric(x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord(), t in 0.0..200.0f64) {
      let a = Point::new(x1, y1);
      let b = Point::new(x2, y2);
      prop_assert_eq!(a.moved_from(b, t), b.moved_from(a, t));
    }
  }
}
