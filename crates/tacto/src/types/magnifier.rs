/*! Magnifier lens state. */

use serde::Serialize;
use ts_rs::TS;

use super::{AccessibleElement, Circle, ElementId, Point};

/// Current state of the magnifier lens.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct MagnifierState {
  pub active: bool,
  /// Lens center, clamped so the lens stays on screen.
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub scale: f64,
  /// Last element found under the lens while dragging.
  pub current_element: Option<ElementId>,
  /// Element locked on release.
  pub zoom_focus: Option<ElementId>,
}

impl MagnifierState {
  pub(crate) const fn new(radius: f64, scale: f64) -> Self {
    Self {
      active: false,
      x: 0.0,
      y: 0.0,
      radius,
      scale,
      current_element: None,
      zoom_focus: None,
    }
  }

  pub fn center(&self) -> Point {
    Point::new(self.x, self.y)
  }

  pub fn lens(&self) -> Circle {
    Circle::new(self.center(), self.radius)
  }

  /// Move the lens center to `point`, keeping the whole lens on a
  /// `width` x `height` screen. A lens wider than the screen is centered.
  pub(crate) fn move_to(&mut self, point: Point, width: f64, height: f64) {
    self.x = clamp_axis(point.x, self.radius, width);
    self.y = clamp_axis(point.y, self.radius, height);
  }
}

fn clamp_axis(value: f64, radius: f64, extent: f64) -> f64 {
  let max = extent - radius;
  if max < radius {
    return extent / 2.0;
  }
  value.clamp(radius, max)
}

/// An element under the lens together with how much of it the lens covers.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct MagnifierHit {
  pub element: AccessibleElement,
  /// Estimated intersection area in square dp.
  pub overlap_area: f64,
  /// Intersection area relative to the element's area.
  pub overlap_ratio: f64,
}
