/*!
Derived geometric features per element.

Records are computed lazily on first lookup and cached by id. The whole cache
is dropped when the query point jumps more than the invalidation distance
from the previous query point; this is a coarse approximation, not a
per-element check. `distance_from_touch` is refreshed on every query either way.
*/

use std::collections::HashMap;

use crate::types::{AccessibleElement, BoundingBox, ElementId, Point};

/// Geometric features of one element relative to the current query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrecisionElement {
  pub(crate) center: Point,
  pub(crate) area: f64,
  pub(crate) touch_radius: f64,
  pub(crate) bbox: BoundingBox,
  pub(crate) distance_from_touch: f64,
}

impl PrecisionElement {
  fn derive(element: &AccessibleElement, min_interactive_radius: f64, max_radius: f64) -> Self {
    let bounds = element.bounds;
    let mut touch_radius = bounds.w.min(bounds.h) / 2.0;
    if element.interactive {
      touch_radius = touch_radius.max(min_interactive_radius);
    }

    Self {
      center: bounds.center(),
      area: bounds.area(),
      touch_radius: touch_radius.min(max_radius),
      bbox: bounds.bbox(),
      distance_from_touch: 0.0,
    }
  }
}

pub(crate) struct PrecisionCache {
  records: HashMap<ElementId, PrecisionElement>,
  last_query: Option<Point>,
  invalidation_distance: f64,
  min_interactive_radius: f64,
  max_radius: f64,
}

impl PrecisionCache {
  pub(crate) fn new(invalidation_distance: f64, min_interactive_radius: f64, max_radius: f64) -> Self {
    Self {
      records: HashMap::new(),
      last_query: None,
      invalidation_distance,
      min_interactive_radius,
      max_radius,
    }
  }

  /// Record a new query point. Clears the cache if it moved too far.
  /// Returns true if the cache was cleared.
  pub(crate) fn begin_query(&mut self, touch: Point) -> bool {
    let moved = self
      .last_query
      .is_some_and(|last| touch.moved_from(last, self.invalidation_distance));
    self.last_query = Some(touch);

    if moved {
      log::trace!("Precision cache invalidated ({} records)", self.records.len());
      self.records.clear();
    }
    moved
  }

  /// Get (or compute and cache) the record for an element, with a fresh distance.
  pub(crate) fn derive(&mut self, element: &AccessibleElement, touch: Point) -> PrecisionElement {
    let (min_radius, max_radius) = (self.min_interactive_radius, self.max_radius);
    let record = self
      .records
      .entry(element.id.clone())
      .or_insert_with(|| PrecisionElement::derive(element, min_radius, max_radius));
    record.distance_from_touch = touch.distance_to(record.center);
    *record
  }

  pub(crate) fn invalidate(&mut self, id: &ElementId) {
    self.records.remove(id);
  }

  pub(crate) fn clear(&mut self) {
    self.records.clear();
    self.last_query = None;
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.records.len()
  }
}
