/*!
Registration and query API.

Coordinates are dp. Queries never speak; speech comes only from
exploration, the magnifier and mode toggles.
*/

use std::time::Instant;

use super::{Engine, HitCandidate};
use crate::types::{
  AccessibleElement, Circle, ElementId, ElementSpec, MagnifierHit, Point, Snapshot, TactoResult,
};

impl Engine {
  // ==========================================================================
  // Registration
  // ==========================================================================

  /// Register (or replace) an element immediately.
  ///
  /// Returns `None` when the label normalizes to empty or the bounds are not
  /// positive. UI adapters with noisy layouts should prefer
  /// [`Engine::attach`], which debounces.
  pub fn register_element(&self, spec: ElementSpec) -> Option<ElementId> {
    match self.try_register_element(spec) {
      Ok(id) => Some(id),
      Err(e) => {
        log::debug!("Skipping registration: {e}");
        None
      }
    }
  }

  /// [`Engine::register_element`], reporting why a spec was rejected.
  pub fn try_register_element(&self, spec: ElementSpec) -> TactoResult<ElementId> {
    self.write(|s| s.register(spec))
  }

  /// Remove an element. Also cancels a pending debounced registration.
  pub fn unregister_element(&self, id: &ElementId) -> bool {
    self.write(|s| s.unregister(id))
  }

  /// Remove every element and forget what was last announced.
  pub fn clear_all_elements(&self) {
    self.write(|s| s.clear_all());
  }

  // ==========================================================================
  // Lookups
  // ==========================================================================

  pub fn element_count(&self) -> usize {
    self.read(|s| s.registry.count())
  }

  pub fn element(&self, id: &ElementId) -> Option<AccessibleElement> {
    self.read(|s| s.registry.element(id).cloned())
  }

  /// All elements in registration order.
  pub fn elements(&self) -> Vec<AccessibleElement> {
    self.read(|s| s.registry.elements().cloned().collect())
  }

  /// When the element was last (re-)registered.
  pub fn last_updated(&self, id: &ElementId) -> Option<Instant> {
    self.read(|s| s.registry.entry(id).map(|entry| entry.last_updated))
  }

  // ==========================================================================
  // Targeting
  // ==========================================================================

  /// Best element for a touch, or `None` when nothing is a confident match.
  ///
  /// ```
  /// use tacto::{Bounds, ElementKind, ElementSpec, Engine};
  ///
  /// let engine = Engine::new().unwrap();
  /// engine.register_element(
  ///     ElementSpec::new(ElementKind::Button, "Confirmar", Bounds::new(0.0, 0.0, 50.0, 50.0))
  ///         .with_id("confirm"),
  /// );
  ///
  /// let found = engine.find_element_at_position(25.0, 25.0).unwrap();
  /// assert_eq!(found.id.as_str(), "confirm");
  /// assert!(engine.find_element_at_position(300.0, 700.0).is_none());
  /// ```
  pub fn find_element_at_position(&self, x: f64, y: f64) -> Option<AccessibleElement> {
    self.write(|s| s.find_at(&self.config, Point::new(x, y), 0.0))
  }

  /// Every candidate for a touch, unfiltered, in registration order.
  /// Useful for debugging targeting.
  pub fn candidates_at(&self, x: f64, y: f64, lens_radius: f64) -> Vec<HitCandidate> {
    self.write(|s| s.candidates_at(&self.config, Point::new(x, y), lens_radius))
  }

  /// Elements intersecting a lens, by overlap then priority.
  ///
  /// Missing arguments fall back to the current magnifier center and radius.
  pub fn elements_under_magnifier(
    &self,
    x: Option<f64>,
    y: Option<f64>,
    radius: Option<f64>,
  ) -> Vec<MagnifierHit> {
    self.read(|s| {
      let lens = Circle::new(
        Point::new(x.unwrap_or(s.magnifier.x), y.unwrap_or(s.magnifier.y)),
        radius.unwrap_or(s.magnifier.radius),
      );
      s.registry.elements_under_lens(lens)
    })
  }

  /// Elements under the lens at its current position.
  pub fn elements_at_magnifier_position(&self) -> Vec<MagnifierHit> {
    self.elements_under_magnifier(None, None, None)
  }

  // ==========================================================================
  // State
  // ==========================================================================

  /// Elements, modes and lens in one consistent read.
  pub fn snapshot(&self) -> Snapshot {
    self.read(|s| Snapshot {
      elements: s.registry.elements().cloned().collect(),
      modes: s.modes,
      magnifier: s.magnifier.clone(),
    })
  }

  /// Element the exploration finger was last announced over.
  pub fn last_announced(&self) -> Option<ElementId> {
    self.read(|s| s.announcer.last_spoken().cloned())
  }

  /// Element the magnifier drag last announced.
  pub fn last_magnified(&self) -> Option<ElementId> {
    self.read(|s| s.announcer.last_magnified().cloned())
  }
}
