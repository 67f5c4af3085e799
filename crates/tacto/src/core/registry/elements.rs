/*!
Element operations for the Registry.

CRUD: `register`, `unregister`, `clear`
Query: `element`, `entry`, `elements`, `count`
*/

use std::time::Instant;

use super::{Registry, RegistryEntry};
use crate::types::{AccessibleElement, ElementId, Event};

impl Registry {
  /// Insert or overwrite an element by id.
  ///
  /// Always refreshes `last_updated` and drops the cached precision record.
  /// An overwritten element keeps its position in iteration order.
  pub(crate) fn register(&mut self, element: AccessibleElement) -> ElementId {
    let id = element.id.clone();
    self.precision.invalidate(&id);

    let entry = RegistryEntry {
      element: element.clone(),
      last_updated: Instant::now(),
    };
    if self.entries.insert(id.clone(), entry).is_none() {
      self.order.push(id.clone());
    }

    log::debug!(
      "Registered {id} ({:?}, priority {}) at {:?}",
      element.kind,
      element.priority,
      element.bounds
    );
    self.emit(Event::ElementRegistered { element });
    id
  }

  /// Remove an element and its precision record. Returns false if absent.
  pub(crate) fn unregister(&mut self, id: &ElementId) -> bool {
    if self.entries.remove(id).is_none() {
      return false;
    }
    self.order.retain(|existing| existing != id);
    self.precision.invalidate(id);

    log::debug!("Unregistered {id}");
    self.emit(Event::ElementUnregistered {
      element_id: id.clone(),
    });
    true
  }

  /// Remove every element and cached record.
  pub(crate) fn clear(&mut self) {
    let count = self.entries.len();
    self.entries.clear();
    self.order.clear();
    self.precision.clear();

    log::debug!("Cleared {count} elements");
    self.emit(Event::ElementsCleared);
  }

  pub(crate) fn count(&self) -> usize {
    self.entries.len()
  }

  pub(crate) fn entry(&self, id: &ElementId) -> Option<&RegistryEntry> {
    self.entries.get(id)
  }

  pub(crate) fn element(&self, id: &ElementId) -> Option<&AccessibleElement> {
    self.entries.get(id).map(|entry| &entry.element)
  }

  /// Iterate over elements in registration order.
  pub(crate) fn elements(&self) -> impl Iterator<Item = &AccessibleElement> {
    self
      .order
      .iter()
      .filter_map(|id| self.entries.get(id))
      .map(|entry| &entry.element)
  }
}
