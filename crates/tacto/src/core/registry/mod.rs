/*!
Registry - the single source of truth for registered elements.

All fields are private to the registry module tree. Mutations go through
methods that maintain invariants and emit events. This guarantees:
- Iteration order always matches first-registration order
- Precision records never outlive (or predate) their element's geometry
- Events are always emitted

## Module Structure

- `mod.rs` - Registry struct, entry type, event emission
- `elements.rs` - register / unregister / clear / count and lookups
- `precision.rs` - `PrecisionCache` of derived geometric features
*/

mod elements;
mod precision;

pub(crate) use precision::{PrecisionCache, PrecisionElement};

use async_broadcast::Sender;
use std::collections::HashMap;
use std::time::Instant;

use crate::types::{AccessibleElement, ElementId, Event};

/// Per-element state in the registry.
pub(crate) struct RegistryEntry {
  pub(crate) element: AccessibleElement,
  /// When this element was last (re)registered.
  pub(crate) last_updated: Instant,
}

/// Internal element store with automatic event emission.
pub(crate) struct Registry {
  events_tx: Sender<Event>,

  pub(super) entries: HashMap<ElementId, RegistryEntry>,
  /// Ids in first-registration order. Re-registration keeps the slot.
  pub(super) order: Vec<ElementId>,

  pub(super) precision: PrecisionCache,
}

impl Registry {
  pub(crate) fn new(events_tx: Sender<Event>, precision: PrecisionCache) -> Self {
    Self {
      events_tx,
      entries: HashMap::new(),
      order: Vec::new(),
      precision,
    }
  }

  /// Emit an event.
  pub(crate) fn emit(&self, event: Event) {
    if let Err(e) = self.events_tx.try_broadcast(event) {
      if e.is_full() {
        log::error!(
          "Event channel overflow - events are being dropped. \
           Consider increasing EVENT_CHANNEL_CAPACITY or processing events faster."
        );
      }
    }
  }
}
