/*! Branded ID types for type-safe element references. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use ts_rs::TS;

/// Element identifier. Opaque to the engine; usually chosen by the UI adapter.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct ElementId(pub String);

/// Global counter for generated ids. Starts at 1 (0 could be confused with "null").
static ELEMENT_COUNTER: AtomicU32 = AtomicU32::new(1);

impl ElementId {
  /// Generate a new unique `ElementId` of the form `element-N`.
  pub fn generate() -> Self {
    Self(format!(
      "element-{}",
      ELEMENT_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for ElementId {
  fn from(value: &str) -> Self {
    Self(value.to_owned())
  }
}
