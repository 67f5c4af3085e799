/*! Event types for state changes and speech output. */

use serde::Serialize;
use ts_rs::TS;

use super::{AccessibleElement, ElementId, MagnifierState};

/// A single speech request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Utterance {
  pub text: String,
  /// Element the utterance describes, if any.
  pub element_id: Option<ElementId>,
  /// Cancel in-flight speech before speaking. When false the utterance is queued.
  pub interrupt: bool,
}

impl Utterance {
  pub(crate) fn interrupting(text: impl Into<String>, element_id: Option<ElementId>) -> Self {
    Self {
      text: text.into(),
      element_id,
      interrupt: true,
    }
  }

  pub(crate) fn queued(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      element_id: None,
      interrupt: false,
    }
  }
}

/// Which interaction modes are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Modes {
  pub voice: bool,
  pub magnifier: bool,
}

impl Modes {
  pub const fn any(&self) -> bool {
    self.voice || self.magnifier
  }
}

/// Initial state sent to bridge clients on connection.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Snapshot {
  pub elements: Vec<AccessibleElement>,
  pub modes: Modes,
  pub magnifier: MagnifierState,
}

/// Events emitted when state changes.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export)]
pub enum Event {
  // Initial sync (bridge connection)
  #[serde(rename = "sync:init")]
  SyncInit(Box<Snapshot>),

  // Registry
  #[serde(rename = "element:registered")]
  ElementRegistered { element: AccessibleElement },
  #[serde(rename = "element:unregistered")]
  ElementUnregistered { element_id: ElementId },
  #[serde(rename = "elements:cleared")]
  ElementsCleared,

  // Speech
  #[serde(rename = "speech:utterance")]
  Speech(Utterance),
  #[serde(rename = "speech:cancelled")]
  SpeechCancelled,

  // Modes and magnifier
  #[serde(rename = "mode:changed")]
  ModeChanged(Modes),
  #[serde(rename = "magnifier:moved")]
  MagnifierMoved(Box<MagnifierState>),
  #[serde(rename = "magnifier:focus")]
  MagnifierFocus { element_id: Option<ElementId> },
}
