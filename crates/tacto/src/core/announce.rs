/*!
Announcement controller: turns targeting results into utterances.

De-duplication compares element ids only, never spoken text. Two different
elements with identical labels are both announced.
*/

use crate::types::{AccessibleElement, ElementId, MagnifierHit, Utterance};

/// Fixed phrases spoken by the engine.
pub(crate) mod phrases {
  pub(crate) const EMPTY_AREA: &str = "Área vazia.";
  pub(crate) const FOCUS_PREFIX: &str = "Foco em";
  pub(crate) const NOTHING_FOCUSED: &str = "Lupa liberada, nada em foco.";
  pub(crate) const VOICE_ON: &str = "Modo de voz ativado";
  pub(crate) const VOICE_OFF: &str = "Modo de voz desativado";
  pub(crate) const MAGNIFIER_ON: &str = "Lupa ativada";
  pub(crate) const MAGNIFIER_OFF: &str = "Lupa desativada";
}

/// What the exploration finger was last announced over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
  Element(ElementId),
  Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum AnnouncementState {
  #[default]
  Idle,
  Announcing(Target),
}

#[derive(Debug, Default)]
pub(crate) struct AnnouncementController {
  state: AnnouncementState,
  last_magnified: Option<ElementId>,
}

impl AnnouncementController {
  #[cfg(test)]
  pub(crate) const fn state(&self) -> &AnnouncementState {
    &self.state
  }

  pub(crate) fn last_spoken(&self) -> Option<&ElementId> {
    match &self.state {
      AnnouncementState::Announcing(Target::Element(id)) => Some(id),
      AnnouncementState::Announcing(Target::Empty) | AnnouncementState::Idle => None,
    }
  }

  pub(crate) const fn last_magnified(&self) -> Option<&ElementId> {
    self.last_magnified.as_ref()
  }

  /// Exploration grant or move resolved to `found`.
  ///
  /// Speaks only when the target differs from the last announced one.
  pub(crate) fn explore(&mut self, found: Option<&AccessibleElement>) -> Option<Utterance> {
    let target = found.map_or(Target::Empty, |e| Target::Element(e.id.clone()));
    if self.state == AnnouncementState::Announcing(target.clone()) {
      return None;
    }
    self.state = AnnouncementState::Announcing(target);

    Some(match found {
      Some(element) => Utterance::interrupting(element.describe(), Some(element.id.clone())),
      None => Utterance::interrupting(phrases::EMPTY_AREA, None),
    })
  }

  /// Exploration release. The next grant always speaks.
  pub(crate) fn end_exploration(&mut self) {
    self.state = AnnouncementState::Idle;
  }

  /// Magnifier drag resolved to `found`.
  ///
  /// Losing the element clears tracking silently; no "empty" on every frame.
  pub(crate) fn magnify(&mut self, found: Option<&AccessibleElement>) -> Option<Utterance> {
    let Some(element) = found else {
      self.last_magnified = None;
      return None;
    };
    if self.last_magnified.as_ref() == Some(&element.id) {
      return None;
    }
    self.last_magnified = Some(element.id.clone());
    Some(Utterance::interrupting(
      element.describe(),
      Some(element.id.clone()),
    ))
  }

  pub(crate) fn forget_magnified(&mut self) {
    self.last_magnified = None;
  }

  /// Magnifier release over `hits` (already ranked).
  ///
  /// Returns the focus message followed by a queued listing of everything under the lens.
  pub(crate) fn release_magnifier(&mut self, hits: &[MagnifierHit]) -> Vec<Utterance> {
    self.forget_magnified();

    let Some(top) = hits.first() else {
      return vec![Utterance::interrupting(phrases::NOTHING_FOCUSED, None)];
    };

    let mut utterances = vec![Utterance::interrupting(
      format!("{} {}", phrases::FOCUS_PREFIX, top.element.describe()),
      Some(top.element.id.clone()),
    )];
    utterances.push(Utterance::queued(listing(hits)));
    utterances
  }

  /// Forget everything spoken (used on clear and mode changes).
  pub(crate) fn reset(&mut self) {
    self.state = AnnouncementState::Idle;
    self.last_magnified = None;
  }
}

fn listing(hits: &[MagnifierHit]) -> String {
  let labels: Vec<&str> = hits.iter().map(|hit| hit.element.text.as_str()).collect();
  let noun = if hits.len() == 1 {
    "elemento"
  } else {
    "elementos"
  };
  format!("{} {noun} sob a lupa: {}.", hits.len(), labels.join(", "))
}
