/*!
Accessible elements and their registration specs.

UI adapters classify their own nodes and hand the engine an [`ElementSpec`].
The engine never looks at raw UI nodes.
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Bounds, ElementId, TactoError, TactoResult};

/// Placeholder some adapters use for elements without a label ("no text").
pub const NO_TEXT_PLACEHOLDER: &str = "sem texto";

/// Priority bonus for interactive elements.
const INTERACTIVE_PRIORITY_BONUS: i32 = 2;

/// Closed set of element kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ElementKind {
  Button,
  Text,
  Field,
  Image,
  Area,
}

impl ElementKind {
  /// Baseline targeting priority before the interactivity bonus.
  ///
  /// ```
  /// use tacto::ElementKind;
  ///
  /// assert_eq!(ElementKind::Button.base_priority(), 10);
  /// assert_eq!(ElementKind::Area.base_priority(), 1);
  /// ```
  pub const fn base_priority(&self) -> i32 {
    match self {
      Self::Button => 10,
      Self::Field => 9,
      Self::Text => 5,
      Self::Image => 4,
      Self::Area => 1,
    }
  }

  /// Whether elements of this kind are interactive unless told otherwise.
  pub const fn interactive_by_default(&self) -> bool {
    matches!(self, Self::Button | Self::Field)
  }

  /// Spoken name of the kind.
  pub const fn spoken_name(&self) -> &'static str {
    match self {
      Self::Button => "botão",
      Self::Text => "texto",
      Self::Field => "campo",
      Self::Image => "imagem",
      Self::Area => "área",
    }
  }
}

/// Registration request from a UI adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ElementSpec {
  /// Stable id. Generated when absent.
  #[serde(default)]
  pub id: Option<ElementId>,
  pub kind: ElementKind,
  pub text: String,
  pub bounds: Bounds,
  /// Explicit interactivity. Falls back to the kind's default.
  #[serde(default)]
  pub interactive: Option<bool>,
}

impl ElementSpec {
  pub fn new(kind: ElementKind, text: impl Into<String>, bounds: Bounds) -> Self {
    Self {
      id: None,
      kind,
      text: text.into(),
      bounds,
      interactive: None,
    }
  }

  #[must_use]
  pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
    self.id = Some(id.into());
    self
  }

  #[must_use]
  pub const fn interactive(mut self, interactive: bool) -> Self {
    self.interactive = Some(interactive);
    self
  }

  /// Validate and classify into an [`AccessibleElement`].
  ///
  /// Interactivity and priority are fixed here and never recomputed.
  pub fn build(self) -> TactoResult<AccessibleElement> {
    let text = normalize_label(&self.text);
    if text.is_empty() {
      return Err(TactoError::EmptyLabel);
    }
    if !self.bounds.is_valid() {
      return Err(TactoError::InvalidBounds {
        w: self.bounds.w,
        h: self.bounds.h,
      });
    }

    let interactive = self
      .interactive
      .unwrap_or_else(|| self.kind.interactive_by_default());
    let priority = self.kind.base_priority()
      + if interactive {
        INTERACTIVE_PRIORITY_BONUS
      } else {
        0
      };

    Ok(AccessibleElement {
      id: self.id.unwrap_or_else(ElementId::generate),
      kind: self.kind,
      text,
      bounds: self.bounds,
      interactive,
      priority,
    })
  }
}

/// An element eligible for voice/magnifier targeting.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct AccessibleElement {
  pub id: ElementId,
  pub kind: ElementKind,
  pub text: String,
  pub bounds: Bounds,
  pub interactive: bool,
  pub priority: i32,
}

impl AccessibleElement {
  /// Label length in characters.
  pub fn text_len(&self) -> usize {
    self.text.chars().count()
  }

  /// Spoken suffix describing how to interact with the element.
  pub const fn interaction_hint(&self) -> &'static str {
    if !self.interactive {
      return "";
    }
    match self.kind {
      ElementKind::Button => ". Toque duas vezes para ativar",
      ElementKind::Field => ". Toque duas vezes para editar",
      ElementKind::Text | ElementKind::Image | ElementKind::Area => ". Elemento interativo",
    }
  }

  /// Full announcement text: `"{kind}: {text}{hint}"`.
  ///
  /// ```
  /// use tacto::{Bounds, ElementKind, ElementSpec};
  ///
  /// let button = ElementSpec::new(ElementKind::Button, "Confirmar", Bounds::new(0.0, 0.0, 50.0, 50.0))
  ///   .build()
  ///   .unwrap();
  /// assert_eq!(button.describe(), "botão: Confirmar. Toque duas vezes para ativar");
  /// ```
  pub fn describe(&self) -> String {
    format!(
      "{}: {}{}",
      self.kind.spoken_name(),
      self.text,
      self.interaction_hint()
    )
  }
}

/// Trim a label and collapse interior whitespace runs to single spaces.
pub(crate) fn normalize_label(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
