/*!
Gesture bindings: raw multi-touch samples to engine coordinates.

The platform reports page coordinates in device pixels. The engine works in
dp, so every sample is divided by the display's pixel ratio. Only the primary
(first) touch drives targeting.
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::core::Engine;
use crate::types::{AccessibleElement, Point};

/// Responder lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TouchPhase {
  /// Finger down; the gesture was granted to us.
  Grant,
  Move,
  Release,
}

/// A raw gesture sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TouchEvent {
  pub phase: TouchPhase,
  /// Active touches in device pixels, primary first. Often empty on release.
  #[serde(default)]
  pub touches: Vec<Point>,
}

impl TouchEvent {
  pub fn new(phase: TouchPhase, page_x: f64, page_y: f64) -> Self {
    Self {
      phase,
      touches: vec![Point::new(page_x, page_y)],
    }
  }
}

#[derive(Debug)]
pub(crate) struct GestureBindings {
  pixel_ratio: f64,
  /// Last normalized point of the current gesture.
  last_point: Option<Point>,
}

impl GestureBindings {
  pub(crate) const fn new(pixel_ratio: f64) -> Self {
    Self {
      pixel_ratio,
      last_point: None,
    }
  }

  /// Normalize the primary touch to dp.
  ///
  /// A release without touches reuses the gesture's last point.
  pub(crate) fn normalize(&mut self, event: &TouchEvent) -> Option<Point> {
    let point = event
      .touches
      .first()
      .map(|raw| raw.scaled_down(self.pixel_ratio));

    match event.phase {
      TouchPhase::Grant | TouchPhase::Move => {
        let point = point?;
        self.last_point = Some(point);
        Some(point)
      }
      TouchPhase::Release => point.or(self.last_point.take()),
    }
  }
}

impl Engine {
  /// Route a raw gesture sample to the active mode.
  ///
  /// The magnifier takes precedence over touch exploration. With neither
  /// mode active the sample is ignored.
  pub fn handle_touch(&self, event: &TouchEvent) -> Option<AccessibleElement> {
    let (point, modes) = self.write(|s| {
      let point = s.gestures.normalize(event);
      // A lifted finger ends the gesture even when no point is left.
      if point.is_none() && event.phase == TouchPhase::Release {
        s.announcer.end_exploration();
      }
      (point, s.modes)
    });
    let Some(point) = point else {
      log::trace!("Ignoring {:?} without a usable touch", event.phase);
      return None;
    };

    if modes.magnifier {
      self.magnify(event.phase, point)
    } else if modes.voice {
      self.explore(event.phase, point)
    } else {
      None
    }
  }
}
