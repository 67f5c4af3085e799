/*!
Interaction modes: touch exploration (voice) and the magnifier.

All state changes happen under the write lock; speech and events are
dispatched after it is released.
*/

use super::announce::phrases;
use super::Engine;
use crate::gestures::TouchPhase;
use crate::types::{AccessibleElement, Event, MagnifierState, Modes, Point, Utterance};

impl Engine {
  pub fn modes(&self) -> Modes {
    self.read(|s| s.modes)
  }

  pub fn magnifier(&self) -> MagnifierState {
    self.read(|s| s.magnifier.clone())
  }

  /// Flip touch exploration. Returns the new state.
  ///
  /// Turning the last mode off clears the registry.
  pub fn toggle_voice_mode(&self) -> bool {
    let modes = self.write(|s| {
      s.modes.voice = !s.modes.voice;
      if !s.modes.voice {
        s.announcer.end_exploration();
      }
      if !s.modes.any() {
        s.clear_all();
      }
      s.modes
    });
    log::info!("Voice mode {}", if modes.voice { "on" } else { "off" });

    if !modes.voice {
      self.stop_speaking();
    }
    self.emit(Event::ModeChanged(modes));
    let phrase = if modes.voice {
      phrases::VOICE_ON
    } else {
      phrases::VOICE_OFF
    };
    self.speak([Utterance::interrupting(phrase, None)]);
    modes.voice
  }

  /// Flip the magnifier. Returns the new state.
  ///
  /// Turning the last mode off clears the registry.
  pub fn toggle_magnifier_mode(&self) -> bool {
    let (modes, magnifier) = self.write(|s| {
      s.modes.magnifier = !s.modes.magnifier;
      s.magnifier.active = s.modes.magnifier;
      if !s.modes.magnifier {
        s.magnifier.current_element = None;
        s.magnifier.zoom_focus = None;
        s.announcer.forget_magnified();
      }
      if !s.modes.any() {
        s.clear_all();
      }
      (s.modes, s.magnifier.clone())
    });
    log::info!("Magnifier {}", if modes.magnifier { "on" } else { "off" });

    self.emit(Event::ModeChanged(modes));
    self.emit(Event::MagnifierMoved(Box::new(magnifier)));
    let phrase = if modes.magnifier {
      phrases::MAGNIFIER_ON
    } else {
      phrases::MAGNIFIER_OFF
    };
    self.speak([Utterance::interrupting(phrase, None)]);
    modes.magnifier
  }

  /// Move the lens without announcing. Keeps the lens fully on screen and
  /// refreshes the element it is over.
  pub fn update_magnifier_position(&self, x: f64, y: f64) -> MagnifierState {
    let magnifier = self.write(|s| {
      let (width, height) = (self.config.screen_width, self.config.screen_height);
      s.magnifier.move_to(Point::new(x, y), width, height);
      let (center, radius) = (s.magnifier.center(), s.magnifier.radius);
      s.magnifier.current_element = s.find_at(&self.config, center, radius).map(|e| e.id);
      s.magnifier.clone()
    });
    self.emit(Event::MagnifierMoved(Box::new(magnifier.clone())));
    magnifier
  }

  /// One step of touch exploration at `point` (dp).
  ///
  /// Grant and move announce the element under the finger when it changes,
  /// or "Área vazia." when nothing is found. Release ends the gesture so the
  /// next grant speaks again.
  pub fn explore(&self, phase: TouchPhase, point: Point) -> Option<AccessibleElement> {
    match phase {
      TouchPhase::Grant | TouchPhase::Move => {
        let (found, utterance) = self.write(|s| {
          let found = s.find_at(&self.config, point, 0.0);
          let utterance = s.announcer.explore(found.as_ref());
          (found, utterance)
        });
        self.speak(utterance);
        found
      }
      TouchPhase::Release => {
        self.write(|s| s.announcer.end_exploration());
        None
      }
    }
  }

  /// One step of a magnifier drag at `point` (dp).
  ///
  /// Grant and move track the element under the lens center, speaking each
  /// new one. Release locks zoom focus on the element with the largest
  /// overlap and lists everything under the lens.
  pub fn magnify(&self, phase: TouchPhase, point: Point) -> Option<AccessibleElement> {
    let (width, height) = (self.config.screen_width, self.config.screen_height);

    match phase {
      TouchPhase::Grant | TouchPhase::Move => {
        let (found, utterance, magnifier) = self.write(|s| {
          s.magnifier.move_to(point, width, height);
          let (center, radius) = (s.magnifier.center(), s.magnifier.radius);
          let found = s.find_at(&self.config, center, radius);
          s.magnifier.current_element = found.as_ref().map(|e| e.id.clone());
          let utterance = s.announcer.magnify(found.as_ref());
          (found, utterance, s.magnifier.clone())
        });
        self.emit(Event::MagnifierMoved(Box::new(magnifier)));
        self.speak(utterance);
        found
      }
      TouchPhase::Release => {
        let (focus, utterances) = self.write(|s| {
          s.magnifier.move_to(point, width, height);
          let hits = s.registry.elements_under_lens(s.magnifier.lens());
          let utterances = s.announcer.release_magnifier(&hits);
          let focus = hits.into_iter().next().map(|hit| hit.element);
          s.magnifier.zoom_focus = focus.as_ref().map(|e| e.id.clone());
          (focus, utterances)
        });
        log::debug!(
          "Magnifier released, focus: {:?}",
          focus.as_ref().map(|e| e.id.as_str())
        );
        self.emit(Event::MagnifierFocus {
          element_id: focus.as_ref().map(|e| e.id.clone()),
        });
        self.speak(utterances);
        focus
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::speech::{RecordingSpeech, SpeechCall};
  use crate::types::{Bounds, ElementId, ElementKind, ElementSpec};

  fn engine(voice: bool, magnifier: bool) -> (Engine, Arc<RecordingSpeech>) {
    let speech = Arc::new(RecordingSpeech::new());
    let engine = Engine::builder()
      .voice_mode(voice)
      .magnifier_mode(magnifier)
      .speech(speech.clone())
      .build()
      .unwrap();
    (engine, speech)
  }

  fn register_button(engine: &Engine, id: &str, text: &str, bounds: Bounds) {
    engine.register_element(ElementSpec::new(ElementKind::Button, text, bounds).with_id(id));
  }

  mod toggles {
    use super::*;

    #[test]
    fn voice_toggle_announces() {
      let (engine, speech) = engine(false, false);
      assert!(engine.toggle_voice_mode());
      assert_eq!(speech.spoken(), [phrases::VOICE_ON]);
      assert!(engine.modes().voice);
    }

    #[test]
    fn voice_off_cancels_speech() {
      let (engine, speech) = engine(true, false);
      assert!(!engine.toggle_voice_mode());
      assert_eq!(speech.calls().first(), Some(&SpeechCall::Cancel));
      assert_eq!(speech.spoken(), [phrases::VOICE_OFF]);
    }

    #[test]
    fn last_mode_off_clears_registry() {
      let (engine, _) = engine(true, true);
      register_button(&engine, "a", "Ok", Bounds::new(0.0, 0.0, 50.0, 50.0));

      engine.toggle_voice_mode();
      assert_eq!(engine.element_count(), 1, "magnifier still on");
      engine.toggle_magnifier_mode();
      assert_eq!(engine.element_count(), 0);
    }

    #[test]
    fn magnifier_off_drops_focus() {
      let (engine, speech) = engine(true, true);
      register_button(&engine, "a", "Ok", Bounds::new(175.0, 375.0, 50.0, 50.0));
      engine.magnify(TouchPhase::Release, Point::new(200.0, 400.0));
      assert!(engine.magnifier().zoom_focus.is_some());

      assert!(!engine.toggle_magnifier_mode());
      let magnifier = engine.magnifier();
      assert!(!magnifier.active);
      assert_eq!(magnifier.zoom_focus, None);
      assert_eq!(magnifier.current_element, None);
      assert_eq!(speech.spoken().last().map(String::as_str), Some(phrases::MAGNIFIER_OFF));
    }
  }

  mod magnifier_drag {
    use super::*;

    #[test]
    fn position_update_is_clamped_and_silent() {
      let (engine, speech) = engine(false, true);
      register_button(&engine, "a", "Ok", Bounds::new(50.0, 50.0, 50.0, 50.0));

      let state = engine.update_magnifier_position(0.0, 0.0);
      assert_eq!(state.center(), Point::new(75.0, 75.0));
      assert_eq!(state.current_element.as_ref().map(|id| id.as_str()), Some("a"));
      assert!(speech.spoken().is_empty());
    }

    #[test]
    fn move_speaks_each_new_element_once() {
      let (engine, speech) = engine(false, true);
      register_button(&engine, "a", "Ok", Bounds::new(175.0, 375.0, 50.0, 50.0));

      engine.magnify(TouchPhase::Grant, Point::new(200.0, 400.0));
      engine.magnify(TouchPhase::Move, Point::new(202.0, 401.0));
      assert_eq!(speech.spoken(), ["botão: Ok. Toque duas vezes para ativar"]);
      assert_eq!(engine.last_magnified().map(|id| id.0), Some("a".to_string()));
    }

    #[test]
    fn release_over_nothing() {
      let (engine, speech) = engine(false, true);
      let focus = engine.magnify(TouchPhase::Release, Point::new(200.0, 400.0));
      assert!(focus.is_none());
      assert_eq!(speech.spoken(), [phrases::NOTHING_FOCUSED]);
      assert_eq!(engine.magnifier().zoom_focus, None);
    }

    #[test]
    fn unregister_forgets_zoom_focus() {
      let (engine, _) = engine(false, true);
      register_button(&engine, "a", "Ok", Bounds::new(175.0, 375.0, 50.0, 50.0));
      register_button(&engine, "b", "Voltar", Bounds::new(0.0, 0.0, 50.0, 50.0));

      engine.magnify(TouchPhase::Release, Point::new(200.0, 400.0));
      assert_eq!(engine.magnifier().zoom_focus, Some(ElementId::from("a")));

      engine.unregister_element(&ElementId::from("b"));
      assert_eq!(engine.magnifier().zoom_focus, Some(ElementId::from("a")));
      engine.unregister_element(&ElementId::from("a"));
      assert_eq!(engine.magnifier().zoom_focus, None);
    }
  }

  mod exploration {
    use super::*;

    #[test]
    fn release_allows_repeat_announcement() {
      let (engine, speech) = engine(true, false);
      register_button(&engine, "a", "Ok", Bounds::new(0.0, 0.0, 50.0, 50.0));

      engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));
      engine.explore(TouchPhase::Move, Point::new(26.0, 25.0));
      engine.explore(TouchPhase::Release, Point::new(26.0, 25.0));
      engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));
      assert_eq!(speech.spoken().len(), 2);
      assert_eq!(engine.last_announced().map(|id| id.0), Some("a".to_string()));
    }
  }
}
