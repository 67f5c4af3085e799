//! End-to-end targeting and announcement behavior through the public engine API.

use std::sync::Arc;

use proptest::prelude::*;

use crate::core::{Engine, HitRule};
use crate::gestures::{TouchEvent, TouchPhase};
use crate::speech::{RecordingSpeech, SpeechCall};
use crate::types::{Bounds, ElementId, ElementKind, ElementSpec, Event, Point};

fn voice_engine() -> (Engine, Arc<RecordingSpeech>) {
  let speech = Arc::new(RecordingSpeech::new());
  let engine = Engine::builder()
    .voice_mode(true)
    .speech(speech.clone())
    .build()
    .unwrap();
  (engine, speech)
}

/// Button A and Text B from the reference layout.
fn register_reference_layout(engine: &Engine) {
  engine.register_element(
    ElementSpec::new(ElementKind::Button, "Confirmar", Bounds::new(0.0, 0.0, 50.0, 50.0))
      .with_id("a")
      .interactive(true),
  );
  engine.register_element(
    ElementSpec::new(
      ElementKind::Text,
      "Bem-vindo ao módulo",
      Bounds::new(100.0, 100.0, 200.0, 20.0),
    )
    .with_id("b"),
  );
}

#[test]
fn touching_button_announces_it() {
  let (engine, speech) = voice_engine();
  register_reference_layout(&engine);

  let found = engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));
  assert_eq!(found.map(|e| e.id), Some(ElementId::from("a")));
  assert_eq!(speech.spoken(), ["botão: Confirmar. Toque duas vezes para ativar"]);
}

#[test]
fn touching_far_from_everything_announces_empty_area() {
  let (engine, speech) = voice_engine();
  register_reference_layout(&engine);

  let found = engine.explore(TouchPhase::Grant, Point::new(500.0, 500.0));
  assert!(found.is_none());
  assert_eq!(speech.spoken(), ["Área vazia."]);
}

#[test]
fn consecutive_moves_over_same_element_speak_once() {
  let (engine, speech) = voice_engine();
  register_reference_layout(&engine);

  engine.explore(TouchPhase::Move, Point::new(20.0, 20.0));
  engine.explore(TouchPhase::Move, Point::new(30.0, 30.0));
  let speaks = speech
    .calls()
    .into_iter()
    .filter(|call| matches!(call, SpeechCall::Speak(_)))
    .count();
  assert_eq!(speaks, 1);
}

#[test]
fn interrupting_speech_cancels_first() {
  let (engine, speech) = voice_engine();
  register_reference_layout(&engine);

  engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));
  assert!(matches!(
    speech.calls().as_slice(),
    [SpeechCall::Cancel, SpeechCall::Speak(_)]
  ));
}

#[test]
fn lens_overlapping_text_only_lists_text() {
  let engine = Engine::new().unwrap();
  register_reference_layout(&engine);

  let hits = engine.elements_under_magnifier(Some(110.0), Some(110.0), Some(75.0));
  let ids: Vec<&str> = hits.iter().map(|hit| hit.element.id.as_str()).collect();
  assert_eq!(ids, ["b"]);
  assert!(hits[0].overlap_ratio > 0.3 && hits[0].overlap_ratio < 0.5);
}

#[test]
fn nearby_element_is_returned_by_fallback() {
  let engine = Engine::new().unwrap();
  // Single-character labels never pass validation.
  engine.register_element(
    ElementSpec::new(ElementKind::Image, "x", Bounds::new(200.0, 200.0, 10.0, 10.0)).with_id("x"),
  );

  let found = engine.find_element_at_position(260.0, 205.0);
  assert_eq!(found.map(|e| e.id), Some(ElementId::from("x")));
}

#[test]
fn screen_sized_element_is_never_selected() {
  let engine = Engine::new().unwrap();
  engine.register_element(
    ElementSpec::new(
      ElementKind::Button,
      "Fundo da tela",
      Bounds::new(0.0, 0.0, 400.0, 480.0),
    )
    .with_id("backdrop"),
  );

  assert!(engine.find_element_at_position(200.0, 240.0).is_none());
  assert_eq!(engine.candidates_at(200.0, 240.0, 0.0).len(), 1);
}

#[test]
fn raw_touches_are_scaled_and_routed_to_exploration() {
  let speech = Arc::new(RecordingSpeech::new());
  let engine = Engine::builder()
    .pixel_ratio(2.0)
    .voice_mode(true)
    .speech(speech.clone())
    .build()
    .unwrap();
  register_reference_layout(&engine);

  let found = engine.handle_touch(&TouchEvent::new(TouchPhase::Grant, 50.0, 50.0));
  assert_eq!(found.map(|e| e.id), Some(ElementId::from("a")));
  engine.handle_touch(&TouchEvent {
    phase: TouchPhase::Release,
    touches: vec![],
  });
  assert_eq!(engine.last_announced(), None);
}

#[test]
fn touches_are_ignored_with_modes_off() {
  let speech = Arc::new(RecordingSpeech::new());
  let engine = Engine::builder().speech(speech.clone()).build().unwrap();
  register_reference_layout(&engine);

  assert!(engine
    .handle_touch(&TouchEvent::new(TouchPhase::Grant, 25.0, 25.0))
    .is_none());
  assert!(speech.calls().is_empty());
}

#[test]
fn magnifier_takes_precedence_and_focuses_on_release() {
  let speech = Arc::new(RecordingSpeech::new());
  let engine = Engine::builder()
    .voice_mode(true)
    .magnifier_mode(true)
    .speech(speech.clone())
    .build()
    .unwrap();
  register_reference_layout(&engine);

  engine.handle_touch(&TouchEvent::new(TouchPhase::Grant, 110.0, 110.0));
  let focus = engine.handle_touch(&TouchEvent {
    phase: TouchPhase::Release,
    touches: vec![],
  });

  assert_eq!(focus.map(|e| e.id), Some(ElementId::from("b")));
  assert_eq!(engine.magnifier().zoom_focus, Some(ElementId::from("b")));
  let spoken = speech.spoken();
  assert_eq!(
    spoken.last().map(String::as_str),
    Some("1 elemento sob a lupa: Bem-vindo ao módulo.")
  );
}

#[test]
fn events_follow_state_changes() {
  let (engine, _) = voice_engine();
  let mut events = engine.subscribe();
  register_reference_layout(&engine);
  engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));
  engine.unregister_element(&ElementId::from("a"));

  let mut names = Vec::new();
  while let Ok(event) = events.try_recv() {
    names.push(match event {
      Event::ElementRegistered { element } => format!("registered {}", element.id),
      Event::ElementUnregistered { element_id } => format!("unregistered {element_id}"),
      Event::Speech(utterance) => format!("speech {}", utterance.text),
      other => format!("{other:?}"),
    });
  }
  assert_eq!(
    names,
    [
      "registered a",
      "registered b",
      "speech botão: Confirmar. Toque duas vezes para ativar",
      "unregistered a",
    ]
  );
}

#[test]
fn dispose_silences_and_empties() {
  let (engine, speech) = voice_engine();
  register_reference_layout(&engine);
  engine.dispose();

  assert_eq!(engine.element_count(), 0);
  assert!(!engine.modes().any());
  assert_eq!(speech.calls().last(), Some(&SpeechCall::Cancel));
}

proptest! {
  #[test]
  fn points_inside_an_element_make_it_a_candidate(
    x in 0.0..300.0f64,
    y in 0.0..700.0f64,
    w in 1.0..100.0f64,
    h in 1.0..100.0f64,
    fx in 0.01..0.99f64,
    fy in 0.01..0.99f64,
  ) {
    let engine = Engine::new().unwrap();
    engine.register_element(
      ElementSpec::new(ElementKind::Text, "Rótulo", Bounds::new(x, y, w, h)).with_id("e"),
    );

    let candidates = engine.candidates_at(x + w * fx, y + h * fy, 0.0);
    prop_assert_eq!(candidates.len(), 1);
    prop_assert_eq!(candidates[0].rule, HitRule::Contained);
  }

  #[test]
  fn small_interactive_targets_reach_twenty_dp(angle in 0.0..std::f64::consts::TAU) {
    let engine = Engine::new().unwrap();
    engine.register_element(
      ElementSpec::new(ElementKind::Button, "Ok", Bounds::new(0.0, 0.0, 10.0, 10.0))
        .with_id("tiny")
        .interactive(true),
    );

    let (touch_x, touch_y) = (5.0 + 15.0 * angle.cos(), 5.0 + 15.0 * angle.sin());
    let candidates = engine.candidates_at(touch_x, touch_y, 0.0);
    prop_assert_eq!(candidates.len(), 1);
    prop_assert_eq!(candidates[0].element.id.as_str(), "tiny");
  }
}
