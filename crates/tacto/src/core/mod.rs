/*!
Core engine instance - owns registry, announcement, mode and magnifier state.

# Module Structure

- `mod.rs` - Engine struct, builder, configuration, speech dispatch
- `registry/` - element store and precision cache
- `hit_test.rs` - candidate rules and proximity fallback
- `scoring.rs` - candidate scoring and selection validation
- `announce.rs` - utterance selection and de-duplication
- `queries.rs` - public registration and query API
- `modes.rs` - voice/magnifier modes and drag handling

# Example

```ignore
let engine = Engine::builder().screen_size(390.0, 844.0).voice_mode(true).build()?;

engine.register_element(ElementSpec::new(ElementKind::Button, "Confirmar", bounds));
engine.explore(TouchPhase::Grant, Point::new(25.0, 25.0));

let mut events = engine.subscribe();
while let Ok(event) = events.recv().await {
    // forward speech to the platform TTS
}
```
*/

mod announce;
mod modes;
mod queries;
mod registry;
mod scoring;

#[cfg(test)]
mod scenarios;

pub use hit_test::{HitCandidate, HitRule, TargetingConfig};
pub use scoring::ScoringWeights;

use announce::AnnouncementController;
use async_broadcast::{InactiveReceiver, Sender};
use hit_test::HitQuery;
use parking_lot::RwLock;
use registry::{PrecisionCache, Registry};
use scoring::ScoringContext;
use std::sync::Arc;
use std::time::Duration;

use crate::gestures::GestureBindings;
use crate::scheduling::PendingRegistrations;
use crate::speech::{LogSpeech, SpeechSink};
use crate::types::{
  AccessibleElement, ElementId, ElementSpec, Event, MagnifierState, Modes, Point, TactoError,
  TactoResult, Utterance,
};

const EVENT_CHANNEL_CAPACITY: usize = 1000;
const DEFAULT_SCREEN_WIDTH: f64 = 400.0;
const DEFAULT_SCREEN_HEIGHT: f64 = 800.0;
const DEFAULT_LENS_RADIUS: f64 = 75.0;
const DEFAULT_MAGNIFIER_SCALE: f64 = 2.0;
const DEFAULT_REGISTRATION_DEBOUNCE_MS: u64 = 100;

/// Engine configuration. Built through [`EngineBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
  /// Screen width in dp.
  pub screen_width: f64,
  /// Screen height in dp.
  pub screen_height: f64,
  /// Device pixels per dp. Raw touch coordinates are divided by this.
  pub pixel_ratio: f64,
  pub lens_radius: f64,
  pub magnifier_scale: f64,
  /// Delay between a layout report and the resulting registration.
  pub registration_debounce: Duration,
  pub targeting: TargetingConfig,
  pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      screen_width: DEFAULT_SCREEN_WIDTH,
      screen_height: DEFAULT_SCREEN_HEIGHT,
      pixel_ratio: 1.0,
      lens_radius: DEFAULT_LENS_RADIUS,
      magnifier_scale: DEFAULT_MAGNIFIER_SCALE,
      registration_debounce: Duration::from_millis(DEFAULT_REGISTRATION_DEBOUNCE_MS),
      targeting: TargetingConfig::default(),
      scoring: ScoringWeights::default(),
    }
  }
}

impl EngineConfig {
  pub fn screen_area(&self) -> f64 {
    (self.screen_width * self.screen_height).max(1.0)
  }

  fn hit_query(&self, touch: Point, lens_radius: f64) -> HitQuery<'_> {
    HitQuery {
      scoring: ScoringContext {
        touch,
        lens_radius,
        screen_area: self.screen_area(),
        weights: &self.scoring,
        targeting: &self.targeting,
      },
    }
  }

  fn validate(&self) -> TactoResult<()> {
    let positive = |value: f64| value.is_finite() && value > 0.0;
    if !positive(self.screen_width) || !positive(self.screen_height) {
      return Err(TactoError::InvalidConfig(format!(
        "screen size must be positive, got {}x{}",
        self.screen_width, self.screen_height
      )));
    }
    if !positive(self.pixel_ratio) {
      return Err(TactoError::InvalidConfig(format!(
        "pixel ratio must be positive, got {}",
        self.pixel_ratio
      )));
    }
    if !positive(self.lens_radius) {
      return Err(TactoError::InvalidConfig(format!(
        "lens radius must be positive, got {}",
        self.lens_radius
      )));
    }
    Ok(())
  }
}

/// All mutable engine state, behind one lock.
pub(crate) struct EngineState {
  pub(crate) registry: Registry,
  pub(crate) announcer: AnnouncementController,
  pub(crate) modes: Modes,
  pub(crate) magnifier: MagnifierState,
  pub(crate) gestures: GestureBindings,
  pub(crate) pending: PendingRegistrations,
}

impl EngineState {
  fn new(config: &EngineConfig, modes: Modes, events_tx: Sender<Event>) -> Self {
    let t = &config.targeting;
    let precision = PrecisionCache::new(
      t.cache_invalidation_distance,
      t.min_interactive_touch_radius,
      t.max_touch_radius,
    );

    let mut magnifier = MagnifierState::new(config.lens_radius, config.magnifier_scale);
    magnifier.active = modes.magnifier;
    magnifier.x = config.screen_width / 2.0;
    magnifier.y = config.screen_height / 2.0;

    Self {
      registry: Registry::new(events_tx, precision),
      announcer: AnnouncementController::default(),
      modes,
      magnifier,
      gestures: GestureBindings::new(config.pixel_ratio),
      pending: PendingRegistrations::new(config.registration_debounce),
    }
  }

  /// Pick the best element for a point with the configured heuristics.
  pub(crate) fn find_at(
    &mut self,
    config: &EngineConfig,
    touch: Point,
    lens_radius: f64,
  ) -> Option<AccessibleElement> {
    self.registry.find_at_position(&config.hit_query(touch, lens_radius))
  }

  pub(crate) fn candidates_at(
    &mut self,
    config: &EngineConfig,
    touch: Point,
    lens_radius: f64,
  ) -> Vec<HitCandidate> {
    self.registry.candidates(&config.hit_query(touch, lens_radius))
  }

  /// Validate and store an element.
  pub(crate) fn register(&mut self, spec: ElementSpec) -> TactoResult<ElementId> {
    let element = spec.build()?;
    Ok(self.registry.register(element))
  }

  /// Remove an element and any registration still pending for it.
  pub(crate) fn unregister(&mut self, id: &ElementId) -> bool {
    self.pending.cancel(id);
    if self.magnifier.current_element.as_ref() == Some(id) {
      self.magnifier.current_element = None;
    }
    if self.magnifier.zoom_focus.as_ref() == Some(id) {
      self.magnifier.zoom_focus = None;
    }
    self.registry.unregister(id)
  }

  /// Drop every element and all transient announcement state.
  pub(crate) fn clear_all(&mut self) {
    self.pending.cancel_all();
    self.registry.clear();
    self.announcer.reset();
    self.magnifier.current_element = None;
    self.magnifier.zoom_focus = None;
  }
}

/// Main engine instance.
///
/// Clone is cheap (Arc bumps) - the UI adapter and the bridge share one engine.
#[derive(Clone)]
pub struct Engine {
  pub(crate) state: Arc<RwLock<EngineState>>,
  pub(crate) config: Arc<EngineConfig>,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
  speech: Arc<dyn SpeechSink>,
}

impl std::fmt::Debug for Engine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Engine")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

/// Builder for configuring an [`Engine`].
///
/// # Example
///
/// ```
/// use tacto::Engine;
///
/// let engine = Engine::builder()
///     .screen_size(390.0, 844.0)
///     .pixel_ratio(3.0)
///     .voice_mode(true)
///     .build()
///     .unwrap();
/// assert_eq!(engine.element_count(), 0);
/// ```
#[derive(Clone, Default)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct EngineBuilder {
  config: EngineConfig,
  modes: Modes,
  speech: Option<Arc<dyn SpeechSink>>,
}

impl std::fmt::Debug for EngineBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EngineBuilder")
      .field("config", &self.config)
      .field("modes", &self.modes)
      .finish_non_exhaustive()
  }
}

impl EngineBuilder {
  /// Screen size in dp. Default: 400x800.
  pub const fn screen_size(mut self, width: f64, height: f64) -> Self {
    self.config.screen_width = width;
    self.config.screen_height = height;
    self
  }

  /// Device pixels per dp. Default: 1.0.
  pub const fn pixel_ratio(mut self, ratio: f64) -> Self {
    self.config.pixel_ratio = ratio;
    self
  }

  /// Magnifier lens radius in dp. Default: 75.
  pub const fn lens_radius(mut self, radius: f64) -> Self {
    self.config.lens_radius = radius;
    self
  }

  /// Magnifier zoom factor reported to the UI. Default: 2.0.
  pub const fn magnifier_scale(mut self, scale: f64) -> Self {
    self.config.magnifier_scale = scale;
    self
  }

  /// Layout-to-registration debounce in milliseconds. Default: 100ms.
  pub const fn registration_debounce_ms(mut self, ms: u64) -> Self {
    self.config.registration_debounce = Duration::from_millis(ms);
    self
  }

  pub const fn targeting(mut self, targeting: TargetingConfig) -> Self {
    self.config.targeting = targeting;
    self
  }

  pub const fn scoring(mut self, weights: ScoringWeights) -> Self {
    self.config.scoring = weights;
    self
  }

  /// Start with touch exploration enabled. Default: false.
  pub const fn voice_mode(mut self, enabled: bool) -> Self {
    self.modes.voice = enabled;
    self
  }

  /// Start with the magnifier enabled. Default: false.
  pub const fn magnifier_mode(mut self, enabled: bool) -> Self {
    self.modes.magnifier = enabled;
    self
  }

  /// Speech backend. Default: [`LogSpeech`].
  pub fn speech(mut self, sink: Arc<dyn SpeechSink>) -> Self {
    self.speech = Some(sink);
    self
  }

  /// Build the engine. Fails only on an invalid configuration.
  pub fn build(self) -> TactoResult<Engine> {
    self.config.validate()?;

    let (mut tx, rx) = async_broadcast::broadcast(EVENT_CHANNEL_CAPACITY);
    tx.set_overflow(true); // Drop oldest events when full

    let state = EngineState::new(&self.config, self.modes, tx.clone());
    Ok(Engine {
      state: Arc::new(RwLock::new(state)),
      config: Arc::new(self.config),
      events_tx: tx,
      events_keepalive: rx.deactivate(),
      speech: self.speech.unwrap_or_else(|| Arc::new(LogSpeech)),
    })
  }
}

impl Engine {
  /// Create an engine with default configuration.
  ///
  /// For custom configuration, use [`Engine::builder()`].
  pub fn new() -> TactoResult<Self> {
    Self::builder().build()
  }

  pub fn builder() -> EngineBuilder {
    EngineBuilder::default()
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Subscribe to engine events.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.events_keepalive.activate_cloned()
  }

  /// Tear down: drops elements, pending registrations and modes, and silences speech.
  pub fn dispose(&self) {
    self.write(|s| {
      s.pending.clear();
      s.clear_all();
      s.modes = Modes::default();
      s.magnifier.active = false;
    });
    self.stop_speaking();
    self.emit(Event::ModeChanged(Modes::default()));
  }

  /// Cancel in-flight speech.
  pub fn stop_speaking(&self) {
    self.speech.cancel();
    self.emit(Event::SpeechCancelled);
  }

  /// Read state. Never call the speech sink inside the closure.
  #[inline]
  pub(crate) fn read<R>(&self, f: impl FnOnce(&EngineState) -> R) -> R {
    f(&self.state.read())
  }

  /// Write state. Never call the speech sink inside the closure.
  #[inline]
  pub(crate) fn write<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
    f(&mut self.state.write())
  }

  pub(crate) fn emit(&self, event: Event) {
    if let Err(e) = self.events_tx.try_broadcast(event) {
      if e.is_full() {
        log::error!("Event channel overflow - events are being dropped.");
      }
    }
  }

  /// Hand utterances to the sink. Call with no lock held.
  pub(crate) fn speak(&self, utterances: impl IntoIterator<Item = Utterance>) {
    for utterance in utterances {
      if utterance.interrupt {
        self.speech.cancel();
      }
      if let Err(e) = self.speech.speak(&utterance) {
        log::warn!("Speech failed for {:?}: {e}", utterance.text);
      }
      self.emit(Event::Speech(utterance));
    }
  }
}
