/*!
Debounced element registration.

UI adapters report layouts as they settle. Each report replaces the pending
registration for that id and fires after the debounce delay, so at most one
task is pending per id. The host drives time with [`Engine::tick`].

Liveness: every [`Attachment`] carries a generation. Detaching (or dropping)
it cancels the pending task and unregisters the element; a task or detach
from a superseded generation is a no-op, so an unregister always wins over a
late layout.

```ignore
let attachment = engine.attach("confirm");
attachment.layout(ElementSpec::new(ElementKind::Button, "Confirmar", bounds));
// ... each frame
engine.tick(Instant::now());
// on unmount
drop(attachment);
```
*/

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::Engine;
use crate::types::{ElementId, ElementSpec};

struct PendingTask {
  spec: ElementSpec,
  due: Instant,
}

pub(crate) struct PendingRegistrations {
  debounce: Duration,
  tasks: HashMap<ElementId, PendingTask>,
  /// Live attachment generation per id.
  live: HashMap<ElementId, u64>,
  next_generation: u64,
}

impl PendingRegistrations {
  pub(crate) fn new(debounce: Duration) -> Self {
    Self {
      debounce,
      tasks: HashMap::new(),
      live: HashMap::new(),
      next_generation: 0,
    }
  }

  /// Start a new generation for `id`, superseding any previous attachment.
  pub(crate) fn attach(&mut self, id: &ElementId) -> u64 {
    self.next_generation += 1;
    self.tasks.remove(id);
    self.live.insert(id.clone(), self.next_generation);
    self.next_generation
  }

  pub(crate) fn is_live(&self, id: &ElementId, generation: u64) -> bool {
    self.live.get(id) == Some(&generation)
  }

  /// Replace the pending task for `id`. Returns false for a dead generation.
  pub(crate) fn schedule(
    &mut self,
    id: &ElementId,
    generation: u64,
    mut spec: ElementSpec,
    now: Instant,
  ) -> bool {
    if !self.is_live(id, generation) {
      log::debug!("Ignoring layout for detached {id}");
      return false;
    }
    spec.id = Some(id.clone());
    self.tasks.insert(
      id.clone(),
      PendingTask {
        spec,
        due: now + self.debounce,
      },
    );
    true
  }

  /// End a generation. Returns true if it was live (caller must unregister).
  pub(crate) fn detach(&mut self, id: &ElementId, generation: u64) -> bool {
    if !self.is_live(id, generation) {
      return false;
    }
    self.live.remove(id);
    self.tasks.remove(id);
    true
  }

  pub(crate) fn cancel(&mut self, id: &ElementId) -> bool {
    self.tasks.remove(id).is_some()
  }

  /// Remove and return every task due at `now`, oldest first.
  pub(crate) fn take_due(&mut self, now: Instant) -> Vec<ElementSpec> {
    let mut due: Vec<(ElementId, Instant)> = self
      .tasks
      .iter()
      .filter(|(_, task)| task.due <= now)
      .map(|(id, task)| (id.clone(), task.due))
      .collect();
    due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    due
      .into_iter()
      .filter_map(|(id, _)| self.tasks.remove(&id))
      .map(|task| task.spec)
      .collect()
  }

  pub(crate) fn next_due(&self) -> Option<Instant> {
    self.tasks.values().map(|task| task.due).min()
  }

  pub(crate) fn len(&self) -> usize {
    self.tasks.len()
  }

  /// Drop every queued task. Live attachments stay live and may lay out again.
  pub(crate) fn cancel_all(&mut self) {
    self.tasks.clear();
  }

  pub(crate) fn clear(&mut self) {
    self.cancel_all();
    self.live.clear();
  }
}

/// A UI component's claim on an element id. Unregisters on drop.
#[derive(Debug)]
pub struct Attachment {
  id: ElementId,
  generation: u64,
  engine: Engine,
}

impl Attachment {
  pub fn id(&self) -> &ElementId {
    &self.id
  }

  /// Report a new layout; registration happens after the debounce delay.
  pub fn layout(&self, spec: ElementSpec) -> bool {
    self.layout_at(spec, Instant::now())
  }

  /// [`Attachment::layout`] with an explicit clock.
  pub fn layout_at(&self, spec: ElementSpec, now: Instant) -> bool {
    self
      .engine
      .write(|s| s.pending.schedule(&self.id, self.generation, spec, now))
  }

  /// Whether this attachment still owns its id.
  pub fn is_live(&self) -> bool {
    self
      .engine
      .read(|s| s.pending.is_live(&self.id, self.generation))
  }

  /// Cancel pending work and unregister. Same as dropping.
  pub fn detach(self) {}
}

impl Drop for Attachment {
  fn drop(&mut self) {
    let (id, generation) = (&self.id, self.generation);
    let removed = self.engine.write(|s| {
      if s.pending.detach(id, generation) {
        s.unregister(id)
      } else {
        false
      }
    });
    if removed {
      log::debug!("Detached {id}");
    }
  }
}

impl Engine {
  /// Claim an element id for a mounted UI component.
  ///
  /// A second attachment for the same id supersedes the first.
  pub fn attach(&self, id: impl Into<ElementId>) -> Attachment {
    let id = id.into();
    let generation = self.write(|s| s.pending.attach(&id));
    Attachment {
      id,
      generation,
      engine: self.clone(),
    }
  }

  /// Apply every registration whose debounce delay has elapsed.
  /// Returns how many elements were registered.
  pub fn tick(&self, now: Instant) -> usize {
    self.write(|s| {
      s.pending
        .take_due(now)
        .into_iter()
        .filter_map(|spec| match s.register(spec) {
          Ok(id) => Some(id),
          Err(e) => {
            log::debug!("Dropping debounced registration: {e}");
            None
          }
        })
        .count()
    })
  }

  /// When the next pending registration is due, if any.
  pub fn next_registration_due(&self) -> Option<Instant> {
    self.read(|s| s.pending.next_due())
  }

  pub fn pending_registrations(&self) -> usize {
    self.read(|s| s.pending.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Bounds, ElementKind};

  fn engine() -> Engine {
    Engine::builder().registration_debounce_ms(100).build().unwrap()
  }

  fn spec(x: f64) -> ElementSpec {
    ElementSpec::new(ElementKind::Button, "Confirmar", Bounds::new(x, 0.0, 50.0, 50.0))
  }

  const fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
  }

  #[test]
  fn registers_after_debounce() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    assert!(attachment.layout_at(spec(0.0), t0));

    assert_eq!(engine.tick(t0 + ms(50)), 0);
    assert_eq!(engine.element_count(), 0);
    assert_eq!(engine.tick(t0 + ms(100)), 1);
    assert_eq!(engine.element_count(), 1);
    assert_eq!(engine.pending_registrations(), 0);
  }

  #[test]
  fn new_layout_replaces_pending_task() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    attachment.layout_at(spec(80.0), t0 + ms(60));
    assert_eq!(engine.pending_registrations(), 1);

    assert_eq!(engine.tick(t0 + ms(100)), 0, "first task was replaced");
    assert_eq!(engine.tick(t0 + ms(160)), 1);
    let element = engine.element(&ElementId::from("confirm")).unwrap();
    assert_eq!(element.bounds.x, 80.0);
  }

  #[test]
  fn drop_cancels_pending_registration() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    drop(attachment);

    assert_eq!(engine.tick(t0 + ms(500)), 0);
    assert_eq!(engine.element_count(), 0);
  }

  #[test]
  fn drop_unregisters_element() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    engine.tick(t0 + ms(100));
    assert_eq!(engine.element_count(), 1);

    attachment.detach();
    assert_eq!(engine.element_count(), 0);
  }

  #[test]
  fn superseded_attachment_cannot_unregister() {
    let engine = engine();
    let t0 = Instant::now();
    let old = engine.attach("confirm");
    let new = engine.attach("confirm");
    assert!(!old.is_live());
    assert!(!old.layout_at(spec(0.0), t0), "stale layout is ignored");

    new.layout_at(spec(10.0), t0);
    engine.tick(t0 + ms(100));
    drop(old);
    assert_eq!(engine.element_count(), 1, "old attachment must not unregister");
  }

  #[test]
  fn unregister_cancels_pending_layout() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    engine.unregister_element(attachment.id());

    assert_eq!(engine.tick(t0 + ms(100)), 0);
    assert_eq!(engine.element_count(), 0);
  }

  #[test]
  fn invalid_layout_is_dropped_silently() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("empty");
    attachment.layout_at(
      ElementSpec::new(ElementKind::Text, " ", Bounds::new(0.0, 0.0, 10.0, 10.0)),
      t0,
    );
    assert_eq!(engine.tick(t0 + ms(100)), 0);
    assert_eq!(engine.element_count(), 0);
  }

  #[test]
  fn next_due_reports_earliest_task() {
    let engine = engine();
    let t0 = Instant::now();
    let a = engine.attach("a");
    let b = engine.attach("b");
    a.layout_at(spec(0.0), t0 + ms(30));
    b.layout_at(spec(60.0), t0);
    assert_eq!(engine.next_registration_due(), Some(t0 + ms(100)));
  }

  #[test]
  fn clear_drops_pending_layouts() {
    let engine = engine();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    engine.clear_all_elements();
    assert_eq!(engine.pending_registrations(), 0);

    assert_eq!(engine.tick(t0 + ms(100)), 0);
    assert_eq!(engine.element_count(), 0);

    assert!(attachment.is_live());
    assert!(attachment.layout_at(spec(0.0), t0 + ms(200)));
    assert_eq!(engine.tick(t0 + ms(300)), 1);
  }

  #[test]
  fn last_mode_off_drops_pending_layouts() {
    let engine = Engine::builder()
      .registration_debounce_ms(100)
      .voice_mode(true)
      .build()
      .unwrap();
    let t0 = Instant::now();
    let attachment = engine.attach("confirm");
    attachment.layout_at(spec(0.0), t0);
    assert!(!engine.toggle_voice_mode());

    assert_eq!(engine.tick(t0 + ms(100)), 0);
    assert_eq!(engine.element_count(), 0);
  }
}
