/*!
Tacto - touch targeting and speech for screen-reader style exploration

UI adapters register what is on screen; the engine decides which element a
finger (or the magnifier lens) is over and what should be spoken.

```ignore
use tacto::{Bounds, ElementKind, ElementSpec, Engine, TouchEvent, TouchPhase};

let engine = Engine::builder()
    .screen_size(390.0, 844.0)
    .pixel_ratio(3.0)
    .voice_mode(true)
    .build()?;

// Immediate registration...
engine.register_element(ElementSpec::new(ElementKind::Button, "Confirmar", bounds));

// ...or debounced, tied to a mounted component
let attachment = engine.attach("title");
attachment.layout(ElementSpec::new(ElementKind::Text, "Bem-vindo", title_bounds));
engine.tick(Instant::now());

// Raw gestures in device pixels
engine.handle_touch(&TouchEvent::new(TouchPhase::Grant, 75.0, 75.0));

// Speech and state changes
let mut events = engine.subscribe();
while let Ok(event) = events.recv().await {
    // handle event
}
```
*/

mod core;
mod gestures;
mod scheduling;

pub mod speech;

mod types;
pub use types::*;

pub use crate::core::{
  Engine, EngineBuilder, EngineConfig, HitCandidate, HitRule, ScoringWeights, TargetingConfig,
};
pub use crate::gestures::{TouchEvent, TouchPhase};
pub use crate::scheduling::Attachment;
