/*!
Speech output seam.

The engine decides *what* to say; a [`SpeechSink`] decides how. Interrupting
utterances are preceded by a `cancel()` call so at most one utterance is
active. Sink failures are logged and swallowed by the engine.
*/

use parking_lot::Mutex;

use crate::types::{TactoResult, Utterance};

/// A text-to-speech backend.
pub trait SpeechSink: Send + Sync + 'static {
  /// Start (or queue, when `utterance.interrupt` is false) an utterance.
  fn speak(&self, utterance: &Utterance) -> TactoResult<()>;

  /// Stop any in-flight utterance.
  fn cancel(&self);
}

/// Default sink: writes utterances to the log.
///
/// Hosts that synthesize speech outside the process (for example the UI
/// adapter listening to `speech:utterance` events) can keep this sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeech;

impl SpeechSink for LogSpeech {
  fn speak(&self, utterance: &Utterance) -> TactoResult<()> {
    log::info!("[speech] {}", utterance.text);
    Ok(())
  }

  fn cancel(&self) {
    log::trace!("[speech] cancel");
  }
}

/// Records utterances instead of speaking them. For tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
  log: Mutex<Vec<SpeechCall>>,
}

/// One call made on a [`RecordingSpeech`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCall {
  Speak(Utterance),
  Cancel,
}

impl RecordingSpeech {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every call, in order.
  pub fn calls(&self) -> Vec<SpeechCall> {
    self.log.lock().clone()
  }

  /// Texts of spoken utterances, in order.
  pub fn spoken(&self) -> Vec<String> {
    self
      .log
      .lock()
      .iter()
      .filter_map(|call| match call {
        SpeechCall::Speak(utterance) => Some(utterance.text.clone()),
        SpeechCall::Cancel => None,
      })
      .collect()
  }

  pub fn clear(&self) {
    self.log.lock().clear();
  }
}

impl SpeechSink for RecordingSpeech {
  fn speak(&self, utterance: &Utterance) -> TactoResult<()> {
    self.log.lock().push(SpeechCall::Speak(utterance.clone()));
    Ok(())
  }

  fn cancel(&self) {
    self.log.lock().push(SpeechCall::Cancel);
  }
}
