/*!
RPC request/response types and dispatch.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tacto::{
  AccessibleElement, ElementId, ElementSpec, Engine, HitCandidate, MagnifierHit, MagnifierState,
  Modes, Snapshot, TactoError, TouchEvent,
};
use ts_rs::TS;

/// RPC request.
#[derive(Debug, Deserialize, TS)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
#[ts(export)]
pub enum RpcRequest {
  /// Get a snapshot of current state.
  Snapshot,
  /// Register or replace an element immediately.
  Register(ElementSpec),
  Unregister { element_id: ElementId },
  /// Remove every element.
  Clear,
  Count,
  /// Best element at a point (dp).
  ElementAt { x: f64, y: f64 },
  /// Every candidate at a point, with scores. For debugging targeting.
  Candidates {
    x: f64,
    y: f64,
    #[serde(default)]
    lens_radius: f64,
  },
  /// Elements under a lens. Missing fields use the current magnifier.
  UnderMagnifier {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    radius: Option<f64>,
  },
  /// Elements under the lens at its current position.
  MagnifierElements,
  Modes,
  ToggleVoice,
  ToggleMagnifier,
  /// Move the lens without announcing.
  MagnifierPosition { x: f64, y: f64 },
  /// Raw gesture sample in device pixels.
  Touch(TouchEvent),
  StopSpeaking,
}

/// RPC response.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RpcResponse {
  /// Full state snapshot.
  Snapshot(Box<Snapshot>),
  ElementId(ElementId),
  /// Optional element.
  OptionalElement(Option<Box<AccessibleElement>>),
  Candidates(Vec<HitCandidate>),
  Hits(Vec<MagnifierHit>),
  Magnifier(Box<MagnifierState>),
  Modes(Modes),
  Count(usize),
  Flag(bool),
  /// No data.
  Null,
}

pub fn dispatch_json(engine: &Engine, method: &str, args: &JsonValue) -> JsonValue {
  let request_value = json!({ "method": method, "args": args });

  match serde_json::from_value::<RpcRequest>(request_value) {
    Ok(request) => match dispatch(engine, request) {
      Ok(response) => json!({ "result": response }),
      Err(e) => {
        log::warn!("[rpc] {method} failed: {e}");
        json!({ "error": e })
      }
    },
    Err(e) => {
      log::warn!("[rpc] Invalid request for {method}: {e}");
      json!({ "error": format!("Invalid request: {}", e) })
    }
  }
}

pub fn dispatch(engine: &Engine, request: RpcRequest) -> Result<RpcResponse, String> {
  match request {
    RpcRequest::Snapshot => Ok(RpcResponse::Snapshot(Box::new(engine.snapshot()))),

    RpcRequest::Register(spec) => {
      let id = engine
        .try_register_element(spec)
        .map_err(|e| e.to_string())?;
      Ok(RpcResponse::ElementId(id))
    }

    RpcRequest::Unregister { element_id } => {
      if engine.unregister_element(&element_id) {
        Ok(RpcResponse::Null)
      } else {
        Err(TactoError::ElementNotFound(element_id).to_string())
      }
    }

    RpcRequest::Clear => {
      engine.clear_all_elements();
      Ok(RpcResponse::Null)
    }

    RpcRequest::Count => Ok(RpcResponse::Count(engine.element_count())),

    RpcRequest::ElementAt { x, y } => {
      let element = engine.find_element_at_position(x, y);
      Ok(RpcResponse::OptionalElement(element.map(Box::new)))
    }

    RpcRequest::Candidates { x, y, lens_radius } => Ok(RpcResponse::Candidates(
      engine.candidates_at(x, y, lens_radius),
    )),

    RpcRequest::UnderMagnifier { x, y, radius } => Ok(RpcResponse::Hits(
      engine.elements_under_magnifier(x, y, radius),
    )),

    RpcRequest::MagnifierElements => Ok(RpcResponse::Hits(
      engine.elements_at_magnifier_position(),
    )),

    RpcRequest::Modes => Ok(RpcResponse::Modes(engine.modes())),

    RpcRequest::ToggleVoice => Ok(RpcResponse::Flag(engine.toggle_voice_mode())),

    RpcRequest::ToggleMagnifier => Ok(RpcResponse::Flag(engine.toggle_magnifier_mode())),

    RpcRequest::MagnifierPosition { x, y } => {
      let magnifier = engine.update_magnifier_position(x, y);
      Ok(RpcResponse::Magnifier(Box::new(magnifier)))
    }

    RpcRequest::Touch(event) => {
      let element = engine.handle_touch(&event);
      Ok(RpcResponse::OptionalElement(element.map(Box::new)))
    }

    RpcRequest::StopSpeaking => {
      engine.stop_speaking();
      Ok(RpcResponse::Null)
    }
  }
}
