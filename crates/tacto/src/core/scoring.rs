/*!
Relevance scoring for hit-test candidates.

Scores are additive hand-tuned heuristics. Every constant lives in
[`ScoringWeights`] so hosts can recalibrate without touching the formula.
*/

use crate::core::hit_test::TargetingConfig;
use crate::core::registry::PrecisionElement;
use crate::types::{AccessibleElement, Circle, ElementKind, Point, NO_TEXT_PLACEHOLDER};

/// Weights for the candidate scoring formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
  /// Multiplier applied to the element's priority.
  pub priority_multiplier: f64,
  /// Bonus when the touch lies inside the element's rectangle.
  pub containment_bonus: f64,
  /// Extra containment bonus scaled by how centered the touch is.
  pub centering_bonus: f64,
  /// Distance (dp) at which the proximity bonus reaches zero.
  pub proximity_range: f64,
  pub proximity_bonus: f64,
  /// Fraction of screen area below which smaller elements earn a bonus.
  pub small_area_fraction: f64,
  pub small_area_bonus: f64,
  pub interactive_bonus: f64,
  pub button_bonus: f64,
  /// Fraction of screen area above which an element counts as a container.
  pub large_area_fraction: f64,
  pub large_area_penalty: f64,
  /// Labels longer than this many characters earn the text bonus.
  pub rich_text_min_len: usize,
  pub rich_text_bonus: f64,
  /// Multiplier for the relative lens overlap.
  pub lens_overlap_weight: f64,
}

impl Default for ScoringWeights {
  fn default() -> Self {
    Self {
      priority_multiplier: 10.0,
      containment_bonus: 50.0,
      centering_bonus: 20.0,
      proximity_range: 100.0,
      proximity_bonus: 30.0,
      small_area_fraction: 0.1,
      small_area_bonus: 20.0,
      interactive_bonus: 25.0,
      button_bonus: 10.0,
      large_area_fraction: 0.3,
      large_area_penalty: 30.0,
      rich_text_min_len: 5,
      rich_text_bonus: 15.0,
      lens_overlap_weight: 60.0,
    }
  }
}

/// Inputs shared by every candidate of one query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScoringContext<'a> {
  pub(crate) touch: Point,
  pub(crate) lens_radius: f64,
  pub(crate) screen_area: f64,
  pub(crate) weights: &'a ScoringWeights,
  pub(crate) targeting: &'a TargetingConfig,
}

impl ScoringContext<'_> {
  /// Score a candidate. Never negative.
  pub(crate) fn score(&self, element: &AccessibleElement, precision: &PrecisionElement) -> f64 {
    let w = self.weights;
    let bounds = element.bounds;
    let mut score = f64::from(element.priority) * w.priority_multiplier;

    if precision.bbox.contains(self.touch) {
      let normalized = precision.distance_from_touch / bounds.w.max(bounds.h);
      score += w.containment_bonus + w.centering_bonus * (1.0 - normalized).max(0.0);
    }

    score += ((w.proximity_range - precision.distance_from_touch) / w.proximity_range
      * w.proximity_bonus)
      .max(0.0);

    let small_area = self.screen_area * w.small_area_fraction;
    score += ((small_area - precision.area) / small_area * w.small_area_bonus).max(0.0);

    if element.interactive {
      score += w.interactive_bonus;
      if element.kind == ElementKind::Button {
        score += w.button_bonus;
      }
    }

    if precision.area > self.screen_area * w.large_area_fraction {
      score -= w.large_area_penalty;
    }

    if element.text_len() > w.rich_text_min_len && !element.text.contains(NO_TEXT_PLACEHOLDER) {
      score += w.rich_text_bonus;
    }

    if self.lens_radius > 0.0 {
      let lens = Circle::new(self.touch, self.lens_radius);
      score += lens.overlap_ratio(&bounds) * w.lens_overlap_weight;
    }

    score.max(0.0)
  }

  /// Reject winners that are too far, unlabeled, or cover most of the screen.
  pub(crate) fn is_valid_selection(
    &self,
    element: &AccessibleElement,
    precision: &PrecisionElement,
  ) -> bool {
    let t = self.targeting;
    if precision.distance_from_touch > t.max_selection_distance {
      log::debug!(
        "Rejected {}: {:.1}dp from touch",
        element.id,
        precision.distance_from_touch
      );
      return false;
    }
    if element.text_len() < t.min_text_len {
      log::debug!("Rejected {}: label too short", element.id);
      return false;
    }
    if precision.area / self.screen_area > t.max_selection_area_fraction {
      log::debug!("Rejected {}: covers most of the screen", element.id);
      return false;
    }
    true
  }
}
