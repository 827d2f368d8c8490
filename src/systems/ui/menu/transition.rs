//! Single-slot menu transition controller.
//!
//! Tracks the one in-flight open/close transition and reports progress and
//! completion through reducer-style ticks. The state machine is
//! Idle -> Transitioning(opening|closing, 0..1) -> Idle with no queueing;
//! callers that want a second transition must wait for or reset the first.
use enum_map::{enum_map, EnumMap};
use once_cell::sync::Lazy;

use bevy::prelude::*;

use super::defs::TransitionKind;

/// Easing curve applied by renderers to raw transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseOutQuad,
    EaseOutCubic,
}

impl Easing {
    /// Maps linear progress in [0, 1] onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Renderer-facing metadata for a transition kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionParams {
    pub easing: Easing,
    /// Duration used when a mode config carries none.
    pub fallback_duration: f32,
}

static TRANSITION_PARAMS: Lazy<EnumMap<TransitionKind, TransitionParams>> = Lazy::new(|| {
    enum_map! {
        TransitionKind::None => TransitionParams {
            easing: Easing::Linear,
            fallback_duration: 0.0,
        },
        TransitionKind::Fade => TransitionParams {
            easing: Easing::SmoothStep,
            fallback_duration: 0.2,
        },
        TransitionKind::Slide => TransitionParams {
            easing: Easing::EaseOutCubic,
            fallback_duration: 0.3,
        },
        TransitionKind::Scale => TransitionParams {
            easing: Easing::EaseOutQuad,
            fallback_duration: 0.25,
        },
    }
});

/// Looks up the easing/duration metadata for a transition kind.
pub fn transition_params(kind: TransitionKind) -> TransitionParams {
    TRANSITION_PARAMS[kind]
}

/// Progress/completion report produced by one controller mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransitionTick {
    pub updated: Option<(TransitionKind, f32)>,
    pub completed: Option<(TransitionKind, bool)>,
}

/// The single in-flight transition.
#[derive(Debug, Default)]
pub struct MenuTransitionController {
    kind: TransitionKind,
    opening: bool,
    progress: f32,
    duration: f32,
    active: bool,
}

impl MenuTransitionController {
    pub fn is_transitioning(&self) -> bool {
        self.active
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Direction of the current (or most recently started) transition.
    pub fn is_opening(&self) -> bool {
        self.opening
    }

    /// Raw linear progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress mapped through the active kind's easing curve.
    pub fn eased_progress(&self) -> f32 {
        transition_params(self.kind).easing.apply(self.progress)
    }

    /// Begins a transition.
    ///
    /// A second `start` while one is in flight is rejected with a warning;
    /// callers that intend to replace the in-flight transition reset first.
    pub fn start(&mut self, kind: TransitionKind, opening: bool, duration: f32) -> bool {
        if self.active {
            warn!("menu transition already in flight; start of {kind:?} rejected");
            return false;
        }
        self.kind = kind;
        self.opening = opening;
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.progress = 0.0;
        self.active = true;
        true
    }

    /// Sets progress directly, clamped to [0, 1].
    ///
    /// Reports an update each call; reaching 1.0 leaves the transitioning
    /// state and reports completion with the direction. Idle ticks are
    /// no-ops.
    pub fn set_progress(&mut self, progress: f32) -> TransitionTick {
        if !self.active {
            return TransitionTick::default();
        }
        self.progress = progress.clamp(0.0, 1.0);
        let mut tick = TransitionTick {
            updated: Some((self.kind, self.progress)),
            completed: None,
        };
        if self.progress >= 1.0 {
            self.active = false;
            tick.completed = Some((self.kind, self.opening));
        }
        tick
    }

    /// Advances progress by a time step.
    ///
    /// Linear stepping against the configured duration, so cumulative calls
    /// complete in approximately `duration` seconds. Non-positive durations
    /// complete on the first call.
    pub fn advance(&mut self, delta_secs: f32) -> TransitionTick {
        if !self.active {
            return TransitionTick::default();
        }
        if self.duration <= f32::EPSILON {
            return self.set_progress(1.0);
        }
        self.set_progress(self.progress + delta_secs.max(0.0) / self.duration)
    }

    /// Force-clears any in-flight transition without reporting completion.
    ///
    /// Renderers rely on the silence to tell forced resets apart from
    /// user-driven closes.
    pub fn reset(&mut self) {
        self.active = false;
        self.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_rejected_while_a_transition_is_in_flight() {
        let mut controller = MenuTransitionController::default();
        assert!(controller.start(TransitionKind::Fade, true, 0.2));
        assert!(!controller.start(TransitionKind::Slide, false, 0.3));
        assert_eq!(controller.kind(), TransitionKind::Fade);
        assert!(controller.is_opening());
    }

    #[test]
    fn advance_reaches_completion_in_roughly_the_configured_duration() {
        let mut controller = MenuTransitionController::default();
        controller.start(TransitionKind::Slide, true, 0.3);

        for _ in 0..2 {
            let tick = controller.advance(0.1);
            assert!(tick.updated.is_some());
            assert!(tick.completed.is_none());
        }
        let tick = controller.advance(0.1);
        assert_eq!(tick.completed, Some((TransitionKind::Slide, true)));
        assert!(!controller.is_transitioning());
        // Further ticks stay silent once idle.
        assert_eq!(controller.advance(0.1), TransitionTick::default());
    }

    #[test]
    fn zero_duration_completes_on_the_first_tick() {
        let mut controller = MenuTransitionController::default();
        controller.start(TransitionKind::None, false, 0.0);
        let tick = controller.advance(0.016);
        assert_eq!(tick.updated, Some((TransitionKind::None, 1.0)));
        assert_eq!(tick.completed, Some((TransitionKind::None, false)));
    }

    #[test]
    fn set_progress_clamps_and_completes_at_one() {
        let mut controller = MenuTransitionController::default();
        controller.start(TransitionKind::Scale, true, 1.0);

        let tick = controller.set_progress(-0.5);
        assert_eq!(tick.updated, Some((TransitionKind::Scale, 0.0)));

        let tick = controller.set_progress(1.7);
        assert_eq!(tick.updated, Some((TransitionKind::Scale, 1.0)));
        assert_eq!(tick.completed, Some((TransitionKind::Scale, true)));
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn reset_discards_progress_without_reporting_completion() {
        let mut controller = MenuTransitionController::default();
        controller.start(TransitionKind::Fade, true, 0.2);
        controller.advance(0.1);
        controller.reset();
        assert!(!controller.is_transitioning());
        assert_eq!(controller.progress(), 0.0);
        // The slot is free for the next transition.
        assert!(controller.start(TransitionKind::Fade, false, 0.2));
    }

    #[test]
    fn params_cover_every_kind_and_easing_hits_the_endpoints() {
        for kind in [
            TransitionKind::None,
            TransitionKind::Fade,
            TransitionKind::Slide,
            TransitionKind::Scale,
        ] {
            let params = transition_params(kind);
            assert!(params.fallback_duration >= 0.0);
            assert_eq!(params.easing.apply(0.0), 0.0);
            assert_eq!(params.easing.apply(1.0), 1.0);
        }
        assert!(Easing::EaseOutQuad.apply(0.5) > 0.5);
        assert!(Easing::SmoothStep.apply(0.25) < 0.25);
    }
}
