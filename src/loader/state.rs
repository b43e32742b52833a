use std::time::{Duration, Instant};

use super::preload::ImageGate;

/// Delay between the start of the placeholder fade and the content reveal, so
/// both transitions do not start on the same frame
pub const REVEAL_DELAY: Duration = Duration::from_millis(50);

/// Observable lifecycle state of a [`PanelLoader`](crate::PanelLoader).
///
/// ```text
/// Idle --show()--> Showing --hide()--> Revealing --fade elapsed--> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderState {
    /// No placeholder, content visible
    #[default]
    Idle,
    /// Placeholder displayed, waiting on images and the minimum duration
    Showing,
    /// Placeholder fading out, content fading in
    Revealing,
}

#[derive(Debug)]
pub(super) enum Phase<N> {
    Idle,
    Showing {
        shown_at: Instant,
        gate: ImageGate<N>,
        /// Set once the gate opened
        hide_at: Option<Instant>,
    },
    Revealing {
        started_at: Instant,
        content_revealed: bool,
    },
}

/// Transition due at a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Hide(Instant),
    Reveal,
    Finish,
}

impl<N> Phase<N> {
    pub(super) fn state(&self) -> LoaderState {
        match self {
            Phase::Idle => LoaderState::Idle,
            Phase::Showing { .. } => LoaderState::Showing,
            Phase::Revealing { .. } => LoaderState::Revealing,
        }
    }

    /// Earliest instant at which a time-driven transition is due.
    ///
    /// `None` when idle or while the image gate is still closed.
    pub(super) fn next_deadline(&self, fade: Duration) -> Option<Instant> {
        match self {
            Phase::Idle => None,
            Phase::Showing { hide_at, .. } => *hide_at,
            Phase::Revealing {
                started_at,
                content_revealed,
            } => {
                let reveal_at = *started_at + REVEAL_DELAY;
                let finish_at = *started_at + fade;
                if !content_revealed && reveal_at < finish_at {
                    Some(reveal_at)
                } else {
                    Some(finish_at)
                }
            }
        }
    }

    /// Time-driven step of the revealing phase due at `now`, if any.
    ///
    /// When the fade is shorter than [`REVEAL_DELAY`] the reveal is folded into
    /// [`Step::Finish`].
    pub(super) fn revealing_step(
        started_at: Instant,
        content_revealed: bool,
        fade: Duration,
        now: Instant,
    ) -> Option<Step> {
        let reveal_at = started_at + REVEAL_DELAY;
        let finish_at = started_at + fade;
        if !content_revealed && reveal_at < finish_at && reveal_at <= now {
            Some(Step::Reveal)
        } else if finish_at <= now {
            Some(Step::Finish)
        } else {
            None
        }
    }
}
