use std::time::{Duration, Instant};

use crate::{document::Document, placeholder::class};

/// Barrier over the images of a content region.
///
/// The gate opens once every tracked image has settled, successfully or not.
/// Images already settled when tracking starts never hold the gate.
#[derive(Debug, Clone)]
pub struct ImageGate<N> {
    pending: Vec<N>,
    opened_at: Option<Instant>,
}

impl<N: Clone + PartialEq> ImageGate<N> {
    /// Starts tracking every `img` below `root`
    pub fn track<D: Document<Node = N>>(document: &D, root: &N, now: Instant) -> Self {
        let mut pending = vec![];
        for img in document.query_selector_all_within(root, "img") {
            if document.image_status(&img).is_settled() {
                document.add_class(&img, class::LOADED);
            } else {
                pending.push(img);
            }
        }
        let mut gate = Self {
            pending,
            opened_at: None,
        };
        gate.check_open(now);
        gate
    }

    /// Re-reads the status of pending images.
    ///
    /// Returns the instant the gate opened at, if it is open.
    pub fn poll<D: Document<Node = N>>(&mut self, document: &D, now: Instant) -> Option<Instant> {
        self.pending.retain(|img| {
            if document.image_status(img).is_settled() {
                document.add_class(img, class::LOADED);
                false
            } else {
                true
            }
        });
        self.check_open(now)
    }

    /// Marks `img` as settled following a load or error event.
    ///
    /// Returns `false` when `img` was not pending on this gate.
    pub fn settle<D: Document<Node = N>>(&mut self, document: &D, img: &N, now: Instant) -> bool {
        let Some(index) = self.pending.iter().position(|p| p == img) else {
            return false;
        };
        self.pending.remove(index);
        document.add_class(img, class::LOADED);
        self.check_open(now);
        true
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }

    fn check_open(&mut self, now: Instant) -> Option<Instant> {
        if self.opened_at.is_none() && self.pending.is_empty() {
            self.opened_at = Some(now);
        }
        self.opened_at
    }
}

/// Time the placeholder must still stay visible at `now` to honor a minimum
/// display time of `min` counted from `shown_at`. Zero once it has elapsed.
pub fn remaining_display_time(min: Duration, shown_at: Instant, now: Instant) -> Duration {
    min.saturating_sub(now.saturating_duration_since(shown_at))
}
