//! Transient "just added" / "just removed" pulses on favorite buttons.
//!
//! Pulses are decoration only. The pulse class is additive to the
//! `is-active` state owned by [`crate::sync`], and is always cleared after
//! its duration. Re-triggering a pulse on the same button cancels the
//! pending clear, drops both pulse classes, forces a reflow and starts over.

use crate::config::AnimationConfig;
use crate::dom::{Page, Timer, TimerId, classes};

/// Which pulse to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Added,
    Removed,
}

impl Pulse {
    /// Pulse matching a resulting membership state.
    #[must_use]
    pub const fn for_state(is_favorite: bool) -> Self {
        if is_favorite { Self::Added } else { Self::Removed }
    }

    /// CSS class carrying the animation.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Added => classes::JUST_ADDED,
            Self::Removed => classes::JUST_REMOVED,
        }
    }
}

/// Tracks the pending clear timer of every pulsing button.
#[derive(Debug)]
pub struct Animator<E> {
    timings: AnimationConfig,
    pending: Vec<(E, TimerId)>,
}

impl<E: Clone + PartialEq> Animator<E> {
    #[must_use]
    pub const fn new(timings: AnimationConfig) -> Self {
        Self {
            timings,
            pending: Vec::new(),
        }
    }

    /// Start (or restart) a pulse on `button`.
    pub fn play<P: Page<Element = E>>(&mut self, page: &P, button: &E, pulse: Pulse) {
        if let Some(index) = self.pending.iter().position(|(el, _)| el == button) {
            let (_, timer) = self.pending.swap_remove(index);
            page.clear_timeout(timer);
        }

        clear_pulse_classes(page, button);
        page.force_reflow(button);
        page.toggle_class(button, pulse.class(), true);

        let duration = match pulse {
            Pulse::Added => self.timings.added,
            Pulse::Removed => self.timings.removed,
        };
        let timer = page.set_timeout(duration, Timer::EndPulse(button.clone()));
        self.pending.push((button.clone(), timer));
    }

    /// Clear the pulse on `button` once its timer elapsed.
    pub fn finish<P: Page<Element = E>>(&mut self, page: &P, button: &E) {
        self.pending.retain(|(el, _)| el != button);
        clear_pulse_classes(page, button);
    }

    /// Number of buttons with a pulse in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

fn clear_pulse_classes<P: Page>(page: &P, button: &P::Element) {
    page.toggle_class(button, classes::JUST_ADDED, false);
    page.toggle_class(button, classes::JUST_REMOVED, false);
}
