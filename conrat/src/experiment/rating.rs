//! Rated rest after each Connections block
//!
//! A countdown runs while a 1..5 spontaneity prompt is shown. The first valid
//! choice binds and is announced at once; the rest itself only ends on expiry
//! or a master skip. On the way out the prompt always yields exactly one
//! terminal value, falling back to `NoResponse`.

use conrat_core::{MarkerLabel, Rating, RatingResponse};

use super::{Phase, PhaseContext};
use crate::timer::{Countdown, CountdownStep, TimerId};

/// A single-assignment cell: the first `set` wins, later ones are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOnce<T>(Option<T>);

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T: Copy> WriteOnce<T> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Stores `value` if the cell is empty. Returns whether it was stored.
    pub fn set(&mut self, value: T) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(value);
        true
    }

    /// The stored value, if any.
    #[must_use]
    pub const fn get(&self) -> Option<T> {
        self.0
    }

    /// Whether a value has been stored.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

/// Result of routing a wakeup to the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestStep {
    /// Still counting
    Continue,
    /// The window closed; the prompt has been resolved
    Resolved(RatingResponse),
}

/// The post-block rest with its rating prompt.
#[derive(Debug)]
pub struct RatingPrompt {
    block: u32,
    countdown: Countdown,
    choice: WriteOnce<Rating>,
    resolved: bool,
}

impl RatingPrompt {
    /// Opens the rest for `block`.
    ///
    /// Emits `Connections<i>_Rest_Start` and starts the countdown.
    pub fn start(block: u32, seconds: u32, ctx: &mut PhaseContext<'_>) -> Self {
        ctx.markers
            .emit(MarkerLabel::ConnectionsRestStart { block });
        let countdown = Countdown::start(seconds, Phase::ConnectionsRest(block), ctx.scheduler);
        Self {
            block,
            countdown,
            choice: WriteOnce::new(),
            resolved: false,
        }
    }

    /// Offers a rating. Only the first valid one binds.
    ///
    /// Emits `ConnectionQ<i>_<value>` on binding. Returns whether it bound.
    pub fn choose(&mut self, value: u8, ctx: &mut PhaseContext<'_>) -> bool {
        if self.resolved {
            return false;
        }
        let Some(rating) = Rating::new(value) else {
            tracing::debug!(block = self.block, value, "rating outside 1..=5 ignored");
            return false;
        };
        if !self.choice.set(rating) {
            tracing::debug!(block = self.block, value, "rating already bound");
            return false;
        }
        ctx.markers.emit(MarkerLabel::ConnectionRating {
            block: self.block,
            response: RatingResponse::Rated(rating),
        });
        true
    }

    /// Routes a wakeup to the countdown; resolves on expiry.
    pub fn on_timer(&mut self, id: TimerId, ctx: &mut PhaseContext<'_>) -> RestStep {
        match self.countdown.on_fired(id, ctx.scheduler) {
            CountdownStep::Expired => RestStep::Resolved(self.resolve(ctx)),
            CountdownStep::Tick { .. } | CountdownStep::Stale => RestStep::Continue,
        }
    }

    /// Closes the rest now.
    ///
    /// Cancels the countdown, emits `ConnectionQ<i>_NoResponse` when nothing
    /// was chosen, emits `Connections<i>_Rest_End` and appends the terminal
    /// value to the session. A second call returns the same value and emits
    /// nothing.
    pub fn resolve(&mut self, ctx: &mut PhaseContext<'_>) -> RatingResponse {
        let response = self.response();
        if self.resolved {
            return response;
        }
        self.resolved = true;
        self.countdown.cancel(ctx.scheduler);

        if response == RatingResponse::NoResponse {
            ctx.markers.emit(MarkerLabel::ConnectionRating {
                block: self.block,
                response,
            });
        }
        ctx.markers
            .emit(MarkerLabel::ConnectionsRestEnd { block: self.block });
        ctx.session.spontaneity_ratings.push(response);
        response
    }

    fn response(&self) -> RatingResponse {
        self.choice
            .get()
            .map_or(RatingResponse::NoResponse, RatingResponse::Rated)
    }

    /// Block this rest follows.
    #[must_use]
    pub const fn block(&self) -> u32 {
        self.block
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// The bound rating, if any.
    #[must_use]
    pub const fn choice(&self) -> Option<Rating> {
        self.choice.get()
    }
}
