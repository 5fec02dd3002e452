//! Remote Associates Test
//!
//! Items run back to back. Each item moves through
//! Think (countdown) → Reveal (answer shown, waiting for Yes/No) →
//! Rest (countdown) before the next item's Think begins. A master skip
//! shortens whatever wait is current but never drops a marker: skipping
//! Reveal counts as "No" and skipping Rest still emits `Rest_End`.

use conrat_core::config::{RatConfig, RatItem};
use conrat_core::{MarkerLabel, YesNo};

use super::{Phase, PhaseContext};
use crate::timer::{Countdown, CountdownStep, TimerId};

/// Where the current item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatStage {
    /// Cue words shown, countdown running
    Think,
    /// Answer shown, waiting for Yes/No
    Reveal,
    /// Resting before the next item
    Rest,
    /// Every item has finished
    Done,
}

/// What the controller should do after a RAT operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatStep {
    /// Stay in the RAT stage
    Continue,
    /// The last item's rest has ended
    Completed,
}

/// The whole RAT stage.
#[derive(Debug)]
pub struct RatTask {
    items: Vec<RatItem>,
    think_seconds: u32,
    rest_seconds: u32,
    index: usize,
    stage: RatStage,
    countdown: Option<Countdown>,
    response: Option<YesNo>,
}

impl RatTask {
    /// Starts the first item. With no items the task is immediately done.
    pub fn start(config: &RatConfig, ctx: &mut PhaseContext<'_>) -> Self {
        let mut task = Self {
            items: config.items.clone(),
            think_seconds: config.think_seconds,
            rest_seconds: config.rest_seconds,
            index: 0,
            stage: RatStage::Done,
            countdown: None,
            response: None,
        };
        if !task.items.is_empty() {
            task.begin_think(ctx);
        }
        task
    }

    /// 1-based number of the current item.
    #[must_use]
    pub fn item_number(&self) -> u32 {
        u32::try_from(self.index + 1).unwrap_or(u32::MAX)
    }

    fn begin_think(&mut self, ctx: &mut PhaseContext<'_>) {
        let item = self.item_number();
        self.stage = RatStage::Think;
        self.response = None;
        ctx.markers.emit(MarkerLabel::RatStart { item });
        self.countdown = Some(Countdown::start(
            self.think_seconds,
            Phase::RatThink(item),
            ctx.scheduler,
        ));
    }

    fn reveal(&mut self, ctx: &mut PhaseContext<'_>) {
        self.cancel_countdown(ctx);
        self.stage = RatStage::Reveal;
        tracing::debug!(item = self.item_number(), "answer revealed");
    }

    /// Records the Yes/No answer for the revealed item.
    ///
    /// Only accepted during Reveal, and only once. Emits
    /// `RAT<i>_Response_Y|N`, then `RAT<i>_End`, then `RAT<i>_Rest_Start`.
    pub fn answer(&mut self, answer: YesNo, ctx: &mut PhaseContext<'_>) -> RatStep {
        if self.stage != RatStage::Reveal || self.response.is_some() {
            tracing::debug!(item = self.item_number(), ?answer, stage = ?self.stage, "answer ignored");
            return RatStep::Continue;
        }
        let item = self.item_number();
        self.response = Some(answer);
        ctx.session.rat_responses.push(answer);
        ctx.markers.emit(MarkerLabel::RatResponse { item, answer });
        ctx.markers.emit(MarkerLabel::RatEnd { item });

        self.stage = RatStage::Rest;
        ctx.markers.emit(MarkerLabel::RatRestStart { item });
        self.countdown = Some(Countdown::start(
            self.rest_seconds,
            Phase::RatRest(item),
            ctx.scheduler,
        ));
        RatStep::Continue
    }

    fn end_rest(&mut self, ctx: &mut PhaseContext<'_>) -> RatStep {
        self.cancel_countdown(ctx);
        ctx.markers.emit(MarkerLabel::RatRestEnd {
            item: self.item_number(),
        });
        ctx.session.rat_index += 1;

        if self.index + 1 < self.items.len() {
            self.index += 1;
            self.begin_think(ctx);
            RatStep::Continue
        } else {
            self.stage = RatStage::Done;
            RatStep::Completed
        }
    }

    /// Routes a wakeup to the running countdown.
    pub fn on_timer(&mut self, id: TimerId, ctx: &mut PhaseContext<'_>) -> RatStep {
        let Some(countdown) = self.countdown.as_mut() else {
            return RatStep::Continue;
        };
        if countdown.on_fired(id, ctx.scheduler) != CountdownStep::Expired {
            return RatStep::Continue;
        }
        match self.stage {
            RatStage::Think => {
                self.reveal(ctx);
                RatStep::Continue
            }
            RatStage::Rest => self.end_rest(ctx),
            RatStage::Reveal | RatStage::Done => RatStep::Continue,
        }
    }

    /// Cuts the current wait short.
    ///
    /// Think → Reveal, Reveal → "No", Rest → `Rest_End` and the next item.
    /// No-op once done.
    pub fn force_advance(&mut self, ctx: &mut PhaseContext<'_>) -> RatStep {
        match self.stage {
            RatStage::Think => {
                self.reveal(ctx);
                RatStep::Continue
            }
            RatStage::Reveal => self.answer(YesNo::No, ctx),
            RatStage::Rest => self.end_rest(ctx),
            RatStage::Done => RatStep::Continue,
        }
    }

    fn cancel_countdown(&mut self, ctx: &mut PhaseContext<'_>) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel(ctx.scheduler);
        }
    }

    /// Phase tag for the current item and stage.
    ///
    /// A finished task reports the last item's rest.
    #[must_use]
    pub fn phase(&self) -> Phase {
        let item = self.item_number();
        match self.stage {
            RatStage::Think => Phase::RatThink(item),
            RatStage::Reveal => Phase::RatReveal(item),
            RatStage::Rest | RatStage::Done => Phase::RatRest(item),
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> RatStage {
        self.stage
    }

    /// The current item, if any remain.
    #[must_use]
    pub fn current(&self) -> Option<&RatItem> {
        self.items.get(self.index)
    }

    /// Total number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the task has no items at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Seconds left on the running countdown, if one is running.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    /// Whether every item has finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.stage == RatStage::Done
    }
}
