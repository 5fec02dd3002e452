//! Post-task questionnaire.
//!
//! Untimed 1..5 items shown one at a time. Each item ends with exactly one
//! terminal value: the participant's rating, or `NoResponse` when the
//! experimenter skips it.

use conrat_core::{MarkerLabel, Rating, RatingResponse};

use super::PhaseContext;

/// What the controller should do after a questionnaire operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionnaireStep {
    /// More items remain
    Continue,
    /// The last item was recorded and `PostSurvey_End` emitted
    Completed,
}

/// The questionnaire stage.
#[derive(Debug)]
pub struct Questionnaire {
    questions: Vec<String>,
    index: usize,
}

impl Questionnaire {
    /// Opens the questionnaire. Emits `PostSurvey_Start`.
    ///
    /// An empty question list also emits `PostSurvey_End` and is complete at
    /// once.
    pub fn start(questions: &[String], ctx: &mut PhaseContext<'_>) -> Self {
        ctx.markers.emit(MarkerLabel::PostSurveyStart);
        if questions.is_empty() {
            ctx.markers.emit(MarkerLabel::PostSurveyEnd);
        }
        Self {
            questions: questions.to_vec(),
            index: 0,
        }
    }

    /// Records a rating for the current item. Values outside 1..=5 are ignored.
    pub fn answer(&mut self, value: u8, ctx: &mut PhaseContext<'_>) -> QuestionnaireStep {
        match Rating::new(value) {
            Some(rating) => self.record(RatingResponse::Rated(rating), ctx),
            None => {
                tracing::debug!(value, "questionnaire rating outside 1..=5 ignored");
                QuestionnaireStep::Continue
            }
        }
    }

    /// Records `NoResponse` for the current item.
    pub fn skip(&mut self, ctx: &mut PhaseContext<'_>) -> QuestionnaireStep {
        self.record(RatingResponse::NoResponse, ctx)
    }

    fn record(&mut self, response: RatingResponse, ctx: &mut PhaseContext<'_>) -> QuestionnaireStep {
        if self.is_complete() {
            return QuestionnaireStep::Completed;
        }
        ctx.markers.emit(MarkerLabel::PostQuestion {
            item: self.item_number(),
            response,
        });
        ctx.session.questionnaire_responses.push(response);
        ctx.session.questionnaire_index += 1;
        self.index += 1;

        if self.is_complete() {
            ctx.markers.emit(MarkerLabel::PostSurveyEnd);
            QuestionnaireStep::Completed
        } else {
            QuestionnaireStep::Continue
        }
    }

    /// 1-based number of the current item.
    #[must_use]
    pub fn item_number(&self) -> u32 {
        u32::try_from(self.index + 1).unwrap_or(u32::MAX)
    }

    /// Text of the current item.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.questions.get(self.index).map(String::as_str)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Whether every item has a terminal value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.index >= self.questions.len()
    }
}
