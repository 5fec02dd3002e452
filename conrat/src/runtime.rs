//! Tokio runtime glue
//!
//! [`TokioScheduler`] turns scheduled wakeups into spawned sleeps, and
//! [`run_session`] is the single event loop that feeds input lines and fired
//! timers to the controller one at a time.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ConratError;
use crate::experiment::{Phase, SessionController};
use crate::frontend::{Presenter, parse_line};
use crate::timer::{Scheduler, TimerFired, TimerId};

// ============================================================================
// Scheduler
// ============================================================================

/// Production scheduler: one sleeping task per wakeup.
///
/// Each task holds a child of the scheduler's token, so cancelling one id,
/// dropping the scheduler, or cancelling the parent token all stop pending
/// sleeps. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerFired>,
    cancel: CancellationToken,
    pending: HashMap<TimerId, CancellationToken>,
    next_id: u64,
}

impl TokioScheduler {
    /// Creates a scheduler under `parent` and the receiver its wakeups
    /// arrive on.
    #[must_use]
    pub fn new(parent: &CancellationToken) -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            cancel: parent.child_token(),
            pending: HashMap::new(),
            next_id: 0,
        };
        (scheduler, rx)
    }

    /// Drops bookkeeping for a wakeup that has been received.
    pub fn forget(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }

    /// Wakeups scheduled and neither cancelled nor received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, owner: Phase) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        let token = self.cancel.child_token();
        self.pending.insert(id, token.clone());

        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    // The receiver is gone only when the session loop has ended.
                    let _ = tx.send(TimerFired { id, owner });
                }
            }
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(token) = self.pending.remove(&id) {
            token.cancel();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Why [`run_session`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The thank-you screen was acknowledged
    Finished,
    /// Input closed before the session finished
    EndOfInput,
    /// The cancellation token fired
    Cancelled,
}

/// Runs one session until it finishes, input ends, or `cancel` fires.
///
/// Renders the initial screen and again after every event.
///
/// # Errors
///
/// Returns an error if reading input or rendering fails.
pub async fn run_session<R, P>(
    controller: &mut SessionController<TokioScheduler>,
    timers: &mut mpsc::UnboundedReceiver<TimerFired>,
    input: R,
    presenter: &mut P,
    cancel: &CancellationToken,
) -> Result<SessionEnd, ConratError>
where
    R: AsyncBufRead + Unpin,
    P: Presenter,
{
    let mut lines = input.lines();
    presenter.render(&controller.screen())?;

    loop {
        if controller.is_finished() {
            tracing::info!(markers = controller.markers_emitted(), "session finished");
            return Ok(SessionEnd::Finished);
        }

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(phase = %controller.phase(), "session cancelled");
                return Ok(SessionEnd::Cancelled);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!(phase = %controller.phase(), "input closed before session finished");
                    return Ok(SessionEnd::EndOfInput);
                };
                match parse_line(&line, controller.phase()) {
                    Some(event) => controller.handle(event),
                    None => tracing::debug!(line = %line.trim(), phase = %controller.phase(), "unrecognized input"),
                }
            }
            Some(fired) = timers.recv() => {
                controller.scheduler_mut().forget(fired.id);
                controller.handle_timer(fired);
            }
        }

        presenter.render(&controller.screen())?;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use conrat_core::config::{ExperimentConfig, RatItem};
    use conrat_core::{PuzzleCatalog, PuzzleGroup};

    use super::*;
    use crate::experiment::InstructionKind;
    use crate::frontend::TerminalPresenter;
    use crate::markers::MemorySink;

    fn catalog() -> PuzzleCatalog {
        PuzzleCatalog::from_groups(vec![
            PuzzleGroup::new("Fish", ["bass", "carp", "pike", "sole"]),
            PuzzleGroup::new("Planets", ["mars", "venus", "earth", "saturn"]),
            PuzzleGroup::new("Colors", ["red", "blue", "green", "teal"]),
            PuzzleGroup::new("Trees", ["oak", "elm", "ash", "fir"]),
        ])
        .unwrap()
    }

    fn tiny_config() -> Arc<ExperimentConfig> {
        let mut config = ExperimentConfig::default();
        config.connections.blocks = 1;
        config.rat.items = vec![RatItem::new(["cottage", "swiss", "cake"], "cheese")];
        config.questionnaire.questions = vec!["Only question".to_string()];
        config.seed = Some(3);
        Arc::new(config)
    }

    #[tokio::test]
    async fn wakeups_arrive_in_due_order() {
        let root = CancellationToken::new();
        let (mut scheduler, mut rx) = TokioScheduler::new(&root);
        let late = scheduler.schedule(Duration::from_millis(40), Phase::Intro);
        let early = scheduler.schedule(Duration::from_millis(5), Phase::Exit);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.id, early);
        assert_eq!(first.owner, Phase::Exit);
        scheduler.forget(first.id);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.id, late);
        scheduler.forget(second.id);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn cancelled_wakeup_never_arrives() {
        let root = CancellationToken::new();
        let (mut scheduler, mut rx) = TokioScheduler::new(&root);
        let id = scheduler.schedule(Duration::from_millis(10), Phase::Intro);
        scheduler.cancel(id);
        scheduler.cancel(id);
        assert_eq!(scheduler.pending(), 0);

        let got = tokio::time::timeout(Duration::from_millis(60), rx.recv()).await;
        assert!(got.is_err(), "cancelled wakeup was delivered");
    }

    #[tokio::test]
    async fn parent_cancellation_stops_pending_sleeps() {
        let root = CancellationToken::new();
        let (mut scheduler, mut rx) = TokioScheduler::new(&root);
        scheduler.schedule(Duration::from_millis(10), Phase::Intro);
        root.cancel();

        let got = tokio::time::timeout(Duration::from_millis(60), rx.recv()).await;
        assert!(got.is_err());
    }

    #[tokio::test]
    async fn skips_alone_finish_a_session() {
        let root = CancellationToken::new();
        let (scheduler, mut rx) = TokioScheduler::new(&root);
        let sink = MemorySink::new();
        let mut controller =
            SessionController::new(tiny_config(), catalog(), scheduler, Box::new(sink.clone()));
        let mut presenter = TerminalPresenter::new(Vec::new());

        let mut script = String::from("P7\n");
        script.push_str(&".\n".repeat(20));
        let end = run_session(
            &mut controller,
            &mut rx,
            script.as_bytes(),
            &mut presenter,
            &root,
        )
        .await
        .unwrap();

        assert_eq!(end, SessionEnd::Finished);
        assert!(controller.is_finished());
        let texts = sink.texts();
        assert_eq!(texts.first().map(String::as_str), Some("PlayerP7_Session_Start"));
        assert!(texts.contains(&"PlayerP7_ConnectionQ1_NoResponse".to_string()));
        assert!(texts.contains(&"PlayerP7_RAT1_Response_N".to_string()));
        assert_eq!(texts.last().map(String::as_str), Some("PlayerP7_PostSurvey_End"));
        assert!(!presenter.into_inner().is_empty());
    }

    #[tokio::test]
    async fn end_of_input_stops_the_loop() {
        let root = CancellationToken::new();
        let (scheduler, mut rx) = TokioScheduler::new(&root);
        let mut controller = SessionController::new(
            tiny_config(),
            catalog(),
            scheduler,
            Box::new(MemorySink::new()),
        );
        let mut presenter = TerminalPresenter::new(Vec::new());

        let input = tokio_test::io::Builder::new()
            .read(b"P1\n")
            .read(b"\n")
            .build();
        let end = run_session(
            &mut controller,
            &mut rx,
            tokio::io::BufReader::new(input),
            &mut presenter,
            &root,
        )
        .await
        .unwrap();
        assert_eq!(end, SessionEnd::EndOfInput);
        assert_eq!(
            controller.phase(),
            Phase::Instructions(InstructionKind::Connections)
        );
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let root = CancellationToken::new();
        let (scheduler, mut rx) = TokioScheduler::new(&root);
        let mut controller = SessionController::new(
            tiny_config(),
            catalog(),
            scheduler,
            Box::new(MemorySink::new()),
        );
        let mut presenter = TerminalPresenter::new(Vec::new());
        root.cancel();

        let (_writer, reader) = tokio::io::duplex(64);
        let end = run_session(
            &mut controller,
            &mut rx,
            tokio::io::BufReader::new(reader),
            &mut presenter,
            &root,
        )
        .await
        .unwrap();
        assert_eq!(end, SessionEnd::Cancelled);
    }
}
