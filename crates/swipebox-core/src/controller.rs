#![forbid(unsafe_code)]

//! Interruptible animation controller.
//!
//! [`AnimationController`] drives one [`Tween`] at a time on the current
//! task, sleeping one frame between steps and handing each sampled value to
//! an update callback. It is the only writer of an animated value while a run
//! is active.
//!
//! # Supersession
//!
//! Every run captures a generation number. Starting a new run or calling
//! [`cancel`](AnimationController::cancel) bumps the controller's
//! generation; a run that wakes up and finds its captured generation stale
//! returns [`AnimationOutcome::Cancelled`] without delivering another step.
//! No lock is involved: the whole controller lives on one thread and the
//! check happens right after every suspension point.
//!
//! # Invariants
//!
//! 1. A cancelled run never reports [`AnimationOutcome::Completed`].
//! 2. A superseded run never calls its callback after the superseding run
//!    (or cancel) happened.
//! 3. A completed run's last delivered value is exactly the tween target.
//! 4. `is_running()` is false once the active run finishes, is cancelled, or
//!    its future is dropped.

use std::cell::Cell;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::Instrument;

use crate::tween::Tween;

/// Default pacing between animation steps (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How an animation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The target value was reached and delivered.
    Completed,
    /// A newer run or an explicit cancel superseded this run.
    Cancelled,
}

impl AnimationOutcome {
    /// `true` for [`AnimationOutcome::Completed`].
    #[inline]
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Runs interruptible tweens, one at a time.
pub struct AnimationController {
    generation: Cell<u64>,
    running: Cell<Option<u64>>,
    frame_interval: Duration,
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("generation", &self.generation.get())
            .field("running", &self.running.get().is_some())
            .field("frame_interval", &self.frame_interval)
            .finish()
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    /// Controller stepping at [`DEFAULT_FRAME_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    /// Controller stepping at `frame_interval`. Zero falls back to
    /// [`DEFAULT_FRAME_INTERVAL`].
    #[must_use]
    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            generation: Cell::new(0),
            running: Cell::new(None),
            frame_interval: if frame_interval.is_zero() {
                DEFAULT_FRAME_INTERVAL
            } else {
                frame_interval
            },
        }
    }

    /// Pacing between steps.
    #[inline]
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Current generation. Increments on every run start and every cancel.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Whether a run is currently delivering steps.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.get().is_some()
    }

    /// Stop the active run, if any. The animated value stays wherever the
    /// last delivered step left it.
    ///
    /// Returns `true` if a run was active.
    pub fn cancel(&self) -> bool {
        let was_running = self.running.take().is_some();
        self.bump();
        if was_running {
            tracing::trace!(
                message = "swipe.animation.cancel",
                generation = self.generation.get()
            );
        }
        was_running
    }

    /// Run `tween` to completion, calling `on_step` with each sampled value.
    ///
    /// Any run already in flight on this controller is superseded first.
    pub async fn run<F>(&self, tween: Tween, on_step: F) -> AnimationOutcome
    where
        F: FnMut(f32),
    {
        let generation = self.begin();
        let _guard = RunGuard {
            controller: self,
            generation,
        };

        let span = tracing::debug_span!(
            "swipe.animation",
            generation,
            from = tween.start(),
            to = tween.target(),
            duration_ms = tween.duration().as_millis() as u64,
            frames = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        let (outcome, frames) = self
            .drive(generation, tween, on_step)
            .instrument(span.clone())
            .await;
        span.record("frames", frames);
        span.record("outcome", outcome.as_str());
        outcome
    }

    async fn drive<F>(&self, generation: u64, tween: Tween, mut on_step: F) -> (AnimationOutcome, u32)
    where
        F: FnMut(f32),
    {
        if tween.duration().is_zero() {
            on_step(tween.target());
            return (AnimationOutcome::Completed, 1);
        }

        let started = Instant::now();
        let mut frames = 0u32;
        loop {
            let remaining = tween.duration().saturating_sub(started.elapsed());
            sleep(self.frame_interval.min(remaining)).await;

            if self.generation.get() != generation {
                return (AnimationOutcome::Cancelled, frames);
            }

            let elapsed = started.elapsed();
            let value = tween.sample(elapsed);
            frames += 1;
            tracing::trace!(message = "swipe.animation.step", generation, value);
            on_step(value);

            if tween.is_complete_at(elapsed) {
                return (AnimationOutcome::Completed, frames);
            }
        }
    }

    fn begin(&self) -> u64 {
        let generation = self.bump();
        self.running.set(Some(generation));
        generation
    }

    fn bump(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }
}

/// Clears the running marker when its run ends, however it ends.
struct RunGuard<'a> {
    controller: &'a AnimationController,
    generation: u64,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.controller.running.get() == Some(self.generation) {
            self.controller.running.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const MS_200: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn run_completes_at_target() {
        let controller = AnimationController::new();
        let values = RefCell::new(Vec::new());
        let outcome = controller
            .run(Tween::new(0.0, -300.0, MS_200), |v| values.borrow_mut().push(v))
            .await;

        assert_eq!(outcome, AnimationOutcome::Completed);
        let values = values.into_inner();
        assert_eq!(values.last().copied(), Some(-300.0));
        assert!(values.len() > 1, "expected intermediate steps");
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn steps_are_monotonic_toward_target() {
        let controller = AnimationController::new();
        let values = RefCell::new(vec![-300.0f32]);
        controller
            .run(Tween::new(-300.0, 0.0, MS_200), |v| values.borrow_mut().push(v))
            .await;
        let values = values.into_inner();
        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0], "non-monotonic: {pair:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_takes_the_configured_duration() {
        let controller = AnimationController::new();
        let start = Instant::now();
        controller.run(Tween::new(0.0, 1.0, MS_200), |_| {}).await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= MS_200 && elapsed < MS_200 + DEFAULT_FRAME_INTERVAL,
            "elapsed={elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_delivers_target_once() {
        let controller = AnimationController::new();
        let values = RefCell::new(Vec::new());
        let outcome = controller
            .run(Tween::new(-80.0, 0.0, Duration::ZERO), |v| {
                values.borrow_mut().push(v)
            })
            .await;
        assert_eq!(outcome, AnimationOutcome::Completed);
        assert_eq!(values.into_inner(), vec![0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_freezes_last_value() {
        let controller = AnimationController::new();
        let last = Cell::new(0.0f32);
        let run = controller.run(Tween::new(0.0, -300.0, MS_200), |v| last.set(v));
        let cancel = async {
            sleep(Duration::from_millis(70)).await;
            assert!(controller.cancel());
        };
        let (outcome, ()) = tokio::join!(run, cancel);

        assert_eq!(outcome, AnimationOutcome::Cancelled);
        let frozen = last.get();
        assert!(frozen < 0.0 && frozen > -300.0, "frozen={frozen}");
        assert!(!controller.is_running());

        sleep(MS_200).await;
        assert_eq!(last.get(), frozen, "no steps after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn newer_run_supersedes_older() {
        let controller = AnimationController::new();
        let log = RefCell::new(Vec::<(char, f32)>::new());
        let first = controller.run(Tween::new(0.0, -300.0, MS_200), |v| {
            log.borrow_mut().push(('a', v))
        });
        let second = async {
            sleep(Duration::from_millis(50)).await;
            controller
                .run(Tween::new(-100.0, 0.0, MS_200), |v| {
                    log.borrow_mut().push(('b', v))
                })
                .await
        };
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a, AnimationOutcome::Cancelled);
        assert_eq!(b, AnimationOutcome::Completed);
        let log = log.into_inner();
        let first_b = log.iter().position(|(tag, _)| *tag == 'b').expect("b ran");
        assert!(
            log[first_b..].iter().all(|(tag, _)| *tag == 'b'),
            "stale step after supersession: {log:?}"
        );
        assert_eq!(log.last().map(|(_, v)| *v), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_run_clears_running_flag() {
        let controller = AnimationController::new();
        let _ = tokio::time::timeout(
            Duration::from_millis(40),
            controller.run(Tween::new(0.0, 1.0, MS_200), |_| {}),
        )
        .await;
        assert!(!controller.is_running());
    }

    #[test]
    fn cancel_without_run_reports_idle() {
        let controller = AnimationController::new();
        let before = controller.generation();
        assert!(!controller.cancel());
        assert_eq!(controller.generation(), before + 1);
    }

    #[test]
    fn zero_frame_interval_falls_back() {
        let controller = AnimationController::with_frame_interval(Duration::ZERO);
        assert_eq!(controller.frame_interval(), DEFAULT_FRAME_INTERVAL);
    }
}
