#![forbid(unsafe_code)]

//! Per-panel drag and animation state machine.
//!
//! A [`SwipePanel`] tracks how far its foreground layer is translated
//! (`offset`, in pixels, `0` = closed, `-reveal_width` = fully open) and
//! decides, when a drag is released, whether to settle open or closed.
//!
//! # State Machine
//!
//! ```text
//!                 drag start                 drag end (threshold)
//! RestingClosed ─────────────▶ Dragging ───────────────────────▶ AnimatingOpen / AnimatingClose
//! RestingOpen   ─────────────▶    ▲                                  │
//!       ▲                         │ drag start (cancels animation)   │ completes
//!       └─────────────────────────┴──────────────────────────────────┘
//! open()/close() from a resting state go straight to the animating state.
//! ```
//!
//! # Invariants
//!
//! 1. `offset` stays in `[-reveal_width, 0]`.
//! 2. Drag deltas only land strictly inside `(-reveal_width, 0)`; the exact
//!    bounds are reachable only through `open()`/`close()`.
//! 3. Dragging and a programmatic animation never both write `offset`:
//!    drag start cancels the animation, and a new animation supersedes the
//!    previous one through the controller's generation counter.
//! 4. `is_open` changes only when an open/close transition completes.
//! 5. `is_dragging` is reset when `on_drag_end` finishes, fails, or its
//!    future is dropped.
//!
//! # Threading
//!
//! Panels are `Rc`-based handles for the UI thread. Cloning a panel yields
//! another handle to the same state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{LocalBoxFuture, join, join_all};
#[cfg(feature = "serde")]
use serde::Serialize;
use swipebox_core::{AnimationController, AnimationOutcome, Observable, Subscription, Tween};

use crate::config::SwipeConfig;

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// Resting position a released drag or a programmatic call settles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SnapTarget {
    /// `offset == -reveal_width`.
    Open,
    /// `offset == 0`.
    Closed,
}

impl SnapTarget {
    /// Stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Where a panel is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PanelPhase {
    /// At rest with the background hidden.
    #[default]
    RestingClosed,
    /// Following the user's drag.
    Dragging,
    /// Animating toward fully open.
    AnimatingOpen,
    /// Animating toward fully closed.
    AnimatingClose,
    /// At rest with the background fully revealed.
    RestingOpen,
}

impl PanelPhase {
    /// Whether a programmatic animation owns the offset.
    #[inline]
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::AnimatingOpen | Self::AnimatingClose)
    }

    /// Whether nothing is driving the offset.
    #[inline]
    #[must_use]
    pub fn is_resting(self) -> bool {
        matches!(self, Self::RestingClosed | Self::RestingOpen)
    }
}

/// Read-only view of a panel for rendering and inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PanelSnapshot {
    pub offset: f32,
    pub reveal_width: f32,
    pub progress: f32,
    pub enabled: bool,
    pub is_open: bool,
    pub is_dragging: bool,
    pub phase: PanelPhase,
}

/// Normalized reveal amount: `clamp(|offset| / reveal_width, 0, 1)`, or `0`
/// when there is nothing to reveal.
#[must_use]
pub fn progress_for(offset: f32, reveal_width: f32) -> f32 {
    if !(reveal_width > 0.0) {
        return 0.0;
    }
    let ratio = offset.abs() / reveal_width;
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}

struct PanelInner {
    id: u64,
    config: SwipeConfig,
    offset: Cell<f32>,
    reveal_width: Cell<f32>,
    enabled: Cell<bool>,
    is_open: Cell<bool>,
    dragging: Observable<bool>,
    drag_session: Cell<u64>,
    animating_toward: Cell<Option<SnapTarget>>,
    animator: AnimationController,
    release_work: RefCell<Vec<LocalBoxFuture<'static, usize>>>,
}

/// Swipe-to-reveal state for one foreground/background pair.
#[derive(Clone)]
pub struct SwipePanel {
    inner: Rc<PanelInner>,
}

impl std::fmt::Debug for SwipePanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipePanel")
            .field("id", &self.inner.id)
            .field("offset", &self.offset())
            .field("reveal_width", &self.reveal_width())
            .field("phase", &self.phase())
            .field("enabled", &self.enabled())
            .finish()
    }
}

impl Default for SwipePanel {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

impl SwipePanel {
    /// Create a closed panel with zero reveal width.
    ///
    /// Out-of-range config values are repaired (see
    /// [`SwipeConfig::sanitized`]).
    #[must_use]
    pub fn new(config: SwipeConfig) -> Self {
        let config = config.sanitized();
        Self {
            inner: Rc::new(PanelInner {
                id: NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed),
                config,
                offset: Cell::new(0.0),
                reveal_width: Cell::new(0.0),
                enabled: Cell::new(true),
                is_open: Cell::new(false),
                dragging: Observable::new(false),
                drag_session: Cell::new(0),
                animating_toward: Cell::new(None),
                animator: AnimationController::with_frame_interval(config.frame_interval),
                release_work: RefCell::new(Vec::new()),
            }),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Process-unique id, used in logs.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Configuration this panel was built with (after sanitizing).
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SwipeConfig {
        &self.inner.config
    }

    /// Foreground translation in pixels, in `[-reveal_width, 0]`.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.inner.offset.get()
    }

    /// Foreground translation as whole pixels for layout placement.
    #[must_use]
    pub fn render_offset(&self) -> i32 {
        self.offset().min(0.0).round() as i32
    }

    /// Width of the background action layer.
    #[inline]
    #[must_use]
    pub fn reveal_width(&self) -> f32 {
        self.inner.reveal_width.get()
    }

    /// Commit boundary in pixels: `reveal_width * threshold_ratio`.
    #[must_use]
    pub fn threshold_px(&self) -> f32 {
        self.reveal_width() * self.inner.config.threshold_ratio
    }

    /// See [`progress_for`].
    #[must_use]
    pub fn progress(&self) -> f32 {
        progress_for(self.offset(), self.reveal_width())
    }

    /// Whether drag input is accepted.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Accept or ignore future drag input.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.set(enabled);
    }

    /// `true` once an open transition completed, until a close completes.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_open.get()
    }

    /// `true` between drag start and the end of drag-release handling.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.inner.dragging.get()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PanelPhase {
        if self.inner.animator.is_running() {
            match self.inner.animating_toward.get() {
                Some(SnapTarget::Open) => return PanelPhase::AnimatingOpen,
                Some(SnapTarget::Closed) => return PanelPhase::AnimatingClose,
                None => {}
            }
        }
        if self.is_dragging() {
            PanelPhase::Dragging
        } else if self.is_open() {
            PanelPhase::RestingOpen
        } else {
            PanelPhase::RestingClosed
        }
    }

    /// Copy of everything a renderer or inspector needs.
    #[must_use]
    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            offset: self.offset(),
            reveal_width: self.reveal_width(),
            progress: self.progress(),
            enabled: self.enabled(),
            is_open: self.is_open(),
            is_dragging: self.is_dragging(),
            phase: self.phase(),
        }
    }

    /// Whether both handles point at the same panel.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Observe `is_dragging` transitions. Dropping the guard unsubscribes.
    pub fn subscribe_dragging(&self, callback: impl Fn(bool) + 'static) -> Subscription<bool> {
        self.inner.dragging.subscribe(callback)
    }

    /// Where a drag released right now would settle.
    #[must_use]
    pub fn release_target(&self) -> SnapTarget {
        let width = self.reveal_width();
        if !(width > 0.0) {
            return SnapTarget::Closed;
        }
        let threshold = self.threshold_px();
        let revealed = self.offset().abs();
        if self.is_open() {
            if width - revealed > threshold {
                SnapTarget::Closed
            } else {
                SnapTarget::Open
            }
        } else if revealed < threshold {
            SnapTarget::Closed
        } else {
            SnapTarget::Open
        }
    }

    // ── Layout input ──────────────────────────────────────────────────────

    /// Update the measured background width.
    ///
    /// Negative or NaN widths count as `0`. The offset is re-clamped into
    /// the new range, and a panel resting open stays fully open.
    pub fn set_reveal_width(&self, px: f32) {
        let width = if px > 0.0 { px } else { 0.0 };
        let previous = self.inner.reveal_width.replace(width);
        if previous == width {
            return;
        }
        let resting_open = self.phase() == PanelPhase::RestingOpen;
        let offset = if resting_open {
            -width
        } else {
            self.offset().clamp(-width, 0.0)
        };
        self.inner.offset.set(offset);
        tracing::trace!(
            message = "swipe.panel.reveal_width",
            panel = self.inner.id,
            previous,
            width,
            offset
        );
    }

    // ── Drag lifecycle ────────────────────────────────────────────────────

    /// Begin a drag. Cancels any running animation, freezing the offset.
    ///
    /// Returns `false` (and does nothing) while the panel is disabled.
    pub fn on_drag_start(&self) -> bool {
        if !self.enabled() {
            tracing::trace!(message = "swipe.panel.drag_ignored", panel = self.inner.id);
            return false;
        }
        let interrupted = self.inner.animator.cancel();
        self.inner.animating_toward.set(None);
        self.inner
            .drag_session
            .set(self.inner.drag_session.get().wrapping_add(1));
        tracing::debug!(
            message = "swipe.panel.drag_start",
            panel = self.inner.id,
            offset = self.offset(),
            interrupted
        );
        self.inner.dragging.set(true);
        true
    }

    /// Apply a horizontal drag delta (positive = rightward).
    ///
    /// The delta lands only if the result stays strictly inside
    /// `(-reveal_width, 0)`; otherwise it is dropped. Also dropped while not
    /// dragging or disabled. Returns whether the offset moved.
    pub fn on_drag_delta(&self, delta: f32) -> bool {
        if !self.is_dragging() || !self.enabled() || !delta.is_finite() {
            return false;
        }
        let candidate = self.offset() + delta;
        if candidate < 0.0 && candidate > -self.reveal_width() {
            self.inner.offset.set(candidate);
            true
        } else {
            false
        }
    }

    /// Release the drag and settle open or closed by the threshold rule.
    ///
    /// Returns the chosen target, or `None` if no drag was in progress.
    /// `is_dragging` is cleared on every exit path, including when this
    /// future is dropped before finishing. Sibling closes queued by a group
    /// at drag start run concurrently with the settle and finish before the
    /// flag clears.
    pub async fn on_drag_end(&self) -> Option<SnapTarget> {
        if !self.is_dragging() {
            return None;
        }
        let _release = DragRelease {
            panel: self,
            session: self.inner.drag_session.get(),
        };

        let target = self.release_target();
        tracing::debug!(
            message = "swipe.panel.release",
            panel = self.inner.id,
            offset = self.offset(),
            reveal_width = self.reveal_width(),
            threshold_px = self.threshold_px(),
            was_open = self.is_open(),
            snap = target.as_str()
        );
        let deferred = join_all(self.take_release_work());
        let (_, closed) = join(self.settle(target), deferred).await;
        if !closed.is_empty() {
            tracing::trace!(
                message = "swipe.panel.release_work",
                panel = self.inner.id,
                closed = closed.iter().sum::<usize>() as u64
            );
        }
        Some(target)
    }

    /// Queue work that must finish before this panel's current drag counts
    /// as released. `on_drag_end` drives it alongside the settle animation.
    pub(crate) fn defer_until_release(&self, work: LocalBoxFuture<'static, usize>) {
        self.inner.release_work.borrow_mut().push(work);
    }

    /// Take queued release work without running it.
    pub(crate) fn take_release_work(&self) -> Vec<LocalBoxFuture<'static, usize>> {
        std::mem::take(&mut *self.inner.release_work.borrow_mut())
    }

    // ── Programmatic transitions ──────────────────────────────────────────

    /// Animate to fully open. Immediate no-op if already there.
    pub async fn open(&self) -> AnimationOutcome {
        self.settle(SnapTarget::Open).await
    }

    /// Animate to fully closed. Immediate no-op if already there.
    pub async fn close(&self) -> AnimationOutcome {
        self.settle(SnapTarget::Closed).await
    }

    async fn settle(&self, target: SnapTarget) -> AnimationOutcome {
        let from = self.offset();
        let to = self.target_offset(target);

        if from == to {
            if self.inner.animator.is_running()
                && self.inner.animating_toward.get() != Some(target)
            {
                self.inner.animator.cancel();
                self.inner.animating_toward.set(None);
            }
            self.inner.is_open.set(target == SnapTarget::Open);
            return AnimationOutcome::Completed;
        }

        self.inner.animating_toward.set(Some(target));
        let tween = Tween::new(from, to, self.inner.config.animation_duration)
            .easing(self.inner.config.easing);
        let outcome = self
            .inner
            .animator
            .run(tween, |value| {
                let width = self.reveal_width();
                self.inner.offset.set(value.clamp(-width, 0.0));
            })
            .await;

        if outcome.is_completed() {
            // The width may have changed mid-flight; land on the current bound.
            self.inner.offset.set(self.target_offset(target));
            self.inner.animating_toward.set(None);
            self.inner.is_open.set(target == SnapTarget::Open);
        }
        tracing::debug!(
            message = "swipe.panel.settle",
            panel = self.inner.id,
            snap = target.as_str(),
            outcome = outcome.as_str(),
            offset = self.offset()
        );
        outcome
    }

    fn target_offset(&self, target: SnapTarget) -> f32 {
        match target {
            SnapTarget::Open => -self.reveal_width(),
            SnapTarget::Closed => 0.0,
        }
    }
}

/// Clears `is_dragging` when drag-release handling ends, unless a newer drag
/// has started on the same panel in the meantime.
struct DragRelease<'a> {
    panel: &'a SwipePanel,
    session: u64,
}

impl Drop for DragRelease<'_> {
    fn drop(&mut self) {
        let inner = &self.panel.inner;
        if inner.drag_session.get() == self.session {
            inner.dragging.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn panel_with_width(width: f32) -> SwipePanel {
        let panel = SwipePanel::default();
        panel.set_reveal_width(width);
        panel
    }

    fn drag_to(panel: &SwipePanel, offset: f32) {
        assert!(panel.on_drag_start());
        assert!(panel.on_drag_delta(offset - panel.offset()), "delta rejected");
    }

    #[test]
    fn new_panel_rests_closed() {
        let panel = SwipePanel::default();
        assert_eq!(panel.offset(), 0.0);
        assert_eq!(panel.progress(), 0.0);
        assert!(panel.enabled());
        assert!(!panel.is_open());
        assert!(!panel.is_dragging());
        assert_eq!(panel.phase(), PanelPhase::RestingClosed);
    }

    #[test]
    fn progress_formula() {
        assert_eq!(progress_for(-150.0, 300.0), 0.5);
        assert_eq!(progress_for(-300.0, 300.0), 1.0);
        assert_eq!(progress_for(-10.0, 0.0), 0.0);
        assert_eq!(progress_for(-500.0, 300.0), 1.0);
        assert_eq!(progress_for(0.0, f32::NAN), 0.0);
    }

    #[test]
    fn threshold_px_scales_with_width() {
        let panel = panel_with_width(300.0);
        assert_eq!(panel.threshold_px(), 75.0);
        panel.set_reveal_width(200.0);
        assert_eq!(panel.threshold_px(), 50.0);
    }

    #[test]
    fn delta_lands_only_strictly_inside() {
        let panel = panel_with_width(100.0);
        assert!(panel.on_drag_start());

        assert!(!panel.on_drag_delta(10.0), "rightward past closed");
        assert!(!panel.on_drag_delta(0.0), "candidate == 0");
        assert!(panel.on_drag_delta(-60.0));
        assert_eq!(panel.offset(), -60.0);
        assert!(!panel.on_drag_delta(-40.0), "candidate == -width");
        assert!(!panel.on_drag_delta(-90.0), "past -width");
        assert_eq!(panel.offset(), -60.0);
        assert!(panel.on_drag_delta(-39.5));
        assert_eq!(panel.offset(), -99.5);
    }

    #[test]
    fn delta_ignored_without_drag_or_when_disabled() {
        let panel = panel_with_width(100.0);
        assert!(!panel.on_drag_delta(-10.0), "no drag in progress");

        panel.set_enabled(false);
        assert!(!panel.on_drag_start());
        assert!(!panel.is_dragging());
        assert!(!panel.on_drag_delta(-10.0));
        assert_eq!(panel.offset(), 0.0);
    }

    #[test]
    fn delta_rejects_non_finite() {
        let panel = panel_with_width(100.0);
        panel.on_drag_start();
        assert!(!panel.on_drag_delta(f32::NAN));
        assert!(!panel.on_drag_delta(f32::NEG_INFINITY));
    }

    #[test]
    fn zero_width_never_accepts_deltas() {
        let panel = panel_with_width(0.0);
        panel.on_drag_start();
        assert!(!panel.on_drag_delta(-1.0));
        assert_eq!(panel.release_target(), SnapTarget::Closed);
    }

    #[test]
    fn release_target_from_closed() {
        let panel = panel_with_width(300.0);
        drag_to(&panel, -50.0);
        assert_eq!(panel.release_target(), SnapTarget::Closed);
        assert!(panel.on_drag_delta(-25.0));
        assert_eq!(panel.offset(), -75.0);
        assert_eq!(panel.release_target(), SnapTarget::Open, "at threshold opens");
    }

    #[test]
    fn dragging_subscription_sees_transitions() {
        let panel = panel_with_width(100.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_cb = Rc::clone(&seen);
        let _sub = panel.subscribe_dragging(move |d| seen_cb.borrow_mut().push(d));

        panel.on_drag_start();
        panel.on_drag_start();
        assert_eq!(*seen.borrow(), vec![true], "repeat start does not re-notify");
    }

    #[test]
    fn render_offset_rounds_to_pixels() {
        let panel = panel_with_width(100.0);
        drag_to(&panel, -40.6);
        assert_eq!(panel.render_offset(), -41);
    }

    #[test]
    fn shrinking_width_clamps_offset() {
        let panel = panel_with_width(200.0);
        drag_to(&panel, -150.0);
        panel.set_reveal_width(100.0);
        assert_eq!(panel.offset(), -100.0);
        panel.set_reveal_width(-5.0);
        assert_eq!(panel.reveal_width(), 0.0);
        assert_eq!(panel.offset(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn open_then_close() {
        let panel = panel_with_width(300.0);
        assert_eq!(panel.open().await, AnimationOutcome::Completed);
        assert_eq!(panel.offset(), -300.0);
        assert!(panel.is_open());
        assert_eq!(panel.progress(), 1.0);
        assert_eq!(panel.phase(), PanelPhase::RestingOpen);

        assert_eq!(panel.close().await, AnimationOutcome::Completed);
        assert_eq!(panel.offset(), 0.0);
        assert!(!panel.is_open());
        assert_eq!(panel.phase(), PanelPhase::RestingClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn open_when_open_is_immediate() {
        let panel = panel_with_width(300.0);
        panel.open().await;
        let start = tokio::time::Instant::now();
        assert_eq!(panel.open().await, AnimationOutcome::Completed);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(panel.offset(), -300.0);
    }

    #[tokio::test(start_paused = true)]
    async fn resting_open_tracks_width_changes() {
        let panel = panel_with_width(300.0);
        panel.open().await;
        panel.set_reveal_width(240.0);
        assert_eq!(panel.offset(), -240.0);
        assert!(panel.is_open());
        panel.set_reveal_width(320.0);
        assert_eq!(panel.offset(), -320.0);
    }

    #[tokio::test(start_paused = true)]
    async fn drag_end_without_drag_is_none() {
        let panel = panel_with_width(300.0);
        assert_eq!(panel.on_drag_end().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_drag_end_still_clears_dragging() {
        let panel = panel_with_width(300.0);
        drag_to(&panel, -120.0);
        let _ = tokio::time::timeout(Duration::from_millis(30), panel.on_drag_end()).await;
        assert!(!panel.is_dragging());
        assert!(!panel.is_open(), "interrupted open must not flag open");
    }
}
