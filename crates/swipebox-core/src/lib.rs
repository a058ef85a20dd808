#![forbid(unsafe_code)]

//! Core: easing curves, tweens, interruptible animation control and
//! observable values.
//!
//! # Role in swipebox
//! `swipebox-core` holds the leaf primitives. It knows nothing about panels
//! or groups; `swipebox` builds the per-panel state machine and the group
//! coordinator on top of these types.
//!
//! # Primary responsibilities
//! - **Easing**: normalized curves mapping linear time to eased progress.
//! - **Tween**: pure `(from, to, duration, easing)` value sampler.
//! - **AnimationController**: runs one tween at a time on the local task,
//!   delivering each step through a callback; a newer run or an explicit
//!   cancel supersedes the previous one via a generation counter.
//! - **Observable**: change-notifying `Copy` value; listeners stay attached
//!   while their [`Subscription`] guard lives.
//!
//! # Threading
//! Everything here is single-threaded (`Rc`/`Cell` based). Animation futures
//! are `!Send` and are meant to run on a current-thread tokio runtime, inside
//! a `tokio::task::LocalSet` when spawned.

pub mod controller;
pub mod easing;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod reactive;
pub mod tween;

pub use controller::{AnimationController, AnimationOutcome, DEFAULT_FRAME_INTERVAL};
pub use easing::{Easing, EasingFn};
pub use reactive::{Observable, Subscription};
pub use tween::Tween;
