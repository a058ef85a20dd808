#![forbid(unsafe_code)]

//! Swipe-to-reveal panels with single-open group coordination.
//!
//! # Role in swipebox
//! This crate holds the interaction layer. [`SwipePanel`] turns horizontal
//! drag input into a foreground offset and settles it open or closed by a
//! threshold rule; [`SwipeGroup`] keeps at most one panel of a list
//! interactively open. Rendering is left to the host: read
//! [`SwipePanel::render_offset`] (or a [`PanelSnapshot`]) each frame and
//! translate the foreground layer by it.
//!
//! # Driving a panel
//! ```rust,ignore
//! let panel = group.state_for(row_id);
//! panel.set_reveal_width(measured_background_width);
//!
//! panel.on_drag_start();
//! panel.on_drag_delta(-42.0);
//! panel.on_drag_end().await; // settles open or closed
//! ```
//!
//! # Threading
//! Panels and groups are `Rc`-based and belong to the UI thread. Their
//! futures are `!Send`; run them on a current-thread tokio runtime. Nothing
//! is spawned, so drag input can come straight from synchronous handlers.
//!
//! # Feature flags
//! - `serde`: serialize [`PanelSnapshot`] and (de)serialize [`SwipeConfig`].
//! - `config`: load [`SwipeConfig`] from TOML or JSON text.

pub mod config;
pub mod group;
pub mod panel;

pub use config::{ConfigError, DEFAULT_ANIMATION_DURATION, DEFAULT_THRESHOLD_RATIO, SwipeConfig};
pub use group::SwipeGroup;
pub use panel::{PanelPhase, PanelSnapshot, SnapTarget, SwipePanel, progress_for};

pub use swipebox_core::{AnimationOutcome, Easing, Subscription};
