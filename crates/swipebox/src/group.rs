#![forbid(unsafe_code)]

//! Group coordinator: one [`SwipePanel`] per caller key, at most one
//! interactively open at a time.
//!
//! # Exclusion
//!
//! The group watches every panel's dragging flag. When a panel starts
//! dragging, all other panels are disabled right away, and closing the ones
//! that are open is queued on the dragging panel. Its `on_drag_end` runs
//! those closes concurrently with its own settle animation; when both
//! finish, every panel is re-enabled.
//!
//! [`SwipeGroup::open`] applies the same exclusion for a programmatic open:
//! siblings are disabled and closed before the target opens, and
//! re-enabled afterwards.
//!
//! # Threading
//!
//! Nothing is spawned: drag start is fully synchronous and works from any
//! caller. Hosts that want open siblings to slide shut while the drag is
//! still in progress can drive [`SwipeGroup::settle`] on a task of their own
//! instead of waiting for the release.
//!
//! # Identity
//!
//! Keys are compared with `Eq`/`Hash`. Asking for the same key twice yields
//! handles to the same panel until the key is removed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use futures::future::{FutureExt, join_all};
use swipebox_core::{AnimationOutcome, Subscription};

use crate::config::SwipeConfig;
use crate::panel::SwipePanel;

struct Entry {
    panel: SwipePanel,
    _dragging: Subscription<bool>,
}

struct GroupInner<K> {
    config: SwipeConfig,
    entries: RefCell<HashMap<K, Entry>>,
}

/// Registry of swipe panels keyed by caller identity.
///
/// Cloning a group yields another handle to the same registry.
pub struct SwipeGroup<K> {
    inner: Rc<GroupInner<K>>,
}

impl<K> Clone for SwipeGroup<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: Debug> Debug for SwipeGroup<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.inner.entries.borrow();
        f.debug_struct("SwipeGroup")
            .field("config", &self.inner.config)
            .field("keys", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K> Default for SwipeGroup<K>
where
    K: Eq + Hash + Clone + Debug + 'static,
{
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

impl<K> SwipeGroup<K>
where
    K: Eq + Hash + Clone + Debug + 'static,
{
    /// Empty group whose panels all use `config`.
    #[must_use]
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                config: config.sanitized(),
                entries: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Config handed to every panel.
    #[must_use]
    pub fn config(&self) -> &SwipeConfig {
        &self.inner.config
    }

    /// Panel for `key`, created and registered on first use.
    ///
    /// Later calls with an equal key return the same panel.
    pub fn state_for(&self, key: K) -> SwipePanel {
        if let Some(entry) = self.inner.entries.borrow().get(&key) {
            return entry.panel.clone();
        }

        let panel = SwipePanel::new(self.inner.config);
        let group = Rc::downgrade(&self.inner);
        let watched = key.clone();
        let subscription = panel.subscribe_dragging(move |dragging| {
            on_dragging_changed(&group, &watched, dragging);
        });
        tracing::debug!(
            message = "swipe.group.register",
            key = ?key,
            panel = panel.id()
        );
        self.inner.entries.borrow_mut().insert(
            key,
            Entry {
                panel: panel.clone(),
                _dragging: subscription,
            },
        );
        panel
    }

    /// Registered panel for `key`, if any. Never creates one.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<SwipePanel> {
        self.inner
            .entries
            .borrow()
            .get(key)
            .map(|entry| entry.panel.clone())
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Registered keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    /// Key of the panel currently dragging, if any.
    #[must_use]
    pub fn active_key(&self) -> Option<K> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|(_, entry)| entry.panel.is_dragging())
            .map(|(key, _)| key.clone())
    }

    /// Unregister `key` and stop watching its panel.
    ///
    /// If the removed panel was mid-drag, the remaining panels are
    /// re-enabled since its release can no longer reach the group.
    pub fn remove(&self, key: &K) -> Option<SwipePanel> {
        let entry = self.inner.entries.borrow_mut().remove(key)?;
        let panel = entry.panel.clone();
        drop(entry);
        if panel.is_dragging() {
            enable_all(&self.inner);
        }
        tracing::debug!(message = "swipe.group.remove", key = ?key, panel = panel.id());
        Some(panel)
    }

    /// Keep only the keys for which `keep` returns `true`.
    ///
    /// `keep` may call back into the group.
    pub fn retain(&self, mut keep: impl FnMut(&K, &SwipePanel) -> bool) {
        let registered: Vec<(K, SwipePanel)> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.panel.clone()))
            .collect();
        for (key, panel) in &registered {
            if !keep(key, panel) {
                self.remove(key);
            }
        }
    }

    /// Close every other panel, then open the panel for `key`.
    ///
    /// Other panels are disabled for the duration and re-enabled afterwards,
    /// even if this future is dropped early. Returns `None` (doing nothing)
    /// for an unknown key.
    pub async fn open(&self, key: &K) -> Option<AnimationOutcome> {
        let target = self.get(key)?;
        let _reenable = ReenableOnDrop {
            group: Rc::downgrade(&self.inner),
        };

        let open_siblings = disable_others(&self.inner, key);
        tracing::debug!(
            message = "swipe.group.open",
            key = ?key,
            closing = open_siblings.len() as u64
        );
        join_all(open_siblings.iter().map(SwipePanel::close)).await;
        Some(target.open().await)
    }

    /// Close every open panel concurrently. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let open: Vec<SwipePanel> = self
            .panels()
            .into_iter()
            .filter(SwipePanel::is_open)
            .collect();
        tracing::debug!(message = "swipe.group.close_all", closing = open.len() as u64);
        join_all(open.iter().map(SwipePanel::close)).await;
        open.len()
    }

    /// Run the sibling closes queued by drag starts now, without waiting for
    /// the dragging panels to be released.
    ///
    /// Returns how many panels those closes covered.
    pub async fn settle(&self) -> usize {
        let mut closed = 0;
        loop {
            let pending: Vec<_> = self
                .panels()
                .iter()
                .flat_map(SwipePanel::take_release_work)
                .collect();
            if pending.is_empty() {
                return closed;
            }
            closed += join_all(pending).await.into_iter().sum::<usize>();
        }
    }

    fn panels(&self) -> Vec<SwipePanel> {
        panels_of(&self.inner)
    }
}

fn panels_of<K>(inner: &GroupInner<K>) -> Vec<SwipePanel> {
    inner
        .entries
        .borrow()
        .values()
        .map(|entry| entry.panel.clone())
        .collect()
}

fn on_dragging_changed<K>(group: &Weak<GroupInner<K>>, key: &K, dragging: bool)
where
    K: Eq + Hash + Debug + 'static,
{
    let Some(inner) = group.upgrade() else {
        return;
    };
    if !dragging {
        tracing::debug!(message = "swipe.group.release", key = ?key);
        enable_all(&inner);
        return;
    }

    let open_siblings = disable_others(&inner, key);
    tracing::debug!(
        message = "swipe.group.exclusion",
        key = ?key,
        closing = open_siblings.len() as u64
    );
    if open_siblings.is_empty() {
        return;
    }
    let Some(dragged) = inner.entries.borrow().get(key).map(|e| e.panel.clone()) else {
        return;
    };
    dragged.defer_until_release(
        async move {
            join_all(open_siblings.iter().map(SwipePanel::close)).await;
            open_siblings.len()
        }
        .boxed_local(),
    );
}

/// Disable every panel except `key`'s; return the disabled ones that are open.
fn disable_others<K: Eq + Hash>(inner: &GroupInner<K>, key: &K) -> Vec<SwipePanel> {
    let others: Vec<SwipePanel> = inner
        .entries
        .borrow()
        .iter()
        .filter(|(k, _)| *k != key)
        .map(|(_, entry)| entry.panel.clone())
        .collect();
    for panel in &others {
        panel.set_enabled(false);
    }
    others.into_iter().filter(SwipePanel::is_open).collect()
}

fn enable_all<K>(inner: &GroupInner<K>) {
    for panel in panels_of(inner) {
        panel.set_enabled(true);
    }
}

struct ReenableOnDrop<K> {
    group: Weak<GroupInner<K>>,
}

impl<K> Drop for ReenableOnDrop<K> {
    fn drop(&mut self) {
        if let Some(inner) = self.group.upgrade() {
            enable_all(&inner);
        }
    }
}
