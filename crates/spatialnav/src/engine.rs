use std::{any::Any, collections::VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    dump::{self, Snapshot},
    error::{Error, Result},
    geom::{Direction, Rect},
    geometry::{Element, Geometry},
    handle::{FocusHandle, FocusState},
    handler::{
        ArrowEvent, ArrowOutcome, Context, EnterEvent, EventOutcome, FocusDetails, FocusOrigin,
        Request,
    },
    key::{FocusKey, NodeId},
    node::{Node, NodeConfig, NodeUpdate},
    options::Options,
    registry::Registry,
    resolve::{Scoring, resolve},
    walker::{redirect, restore_target, retarget},
};

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Constructed, `init` not called yet.
    Idle,
    /// Initialized; navigation is allowed.
    Ready,
    /// Torn down by `destroy`; `init` makes it ready again.
    Destroyed,
}

/// The outcome of a directional navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Focus moved.
    Moved {
        /// The previously focused node, `None` if nothing held focus.
        from: Option<FocusKey>,
        /// The newly focused node.
        to: FocusKey,
    },
    /// The focused node's arrow handler cancelled the move.
    Vetoed,
    /// Nothing lies in that direction. Focus is unchanged.
    NoCandidate,
    /// The engine is paused and ignored the input.
    Paused,
}

impl Navigation {
    /// Did focus move?
    pub fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// The newly focused key, if focus moved.
    pub fn target(&self) -> Option<&FocusKey> {
        match self {
            Self::Moved { to, .. } => Some(to),
            _ => None,
        }
    }
}

/// A spatial navigation engine: one independent tree of focusable nodes.
///
/// The engine is an ordinary value owned by the host. Several engines can
/// coexist, for instance one per screen in a split-screen layout. All
/// mutation goes through its methods; handlers influence it only through
/// the deferred requests they queue on their [`Context`].
pub struct Engine {
    /// Node arena.
    registry: Registry,
    /// Measurement cache.
    geometry: Geometry,
    /// Engine-wide configuration.
    options: Options,
    /// Lifecycle state.
    lifecycle: Lifecycle,
    /// The focused node.
    focus: Option<NodeId>,
    /// Incremented on every focus change.
    focus_gen: u64,
    /// Directional and enter input is ignored while set.
    paused: bool,
    /// Initial focus key that was not registered when `init` ran.
    pending_initial: Option<FocusKey>,
    /// Requests queued by handlers.
    queue: VecDeque<Request>,
    /// The direction currently held down and its repeat count.
    held: Option<(Direction, u32)>,
    /// Enter repeat count while enter is held down.
    enter_repeat: Option<u32>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct an idle engine. Nodes can be registered right away;
    /// navigation needs [`init`](Self::init).
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            geometry: Geometry::new(),
            options: Options::default(),
            lifecycle: Lifecycle::Idle,
            focus: None,
            focus_gen: 0,
            paused: false,
            pending_initial: None,
            queue: VecDeque::new(),
            held: None,
            enter_repeat: None,
        }
    }

    /// Set or replace the configuration and make the engine ready.
    ///
    /// The registry is preserved, so calling `init` twice with the same
    /// options changes nothing. The initial focus key is applied only when
    /// nothing holds focus.
    pub fn init(&mut self, options: Options) {
        debug!(?options, "init");
        self.options = options;
        self.lifecycle = Lifecycle::Ready;
        self.pending_initial = None;
        if self.focus.is_none()
            && let Some(key) = self.options.initial_focus.clone()
        {
            match self.registry.lookup(key.as_str()) {
                Ok(id) => self.focus_initial(id),
                Err(_) => {
                    debug!(%key, "initial focus not registered yet");
                    self.pending_initial = Some(key);
                }
            }
        }
        self.drain();
    }

    /// Drop every node and cached measurement and clear focus. No blur
    /// callbacks fire. Safe to call in any state.
    pub fn destroy(&mut self) {
        debug!(nodes = self.registry.len(), "destroy");
        self.registry = Registry::new();
        self.geometry.clear();
        self.focus = None;
        self.focus_gen += 1;
        self.paused = false;
        self.pending_initial = None;
        self.queue.clear();
        self.held = None;
        self.enter_repeat = None;
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current configuration.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Fail unless the engine is ready.
    fn require_ready(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Idle => Err(Error::InvalidState("engine is not initialized".into())),
            Lifecycle::Destroyed => Err(Error::InvalidState("engine has been destroyed".into())),
        }
    }

    /// Register a node and return its key, generated if none was requested.
    pub fn register(&mut self, config: NodeConfig) -> Result<FocusKey> {
        let id = self.registry.register(config)?;
        if let Some(parent) = self.registry.parent(id) {
            self.geometry.invalidate(&self.registry.nodes, parent);
        }
        let key = self.key_of(id)?;
        if self.pending_initial.as_ref() == Some(&key) {
            self.pending_initial = None;
            if self.lifecycle == Lifecycle::Ready && self.focus.is_none() {
                self.focus_initial(id);
            }
        }
        self.drain();
        Ok(key)
    }

    /// Register a node and return an observer handle for it.
    pub fn handle(&mut self, config: NodeConfig) -> Result<FocusHandle> {
        self.register(config).map(FocusHandle::new)
    }

    /// Unregister a node and its whole subtree.
    ///
    /// If focus was inside the subtree, it is restored into the parent (see
    /// [`NodeConfig::auto_restore_focus`]). The removed nodes get no blur
    /// callback.
    pub fn unregister(&mut self, key: &str) -> Result<()> {
        let id = self.registry.lookup(key)?;
        let parent = self.registry.parent(id);
        let held_focus = self.focus.filter(|f| self.registry.in_subtree(id, *f));
        let old_path = held_focus
            .map(|f| self.registry.ancestry(f))
            .unwrap_or_default();

        for removed in self.registry.remove_subtree(id)? {
            self.geometry.remove(removed);
        }
        if let Some(p) = parent {
            self.geometry.invalidate(&self.registry.nodes, p);
        }

        if held_focus.is_some() {
            let target = parent.and_then(|p| restore_target(&self.registry, p));
            debug!(
                removed = key,
                restored = ?target.and_then(|t| self.registry.key(t)),
                "focused subtree unregistered"
            );
            self.transition(target, FocusOrigin::Restore, &old_path, None);
        }
        self.drain();
        Ok(())
    }

    /// Change the configuration of a live node. Focus does not move.
    pub fn update(&mut self, key: &str, update: NodeUpdate) -> Result<()> {
        let id = self.registry.lookup(key)?;
        self.registry.update(id, update)?;
        self.geometry.invalidate(&self.registry.nodes, id);
        Ok(())
    }

    /// Is the key live?
    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Look a node up by key.
    pub fn node(&self, key: &str) -> Result<&Node> {
        self.registry.node(key)
    }

    /// The node registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// True if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The element behind a node, read-only.
    pub fn element(&self, key: &str) -> Result<Option<&dyn Element>> {
        Ok(self.registry.node(key)?.element())
    }

    /// The node's box, measured if the cached value is stale.
    pub fn rect(&mut self, key: &str) -> Result<Option<Rect>> {
        let id = self.registry.lookup(key)?;
        Ok(self.geometry.rect(&self.registry.nodes, id))
    }

    /// The node's cached box, without measuring.
    pub(crate) fn cached_rect(&self, id: NodeId) -> Option<Rect> {
        self.geometry.cached(id)
    }

    /// Measure every node, for diagnostics.
    pub(crate) fn measure_all(&mut self) {
        for id in self.registry.preorder() {
            self.geometry.rect(&self.registry.nodes, id);
        }
    }

    /// Number of measurements taken since construction or the last
    /// `destroy`.
    pub fn measurements(&self) -> u64 {
        self.geometry.measurements()
    }

    /// A layout change (resize, scroll) happened at this node. Its subtree
    /// and its ancestors are re-measured on next use.
    pub fn layout_changed(&mut self, key: &str) -> Result<()> {
        let id = self.registry.lookup(key)?;
        self.geometry.layout_changed(&self.registry.nodes, id);
        Ok(())
    }

    /// Force re-measurement of one node (and the ancestors whose box
    /// depends on it) on next use.
    pub fn invalidate(&mut self, key: &str) -> Result<()> {
        let id = self.registry.lookup(key)?;
        self.geometry.invalidate(&self.registry.nodes, id);
        Ok(())
    }

    /// Force re-measurement of every node on next use.
    pub fn invalidate_all(&mut self) {
        self.geometry.invalidate_all();
    }

    /// The focused key.
    pub fn current_focus_key(&self) -> Option<&FocusKey> {
        self.focus.and_then(|f| self.registry.key(f))
    }

    /// The focused node id.
    pub(crate) fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    /// Incremented on every focus change.
    pub fn focus_gen(&self) -> u64 {
        self.focus_gen
    }

    /// Is this node focused?
    pub fn is_focused(&self, key: &str) -> bool {
        self.current_focus_key().is_some_and(|k| k == key)
    }

    /// Focus state of a node.
    pub fn focus_state(&self, key: &str) -> Result<FocusState> {
        let node = self.registry.node(key)?;
        Ok(FocusState {
            focused: self.is_focused(key),
            has_focused_child: node.has_focused_child,
        })
    }

    /// Switch right-to-left mode.
    pub fn update_rtl(&mut self, rtl: bool) {
        debug!(rtl, "rtl updated");
        self.options.rtl = rtl;
    }

    /// Is right-to-left mode on?
    pub fn rtl(&self) -> bool {
        self.options.rtl
    }

    /// Ignore directional and enter input until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
        self.held = None;
        self.enter_repeat = None;
    }

    /// Accept input again.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Is input ignored?
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Render the node tree with boxes and focus markers, measuring every
    /// node first. `color` selects ANSI output.
    pub fn dump(&mut self, color: bool) -> Result<String> {
        dump::dump(self, color)
    }

    /// Render a table of every node's key, parent, box and flags.
    pub fn layout_table(&mut self) -> Result<String> {
        dump::layout_table(self)
    }

    /// A serializable picture of the registry and focus state.
    pub fn snapshot(&self) -> Snapshot {
        dump::snapshot(self)
    }

    /// Focus a node. Focus sent to a container lands on the child chosen by
    /// redirection. Returns `true` if focus changed.
    pub fn set_focus(&mut self, key: &str) -> Result<bool> {
        self.require_ready()?;
        let id = self.registry.lookup(key)?;
        let target =
            redirect(&self.registry, id).ok_or_else(|| Error::NotFocusable(FocusKey::raw(key)))?;
        let changed = self.commit(target, FocusOrigin::Explicit);
        self.drain();
        Ok(changed)
    }

    /// Move focus in a direction, as pressed by the user. `original` is the
    /// host's input event, handed to the arrow handler untouched.
    ///
    /// The focused node's `on_arrow_press` runs first and may veto the move.
    /// With nothing focused, the first navigable node takes focus.
    pub fn navigate(&mut self, dir: Direction, original: Option<&dyn Any>) -> Result<Navigation> {
        self.require_ready()?;
        if self.paused {
            return Ok(Navigation::Paused);
        }
        let repeat = match self.held {
            Some((d, n)) if d == dir => n + 1,
            _ => 0,
        };
        self.held = Some((dir, repeat));
        let nav = self.navigate_inner(dir, original, repeat, true);
        self.drain();
        Ok(nav)
    }

    /// A direction key was released. Fires `on_arrow_release` on the
    /// focused node.
    pub fn release_direction(&mut self, dir: Direction, original: Option<&dyn Any>) -> Result<()> {
        self.require_ready()?;
        if self.paused {
            return Ok(());
        }
        let repeat = match self.held {
            Some((d, n)) if d == dir => {
                self.held = None;
                n
            }
            _ => 0,
        };
        if let Some(focus) = self.focus {
            self.fire_arrow(focus, dir, repeat, original, false);
        }
        self.drain();
        Ok(())
    }

    /// Enter was pressed. The focused node's handler runs first; while the
    /// outcome is [`EventOutcome::Ignore`], the event bubbles to ancestors
    /// that opted in with `bubble_enter`.
    pub fn press_enter(&mut self, original: Option<&dyn Any>) -> Result<EventOutcome> {
        self.require_ready()?;
        if self.paused {
            return Ok(EventOutcome::Ignore);
        }
        let repeat = self.enter_repeat.map_or(0, |n| n + 1);
        self.enter_repeat = Some(repeat);
        let outcome = self.dispatch_enter(repeat, original, true);
        self.drain();
        Ok(outcome)
    }

    /// Enter was released. Dispatched like [`press_enter`](Self::press_enter).
    pub fn release_enter(&mut self, original: Option<&dyn Any>) -> Result<EventOutcome> {
        self.require_ready()?;
        if self.paused {
            return Ok(EventOutcome::Ignore);
        }
        let repeat = self.enter_repeat.take().unwrap_or(0);
        let outcome = self.dispatch_enter(repeat, original, false);
        self.drain();
        Ok(outcome)
    }

    /// Look up the key of a live id.
    fn key_of(&self, id: NodeId) -> Result<FocusKey> {
        self.registry
            .key(id)
            .cloned()
            .ok_or_else(|| Error::Internal("dangling node id".into()))
    }

    /// Focus a node because it is the configured initial focus.
    fn focus_initial(&mut self, id: NodeId) {
        match redirect(&self.registry, id) {
            Some(target) => {
                self.commit(target, FocusOrigin::Initial);
            }
            None => warn!(
                key = ?self.registry.key(id),
                "initial focus target cannot take focus"
            ),
        }
    }

    /// Resolve and commit one directional move.
    fn navigate_inner(
        &mut self,
        dir: Direction,
        original: Option<&dyn Any>,
        repeat: u32,
        fire_press: bool,
    ) -> Navigation {
        let Some(current) = self.focus else {
            return match redirect(&self.registry, self.registry.root()) {
                Some(target) => {
                    self.commit(target, FocusOrigin::Direction(dir));
                    self.moved(None, target)
                }
                None => Navigation::NoCandidate,
            };
        };

        if fire_press
            && self.fire_arrow(current, dir, repeat, original, true) == ArrowOutcome::Veto
        {
            debug!(%dir, "move vetoed");
            return Navigation::Vetoed;
        }

        let effective = if self.options.rtl { dir.mirrored() } else { dir };
        self.geometry.begin_pass(self.options.measure);
        let scoring = Scoring::from(&self.options);
        let target = resolve(
            &self.registry,
            &mut self.geometry,
            current,
            effective,
            &scoring,
            self.options.debug,
        )
        .and_then(|found| redirect(&self.registry, found))
        .filter(|t| *t != current);

        match target {
            Some(target) => {
                let from = self.registry.key(current).cloned();
                self.commit(target, FocusOrigin::Direction(dir));
                self.moved(from, target)
            }
            None => {
                debug!(%dir, "no candidate");
                Navigation::NoCandidate
            }
        }
    }

    /// Build a `Moved` outcome.
    fn moved(&self, from: Option<FocusKey>, to: NodeId) -> Navigation {
        match self.registry.key(to) {
            Some(to) => Navigation::Moved {
                from,
                to: to.clone(),
            },
            None => Navigation::NoCandidate,
        }
    }

    /// Move focus to `target`. Returns `false` if it was already focused.
    fn commit(&mut self, target: NodeId, origin: FocusOrigin) -> bool {
        if self.focus == Some(target) {
            return false;
        }
        let prev = self.focus;
        let old_path = prev.map(|p| self.registry.ancestry(p)).unwrap_or_default();
        self.transition(Some(target), origin, &old_path, prev);
        true
    }

    /// Apply a focus change and fire its callbacks: blur on the node losing
    /// focus, then child-focus changes, then focus on the new node.
    fn transition(
        &mut self,
        target: Option<NodeId>,
        origin: FocusOrigin,
        old_path: &[NodeId],
        blur: Option<NodeId>,
    ) {
        self.focus = target;
        self.focus_gen += 1;
        let flips = retarget(&mut self.registry, old_path, target);
        debug!(
            from = ?blur.and_then(|b| self.registry.key(b)),
            to = ?target.and_then(|t| self.registry.key(t)),
            ?origin,
            "focus moved"
        );

        if let Some(b) = blur {
            self.fire_focus(b, false, origin);
        }
        for (id, value) in flips {
            self.fire_child_focus(id, value);
        }
        if let Some(t) = target {
            self.fire_focus(t, true, origin);
        }
    }

    /// Fire `on_focus` or `on_blur`.
    fn fire_focus(&mut self, id: NodeId, gained: bool, origin: FocusOrigin) {
        let rect = self.geometry.rect(&self.registry.nodes, id);
        let focused = self.current_focus_key().cloned();
        let Some(Node {
            key,
            payload,
            handler,
            ..
        }) = self.registry.nodes.get_mut(id)
        else {
            return;
        };
        let details = FocusDetails {
            key: &*key,
            rect,
            payload: payload.as_deref(),
            origin,
        };
        let mut ctx = Context::new(focused, &mut self.queue);
        if gained {
            handler.on_focus(&details, &mut ctx);
        } else {
            handler.on_blur(&details, &mut ctx);
        }
    }

    /// Fire `on_child_focus_change`.
    fn fire_child_focus(&mut self, id: NodeId, value: bool) {
        let focused = self.current_focus_key().cloned();
        let Some(node) = self.registry.nodes.get_mut(id) else {
            return;
        };
        let mut ctx = Context::new(focused, &mut self.queue);
        node.handler.on_child_focus_change(value, &mut ctx);
    }

    /// Fire `on_arrow_press` or `on_arrow_release`.
    fn fire_arrow(
        &mut self,
        id: NodeId,
        dir: Direction,
        repeat: u32,
        original: Option<&dyn Any>,
        press: bool,
    ) -> ArrowOutcome {
        let focused = self.current_focus_key().cloned();
        let Some(Node {
            key,
            payload,
            handler,
            ..
        }) = self.registry.nodes.get_mut(id)
        else {
            return ArrowOutcome::Proceed;
        };
        let event = ArrowEvent {
            key: &*key,
            direction: dir,
            repeat,
            payload: payload.as_deref(),
            original,
        };
        let mut ctx = Context::new(focused, &mut self.queue);
        if press {
            handler.on_arrow_press(&event, &mut ctx)
        } else {
            handler.on_arrow_release(&event, &mut ctx);
            ArrowOutcome::Proceed
        }
    }

    /// Dispatch an enter event to the focused node and bubble it.
    fn dispatch_enter(
        &mut self,
        repeat: u32,
        original: Option<&dyn Any>,
        press: bool,
    ) -> EventOutcome {
        let Some(target) = self.focus else {
            return EventOutcome::Ignore;
        };
        let Some(target_key) = self.registry.key(target).cloned() else {
            return EventOutcome::Ignore;
        };
        let root = self.registry.root();
        let chain = self.registry.ancestry(target);
        for (depth, id) in chain.into_iter().enumerate() {
            if id == root {
                break;
            }
            let focused = self.current_focus_key().cloned();
            let Some(Node {
                key,
                payload,
                handler,
                bubble_enter,
                ..
            }) = self.registry.nodes.get_mut(id)
            else {
                continue;
            };
            if depth > 0 && !*bubble_enter {
                continue;
            }
            let event = EnterEvent {
                key: &*key,
                target: &target_key,
                repeat,
                payload: payload.as_deref(),
                original,
            };
            let mut ctx = Context::new(focused, &mut self.queue);
            let outcome = if press {
                handler.on_enter_press(&event, &mut ctx)
            } else {
                handler.on_enter_release(&event, &mut ctx)
            };
            if outcome != EventOutcome::Ignore {
                return outcome;
            }
        }
        EventOutcome::Ignore
    }

    /// Run the requests handlers queued, in order. Requests queued while
    /// draining are appended and run in the same drain, up to
    /// `max_deferred` in total.
    fn drain(&mut self) {
        if self.lifecycle != Lifecycle::Ready {
            self.queue.clear();
            return;
        }
        let mut processed = 0;
        while let Some(request) = self.queue.pop_front() {
            if processed == self.options.max_deferred {
                warn!(
                    dropped = self.queue.len() + 1,
                    limit = self.options.max_deferred,
                    "deferred request limit reached"
                );
                self.queue.clear();
                break;
            }
            processed += 1;
            match request {
                Request::Focus(key) => {
                    let target = self
                        .registry
                        .lookup(key.as_str())
                        .ok()
                        .and_then(|id| redirect(&self.registry, id));
                    match target {
                        Some(t) => {
                            self.commit(t, FocusOrigin::Deferred);
                        }
                        None => warn!(%key, "deferred focus request ignored"),
                    }
                }
                Request::Navigate(dir) => {
                    if !self.paused {
                        self.navigate_inner(dir, None, 0, false);
                    }
                }
            }
        }
    }
}
