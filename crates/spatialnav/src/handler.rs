//! Callback interface between the engine and registered elements.
//!
//! Handlers never see the engine itself. Each callback gets a [`Context`]
//! through which it can read the focus state and queue follow-up requests.
//! Queued requests run in order once the operation that fired the callback
//! has fully committed.

use std::{any::Any, collections::VecDeque, fmt};

use crate::{
    geom::{Direction, Rect},
    key::FocusKey,
};

/// The result of an enter handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventOutcome {
    /// The event was processed and propagation stops.
    Handle,
    /// The event was processed without a state change and propagation stops.
    Consume,
    /// The event was not handled and will bubble to opted-in ancestors.
    Ignore,
}

/// The verdict of an arrow-press handler on the pending move.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArrowOutcome {
    /// Let the engine resolve and commit the move.
    Proceed,
    /// Discard the move.
    Veto,
}

/// Why focus moved.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FocusOrigin {
    /// An explicit `set_focus` call.
    Explicit,
    /// Directional navigation.
    Direction(Direction),
    /// Restoration after the focused subtree was unregistered.
    Restore,
    /// The configured initial focus.
    Initial,
    /// A request queued by a handler.
    Deferred,
}

/// Details passed to `on_focus` and `on_blur`.
pub struct FocusDetails<'a> {
    /// The node gaining or losing focus.
    pub key: &'a FocusKey,
    /// The node's box at the time of the change, if it could be measured.
    pub rect: Option<Rect>,
    /// The node's opaque payload.
    pub payload: Option<&'a dyn Any>,
    /// What caused the change.
    pub origin: FocusOrigin,
}

/// Details passed to `on_arrow_press` and `on_arrow_release`.
pub struct ArrowEvent<'a> {
    /// The focused node.
    pub key: &'a FocusKey,
    /// The direction as pressed, before any RTL adjustment.
    pub direction: Direction,
    /// Number of presses of this direction since its last release, minus one.
    pub repeat: u32,
    /// The node's opaque payload.
    pub payload: Option<&'a dyn Any>,
    /// The host event that triggered the press, if supplied.
    pub original: Option<&'a dyn Any>,
}

/// Details passed to `on_enter_press` and `on_enter_release`.
pub struct EnterEvent<'a> {
    /// The node receiving the event.
    pub key: &'a FocusKey,
    /// The focused node the event was dispatched to first.
    pub target: &'a FocusKey,
    /// Number of enter presses since the last release, minus one.
    pub repeat: u32,
    /// The receiving node's opaque payload.
    pub payload: Option<&'a dyn Any>,
    /// The host event that triggered the press, if supplied.
    pub original: Option<&'a dyn Any>,
}

/// A request queued from inside a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Focus the named node.
    Focus(FocusKey),
    /// Navigate from the focused node.
    Navigate(Direction),
}

/// The handle a callback uses to observe and influence the engine.
pub struct Context<'a> {
    /// Focused node when the callback fired.
    focused: Option<FocusKey>,
    /// Destination for deferred requests.
    queue: &'a mut VecDeque<Request>,
}

impl<'a> Context<'a> {
    /// Build a context over the engine's request queue.
    pub(crate) fn new(focused: Option<FocusKey>, queue: &'a mut VecDeque<Request>) -> Self {
        Self { focused, queue }
    }

    /// The node that held focus when this callback fired.
    pub fn current_focus_key(&self) -> Option<&FocusKey> {
        self.focused.as_ref()
    }

    /// Queue a focus change. It runs after the current operation commits.
    pub fn set_focus(&mut self, key: &str) {
        self.queue.push_back(Request::Focus(FocusKey::raw(key)));
    }

    /// Queue a directional move. It runs after the current operation commits.
    pub fn navigate(&mut self, direction: Direction) {
        self.queue.push_back(Request::Navigate(direction));
    }
}

/// Callbacks attached to a registered node.
///
/// Every method has a no-op default, so implementors override only what
/// they need.
pub trait Handler {
    /// The node gained focus.
    fn on_focus(&mut self, _details: &FocusDetails<'_>, _ctx: &mut Context<'_>) {}

    /// The node lost focus.
    fn on_blur(&mut self, _details: &FocusDetails<'_>, _ctx: &mut Context<'_>) {}

    /// A direction was pressed while this node held focus. Runs before the
    /// move is resolved; returning [`ArrowOutcome::Veto`] cancels it.
    fn on_arrow_press(&mut self, _event: &ArrowEvent<'_>, _ctx: &mut Context<'_>) -> ArrowOutcome {
        ArrowOutcome::Proceed
    }

    /// A direction was released while this node held focus.
    fn on_arrow_release(&mut self, _event: &ArrowEvent<'_>, _ctx: &mut Context<'_>) {}

    /// Enter was pressed on this node or, if opted in, on a descendant.
    fn on_enter_press(&mut self, _event: &EnterEvent<'_>, _ctx: &mut Context<'_>) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Enter was released on this node or, if opted in, on a descendant.
    fn on_enter_release(&mut self, _event: &EnterEvent<'_>, _ctx: &mut Context<'_>) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Only fired for nodes that track children: whether a descendant holds
    /// focus changed.
    fn on_child_focus_change(&mut self, _has_focused_child: bool, _ctx: &mut Context<'_>) {}
}

impl Handler for () {}

/// Boxed focus/blur callback.
type FocusFn = Box<dyn FnMut(&FocusDetails<'_>, &mut Context<'_>)>;
/// Boxed arrow-press callback.
type ArrowPressFn = Box<dyn FnMut(&ArrowEvent<'_>, &mut Context<'_>) -> ArrowOutcome>;
/// Boxed arrow-release callback.
type ArrowReleaseFn = Box<dyn FnMut(&ArrowEvent<'_>, &mut Context<'_>)>;
/// Boxed enter callback.
type EnterFn = Box<dyn FnMut(&EnterEvent<'_>, &mut Context<'_>) -> EventOutcome>;
/// Boxed child-focus callback.
type ChildFocusFn = Box<dyn FnMut(bool, &mut Context<'_>)>;

/// A [`Handler`] assembled from closures.
#[derive(Default)]
pub struct Callbacks {
    /// Focus callback.
    focus: Option<FocusFn>,
    /// Blur callback.
    blur: Option<FocusFn>,
    /// Arrow press callback.
    arrow_press: Option<ArrowPressFn>,
    /// Arrow release callback.
    arrow_release: Option<ArrowReleaseFn>,
    /// Enter press callback.
    enter_press: Option<EnterFn>,
    /// Enter release callback.
    enter_release: Option<EnterFn>,
    /// Child focus callback.
    child_focus: Option<ChildFocusFn>,
}

impl Callbacks {
    /// An empty callback set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the focus callback.
    #[must_use]
    pub fn on_focus(mut self, f: impl FnMut(&FocusDetails<'_>, &mut Context<'_>) + 'static) -> Self {
        self.focus = Some(Box::new(f));
        self
    }

    /// Builder: set the blur callback.
    #[must_use]
    pub fn on_blur(mut self, f: impl FnMut(&FocusDetails<'_>, &mut Context<'_>) + 'static) -> Self {
        self.blur = Some(Box::new(f));
        self
    }

    /// Builder: set the arrow press callback.
    #[must_use]
    pub fn on_arrow_press(
        mut self,
        f: impl FnMut(&ArrowEvent<'_>, &mut Context<'_>) -> ArrowOutcome + 'static,
    ) -> Self {
        self.arrow_press = Some(Box::new(f));
        self
    }

    /// Builder: set the arrow release callback.
    #[must_use]
    pub fn on_arrow_release(
        mut self,
        f: impl FnMut(&ArrowEvent<'_>, &mut Context<'_>) + 'static,
    ) -> Self {
        self.arrow_release = Some(Box::new(f));
        self
    }

    /// Builder: set the enter press callback.
    #[must_use]
    pub fn on_enter_press(
        mut self,
        f: impl FnMut(&EnterEvent<'_>, &mut Context<'_>) -> EventOutcome + 'static,
    ) -> Self {
        self.enter_press = Some(Box::new(f));
        self
    }

    /// Builder: set the enter release callback.
    #[must_use]
    pub fn on_enter_release(
        mut self,
        f: impl FnMut(&EnterEvent<'_>, &mut Context<'_>) -> EventOutcome + 'static,
    ) -> Self {
        self.enter_release = Some(Box::new(f));
        self
    }

    /// Builder: set the child focus callback.
    #[must_use]
    pub fn on_child_focus_change(mut self, f: impl FnMut(bool, &mut Context<'_>) + 'static) -> Self {
        self.child_focus = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("focus", &self.focus.is_some())
            .field("blur", &self.blur.is_some())
            .field("arrow_press", &self.arrow_press.is_some())
            .field("arrow_release", &self.arrow_release.is_some())
            .field("enter_press", &self.enter_press.is_some())
            .field("enter_release", &self.enter_release.is_some())
            .field("child_focus", &self.child_focus.is_some())
            .finish()
    }
}

impl Handler for Callbacks {
    fn on_focus(&mut self, details: &FocusDetails<'_>, ctx: &mut Context<'_>) {
        if let Some(f) = self.focus.as_mut() {
            f(details, ctx);
        }
    }

    fn on_blur(&mut self, details: &FocusDetails<'_>, ctx: &mut Context<'_>) {
        if let Some(f) = self.blur.as_mut() {
            f(details, ctx);
        }
    }

    fn on_arrow_press(&mut self, event: &ArrowEvent<'_>, ctx: &mut Context<'_>) -> ArrowOutcome {
        self.arrow_press
            .as_mut()
            .map_or(ArrowOutcome::Proceed, |f| f(event, ctx))
    }

    fn on_arrow_release(&mut self, event: &ArrowEvent<'_>, ctx: &mut Context<'_>) {
        if let Some(f) = self.arrow_release.as_mut() {
            f(event, ctx);
        }
    }

    fn on_enter_press(&mut self, event: &EnterEvent<'_>, ctx: &mut Context<'_>) -> EventOutcome {
        self.enter_press
            .as_mut()
            .map_or(EventOutcome::Ignore, |f| f(event, ctx))
    }

    fn on_enter_release(&mut self, event: &EnterEvent<'_>, ctx: &mut Context<'_>) -> EventOutcome {
        self.enter_release
            .as_mut()
            .map_or(EventOutcome::Ignore, |f| f(event, ctx))
    }

    fn on_child_focus_change(&mut self, has_focused_child: bool, ctx: &mut Context<'_>) {
        if let Some(f) = self.child_focus.as_mut() {
            f(has_focused_child, ctx);
        }
    }
}
