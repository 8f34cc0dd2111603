use std::{cell::RefCell, rc::Rc};

use crate::{
    geom::Direction,
    handler::{
        ArrowEvent, ArrowOutcome, Context, EnterEvent, EventOutcome, FocusDetails, Handler,
    },
};

/// A shared callback log.
pub type Log = Rc<RefCell<Vec<String>>>;

/// Create an empty log.
pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A handler that appends a line to a shared [`Log`] for every callback.
///
/// Lines look like `focus:a`, `blur:a`, `arrow:a:right:0`,
/// `release:a:right`, `enter:a<-b`, `enter-release:a<-b` and
/// `child:row:true`.
pub struct Recorder {
    /// Name used in log lines.
    name: String,
    /// Destination log.
    log: Log,
    /// Veto every arrow press.
    veto: bool,
    /// Outcome returned from enter handlers.
    enter: EventOutcome,
    /// Key to request focus for when this node gains focus.
    redirect_on_focus: Option<String>,
    /// Direction to request when this node gains focus.
    navigate_on_focus: Option<Direction>,
}

impl Recorder {
    /// A recorder that logs under `name`.
    pub fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Rc::clone(log),
            veto: false,
            enter: EventOutcome::Ignore,
            redirect_on_focus: None,
            navigate_on_focus: None,
        }
    }

    /// Builder: veto arrow presses.
    #[must_use]
    pub fn veto(mut self, veto: bool) -> Self {
        self.veto = veto;
        self
    }

    /// Builder: outcome for enter events.
    #[must_use]
    pub fn enter(mut self, outcome: EventOutcome) -> Self {
        self.enter = outcome;
        self
    }

    /// Builder: queue a focus request for `key` from `on_focus`.
    #[must_use]
    pub fn redirect_on_focus(mut self, key: &str) -> Self {
        self.redirect_on_focus = Some(key.to_string());
        self
    }

    /// Builder: queue a navigation from `on_focus`.
    #[must_use]
    pub fn navigate_on_focus(mut self, dir: Direction) -> Self {
        self.navigate_on_focus = Some(dir);
        self
    }

    /// Append a line.
    fn push(&self, line: String) {
        self.log.borrow_mut().push(line);
    }
}

impl Handler for Recorder {
    fn on_focus(&mut self, _details: &FocusDetails<'_>, ctx: &mut Context<'_>) {
        self.push(format!("focus:{}", self.name));
        if let Some(k) = &self.redirect_on_focus {
            ctx.set_focus(k);
        }
        if let Some(d) = self.navigate_on_focus {
            ctx.navigate(d);
        }
    }

    fn on_blur(&mut self, _details: &FocusDetails<'_>, _ctx: &mut Context<'_>) {
        self.push(format!("blur:{}", self.name));
    }

    fn on_arrow_press(&mut self, event: &ArrowEvent<'_>, _ctx: &mut Context<'_>) -> ArrowOutcome {
        self.push(format!(
            "arrow:{}:{}:{}",
            self.name, event.direction, event.repeat
        ));
        if self.veto {
            ArrowOutcome::Veto
        } else {
            ArrowOutcome::Proceed
        }
    }

    fn on_arrow_release(&mut self, event: &ArrowEvent<'_>, _ctx: &mut Context<'_>) {
        self.push(format!("release:{}:{}", self.name, event.direction));
    }

    fn on_enter_press(&mut self, event: &EnterEvent<'_>, _ctx: &mut Context<'_>) -> EventOutcome {
        self.push(format!("enter:{}<-{}", self.name, event.target));
        self.enter
    }

    fn on_enter_release(&mut self, event: &EnterEvent<'_>, _ctx: &mut Context<'_>) -> EventOutcome {
        self.push(format!("enter-release:{}<-{}", self.name, event.target));
        self.enter
    }

    fn on_child_focus_change(&mut self, has_focused_child: bool, _ctx: &mut Context<'_>) {
        self.push(format!("child:{}:{has_focused_child}", self.name));
    }
}
