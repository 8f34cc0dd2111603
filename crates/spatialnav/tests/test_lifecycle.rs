//! Engine lifecycle, event dispatch and handler re-entrancy.

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use spatialnav::{
        ArrowOutcome, Callbacks, Direction, Engine, Error, EventOutcome, FocusKey, FocusOrigin,
        Lifecycle, MeasurePolicy, Navigation, NodeConfig, Options, Rect, Result,
        testing::{Recorder, new_log},
    };

    fn node(key: &str, x: i32, y: i32) -> NodeConfig {
        NodeConfig::with_key(key).rect(Rect::new(x, y, 10, 10))
    }

    fn focused(e: &Engine) -> Option<String> {
        e.current_focus_key().map(|k| k.to_string())
    }

    #[test]
    fn init_is_idempotent() -> Result<()> {
        let options = Options::default().with_initial_focus(FocusKey::new("b")?);
        let mut e = Engine::new();
        e.register(node("a", 0, 0))?;
        e.register(node("b", 20, 0))?;
        e.init(options.clone());
        assert_eq!(focused(&e), Some("b".into()));

        e.set_focus("a")?;
        let before = e.snapshot();
        e.init(options);
        assert_eq!(e.snapshot(), before);
        assert_eq!(focused(&e), Some("a".into()));
        Ok(())
    }

    #[test]
    fn destroy_is_safe_without_init() -> Result<()> {
        let mut e = Engine::new();
        e.register(node("a", 0, 0))?;
        e.destroy();
        e.destroy();
        assert_eq!(e.lifecycle(), Lifecycle::Destroyed);
        assert!(e.is_empty());
        assert!(matches!(
            e.navigate(Direction::Up, None),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(e.press_enter(None), Err(Error::InvalidState(_))));

        // Registration still works, and init brings the engine back.
        e.register(node("a", 0, 0))?;
        e.init(Options::default());
        assert_eq!(e.lifecycle(), Lifecycle::Ready);
        assert!(e.navigate(Direction::Up, None)?.moved());
        Ok(())
    }

    #[test]
    fn veto_cancels_the_move() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(
            node("a", 0, 0).handler(Recorder::new("a", &log).veto(true)),
        )?;
        e.register(node("b", 20, 0).handler(Recorder::new("b", &log)))?;
        e.set_focus("a")?;
        assert_eq!(e.navigate(Direction::Right, None)?, Navigation::Vetoed);
        assert_eq!(focused(&e), Some("a".into()));
        assert_eq!(*log.borrow(), vec!["focus:a", "arrow:a:right:0"]);
        Ok(())
    }

    #[test]
    fn arrow_repeat_and_release() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log).veto(true)))?;
        e.set_focus("a")?;
        e.navigate(Direction::Down, None)?;
        e.navigate(Direction::Down, None)?;
        e.navigate(Direction::Down, None)?;
        e.release_direction(Direction::Down, None)?;
        e.navigate(Direction::Down, None)?;
        assert_eq!(
            *log.borrow(),
            vec![
                "focus:a",
                "arrow:a:down:0",
                "arrow:a:down:1",
                "arrow:a:down:2",
                "release:a:down",
                "arrow:a:down:0",
            ]
        );
        Ok(())
    }

    #[test]
    fn original_event_reaches_the_handler() -> Result<()> {
        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Callbacks::new().on_arrow_press(
            move |ev, _ctx| {
                if let Some(code) = ev.original.and_then(|o| o.downcast_ref::<u32>()) {
                    s.set(*code);
                }
                ArrowOutcome::Proceed
            },
        )))?;
        e.set_focus("a")?;
        let keycode: u32 = 37;
        e.navigate(Direction::Left, Some(&keycode))?;
        assert_eq!(seen.get(), 37);
        Ok(())
    }

    #[test]
    fn focus_details_carry_payload_and_box() -> Result<()> {
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 3, 4).payload("row 1").handler(Callbacks::new().on_focus(
            move |details, _ctx| {
                let payload = details
                    .payload
                    .and_then(|p| p.downcast_ref::<&str>())
                    .copied();
                *s.borrow_mut() = Some((details.rect, payload, details.origin));
            },
        )))?;
        e.set_focus("a")?;
        assert_eq!(
            *seen.borrow(),
            Some((
                Some(Rect::new(3, 4, 10, 10)),
                Some("row 1"),
                FocusOrigin::Explicit
            ))
        );
        Ok(())
    }

    #[test]
    fn enter_bubbles_to_opted_in_ancestors() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(
            NodeConfig::with_key("dialog")
                .focusable(false)
                .bubble_enter(true)
                .handler(Recorder::new("dialog", &log).enter(EventOutcome::Handle)),
        )?;
        e.register(
            NodeConfig::with_key("form")
                .parent("dialog")
                .focusable(false)
                .handler(Recorder::new("form", &log).enter(EventOutcome::Handle)),
        )?;
        e.register(
            node("field", 0, 0)
                .parent("form")
                .handler(Recorder::new("field", &log)),
        )?;
        e.set_focus("field")?;
        log.borrow_mut().clear();

        assert_eq!(e.press_enter(None)?, EventOutcome::Handle);
        assert_eq!(e.release_enter(None)?, EventOutcome::Handle);
        assert_eq!(
            *log.borrow(),
            vec![
                "enter:field<-field",
                "enter:dialog<-field",
                "enter-release:field<-field",
                "enter-release:dialog<-field",
            ]
        );
        Ok(())
    }

    #[test]
    fn enter_stops_at_the_first_handler() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(
            NodeConfig::with_key("list")
                .focusable(false)
                .bubble_enter(true)
                .handler(Recorder::new("list", &log)),
        )?;
        e.register(
            node("item", 0, 0)
                .parent("list")
                .handler(Recorder::new("item", &log).enter(EventOutcome::Consume)),
        )?;
        assert_eq!(e.press_enter(None)?, EventOutcome::Ignore);
        e.set_focus("item")?;
        log.borrow_mut().clear();
        assert_eq!(e.press_enter(None)?, EventOutcome::Consume);
        assert_eq!(*log.borrow(), vec!["enter:item<-item"]);
        Ok(())
    }

    #[test]
    fn enter_repeat_counts() -> Result<()> {
        let repeats = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&repeats);
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Callbacks::new().on_enter_press(
            move |ev, _ctx| {
                r.borrow_mut().push(ev.repeat);
                EventOutcome::Handle
            },
        )))?;
        e.set_focus("a")?;
        e.press_enter(None)?;
        e.press_enter(None)?;
        e.release_enter(None)?;
        e.press_enter(None)?;
        assert_eq!(*repeats.borrow(), vec![0, 1, 0]);
        Ok(())
    }

    #[test]
    fn handler_requests_run_after_commit() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log)))?;
        e.register(
            node("b", 20, 0).handler(Recorder::new("b", &log).redirect_on_focus("c")),
        )?;
        e.register(node("c", 40, 0).handler(Recorder::new("c", &log)))?;
        e.set_focus("a")?;

        // b asks for c from inside its focus callback. The move to b
        // completes first, then the request runs.
        assert!(e.set_focus("b")?);
        assert_eq!(focused(&e), Some("c".into()));
        assert_eq!(
            *log.borrow(),
            vec!["focus:a", "blur:a", "focus:b", "blur:b", "focus:c"]
        );
        Ok(())
    }

    #[test]
    fn deferred_navigation() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log)))?;
        e.register(
            node("b", 20, 0).handler(Recorder::new("b", &log).navigate_on_focus(Direction::Right)),
        )?;
        e.register(node("c", 40, 0).handler(Recorder::new("c", &log)))?;
        e.set_focus("a")?;
        e.navigate(Direction::Right, None)?;
        assert_eq!(focused(&e), Some("c".into()));
        // The queued move does not fire another arrow press.
        assert_eq!(
            *log.borrow(),
            vec!["focus:a", "arrow:a:right:0", "blur:a", "focus:b", "blur:b", "focus:c"]
        );
        Ok(())
    }

    #[test]
    fn runaway_requests_are_capped() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options {
            max_deferred: 5,
            ..Options::default()
        });
        // Two nodes that bounce focus to each other forever.
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log).redirect_on_focus("b")))?;
        e.register(node("b", 20, 0).handler(Recorder::new("b", &log).redirect_on_focus("a")))?;
        e.set_focus("a")?;
        let focuses = log
            .borrow()
            .iter()
            .filter(|l| l.starts_with("focus:"))
            .count();
        assert_eq!(focuses, 6);
        assert_eq!(focused(&e), Some("b".into()));
        Ok(())
    }

    #[test]
    fn pause_and_resume() -> Result<()> {
        let log = new_log();
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log)))?;
        e.register(node("b", 20, 0))?;
        e.set_focus("a")?;
        e.pause();
        assert!(e.is_paused());
        assert_eq!(e.navigate(Direction::Right, None)?, Navigation::Paused);
        e.release_direction(Direction::Right, None)?;
        assert_eq!(*log.borrow(), vec!["focus:a"]);
        e.resume();
        assert!(e.navigate(Direction::Right, None)?.moved());
        Ok(())
    }

    #[test]
    fn measurement_is_batched() -> Result<()> {
        let calls = Rc::new(Cell::new(0u32));
        let measured = |x: i32| {
            let c = Rc::clone(&calls);
            move || {
                c.set(c.get() + 1);
                Some(Rect::new(x, 0, 10, 10))
            }
        };
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(NodeConfig::with_key("a").element(measured(0)))?;
        e.register(NodeConfig::with_key("b").element(measured(20)))?;
        e.register(NodeConfig::with_key("c").element(measured(40)))?;
        e.set_focus("a")?;
        e.navigate(Direction::Right, None)?;
        let after_first = calls.get();

        // A burst of layout notifications costs one measurement per node.
        for _ in 0..10 {
            e.layout_changed("b")?;
            e.invalidate_all();
        }
        e.navigate(Direction::Left, None)?;
        let after_burst = calls.get();
        assert!(after_burst - after_first <= 3);

        // Without notifications the cache is used.
        e.navigate(Direction::Right, None)?;
        assert_eq!(calls.get(), after_burst);
        Ok(())
    }

    #[test]
    fn always_policy_remeasures() -> Result<()> {
        let x = Rc::new(Cell::new(20));
        let pos = Rc::clone(&x);
        let mut e = Engine::new();
        e.init(Options::default().with_measure(MeasurePolicy::Always));
        e.register(node("a", 0, 0))?;
        e.register(
            NodeConfig::with_key("b").element(move || Some(Rect::new(pos.get(), 0, 10, 10))),
        )?;
        e.set_focus("a")?;
        // Move b to the left of a without telling the engine.
        x.set(-20);
        assert_eq!(e.navigate(Direction::Right, None)?, Navigation::NoCandidate);
        assert!(e.navigate(Direction::Left, None)?.moved());
        Ok(())
    }

    #[test]
    fn options_load_from_json() -> anyhow::Result<()> {
        let options: Options = serde_json::from_str(
            r#"{ "rtl": true, "initial_focus": "home", "distance": "center" }"#,
        )?;
        assert!(options.rtl);
        assert_eq!(options.initial_focus, Some(FocusKey::new("home")?));
        assert_eq!(options.primary_weight, Options::default().primary_weight);

        let bad: std::result::Result<Options, _> =
            serde_json::from_str(r#"{ "initial_focus": "" }"#);
        assert!(bad.is_err());
        Ok(())
    }

    #[test]
    fn snapshot_serializes() -> anyhow::Result<()> {
        let mut e = Engine::new();
        e.init(Options::default());
        e.register(node("a", 0, 0))?;
        e.set_focus("a")?;
        let json = serde_json::to_value(e.snapshot())?;
        assert_eq!(json["focused"], "a");
        assert_eq!(json["lifecycle"], "ready");
        assert_eq!(json["nodes"][0]["rect"]["w"], 10);
        Ok(())
    }

    #[test]
    fn independent_engines() -> Result<()> {
        let mut left = Engine::new();
        let mut right = Engine::new();
        left.init(Options::default());
        right.init(Options::default());
        left.register(node("a", 0, 0))?;
        right.register(node("a", 0, 0))?;
        left.set_focus("a")?;
        assert_eq!(focused(&left), Some("a".into()));
        assert_eq!(right.current_focus_key(), None);
        Ok(())
    }
}
