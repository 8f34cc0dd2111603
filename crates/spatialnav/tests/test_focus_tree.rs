//! Containment: redirection into containers, focus path flags and
//! restoration after unregistration.

#[cfg(test)]
mod tests {
    use spatialnav::{
        Direction, Engine, Error, FocusKey, Navigation, NodeConfig, NodeUpdate, Options,
        ROOT_KEY, Rect, Result,
        testing::{Recorder, new_log},
    };

    fn engine() -> Engine {
        let mut e = Engine::new();
        e.init(Options::default());
        e
    }

    fn node(key: &str, x: i32, y: i32) -> NodeConfig {
        NodeConfig::with_key(key).rect(Rect::new(x, y, 10, 10))
    }

    fn focused(e: &Engine) -> Option<String> {
        e.current_focus_key().map(|k| k.to_string())
    }

    /// A menu row of three items inside a page.
    fn menu(e: &mut Engine) -> Result<()> {
        e.register(NodeConfig::with_key("page").focusable(false))?;
        e.register(NodeConfig::with_key("menu").parent("page").focusable(false))?;
        e.register(node("m1", 0, 0).parent("menu"))?;
        e.register(node("m2", 20, 0).parent("menu"))?;
        e.register(node("m3", 40, 0).parent("menu"))?;
        Ok(())
    }

    #[test]
    fn focus_on_container_redirects() -> Result<()> {
        let mut e = engine();
        menu(&mut e)?;
        assert!(e.set_focus("page")?);
        assert_eq!(focused(&e), Some("m1".into()));

        e.set_focus("m3")?;
        e.register(node("elsewhere", 0, 40))?;
        e.set_focus("elsewhere")?;
        e.set_focus("menu")?;
        assert_eq!(focused(&e), Some("m3".into()));

        e.update("menu", NodeUpdate::new().preferred_child(Some("m2")))?;
        e.set_focus("elsewhere")?;
        e.set_focus("menu")?;
        assert_eq!(focused(&e), Some("m2".into()));
        Ok(())
    }

    #[test]
    fn without_saved_history_first_child_wins() -> Result<()> {
        let mut e = engine();
        e.register(
            NodeConfig::with_key("menu")
                .focusable(false)
                .save_last_focused_child(false),
        )?;
        e.register(node("m1", 0, 0).parent("menu"))?;
        e.register(node("m2", 20, 0).parent("menu"))?;
        e.register(node("other", 0, 20))?;
        e.set_focus("m2")?;
        e.set_focus("other")?;
        e.set_focus("menu")?;
        assert_eq!(focused(&e), Some("m1".into()));
        Ok(())
    }

    #[test]
    fn focusable_container_without_children() -> Result<()> {
        let mut e = engine();
        e.register(node("card", 0, 0))?;
        assert!(e.set_focus("card")?);
        e.register(node("badge", 0, 0).parent("card"))?;
        // Once it has a child, focus sent to the card lands inside it.
        e.register(node("other", 20, 0))?;
        e.set_focus("other")?;
        e.set_focus("card")?;
        assert_eq!(focused(&e), Some("badge".into()));
        Ok(())
    }

    #[test]
    fn has_focused_child_follows_focus() -> Result<()> {
        let mut e = engine();
        menu(&mut e)?;
        e.register(node("side", 0, 40))?;
        e.set_focus("m2")?;
        assert!(e.focus_state("menu")?.has_focused_child);
        assert!(e.focus_state("page")?.has_focused_child);
        assert!(!e.focus_state("m2")?.has_focused_child);
        assert!(e.focus_state("m2")?.focused);

        e.set_focus("side")?;
        assert!(!e.focus_state("menu")?.has_focused_child);
        assert!(!e.focus_state("page")?.has_focused_child);
        assert!(!e.focus_state("m2")?.focused);
        Ok(())
    }

    #[test]
    fn tracked_containers_are_notified() -> Result<()> {
        let log = new_log();
        let mut e = engine();
        e.register(
            NodeConfig::with_key("left")
                .focusable(false)
                .track_children(true)
                .handler(Recorder::new("left", &log)),
        )?;
        e.register(
            node("l1", 0, 0)
                .parent("left")
                .handler(Recorder::new("l1", &log)),
        )?;
        e.register(
            node("l2", 0, 20)
                .parent("left")
                .handler(Recorder::new("l2", &log)),
        )?;
        e.register(
            NodeConfig::with_key("right")
                .focusable(false)
                .track_children(true)
                .handler(Recorder::new("right", &log)),
        )?;
        e.register(
            node("r1", 20, 0)
                .parent("right")
                .handler(Recorder::new("r1", &log)),
        )?;

        e.set_focus("l1")?;
        e.navigate(Direction::Down, None)?;
        e.navigate(Direction::Right, None)?;
        assert_eq!(
            *log.borrow(),
            vec![
                "child:left:true",
                "focus:l1",
                "arrow:l1:down:0",
                "blur:l1",
                "focus:l2",
                "arrow:l2:right:0",
                "blur:l2",
                "child:left:false",
                "child:right:true",
                "focus:r1",
            ]
        );
        Ok(())
    }

    #[test]
    fn removing_focused_node_restores_last_sibling() -> Result<()> {
        let mut e = engine();
        menu(&mut e)?;
        e.set_focus("m1")?;
        e.set_focus("m3")?;
        e.set_focus("m2")?;
        e.unregister("m2")?;
        // m3 held focus before m2.
        assert_eq!(focused(&e), Some("m3".into()));
        assert!(e.focus_state("menu")?.has_focused_child);

        e.unregister("m3")?;
        assert_eq!(focused(&e), Some("m1".into()));
        Ok(())
    }

    #[test]
    fn removing_focused_container_restores_into_parent() -> Result<()> {
        let mut e = engine();
        e.register(NodeConfig::with_key("screen").focusable(false))?;
        e.register(node("header", 0, 0).parent("screen"))?;
        e.register(
            NodeConfig::with_key("dialog")
                .parent("screen")
                .focusable(false),
        )?;
        e.register(node("ok", 0, 20).parent("dialog"))?;
        e.set_focus("header")?;
        e.set_focus("ok")?;

        e.unregister("dialog")?;
        assert!(!e.contains("ok"));
        assert_eq!(focused(&e), Some("header".into()));
        Ok(())
    }

    #[test]
    fn restoration_can_be_disabled() -> Result<()> {
        let mut e = engine();
        e.register(
            NodeConfig::with_key("list")
                .focusable(false)
                .auto_restore_focus(false),
        )?;
        e.register(node("a", 0, 0).parent("list"))?;
        e.register(node("b", 0, 20).parent("list"))?;
        e.set_focus("a")?;
        e.unregister("a")?;
        assert_eq!(e.current_focus_key(), None);
        assert!(!e.focus_state("list")?.has_focused_child);
        Ok(())
    }

    #[test]
    fn removed_nodes_get_no_blur() -> Result<()> {
        let log = new_log();
        let mut e = engine();
        e.register(node("a", 0, 0).handler(Recorder::new("a", &log)))?;
        e.register(node("b", 20, 0).handler(Recorder::new("b", &log)))?;
        e.set_focus("a")?;
        e.unregister("a")?;
        assert_eq!(*log.borrow(), vec!["focus:a", "focus:b"]);
        Ok(())
    }

    #[test]
    fn unregistering_unfocused_subtree_keeps_focus() -> Result<()> {
        let mut e = engine();
        menu(&mut e)?;
        e.register(node("side", 0, 40))?;
        e.set_focus("side")?;
        let generation = e.focus_gen();
        e.unregister("page")?;
        assert_eq!(focused(&e), Some("side".into()));
        assert_eq!(e.focus_gen(), generation);
        assert_eq!(e.len(), 1);
        Ok(())
    }

    #[test]
    fn disabled_container_refuses_focus() -> Result<()> {
        let mut e = engine();
        e.register(NodeConfig::with_key("menu").focusable(false).disabled(true))?;
        e.register(node("x", 0, 0).parent("menu"))?;
        e.register(node("outside", 0, 20))?;
        assert!(matches!(e.set_focus("x"), Err(Error::NotFocusable(_))));
        assert!(matches!(e.set_focus("menu"), Err(Error::NotFocusable(_))));

        // With nothing focused, the first press skips the disabled subtree.
        e.navigate(Direction::Right, None)?;
        assert_eq!(focused(&e), Some("outside".into()));
        Ok(())
    }

    #[test]
    fn disabling_a_container_stops_navigation_inside_it() -> Result<()> {
        let mut e = engine();
        e.register(NodeConfig::with_key("menu").focusable(false))?;
        e.register(node("x", 0, 0).parent("menu"))?;
        e.register(node("y", 20, 0).parent("menu"))?;
        e.set_focus("x")?;
        e.update("menu", NodeUpdate::new().disabled(true))?;
        assert_eq!(e.navigate(Direction::Right, None)?, Navigation::NoCandidate);
        assert_eq!(focused(&e), Some("x".into()));

        e.update("menu", NodeUpdate::new().disabled(false))?;
        e.navigate(Direction::Right, None)?;
        assert_eq!(focused(&e), Some("y".into()));
        Ok(())
    }

    #[test]
    fn restoration_uses_history_before_preferred_child() -> Result<()> {
        let mut e = engine();
        e.register(
            NodeConfig::with_key("row")
                .focusable(false)
                .preferred_child("a"),
        )?;
        e.register(node("a", 0, 0).parent("row"))?;
        e.register(node("b", 20, 0).parent("row"))?;
        e.register(node("c", 40, 0).parent("row"))?;
        e.set_focus("b")?;
        e.set_focus("c")?;
        e.unregister("c")?;
        assert_eq!(focused(&e), Some("b".into()));

        // Entering the row from outside still goes to the preferred child.
        e.register(node("below", 0, 20))?;
        e.set_focus("below")?;
        e.set_focus("row")?;
        assert_eq!(focused(&e), Some("a".into()));
        Ok(())
    }

    #[test]
    fn root_key_is_reserved() -> Result<()> {
        let mut e = engine();
        assert!(matches!(
            e.register(NodeConfig::with_key(ROOT_KEY)),
            Err(Error::InvalidKey(_))
        ));
        assert!(!e.contains(ROOT_KEY));
        assert!(matches!(e.set_focus(ROOT_KEY), Err(Error::UnknownKey(_))));
        assert!(matches!(e.unregister(ROOT_KEY), Err(Error::UnknownKey(_))));
        assert!(matches!(
            e.update(ROOT_KEY, NodeUpdate::new().disabled(true)),
            Err(Error::UnknownKey(_))
        ));
        assert!(matches!(
            e.register(node("a", 0, 0).parent(ROOT_KEY)),
            Err(Error::UnknownKey(_))
        ));
        Ok(())
    }

    #[test]
    fn registry_errors() -> Result<()> {
        let mut e = engine();
        e.register(node("a", 0, 0))?;
        assert_eq!(
            e.register(node("a", 20, 0)),
            Err(Error::DuplicateKey(FocusKey::new("a")?))
        );
        assert!(matches!(
            e.register(node("b", 0, 0).parent("ghost")),
            Err(Error::UnknownKey(_))
        ));
        assert!(matches!(
            e.register(node(" padded", 0, 0)),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(e.unregister("ghost"), Err(Error::UnknownKey(_))));
        assert!(matches!(e.node("ghost"), Err(Error::UnknownKey(_))));

        let generated = e.register(NodeConfig::new())?;
        assert!(generated.is_generated());
        Ok(())
    }
}
