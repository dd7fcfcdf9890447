// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use super::fixtures::{wire_events, FakeNode, Fiber, Harness};
use super::{
    AgentEvent, DebugSlot, HostConsole, LookupError, NativeRef, RendererInterface, Selection,
    SlotValue,
};
use crate::bridge::{names, Envelope, WireEvent};
use crate::config::BridgeConfig;
use crate::model::{
    same_object, Capabilities, ElementId, Handle, Opaque, PathKey, RawElement, RendererId, Updater,
};

#[fixture]
fn harness() -> Harness {
    Harness::new(Capabilities { scroll: true, dom: true, edit_text_content: false })
}

fn inbound(name: &str, payload: Value) -> Envelope {
    Envelope::Event(WireEvent::new(name, payload))
}

fn node(label: &str) -> NativeRef {
    FakeNode::element(label)
}

#[rstest]
fn root_and_mount_reach_the_wire_in_order(harness: Harness) {
    let (_bridge, sent) = harness.bridge(BridgeConfig::default());
    let app = Fiber::handle("App");

    let root = harness.agent.add_root(&harness.renderer, &app);
    let mounted = harness.agent.on_mounted(
        &harness.renderer,
        &app,
        RawElement::new("App").with_children(Vec::new()),
    );

    assert_eq!(root, mounted);
    assert_eq!(
        wire_events(&sent),
        vec![
            (names::ROOT.to_owned(), json!(root.as_str())),
            (
                names::MOUNT.to_owned(),
                json!({ "id": root.as_str(), "name": "App", "children": [], "canUpdate": false }),
            ),
        ]
    );
    assert_eq!(harness.agent.roots(), vec![root.clone()]);
    assert_eq!(harness.agent.renderer_of(&root), Some(harness.renderer.clone()));
}

#[rstest]
fn children_are_sent_as_identities(harness: Harness) {
    let (_bridge, sent) = harness.bridge(BridgeConfig::default());
    let list = Fiber::handle("List");
    let item = Fiber::handle("Item");

    let item_id = harness.agent.on_mounted(&harness.renderer, &item, RawElement::new("Item"));
    let list_id = harness.agent.on_mounted(
        &harness.renderer,
        &list,
        RawElement::new("List").with_children(vec![item.clone()]),
    );

    let (_, payload) = wire_events(&sent).pop().expect("mount");
    assert_eq!(payload["id"], json!(list_id.as_str()));
    assert_eq!(payload["children"], json!([item_id.as_str()]));
}

#[rstest]
fn update_keeps_identity_and_replaces_snapshot(harness: Harness) {
    let (_bridge, sent) = harness.bridge(BridgeConfig::default());
    let counter = Fiber::handle("Counter");

    let id = harness.agent.on_mounted(
        &harness.renderer,
        &counter,
        RawElement::new("Counter").with_state(json!({ "count": 0 })),
    );
    let updated = harness
        .agent
        .on_updated(&counter, RawElement::new("Counter").with_state(json!({ "count": 1 })));

    assert_eq!(updated, Some(id.clone()));
    let snapshot = harness.agent.snapshot(&id).expect("snapshot");
    assert_eq!(snapshot.fields().state, Some(json!({ "count": 1 })));

    let (name, payload) = wire_events(&sent).pop().expect("update");
    assert_eq!(name, names::UPDATE);
    assert_eq!(payload["state"], json!({ "count": 1 }));
}

#[rstest]
fn update_before_mount_is_dropped(harness: Harness) {
    let stray = Fiber::handle("Stray");
    assert_eq!(harness.agent.on_updated(&stray, RawElement::new("Stray")), None);
    assert!(harness.kinds().is_empty());
    assert_eq!(harness.agent.element_count(), 0);
}

#[rstest]
fn unmount_forgets_identity_and_remount_gets_a_fresh_one(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());
    let app = Fiber::handle("App");

    let first = harness.agent.add_root(&harness.renderer, &app);
    harness.agent.on_mounted(&harness.renderer, &app, RawElement::new("App"));
    assert!(bridge.is_inspectable(&first));
    harness.clear();
    sent.borrow_mut().clear();

    assert_eq!(harness.agent.on_unmounted(&app), Some(first.clone()));

    assert_eq!(harness.kinds(), ["rootUnmounted", "unmount"]);
    let wire = wire_events(&sent);
    assert_eq!(
        wire,
        vec![
            (names::UNMOUNT.to_owned(), json!(first.as_str())),
            (names::FORGET.to_owned(), json!(first.as_str())),
        ]
    );
    assert!(!bridge.is_inspectable(&first));
    assert!(harness.agent.snapshot(&first).is_none());
    assert!(harness.agent.roots().is_empty());
    assert_eq!(harness.agent.renderer_of(&first), None);
    assert_eq!(harness.agent.lookup_handle(&app), None);

    let second = harness.agent.on_mounted(&harness.renderer, &app, RawElement::new("App"));
    assert_ne!(first, second);
}

#[rstest]
fn unmount_listeners_can_still_resolve_the_handle(harness: Harness) {
    let app = Fiber::handle("App");
    let id = harness.agent.on_mounted(&harness.renderer, &app, RawElement::new("App"));

    let seen = Rc::new(RefCell::new(None));
    let _probe = {
        let agent = harness.agent.clone();
        let app = app.clone();
        let seen = Rc::clone(&seen);
        harness.agent.subscribe(move |event| {
            if matches!(event, AgentEvent::Unmount(_)) {
                *seen.borrow_mut() = agent.lookup_handle(&app);
            }
        })
    };

    harness.agent.on_unmounted(&app);
    assert_eq!(*seen.borrow(), Some(id));
    assert_eq!(harness.agent.lookup_handle(&app), None);
}

#[rstest]
fn unmount_of_an_unknown_handle_is_ignored(harness: Harness) {
    assert_eq!(harness.agent.on_unmounted(&Fiber::handle("Ghost")), None);
    let value = Handle::value(ElementId::new("host-7").expect("id"));
    assert_eq!(harness.agent.on_unmounted(&value), None);
    assert!(harness.kinds().is_empty());
}

#[rstest]
fn value_handles_use_their_own_identity(harness: Harness) {
    let id = ElementId::new("host-7").expect("id");
    let handle = Handle::value(id.clone());

    assert_eq!(harness.agent.on_mounted(&harness.renderer, &handle, RawElement::new("View")), id);
    assert_eq!(harness.agent.on_unmounted(&handle), Some(id));
}

#[rstest]
fn unmount_clears_the_selection(harness: Harness) {
    let (app, id) = harness.mount_with_node("App", node("div"));
    harness.agent.select_from_handle(&app, false);
    assert_eq!(harness.agent.selection(), Selection::Selected(id));

    harness.agent.on_unmounted(&app);
    assert_eq!(harness.agent.selection(), Selection::Unselected);
}

#[rstest]
fn listeners_may_call_back_into_the_agent(harness: Harness) {
    let (_bridge, sent) = harness.bridge(BridgeConfig::default());
    let app = Fiber::handle("App");
    let _select_on_mount = {
        let agent = harness.agent.clone();
        let app = app.clone();
        harness.agent.subscribe(move |event| {
            if matches!(event, AgentEvent::Mount(_)) {
                agent.select_from_handle(&app, true);
            }
        })
    };

    let id = harness.agent.on_mounted(&harness.renderer, &app, RawElement::new("App"));

    let (name, payload) = wire_events(&sent).pop().expect("select");
    assert_eq!(name, names::SELECT);
    assert_eq!(payload, json!({ "id": id.as_str(), "quiet": true }));
}

#[rstest]
fn capabilities_handshake_answers_then_connects(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());

    bridge.receive(inbound(names::REQUEST_CAPABILITIES, Value::Null));

    assert_eq!(
        wire_events(&sent),
        vec![(
            names::CAPABILITIES.to_owned(),
            json!({ "scroll": true, "dom": true, "editTextContent": false }),
        )]
    );
    assert_eq!(harness.kinds(), ["connected"]);
}

#[rstest]
fn set_props_without_updater_is_a_no_op(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());
    let (_, id) = harness.mount_with_node("Plain", node("div"));
    sent.borrow_mut().clear();

    bridge.receive(inbound(
        names::SET_PROPS,
        json!({ "id": id.as_str(), "path": ["a"], "value": 1 }),
    ));

    assert!(sent.borrow().is_empty());
    assert_eq!(harness.kinds(), ["mount"]);
}

#[rstest]
fn set_state_reaches_the_producer_setter(harness: Harness) {
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());
    let calls = Rc::new(RefCell::new(Vec::new()));
    let updater = {
        let calls = Rc::clone(&calls);
        Updater {
            set_in_state: Some(Rc::new(move |path: &[PathKey], value: Value| {
                calls.borrow_mut().push((path.to_vec(), value));
            })),
            ..Updater::default()
        }
    };
    let counter = Fiber::handle("Counter");
    let id = harness.agent.on_mounted(
        &harness.renderer,
        &counter,
        RawElement::new("Counter").with_updater(updater),
    );
    assert!(harness.agent.snapshot(&id).is_some_and(|s| s.can_update()));

    bridge.receive(inbound(
        names::SET_STATE,
        json!({ "id": id.as_str(), "path": ["items", 0], "value": "x" }),
    ));
    bridge.receive(inbound(names::SET_PROPS, json!({ "id": id.as_str(), "path": [], "value": 1 })));

    assert_eq!(
        *calls.borrow(),
        vec![(vec![PathKey::Key("items".to_owned()), PathKey::Index(0)], json!("x"))]
    );
}

#[rstest]
fn make_global_exposes_instance_or_value(harness: Harness) {
    let instance: Opaque = Rc::new("counter instance");
    let counter = Fiber::handle("Counter");
    let id = harness.agent.on_mounted(
        &harness.renderer,
        &counter,
        RawElement::new("Counter")
            .with_props(json!({ "style": { "color": "red" } }))
            .with_public_instance(Rc::clone(&instance)),
    );
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());

    bridge.receive(inbound(names::MAKE_GLOBAL, json!({ "id": id.as_str(), "path": "instance" })));
    let exposed = harness.console.slot(DebugSlot::Temp);
    assert!(matches!(exposed, Some(SlotValue::Object(ref o)) if same_object(o, &instance)));

    bridge.receive(inbound(
        names::MAKE_GLOBAL,
        json!({ "id": id.as_str(), "path": ["props", "style", "color"] }),
    ));
    let exposed = harness.console.slot(DebugSlot::Temp);
    assert_eq!(exposed.as_ref().and_then(SlotValue::as_json), Some(&json!("red")));

    bridge.receive(inbound(names::MAKE_GLOBAL, json!({ "id": id.as_str(), "path": ["nope"] })));
    assert!(harness.console.slot(DebugSlot::Temp).is_none());
}

#[rstest]
fn highlight_resolves_the_node_and_metadata(harness: Harness) {
    let div = node("div");
    let button = Fiber::handle("Button");
    harness.attach(&button, Rc::clone(&div));
    let id = harness.agent.on_mounted(
        &harness.renderer,
        &button,
        RawElement::new("Button").with_props(json!({ "label": "Go" })),
    );
    harness.clear();

    harness.agent.highlight(&id);
    harness.agent.highlight(&ElementId::new("missing").expect("id"));

    let events = harness.events.borrow();
    assert_eq!(events.len(), 1);
    let AgentEvent::Highlight(highlight) = &events[0] else {
        panic!("expected highlight, got {:?}", events[0]);
    };
    assert_eq!(highlight.name, "Button");
    assert_eq!(highlight.props, Some(json!({ "label": "Go" })));
    assert!(super::same_native(&highlight.node, &div));
}

#[rstest]
fn highlight_many_skips_unresolved_and_empty_requests(harness: Harness) {
    let (_, a) = harness.mount_with_node("A", node("a"));
    let headless = Fiber::handle("Headless");
    let b = harness.agent.on_mounted(&harness.renderer, &headless, RawElement::new("Headless"));
    harness.clear();

    harness.agent.highlight_many(&[]);
    harness.agent.highlight_many(&[b.clone()]);
    assert!(harness.kinds().is_empty());

    harness.agent.highlight_many(&[a, b]);
    let events = harness.events.borrow();
    assert!(matches!(&events[..], [AgentEvent::HighlightMany(nodes)] if nodes.len() == 1));
}

#[rstest]
fn scroll_to_a_text_node_scrolls_its_parent(harness: Harness) {
    let parent = FakeNode::element("p");
    let text = FakeNode::text("#text", Some(parent.clone() as NativeRef));
    let (_, id) = harness.mount_with_node("Label", text.clone());
    harness.clear();

    harness.agent.scroll_to_node(&id);

    assert_eq!(parent.scrolls.get(), 1);
    assert_eq!(text.scrolls.get(), 0);
    assert_eq!(harness.kinds(), ["highlight"]);
}

#[rstest]
fn scroll_falls_back_to_basic_scrolling(harness: Harness) {
    let coarse = FakeNode::coarse("div");
    let (_, id) = harness.mount_with_node("Box", coarse.clone());

    harness.agent.scroll_to_node(&id);
    assert_eq!(coarse.scrolls.get(), 1);
}

#[rstest]
fn scroll_without_an_element_warns_and_skips_the_highlight(harness: Harness) {
    let orphan = FakeNode::text("#text", None);
    let (_, orphan_id) = harness.mount_with_node("Orphan", orphan);
    let headless = Fiber::handle("Headless");
    let headless_id =
        harness.agent.on_mounted(&harness.renderer, &headless, RawElement::new("Headless"));
    harness.clear();

    harness.agent.scroll_to_node(&orphan_id);
    harness.agent.scroll_to_node(&headless_id);

    assert!(harness.kinds().is_empty());
}

#[rstest]
fn scroll_bursts_coalesce_into_one_refresh(harness: Harness) {
    harness.agent.on_scroll();
    harness.agent.on_scroll();
    assert_eq!(harness.frames.pending(), 1);

    harness.frames.run_frame();
    assert_eq!(harness.kinds(), ["refreshMultiOverlay"]);

    harness.agent.on_scroll();
    harness.frames.run_frame();
    assert_eq!(harness.kinds(), ["refreshMultiOverlay", "refreshMultiOverlay"]);
}

#[rstest]
fn native_lookup_errors_fall_through_to_later_renderers(harness: Harness) {
    let broken = RendererInterface::default()
        .with_handle_from_native(|_| Err(LookupError::new("not a fiber root")));
    // The owner keeps its registration slot but loses both lookups.
    let working = super::fixtures::table_renderer(&harness.nodes);
    harness.agent.register_renderer(RendererId::new("broken").expect("id"), broken);
    harness.agent.register_renderer(RendererId::new("late").expect("id"), working);
    harness
        .agent
        .register_renderer(harness.renderer.clone(), RendererInterface::default());

    let div = node("div");
    let (_, id) = harness.mount_with_node("App", Rc::clone(&div));

    assert_eq!(harness.agent.id_for_native(&div), Some(id.clone()));
    assert!(harness.agent.native_for_id(&id).is_some_and(|n| super::same_native(&n, &div)));
}

#[rstest]
fn owner_native_lookup_error_falls_through_to_later_renderers(harness: Harness) {
    let div = FakeNode::element("div");
    let (_, id) = harness.mount_with_node("App", div.clone());
    harness.agent.register_renderer(
        harness.renderer.clone(),
        RendererInterface::default()
            .with_native_from_handle(|_| Err(LookupError::new("detached host"))),
    );
    harness.agent.register_renderer(
        RendererId::new("late").expect("id"),
        super::fixtures::table_renderer(&harness.nodes),
    );
    harness.clear();

    harness.agent.highlight(&id);
    harness.agent.scroll_to_node(&id);

    assert_eq!(div.scrolls.get(), 1);
    assert_eq!(harness.kinds(), ["highlight", "highlight"]);
    let events = harness.events.borrow();
    assert!(matches!(
        &events[..],
        [AgentEvent::Highlight(first), AgentEvent::Highlight(_)]
            if super::same_native(&first.node, &(div.clone() as NativeRef))
    ));
}

#[rstest]
fn select_from_native_carries_offset_from_leaf(harness: Harness) {
    let (_bridge, sent) = harness.bridge(BridgeConfig::default());
    let div = node("div");
    let (_, id) = harness.mount_with_node("App", Rc::clone(&div));
    sent.borrow_mut().clear();

    assert_eq!(harness.agent.select_from_native(&div, false, Some(2)), Some(id.clone()));
    assert_eq!(harness.agent.select_from_native(&node("stray"), false, None), None);

    assert_eq!(
        wire_events(&sent),
        vec![(
            names::SELECT.to_owned(),
            json!({ "id": id.as_str(), "quiet": false, "offsetFromLeaf": 2 }),
        )]
    );
}

#[rstest]
fn select_from_handle_never_allocates(harness: Harness) {
    let unknown = Fiber::handle("Unknown");
    assert_eq!(harness.agent.select_from_handle(&unknown, false), None);
    assert_eq!(harness.agent.lookup_handle(&unknown), None);
}

#[rstest]
fn check_selection_selects_only_on_outside_changes(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());
    let a = node("a");
    let b = node("b");
    let (_, a_id) = harness.mount_with_node("A", Rc::clone(&a));
    let (_, b_id) = harness.mount_with_node("B", Rc::clone(&b));
    sent.borrow_mut().clear();

    harness.agent.check_selection();
    assert!(sent.borrow().is_empty());

    harness.console.set_inspected_native(Some(Rc::clone(&a)));
    bridge.receive(inbound(names::CHECK_SELECTION, Value::Null));
    harness.agent.check_selection();

    bridge.receive(inbound(names::PUT_SELECTED_NODE, json!(b_id.as_str())));
    harness.console.set_inspected_native(Some(Rc::clone(&b)));
    harness.agent.check_selection();

    assert_eq!(
        wire_events(&sent),
        vec![(names::SELECT.to_owned(), json!({ "id": a_id.as_str(), "quiet": true }))]
    );
    assert_eq!(harness.agent.selection(), Selection::Selected(a_id));
}

#[rstest]
fn put_selected_slots_follow_the_request(harness: Harness) {
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());
    let instance: Opaque = Rc::new(41_u32);
    let element_type: Opaque = Rc::new("Counter");
    let div = node("div");
    let counter = Fiber::handle("Counter");
    harness.attach(&counter, Rc::clone(&div));
    let id = harness.agent.on_mounted(
        &harness.renderer,
        &counter,
        RawElement::new("Counter")
            .with_public_instance(Rc::clone(&instance))
            .with_element_type(Rc::clone(&element_type)),
    );

    bridge.receive(inbound(names::PUT_SELECTED_NODE, json!(id.as_str())));
    bridge.receive(inbound(names::PUT_SELECTED_INSTANCE, json!(id.as_str())));

    let console = &harness.console;
    let pushed = console.slot(DebugSlot::InspectedNode);
    assert!(pushed
        .as_ref()
        .and_then(SlotValue::as_native)
        .is_some_and(|n| super::same_native(n, &div)));
    let holds = |slot: DebugSlot, object: &Opaque| {
        console.slot(slot).is_some_and(|v| v.same(&SlotValue::Object(Rc::clone(object))))
    };
    assert!(holds(DebugSlot::InspectedInstance, &instance));
    assert!(holds(DebugSlot::InspectedType, &element_type));

    bridge.receive(inbound(names::PUT_SELECTED_NODE, Value::Null));
    bridge.receive(inbound(names::PUT_SELECTED_INSTANCE, Value::Null));
    assert!(console.slot(DebugSlot::InspectedNode).is_none());
    assert!(console.slot(DebugSlot::InspectedInstance).is_none());
    assert!(console.slot(DebugSlot::InspectedType).is_none());
}

#[rstest]
fn selected_instance_slot_respects_outside_writes(harness: Harness) {
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());
    let first: Opaque = Rc::new("first");
    let second: Opaque = Rc::new("second");
    let mount = |name: &str, instance: &Opaque| {
        let handle = Fiber::handle(name);
        harness.agent.on_mounted(
            &harness.renderer,
            &handle,
            RawElement::new(name).with_public_instance(Rc::clone(instance)),
        )
    };
    let first_id = mount("First", &first);
    let second_id = mount("Second", &second);
    let is = |expected: &Opaque| {
        harness
            .console
            .slot(DebugSlot::SelectedInstance)
            .is_some_and(|v| v.same(&SlotValue::Object(Rc::clone(expected))))
    };

    bridge.receive(inbound(names::SELECTED, json!(first_id.as_str())));
    assert!(is(&first));

    bridge.receive(inbound(names::SELECTED, json!(second_id.as_str())));
    assert!(is(&second));

    harness.console.set_slot(DebugSlot::SelectedInstance, Some(SlotValue::Json(json!("mine"))));
    bridge.receive(inbound(names::SELECTED, json!(first_id.as_str())));
    let slot = harness.console.slot(DebugSlot::SelectedInstance);
    assert_eq!(slot.as_ref().and_then(SlotValue::as_json), Some(&json!("mine")));
    assert_eq!(harness.agent.selection(), Selection::Selected(first_id));
}

#[rstest]
fn inspect_mode_click_selects_and_leaves_inspect_mode(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());
    let div = node("div");
    let (_, id) = harness.mount_with_node("App", Rc::clone(&div));
    sent.borrow_mut().clear();
    harness.clear();

    assert!(!harness.agent.on_native_click(&div));

    bridge.receive(inbound(names::SET_INSPECT_ENABLED, json!(true)));
    assert!(harness.agent.inspect_enabled());
    harness.agent.on_native_hover(&div);
    assert!(harness.agent.on_native_click(&div));
    assert!(!harness.agent.inspect_enabled());

    assert_eq!(
        harness.kinds(),
        ["stopInspecting", "highlight", "setSelection", "setInspectEnabled"]
    );
    assert_eq!(
        wire_events(&sent),
        vec![
            (names::SELECT.to_owned(), json!({ "id": id.as_str(), "quiet": false })),
            (names::SET_INSPECT_ENABLED.to_owned(), json!(false)),
        ]
    );
}

#[rstest]
fn resize_stops_inspecting(harness: Harness) {
    harness.agent.on_resize();
    assert_eq!(harness.kinds(), ["stopInspecting"]);
}

#[rstest]
fn change_text_content_edits_the_native_node(harness: Harness) {
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());
    let label = FakeNode::element("span");
    let (_, id) = harness.mount_with_node("Label", label.clone());

    bridge.receive(inbound(names::CHANGE_TEXT_CONTENT, json!({ "id": id.as_str(), "text": "hi" })));
    bridge.receive(inbound(names::CHANGE_TEXT_CONTENT, json!({ "id": "missing", "text": "x" })));

    assert_eq!(label.text.borrow().as_deref(), Some("hi"));
}

#[rstest]
fn passthrough_and_simple_commands_become_events(harness: Harness) {
    let (bridge, _sent) = harness.bridge(BridgeConfig::default());

    bridge.receive(Envelope::Many {
        events: vec![
            WireEvent::new(names::TRACE_UPDATES_STATE_CHANGE, json!({ "enabled": true })),
            WireEvent::new(names::HIDE_HIGHLIGHT, Value::Null),
            WireEvent::new(names::START_INSPECTING, Value::Null),
            WireEvent::new(names::SHUTDOWN, Value::Null),
        ],
    });

    let events = harness.events.borrow();
    assert!(matches!(
        &events[0],
        AgentEvent::Passthrough { name, payload }
            if name == names::TRACE_UPDATES_STATE_CHANGE && *payload == json!({ "enabled": true })
    ));
    let kinds: Vec<_> = events.iter().map(AgentEvent::kind).collect();
    assert_eq!(kinds, ["passthrough", "hideHighlight", "startInspecting", "shutdown"]);
}

#[rstest]
fn malformed_commands_are_dropped(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::default());

    bridge.receive(inbound(names::HIGHLIGHT, json!(42)));
    bridge.receive(inbound(names::SET_STATE, json!({ "id": "r1" })));
    assert!(bridge.receive_json("{\"type\":\"event\"").is_err());

    assert!(harness.kinds().is_empty());
    assert!(sent.borrow().is_empty());
}

#[rstest]
fn batched_bridge_flushes_lifecycle_in_order(harness: Harness) {
    let (bridge, sent) = harness.bridge(BridgeConfig::batched());
    let app = Fiber::handle("App");
    harness.agent.add_root(&harness.renderer, &app);
    harness.agent.on_mounted(&harness.renderer, &app, RawElement::new("App"));
    harness.agent.on_unmounted(&app);
    assert!(sent.borrow().is_empty());

    bridge.flush();

    let order: Vec<_> = wire_events(&sent).into_iter().map(|(name, _)| name).collect();
    assert_eq!(order, ["root", "mount", "unmount", "forget"]);
    assert_eq!(sent.borrow().len(), 1);
}

#[rstest]
fn detached_link_stops_forwarding(harness: Harness) {
    let sent = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&sent);
    let bridge = crate::bridge::Bridge::new(
        move |envelope: Envelope| sink.borrow_mut().push(envelope),
        BridgeConfig::default(),
    );
    let link = harness.agent.add_bridge(&bridge);
    link.detach();

    harness.agent.add_root(&harness.renderer, &Fiber::handle("App"));
    bridge.receive(inbound(names::SHUTDOWN, Value::Null));

    assert!(sent.borrow().is_empty());
    assert_eq!(harness.kinds(), ["root"]);
    assert_eq!(bridge.listener_count(names::SHUTDOWN), 0);
}

#[rstest]
fn host_capabilities_are_overridden_by_config() {
    let console = Rc::new(super::MemoryConsole::new(Capabilities::default()));
    let frames = Rc::new(super::ManualFrames::new());
    let mut config = crate::config::AgentConfig::default();
    config.capabilities.edit_text_content = Some(true);

    let agent = super::Agent::new(config, console, frames);
    assert_eq!(
        agent.capabilities(),
        Capabilities { scroll: false, dom: false, edit_text_content: true }
    );
}

#[rstest]
fn fibers_stay_downcastable(harness: Harness) {
    let (app, _) = harness.mount_with_node("App", node("div"));
    let fiber = app.downcast::<Fiber>().expect("fiber");
    assert_eq!(fiber.name, "App");
    let labels: Vec<_> = harness
        .nodes
        .borrow()
        .iter()
        .filter_map(|(_, n)| n.as_any().downcast_ref::<FakeNode>().map(|n| n.label.clone()))
        .collect();
    assert_eq!(labels, ["div"]);
}
