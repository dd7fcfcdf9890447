// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid Mirror demo entrypoint.
//!
//! Drives a scripted renderer through an agent and prints every outbound wire envelope as one
//! JSON line on stdout. Inbound envelopes are read from stdin, one JSON document per line.
//! Logs go to stderr; `RUST_LOG` selects the filter (default `info`).

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use nereid_mirror::agent::{
    Agent, AgentEvent, ManualFrames, MemoryConsole, NativeNode, NativeRef, RendererInterface,
};
use nereid_mirror::bridge::{Bridge, Envelope};
use nereid_mirror::config::{AgentConfig, BridgeConfig};
use nereid_mirror::model::{Capabilities, Handle, PathKey, RawElement, RendererId, Updater};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FRAMES: u32 = 180;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--batch] [--frames <n>] [--id-prefix <prefix>]\n\nRuns a scripted demo renderer and prints wire envelopes as JSON lines on stdout.\nInbound envelopes are read from stdin, one per line.\n\n--batch delivers one `many` envelope per frame instead of one envelope per event.\n--frames stops after <n> frames (default {DEFAULT_FRAMES}; 0 = until `shutdown`).\n--id-prefix overrides the identity prefix (also NEREID_MIRROR_ID_PREFIX)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    batch: bool,
    frames: Option<u32>,
    id_prefix: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--batch" => {
                if options.batch {
                    return Err(());
                }
                options.batch = true;
            }
            "--frames" => {
                if options.frames.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let frames: u32 = raw.parse().map_err(|_| ())?;
                options.frames = Some(frames);
            }
            "--id-prefix" => {
                if options.id_prefix.is_some() {
                    return Err(());
                }
                let prefix = args.next().ok_or(())?;
                if prefix.is_empty() {
                    return Err(());
                }
                options.id_prefix = Some(prefix);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Native node of the demo renderer.
struct DemoNode {
    tag: &'static str,
    text: RefCell<String>,
}

impl DemoNode {
    fn new(tag: &'static str) -> Rc<Self> {
        Rc::new(Self { tag, text: RefCell::new(String::new()) })
    }
}

impl NativeNode for DemoNode {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_element(&self) -> bool {
        self.tag != "#text"
    }

    fn scroll_into_view_if_needed(&self) -> bool {
        info!(tag = self.tag, "scrolled into view");
        true
    }

    fn set_text_content(&self, text: &str) -> bool {
        info!(tag = self.tag, text, "text content changed");
        *self.text.borrow_mut() = text.to_owned();
        true
    }
}

/// Component instance of the demo renderer.
struct Component {
    name: &'static str,
}

type NodeTable = Rc<RefCell<Vec<(Handle, NativeRef)>>>;

/// A three-node tree: `App` with a `Counter` and a `Label`.
struct DemoRenderer {
    agent: Agent,
    id: RendererId,
    nodes: NodeTable,
    app: Handle,
    counter: Handle,
    label: Handle,
    count: Rc<Cell<i64>>,
    dirty: Rc<Cell<bool>>,
    label_mounted: bool,
}

impl DemoRenderer {
    fn install(agent: &Agent) -> Result<Self, Box<dyn Error>> {
        let id = RendererId::new("demo")?;
        let nodes: NodeTable = Rc::new(RefCell::new(Vec::new()));

        let forward = Rc::clone(&nodes);
        let backward = Rc::clone(&nodes);
        let interface = RendererInterface::default()
            .with_native_from_handle(move |handle| {
                let nodes = forward.borrow();
                Ok(nodes.iter().find(|(h, _)| h.ptr_eq(handle)).map(|(_, node)| Rc::clone(node)))
            })
            .with_handle_from_native(move |node| {
                let nodes = backward.borrow();
                Ok(nodes
                    .iter()
                    .find(|(_, n)| nereid_mirror::agent::same_native(n, node))
                    .map(|(handle, _)| handle.clone()))
            });
        agent.register_renderer(id.clone(), interface);

        let component = |name: &'static str| Handle::object(Rc::new(Component { name }));
        let renderer = Self {
            agent: agent.clone(),
            id,
            nodes,
            app: component("App"),
            counter: component("Counter"),
            label: component("Label"),
            count: Rc::new(Cell::new(0)),
            dirty: Rc::new(Cell::new(false)),
            label_mounted: false,
        };
        for (handle, tag) in
            [(&renderer.app, "main"), (&renderer.counter, "button"), (&renderer.label, "#text")]
        {
            let node: NativeRef = DemoNode::new(tag);
            renderer.nodes.borrow_mut().push((handle.clone(), node));
        }
        Ok(renderer)
    }

    fn name_of(handle: &Handle) -> &'static str {
        handle.downcast::<Component>().map_or("Unknown", |component| component.name)
    }

    fn counter_element(&self) -> RawElement {
        let count = Rc::clone(&self.count);
        let dirty = Rc::clone(&self.dirty);
        let updater = Updater {
            set_in_state: Some(Rc::new(move |path: &[PathKey], value: Value| {
                if path == [PathKey::from("count")] {
                    if let Some(n) = value.as_i64() {
                        count.set(n);
                        dirty.set(true);
                    }
                }
            })),
            ..Updater::default()
        };
        RawElement::new(Self::name_of(&self.counter))
            .with_props(json!({ "step": 1 }))
            .with_state(json!({ "count": self.count.get() }))
            .with_updater(updater)
    }

    fn app_element(&self) -> RawElement {
        let mut children = vec![self.counter.clone()];
        if self.label_mounted {
            children.push(self.label.clone());
        }
        RawElement::new(Self::name_of(&self.app)).with_children(children)
    }

    fn mount(&mut self) {
        self.agent.add_root(&self.id, &self.app);
        self.agent.on_mounted(&self.id, &self.counter, self.counter_element());
        self.agent.on_mounted(
            &self.id,
            &self.label,
            RawElement::new(Self::name_of(&self.label)).with_text_children("clicks"),
        );
        self.label_mounted = true;
        self.agent.on_mounted(&self.id, &self.app, self.app_element());
        self.agent.root_committed(&self.id, &self.app);
    }

    /// Scripted activity for frame `frame`.
    fn tick(&mut self, frame: u32) {
        if frame % 60 == 0 {
            self.count.set(self.count.get() + 1);
            self.dirty.set(true);
        }
        if self.dirty.replace(false) {
            self.agent.on_updated(&self.counter, self.counter_element());
        }
        if frame % 45 == 0 {
            self.agent.on_scroll();
        }
        if frame == 150 && self.label_mounted {
            self.agent.on_unmounted(&self.label);
            self.label_mounted = false;
            self.agent.on_updated(&self.app, self.app_element());
        }
    }
}

fn emit(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Result<(), Box<dyn Error>> {
    while let Ok(envelope) = rx.try_recv() {
        println!("{}", serde_json::to_string(&envelope)?);
    }
    Ok(())
}

async fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let mut agent_config = AgentConfig::from_env();
    if let Some(prefix) = options.id_prefix {
        agent_config.id_prefix = prefix.into();
    }
    let mut bridge_config = BridgeConfig::from_env();
    bridge_config.batch |= options.batch;
    let frame_limit = options.frames.unwrap_or(DEFAULT_FRAMES);

    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
    let bridge = Bridge::new(
        move |envelope: Envelope| {
            if tx.send(envelope).is_err() {
                warn!("wire receiver closed; dropping envelope");
            }
        },
        bridge_config,
    );

    let capabilities = Capabilities { scroll: true, dom: true, edit_text_content: true };
    let console = Rc::new(MemoryConsole::new(capabilities));
    let frames = Rc::new(ManualFrames::new());
    let agent = Agent::new(agent_config, console, frames.clone());
    let _link = agent.add_bridge(&bridge);

    let shutdown = Rc::new(Cell::new(false));
    let _overlay = {
        let shutdown = Rc::clone(&shutdown);
        agent.subscribe(move |event| match event {
            AgentEvent::Shutdown => shutdown.set(true),
            AgentEvent::Highlight(highlight) => {
                info!(id = %highlight.id, name = %highlight.name, "highlight")
            }
            AgentEvent::HighlightMany(nodes) => info!(count = nodes.len(), "highlight many"),
            AgentEvent::HideHighlight => info!("hide highlight"),
            AgentEvent::RefreshMultiOverlay => info!("refresh overlay"),
            _ => {}
        })
    };

    let mut renderer = DemoRenderer::install(&agent)?;
    renderer.mount();
    bridge.flush();
    emit(&mut rx)?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticks = tokio::time::interval(FRAME_INTERVAL);
    let mut frame = 0u32;

    loop {
        tokio::select! {
            line = stdin.next_line(), if stdin_open => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(err) = bridge.receive_json(&line) {
                        warn!(error = %err, "ignoring inbound line");
                    }
                }
                None => stdin_open = false,
            },
            _ = ticks.tick() => {
                frame += 1;
                renderer.tick(frame);
                frames.run_frame();
                agent.check_selection();
                bridge.flush();
            }
        }
        emit(&mut rx)?;

        if shutdown.get() || (frame_limit > 0 && frame >= frame_limit) {
            break;
        }
    }

    bridge.flush();
    emit(&mut rx)?;
    info!(frames = frame, elements = agent.element_count(), "demo finished");
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "nereid-mirror".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(run(options))
    })();

    if let Err(err) = result {
        eprintln!("nereid-mirror: {err}");
        std::process::exit(1);
    }
}
