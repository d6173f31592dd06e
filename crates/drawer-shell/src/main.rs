//! Console host for the drawer core.
//!
//! Reads commands from stdin, drives the drawer against in-memory session
//! services and prints the events the core emits.

mod commands;
mod console;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use drawer_core::{
    ActionConfirmation, ActionCoordinator, ActionId, DefaultCatalog, DeviceClass, Dispatch, DrawerConfig,
    DrawerIntent, DrawerPresenter, DrawerSlot, EventEmitter, MessageCatalog, SessionContext,
    SessionServices, StreamParams,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{Command, HELP};
use crate::console::{ConsoleRecording, ConsoleStreaming, EventPrinter, StdoutClipboard};

const CONFERENCE_URL: &str = "https://meet.example.com/abc-defg-hij";

/// Initialize tracing once; `RUST_LOG` overrides the default filter.
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("drawer_core=debug,drawer_shell=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
    });
}

struct Shell {
    presenter: DrawerPresenter,
    catalog: DefaultCatalog,
    recording: Arc<ConsoleRecording>,
    streaming: Arc<ConsoleStreaming>,
    ctx: SessionContext,
    /// Open confirmations, one per action like the coordinator keeps them.
    pending: HashMap<ActionId, ActionConfirmation>,
}

impl Shell {
    fn new(config: DrawerConfig) -> Self {
        let proxy = match config.proxy_endpoint() {
            Ok(proxy) => Some(proxy),
            Err(e) => {
                if config.flags.live_streaming_enabled {
                    tracing::warn!("{e}");
                }
                None
            }
        };
        let recording = Arc::new(ConsoleRecording::default());
        let streaming = Arc::new(ConsoleStreaming::default());

        let emitter = EventEmitter::new();
        emitter.add_listener(Arc::new(EventPrinter));
        let coordinator = Arc::new(ActionCoordinator::new(
            emitter,
            SessionServices {
                recording: recording.clone(),
                streaming: streaming.clone(),
                clipboard: Arc::new(StdoutClipboard),
                catalog: Arc::new(DefaultCatalog),
                proxy,
            },
        ));

        let mut ctx = SessionContext::new(1, DeviceClass::MobileSmall);
        ctx.conference_url = CONFERENCE_URL.to_string();

        Self {
            presenter: DrawerPresenter::new(config.flags, coordinator),
            catalog: DefaultCatalog,
            recording,
            streaming,
            ctx,
            pending: HashMap::new(),
        }
    }

    /// Pull the service-owned state back into the session context.
    fn refresh(&mut self) {
        self.ctx.recording_active = self.recording.is_active();
        self.ctx.live_streaming_active = self.streaming.is_active();
        let coordinator = self.presenter.coordinator();
        self.pending
            .retain(|action, req| coordinator.pending_confirmation(*action).as_ref() == Some(&*req));
    }

    /// The request a bare `accept`/`cancel` refers to.
    fn target(&self, action: Option<ActionId>) -> Result<ActionConfirmation, String> {
        if let Some(action) = action {
            return self
                .pending
                .get(&action)
                .cloned()
                .ok_or_else(|| format!("no pending confirmation for {action:?}"));
        }
        let mut open = self.pending.values();
        match (open.next(), open.next()) {
            (Some(req), None) => Ok(req.clone()),
            (None, _) => Err("nothing pending".into()),
            (Some(_), Some(_)) => Err("several confirmations open, say 'record' or 'live'".into()),
        }
    }

    fn render(&self) {
        let view = self.presenter.render(&self.ctx);
        let mut row = Vec::new();
        for slot in &view.slots {
            match slot {
                DrawerSlot::Spacer => row.push("|".to_string()),
                DrawerSlot::Action(button) => {
                    let mut text = self.catalog.format(button.label);
                    if let Some(badge) = button.badge {
                        text.push_str(&format!(" ({badge})"));
                    }
                    if button.active {
                        text.push_str(" *");
                    }
                    row.push(format!("[{text}]"));
                }
            }
        }
        let layout = match (view.centered, view.extended) {
            (true, _) => "centered",
            (false, true) => "extended",
            (false, false) => "default",
        };
        println!(
            "{:?}, {} participant(s), {layout}: {}",
            self.ctx.device_class,
            self.ctx.participant_count,
            row.join(" ")
        );
    }

    /// Returns false when the shell should exit.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Render => self.render(),
            Command::Click(action) => self.click(action),
            Command::Accept(action) => self.accept(action).await,
            Command::Cancel(action) => match self.target(action) {
                Ok(req) => {
                    self.presenter.coordinator().cancel(&req);
                    self.pending.remove(&req.action());
                }
                Err(e) => println!("{e}"),
            },
            Command::Submit { url, key } => self.submit(StreamParams::new(url, key)).await,
            Command::Close => {
                if let Err(e) = self.presenter.dispatch(DrawerIntent::Close, &self.ctx) {
                    println!("error: {e}");
                }
            }
            Command::Join => self.ctx.participant_count += 1,
            Command::Leave => self.ctx.participant_count = self.ctx.participant_count.saturating_sub(1),
            Command::Device(device) => self.ctx.device_class = device,
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        self.refresh();
        true
    }

    fn click(&mut self, action: ActionId) {
        match self.presenter.dispatch(DrawerIntent::Click(action), &self.ctx) {
            Ok(Dispatch::Done) => {}
            Ok(Dispatch::Confirm(req)) => {
                if action == ActionId::LiveStream && !self.ctx.live_streaming_active {
                    println!("[form] enter destination with: submit <rtmp-url> <key>");
                }
                self.pending.insert(action, req);
            }
            Err(e) => println!("error: {e}"),
        }
    }

    async fn accept(&mut self, action: Option<ActionId>) {
        let req = match self.target(action) {
            Ok(req) => req,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        match self.presenter.coordinator().accept(&req).await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "action finished");
                self.pending.remove(&req.action());
            }
            Err(e) => println!("error: {e}"),
        }
    }

    async fn submit(&mut self, params: StreamParams) {
        let Some(req) = self.pending.get(&ActionId::LiveStream).cloned() else {
            println!("no go-live form open");
            return;
        };
        match self.presenter.coordinator().submit_live_stream(&req, params).await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "live stream form submitted");
                self.pending.remove(&ActionId::LiveStream);
            }
            Err(e) => println!("error: {e}"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => DrawerConfig::load(&PathBuf::from(path)),
        None => DrawerConfig::from_env(),
    };
    tracing::info!(flags = ?config.flags, "drawer shell starting");

    let mut shell = Shell::new(config);
    shell.render();
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match commands::parse(&line) {
            Ok(command) => {
                if !shell.handle(command).await {
                    break;
                }
            }
            Err(e) => println!("{e}"),
        }
    }
}
