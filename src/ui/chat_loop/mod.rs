//! Full-screen chat session: terminal setup, the event loop, and the glue that
//! turns key actions into controller calls.
//!
//! Controller operations run on spawned tasks and report back through
//! [`UiEvent::Finished`], so a slow backend never blocks input or redraws.

mod keys;
mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use self::keys::{handle_key, handle_mouse, handle_paste, KeyAction};
use self::lifecycle::{restore_terminal, setup_terminal};
use crate::core::controller::ChatController;
use crate::core::health::HealthMonitor;
use crate::ui::renderer::ui;
use crate::ui::state::UiState;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    Finished(TaskOutcome),
}

/// Completion of a spawned controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    ChatCreated { ok: bool },
    MessageSent { ok: bool },
    Refreshed,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn spawn_action(
    controller: &Arc<ChatController>,
    event_tx: &mpsc::UnboundedSender<UiEvent>,
    action: KeyAction,
) {
    let controller = controller.clone();
    let event_tx = event_tx.clone();
    let outcome = async move {
        match action {
            KeyAction::Reload => {
                controller.load_chats().await;
                Some(TaskOutcome::Refreshed)
            }
            KeyAction::CreateChat(title) => {
                let ok = controller.create_chat(&title).await.is_ok();
                Some(TaskOutcome::ChatCreated { ok })
            }
            KeyAction::SelectChat(chat) => {
                controller.select_chat(chat).await;
                Some(TaskOutcome::Refreshed)
            }
            KeyAction::Send(content) => {
                let ok = controller.send_message(&content).await.is_ok();
                Some(TaskOutcome::MessageSent { ok })
            }
            KeyAction::None | KeyAction::Redraw | KeyAction::Quit => None,
        }
    };
    tokio::spawn(async move {
        if let Some(outcome) = outcome.await {
            let _ = event_tx.send(UiEvent::Finished(outcome));
        }
    });
}

/// Fold a finished operation back into presentation state.
pub fn apply_outcome(ui: &mut UiState, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::ChatCreated { ok } => {
            if *ok {
                ui.close_dialog();
            } else if let Some(dialog) = ui.dialog.as_mut() {
                dialog.submitting = false;
            }
        }
        TaskOutcome::MessageSent { ok } => {
            ui.sending = false;
            if *ok {
                ui.clear_composer();
            }
        }
        TaskOutcome::Refreshed => {}
    }
}

struct Session {
    controller: Arc<ChatController>,
    event_tx: mpsc::UnboundedSender<UiEvent>,
    online_rx: watch::Receiver<bool>,
    seen_online: bool,
    ui: UiState,
}

impl Session {
    fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let action = handle_key(&mut self.ui, key);
                match action {
                    KeyAction::None => false,
                    KeyAction::Redraw | KeyAction::Quit => true,
                    action => {
                        debug!(?action, "dispatching");
                        spawn_action(&self.controller, &self.event_tx, action);
                        true
                    }
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => handle_paste(&mut self.ui, &text),
            UiEvent::Crossterm(Event::Mouse(mouse)) => handle_mouse(&mut self.ui, mouse),
            UiEvent::Crossterm(Event::Resize(..)) => true,
            UiEvent::Crossterm(_) => false,
            UiEvent::Finished(outcome) => {
                apply_outcome(&mut self.ui, &outcome);
                true
            }
        }
    }

    /// Pull controller state, pending errors and liveness into the UI.
    async fn sync(&mut self, now: Instant) -> bool {
        let snapshot = self.controller.snapshot().await;
        let mut changed = snapshot != self.ui.chat;
        if changed {
            self.ui.apply_snapshot(snapshot);
        }

        if let Some(error) = self.controller.take_error().await {
            self.ui.show_error(error, now);
            changed = true;
        }
        if self.ui.expire_toast(now) {
            changed = true;
        }

        let online = *self.online_rx.borrow();
        if online != self.ui.online {
            self.ui.online = online;
            changed = true;
            if online {
                if self.seen_online && !self.ui.chat.loading {
                    info!("server back online, reloading chats");
                    spawn_action(&self.controller, &self.event_tx, KeyAction::Reload);
                }
                self.seen_online = true;
            }
        }
        changed
    }
}

pub async fn run_chat(
    controller: Arc<ChatController>,
    health_interval: Duration,
    ui_state: UiState,
) -> Result<(), Box<dyn Error>> {
    let health = HealthMonitor::spawn(controller.backend(), health_interval);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();

    let mut session = Session {
        controller: controller.clone(),
        event_tx: event_tx.clone(),
        online_rx: health.subscribe(),
        seen_online: false,
        ui: ui_state,
    };
    spawn_action(&controller, &event_tx, KeyAction::Reload);

    let mut terminal = setup_terminal()?;
    let event_reader_handle = spawn_event_reader(event_tx);
    let mut ticker = tokio::time::interval(TICK);
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = loop {
        if session.ui.exit_requested {
            break Ok(());
        }

        if session.sync(Instant::now()).await {
            request_redraw = true;
        }

        if request_redraw {
            if let Err(err) = terminal.draw(|f| ui(f, &mut session.ui)) {
                break Err(err.into());
            }
            request_redraw = false;
        }

        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else { break Ok(()) };
                if session.handle_event(event) {
                    request_redraw = true;
                }
                while let Ok(event) = event_rx.try_recv() {
                    if session.handle_event(event) {
                        request_redraw = true;
                    }
                }
            }
            _ = ticker.tick() => {}
        }
    };

    event_reader_handle.abort();
    health.stop();
    restore_terminal(&mut terminal)?;
    result
}
