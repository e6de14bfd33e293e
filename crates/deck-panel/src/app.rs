use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::warn;

use deck_core::{Command, Effect, Input, Session};
use deck_storage::TranscriptStore;

use crate::transport::LinkEvent;

/// Panel state: the session value, the transcript store and the input
/// draft. All mutation funnels through `dispatch`, which runs the state
/// machine and executes its effects.
pub struct App {
    pub session: Session,
    pub store: TranscriptStore,
    pub input: String,
    pub should_exit: bool,
    commands: mpsc::UnboundedSender<Command>,
}

impl App {
    pub fn new(mut store: TranscriptStore, commands: mpsc::UnboundedSender<Command>) -> Self {
        if let Err(err) = store.load_all() {
            warn!("transcript restore failed: {err}");
        }
        Self {
            session: Session::default(),
            store,
            input: String::new(),
            should_exit: false,
            commands,
        }
    }

    pub fn handle_link(&mut self, event: LinkEvent) {
        let input = match event {
            LinkEvent::Connecting => Input::LinkConnecting,
            LinkEvent::Up => Input::LinkUp,
            LinkEvent::Down => Input::LinkDown,
            LinkEvent::Remote(event) => Input::Remote(event),
        };
        self.dispatch(input);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_exit = true,
                KeyCode::Char('p') => {
                    self.dispatch(Input::PauseToggled);
                }
                KeyCode::Char('x') => {
                    self.dispatch(Input::StopRequested);
                }
                KeyCode::Char('l') => self.clear_transcript(),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                if self.session.input_enabled() {
                    self.input.pop();
                }
            }
            KeyCode::Char(ch) => {
                if self.session.input_enabled() {
                    self.input.push(ch);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if self.dispatch(Input::Submit(self.input.clone())) {
            self.input.clear();
        }
    }

    fn clear_transcript(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!("transcript clear failed: {err}");
        }
    }

    /// Run one transition and its effects. Returns whether the machine
    /// accepted the input (rejected inputs produce no effects).
    fn dispatch(&mut self, input: Input) -> bool {
        let (next, effects) = self.session.apply(input);
        self.session = next;
        let accepted = !effects.is_empty();
        for effect in effects {
            match effect {
                Effect::Send(command) => {
                    let _ = self.commands.send(command);
                }
                Effect::Append { kind, text } => {
                    if let Err(err) = self.store.append(kind, text) {
                        warn!("transcript write failed: {err}");
                    }
                }
            }
        }
        accepted
    }
}
