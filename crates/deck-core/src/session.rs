//! Session state machine for the operator panel.
//!
//! Transitions are pure: `apply` consumes the current state and one input
//! and returns the next state plus the effects the caller must execute
//! (outbound commands, transcript appends). The projection layer never
//! mutates the session directly.

use crate::classify;
use crate::protocol::{Command, RemoteEvent};
use crate::transcript::EntryKind;

pub const STOPPED_BY_USER: &str = "Остановлено пользователем";
pub const PAUSED_NOTICE: &str = "⏸️ Пауза (нажмите Play для продолжения)";
pub const RESUMED_NOTICE: &str = "▶️ Продолжаю выполнение";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Busy,
}

/// Everything the state machine reacts to: operator actions, link
/// lifecycle notifications and parsed remote events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Submit(String),
    StopRequested,
    PauseToggled,
    LinkConnecting,
    LinkUp,
    LinkDown,
    Remote(RemoteEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(Command),
    Append { kind: EntryKind, text: String },
}

impl Effect {
    fn append(kind: EntryKind, text: impl Into<String>) -> Self {
        Self::Append {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    connection: ConnectionState,
    task: TaskState,
    paused: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            task: TaskState::Idle,
            paused: false,
        }
    }
}

impl Session {
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn task(&self) -> TaskState {
        self.task
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// The task field accepts input only while connected and idle.
    pub fn input_enabled(&self) -> bool {
        self.connection == ConnectionState::Connected && self.task == TaskState::Idle
    }

    /// Stop and pause affordances are meaningful only while a task runs.
    pub fn can_interrupt(&self) -> bool {
        self.task == TaskState::Busy
    }

    /// Activity indicator: running and not paused.
    pub fn typing(&self) -> bool {
        self.task == TaskState::Busy && !self.paused
    }

    pub fn apply(self, input: Input) -> (Self, Vec<Effect>) {
        match input {
            Input::Submit(text) => self.submit(text),
            Input::StopRequested => self.stop(),
            Input::PauseToggled => self.toggle_pause(),
            Input::LinkConnecting => (
                Self {
                    connection: ConnectionState::Connecting,
                    ..self
                },
                Vec::new(),
            ),
            // Pause is never assumed to survive a reconnect; the next
            // status report is the authority on the running state.
            Input::LinkUp => (
                Self {
                    connection: ConnectionState::Connected,
                    paused: false,
                    ..self
                },
                vec![Effect::Send(Command::GetStatus)],
            ),
            Input::LinkDown => (
                Self {
                    connection: ConnectionState::Disconnected,
                    ..self
                },
                Vec::new(),
            ),
            Input::Remote(event) => self.remote(event),
        }
    }

    fn submit(self, text: String) -> (Self, Vec<Effect>) {
        let task = text.trim();
        if task.is_empty() || !self.input_enabled() {
            return (self, Vec::new());
        }
        let task = task.to_string();
        let effects = vec![
            Effect::append(EntryKind::User, task.clone()),
            Effect::Send(Command::Start { task }),
        ];
        (
            Self {
                task: TaskState::Busy,
                paused: false,
                ..self
            },
            effects,
        )
    }

    fn stop(self) -> (Self, Vec<Effect>) {
        if self.task != TaskState::Busy {
            return (self, Vec::new());
        }
        (
            Self {
                task: TaskState::Idle,
                paused: false,
                ..self
            },
            vec![
                Effect::Send(Command::Stop),
                Effect::append(EntryKind::Error, STOPPED_BY_USER),
            ],
        )
    }

    fn toggle_pause(self) -> (Self, Vec<Effect>) {
        if self.task != TaskState::Busy {
            return (self, Vec::new());
        }
        if self.paused {
            (
                Self {
                    paused: false,
                    ..self
                },
                vec![
                    Effect::Send(Command::Resume),
                    Effect::append(EntryKind::System, RESUMED_NOTICE),
                ],
            )
        } else {
            (
                Self { paused: true, ..self },
                vec![
                    Effect::Send(Command::Pause),
                    Effect::append(EntryKind::System, PAUSED_NOTICE),
                ],
            )
        }
    }

    fn remote(self, event: RemoteEvent) -> (Self, Vec<Effect>) {
        match event {
            RemoteEvent::StatusReport { is_running } => (
                Self {
                    task: if is_running {
                        TaskState::Busy
                    } else {
                        TaskState::Idle
                    },
                    paused: false,
                    ..self
                },
                Vec::new(),
            ),
            RemoteEvent::ToolInvocation(raw) => (
                self,
                vec![Effect::append(
                    EntryKind::Tool,
                    classify::format_tool_log(&raw),
                )],
            ),
            RemoteEvent::TaskSucceeded(raw) => (
                Self {
                    task: TaskState::Idle,
                    paused: false,
                    ..self
                },
                vec![Effect::append(
                    EntryKind::Agent,
                    classify::summarize_success(&raw),
                )],
            ),
            RemoteEvent::TaskFailed { message, retrying } => {
                let next = if retrying {
                    self
                } else {
                    Self {
                        task: TaskState::Idle,
                        paused: false,
                        ..self
                    }
                };
                (next, vec![Effect::append(EntryKind::Error, message)])
            }
            RemoteEvent::SystemNotice(message) => {
                (self, vec![Effect::append(EntryKind::System, message)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_idle() -> Session {
        let (session, _) = Session::default().apply(Input::LinkUp);
        session
    }

    fn busy() -> Session {
        let (session, _) = connected_idle().apply(Input::Remote(RemoteEvent::StatusReport {
            is_running: true,
        }));
        session
    }

    #[test]
    fn link_up_requests_status_before_anything_else() {
        let (session, effects) = Session::default().apply(Input::LinkUp);
        assert_eq!(session.connection(), ConnectionState::Connected);
        assert_eq!(effects, vec![Effect::Send(Command::GetStatus)]);
    }

    #[test]
    fn latest_status_report_wins_regardless_of_pause() {
        let mut session = busy();
        (session, _) = session.apply(Input::PauseToggled);
        assert!(session.paused());

        for (is_running, expected) in [
            (false, TaskState::Idle),
            (true, TaskState::Busy),
            (true, TaskState::Busy),
            (false, TaskState::Idle),
        ] {
            (session, _) = session.apply(Input::Remote(RemoteEvent::StatusReport { is_running }));
            assert_eq!(session.task(), expected);
            assert!(!session.paused());
        }
    }

    #[test]
    fn pause_while_idle_is_a_noop() {
        let session = connected_idle();
        let (next, effects) = session.apply(Input::PauseToggled);
        assert_eq!(next, session);
        assert!(effects.is_empty());
    }

    #[test]
    fn pause_toggle_round_trip_while_busy() {
        let (paused, effects) = busy().apply(Input::PauseToggled);
        assert!(paused.paused());
        assert!(!paused.typing());
        assert_eq!(
            effects,
            vec![
                Effect::Send(Command::Pause),
                Effect::append(EntryKind::System, PAUSED_NOTICE),
            ]
        );

        let (resumed, effects) = paused.apply(Input::PauseToggled);
        assert!(!resumed.paused());
        assert!(resumed.typing());
        assert_eq!(
            effects,
            vec![
                Effect::Send(Command::Resume),
                Effect::append(EntryKind::System, RESUMED_NOTICE),
            ]
        );
    }

    #[test]
    fn blank_or_offline_submissions_are_rejected() {
        let (next, effects) = connected_idle().apply(Input::Submit("   ".to_string()));
        assert_eq!(next.task(), TaskState::Idle);
        assert!(effects.is_empty());

        let (next, effects) = Session::default().apply(Input::Submit("open example.com".to_string()));
        assert_eq!(next.task(), TaskState::Idle);
        assert!(effects.is_empty());

        let (next, effects) = busy().apply(Input::Submit("another task".to_string()));
        assert_eq!(next.task(), TaskState::Busy);
        assert!(effects.is_empty());
    }

    #[test]
    fn stop_while_busy_idles_and_reports() {
        let (next, effects) = busy().apply(Input::StopRequested);
        assert_eq!(next.task(), TaskState::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::Send(Command::Stop),
                Effect::append(EntryKind::Error, STOPPED_BY_USER),
            ]
        );

        let (same, effects) = connected_idle().apply(Input::StopRequested);
        assert_eq!(same.task(), TaskState::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn retrying_failure_keeps_the_task_running() {
        let (next, effects) = busy().apply(Input::Remote(RemoteEvent::TaskFailed {
            message: "Ошибка сети API. Retrying...".to_string(),
            retrying: true,
        }));
        assert_eq!(next.task(), TaskState::Busy);
        assert_eq!(
            effects,
            vec![Effect::append(
                EntryKind::Error,
                "Ошибка сети API. Retrying..."
            )]
        );

        let (next, _) = next.apply(Input::Remote(RemoteEvent::TaskFailed {
            message: "Критическая ошибка".to_string(),
            retrying: false,
        }));
        assert_eq!(next.task(), TaskState::Idle);
    }

    #[test]
    fn submit_tool_success_scenario() {
        let (session, effects) =
            connected_idle().apply(Input::Submit("open example.com".to_string()));
        assert_eq!(session.task(), TaskState::Busy);
        assert_eq!(
            effects,
            vec![
                Effect::append(EntryKind::User, "open example.com"),
                Effect::Send(Command::Start {
                    task: "open example.com".to_string()
                }),
            ]
        );

        let (session, effects) = session.apply(Input::Remote(RemoteEvent::ToolInvocation(
            "🔧 navigate {'url': 'example.com'}".to_string(),
        )));
        assert_eq!(session.task(), TaskState::Busy);
        assert!(session.typing());
        assert_eq!(
            effects,
            vec![Effect::append(EntryKind::Tool, "🌐 Перехожу: example.com")]
        );

        let (session, effects) = session.apply(Input::Remote(RemoteEvent::TaskSucceeded(
            "Task completed {done}".to_string(),
        )));
        assert_eq!(session.task(), TaskState::Idle);
        assert_eq!(
            effects,
            vec![Effect::append(EntryKind::Agent, "✅ Готово! done")]
        );
    }

    #[test]
    fn link_drop_disables_input_but_keeps_task_view() {
        let (session, effects) = busy().apply(Input::LinkDown);
        assert_eq!(session.connection(), ConnectionState::Disconnected);
        assert_eq!(session.task(), TaskState::Busy);
        assert!(effects.is_empty());
        assert!(!session.input_enabled());

        // Reconnecting clears any stale pause and re-queries the server.
        let (session, _) = session.apply(Input::LinkConnecting);
        assert_eq!(session.connection(), ConnectionState::Connecting);
        let (session, effects) = session.apply(Input::LinkUp);
        assert!(!session.paused());
        assert_eq!(effects, vec![Effect::Send(Command::GetStatus)]);
    }
}
