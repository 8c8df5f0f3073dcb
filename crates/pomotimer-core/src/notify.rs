//! Ongoing-timer notification adapter.
//!
//! Turns engine snapshots into a platform-neutral [`OngoingNotification`]
//! and hands it to whatever [`NotificationPresenter`] the host provides.
//! The presenter's two buttons map 1:1 onto [`NotificationAction`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::alarm::AlarmNotice;
use crate::events::Event;
use crate::timer::{Snapshot, TimerEngine};

pub const APP_NAME: &str = "pomotimer";

/// Buttons on the ongoing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    PauseResume,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OngoingNotification {
    /// `"<session label> · MM:SS"`
    pub title: String,
    pub text: String,
    /// Label for [`NotificationAction::PauseResume`].
    pub primary_action: String,
    /// Label for [`NotificationAction::Stop`].
    pub secondary_action: String,
    pub accent: String,
}

impl OngoingNotification {
    /// `None` when there is no session to show.
    pub fn from_snapshot(snapshot: &Snapshot, show_task: bool) -> Option<Self> {
        let session = snapshot.session.as_ref()?;
        let text = if show_task && !session.task.trim().is_empty() {
            session.task.clone()
        } else {
            APP_NAME.to_string()
        };
        Some(Self {
            title: format!("{} · {}", session.mode.session_label(), session.remaining_clock()),
            text,
            primary_action: if session.running { "Pause" } else { "Start" }.to_string(),
            secondary_action: "Stop".to_string(),
            accent: session.mode.accent().to_string(),
        })
    }
}

/// Host-side renderer for the ongoing notification.
pub trait NotificationPresenter: Send + Sync {
    fn present(&self, notification: &OngoingNotification);
    fn dismiss(&self);
    /// Called once per `Completed` event. The engine publishes that event
    /// first and fires the alarm collaborator right after, outside its lock.
    fn alarm(&self, _notice: &AlarmNotice) {}
}

/// Attach `presenter` to `engine` until the engine is dropped.
///
/// Resyncs on attach so the presenter shows the current state right away,
/// and skips re-presenting an identical notification.
pub fn spawn_presenter(
    engine: &TimerEngine,
    presenter: Arc<dyn NotificationPresenter>,
    show_task: bool,
) -> JoinHandle<()> {
    let mut sub = engine.subscribe();
    tokio::spawn(async move {
        let mut shown: Option<OngoingNotification> = None;
        render(presenter.as_ref(), &mut shown, &sub.resync(), show_task);
        while let Some(event) = sub.recv().await {
            match event {
                Event::StateSnapshot(snapshot) => {
                    render(presenter.as_ref(), &mut shown, &snapshot, show_task);
                }
                Event::Completed { mode, .. } => presenter.alarm(&AlarmNotice::for_mode(mode)),
            }
        }
        tracing::debug!("notification presenter detached");
    })
}

fn render(
    presenter: &dyn NotificationPresenter,
    shown: &mut Option<OngoingNotification>,
    snapshot: &Snapshot,
    show_task: bool,
) {
    let next = OngoingNotification::from_snapshot(snapshot, show_task);
    if next == *shown {
        return;
    }
    match &next {
        Some(notification) => presenter.present(notification),
        None => presenter.dismiss(),
    }
    *shown = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Mode, SessionMachine};

    #[test]
    fn title_and_actions_follow_state() {
        let mut machine = SessionMachine::new(0);
        machine.start(Mode::Focus, 1500, "draft chapter").unwrap();
        machine.tick();

        let n = OngoingNotification::from_snapshot(&machine.snapshot(), true).unwrap();
        assert_eq!(n.title, "Focus Session · 24:59");
        assert_eq!(n.text, "draft chapter");
        assert_eq!(n.primary_action, "Pause");
        assert_eq!(n.secondary_action, "Stop");

        machine.pause();
        let n = OngoingNotification::from_snapshot(&machine.snapshot(), false).unwrap();
        assert_eq!(n.text, APP_NAME);
        assert_eq!(n.primary_action, "Start");
    }

    #[test]
    fn blank_task_falls_back_to_app_name() {
        let mut machine = SessionMachine::new(0);
        machine.start(Mode::LongBreak, 60, "   ").unwrap();
        let n = OngoingNotification::from_snapshot(&machine.snapshot(), true).unwrap();
        assert_eq!(n.text, APP_NAME);
        assert_eq!(n.accent, "#5EC4CF");
    }

    #[test]
    fn idle_has_no_notification() {
        assert!(OngoingNotification::from_snapshot(&SessionMachine::new(0).snapshot(), true).is_none());
    }
}
