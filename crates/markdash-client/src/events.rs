//! User-facing event channel.
//!
//! Orchestration components emit toasts and navigation requests over a
//! tokio mpsc channel; whatever hosts the pipeline (CLI, UI shell)
//! renders them. Senders never block and delivery failures are ignored:
//! a host that dropped its receiver simply stops seeing notifications.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toast(Toast),
    /// Processing finished; the initiating view should show the dashboard.
    NavigateToOverview,
}

impl UiEvent {
    pub fn info(message: impl Into<String>) -> Self {
        UiEvent::Toast(Toast {
            level: ToastLevel::Info,
            message: message.into(),
        })
    }

    pub fn success(message: impl Into<String>) -> Self {
        UiEvent::Toast(Toast {
            level: ToastLevel::Success,
            message: message.into(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        UiEvent::Toast(Toast {
            level: ToastLevel::Error,
            message: message.into(),
        })
    }
}

pub type EventSender = mpsc::UnboundedSender<UiEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Create the event channel shared by the orchestration components.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
