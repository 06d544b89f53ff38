use crate::error::ClientError;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// What the core asks of the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toast(Toast),
    Navigate(String),
}

/// Outbound channel for toasts and navigation requests. Sending never
/// fails: with no listener the events are dropped.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Error, message);
    }

    pub fn navigate(&self, path: impl Into<String>) {
        self.emit(UiEvent::Navigate(path.into()));
    }

    /// Error toast for a failed action. Session expiry is skipped because
    /// the HTTP layer has already announced it.
    pub fn surface(&self, err: &ClientError) {
        if !matches!(err, ClientError::SessionExpired) {
            self.error(err.toast_message());
        }
    }

    fn toast(&self, level: ToastLevel, message: impl Into<String>) {
        self.emit(UiEvent::Toast(Toast {
            level,
            message: message.into(),
        }));
    }

    fn emit(&self, event: UiEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("ui event dropped: no listener");
            }
        }
    }
}
