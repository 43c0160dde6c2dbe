use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

/// Short-lived notifications shown in the corner of the screen.
#[derive(Debug)]
pub struct Notifier {
    toasts: VecDeque<Toast>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, description: Option<String>) {
        self.push_at(kind, title, description, Instant::now());
    }

    pub fn push_at(
        &mut self,
        kind: ToastKind,
        title: impl Into<String>,
        description: Option<String>,
        now: Instant,
    ) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            title: title.into(),
            description,
            kind,
            expires_at: now + self.lifetime,
        });
    }

    pub fn success(&mut self, title: impl Into<String>) {
        self.push(ToastKind::Success, title, None);
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Error, title, Some(description.into()));
    }

    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
