use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    created: Instant,
}

/// Transient notifications. Each one expires after a fixed duration unless
/// dismissed first.
#[derive(Debug)]
pub struct Toasts {
    items: Vec<Toast>,
    duration: Duration,
    next_id: u64,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            duration,
            next_id: 1,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push_at(ToastKind::Success, message.into(), Instant::now())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push_at(ToastKind::Error, message.into(), Instant::now())
    }

    pub fn push_at(&mut self, kind: ToastKind, message: String, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            kind,
            message,
            created: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    /// Drops expired toasts and returns the rest, oldest first.
    pub fn active_at(&mut self, now: Instant) -> &[Toast] {
        let duration = self.duration;
        self.items
            .retain(|t| now.saturating_duration_since(t.created) < duration);
        &self.items
    }

    pub fn active(&mut self) -> &[Toast] {
        self.active_at(Instant::now())
    }

    /// Removes and returns every live toast.
    pub fn drain(&mut self) -> Vec<Toast> {
        let now = Instant::now();
        self.active_at(now);
        std::mem::take(&mut self.items)
    }
}
