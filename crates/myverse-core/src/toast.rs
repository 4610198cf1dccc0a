use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Kind of toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A single toast notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: DateTime<Utc>,
}

/// Auto-dismiss delay in seconds.
pub const AUTO_DISMISS_SECS: i64 = 4;

/// Maximum number of toasts kept at once; older ones are evicted.
const TOAST_CAPACITY: usize = 16;

/// Transient notifications, newest last.
#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: u64,
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Utc::now())
    }

    fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, at: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        if self.toasts.len() >= TOAST_CAPACITY {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            id: self.next_id,
            message: message.into(),
            kind,
            created_at: at,
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Drop toasts older than the auto-dismiss delay.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::seconds(AUTO_DISMISS_SECS);
        self.toasts.retain(|t| t.created_at > cutoff);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Remove and return every pending toast.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Thread-safe handle to the toast queue.
pub type SharedToasts = Arc<Mutex<ToastQueue>>;

pub fn shared_toasts() -> SharedToasts {
    Arc::new(Mutex::new(ToastQueue::new()))
}
