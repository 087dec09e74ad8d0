//! Process-wide, lock-free session counters. There is no external metrics
//! sink wired up; counters are surfaced through periodic `log` lines,
//! structured the way a metrics exporter would consume them if one were
//! added later.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ProxyStats {
    accepted: AtomicU64,
    active: AtomicI64,
    url_blocked: AtomicU64,
    content_blocked: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time read of [`ProxyStats`]' counters, for logging or display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyStatsSnapshot {
    pub accepted: u64,
    pub active: i64,
    pub url_blocked: u64,
    pub content_blocked: u64,
    pub errors: u64,
}

impl ProxyStats {
    pub fn new() -> Self {
        ProxyStats::default()
    }

    pub fn session_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_ended(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn url_blocked(&self) {
        self.url_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn content_blocked(&self) {
        self.content_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProxyStatsSnapshot {
        ProxyStatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            url_blocked: self.url_blocked.load(Ordering::Relaxed),
            content_blocked: self.content_blocked.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
