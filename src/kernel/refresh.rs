//! 刷新通知器
//!
//! - `refresh` 无条件向所有订阅者广播一次"树已变化"
//! - 可选的周期定时器：每次 tick 只在自动刷新开启时广播
//! - 定时器随 `set_auto_refresh` 替换、随 `close`/`Drop` 取消

use super::tree::TreeNode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// "Something changed, re-query from the root." Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshEvent;

pub type RefreshReceiver = Receiver<RefreshEvent>;

struct Shared {
    enabled: AtomicBool,
    subscribers: Mutex<Vec<Sender<RefreshEvent>>>,
}

impl Shared {
    fn fire(&self) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(RefreshEvent).is_ok());
        }
    }
}

/// Fire-only handle, cheap to clone into completion callbacks.
#[derive(Clone)]
pub struct RefreshSignal {
    shared: Arc<Shared>,
}

impl RefreshSignal {
    pub fn fire(&self) {
        self.shared.fire();
    }
}

struct Timer {
    interval: Duration,
    task: JoinHandle<()>,
}

pub struct RefreshNotifier {
    shared: Arc<Shared>,
    runtime: tokio::runtime::Handle,
    timer: Mutex<Option<Timer>>,
}

impl RefreshNotifier {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                enabled: AtomicBool::new(true),
                subscribers: Mutex::new(Vec::new()),
            }),
            runtime,
            timer: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> RefreshReceiver {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.shared.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    pub fn signal(&self) -> RefreshSignal {
        RefreshSignal {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Always a full-tree refresh; the node hint is accepted for host compatibility.
    pub fn refresh(&self, _hint: Option<&TreeNode>) {
        self.shared.fire();
    }

    /// Replaces any running timer. A zero interval only cancels.
    pub fn set_auto_refresh(&self, interval: Duration) {
        let Ok(mut timer) = self.timer.lock() else {
            return;
        };
        if let Some(old) = timer.take() {
            old.task.abort();
        }
        if interval.is_zero() {
            tracing::debug!("auto refresh timer cancelled");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if shared.enabled.load(Ordering::Acquire) {
                    shared.fire();
                }
            }
        });
        tracing::debug!(interval_ms = interval.as_millis() as u64, "auto refresh timer started");
        *timer = Some(Timer { interval, task });
    }

    pub fn set_auto_refresh_millis(&self, interval_ms: u64) {
        self.set_auto_refresh(Duration::from_millis(interval_ms));
    }

    pub fn stop_auto_refresh(&self) {
        self.set_auto_refresh(Duration::ZERO);
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        self.timer
            .lock()
            .ok()
            .and_then(|timer| timer.as_ref().map(|t| t.interval))
    }

    pub fn enable_auto_refresh(&self) {
        self.shared.enabled.store(true, Ordering::Release);
    }

    pub fn disable_auto_refresh(&self) {
        self.shared.enabled.store(false, Ordering::Release);
    }

    pub fn is_auto_refresh_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Cancels the timer and drops every subscriber.
    pub fn close(&self) {
        self.stop_auto_refresh();
        if let Ok(mut subscribers) = self.shared.subscribers.lock() {
            subscribers.clear();
        }
    }
}

impl Drop for RefreshNotifier {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(timer) = timer.take() {
                timer.task.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/refresh.rs"]
mod tests;
