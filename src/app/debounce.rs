//! Trailing-edge debouncing.
//!
//! [`Debouncer`] is the clock-free state machine; [`debounce_channel`] drives
//! it from a tokio channel and the tokio clock.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    /// Record an event; pushes the deadline to `now + delay`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` exactly once per burst, when `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Forward the last value of each burst on `rx` to `on_fire`, once the channel
/// has been quiet for `delay`. A burst still pending when the channel closes is
/// flushed.
pub async fn debounce_channel<T>(mut rx: mpsc::Receiver<T>, delay: Duration, mut on_fire: impl FnMut(T)) {
    let mut debouncer = Debouncer::new(delay);
    let mut latest: Option<T> = None;

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            received = rx.recv() => match received {
                Some(value) => {
                    latest = Some(value);
                    debouncer.trigger(Instant::now());
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if debouncer.fire_if_due(Instant::now()) {
                    if let Some(value) = latest.take() {
                        on_fire(value);
                    }
                }
            }
        }
    }

    if debouncer.is_pending() {
        if let Some(value) = latest.take() {
            on_fire(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(250));

        d.trigger(start);
        d.trigger(start + Duration::from_millis(100));
        assert!(!d.fire_if_due(start + Duration::from_millis(300)));
        assert!(d.fire_if_due(start + Duration::from_millis(350)));
        assert!(!d.fire_if_due(start + Duration::from_millis(400)));
        assert!(!d.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn channel_adapter_emits_last_value_of_each_burst() {
        let (tx, rx) = mpsc::channel(16);
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let task = tokio::spawn(debounce_channel(rx, Duration::from_millis(250), move |v: u32| {
            sink.lock().unwrap().push(v);
        }));

        for width in [800, 900, 1000] {
            tx.send(width).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*fired.lock().unwrap(), vec![1000]);

        tx.send(1200).await.unwrap();
        drop(tx);
        task.await.unwrap();
        assert_eq!(*fired.lock().unwrap(), vec![1000, 1200]);
    }
}
