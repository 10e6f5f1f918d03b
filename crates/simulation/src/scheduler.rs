//! Tick scheduler: the simulation clock and its lifecycle signals.
//!
//! The scheduler owns the tick counter, pause flag, and playtime accounting,
//! and periodically emits [`SchedulerSignal`]s to subscribers. Subscription
//! is explicit: `subscribe()` hands back a receiver, and dropping that
//! receiver unsubscribes. There is no global registration.

use tokio::sync::mpsc;

/// Autosave cadence for a fresh settlement, in ticks.
pub const DEFAULT_AUTOSAVE_EVERY_TICKS: u64 = 500;

/// Lifecycle signals emitted by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerSignal {
    /// The autosave cadence elapsed. May fire more often than the save
    /// system is willing to write; throttling is the subscriber's job.
    AutosaveDue,
    /// The simulation is shutting down; last chance to persist.
    ShuttingDown,
}

/// Handle returned by [`TickScheduler::subscribe`]. Drop it to unsubscribe.
pub type SignalReceiver = mpsc::UnboundedReceiver<SchedulerSignal>;

#[derive(Debug)]
pub struct TickScheduler {
    tick: u64,
    paused: bool,
    playtime_seconds: u64,
    autosave_every_ticks: u64,
    subscribers: Vec<mpsc::UnboundedSender<SchedulerSignal>>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self {
            tick: 0,
            paused: false,
            playtime_seconds: 0,
            autosave_every_ticks: DEFAULT_AUTOSAVE_EVERY_TICKS,
            subscribers: Vec::new(),
        }
    }
}

impl TickScheduler {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn playtime_seconds(&self) -> u64 {
        self.playtime_seconds
    }

    pub fn add_playtime(&mut self, seconds: u64) {
        self.playtime_seconds += seconds;
    }

    pub fn set_autosave_cadence(&mut self, every_ticks: u64) {
        self.autosave_every_ticks = every_ticks;
    }

    /// Overwrite the clock from a loaded record.
    pub fn restore_clock(&mut self, tick: u64, paused: bool, playtime_seconds: u64) {
        self.tick = tick;
        self.paused = paused;
        self.playtime_seconds = playtime_seconds;
    }

    /// Subscribe to lifecycle signals. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> SignalReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Advance the clock. Paused simulations do not tick. Emits
    /// [`SchedulerSignal::AutosaveDue`] each time the cadence elapses.
    pub fn advance(&mut self, ticks: u64) {
        if self.paused {
            return;
        }
        for _ in 0..ticks {
            self.tick += 1;
            if self.autosave_every_ticks > 0 && self.tick % self.autosave_every_ticks == 0 {
                self.broadcast(SchedulerSignal::AutosaveDue);
            }
        }
    }

    /// Announce shutdown to all subscribers.
    pub fn shutdown(&mut self) {
        self.broadcast(SchedulerSignal::ShuttingDown);
    }

    fn broadcast(&mut self, signal: SchedulerSignal) {
        // Dropped receivers are pruned as a side effect of sending.
        self.subscribers.retain(|tx| tx.send(signal).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_clock_does_not_tick() {
        let mut sched = TickScheduler::default();
        sched.set_paused(true);
        sched.advance(10);
        assert_eq!(sched.tick(), 0);
    }

    #[test]
    fn test_autosave_signal_on_cadence() {
        let mut sched = TickScheduler::default();
        sched.set_autosave_cadence(5);
        let mut rx = sched.subscribe();

        sched.advance(12);

        let mut signals = 0;
        while let Ok(signal) = rx.try_recv() {
            assert_eq!(signal, SchedulerSignal::AutosaveDue);
            signals += 1;
        }
        assert_eq!(signals, 2, "cadence 5 over 12 ticks fires twice");
    }

    #[test]
    fn test_dropped_receiver_unsubscribes() {
        let mut sched = TickScheduler::default();
        sched.set_autosave_cadence(1);
        let rx = sched.subscribe();
        assert_eq!(sched.subscriber_count(), 1);

        drop(rx);
        sched.advance(1);
        assert_eq!(sched.subscriber_count(), 0);
    }

    #[test]
    fn test_shutdown_signal() {
        let mut sched = TickScheduler::default();
        let mut rx = sched.subscribe();
        sched.shutdown();
        assert_eq!(rx.try_recv(), Ok(SchedulerSignal::ShuttingDown));
    }

    #[test]
    fn test_restore_clock() {
        let mut sched = TickScheduler::default();
        sched.restore_clock(4200, true, 360);
        assert_eq!(sched.tick(), 4200);
        assert!(sched.is_paused());
        assert_eq!(sched.playtime_seconds(), 360);
    }
}
