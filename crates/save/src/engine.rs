// ---------------------------------------------------------------------------
// Engine bridge: scheduler signals -> save manager actions
// ---------------------------------------------------------------------------
//
// The bridge subscribes to the tick scheduler and turns its signals into
// saves. Autosave signals are throttled by wall-clock interval, since the
// scheduler may fire faster than storage should be written. Autosave and
// shutdown failures are logged and swallowed: a failed background save must
// never take the simulation down with it.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use simulation::{SchedulerSignal, SignalReceiver, SimulationModules};

use crate::error::SaveError;
use crate::manager::SaveManager;

/// How autosave and shutdown signals are handled.
#[derive(Debug, Clone)]
pub struct AutosavePolicy {
    /// Minimum wall-clock gap between autosaves. Signals arriving sooner
    /// are dropped.
    pub min_interval: Duration,
    /// Slot written on [`SchedulerSignal::ShuttingDown`].
    pub shutdown_slot: String,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(60),
            shutdown_slot: "shutdown".to_string(),
        }
    }
}

pub struct EngineBridge {
    manager: SaveManager,
    signals: SignalReceiver,
    policy: AutosavePolicy,
    last_autosave: Option<Instant>,
}

impl EngineBridge {
    pub fn new(manager: SaveManager, signals: SignalReceiver, policy: AutosavePolicy) -> Self {
        Self {
            manager,
            signals,
            policy,
            last_autosave: None,
        }
    }

    pub fn manager(&self) -> &SaveManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SaveManager {
        &mut self.manager
    }

    pub fn into_manager(self) -> SaveManager {
        self.manager
    }

    /// Drain pending scheduler signals and act on them. Call once per frame
    /// or engine update.
    pub async fn drive(&mut self, modules: &SimulationModules) {
        while let Ok(signal) = self.signals.try_recv() {
            match signal {
                SchedulerSignal::AutosaveDue => self.handle_autosave(modules).await,
                SchedulerSignal::ShuttingDown => self.handle_shutdown(modules).await,
            }
        }
    }

    async fn handle_autosave(&mut self, modules: &SimulationModules) {
        if let Some(last) = self.last_autosave {
            if last.elapsed() < self.policy.min_interval {
                return;
            }
        }
        match self.manager.autosave(modules).await {
            Ok(receipt) => {
                info!(
                    bytes = receipt.size_bytes,
                    backend = %receipt.backend,
                    "autosave complete"
                );
                self.last_autosave = Some(Instant::now());
            }
            Err(e) => warn!(error = %e, "autosave failed, simulation continues"),
        }
    }

    async fn handle_shutdown(&mut self, modules: &SimulationModules) {
        let slot = self.policy.shutdown_slot.clone();
        match self.manager.save(&slot, "shutdown save", modules).await {
            Ok(_) => info!(slot = %slot, "shutdown save complete"),
            Err(e) => warn!(slot = %slot, error = %e, "shutdown save failed"),
        }
    }

    /// Force an autosave regardless of throttling. Used by debug tooling.
    pub async fn autosave_now(&mut self, modules: &SimulationModules) -> Result<(), SaveError> {
        self.manager.autosave(modules).await?;
        self.last_autosave = Some(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryStore, StorageBackend};
    use crate::manager::AutosaveRotation;
    use crate::router::StorageRouter;

    fn bridge_with(
        modules: &mut SimulationModules,
        policy: AutosavePolicy,
        slots: u32,
    ) -> (EngineBridge, MemoryStore) {
        let store = MemoryStore::new(4 * 1024 * 1024);
        let router = StorageRouter::new(Box::new(store.clone()), None);
        let manager = SaveManager::with_rotation(router, AutosaveRotation::new(slots));
        let signals = modules.scheduler.subscribe();
        (EngineBridge::new(manager, signals, policy), store)
    }

    #[tokio::test]
    async fn test_autosave_due_writes_rotating_slot() {
        let mut modules = SimulationModules::sample_settlement();
        let (mut bridge, store) = bridge_with(
            &mut modules,
            AutosavePolicy {
                min_interval: Duration::ZERO,
                ..AutosavePolicy::default()
            },
            3,
        );

        modules.scheduler.set_autosave_cadence(10);
        modules.scheduler.advance(10);
        bridge.drive(&modules).await;

        let keys = store.keys().await.expect("keys");
        assert_eq!(keys, vec!["autosave-slot-1"]);
    }

    #[tokio::test]
    async fn test_throttle_drops_rapid_signals() {
        let mut modules = SimulationModules::sample_settlement();
        let (mut bridge, store) = bridge_with(
            &mut modules,
            AutosavePolicy {
                min_interval: Duration::from_secs(3600),
                ..AutosavePolicy::default()
            },
            3,
        );

        modules.scheduler.set_autosave_cadence(10);
        // Two cadence periods back to back.
        modules.scheduler.advance(20);
        bridge.drive(&modules).await;

        let keys = store.keys().await.expect("keys");
        assert_eq!(keys.len(), 1, "second signal inside the interval is dropped");
    }

    #[tokio::test]
    async fn test_rotation_wraps_across_drives() {
        let mut modules = SimulationModules::sample_settlement();
        let (mut bridge, store) = bridge_with(
            &mut modules,
            AutosavePolicy {
                min_interval: Duration::ZERO,
                ..AutosavePolicy::default()
            },
            2,
        );

        modules.scheduler.set_autosave_cadence(10);
        for _ in 0..3 {
            modules.scheduler.advance(10);
            bridge.drive(&modules).await;
        }

        let mut keys = store.keys().await.expect("keys");
        keys.sort();
        // Third autosave wrapped onto slot 1.
        assert_eq!(keys, vec!["autosave-slot-1", "autosave-slot-2"]);
    }

    #[tokio::test]
    async fn test_shutdown_signal_saves_shutdown_slot() {
        let mut modules = SimulationModules::sample_settlement();
        let (mut bridge, store) = bridge_with(&mut modules, AutosavePolicy::default(), 3);

        modules.scheduler.shutdown();
        bridge.drive(&modules).await;

        let keys = store.keys().await.expect("keys");
        assert_eq!(keys, vec!["shutdown"]);
        assert_eq!(bridge.manager().current_slot(), Some("shutdown"));
    }

    #[tokio::test]
    async fn test_drive_with_no_signals_is_a_noop() {
        let mut modules = SimulationModules::sample_settlement();
        let (mut bridge, store) = bridge_with(&mut modules, AutosavePolicy::default(), 3);

        bridge.drive(&modules).await;
        assert!(store.keys().await.expect("keys").is_empty());
    }
}
