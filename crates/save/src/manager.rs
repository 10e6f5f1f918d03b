// ---------------------------------------------------------------------------
// Save manager: slot lifecycle over the storage router
// ---------------------------------------------------------------------------
//
// The manager owns the full save/load pipeline. Saving: snapshot, stamp slot
// metadata, validate, checksum, write through the router. Loading: read,
// parse, verify, repair on mismatch, migrate, validate (with one repair
// retry), typed decode, apply. Slot metadata is cached so listings do not
// re-read payloads that have not changed.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use simulation::SimulationModules;

use crate::backend::BackendKind;
use crate::checksum::{self, Verification};
use crate::error::SaveError;
use crate::migrate;
use crate::record::{SaveMetadata, SaveRecord, KEY_CHECKSUM};
use crate::repair;
use crate::router::{RouterUsage, StorageRouter, WriteReceipt};
use crate::serializer::{self, RestoreReport};
use crate::validator;

/// Default number of rotating autosave slots.
pub const DEFAULT_AUTOSAVE_SLOTS: u32 = 3;

/// One row of a save-slot listing.
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub slot_name: String,
    pub description: String,
    pub saved_at: String,
    pub playtime_seconds: u64,
    pub progression_tier: String,
    pub simulation_tick: u64,
    pub size_bytes: u64,
    pub backend: BackendKind,
}

/// Cached per-slot information, refreshed on every save, load, or
/// read-through.
#[derive(Debug, Clone)]
struct CachedSlot {
    metadata: SaveMetadata,
    size_bytes: u64,
    backend: BackendKind,
}

impl SlotEntry {
    fn from_cached(slot_name: &str, cached: &CachedSlot) -> Self {
        Self {
            slot_name: slot_name.to_string(),
            description: cached.metadata.description.clone(),
            saved_at: cached.metadata.saved_at.clone(),
            playtime_seconds: cached.metadata.playtime_seconds,
            progression_tier: cached.metadata.progression_tier.clone(),
            simulation_tick: cached.metadata.simulation_tick,
            size_bytes: cached.size_bytes,
            backend: cached.backend,
        }
    }
}

/// Everything a caller learns from a completed load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub metadata: SaveMetadata,
    pub restore: RestoreReport,
    /// True when the record went through repair, whether or not any field
    /// needed a substitution.
    pub repaired: bool,
    /// Paths that repair replaced with documented defaults, e.g.
    /// `metadata.simulationTick`. Empty on a clean load.
    pub repaired_paths: Vec<String>,
}

/// Storage usage, for a settings-screen readout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageStats {
    pub slot_count: usize,
    pub fast_bytes: u64,
    pub bulk_bytes: u64,
}

/// Rolling autosave cursor over `autosave-slot-1 .. autosave-slot-N`.
#[derive(Debug, Clone)]
pub struct AutosaveRotation {
    slot_count: u32,
    cursor: u32,
}

impl Default for AutosaveRotation {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_SLOTS)
    }
}

impl AutosaveRotation {
    pub fn new(slot_count: u32) -> Self {
        Self {
            slot_count: slot_count.max(1),
            cursor: 1,
        }
    }

    pub fn current_slot_name(&self) -> String {
        format!("autosave-slot-{}", self.cursor)
    }

    /// Move to the next slot, wrapping back to 1 after the last.
    pub fn advance(&mut self) {
        self.cursor = if self.cursor >= self.slot_count {
            1
        } else {
            self.cursor + 1
        };
    }
}

pub struct SaveManager {
    router: StorageRouter,
    cache: BTreeMap<String, CachedSlot>,
    current: Option<String>,
    rotation: AutosaveRotation,
}

impl SaveManager {
    pub fn new(router: StorageRouter) -> Self {
        Self {
            router,
            cache: BTreeMap::new(),
            current: None,
            rotation: AutosaveRotation::default(),
        }
    }

    pub fn with_rotation(router: StorageRouter, rotation: AutosaveRotation) -> Self {
        Self {
            router,
            cache: BTreeMap::new(),
            current: None,
            rotation,
        }
    }

    /// Slot most recently saved or loaded this session, if any.
    pub fn current_slot(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Snapshot the live modules into a named slot.
    pub async fn save(
        &mut self,
        slot_name: &str,
        description: &str,
        modules: &SimulationModules,
    ) -> Result<WriteReceipt, SaveError> {
        if slot_name.trim().is_empty() {
            return Err(SaveError::Validation(vec![
                "slot name must not be empty".to_string(),
            ]));
        }

        let mut record = serializer::serialize(modules)?;
        record.metadata.slot_name = slot_name.to_string();
        record.metadata.description = description.to_string();

        let mut value = record.to_value()?;
        let report = validator::validate_record(&value);
        if !report.is_valid() {
            return Err(SaveError::Validation(report.errors));
        }
        let digest = checksum::generate(&value)?;
        value[KEY_CHECKSUM] = Value::String(digest);

        let payload =
            serde_json::to_vec(&value).map_err(|e| SaveError::Encode(e.to_string()))?;
        let receipt = self.router.write(slot_name, &payload).await?;

        info!(
            slot = slot_name,
            bytes = receipt.size_bytes,
            backend = %receipt.backend,
            tick = record.metadata.simulation_tick,
            "slot saved"
        );
        self.cache.insert(
            slot_name.to_string(),
            CachedSlot {
                metadata: record.metadata,
                size_bytes: receipt.size_bytes as u64,
                backend: receipt.backend,
            },
        );
        self.current = Some(slot_name.to_string());
        Ok(receipt)
    }

    /// Load a slot into the live modules.
    ///
    /// A checksum mismatch or structural violations route the record through
    /// repair rather than failing the load; only records repair cannot make
    /// valid are refused.
    pub async fn load(
        &mut self,
        slot_name: &str,
        modules: &mut SimulationModules,
    ) -> Result<LoadOutcome, SaveError> {
        let Some((payload, backend)) = self.router.read(slot_name).await? else {
            return Err(SaveError::NotFound(slot_name.to_string()));
        };

        let size_bytes = payload.len() as u64;
        let text = String::from_utf8(payload)
            .map_err(|_| SaveError::Corruption(format!("slot '{slot_name}' is not UTF-8")))?;
        let mut value: Value = serde_json::from_str(&text).map_err(|e| {
            SaveError::Corruption(format!("slot '{slot_name}' is not valid JSON: {e}"))
        })?;

        let mut repaired = false;
        let mut repaired_paths = Vec::new();
        match checksum::verify(&value)? {
            Verification::Match | Verification::Absent => {}
            Verification::Mismatch { stored, computed } => {
                warn!(
                    slot = slot_name,
                    stored, computed, "checksum mismatch, attempting repair"
                );
                let outcome = repair::repair(value)?;
                value = outcome.record;
                repaired_paths.extend(outcome.substituted);
                repaired = true;
            }
        }

        let migration = migrate::migrate_record(&mut value)?;
        if migration.steps_applied > 0 {
            info!(
                slot = slot_name,
                from = migration.original_version,
                to = migration.final_version,
                steps = migration.steps_applied,
                "record migrated"
            );
        }

        let report = validator::validate_record(&value);
        if !report.is_valid() {
            if repaired {
                // Already repaired once and still invalid; give up.
                return Err(SaveError::Validation(report.errors));
            }
            warn!(
                slot = slot_name,
                violations = report.errors.len(),
                "invalid record, attempting repair"
            );
            let outcome = repair::repair(value)?;
            value = outcome.record;
            repaired_paths.extend(outcome.substituted);
            repaired = true;
            let retry = validator::validate_record(&value);
            if !retry.is_valid() {
                return Err(SaveError::Validation(retry.errors));
            }
        }

        let record = SaveRecord::from_value(value)?;
        let restore = serializer::deserialize(&record, modules);

        info!(
            slot = slot_name,
            backend = %backend,
            tick = record.metadata.simulation_tick,
            repaired,
            issues = restore.issues.len(),
            "slot loaded"
        );
        self.cache.insert(
            slot_name.to_string(),
            CachedSlot {
                metadata: record.metadata.clone(),
                size_bytes,
                backend,
            },
        );
        self.current = Some(slot_name.to_string());
        Ok(LoadOutcome {
            metadata: record.metadata,
            restore,
            repaired,
            repaired_paths,
        })
    }

    /// Recompute a stored slot's checksum without loading it.
    pub async fn verify_slot(&self, slot_name: &str) -> Result<Verification, SaveError> {
        let Some((payload, _)) = self.router.read(slot_name).await? else {
            return Err(SaveError::NotFound(slot_name.to_string()));
        };
        let value: Value = serde_json::from_slice(&payload).map_err(|e| {
            SaveError::Corruption(format!("slot '{slot_name}' is not valid JSON: {e}"))
        })?;
        checksum::verify(&value)
    }

    /// Delete a slot everywhere. Deleting an absent slot succeeds.
    pub async fn delete_slot(&mut self, slot_name: &str) -> Result<(), SaveError> {
        self.router.delete(slot_name).await?;
        self.cache.remove(slot_name);
        if self.current.as_deref() == Some(slot_name) {
            self.current = None;
        }
        Ok(())
    }

    pub async fn exists(&self, slot_name: &str) -> Result<bool, SaveError> {
        if self.cache.contains_key(slot_name) {
            return Ok(true);
        }
        Ok(self.router.keys().await?.iter().any(|k| k == slot_name))
    }

    /// All slots, most recently saved first. Metadata for slots not yet
    /// cached is read through and cached.
    pub async fn list(&mut self) -> Result<Vec<SlotEntry>, SaveError> {
        let mut entries = Vec::new();
        for key in self.router.keys().await? {
            match self.cached_slot(&key).await {
                Ok(cached) => entries.push(SlotEntry::from_cached(&key, &cached)),
                Err(e) => warn!(slot = %key, error = %e, "skipping unreadable slot in listing"),
            }
        }
        entries.sort_by(|a, b| parse_saved_at(&b.saved_at).cmp(&parse_saved_at(&a.saved_at)));
        Ok(entries)
    }

    /// A single slot's metadata, from cache when possible.
    pub async fn get_metadata(&mut self, slot_name: &str) -> Result<SaveMetadata, SaveError> {
        Ok(self.cached_slot(slot_name).await?.metadata)
    }

    async fn cached_slot(&mut self, slot_name: &str) -> Result<CachedSlot, SaveError> {
        if let Some(cached) = self.cache.get(slot_name) {
            return Ok(cached.clone());
        }
        let Some((payload, backend)) = self.router.read(slot_name).await? else {
            return Err(SaveError::NotFound(slot_name.to_string()));
        };
        let value: Value = serde_json::from_slice(&payload).map_err(|e| {
            SaveError::Corruption(format!("slot '{slot_name}' is not valid JSON: {e}"))
        })?;
        let metadata: SaveMetadata = value
            .get("metadata")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| SaveError::Corruption(format!("metadata: {e}")))?
            .ok_or_else(|| {
                SaveError::Corruption(format!("slot '{slot_name}' carries no metadata"))
            })?;
        let cached = CachedSlot {
            metadata,
            size_bytes: payload.len() as u64,
            backend,
        };
        self.cache.insert(slot_name.to_string(), cached.clone());
        Ok(cached)
    }

    /// Save into the current autosave slot and advance the rotation.
    pub async fn autosave(
        &mut self,
        modules: &SimulationModules,
    ) -> Result<WriteReceipt, SaveError> {
        let slot = self.rotation.current_slot_name();
        let receipt = self.save(&slot, "autosave", modules).await?;
        self.rotation.advance();
        Ok(receipt)
    }

    pub async fn storage_stats(&self) -> Result<StorageStats, SaveError> {
        let RouterUsage {
            fast_bytes,
            bulk_bytes,
        } = self.router.usage().await?;
        Ok(StorageStats {
            slot_count: self.router.keys().await?.len(),
            fast_bytes,
            bulk_bytes,
        })
    }

    /// Which backend last held a slot, checked live rather than cached.
    pub async fn slot_backend(&self, slot_name: &str) -> Result<Option<BackendKind>, SaveError> {
        Ok(self.router.read(slot_name).await?.map(|(_, kind)| kind))
    }
}

/// Lenient ISO-8601 parse for listing order. Unparseable timestamps sort
/// oldest.
fn parse_saved_at(saved_at: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(saved_at)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
