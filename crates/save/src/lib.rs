//! Save system for the settlement simulation: versioned records, integrity
//! checking with best-effort repair, format migration, and dual-backend
//! storage behind a single slot-oriented manager.
//!
//! The layering, bottom up:
//!
//! - backends: key-value stores ([`MemoryStore`], [`FileStore`]) behind the
//!   async [`StorageBackend`] trait.
//! - [`StorageRouter`]: size- and quota-aware routing across a fast store
//!   and an optional bulk store.
//! - [`SaveRecord`] and the codec registry: the versioned JSON record and
//!   per-module capture/apply.
//! - checksum / validation / [`repair`] / [`migrate_record`]: integrity and
//!   structural checking on the raw JSON value, default substitution for
//!   damaged fields, and version upgrades.
//! - [`SaveManager`]: slot lifecycle (save, load, list, delete, autosave
//!   rotation) tying the pipeline together.
//! - [`EngineBridge`]: turns scheduler signals into saves.

mod backend;
mod checksum;
mod codec;
mod engine;
mod error;
mod manager;
mod migrate;
mod record;
mod repair;
mod router;
mod serializer;
mod validator;


pub use backend::{
    BackendError, BackendKind, FileStore, MemoryStore, StorageBackend,
    DEFAULT_MEMORY_QUOTA_BYTES,
};
pub use checksum::{generate as generate_checksum, verify as verify_checksum, Verification};
pub use engine::{AutosavePolicy, EngineBridge};
pub use error::SaveError;
pub use manager::{
    AutosaveRotation, LoadOutcome, SaveManager, SlotEntry, StorageStats, DEFAULT_AUTOSAVE_SLOTS,
};
pub use migrate::{migrate_record, MigrationReport};
pub use record::{
    SaveMetadata, SaveRecord, CHECKSUM_MODULES, CURRENT_FORMAT_VERSION, MODULE_IDS,
    REQUIRED_MODULES,
};
pub use repair::{repair, RepairOutcome};
pub use router::{
    RouterConfig, RouterUsage, StorageRouter, WriteReceipt, DEFAULT_SIZE_THRESHOLD_BYTES,
};
pub use serializer::{deserialize, serialize, RestoreIssue, RestoreReport};
pub use validator::{validate_record, ValidationReport};
