// ---------------------------------------------------------------------------
// SaveError: typed errors for every save/load failure mode
// ---------------------------------------------------------------------------

use thiserror::Error;

/// Errors that can occur during save/load operations.
///
/// Expected failure conditions (bad records, full storage, missing slots)
/// are always reported through this enum; nothing in the save system panics
/// across its public boundary. The caller is expected to surface the
/// `Display` message and keep the simulation running.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The record failed structural validation. Lists every violation
    /// found, not just the first.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The stored integrity checksum does not match the recomputed one.
    #[error("integrity checksum mismatch (stored {stored}, computed {computed})")]
    Integrity { stored: String, computed: String },

    /// The payload is not parseable as a record at all. Repair cannot help.
    #[error("corrupted record: {0}")]
    Corruption(String),

    /// Every configured backend rejected the write.
    #[error("storage capacity exhausted: {0}")]
    Capacity(String),

    /// No record exists in the requested slot.
    #[error("no save found in slot '{0}'")]
    NotFound(String),

    /// A specific module's serializer or deserializer failed.
    #[error("module '{module}': {message}")]
    Module { module: String, message: String },

    /// The record was written by a newer build than this one supports.
    #[error("record is v{found}, but this build only supports up to v{expected_max}")]
    VersionMismatch { expected_max: u32, found: u32 },

    /// JSON encoding failed while producing a record.
    #[error("encoding error: {0}")]
    Encode(String),

    /// A storage backend primitive failed unexpectedly.
    #[error("storage backend error: {0}")]
    Backend(String),
}
