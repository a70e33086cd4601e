use thiserror::Error;

/// Errors raised by the camp domain: entity lookups, input validation and
/// the ranking engine.
///
/// Persistence and configuration failures are reported through `anyhow`
/// with file context instead; see `store::storage` and `config`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CampError {
    /// A referenced entity or membership does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A discipline definition carries an unrecognized aggregation method or
    /// result type. No partial ranking is produced.
    #[error("Invalid discipline definition: {0}")]
    InvalidDiscipline(String),

    /// Input handed to the engine broke its contract (mixed disciplines,
    /// non-finite values). Indicates a caller bug.
    #[error("Precondition violated: {0}")]
    PrecondAssertion(String),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),

    /// Input rejected before it reached the store.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl CampError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        CampError::NotFound { entity, id }
    }
}

pub type CampResult<T> = std::result::Result<T, CampError>;
