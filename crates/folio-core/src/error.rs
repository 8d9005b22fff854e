/// Why a single speculative fetch failed.
///
/// These never reach callers of the scheduler; they are logged and turned
/// into a ledger eviction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefetchError {
    #[error("HTTP {status} while prefetching '{id}'")]
    HttpStatus { id: String, status: u16 },

    #[error("Transport failure while prefetching '{id}': {message}")]
    Transport { id: String, message: String },

    #[error("Resource '{0}' not found under site root")]
    MissingResource(String),

    #[error("Hint sink rejected '{id}': {message}")]
    HintRejected { id: String, message: String },

    #[error("Cannot resolve '{0}' against the base location")]
    InvalidTarget(String),
}

impl PrefetchError {
    /// Identifier of the resource the failure belongs to.
    pub fn resource_id(&self) -> &str {
        match self {
            Self::HttpStatus { id, .. }
            | Self::Transport { id, .. }
            | Self::HintRejected { id, .. } => id,
            Self::MissingResource(id) | Self::InvalidTarget(id) => id,
        }
    }
}
