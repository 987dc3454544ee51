use arb_resource::ResourceError;
use thiserror::Error;

/// A runtime fault raised by behavior code.
///
/// Faults never escape the scheduler: the offending behavior is force-ended
/// and its resources fall back to their defaults.
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("resource access failed: {0}")]
    Resource(#[from] ResourceError),

    #[error("behavior fault: {0}")]
    Fault(String),
}

impl BehaviorError {
    pub fn fault(reason: impl Into<String>) -> Self {
        BehaviorError::Fault(reason.into())
    }
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
