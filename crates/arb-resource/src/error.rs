use arb_core::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource {0} not found")]
    Unknown(ResourceId),

    #[error("resource name {0:?} registered twice")]
    DuplicateName(String),

    #[error("resource table is full ({max} resources)")]
    Capacity { max: usize },

    #[error("behavior {behavior:?} does not hold resource {resource:?}")]
    NotHeld {
        behavior: String,
        resource: String,
    },
}

pub type ResourceResult<T> = Result<T, ResourceError>;
