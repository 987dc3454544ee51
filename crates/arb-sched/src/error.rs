use arb_core::ArbError;
use arb_resource::ResourceError;
use thiserror::Error;

/// Configuration errors reported by [`SchedulerBuilder::build`][crate::SchedulerBuilder::build],
/// plus the few internal failures a running loop can hit.
///
/// Behavior faults are not here: they are handled inside the loop.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("behavior {behavior:?} requires no resources")]
    EmptyRequirements { behavior: String },

    #[error("resource {resource:?} has more than one default behavior")]
    DuplicateDefault { resource: String },

    #[error("default {behavior:?} for {resource:?} must require exactly that resource")]
    DefaultRequirements { resource: String, behavior: String },

    #[error("behavior {behavior:?} requires unknown resource {resource}")]
    UnknownResource { behavior: String, resource: String },

    #[error(transparent)]
    Core(#[from] ArbError),

    #[error("resource table error: {0}")]
    Resource(#[from] ResourceError),
}

pub type SchedResult<T> = Result<T, SchedError>;
