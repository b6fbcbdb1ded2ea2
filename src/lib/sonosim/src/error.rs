use thiserror::Error;

/// Reasons a job is rejected before any work starts. Runtime failures inside
/// a running job are reported through the progress log instead; the caller
/// only observes the running flag returning to false.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("a simulation job is already in progress")]
    JobInProgress,

    #[error("Transducers list is empty")]
    EmptyTransducerList,

    #[error("transducer {id:?}: {message}")]
    InvalidTransducer { id: String, message: String },

    #[error("{message}")]
    InvalidParameter { message: String },

    #[error("unable to start simulation: {0}")]
    Spawn(#[from] std::io::Error),
}
