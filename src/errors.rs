// Error types and error handling module
// This file defines the client error taxonomy and the stage names
// reported when the transfer pipeline fails
//
// Numan Thabit 2025 Nov

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("reconstruction error: {0}")]
    Reconstruction(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("send failed at {stage} stage: {source}")]
    Send {
        stage: SendStage,
        #[source]
        source: Box<ClientError>,
    },
}

/// Coarse error classification for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Reconstruction,
    Validation,
    Send,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::Reconstruction(_) => ErrorKind::Reconstruction,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Send { .. } => ErrorKind::Send,
        }
    }

    /// Stage that failed, for pipeline errors.
    pub fn stage(&self) -> Option<SendStage> {
        match self {
            ClientError::Send { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn at_stage(stage: SendStage) -> impl FnOnce(ClientError) -> ClientError {
        move |source| ClientError::Send {
            stage,
            source: Box::new(source),
        }
    }
}

/// Steps of the send pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendStage {
    Sign,
    Tips,
    Attach,
    Broadcast,
    Store,
}

impl SendStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStage::Sign => "sign",
            SendStage::Tips => "tips",
            SendStage::Attach => "attach",
            SendStage::Broadcast => "broadcast",
            SendStage::Store => "store",
        }
    }
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
