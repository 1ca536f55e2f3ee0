use crate::types::{Rank, ReduceOp};

pub type Result<T> = std::result::Result<T, RingweaveError>;

#[derive(Debug, thiserror::Error)]
pub enum RingweaveError {
    #[error("{operation} requires {requirement}, but the group has {world_size} ranks")]
    InvalidGroupSize {
        operation: &'static str,
        world_size: u32,
        requirement: &'static str,
    },

    #[error(
        "{operation}: vector lengths disagree across the group (local {local}, group range {min}..={max}, limit {limit})"
    )]
    InvalidVectorLength {
        operation: &'static str,
        local: usize,
        min: usize,
        max: usize,
        limit: usize,
    },

    #[error("{operation} failed talking to rank {rank}: {reason}")]
    CommunicationFailure {
        operation: &'static str,
        rank: Rank,
        reason: String,
    },

    #[error("peer {rank} disconnected unexpectedly")]
    PeerDisconnected { rank: Rank },

    #[error("rank {rank} is not a peer of this group")]
    UnknownPeer { rank: Rank },

    #[error("invalid rank {rank}: world size is {world_size}")]
    InvalidRank { rank: Rank, world_size: u32 },

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("reduce op {op} is not supported by {operation}")]
    UnsupportedOp {
        op: ReduceOp,
        operation: &'static str,
    },

    #[error("protocol version mismatch: local={local}, remote={remote}")]
    ProtocolMismatch { local: u16, remote: u16 },

    #[error("frame decode failed: {0}")]
    DecodeFailed(String),

    #[error("frame encode failed: {0}")]
    EncodeFailed(String),

    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RingweaveError {
    /// Create a `Transport` error with just a message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a `Transport` error with a message and a source error.
    pub fn transport_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a point-to-point error raised inside a collective.
    ///
    /// Errors that already carry collective context pass through unchanged.
    pub fn collective(operation: &'static str, rank: Rank, err: RingweaveError) -> Self {
        match err {
            e @ (Self::CommunicationFailure { .. }
            | Self::InvalidGroupSize { .. }
            | Self::InvalidVectorLength { .. }) => e,
            other => Self::CommunicationFailure {
                operation,
                rank,
                reason: other.to_string(),
            },
        }
    }

    /// True for the error kinds raised by the collective precondition checks.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidGroupSize { .. } | Self::InvalidVectorLength { .. }
        )
    }
}
