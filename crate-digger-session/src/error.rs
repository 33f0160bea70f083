use crate::types::{ActionKind, ActorId, SurfaceId};

/// Errors returned by session transports.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown surface {0}")]
    UnknownSurface(SurfaceId),

    #[error("Transport rejected the request: {0}")]
    Rejected(String),
}

/// Errors returned by the session store and controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A session is already open on surface {0}")]
    DuplicateSession(SurfaceId),

    #[error("{actor} is not allowed to act on this session")]
    Unauthorized { actor: ActorId },

    #[error("Selection {} is out of range (1-{len})", .index + 1)]
    InvalidSelection { index: usize, len: usize },

    #[error("'{0}' is not available in this session")]
    UnsupportedAction(ActionKind),

    #[error("No active session on surface {0}")]
    NotFound(SurfaceId),

    #[error("Cannot start a session with no items")]
    EmptyItems,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// True for rejections that only the acting user should see. These are
    /// expected during normal use and are not system failures.
    pub fn is_actor_facing(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::InvalidSelection { .. } | Self::UnsupportedAction(_)
        )
    }
}
