//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from turn handling, providers, and persistence so callers
//! can bubble them up with consistent context.
use std::fmt;

use game_core::{ErrorSeverity, GameError, TurnError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("a combat session is already active")]
    SessionAlreadyActive,

    #[error("combat session is not active")]
    SessionNotActive,

    #[error("encounter has no units")]
    NoUnits,

    #[error("{kind} provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("menu input channel closed")]
    MenuInputClosed,

    #[error("sequence '{name}' is already running")]
    SequenceAlreadyRunning { name: String },

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SessionAlreadyActive | Self::SequenceAlreadyRunning { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::SessionNotActive | Self::NoUnits | Self::ProviderNotSet { .. } => {
                ErrorSeverity::Validation
            }
            Self::MenuInputClosed | Self::Repository(_) => ErrorSeverity::Internal,
            Self::Turn(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            Self::SessionNotActive => "SESSION_NOT_ACTIVE",
            Self::NoUnits => "SESSION_NO_UNITS",
            Self::ProviderNotSet { .. } => "PROVIDER_NOT_SET",
            Self::MenuInputClosed => "MENU_INPUT_CLOSED",
            Self::SequenceAlreadyRunning { .. } => "SEQUENCE_ALREADY_RUNNING",
            Self::Turn(error) => error.error_code(),
            Self::Repository(_) => "REPOSITORY",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Menu,
    Enemy,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Menu => "menu",
            ProviderKind::Enemy => "enemy action",
        };
        write!(f, "{}", label)
    }
}
