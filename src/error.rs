//! Top-level error type.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::ConfigError;
use crate::keystore::KeyStoreError;

/// Any failure that can end a run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

pub type AppResult<T> = Result<T, AppError>;
