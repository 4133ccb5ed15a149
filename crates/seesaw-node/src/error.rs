//! Node error types.

use seesaw_engine::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

pub type AppResult<T> = Result<T, AppError>;
