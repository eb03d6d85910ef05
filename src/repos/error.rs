/*
 * Responsibility
 * - What a store reports upwards, independent of the backing implementation
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("conflict: {0}")]
    Conflict(&'static str),
}
