use attr_catalog::ValueError;
use thiserror::Error;

pub type Result<T, E = DeviceError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no such attribute or command: {0}")]
    NotFound(String),
    #[error("attribute is not writable: {0}")]
    NotWritable(String),
    #[error("type mismatch on {name}: {reason}")]
    TypeMismatch { name: String, reason: ValueError },
}
