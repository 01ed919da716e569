use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CapTableError {
    #[error("{context} references unknown share class {id}")]
    UnknownShareClass { context: String, id: Uuid },

    #[error("Invalid cap table input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}
