use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WaterfallError {
    #[error("Unknown share class in custom stacking order: {0}")]
    UnknownShareClass(Uuid),

    #[error("Capitalization snapshot contains no share classes")]
    EmptySnapshot,
}
