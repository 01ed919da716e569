use serde::{Deserialize, Serialize};

/// The legal category of an equity class as labeled on the cap table.
///
/// Serialized in the wire format cap table files use ("COMMON" / "PREFERRED").
/// Distribution semantics do not follow this label alone: a class with a zero
/// liquidation preference multiple is treated as common-like regardless of
/// how it is labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareClassType {
    Common,
    Preferred,
}

impl ShareClassType {
    /// Returns true for the common label.
    pub fn is_common(&self) -> bool {
        matches!(self, ShareClassType::Common)
    }
}
