// ==========================================
// Duty Roster - domain type definitions
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guard identifier (SQLite rowid)
pub type GuardId = i64;

/// Post identifier
pub type PostId = i64;

/// Shift identifier
pub type ShiftId = i64;

// ==========================================
// Pairing rule kind
// ==========================================
// Symmetric relation between two guards: either they must share every
// shift they appear on, or they must never share one.
// Serialization format: SCREAMING_SNAKE_CASE (matches the database)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingKind {
    MustPair,    // always together
    MustNotPair, // never together
}

impl PairingKind {
    /// Database string form
    pub fn to_db_str(self) -> &'static str {
        match self {
            PairingKind::MustPair => "MUST_PAIR",
            PairingKind::MustNotPair => "MUST_NOT_PAIR",
        }
    }

    /// Parse the database string form (unknown values fall back to MustNotPair,
    /// the conservative reading for an unrecognized rule)
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "MUST_PAIR" => PairingKind::MustPair,
            "MUST_NOT_PAIR" => PairingKind::MustNotPair,
            _ => PairingKind::MustNotPair,
        }
    }
}

impl fmt::Display for PairingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_kind_db_round_trip() {
        assert_eq!(
            PairingKind::from_db_str(PairingKind::MustPair.to_db_str()),
            PairingKind::MustPair
        );
        assert_eq!(
            PairingKind::from_db_str(PairingKind::MustNotPair.to_db_str()),
            PairingKind::MustNotPair
        );
    }

    #[test]
    fn test_pairing_kind_unknown_is_conservative() {
        assert_eq!(PairingKind::from_db_str("WHATEVER"), PairingKind::MustNotPair);
    }
}
