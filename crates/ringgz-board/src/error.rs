//! Error types for the board engine.

/// The placement rule a rejected move broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Field, color, or format lies outside its range.
    OutOfRange { field: i32, color: i32, format: i32 },
    /// The field is the starting base, which never holds a ring.
    StartingBase,
    /// A full-field ring already occupies the field.
    FieldBlocked,
    /// A ring of this format already sits on the field.
    FormatTaken,
    /// A full-field ring needs an empty field.
    FieldNotEmpty,
    /// A full-field ring of the same color sits on an adjacent field.
    AdjacentFull,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                color,
                format,
            } => write!(
                f,
                "field {field}, color {color}, format {format} out of range"
            ),
            Self::StartingBase => write!(f, "field is the starting base"),
            Self::FieldBlocked => write!(f, "field is blocked by a full ring"),
            Self::FormatTaken => write!(f, "format already placed on field"),
            Self::FieldNotEmpty => {
                write!(f, "a full ring needs an empty field")
            }
            Self::AdjacentFull => {
                write!(f, "adjacent field holds a full ring of the same color")
            }
        }
    }
}

/// Errors that can occur in the board engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The placement breaks a rule; the game continues.
    #[error("invalid move: {0}")]
    InvalidMove(Violation),

    /// The starting base must be one of the nine inner fields.
    #[error("field {0} cannot be the starting base")]
    InvalidStartingBase(usize),
}
