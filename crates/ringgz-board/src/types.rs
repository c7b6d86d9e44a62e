//! Board vocabulary: colors, formats, and placements.

use std::fmt;

use crate::{BoardError, Violation};

/// Fields per row and per column.
pub const BOARD_SIDE: usize = 5;

/// Total number of fields, indexed row-major from the top-left.
pub const FIELD_COUNT: usize = BOARD_SIDE * BOARD_SIDE;

/// Number of ring colors.
pub const COLOR_COUNT: usize = 4;

/// Number of ring formats.
pub const FORMAT_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A ring color, 0 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u8);

impl Color {
    /// Every color, in numeric order.
    pub const ALL: [Color; COLOR_COUNT] = [Color(0), Color(1), Color(2), Color(3)];

    /// Returns the color with the given number, if it exists.
    pub fn new(value: u8) -> Option<Self> {
        (usize::from(value) < COLOR_COUNT).then_some(Self(value))
    }

    /// The color's number on the wire.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Assigns colors to `players` participants.
    ///
    /// - 2 players: `[0, 1]` and `[2, 3]`
    /// - 3 players: `[0, 3]`, `[1, 3]`, `[2, 3]` (color 3 is shared)
    /// - 4 players: one color each
    ///
    /// Returns `None` for any other player count.
    pub fn assignment(players: usize) -> Option<Vec<Vec<Color>>> {
        let c = |v: u8| Color(v);
        match players {
            2 => Some(vec![vec![c(0), c(1)], vec![c(2), c(3)]]),
            3 => Some(vec![
                vec![c(0), c(3)],
                vec![c(1), c(3)],
                vec![c(2), c(3)],
            ]),
            4 => Some(Self::ALL.iter().map(|&color| vec![color]).collect()),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// A ring format (size class), 0 to 4.
///
/// 0 is the small solid ring, 1 to 3 are increasingly larger rings, and
/// [`Format::FULL`] fills a whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Format(u8);

impl Format {
    /// The ring that covers an entire field.
    pub const FULL: Format = Format(4);

    /// Every format, smallest first.
    pub const ALL: [Format; FORMAT_COUNT] =
        [Format(0), Format(1), Format(2), Format(3), Format(4)];

    /// The four formats that stack on one field.
    pub const STACKABLE: [Format; 4] = [Format(0), Format(1), Format(2), Format(3)];

    /// Returns the format with the given number, if it exists.
    pub fn new(value: u8) -> Option<Self> {
        (usize::from(value) < FORMAT_COUNT).then_some(Self(value))
    }

    /// The format's number on the wire.
    pub fn value(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// One ring placement: which field, which color, which format.
///
/// Constructing a `Placement` only checks ranges; whether the placement
/// is legal on a given board is [`Board::validate_move`](crate::Board::validate_move)'s job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub field: usize,
    pub color: Color,
    pub format: Format,
}

impl Placement {
    /// Builds a placement from raw protocol integers.
    ///
    /// # Errors
    /// [`BoardError::InvalidMove`] with [`Violation::OutOfRange`] unless
    /// `0 <= field < 25`, `0 <= color < 4` and `0 <= format < 5`.
    pub fn new(field: i32, color: i32, format: i32) -> Result<Self, BoardError> {
        let out_of_range = || {
            BoardError::InvalidMove(Violation::OutOfRange {
                field,
                color,
                format,
            })
        };
        let field_index = usize::try_from(field)
            .ok()
            .filter(|&f| f < FIELD_COUNT)
            .ok_or_else(out_of_range)?;
        let color = u8::try_from(color)
            .ok()
            .and_then(Color::new)
            .ok_or_else(out_of_range)?;
        let format = u8::try_from(format)
            .ok()
            .and_then(Format::new)
            .ok_or_else(out_of_range)?;
        Ok(Self {
            field: field_index,
            color,
            format,
        })
    }

    /// The field index as sent on the wire.
    pub fn field_value(&self) -> u8 {
        // FIELD_COUNT fits in a u8.
        self.field as u8
    }
}
