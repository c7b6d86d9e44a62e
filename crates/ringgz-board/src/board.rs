//! The board: a 5×5 grid of fields, each with one slot per ring format.

use rand::Rng;

use crate::{
    BOARD_SIDE, BoardError, Color, FIELD_COUNT, FORMAT_COUNT, Format,
    Placement, Violation,
};

/// The nine inner fields that may hold the starting base.
pub const STARTING_BASE_FIELDS: [usize; 9] = [6, 7, 8, 11, 12, 13, 16, 17, 18];

/// One game's board.
///
/// Each field holds at most one ring per format. A full-field ring
/// ([`Format::FULL`]) occupies its field alone. The starting base field
/// never holds anything. Rings are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    slots: [[Option<Color>; FORMAT_COUNT]; FIELD_COUNT],
    starting_base: usize,
}

impl Board {
    /// Creates an empty board with the starting base on `starting_base`.
    ///
    /// # Errors
    /// [`BoardError::InvalidStartingBase`] unless the field is one of
    /// [`STARTING_BASE_FIELDS`].
    pub fn new(starting_base: usize) -> Result<Self, BoardError> {
        if !STARTING_BASE_FIELDS.contains(&starting_base) {
            return Err(BoardError::InvalidStartingBase(starting_base));
        }
        Ok(Self {
            slots: [[None; FORMAT_COUNT]; FIELD_COUNT],
            starting_base,
        })
    }

    /// Creates an empty board with the starting base on a random inner field.
    pub fn with_random_base<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let starting_base =
            STARTING_BASE_FIELDS[rng.random_range(0..STARTING_BASE_FIELDS.len())];
        Self {
            slots: [[None; FORMAT_COUNT]; FIELD_COUNT],
            starting_base,
        }
    }

    /// The starting base field.
    pub fn starting_base(&self) -> usize {
        self.starting_base
    }

    /// The color of the ring of `format` on `field`, if any.
    pub fn ring_at(&self, field: usize, format: Format) -> Option<Color> {
        self.slots
            .get(field)
            .and_then(|slots| slots[format.index()])
    }

    /// `true` if no ring sits on `field`.
    pub fn is_empty_field(&self, field: usize) -> bool {
        self.slots
            .get(field)
            .is_none_or(|slots| slots.iter().all(Option::is_none))
    }

    /// Checks a placement against every rule without changing the board.
    ///
    /// # Errors
    /// [`BoardError::InvalidMove`] carrying the first rule broken.
    pub fn validate_move(&self, placement: &Placement) -> Result<(), BoardError> {
        let Placement {
            field,
            color,
            format,
        } = *placement;
        let invalid = |v| Err(BoardError::InvalidMove(v));

        if field == self.starting_base {
            return invalid(Violation::StartingBase);
        }
        if self.ring_at(field, Format::FULL).is_some() {
            return invalid(Violation::FieldBlocked);
        }
        if self.ring_at(field, format).is_some() {
            return invalid(Violation::FormatTaken);
        }
        if format == Format::FULL {
            if !self.is_empty_field(field) {
                return invalid(Violation::FieldNotEmpty);
            }
            if orthogonal_neighbors(field)
                .any(|n| self.ring_at(n, Format::FULL) == Some(color))
            {
                return invalid(Violation::AdjacentFull);
            }
        }
        Ok(())
    }

    /// Validates and places a ring.
    ///
    /// # Errors
    /// Same as [`validate_move`](Self::validate_move); the board is left
    /// untouched on error.
    pub fn apply_move(&mut self, placement: &Placement) -> Result<(), BoardError> {
        self.validate_move(placement)?;
        self.slots[placement.field][placement.format.index()] =
            Some(placement.color);
        Ok(())
    }

    /// `true` if `color` can still be placed anywhere.
    pub fn has_legal_move(&self, color: Color) -> bool {
        (0..FIELD_COUNT).any(|field| {
            Format::ALL.iter().any(|&format| {
                self.validate_move(&Placement {
                    field,
                    color,
                    format,
                })
                .is_ok()
            })
        })
    }

    /// `true` once no color has a legal placement left.
    pub fn is_game_over(&self) -> bool {
        !Color::ALL.iter().any(|&color| self.has_legal_move(color))
    }

    /// Number of rings on the board.
    pub fn ring_count(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|slots| slots.iter())
            .filter(|slot| slot.is_some())
            .count()
    }
}

/// Fields directly above, below, left, and right of `field`.
pub(crate) fn orthogonal_neighbors(field: usize) -> impl Iterator<Item = usize> {
    neighbors(field, &[(-1, 0), (1, 0), (0, -1), (0, 1)])
}

/// The up to eight fields surrounding `field`, diagonals included.
pub(crate) fn surrounding_fields(field: usize) -> impl Iterator<Item = usize> {
    neighbors(
        field,
        &[
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ],
    )
}

fn neighbors(
    field: usize,
    offsets: &'static [(isize, isize)],
) -> impl Iterator<Item = usize> {
    let row = (field / BOARD_SIDE) as isize;
    let col = (field % BOARD_SIDE) as isize;
    let side = BOARD_SIDE as isize;
    offsets.iter().filter_map(move |&(dr, dc)| {
        let (r, c) = (row + dr, col + dc);
        ((0..side).contains(&r) && (0..side).contains(&c))
            .then(|| (r * side + c) as usize)
    })
}
