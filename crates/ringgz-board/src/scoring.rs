//! Final scoring of a finished board.

use std::collections::HashSet;

use crate::board::surrounding_fields;
use crate::{Board, Color, FIELD_COUNT, Format};

/// Final standings, highest score first.
///
/// Players with equal points keep the order they were given in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult<P> {
    pub standings: Vec<(P, u32)>,
}

impl<P> GameResult<P> {
    /// The leading entry, if any.
    pub fn leader(&self) -> Option<&(P, u32)> {
        self.standings.first()
    }

    /// Sum of all awarded points.
    pub fn total(&self) -> u32 {
        self.standings.iter().map(|(_, points)| points).sum()
    }
}

/// Points earned by one color.
///
/// One point per field stacked with formats 0 to 3 all in `color`, plus
/// the size of the largest group of `color` full-field rings, where two
/// rings belong to the same group when their fields touch (diagonals
/// count).
pub fn color_points(board: &Board, color: Color) -> u32 {
    let stacks = (0..FIELD_COUNT)
        .filter(|&field| {
            Format::STACKABLE
                .iter()
                .all(|&format| board.ring_at(field, format) == Some(color))
        })
        .count();
    (stacks + largest_full_region(board, color)) as u32
}

fn largest_full_region(board: &Board, color: Color) -> usize {
    let is_ours = |field: usize| board.ring_at(field, Format::FULL) == Some(color);
    let mut seen = HashSet::new();
    let mut largest = 0;

    for start in (0..FIELD_COUNT).filter(|&f| is_ours(f)) {
        if !seen.insert(start) {
            continue;
        }
        let mut stack = vec![start];
        let mut size = 0;
        while let Some(field) = stack.pop() {
            size += 1;
            for next in surrounding_fields(field) {
                if is_ours(next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        largest = largest.max(size);
    }
    largest
}

/// Scores a finished board for every player.
///
/// `ownership` lists each player with the colors they own, in turn
/// order. A color owned by more than one player scores for nobody.
pub fn score<P: Clone>(board: &Board, ownership: &[(P, Vec<Color>)]) -> GameResult<P> {
    let owners = |color: &Color| {
        ownership
            .iter()
            .filter(|(_, colors)| colors.contains(color))
            .count()
    };

    let mut standings: Vec<(P, u32)> = ownership
        .iter()
        .map(|(player, colors)| {
            let points = colors
                .iter()
                .copied()
                .filter(|color| owners(color) == 1)
                .map(|color| color_points(board, color))
                .sum();
            (player.clone(), points)
        })
        .collect();

    // Stable: ties keep turn order.
    standings.sort_by(|a, b| b.1.cmp(&a.1));
    GameResult { standings }
}
