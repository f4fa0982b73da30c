//! Win evaluation: pure predicates over a card and the called set.
//!
//! This gates money movement, so it stays side-effect free and is tested in
//! isolation. A line is one of 12 shapes: 5 rows, 5 columns, 2 diagonals.

use std::collections::{BTreeSet, HashSet};

use super::card::Card;
use super::constants::{BOARD_SIZE, FREE_CELL};

/// (column, row) coordinates for each of the 12 winning lines.
fn lines() -> Vec<[(usize, usize); BOARD_SIZE]> {
    let mut lines = Vec::with_capacity(12);

    for row in 0..BOARD_SIZE {
        let mut line = [(0, 0); BOARD_SIZE];
        for (col, cell) in line.iter_mut().enumerate() {
            *cell = (col, row);
        }
        lines.push(line);
    }

    for col in 0..BOARD_SIZE {
        let mut line = [(0, 0); BOARD_SIZE];
        for (row, cell) in line.iter_mut().enumerate() {
            *cell = (col, row);
        }
        lines.push(line);
    }

    let mut diag = [(0, 0); BOARD_SIZE];
    let mut anti = [(0, 0); BOARD_SIZE];
    for i in 0..BOARD_SIZE {
        diag[i] = (i, i);
        anti[i] = (i, BOARD_SIZE - 1 - i);
    }
    lines.push(diag);
    lines.push(anti);

    lines
}

fn line_complete<F>(card: &Card, line: &[(usize, usize); BOARD_SIZE], mut counts: F) -> bool
where
    F: FnMut(u8) -> bool,
{
    line.iter().all(|&(col, row)| {
        let cell = card.cell(col, row);
        cell == FREE_CELL || counts(cell)
    })
}

/// True when at least one line is fully covered by the called set.
/// The free cell always satisfies any line through it.
pub fn has_win(card: &Card, called: &HashSet<u8>) -> bool {
    lines()
        .iter()
        .any(|line| line_complete(card, line, |n| called.contains(&n)))
}

/// Explicit-claim variant: a cell counts only if it was both called and
/// tapped by the participant. Tapping an uncalled number never counts.
pub fn has_claimed_win(card: &Card, called: &HashSet<u8>, tapped: &BTreeSet<u8>) -> bool {
    lines()
        .iter()
        .any(|line| line_complete(card, line, |n| called.contains(&n) && tapped.contains(&n)))
}

/// Would calling `candidate` complete a line on this card?
/// Used by the win-delay draw policy.
pub fn would_complete(card: &Card, called: &HashSet<u8>, candidate: u8) -> bool {
    if has_win(card, called) {
        return true;
    }
    let mut extended = called.clone();
    extended.insert(candidate);
    has_win(card, &extended)
}
