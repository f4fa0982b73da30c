use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{BANDS, BAND_LETTERS, BOARD_SIZE, FREE_CELL, MAX_NUMBER};

/// A 5x5 bingo card, stored column-major (B, I, N, G, O).
///
/// Each column holds distinct numbers from its band; the centre cell of the
/// N column is the free cell, stored as `FREE_CELL` (0). Cards are immutable
/// once generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card {
    columns: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Card {
    /// Generate a fresh card with its own entropy-seeded RNG.
    ///
    /// Safe to call concurrently; every call builds a private ChaCha20 RNG.
    pub fn generate() -> Self {
        let mut rng = ChaCha20Rng::from_entropy();
        Self::generate_with(&mut rng)
    }

    /// Generate a card from a caller-provided RNG (deterministic in tests).
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let mut columns = [[FREE_CELL; BOARD_SIZE]; BOARD_SIZE];

        for (col, (lo, hi)) in BANDS.iter().enumerate() {
            let mut pool: Vec<u8> = (*lo..=*hi).collect();
            pool.shuffle(rng);

            if col == 2 {
                // N column: four numbers around the free centre
                columns[col][0] = pool[0];
                columns[col][1] = pool[1];
                columns[col][2] = FREE_CELL;
                columns[col][3] = pool[2];
                columns[col][4] = pool[3];
            } else {
                for (row, cell) in columns[col].iter_mut().enumerate() {
                    *cell = pool[row];
                }
            }
        }

        Self { columns }
    }

    /// Build a card from raw columns. Used by tests and storage decoding.
    pub fn from_columns(columns: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { columns }
    }

    /// Cell value at (column, row); `FREE_CELL` for the free centre.
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        self.columns[col][row]
    }

    /// Whether the card carries this number (the free cell never matches).
    pub fn contains(&self, number: u8) -> bool {
        number != FREE_CELL && self.columns.iter().any(|col| col.contains(&number))
    }

    /// All 24 real numbers on the card, column order.
    pub fn numbers(&self) -> Vec<u8> {
        self.columns
            .iter()
            .flatten()
            .copied()
            .filter(|&n| n != FREE_CELL)
            .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let cell = self.columns[col][row];
                if cell == FREE_CELL {
                    write!(f, " FREE")?;
                } else {
                    write!(f, " {:>4}", cell)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Column letter for a drawn number (B-1..15, I-16..30, ...).
pub fn band_letter(number: u8) -> char {
    for (idx, (lo, hi)) in BANDS.iter().enumerate() {
        if (*lo..=*hi).contains(&number) {
            return BAND_LETTERS[idx];
        }
    }
    '?'
}

/// Announcement label for a drawn number, e.g. "B-7".
pub fn call_label(number: u8) -> String {
    format!("{}-{}", band_letter(number), number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bands_hold_distinct_values_in_range() {
        for _ in 0..50 {
            let card = Card::generate();
            for (col, (lo, hi)) in BANDS.iter().enumerate() {
                let mut seen = HashSet::new();
                for row in 0..BOARD_SIZE {
                    let cell = card.cell(col, row);
                    if col == 2 && row == 2 {
                        assert_eq!(cell, FREE_CELL, "centre cell must be free");
                        continue;
                    }
                    assert!(
                        (*lo..=*hi).contains(&cell),
                        "cell {} out of band {}..={}",
                        cell,
                        lo,
                        hi
                    );
                    assert!(seen.insert(cell), "duplicate {} in column {}", cell, col);
                }
            }
        }
    }

    #[test]
    fn test_card_has_24_numbers() {
        let card = Card::generate();
        let numbers = card.numbers();
        assert_eq!(numbers.len(), 24);
        let unique: HashSet<u8> = numbers.iter().copied().collect();
        assert_eq!(unique.len(), 24);
        assert!(numbers.iter().all(|&n| (1..=MAX_NUMBER).contains(&n)));
    }

    #[test]
    fn test_contains_ignores_free_sentinel() {
        let card = Card::generate();
        assert!(!card.contains(FREE_CELL));
        let first = card.cell(0, 0);
        assert!(card.contains(first));
    }

    #[test]
    fn test_generate_with_is_deterministic() {
        use rand::SeedableRng;
        let a = Card::generate_with(&mut ChaCha20Rng::seed_from_u64(7));
        let b = Card::generate_with(&mut ChaCha20Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_call_label() {
        assert_eq!(call_label(7), "B-7");
        assert_eq!(call_label(16), "I-16");
        assert_eq!(call_label(45), "N-45");
        assert_eq!(call_label(46), "G-46");
        assert_eq!(call_label(75), "O-75");
    }

    #[test]
    fn test_serialization_is_plain_grid() {
        let card = Card::generate();
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
        assert!(json.starts_with("[["));
    }
}
