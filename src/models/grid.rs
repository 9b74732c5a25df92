use crate::config::GRID_SIZE;
use crate::models::letter::Letter;
use crate::models::pattern::LineState;
use crate::models::pattern_index::PatternIndex;
use crate::models::placement::{Direction, WordPlacement};
use crate::models::word::Word;
use crate::sink::ArtifactSink;
use std::collections::{BTreeSet, HashSet};
use std::error;
use std::fmt;
use std::fmt::Write;

/// Why a placement was rejected
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PlaceError {
    /// A cell the word would occupy already holds a different letter
    ConflictLetter,
    /// The word would extend past the grid edge
    OutOfBounds,
    /// The word is already on the grid
    DuplicateWord,
    /// A row or column constraint rejected the placement; the grid was
    /// rolled back to its previous state
    ValidationFailed,
}

/// The partial square grid under construction: assigned letters, the ordered
/// placements that produced them and the set of words on the grid
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Grid {
    cells: Vec<Option<Letter>>,
    placements: Vec<WordPlacement>,
    placed_words: BTreeSet<Word>,
    filled_cells: usize,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            cells: vec![None; GRID_SIZE * GRID_SIZE],
            placements: Vec::new(),
            placed_words: BTreeSet::new(),
            filled_cells: 0,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Letter> {
        self.cells[row * GRID_SIZE + col]
    }

    pub fn row_state(&self, row: usize) -> LineState {
        LineState::new((0..GRID_SIZE).map(|col| self.get(row, col)).collect())
    }

    pub fn col_state(&self, col: usize) -> LineState {
        LineState::new((0..GRID_SIZE).map(|row| self.get(row, col)).collect())
    }

    pub fn placements(&self) -> &[WordPlacement] {
        &self.placements
    }

    pub fn placed_words(&self) -> &BTreeSet<Word> {
        &self.placed_words
    }

    pub fn filled_cells(&self) -> usize {
        self.filled_cells
    }

    pub fn unassigned_cells(&self) -> usize {
        GRID_SIZE * GRID_SIZE - self.filled_cells
    }

    pub fn is_complete(&self) -> bool {
        self.filled_cells == GRID_SIZE * GRID_SIZE
    }

    /// Canonical string form used for memoization; unassigned cells render
    /// as `-`
    pub fn signature(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.map_or('-', Letter::as_char))
            .collect()
    }

    /// Check the placement against the current letters without writing
    /// anything
    pub fn can_place(&self, placement: &WordPlacement) -> Result<(), PlaceError> {
        if self.placed_words.contains(&placement.word) {
            return Err(PlaceError::DuplicateWord);
        }

        let len = placement.word.len();
        let in_bounds = match placement.direction {
            Direction::Horizontal => placement.row < GRID_SIZE && placement.col + len <= GRID_SIZE,
            Direction::Vertical => placement.col < GRID_SIZE && placement.row + len <= GRID_SIZE,
        };
        if !in_bounds {
            return Err(PlaceError::OutOfBounds);
        }

        for ((row, col), letter) in placement.cells() {
            if let Some(current) = self.get(row, col) {
                if current != letter {
                    return Err(PlaceError::ConflictLetter);
                }
            }
        }
        Ok(())
    }

    /// Place a word as one transaction. Every letter is first checked to
    /// keep its row and column completable; the letters are then written and
    /// the full grid revalidated. Any failure leaves the grid exactly as it
    /// was.
    pub fn place(
        &mut self,
        index: &PatternIndex,
        sink: &ArtifactSink,
        placement: &WordPlacement,
    ) -> Result<(), PlaceError> {
        self.can_place(placement)?;

        for ((row, col), letter) in placement.cells() {
            let row_state = self.row_state(row).with_letter(col, letter);
            let col_state = self.col_state(col).with_letter(row, letter);
            if !index.completable(&row_state) || !index.completable(&col_state) {
                return Err(PlaceError::ValidationFailed);
            }
        }

        let cells_backup = self.cells.clone();
        let filled_backup = self.filled_cells;

        for ((row, col), letter) in placement.cells() {
            if self.get(row, col).is_none() {
                self.cells[row * GRID_SIZE + col] = Some(letter);
                self.filled_cells += 1;
            }
        }
        self.placements.push(placement.clone());
        self.placed_words.insert(placement.word.clone());

        // Near-complete states are worth keeping even when the validation
        // below is about to reject them
        sink.observe(index, self);

        if self.validate_state(index) {
            Ok(())
        } else {
            self.cells = cells_backup;
            self.filled_cells = filled_backup;
            self.placements.pop();
            self.placed_words.remove(&placement.word);
            Err(PlaceError::ValidationFailed)
        }
    }

    /// Remove the most recent placement, clearing only the cells no other
    /// placement still covers
    pub fn unplace_last(&mut self) -> Option<WordPlacement> {
        let last = self.placements.pop()?;
        self.placed_words.remove(&last.word);

        let covered: HashSet<(usize, usize)> = self
            .placements
            .iter()
            .flat_map(|placement| placement.positions())
            .collect();
        for (row, col) in last.positions() {
            if !covered.contains(&(row, col)) && self.cells[row * GRID_SIZE + col].take().is_some()
            {
                self.filled_cells -= 1;
            }
        }
        Some(last)
    }

    /// Full-grid validation: every line must stay completable and every
    /// assigned cell must keep a wordful liner reachable both ways
    fn validate_state(&self, index: &PatternIndex) -> bool {
        for i in 0..GRID_SIZE {
            if !index.completable(&self.row_state(i)) || !index.completable(&self.col_state(i)) {
                return false;
            }
        }

        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if self.get(row, col).is_some()
                    && (!index.wordful(&self.row_state(row))
                        || !index.wordful(&self.col_state(col)))
                {
                    return false;
                }
            }
        }
        true
    }

    /// The looser emission criterion: every row and column decomposes into
    /// checkable words around the unassigned cells
    pub fn is_solvable(&self, index: &PatternIndex) -> bool {
        (0..GRID_SIZE).all(|i| {
            index.solvable_line(&self.row_state(i)) && index.solvable_line(&self.col_state(i))
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                match self.get(row, col) {
                    None => f.write_char('.')?,
                    Some(letter) => f.write_char(letter.as_char())?,
                }
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlaceError::ConflictLetter => write!(f, "a cell already holds a different letter"),
            PlaceError::OutOfBounds => write!(f, "the word does not fit inside the grid"),
            PlaceError::DuplicateWord => write!(f, "the word is already placed"),
            PlaceError::ValidationFailed => write!(f, "a line constraint rejected the placement"),
        }
    }
}

impl error::Error for PlaceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lexicon::Lexicon;
    use crate::models::placement::Direction;
    use std::convert::TryFrom;

    const SQUARE: [&str; 5] = ["sator", "arepo", "tenet", "opera", "rotas"];

    fn square_index() -> PatternIndex {
        PatternIndex::build(Lexicon::from_lines(SQUARE.iter().copied()))
    }

    fn placement(word: &str, row: usize, col: usize, direction: Direction) -> WordPlacement {
        WordPlacement::new(Word::try_from(word).unwrap(), row, col, direction)
    }

    #[test]
    fn rejects_duplicate_words() {
        let index = square_index();
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();

        grid.place(&index, &sink, &placement("sator", 0, 0, Direction::Horizontal))
            .unwrap();
        assert_eq!(
            grid.place(&index, &sink, &placement("sator", 2, 0, Direction::Horizontal)),
            Err(PlaceError::DuplicateWord)
        );
    }

    #[test]
    fn rejects_out_of_bounds() {
        let index = square_index();
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();

        assert_eq!(
            grid.place(&index, &sink, &placement("sator", 0, 1, Direction::Horizontal)),
            Err(PlaceError::OutOfBounds)
        );
        assert_eq!(
            grid.place(&index, &sink, &placement("sator", 1, 0, Direction::Vertical)),
            Err(PlaceError::OutOfBounds)
        );
    }

    #[test]
    fn rejects_conflicting_letters() {
        let index = square_index();
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();

        grid.place(&index, &sink, &placement("sator", 0, 0, Direction::Horizontal))
            .unwrap();
        assert_eq!(
            grid.place(&index, &sink, &placement("tenet", 0, 0, Direction::Vertical)),
            Err(PlaceError::ConflictLetter)
        );
    }

    #[test]
    fn validation_failure_leaves_the_grid_untouched() {
        let index = square_index();
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();

        grid.place(&index, &sink, &placement("sator", 0, 0, Direction::Horizontal))
            .unwrap();
        let before = grid.clone();

        // No word continues s..t in a column, so the placement must bounce
        assert_eq!(
            grid.place(&index, &sink, &placement("tenet", 3, 0, Direction::Horizontal)),
            Err(PlaceError::ValidationFailed)
        );
        assert_eq!(grid, before);
        assert_eq!(grid.signature(), before.signature());
    }

    #[test]
    fn place_and_unplace_round_trip() {
        let index = square_index();
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();
        let empty_signature = grid.signature();

        grid.place(&index, &sink, &placement("sator", 0, 0, Direction::Horizontal))
            .unwrap();
        // Crosses the first placement at (0,1)
        grid.place(&index, &sink, &placement("arepo", 0, 1, Direction::Vertical))
            .unwrap();
        assert_eq!(grid.filled_cells(), 9);

        grid.unplace_last().unwrap();
        assert_eq!(grid.signature(), "sator--------------------");
        assert_eq!(grid.filled_cells(), 5);

        grid.unplace_last().unwrap();
        assert_eq!(grid.signature(), empty_signature);
        assert_eq!(grid.filled_cells(), 0);
        assert!(grid.placements().is_empty());
        assert!(grid.unplace_last().is_none());
    }
}
