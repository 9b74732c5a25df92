use crate::models::letter::Letter;
use crate::models::word::Word;
use std::fmt;

/// The two directions a word can run in
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// A word committed to the grid at a given cell, running in a direction
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WordPlacement {
    pub word: Word,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

impl WordPlacement {
    pub fn new(word: Word, row: usize, col: usize, direction: Direction) -> Self {
        WordPlacement {
            word,
            row,
            col,
            direction,
        }
    }

    /// All grid positions the word occupies
    pub fn positions(&self) -> Vec<(usize, usize)> {
        self.cells().map(|(position, _)| position).collect()
    }

    /// All grid positions paired with the letter written there
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Letter)> + '_ {
        let (row, col, direction) = (self.row, self.col, self.direction);
        self.word
            .letters()
            .iter()
            .enumerate()
            .map(move |(i, &letter)| match direction {
                Direction::Horizontal => ((row, col + i), letter),
                Direction::Vertical => ((row + i, col), letter),
            })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Horizontal => write!(f, "horizontal"),
            Direction::Vertical => write!(f, "vertical"),
        }
    }
}

impl fmt::Display for WordPlacement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' at ({},{}) {}",
            self.word, self.row, self.col, self.direction
        )
    }
}
