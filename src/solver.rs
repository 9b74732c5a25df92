use crate::config::GRID_SIZE;
use crate::models::grid::Grid;
use crate::models::pattern::{Liner, LinerCell, LineState};
use crate::models::pattern_index::PatternIndex;
use crate::models::placement::{Direction, WordPlacement};
use crate::models::word::Word;
use crate::sink::ArtifactSink;
use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::error;
use std::fmt;
use std::time::UNIX_EPOCH;

/// Liner patterns for a line are enumerated exhaustively only up to this
/// many unassigned cells; above it only the quick patterns are tried
const CANDIDATE_SEARCH_LIMIT: usize = 3;

/// The search hit its attempts ceiling before exhausting the tree
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AttemptsExhausted {
    pub attempts: u64,
}

impl fmt::Display for AttemptsExhausted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "the attempts ceiling ({}) was reached", self.attempts)
    }
}

impl error::Error for AttemptsExhausted {}

/// Depth-first backtracking filler. The pattern index is shared read-only;
/// all mutable search state lives here and on the recursion stack.
pub struct Solver<'a> {
    index: &'a PatternIndex,
    sink: &'a ArtifactSink,
    rng: SmallRng,
    attempts: u64,
    max_attempts: u64,
    visited: HashSet<String>,
}

impl<'a> Solver<'a> {
    pub fn new(
        index: &'a PatternIndex,
        sink: &'a ArtifactSink,
        max_attempts: u64,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(time_seed);
        log::info!("Search seed: {}", seed);

        Solver {
            index,
            sink,
            rng: SmallRng::seed_from_u64(seed),
            attempts: 0,
            max_attempts,
            visited: HashSet::new(),
        }
    }

    /// Search for a fully assigned grid. `Ok(None)` means every branch from
    /// the empty grid was explored without success.
    pub fn solve(&mut self) -> Result<Option<Grid>, AttemptsExhausted> {
        self.attempts = 0;
        self.visited.clear();

        log::info!(
            "Starting search: {} placeable words ({} full-length), {} liners, ceiling {}",
            self.index.placeable_words().len(),
            self.index
                .placeable_words()
                .iter()
                .filter(|word| word.len() == GRID_SIZE)
                .count(),
            self.index.liners().len(),
            self.max_attempts
        );

        let result = self.dfs(&Grid::new(), &[])?;
        match &result {
            Some(_) => log::info!("Solution found after {} attempts", self.attempts),
            None => log::info!("Search exhausted after {} attempts", self.attempts),
        }
        Ok(result)
    }

    fn dfs(
        &mut self,
        grid: &Grid,
        history: &[WordPlacement],
    ) -> Result<Option<Grid>, AttemptsExhausted> {
        self.attempts += 1;
        if self.attempts > self.max_attempts {
            return Err(AttemptsExhausted {
                attempts: self.max_attempts,
            });
        }
        self.sink.set_attempts(self.attempts);

        let signature = grid.signature();
        if self.visited.contains(&signature) {
            return Ok(None);
        }

        if self.attempts % 1000 == 0 {
            log::debug!(
                "Attempt {}: {} words placed\n{}",
                self.attempts,
                grid.placements().len(),
                grid
            );
        }

        if grid.is_complete() {
            return Ok(Some(grid.clone()));
        }

        let mut candidates = self.candidate_placements(grid);
        candidates.retain(|candidate| !history.contains(candidate));
        if candidates.is_empty() {
            self.visited.insert(signature);
            return Ok(None);
        }

        for candidate in candidates {
            // Each branch gets a fresh grid built by replaying the current
            // placements; a replay that no longer validates skips the branch
            let mut next = Grid::new();
            if !self.replay(&mut next, grid) {
                continue;
            }

            if next.place(self.index, self.sink, &candidate).is_ok() {
                let mut next_history = history.to_vec();
                next_history.push(candidate);
                if let Some(solution) = self.dfs(&next, &next_history)? {
                    return Ok(Some(solution));
                }
            }
        }

        self.visited.insert(signature);
        Ok(None)
    }

    fn replay(&self, target: &mut Grid, source: &Grid) -> bool {
        source
            .placements()
            .iter()
            .all(|placement| target.place(self.index, self.sink, placement).is_ok())
    }

    /// Enumerate candidate placements over all rows and columns, keeping
    /// only the most constraining bucket: full-line words when any exist,
    /// the shorter words otherwise. The chosen bucket is shuffled.
    fn candidate_placements(&mut self, grid: &Grid) -> Vec<WordPlacement> {
        let mut full_length = Vec::new();
        let mut shorter = Vec::new();

        for row in 0..GRID_SIZE {
            let state = grid.row_state(row);
            if !state.is_fully_assigned() {
                for placement in self.placements_for_line(&state, row, Direction::Horizontal) {
                    if grid.placed_words().contains(&placement.word) {
                        continue;
                    }
                    if placement.word.len() == GRID_SIZE {
                        full_length.push(placement);
                    } else {
                        shorter.push(placement);
                    }
                }
            }
        }
        for col in 0..GRID_SIZE {
            let state = grid.col_state(col);
            if !state.is_fully_assigned() {
                for placement in self.placements_for_line(&state, col, Direction::Vertical) {
                    if grid.placed_words().contains(&placement.word) {
                        continue;
                    }
                    if placement.word.len() == GRID_SIZE {
                        full_length.push(placement);
                    } else {
                        shorter.push(placement);
                    }
                }
            }
        }

        let mut chosen = if !full_length.is_empty() {
            full_length
        } else {
            shorter
        };
        chosen.shuffle(&mut self.rng);
        chosen
    }

    /// Placements for one line: stored liners consistent with the state,
    /// their intermediaries, the words behind those, and every offset where
    /// a word fits both the liner and the line
    fn placements_for_line(
        &self,
        state: &LineState,
        line_index: usize,
        direction: Direction,
    ) -> Vec<WordPlacement> {
        let mut placements = Vec::new();

        for liner in self.liner_patterns(state) {
            let intermediaries = match self.index.intermediaries_for(&liner) {
                Some(intermediaries) => intermediaries,
                None => continue,
            };
            for intermediary in intermediaries {
                let words = match self.index.words_for(intermediary) {
                    Some(words) => words,
                    None => continue,
                };
                for word in words {
                    for offset in word_offsets(word, &liner, state) {
                        let placement = match direction {
                            Direction::Horizontal => {
                                WordPlacement::new(word.clone(), line_index, offset, direction)
                            }
                            Direction::Vertical => {
                                WordPlacement::new(word.clone(), offset, line_index, direction)
                            }
                        };
                        placements.push(placement);
                    }
                }
            }
        }

        placements
    }

    /// Stored liners the line state could still become: the full `2^k`
    /// envelope for small `k`, four quick patterns otherwise
    fn liner_patterns(&self, state: &LineState) -> Vec<Liner> {
        let unassigned = state.unassigned_positions();
        if unassigned.is_empty() {
            let liner = state.complete(&[]);
            return if self.index.contains_liner(&liner) {
                vec![liner]
            } else {
                Vec::new()
            };
        }

        let k = unassigned.len();
        let mut patterns = Vec::new();
        if k <= CANDIDATE_SEARCH_LIMIT {
            for mask in 0u32..(1 << k) {
                let fills = (0..k)
                    .map(|i| {
                        if mask & (1 << i) != 0 {
                            LinerCell::Blocked
                        } else {
                            LinerCell::Free
                        }
                    })
                    .collect_vec();
                patterns.push(state.complete(&fills));
            }
        } else {
            patterns.push(state.complete_all(LinerCell::Free));
            patterns.push(state.complete_all(LinerCell::Blocked));
            let mid = k / 2;
            for (first, second) in [
                (LinerCell::Free, LinerCell::Blocked),
                (LinerCell::Blocked, LinerCell::Free),
            ] {
                let fills = (0..k)
                    .map(|i| if i < mid { first } else { second })
                    .collect_vec();
                patterns.push(state.complete(&fills));
            }
        }

        patterns.retain(|liner| self.index.contains_liner(liner));
        patterns
    }
}

/// Every offset where the word fits the liner (a free slot or the same
/// letter, never a blocked cell) and the line state (unassigned or the same
/// letter)
fn word_offsets(word: &Word, liner: &Liner, state: &LineState) -> Vec<usize> {
    let mut offsets = Vec::new();
    if word.len() > GRID_SIZE {
        return offsets;
    }

    for start in 0..=(GRID_SIZE - word.len()) {
        let fits = word.letters().iter().enumerate().all(|(i, &letter)| {
            let liner_ok = match liner.cells()[start + i] {
                LinerCell::Blocked => false,
                LinerCell::Free => true,
                LinerCell::Letter(fixed) => fixed == letter,
            };
            let state_ok = match state.cells()[start + i] {
                None => true,
                Some(current) => current == letter,
            };
            liner_ok && state_ok
        });
        if fits {
            offsets.push(start);
        }
    }
    offsets
}

fn time_seed() -> u64 {
    UNIX_EPOCH.elapsed().map_or(0, |elapsed| elapsed.as_secs())
}
