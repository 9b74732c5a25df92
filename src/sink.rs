use crate::config::GRID_SIZE;
use crate::models::grid::Grid;
use crate::models::letter::Letter;
use crate::models::pattern_index::PatternIndex;
use crate::utils::create_file;
use anyhow::Error;
use itertools::Itertools;
use std::cell::Cell;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives near-complete grids during the search. Writes are best-effort:
/// failures are logged and never disturb the search.
#[derive(Debug)]
pub struct ArtifactSink {
    solvables: PathBuf,
    close_calls: PathBuf,
    attempts: Cell<u64>,
    enabled: bool,
}

impl ArtifactSink {
    pub fn new(solvables: PathBuf, close_calls: PathBuf) -> Result<Self, Error> {
        fs::create_dir_all(&solvables)?;
        fs::create_dir_all(&close_calls)?;
        Ok(ArtifactSink {
            solvables,
            close_calls,
            attempts: Cell::new(0),
            enabled: true,
        })
    }

    /// A sink that drops everything; used by tests and dry runs
    pub fn disabled() -> Self {
        ArtifactSink {
            solvables: PathBuf::new(),
            close_calls: PathBuf::new(),
            attempts: Cell::new(0),
            enabled: false,
        }
    }

    /// Keep the attempt counter current so saved headers are accurate
    pub fn set_attempts(&self, attempts: u64) {
        self.attempts.set(attempts);
    }

    /// Emit the grid when it is close enough to completion: decomposably
    /// solvable grids go to the solvables directory, the rest become close
    /// calls one cell later
    pub fn observe(&self, index: &PatternIndex, grid: &Grid) {
        if !self.enabled {
            return;
        }

        let near = (GRID_SIZE + 1) / 2;
        let empty = grid.unassigned_cells();
        if empty > near {
            return;
        }

        if grid.is_solvable(index) {
            self.write(&self.solvables, grid);
        } else if empty < near {
            self.write(&self.close_calls, grid);
        }
    }

    fn write(&self, dir: &Path, grid: &Grid) {
        if let Err(error) = write_grid(dir, grid, self.attempts.get()) {
            log::warn!("Failed to save grid artifact: {:#}", error);
        }
    }
}

fn write_grid(dir: &Path, grid: &Grid, attempts: u64) -> Result<(), Error> {
    let mut file = create_file(artifact_path(dir, grid))?;

    writeln!(file, "Grid saved at attempt {}", attempts)?;
    writeln!(
        file,
        "Filled cells: {}/{}",
        grid.filled_cells(),
        GRID_SIZE * GRID_SIZE
    )?;
    writeln!(file, "Words placed: {}", grid.placements().len())?;
    writeln!(file)?;
    writeln!(file, "Grid:")?;
    write!(file, "{}", render_grid(grid))?;

    writeln!(file)?;
    writeln!(file, "Placed words:")?;
    for (i, placement) in grid.placements().iter().enumerate() {
        writeln!(file, "{:2}. {}", i + 1, placement)?;
    }

    writeln!(file)?;
    writeln!(file, "Unique words placed ({}):", grid.placed_words().len())?;
    for (i, word) in grid.placed_words().iter().enumerate() {
        writeln!(file, "{:2}. {}", i + 1, word)?;
    }

    Ok(())
}

fn artifact_path(dir: &Path, grid: &Grid) -> PathBuf {
    dir.join(format!(
        "grid_{}x{}_{}_empty_{}.txt",
        GRID_SIZE,
        GRID_SIZE,
        grid.unassigned_cells(),
        grid.signature()
    ))
}

/// Rows prefixed with their index, unassigned cells shown as `·`
fn render_grid(grid: &Grid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "   {}", (0..GRID_SIZE).format(" "));
    for row in 0..GRID_SIZE {
        let cells = (0..GRID_SIZE)
            .map(|col| grid.get(row, col).map_or('·', Letter::as_char))
            .format(" ");
        let _ = writeln!(out, " {} {}", row, cells);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lexicon::Lexicon;
    use crate::models::placement::{Direction, WordPlacement};
    use crate::models::word::Word;
    use std::convert::TryFrom;

    fn grid_with_sator() -> Grid {
        let index = PatternIndex::build(Lexicon::from_lines(
            ["sator", "arepo", "tenet", "opera", "rotas"].iter().copied(),
        ));
        let sink = ArtifactSink::disabled();
        let mut grid = Grid::new();
        let placement = WordPlacement::new(
            Word::try_from("sator").unwrap(),
            0,
            0,
            Direction::Horizontal,
        );
        grid.place(&index, &sink, &placement).unwrap();
        grid
    }

    #[test]
    fn artifact_file_name() {
        let grid = grid_with_sator();
        let path = artifact_path(Path::new("solvables"), &grid);
        assert_eq!(
            path.to_str().unwrap(),
            "solvables/grid_5x5_20_empty_sator--------------------.txt"
        );
    }

    #[test]
    fn grid_rendering() {
        let rendered = render_grid(&grid_with_sator());
        assert_eq!(rendered.lines().next().unwrap(), "   0 1 2 3 4");
        assert!(rendered.contains(" 0 s a t o r"));
        assert!(rendered.contains(" 1 · · · · ·"));
    }
}
