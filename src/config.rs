/// Side length of the square grid, which is also the longest placeable word
pub const GRID_SIZE: usize = 5;

/// Shortest word the filler will place or accept inside a line decomposition
pub const MIN_WORD_LENGTH: usize = 4;
