use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PuzzleType {
    ShapeMatching,
    ColorSorting,
    PatternCompletion,
    NumberSequence,
    Jigsaw,
}

impl Default for PuzzleType {
    fn default() -> Self {
        PuzzleType::ShapeMatching
    }
}

impl PuzzleType {
    pub fn all() -> Vec<PuzzleType> {
        vec![
            PuzzleType::ShapeMatching,
            PuzzleType::ColorSorting,
            PuzzleType::PatternCompletion,
            PuzzleType::NumberSequence,
            PuzzleType::Jigsaw,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            PuzzleType::ShapeMatching => 0,
            PuzzleType::ColorSorting => 1,
            PuzzleType::PatternCompletion => 2,
            PuzzleType::NumberSequence => 3,
            PuzzleType::Jigsaw => 4,
        }
    }

    /// Sorting puzzles pair pieces with bins by attribute; every other kind has a
    /// one-to-one solution map.
    pub fn uses_solution_map(&self) -> bool {
        !matches!(self, PuzzleType::ColorSorting)
    }
}
