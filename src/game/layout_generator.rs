use itertools::Itertools;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{
    AttributeKey, AttributeValue, Attributes, Difficulty, Piece, PieceColor, PieceId, Position,
    PuzzleLayout, PuzzleType, Shape, SolutionMap, Target, TargetId,
};

pub const SHAPES: [Shape; 6] = [
    Shape::Circle,
    Shape::Square,
    Shape::Triangle,
    Shape::Star,
    Shape::Heart,
    Shape::Diamond,
];

pub const SHAPE_COLORS: [PieceColor; 6] = [
    PieceColor::Red,
    PieceColor::Blue,
    PieceColor::Green,
    PieceColor::Yellow,
    PieceColor::Magenta,
    PieceColor::Cyan,
];

pub const SORT_COLORS: [PieceColor; 4] = [
    PieceColor::Red,
    PieceColor::Blue,
    PieceColor::Green,
    PieceColor::Yellow,
];

const TARGETS_PER_ROW: usize = 5;
const TARGET_SPACING: f32 = 2.0;
const TARGET_TOP_ROW_Y: f32 = -3.0;
const PIECE_AREA_X: (f32, f32) = (-4.0, 4.0);
const PIECE_AREA_Y: (f32, f32) = (1.0, 4.0);

/// Produces the pieces, targets and solution for a puzzle. Sessions call this
/// once per start.
pub trait LayoutGenerator {
    fn generate(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> PuzzleLayout;
}

/// Built-in layouts for every [`PuzzleType`]. Output depends only on the
/// puzzle type, difficulty and (optional) explicit seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayoutGenerator {
    seed: Option<u64>,
}

impl StandardLayoutGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn seed_for(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> u64 {
        let base = self.seed.unwrap_or(0);
        splitmix64(base ^ ((puzzle_type.index() as u64) << 8) ^ difficulty.level() as u64)
    }
}

impl LayoutGenerator for StandardLayoutGenerator {
    fn generate(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> PuzzleLayout {
        let seed = self.seed_for(puzzle_type, difficulty);
        let mut rng = StdRng::seed_from_u64(seed);
        let count = difficulty.piece_count();

        let layout = match puzzle_type {
            PuzzleType::ShapeMatching => shape_matching(count, &mut rng),
            PuzzleType::ColorSorting => color_sorting(count, &mut rng),
            PuzzleType::PatternCompletion => pattern_completion(count, &mut rng),
            PuzzleType::NumberSequence => one_to_one(count, &mut rng, |i| {
                (AttributeKey::Number, AttributeValue::Number(i as i32 + 1))
            }),
            PuzzleType::Jigsaw => one_to_one(count, &mut rng, |i| {
                (AttributeKey::JigsawId, AttributeValue::Jigsaw(i as u32))
            }),
        };

        debug!(
            target: "layout",
            "Generated {:?} layout for {}: {} pieces, {} targets, {} solution entries; seed: {}",
            puzzle_type,
            difficulty,
            layout.pieces.len(),
            layout.targets.len(),
            layout.solution.len(),
            seed
        );
        trace!(target: "layout", "Layout: {:?}", layout);
        layout
    }
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn target_position(index: usize) -> Position {
    let row = index / TARGETS_PER_ROW;
    let col = index % TARGETS_PER_ROW;
    let half_width = (TARGETS_PER_ROW - 1) as f32 / 2.0;
    Position::new(
        (col as f32 - half_width) * TARGET_SPACING,
        TARGET_TOP_ROW_Y - row as f32 * TARGET_SPACING,
    )
}

/// Start positions are cosmetic; they only keep pieces away from the slots.
fn scattered_position(rng: &mut StdRng) -> Position {
    Position::new(
        rng.random_range(PIECE_AREA_X.0..PIECE_AREA_X.1),
        rng.random_range(PIECE_AREA_Y.0..PIECE_AREA_Y.1),
    )
}

fn shape_matching(count: usize, rng: &mut StdRng) -> PuzzleLayout {
    one_to_one_with(count, rng, |i| {
        Attributes::new()
            .with(AttributeKey::Shape, AttributeValue::Shape(SHAPES[i % SHAPES.len()]))
            .with(
                AttributeKey::Color,
                AttributeValue::Color(SHAPE_COLORS[i % SHAPE_COLORS.len()]),
            )
    })
}

fn one_to_one<F>(count: usize, rng: &mut StdRng, attribute: F) -> PuzzleLayout
where
    F: Fn(usize) -> (AttributeKey, AttributeValue),
{
    one_to_one_with(count, rng, |i| {
        let (key, value) = attribute(i);
        Attributes::new().with(key, value)
    })
}

/// Piece `i` carries `attributes(i)`, target `i` requires the same, solution `i -> i`.
fn one_to_one_with<F>(count: usize, rng: &mut StdRng, attributes: F) -> PuzzleLayout
where
    F: Fn(usize) -> Attributes,
{
    let mut layout = PuzzleLayout::default();
    for i in 0..count {
        let attributes = attributes(i);
        let piece_id = PieceId(i as u32);
        let target_id = TargetId(i as u32);
        layout.pieces.push(Piece::new(
            piece_id,
            attributes.clone(),
            scattered_position(rng),
        ));
        layout
            .targets
            .push(Target::accepting(target_id, attributes, target_position(i)));
        layout.solution.insert(piece_id, target_id);
    }
    layout
}

fn color_sorting(count: usize, rng: &mut StdRng) -> PuzzleLayout {
    let pieces = (0..count)
        .map(|i| {
            let color = SORT_COLORS[i % SORT_COLORS.len()];
            Piece::new(
                PieceId(i as u32),
                Attributes::new().with(AttributeKey::Color, AttributeValue::Color(color)),
                scattered_position(rng),
            )
        })
        .collect_vec();

    let bins = SORT_COLORS
        .iter()
        .enumerate()
        .map(|(i, color)| {
            Target::accepting(
                TargetId(i as u32),
                Attributes::new().with(AttributeKey::Color, AttributeValue::Color(*color)),
                target_position(i),
            )
        })
        .collect_vec();

    PuzzleLayout::new(pieces, bins, SolutionMap::new())
}

/// An arithmetic run of `count + 2` values with `count` of them blanked out; each
/// blank is a slot and the missing value is a piece.
fn pattern_completion(count: usize, rng: &mut StdRng) -> PuzzleLayout {
    let start: i32 = rng.random_range(1..=5);
    let step: i32 = rng.random_range(1..=3);
    let sequence = (0..count + 2)
        .map(|i| start + step * i as i32)
        .collect_vec();

    let mut indices = (0..sequence.len()).collect_vec();
    indices.shuffle(rng);
    let blanks = indices.into_iter().take(count).sorted().collect_vec();
    trace!(target: "layout", "Pattern {:?}, blanks at {:?}", sequence, blanks);

    let mut layout = PuzzleLayout::default();
    for (slot, &index) in blanks.iter().enumerate() {
        let value = sequence[index];
        let attributes =
            Attributes::new().with(AttributeKey::PatternValue, AttributeValue::Pattern(value));
        let piece_id = PieceId(slot as u32);
        let target_id = TargetId(index as u32);
        layout.pieces.push(Piece::new(
            piece_id,
            attributes.clone(),
            scattered_position(rng),
        ));
        layout
            .targets
            .push(Target::accepting(target_id, attributes, target_position(index)));
        layout.solution.insert(piece_id, target_id);
    }
    layout
}
