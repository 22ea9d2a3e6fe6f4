mod achievement;
mod attribute;
mod completion_result;
mod difficulty;
mod level_record;
mod piece;
mod placement;
mod position;
mod puzzle_layout;
mod puzzle_type;
mod reward_event;
mod session_clock;
mod session_event;
mod session_state;
mod target;

pub use achievement::{Achievement, DailyReward, Milestones, DAILY_REWARDS, SPEED_MASTER_TIME};
pub use attribute::{AttributeKey, AttributeValue, Attributes, PieceColor, Shape};
pub use completion_result::CompletionResult;
pub use difficulty::Difficulty;
pub use level_record::{DifficultyTotals, LevelRecord};
pub use piece::{Piece, PieceId};
pub use placement::{HintOutcome, NoOpReason, PlacementOutcome, SessionError};
pub use position::Position;
pub use puzzle_layout::{LayoutError, PuzzleLayout, SolutionMap};
pub use puzzle_type::PuzzleType;
pub use reward_event::RewardEvent;
pub use session_clock::SessionClock;
pub use session_event::SessionEvent;
pub use session_state::SessionState;
pub use target::{Acceptance, Target, TargetId};
