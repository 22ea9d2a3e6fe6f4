pub mod achievements;
pub mod kv_store;
pub mod layout_generator;
pub mod progression;
pub mod rewards;
pub mod session;
pub mod settings;

pub use achievements::{Achievements, SystemClock, WallClock};
pub use kv_store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use layout_generator::{LayoutGenerator, StandardLayoutGenerator};
pub use progression::Progression;
pub use session::{PuzzleSession, SessionConfig};
pub use settings::Settings;
