//! Match lifecycle: domain types, session state and turn orchestration.

mod orchestrator;
mod phase;
mod state;
mod types;

pub use orchestrator::{AudioCue, GameEvent, Orchestrator};
pub use phase::Phase;
pub use state::{BoardSnapshot, MatchSettings, MatchSetup, MatchState};
pub use types::{Coord, Mode, RoundEntry, Side, Winner};
