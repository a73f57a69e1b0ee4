//! The room/game runtime (§4.5–§4.7): data model, pre-steal arbitration, the synchronous state
//! machine, the timer scheduler, and the async handle that glues the scheduler to real time.
pub mod handle;
pub mod prestal;
pub mod state_machine;
pub mod timer;
pub mod types;

pub use handle::RoomHandle;
pub use state_machine::ClaimOutcome;
pub use types::{Game, GameStatus, Player, Room, RoomConfig, RoomMeta, RoomSummary, Spectator};
