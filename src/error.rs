use thiserror::Error;

use crate::ids::{PlayerId, RoomId};

/// Crate-wide error type. Pure engines (word-formation, practice, family index)
/// surface narrower tagged results of their own ([`ClaimFailure`](crate::engine::claims::ClaimFailure));
/// this enum is what the room state machine and registry convert those into,
/// plus the failures that only make sense at the room/registry boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A room command was issued for a room id the registry doesn't know.
    #[error("room {0:?} not found")]
    RoomNotFound(RoomId),

    /// `room:join` with a full room.
    #[error("room {0:?} is full")]
    RoomFull(RoomId),

    /// `room:join` with a private room and a wrong/missing join code.
    #[error("wrong join code for room {0:?}")]
    WrongCode(RoomId),

    /// A command issuer is already a participant of another room.
    #[error("player {0:?} is already in a room")]
    AlreadyInRoom(PlayerId),

    /// A command requires the caller to be a specific player (e.g. the host or the turn player).
    #[error("player {0:?} may not perform this action")]
    NotAuthorized(PlayerId),

    /// `game:flip` issued out of turn.
    #[error("it is not player {0:?}'s turn")]
    NotYourTurn(PlayerId),

    /// A command that requires a specific game state was issued while the state machine was elsewhere.
    #[error("room {0:?} is not in the required state for this command")]
    WrongState(RoomId),

    /// `game:claim-intent` while the caller is on cooldown.
    #[error("player {0:?} is on cooldown")]
    OnCooldown(PlayerId),

    /// A claim was rejected; carries the exact client-facing message from §7.
    #[error("{0}")]
    ClaimRejected(String),

    /// `room:start` with fewer than [`crate::constants::MIN_PLAYERS`] players, or by a non-host.
    #[error("room {0:?} cannot be started")]
    CannotStart(RoomId),

    /// A practice/puzzle submission references a puzzle the engine never generated or could not parse.
    #[error("custom puzzle is invalid or has no valid plays")]
    InvalidCustomPuzzle,

    /// `replay:analyze-step` / `replay:analyze-imported-step` failed; carries a reason.
    #[error("replay analysis failed: {0}")]
    ReplayAnalysisFailed(String),

    /// Malformed replay file per the §6 parser contract.
    #[error("malformed replay file: {0}")]
    ReplayFileInvalid(String),

    /// An internal invariant (tile conservation, single-claim-window, …) was violated.
    /// The room that raises this transitions to `ended` rather than risk corrupting state further.
    #[error("internal invariant violated in room {0:?}: {1}")]
    InvariantViolated(RoomId, String),
}

pub type Result<T> = std::result::Result<T, Error>;
