#![deny(clippy::wrong_pub_self_convention, clippy::used_underscore_binding,
   clippy::map_unwrap_or,
   clippy::int_plus_one, clippy::string_add_assign, clippy::if_not_else,
   clippy::invalid_upcast_comparisons,
   clippy::mutex_integer, clippy::mut_mut, clippy::items_after_statements,
   clippy::print_stdout, clippy::mem_forget, clippy::maybe_infinite_iter)]

//! The authoritative multiplayer engine for an Anagram-Thief-style word game: players share a
//! revealed letter pool, race to form or steal words under short claim windows, and see
//! real-time state synchronized across participants and spectators.
//!
//! The crate is organized in three layers:
//! - Pure engines with no notion of time or networking: [`tiles`], [`letter_bag`],
//!   [`dictionary`], [`family`], and [`engine`] (word-formation and the practice/puzzle solver).
//! - The per-room state machine and its async concurrency glue: [`room`], which owns timers via
//!   [`room::timer`] and records [`replay`] steps as the game progresses.
//! - The process-wide directory and transport-agnostic command surface: [`registry`] and
//!   [`events`].
pub mod constants;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod events;
pub mod family;
pub mod ids;
pub mod letter_bag;
pub mod projection;
pub mod registry;
pub mod replay;
pub mod room;
pub mod tiles;

pub use crate::dictionary::Dictionary;
pub use crate::error::{Error, Result};
pub use crate::events::{Dispatcher, Inbound, Outbound};
pub use crate::ids::{ClaimEventId, PlayerId, PreStealEntryId, RoomId, SpectatorId, WordId};
pub use crate::projection::{project, GameState, ViewerKind};
pub use crate::registry::Registry;
pub use crate::room::{ClaimOutcome, Game, GameStatus, Player, Room, RoomConfig, RoomHandle, RoomMeta, RoomSummary, Spectator};
