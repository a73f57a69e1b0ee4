//! Numeric constants the runtime must honor, per the external interface contract.

/// Minimum length of any claimed word, center-formed or stolen.
pub const MIN_WORD_LENGTH: usize = 4;

/// Duration of the visual reveal interval after a flip, before the tile lands in the center.
pub const DEFAULT_FLIP_REVEAL_MS: i64 = 1000;

/// Inclusive range for a room's claim-window duration, in seconds.
pub const CLAIM_TIMER_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Inclusive range for a room's auto-flip timer, in seconds.
pub const FLIP_TIMER_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// Fixed countdown once the bag empties and the center still holds tiles.
pub const END_COUNTDOWN_SECONDS: u32 = 60;

/// Maximum number of players a room accepts.
pub const MAX_PLAYERS: usize = 8;

/// Minimum number of players a room accepts.
pub const MIN_PLAYERS: usize = 2;
