//! The two pure engines at the technical heart of the system: word-formation (§4.1) and the
//! practice/puzzle solver built on top of it (§4.8). Neither module knows anything about
//! rooms, timers, or players beyond the bare `PlayerId`/`WordId` needed to label a claim's
//! origin — everything here is synchronous and side-effect free.
pub mod claims;
pub mod practice;

pub use claims::{enumerate, validate_claim, ClaimFailure, ClaimOption, ClaimSource, ExistingWord};
pub use practice::{evaluate, generate, solve, Evaluation, Outcome, Puzzle};
