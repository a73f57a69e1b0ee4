//! Per-room timer scheduler (§4.4): five cancelable slots, each guarded by an opaque
//! generation token so a canceled-and-rescheduled timer can never act twice or act stale.
//!
//! This module is intentionally synchronous and side-effect free — it just hands out and
//! checks tokens. The actual sleeping (`tokio::time::sleep`) lives in [`super::handle`], which
//! arms a slot, stores the token it gets back, sleeps, then re-checks the token before taking
//! the room lock and applying the timeout. That split is what makes "cancel, then reschedule"
//! race-free without needing to abort an in-flight task: a canceled timer simply finds its
//! token stale when it wakes up and does nothing.
use std::collections::HashMap;

use crate::ids::PlayerId;

/// An opaque token returned by arming a slot. Only equality is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

/// The five named timer slots from §4.4. `ClaimCooldown` is further keyed by player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    AutoFlip,
    PendingFlipReveal,
    ClaimWindow,
    ClaimCooldown(PlayerId),
    EndCountdown,
}

/// Tracks the current token per slot. Arming a slot bumps its generation and invalidates any
/// previously-armed token for that slot; canceling does the same without producing a new token
/// a caller would use.
#[derive(Debug, Clone, Default)]
pub struct TimerScheduler {
    next: u64,
    current: HashMap<SlotKey, u64>,
}

/// `Slot` isn't `Eq`-friendly as a `HashMap` key once `PlayerId` is involved across many
/// players, so key on a flattened representation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SlotKey {
    AutoFlip,
    PendingFlipReveal,
    ClaimWindow,
    ClaimCooldown(PlayerId),
    EndCountdown,
}

impl From<Slot> for SlotKey {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::AutoFlip => SlotKey::AutoFlip,
            Slot::PendingFlipReveal => SlotKey::PendingFlipReveal,
            Slot::ClaimWindow => SlotKey::ClaimWindow,
            Slot::ClaimCooldown(p) => SlotKey::ClaimCooldown(p),
            Slot::EndCountdown => SlotKey::EndCountdown,
        }
    }
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot`, invalidating whatever token it previously held, and return the new token.
    pub fn arm(&mut self, slot: Slot) -> Token {
        self.next += 1;
        let token = Token(self.next);
        self.current.insert(slot.into(), token.0);
        token
    }

    /// Invalidate `slot` without arming a new timer. Any in-flight sleep for this slot will
    /// find its token stale when it wakes.
    pub fn cancel(&mut self, slot: Slot) {
        self.current.remove(&slot.into());
    }

    /// Whether `token` is still the live token for `slot` — i.e. the timer has not been
    /// canceled or superseded since it was armed.
    pub fn is_current(&self, slot: Slot, token: Token) -> bool {
        self.current.get(&slot.into()) == Some(&token.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_invalidates_the_previous_token() {
        let mut scheduler = TimerScheduler::new();
        let first = scheduler.arm(Slot::ClaimWindow);
        assert!(scheduler.is_current(Slot::ClaimWindow, first));
        let second = scheduler.arm(Slot::ClaimWindow);
        assert!(!scheduler.is_current(Slot::ClaimWindow, first));
        assert!(scheduler.is_current(Slot::ClaimWindow, second));
    }

    #[test]
    fn cancel_invalidates_without_arming() {
        let mut scheduler = TimerScheduler::new();
        let token = scheduler.arm(Slot::AutoFlip);
        scheduler.cancel(Slot::AutoFlip);
        assert!(!scheduler.is_current(Slot::AutoFlip, token));
    }

    #[test]
    fn per_player_cooldown_slots_are_independent() {
        let mut scheduler = TimerScheduler::new();
        let alice = PlayerId::new();
        let bob = PlayerId::new();
        let alice_token = scheduler.arm(Slot::ClaimCooldown(alice));
        let bob_token = scheduler.arm(Slot::ClaimCooldown(bob));
        scheduler.cancel(Slot::ClaimCooldown(alice));
        assert!(!scheduler.is_current(Slot::ClaimCooldown(alice), alice_token));
        assert!(scheduler.is_current(Slot::ClaimCooldown(bob), bob_token));
    }
}
