//! Async concurrency glue (§5): a room's commands and timer callbacks all execute under one
//! `tokio::sync::Mutex`, satisfying the single-logical-thread-per-room contract, while rooms
//! themselves run fully in parallel. No command ever awaits while holding the lock — the state
//! machine calls inside are synchronous; only the surrounding sleep for timers is async.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::ids::{PlayerId, PreStealEntryId, SpectatorId};

use super::state_machine::{self, ClaimOutcome};
use super::timer::{Slot, Token, TimerScheduler};
use super::types::{GameStatus, Room};

struct Inner {
    room: Room,
    timers: TimerScheduler,
}

/// Which state-machine timeout a woken sleep task should apply, if its token is still current.
#[derive(Clone, Copy)]
enum Fire {
    PendingFlipReveal,
    AutoFlip,
    ClaimWindow,
    EndCountdown,
}

/// A cheaply cloneable reference to one room's runtime. Every method locks, runs one
/// synchronous command, re-arms whatever timers the new state implies, and unlocks.
#[derive(Clone)]
pub struct RoomHandle {
    inner: Arc<Mutex<Inner>>,
    dictionary: Arc<Dictionary>,
}

impl RoomHandle {
    pub fn new(room: Room, dictionary: Arc<Dictionary>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                room,
                timers: TimerScheduler::new(),
            })),
            dictionary,
        }
    }

    pub async fn snapshot(&self) -> Room {
        self.inner.lock().await.room.clone()
    }

    pub async fn join(&self, name: impl Into<String>, code: Option<&str>) -> Result<PlayerId> {
        let mut guard = self.inner.lock().await;
        guard.room.join(name, code)
    }

    pub async fn leave(&self, player_id: PlayerId) {
        let mut guard = self.inner.lock().await;
        guard.room.leave(player_id);
        self.rearm(&mut guard);
    }

    pub async fn spectate(&self, name: impl Into<String>) -> SpectatorId {
        self.inner.lock().await.room.spectate(name)
    }

    pub async fn leave_spectator(&self, spectator_id: SpectatorId) {
        self.inner.lock().await.room.leave_spectator(spectator_id);
    }

    pub async fn start(&self, host_id: PlayerId) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let mut rng = StdRng::from_entropy();
        state_machine::start(&mut guard.room, host_id, &mut rng, Utc::now())?;
        self.rearm(&mut guard);
        Ok(())
    }

    pub async fn flip(&self, player_id: PlayerId) -> Result<()> {
        let mut guard = self.inner.lock().await;
        state_machine::flip(&mut guard.room, player_id, Utc::now())?;
        self.rearm(&mut guard);
        Ok(())
    }

    pub async fn claim_intent(&self, player_id: PlayerId) -> Result<()> {
        let mut guard = self.inner.lock().await;
        state_machine::claim_intent(&mut guard.room, player_id, Utc::now())?;
        self.rearm(&mut guard);
        Ok(())
    }

    pub async fn claim(&self, player_id: PlayerId, word: &str) -> Result<ClaimOutcome> {
        let mut guard = self.inner.lock().await;
        let outcome = state_machine::claim(&mut guard.room, player_id, word, &self.dictionary, Utc::now())?;
        self.rearm(&mut guard);
        Ok(outcome)
    }

    pub async fn pre_steal_add(
        &self,
        player_id: PlayerId,
        trigger_letters: &str,
        claim_word: &str,
    ) -> Result<PreStealEntryId> {
        let mut guard = self.inner.lock().await;
        state_machine::pre_steal_add(&mut guard.room, player_id, trigger_letters, claim_word, Utc::now())
    }

    pub async fn pre_steal_remove(&self, player_id: PlayerId, entry_id: PreStealEntryId) -> Result<()> {
        let mut guard = self.inner.lock().await;
        state_machine::pre_steal_remove(&mut guard.room, player_id, entry_id)
    }

    pub async fn pre_steal_reorder(&self, player_id: PlayerId, ordered_ids: &[PreStealEntryId]) -> Result<()> {
        let mut guard = self.inner.lock().await;
        state_machine::pre_steal_reorder(&mut guard.room, player_id, ordered_ids)
    }

    /// Recompute which of the five timer slots should be armed given the room's current state,
    /// canceling slots that no longer apply and (re)arming the ones that do. Called after every
    /// command that might change `pending_flip`, `claim_window`, or the endgame countdown.
    fn rearm(&self, guard: &mut Inner) {
        let now = Utc::now();
        let Some(game) = guard.room.game.as_ref() else { return };

        if let Some(pending) = game.pending_flip {
            let token = guard.timers.arm(Slot::PendingFlipReveal);
            self.spawn_fire_at(pending.reveals_at, Slot::PendingFlipReveal, token, Fire::PendingFlipReveal);
        } else {
            guard.timers.cancel(Slot::PendingFlipReveal);
        }

        if let Some(window) = game.claim_window {
            let token = guard.timers.arm(Slot::ClaimWindow);
            self.spawn_fire_at(window.ends_at, Slot::ClaimWindow, token, Fire::ClaimWindow);
        } else {
            guard.timers.cancel(Slot::ClaimWindow);
        }

        let should_auto_flip = game.pending_flip.is_none()
            && game.claim_window.is_none()
            && guard.room.meta.config.flip_timer_enabled
            && !game.bag.is_empty();
        if should_auto_flip {
            let fires_at = now + Duration::seconds(guard.room.meta.config.flip_timer_seconds as i64);
            let token = guard.timers.arm(Slot::AutoFlip);
            self.spawn_fire_at(fires_at, Slot::AutoFlip, token, Fire::AutoFlip);
        } else {
            guard.timers.cancel(Slot::AutoFlip);
        }

        match game.end_timer_ends_at {
            Some(ends_at) if game.status != GameStatus::Ended => {
                let token = guard.timers.arm(Slot::EndCountdown);
                self.spawn_fire_at(ends_at, Slot::EndCountdown, token, Fire::EndCountdown);
            }
            _ => guard.timers.cancel(Slot::EndCountdown),
        }
    }

    fn spawn_fire_at(&self, fires_at: DateTime<Utc>, slot: Slot, token: Token, which: Fire) {
        let handle = self.clone();
        let delay = (fires_at - Utc::now()).to_std().unwrap_or(std::time::Duration::ZERO);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.fire(slot, token, which).await;
        });
    }

    /// Apply a timeout, but only if its token is still the one the scheduler last handed out —
    /// otherwise the timer was canceled or superseded and this wakeup is silently dropped,
    /// per §7's propagation policy for stale timer callbacks.
    async fn fire(&self, slot: Slot, token: Token, which: Fire) {
        let mut guard = self.inner.lock().await;
        if !guard.timers.is_current(slot, token) {
            return;
        }
        let now = Utc::now();
        let outcome = match which {
            Fire::PendingFlipReveal => state_machine::pending_flip_reveal_fires(&mut guard.room, &self.dictionary, now),
            Fire::AutoFlip => state_machine::auto_flip(&mut guard.room, now),
            Fire::ClaimWindow => state_machine::claim_window_fires(&mut guard.room, now),
            Fire::EndCountdown => state_machine::end_countdown_fires(&mut guard.room, now),
        };
        if outcome.is_ok() {
            self.rearm(&mut guard);
        } else {
            tracing::debug!(?slot, "timer fired but guard was no longer satisfied");
        }
    }
}
