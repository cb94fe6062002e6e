//! The session store: everything the server knows about live games.
//!
//! Three maps, keyed by game code:
//! - `rounds`: round number → [`RoundState`]. A code is a *live session*
//!   exactly when it has an entry here.
//! - `layouts`: the write-once [`Layout`].
//! - `last_activity`: when the game was created or last updated.
//!
//! They are kept apart: clearing a game that never got past round
//! 0 only drops its rounds, leaving layout and timestamp behind for the
//! reaper. See [`SessionStore::clear_session`].
//!
//! # Concurrency note
//!
//! `SessionStore` is NOT thread-safe by itself. The server wraps the one
//! instance in a single `tokio::sync::Mutex` shared by every request handler
//! and the reaper, and each operation here is one critical section under
//! that lock. Nothing in this module awaits or does I/O.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use roundkeep_protocol::{
    is_monster, GameId, Layout, LayoutRequest, PlayerState, RoundState,
};
use tokio::time::Instant;

use crate::{GameIdGenerator, LayoutGenerator, SessionError, DEFAULT_ID_LENGTH};

/// Writing round `r` drops round `r - DROP_ROUND_OFFSET`.
pub const DROP_ROUND_OFFSET: u64 = 2;

/// Inactivity horizon after which the reaper evicts a game (24 hours).
pub const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Length of generated game codes. Default: 4.
    pub id_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_length: DEFAULT_ID_LENGTH,
        }
    }
}

impl StoreConfig {
    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// A zero-length code would make every code after the first collide
    /// forever, so `id_length` is raised to at least 1.
    pub fn validated(mut self) -> Self {
        if self.id_length == 0 {
            tracing::warn!("id_length of 0 is unusable, raising to 1");
            self.id_length = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// ClearOutcome
// ---------------------------------------------------------------------------

/// What [`SessionStore::clear_session`] actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// No rounds were recorded; nothing was removed.
    Untouched,
    /// Only round 0 was ever reached: rounds removed, layout and activity
    /// timestamp left for the reaper.
    RoundsOnly,
    /// A round past 0 was reached: rounds, layout and timestamp removed.
    Full,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// All live games, their layouts and their recent rounds.
///
/// ## Lifecycle
///
/// ```text
/// create_session() ──→ get_or_init_layout() ──→ update_round_state() ...
///        │                                              │
///        │                     ┌────────────────────────┤
///        ▼                     ▼                        ▼
///  sweep_stale_at()     clear_session()          (abandoned)
///  (24h idle)                                    → sweep_stale_at()
/// ```
#[derive(Debug)]
pub struct SessionStore {
    rounds: HashMap<GameId, BTreeMap<u64, RoundState>>,
    layouts: HashMap<GameId, Layout>,
    last_activity: HashMap<GameId, Instant>,
    ids: GameIdGenerator,
}

impl SessionStore {
    /// Creates an empty store with OS-seeded code generation.
    pub fn new(config: StoreConfig) -> Self {
        let config = config.validated();
        Self::with_id_generator(GameIdGenerator::new(config.id_length))
    }

    /// Creates an empty store drawing codes from `ids`.
    /// Tests use this with a seeded generator.
    pub fn with_id_generator(ids: GameIdGenerator) -> Self {
        Self {
            rounds: HashMap::new(),
            layouts: HashMap::new(),
            last_activity: HashMap::new(),
            ids,
        }
    }

    /// Registers a new game under a fresh code and returns the code.
    ///
    /// Draws codes until one is not held by a live session. There is no
    /// retry limit: if every code were taken this would spin forever, which
    /// at the default length means roughly 920k concurrent games.
    pub fn create_session(&mut self) -> GameId {
        loop {
            let game_id = self.ids.generate();
            if self.rounds.contains_key(&game_id) {
                tracing::debug!(%game_id, "game code collision, redrawing");
                continue;
            }
            self.rounds.insert(game_id.clone(), BTreeMap::new());
            self.record_activity(&game_id);
            tracing::info!(%game_id, "created new game");
            return game_id;
        }
    }

    /// Returns the game's layout, rolling one from the wall clock on first
    /// call. See [`get_or_init_layout_with`](Self::get_or_init_layout_with).
    pub fn get_or_init_layout(
        &mut self,
        game_id: &GameId,
        request: &LayoutRequest,
    ) -> Result<Layout, SessionError> {
        self.get_or_init_layout_with(
            game_id,
            request,
            &mut LayoutGenerator::from_clock(),
        )
    }

    /// Returns the game's layout, rolling one with `generator` on first call.
    ///
    /// Once a layout is stored it is returned verbatim and `request` is
    /// ignored, even if it asks for something different.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: no layout yet and no live session
    /// - [`SessionError::InvalidParameter`]: the request can't be sampled
    pub fn get_or_init_layout_with(
        &mut self,
        game_id: &GameId,
        request: &LayoutRequest,
        generator: &mut LayoutGenerator,
    ) -> Result<Layout, SessionError> {
        if let Some(layout) = self.layouts.get(game_id) {
            return Ok(layout.clone());
        }
        if !self.rounds.contains_key(game_id) {
            return Err(SessionError::NotFound(game_id.clone()));
        }

        let layout = generator.generate(request)?;
        self.layouts.insert(game_id.clone(), layout.clone());
        tracing::info!(
            %game_id,
            open_exits = ?layout.open_exits,
            monster_spawn = layout.monster_spawn,
            child_spawn = layout.child_spawn,
            "generated layout"
        );
        Ok(layout)
    }

    /// Records what `player_id` posted for `round` and returns the whole
    /// round afterwards.
    ///
    /// - Object onto object merges shallowly; anything else replaces.
    /// - The monster (case-insensitive) sets `hasMonster`, everyone else
    ///   `hasChild`. Flags are never unset.
    /// - Round `round - 2` is dropped, always.
    /// - An unknown `game_id` is silently registered, never rejected.
    pub fn update_round_state(
        &mut self,
        game_id: &GameId,
        player_id: &str,
        round: u64,
        payload: PlayerState,
    ) -> RoundState {
        let rounds = self.rounds.entry(game_id.clone()).or_default();
        let state = rounds.entry(round).or_default();

        match state.players.get_mut(player_id) {
            Some(existing) => existing.merge(payload),
            None => {
                state.players.insert(player_id.to_owned(), payload);
            }
        }

        if is_monster(player_id) {
            state.has_monster = true;
        } else {
            state.has_child = true;
        }

        let snapshot = state.clone();

        if let Some(stale) = round.checked_sub(DROP_ROUND_OFFSET) {
            rounds.remove(&stale);
        }

        self.record_activity(game_id);
        tracing::debug!(%game_id, player_id, round, state = ?snapshot, "state updated");
        snapshot
    }

    /// Clears a finished game.
    ///
    /// If no rounds are recorded this does nothing. Otherwise the rounds
    /// are removed, and only if some round past 0 was reached are the
    /// layout and activity timestamp removed too. A game cleared at round 0
    /// keeps its layout and timestamp until the reaper collects them.
    pub fn clear_session(&mut self, game_id: &GameId) -> ClearOutcome {
        let Some(max_round) = self
            .rounds
            .get(game_id)
            .and_then(|rounds| rounds.keys().next_back().copied())
        else {
            return ClearOutcome::Untouched;
        };

        let outcome = if max_round > 0 {
            self.layouts.remove(game_id);
            self.last_activity.remove(game_id);
            ClearOutcome::Full
        } else {
            ClearOutcome::RoundsOnly
        };
        self.rounds.remove(game_id);

        tracing::info!(%game_id, max_round, ?outcome, "state cleared");
        outcome
    }

    /// Evicts every game idle for longer than `horizon` as of `now`.
    ///
    /// Rounds, layout and timestamp go together. Returns the evicted codes,
    /// sorted.
    pub fn sweep_stale_at(
        &mut self,
        now: Instant,
        horizon: Duration,
    ) -> Vec<GameId> {
        let mut evicted: Vec<GameId> = self
            .last_activity
            .iter()
            .filter(|(_, at)| now.saturating_duration_since(**at) > horizon)
            .map(|(game_id, _)| game_id.clone())
            .collect();
        evicted.sort();

        for game_id in &evicted {
            tracing::info!(%game_id, "deleting stale game");
            self.rounds.remove(game_id);
            self.layouts.remove(game_id);
            self.last_activity.remove(game_id);
        }
        evicted
    }

    fn record_activity(&mut self, game_id: &GameId) {
        self.last_activity.insert(game_id.clone(), Instant::now());
    }

    // -- Read-only accessors (never touch activity) -----------------------

    /// Whether `game_id` is a live session.
    pub fn contains(&self, game_id: &GameId) -> bool {
        self.rounds.contains_key(game_id)
    }

    /// The retained rounds of a live session.
    pub fn rounds(&self, game_id: &GameId) -> Option<&BTreeMap<u64, RoundState>> {
        self.rounds.get(game_id)
    }

    /// One retained round.
    pub fn round(&self, game_id: &GameId, round: u64) -> Option<&RoundState> {
        self.rounds.get(game_id)?.get(&round)
    }

    /// The stored layout, if any.
    pub fn layout(&self, game_id: &GameId) -> Option<&Layout> {
        self.layouts.get(game_id)
    }

    /// When the game was last created or updated, if tracked.
    pub fn last_activity(&self, game_id: &GameId) -> Option<Instant> {
        self.last_activity.get(game_id).copied()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Returns `true` if there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
