//! Session driver
//!
//! A [`Session`] owns the board and the falling piece and connects them to
//! the collaborators: it spawns pieces, applies player intents, runs gravity
//! from elapsed time, holds the clear gate and counts down to a restart after
//! game over. Time only advances through [`Session::tick`], so a session is
//! fully deterministic for a deterministic spawner.

use arrayvec::ArrayVec;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::core::{
    BagSpawner, Board, BoardSnapshot, CoreError, EffectsSink, GameOverReport, HighScoreStore,
    LockOutcome, Piece, PieceSnapshot, SessionControl, Spawner, UniformSpawner,
};
use crate::types::{Direction, Intent, MAX_PENDING_INTENTS};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    /// Built but `start` not called yet
    Idle,
    Playing,
    /// Waiting out the restart delay
    #[serde(rename_all = "camelCase")]
    GameOver { restart_in_ms: u32 },
}

/// What `Session::apply` did with an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentResult {
    /// The piece moved, rotated or dropped
    Applied,
    /// Blocked by the walls, the floor or locked blocks
    Rejected,
    /// Buffered until the clear gate is released
    Queued,
    /// Clear gate raised and the pending queue is full
    Dropped,
    /// No game in progress
    Ignored,
}

/// What one `Session::tick` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session idle or nothing was due
    Idle,
    /// Clear gate still raised
    Clearing,
    /// Clear gate released this tick
    ClearFinished,
    /// Gravity moved the piece down one row
    Fell,
    /// Gravity could not move the piece, so it locked
    Locked,
    /// A lock reached the fatal row
    GameOver,
    /// Restart delay elapsed and a new game began
    Restarted,
}

/// Serializable view of a whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub board: BoardSnapshot,
    pub active: Option<PieceSnapshot>,
    pub high_score: u32,
    pub pending_intents: usize,
    pub games_played: u32,
}

/// How a session lost its active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Committed,
    /// Nothing changed; the lock can be retried later
    Deferred,
    ToppedOut,
}

enum SpawnerSource {
    Custom(Box<dyn Spawner>),
    /// Built from the session config seed and spawn pivot
    Uniform,
    Bag,
}

/// Builder that refuses to produce a session with a missing collaborator
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    spawner: Option<SpawnerSource>,
    store: Option<Box<dyn HighScoreStore>>,
    effects: Option<Box<dyn EffectsSink>>,
    control: Option<Box<dyn SessionControl>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Some(SpawnerSource::Custom(Box::new(spawner)));
        self
    }

    /// Uniformly random kinds, seeded and placed from the final config
    pub fn uniform_spawner(mut self) -> Self {
        self.spawner = Some(SpawnerSource::Uniform);
        self
    }

    /// 7-bag kinds, seeded and placed from the final config
    pub fn bag_spawner(mut self) -> Self {
        self.spawner = Some(SpawnerSource::Bag);
        self
    }

    pub fn high_score_store(mut self, store: impl HighScoreStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn effects(mut self, effects: impl EffectsSink + 'static) -> Self {
        self.effects = Some(Box::new(effects));
        self
    }

    pub fn control(mut self, control: impl SessionControl + 'static) -> Self {
        self.control = Some(Box::new(control));
        self
    }

    pub fn build(self) -> Result<Session, CoreError> {
        self.config.validate()?;
        let board = Board::with_config(self.config.board.clone())?;

        let spawner: Box<dyn Spawner> = match self.spawner {
            Some(SpawnerSource::Custom(spawner)) => spawner,
            Some(SpawnerSource::Uniform) => Box::new(UniformSpawner::new(
                self.config.seed,
                self.config.spawn(),
            )),
            Some(SpawnerSource::Bag) => {
                Box::new(BagSpawner::new(self.config.seed, self.config.spawn()))
            }
            None => return Err(CoreError::MissingCollaborator("spawner")),
        };
        let store = self
            .store
            .ok_or(CoreError::MissingCollaborator("high score store"))?;
        let effects = self
            .effects
            .ok_or(CoreError::MissingCollaborator("effects sink"))?;
        let control = self
            .control
            .ok_or(CoreError::MissingCollaborator("session control"))?;

        Ok(Session {
            config: self.config,
            board,
            active: None,
            spawner,
            store,
            effects,
            control,
            phase: SessionPhase::Idle,
            high_score: 0,
            next_piece_id: 0,
            drop_timer_ms: 0,
            pending: ArrayVec::new(),
            last_game_over: None,
            games_played: 0,
        })
    }
}

/// One running game plus its collaborators
pub struct Session {
    config: SessionConfig,
    board: Board,
    active: Option<Piece>,
    spawner: Box<dyn Spawner>,
    store: Box<dyn HighScoreStore>,
    effects: Box<dyn EffectsSink>,
    control: Box<dyn SessionControl>,
    phase: SessionPhase,
    /// High score read at start, raised when a game beats it
    high_score: u32,
    next_piece_id: u32,
    drop_timer_ms: u32,
    /// Intents received while the clear gate was raised
    pending: ArrayVec<Intent, MAX_PENDING_INTENTS>,
    last_game_over: Option<GameOverReport>,
    games_played: u32,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Read the saved high score and spawn the first piece.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        self.high_score = self.store.read_high_score();
        self.phase = SessionPhase::Playing;
        info!(
            "session started (high score {}, {}x{} board)",
            self.high_score,
            self.board.width(),
            self.board.height()
        );
        self.spawn_piece();
    }

    fn spawn_piece(&mut self) {
        self.next_piece_id = self.next_piece_id.wrapping_add(1);
        let piece = self.spawner.spawn_next(self.next_piece_id);
        debug!(
            "spawned piece {} ({}) at {:?}",
            piece.id(),
            piece.kind().as_str(),
            piece.pivot()
        );
        self.active = Some(piece);
        self.drop_timer_ms = 0;
    }

    /// Apply one player intent.
    ///
    /// While the clear gate is raised the intent is buffered (up to the
    /// configured limit) and replayed in order once the gate is released.
    pub fn apply(&mut self, intent: Intent) -> IntentResult {
        if self.phase != SessionPhase::Playing {
            return IntentResult::Ignored;
        }

        if self.board.is_clearing_rows() {
            if self.pending.len() >= self.config.max_pending_intents
                || self.pending.try_push(intent).is_err()
            {
                warn!("dropping {} intent: pending queue full", intent.as_str());
                return IntentResult::Dropped;
            }
            return IntentResult::Queued;
        }

        if self.execute(intent) {
            IntentResult::Applied
        } else {
            IntentResult::Rejected
        }
    }

    fn execute(&mut self, intent: Intent) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };

        match intent {
            Intent::MoveLeft => piece.try_move(&self.board, Direction::Left),
            Intent::MoveRight => piece.try_move(&self.board, Direction::Right),
            Intent::MoveDown => piece.try_move(&self.board, Direction::Down),
            Intent::RotateCw => piece.try_rotate(&self.board, true),
            Intent::RotateCcw => piece.try_rotate(&self.board, false),
            Intent::HardDrop => {
                let result = piece.hard_drop(&mut self.board);
                self.settle(result) != Settled::Deferred
            }
        }
    }

    /// Advance session time by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickOutcome {
        match self.phase {
            SessionPhase::Idle => TickOutcome::Idle,
            SessionPhase::GameOver { restart_in_ms } => {
                let remaining = restart_in_ms.saturating_sub(elapsed_ms);
                if remaining > 0 {
                    self.phase = SessionPhase::GameOver {
                        restart_in_ms: remaining,
                    };
                    return TickOutcome::Idle;
                }
                self.restart();
                TickOutcome::Restarted
            }
            SessionPhase::Playing => self.tick_playing(elapsed_ms),
        }
    }

    fn tick_playing(&mut self, elapsed_ms: u32) -> TickOutcome {
        if self.board.is_clearing_rows() {
            if !self.board.advance_clear_pause(elapsed_ms) {
                return TickOutcome::Clearing;
            }
            self.resume_after_clear();
            return TickOutcome::ClearFinished;
        }

        if self.active.is_none() {
            self.spawn_piece();
        }

        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms < self.board.drop_delay_ms() {
            return TickOutcome::Idle;
        }
        self.drop_timer_ms = 0;

        let Some(piece) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };
        if piece.try_move(&self.board, Direction::Down) {
            return TickOutcome::Fell;
        }

        let result = piece.lock(&mut self.board);
        match self.settle(result) {
            Settled::ToppedOut if self.is_game_over() => TickOutcome::GameOver,
            // Zero restart delay: the next game already began
            Settled::ToppedOut => TickOutcome::Restarted,
            Settled::Committed | Settled::Deferred => TickOutcome::Locked,
        }
    }

    /// Handle the result of locking the active piece.
    fn settle(&mut self, result: Result<LockOutcome, CoreError>) -> Settled {
        match result {
            Ok(LockOutcome::Committed(report)) => {
                if report.dropped_rows > 0 {
                    self.effects.on_hard_drop(report.dropped_rows);
                }
                self.effects.on_piece_locked(&report.cells);
                for &row in &report.clear.rows {
                    self.effects.on_row_cleared(row);
                }

                self.active = None;
                if !report.clear.is_empty() {
                    self.effects.on_lines_cleared(report.clear.lines());
                    if report.clear.difficulty_increased {
                        self.effects
                            .on_difficulty_increased(self.board.difficulty_level());
                    }
                    self.board.begin_clear_pause(self.config.clear_pause_ms);
                }

                if !self.board.is_clearing_rows() {
                    self.spawn_piece();
                }
                Settled::Committed
            }
            Ok(LockOutcome::AlreadySettled) => Settled::Deferred,
            Err(CoreError::FatalOverflow) => {
                self.trigger_game_over();
                Settled::ToppedOut
            }
            Err(err) => {
                debug!("lock deferred: {}", err);
                Settled::Deferred
            }
        }
    }

    fn resume_after_clear(&mut self) {
        debug!("clear gate released, replaying {} intent(s)", self.pending.len());
        if self.active.is_none() {
            self.spawn_piece();
        }

        let queued = std::mem::take(&mut self.pending);
        for intent in queued {
            if self.phase != SessionPhase::Playing {
                break;
            }
            self.apply(intent);
        }
    }

    fn trigger_game_over(&mut self) {
        let report = self.board.game_over(self.store.as_mut());
        if report.new_high {
            self.high_score = report.score;
        }
        info!(
            "game over: score {} (high score {})",
            report.score, self.high_score
        );

        self.effects.on_game_over();
        self.active = None;
        self.pending.clear();
        self.last_game_over = Some(report);
        self.phase = SessionPhase::GameOver {
            restart_in_ms: self.config.restart_delay_ms,
        };

        if self.config.restart_delay_ms == 0 {
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.control.restart_session();
        self.board.reset();
        self.active = None;
        self.pending.clear();
        self.drop_timer_ms = 0;
        self.next_piece_id = 0;
        self.games_played = self.games_played.wrapping_add(1);
        self.phase = SessionPhase::Idle;
        self.start();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, SessionPhase::GameOver { .. })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for drivers that stage positions
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn pending_intents(&self) -> &[Intent] {
        &self.pending
    }

    pub fn drop_timer_ms(&self) -> u32 {
        self.drop_timer_ms
    }

    pub fn last_game_over(&self) -> Option<GameOverReport> {
        self.last_game_over
    }

    /// Games finished and restarted so far
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            board: self.board.snapshot(),
            active: self.active.as_ref().map(PieceSnapshot::from),
            high_score: self.high_score,
            pending_intents: self.pending.len(),
            games_played: self.games_played,
        }
    }
}
