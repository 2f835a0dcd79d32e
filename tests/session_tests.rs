//! Session integration tests - full games driven by intents and ticks

use std::cell::RefCell;
use std::rc::Rc;

use grid_tetris::core::{
    BoardConfig, EffectsSink, HighScoreStore, MemoryHighScoreStore, NoopControl,
    SequenceSpawner, SessionControl,
};
use grid_tetris::engine::{IntentResult, Session, SessionConfig, SessionPhase, TickOutcome};
use grid_tetris::types::{Intent, Occupant, PieceKind, Pos, SPAWN_X, SPAWN_Y};

const SPAWN: Pos = Pos::new(SPAWN_X, SPAWN_Y);

#[derive(Clone, Default)]
struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }
}

impl EffectsSink for Log {
    fn on_row_cleared(&mut self, row: i32) {
        self.push(format!("row {}", row));
    }
    fn on_lines_cleared(&mut self, count: usize) {
        self.push(format!("lines {}", count));
    }
    fn on_piece_locked(&mut self, cells: &[Pos]) {
        self.push(format!("locked {}", cells.len()));
    }
    fn on_difficulty_increased(&mut self, level: u32) {
        self.push(format!("level {}", level));
    }
    fn on_game_over(&mut self) {
        self.push("game over".to_string());
    }
}

impl SessionControl for Log {
    fn restart_session(&mut self) {
        self.push("restart".to_string());
    }
}

#[derive(Clone, Default)]
struct Store(Rc<RefCell<Option<u32>>>);

impl HighScoreStore for Store {
    fn read_high_score(&self) -> u32 {
        self.0.borrow().unwrap_or(0)
    }
    fn write_high_score(&mut self, score: u32) {
        *self.0.borrow_mut() = Some(score);
    }
}

fn build(kinds: &[PieceKind], config: SessionConfig, log: &Log, store: &Store) -> Session {
    Session::builder()
        .config(config)
        .spawner(SequenceSpawner::new(kinds, SPAWN))
        .high_score_store(store.clone())
        .effects(log.clone())
        .control(log.clone())
        .build()
        .unwrap()
}

/// Leave a four-wide gap at columns 3..=6 in the given rows
fn stage_gap_rows(session: &mut Session, rows: std::ops::Range<i32>) {
    for y in rows {
        for x in 0..10 {
            if !(3..=6).contains(&x) {
                session
                    .board_mut()
                    .set(x, y, Some(Occupant::new(PieceKind::Z, 0)));
            }
        }
    }
}

#[test]
fn test_session_lifecycle() {
    let log = Log::default();
    let store = Store::default();
    let mut session = build(&[PieceKind::T], SessionConfig::default(), &log, &store);

    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(session.tick(1000), TickOutcome::Idle);
    assert!(session.active().is_none());

    session.start();
    assert_eq!(session.phase(), SessionPhase::Playing);
    assert!(session.active().is_some());

    // Starting twice does not respawn
    let id = session.active().unwrap().id();
    session.start();
    assert_eq!(session.active().unwrap().id(), id);
}

#[test]
fn test_intents_during_clear_are_replayed() {
    let log = Log::default();
    let store = Store::default();
    let mut session = build(
        &[PieceKind::I, PieceKind::T],
        SessionConfig::default(),
        &log,
        &store,
    );
    stage_gap_rows(&mut session, 0..1);
    session.start();

    assert_eq!(session.apply(Intent::HardDrop), IntentResult::Applied);
    assert_eq!(log.take(), vec!["locked 4", "row 0", "lines 1"]);
    assert!(session.board().is_clearing_rows());

    // Gravity is suspended during the pause
    assert_eq!(session.tick(500), TickOutcome::Clearing);
    assert_eq!(session.apply(Intent::MoveRight), IntentResult::Queued);
    assert_eq!(session.apply(Intent::MoveDown), IntentResult::Queued);
    assert_eq!(session.pending_intents().len(), 2);

    assert_eq!(session.tick(500), TickOutcome::ClearFinished);
    let piece = session.active().unwrap();
    assert_eq!(piece.kind(), PieceKind::T);
    assert_eq!(piece.pivot(), Pos::new(SPAWN_X + 1, SPAWN_Y - 1));
    assert!(session.pending_intents().is_empty());
}

#[test]
fn test_gravity_uses_current_drop_delay() {
    let log = Log::default();
    let store = Store::default();
    let config = SessionConfig {
        clear_pause_ms: 0,
        board: BoardConfig {
            rows_per_difficulty_increase: 1,
            ..BoardConfig::default()
        },
        ..SessionConfig::default()
    };
    let mut session = build(&[PieceKind::I, PieceKind::O], config, &log, &store);
    stage_gap_rows(&mut session, 0..1);
    session.start();
    session.apply(Intent::HardDrop);
    assert_eq!(session.board().difficulty_level(), 2);
    assert!(log.take().contains(&"level 2".to_string()));

    assert_eq!(session.tick(449), TickOutcome::Idle);
    assert_eq!(session.tick(1), TickOutcome::Fell);
}

#[test]
fn test_top_out_saves_high_score_and_restarts() {
    let log = Log::default();
    let store = Store::default();
    let config = SessionConfig {
        clear_pause_ms: 0,
        restart_delay_ms: 1000,
        ..SessionConfig::default()
    };
    let mut session = build(&[PieceKind::I], config, &log, &store);
    stage_gap_rows(&mut session, 0..2);
    session.start();

    session.apply(Intent::HardDrop);
    session.apply(Intent::HardDrop);
    assert_eq!(session.board().score(), 80);
    log.take();

    // A pillar up to the spawn row: the next I locks where it spawned
    for y in 0..SPAWN_Y {
        session
            .board_mut()
            .set(SPAWN_X, y, Some(Occupant::new(PieceKind::Z, 0)));
    }
    assert_eq!(session.tick(500), TickOutcome::GameOver);
    assert_eq!(log.take(), vec!["game over"]);
    assert_eq!(store.read_high_score(), 80);
    assert_eq!(session.high_score(), 80);
    assert_eq!(
        session.phase(),
        SessionPhase::GameOver {
            restart_in_ms: 1000
        }
    );
    assert_eq!(session.apply(Intent::HardDrop), IntentResult::Ignored);

    assert_eq!(session.tick(600), TickOutcome::Idle);
    assert_eq!(session.tick(400), TickOutcome::Restarted);
    assert_eq!(log.take(), vec!["restart"]);
    assert_eq!(session.board().score(), 0);
    assert_eq!(session.board().occupied_count(), 0);
    assert_eq!(session.high_score(), 80);
    assert!(session.active().is_some());
}

#[test]
fn test_lower_score_keeps_saved_high() {
    let log = Log::default();
    let store = Store::default();
    *store.0.borrow_mut() = Some(500);
    let mut session = build(&[PieceKind::O], SessionConfig::default(), &log, &store);
    session.start();
    assert_eq!(session.high_score(), 500);

    for y in 0..SPAWN_Y - 1 {
        session
            .board_mut()
            .set(SPAWN_X, y, Some(Occupant::new(PieceKind::Z, 0)));
    }
    session.apply(Intent::HardDrop);
    assert!(session.is_game_over());
    assert_eq!(store.read_high_score(), 500);
    assert!(!session.last_game_over().unwrap().new_high);
}

#[test]
fn test_bag_session_survives_long_run() {
    let config = SessionConfig {
        seed: 2024,
        ..SessionConfig::default()
    };
    let mut session = Session::builder()
        .config(config)
        .bag_spawner()
        .high_score_store(MemoryHighScoreStore::new())
        .effects(Log::default())
        .control(NoopControl::default())
        .build()
        .unwrap();
    session.start();

    let script = [
        Intent::MoveLeft,
        Intent::RotateCw,
        Intent::MoveRight,
        Intent::MoveRight,
        Intent::RotateCcw,
        Intent::HardDrop,
    ];
    for step in 0..2000 {
        session.apply(script[step % script.len()]);
        session.tick(100);
        let snapshot = session.board().snapshot();
        assert_eq!(snapshot.rows.len(), 20);
        assert!(session.pending_intents().len() <= 16);
    }
    assert!(session.games_played() > 0 || session.board().occupied_count() > 0);
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("grid-tetris-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"board": {"width": 8, "base_drop_delay_ms": 300}, "clear_pause_ms": 250}"#,
    )
    .unwrap();

    let config = SessionConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.board.width, 8);
    assert_eq!(config.board.height, 20);
    assert_eq!(config.clear_pause_ms, 250);
    assert_eq!(config.spawn(), Pos::new(3, 19));

    let mut session = Session::builder()
        .config(config)
        .uniform_spawner()
        .high_score_store(MemoryHighScoreStore::new())
        .effects(Log::default())
        .control(NoopControl::default())
        .build()
        .unwrap();
    session.start();
    assert_eq!(session.active().unwrap().pivot(), Pos::new(3, 19));
    assert_eq!(session.tick(299), TickOutcome::Idle);
    assert_eq!(session.tick(1), TickOutcome::Fell);
}

#[test]
fn test_snapshot_json_shape() {
    let log = Log::default();
    let store = Store::default();
    let mut session = build(&[PieceKind::L], SessionConfig::default(), &log, &store);
    session.start();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["phase"]["phase"], "playing");
    assert_eq!(json["active"]["kind"], "l");
    assert_eq!(json["active"]["pivot"]["y"], SPAWN_Y);
    assert_eq!(json["board"]["width"], 10);
    assert_eq!(json["board"]["rows"].as_array().map(|r| r.len()), Some(20));
}

#[test]
fn test_gravity_top_out_restarts_in_same_tick() {
    let log = Log::default();
    let store = Store::default();
    let config = SessionConfig {
        restart_delay_ms: 0,
        ..SessionConfig::default()
    };
    let mut session = build(&[PieceKind::T], config, &log, &store);
    session.start();
    for y in 0..SPAWN_Y - 1 {
        session
            .board_mut()
            .set(SPAWN_X, y, Some(Occupant::new(PieceKind::Z, 0)));
    }

    assert_eq!(session.tick(500), TickOutcome::Restarted);
    assert_eq!(log.take(), vec!["game over", "restart"]);
    assert_eq!(session.games_played(), 1);
    assert_eq!(session.phase(), SessionPhase::Playing);
    assert!(session.last_game_over().is_some());
    assert!(session.active().is_some());
}
