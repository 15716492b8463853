//! Game state module - the rules engine state machine
//!
//! `GameState` owns the board, the falling/next/held pieces, the counters and
//! the timing phase. It is a plain single-threaded value; [`crate::Game`] puts
//! it behind the lock that the ticker, input and render threads share.
//!
//! The falling piece is always drawn into the board. Every validation erases
//! it, tests the candidate and draws it again at whichever location won, so a
//! caller holding the lock never observes a board without the falling piece.

use std::fmt;
use std::iter;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use tracing::{debug, info, trace};

use crate::board::Board;
use crate::pieces::{kick_class, kicks, translate, Piece};
use crate::rng::{RandomTiles, TileSource};
use crate::scoring::{advance_level, calculate_line_score, drop_interval};
use crate::snapshot::{GameSnapshot, PieceView};
use crate::types::*;

/// Rows waiting to be removed, bottom row first
pub type PendingRows = ArrayVec<usize, 4>;

/// Where the game is in the fall / lock / clear cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No game running (before the first start and after game over)
    Idle,
    /// The current piece drops one row every gravity interval
    Falling { last_drop: Instant },
    /// The piece could not fall at `since`; it locks after the lock delay
    /// unless it can fall again by then
    Locking { since: Instant },
    /// Full rows stay visible until the clear delay has passed
    Clearing { since: Instant, rows: PendingRows },
}

impl Phase {
    /// Push every deadline back by `by` (used when resuming from pause)
    fn shifted(self, by: Duration) -> Self {
        match self {
            Phase::Idle => Phase::Idle,
            Phase::Falling { last_drop } => Phase::Falling {
                last_drop: last_drop + by,
            },
            Phase::Locking { since } => Phase::Locking { since: since + by },
            Phase::Clearing { since, rows } => Phase::Clearing {
                since: since + by,
                rows,
            },
        }
    }
}

/// Complete game state
pub struct GameState {
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    held: Option<Piece>,
    score: u32,
    level: u32,
    /// Rows cleared toward the next level
    clears: u32,
    /// Rows cleared this game
    lines: u32,
    can_hold: bool,
    phase: Phase,
    paused_at: Option<Instant>,
    started: bool,
    paused: bool,
    game_over: bool,
    tiles: Box<dyn TileSource>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("current", &self.current)
            .field("next", &self.next)
            .field("held", &self.held)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("clears", &self.clears)
            .field("phase", &self.phase)
            .field("started", &self.started)
            .field("paused", &self.paused)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Create an idle game drawing pieces from `tiles`
    pub fn new(tiles: impl TileSource + 'static) -> Self {
        Self {
            board: Board::new(),
            current: None,
            next: None,
            held: None,
            score: 0,
            level: START_LEVEL,
            clears: 0,
            lines: 0,
            can_hold: true,
            phase: Phase::Idle,
            paused_at: None,
            started: false,
            paused: false,
            game_over: false,
            tiles: Box::new(tiles),
        }
    }

    /// Create an idle game with uniformly random pieces
    pub fn with_seed(seed: u32) -> Self {
        Self::new(RandomTiles::new(seed))
    }

    /// Return every field to its pre-game value. The tile source is kept.
    pub fn reset(&mut self) {
        self.board.clear();
        self.current = None;
        self.next = None;
        self.held = None;
        self.score = 0;
        self.level = START_LEVEL;
        self.clears = 0;
        self.lines = 0;
        self.can_hold = true;
        self.phase = Phase::Idle;
        self.paused_at = None;
        self.started = false;
        self.paused = false;
        self.game_over = false;
    }

    /// Begin (or restart) a game
    pub fn start(&mut self, now: Instant) {
        self.reset();
        self.started = true;

        let first = self.new_piece();
        first.render(&mut self.board);
        self.current = Some(first);
        self.next = Some(self.new_piece());
        self.phase = Phase::Falling { last_drop: now };

        info!(first = first.tile.as_str(), "game started");
    }

    /// Start only when no game is running. Returns whether a game started.
    pub fn start_if_idle(&mut self, now: Instant) -> bool {
        if self.started {
            return false;
        }
        self.start(now);
        true
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn clears(&self) -> u32 {
        self.clears
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn next(&self) -> Option<Piece> {
        self.next
    }

    pub fn held(&self) -> Option<Piece> {
        self.held
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the locked contents of the board and redraw the falling piece
    /// on top. Intended for scripted setups (tests, benches, demos).
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
        if let Some(piece) = self.current {
            piece.render(&mut self.board);
        }
    }

    fn new_piece(&mut self) -> Piece {
        Piece::new(self.tiles.next_tile())
    }

    /// Advance time-driven state. A no-op until the relevant deadline passes.
    ///
    /// Returns whether anything changed.
    pub fn update(&mut self, now: Instant) -> bool {
        if !self.started || self.paused {
            return false;
        }

        match self.phase.clone() {
            Phase::Idle => false,
            Phase::Clearing { since, rows } => {
                if now < since + Duration::from_millis(CLEAR_DELAY_MS) {
                    return false;
                }
                self.board.compact(&rows);
                self.spawn_next(now);
                true
            }
            Phase::Locking { since } => {
                if now < since + Duration::from_millis(LOCK_DELAY_MS) {
                    return false;
                }
                if self.try_move_down() {
                    self.phase = Phase::Falling { last_drop: now };
                } else {
                    self.place_piece(now);
                }
                true
            }
            Phase::Falling { last_drop } => {
                if now < last_drop + drop_interval(self.level) {
                    return false;
                }
                if self.try_move_down() {
                    self.phase = Phase::Falling { last_drop: now };
                } else {
                    trace!("piece grounded, lock pending");
                    self.phase = Phase::Locking { since: now };
                }
                true
            }
        }
    }

    /// Apply a player command. Ignored when no game runs, and everything but
    /// `Pause` is ignored while paused.
    ///
    /// Returns whether the command had an effect.
    pub fn handle_command(&mut self, cmd: Command, now: Instant) -> bool {
        if !self.started {
            return false;
        }
        if self.paused && cmd != Command::Pause {
            return false;
        }

        match cmd {
            Command::Pause => {
                self.toggle_pause(now);
                true
            }
            Command::Left => match self.current {
                Some(piece) => self.try_move(piece.left()),
                None => false,
            },
            Command::Right => match self.current {
                Some(piece) => self.try_move(piece.right()),
                None => false,
            },
            Command::SoftDrop => {
                if self.current.is_none() {
                    return false;
                }
                if self.try_move_down() {
                    if matches!(self.phase, Phase::Locking { .. }) {
                        self.phase = Phase::Falling { last_drop: now };
                    }
                } else {
                    self.place_piece(now);
                }
                true
            }
            Command::HardDrop => {
                if self.current.is_none() {
                    return false;
                }
                while self.try_move_down() {}
                self.place_piece(now);
                true
            }
            Command::Rotate => self.try_rotate(),
            Command::Hold => self.hold(now),
        }
    }

    fn toggle_pause(&mut self, now: Instant) {
        if self.paused {
            self.paused = false;
            if let Some(at) = self.paused_at.take() {
                let away = now.saturating_duration_since(at);
                self.phase = self.phase.clone().shifted(away);
            }
            debug!("resumed");
        } else {
            self.paused = true;
            self.paused_at = Some(now);
            debug!("paused");
        }
    }

    /// Move the falling piece to `candidate` if every cell is free.
    ///
    /// The piece is erased while the candidate is tested and drawn again at
    /// the new location on success or at the old one on failure.
    pub fn try_move(&mut self, candidate: Loc) -> bool {
        let Some(piece) = self.current.as_mut() else {
            return false;
        };

        piece.clear(&mut self.board);
        let fits = self.board.fits(&candidate);
        if fits {
            piece.loc = candidate;
        }
        piece.render(&mut self.board);
        fits
    }

    fn try_move_down(&mut self) -> bool {
        match self.current {
            Some(piece) => self.try_move(piece.down()),
            None => false,
        }
    }

    /// Rotate the falling piece a quarter turn clockwise.
    ///
    /// Tries the plain rotation, then each wall kick of the piece's class in
    /// table order; the first candidate that fits wins. The square never
    /// rotates.
    pub fn try_rotate(&mut self) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        let (Some(class), Some(naive)) = (kick_class(piece.tile), piece.rotate()) else {
            return false;
        };

        let kicked = kicks(class, piece.rotation)
            .iter()
            .map(|&offset| translate(&naive, offset));

        for candidate in iter::once(naive).chain(kicked) {
            if self.try_move(candidate) {
                if let Some(current) = self.current.as_mut() {
                    current.rotation = (current.rotation + 1) % 4;
                }
                return true;
            }
        }
        false
    }

    /// Bank the falling piece, or swap it with the banked one.
    ///
    /// Allowed once per spawned piece.
    pub fn hold(&mut self, now: Instant) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(mut outgoing) = self.current.take() else {
            return false;
        };

        outgoing.clear(&mut self.board);
        outgoing.reset();

        let incoming = match self.held.take() {
            Some(held) => held,
            None => {
                let promoted = match self.next.take() {
                    Some(next) => next,
                    None => self.new_piece(),
                };
                self.next = Some(self.new_piece());
                promoted
            }
        };

        incoming.render(&mut self.board);
        self.held = Some(outgoing);
        self.current = Some(incoming);
        self.can_hold = false;
        self.phase = Phase::Falling { last_drop: now };

        trace!(held = outgoing.tile.as_str(), "hold");
        true
    }

    /// Commit the falling piece where it stands.
    ///
    /// A piece that still pokes above the field ends the game. Otherwise full
    /// rows under the piece are scored and scheduled for removal, or the next
    /// piece spawns straight away.
    fn place_piece(&mut self, now: Instant) {
        let Some(piece) = self.current.take() else {
            return;
        };

        if piece.is_above_field() {
            self.game_over = true;
            self.started = false;
            self.phase = Phase::Idle;
            info!(score = self.score, level = self.level, lines = self.lines, "game over");
            return;
        }

        let mut rows = PendingRows::new();
        for &(row, _) in &piece.loc {
            let row = row as usize;
            if !rows.contains(&row) && self.board.is_row_full(row) {
                rows.push(row);
            }
        }
        rows.sort_unstable_by(|a, b| b.cmp(a));

        let cleared = rows.len();
        self.score = self
            .score
            .saturating_add(calculate_line_score(cleared, self.level));
        self.lines += cleared as u32;

        let progress = advance_level(self.level, self.clears, cleared as u32);
        if progress.promoted > 0 {
            info!(level = progress.level, "level up");
        }
        self.level = progress.level;
        self.clears = progress.clears;

        if rows.is_empty() {
            self.spawn_next(now);
        } else {
            debug!(rows = cleared, score = self.score, "rows cleared");
            self.phase = Phase::Clearing { since: now, rows };
        }
    }

    /// Promote the queued piece and queue a new one
    fn spawn_next(&mut self, now: Instant) {
        let piece = match self.next.take() {
            Some(next) => next,
            None => self.new_piece(),
        };
        piece.render(&mut self.board);
        self.current = Some(piece);
        self.next = Some(self.new_piece());
        self.can_hold = true;
        self.phase = Phase::Falling { last_drop: now };
    }

    /// Cells the falling piece would occupy after a hard drop
    pub fn ghost(&self) -> Option<Loc> {
        let piece = self.current?;
        let mut loc = piece.loc;
        loop {
            let below = translate(&loc, (1, 0));
            if !self.board.fits_ignoring(&below, &piece.loc) {
                break;
            }
            loc = below;
        }
        Some(loc)
    }

    /// Fill `out` with a copy of everything a renderer needs
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_grid(&mut out.board);
        out.ghost = self.ghost();
        out.next = self.next.map(PieceView::from);
        out.held = self.held.map(PieceView::from);
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.clears = self.clears;
        out.can_hold = self.can_hold;
        out.started = self.started;
        out.paused = self.paused;
        out.game_over = self.game_over;
        out.clearing = matches!(self.phase, Phase::Clearing { .. });
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_seed(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::spawn_loc;
    use crate::rng::SequenceTiles;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn started(tiles: &[Tile]) -> (GameState, Instant) {
        let mut state = GameState::new(SequenceTiles::new(tiles.to_vec()));
        let t0 = Instant::now();
        state.start(t0);
        (state, t0)
    }

    /// Step the current piece down `rows` times through `try_move`
    fn lower(state: &mut GameState, rows: usize) {
        for _ in 0..rows {
            let down = state.current.unwrap().down();
            assert!(state.try_move(down));
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::with_seed(12345);

        assert!(!state.started);
        assert!(!state.game_over);
        assert!(!state.paused);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.clears, 0);
        assert!(state.current.is_none());
        assert!(state.next.is_none());
        assert!(state.held.is_none());
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_start_spawns_two_pieces() {
        let (state, t0) = started(&[Tile::Red, Tile::Green]);

        assert!(state.started);
        assert_eq!(state.current.unwrap(), Piece::new(Tile::Red));
        assert_eq!(state.next.unwrap(), Piece::new(Tile::Green));
        assert_eq!(state.phase, Phase::Falling { last_drop: t0 });
        // Spawned fully above the field, so nothing is drawn yet.
        assert_eq!(state.board.filled_count(), 0);
    }

    #[test]
    fn test_try_move_success_redraws_piece() {
        let (mut state, _) = started(&[Tile::Purple]);
        lower(&mut state, 3);

        // Purple now occupies (2,4) (2,5) (2,6) (1,5).
        assert_eq!(state.board.get(2, 4), Some(Tile::Purple));
        assert_eq!(state.board.get(1, 5), Some(Tile::Purple));

        let left = state.current.unwrap().left();
        assert!(state.try_move(left));
        assert_eq!(state.current.unwrap().loc, [(2, 3), (2, 4), (2, 5), (1, 4)]);
        assert_eq!(state.board.get(2, 6), Some(Tile::Empty));
        assert_eq!(state.board.get(1, 5), Some(Tile::Empty));
        assert_eq!(state.board.get(2, 3), Some(Tile::Purple));
        assert_eq!(state.board.filled_count(), 4);
    }

    #[test]
    fn test_try_move_failure_leaves_everything_unchanged() {
        let (mut state, _) = started(&[Tile::Purple]);
        lower(&mut state, 3);
        let mut board = state.board.clone();
        board.set(3, 4, Tile::Red);
        state.load_board(board);

        let before_board = state.board.clone();
        let before_piece = state.current.unwrap();

        let candidates = [
            translate(&before_piece.loc, (0, -5)), // past the left wall
            translate(&before_piece.loc, (0, 4)),  // past the right wall
            translate(&before_piece.loc, (18, 0)), // below the floor
            before_piece.down(),                   // onto the red cell
        ];
        for candidate in candidates {
            assert!(!state.try_move(candidate));
            assert_eq!(state.board, before_board);
            assert_eq!(state.current.unwrap(), before_piece);
        }
    }

    #[test]
    fn test_square_never_rotates() {
        let (mut state, _) = started(&[Tile::Yellow]);
        lower(&mut state, 5);
        let before = state.current.unwrap();

        assert!(!state.try_rotate());
        assert!(!state.handle_command(Command::Rotate, Instant::now()));
        assert_eq!(state.current.unwrap(), before);
    }

    #[test]
    fn test_rotation_without_kick() {
        let (mut state, _) = started(&[Tile::Purple]);
        lower(&mut state, 5);
        let naive = state.current.unwrap().rotate().unwrap();

        assert!(state.try_rotate());
        let piece = state.current.unwrap();
        assert_eq!(piece.loc, naive);
        assert_eq!(piece.rotation, 1);
    }

    #[test]
    fn test_rotation_uses_first_fitting_kick() {
        let (mut state, _) = started(&[Tile::Purple]);
        lower(&mut state, 5);
        // Piece: (4,4) (4,5) (4,6) (3,5); plain rotation: (3,5) (4,5) (5,5) (4,6).
        let mut board = state.board.clone();
        board.set(5, 5, Tile::Red); // blocks the plain rotation
        board.set(5, 4, Tile::Red); // blocks kick (0,-1)
        state.load_board(board);

        assert!(state.try_rotate());
        let piece = state.current.unwrap();
        // Kick (-1,-1) applied to the plain rotation.
        assert_eq!(piece.loc, [(2, 4), (3, 4), (4, 4), (3, 5)]);
        assert_eq!(piece.rotation, 1);
    }

    /// Stand the line piece up at column 5, rows 3-6 (rotation 1)
    fn upright_line() -> GameState {
        let (mut state, _) = started(&[Tile::LightBlue]);
        lower(&mut state, 5);
        assert!(state.try_rotate());
        assert_eq!(state.current.unwrap().loc, [(3, 5), (4, 5), (5, 5), (6, 5)]);
        state
    }

    fn upright_line_at_left_wall() -> GameState {
        let mut state = upright_line();
        for _ in 0..5 {
            let left = state.current.unwrap().left();
            assert!(state.try_move(left));
        }
        assert_eq!(state.current.unwrap().loc, [(3, 0), (4, 0), (5, 0), (6, 0)]);
        state
    }

    #[test]
    fn test_line_rotation_kicks_off_the_left_wall() {
        // Plain rotation and kick (0,-1) leave the field; (0,2) fits.
        let mut state = upright_line_at_left_wall();
        assert!(state.try_rotate());
        let piece = state.current.unwrap();
        assert_eq!(piece.loc, [(5, 3), (5, 2), (5, 1), (5, 0)]);
        assert_eq!(piece.rotation, 2);
    }

    #[test]
    fn test_line_rotation_at_wall_falls_through_to_last_kick() {
        // With (0,2) blocked, (-2,-1) also leaves the field and (1,2) wins.
        let mut state = upright_line_at_left_wall();
        let mut board = state.board.clone();
        board.set(5, 3, Tile::Red);
        state.load_board(board);

        assert!(state.try_rotate());
        let piece = state.current.unwrap();
        assert_eq!(piece.loc, [(6, 3), (6, 2), (6, 1), (6, 0)]);
        assert_eq!(piece.rotation, 2);
    }

    #[test]
    fn test_line_rotation_takes_first_fitting_kick_in_open_field() {
        let mut state = upright_line();
        // Plain rotation: row 5, columns 3-6.
        let mut board = state.board.clone();
        board.set(5, 3, Tile::Red); // blocks the plain rotation and kick (0,-1)
        board.set(5, 7, Tile::Red); // blocks kick (0,2)
        state.load_board(board);

        assert!(state.try_rotate());
        let piece = state.current.unwrap();
        // Kick (-2,-1); the piece's own cell at (3,5) does not block it.
        assert_eq!(piece.loc, [(3, 5), (3, 4), (3, 3), (3, 2)]);
        assert_eq!(piece.rotation, 2);
        assert_eq!(state.board.get(5, 5), Some(Tile::Empty));
        assert_eq!(state.board.get(3, 2), Some(Tile::LightBlue));
    }

    #[test]
    fn test_rotation_rejected_when_no_kick_fits() {
        let (mut state, _) = started(&[Tile::Purple]);
        lower(&mut state, 5);
        let piece = state.current.unwrap();

        // Everything solid except the piece itself.
        let mut board = Board::new();
        for row in 0..BOARD_HEIGHT as i8 {
            for col in 0..BOARD_WIDTH as i8 {
                if !piece.loc.contains(&(row, col)) {
                    board.set(row, col, Tile::Blue);
                }
            }
        }
        state.load_board(board);
        let before_board = state.board.clone();

        assert!(!state.try_rotate());
        assert_eq!(state.current.unwrap(), piece);
        assert_eq!(state.board, before_board);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for tile in [Tile::LightBlue, Tile::Purple, Tile::Orange, Tile::Blue, Tile::Green, Tile::Red] {
            let (mut state, _) = started(&[tile]);
            lower(&mut state, 8);
            let before = state.current.unwrap();
            for _ in 0..4 {
                assert!(state.try_rotate(), "{:?} failed to rotate in open space", tile);
            }
            assert_eq!(state.current.unwrap(), before);
        }
    }

    #[test]
    fn test_gravity_waits_for_interval() {
        let (mut state, t0) = started(&[Tile::Purple]);
        let spawn = state.current.unwrap().loc;

        assert!(!state.update(t0 + ms(999)));
        assert_eq!(state.current.unwrap().loc, spawn);

        assert!(state.update(t0 + ms(1000)));
        assert_eq!(state.current.unwrap().loc, translate(&spawn, (1, 0)));
        assert_eq!(
            state.phase,
            Phase::Falling {
                last_drop: t0 + ms(1000)
            }
        );
    }

    #[test]
    fn test_grounded_piece_locks_after_delay() {
        let (mut state, t0) = started(&[Tile::Yellow, Tile::Red]);
        lower(&mut state, 20); // square rests on the floor: rows 18-19

        let t1 = t0 + ms(1000);
        assert!(state.update(t1));
        assert_eq!(state.phase, Phase::Locking { since: t1 });

        assert!(!state.update(t1 + ms(499)));
        assert_eq!(state.current.unwrap().tile, Tile::Yellow);

        assert!(state.update(t1 + ms(500)));
        assert_eq!(state.current.unwrap().tile, Tile::Red);
        assert_eq!(state.board.get(19, 4), Some(Tile::Yellow));
        assert_eq!(state.board.filled_count(), 4);
        assert!(state.can_hold);
    }

    #[test]
    fn test_lock_cancelled_when_piece_can_fall_again() {
        let (mut state, t0) = started(&[Tile::Yellow]);
        state.load_board(Board::from_rows(&["....##...."]));
        lower(&mut state, 19); // square on top of the ledge: rows 17-18

        let t1 = t0 + ms(1000);
        assert!(state.update(t1));
        assert!(matches!(state.phase, Phase::Locking { .. }));

        // Slide off the ledge during the grace period.
        assert!(state.handle_command(Command::Left, t1 + ms(100)));
        assert!(state.handle_command(Command::Left, t1 + ms(100)));

        assert!(state.update(t1 + ms(500)));
        assert_eq!(
            state.phase,
            Phase::Falling {
                last_drop: t1 + ms(500)
            }
        );
        assert_eq!(state.current.unwrap().loc, [(19, 2), (19, 3), (18, 2), (18, 3)]);
    }

    #[test]
    fn test_soft_drop_off_a_ledge_resumes_falling() {
        let (mut state, t0) = started(&[Tile::Yellow]);
        state.load_board(Board::from_rows(&["....##...."]));
        lower(&mut state, 19);

        let t1 = t0 + ms(1000);
        assert!(state.update(t1));
        assert_eq!(state.phase, Phase::Locking { since: t1 });

        assert!(state.handle_command(Command::Left, t1 + ms(100)));
        assert!(state.handle_command(Command::Left, t1 + ms(100)));
        assert!(state.handle_command(Command::SoftDrop, t1 + ms(200)));
        assert_eq!(
            state.phase,
            Phase::Falling {
                last_drop: t1 + ms(200)
            }
        );
        assert_eq!(state.current.unwrap().loc, [(19, 2), (19, 3), (18, 2), (18, 3)]);

        // The old lock deadline no longer applies.
        assert!(!state.update(t1 + ms(500)));
        assert_eq!(state.current.unwrap().tile, Tile::Yellow);
        assert_eq!(state.board.filled_count(), 6);
    }

    #[test]
    fn test_soft_drop_places_immediately_on_failure() {
        let (mut state, t0) = started(&[Tile::Yellow, Tile::Green]);
        lower(&mut state, 20);

        assert!(state.handle_command(Command::SoftDrop, t0));
        assert_eq!(state.current.unwrap().tile, Tile::Green);
        assert_eq!(state.board.get(18, 5), Some(Tile::Yellow));
    }

    #[test]
    fn test_hard_drop_places_at_the_bottom() {
        let (mut state, t0) = started(&[Tile::LightBlue, Tile::Red]);
        assert!(state.handle_command(Command::HardDrop, t0));

        for col in 3..=6 {
            assert_eq!(state.board.get(19, col), Some(Tile::LightBlue));
        }
        assert_eq!(state.current.unwrap().tile, Tile::Red);
        assert_eq!(state.score, 0);
    }

    /// Fill the bottom `rows` rows except column 9, then drop a vertical line
    /// into column 9.
    fn drop_line_into_well(state: &mut GameState, rows: usize, now: Instant) {
        let well = vec!["#########."; rows];
        state.load_board(Board::from_rows(&well));
        assert_eq!(state.current.unwrap().tile, Tile::LightBlue);
        assert!(state.handle_command(Command::Rotate, now));
        for _ in 0..4 {
            assert!(state.handle_command(Command::Right, now));
        }
        assert!(state.handle_command(Command::HardDrop, now));
    }

    #[test]
    fn test_scoring_table_at_level_one() {
        for (rows, points) in [(1usize, 80u32), (2, 200), (3, 600), (4, 2400)] {
            let (mut state, t0) = started(&[Tile::LightBlue]);
            drop_line_into_well(&mut state, rows, t0);

            assert_eq!(state.score, points, "{} rows", rows);
            assert_eq!(state.lines, rows as u32);
            match &state.phase {
                Phase::Clearing { rows: pending, .. } => {
                    let expected: Vec<usize> = (20 - rows..20).rev().collect();
                    assert_eq!(pending.as_slice(), expected.as_slice());
                }
                other => panic!("expected clearing, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_clear_waits_for_delay_then_compacts() {
        let (mut state, t0) = started(&[Tile::LightBlue]);
        drop_line_into_well(&mut state, 1, t0);

        assert!(state.current.is_none());
        assert!(!state.update(t0 + ms(99)));
        assert!(state.board.is_row_full(19));

        assert!(state.update(t0 + ms(100)));
        assert!(!state.board.is_row_full(19));
        // The three cells of the line above the cleared row fell by one.
        assert_eq!(state.board.get(19, 9), Some(Tile::LightBlue));
        assert_eq!(state.board.get(17, 9), Some(Tile::LightBlue));
        assert_eq!(state.board.get(16, 9), Some(Tile::Empty));
        assert_eq!(state.board.filled_count(), 3);
        assert!(state.current.is_some());
    }

    #[test]
    fn test_commands_ignored_while_clearing() {
        let (mut state, t0) = started(&[Tile::LightBlue]);
        drop_line_into_well(&mut state, 2, t0);
        let board = state.board.clone();

        for cmd in [Command::Left, Command::Rotate, Command::HardDrop, Command::Hold] {
            assert!(!state.handle_command(cmd, t0));
        }
        assert_eq!(state.board, board);
    }

    #[test]
    fn test_level_promotes_every_ten_rows() {
        let (mut state, mut now) = started(&[Tile::LightBlue]);

        for round in 0..3 {
            drop_line_into_well(&mut state, 4, now);
            now += ms(100);
            assert!(state.update(now), "round {}", round);
        }

        // 2400 * 3 at level 1, promotion happens after scoring the third.
        assert_eq!(state.score, 7200);
        assert_eq!(state.lines, 12);
        assert_eq!(state.level, 2);
        assert_eq!(state.clears, 2);

        drop_line_into_well(&mut state, 1, now);
        assert_eq!(state.score, 7200 + 40 * 3);
    }

    #[test]
    fn test_first_hold_banks_current_and_promotes_next() {
        let (mut state, t0) = started(&[Tile::Red, Tile::Green, Tile::Blue]);
        lower(&mut state, 4);
        let drawn_before = state.board.filled_count();
        assert!(drawn_before > 0);

        assert!(state.handle_command(Command::Hold, t0));
        assert_eq!(state.held.unwrap(), Piece::new(Tile::Red));
        assert_eq!(state.current.unwrap(), Piece::new(Tile::Green));
        assert_eq!(state.next.unwrap().tile, Tile::Blue);
        assert!(!state.can_hold);
        assert_eq!(state.board.filled_count(), 0);

        // Second hold before placement is a no-op.
        assert!(!state.handle_command(Command::Hold, t0));
        assert_eq!(state.held.unwrap().tile, Tile::Red);
        assert_eq!(state.current.unwrap().tile, Tile::Green);
    }

    #[test]
    fn test_hold_swaps_after_placement() {
        let (mut state, t0) = started(&[Tile::Red, Tile::Green, Tile::Blue, Tile::Orange]);
        assert!(state.handle_command(Command::Hold, t0));
        // Green is current; place it.
        assert!(state.handle_command(Command::HardDrop, t0));
        assert!(state.can_hold);
        assert_eq!(state.current.unwrap().tile, Tile::Blue);

        lower(&mut state, 3);
        assert!(state.handle_command(Command::Hold, t0));
        assert_eq!(state.current.unwrap(), Piece::new(Tile::Red));
        assert_eq!(state.held.unwrap(), Piece::new(Tile::Blue));
        assert_eq!(state.next.unwrap().tile, Tile::Orange);
        assert!(!state.can_hold);
    }

    #[test]
    fn test_pause_blocks_everything_but_pause() {
        let (mut state, t0) = started(&[Tile::Purple]);
        let spawn = state.current.unwrap();

        assert!(state.handle_command(Command::Pause, t0));
        assert!(state.paused);
        for cmd in [Command::Left, Command::Right, Command::Rotate, Command::HardDrop] {
            assert!(!state.handle_command(cmd, t0));
        }
        assert!(!state.update(t0 + ms(5000)));
        assert_eq!(state.current.unwrap(), spawn);

        assert!(state.handle_command(Command::Pause, t0 + ms(5000)));
        assert!(!state.paused);
        // Time spent paused does not count toward gravity.
        assert!(!state.update(t0 + ms(5999)));
        assert!(state.update(t0 + ms(6000)));
        assert_eq!(state.current.unwrap().loc, spawn.down());
    }

    #[test]
    fn test_commands_ignored_before_start() {
        let mut state = GameState::with_seed(3);
        for cmd in Command::ALL {
            assert!(!state.handle_command(cmd, Instant::now()));
        }
        assert!(!state.update(Instant::now()));
        assert!(!state.paused);
    }

    #[test]
    fn test_blocked_spawn_ends_game_and_keeps_board() {
        let (mut state, t0) = started(&[Tile::Orange, Tile::Red]);
        // Columns 1-9 stacked to the top; column 0 keeps every row incomplete.
        let stack = Board::from_rows(&vec![".#########"; 20]);
        state.load_board(stack.clone());

        assert!(state.handle_command(Command::HardDrop, t0));
        assert!(state.game_over);
        assert!(!state.started);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.board, stack);
        assert!(state.current.is_none());

        // Nothing moves once the game is over.
        assert!(!state.update(t0 + ms(10_000)));
        assert!(!state.handle_command(Command::Left, t0));
    }

    #[test]
    fn test_blocked_spawn_ends_game_through_gravity() {
        let (mut state, t0) = started(&[Tile::Purple]);
        let stack = Board::from_rows(&vec!["....#....."; 20]);
        state.load_board(stack.clone());

        assert!(state.update(t0 + ms(1000)));
        assert!(matches!(state.phase, Phase::Locking { .. }));
        assert!(state.update(t0 + ms(1500)));
        assert!(state.game_over);
        assert_eq!(state.board, stack);
    }

    #[test]
    fn test_start_after_game_over_resets() {
        let (mut state, t0) = started(&[Tile::LightBlue]);
        drop_line_into_well(&mut state, 1, t0);
        state.update(t0 + ms(100));
        state.load_board(Board::from_rows(&vec!["....#....."; 20]));
        state.handle_command(Command::HardDrop, t0 + ms(200));
        assert!(state.game_over);
        assert_eq!(state.score, 80);

        assert!(state.start_if_idle(t0 + ms(300)));
        assert!(state.started);
        assert!(!state.game_over);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.board.filled_count(), 0);
        assert!(state.held.is_none());

        assert!(!state.start_if_idle(t0 + ms(400)));
    }

    #[test]
    fn test_ghost_projects_to_landing_cells() {
        let (mut state, _) = started(&[Tile::LightBlue]);
        state.load_board(Board::from_rows(&["#.........", "##########"]));
        lower(&mut state, 2);

        assert_eq!(state.ghost(), Some([(18, 3), (18, 4), (18, 5), (18, 6)]));
        // Probing the ghost never touches the board.
        assert_eq!(state.board.get(1, 3), Some(Tile::LightBlue));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut state, t0) = started(&[Tile::Green, Tile::Blue, Tile::Red]);
        state.handle_command(Command::Hold, t0);
        let snap = state.snapshot();

        assert!(snap.started);
        assert!(!snap.can_hold);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.held.unwrap().tile, Tile::Green);
        assert_eq!(snap.held.unwrap().loc, spawn_loc(Tile::Green));
        assert_eq!(snap.next.unwrap().tile, Tile::Red);
        assert!(snap.ghost.is_some());
        assert!(!snap.clearing);
    }
}
