//! Game session.
//!
//! A GameSession runs one live game. The [`RulesEngine`] is the system of
//! record; every accepted move is mirrored into a display [`Game`] and a
//! [`Navigator`] so a viewer can scrub through the moves. The session owns its
//! [`ComputerPlayer`] and talks to it over a channel.
//!
//! Computer replies are tagged with the session's generation, which changes
//! whenever the live game changes. A reply whose tag does not match the
//! current generation was computed for a position that is gone and is dropped.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::coretypes::{Color, Move, Square, MAX_HISTORY};
use crate::engine::{ComputerPlayer, Difficulty, EngineReply};
use crate::error::{self, Error, ErrorKind};
use crate::fen::Fen;
use crate::game::Game;
use crate::navigation::Navigator;
use crate::position::Position;
use crate::report;
use crate::rules::{PlayedMove, RulesEngine, ShakmatyRules};

const COMPUTER_MOVE_FAILED: &str = "Computer move failed";
const INVALID_POSITION: &str = "Invalid game position";

/// Who controls each side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GameMode {
    HumanVsHuman,
    HumanVsComputer,
    ComputerVsComputer,
}

impl GameMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GameMode::HumanVsHuman => "human-vs-human",
            GameMode::HumanVsComputer => "human-vs-computer",
            GameMode::ComputerVsComputer => "computer-vs-computer",
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::HumanVsHuman
    }
}

impl Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts short forms `hh`, `hc`, `cc` and the displayed names.
impl FromStr for GameMode {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hh" | "human-vs-human" => Ok(GameMode::HumanVsHuman),
            "hc" | "human-vs-computer" => Ok(GameMode::HumanVsComputer),
            "cc" | "computer-vs-computer" => Ok(GameMode::ComputerVsComputer),
            _ => Err((ErrorKind::ParseGameModeMalformed, s).into()),
        }
    }
}

/// Outcome of a finished game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Winner::White,
            Color::Black => Winner::Black,
        }
    }
}

impl Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Winner::White => "White",
            Winner::Black => "Black",
            Winner::Draw => "Draw",
        };
        f.write_str(s)
    }
}

/// GameSession holds the live game, its navigable record, and the computer player.
pub struct GameSession<R: RulesEngine = ShakmatyRules> {
    rules: R,
    record: Game,
    navigator: Navigator,
    computer: ComputerPlayer,

    mode: GameMode,
    player_white: bool,
    status: String,
    debug: bool,

    generation: u64,
    sender: Sender<EngineReply>,
    receiver: Receiver<EngineReply>,
}

impl GameSession<ShakmatyRules> {
    /// Create a session in the standard start position.
    pub fn new(computer: ComputerPlayer) -> Self {
        let (sender, receiver) = mpsc::channel();
        let debug = computer.debug();

        Self {
            rules: ShakmatyRules::start_position(),
            record: Game::start_position(),
            navigator: Navigator::from(Position::start_position()),
            computer,
            mode: GameMode::default(),
            player_white: true,
            status: String::new(),
            debug,
            generation: 0,
            sender,
            receiver,
        }
    }
}

impl<R: RulesEngine> GameSession<R> {
    /// Create a session around an existing live game.
    /// Err if the game cannot be mirrored into a display record.
    pub fn with_rules(rules: R, computer: ComputerPlayer) -> error::Result<Self> {
        let (record, navigator) = mirror(&rules)?;
        let (sender, receiver) = mpsc::channel();
        let debug = computer.debug();

        Ok(Self {
            rules,
            record,
            navigator,
            computer,
            mode: GameMode::default(),
            player_white: true,
            status: String::new(),
            debug,
            generation: 0,
            sender,
            receiver,
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Display record of the live game.
    pub fn game(&self) -> &Game {
        &self.record
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Position at the navigator's cursor.
    pub fn viewed_position(&self) -> error::Result<Position> {
        self.navigator.position()
    }

    pub fn computer(&self) -> &ComputerPlayer {
        &self.computer
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn player_white(&self) -> bool {
        self.player_white
    }

    pub fn difficulty(&self) -> Difficulty {
        self.computer.difficulty()
    }

    /// Last status message, empty if the last action succeeded quietly.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Changes whenever the live game changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fen(&self) -> String {
        self.rules.fen()
    }

    pub fn turn(&self) -> Color {
        self.rules.turn()
    }

    pub fn is_game_over(&self) -> bool {
        self.rules.is_game_over()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.computer.set_debug(debug);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.computer.set_difficulty(difficulty);
    }

    /// Choose the human player's side in human vs computer games.
    pub fn set_player_white(&mut self, player_white: bool) {
        self.player_white = player_white;
        self.invalidate();
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.invalidate();
    }

    /// True if the side to move is played by the computer.
    pub fn is_computer_turn(&self) -> bool {
        match self.mode {
            GameMode::HumanVsHuman => false,
            GameMode::HumanVsComputer => self.player_color() != self.rules.turn(),
            GameMode::ComputerVsComputer => true,
        }
    }

    /// The winner of a finished game, or None while the game goes on.
    pub fn winner(&self) -> Option<Winner> {
        if self.rules.is_checkmate() {
            Some(Winner::from(!self.rules.turn()))
        } else if self.rules.is_draw() {
            Some(Winner::Draw)
        } else {
            None
        }
    }

    /// Play a human move from `from` to `to`. Pawns reaching the last rank become queens.
    /// Returns false and sets the status if the move is not legal.
    pub fn make_move(&mut self, from: Square, to: Square) -> bool {
        self.submit_move(Move::new(from, to, None))
    }

    /// Play a human move with an explicit promotion piece.
    /// Returns false and sets the status if the move is not legal.
    pub fn submit_move(&mut self, move_: Move) -> bool {
        match self.play(move_) {
            Ok(_) => {
                self.status.clear();
                true
            }
            Err(err) => {
                report::debug(self.debug, &format!("rejected {move_}: {err}")).ok();
                self.status = format!("Invalid move: {} -> {}", move_.from(), move_.to());
                false
            }
        }
    }

    /// Start a new game from the standard start position.
    pub fn reset(&mut self) {
        self.halt_computer();
        self.rules = R::start_position();
        self.record = Game::start_position();
        self.navigator = Navigator::from(Position::start_position());
        self.status.clear();
        self.invalidate();
    }

    /// Replace the live game with one starting at `fen`.
    /// On Err the status is set and the current game is kept.
    pub fn load_fen(&mut self, fen: &str) -> error::Result<()> {
        let loaded = R::from_fen(fen).and_then(|rules| {
            let (record, navigator) = mirror(&rules)?;
            Ok((rules, record, navigator))
        });

        match loaded {
            Ok((rules, record, navigator)) => {
                self.halt_computer();
                self.rules = rules;
                self.record = record;
                self.navigator = navigator;
                self.status.clear();
                self.invalidate();
                Ok(())
            }
            Err(err) => {
                report::debug(self.debug, &format!("load fen failed: {err}")).ok();
                self.status = INVALID_POSITION.to_string();
                Err(err)
            }
        }
    }

    /// Take back the last move. The live game is rebuilt from its start FEN
    /// by replaying all but the last move.
    /// Returns false if there is no move to take back.
    pub fn undo(&mut self) -> bool {
        let history = self.rules.history();
        let Some((_, kept)) = history.split_last() else {
            return false;
        };
        let kept: Vec<Move> = kept.iter().map(|played| played.move_).collect();

        let replayed = R::from_fen(self.rules.start_fen()).and_then(|mut rules| {
            for move_ in kept {
                rules.play(move_)?;
            }
            Ok(rules)
        });
        let rules = match replayed {
            Ok(rules) => rules,
            Err(err) => {
                report::error(&format!("undo failed: {err}")).ok();
                return false;
            }
        };

        self.halt_computer();
        self.rules = rules;
        match self.record.undo_last_move() {
            Some(_) => self.navigator.update_moves(self.record.moves()),
            None => self.resync_record(),
        }
        self.status.clear();
        self.invalidate();
        true
    }

    /// Ask the computer for a move if it is the computer's turn and the game
    /// is not over. Any request already in flight is stopped first.
    /// Returns Ok(true) if a request was sent.
    pub fn request_computer_move(&mut self) -> error::Result<bool> {
        if !self.is_computer_turn() || self.is_game_over() {
            return Ok(false);
        }

        self.halt_computer();
        self.computer
            .request(self.rules.fen(), self.generation, self.sender.clone())?;
        Ok(true)
    }

    /// Play a computer reply if it is for the current position.
    ///
    /// Stale replies are dropped with Ok(None). A failed or illegal reply sets
    /// the status and is returned as an error with kind `EngineMoveFailure`.
    pub fn accept_reply(&mut self, reply: EngineReply) -> error::Result<Option<PlayedMove>> {
        if reply.tag != self.generation {
            report::debug(
                self.debug,
                &format!("dropped stale reply {} for {}", reply.tag, reply.fen),
            )
            .ok();
            return Ok(None);
        }

        let played = reply.result.and_then(|move_| self.play(move_));
        match played {
            Ok(played) => {
                self.status = match self.mode {
                    GameMode::ComputerVsComputer => {
                        format!("{} Computer played: {}", played.color.name(), played.san)
                    }
                    _ => format!("Computer played: {}", played.san),
                };
                Ok(Some(played))
            }
            Err(err) => {
                report::error(&format!("computer move: {err}")).ok();
                self.status = COMPUTER_MOVE_FAILED.to_string();
                Err(Error::new(ErrorKind::EngineMoveFailure, err))
            }
        }
    }

    /// Play the computer's move if a current reply has arrived, without blocking.
    pub fn poll_computer(&mut self) -> error::Result<Option<PlayedMove>> {
        while let Ok(reply) = self.receiver.try_recv() {
            if let Some(played) = self.accept_reply(reply)? {
                return Ok(Some(played));
            }
        }
        Ok(None)
    }

    /// Block until the computer's move for the current position is played.
    /// Err with kind `EngineMoveFailure` if no current reply arrives within `timeout`.
    pub fn wait_computer(&mut self, timeout: Duration) -> error::Result<PlayedMove> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(played) = self.accept_reply(reply)? {
                        return Ok(played);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    self.status = COMPUTER_MOVE_FAILED.to_string();
                    return Err((ErrorKind::EngineMoveFailure, "timed out").into());
                }
            }
        }
    }

    /// Stop any computer request and forget replies already sent.
    pub fn halt_computer(&mut self) {
        self.computer.stop();
        self.computer.wait();
        while self.receiver.try_recv().is_ok() {}
    }

    fn player_color(&self) -> Color {
        if self.player_white {
            Color::White
        } else {
            Color::Black
        }
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Play on the live game and mirror the move into the record.
    /// Once the rules engine accepts a move it counts as played, even if the
    /// record has to be rebuilt to follow it.
    fn play(&mut self, move_: Move) -> error::Result<PlayedMove> {
        if self.record.len() >= MAX_HISTORY {
            return Err(ErrorKind::MoveHistoryExceeded.into());
        }
        let played = self.rules.play(move_)?;
        match self.record.make_move(played.move_) {
            Ok(()) => self.navigator.update_moves(self.record.moves()),
            Err(err) => {
                report::error(&format!("record rejected {}: {err}", played.move_)).ok();
                self.resync_record();
            }
        }
        self.invalidate();

        report::debug(self.debug, &format!("played {} ({})", played.san, played.move_)).ok();
        Ok(played)
    }

    /// Rebuild the record and navigator from the live game.
    /// If the history cannot be replayed the record restarts at the live position.
    fn resync_record(&mut self) {
        let (record, navigator) = match mirror(&self.rules) {
            Ok(mirrored) => mirrored,
            Err(err) => {
                report::error(&format!("replay of live game failed: {err}")).ok();
                match Position::parse_fen(&self.rules.fen()) {
                    Ok(position) => (Game::from(position), Navigator::from(position)),
                    Err(err) => {
                        report::error(&format!("live position unreadable: {err}")).ok();
                        return;
                    }
                }
            }
        };
        self.record = record;
        self.navigator = navigator;
    }
}

/// Build a display record and an end-of-game navigator from a live game.
fn mirror<R: RulesEngine>(rules: &R) -> error::Result<(Game, Navigator)> {
    let base = Position::parse_fen(rules.start_fen())?;
    let mut record = Game::from(base);
    for played in rules.history() {
        record.make_move(played.move_)?;
    }
    let navigator = Navigator::at_end(record.moves(), base);

    Ok((record, navigator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::{Piece, PieceKind, Square::*};
    use crate::engine::ComputerPlayerBuilder;
    use crate::navigation::compute_position;

    fn quick_session(seed: u64) -> GameSession {
        let computer = ComputerPlayerBuilder::new()
            .think_cap(Duration::ZERO)
            .seed(seed)
            .build();
        GameSession::new(computer)
    }

    #[test]
    fn parse_game_mode() {
        assert_eq!("hh".parse::<GameMode>().unwrap(), GameMode::HumanVsHuman);
        assert_eq!("HC".parse::<GameMode>().unwrap(), GameMode::HumanVsComputer);
        assert_eq!(
            "computer-vs-computer".parse::<GameMode>().unwrap(),
            GameMode::ComputerVsComputer
        );
        let err = "hx".parse::<GameMode>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseGameModeMalformed);
    }

    #[test]
    fn human_move_updates_record_and_navigator() {
        let mut session = quick_session(0);
        let generation = session.generation();

        assert!(session.make_move(E2, E4));
        assert_eq!(session.status(), "");
        assert_eq!(session.game().len(), 1);
        assert_eq!(session.navigator().index(), 1);
        assert_eq!(session.turn(), Color::Black);
        assert_ne!(session.generation(), generation);
        assert_eq!(
            session.viewed_position().unwrap().piece_at(E4),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn illegal_move_sets_status() {
        let mut session = quick_session(0);
        assert!(!session.make_move(E2, E5));
        assert_eq!(session.status(), "Invalid move: e2 -> e5");
        assert!(session.game().is_empty());

        assert!(session.make_move(G1, F3));
        assert_eq!(session.status(), "");
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut session = quick_session(0);
        session.load_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        assert!(session.make_move(A7, A8));
        assert_eq!(
            session.game().position().piece_at(A8),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
        assert_eq!(
            session.rules().history()[0].move_,
            Move::new(A7, A8, Some(PieceKind::Queen))
        );
    }

    #[test]
    fn load_fen_failure_keeps_game() {
        let mut session = quick_session(0);
        session.make_move(D2, D4);
        let fen = session.fen();

        assert!(session.load_fen("rnbqkbnr/pppppppp w").is_err());
        assert_eq!(session.status(), "Invalid game position");
        assert_eq!(session.fen(), fen);
        assert_eq!(session.game().len(), 1);
    }

    #[test]
    fn load_fen_sets_navigator_base() {
        let mut session = quick_session(0);
        let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 3 40";
        session.load_fen(fen).unwrap();

        assert_eq!(session.navigator().base_position().to_fen(), fen);
        assert!(session.navigator().is_empty());
        assert_eq!(session.turn(), Color::Black);
    }

    #[test]
    fn undo_replays_from_start() {
        let mut session = quick_session(0);
        session.make_move(E2, E4);
        let after_first = session.fen();
        session.make_move(E7, E5);

        assert!(session.undo());
        assert_eq!(session.fen(), after_first);
        assert_eq!(session.game().len(), 1);
        assert_eq!(session.navigator().len(), 1);
        assert_eq!(session.rules().history().len(), 1);

        assert!(session.undo());
        assert!(!session.undo());
        assert_eq!(*session.game().position(), Position::start_position());
    }

    #[test]
    fn computer_turn_by_mode() {
        let mut session = quick_session(0);
        assert!(!session.is_computer_turn());

        session.set_mode(GameMode::HumanVsComputer);
        assert!(!session.is_computer_turn());
        session.set_player_white(false);
        assert!(!session.player_white());
        assert!(session.is_computer_turn());

        session.set_mode(GameMode::ComputerVsComputer);
        assert!(session.is_computer_turn());
    }

    #[test]
    fn winner_from_rules() {
        let mut session = quick_session(0);
        assert_eq!(session.winner(), None);

        session
            .load_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert_eq!(session.winner(), Some(Winner::Black));
        assert!(session.is_game_over());

        session.load_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(session.winner(), Some(Winner::Draw));
    }

    #[test]
    fn computer_answers_human() {
        let mut session = quick_session(1);
        session.set_mode(GameMode::HumanVsComputer);
        assert!(!session.request_computer_move().unwrap());

        session.make_move(E2, E4);
        assert!(session.request_computer_move().unwrap());
        let played = session.wait_computer(Duration::from_secs(5)).unwrap();

        assert_eq!(played.color, Color::Black);
        assert_eq!(session.status(), format!("Computer played: {}", played.san));
        assert_eq!(session.game().len(), 2);
        assert!(!session.is_computer_turn());
    }

    #[test]
    fn computers_play_each_other() {
        let mut session = quick_session(2);
        session.set_mode(GameMode::ComputerVsComputer);

        for ply in 0..6 {
            assert!(session.request_computer_move().unwrap());
            let played = session.wait_computer(Duration::from_secs(5)).unwrap();
            let color = if ply % 2 == 0 { "White" } else { "Black" };
            assert_eq!(session.status(), format!("{color} Computer played: {}", played.san));
        }
        assert_eq!(session.game().len(), 6);

        let moves = session.game().moves();
        let expected = compute_position(&Position::start_position(), &moves, None).unwrap();
        assert_eq!(session.viewed_position().unwrap(), expected);
    }

    #[test]
    fn stale_reply_is_dropped() {
        let mut session = quick_session(0);
        session.set_mode(GameMode::HumanVsComputer);
        session.set_player_white(false);
        let stale_tag = session.generation();

        session.set_mode(GameMode::HumanVsHuman);
        session.make_move(E2, E4);
        let fen = session.fen();

        let reply = EngineReply {
            tag: stale_tag,
            fen: crate::rules::START_FEN.to_string(),
            result: Ok(Move::new(D2, D4, None)),
        };
        assert!(session.accept_reply(reply).unwrap().is_none());
        assert_eq!(session.fen(), fen);
        assert_eq!(session.game().len(), 1);
    }

    #[test]
    fn reset_discards_request_in_flight() {
        let mut session = quick_session(3);
        session.set_mode(GameMode::HumanVsComputer);
        session.set_player_white(false);

        assert!(session.request_computer_move().unwrap());
        session.reset();
        session.set_mode(GameMode::HumanVsHuman);

        assert!(session.poll_computer().unwrap().is_none());
        assert!(session.game().is_empty());
        assert!(session.computer().ready());
    }

    #[test]
    fn failed_reply_sets_status() {
        let mut session = quick_session(0);

        let illegal = EngineReply {
            tag: session.generation(),
            fen: session.fen(),
            result: Ok(Move::new(E2, E5, None)),
        };
        let err = session.accept_reply(illegal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineMoveFailure);
        assert_eq!(session.status(), "Computer move failed");

        let failed = EngineReply {
            tag: session.generation(),
            fen: session.fen(),
            result: Err(ErrorKind::EngineMoveFailure.into()),
        };
        assert!(session.accept_reply(failed).is_err());
        assert!(session.game().is_empty());
    }

    #[test]
    fn wait_without_request_times_out() {
        let mut session = quick_session(0);
        let err = session.wait_computer(Duration::from_millis(20)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineMoveFailure);
    }

    #[test]
    fn record_follows_live_game_when_out_of_step() {
        let mut session = quick_session(0);
        let bare = Position::parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        session.record = Game::from(bare);
        session.navigator = Navigator::from(bare);
        let generation = session.generation();

        assert!(session.make_move(E2, E4));
        assert_eq!(session.status(), "");
        assert_ne!(session.generation(), generation);
        assert_eq!(session.game().len(), 1);
        assert_eq!(session.navigator().index(), 1);
        assert_eq!(*session.game().base_position(), Position::start_position());
        assert_eq!(session.viewed_position().unwrap(), *session.game().position());
    }

    #[test]
    fn with_rules_mirrors_existing_history() {
        let mut rules = ShakmatyRules::from_fen("4k3/8/8/8/8/8/4P3/R3K2R w KQ - 0 12").unwrap();
        for move_ in [Move::new(E1, C1, None), Move::new(E8, D7, None), Move::new(D1, D5, None)] {
            rules.play(move_).unwrap();
        }
        let computer = ComputerPlayerBuilder::new().think_cap(Duration::ZERO).build();
        let mut session = GameSession::with_rules(rules, computer).unwrap();

        assert_eq!(session.game().len(), 3);
        assert_eq!(session.navigator().index(), 3);
        assert_eq!(
            session.navigator().base_position().to_fen(),
            "4k3/8/8/8/8/8/4P3/R3K2R w KQ - 0 12"
        );
        assert_eq!(
            session.game().position().piece_at(D5),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(session.game().position().piece_at(A1), None);

        assert!(session.undo());
        assert_eq!(session.game().len(), 2);
        assert_eq!(session.rules().history().len(), 2);
    }
}
