//! Computer player.
//!
//! A ComputerPlayer picks a move for the side to move in a FEN position.
//! Moves can be chosen synchronously with [`ComputerPlayer::best_move`], or on a
//! worker thread with [`ComputerPlayer::request`], which waits out a think time
//! before sending an [`EngineReply`] over a channel.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::coretypes::Move;
use crate::error::{self, Error, ErrorKind};
use crate::report;
use crate::rules::{RulesEngine, ShakmatyRules};

/// Chance that a Beginner ignores move preferences and picks from every legal move.
const BEGINNER_RANDOM: f64 = 0.7;

/// Longest a worker sleeps before checking its stop flag.
const STOP_POLL: Duration = Duration::from_millis(10);

/// Strength setting of a computer player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    /// Nominal search depth in plies.
    pub const fn depth(&self) -> u8 {
        match self {
            Difficulty::Beginner => 3,
            Difficulty::Intermediate => 8,
            Difficulty::Advanced => 12,
            Difficulty::Expert => 18,
        }
    }

    /// Nominal time to spend on a move.
    pub const fn think_time(&self) -> Duration {
        match self {
            Difficulty::Beginner => Duration::from_millis(1000),
            Difficulty::Intermediate => Duration::from_millis(3000),
            Difficulty::Advanced => Duration::from_millis(5000),
            Difficulty::Expert => Duration::from_millis(10000),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Intermediate
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case insensitive.
impl FromStr for Difficulty {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == lowered)
            .ok_or_else(|| (ErrorKind::ParseDifficultyMalformed, s).into())
    }
}

/// Choose a move for the side to move in `fen`.
///
/// Captures are preferred, then moves that give check, then any legal move.
/// A Beginner picks from every legal move most of the time.
/// Err with kind `EngineMoveFailure` if `fen` is malformed or there are no legal moves.
pub fn choose_move<R: Rng + ?Sized>(
    fen: &str,
    difficulty: Difficulty,
    rng: &mut R,
) -> error::Result<Move> {
    let rules =
        ShakmatyRules::from_fen(fen).map_err(|err| Error::new(ErrorKind::EngineMoveFailure, err))?;
    let legal_moves = rules.legal_moves();

    let all: Vec<Move> = legal_moves.iter().map(|info| info.move_).collect();
    let captures: Vec<Move> = legal_moves
        .iter()
        .filter(|info| info.capture)
        .map(|info| info.move_)
        .collect();
    let checks: Vec<Move> = legal_moves
        .iter()
        .filter(|info| info.check)
        .map(|info| info.move_)
        .collect();

    let candidates = if difficulty == Difficulty::Beginner && rng.gen_bool(BEGINNER_RANDOM) {
        &all
    } else if !captures.is_empty() {
        &captures
    } else if !checks.is_empty() {
        &checks
    } else {
        &all
    };

    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| (ErrorKind::EngineMoveFailure, "no legal moves").into())
}

/// The result of a [`ComputerPlayer::request`].
#[derive(Debug)]
pub struct EngineReply {
    /// Tag given with the request.
    pub tag: u64,
    /// Position the move was chosen for.
    pub fen: String,
    pub result: error::Result<Move>,
}

/// ComputerPlayerBuilder allows the parameters of a ComputerPlayer to be set once.
///
/// Default values:
///
/// * `difficulty`: Intermediate
/// * `think_cap`: 2 seconds
/// * `seed`: None, the rng is seeded from entropy
/// * `debug`: false
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ComputerPlayerBuilder {
    difficulty: Difficulty,
    think_cap: Duration,
    seed: Option<u64>,
    debug: bool,
}

impl ComputerPlayerBuilder {
    /// Create a new default ComputerPlayerBuilder.
    pub fn new() -> Self {
        Self {
            difficulty: Difficulty::default(),
            think_cap: Duration::from_millis(2000),
            seed: None,
            debug: false,
        }
    }

    /// Create and return a new ComputerPlayer.
    pub fn build(&self) -> ComputerPlayer {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        ComputerPlayer {
            difficulty: self.difficulty,
            think_cap: self.think_cap,
            rng,
            stopper: Arc::new(AtomicBool::new(false)),
            debug: self.debug,
            search_handle: None,
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the longest time a requested move may wait before it is sent.
    pub fn think_cap(mut self, think_cap: Duration) -> Self {
        self.think_cap = think_cap;
        self
    }

    /// Seed the move choice for reproducible games.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for ComputerPlayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// ComputerPlayer chooses moves and runs at most one move request at a time.
#[derive(Debug)]
pub struct ComputerPlayer {
    difficulty: Difficulty,
    think_cap: Duration,
    rng: StdRng,
    stopper: Arc<AtomicBool>,
    debug: bool,

    search_handle: Option<JoinHandle<()>>,
}

impl ComputerPlayer {
    pub fn new() -> Self {
        ComputerPlayerBuilder::new().build()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Time a requested move waits before it is sent.
    pub fn think_time(&self) -> Duration {
        self.difficulty.think_time().min(self.think_cap)
    }

    /// Choose a move for `fen` immediately.
    pub fn best_move(&mut self, fen: &str) -> error::Result<Move> {
        let result = choose_move(fen, self.difficulty, &mut self.rng);
        if let Ok(move_) = &result {
            report::debug(self.debug, &format!("computer chose {move_} for {fen}")).ok();
        }
        result
    }

    /// Begin choosing a move for `fen` on a worker thread.
    /// After the think time, a reply carrying `tag` is sent on `sender`.
    /// Nothing is sent if the request is stopped first.
    ///
    /// Only one request runs at a time. Err with kind `EngineAlreadySearching`
    /// if a request is still in progress.
    pub fn request(
        &mut self,
        fen: String,
        tag: u64,
        sender: Sender<EngineReply>,
    ) -> error::Result<()> {
        if !self.ready() {
            return Err((ErrorKind::EngineAlreadySearching, "failed to begin request").into());
        }
        self.wait();
        self.unstop();

        let difficulty = self.difficulty;
        let think_time = self.think_time();
        let stopper = Arc::clone(&self.stopper);
        let debug = self.debug;
        let mut rng = StdRng::seed_from_u64(self.rng.gen());

        report::debug(
            debug,
            &format!("computer request {tag} thinking {}ms", think_time.as_millis()),
        )
        .ok();

        let handle = thread::spawn(move || {
            let deadline = Instant::now() + think_time;
            loop {
                if stopper.load(Ordering::Relaxed) {
                    report::debug(debug, &format!("computer request {tag} stopped")).ok();
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::sleep((deadline - now).min(STOP_POLL));
            }

            let result = choose_move(&fen, difficulty, &mut rng);
            // The receiver may be gone if its owner was dropped.
            let _ = sender.send(EngineReply { tag, fen, result });
        });
        self.search_handle = Some(handle);

        Ok(())
    }

    /// Informs the active request to stop as soon as possible.
    pub fn stop(&self) {
        self.stopper.store(true, Ordering::Relaxed);
    }

    /// Resets stopper flag.
    pub fn unstop(&self) {
        self.stopper.store(false, Ordering::Relaxed);
    }

    /// Blocks until the active request is finished.
    pub fn wait(&mut self) {
        if let Some(handle) = self.search_handle.take() {
            if handle.join().is_err() {
                report::error("computer player thread panicked").ok();
            }
        }
    }

    /// Returns true if a new request can begin.
    pub fn ready(&self) -> bool {
        self.search_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Default for ComputerPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ComputerPlayer {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Square::*;
    use crate::rules::START_FEN;
    use std::sync::mpsc;

    #[test]
    fn difficulty_settings() {
        assert_eq!(Difficulty::Beginner.depth(), 3);
        assert_eq!(Difficulty::Expert.depth(), 18);
        assert_eq!(Difficulty::Advanced.think_time(), Duration::from_millis(5000));
        assert_eq!("EXPERT".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert_eq!(" beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);

        let err = "grandmaster".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseDifficultyMalformed);

        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.to_string().parse::<Difficulty>().unwrap(), difficulty);
        }
    }

    #[test]
    fn think_time_is_capped() {
        let player = ComputerPlayerBuilder::new()
            .difficulty(Difficulty::Expert)
            .build();
        assert_eq!(player.think_time(), Duration::from_millis(2000));

        let player = ComputerPlayerBuilder::new()
            .difficulty(Difficulty::Beginner)
            .think_cap(Duration::from_secs(60))
            .build();
        assert_eq!(player.think_time(), Duration::from_millis(1000));
    }

    #[test]
    fn chosen_moves_are_legal() {
        let rules = ShakmatyRules::start_position();
        let legal: Vec<Move> = rules.legal_moves().iter().map(|info| info.move_).collect();
        let mut rng = StdRng::seed_from_u64(3);

        for difficulty in Difficulty::ALL {
            for _ in 0..20 {
                let move_ = choose_move(START_FEN, difficulty, &mut rng).unwrap();
                assert!(legal.contains(&move_), "{difficulty}: {move_}");
            }
        }
    }

    #[test]
    fn prefers_captures_then_checks() {
        let mut rng = StdRng::seed_from_u64(11);

        let one_capture = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1";
        for _ in 0..10 {
            let move_ = choose_move(one_capture, Difficulty::Expert, &mut rng).unwrap();
            assert_eq!(move_, Move::new(E4, D5, None));
        }

        let one_check = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        for _ in 0..10 {
            let move_ = choose_move(one_check, Difficulty::Advanced, &mut rng).unwrap();
            assert_eq!(move_, Move::new(A1, A8, None));
        }
    }

    #[test]
    fn no_move_is_failure() {
        let mut rng = StdRng::seed_from_u64(0);
        let checkmated = "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1";
        let err = choose_move(checkmated, Difficulty::Expert, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineMoveFailure);

        let err = choose_move("not a fen", Difficulty::Expert, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineMoveFailure);
    }

    #[test]
    fn seeded_players_agree() {
        let mut first = ComputerPlayerBuilder::new().seed(42).build();
        let mut second = ComputerPlayerBuilder::new().seed(42).build();
        for _ in 0..5 {
            assert_eq!(
                first.best_move(START_FEN).unwrap(),
                second.best_move(START_FEN).unwrap()
            );
        }
    }

    #[test]
    fn request_sends_tagged_reply() {
        let mut player = ComputerPlayerBuilder::new()
            .think_cap(Duration::ZERO)
            .seed(5)
            .build();
        let (sender, receiver) = mpsc::channel();

        player.request(START_FEN.to_string(), 9, sender).unwrap();
        let reply = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.tag, 9);
        assert_eq!(reply.fen, START_FEN);
        assert!(reply.result.is_ok());

        player.wait();
        assert!(player.ready());
    }

    #[test]
    fn one_request_at_a_time() {
        let mut player = ComputerPlayerBuilder::new()
            .difficulty(Difficulty::Beginner)
            .think_cap(Duration::from_secs(30))
            .build();
        let (sender, receiver) = mpsc::channel();

        player.request(START_FEN.to_string(), 1, sender.clone()).unwrap();
        assert!(!player.ready());
        let err = player.request(START_FEN.to_string(), 2, sender).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineAlreadySearching);

        player.stop();
        player.wait();
        assert!(player.ready());
        assert!(receiver.try_recv().is_err());
    }
}
