//! Main CLI interface to Knightline.
//!
//! Play a game against a friend or the computer, and step through its moves.

use std::env;
use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

use knightline_core::coretypes::{Color, Move, Square};
use knightline_core::movelist;
use knightline_core::report;
use knightline_core::{ComputerPlayerBuilder, Difficulty, GameMode, GameSession, RulesEngine};

/// Extra time allowed for a computer reply beyond its think time.
const REPLY_MARGIN: Duration = Duration::from_secs(5);

/// Pause between plies when the computer plays itself.
const AUTOPLAY_DELAY: Duration = Duration::from_millis(1500);

const USAGE: &str = "\
Usage: knightline [OPTIONS]

Options:
  --fen <FEN>            Start from a position instead of the standard start.
  --mode <hh|hc|cc>      Human vs human, human vs computer, computer vs computer.
  --difficulty <LEVEL>   beginner, intermediate, advanced or expert.
  --black                Play black against the computer.
  --debug                Print debug lines.
  --seed <N>             Seed the computer's move choice.
  --help                 Print this help text.";

/// Startup options read from the command line.
#[derive(Debug, Clone, Eq, PartialEq)]
struct Options {
    fen: Option<String>,
    mode: GameMode,
    difficulty: Difficulty,
    player_white: bool,
    debug: bool,
    seed: Option<u64>,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fen: None,
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            player_white: true,
            debug: false,
            seed: None,
            help: false,
        }
    }
}

impl Options {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| format!("missing value for {flag}"))
            };

            match arg.as_str() {
                "--fen" => options.fen = Some(value("--fen")?),
                "--mode" => {
                    options.mode = value("--mode")?
                        .parse::<GameMode>()
                        .map_err(|err| err.to_string())?
                }
                "--difficulty" => {
                    options.difficulty = value("--difficulty")?
                        .parse::<Difficulty>()
                        .map_err(|err| err.to_string())?
                }
                "--seed" => {
                    let seed = value("--seed")?
                        .parse::<u64>()
                        .map_err(|_| String::from("--seed expects an integer"))?;
                    options.seed = Some(seed);
                }
                "--black" => options.player_white = false,
                "--debug" => options.debug = true,
                "--help" | "-h" => options.help = true,
                unknown => return Err(format!("unknown option: {unknown}")),
            }
        }

        Ok(options)
    }
}

/// One line of user input.
#[derive(Debug, Clone, Eq, PartialEq)]
enum InputKind {
    Exit,
    Help,
    Newgame,
    Undo,
    Next,
    Back,
    Forward,
    Start,
    End,
    GoTo(isize),
    Fen(String),
    Mode(GameMode),
    Difficulty(Difficulty),
    Color(bool),
    Moves,
    Legal(Square),
    Debug(bool),
    GameMove(Move),
    Error(String),
}

impl From<&str> for InputKind {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if let Ok(move_) = s.parse::<Move>() {
            return Self::GameMove(move_);
        }

        let (command, arg) = match s.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (s, ""),
        };

        let parsed = match (command, arg) {
            ("", _) => Some(Self::Next),
            ("exit" | "quit", _) => Some(Self::Exit),
            ("help", _) => Some(Self::Help),
            ("newgame" | "ng", _) => Some(Self::Newgame),
            ("undo", _) => Some(Self::Undo),
            ("back" | "b", _) => Some(Self::Back),
            ("forward" | "f", _) => Some(Self::Forward),
            ("start", _) => Some(Self::Start),
            ("end", _) => Some(Self::End),
            ("moves", _) => Some(Self::Moves),
            ("goto", index) => index.parse::<isize>().ok().map(Self::GoTo),
            ("fen", fen) if !fen.is_empty() => Some(Self::Fen(fen.to_string())),
            ("mode", mode) => mode.parse::<GameMode>().ok().map(Self::Mode),
            ("difficulty", level) => level.parse::<Difficulty>().ok().map(Self::Difficulty),
            ("color", color) => color
                .parse::<Color>()
                .ok()
                .map(|color| Self::Color(color == Color::White)),
            ("legal", square) => square.parse::<Square>().ok().map(Self::Legal),
            ("debug", "on") => Some(Self::Debug(true)),
            ("debug", "off") => Some(Self::Debug(false)),
            _ => None,
        };

        parsed.unwrap_or_else(|| Self::Error(s.to_string()))
    }
}

fn print_help() {
    println!("Commands:");
    println!("<move>                  => Play a move in coordinate form, such as e2e4 or e7e8n.");
    println!("(empty line)            => Let the computer move when it is its turn.");
    println!("                           Computer vs computer games play on by themselves.");
    println!("back | b, forward | f   => Step the viewed position through the game.");
    println!("start, end, goto <N>    => View the start, the end, or the position after ply N.");
    println!("undo                    => Take back the last move.");
    println!("newgame | ng            => Begin a new game.");
    println!("fen <FEN>               => Load a position.");
    println!("mode <hh|hc|cc>         => Set who plays each side.");
    println!("difficulty <LEVEL>      => beginner, intermediate, advanced or expert.");
    println!("color <white|black>     => Choose your side against the computer.");
    println!("moves                   => Print the moves played.");
    println!("legal <SQUARE>          => Print the legal moves of a piece.");
    println!("debug <on|off>          => Toggle debug lines.");
    println!("help                    => Print this help text.");
    println!("exit                    => End CLI.");
}

fn print_view(session: &GameSession) -> io::Result<()> {
    let navigator = session.navigator();
    match session.viewed_position() {
        Ok(position) => println!("{position}"),
        Err(err) => report::error(&err.to_string())?,
    }
    println!("Viewing ply {} of {}", navigator.index(), navigator.len());
    if let Some(move_) = navigator.last_move() {
        println!("Last move: {move_}");
    }
    println!("{} to move", session.turn().name());
    if session.mode() == GameMode::HumanVsComputer {
        let side = if session.player_white() { Color::White } else { Color::Black };
        println!("You play {}", side.name());
    }

    if !session.status().is_empty() {
        println!("{}", session.status());
    }
    if let Some(winner) = session.winner() {
        println!("Game over. Result: {winner}");
    }
    Ok(())
}

/// Play one computer move if it is the computer's turn.
/// Returns Ok(true) if a move was played.
fn computer_move(session: &mut GameSession) -> io::Result<bool> {
    match session.request_computer_move() {
        Ok(true) => {
            println!("thinking...");
            let timeout = session.computer().think_time() + REPLY_MARGIN;
            match session.wait_computer(timeout) {
                Ok(_) => Ok(true),
                Err(err) => report::error(&err.to_string()).map(|_| false),
            }
        }
        Ok(false) => Ok(false),
        Err(err) => report::error(&err.to_string()).map(|_| false),
    }
}

/// True while a computer vs computer game has moves left to play.
fn autoplays(session: &GameSession) -> bool {
    session.mode() == GameMode::ComputerVsComputer
        && session.is_computer_turn()
        && !session.is_game_over()
}

/// Let the computer play both sides until the game ends or a move fails.
fn autoplay(session: &mut GameSession) -> io::Result<()> {
    while autoplays(session) {
        if !computer_move(session)? {
            break;
        }
        print_view(session)?;
        thread::sleep(AUTOPLAY_DELAY);
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    println!("Knightline 0.1.0\n");
    let mut builder = ComputerPlayerBuilder::new()
        .difficulty(options.difficulty)
        .debug(options.debug);
    if let Some(seed) = options.seed {
        builder = builder.seed(seed);
    }
    let mut session = GameSession::new(builder.build());
    session.set_mode(options.mode);
    session.set_player_white(options.player_white);
    if let Some(fen) = &options.fen {
        if let Err(err) = session.load_fen(fen) {
            report::error(&err.to_string())?;
        }
    }
    report::debug(
        options.debug,
        &format!("mode {} difficulty {}", session.mode(), session.difficulty()),
    )?;

    let mut input = String::new();
    loop {
        match session.mode() {
            GameMode::HumanVsHuman => (),
            GameMode::HumanVsComputer => {
                computer_move(&mut session)?;
            }
            GameMode::ComputerVsComputer => autoplay(&mut session)?,
        }

        print_view(&session)?;
        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match InputKind::from(input.as_str()) {
            InputKind::Exit => break,
            InputKind::Help => print_help(),
            InputKind::Newgame => {
                session.reset();
                println!("Starting new game...");
            }
            InputKind::Undo => {
                if !session.undo() {
                    println!("No move to undo.");
                }
                // Take back the computer's reply as well.
                if session.mode() == GameMode::HumanVsComputer && session.is_computer_turn() {
                    session.undo();
                }
            }
            InputKind::Next => {
                computer_move(&mut session)?;
            }
            InputKind::Back => session.navigator_mut().go_backward(),
            InputKind::Forward => session.navigator_mut().go_forward(),
            InputKind::Start => session.navigator_mut().go_to_start(),
            InputKind::End => session.navigator_mut().go_to_end(),
            InputKind::GoTo(index) => session.navigator_mut().go_to(index),
            InputKind::Fen(fen) => {
                if session.load_fen(&fen).is_ok() {
                    println!("Loaded position.");
                }
            }
            InputKind::Mode(mode) => session.set_mode(mode),
            InputKind::Difficulty(difficulty) => session.set_difficulty(difficulty),
            InputKind::Color(player_white) => session.set_player_white(player_white),
            InputKind::Moves => {
                println!("{}", session.rules().movetext());
                println!("{}", movelist::display(&session.game().moves()));
            }
            InputKind::Legal(square) => {
                let moves: Vec<String> = session
                    .rules()
                    .legal_moves_from(square)
                    .iter()
                    .map(Move::to_string)
                    .collect();
                println!("{}", moves.join(" "));
            }
            InputKind::Debug(debug) => session.set_debug(debug),
            InputKind::GameMove(move_) => {
                if session.is_computer_turn() {
                    println!("It is the computer's turn.");
                } else {
                    session.submit_move(move_);
                }
            }
            InputKind::Error(command) => println!("Invalid command: {command}"),
        }
    }

    Ok(())
}
