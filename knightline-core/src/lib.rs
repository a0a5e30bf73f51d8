//! Knightline core: a chess position model, game recorder and move-list
//! navigator, with an authoritative rules adapter and a computer player.
//!
//! The [`Position`] model and [`apply::apply_move`] relocate pieces without
//! checking legality. They form a display model that can be replayed cheaply
//! to show any ply of a game. Legality, FEN validation and SAN come from a
//! [`RulesEngine`], and a [`GameSession`] keeps both in step.

pub mod apply;
pub mod coretypes;
pub mod engine;
pub mod error;
pub mod fen;
pub mod game;
pub mod mailbox;
pub mod movelist;
pub mod navigation;
pub mod position;
pub mod report;
pub mod rules;
pub mod session;

pub use engine::{ComputerPlayer, ComputerPlayerBuilder, Difficulty, EngineReply};
pub use fen::Fen;
pub use game::Game;
pub use movelist::MoveHistory;
pub use navigation::Navigator;
pub use position::Position;
pub use rules::{RulesEngine, ShakmatyRules};
pub use session::{GameMode, GameSession, Winner};
