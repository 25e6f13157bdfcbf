//! Fields of Strife: a tic-tac-toe engine (3x3 and 4x4) with a heuristic
//! computer opponent, an in-memory session registry and a small line-oriented
//! request protocol.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod server;

pub use error::{GameError, Result};
