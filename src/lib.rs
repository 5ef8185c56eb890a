//! Procedural maze game core: a randomized backtracker carves a perfect maze,
//! and a rate-limited player walks it to the goal, one level after another.

pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod maze;
pub mod render;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Config;
pub use error::{MazeError, MazeResult};
pub use game::{GameState, MovementGate, Phase, Snapshot};
pub use maze::{generate, Grid, MazeGenerator, Pos, START};
