use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::MazeResult;
use crate::maze::{Grid, MazeGenerator, Pos, START};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Goal was reached; the next move attempt swaps in a fresh maze first.
    PendingLevelUp,
}

/// Rate limit on move attempts.
///
/// Passing the gate stamps it, whether or not the move it guards turns out to
/// be legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementGate {
    last_move_ms: u64,
    delay_ms: u64,
}

impl MovementGate {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            last_move_ms: 0,
            delay_ms,
        }
    }

    pub fn last_move_ms(&self) -> u64 {
        self.last_move_ms
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn try_pass(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_move_ms) <= self.delay_ms {
            return false;
        }
        self.last_move_ms = now_ms;
        true
    }
}

/// Read-only view handed to the renderer each frame.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub player: Pos,
    pub goal: Pos,
    pub level: u32,
}

pub struct GameState<R> {
    rng: R,
    generator: MazeGenerator,
    grid: Grid,
    player: Pos,
    goal: Pos,
    level: u32,
    phase: Phase,
    gate: MovementGate,
}

impl<R: Rng> GameState<R> {
    pub fn new(config: &Config, mut rng: R) -> MazeResult<Self> {
        let generator = MazeGenerator::new(config.grid_width, config.grid_height)?;
        let (grid, goal) = generator.generate(&mut rng);
        info!(
            width = generator.width(),
            height = generator.height(),
            move_delay_ms = config.move_delay_ms,
            "starting level 1"
        );
        Ok(Self {
            rng,
            generator,
            grid,
            player: START,
            goal,
            level: 1,
            phase: Phase::Playing,
            gate: MovementGate::new(config.move_delay_ms),
        })
    }

    /// Applies one tick of player input. Deltas are clamped to a single step.
    ///
    /// Walls, the grid edge and the cooldown silently absorb the move. An
    /// idle all-zero vector still applies a pending level-up and stamps the
    /// gate, but never moves the player.
    pub fn attempt_move(&mut self, dx: i32, dy: i32, now_ms: u64) {
        let (dx, dy) = (dx.signum(), dy.signum());

        if self.phase == Phase::PendingLevelUp {
            self.advance_level();
        }

        if !self.gate.try_pass(now_ms) || (dx == 0 && dy == 0) {
            return;
        }

        let nx = self.player.x as isize + dx as isize;
        let ny = self.player.y as isize + dy as isize;
        let Some(next) = self.grid.checked_pos(nx, ny) else {
            return;
        };

        if next == self.goal {
            debug!(level = self.level, x = next.x, y = next.y, "goal reached");
            self.phase = Phase::PendingLevelUp;
        } else if self.grid.is_open(next) {
            self.player = next;
        }
    }

    fn advance_level(&mut self) {
        self.level += 1;
        let (grid, goal) = self.generator.generate(&mut self.rng);
        self.grid = grid;
        self.goal = goal;
        self.player = START;
        self.phase = Phase::Playing;
        info!(level = self.level, "advanced to next level");
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            player: self.player,
            goal: self.goal,
            level: self.level,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn gate(&self) -> &MovementGate {
        &self.gate
    }
}
