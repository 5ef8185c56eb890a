use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{MazeError, MazeResult};

pub const WORLD_WIDTH: usize = 800;
pub const WORLD_HEIGHT: usize = 600;
pub const CELL_SIZE: usize = 40;
pub const MOVE_DELAY_MS: u64 = 200;
pub const DEFAULT_RENDER_FPS: u64 = 60;

/// Startup settings for one play session. Fixed once the game is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub grid_width: usize,
    pub grid_height: usize,
    pub move_delay_ms: u64,
    pub seed: Option<u64>,
    pub render_fps: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width: WORLD_WIDTH / CELL_SIZE,
            grid_height: WORLD_HEIGHT / CELL_SIZE,
            move_delay_ms: MOVE_DELAY_MS,
            seed: None,
            render_fps: DEFAULT_RENDER_FPS,
        }
    }
}

impl Config {
    /// Derives the grid from a world size measured in cell-size units.
    pub fn from_world(
        world_width: usize,
        world_height: usize,
        cell_size: usize,
    ) -> MazeResult<Self> {
        let grid_width = world_width.checked_div(cell_size).unwrap_or(0);
        let grid_height = world_height.checked_div(cell_size).unwrap_or(0);
        Self::default().with_grid(grid_width, grid_height).validate()
    }

    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_move_delay(mut self, ms: u64) -> Self {
        self.move_delay_ms = ms;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_render_fps(mut self, fps: u64) -> Self {
        self.render_fps = fps.max(1);
        self
    }

    pub fn validate(self) -> MazeResult<Self> {
        if self.grid_width < 3 || self.grid_height < 3 {
            return Err(MazeError::InvalidDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        Ok(self)
    }

    /// Seeded when a seed was given, otherwise drawn from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Frame rate from `MAZE_FPS`, ignoring unset, unparsable or zero values.
pub fn read_render_fps() -> u64 {
    std::env::var("MAZE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS)
}
