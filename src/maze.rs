use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{MazeError, MazeResult};

/// Carving always starts here, and the player respawns here on every level.
pub const START: Pos = Pos { x: 1, y: 1 };

const MIN_SIDE: usize = 3;
const LATTICE_STEPS: [(isize, isize); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Open/closed cell map. `true` is a carved corridor, `false` a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    fn closed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![false; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Converts signed coordinates into a position, or `None` when off the grid.
    pub fn checked_pos(&self, x: isize, y: isize) -> Option<Pos> {
        if self.in_bounds(x, y) {
            Some(Pos::new(x as usize, y as usize))
        } else {
            None
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        self.get(pos.x, pos.y).unwrap_or(false)
    }

    pub fn open_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &open) in row.iter().enumerate() {
                if open {
                    cells.push(Pos { x, y });
                }
            }
        }
        cells
    }

    fn open(&mut self, pos: Pos) {
        self.cells[pos.y][pos.x] = true;
    }

    /// Builds a grid from text rows where `#` is a wall and anything else is open.
    #[cfg(test)]
    pub(crate) fn from_ascii(rows: &[&str]) -> Self {
        let cells: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| row.chars().map(|c| c != '#').collect())
            .collect();
        Self {
            width: cells.first().map_or(0, Vec::len),
            height: cells.len(),
            cells,
        }
    }
}

/// Randomized depth-first backtracker over the odd-coordinate lattice.
///
/// Holds only the grid dimensions, so one generator can hand out any number
/// of fresh mazes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeGenerator {
    width: usize,
    height: usize,
}

impl MazeGenerator {
    pub fn new(width: usize, height: usize) -> MazeResult<Self> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Carves a perfect maze from [`START`] and draws a goal inside the border.
    ///
    /// The goal is sampled independently of the carving, so it may sit on a
    /// wall cell.
    pub fn generate(&self, rng: &mut impl Rng) -> (Grid, Pos) {
        let mut grid = Grid::closed(self.width, self.height);
        let mut stack = vec![START];

        while let Some(&current) = stack.last() {
            grid.open(current);

            let neighbors = self.unvisited_neighbors(&grid, current);
            match neighbors.choose(rng) {
                Some(&next) => {
                    grid.open(Pos {
                        x: (current.x + next.x) / 2,
                        y: (current.y + next.y) / 2,
                    });
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }

        let goal = Pos {
            x: rng.gen_range(1..=self.width - 2),
            y: rng.gen_range(1..=self.height - 2),
        };

        debug!(
            width = self.width,
            height = self.height,
            open = grid.open_cells().len(),
            goal_x = goal.x,
            goal_y = goal.y,
            goal_open = grid.is_open(goal),
            "generated maze"
        );
        (grid, goal)
    }

    fn unvisited_neighbors(&self, grid: &Grid, pos: Pos) -> Vec<Pos> {
        let mut neighbors = Vec::with_capacity(LATTICE_STEPS.len());
        for (dx, dy) in LATTICE_STEPS {
            let nx = pos.x as isize + dx;
            let ny = pos.y as isize + dy;
            let inside = nx > 0
                && ny > 0
                && nx < (self.width - 1) as isize
                && ny < (self.height - 1) as isize;
            if !inside {
                continue;
            }
            let next = Pos::new(nx as usize, ny as usize);
            if !grid.is_open(next) {
                neighbors.push(next);
            }
        }
        neighbors
    }
}

/// One-shot form of [`MazeGenerator::generate`] that validates the dimensions.
pub fn generate(width: usize, height: usize, rng: &mut impl Rng) -> MazeResult<(Grid, Pos)> {
    Ok(MazeGenerator::new(width, height)?.generate(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::collections::{HashSet, VecDeque};

    /// Replays fixed words, then zeros.
    struct ScriptedRng {
        words: VecDeque<u64>,
    }

    impl ScriptedRng {
        fn new(words: &[u64]) -> Self {
            Self {
                words: words.iter().copied().collect(),
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.words.pop_front().unwrap_or(0)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest.iter_mut() {
                *byte = self.next_u64() as u8;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn reachable_from_start(grid: &Grid) -> HashSet<Pos> {
        let mut seen = HashSet::new();
        let mut q = VecDeque::new();
        seen.insert(START);
        q.push_back(START);
        while let Some(pos) = q.pop_front() {
            for (dx, dy) in [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)] {
                let Some(next) = grid.checked_pos(pos.x as isize + dx, pos.y as isize + dy) else {
                    continue;
                };
                if grid.is_open(next) && seen.insert(next) {
                    q.push_back(next);
                }
            }
        }
        seen
    }

    fn sizes() -> Vec<(usize, usize)> {
        vec![(3, 3), (4, 4), (5, 5), (5, 9), (8, 3), (20, 15), (21, 21), (31, 11)]
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        for (w, h) in [(0, 0), (2, 5), (5, 2), (1, 1)] {
            assert_eq!(
                MazeGenerator::new(w, h),
                Err(MazeError::InvalidDimensions { width: w, height: h })
            );
        }
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(2, 2, &mut rng).is_err());
    }

    #[test]
    fn smallest_maze_opens_only_the_start() {
        let mut rng = StdRng::seed_from_u64(3);
        let (grid, goal) = generate(3, 3, &mut rng).unwrap();
        assert_eq!(grid.open_cells(), vec![START]);
        assert_eq!(goal, START);
    }

    #[test]
    fn border_stays_closed() {
        for (w, h) in sizes() {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let (grid, _) = generate(w, h, &mut rng).unwrap();
                for x in 0..w {
                    assert_eq!(grid.get(x, 0), Some(false));
                    assert_eq!(grid.get(x, h - 1), Some(false));
                }
                for y in 0..h {
                    assert_eq!(grid.get(0, y), Some(false));
                    assert_eq!(grid.get(w - 1, y), Some(false));
                }
            }
        }
    }

    #[test]
    fn every_open_cell_is_reachable() {
        for (w, h) in sizes() {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let (grid, _) = generate(w, h, &mut rng).unwrap();
                let reachable = reachable_from_start(&grid);
                for cell in grid.open_cells() {
                    assert!(reachable.contains(&cell), "{w}x{h} seed {seed}: {cell:?} cut off");
                }
            }
        }
    }

    #[test]
    fn carved_graph_is_a_spanning_tree() {
        for (w, h) in sizes() {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let (grid, _) = generate(w, h, &mut rng).unwrap();
                let open = grid.open_cells();
                let lattice = open.iter().filter(|p| p.x % 2 == 1 && p.y % 2 == 1).count();
                let connectors = open.len() - lattice;
                assert_eq!(connectors, lattice - 1, "{w}x{h} seed {seed}");

                // every lattice cell strictly inside the border gets visited
                let expected = ((w - 1) / 2) * ((h - 1) / 2);
                assert_eq!(lattice, expected, "{w}x{h} seed {seed}");
            }
        }
    }

    #[test]
    fn goal_lands_inside_the_border() {
        let gen = MazeGenerator::new(20, 15).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let (_, goal) = gen.generate(&mut rng);
            assert!((1..=18).contains(&goal.x));
            assert!((1..=13).contains(&goal.y));
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let gen = MazeGenerator::new(21, 15).unwrap();
        let a = gen.generate(&mut StdRng::seed_from_u64(42));
        let b = gen.generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn scripted_carving_order_on_five_by_five() {
        // picks (1,3) over (3,1) first, then the only choice twice: (3,3), (3,1)
        let mut rng = ScriptedRng::new(&[1 << 31]);
        let (grid, goal) = generate(5, 5, &mut rng).unwrap();

        let open: HashSet<Pos> = grid.open_cells().into_iter().collect();
        let expected: HashSet<Pos> = [(1, 1), (1, 2), (1, 3), (2, 3), (3, 3), (3, 2), (3, 1)]
            .into_iter()
            .map(|(x, y)| Pos::new(x, y))
            .collect();
        assert_eq!(open, expected);
        assert_eq!(goal, Pos::new(1, 1));
    }
}
