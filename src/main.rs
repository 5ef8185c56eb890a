use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maze_runner::config::{
    read_render_fps, CELL_SIZE, MOVE_DELAY_MS, WORLD_HEIGHT, WORLD_WIDTH,
};
use maze_runner::input::{Dir, HeldKeys};
use maze_runner::render::Renderer;
use maze_runner::{Clock, Config, GameState, MonotonicClock};

/// Walk procedurally generated mazes; every goal reached starts a new one.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// World width, divided by the cell size to get grid columns.
    #[arg(long, default_value_t = WORLD_WIDTH)]
    world_width: usize,

    /// World height, divided by the cell size to get grid rows.
    #[arg(long, default_value_t = WORLD_HEIGHT)]
    world_height: usize,

    #[arg(long, default_value_t = CELL_SIZE)]
    cell_size: usize,

    /// Minimum milliseconds between two accepted moves.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = MOVE_DELAY_MS)]
    move_delay_ms: u64,

    /// Random seed for reproducible mazes.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here; the terminal itself is taken by the game.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = Config::from_world(args.world_width, args.world_height, args.cell_size)?
        .with_move_delay(args.move_delay_ms)
        .with_seed(args.seed)
        .with_render_fps(read_render_fps());
    let game = GameState::new(&config, config.rng())?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("enabling raw mode")?;
    let result = enter_screen(&mut stdout).and_then(|()| run(&mut stdout, game, &config));
    let restored = restore_terminal(&mut stdout);
    result.and(restored)
}

fn enter_screen(stdout: &mut Stdout) -> Result<()> {
    stdout
        .execute(EnterAlternateScreen)?
        .execute(Hide)
        .context("entering alternate screen")?;
    Ok(())
}

/// Undoes raw mode even when a step fails, then reports the first failure.
fn restore_terminal(stdout: &mut Stdout) -> Result<()> {
    let shown = stdout.execute(Show).map(drop);
    let left = stdout.execute(LeaveAlternateScreen).map(drop);
    let raw_off = terminal::disable_raw_mode();
    shown.and(left).and(raw_off).context("restoring terminal")
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run<R: Rng>(stdout: &mut Stdout, mut game: GameState<R>, config: &Config) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut held = HeldKeys::default();
    let mut renderer = Renderer::new(config.grid_width, config.grid_height);
    let frame_time = Duration::from_micros(1_000_000 / config.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key)
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            info!(level = game.level(), "quit");
                            return Ok(());
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            info!(level = game.level(), "interrupted");
                            return Ok(());
                        }
                        code => {
                            if let Some(dir) = Dir::from_key(code) {
                                held.press(dir, clock.now_ms());
                            }
                        }
                    }
                }
                Event::Resize(..) => renderer.invalidate(),
                _ => {}
            }
        }

        let now = clock.now_ms();
        let (dx, dy) = held.vector(now);
        game.attempt_move(dx, dy, now);
        renderer.render(stdout, &game.snapshot()).context("drawing frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
