use crossterm::event::KeyCode;

/// Terminals only report presses and repeats, never releases, so a key
/// counts as held for this long after its last event.
pub const INPUT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn from_key(code: KeyCode) -> Option<Dir> {
        match code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => {
                Some(Dir::Up)
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
                Some(Dir::Down)
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
                Some(Dir::Left)
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
                Some(Dir::Right)
            }
            _ => None,
        }
    }

    fn idx(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Down => 1,
            Dir::Left => 2,
            Dir::Right => 3,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HeldKeys {
    last_seen: [Option<u64>; 4],
    hold_ms: u64,
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new(INPUT_HOLD_MS)
    }
}

impl HeldKeys {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            last_seen: [None; 4],
            hold_ms,
        }
    }

    pub fn press(&mut self, dir: Dir, now_ms: u64) {
        self.last_seen[dir.idx()] = Some(now_ms);
    }

    pub fn is_held(&self, dir: Dir, now_ms: u64) -> bool {
        match self.last_seen[dir.idx()] {
            Some(t) => now_ms.saturating_sub(t) <= self.hold_ms,
            None => false,
        }
    }

    /// Movement vector `(right - left, down - up)` over the keys held at `now_ms`.
    pub fn vector(&self, now_ms: u64) -> (i32, i32) {
        let held = |dir| i32::from(self.is_held(dir, now_ms));
        (
            held(Dir::Right) - held(Dir::Left),
            held(Dir::Down) - held(Dir::Up),
        )
    }
}
