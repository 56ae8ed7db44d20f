use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::AppError;
use crate::util::Jitter;

/// A single key press sent to the target window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
}

/// Device-level keystroke sink. Real OS integration plugs in here.
pub trait Keyboard: Send + Sync {
    fn press(&self, key: Key) -> Result<(), AppError>;
}

/// Keyboard that performs no OS input. Counts presses and optionally keeps
/// a transcript, which makes it double as a test spy.
#[derive(Default)]
pub struct SimulatedKeyboard {
    presses: AtomicUsize,
    transcript: Option<Mutex<Vec<Key>>>,
}

impl SimulatedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording() -> Self {
        Self {
            presses: AtomicUsize::new(0),
            transcript: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn presses(&self) -> usize {
        self.presses.load(Ordering::Relaxed)
    }

    /// Replay the transcript into the text a user would see on screen.
    pub fn rendered(&self) -> String {
        let Some(transcript) = &self.transcript else {
            return String::new();
        };
        let mut out = String::new();
        for key in transcript.lock().iter() {
            match key {
                Key::Char(c) => out.push(*c),
                Key::Backspace => {
                    out.pop();
                }
            }
        }
        out
    }

    pub fn transcript(&self) -> Vec<Key> {
        self.transcript
            .as_ref()
            .map(|t| t.lock().clone())
            .unwrap_or_default()
    }
}

impl Keyboard for SimulatedKeyboard {
    fn press(&self, key: Key) -> Result<(), AppError> {
        self.presses.fetch_add(1, Ordering::Relaxed);
        if let Some(transcript) = &self.transcript {
            transcript.lock().push(key);
        }
        Ok(())
    }
}

// ── QWERTY adjacency ─────────────────────────────────────────────

/// Physical neighbours of a key on a US QWERTY layout (lowercase).
pub fn adjacent_keys(key: char) -> &'static [char] {
    match key {
        'q' => &['w', '1', 'a'],
        'w' => &['q', 'e', '2', 'a', 's'],
        'e' => &['w', 'r', '3', 's', 'd'],
        'r' => &['e', 't', '4', 'd', 'f'],
        't' => &['r', 'y', '5', 'f', 'g'],
        'y' => &['t', 'u', '6', 'g', 'h'],
        'u' => &['y', 'i', '7', 'h', 'j'],
        'i' => &['u', 'o', '8', 'j', 'k'],
        'o' => &['i', 'p', '9', 'k', 'l'],
        'p' => &['o', '0', 'l', '['],
        'a' => &['q', 'w', 's', 'z'],
        's' => &['w', 'e', 'a', 'd', 'z', 'x'],
        'd' => &['e', 'r', 's', 'f', 'x', 'c'],
        'f' => &['r', 't', 'd', 'g', 'c', 'v'],
        'g' => &['t', 'y', 'f', 'h', 'v', 'b'],
        'h' => &['y', 'u', 'g', 'j', 'b', 'n'],
        'j' => &['u', 'i', 'h', 'k', 'n', 'm'],
        'k' => &['i', 'o', 'j', 'l', 'm', ','],
        'l' => &['o', 'p', 'k', ';', ',', '.'],
        'z' => &['a', 's', 'x'],
        'x' => &['z', 's', 'd', 'c'],
        'c' => &['x', 'd', 'f', 'v'],
        'v' => &['c', 'f', 'g', 'b'],
        'b' => &['v', 'g', 'h', 'n'],
        'n' => &['b', 'h', 'j', 'm'],
        'm' => &['n', 'j', 'k', ','],
        ',' => &['m', 'k', 'l', '.'],
        '.' => &[',', 'l', ';', '/'],
        _ => &[],
    }
}

/// Pick a wrong key next to `key`, preserving case. `None` when the key has
/// no neighbours in the table (digits, symbols, whitespace, non-ASCII).
pub fn typo_for(key: char, rng: &mut Jitter) -> Option<char> {
    let lower = key.to_ascii_lowercase();
    let typo = *rng.pick(adjacent_keys(lower))?;
    if key.is_ascii_uppercase() {
        Some(typo.to_ascii_uppercase())
    } else {
        Some(typo)
    }
}
