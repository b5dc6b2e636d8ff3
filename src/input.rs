//! Key decoding and the input thread's subscriber dispatch.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error};

use crate::snake::Direction;

/// Lead byte of a two-byte extended key (arrows).
pub const EXTENDED_PREFIX: u8 = 224;
/// Alternative lead byte some keyboards send for the same keys.
pub const NUL_PREFIX: u8 = 0;

pub const CODE_UP: u8 = 72;
pub const CODE_DOWN: u8 = 80;
pub const CODE_LEFT: u8 = 75;
pub const CODE_RIGHT: u8 = 77;
pub const CODE_ENTER: u8 = 13;
pub const CODE_BACKSPACE: u8 = 8;
pub const CODE_TAB: u8 = 9;
pub const CODE_ESC: u8 = 27;
pub const CODE_SPACE: u8 = 32;

/// Decoded key. Codes outside the table decode to `Option::None`.
/// Discriminants start at 1 so `Signals` can use 0 for "no direction".
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Up = 1,
    Down,
    Left,
    Right,
    Esc,
    Backspace,
    Enter,
    Tab,
    Space,
}

impl Input {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Input::Up => Some(Direction::Up),
            Input::Down => Some(Direction::Down),
            Input::Left => Some(Direction::Left),
            Input::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

impl From<Direction> for Input {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => Input::Up,
            Direction::Down => Input::Down,
            Direction::Left => Input::Left,
            Direction::Right => Input::Right,
        }
    }
}

/// Blocking source of raw key codes.
pub trait KeySource: Send {
    fn read_code(&mut self) -> io::Result<u8>;
}

/// Reads one key (one or two codes) and decodes it. Unknown codes yield `None`.
pub fn read_input<S: KeySource + ?Sized>(keys: &mut S) -> io::Result<Option<Input>> {
    let input = match keys.read_code()? {
        NUL_PREFIX | EXTENDED_PREFIX => match keys.read_code()? {
            CODE_UP => Some(Input::Up),
            CODE_DOWN => Some(Input::Down),
            CODE_LEFT => Some(Input::Left),
            CODE_RIGHT => Some(Input::Right),
            other => {
                debug!("ignoring extended key code {}", other);
                None
            }
        },
        CODE_ENTER => Some(Input::Enter),
        CODE_BACKSPACE => Some(Input::Backspace),
        CODE_TAB => Some(Input::Tab),
        CODE_ESC => Some(Input::Esc),
        CODE_SPACE => Some(Input::Space),
        other => {
            debug!("ignoring key code {}", other);
            None
        }
    };
    Ok(input)
}

///////////////////////////////////////////////////////////////////////////////

/// Turns crossterm key presses back into the raw code stream `read_input`
/// understands. WASD doubles as the arrow keys and Ctrl+C as Esc, since raw
/// mode swallows the interrupt signal.
pub struct CrosstermKeys {
    pending: VecDeque<u8>,
}

impl CrosstermKeys {
    pub fn new() -> Self {
        CrosstermKeys { pending: VecDeque::new() }
    }
}

impl KeySource for CrosstermKeys {
    fn read_code(&mut self) -> io::Result<u8> {
        loop {
            if let Some(code) = self.pending.pop_front() {
                return Ok(code);
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.pending.extend(encode_key(&key));
                }
            }
        }
    }
}

fn encode_key(key: &KeyEvent) -> Vec<u8> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![CODE_ESC];
    }

    match key.code {
        KeyCode::Up => vec![EXTENDED_PREFIX, CODE_UP],
        KeyCode::Down => vec![EXTENDED_PREFIX, CODE_DOWN],
        KeyCode::Left => vec![EXTENDED_PREFIX, CODE_LEFT],
        KeyCode::Right => vec![EXTENDED_PREFIX, CODE_RIGHT],
        KeyCode::Enter => vec![CODE_ENTER],
        KeyCode::Backspace => vec![CODE_BACKSPACE],
        KeyCode::Tab => vec![CODE_TAB],
        KeyCode::Esc => vec![CODE_ESC],
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => vec![EXTENDED_PREFIX, CODE_UP],
            's' => vec![EXTENDED_PREFIX, CODE_DOWN],
            'a' => vec![EXTENDED_PREFIX, CODE_LEFT],
            'd' => vec![EXTENDED_PREFIX, CODE_RIGHT],
            ' ' => vec![CODE_SPACE],
            c if c.is_ascii() && c != '\0' => vec![c as u8],
            _ => vec![],
        },
        _ => vec![],
    }
}

///////////////////////////////////////////////////////////////////////////////

pub type Callback = Arc<dyn Fn(Input) + Send + Sync>;

/// Ordered subscriber list keyed by a stable identity `K`.
///
/// `invoke` calls a snapshot of the list taken when dispatch starts, so a
/// callback may subscribe or unsubscribe anyone, itself included; the change
/// applies from the next dispatch on.
pub struct InputEvents<K> {
    subscribers: Mutex<Vec<(K, Callback)>>,
}

impl<K: Copy + PartialEq + Debug> InputEvents<K> {
    pub fn new() -> Self {
        InputEvents { subscribers: Mutex::new(Vec::new()) }
    }

    pub fn subscribe<F>(&self, id: K, callback: F)
    where
        F: Fn(Input) + Send + Sync + 'static,
    {
        debug!("subscribing {:?}", id);
        self.lock().push((id, Arc::new(callback)));
    }

    pub fn unsubscribe(&self, id: K) {
        debug!("unsubscribing {:?}", id);
        self.lock().retain(|(other, _)| *other != id);
    }

    #[cfg(test)]
    pub fn is_subscribed(&self, id: K) -> bool {
        self.lock().iter().any(|(other, _)| *other == id)
    }

    pub fn invoke(&self, input: Input) {
        let snapshot: Vec<Callback> = self.lock().iter().map(|(_, f)| Arc::clone(f)).collect();
        for callback in snapshot {
            callback(input);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(K, Callback)>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

const NO_DIRECTION: u8 = 0;

fn encode_dir(dir: Direction) -> u8 {
    Input::from(dir) as u8
}

fn decode_dir(code: u8) -> Option<Direction> {
    [Input::Up, Input::Down, Input::Left, Input::Right].iter()
        .find(|input| **input as u8 == code)
        .and_then(|input| input.direction())
}

/// Flags shared between the input thread and the game loop.
pub struct Signals {
    running: AtomicBool,
    has_input: AtomicBool,
    input_dir: AtomicU8,
    start_dir: AtomicU8,
}

impl Signals {
    pub fn new() -> Self {
        Signals {
            running: AtomicBool::new(true),
            has_input: AtomicBool::new(false),
            input_dir: AtomicU8::new(NO_DIRECTION),
            start_dir: AtomicU8::new(NO_DIRECTION),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Buffers a direction change; a newer one overwrites an unconsumed one.
    pub fn set_direction(&self, dir: Direction) {
        self.input_dir.store(encode_dir(dir), Ordering::SeqCst);
        self.has_input.store(true, Ordering::SeqCst);
    }

    pub fn take_direction(&self) -> Option<Direction> {
        if self.has_input.swap(false, Ordering::SeqCst) {
            decode_dir(self.input_dir.load(Ordering::SeqCst))
        } else {
            None
        }
    }

    pub fn clear_direction(&self) {
        self.has_input.store(false, Ordering::SeqCst);
    }

    /// Records a start request. Only the first request until the next
    /// `take_start` wins; returns whether this one did.
    pub fn request_start(&self, dir: Direction) -> bool {
        self.start_dir
            .compare_exchange(NO_DIRECTION, encode_dir(dir), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn take_start(&self) -> Option<Direction> {
        decode_dir(self.start_dir.swap(NO_DIRECTION, Ordering::SeqCst))
    }
}

/// Spawns the input thread. It exits once the running flag is cleared and
/// its current read returns, or when the key source fails.
pub fn spawn_listener<S, K>(
    mut keys: S,
    events: Arc<InputEvents<K>>,
    signals: Arc<Signals>,
) -> io::Result<JoinHandle<()>>
where
    S: KeySource + 'static,
    K: Copy + PartialEq + Debug + Send + 'static,
{
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            while signals.is_running() {
                match read_input(&mut keys) {
                    Ok(Some(input)) => events.invoke(input),
                    Ok(None) => {}
                    Err(e) => {
                        error!("reading keyboard failed: {}", e);
                        signals.stop();
                    }
                }
            }
            debug!("input thread finished");
        })
}
