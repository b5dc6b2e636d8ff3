use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::board::{Board, Collision, Meal, MoveOutcome, Tile};
use crate::clock::FrameClock;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::input::{spawn_listener, Input, InputEvents, KeySource, Signals};
use crate::render::{Renderer, MSG_HELP, MSG_STATUS};
use crate::snake::Direction;
use crate::term::Terminal;

const SNAKE_CHAR: char = '#';
const APPLE_CHAR: char = '@';
const DEAD_SNAKE_CHAR: char = 'X';
const EMPTY_CHAR: char = ' ';

const START_MSG: &str = "Press any direction key to start...";
const HELP_MSG: &str = "[esc]: stop program";
const GAME_OVER_MSG: &str = "Game over, new game available in ";
const WON_MSG: &str = "You won! new game available in ";
const GAME_OVER_READY_MSG: &str = "Game over, Press any direction key to restart...";
const WON_READY_MSG: &str = "You won! Press any direction key to restart...";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Unstarted,
    Running,
    Stopped,
}

/// Identities of the input subscribers the game registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Listener {
    Exit,
    GameStart,
    SetDirection,
}

pub struct SnakeGame<T: Terminal> {
    settings: Settings,
    state: GameState,
    board: Board,
    renderer: Renderer<T>,
    events: Arc<InputEvents<Listener>>,
    signals: Arc<Signals>,
    start_dir: Direction,
    move_countdown: f64,
    restart_countdown: f64,
    restart_ready: bool,
    countdown_pos: (u16, u16),
    won: bool,
}

impl<T: Terminal> SnakeGame<T> {
    pub fn new(term: T, settings: Settings) -> Self {
        let board = Board::new(&settings);
        SnakeGame::with_board(term, settings, board)
    }

    pub fn with_board(term: T, settings: Settings, board: Board) -> Self {
        let renderer = Renderer::new(term, settings.width, settings.height);
        let events = Arc::new(InputEvents::new());
        let signals = Arc::new(Signals::new());

        let exit_signals = Arc::clone(&signals);
        events.subscribe(Listener::Exit, move |input| {
            if input == Input::Esc {
                info!("exit requested");
                exit_signals.stop();
            }
        });
        subscribe_start(&events, &signals);

        SnakeGame {
            settings,
            state: GameState::Unstarted,
            board,
            renderer,
            events,
            signals,
            start_dir: Direction::Right,
            move_countdown: 1.0,
            restart_countdown: 0.0,
            restart_ready: false,
            countdown_pos: (0, 0),
            won: false,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn events(&self) -> Arc<InputEvents<Listener>> {
        Arc::clone(&self.events)
    }

    pub fn signals(&self) -> Arc<Signals> {
        Arc::clone(&self.signals)
    }

    pub fn show_intro(&self) {
        self.renderer.set_cursor_visible(false);
        self.renderer.draw_border();
        self.renderer.draw_score(self.board.score(), self.board.hi_score());
        self.renderer.draw_cell(self.settings.start, SNAKE_CHAR);
        self.renderer.draw_message(MSG_STATUS, START_MSG);
        self.renderer.draw_message(MSG_HELP, HELP_MSG);
    }

    /// Runs until Esc. Hands the terminal back for restoring.
    pub fn run<S: KeySource + 'static>(mut self, keys: S) -> Result<T> {
        let listener = spawn_listener(keys, self.events(), self.signals())?;
        self.show_intro();

        let mut clock = FrameClock::new(self.settings.frame_interval());
        while self.signals.is_running() {
            let elapsed = clock.start_frame();
            self.tick(elapsed);
            clock.wait();
        }

        info!("game loop finished in state {:?}", self.state());
        listener.join().map_err(|_| Error::InputThread)?;
        Ok(self.renderer.into_terminal())
    }

    /// One loop iteration, `elapsed` after the previous one.
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(dir) = self.signals.take_start() {
            self.start_dir = dir;
            self.change_state(GameState::Running);
        }

        let secs = elapsed.as_secs_f64();
        match self.state {
            GameState::Running => {
                self.move_countdown -= secs * self.board.speed();

                // A turn steps right away instead of waiting for the timer
                if let Some(dir) = self.signals.take_direction() {
                    if dir.is_orthogonal(self.board.direction()) {
                        self.move_countdown = 1.0;
                        self.step(dir);
                    }
                }

                if self.state == GameState::Running && self.move_countdown < 0.0 {
                    self.move_countdown += 1.0;
                    self.step(self.board.direction());
                }
            }
            GameState::Stopped if !self.restart_ready => {
                self.restart_countdown -= secs;
                if self.restart_countdown < 0.0 {
                    self.restart_available();
                } else {
                    let text = format!("{:.1}", self.restart_countdown);
                    self.renderer.draw_text(self.countdown_pos, &text);
                }
            }
            _ => {}
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn change_state(&mut self, to: GameState) {
        info!("state {:?} -> {:?}", self.state, to);

        if self.state == GameState::Running {
            self.events.unsubscribe(Listener::SetDirection);
        }

        self.state = to;

        match to {
            GameState::Running => self.enter_running(),
            GameState::Stopped => self.enter_stopped(),
            GameState::Unstarted => {}
        }
    }

    fn enter_running(&mut self) {
        self.renderer.clear_map();
        self.renderer.draw_cell(self.settings.start, SNAKE_CHAR);

        match self.board.reset(self.start_dir) {
            Ok(apple) => self.renderer.draw_cell(apple, APPLE_CHAR),
            Err(e) => warn!("{}", e),
        }

        self.renderer.draw_score(self.board.score(), self.board.hi_score());

        self.move_countdown = 1.0;
        self.won = false;
        self.signals.clear_direction();

        let signals = Arc::clone(&self.signals);
        self.events.subscribe(Listener::SetDirection, move |input| {
            if let Some(dir) = input.direction() {
                signals.set_direction(dir);
            }
        });

        self.renderer.draw_message(MSG_STATUS, "");
    }

    fn enter_stopped(&mut self) {
        if !self.won {
            self.renderer.replace_cells(&self.board, Tile::Snake, DEAD_SNAKE_CHAR);
        }

        let msg = if self.won { WON_MSG } else { GAME_OVER_MSG };
        self.countdown_pos = self.renderer.draw_message(MSG_STATUS, msg);

        self.restart_countdown = self.settings.restart_countdown;
        self.restart_ready = false;
    }

    fn restart_available(&mut self) {
        let msg = if self.won { WON_READY_MSG } else { GAME_OVER_READY_MSG };
        self.renderer.draw_message(MSG_STATUS, msg);
        subscribe_start(&self.events, &self.signals);
        self.restart_ready = true;
    }

    fn step(&mut self, dir: Direction) {
        match self.board.try_move(dir) {
            Ok(MoveOutcome::Ignored) => {}
            Ok(MoveOutcome::Moved { new_head, old_tail, meal }) => {
                self.renderer.draw_cell(new_head, SNAKE_CHAR);
                if let Some(tail) = old_tail {
                    self.renderer.draw_cell(tail, EMPTY_CHAR);
                }

                match meal {
                    Meal::NotEaten => {}
                    Meal::Respawned(apple) => {
                        self.renderer.draw_cell(apple, APPLE_CHAR);
                        self.renderer.draw_score(self.board.score(), self.board.hi_score());
                    }
                    Meal::BoardFull => {
                        self.renderer.draw_score(self.board.score(), self.board.hi_score());
                        info!("board full, round won with score {}", self.board.score());
                        self.won = true;
                        self.change_state(GameState::Stopped);
                    }
                }
            }
            Err(Collision(pos)) => {
                info!("crashed at {} with score {}", pos, self.board.score());
                self.change_state(GameState::Stopped);
            }
        }
    }
}

/// Registers the listener that turns the next direction key into a start
/// request. It removes itself on the first direction it sees.
fn subscribe_start(events: &Arc<InputEvents<Listener>>, signals: &Arc<Signals>) {
    let weak = Arc::downgrade(events);
    let signals = Arc::clone(signals);
    events.subscribe(Listener::GameStart, move |input| {
        if let Some(dir) = input.direction() {
            if let Some(events) = weak.upgrade() {
                events.unsubscribe(Listener::GameStart);
            }
            signals.request_start(dir);
        }
    });
}
