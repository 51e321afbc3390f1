use std::io;
use std::time::{Duration, Instant};

use crossterm::clipboard::CopyToClipboard;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use ratatui::{backend::Backend, Terminal};
use tracing::debug;

use crate::context::{AppEvent, Effect, SessionContext, UserCommand};
use crate::game::COLS;
use crate::net::PeerTransport;
use crate::notify::NotificationKind;

const FRAME: Duration = Duration::from_millis(100);
const CODE_LEN: usize = 4;

/// What keystrokes currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a room code to join.
    JoinCode(String),
}

pub struct App<T: PeerTransport> {
    context: SessionContext<T>,
    selected_column: usize,
    input_mode: InputMode,
    should_quit: bool,
}

impl<T: PeerTransport> App<T> {
    pub fn new(context: SessionContext<T>) -> Self {
        App {
            context,
            selected_column: COLS / 2, // Start in middle
            input_mode: InputMode::Normal,
            should_quit: false,
        }
    }

    pub fn context(&self) -> &SessionContext<T> {
        &self.context
    }

    pub fn selected_column(&self) -> usize {
        self.selected_column
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Forward a command to the session context.
    pub fn dispatch(&mut self, command: UserCommand, now: Instant) -> Option<Effect> {
        self.context.handle(AppEvent::Command(command), now)
    }

    /// Main application loop
    pub fn run<B>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B: Backend + io::Write,
        B::Error: Into<io::Error>,
    {
        loop {
            self.context.pump(Instant::now());
            terminal.draw(|f| self.render(f)).map_err(Into::into)?;

            if self.should_quit {
                break;
            }

            if let Some(effect) = self.handle_events()? {
                self.perform(effect, terminal.backend_mut());
            }
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<Option<Effect>> {
        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key, Instant::now()));
                }
            }
        }
        Ok(None)
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Effect> {
        if let InputMode::JoinCode(code) = &mut self.input_mode {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() && code.len() < CODE_LEN => code.push(c),
                KeyCode::Backspace => {
                    code.pop();
                }
                KeyCode::Enter => {
                    let code = std::mem::take(code);
                    self.input_mode = InputMode::Normal;
                    return self.dispatch(UserCommand::JoinRoom(code), now);
                }
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                return self.dispatch(UserCommand::Play(self.selected_column), now);
            }
            KeyCode::Char('h') => return self.dispatch(UserCommand::CreateRoom, now),
            KeyCode::Char('j') => self.input_mode = InputMode::JoinCode(String::new()),
            KeyCode::Char('r') => {
                self.selected_column = COLS / 2;
                return self.dispatch(UserCommand::Restart, now);
            }
            KeyCode::Char('c') => return self.dispatch(UserCommand::CopyRoomId, now),
            _ => {}
        }
        None
    }

    /// Carry out a side effect requested by the context.
    fn perform<W: io::Write>(&mut self, effect: Effect, out: &mut W) {
        let now = Instant::now();
        match effect {
            Effect::CopyToClipboard(text) => {
                match execute!(out, CopyToClipboard::to_clipboard_from(text.as_str())) {
                    Ok(()) => {
                        let msg = format!("Room code {text} copied");
                        self.context.notify(NotificationKind::Success, msg, now);
                    }
                    Err(e) => {
                        debug!(error = %e, "clipboard write failed");
                        let msg = format!("Could not copy room code: {e}");
                        self.context.notify(NotificationKind::Warning, msg, now);
                    }
                }
            }
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, self);
    }
}
