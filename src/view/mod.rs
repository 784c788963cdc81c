//! TUI rendering and terminal management (impure shell)

pub mod constants;
mod styles;
pub mod table;
pub mod text;

pub use styles::{ColorConfig, TableStyles};
pub use table::{TableView, body_height};

use crate::cache::TieredCache;
use crate::config::KeyBindings;
use crate::model::{InputError, KeyAction};
use crate::source::{DatasetSource, infer_columns};
use crate::state::{
    AppState, cancel_filter, commit_filter, handle_filter_backspace, handle_filter_char,
    handle_filter_cursor_left, handle_filter_cursor_right, handle_table_action,
};
use crate::view::constants::POLL_INTERVAL_MS;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: usize = 3;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Dataset error
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    key_bindings: KeyBindings,
    styles: TableStyles,
    cache: TieredCache,
    source: DatasetSource,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Put the terminal in raw mode on the alternate screen and build the app.
    pub fn new(
        app_state: AppState,
        cache: TieredCache,
        source: DatasetSource,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, app_state, cache, source))
    }

    /// Run the event loop until the user quits.
    ///
    /// Redraws after every handled event. Idle polls time out without drawing.
    pub fn run(&mut self) -> Result<(), TuiError> {
        let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
        self.draw()?;

        loop {
            if !event::poll(poll_interval)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(width, height) => {
                    debug!(width, height, "Terminal resized");
                }
                _ => continue,
            }
            self.draw()?;
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Build the app around an already prepared terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        app_state: AppState,
        cache: TieredCache,
        source: DatasetSource,
    ) -> Self {
        Self {
            terminal,
            app_state,
            key_bindings: KeyBindings::default(),
            styles: TableStyles::with_color_config(ColorConfig::from_env()),
            cache,
            source,
        }
    }

    /// Current application state.
    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// The terminal being drawn to.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.app_state.is_editing_filter() {
            match key.code {
                KeyCode::Esc => cancel_filter(&mut self.app_state),
                KeyCode::Enter => commit_filter(&mut self.app_state),
                KeyCode::Backspace => handle_filter_backspace(&mut self.app_state),
                KeyCode::Left => handle_filter_cursor_left(&mut self.app_state),
                KeyCode::Right => handle_filter_cursor_right(&mut self.app_state),
                KeyCode::Char(ch) => handle_filter_char(&mut self.app_state, ch),
                _ => {}
            }
            return false;
        }

        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        match action {
            KeyAction::Refresh => self.refresh(),
            other => handle_table_action(&mut self.app_state, other),
        }
        self.app_state.should_quit
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let action = match mouse.kind {
            MouseEventKind::ScrollUp => KeyAction::ScrollUp,
            MouseEventKind::ScrollDown => KeyAction::ScrollDown,
            _ => return,
        };
        for _ in 0..WHEEL_ROWS {
            handle_table_action(&mut self.app_state, action);
        }
    }

    /// Drop the cached dataset and read it again.
    ///
    /// A failed reload keeps the rows on screen and reports the error in the
    /// status bar.
    pub fn refresh(&mut self) {
        match self.source.reload(&self.cache) {
            Ok(records) => {
                let count = records.len();
                let columns = infer_columns(&records);
                self.app_state.replace_data(columns, records);
                self.app_state.status = Some(format!("Reloaded {count} rows"));
                info!(rows = count, "Dataset refreshed");
            }
            Err(err) => {
                warn!(error = %err, "Dataset reload failed");
                self.app_state.status = Some(format!("Reload failed: {err}"));
            }
        }
    }

    /// Size the engine viewport to the terminal and render one frame.
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        self.app_state
            .engine_mut()
            .set_viewport_height(body_height(size.height));

        let state = &self.app_state;
        let styles = &self.styles;
        self.terminal.draw(|frame| {
            let area = frame.area();
            let view = TableView::new(state, styles);
            let cursor = view.filter_cursor(area);
            frame.render_widget(view, area);
            if let Some((x, y)) = cursor {
                frame.set_cursor_position((x, y));
            }
        })?;
        Ok(())
    }
}

/// Initialize and run the TUI over a loaded dataset.
///
/// Logging must be initialized by the caller. The terminal is restored even
/// when the event loop fails.
pub fn run_with_source(
    app_state: AppState,
    cache: TieredCache,
    source: DatasetSource,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(app_state, cache, source)?;
    let result = app.run();
    restore_terminal()?;
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
