use std::io::{self, stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::{self, Color as TermColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use log::{debug, warn};

use crate::config::{CELL_SIZE, HEIGHT, WIDTH};
use crate::error::GameResult;
use crate::sync::CancelToken;
use crate::window::{Color, DrawCommand, Frame, FrameEvent, Invalidator, KeyPress, KeySource, Window, WindowEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CELL_STR: &str = "██";
/// Terminal characters are about twice as tall as wide.
const COLUMNS_PER_CELL: i32 = 2;

/// A crossterm-backed window: raw mode on the alternate screen.
pub struct TermWindow {
    stdout: Stdout,
    events: Receiver<WindowEvent>,
    invalidator: Arc<TermInvalidator>,
    pump: Option<JoinHandle<()>>,
}

/// Turns redraw requests into frame events, at most one queued at a time.
pub struct TermInvalidator {
    sender: Mutex<Sender<WindowEvent>>,
    frame_pending: AtomicBool,
    keys: KeySource,
}

impl TermInvalidator {
    fn send(&self, event: WindowEvent) {
        // The receiver only goes away once the render loop has finished.
        let _ = self.sender.lock().unwrap_or_else(PoisonError::into_inner).send(event);
    }

    fn frame_delivered(&self) {
        self.frame_pending.store(false, Ordering::SeqCst);
    }
}

impl Invalidator for TermInvalidator {
    fn invalidate(&self) {
        if !self.frame_pending.swap(true, Ordering::SeqCst) {
            self.send(WindowEvent::Frame(FrameEvent { source: self.keys.clone() }));
        }
    }
}

impl TermWindow {
    /// Switches the terminal into game mode and starts the event pump.
    pub fn open(token: CancelToken) -> GameResult<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        with_rollback(
            || {
                terminal::enable_raw_mode()?;
                execute!(stdout, cursor::Hide, cursor::DisableBlinking)?;
                Ok(())
            },
            || {
                let _ = terminal::disable_raw_mode();
                let mut out = io::stdout();
                let _ = execute!(out, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen);
            },
        )?;

        let (sender, events) = channel();
        let invalidator = Arc::new(TermInvalidator {
            sender: Mutex::new(sender),
            frame_pending: AtomicBool::new(false),
            keys: KeySource::new(),
        });

        let pump = {
            let invalidator = invalidator.clone();
            thread::spawn(move || pump_events(&invalidator, &token))
        };

        // First frame without waiting for the first tick.
        invalidator.invalidate();

        Ok(TermWindow { stdout, events, invalidator, pump: Some(pump) })
    }

    pub fn invalidator(&self) -> Arc<TermInvalidator> {
        self.invalidator.clone()
    }

    /// Waits for the event pump and gives the terminal back. The pump stops
    /// once its cancel token fires.
    pub fn restore(&mut self) -> GameResult<()> {
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                warn!("terminal event pump panicked");
            }
        }

        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }

    fn print_cell(&mut self, col: u16, row: u16, color: Color) -> GameResult<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(col, row),
            style::SetForegroundColor(term_color(color)),
            style::Print(CELL_STR)
        )?;
        Ok(())
    }

    fn print_text(&mut self, text: &str, color: Color, term_width: u16) -> GameResult<()> {
        let grid_width = (WIDTH * COLUMNS_PER_CELL) as u16;
        let right_edge = grid_width.min(term_width);
        let col = right_edge.saturating_sub(text.chars().count() as u16);

        queue!(
            self.stdout,
            cursor::MoveTo(col, 0),
            style::SetForegroundColor(term_color(color)),
            style::Print(text)
        )?;
        Ok(())
    }
}

impl Window for TermWindow {
    fn next_event(&mut self) -> WindowEvent {
        match self.events.recv() {
            Ok(event) => {
                if let WindowEvent::Frame(_) = event {
                    self.invalidator.frame_delivered();
                }
                event
            }
            Err(_) => WindowEvent::Destroy(Some("terminal event channel closed".to_string())),
        }
    }

    fn submit(&mut self, frame: Frame) -> GameResult<()> {
        let (term_width, term_height) = terminal::size()?;

        queue!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;

        for command in &frame.commands {
            match command {
                DrawCommand::Rect { x, y, width, height, color } => {
                    for (col, row) in covered_cells(*x, *y, *width, *height, term_width, term_height) {
                        self.print_cell(col, row, *color)?;
                    }
                }
                DrawCommand::Text { text, color } => self.print_text(text, *color, term_width)?,
            }
        }

        queue!(self.stdout, style::ResetColor)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Terminal positions of the grid cells a pixel rectangle covers, clipped to
/// both the grid and the terminal.
fn covered_cells(x: i32, y: i32, width: i32, height: i32, term_width: u16, term_height: u16) -> Vec<(u16, u16)> {
    let first_col = x.div_euclid(CELL_SIZE).max(0);
    let first_row = y.div_euclid(CELL_SIZE).max(0);
    let last_col = x.saturating_add(width - 1).div_euclid(CELL_SIZE).min(WIDTH - 1);
    let last_row = y.saturating_add(height - 1).div_euclid(CELL_SIZE).min(HEIGHT - 1);

    let mut cells = vec![];
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let term_col = col * COLUMNS_PER_CELL;
            if term_col + COLUMNS_PER_CELL <= term_width as i32 && row < term_height as i32 {
                cells.push((term_col as u16, row as u16));
            }
        }
    }
    cells
}

/// Runs `setup`; if it fails, runs `rollback` before returning the error.
fn with_rollback<T>(setup: impl FnOnce() -> GameResult<T>, rollback: impl FnOnce()) -> GameResult<T> {
    let result = setup();
    if result.is_err() {
        rollback();
    }
    result
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb { r: color.r, g: color.g, b: color.b }
}

fn pump_events(invalidator: &TermInvalidator, token: &CancelToken) {
    debug!("terminal event pump started");

    while !token.is_cancelled() {
        let event = match poll(POLL_INTERVAL) {
            Ok(true) => read(),
            Ok(false) => continue,
            Err(e) => Err(e),
        };

        match event {
            Ok(Event::Key(ev)) if is_ctrl_c(&ev) => {
                invalidator.send(WindowEvent::Destroy(None));
                break;
            }
            Ok(Event::Key(ev)) => {
                if let Some(name) = key_name(ev.code) {
                    invalidator.keys.push(KeyPress::new(name));
                }
                invalidator.invalidate();
            }
            Ok(Event::Resize(..)) => invalidator.invalidate(),
            Ok(_) => {}
            Err(e) => {
                invalidator.send(WindowEvent::Destroy(Some(e.to_string())));
                break;
            }
        }
    }

    debug!("terminal event pump stopped");
}

fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_ascii_uppercase().to_string()),
        KeyCode::Esc => Some("Escape".to_string()),
        KeyCode::Enter => Some("Enter".to_string()),
        KeyCode::Up => Some("Up".to_string()),
        KeyCode::Down => Some("Down".to_string()),
        KeyCode::Left => Some("Left".to_string()),
        KeyCode::Right => Some("Right".to_string()),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::GameError;

    #[test]
    fn cell_rect_maps_to_two_columns() {
        assert_eq!(covered_cells(13 * CELL_SIZE, 12 * CELL_SIZE, CELL_SIZE, CELL_SIZE, 200, 100), vec![(26, 12)]);
    }

    #[test]
    fn cells_outside_grid_are_clipped() {
        assert!(covered_cells(-CELL_SIZE, 0, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
        assert!(covered_cells(WIDTH * CELL_SIZE, 0, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
        assert!(covered_cells(0, HEIGHT * CELL_SIZE, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
    }

    #[test]
    fn rects_at_the_ends_of_i32_are_clipped() {
        assert!(covered_cells(i32::MAX, 0, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
        assert!(covered_cells(0, i32::MAX, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
        assert!(covered_cells(i32::MIN, i32::MIN, CELL_SIZE, CELL_SIZE, 200, 100).is_empty());
    }

    #[test]
    fn cells_outside_terminal_are_clipped() {
        assert!(covered_cells(10 * CELL_SIZE, 0, CELL_SIZE, CELL_SIZE, 20, 100).is_empty());
        assert!(covered_cells(0, 10 * CELL_SIZE, CELL_SIZE, CELL_SIZE, 200, 10).is_empty());
    }

    #[test]
    fn failed_setup_is_rolled_back() {
        let mut rolled_back = false;

        let result: GameResult<()> = with_rollback(
            || Err(GameError::Io(io::Error::new(io::ErrorKind::Other, "no tty"))),
            || rolled_back = true,
        );

        assert!(matches!(result, Err(GameError::Io(_))));
        assert!(rolled_back);
    }

    #[test]
    fn successful_setup_is_kept() {
        let mut rolled_back = false;

        let result = with_rollback(|| Ok(7), || rolled_back = true);

        assert_eq!(result.unwrap(), 7);
        assert!(!rolled_back);
    }

    #[test]
    fn key_names_are_uppercased() {
        assert_eq!(key_name(KeyCode::Char('w')), Some("W".to_string()));
        assert_eq!(key_name(KeyCode::Char('Q')), Some("Q".to_string()));
        assert_eq!(key_name(KeyCode::Tab), None);
    }

    #[test]
    fn ctrl_c_is_detected() {
        assert!(is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn invalidate_coalesces_until_delivered() {
        let (sender, events) = channel();
        let invalidator = TermInvalidator {
            sender: Mutex::new(sender),
            frame_pending: AtomicBool::new(false),
            keys: KeySource::new(),
        };

        invalidator.invalidate();
        invalidator.invalidate();
        assert!(matches!(events.try_recv(), Ok(WindowEvent::Frame(_))));
        assert!(events.try_recv().is_err());

        invalidator.frame_delivered();
        invalidator.invalidate();
        assert!(matches!(events.try_recv(), Ok(WindowEvent::Frame(_))));
    }
}
