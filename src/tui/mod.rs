pub mod input;
pub mod ui;

use anyhow::Result;
use flume::Receiver;
use ratatui::{backend::CrosstermBackend, prelude::*};
use std::{io, time::Duration};

use crate::{
    core::{bus::CoreToUi, state::SharedState},
    tui::input::{map_key, Action},
};

/// Run the interactive panel until the user quits. Blocks the calling thread.
pub fn start(state: SharedState, updates: Receiver<CoreToUi>) -> Result<()> {
    log::info!("[TUI] nearby TUI starting...");

    // Setup terminal
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(&mut stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &state, &updates);

    // Restore terminal even when the loop failed
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::terminal::disable_raw_mode()?;

    log::info!("[TUI] nearby TUI stopped");
    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &SharedState,
    updates: &Receiver<CoreToUi>,
) -> Result<()> {
    let mut spinner_frame = 0usize;
    loop {
        let snapshot = state.snapshot();
        terminal.draw(|f| ui::render_ui(f, &snapshot, spinner_frame))?;

        if crossterm::event::poll(Duration::from_millis(200))? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if map_key(key) == Action::Quit {
                    break;
                }
            }
        }

        // Wake-ups only say "something changed"; the next draw picks it up.
        for msg in updates.try_iter() {
            log::trace!("[TUI] update: {msg:?}");
        }
        spinner_frame = spinner_frame.wrapping_add(1);
    }

    terminal.clear()?;
    Ok(())
}
