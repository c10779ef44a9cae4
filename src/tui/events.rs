use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::organizer::MediaOrganizer;
use crate::webhook::MediaItem;
use super::app::App;
use super::models::ProcessingStats;
use super::rendering::ui;

/// Shows the planned layout for `items` and writes it on Enter. Returns the final tallies.
pub async fn run_tui(organizer: MediaOrganizer, items: Vec<MediaItem>) -> Result<ProcessingStats> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(organizer, items);
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(app.stats)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.clear_status_message_if_expired();
        terminal.draw(|f| ui(f, app))?;

        if app.is_processing() {
            app.process_next();
            // let the list repaint between items
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        } else if !app.is_processing() {
                            return Ok(());
                        }
                    }
                    KeyCode::Char('h') => app.toggle_help(),
                    KeyCode::Char('p') => app.toggle_preview(),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Enter => {
                        if app.finished {
                            app.set_status_message("Nothing left to write".to_string());
                        } else {
                            app.start_processing();
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
