//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, detail load results, screen snapshots and a
//! periodic tick.

use crate::app::{App, AppEvent, View};
use crate::feed::DetailView;
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;
use super::SPINNER_FRAMES;

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` over:
/// - **Signals**: SIGTERM/SIGINT end the loop (Unix only)
/// - **Terminal input**: key presses from crossterm's async event stream
/// - **Detail loads**: results arriving on the `AppEvent` channel
/// - **Screen snapshots**: a new `FeedView` from either mounted screen
/// - **Periodic tick**: 250ms timer for the spinner and status expiry
///
/// A panic hook restores the terminal before unwinding. Both screens are
/// unmounted on the way out.
pub async fn run(
    mut app: App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    let mut popular_rx = app.popular.subscribe();
    let mut latest_rx = app.latest.subscribe();
    // A screen whose actor is gone stops publishing; its last view stays
    let mut popular_live = true;
    let mut latest_live = true;

    // On non-Unix platforms these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let result: Result<()> = loop {
        if app.needs_redraw {
            if let Err(e) = terminal.draw(|f| render(f, &mut app)) {
                break Err(e.into());
            }
            app.needs_redraw = false;
        }

        // Drain finished detail loads before waiting on more input
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(&mut app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break Ok(());
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break Ok(());
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(&mut app, key.code, key.modifiers, &event_tx) {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(&mut app, event);
            }

            changed = popular_rx.changed(), if popular_live => {
                if changed.is_ok() {
                    let view = popular_rx.borrow_and_update().clone();
                    app.apply_view(view);
                } else {
                    tracing::warn!("Popular screen stopped publishing");
                    popular_live = false;
                }
            }

            changed = latest_rx.changed(), if latest_live => {
                if changed.is_ok() {
                    let view = latest_rx.borrow_and_update().clone();
                    app.apply_view(view);
                } else {
                    tracing::warn!("Latest screen stopped publishing");
                    latest_live = false;
                }
            }

            _ = tick_interval.tick() => handle_tick(&mut app),
        }
    };

    restore_terminal(terminal)?;

    app.popular.unmount().await;
    app.latest.unmount().await;
    tracing::info!("Screens unmounted");
    result
}

/// Animate the spinner while something is loading and expire old status text.
fn handle_tick(app: &mut App) {
    let loading = match app.view {
        View::Detail => matches!(app.detail, DetailView::Loading),
        View::Browse => app.current_view().is_loading(),
    };
    if loading {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES.len();
        app.needs_redraw = true;
    }

    if app.clear_expired_status() {
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
