//! Runtime: terminal lifecycle and the event loop.
//!
//! A dedicated task blocks on crossterm input and forwards events over a
//! channel. The loop selects over input, finished adapter tasks, and
//! Ctrl+C, executes the effects components return, and redraws only when
//! the app marks itself dirty.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use relaunch_catalog::{EventDispatcher, RunCatalog};
use relaunch_types::DashboardConfig;
use tokio::{signal, sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::app::{App, Effect, Msg};
use crate::ui::main::MainView;

/// Spawn a task that blocks on terminal input and forwards crossterm events
/// over a channel. Keeping `poll()` and `read()` together avoids lost
/// events in some terminals.
fn spawn_input_task() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(100);
    tokio::task::spawn_blocking(move || {
        loop {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%err, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "failed to poll terminal events");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Execute one effect, spawning adapter calls so the loop never blocks on
/// the network. Returns true when the loop should exit.
fn execute_effect(
    app: &App,
    effect: Effect,
    pending: &mut FuturesUnordered<JoinHandle<Msg>>,
) -> bool {
    match effect {
        Effect::LoadBranches { flow, generation } => {
            let catalog = Arc::clone(&app.ctx.catalog);
            pending.push(tokio::spawn(async move {
                Msg::BranchesLoaded {
                    generation,
                    result: catalog.list_branches(&flow).await,
                }
            }));
        }
        Effect::LoadRuns {
            flow,
            project,
            branch,
            generation,
        } => {
            let catalog = Arc::clone(&app.ctx.catalog);
            pending.push(tokio::spawn(async move {
                Msg::RunsLoaded {
                    generation,
                    result: catalog
                        .list_runs(&flow, project.as_deref(), branch.as_deref())
                        .await,
                }
            }));
        }
        Effect::Launch(request) => {
            let dispatcher = Arc::clone(&app.ctx.dispatcher);
            let summary = request.summary();
            pending.push(tokio::spawn(async move {
                let result = dispatcher
                    .publish(&request.event_name, &request.payload)
                    .await;
                Msg::LaunchFinished { summary, result }
            }));
        }
        Effect::Quit => return true,
    }
    false
}

pub async fn run_app(
    config: DashboardConfig,
    catalog: Arc<dyn RunCatalog>,
    dispatcher: Arc<dyn EventDispatcher>,
) -> Result<()> {
    let mut input = spawn_input_task();
    let mut app = App::new(config, catalog, dispatcher);
    let mut view = MainView::new(&app);
    let mut terminal = setup_terminal()?;

    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    let mut effects: Vec<Effect> = app.initial_effects();

    let result = loop {
        let mut quit = false;
        for effect in effects.drain(..) {
            quit |= execute_effect(&app, effect, &mut pending);
        }
        if quit {
            break Ok(());
        }

        if app.dirty {
            app.dirty = false;
            if let Err(err) = terminal.draw(|frame| view.draw(frame, &mut app)) {
                break Err(err.into());
            }
        }

        tokio::select! {
            maybe_event = input.recv() => {
                let Some(event) = maybe_event else { break Ok(()) };
                match event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        effects.extend(view.handle_key(&mut app, key));
                        app.dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        effects.extend(view.handle_mouse(&mut app, mouse));
                    }
                    Event::Resize(_, _) => {
                        app.dirty = true;
                    }
                    _ => {}
                }
            }
            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => effects.extend(app.update(msg)),
                    Err(err) => {
                        warn!(%err, "adapter task failed");
                        app.loading = false;
                        app.launching = false;
                        app.dirty = true;
                    }
                }
            }
            _ = signal::ctrl_c() => break Ok(()),
        }
    };

    cleanup_terminal(&mut terminal)?;
    result
}
