// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
mod ui;

use anyhow::{Context, Result};
use client::api::ApiClient;
use client::config::ClientConfig;
use client::controller::{AuthField, Controller};
use client::form::TaskField;
use client::session::Session;
use client::status::Operation;
use client::storage::LocalStorage;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Terminal-only state that the controller does not need to know about.
#[derive(Debug, Default)]
pub struct UiState {
    pub task_focus: TaskField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    CreateTask,
    Refresh,
    RequestOtp,
    LoginOtp,
    ApplyToken,
    Logout,
    Quit,
}

impl Action {
    /// Operations whose busy labels are shown while the action runs.
    fn operations(self) -> &'static [Operation] {
        match self {
            Action::CreateTask => &[Operation::CreateTask],
            Action::Refresh => &[Operation::FetchTasks],
            Action::RequestOtp => &[Operation::RequestOtp],
            Action::LoginOtp => &[Operation::LoginOtp],
            Action::ApplyToken => &[Operation::UpdateSession, Operation::FetchCurrentUser],
            Action::Logout => &[Operation::UpdateSession],
            Action::Quit => &[],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()?;
    init_logging(&config.log_file)?;

    tracing::info!("Starting up the client against {}", config.api_url);
    tracing::info!(
        "Local storage at {}, HTTP timeout {:?}",
        config.storage_url,
        config.http_timeout
    );

    let storage = LocalStorage::open(&config.storage_url).await?;
    let session = Session::restore(storage).await?;
    let api = ApiClient::new(&config.api_url, config.http_timeout)
        .context("Failed to build the HTTP client")?;
    let mut controller = Controller::new(api, session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Client stopped with an error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    tracing::info!("Client shut down.");
    Ok(())
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging(log_file: &str) -> Result<()> {
    let path = Path::new(log_file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut Controller,
) -> Result<()> {
    let mut ui_state = UiState::default();

    if controller.session().is_authenticated() {
        let resuming = [Operation::FetchTasks, Operation::FetchCurrentUser];
        terminal.draw(|f| ui::draw(f, controller, &ui_state, &resuming))?;
        controller.bootstrap().await;
    }

    loop {
        terminal.draw(|f| ui::draw(f, controller, &ui_state, &[]))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let Some(action) = handle_key(controller, &mut ui_state, key) else {
            continue;
        };
        if action == Action::Quit {
            return Ok(());
        }

        // One action at a time: show its busy label, then wait for it.
        terminal.draw(|f| ui::draw(f, controller, &ui_state, action.operations()))?;
        dispatch(controller, action).await;
    }
}

async fn dispatch(controller: &mut Controller, action: Action) {
    tracing::debug!("Dispatching {:?}", action);
    match action {
        Action::CreateTask => controller.create_task().await,
        Action::Refresh => controller.fetch_tasks().await,
        Action::RequestOtp => controller.request_otp().await,
        Action::LoginOtp => controller.login_with_otp().await,
        Action::ApplyToken => controller.apply_token_input().await,
        Action::Logout => controller.logout().await,
        Action::Quit => {}
    }
}

/// Applies editing keys directly and turns the rest into actions.
fn handle_key(controller: &mut Controller, ui_state: &mut UiState, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if controller.auth.modal_open {
        match key.code {
            KeyCode::Esc => controller.close_auth_modal(),
            KeyCode::Tab => controller.auth.focus = controller.auth.focus.next(),
            KeyCode::Enter => {
                return Some(match controller.auth.focus {
                    AuthField::Email => Action::RequestOtp,
                    AuthField::OtpCode => Action::LoginOtp,
                    AuthField::Token => Action::ApplyToken,
                });
            }
            KeyCode::Backspace => {
                auth_input(controller).pop();
            }
            KeyCode::Char(c) if !ctrl => auth_input(controller).push(c),
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char('c') if ctrl => return Some(Action::Quit),
        KeyCode::Char('l') if ctrl => controller.open_auth_modal(),
        KeyCode::Char('o') if ctrl => return Some(Action::Logout),
        KeyCode::Char('r') if ctrl => return Some(Action::Refresh),
        KeyCode::F(5) => return Some(Action::Refresh),
        KeyCode::Enter => return Some(Action::CreateTask),
        KeyCode::Tab => {
            ui_state.task_focus = match ui_state.task_focus {
                TaskField::Title => TaskField::EstimatedCompletionTime,
                TaskField::EstimatedCompletionTime => TaskField::Title,
            };
        }
        KeyCode::Backspace => {
            task_input(controller, ui_state.task_focus).pop();
        }
        KeyCode::Char(c) if !ctrl => task_input(controller, ui_state.task_focus).push(c),
        _ => {}
    }
    None
}

fn auth_input(controller: &mut Controller) -> &mut String {
    match controller.auth.focus {
        AuthField::Email => &mut controller.auth.email,
        AuthField::OtpCode => &mut controller.auth.otp_code,
        AuthField::Token => &mut controller.auth.token_input,
    }
}

fn task_input(controller: &mut Controller, field: TaskField) -> &mut String {
    match field {
        TaskField::Title => &mut controller.form.title,
        TaskField::EstimatedCompletionTime => &mut controller.form.estimated_completion_time,
    }
}
