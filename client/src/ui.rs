// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::UiState;
use client::controller::{AuthField, Controller};
use client::form::TaskField;
use client::status::Operation;
use client::view::{self, Badge};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

/// Draws the whole screen. `pending` lists the operations about to run,
/// shown as busy even though the controller has not started them yet.
pub fn draw(frame: &mut Frame, controller: &Controller, ui_state: &UiState, pending: &[Operation]) {
    let errors = view::error_lines(controller);
    let error_height = if errors.is_empty() {
        0
    } else {
        errors.len() as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),            // Header
            Constraint::Length(7),            // Task form
            Constraint::Length(error_height), // Error banner
            Constraint::Min(3),               // Task list
            Constraint::Length(1),            // Key help
        ])
        .split(frame.area());

    draw_header(frame, controller, pending, chunks[0]);
    draw_task_form(frame, controller, ui_state, pending, chunks[1]);
    if !errors.is_empty() {
        draw_errors(frame, &errors, chunks[2]);
    }
    draw_task_list(frame, controller, pending, chunks[3]);
    draw_help(frame, chunks[4]);

    if controller.auth.modal_open {
        draw_auth_modal(frame, controller, pending);
    }
}

fn is_busy(controller: &Controller, pending: &[Operation], op: Operation) -> bool {
    pending.contains(&op) || controller.status().is_loading(op)
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_header(frame: &mut Frame, controller: &Controller, pending: &[Operation], area: Rect) {
    let mut right = vec![];
    if is_busy(controller, pending, Operation::FetchCurrentUser) {
        right.push(Span::styled(
            format!("{}  ", Operation::FetchCurrentUser.busy_label()),
            Style::default().fg(Color::DarkGray),
        ));
    } else if let Some(user) = controller.current_user() {
        right.push(Span::styled(
            user.nickname.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        right.push(Span::raw(format!(" <{}>  ", user.email)));
    }
    right.push(Span::styled(
        format!("[Ctrl+L] {}", view::account_label(controller.current_user())),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Todo App",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Backend at {}", controller.api_base_url()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(right),
    ]);
    frame.render_widget(header, area);
}

fn draw_task_form(
    frame: &mut Frame,
    controller: &Controller,
    ui_state: &UiState,
    pending: &[Operation],
    area: Rect,
) {
    let block = Block::default()
        .title(" Create task ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Title error
            Constraint::Length(1), // Estimate
            Constraint::Length(1), // Estimate error
            Constraint::Length(1), // Submit
        ])
        .split(inner);

    let form = &controller.form;
    let title_label = "Title: ";
    let estimate_label = "Estimated completion time (optional, YYYY-MM-DDTHH:MM): ";

    frame.render_widget(
        Paragraph::new(format!("{title_label}{}", form.title))
            .style(field_style(ui_state.task_focus == TaskField::Title)),
        rows[0],
    );
    if let Some(error) = form.error_for(TaskField::Title) {
        frame.render_widget(
            Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red)),
            rows[1],
        );
    }

    frame.render_widget(
        Paragraph::new(format!("{estimate_label}{}", form.estimated_completion_time))
            .style(field_style(ui_state.task_focus == TaskField::EstimatedCompletionTime)),
        rows[2],
    );
    if let Some(error) = form.error_for(TaskField::EstimatedCompletionTime) {
        frame.render_widget(
            Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red)),
            rows[3],
        );
    }

    let submit = if is_busy(controller, pending, Operation::CreateTask) {
        Operation::CreateTask.busy_label().to_string()
    } else {
        "[Enter] Add task".to_string()
    };
    frame.render_widget(
        Paragraph::new(submit).style(Style::default().fg(Color::Green)),
        rows[4],
    );

    if !controller.auth.modal_open {
        let (row, label, value) = match ui_state.task_focus {
            TaskField::Title => (rows[0], title_label, &form.title),
            TaskField::EstimatedCompletionTime => {
                (rows[2], estimate_label, &form.estimated_completion_time)
            }
        };
        let offset = (label.chars().count() + value.chars().count()) as u16;
        frame.set_cursor_position((row.x + offset.min(row.width.saturating_sub(1)), row.y));
    }
}

fn draw_errors(frame: &mut Frame, errors: &[String], area: Rect) {
    let lines: Vec<Line> = errors.iter().map(|e| Line::from(e.as_str())).collect();
    let banner = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
        );
    frame.render_widget(banner, area);
}

fn draw_task_list(frame: &mut Frame, controller: &Controller, pending: &[Operation], area: Rect) {
    let mut items: Vec<ListItem> = Vec::new();

    if is_busy(controller, pending, Operation::FetchTasks) {
        items.push(ListItem::new(Line::from(Span::styled(
            Operation::FetchTasks.busy_label(),
            Style::default().fg(Color::DarkGray),
        ))));
    }

    for row in view::task_rows(controller.tasks()) {
        let title_style = if row.struck {
            Style::default()
                .add_modifier(Modifier::CROSSED_OUT)
                .add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        let badge_style = match row.badge {
            Badge::Completed => Style::default().fg(Color::Green),
            Badge::Pending => Style::default().fg(Color::Yellow),
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(row.title, title_style),
            Span::raw("  "),
            Span::styled(format!("[{}]", row.badge.label()), badge_style),
        ])];
        if let Some(estimate) = row.estimate {
            lines.push(Line::from(Span::styled(
                estimate,
                Style::default().fg(Color::Gray),
            )));
        }
        items.push(ListItem::new(lines));
    }

    if let Some(message) = view::empty_message(controller) {
        if !pending.contains(&Operation::FetchTasks) {
            items.push(ListItem::new(Line::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            ))));
        }
    }

    let list = List::new(items).block(
        Block::default()
            .title(" Your tasks ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(list, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let help = Paragraph::new(Line::from(vec![
        key("Tab"),
        Span::raw(" field | "),
        key("Enter"),
        Span::raw(" add | "),
        key("F5"),
        Span::raw(" refresh | "),
        key("Ctrl+L"),
        Span::raw(" login | "),
        key("Ctrl+O"),
        Span::raw(" logout | "),
        key("Esc"),
        Span::raw(" quit"),
    ]))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, area);
}

fn draw_auth_modal(frame: &mut Frame, controller: &Controller, pending: &[Operation]) {
    let area = centered_rect(70, 17, frame.area());
    let block = Block::default()
        .title(" Login / Signup ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Email
            Constraint::Length(1), // Request OTP
            Constraint::Length(1), // OTP hint
            Constraint::Length(1), // Spacing
            Constraint::Length(1), // Code
            Constraint::Length(1), // Login
            Constraint::Length(1), // Spacing
            Constraint::Length(1), // Token
            Constraint::Min(1),    // Errors
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let auth = &controller.auth;
    let fields = [
        (AuthField::Email, "Email: ", &auth.email, rows[0]),
        (AuthField::OtpCode, "OTP code: ", &auth.otp_code, rows[4]),
        (AuthField::Token, "Access token (JWT): ", &auth.token_input, rows[7]),
    ];
    for (field, label, value, row) in fields {
        frame.render_widget(
            Paragraph::new(format!("{label}{value}")).style(field_style(auth.focus == field)),
            row,
        );
        if auth.focus == field {
            let offset = (label.chars().count() + value.chars().count()) as u16;
            frame.set_cursor_position((row.x + offset.min(row.width.saturating_sub(1)), row.y));
        }
    }

    let request = if is_busy(controller, pending, Operation::RequestOtp) {
        Operation::RequestOtp.busy_label()
    } else {
        "[Enter on Email] Request OTP (signup / login)"
    };
    frame.render_widget(
        Paragraph::new(request).style(Style::default().fg(Color::Green)),
        rows[1],
    );

    if let Some(info) = &auth.otp_info {
        frame.render_widget(
            Paragraph::new(info.as_str()).style(Style::default().fg(Color::Gray)),
            rows[2],
        );
    }

    let login = if is_busy(controller, pending, Operation::LoginOtp) {
        Operation::LoginOtp.busy_label()
    } else {
        "[Enter on OTP code] Login with OTP"
    };
    frame.render_widget(
        Paragraph::new(login).style(Style::default().fg(Color::Green)),
        rows[5],
    );

    let errors: Vec<Line> = [Operation::RequestOtp, Operation::LoginOtp, Operation::UpdateSession]
        .into_iter()
        .filter_map(|op| controller.status().error(op))
        .map(|e| Line::from(e.to_string()))
        .collect();
    frame.render_widget(
        Paragraph::new(errors)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red)),
        rows[8],
    );

    frame.render_widget(
        Paragraph::new("Tab switch field | Enter on Access token applies it | Esc close")
            .style(Style::default().fg(Color::Gray)),
        rows[9],
    );
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `r`.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
