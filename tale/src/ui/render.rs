//! Render orchestration for the story TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tale_core::Phase;

use crate::app::{App, SUBJECT_PRESETS};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.session.phase() {
        Phase::Playing => render_scene(frame, app, area),
        _ => render_start_screen(frame, app, area),
    }

    if app.confirm_exit {
        render_confirm_overlay(frame, app, area);
    }
}

/// Start screen: title, subject input, presets, and any retained error.
fn render_start_screen(frame: &mut Frame, app: &App, area: Rect) {
    let loading = app.dreaming || app.session.phase() == Phase::Loading;

    let column = centered_rect(area, 46, 14);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(1), // subtitle
            Constraint::Length(1),
            Constraint::Length(3), // input
            Constraint::Length(1), // status / hint
            Constraint::Length(1),
            Constraint::Length(2), // presets
            Constraint::Length(1),
            Constraint::Length(1), // error
        ])
        .split(column);

    let title = Paragraph::new("T A L E")
        .style(app.theme.accent_style())
        .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    let subtitle = Paragraph::new("NARRATIVE DEPTH ENGINE")
        .style(app.theme.dim_style())
        .alignment(Alignment::Center);
    frame.render_widget(subtitle, rows[1]);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(!loading))
        .title(" subject ");
    let inner = input_block.inner(rows[3]);
    let input = Paragraph::new(app.subject_input.as_str()).style(app.theme.text_style());
    frame.render_widget(input_block, rows[3]);
    frame.render_widget(input, inner);

    if loading {
        let spinner = SPINNER[(app.animation_frame / 2) as usize % SPINNER.len()];
        let status = Paragraph::new(format!("{spinner} Dreaming..."))
            .style(app.theme.accent_style())
            .alignment(Alignment::Center);
        frame.render_widget(status, rows[4]);
    } else {
        let hint = Paragraph::new("enter: begin   tab: preset   esc: quit")
            .style(app.theme.dim_style())
            .alignment(Alignment::Center);
        frame.render_widget(hint, rows[4]);

        let presets = Paragraph::new(format!("try: {}", SUBJECT_PRESETS.join(" / ")))
            .style(app.theme.dim_style())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(presets, rows[6]);

        // Keep the terminal cursor inside the input box while typing.
        let x = inner.x + app.subject_input[..app.cursor_position].chars().count() as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }

    if let Some(message) = app.session.last_error() {
        let error = Paragraph::new(message)
            .style(app.theme.error_style())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(error, rows[8]);
    }
}

/// The current scene: HUD, narrative text, image URL, and choices.
fn render_scene(frame: &mut Frame, app: &App, area: Rect) {
    let Some(node) = app.session.current_node() else {
        return;
    };

    let choices = app.session.offered_choices();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                            // HUD
            Constraint::Min(5),                               // narrative
            Constraint::Length(1),                            // image url
            Constraint::Length(choices.len().max(1) as u16 + 2), // choices
            Constraint::Length(1),                            // hints
        ])
        .split(area);

    render_hud(frame, app, rows[0]);

    let narrative = Paragraph::new(node.text.as_str())
        .style(app.theme.text_style())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(false)),
        );
    frame.render_widget(narrative, rows[1]);

    if let Some(image) = app.session.current_image() {
        let url = Paragraph::new(format!("image: {}", image.url()))
            .style(app.theme.dim_style());
        frame.render_widget(url, rows[2]);
    }

    if app.session.at_ending() {
        render_ending(frame, app, rows[3]);
    } else {
        render_choices(frame, app, rows[3]);
    }

    let hint = Paragraph::new("1-9: choose   backspace: go back   q: quit")
        .style(app.theme.dim_style());
    frame.render_widget(hint, rows[4]);
}

/// Top HUD line: story title on the left, depth on the right.
fn render_hud(frame: &mut Frame, app: &App, area: Rect) {
    let title = app.session.title().unwrap_or("");
    let left = Paragraph::new(format!("STORY ENGINE // {title}")).style(app.theme.dim_style());
    frame.render_widget(left, area);

    let right = Paragraph::new(format!("DEPTH: {}", app.session.depth()))
        .style(app.theme.dim_style())
        .alignment(Alignment::Right);
    frame.render_widget(right, area);
}

/// Numbered choice list for the current scene.
fn render_choices(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .session
        .offered_choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), app.theme.accent_style()),
                Span::styled("> ", app.theme.dim_style()),
                Span::styled(choice.text.as_str(), app.theme.text_style()),
            ])
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(true)),
    );
    frame.render_widget(list, area);
}

/// Banner shown when the story has reached a terminal scene.
fn render_ending(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::styled("E N D   O F   N A R R A T I V E", app.theme.ending_style()),
        Line::styled("press r to dream again", app.theme.dim_style()),
    ];
    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(false)),
        );
    frame.render_widget(banner, area);
}

/// Confirmation overlay for leaving the story at its first scene.
fn render_confirm_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay = centered_rect(area, 36, 5);
    frame.render_widget(Clear, overlay);

    let lines = vec![
        Line::styled("Leave this story?", app.theme.text_style()),
        Line::default(),
        Line::styled("[y] leave    [n] stay", app.theme.dim_style()),
    ];
    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(true)),
        );
    frame.render_widget(dialog, overlay);
}

/// A fixed-size rectangle centered in `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
