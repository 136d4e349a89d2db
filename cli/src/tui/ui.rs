//! TUI rendering.

use std::time::Duration;

use chrono::Local;
use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, HighlightSpacing, Paragraph, Row, Table, TableState},
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Mode};
use super::input::TextInput;
use crate::format::truncate;

const KEY_HINTS: &str = "j/k:nav  o:open  x:kill  l:label  h:hide  /:filter  ?:help  q:quit";

const HELP_LINES: &[(&str, &str)] = &[
    ("j/k, ↑/↓", "Navigate"),
    ("o, enter", "Open in browser"),
    ("x", "Kill process"),
    ("l", "Edit label"),
    ("h", "Hide port"),
    ("r", "Refresh"),
    ("/", "Filter"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

const ACCENT: Color = Color::Magenta;

const LABEL_PROMPT: &str = "Label: ";

pub fn draw(f: &mut Frame, app: &App) {
    let show_filter = app.mode == Mode::Filter || !app.filter.is_empty();
    let show_label = app.mode == Mode::Label;

    let mut constraints = vec![Constraint::Length(1)]; // Title
    if show_filter {
        constraints.push(Constraint::Length(1));
    }
    if show_label {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0)); // Table
    constraints.push(Constraint::Length(2)); // Status + hints

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut next = 0;
    let mut take = || {
        let area = chunks[next];
        next += 1;
        area
    };

    draw_title(f, take());
    if show_filter {
        draw_filter_bar(f, app, take());
    }
    if show_label {
        draw_label_bar(f, app, take());
    }
    draw_table(f, app, take());
    draw_footer(f, app, take());

    if app.mode == Mode::Help {
        draw_help(f);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new("portview").style(Style::default().fg(ACCENT).bold());
    f.render_widget(title, area);
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.mode == Mode::Filter {
        format!("Filter: {}_", app.filter)
    } else {
        format!("Filter: {}", app.filter)
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(ACCENT)), area);
}

fn draw_label_bar(f: &mut Frame, app: &App, area: Rect) {
    let input = &app.label_input;
    let value = if input.value().is_empty() {
        Span::styled(input.placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input.value())
    };
    f.render_widget(Paragraph::new(Line::from(vec![Span::raw(LABEL_PROMPT), value])), area);

    let x = area.x.saturating_add(label_cursor_column(input));
    f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
}

/// Terminal column of the label cursor, counting wide characters as two cells.
fn label_cursor_column(input: &TextInput) -> u16 {
    let before: String = input.value().chars().take(input.cursor()).collect();
    let width = LABEL_PROMPT.width() + before.width();
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["PORT", "PID", "PROCESS", "LABEL", "COMMAND"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::DarkGray).bold()));
    let header = Row::new(header_cells).height(1);

    if app.visible.is_empty() {
        let lines = vec![
            Line::from(format!(
                "  {:<7} {:<7} {:<15} {:<15} {}",
                "PORT", "PID", "PROCESS", "LABEL", "COMMAND"
            ))
            .style(Style::default().fg(Color::DarkGray).bold()),
            Line::from(""),
            Line::from("  No servers found."),
        ];
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let rows = app.visible.iter().map(|server| {
        let style = if server.healthy {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let cells = vec![
            Cell::from(server.port.to_string()).style(style),
            Cell::from(server.pid.to_string()).style(style),
            Cell::from(truncate(&server.process, 15)).style(style),
            Cell::from(truncate(&server.label, 15)).style(Style::default().fg(Color::LightBlue)),
            Cell::from(truncate(&server.command, 40)).style(style),
        ];
        Row::new(cells)
    });

    let widths = [
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(15),
        Constraint::Length(15),
        Constraint::Min(0),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    state.select(Some(app.cursor));

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let style = Style::default().fg(Color::Gray);

    if app.mode == Mode::ConfirmKill {
        if let Some(server) = app.selected() {
            let prompt = format!("Kill PID {}? (y/n)", server.pid);
            f.render_widget(Paragraph::new(prompt).style(style), area);
            return;
        }
    }

    let lines = vec![Line::from(status_line(app)), Line::from(KEY_HINTS)];
    f.render_widget(Paragraph::new(lines).style(style), area);
}

/// "<n> servers | refreshed <t> ago | error: <e>"
fn status_line(app: &App) -> String {
    let mut parts = vec![format!("{} servers", app.visible.len())];

    if let Some(refreshed) = app.last_refresh {
        let elapsed = (Local::now() - refreshed).to_std().unwrap_or_default();
        let ago = humantime::format_duration(Duration::from_secs(elapsed.as_secs()));
        parts.push(format!("refreshed {ago} ago"));
    } else if app.is_scanning() {
        parts.push("scanning…".to_string());
    }

    if let Some(error) = &app.last_error {
        parts.push(format!("error: {error}"));
    }

    parts.join(" | ")
}

fn draw_help(f: &mut Frame) {
    let mut lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, action)| Line::from(format!("  {keys:<10} {action}")))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Press any key to close"));

    let height = lines.len() as u16 + 2;
    let area = centered(f.area(), 40, height);

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Help "),
    );

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
