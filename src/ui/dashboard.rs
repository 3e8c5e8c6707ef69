use flick::config::TargetCap;
use flick::mode::Mode;
use flick::scoring::{format_accuracy, format_clock};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

/// Mode picker, current settings and the last match.
pub fn render_dashboard(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(Mode::ALL.len() as u16 + 2),
            Constraint::Length(8),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("flick", bold.fg(Color::Red)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
        .render(chunks[0], buf);

    let title_width = Mode::ALL
        .iter()
        .map(|m| m.title().width())
        .max()
        .unwrap_or_default();
    let modes: Vec<Line> = Mode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let selected = i == app.selected;
            let marker = if selected { "▶" } else { " " };
            let pad = " ".repeat(title_width - mode.title().width());
            let style = if selected {
                bold.fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker} {} ", i + 1), dim),
                Span::styled(format!("{}{pad}", mode.title()), style),
                Span::styled(format!("  {}", mode.blurb()), dim),
            ])
        })
        .collect();
    Paragraph::new(modes)
        .block(Block::default().borders(Borders::ALL).title(" modes "))
        .render(chunks[1], buf);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let config = app.session.config();
    let cap = match config.target_cap {
        TargetCap::Single => "single",
        TargetCap::Multiple => "multiple",
    };
    let settings = vec![
        setting("a", "area", format!("{}%", config.area_percent)),
        setting("z", "size", config.target_size.to_string()),
        setting("s", "speed", format!("{} ({}ms)", config.spawn_speed, config.spawn_speed.interval_ms())),
        setting("g", "grid", format!("{0}×{0}", config.grid_size)),
        setting("m", "letters", cap.to_string()),
        setting("t", "trail", if config.cursor_trail { "on" } else { "off" }.to_string()),
    ];
    Paragraph::new(settings)
        .block(Block::default().borders(Borders::ALL).title(" settings "))
        .render(body[0], buf);

    let last = match app.session.last_summary() {
        Some(summary) => {
            let mut lines = vec![
                Line::from(Span::styled(summary.mode.title(), bold)),
                Line::from(format!(
                    "score {}  time {}",
                    summary.tally.score,
                    format_clock(summary.elapsed_secs)
                )),
                Line::from(format!(
                    "hits {}  misses {}  acc {}%",
                    summary.tally.hits,
                    summary.tally.misses,
                    format_accuracy(summary.accuracy())
                )),
            ];
            if let Some(avg) = summary.reaction_average_ms {
                lines.push(Line::from(format!("avg reaction {avg:.0}ms")));
            }
            lines
        }
        None => vec![Line::from(Span::styled("no matches yet", dim))],
    };
    Paragraph::new(last)
        .block(Block::default().borders(Borders::ALL).title(" last match "))
        .render(body[1], buf);

    Paragraph::new(Span::styled(
        "(1-7 / ↑↓ enter) play   (q) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn setting(key: &'static str, name: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("({key}) "), Style::default().add_modifier(Modifier::DIM)),
        Span::raw(format!("{name:<8}")),
        Span::styled(value, Style::default().fg(Color::Cyan)),
    ])
}
