use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use std::collections::{BTreeMap, HashSet};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use flick::vocab::WordPool;

use crate::{App, StatsSort};

pub struct GroupRow {
    pub group: String,
    pub learned: usize,
    pub total: usize,
    pub session_delta: usize,
}

/// Aggregate learned counts per word group. `baseline` holds the ids that
/// were already learned when the pass started, so the delta column shows
/// only what this session added.
pub fn group_rows(pool: &WordPool, baseline: &HashSet<String>) -> Vec<GroupRow> {
    let mut by_group: BTreeMap<String, (usize, usize, usize)> = BTreeMap::new();
    for word in pool.items() {
        let (learned, total, delta) = by_group.entry(word.group.clone()).or_default();
        *total += 1;
        if word.learned {
            *learned += 1;
            if !baseline.contains(&word.id) {
                *delta += 1;
            }
        }
    }

    by_group
        .into_iter()
        .map(|(group, (learned, total, session_delta))| GroupRow {
            group,
            learned,
            total,
            session_delta,
        })
        .collect()
}

/// Pure presenter for a single group row
pub fn present_row(row: &GroupRow) -> Row<'static> {
    let progress_color = if row.learned == row.total {
        Color::Green
    } else if row.learned * 2 >= row.total {
        Color::Yellow
    } else {
        Color::Red
    };

    let learned_display = if row.session_delta > 0 {
        format!("{} (+{})", row.learned, row.session_delta)
    } else {
        row.learned.to_string()
    };

    let percent = if row.total == 0 {
        0
    } else {
        row.learned * 100 / row.total
    };

    Row::new(vec![
        Cell::from(row.group.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(learned_display).style(Style::default().fg(progress_color)),
        Cell::from(row.total.to_string()),
        Cell::from(format!("{percent}%")).style(Style::default().fg(progress_color)),
    ])
}

/// Compact duration for history rows, e.g. "1m 23s"
pub fn format_duration(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

fn humanize_since(then: chrono::DateTime<chrono::Local>) -> String {
    let since = (chrono::Local::now() - then).to_std().unwrap_or_default();
    HumanTime::from(since).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Render the Deck Statistics screen
pub fn render_deck_stats(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Group table
            Constraint::Length(7), // Recent sessions
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    // Title with sort indicator
    let sort_direction = if app.stats_state.sort_ascending {
        "↑"
    } else {
        "↓"
    };
    let sort_by_text = match app.stats_state.sort_by {
        StatsSort::Group => "Group",
        StatsSort::Learned => "Learned",
        StatsSort::Total => "Total",
    };
    let title_text = format!(
        "{} Deck (Sort: {sort_by_text} {sort_direction})",
        app.deck_name
    );

    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let ascending = app.stats_state.sort_ascending;
    let sort_by = app.stats_state.sort_by.clone();
    let rows: Vec<GroupRow> = group_rows(app.engine.pool(), &app.baseline)
        .into_iter()
        .sorted_by(|a, b| {
            let cmp = match sort_by {
                StatsSort::Group => a.group.cmp(&b.group),
                StatsSort::Learned => a.learned.cmp(&b.learned),
                StatsSort::Total => a.total.cmp(&b.total),
            };
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        })
        .collect();

    // Calculate scrolling bounds
    let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
    let max_scroll = rows.len().saturating_sub(table_height);
    if app.stats_state.scroll_offset > max_scroll {
        app.stats_state.scroll_offset = max_scroll;
    }

    let group_indicator = if matches!(app.stats_state.sort_by, StatsSort::Group) {
        sort_direction
    } else {
        ""
    };
    let learned_indicator = if matches!(app.stats_state.sort_by, StatsSort::Learned) {
        sort_direction
    } else {
        ""
    };
    let total_indicator = if matches!(app.stats_state.sort_by, StatsSort::Total) {
        sort_direction
    } else {
        ""
    };

    let header = Row::new(vec![
        Cell::from(format!("Group {group_indicator}")),
        Cell::from(format!("Learned {learned_indicator}")),
        Cell::from(format!("Total {total_indicator}")),
        Cell::from("Done"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let visible_rows: Vec<Row> = rows
        .iter()
        .skip(app.stats_state.scroll_offset)
        .take(table_height)
        .map(present_row)
        .collect();

    let group_col = rows
        .iter()
        .map(|r| r.group.width())
        .max()
        .unwrap_or(8)
        .max(8) as u16;
    let widths = [
        Constraint::Length(group_col + 2),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Min(6),
    ];

    let table = Table::new(visible_rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Word Groups"))
        .column_spacing(2);
    f.render_widget(table, chunks[1]);

    // Recent sessions under the table
    let mut history_lines = Vec::new();
    if let Some(last) = app.last_studied {
        history_lines.push(Line::from(Span::styled(
            format!("last studied {}", humanize_since(last)),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    if app.recent_sessions.is_empty() {
        history_lines.push(Line::from(Span::styled(
            "no sessions recorded yet",
            Style::default().fg(Color::Gray),
        )));
    } else {
        for record in app.recent_sessions.iter().rev().take(crate::RECENT_SESSIONS) {
            let group = record
                .group
                .as_deref()
                .map(|g| format!(" / {g}"))
                .unwrap_or_default();
            history_lines.push(Line::from(Span::styled(
                format!(
                    "{}   {}{}   {}/{} learned   {} missed   {}",
                    humanize_since(record.finished_at),
                    record.mode,
                    group,
                    record.learned,
                    record.total,
                    record.misses,
                    format_duration(record.duration_secs)
                ),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }
    let history = Paragraph::new(history_lines);
    f.render_widget(history, chunks[2]);

    // Instructions
    let instructions = Paragraph::new(
        "(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (1-3) sort  (space) direction  (b/backspace) back  (n) new  (r) restart",
    )
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[3]);
}
