pub mod deck_stats;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use webbrowser::Browser;

use flick::celebration::Confetti;
use flick::mode::{ModeAdapter, TypingFeedback};
use flick::session::SessionPhase;
use flick::vocab::VocabularyItem;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let dim_style = Style::default().add_modifier(Modifier::DIM);

        match (&self.state, self.engine.phase()) {
            (AppState::Study, SessionPhase::Loading) => {
                let message = match self.engine.reset_error() {
                    Some(err) => err.to_string(),
                    None => "preparing session".to_string(),
                };

                let lines = vec![
                    Line::from(Span::styled("could not reset progress", red_bold_style)),
                    Line::from(""),
                    Line::from(Span::styled(message, Style::default())),
                    Line::from(""),
                    Line::from(Span::styled("(r)etry / (esc)ape", italic_style)),
                ];

                let top_pad = area.height.saturating_sub(lines.len() as u16) / 2;
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([Constraint::Length(top_pad), Constraint::Min(1)])
                    .split(area);

                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[1], buf);
            }
            (AppState::Study, _) => {
                let word = match self.engine.current_word() {
                    Some(word) => word,
                    None => return,
                };

                let mut header = self.deck_name.clone();
                if let Some(group) = &self.settings.group {
                    header.push_str(&format!(" / {group}"));
                }
                header.push_str(&format!(
                    "   {}   {} of {} learned",
                    self.adapter.name(),
                    self.engine.learned_count(),
                    self.engine.total()
                ));
                if self.engine.misses() > 0 {
                    header.push_str(&format!("   {} missed", self.engine.misses()));
                }

                let card = match &self.adapter {
                    ModeAdapter::Flashcard(mode) => {
                        let mut lines = vec![Line::from(Span::styled(
                            word.headword.clone(),
                            bold_style,
                        ))];
                        if let Some(meta) = word_meta(word) {
                            lines.push(Line::from(Span::styled(
                                meta,
                                dim_style.patch(italic_style),
                            )));
                        }
                        if mode.revealed() {
                            lines.push(Line::from(""));
                            for definition in &word.definitions {
                                lines.push(Line::from(Span::styled(
                                    definition.clone(),
                                    green_bold_style,
                                )));
                            }
                        }
                        lines
                    }
                    ModeAdapter::Quiz(mode) => {
                        let mut lines = vec![
                            Line::from(Span::styled(word.headword.clone(), bold_style)),
                            Line::from(""),
                        ];
                        let current = self.engine.current_index();
                        for (i, &idx) in mode.options().iter().enumerate() {
                            let text = match self.engine.pool().get(idx) {
                                Some(option) => {
                                    format!("{}) {}", i + 1, option.definitions.join("; "))
                                }
                                None => continue,
                            };
                            let style = match (mode.selected(), current) {
                                (Some(sel), Some(cur)) => {
                                    if idx == cur {
                                        green_bold_style
                                    } else if i == sel {
                                        red_bold_style
                                    } else {
                                        dim_style
                                    }
                                }
                                _ => Style::default(),
                            };
                            lines.push(Line::from(Span::styled(text, style)));
                        }
                        lines
                    }
                    ModeAdapter::Typing(mode) => {
                        let mut lines = Vec::new();
                        for definition in &word.definitions {
                            lines.push(Line::from(Span::styled(definition.clone(), bold_style)));
                        }
                        lines.push(Line::from(""));

                        let input_line = match mode.feedback() {
                            TypingFeedback::Neutral => Line::from(vec![
                                Span::styled(mode.input().to_string(), bold_style),
                                Span::styled(" ", underlined_dim_bold_style),
                            ]),
                            TypingFeedback::Correct => Line::from(Span::styled(
                                mode.input().to_string(),
                                green_bold_style,
                            )),
                            TypingFeedback::Wrong => Line::from(Span::styled(
                                match mode.input() {
                                    "" => "·".to_string(),
                                    typed => typed.to_string(),
                                },
                                red_bold_style,
                            )),
                        };
                        lines.push(input_line);

                        if mode.feedback() == TypingFeedback::Wrong {
                            lines.push(Line::from(Span::styled(
                                word.headword.clone(),
                                green_bold_style,
                            )));
                        }
                        if mode.feedback() != TypingFeedback::Neutral {
                            if let Some(meta) = word_meta(word) {
                                lines.push(Line::from(Span::styled(
                                    meta,
                                    dim_style.patch(italic_style),
                                )));
                            }
                        }
                        lines
                    }
                };

                let mode_keys = match &self.adapter {
                    ModeAdapter::Flashcard(_) => "(space) flip / (g)ot it / (a)gain",
                    ModeAdapter::Quiz(_) => "(1-4) answer",
                    ModeAdapter::Typing(_) => "(enter) check / (tab) skip",
                };
                let can_lookup =
                    !matches!(self.adapter, ModeAdapter::Typing(_)) && Browser::is_available();
                let nav_keys = if can_lookup {
                    "(l)ookup / (F1-F3) mode / (esc)ape"
                } else {
                    "(F1-F3) mode / (esc)ape"
                };

                let inner_height = area.height.saturating_sub(VERTICAL_MARGIN * 2 + 3);
                let top_pad = inner_height.saturating_sub(card.len() as u16) / 2;

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Length(top_pad),
                        Constraint::Length(card.len() as u16),
                        Constraint::Min(0),
                        Constraint::Length(2),
                    ])
                    .split(area);

                Paragraph::new(Span::styled(header, dim_style))
                    .alignment(Alignment::Center)
                    .render(chunks[0], buf);

                Paragraph::new(card)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);

                let legend = vec![
                    Line::from(Span::styled(mode_keys, italic_style)),
                    Line::from(Span::styled(nav_keys, italic_style)),
                ];
                Paragraph::new(legend)
                    .alignment(Alignment::Center)
                    .render(chunks[4], buf);
            }
            (_, _) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(1),    // headline
                        Constraint::Length(1), // counts
                        Constraint::Length(1), // timing
                        Constraint::Length(3), // settings info box
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let total = self.engine.total();
                let session_learned = self.engine.session_learned();
                let misses = self.engine.misses();
                let studied = session_learned > 0 || misses > 0;

                let mut headline = Vec::new();
                for _ in 0..chunks[0].height / 3 {
                    headline.push(Line::from(""));
                }
                if total == 0 {
                    headline.push(Line::from(Span::styled(
                        "this deck has no words to study",
                        bold_style,
                    )));
                } else if !studied {
                    headline.push(Line::from(Span::styled(
                        format!("all {total} words already learned"),
                        green_bold_style,
                    )));
                } else if misses == 0 {
                    headline.push(Line::from(Span::styled(
                        "flawless pass!",
                        Style::default().patch(bold_style).fg(Color::Magenta),
                    )));
                }

                Paragraph::new(headline)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[0], buf);

                if total > 0 {
                    let counts = Paragraph::new(Span::styled(
                        format!(
                            "{} learned   {} missed   {} remaining",
                            session_learned,
                            misses,
                            self.engine.remaining()
                        ),
                        bold_style,
                    ))
                    .alignment(Alignment::Center);
                    counts.render(chunks[1], buf);
                }

                let mut timing = Vec::new();
                if studied {
                    timing.push(format!(
                        "took {}",
                        deck_stats::format_duration(self.started_at.elapsed().as_secs())
                    ));
                }
                if let Some(last) = self.last_studied {
                    let since = (chrono::Local::now() - last).to_std().unwrap_or_default();
                    timing.push(format!(
                        "last studied {}",
                        HumanTime::from(since).to_text_en(Accuracy::Rough, Tense::Past)
                    ));
                }
                if !timing.is_empty() {
                    let timing_widget = Paragraph::new(Span::styled(
                        timing.join("   "),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center);
                    timing_widget.render(chunks[2], buf);
                }

                if total > 0 {
                    let settings_text = format!(
                        "Deck: {} | Group: {} | Mode: {} | Auto-reset: {}\n(a) toggle auto-reset",
                        self.deck_name,
                        self.settings.group.as_deref().unwrap_or("all"),
                        self.settings.mode.to_string().to_lowercase(),
                        if self.settings.auto_reset { "ON" } else { "OFF" }
                    );

                    let settings_widget = Paragraph::new(settings_text)
                        .style(
                            Style::default()
                                .fg(Color::Gray)
                                .add_modifier(Modifier::ITALIC),
                        )
                        .alignment(Alignment::Center)
                        .wrap(Wrap { trim: true });
                    settings_widget.render(chunks[3], buf);
                }

                let legend = Paragraph::new(Span::styled(
                    String::from(if total == 0 {
                        "(esc)ape"
                    } else {
                        "(r)estart / (n)ew pass / (s)tats / (esc)ape"
                    }),
                    italic_style,
                ));
                legend.render(chunks[5], buf);

                if self.celebration.is_active {
                    render_confetti(&self.celebration, area, buf);
                }
            }
        }
    }
}

fn word_meta(word: &VocabularyItem) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(pronunciation) = &word.pronunciation {
        parts.push(pronunciation.clone());
    }
    if !word.word_types.is_empty() {
        parts.push(word.word_types.join(", "));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("   "))
    }
}

/// Draw confetti pieces over whatever is already in the buffer
fn render_confetti(confetti: &Confetti, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for piece in &confetti.pieces {
        // Pieces above the top edge have not rained in yet
        if piece.x < 0.0 || piece.y < 0.0 {
            continue;
        }
        let x = piece.x as u16;
        let y = piece.y as u16;

        if x < area.width && y < area.height {
            let color = colors[piece.color_index % colors.len()];
            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&piece.symbol.to_string());
                cell.set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
            }
        }
    }
}
