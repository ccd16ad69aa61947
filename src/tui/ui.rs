use ratatui::{prelude::*, widgets::*};

use crate::core::{
    state::PanelState,
    view::{self, ViewLine},
};

const SPINNER_FRAMES: [&str; 3] = ["●○○", "○●○", "○○●"];

pub fn render_ui(f: &mut Frame, state: &PanelState, spinner_frame: usize) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(0),
            Constraint::Length(1), // bottom help
        ])
        .split(f.area());

    render_title(f, main_chunks[0], state, spinner_frame);
    render_body(f, main_chunks[1], state);

    let help = Paragraph::new("q / Esc  quit")
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Gray).fg(Color::White));
    f.render_widget(help, main_chunks[2]);
}

fn render_title(f: &mut Frame, area: Rect, state: &PanelState, spinner_frame: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(area);

    f.render_widget(
        Block::default()
            .borders(Borders::NONE)
            .style(Style::default().bg(Color::Gray)),
        area,
    );

    if state.loading {
        let frame = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
        let spin = Paragraph::new(frame).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(spin, chunks[0]);
    }

    let title = Paragraph::new(view::HEADING)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Rgb(0, 150, 0))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title, chunks[1]);
}

fn styled_line(line: ViewLine) -> Line<'static> {
    match line {
        ViewLine::Heading => Line::default(),
        ViewLine::Loading => Line::styled(view::LOADING_TEXT, Style::default().fg(Color::DarkGray)),
        ViewLine::Error(message) => Line::styled(
            format!("Error: {message}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        ViewLine::Place {
            index,
            name,
            formatted,
        } => Line::from(vec![
            Span::raw(format!("{index:>2}. ")),
            Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" — "),
            Span::styled(formatted, Style::default().fg(Color::Gray)),
        ]),
        ViewLine::Empty => Line::styled(view::EMPTY_TEXT, Style::default().fg(Color::DarkGray)),
    }
}

fn render_body(f: &mut Frame, area: Rect, state: &PanelState) {
    // The heading already sits in the title bar.
    let lines: Vec<Line> = view::render(state)
        .into_iter()
        .filter(|line| *line != ViewLine::Heading)
        .map(styled_line)
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .padding(Padding::left(1));
    let body = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(body, area);
}
