use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::flow::{ActionFlow, FlowPhase};
use crate::terminal::state::{AppState, Screen};

const STDERR_NOTE: &str = "Logs go to stderr; start with 2>mail_assistant.log to keep them off screen.";

pub fn render(f: &mut Frame, state: &AppState) {
    let [main, footer] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)])
        .margin(1)
        .areas(f.area());

    match (state.screen, &state.flow) {
        (Screen::Flow, Some(flow)) => {
            render_flow(f, main, state, flow);
            render_hints(
                f,
                footer,
                &[
                    ("j/k", "move"),
                    ("Space", "select"),
                    ("a/n", "all/none"),
                    ("Enter", flow.kind().submit_label()),
                    ("r", "retry"),
                    ("Esc", "cancel"),
                ],
            );
        }
        (Screen::Login, _) => {
            render_login(f, main, state);
            render_hints(f, footer, &[("Enter", "sign in"), ("q", "quit")]);
        }
        _ => {
            render_home(f, main, state);
            render_hints(
                f,
                footer,
                &[
                    ("d", "duplicates"),
                    ("u", "unsubscribe"),
                    ("s", "sign out"),
                    ("q", "quit"),
                ],
            );
        }
    }
}

fn render_login(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" Mail Assistant ");

    let text = Text::from(vec![
        Line::from(Span::styled(
            "Sign in to continue",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("Press Enter to sign in with Google."),
        Line::raw(""),
        Line::from(Span::styled(
            STDERR_NOTE,
            Style::default().fg(Color::DarkGray),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            state.notice.clone(),
            Style::default().fg(Color::Gray),
        )),
    ]);

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_home(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" Mail Assistant ");

    let text = Text::from(vec![
        Line::raw("You are signed in as:"),
        Line::from(Span::styled(
            state.identity.email.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("d  Check for Duplicates"),
        Line::raw("u  Mass Unsubscribe"),
        Line::raw("s  Sign Out"),
        Line::raw(""),
        Line::from(Span::styled(
            state.notice.clone(),
            Style::default().fg(Color::Gray),
        )),
    ]);

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_flow(f: &mut Frame, area: Rect, state: &AppState, flow: &ActionFlow) {
    let [list_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let list = flow.list();
    let border = match flow.phase() {
        FlowPhase::Error(_) => Color::Red,
        FlowPhase::Loading | FlowPhase::Submitting => Color::DarkGray,
        _ => Color::Yellow,
    };
    let block = Block::default()
        .title(format!(
            " {} ({}/{} selected) ",
            flow.kind().title(),
            list.selected_count(),
            list.len()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let items: Vec<ListItem> = list
        .records()
        .iter()
        .map(|r| {
            let mark = if list.is_selected(r) { "[x] " } else { "[ ] " };
            let mut lines = vec![Line::from(vec![
                Span::raw(mark),
                Span::styled(r.from.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ])];
            if let Some(subject) = &r.subject {
                lines.push(Line::raw(format!("    {subject}")));
            }
            lines.push(Line::from(Span::styled(
                format!("    {}", r.detail),
                Style::default().fg(Color::Gray),
            )));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    f.render_stateful_widget(widget, list_area, &mut state.list_state.clone());

    let status = Paragraph::new(flow.status().to_string())
        .block(Block::default().borders(Borders::ALL).title(" Status "))
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    f.render_widget(status, status_area);
}

fn render_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (k, label) in hints {
        spans.push(Span::styled(
            k.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {label}  ")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
