use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Tab, MATCH_TAB_LABELS};

use super::styles;
use super::tabs::{dashboard, matches};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Pitchside  {}", app.config.competition);
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.chars().count() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let screens = [
        ("[1] Dashboard", app.current_tab == Tab::Dashboard),
        ("[2] Matches", app.current_tab == Tab::Matches),
    ];

    let mut spans = vec![Span::raw(" ")];
    push_tab_spans(&mut spans, &screens);

    if app.current_tab == Tab::Matches {
        let selected = app.current_view().selected();
        let sub_tabs: Vec<(&str, bool)> = MATCH_TAB_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| (*label, i == selected))
            .collect();

        // Push sub-tabs to the right edge
        let main_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let sub_width: usize = sub_tabs.iter().map(|(l, _)| l.len()).sum::<usize>()
            + (sub_tabs.len() - 1) * 3;
        let padding = (area.width as usize).saturating_sub(main_width + sub_width + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        push_tab_spans(&mut spans, &sub_tabs);
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn push_tab_spans<'a>(spans: &mut Vec<Span<'a>>, tabs: &[(&'a str, bool)]) {
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Matches => matches::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let board = app.current_view().board();
    let left_style = if board.last_error.is_some() {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let left_text = format!(" {} ", app.status_text());
    let right_text = if app.auto_refreshing() {
        " auto | [u]pdate | [q]uit "
    } else {
        " [u]pdate | [q]uit "
    };
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(44, 17, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            format!("  Pitchside {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("1 / 2", "Dashboard / Matches"),
        key("Tab ←/→", "Upcoming, Live, Finished"),
        key("j/k ↑/↓", "Scroll"),
        key("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Data", styles::highlight_style())),
        key("u", "Refresh now"),
        Line::from(Span::styled(
            "  Matches auto-refresh while live",
            styles::muted_style(),
        )),
        Line::from(""),
        key("?", "Toggle help"),
        key("q", "Quit"),
    ];

    let block = Block::default()
        .title(" Help ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
