use pitchside_core::models::{StandingsResponse, Team, TeamsResponse};
use pitchside_core::utils::truncate_string;
use pitchside_core::Feed;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::placeholder;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let board = app.current_view().board();

    if let Some(lines) = placeholder(&board) {
        let block = Block::default()
            .title(" Dashboard ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style());
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let standings = board
        .snapshot(&Feed::Standings)
        .map(|s| s.as_standings())
        .unwrap_or_default();
    let teams = board
        .snapshot(&Feed::Teams)
        .map(|s| s.as_teams())
        .unwrap_or_default();

    render_standings(frame, &standings, app.scroll, chunks[0]);
    render_teams(frame, &teams, app.scroll, chunks[1]);
}

fn render_standings(frame: &mut Frame, standings: &StandingsResponse, scroll: usize, area: Rect) {
    let header = Row::new(["#", "Team", "P", "W", "D", "L", "GD", "Pts"].map(Cell::from))
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = standings
        .total_table()
        .iter()
        .skip(scroll)
        .map(|row| {
            Row::new(vec![
                Cell::from(row.position.to_string()),
                Cell::from(row.team.display_name()),
                Cell::from(row.played_games.to_string()),
                Cell::from(row.won.to_string()),
                Cell::from(row.draw.to_string()),
                Cell::from(row.lost.to_string()),
                Cell::from(format!("{:+}", row.goal_difference)),
                Cell::from(Span::styled(row.points.to_string(), styles::highlight_style())),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Standings ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style()),
    );
    frame.render_widget(table, area);
}

fn render_teams(frame: &mut Frame, teams: &TeamsResponse, scroll: usize, area: Rect) {
    let width = (area.width as usize).saturating_sub(2);
    let mut lines: Vec<Line> = teams
        .teams
        .iter()
        .skip(scroll)
        .map(|team| team_line(team, width))
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No teams", styles::muted_style())));
    }

    let block = Block::default()
        .title(format!(" Teams ({}) ", teams.teams.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// TLA, name and home ground, fitted to `width` columns.
fn team_line(team: &Team, width: usize) -> Line<'static> {
    let text_width = width.saturating_sub(5);
    let mut spans = vec![Span::styled(
        format!("{:<5}", team.tla.as_deref().unwrap_or("---")),
        styles::highlight_style(),
    )];

    match team.venue.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(venue) => {
            let name_width = text_width / 2;
            spans.push(Span::raw(format!(
                "{:<width$}",
                truncate_string(&team.name, name_width),
                width = name_width
            )));
            spans.push(Span::styled(
                format!(" {}", truncate_string(venue, text_width.saturating_sub(name_width + 1))),
                styles::muted_style(),
            ));
        }
        None => spans.push(Span::raw(truncate_string(&team.name, text_width))),
    }
    Line::from(spans)
}
