use pitchside_core::models::{Match, MatchStatus, MatchesResponse, Winner};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, MATCH_TAB_LABELS};
use crate::ui::styles;

use super::placeholder;

/// Width of the team name columns
const TEAM_WIDTH: usize = 18;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.current_view();
    let board = view.board();
    let label = MATCH_TAB_LABELS.get(view.selected()).copied().unwrap_or("Matches");

    let lines = match placeholder(&board) {
        Some(lines) => lines,
        None => {
            let matches = view
                .selected_feed()
                .and_then(|feed| board.snapshot(feed))
                .map(|s| s.as_matches())
                .unwrap_or_default();
            match_lines(&matches)
        }
    };

    let block = Block::default()
        .title(format!(" {} ", label))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style());

    let scroll = u16::try_from(app.scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

/// One header line per matchday followed by its fixtures.
pub fn match_lines(response: &MatchesResponse) -> Vec<Line<'static>> {
    let groups = response.by_matchday();
    if groups.is_empty() {
        return vec![Line::from(Span::styled("No matches", styles::muted_style()))];
    }

    let mut lines = Vec::new();
    for (matchday, matches) in groups {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        let header = if matchday == 0 {
            "Unscheduled".to_string()
        } else {
            format!("Matchday {}", matchday)
        };
        lines.push(Line::from(Span::styled(header, styles::highlight_style())));
        lines.extend(matches.into_iter().map(match_line));
    }
    lines
}

fn match_line(m: &Match) -> Line<'static> {
    let (home_style, away_style) = match m.score.winner {
        Some(Winner::HomeTeam) => (styles::title_style(), styles::list_item_style()),
        Some(Winner::AwayTeam) => (styles::list_item_style(), styles::title_style()),
        _ => (styles::list_item_style(), styles::list_item_style()),
    };

    let score = m
        .score
        .full_time
        .display()
        .unwrap_or_else(|| "vs".to_string());

    let mut spans = vec![
        Span::styled(format!("  {:<17}", m.kickoff_display()), styles::muted_style()),
        Span::styled(
            format!("{:>width$}", m.home_team.display_name(), width = TEAM_WIDTH),
            home_style,
        ),
        Span::styled(format!("  {:^7}  ", score), score_style(m.status)),
        Span::styled(
            format!("{:<width$}", m.away_team.display_name(), width = TEAM_WIDTH),
            away_style,
        ),
    ];

    if m.status.is_live() {
        spans.push(Span::styled("  LIVE", styles::live_style()));
    } else if let Some(ht) = m.score.half_time.display() {
        spans.push(Span::styled(format!("  (HT {})", ht), styles::muted_style()));
    }

    Line::from(spans)
}

fn score_style(status: MatchStatus) -> Style {
    if status.is_live() {
        styles::live_style()
    } else {
        styles::highlight_style()
    }
}
