pub mod dashboard;
pub mod matches;

use pitchside_core::{FeedBoard, LoadPhase};
use ratatui::text::{Line, Span};

use crate::ui::styles;

/// Lines to show instead of content while a board has nothing to render.
fn placeholder(board: &FeedBoard) -> Option<Vec<Line<'static>>> {
    if board.has_data() {
        return None;
    }
    let line = match &board.phase {
        LoadPhase::Failed(msg) => Line::from(vec![
            Span::styled("Failed to load: ", styles::error_style()),
            Span::raw(msg.clone()),
        ]),
        _ => Line::from(Span::styled("Loading…", styles::muted_style())),
    };
    Some(vec![line])
}
