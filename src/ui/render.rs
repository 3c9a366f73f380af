use crate::ui::app::Model;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};

const TITLE: &str = " cfsd panel ";

/// Draw the whole panel: outer frame, then selector, viewer and status bar
/// stacked top to bottom at their allotted heights.
pub fn render(frame: &mut Frame, model: &mut Model) {
    let (width, height) = model.size();
    let area = Rect::new(0, 0, width, height).intersection(frame.area());

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let allotment = model.allotment();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(allotment.selector),
            Constraint::Length(allotment.viewer),
            Constraint::Length(allotment.status),
        ])
        .split(inner);

    model.selector.draw(frame, chunks[0]);
    model.viewer.draw(frame, chunks[1]);
    model.status.draw(frame, chunks[2]);
}
