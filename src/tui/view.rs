//! Live outline of the shell for interactive sessions
//!
//! Draws the element tree one element per line with the focus owner
//! highlighted, plus a status bar naming the focused element and the open
//! dialog.

use crate::tui::app::App;
use crate::tui::dom::{Document, NodeId};
use crate::tui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// One line of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub label: String,
    pub focused: bool,
    pub focusable: bool,
}

/// Flatten the attached tree under `body` in document order
pub fn outline(doc: &Document) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    let active = doc.active_element();
    walk(doc, doc.body(), 0, active, &mut rows);
    rows
}

fn walk(doc: &Document, node: NodeId, depth: usize, active: NodeId, rows: &mut Vec<OutlineRow>) {
    let Some(element) = doc.get(node) else {
        return;
    };

    let mut label = format!("<{}>", element.tag().as_str());
    if let Some(id) = element.id() {
        label.push_str(&format!(" #{}", id));
    }
    if let Some(text) = element.text() {
        label.push_str(&format!(" \"{}\"", text));
    }

    rows.push(OutlineRow {
        depth,
        label,
        focused: node == active,
        focusable: doc.is_focusable(node),
    });
    for &child in doc.children(node) {
        walk(doc, child, depth + 1, active, rows);
    }
}

/// Render the application UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Outline
            Constraint::Length(1), // Status bar
        ])
        .split(frame.size());

    render_outline(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_outline(frame: &mut Frame, app: &App, area: Rect) {
    let rows = outline(app.document());

    // Keep the focused row on screen
    let visible = area.height.saturating_sub(2) as usize;
    let focused_at = rows.iter().position(|row| row.focused).unwrap_or(0);
    let skip = focused_at.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = rows
        .iter()
        .skip(skip)
        .map(|row| {
            let style = if row.focused {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if row.focusable {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(row.label.clone(), style),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title("chatshell");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dialog = app
        .open_dialog_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    let status = format!("Focus: {} | Dialog: {} | Ctrl+C to quit", app.focus_label(), dialog);

    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Black).bg(Color::Gray)),
        area,
    );
}
