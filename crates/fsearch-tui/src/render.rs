//! Ratatui rendering of the modal: query bar, result tree, optional
//! preview pane and the instructions footer.

use crate::app::App;
use fsearch_host::{FileViewMode, NoteFile, View, WorkspaceOps};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

const INSTRUCTIONS: &str =
    "ctrl+n/p navigate | tab preview | shift+tab close preview | alt+enter open | esc close";

pub fn draw(frame: &mut Frame, app: &App) {
    let Some(session) = app.overlay.modal.session() else {
        draw_idle(frame);
        return;
    };

    let footer = u16::from(app.overlay.settings.show_instructions) * 3;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(footer),
        ])
        .split(frame.area());

    let Some(leaf) = app.ws.leaf(session.search_leaf) else {
        return;
    };
    let View::Search(view) = &leaf.view else {
        return;
    };

    let query = Paragraph::new(view.state().query.as_str())
        .block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(query, rows[0]);

    let body = rows[1];
    if let Some(file_leaf) = session.file_leaf {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(body);
        draw_results(frame, app, view, panes[0]);
        draw_preview(frame, app, file_leaf, panes[1]);
    } else {
        draw_results(frame, app, view, body);
    }

    if footer > 0 {
        let hints = Paragraph::new(INSTRUCTIONS)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(hints, rows[2]);
    }
}

fn draw_idle(frame: &mut Frame) {
    let hint = Paragraph::new("press / to search, q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("fsearch"));
    frame.render_widget(hint, frame.area());
}

fn draw_results(
    frame: &mut Frame,
    app: &App,
    view: &fsearch_host::SearchViewModel,
    area: Rect,
) {
    let focused = view.focused_index();
    let items: Vec<ListItem> = view
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let label = app
                .ws
                .vault()
                .file(item.file)
                .map_or_else(String::new, |f| {
                    result_label(f, app.overlay.settings.show_file_path)
                });
            let mut lines = vec![Line::from(Span::styled(
                label,
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if !item.collapsed {
                lines.push(Line::from(Span::styled(
                    format!("  {}", item.excerpt),
                    Style::default().fg(Color::Gray),
                )));
            }
            let mut entry = ListItem::new(lines);
            if focused == Some(index) {
                entry = entry.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            entry
        })
        .collect();

    let title = format!("Results ({})", view.items.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// Label for a result row: the vault-relative path when the user asked for
/// it, otherwise just the note name.
fn result_label(file: &NoteFile, show_file_path: bool) -> String {
    if show_file_path {
        file.path.clone()
    } else {
        file.name.clone()
    }
}

fn draw_preview(frame: &mut Frame, app: &App, file_leaf: fsearch_host::LeafId, area: Rect) {
    let Some(view) = app.ws.file_view(file_leaf) else {
        return;
    };
    let Some(note) = app.ws.vault().file(view.file) else {
        return;
    };

    let match_line = view
        .ephemeral
        .as_ref()
        .map(|estate| estate.match_text.as_str());
    let lines: Vec<Line> = note
        .content
        .lines()
        .map(|line| {
            if match_line == Some(line) {
                Line::from(Span::styled(
                    line,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(line)
            }
        })
        .collect();

    let mode = match view.mode {
        FileViewMode::Preview => "preview",
        FileViewMode::Source => "source",
    };
    let title = format!("{} [{mode}]", note.name);
    let preview = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(preview, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_label_honors_show_file_path() {
        let mut vault = fsearch_host::Vault::new();
        let id = vault.add_markdown("Alpha", "content");
        let file = vault.file(id).unwrap();

        assert_eq!(result_label(file, true), "Alpha.md");
        assert_eq!(result_label(file, false), "Alpha");
    }
}
