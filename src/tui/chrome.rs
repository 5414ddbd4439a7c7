use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::Theme;

/// Split the full frame into header, body, and footer
pub fn frame_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header (boxed)
            Constraint::Min(0),    // Screen content
            Constraint::Length(1), // Key hints
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Brand name on the first line, current screen title under it
pub fn render_header(frame: &mut Frame, area: Rect, brand: &str, title: &str, theme: &Theme) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(brand.to_string(), theme.title_style()),
        Span::raw("  "),
        Span::styled(title.to_string(), theme.muted_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.surface1)),
    );
    frame.render_widget(header, area);
}

pub fn render_footer(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], theme: &Theme) {
    let mut spans = Vec::new();
    let mut push = |key: &str, description: &str| {
        spans.push(Span::styled(format!(" {} ", key), Style::default().fg(theme.mauve)));
        spans.push(Span::styled(format!("{}  ", description), theme.muted_style()));
    };
    for (key, description) in hints {
        push(key, description);
    }
    for (key, description) in GLOBAL_HINTS {
        push(key, description);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

const GLOBAL_HINTS: [(&str, &str); 3] = [("Esc", "Back"), ("F1", "Help"), ("Ctrl-q", "Quit")];

/// Diagnostic shown when the stack top names a screen the manifest lacks
pub fn render_not_found(frame: &mut Frame, area: Rect, screen_id: &str, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled("Screen not found", theme.title_style())),
        Line::from(""),
        Line::from(vec![
            Span::raw("No screen definition for: "),
            Span::styled(screen_id.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.text))
        .block(Block::default().borders(Borders::ALL).border_style(theme.error_style()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, centered_rect(area, 60, 7));
}

pub fn render_help(frame: &mut Frame, area: Rect, screen_hints: &[(&str, &str)], theme: &Theme) {
    let mut lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Style::default().fg(theme.lavender).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("▼ Global", Style::default().fg(theme.peach).add_modifier(Modifier::BOLD))),
    ];
    let row = |key: &str, description: &str, key_color| {
        Line::from(vec![
            Span::styled(format!("  {:13}", key), Style::default().fg(key_color)),
            Span::raw("  "),
            Span::styled(description.to_string(), Style::default().fg(theme.text)),
        ])
    };
    for (key, description) in GLOBAL_HINTS {
        lines.push(row(key, description, theme.mauve));
    }
    if !screen_hints.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("▼ Screen", Style::default().fg(theme.blue).add_modifier(Modifier::BOLD))));
        for (key, description) in screen_hints {
            lines.push(row(key, description, theme.green));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[F1 or Esc to close]", theme.muted_style())));

    let height = (lines.len() as u16).saturating_add(2);
    let modal = centered_rect(area, 60, height);
    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Help").borders(Borders::ALL)),
        modal,
    );
}

/// Rect of at most `width` x `height` centered inside `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = area.width.min(width);
    let height = area.height.min(height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Standard bordered panel for a screen body
pub fn screen_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), theme.title_style()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.surface1))
}

/// Inline error line used by every screen
pub fn error_line(message: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(format!("⚠ {}", message), theme.error_style()))
}
