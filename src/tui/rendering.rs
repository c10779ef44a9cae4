use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Scrollbar,
        ScrollbarOrientation, Wrap,
    },
    Frame,
};

use crate::classifier::MediaType;
use super::app::App;
use super::models::ProcessingStatus;
use super::utils::{centered_rect, truncate_left};

const TITLE: &str = "Jellyfin STRM Organizer";

pub fn ui(f: &mut Frame, app: &App) {
    render_main_screen(f, f.area(), app);

    if app.show_help {
        render_help_popup(f);
    }
}

pub fn render_main_screen(f: &mut Frame, area: Rect, app: &App) {
    let constraints = if app.show_preview {
        vec![Constraint::Percentage(60), Constraint::Percentage(40)]
    } else {
        vec![Constraint::Percentage(100)]
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    render_header(f, left_chunks[0], app);
    render_item_list(f, left_chunks[1], app);
    render_status_bar(f, left_chunks[2], app);

    if app.show_preview && chunks.len() > 1 {
        render_preview_panel(f, chunks[1], app);
    }
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.finished {
        format!("{TITLE} - Completed!")
    } else if app.is_processing() {
        format!("{TITLE} - Writing...")
    } else {
        format!("{TITLE} - {}", app.organizer.config().base_path.display())
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::White))
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn status_tag(status: &ProcessingStatus) -> (&'static str, Color) {
    match status {
        ProcessingStatus::Pending => ("[PENDING]", Color::Yellow),
        ProcessingStatus::Processing => ("[WRITING]", Color::Blue),
        ProcessingStatus::Written => ("[WRITTEN]", Color::Green),
        ProcessingStatus::Skipped => ("[SKIPPED]", Color::Gray),
        ProcessingStatus::Error => ("[ERROR]", Color::Red),
    }
}

fn type_tag(media_type: Option<MediaType>) -> &'static str {
    match media_type {
        Some(MediaType::Movie) => "MOVIE",
        Some(MediaType::TvSeries) => "TV",
        None => "-",
    }
}

pub fn render_item_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (tag, color) = status_tag(&row.status);
            let name_style = if app.current_processing == Some(i) {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{tag} "), Style::default().fg(color)),
                Span::styled(
                    format!("{:<5} ", type_tag(row.media_type)),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(row.item.name.clone(), name_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Items ({})", app.rows.len()))
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::White))
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.list_state.clone());

    if app.rows.len() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let label = if let Some(message) = &app.status_message {
        message.clone()
    } else if app.finished {
        format!(
            "Complete! {} written, {} skipped, {} failed",
            app.stats.written, app.stats.skipped, app.stats.failed
        )
    } else if app.is_processing() {
        format!("Writing... {}/{}", app.stats.processed + 1, app.stats.total)
    } else {
        format!("Ready to write {} items", app.stats.total)
    };

    let style = if app.status_message.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Green)
    };

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(style)
        .percent((app.processing_progress.clamp(0.0, 1.0) * 100.0) as u16)
        .label(label);
    f.render_widget(progress, chunks[0]);

    let controls_text = if app.finished {
        "h for help, q to quit"
    } else {
        "ENTER to write, h for help, q to quit"
    };
    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

pub fn render_preview_panel(f: &mut Frame, area: Rect, app: &App) {
    let Some(row) = app.list_state.selected().and_then(|i| app.rows.get(i)) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let mut source_lines = vec![
        Line::from("Name:"),
        Line::from(Span::styled(row.item.name.clone(), Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from("URL:"),
        Line::from(Span::styled(row.item.url.clone(), Style::default().fg(Color::Gray))),
    ];
    if row.item.parent_id > 0 {
        source_lines.push(Line::from(""));
        source_lines.push(Line::from(format!("Parent: {}", row.item.parent_id)));
    }

    let source = Paragraph::new(Text::from(source_lines))
        .block(
            Block::default()
                .title("Webhook Item")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(source, chunks[0]);

    let path_style = match row.status {
        ProcessingStatus::Written => Style::default().fg(Color::Green),
        ProcessingStatus::Error => Style::default().fg(Color::Red),
        ProcessingStatus::Skipped => Style::default().fg(Color::Gray),
        _ => Style::default().fg(Color::Cyan),
    };
    let width = chunks[1].width.saturating_sub(2) as usize;

    let mut plan_lines = vec![
        Line::from(format!("Type: {}", type_tag(row.media_type))),
        Line::from(format!("Normalized: {}", row.display_name)),
        Line::from(""),
        Line::from("Target:"),
        Line::from(Span::styled(
            row.planned_path
                .as_deref()
                .map(|p| truncate_left(p, width.max(8) * 3))
                .unwrap_or_else(|| "-".to_string()),
            path_style,
        )),
    ];
    if let Some(error) = &row.error_message {
        plan_lines.push(Line::from(""));
        plan_lines.push(Line::from(Span::styled(
            format!("Note: {error}"),
            Style::default().fg(Color::Red),
        )));
    }

    let plan = Paragraph::new(Text::from(plan_lines))
        .block(
            Block::default()
                .title("Planned STRM")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(plan, chunks[1]);
}

pub fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from(Span::styled(
            format!("{TITLE} - Help"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Up/k    - Move up"),
        Line::from("  Down/j  - Move down"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  Enter   - Write STRM files"),
        Line::from("  p       - Toggle preview panel"),
        Line::from("  h       - Toggle this help"),
        Line::from("  q/Esc   - Quit"),
        Line::from(""),
        Line::from("Planned paths are recomputed after every write,"),
        Line::from("so split folders appear as directories fill up."),
        Line::from(""),
        Line::from(Span::styled("Press Esc or h to close", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
