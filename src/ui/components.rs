use crate::storage::format_bytes;
use crate::ui::app::{App, AppState, Focus};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};

/// Categories above this size are highlighted.
const LARGE_CATEGORY: u64 = 1_000_000_000;

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let storage = app.storage;
    let label = if storage.total > 0 {
        format!(
            "{} of {} used, {} free | Trash: {}",
            format_bytes(storage.used),
            format_bytes(storage.total),
            format_bytes(storage.free),
            format_bytes(app.trash_size)
        )
    } else {
        format!("Disk: N/A | Trash: {}", format_bytes(app.trash_size))
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(concat!("xcsweep v", env!("CARGO_PKG_VERSION"))),
        )
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(storage.usage_ratio().clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

pub fn render_scanning(f: &mut Frame, area: Rect) {
    let text = Paragraph::new("Scanning Xcode and simulator caches...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Scanning"));
    f.render_widget(text, area);
}

pub fn render_categories_list(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|r| {
            let selected = r.items.iter().filter(|i| i.is_selected).count();
            let marker = if selected > 0 { "*" } else { " " };
            let content = format!(
                "{marker}{} {:<20} {:>10}",
                r.category.icon(),
                r.category.name(),
                format_bytes(r.total_size)
            );
            let style = if r.total_size > LARGE_CATEGORY {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();

    let title = if app.analyzer.is_scanning() {
        "Categories (refreshing...)"
    } else {
        "Categories"
    };
    let list = List::new(items)
        .block(focus_block(title, app.focus == Focus::Categories))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Yellow),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

pub fn render_details(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(result) = app.current_result() else {
        f.render_widget(
            Block::default().borders(Borders::ALL).title("Details"),
            area,
        );
        return;
    };

    let mut header = format!("Path: {}", result.root_path.display());
    if let Some(info) = result.category.info_text() {
        header.push('\n');
        header.push_str(info);
    }
    let header_height = if result.category.info_text().is_some() {
        5
    } else {
        3
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0)])
        .split(area);

    let details = Paragraph::new(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Details: {}", result.category.name())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(details, chunks[0]);

    let rows: Vec<ListItem> = result
        .items
        .iter()
        .map(|item| {
            let checkbox = if item.is_selected { "[x]" } else { "[ ]" };
            ListItem::new(format!(
                "{checkbox} {:<40} {:>10}",
                item.name,
                format_bytes(item.size)
            ))
        })
        .collect();
    let title = match result.items.len() {
        1 => "1 Item".to_string(),
        n => format!("{n} Items"),
    };

    let list = List::new(rows)
        .block(focus_block(&title, app.focus == Focus::Items))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut app.item_state);
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer_text = match app.state {
        AppState::Scanning => "Scanning... [q] Quit".to_string(),
        AppState::Browsing => format!(
            "Selected: {} | [Tab] Items [Space] Toggle [Enter] Clean [r] Rescan [q] Quit",
            format_bytes(app.total_selected_size())
        ),
        AppState::Confirming(_) => "[y/Enter] Confirm [n/Esc] Cancel".to_string(),
        AppState::Cleaning => app.progress_label(),
        AppState::Done(_) => "Done! [Press key to continue]".to_string(),
    };

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

pub fn render_popup(f: &mut Frame, app: &App) {
    match &app.state {
        AppState::Confirming(request) => {
            let text = format!(
                "{}\n\n{} will be reclaimed.",
                request.prompt(),
                format_bytes(request.declared_size(&app.results))
            );
            render_message(f, "Confirm", &text);
        }
        AppState::Cleaning => {
            let state = app.progress.snapshot();
            if state.is_active {
                let area = centered_rect(60, 15, f.area());
                f.render_widget(Clear, area);
                let gauge = Gauge::default()
                    .block(Block::default().borders(Borders::ALL).title("Cleaning"))
                    .gauge_style(Style::default().fg(Color::Green))
                    .ratio(state.fraction_completed.clamp(0.0, 1.0))
                    .label(state.status_text);
                f.render_widget(gauge, area);
            }
        }
        AppState::Done(msg) => render_message(f, "Clean Completed", msg),
        AppState::Scanning | AppState::Browsing => {}
    }
}

fn render_message(f: &mut Frame, title: &str, msg: &str) {
    let block = Block::default().title(title).borders(Borders::ALL);
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(msg.to_string())
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
