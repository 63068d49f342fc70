//! UI rendering module

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use spellbook_core::LoadStatus;
use spellbook_core::logging::LogLevel;

use crate::app::{App, Tab};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_main(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if let Some(spell) = app.controller.state().selection().shown() {
        let favorite = app.controller.is_favorite(spell);
        let title = if favorite {
            format!(" ★ {} ", spell.name)
        } else {
            format!(" {} ", spell.name)
        };
        let body = if spell.desc.is_empty() {
            "(无描述)".to_string()
        } else {
            spell.desc.clone()
        };

        let area = centered_rect(80, 60, frame.area());
        let details = Paragraph::new(format!("{}\n\n[f]收藏 [Esc]关闭", body))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });

        frame.render_widget(Clear, area);
        frame.render_widget(details, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let favorites = app.controller.state().favorites().len();
    let titles = vec![
        "法术 [1]".to_string(),
        format!("收藏 ({}) [2]", favorites),
        "日志 [3]".to_string(),
    ];
    let selected = match app.tab {
        Tab::Spells => 0,
        Tab::Favorites => 1,
        Tab::Log => 2,
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Spellbook "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    frame.render_widget(tabs, area);
}

fn draw_main(frame: &mut Frame, app: &App, area: Rect) {
    match app.tab {
        Tab::Spells | Tab::Favorites => draw_spell_list(frame, app, area),
        Tab::Log => draw_log_tab(frame, app, area),
    }
}

fn draw_spell_list(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let spells = app.visible_spells();

    let items: Vec<ListItem> = spells
        .iter()
        .map(|spell| {
            let marker = if state.is_favorite(spell) { "★" } else { "☆" };
            let level = spell
                .level
                .map(|l| format!(" (Lv {})", l))
                .unwrap_or_default();
            ListItem::new(format!("{} {}{}", marker, spell.name, level))
        })
        .collect();

    let title = match (app.tab, state.catalog_status()) {
        (Tab::Favorites, _) => " ★ 收藏夹 ".to_string(),
        (_, LoadStatus::Pending) => " ⏳ 加载中... ".to_string(),
        (_, LoadStatus::Failed(_)) => " ⚠️ 目录不可用 ".to_string(),
        (_, LoadStatus::Loaded) => format!(" 📖 法术 ({}) ", spells.len()),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold());

    let mut list_state = ListState::default();
    if !spells.is_empty() {
        list_state.select(Some(app.cursor()));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_log_tab(frame: &mut Frame, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .logs
        .recent(app.log_level)
        .take(height.max(1))
        .map(|entry| {
            let style = match entry.level {
                LogLevel::Error => Style::default().fg(Color::Red),
                LogLevel::Warn => Style::default().fg(Color::Yellow),
                LogLevel::Info => Style::default(),
                LogLevel::Debug | LogLevel::Trace => Style::default().fg(Color::DarkGray),
            };
            ListItem::new(entry.to_string()).style(style)
        })
        .collect();

    let title = format!(" 📋 日志 (≤ {}) ", app.log_level);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(list, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys = match app.tab {
        Tab::Log => "[d]级别 [c]清空 [Tab]切换 [q]退出",
        _ => "[f]收藏 [Enter]详情 [Tab]切换 [q]退出",
    };

    let status = Paragraph::new(format!(" {} │ {}", app.status_message, keys))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// 在 `area` 中居中，宽高为百分比
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
