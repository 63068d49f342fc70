//! Application state

use spellbook_core::logging::{LogBuffer, LogEntry, LogLevel};
use spellbook_core::{AppSettings, LoadStatus, Spell, SpellController};
use tokio::sync::mpsc;

const LOG_CAPACITY: usize = 500;

/// 发送到 UI 线程的异步事件
#[derive(Debug)]
pub enum AppEvent {
    Log(LogEntry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Spells,
    Favorites,
    Log,
}

pub struct App {
    pub controller: SpellController,
    pub tab: Tab,
    pub spell_cursor: usize,
    pub favorite_cursor: usize,
    pub logs: LogBuffer,
    pub log_level: LogLevel,
    pub status_message: String,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(controller: SpellController, settings: &AppSettings) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        let log_level = initial_log_level(settings);

        let mut logs = LogBuffer::new(LOG_CAPACITY);
        logs.push(LogEntry::new(LogLevel::Info, "spellbook", "Spellbook TUI 启动"));
        logs.push(LogEntry::new(
            LogLevel::Info,
            "spellbook",
            "按 'f' 收藏, Enter 查看详情, 'q' 退出",
        ));

        Self {
            controller,
            tab: Tab::Spells,
            spell_cursor: 0,
            favorite_cursor: 0,
            logs,
            log_level,
            status_message: "正在加载法术目录...".to_string(),
            event_tx,
            event_rx,
        }
    }

    /// 当前标签页中列出的法术
    pub fn visible_spells(&self) -> &[Spell] {
        let state = self.controller.state();
        match self.tab {
            Tab::Spells => state.catalog(),
            Tab::Favorites => state.favorites().as_slice(),
            Tab::Log => &[],
        }
    }

    pub fn cursor(&self) -> usize {
        match self.tab {
            Tab::Favorites => self.favorite_cursor,
            _ => self.spell_cursor,
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.tab {
            Tab::Favorites => &mut self.favorite_cursor,
            _ => &mut self.spell_cursor,
        }
    }

    pub fn highlighted_spell(&self) -> Option<&Spell> {
        self.visible_spells().get(self.cursor())
    }

    pub fn details_open(&self) -> bool {
        self.controller.state().selection().is_visible()
    }

    pub fn next_spell(&mut self) {
        let len = self.visible_spells().len();
        if len > 0 {
            let cursor = self.cursor_mut();
            *cursor = (*cursor + 1) % len;
        }
    }

    pub fn previous_spell(&mut self) {
        let len = self.visible_spells().len();
        if len > 0 {
            let cursor = self.cursor_mut();
            *cursor = cursor.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// 切换详情中的法术，否则切换光标所在的法术
    pub fn toggle_favorite(&mut self) {
        let spell = self
            .controller
            .state()
            .selection()
            .shown()
            .or_else(|| self.highlighted_spell())
            .cloned();
        let Some(spell) = spell else {
            return;
        };

        let added = !self.controller.is_favorite(&spell);
        // 写入失败会在写入任务里记录到日志面板
        let _ = self.controller.toggle_favorite(spell.clone());

        self.status_message = if added {
            format!("已收藏: {}", spell.name)
        } else {
            format!("已取消收藏: {}", spell.name)
        };
        self.clamp_cursors();
    }

    pub fn open_details(&mut self) {
        if let Some(spell) = self.highlighted_spell().cloned() {
            self.controller.open_details(spell);
        }
    }

    pub fn close_details(&mut self) {
        self.controller.close_details();
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Spells => Tab::Favorites,
            Tab::Favorites => Tab::Log,
            Tab::Log => Tab::Spells,
        };
    }

    pub fn toggle_log_level(&mut self) {
        self.log_level = self.log_level.cycle();
        self.status_message = format!("日志级别: {}", self.log_level);
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// Merge background results and pending log events into the state.
    pub fn tick(&mut self) {
        let before_catalog = self.controller.state().catalog_status().clone();
        if self.controller.poll_actions() > 0 {
            self.clamp_cursors();
            let status = self.controller.state().catalog_status();
            if *status != before_catalog {
                self.status_message = match status {
                    LoadStatus::Loaded => {
                        format!("已加载 {} 个法术", self.controller.state().catalog().len())
                    }
                    LoadStatus::Failed(_) => "法术目录加载失败，详见日志".to_string(),
                    LoadStatus::Pending => self.status_message.clone(),
                };
            }
        }

        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::Log(entry) => self.logs.push(entry),
            }
        }
    }

    fn clamp_cursors(&mut self) {
        let state = self.controller.state();
        let catalog_len = state.catalog().len();
        let favorites_len = state.favorites().len();
        self.spell_cursor = self.spell_cursor.min(catalog_len.saturating_sub(1));
        self.favorite_cursor = self.favorite_cursor.min(favorites_len.saturating_sub(1));
    }
}

/// 配置里的 `log_level` 优先，无法识别时退回到 `verbose`
fn initial_log_level(settings: &AppSettings) -> LogLevel {
    if let Some(name) = settings.log_level.as_deref() {
        match name.parse::<LogLevel>() {
            Ok(level) => return level,
            Err(()) => tracing::warn!("Ignoring unknown log_level setting {:?}", name),
        }
    }
    if settings.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}
