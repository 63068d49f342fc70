//! TUI 日志层
//!
//! 自定义 tracing Layer，将日志发送到 TUI 的日志面板。

use crate::app::AppEvent;
use spellbook_core::logging::{LogEntry, LogLevel};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// 发送日志到 TUI 的 Layer
pub struct TuiLogLayer {
    tx: mpsc::Sender<AppEvent>,
}

impl TuiLogLayer {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut message = String::new();
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        // log crate 桥接过来的事件，target 在 log.target 字段里
        let target = log_target(event).unwrap_or_else(|| metadata.target().to_string());
        if message.is_empty() {
            message = target.clone();
        }

        // 面板满了就丢弃，不阻塞调用方
        let entry = LogEntry::new(to_level(metadata.level()), target, message);
        let _ = self.tx.try_send(AppEvent::Log(entry));
    }
}

fn to_level(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        Level::DEBUG => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

fn log_target(event: &Event<'_>) -> Option<String> {
    let mut target = None;
    event.record(&mut TargetVisitor(&mut target));
    target
}

/// 访问者，用于提取事件中的消息字段
struct MessageVisitor<'a>(&'a mut String);

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.0 = value.to_string();
        }
    }
}

struct TargetVisitor<'a>(&'a mut Option<String>);

impl<'a> tracing::field::Visit for TargetVisitor<'a> {
    fn record_debug(&mut self, _field: &tracing::field::Field, _value: &dyn fmt::Debug) {}

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "log.target" {
            *self.0 = Some(value.to_string());
        }
    }
}
