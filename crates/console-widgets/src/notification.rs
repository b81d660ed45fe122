//! User-visible popups: the error and message notification collaborators.

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use std::collections::VecDeque;

/// Fire-and-forget notification sink.
pub trait Notifier {
    /// Show an error the user must acknowledge.
    fn error_msg_popup(&mut self, text: &str);

    /// Show an informational message.
    fn msg_popup(&mut self, text: &str);
}

/// Unique popup ID.
pub type PopupId = u64;

/// Popup severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupLevel {
    Info,
    Error,
}

impl PopupLevel {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Info => " 알림 ",
            Self::Error => " 오류 ",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Error => Color::Red,
        }
    }
}

/// A queued popup.
#[derive(Debug, Clone)]
pub struct Popup {
    pub id: PopupId,
    pub level: PopupLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Queue of pending popups; the most recent one is shown.
#[derive(Debug, Clone)]
pub struct PopupQueue {
    popups: VecDeque<Popup>,
    next_id: PopupId,
    max_pending: usize,
    /// Info popups older than this are dropped (0 = never)
    info_dismiss_secs: i64,
}

impl PopupQueue {
    pub fn new(max_pending: usize, info_dismiss_secs: i64) -> Self {
        Self {
            popups: VecDeque::new(),
            next_id: 1,
            max_pending: max_pending.max(1),
            info_dismiss_secs,
        }
    }

    /// Push a popup, returning its ID.
    pub fn push(&mut self, level: PopupLevel, message: impl Into<String>) -> PopupId {
        let id = self.next_id;
        self.next_id += 1;
        self.popups.push_front(Popup {
            id,
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
        while self.popups.len() > self.max_pending {
            self.popups.pop_back();
        }
        id
    }

    pub fn latest(&self) -> Option<&Popup> {
        self.popups.front()
    }

    /// Dismiss the visible popup.
    pub fn dismiss_latest(&mut self) -> Option<Popup> {
        self.popups.pop_front()
    }

    pub fn dismiss(&mut self, id: PopupId) {
        self.popups.retain(|p| p.id != id);
    }

    pub fn dismiss_all(&mut self) {
        self.popups.clear();
    }

    pub fn count(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    /// Drop info popups past their age. Errors stay until acknowledged.
    pub fn process_auto_dismiss(&mut self) {
        if self.info_dismiss_secs == 0 {
            return;
        }
        let now = Utc::now();
        let limit = self.info_dismiss_secs;
        self.popups.retain(|p| {
            p.level == PopupLevel::Error || now.signed_duration_since(p.timestamp).num_seconds() < limit
        });
    }
}

impl Default for PopupQueue {
    fn default() -> Self {
        Self::new(16, 5)
    }
}

impl Notifier for PopupQueue {
    fn error_msg_popup(&mut self, text: &str) {
        tracing::info!(message = text, "error popup");
        self.push(PopupLevel::Error, text);
    }

    fn msg_popup(&mut self, text: &str) {
        tracing::debug!(message = text, "message popup");
        self.push(PopupLevel::Info, text);
    }
}

/// Centered box showing one popup.
pub struct PopupView<'a> {
    popup: &'a Popup,
}

impl<'a> PopupView<'a> {
    pub fn new(popup: &'a Popup) -> Self {
        Self { popup }
    }

    /// Area the popup occupies inside `area`.
    pub fn centered(area: Rect) -> Rect {
        let width = area.width.saturating_sub(4).min(60);
        let height = area.height.min(7);
        Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}

impl Widget for PopupView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = Self::centered(area);
        Clear.render(rect, buf);

        let color = self.popup.level.color();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Line::styled(
                self.popup.level.title(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));

        Paragraph::new(self.popup.message.as_str())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(rect, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_testing::TestTerminal;

    #[test]
    fn test_queue_latest_first() {
        let mut queue = PopupQueue::default();
        queue.msg_popup("저장되었습니다");
        queue.error_msg_popup("조회 실패");

        let latest = queue.latest().unwrap();
        assert_eq!(latest.level, PopupLevel::Error);
        assert_eq!(latest.message, "조회 실패");

        queue.dismiss_latest();
        assert_eq!(queue.latest().unwrap().message, "저장되었습니다");
    }

    #[test]
    fn test_queue_capacity() {
        let mut queue = PopupQueue::new(2, 0);
        queue.msg_popup("a");
        queue.msg_popup("b");
        queue.msg_popup("c");

        assert_eq!(queue.count(), 2);
        assert_eq!(queue.latest().unwrap().message, "c");
    }

    #[test]
    fn test_dismiss_by_id() {
        let mut queue = PopupQueue::default();
        let id = queue.push(PopupLevel::Info, "a");
        queue.push(PopupLevel::Info, "b");

        queue.dismiss(id);
        assert_eq!(queue.count(), 1);
        assert_eq!(queue.latest().unwrap().message, "b");
    }

    #[test]
    fn test_errors_survive_auto_dismiss() {
        let mut queue = PopupQueue::new(8, 1);
        queue.push(PopupLevel::Error, "boom");
        for popup in queue.popups.iter_mut() {
            popup.timestamp = Utc::now() - chrono::Duration::seconds(30);
        }
        queue.push(PopupLevel::Info, "fresh");

        queue.process_auto_dismiss();
        assert_eq!(queue.count(), 2);

        for popup in queue.popups.iter_mut() {
            popup.timestamp = Utc::now() - chrono::Duration::seconds(30);
        }
        queue.process_auto_dismiss();
        assert_eq!(queue.count(), 1);
        assert_eq!(queue.latest().unwrap().level, PopupLevel::Error);
    }

    #[test]
    fn test_render_popup() {
        let mut queue = PopupQueue::default();
        queue.error_msg_popup("Network error");

        let mut terminal = TestTerminal::new(40, 10);
        let popup = queue.latest().unwrap().clone();
        terminal.draw(|frame| {
            frame.render_widget(PopupView::new(&popup), frame.area());
        });

        terminal.assert_contains("Network error");
    }
}
