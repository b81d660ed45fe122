//! Virtual terminal for headless testing.

use crate::TestResult;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use unicode_width::UnicodeWidthStr;

/// A virtual terminal for testing TUI widgets.
pub struct TestTerminal {
    terminal: Terminal<TestBackend>,
}

impl TestTerminal {
    /// Create a new test terminal with the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        let backend = TestBackend::new(width, height);
        let terminal = Terminal::new(backend).expect("Failed to create terminal");
        Self { terminal }
    }

    /// Get the current terminal size.
    pub fn size(&self) -> Rect {
        self.buffer().area
    }

    pub fn width(&self) -> u16 {
        self.size().width
    }

    pub fn height(&self) -> u16 {
        self.size().height
    }

    /// Draw to the terminal.
    pub fn draw<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.try_draw(f).expect("Failed to draw to terminal");
    }

    /// Draw to the terminal, returning backend errors.
    pub fn try_draw<F>(&mut self, f: F) -> TestResult<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Get a reference to the current buffer.
    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    /// Get the buffer content as a string, one line per row.
    pub fn to_string(&self) -> String {
        let area = self.buffer().area;
        (0..area.height)
            .map(|row| self.row_text(area.y + row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Assert that the buffer contains the given substring.
    pub fn assert_contains(&self, needle: &str) {
        let content = self.to_string();
        if !content.contains(needle) {
            panic!("Buffer does not contain \"{}\":\n{}", needle, content);
        }
    }

    /// Assert that the buffer does not contain the given substring.
    pub fn assert_not_contains(&self, needle: &str) {
        let content = self.to_string();
        if content.contains(needle) {
            panic!("Buffer unexpectedly contains \"{}\":\n{}", needle, content);
        }
    }

    /// Get the content of a specific line, trailing blanks removed.
    pub fn line(&self, line_num: u16) -> String {
        let area = self.buffer().area;
        if line_num >= area.height {
            return String::new();
        }
        self.row_text(area.y + line_num).trim_end().to_string()
    }

    /// Index of the first line containing `needle`.
    pub fn find_line(&self, needle: &str) -> Option<u16> {
        let area = self.buffer().area;
        (0..area.height).find(|&row| self.row_text(area.y + row).contains(needle))
    }

    /// Row text with the cells hidden behind wide characters skipped.
    fn row_text(&self, y: u16) -> String {
        let buffer = self.buffer();
        let area = buffer.area;
        let mut result = String::new();
        let mut hidden = 0;

        for x in area.x..area.x + area.width {
            let Some(cell) = buffer.cell((x, y)) else {
                continue;
            };
            if hidden > 0 {
                hidden -= 1;
                continue;
            }
            let symbol = cell.symbol();
            result.push_str(symbol);
            hidden = symbol.width().saturating_sub(1);
        }

        result
    }
}

impl Default for TestTerminal {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::{Block, Borders, Paragraph};

    #[test]
    fn test_terminal_creation() {
        let terminal = TestTerminal::new(80, 24);
        assert_eq!(terminal.width(), 80);
        assert_eq!(terminal.height(), 24);
    }

    #[test]
    fn test_line_access() {
        let mut terminal = TestTerminal::new(20, 5);

        terminal.draw(|frame| {
            let para = Paragraph::new("Line 1\nLine 2\nLine 3");
            frame.render_widget(para, frame.area());
        });

        assert_eq!(terminal.line(0), "Line 1");
        assert_eq!(terminal.line(2), "Line 3");
        assert_eq!(terminal.line(9), "");
    }

    #[test]
    fn test_wide_characters_read_back_contiguously() {
        let mut terminal = TestTerminal::new(20, 2);

        terminal.draw(|frame| {
            let para = Paragraph::new("차량번호: 12가3456");
            frame.render_widget(para, frame.area());
        });

        assert_eq!(terminal.line(0), "차량번호: 12가3456");
        terminal.assert_contains("12가3456");
    }

    #[test]
    fn test_assert_contains() {
        let mut terminal = TestTerminal::new(20, 5);

        terminal.draw(|frame| {
            let para = Paragraph::new("Test Content");
            frame.render_widget(para, frame.area());
        });

        terminal.assert_contains("Test");
        terminal.assert_not_contains("Missing");
    }

    #[test]
    fn test_find_line() {
        let mut terminal = TestTerminal::new(20, 4);

        terminal.draw(|frame| {
            frame.render_widget(Paragraph::new("조회\n저장"), frame.area());
        });

        assert_eq!(terminal.find_line("저장"), Some(1));
        assert_eq!(terminal.find_line("삭제"), None);
    }

    #[test]
    fn test_with_borders() {
        let mut terminal = TestTerminal::new(20, 5);

        terminal.draw(|frame| {
            let block = Block::default().title("조회").borders(Borders::ALL);
            frame.render_widget(block, frame.area());
        });

        assert!(terminal.line(0).contains("조회"));
    }
}
