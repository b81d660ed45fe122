//! Transient UI state of a search form.
//!
//! Field values are not kept here; they live in the owner's filter state.

/// Side of a period being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodSide {
    #[default]
    Start,
    End,
}

impl PeriodSide {
    pub fn toggle(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// State for the search form widget.
#[derive(Debug, Clone, Default)]
pub struct SearchFormState {
    /// Currently focused field id
    pub focused: Option<String>,
    /// Uncommitted text for the focused field
    pub buffer: Option<String>,
    /// Side of a period field being edited
    pub period_side: PeriodSide,
}

impl SearchFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self, id: impl Into<String>) {
        self.focused = Some(id.into());
        self.buffer = None;
        self.period_side = PeriodSide::Start;
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }

    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn cancel_edit(&mut self) {
        self.buffer = None;
    }

    /// Take the uncommitted text, leaving edit mode.
    pub fn take_buffer(&mut self) -> Option<String> {
        self.buffer.take()
    }

    /// Focus the next id in `order`, wrapping around.
    pub fn focus_next(&mut self, order: &[String]) {
        if order.is_empty() {
            return;
        }
        let next = match self.position(order) {
            Some(idx) => (idx + 1) % order.len(),
            None => 0,
        };
        self.focus(order[next].clone());
    }

    /// Focus the previous id in `order`, wrapping around.
    pub fn focus_previous(&mut self, order: &[String]) {
        if order.is_empty() {
            return;
        }
        let prev = match self.position(order) {
            Some(0) | None => order.len() - 1,
            Some(idx) => idx - 1,
        };
        self.focus(order[prev].clone());
    }

    /// Focus the first id when nothing valid is focused.
    pub fn ensure_focus(&mut self, order: &[String]) {
        if self.position(order).is_none() {
            if let Some(first) = order.first() {
                self.focus(first.clone());
            } else {
                self.focused = None;
            }
        }
    }

    fn position(&self, order: &[String]) -> Option<usize> {
        self.focused
            .as_ref()
            .and_then(|id| order.iter().position(|o| o == id))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<String> {
        vec!["carno".into(), "mgmtstatus".into(), "search".into()]
    }

    #[test]
    fn test_focus_navigation() {
        let order = order();
        let mut state = SearchFormState::new();

        state.focus_next(&order);
        assert!(state.is_focused("carno"));

        state.focus_next(&order);
        state.focus_next(&order);
        assert!(state.is_focused("search"));

        // Wrap around
        state.focus_next(&order);
        assert!(state.is_focused("carno"));

        state.focus_previous(&order);
        assert!(state.is_focused("search"));
    }

    #[test]
    fn test_focus_change_drops_buffer() {
        let order = order();
        let mut state = SearchFormState::new();
        state.focus("carno");
        state.buffer = Some("12".into());

        state.focus_next(&order);
        assert!(!state.is_editing());
    }

    #[test]
    fn test_ensure_focus() {
        let mut state = SearchFormState::new();
        state.focus("gone");
        state.ensure_focus(&order());
        assert!(state.is_focused("carno"));

        state.ensure_focus(&[]);
        assert!(state.focused.is_none());
    }
}
