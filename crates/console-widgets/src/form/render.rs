//! Rendering of a search form as row-grouped controls.

use super::descriptor::{FieldDescriptor, FieldKind};
use super::layout::group_rows;
use super::state::{PeriodSide, SearchFormState};
use super::value::{FilterState, FilterValue};
use super::SearchForm;
use crate::text::{fit, put};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, StatefulWidget, Widget};

/// Gap between controls on one row.
const FIELD_GAP: u16 = 2;

/// Stateful widget drawing a [`SearchForm`] with the values of a filter state.
pub struct SearchFormView<'a> {
    form: &'a SearchForm<'a>,
    filter: &'a FilterState,
    block: Option<Block<'a>>,
}

impl<'a> SearchFormView<'a> {
    pub fn new(form: &'a SearchForm<'a>, filter: &'a FilterState) -> Self {
        Self {
            form,
            filter,
            block: None,
        }
    }

    /// Set the block wrapper.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Rows needed to draw the form, excluding the block.
    pub fn height(form: &SearchForm<'_>) -> u16 {
        group_rows(form.config())
            .iter()
            .map(|g| g.fields().map(FieldDescriptor::cell_height).max().unwrap_or(1))
            .sum()
    }

    fn value_text(&self, field: &FieldDescriptor, state: &SearchFormState) -> (String, bool) {
        let focused = state.is_focused(&field.id);
        if focused {
            if let Some(ref buffer) = state.buffer {
                return match (field.kind.is_period(), self.filter.get(&field.id)) {
                    (true, Some(FilterValue::Period(p))) => match state.period_side {
                        PeriodSide::Start => (format!("{buffer}_ ~ {}", p.end), false),
                        PeriodSide::End => (format!("{} ~ {buffer}_", p.start), false),
                    },
                    _ if field.secret => (format!("{}_", mask(buffer)), false),
                    _ => (format!("{buffer}_"), false),
                };
            }
        }

        let value = self.filter.get(&field.id);
        match field.kind {
            FieldKind::Label => (String::new(), false),
            FieldKind::Button => (format!("[ {} ]", field.display_label()), false),
            FieldKind::PopupIcon => {
                let current = value.map(FilterValue::display).unwrap_or_default();
                (format!("{current} [\u{2315}]"), false)
            }
            FieldKind::Checkbox => {
                let checked = value.and_then(FilterValue::as_bool).unwrap_or(false);
                (if checked { "[\u{2713}]" } else { "[ ]" }.to_string(), false)
            }
            FieldKind::Select => {
                let current = value.map(FilterValue::as_str).unwrap_or("");
                let label = field.option_label(current).unwrap_or(current);
                (format!("\u{25c2} {label} \u{25b8}"), false)
            }
            FieldKind::Radio => {
                let current = value.map(FilterValue::as_str).unwrap_or("");
                let text = field
                    .options
                    .iter()
                    .map(|o| {
                        let mark = if o.value == current { "(\u{2022})" } else { "( )" };
                        format!("{mark} {}", o.label)
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                (text, false)
            }
            kind if kind.is_period() && focused => match value.and_then(FilterValue::as_period) {
                Some(p) => match state.period_side {
                    PeriodSide::Start => (format!(">{} ~ {}", p.start, p.end), false),
                    PeriodSide::End => (format!("{} ~ >{}", p.start, p.end), false),
                },
                None => (String::new(), false),
            },
            _ => match value {
                Some(v) if !v.is_empty() && field.secret => (mask(v.as_str()), false),
                Some(v) if !v.is_empty() => (v.display(), false),
                _ => (field.placeholder.clone().unwrap_or_default(), true),
            },
        }
    }

    fn draw_field(
        &self,
        field: &FieldDescriptor,
        x: u16,
        y: u16,
        right: u16,
        buf: &mut Buffer,
        state: &SearchFormState,
    ) -> u16 {
        let mut x = x;

        if field.kind == FieldKind::Label || (field.label_visible && field.kind != FieldKind::Button) {
            let text = if field.kind == FieldKind::Label {
                field.display_label().to_string()
            } else {
                format!("{}:", field.display_label())
            };
            let style = if field.kind == FieldKind::Label {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            x = put(buf, x, y, right, &text, style);
            if field.kind == FieldKind::Label {
                return x;
            }
            x = x.saturating_add(1).min(right);
        }

        let focused = state.is_focused(&field.id);
        let mut style = field.style();
        if !field.enabled {
            style = style.fg(Color::DarkGray);
        }
        if focused {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }

        let width = field.cell_width().min(right.saturating_sub(x));
        for ix in x..x + width {
            buf[(ix, y)].set_style(style);
        }

        let (text, is_placeholder) = self.value_text(field, state);
        let text_style = if is_placeholder {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        };
        let fitted = fit(&text, width as usize);
        put(buf, x, y, x + width, &fitted, text_style);
        x + width
    }
}

impl StatefulWidget for SearchFormView<'_> {
    type State = SearchFormState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Render block if present
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 4 || inner.height < 1 {
            return;
        }

        state.ensure_focus(&self.form.focus_order());

        let right = inner.x + inner.width;
        let bottom = inner.y + inner.height;
        let mut y = inner.y;

        for group in group_rows(self.form.config()) {
            if y >= bottom {
                break;
            }
            let mut x = inner.x;
            for field in group.fields() {
                if x >= right {
                    break;
                }
                x = self.draw_field(field, x, y, right, buf, state);
                x = x.saturating_add(FIELD_GAP);
            }
            let height = group.fields().map(FieldDescriptor::cell_height).max().unwrap_or(1);
            y = y.saturating_add(height);
        }
    }
}

fn mask(text: &str) -> String {
    "\u{2022}".repeat(text.chars().count())
}
