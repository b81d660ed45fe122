//! Search forms driven by declarative configuration.
//!
//! # Example
//!
//! ```ignore
//! use console_widgets::{Area, AreaConfiguration, FieldDescriptor, FieldKind, SearchForm};
//!
//! let config = AreaConfiguration::new(vec![
//!     Area::search(vec![
//!         FieldDescriptor::new("carno", FieldKind::Text).label("차량번호").max_length(20),
//!         FieldDescriptor::new("mgmtstatus", FieldKind::Select)
//!             .option("", "전체")
//!             .option("운행", "운행"),
//!     ]),
//!     Area::buttons(vec![
//!         FieldDescriptor::new("search", FieldKind::Button).label("조회").event_type("search"),
//!     ]),
//! ]);
//!
//! let form = SearchForm::new(&config);
//! form.select("mgmtstatus", "운행", &mut page);
//! ```

mod config;
mod dates;
mod defaults;
mod descriptor;
mod event;
mod layout;
mod render;
mod state;
mod validation;
mod value;

pub use config::{Area, AreaConfiguration, AreaType, ConfigError};
pub use dates::{
    format_day, format_for, format_month, format_period, parse_day, parse_for, parse_month, today_for,
    Clock, FixedClock, SystemClock,
};
pub use defaults::{apply_defaults, default_for, initial_state};
pub use descriptor::{FieldDescriptor, FieldKind, SelectOption, DEFAULT_MAX_LENGTH};
pub use event::{names, Dispatch, EventPayload, ScreenEvent};
pub use layout::{focus_order, group_rows, RowGroup};
pub use render::SearchFormView;
pub use state::{PeriodSide, SearchFormState};
pub use validation::{validate_field, validators_for, Validator};
pub use value::{FilterPatch, FilterState, FilterValue, Period};

use crate::notification::Notifier;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

static SYSTEM_CLOCK: SystemClock = SystemClock;

/// The owner of a form's filter state: the page controller.
///
/// Forms read the filter through this trait and hand every change back as a
/// single [`FilterPatch`]; they never write the state themselves.
pub trait FormHost: Notifier {
    fn filter(&self) -> &FilterState;

    /// Apply the changes of one interaction.
    fn update(&mut self, patch: FilterPatch);

    /// Receive a named event.
    fn dispatch(&mut self, event_type: &str, payload: EventPayload);
}

/// Result of one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// The filter was updated and/or an event dispatched
    Applied,
    /// Input failed validation; an error popup was raised
    Rejected,
    /// Nothing happened (disabled, unknown, or wrong kind)
    Ignored,
}

/// Interpreter of an [`AreaConfiguration`] against a [`FormHost`].
pub struct SearchForm<'a> {
    config: &'a AreaConfiguration,
    clock: &'a dyn Clock,
}

impl<'a> SearchForm<'a> {
    pub fn new(config: &'a AreaConfiguration) -> Self {
        Self {
            config,
            clock: &SYSTEM_CLOCK,
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &'a AreaConfiguration {
        self.config
    }

    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }

    /// Field ids in focus order.
    pub fn focus_order(&self) -> Vec<String> {
        focus_order(self.config)
    }

    /// Look up an enabled field of an accepted kind.
    fn target(&self, id: &str, accepts: impl Fn(FieldKind) -> bool) -> Option<&'a FieldDescriptor> {
        let Some(field) = self.config.field(id) else {
            tracing::warn!(id, "interaction with unknown field");
            return None;
        };
        if !accepts(field.kind) {
            tracing::warn!(id, kind = ?field.kind, "interaction does not apply to field kind");
            return None;
        }
        if !field.enabled {
            tracing::trace!(id, "ignoring interaction with disabled field");
            return None;
        }
        Some(field)
    }

    /// Commit text into a `text`/`textarea` field.
    pub fn input_text(&self, id: &str, text: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, FieldKind::is_text) else {
            return Interaction::Ignored;
        };
        if let Err(msg) = validate_field(field, text) {
            host.error_msg_popup(&msg);
            return Interaction::Rejected;
        }
        host.update(FilterPatch::single(id, text));
        if let Some(ref event) = field.event {
            host.dispatch(event, EventPayload::with_value(id, text));
        }
        Interaction::Applied
    }

    /// Select an option of a `select` field.
    pub fn select(&self, id: &str, value: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, |k| k == FieldKind::Select) else {
            return Interaction::Ignored;
        };
        self.apply_option(field, value, names::SELECT_CHANGE, host)
    }

    /// Choose an option of a `radio` field.
    pub fn choose(&self, id: &str, value: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, |k| k == FieldKind::Radio) else {
            return Interaction::Ignored;
        };
        self.apply_option(field, value, names::RADIO_CHANGE, host)
    }

    fn apply_option(
        &self,
        field: &FieldDescriptor,
        value: &str,
        default_event: &str,
        host: &mut dyn FormHost,
    ) -> Interaction {
        if !field.has_option(value) {
            tracing::warn!(id = %field.id, value, "value is not one of the field options");
            return Interaction::Ignored;
        }
        host.update(FilterPatch::single(&field.id, value));
        let event = field.event.as_deref().unwrap_or(default_event);
        host.dispatch(event, EventPayload::with_value(&field.id, value));
        Interaction::Applied
    }

    /// Set a checkbox.
    pub fn set_checked(&self, id: &str, checked: bool, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, |k| k == FieldKind::Checkbox) else {
            return Interaction::Ignored;
        };
        host.update(FilterPatch::single(id, checked));
        let event = field.event.as_deref().unwrap_or(names::CHECKBOX_CHANGE);
        host.dispatch(event, EventPayload::with_checked(id, checked));
        Interaction::Applied
    }

    /// Flip a checkbox.
    pub fn toggle(&self, id: &str, host: &mut dyn FormHost) -> Interaction {
        let checked = !host.filter().flag(id);
        self.set_checked(id, checked, host)
    }

    /// Allowed `(min, max)` for a start/end field, read from its partner's current value.
    pub fn date_bounds(&self, id: &str, filter: &FilterState) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let Some(field) = self.config.field(id) else {
            return (None, None);
        };
        let Some(partner) = field.paired_id() else {
            return (None, None);
        };
        let partner_value = parse_for(field.kind, filter.text(partner));
        if field.kind.is_start() {
            (None, partner_value)
        } else if field.kind.is_end() {
            (partner_value, None)
        } else {
            (None, None)
        }
    }

    /// Pick a date for a day or month field.
    pub fn pick_date(&self, id: &str, raw: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, |k| k.is_day() || k.is_month()) else {
            return Interaction::Ignored;
        };
        let formatted = format_for(field.kind, raw);

        if let Some(picked) = parse_for(field.kind, &formatted) {
            let (min, max) = self.date_bounds(id, host.filter());
            if max.is_some_and(|max| picked > max) {
                host.error_msg_popup("시작일은 종료일보다 늦을 수 없습니다");
                return Interaction::Rejected;
            }
            if min.is_some_and(|min| picked < min) {
                host.error_msg_popup("종료일은 시작일보다 빠를 수 없습니다");
                return Interaction::Rejected;
            }
        }

        host.update(FilterPatch::single(id, formatted.clone()));
        let event = field.event.as_deref().unwrap_or(names::DATE_CHANGE);
        host.dispatch(event, EventPayload::with_value(id, formatted));
        Interaction::Applied
    }

    /// Pick both sides of a period field. Invalid sides resolve to `""`.
    pub fn pick_period(&self, id: &str, start: &str, end: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, FieldKind::is_period) else {
            return Interaction::Ignored;
        };
        let period = format_period(field.kind, start, end);

        if let (Some(s), Some(e)) = (parse_for(field.kind, &period.start), parse_for(field.kind, &period.end)) {
            if s > e {
                host.error_msg_popup("시작일은 종료일보다 늦을 수 없습니다");
                return Interaction::Rejected;
            }
        }

        host.update(FilterPatch::single(id, period.clone()));
        let event = field.event.as_deref().unwrap_or(names::DATE_CHANGE);
        host.dispatch(event, EventPayload::with_value(id, period));
        Interaction::Applied
    }

    /// Reset a dated field to today. Paired fields reset together.
    pub fn reset_date(&self, id: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.config.field(id) else {
            tracing::warn!(id, "reset of unknown field");
            return Interaction::Ignored;
        };
        if !field.kind.is_dated() || !(field.enabled || field.reset_when_disabled) {
            return Interaction::Ignored;
        }

        let today = today_for(field.kind, self.clock);
        let value = if field.kind.is_period() {
            FilterValue::Period(Period::same(today))
        } else {
            FilterValue::Text(today)
        };

        let mut patch = FilterPatch::single(id, value.clone());
        if let Some(partner) = field.paired_id().and_then(|p| self.config.field(p)) {
            if partner.kind.is_dated() && !partner.kind.is_period() {
                patch = patch.with(&partner.id, today_for(partner.kind, self.clock));
            }
        }

        host.update(patch);
        host.dispatch(names::DATE_CHANGE, EventPayload::with_value(id, value));
        Interaction::Applied
    }

    /// Press a button or popup icon.
    pub fn press(&self, id: &str, host: &mut dyn FormHost) -> Interaction {
        let Some(field) = self.target(id, FieldKind::needs_event_type) else {
            return Interaction::Ignored;
        };
        let Some(ref event_type) = field.event_type else {
            tracing::warn!(id, "button without eventType");
            return Interaction::Ignored;
        };
        host.dispatch(event_type, EventPayload::id(id));
        Interaction::Applied
    }

    /// Handle a key event against the focused field.
    pub fn handle_key(&self, key: KeyEvent, state: &mut SearchFormState, host: &mut dyn FormHost) -> bool {
        let order = self.focus_order();
        state.ensure_focus(&order);

        match key.code {
            KeyCode::Tab if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                state.focus_next(&order);
                return true;
            }
            KeyCode::BackTab | KeyCode::Tab => {
                state.focus_previous(&order);
                return true;
            }
            _ => {}
        }

        let Some(id) = state.focused.clone() else {
            return false;
        };
        let Some(field) = self.config.field(&id) else {
            return false;
        };

        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if field.kind.is_dated() {
                state.cancel_edit();
                self.reset_date(&id, host);
                return true;
            }
            return false;
        }

        match field.kind {
            FieldKind::Text | FieldKind::Textarea => self.handle_edit_key(field, key, state, host),
            kind if kind.is_dated() => self.handle_edit_key(field, key, state, host),
            FieldKind::Select | FieldKind::Radio => match key.code {
                KeyCode::Left => self.cycle_option(field, -1, host),
                KeyCode::Right => self.cycle_option(field, 1, host),
                _ => false,
            },
            FieldKind::Checkbox => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.toggle(&id, host);
                    true
                }
                _ => false,
            },
            FieldKind::Button | FieldKind::PopupIcon => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.press(&id, host);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn cycle_option(&self, field: &FieldDescriptor, delta: isize, host: &mut dyn FormHost) -> bool {
        if field.options.is_empty() || !field.enabled {
            return false;
        }
        let current = host.filter().text(&field.id);
        let len = field.options.len() as isize;
        let next = match field.options.iter().position(|o| o.value == current) {
            Some(idx) => (idx as isize + delta).rem_euclid(len),
            None => 0,
        };
        let value = field.options[next as usize].value.clone();
        match field.kind {
            FieldKind::Radio => self.choose(&field.id, &value, host),
            _ => self.select(&field.id, &value, host),
        };
        true
    }

    fn handle_edit_key(
        &self,
        field: &FieldDescriptor,
        key: KeyEvent,
        state: &mut SearchFormState,
        host: &mut dyn FormHost,
    ) -> bool {
        if !field.enabled {
            return false;
        }

        if field.kind.is_period() && !state.is_editing() {
            if let KeyCode::Char(c @ ('s' | 'e')) = key.code {
                state.period_side = if c == 's' { PeriodSide::Start } else { PeriodSide::End };
                return true;
            }
        }

        match key.code {
            KeyCode::Char(c) => {
                let current = self.current_text(field, state, host.filter());
                state.buffer.get_or_insert(current).push(c);
                true
            }
            KeyCode::Backspace => {
                let current = self.current_text(field, state, host.filter());
                state.buffer.get_or_insert(current).pop();
                true
            }
            KeyCode::Esc if state.is_editing() => {
                state.cancel_edit();
                true
            }
            KeyCode::Enter => {
                let Some(text) = state.take_buffer() else {
                    return false;
                };
                self.commit(field, &text, state.period_side, host);
                true
            }
            _ => false,
        }
    }

    /// Text the edit buffer starts from.
    fn current_text(&self, field: &FieldDescriptor, state: &SearchFormState, filter: &FilterState) -> String {
        match filter.get(&field.id) {
            Some(FilterValue::Period(p)) => match state.period_side {
                PeriodSide::Start => p.start.clone(),
                PeriodSide::End => p.end.clone(),
            },
            Some(FilterValue::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    fn commit(&self, field: &FieldDescriptor, text: &str, side: PeriodSide, host: &mut dyn FormHost) -> Interaction {
        if field.kind.is_text() {
            return self.input_text(&field.id, text, host);
        }
        if field.kind.is_period() {
            let current = host
                .filter()
                .get(&field.id)
                .and_then(FilterValue::as_period)
                .cloned()
                .unwrap_or_default();
            return match side {
                PeriodSide::Start => self.pick_period(&field.id, text, &current.end, host),
                PeriodSide::End => self.pick_period(&field.id, &current.start, text, host),
            };
        }
        self.pick_date(&field.id, text, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Host that records every call it receives.
    #[derive(Default)]
    struct RecordingHost {
        filter: FilterState,
        updates: Vec<FilterPatch>,
        dispatched: Vec<Dispatch>,
        errors: Vec<String>,
        messages: Vec<String>,
    }

    impl Notifier for RecordingHost {
        fn error_msg_popup(&mut self, text: &str) {
            self.errors.push(text.to_string());
        }

        fn msg_popup(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }
    }

    impl FormHost for RecordingHost {
        fn filter(&self) -> &FilterState {
            &self.filter
        }

        fn update(&mut self, patch: FilterPatch) {
            self.filter.apply(patch.clone());
            self.updates.push(patch);
        }

        fn dispatch(&mut self, event_type: &str, payload: EventPayload) {
            self.dispatched.push(Dispatch::new(event_type, payload));
        }
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    fn vehicle_config() -> AreaConfiguration {
        AreaConfiguration::new(vec![
            Area::search(vec![
                FieldDescriptor::new("carno", FieldKind::Text).max_length(5),
                FieldDescriptor::new("mgmtstatus", FieldKind::Select)
                    .option("", "전체")
                    .option("운행", "운행"),
                FieldDescriptor::new("searchUnit", FieldKind::Radio)
                    .option("day", "일")
                    .option("month", "월"),
                FieldDescriptor::new("includeReturned", FieldKind::Checkbox),
                FieldDescriptor::new("rangeStartDate", FieldKind::Startday).row(2),
                FieldDescriptor::new("rangeEndDate", FieldKind::Endday).row(2),
                FieldDescriptor::new("period", FieldKind::Dayperiod).row(3),
                FieldDescriptor::new("locked", FieldKind::Text).enabled(false),
                FieldDescriptor::new("lockedDay", FieldKind::Day)
                    .enabled(false)
                    .reset_when_disabled(true),
                FieldDescriptor::new("title", FieldKind::Label),
            ]),
            Area::buttons(vec![
                FieldDescriptor::new("search", FieldKind::Button).event_type("search"),
                FieldDescriptor::new("orgName", FieldKind::PopupIcon)
                    .event_type("orgPopup")
                    .enabled(false),
            ]),
        ])
    }

    fn host_with_defaults(config: &AreaConfiguration) -> RecordingHost {
        RecordingHost {
            filter: initial_state(config, &clock()),
            ..Default::default()
        }
    }

    #[test]
    fn test_over_length_text_is_rejected() {
        let config = AreaConfiguration::from_json(
            r#"{"areas":[{"type":"search","fields":[{"id":"carno","kind":"text","maxLength":5}]}]}"#,
        )
        .unwrap();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.input_text("carno", "123456", &mut host), Interaction::Rejected);
        assert!(!host.filter.contains("carno"));
        assert!(host.updates.is_empty());
        assert_eq!(host.errors.len(), 1);
    }

    #[test]
    fn test_text_within_limit() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.input_text("carno", "12가34", &mut host), Interaction::Applied);
        assert_eq!(host.filter.text("carno"), "12가34");
        assert_eq!(host.updates.len(), 1);
        assert!(host.dispatched.is_empty());
    }

    #[test]
    fn test_select_dispatches_once() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        form.select("mgmtstatus", "운행", &mut host);

        assert_eq!(host.filter.text("mgmtstatus"), "운행");
        assert_eq!(
            host.dispatched,
            vec![Dispatch::new(
                names::SELECT_CHANGE,
                EventPayload::with_value("mgmtstatus", "운행")
            )]
        );
    }

    #[test]
    fn test_select_uses_field_event() {
        let config = AreaConfiguration::new(vec![Area::search(vec![FieldDescriptor::new(
            "searchType",
            FieldKind::Select,
        )
        .option("day", "일")
        .event("searchTypeChange")])]);
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        form.select("searchType", "day", &mut host);
        assert_eq!(host.dispatched[0].event_type, "searchTypeChange");
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.select("mgmtstatus", "폐차", &mut host), Interaction::Ignored);
        assert!(host.updates.is_empty());
        assert!(host.dispatched.is_empty());
    }

    #[test]
    fn test_radio_and_checkbox() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        form.choose("searchUnit", "month", &mut host);
        form.toggle("includeReturned", &mut host);
        form.toggle("includeReturned", &mut host);

        assert_eq!(host.filter.text("searchUnit"), "month");
        assert!(!host.filter.flag("includeReturned"));
        assert_eq!(host.dispatched.len(), 3);
        assert_eq!(host.dispatched[0].event_type, names::RADIO_CHANGE);
        assert_eq!(host.dispatched[1].payload.checked, Some(true));
        assert_eq!(host.dispatched[2].payload.checked, Some(false));
    }

    #[test]
    fn test_disabled_fields_do_nothing() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.input_text("locked", "x", &mut host), Interaction::Ignored);
        assert_eq!(form.press("orgName", &mut host), Interaction::Ignored);
        assert_eq!(form.pick_date("lockedDay", "2024-01-01", &mut host), Interaction::Ignored);
        assert!(host.updates.is_empty());
        assert!(host.dispatched.is_empty());
        assert!(host.errors.is_empty());
    }

    #[test]
    fn test_reset_reachable_when_allowed() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = RecordingHost::default();

        assert_eq!(form.reset_date("lockedDay", &mut host), Interaction::Applied);
        assert_eq!(host.filter.text("lockedDay"), "2024-05-20");
    }

    #[test]
    fn test_button_dispatches_event_type() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        form.press("search", &mut host);
        assert_eq!(host.dispatched, vec![Dispatch::new("search", EventPayload::id("search"))]);
        assert!(host.updates.is_empty());
    }

    #[test]
    fn test_label_is_inert() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.press("title", &mut host), Interaction::Ignored);
        assert_eq!(form.input_text("title", "x", &mut host), Interaction::Ignored);
    }

    #[test]
    fn test_start_date_bounded_by_end() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = host_with_defaults(&config);

        assert_eq!(form.pick_date("rangeStartDate", "2024-05-21", &mut host), Interaction::Rejected);
        assert_eq!(host.filter.text("rangeStartDate"), "2024-05-20");
        assert_eq!(host.errors.len(), 1);

        assert_eq!(form.pick_date("rangeStartDate", "20240501", &mut host), Interaction::Applied);
        assert_eq!(host.filter.text("rangeStartDate"), "2024-05-01");
        assert_eq!(host.dispatched.last().unwrap().event_type, names::DATE_CHANGE);

        assert_eq!(form.pick_date("rangeEndDate", "2024-04-30", &mut host), Interaction::Rejected);
        assert_eq!(form.pick_date("rangeEndDate", "2024-06-30", &mut host), Interaction::Applied);
        assert_eq!(
            form.date_bounds("rangeStartDate", &host.filter),
            (None, NaiveDate::from_ymd_opt(2024, 6, 30))
        );
    }

    #[test]
    fn test_period_formatting_is_atomic() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.pick_period("period", "2024-01-15", "2024-13-40", &mut host), Interaction::Applied);
        assert_eq!(
            host.filter.get("period"),
            Some(&FilterValue::Period(Period::new("2024-01-15", "")))
        );
        assert_eq!(host.dispatched.len(), 1);
    }

    #[test]
    fn test_period_start_after_end_rejected() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();

        assert_eq!(form.pick_period("period", "2024-02-01", "2024-01-01", &mut host), Interaction::Rejected);
        assert!(host.updates.is_empty());
    }

    #[test]
    fn test_paired_reset() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = host_with_defaults(&config);
        host.filter.set("rangeStartDate", "2024-01-01");
        host.filter.set("rangeEndDate", "2024-02-01");

        assert_eq!(form.reset_date("rangeEndDate", &mut host), Interaction::Applied);

        assert_eq!(host.filter.text("rangeStartDate"), "2024-05-20");
        assert_eq!(host.filter.text("rangeEndDate"), "2024-05-20");
        assert_eq!(host.updates.len(), 1);
        assert_eq!(host.dispatched.len(), 1);
        assert_eq!(host.dispatched[0].event_type, names::DATE_CHANGE);
    }

    #[test]
    fn test_period_reset() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = RecordingHost::default();

        form.reset_date("period", &mut host);
        assert_eq!(
            host.filter.get("period"),
            Some(&FilterValue::Period(Period::same("2024-05-20")))
        );
    }

    #[test]
    fn test_keyboard_text_entry() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();
        let mut state = SearchFormState::new();
        state.focus("carno");

        for c in "12가".chars() {
            form.handle_key(KeyEvent::from(KeyCode::Char(c)), &mut state, &mut host);
        }
        assert_eq!(state.buffer.as_deref(), Some("12가"));
        assert!(host.updates.is_empty());

        form.handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &mut host);
        assert_eq!(host.filter.text("carno"), "12가");
        assert!(!state.is_editing());
    }

    #[test]
    fn test_keyboard_period_end_side() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = host_with_defaults(&config);
        let mut state = SearchFormState::new();
        state.focus("period");

        form.handle_key(KeyEvent::from(KeyCode::Char('e')), &mut state, &mut host);
        assert_eq!(state.period_side, PeriodSide::End);

        // Start from the current end value and replace its day.
        for _ in 0..2 {
            form.handle_key(KeyEvent::from(KeyCode::Backspace), &mut state, &mut host);
        }
        for c in "31".chars() {
            form.handle_key(KeyEvent::from(KeyCode::Char(c)), &mut state, &mut host);
        }
        form.handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &mut host);

        assert_eq!(
            host.filter.get("period"),
            Some(&FilterValue::Period(Period::new("2024-05-20", "2024-05-31")))
        );
    }

    #[test]
    fn test_keyboard_cycles_select() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();
        let mut state = SearchFormState::new();
        state.focus("mgmtstatus");

        // An absent value reads as "", which is the first option.
        form.handle_key(KeyEvent::from(KeyCode::Right), &mut state, &mut host);
        assert_eq!(host.filter.text("mgmtstatus"), "운행");
        form.handle_key(KeyEvent::from(KeyCode::Right), &mut state, &mut host);
        assert_eq!(host.filter.text("mgmtstatus"), "");
        form.handle_key(KeyEvent::from(KeyCode::Left), &mut state, &mut host);
        assert_eq!(host.filter.text("mgmtstatus"), "운행");
        assert_eq!(host.dispatched.len(), 3);
    }

    #[test]
    fn test_keyboard_ctrl_r_resets_pair() {
        let config = vehicle_config();
        let clock = clock();
        let form = SearchForm::new(&config).with_clock(&clock);
        let mut host = RecordingHost::default();
        let mut state = SearchFormState::new();
        state.focus("rangeStartDate");

        form.handle_key(
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
            &mut state,
            &mut host,
        );
        assert_eq!(host.filter.text("rangeEndDate"), "2024-05-20");
        assert_eq!(host.dispatched.len(), 1);
    }

    #[test]
    fn test_tab_skips_labels() {
        let config = vehicle_config();
        let form = SearchForm::new(&config);
        let mut host = RecordingHost::default();
        let mut state = SearchFormState::new();

        let order = form.focus_order();
        assert!(!order.contains(&"title".to_string()));

        form.handle_key(KeyEvent::from(KeyCode::Tab), &mut state, &mut host);
        assert!(state.is_focused(&order[1]));
    }

    proptest! {
        #[test]
        fn test_over_length_always_rejected(extra in 1usize..20, attempts in 1usize..4) {
            let config = vehicle_config();
            let form = SearchForm::new(&config);
            let mut host = RecordingHost::default();
            host.filter.set("carno", "prev");
            let input = "9".repeat(5 + extra);

            for _ in 0..attempts {
                prop_assert_eq!(form.input_text("carno", &input, &mut host), Interaction::Rejected);
            }
            prop_assert_eq!(host.filter.text("carno"), "prev");
            prop_assert_eq!(host.errors.len(), attempts);
            prop_assert!(host.updates.is_empty());
        }
    }
}
