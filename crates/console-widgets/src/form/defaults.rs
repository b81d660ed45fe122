//! Initial filter state derived from a configuration.

use super::config::AreaConfiguration;
use super::dates::{today_for, Clock};
use super::descriptor::{FieldDescriptor, FieldKind};
use super::value::{FilterState, FilterValue, Period};

/// Default value a field starts with, if any.
pub fn default_for(field: &FieldDescriptor, clock: &dyn Clock) -> Option<FilterValue> {
    if let Some(ref value) = field.default_value {
        return Some(value.clone());
    }
    let kind = field.kind;
    if kind.is_period() {
        return Some(FilterValue::Period(Period::same(today_for(kind, clock))));
    }
    if kind.is_day() || kind.is_month() {
        return Some(FilterValue::Text(today_for(kind, clock)));
    }
    None
}

/// Fill absent keys of the search area with their defaults.
///
/// Existing keys are left untouched, so running this twice is the same as
/// running it once. Returns the number of keys inserted.
pub fn apply_defaults(config: &AreaConfiguration, state: &mut FilterState, clock: &dyn Clock) -> usize {
    let Some(area) = config.search_area() else {
        return 0;
    };

    let mut inserted = 0;
    for field in &area.fields {
        if field.kind == FieldKind::Label {
            continue;
        }
        if let Some(value) = default_for(field, clock) {
            if state.set_if_absent(&field.id, value) {
                inserted += 1;
            }
        }
    }
    tracing::debug!(inserted, "applied filter defaults");
    inserted
}

/// Fresh filter state for a configuration.
pub fn initial_state(config: &AreaConfiguration, clock: &dyn Clock) -> FilterState {
    let mut state = FilterState::new();
    apply_defaults(config, &mut state, clock);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::config::Area;
    use crate::form::dates::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    fn config() -> AreaConfiguration {
        AreaConfiguration::new(vec![
            Area::search(vec![
                FieldDescriptor::new("carno", FieldKind::Text),
                FieldDescriptor::new("mgmtstatus", FieldKind::Select)
                    .option("", "전체")
                    .default_value(""),
                FieldDescriptor::new("rangeStartDate", FieldKind::Startday),
                FieldDescriptor::new("baseMonth", FieldKind::Month),
                FieldDescriptor::new("period", FieldKind::Dayperiod),
                FieldDescriptor::new("contract", FieldKind::Monthperiod),
                FieldDescriptor::new("fixed", FieldKind::Day).default_value("2020-01-01"),
            ]),
            Area::buttons(vec![FieldDescriptor::new("search", FieldKind::Button)
                .event_type("search")
                .default_value("ignored")]),
        ])
    }

    #[test]
    fn test_defaults_by_kind() {
        let state = initial_state(&config(), &clock());

        assert!(!state.contains("carno"));
        assert_eq!(state.text("mgmtstatus"), "");
        assert!(state.contains("mgmtstatus"));
        assert_eq!(state.text("rangeStartDate"), "2024-05-20");
        assert_eq!(state.text("baseMonth"), "2024-05");
        assert_eq!(
            state.get("period"),
            Some(&FilterValue::Period(Period::same("2024-05-20")))
        );
        assert_eq!(
            state.get("contract"),
            Some(&FilterValue::Period(Period::same("2024-05")))
        );
        assert_eq!(state.text("fixed"), "2020-01-01");
        assert!(!state.contains("search"));
    }

    #[test]
    fn test_merge_does_not_override() {
        let config = config();
        let mut state = FilterState::new();
        state.set("rangeStartDate", "2023-12-01");
        state.set("mgmtstatus", "운행");

        apply_defaults(&config, &mut state, &clock());
        assert_eq!(state.text("rangeStartDate"), "2023-12-01");
        assert_eq!(state.text("mgmtstatus"), "운행");

        let snapshot = state.clone();
        let inserted = apply_defaults(&config, &mut state, &clock());
        assert_eq!(inserted, 0);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_no_search_area() {
        let config = AreaConfiguration::default();
        let mut state = FilterState::new();
        assert_eq!(apply_defaults(&config, &mut state, &clock()), 0);
        assert!(state.is_empty());
    }
}
