//! # console-widgets
//!
//! Configuration-driven UI components for the fleet console.
//!
//! Screens describe their search controls as data and hand them to these
//! widgets; the page controller stays the only owner of filter state and rows.
//!
//! ## Components
//!
//! - [`SearchForm`] / [`SearchFormView`] - Declarative search form with validation and named events
//! - [`TableSlot`] / [`TableView`] - Table lifecycle wrapper with filtering, sorting and cell widgets
//! - [`PopupQueue`] / [`PopupView`] - Error and message popups
//!
//! ## Architecture
//!
//! All widgets:
//! - Keep transient UI state (focus, cursor, edit buffer) in their own state struct
//! - Implement Ratatui's `StatefulWidget` trait
//! - Report changes to their owner instead of mutating the owner's data

mod form;
mod notification;
mod table;
mod text;

pub use form::{
    apply_defaults, default_for, focus_order, format_day, format_for, format_month,
    format_period, group_rows, initial_state, names, parse_day, parse_for, parse_month,
    today_for, validate_field, validators_for, Area, AreaConfiguration, AreaType, Clock,
    ConfigError, Dispatch, EventPayload, FieldDescriptor, FieldKind, FilterPatch, FilterState,
    FilterValue, FixedClock, FormHost, Interaction, Period, PeriodSide, RowGroup, ScreenEvent,
    SearchForm, SearchFormState, SearchFormView, SelectOption, SystemClock, Validator,
    DEFAULT_MAX_LENGTH,
};
pub use notification::{Notifier, Popup, PopupId, PopupLevel, PopupQueue, PopupView};
pub use table::{
    CellAction, CellActionKind, CellContent, CellWidget, Column, ColumnWidth, Created,
    SortDirection, TableError, TableInstance, TableOptions, TableResponse, TableSlot, TableState,
    TableView,
};
