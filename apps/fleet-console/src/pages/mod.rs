//! Page controllers.
//!
//! Each page owns its form configuration, filter state, table and loading
//! flag. The widgets report changes back through [`FormCore`] and table
//! responses; the page decides what to do with them.

pub mod activities;
pub mod login;
pub mod permissions;
pub mod rentals;
pub mod vehicles;

use console_widgets::{
    initial_state, AreaConfiguration, Clock, Column, Dispatch, EventPayload, FilterPatch,
    FilterState, FormHost, Notifier, PopupLevel, ScreenEvent, SearchForm, SearchFormState,
    SearchFormView, TableOptions, TableResponse, TableSlot, TableView,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use serde_json::Value;
use std::sync::Arc;

use crate::api::{ApiClient, FetchOutcome, GENERIC_FAILURE_MESSAGE};
use crate::error::{ConsoleError, ConsoleResult};
use crate::fetch::{FetchResult, Fetcher, Owner, RequestId};
use crate::routes::Screen;
use crate::session::SessionContext;

/// Tag of search requests.
pub const SEARCH: &str = "search";

/// A popup a page asks the app to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: PopupLevel,
    pub text: String,
}

/// Filter state plus everything the form reported since the last drain.
#[derive(Debug, Default)]
pub struct FormCore {
    pub filter: FilterState,
    dispatched: Vec<Dispatch>,
    notices: Vec<Notice>,
}

impl FormCore {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    /// Decode the dispatched events into a screen's event enum.
    pub fn take_events<E: ScreenEvent>(&mut self) -> Vec<E> {
        self.dispatched
            .drain(..)
            .filter_map(|d| E::decode_or_log(&d.event_type, &d.payload))
            .collect()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Notifier for FormCore {
    fn error_msg_popup(&mut self, text: &str) {
        self.notices.push(Notice {
            level: PopupLevel::Error,
            text: text.to_string(),
        });
    }

    fn msg_popup(&mut self, text: &str) {
        self.notices.push(Notice {
            level: PopupLevel::Info,
            text: text.to_string(),
        });
    }
}

impl FormHost for FormCore {
    fn filter(&self) -> &FilterState {
        &self.filter
    }

    fn update(&mut self, patch: FilterPatch) {
        self.filter.apply(patch);
    }

    fn dispatch(&mut self, event_type: &str, payload: EventPayload) {
        self.dispatched.push(Dispatch::new(event_type, payload));
    }
}

/// What a page may touch while handling input or a completion.
pub struct PageContext<'a> {
    pub api: &'a Arc<ApiClient>,
    pub session: &'a mut SessionContext,
    pub fetcher: &'a mut Fetcher,
    pub clock: &'a dyn Clock,
    /// Screen to open once the call returns
    pub navigate: Option<Screen>,
}

impl<'a> PageContext<'a> {
    pub fn new(
        api: &'a Arc<ApiClient>,
        session: &'a mut SessionContext,
        fetcher: &'a mut Fetcher,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            api,
            session,
            fetcher,
            clock,
            navigate: None,
        }
    }

    /// POST `params` to `endpoint` in the background on behalf of `screen`.
    pub fn post(&mut self, screen: Screen, tag: &'static str, endpoint: &'static str, params: Value) -> RequestId {
        let api = Arc::clone(self.api);
        self.fetcher.spawn(Owner::Page(screen), tag, async move {
            api.fetch_data(endpoint, &params).await
        })
    }
}

pub trait Page {
    fn screen(&self) -> Screen;

    /// Called once when the page becomes current.
    fn mount(&mut self, _ctx: &mut PageContext<'_>) {}

    /// Called when another page replaces this one.
    fn unmount(&mut self, ctx: &mut PageContext<'_>);

    /// Returns whether the key was consumed.
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) -> bool;

    /// A request this page started has finished.
    fn on_fetch(&mut self, result: FetchResult, ctx: &mut PageContext<'_>);

    fn render(&mut self, frame: &mut Frame, area: Rect);

    fn take_notices(&mut self) -> Vec<Notice>;

    fn is_loading(&self) -> bool;
}

/// Build the controller for a screen.
pub fn create(screen: Screen, clock: &dyn Clock) -> ConsoleResult<Box<dyn Page>> {
    let page: Box<dyn Page> = match screen {
        Screen::Login => Box::new(login::LoginPage::new()),
        Screen::Vehicles => Box::new(vehicles::VehiclesPage::new(clock)?),
        Screen::Activities => Box::new(activities::ActivitiesPage::new(clock)?),
        Screen::Rentals => Box::new(rentals::RentalsPage::new(clock)?),
        Screen::Permissions => Box::new(permissions::PermissionsPage::new(clock)?),
    };
    Ok(page)
}

/// Which half of a search screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Form,
    Table,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Form => Self::Table,
            Self::Table => Self::Form,
        }
    }
}

/// Where a key ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRoute {
    /// Consumed by the form or the focus switch
    Form(bool),
    Table(TableResponse),
}

/// The parts every search screen shares: form, table and loading flag.
pub struct SearchScreen<R> {
    pub screen: Screen,
    pub config: AreaConfiguration,
    pub core: FormCore,
    pub form_state: SearchFormState,
    pub table: TableSlot<R>,
    pub focus: Focus,
    loading: bool,
    search_id: Option<RequestId>,
}

impl<R> SearchScreen<R> {
    pub fn new(screen: Screen, config: AreaConfiguration, clock: &dyn Clock) -> Self {
        let filter = initial_state(&config, clock);
        Self {
            screen,
            config,
            core: FormCore::new(filter),
            form_state: SearchFormState::new(),
            table: TableSlot::new(),
            focus: Focus::Form,
            loading: false,
            search_id: None,
        }
    }

    /// Create the table. It materializes on the first render.
    pub fn create_table(&mut self, columns: Vec<Column<R>>, options: TableOptions) {
        if let Err(error) = self.table.create(columns, Vec::new(), options) {
            tracing::warn!(screen = ?self.screen, %error, "table not created");
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Route a key to the focused half. F6 switches halves.
    pub fn route_key(&mut self, key: KeyEvent, clock: &dyn Clock) -> KeyRoute {
        if key.code == KeyCode::F(6) {
            self.focus = self.focus.toggle();
            return KeyRoute::Form(true);
        }
        match self.focus {
            Focus::Form => {
                let form = SearchForm::new(&self.config).with_clock(clock);
                KeyRoute::Form(form.handle_key(key, &mut self.form_state, &mut self.core))
            }
            Focus::Table => KeyRoute::Table(
                self.table
                    .instance_mut()
                    .map_or(TableResponse::Ignored, |t| t.handle_key(key)),
            ),
        }
    }

    /// Start a search unless one is already running.
    pub fn begin_search(&mut self, ctx: &mut PageContext<'_>, endpoint: &'static str, params: Value) -> bool {
        if self.loading {
            tracing::debug!(screen = ?self.screen, "search already running");
            return false;
        }
        tracing::info!(screen = ?self.screen, endpoint, "search");
        self.set_loading(true);
        self.search_id = Some(ctx.post(self.screen, SEARCH, endpoint, params));
        true
    }

    /// Resolve a finished request to its data, raising popups for failures.
    ///
    /// A search result always clears the loading flag. A result of an older
    /// search arriving while another runs is dropped.
    pub fn resolve(&mut self, result: FetchResult) -> Option<Value> {
        if result.tag == SEARCH {
            if matches!(self.search_id, Some(current) if current != result.id) {
                tracing::debug!(id = result.id, "stale search result dropped");
                return None;
            }
            self.search_id = None;
            self.set_loading(false);
        }
        match FetchOutcome::from_result(result.result) {
            FetchOutcome::Data(data) => Some(data),
            FetchOutcome::Business(message) => {
                self.core.error_msg_popup(&message);
                None
            }
            FetchOutcome::Failure(_) => {
                self.core.error_msg_popup(GENERIC_FAILURE_MESSAGE);
                None
            }
        }
    }

    /// Replace table rows, logging a missing table.
    pub fn show_rows(&mut self, rows: Vec<R>) {
        if let Err(error) = self.table.set_data(rows) {
            tracing::warn!(screen = ?self.screen, %error, "rows dropped");
        }
    }

    /// Decode failures count as transport failures.
    pub fn decode_failed(&mut self, error: &ConsoleError) {
        tracing::error!(screen = ?self.screen, %error, "unreadable rows");
        self.core.error_msg_popup(GENERIC_FAILURE_MESSAGE);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.config.set_enabled(SEARCH, !loading);
    }

    /// Abort in-flight requests and drop the table.
    pub fn unmount(&mut self, fetcher: &mut Fetcher) {
        fetcher.cancel(Owner::Page(self.screen));
        self.table.destroy();
        self.search_id = None;
        self.set_loading(false);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, title: &str) {
        let form = SearchForm::new(&self.config);
        let form_height = SearchFormView::height(&form) + 2;
        let [form_area, table_area] =
            Layout::vertical([Constraint::Length(form_height), Constraint::Min(3)]).areas(area);

        let border = |focused: bool| {
            if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }
        };

        let mut form_title = format!(" {title} ");
        if self.loading {
            form_title.push_str("(조회 중...) ");
        }
        let form_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border(self.focus == Focus::Form))
            .title(form_title);
        frame.render_stateful_widget(
            SearchFormView::new(&form, &self.core.filter).block(form_block),
            form_area,
            &mut self.form_state,
        );

        let table_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border(self.focus == Focus::Table));
        if let Some(table) = self.table.attach(table_area) {
            frame.render_stateful_widget(TableView::new().block(table_block), table_area, table);
        } else {
            frame.render_widget(table_block, table_area);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::ApiResponse;
    use crate::config::{ApiConfig, SessionConfig};
    use chrono::NaiveDate;
    use console_widgets::FixedClock;

    pub fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    /// Collaborators a page needs, owned by the test.
    pub struct Harness {
        pub api: Arc<ApiClient>,
        pub session: SessionContext,
        pub fetcher: Fetcher,
        pub clock: FixedClock,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                api: Arc::new(ApiClient::new(&ApiConfig::default()).unwrap()),
                session: SessionContext::new(&SessionConfig::default()),
                fetcher: Fetcher::new(),
                clock: clock(),
            }
        }

        pub fn ctx(&mut self) -> PageContext<'_> {
            PageContext::new(&self.api, &mut self.session, &mut self.fetcher, &self.clock)
        }
    }

    /// A completion as if the backend had answered.
    pub fn completion(id: RequestId, screen: Screen, tag: &'static str, result: ConsoleResult<ApiResponse>) -> FetchResult {
        FetchResult {
            id,
            owner: Owner::Page(screen),
            tag,
            result,
        }
    }

    pub fn data(value: Value) -> ConsoleResult<ApiResponse> {
        Ok(ApiResponse {
            success: true,
            code: Some("00".into()),
            data: Some(value),
            ..Default::default()
        })
    }

    pub fn business(message: &str) -> ConsoleResult<ApiResponse> {
        Ok(ApiResponse {
            success: false,
            err_msg: Some(message.into()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use console_testing::TestTerminal;
    use console_widgets::{Area, CellContent, FieldDescriptor, FieldKind};
    use serde_json::json;

    fn screen(clock: &dyn Clock) -> SearchScreen<String> {
        let config = AreaConfiguration::new(vec![
            Area::search(vec![FieldDescriptor::new("carno", FieldKind::Text).label("번호")]),
            Area::buttons(vec![FieldDescriptor::new(SEARCH, FieldKind::Button)
                .label("조회")
                .event_type(SEARCH)]),
        ]);
        let mut screen = SearchScreen::new(Screen::Vehicles, config, clock);
        screen.create_table(
            vec![Column::new("번호", |r: &String| CellContent::text(r.clone()))],
            TableOptions::default(),
        );
        screen
    }

    #[test]
    fn test_core_collects_events_and_notices() {
        #[derive(Debug, PartialEq)]
        enum Event {
            Search,
        }
        impl ScreenEvent for Event {
            fn decode(event_type: &str, _: &EventPayload) -> Option<Self> {
                (event_type == SEARCH).then_some(Self::Search)
            }
        }

        let mut core = FormCore::default();
        core.dispatch(SEARCH, EventPayload::id(SEARCH));
        core.dispatch("unknown", EventPayload::id("x"));
        core.error_msg_popup("bad");

        assert_eq!(core.take_events::<Event>(), vec![Event::Search]);
        assert!(core.take_events::<Event>().is_empty());
        assert_eq!(core.take_notices()[0].level, PopupLevel::Error);
        assert!(core.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_loading_refuses_second_search() {
        let mut harness = Harness::new();
        let mut screen = screen(&harness.clock);
        let mut ctx = harness.ctx();

        assert!(screen.begin_search(&mut ctx, "/nowhere", json!({})));
        assert!(screen.is_loading());
        assert!(!screen.config.field(SEARCH).unwrap().enabled);
        assert!(!screen.begin_search(&mut ctx, "/nowhere", json!({})));
        assert_eq!(ctx.fetcher.pending(Owner::Page(Screen::Vehicles)), 1);
        screen.unmount(ctx.fetcher);
    }

    #[test]
    fn test_every_outcome_clears_loading() {
        let harness = Harness::new();
        let outcomes = vec![
            data(json!([])),
            business("권한 없음"),
            Err(ConsoleError::Status {
                status: 500,
                body: String::new(),
            }),
        ];

        for (i, outcome) in outcomes.into_iter().enumerate() {
            let mut screen = screen(&harness.clock);
            screen.set_loading(true);
            let data = screen.resolve(completion(1, Screen::Vehicles, SEARCH, outcome));

            assert!(!screen.is_loading());
            assert!(screen.config.field(SEARCH).unwrap().enabled);
            assert_eq!(data.is_some(), i == 0);
            assert_eq!(screen.core.take_notices().len(), usize::from(i != 0));
        }
    }

    #[test]
    fn test_stale_search_result_is_dropped() {
        let harness = Harness::new();
        let mut screen = screen(&harness.clock);
        screen.set_loading(true);
        screen.search_id = Some(5);

        let stale = screen.resolve(completion(4, Screen::Vehicles, SEARCH, data(json!(["old"]))));
        assert!(stale.is_none());
        assert!(screen.is_loading());
        assert!(screen.core.take_notices().is_empty());

        let current = screen.resolve(completion(5, Screen::Vehicles, SEARCH, data(json!(["new"]))));
        assert_eq!(current, Some(json!(["new"])));
        assert!(!screen.is_loading());
    }

    #[test]
    fn test_failure_uses_generic_message() {
        let harness = Harness::new();
        let mut screen = screen(&harness.clock);
        screen.resolve(completion(
            1,
            Screen::Vehicles,
            SEARCH,
            Err(ConsoleError::InvalidState("boom".into())),
        ));
        assert_eq!(screen.core.take_notices()[0].text, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_f6_switches_focus() {
        let harness = Harness::new();
        let mut screen = screen(&harness.clock);

        assert_eq!(screen.route_key(KeyEvent::from(KeyCode::F(6)), &harness.clock), KeyRoute::Form(true));
        assert_eq!(screen.focus, Focus::Table);
        assert_eq!(
            screen.route_key(KeyEvent::from(KeyCode::Down), &harness.clock),
            KeyRoute::Table(TableResponse::Ignored)
        );
    }

    #[test]
    fn test_render_materializes_table() {
        let harness = Harness::new();
        let mut screen = screen(&harness.clock);
        screen.show_rows(vec!["12가3456".into()]);
        assert!(screen.table.is_pending());

        let mut terminal = TestTerminal::new(60, 12);
        terminal.draw(|frame| {
            let area = frame.area();
            screen.render(frame, area, "차량 관리");
        });

        assert!(screen.table.instance().is_some());
        terminal.assert_contains("차량 관리");
        terminal.assert_contains("12가3456");
    }
}
