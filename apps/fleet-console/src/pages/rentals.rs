//! Rental asset status.

use console_widgets::{
    names, AreaConfiguration, CellContent, Clock, Column, ColumnWidth, EventPayload, ScreenEvent,
    TableOptions, TableResponse,
};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::Frame;
use serde::Deserialize;
use serde_json::Value;

use super::{KeyRoute, Notice, Page, PageContext, SearchScreen, SEARCH};
use crate::api::decode_rows;
use crate::error::ConsoleResult;
use crate::fetch::FetchResult;
use crate::routes::{route_for, Screen};

const LIST_ENDPOINT: &str = "/rental/asset/list";

/// Filters the loaded rows instead of the request.
const KEYWORD: &str = "keyword";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalRow {
    pub asset_no: String,
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub lessee: String,
    #[serde(default)]
    pub contract_month: String,
    #[serde(default)]
    pub monthly_fee: Option<f64>,
    #[serde(default)]
    pub returned: bool,
}

fn columns() -> Vec<Column<RentalRow>> {
    vec![
        Column::new("자산번호", |r: &RentalRow| CellContent::text(r.asset_no.clone()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::new("자산명", |r: &RentalRow| CellContent::text(r.asset_name.clone())).sortable(true),
        Column::new("임차인", |r: &RentalRow| CellContent::text(r.lessee.clone()))
            .width(ColumnWidth::Percentage(20.0)),
        Column::new("계약월", |r: &RentalRow| CellContent::text(r.contract_month.clone()))
            .width(ColumnWidth::Fixed(9))
            .sortable(true),
        Column::new("월임대료", |r: &RentalRow| {
            r.monthly_fee.map_or(CellContent::Empty, CellContent::number)
        })
        .width(ColumnWidth::Fixed(10))
        .sortable(true)
        .filterable(false),
        Column::new("상태", |r: &RentalRow| {
            if r.returned {
                CellContent::badge("반납", Color::DarkGray)
            } else {
                CellContent::badge("임대중", Color::Blue)
            }
        })
        .width(ColumnWidth::Fixed(8)),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum RentalEvent {
    Search,
    KeywordChanged(String),
    ReturnedToggled(bool),
    MonthChanged,
}

impl ScreenEvent for RentalEvent {
    fn decode(event_type: &str, payload: &EventPayload) -> Option<Self> {
        match (event_type, payload.id.as_str()) {
            (SEARCH, _) => Some(Self::Search),
            ("keywordChange", KEYWORD) => Some(Self::KeywordChanged(payload.text().to_string())),
            (names::CHECKBOX_CHANGE, "includeReturned") => {
                Some(Self::ReturnedToggled(payload.checked.unwrap_or(false)))
            }
            (names::DATE_CHANGE, "contractMonth") => Some(Self::MonthChanged),
            _ => None,
        }
    }
}

pub struct RentalsPage {
    base: SearchScreen<RentalRow>,
}

impl RentalsPage {
    pub fn new(clock: &dyn Clock) -> ConsoleResult<Self> {
        let config = AreaConfiguration::from_json(include_str!("../../forms/rentals.json"))?;
        let mut base = SearchScreen::new(Screen::Rentals, config, clock);
        base.create_table(columns(), TableOptions::default().placeholder("조회된 자산이 없습니다"));
        Ok(Self { base })
    }

    /// Request parameters: the filter without the local keyword.
    fn search_params(&self) -> Value {
        let mut params = self.base.core.filter.to_params();
        if let Some(map) = params.as_object_mut() {
            map.remove(KEYWORD);
        }
        params
    }

    /// Keep the table filter in step with the keyword field.
    fn sync_keyword(&mut self) {
        let keyword = self.base.core.filter.text(KEYWORD).trim().to_lowercase();
        let Some(table) = self.base.table.instance_mut() else {
            return;
        };
        if table.filter().unwrap_or("") != keyword {
            table.set_filter(&keyword);
        }
    }

    fn on_event(&mut self, event: RentalEvent, ctx: &mut PageContext<'_>) {
        match event {
            RentalEvent::Search => {
                let params = self.search_params();
                self.base.begin_search(ctx, LIST_ENDPOINT, params);
            }
            RentalEvent::KeywordChanged(keyword) => {
                tracing::debug!(%keyword, "keyword changed");
                self.sync_keyword();
            }
            RentalEvent::ReturnedToggled(checked) => tracing::debug!(checked, "include returned"),
            RentalEvent::MonthChanged => {}
        }
    }
}

impl Page for RentalsPage {
    fn screen(&self) -> Screen {
        Screen::Rentals
    }

    fn unmount(&mut self, ctx: &mut PageContext<'_>) {
        self.base.unmount(ctx.fetcher);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) -> bool {
        let handled = match self.base.route_key(key, ctx.clock) {
            KeyRoute::Form(handled) => handled,
            KeyRoute::Table(response) => response != TableResponse::Ignored,
        };
        for event in self.base.core.take_events::<RentalEvent>() {
            self.on_event(event, ctx);
        }
        handled
    }

    fn on_fetch(&mut self, result: FetchResult, _ctx: &mut PageContext<'_>) {
        let Some(data) = self.base.resolve(result) else {
            return;
        };
        match decode_rows::<RentalRow>(data) {
            Ok(rows) => {
                tracing::info!(count = rows.len(), "rental assets loaded");
                self.base.show_rows(rows);
                self.sync_keyword();
            }
            Err(error) => self.base.decode_failed(&error),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.base.render(frame, area, route_for(Screen::Rentals).title);
        // A table built on this frame picks up a keyword typed before it existed.
        self.sync_keyword();
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.base.core.take_notices()
    }

    fn is_loading(&self) -> bool {
        self.base.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::*;
    use console_testing::{InputSequence, TestTerminal};
    use console_widgets::{FilterValue, Period};
    use serde_json::json;

    fn press(page: &mut RentalsPage, harness: &mut Harness, input: &InputSequence) {
        let mut ctx = harness.ctx();
        for key in input.key_events() {
            page.handle_key(key, &mut ctx);
        }
    }

    fn draw(page: &mut RentalsPage) -> TestTerminal {
        let mut terminal = TestTerminal::new(100, 14);
        terminal.draw(|frame| {
            let area = frame.area();
            page.render(frame, area);
        });
        terminal
    }

    fn loaded(harness: &mut Harness) -> RentalsPage {
        let mut page = RentalsPage::new(&harness.clock).unwrap();
        let rows = json!([
            {"assetNo": "R-001", "assetName": "지게차", "lessee": "한빛물류", "contractMonth": "2024-05", "monthlyFee": 1200000.0},
            {"assetNo": "R-002", "assetName": "굴착기", "lessee": "대한건설", "contractMonth": "2024-04", "returned": true}
        ]);
        page.on_fetch(completion(1, Screen::Rentals, SEARCH, data(rows)), &mut harness.ctx());
        draw(&mut page);
        page
    }

    #[test]
    fn test_defaults() {
        let harness = Harness::new();
        let page = RentalsPage::new(&harness.clock).unwrap();
        let filter = &page.base.core.filter;

        assert_eq!(
            filter.get("contractMonth"),
            Some(&FilterValue::Period(Period::same("2024-05")))
        );
        assert_eq!(filter.get("includeReturned"), Some(&FilterValue::Bool(false)));
    }

    #[test]
    fn test_checkbox_toggles_with_space() {
        let mut harness = Harness::new();
        let mut page = RentalsPage::new(&harness.clock).unwrap();

        press(&mut page, &mut harness, InputSequence::new().tab().space());
        assert!(page.base.core.filter.flag("includeReturned"));
        press(&mut page, &mut harness, InputSequence::new().space());
        assert!(!page.base.core.filter.flag("includeReturned"));
    }

    #[test]
    fn test_keyword_is_not_sent() {
        let harness = Harness::new();
        let mut page = RentalsPage::new(&harness.clock).unwrap();
        page.base.core.filter.set(KEYWORD, "지게");

        let params = page.search_params();
        assert!(params.get(KEYWORD).is_none());
        assert_eq!(params["includeReturned"], json!(false));
        assert_eq!(params["contractMonth"]["start"], "2024-05");
    }

    #[test]
    fn test_keyword_filters_loaded_rows() {
        let mut harness = Harness::new();
        let mut page = loaded(&mut harness);
        assert_eq!(page.base.table.instance().unwrap().row_count(), 2);

        // contractMonth -> includeReturned -> search -> keyword
        press(&mut page, &mut harness, InputSequence::new().tab().tab().tab().text("지게").enter());

        let table = page.base.table.instance().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get_row(0).unwrap().asset_no, "R-001");

        let terminal = draw(&mut page);
        terminal.assert_not_contains("굴착기");
    }

    #[test]
    fn test_keyword_before_first_render() {
        let mut harness = Harness::new();
        let mut page = RentalsPage::new(&harness.clock).unwrap();
        page.base.core.filter.set(KEYWORD, "대한");
        page.on_fetch(
            completion(1, Screen::Rentals, SEARCH, data(json!([
                {"assetNo": "R-001", "lessee": "한빛물류"},
                {"assetNo": "R-002", "lessee": "대한건설"}
            ]))),
            &mut harness.ctx(),
        );
        assert!(page.base.table.is_pending());

        draw(&mut page);
        let table = page.base.table.instance().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.filter(), Some("대한"));
    }
}
