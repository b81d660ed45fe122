//! Vehicle management screen.

use console_widgets::{
    default_for, names, AreaConfiguration, CellAction, CellActionKind, CellContent, Clock, Column,
    ColumnWidth, EventPayload, Notifier, ScreenEvent, TableOptions, TableResponse,
};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::Frame;
use serde::Deserialize;

use super::{KeyRoute, Notice, Page, PageContext, SearchScreen, SEARCH};
use crate::api::decode_rows;
use crate::error::ConsoleResult;
use crate::fetch::FetchResult;
use crate::routes::{route_for, Screen};

const LIST_ENDPOINT: &str = "/fleet/vehicle/list";

const DAY_PAIR: [&str; 2] = ["rangeStartDate", "rangeEndDate"];
const MONTH_PAIR: [&str; 2] = ["rangeStartMonth", "rangeEndMonth"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRow {
    pub carno: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub mgmtstatus: String,
    #[serde(default)]
    pub mileage: Option<f64>,
    #[serde(default)]
    pub reg_date: Option<String>,
    /// Checked in the selection column
    #[serde(skip)]
    pub selected: bool,
}

fn status_color(status: &str) -> Color {
    match status {
        "운행" => Color::Green,
        "정비" => Color::Yellow,
        "매각" => Color::DarkGray,
        _ => Color::White,
    }
}

fn columns() -> Vec<Column<VehicleRow>> {
    vec![
        Column::checkbox("선택", "select", |r: &VehicleRow| r.selected),
        Column::new("차량번호", |r: &VehicleRow| CellContent::text(r.carno.clone()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::new("모델", |r: &VehicleRow| CellContent::text(r.model.clone())).sortable(true),
        Column::new("상태", |r: &VehicleRow| {
            CellContent::badge(r.mgmtstatus.clone(), status_color(&r.mgmtstatus))
        })
        .width(ColumnWidth::Fixed(6))
        .sortable(true),
        Column::new("주행거리", |r: &VehicleRow| {
            r.mileage.map_or(CellContent::Empty, CellContent::number)
        })
        .width(ColumnWidth::Fixed(10))
        .sortable(true)
        .filterable(false),
        Column::new("등록일", |r: &VehicleRow| CellContent::opt_text(r.reg_date.as_deref()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::button("상세", "detail", "상세"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum VehicleEvent {
    Search,
    UnitChanged(String),
    StatusChanged(String),
    DateChanged,
}

impl ScreenEvent for VehicleEvent {
    fn decode(event_type: &str, payload: &EventPayload) -> Option<Self> {
        match (event_type, payload.id.as_str()) {
            (SEARCH, _) => Some(Self::Search),
            (names::RADIO_CHANGE, "searchUnit") => Some(Self::UnitChanged(payload.text().to_string())),
            (names::SELECT_CHANGE, "mgmtstatus") => Some(Self::StatusChanged(payload.text().to_string())),
            (names::DATE_CHANGE, _) => Some(Self::DateChanged),
            _ => None,
        }
    }
}

pub struct VehiclesPage {
    base: SearchScreen<VehicleRow>,
    rows: Vec<VehicleRow>,
}

impl VehiclesPage {
    pub fn new(clock: &dyn Clock) -> ConsoleResult<Self> {
        let config = AreaConfiguration::from_json(include_str!("../../forms/vehicles.json"))?;
        let mut base = SearchScreen::new(Screen::Vehicles, config, clock);
        base.create_table(columns(), TableOptions::default().placeholder("조회된 차량이 없습니다"));

        let mut page = Self {
            base,
            rows: Vec::new(),
        };
        let unit = page.base.core.filter.text("searchUnit").to_string();
        page.apply_unit(&unit, clock);
        Ok(page)
    }

    /// Enable the date pair matching `unit`, disable the other and drop its keys.
    fn apply_unit(&mut self, unit: &str, clock: &dyn Clock) {
        let (on, off) = if unit == "month" {
            (MONTH_PAIR, DAY_PAIR)
        } else {
            (DAY_PAIR, MONTH_PAIR)
        };

        for id in off {
            self.base.config.set_enabled(id, false);
            self.base.core.filter.remove(id);
        }
        for id in on {
            self.base.config.set_enabled(id, true);
            if let Some(value) = self.base.config.field(id).and_then(|f| default_for(f, clock)) {
                self.base.core.filter.set_if_absent(id, value);
            }
        }
        tracing::debug!(unit, "search unit applied");
    }

    fn search(&mut self, ctx: &mut PageContext<'_>) {
        let params = self.base.core.filter.to_params();
        self.base.begin_search(ctx, LIST_ENDPOINT, params);
    }

    fn on_event(&mut self, event: VehicleEvent, ctx: &mut PageContext<'_>) {
        match event {
            VehicleEvent::Search => self.search(ctx),
            VehicleEvent::UnitChanged(unit) => self.apply_unit(&unit, ctx.clock),
            VehicleEvent::StatusChanged(status) => tracing::debug!(%status, "status filter changed"),
            VehicleEvent::DateChanged => {}
        }
    }

    fn on_cell(&mut self, action: CellAction) {
        let Some(row) = self.rows.get_mut(action.row) else {
            tracing::warn!(row = action.row, "cell action for a missing row");
            return;
        };
        match (action.key.as_str(), action.kind) {
            ("select", CellActionKind::Toggle { checked }) => {
                row.selected = checked;
                self.base.show_rows(self.rows.clone());
            }
            ("detail", CellActionKind::Press) => {
                let mileage = row
                    .mileage
                    .map(|m| format!("{m:.0}km"))
                    .unwrap_or_else(|| "-".to_string());
                let text = format!(
                    "{} {}\n상태: {}  주행거리: {}  등록일: {}",
                    row.carno,
                    row.model,
                    row.mgmtstatus,
                    mileage,
                    row.reg_date.as_deref().unwrap_or("-")
                );
                self.base.core.msg_popup(&text);
            }
            (key, kind) => tracing::warn!(key, ?kind, "unknown cell action"),
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &VehicleRow> {
        self.rows.iter().filter(|r| r.selected)
    }
}

impl Page for VehiclesPage {
    fn screen(&self) -> Screen {
        Screen::Vehicles
    }

    fn unmount(&mut self, ctx: &mut PageContext<'_>) {
        self.base.unmount(ctx.fetcher);
        self.rows.clear();
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) -> bool {
        let handled = match self.base.route_key(key, ctx.clock) {
            KeyRoute::Form(handled) => handled,
            KeyRoute::Table(TableResponse::Action(action)) => {
                self.on_cell(action);
                true
            }
            KeyRoute::Table(response) => response == TableResponse::Handled,
        };
        for event in self.base.core.take_events::<VehicleEvent>() {
            self.on_event(event, ctx);
        }
        handled
    }

    fn on_fetch(&mut self, result: FetchResult, _ctx: &mut PageContext<'_>) {
        let Some(data) = self.base.resolve(result) else {
            return;
        };
        match decode_rows::<VehicleRow>(data) {
            Ok(rows) => {
                tracing::info!(count = rows.len(), "vehicles loaded");
                self.rows = rows;
                self.base.show_rows(self.rows.clone());
            }
            Err(error) => self.base.decode_failed(&error),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let selected = self.selected().count();
        let mut title = route_for(Screen::Vehicles).title.to_string();
        if selected > 0 {
            title.push_str(&format!(" (선택 {selected}건)"));
        }
        self.base.render(frame, area, &title);
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.base.core.take_notices()
    }

    fn is_loading(&self) -> bool {
        self.base.is_loading()
    }
}
