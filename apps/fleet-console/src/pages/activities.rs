//! Standard activity lookup.

use console_widgets::{
    names, AreaConfiguration, CellContent, Clock, Column, ColumnWidth, EventPayload, FilterValue,
    Notifier, ScreenEvent, TableOptions, TableResponse,
};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;
use serde::Deserialize;

use super::{KeyRoute, Notice, Page, PageContext, SearchScreen, SEARCH};
use crate::api::decode_rows;
use crate::error::ConsoleResult;
use crate::fetch::FetchResult;
use crate::routes::{route_for, Screen};

const LIST_ENDPOINT: &str = "/activity/standard/list";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub activity_date: String,
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub carno: String,
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn columns() -> Vec<Column<ActivityRow>> {
    vec![
        Column::new("일자", |r: &ActivityRow| CellContent::text(r.activity_date.clone()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::new("유형", |r: &ActivityRow| CellContent::text(r.activity_type.clone()))
            .width(ColumnWidth::Fixed(8)),
        Column::new("차량번호", |r: &ActivityRow| CellContent::text(r.carno.clone()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::new("조직", |r: &ActivityRow| CellContent::text(r.org_name.clone()))
            .width(ColumnWidth::Percentage(20.0)),
        Column::new("내용", |r: &ActivityRow| CellContent::opt_text(r.description.as_deref())),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum ActivityEvent {
    Search,
    OrgPopup,
    TypeChanged(String),
    PeriodChanged,
}

impl ScreenEvent for ActivityEvent {
    fn decode(event_type: &str, payload: &EventPayload) -> Option<Self> {
        match (event_type, payload.id.as_str()) {
            (SEARCH, _) => Some(Self::Search),
            ("orgPopup", _) => Some(Self::OrgPopup),
            (names::SELECT_CHANGE, "activityType") => Some(Self::TypeChanged(payload.text().to_string())),
            (names::DATE_CHANGE, "period") => Some(Self::PeriodChanged),
            _ => None,
        }
    }
}

pub struct ActivitiesPage {
    base: SearchScreen<ActivityRow>,
}

impl ActivitiesPage {
    pub fn new(clock: &dyn Clock) -> ConsoleResult<Self> {
        let config = AreaConfiguration::from_json(include_str!("../../forms/activities.json"))?;
        let mut base = SearchScreen::new(Screen::Activities, config, clock);
        base.create_table(
            columns(),
            TableOptions::default()
                .placeholder("조회된 활동이 없습니다")
                .selectable(false),
        );
        Ok(Self { base })
    }

    fn on_event(&mut self, event: ActivityEvent, ctx: &mut PageContext<'_>) {
        match event {
            ActivityEvent::Search => {
                let params = self.base.core.filter.to_params();
                self.base.begin_search(ctx, LIST_ENDPOINT, params);
            }
            ActivityEvent::OrgPopup => {
                let org = self.base.core.filter.text("orgName");
                let text = if org.is_empty() {
                    "선택된 조직이 없습니다".to_string()
                } else {
                    format!("현재 조직: {org}")
                };
                self.base.core.msg_popup(&text);
            }
            ActivityEvent::TypeChanged(kind) => tracing::debug!(%kind, "activity type changed"),
            ActivityEvent::PeriodChanged => {}
        }
    }
}

impl Page for ActivitiesPage {
    fn screen(&self) -> Screen {
        Screen::Activities
    }

    /// Scope the lookup to the user's organization.
    fn mount(&mut self, ctx: &mut PageContext<'_>) {
        if let Some(user) = ctx.session.user() {
            if !user.org_name.is_empty() {
                self.base
                    .core
                    .filter
                    .set_if_absent("orgName", FilterValue::from(user.org_name.as_str()));
            }
        }
    }

    fn unmount(&mut self, ctx: &mut PageContext<'_>) {
        self.base.unmount(ctx.fetcher);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) -> bool {
        let handled = match self.base.route_key(key, ctx.clock) {
            KeyRoute::Form(handled) => handled,
            KeyRoute::Table(response) => response != TableResponse::Ignored,
        };
        for event in self.base.core.take_events::<ActivityEvent>() {
            self.on_event(event, ctx);
        }
        handled
    }

    fn on_fetch(&mut self, result: FetchResult, _ctx: &mut PageContext<'_>) {
        let Some(data) = self.base.resolve(result) else {
            return;
        };
        match decode_rows::<ActivityRow>(data) {
            Ok(rows) => {
                tracing::info!(count = rows.len(), "activities loaded");
                self.base.show_rows(rows);
            }
            Err(error) => self.base.decode_failed(&error),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.base.render(frame, area, route_for(Screen::Activities).title);
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
    use crate::session::LoginPayload;
    use console_testing::{InputSequence, TestTerminal};
    use console_widgets::{Period, PopupLevel};
    use crossterm::event::KeyCode;
    use serde_json::json;

    fn logged_in(harness: &mut Harness) {
        let payload: LoginPayload = serde_json::from_value(json!({
            "token": "t",
            "user": {"userId": "kim", "userName": "김철수", "orgName": "서울지점"},
            "permissions": [{"screenKey": "ACT001", "auth": "R"}]
        }))
        .unwrap();
        harness.session.establish(payload, &harness.api);
    }

    fn press(page: &mut ActivitiesPage, harness: &mut Harness, input: &InputSequence) {
        let mut ctx = harness.ctx();
        for key in input.key_events() {
            page.handle_key(key, &mut ctx);
        }
    }

    #[test]
    fn test_defaults_to_today_period() {
        let harness = Harness::new();
        let page = ActivitiesPage::new(&harness.clock).unwrap();
        assert_eq!(
            page.base.core.filter.get("period"),
            Some(&FilterValue::Period(Period::same("2024-05-20")))
        );
    }

    #[test]
    fn test_mount_scopes_to_user_org() {
        let mut harness = Harness::new();
        logged_in(&mut harness);
        let mut page = ActivitiesPage::new(&harness.clock).unwrap();
        page.mount(&mut harness.ctx());

        assert_eq!(page.base.core.filter.text("orgName"), "서울지점");
    }

    #[test]
    fn test_org_popup_shows_current_org() {
        let mut harness = Harness::new();
        logged_in(&mut harness);
        let mut page = ActivitiesPage::new(&harness.clock).unwrap();
        page.mount(&mut harness.ctx());

        // period -> activityType -> orgName
        press(&mut page, &mut harness, InputSequence::new().tab().tab().enter());

        let notices = page.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, PopupLevel::Info);
        assert_eq!(notices[0].text, "현재 조직: 서울지점");
    }

    #[test]
    fn test_period_start_edit() {
        let mut harness = Harness::new();
        let mut page = ActivitiesPage::new(&harness.clock).unwrap();

        press(
            &mut page,
            &mut harness,
            InputSequence::new().backspace().backspace().text("01").enter(),
        );

        assert_eq!(
            page.base.core.filter.get("period"),
            Some(&FilterValue::Period(Period::new("2024-05-01", "2024-05-20")))
        );
    }

    #[test]
    fn test_table_is_read_only() {
        let mut harness = Harness::new();
        let mut page = ActivitiesPage::new(&harness.clock).unwrap();
        let rows = json!({"list": [
            {"activityDate": "2024-05-02", "activityType": "점검", "carno": "12가3456", "orgName": "서울지점"}
        ]});
        page.on_fetch(completion(1, Screen::Activities, SEARCH, data(rows)), &mut harness.ctx());

        let mut terminal = TestTerminal::new(100, 14);
        terminal.draw(|frame| {
            let area = frame.area();
            page.render(frame, area);
        });
        terminal.assert_contains("12가3456");

        let mut ctx = harness.ctx();
        assert!(page.handle_key(KeyEvent::from(KeyCode::F(6)), &mut ctx));
        assert!(!page.handle_key(KeyEvent::from(KeyCode::Char(' ')), &mut ctx));
        assert!(page.handle_key(KeyEvent::from(KeyCode::Down), &mut ctx));
    }
}
