//! Organization permission management.

use console_widgets::{
    names, AreaConfiguration, CellAction, CellActionKind, CellContent, Clock, Column, ColumnWidth,
    EventPayload, Notifier, ScreenEvent, TableOptions, TableResponse,
};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{KeyRoute, Notice, Page, PageContext, SearchScreen, SEARCH};
use crate::api::{decode_rows, FetchOutcome, GENERIC_FAILURE_MESSAGE};
use crate::error::ConsoleResult;
use crate::fetch::{FetchResult, RequestId};
use crate::routes::{route_for, Screen};
use crate::session::WRITE;

const LIST_ENDPOINT: &str = "/auth/permission/list";
const SAVE_ENDPOINT: &str = "/auth/permission/save";

/// Button id and request tag of the save action.
const SAVE: &str = "save";

/// Screen key guarding this screen's writes.
const SCREEN_KEY: &str = "AUT001";

/// Select holding the screen whose grants are edited.
const SCREEN_SELECT: &str = "screenKey";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUser {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub granted: bool,
}

fn columns() -> Vec<Column<PermissionUser>> {
    vec![
        Column::checkbox("권한", "granted", |u: &PermissionUser| u.granted),
        Column::new("사용자ID", |u: &PermissionUser| CellContent::text(u.user_id.clone()))
            .width(ColumnWidth::Fixed(12))
            .sortable(true),
        Column::new("이름", |u: &PermissionUser| CellContent::text(u.user_name.clone()))
            .width(ColumnWidth::Fixed(10))
            .sortable(true),
        Column::new("조직", |u: &PermissionUser| CellContent::text(u.org_name.clone())).sortable(true),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum PermissionEvent {
    Search,
    Save,
    ScreenChanged(String),
}

impl ScreenEvent for PermissionEvent {
    fn decode(event_type: &str, payload: &EventPayload) -> Option<Self> {
        match (event_type, payload.id.as_str()) {
            (SEARCH, _) => Some(Self::Search),
            (SAVE, _) => Some(Self::Save),
            (names::SELECT_CHANGE, "screenKey") => Some(Self::ScreenChanged(payload.text().to_string())),
            _ => None,
        }
    }
}

pub struct PermissionsPage {
    base: SearchScreen<PermissionUser>,
    users: Vec<PermissionUser>,
    /// Screen key of the running or last started search
    requested_key: String,
    /// Screen key `users` were loaded for
    loaded_key: Option<String>,
    /// Grants changed since the last load or save
    dirty: bool,
    saving: Option<RequestId>,
}

impl PermissionsPage {
    pub fn new(clock: &dyn Clock) -> ConsoleResult<Self> {
        let config = AreaConfiguration::from_json(include_str!("../../forms/permissions.json"))?;
        let mut base = SearchScreen::new(Screen::Permissions, config, clock);
        base.create_table(columns(), TableOptions::default().placeholder("사용자가 없습니다"));
        let requested_key = base.core.filter.text(SCREEN_SELECT).to_string();
        Ok(Self {
            base,
            users: Vec::new(),
            requested_key,
            loaded_key: None,
            dirty: false,
            saving: None,
        })
    }

    fn screen_key(&self) -> &str {
        self.base.core.filter.text(SCREEN_SELECT)
    }

    fn search(&mut self, ctx: &mut PageContext<'_>) {
        let key = self.screen_key().to_string();
        let params = json!({ "screenKey": key });
        if self.base.begin_search(ctx, LIST_ENDPOINT, params) {
            if self.dirty {
                tracing::info!("discarding unsaved permission changes");
            }
            self.requested_key = key;
        }
    }

    /// A screen change while a search runs is undone; the select shows the screen being loaded.
    fn change_screen(&mut self, key: String, ctx: &mut PageContext<'_>) {
        if self.base.is_loading() {
            tracing::debug!(%key, requested = %self.requested_key, "screen change refused while loading");
            self.base.core.filter.set(SCREEN_SELECT, self.requested_key.clone());
            self.base.core.msg_popup("조회 중에는 화면을 바꿀 수 없습니다.");
            return;
        }
        tracing::debug!(%key, "screen key changed");
        self.search(ctx);
    }

    /// Body of a save request: the screen the users were loaded for and every user's grant.
    fn save_body(&self) -> Value {
        json!({
            "screenKey": self.loaded_key.as_deref().unwrap_or_default(),
            "users": self.users,
        })
    }

    fn save(&mut self, ctx: &mut PageContext<'_>) {
        if !ctx.session.has_permission(WRITE, SCREEN_KEY) {
            self.base.core.error_msg_popup("저장 권한이 없습니다.");
            return;
        }
        if self.saving.is_some() {
            tracing::debug!("save already running");
            return;
        }
        if self.base.is_loading() {
            self.base.core.msg_popup("조회 중에는 저장할 수 없습니다.");
            return;
        }
        if self.loaded_key.as_deref() != Some(self.screen_key()) {
            self.base.core.error_msg_popup("선택한 화면의 사용자를 먼저 조회하세요.");
            return;
        }
        if self.users.is_empty() {
            self.base.core.msg_popup("저장할 사용자가 없습니다.");
            return;
        }
        let body = self.save_body();
        tracing::info!(screen_key = ?self.loaded_key, users = self.users.len(), "saving permissions");
        self.saving = Some(ctx.post(Screen::Permissions, SAVE, SAVE_ENDPOINT, body));
        self.base.config.set_enabled(SAVE, false);
    }

    fn on_event(&mut self, event: PermissionEvent, ctx: &mut PageContext<'_>) {
        match event {
            PermissionEvent::Search => self.search(ctx),
            PermissionEvent::Save => self.save(ctx),
            PermissionEvent::ScreenChanged(key) => self.change_screen(key, ctx),
        }
    }

    fn on_cell(&mut self, action: CellAction) {
        match (action.key.as_str(), action.kind) {
            ("granted", CellActionKind::Toggle { checked }) => {
                let Some(user) = self.users.get_mut(action.row) else {
                    return;
                };
                user.granted = checked;
                self.dirty = true;
                self.base.show_rows(self.users.clone());
            }
            (key, kind) => tracing::warn!(key, ?kind, "unknown cell action"),
        }
    }

    fn on_saved(&mut self, result: FetchResult, ctx: &PageContext<'_>) {
        self.saving = None;
        self.base
            .config
            .set_enabled(SAVE, ctx.session.has_permission(WRITE, SCREEN_KEY));
        match FetchOutcome::from_result(result.result) {
            FetchOutcome::Data(_) => {
                self.dirty = false;
                self.base.core.msg_popup("저장되었습니다.");
            }
            FetchOutcome::Business(message) => self.base.core.error_msg_popup(&message),
            FetchOutcome::Failure(_) => self.base.core.error_msg_popup(GENERIC_FAILURE_MESSAGE),
        }
    }
}

impl Page for PermissionsPage {
    fn screen(&self) -> Screen {
        Screen::Permissions
    }

    /// Lock the save button without write access and load the default screen.
    fn mount(&mut self, ctx: &mut PageContext<'_>) {
        let writable = ctx.session.has_permission(WRITE, SCREEN_KEY);
        self.base.config.set_enabled(SAVE, writable);
        self.search(ctx);
    }

    fn unmount(&mut self, ctx: &mut PageContext<'_>) {
        self.base.unmount(ctx.fetcher);
        self.saving = None;
        self.users.clear();
        self.loaded_key = None;
        self.dirty = false;
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
        for event in self.base.core.take_events::<PermissionEvent>() {
            self.on_event(event, ctx);
        }
        handled
    }

    fn on_fetch(&mut self, result: FetchResult, ctx: &mut PageContext<'_>) {
        if result.tag == SAVE {
            self.on_saved(result, ctx);
            return;
        }
        let Some(data) = self.base.resolve(result) else {
            return;
        };
        match decode_rows::<PermissionUser>(data) {
            Ok(users) => {
                tracing::info!(count = users.len(), "permission users loaded");
                self.users = users;
                self.loaded_key = Some(self.requested_key.clone());
                self.dirty = false;
                self.base.show_rows(self.users.clone());
            }
            Err(error) => self.base.decode_failed(&error),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut title = route_for(Screen::Permissions).title.to_string();
        if self.dirty {
            title.push_str(" *");
        }
        self.base.render(frame, area, &title);
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.base.core.take_notices()
    }

    fn is_loading(&self) -> bool {
        self.base.is_loading() || self.saving.is_some()
    }
}
