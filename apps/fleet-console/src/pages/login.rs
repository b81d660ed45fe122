//! Login screen.

use console_widgets::{
    Area, AreaConfiguration, EventPayload, FieldDescriptor, FieldKind, Notifier, ScreenEvent,
    SearchForm, SearchFormState, SearchFormView,
};
use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use std::sync::Arc;

use super::{FormCore, Notice, Page, PageContext};
use crate::api::{FetchOutcome, GENERIC_FAILURE_MESSAGE};
use crate::fetch::{FetchResult, Owner, RequestId};
use crate::routes::{landing, Screen};
use crate::session::LoginPayload;

const LOGIN: &str = "login";

fn form() -> AreaConfiguration {
    AreaConfiguration::new(vec![
        Area::search(vec![
            FieldDescriptor::new("userId", FieldKind::Text)
                .label("아이디")
                .max_length(50)
                .width(24),
            FieldDescriptor::new("password", FieldKind::Text)
                .label("비밀번호")
                .max_length(100)
                .width(24)
                .row(2)
                .secret(),
        ]),
        Area::buttons(vec![FieldDescriptor::new(LOGIN, FieldKind::Button)
            .label("로그인")
            .event_type(LOGIN)
            .row(3)]),
    ])
}

#[derive(Debug, Clone, PartialEq)]
enum LoginEvent {
    Submit,
}

impl ScreenEvent for LoginEvent {
    fn decode(event_type: &str, _payload: &EventPayload) -> Option<Self> {
        (event_type == LOGIN).then_some(Self::Submit)
    }
}

pub struct LoginPage {
    config: AreaConfiguration,
    core: FormCore,
    form_state: SearchFormState,
    pending: Option<RequestId>,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            config: form(),
            core: FormCore::default(),
            form_state: SearchFormState::new(),
            pending: None,
        }
    }

    fn submit(&mut self, ctx: &mut PageContext<'_>) {
        if self.pending.is_some() {
            return;
        }
        let user_id = self.core.filter.text("userId").trim().to_string();
        let password = self.core.filter.text("password").to_string();
        if user_id.is_empty() || password.is_empty() {
            self.core.error_msg_popup("아이디와 비밀번호를 입력하세요.");
            return;
        }

        tracing::info!(user = %user_id, "login requested");
        let api = Arc::clone(ctx.api);
        self.pending = Some(ctx.fetcher.spawn(Owner::Page(Screen::Login), LOGIN, async move {
            api.login(&user_id, &password).await
        }));
        self.config.set_enabled(LOGIN, false);
    }

    fn clear_password(&mut self) {
        self.core.filter.remove("password");
        self.form_state.cancel_edit();
    }
}

impl Page for LoginPage {
    fn screen(&self) -> Screen {
        Screen::Login
    }

    fn unmount(&mut self, ctx: &mut PageContext<'_>) {
        ctx.fetcher.cancel(Owner::Page(Screen::Login));
        self.pending = None;
        self.clear_password();
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PageContext<'_>) -> bool {
        let form = SearchForm::new(&self.config).with_clock(ctx.clock);
        let handled = form.handle_key(key, &mut self.form_state, &mut self.core);
        for event in self.core.take_events::<LoginEvent>() {
            match event {
                LoginEvent::Submit => self.submit(ctx),
            }
        }
        handled
    }

    fn on_fetch(&mut self, result: FetchResult, ctx: &mut PageContext<'_>) {
        self.pending = None;
        self.config.set_enabled(LOGIN, true);

        let data = match FetchOutcome::from_result(result.result) {
            FetchOutcome::Data(data) => data,
            FetchOutcome::Business(message) => {
                self.clear_password();
                self.core.error_msg_popup(&message);
                return;
            }
            FetchOutcome::Failure(_) => {
                self.core.error_msg_popup(GENERIC_FAILURE_MESSAGE);
                return;
            }
        };

        let payload: LoginPayload = match serde_json::from_value(data) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(%error, "unreadable login response");
                self.core.error_msg_popup(GENERIC_FAILURE_MESSAGE);
                return;
            }
        };

        ctx.session.establish(payload, ctx.api);
        self.clear_password();
        match landing(ctx.session) {
            Some(screen) => ctx.navigate = Some(screen),
            None => {
                ctx.session.logout(ctx.api);
                self.core.error_msg_popup("접근 가능한 메뉴가 없습니다.");
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let form = SearchForm::new(&self.config);
        let height = SearchFormView::height(&form) + 2;
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [center] = Layout::horizontal([Constraint::Length(48)])
            .flex(Flex::Center)
            .areas(row);

        let mut title = " 로그인 ".to_string();
        if self.pending.is_some() {
            title = " 로그인 중... ".to_string();
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title);
        frame.render_stateful_widget(
            SearchFormView::new(&form, &self.core.filter).block(block),
            center,
            &mut self.form_state,
        );
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.core.take_notices()
    }

    fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}
