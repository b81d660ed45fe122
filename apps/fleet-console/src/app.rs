//! Application state and logic.

use console_widgets::{Clock, Notifier, PopupQueue, SystemClock};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;

use crate::api::{ApiClient, FetchOutcome};
use crate::config::Config;
use crate::error::ConsoleResult;
use crate::fetch::{FetchResult, Fetcher, Owner};
use crate::pages::{self, Page, PageContext};
use crate::routes::{route_for, visible_routes, Screen};
use crate::session::SessionContext;

/// Most popups kept at once.
const MAX_POPUPS: usize = 16;

pub struct App {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub session: SessionContext,
    pub fetcher: Fetcher,
    pub popups: PopupQueue,
    clock: Box<dyn Clock>,
    page: Box<dyn Page>,
    refreshing: bool,
    running: bool,
}

impl App {
    pub fn new(config: Config) -> ConsoleResult<Self> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> ConsoleResult<Self> {
        let api = Arc::new(ApiClient::new(&config.api)?);
        let session = SessionContext::new(&config.session);
        let popups = PopupQueue::new(MAX_POPUPS, config.display.popup_dismiss_secs);
        let page = pages::create(Screen::Login, clock.as_ref())?;
        tracing::info!(base_url = %api.base_url(), "console started");

        Ok(Self {
            config,
            api,
            session,
            fetcher: Fetcher::new(),
            popups,
            clock,
            page,
            refreshing: false,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn screen(&self) -> Screen {
        self.page.screen()
    }

    pub fn page_mut(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.page.is_loading() || self.refreshing
    }

    /// Run `f` against the current page, then apply what it asked for.
    fn with_page<R>(&mut self, f: impl FnOnce(&mut dyn Page, &mut PageContext<'_>) -> R) -> R {
        let mut ctx = PageContext::new(&self.api, &mut self.session, &mut self.fetcher, self.clock.as_ref());
        let result = f(self.page.as_mut(), &mut ctx);
        let navigate = ctx.navigate;

        self.collect_notices();
        if let Some(screen) = navigate {
            self.open(screen);
        }
        result
    }

    fn collect_notices(&mut self) {
        for notice in self.page.take_notices() {
            self.popups.push(notice.level, notice.text);
        }
    }

    /// Replace the current page. Returns false when the route is not allowed.
    pub fn open(&mut self, screen: Screen) -> bool {
        let route = route_for(screen);
        if !route.is_allowed(&self.session) {
            tracing::warn!(path = route.path, "route not allowed");
            self.popups.error_msg_popup("접근 권한이 없습니다.");
            return false;
        }
        if screen == self.page.screen() {
            return true;
        }

        let next = match pages::create(screen, self.clock.as_ref()) {
            Ok(page) => page,
            Err(error) => {
                tracing::error!(path = route.path, %error, "screen failed to build");
                self.popups.error_msg_popup("화면을 열 수 없습니다.");
                return false;
            }
        };

        {
            let mut ctx = PageContext::new(&self.api, &mut self.session, &mut self.fetcher, self.clock.as_ref());
            self.page.unmount(&mut ctx);
        }
        self.collect_notices();
        self.page = next;
        if screen != Screen::Login {
            self.session.set_current_menu(screen);
        }

        {
            let mut ctx = PageContext::new(&self.api, &mut self.session, &mut self.fetcher, self.clock.as_ref());
            self.page.mount(&mut ctx);
            if let Some(target) = ctx.navigate {
                tracing::warn!(?target, "navigation during mount ignored");
            }
        }
        self.collect_notices();
        tracing::info!(path = route.path, "screen opened");
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.session.touch();

        // Popups are modal.
        if !self.popups.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.popups.dismiss_latest();
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => {
                    self.running = false;
                    return;
                }
                KeyCode::Char('l') if self.session.is_logged_in() => {
                    self.logout();
                    return;
                }
                KeyCode::Char('n') if self.session.is_logged_in() => {
                    self.cycle_menu(1);
                    return;
                }
                KeyCode::Char('p') if self.session.is_logged_in() => {
                    self.cycle_menu(-1);
                    return;
                }
                _ => {}
            }
        }

        self.with_page(|page, ctx| page.handle_key(key, ctx));
    }

    fn cycle_menu(&mut self, delta: isize) {
        let routes = visible_routes(&self.session);
        if routes.is_empty() {
            return;
        }
        let len = routes.len() as isize;
        let next = match routes.iter().position(|r| r.screen == self.page.screen()) {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        self.open(routes[next].screen);
    }

    /// Housekeeping between frames: popups, idle expiry, token refresh and completions.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.popups.process_auto_dismiss();

        if self.session.is_expired_at(now) {
            tracing::info!("session idle timeout");
            self.end_session("장시간 사용하지 않아 로그아웃되었습니다.");
        } else if !self.refreshing && self.session.needs_refresh_at(now) {
            self.session.mark_refreshing(now);
            self.refreshing = true;
            let api = Arc::clone(&self.api);
            self.fetcher
                .spawn(Owner::Session, "refresh", async move { api.refresh_token().await });
        }

        for result in self.fetcher.drain() {
            self.on_fetch(result);
        }
    }

    fn on_fetch(&mut self, result: FetchResult) {
        match result.owner {
            Owner::Session => self.on_session_fetch(result),
            Owner::Page(screen) if screen == self.page.screen() => {
                self.with_page(|page, ctx| page.on_fetch(result, ctx));
            }
            Owner::Page(screen) => {
                tracing::debug!(?screen, id = result.id, "result for a closed screen dropped");
            }
        }
    }

    fn on_session_fetch(&mut self, result: FetchResult) {
        if result.tag != "refresh" {
            tracing::debug!(tag = result.tag, ok = result.result.is_ok(), "session request finished");
            return;
        }
        self.refreshing = false;
        if !self.session.is_logged_in() {
            return;
        }
        match FetchOutcome::from_result(result.result) {
            FetchOutcome::Data(data) => {
                if let Err(error) = self.session.apply_refresh(&data, &self.api) {
                    tracing::warn!(%error, "token refresh ignored");
                }
            }
            FetchOutcome::Business(_) => self.end_session("세션이 만료되었습니다. 다시 로그인하세요."),
            // Transient; the next interval retries.
            FetchOutcome::Failure(_) => {}
        }
    }

    /// Log out at the user's request.
    pub fn logout(&mut self) {
        let token = self.api.token();
        self.clear_session();
        // clear_session cancels session requests, so this goes out after it.
        if let Some(token) = token {
            let api = Arc::clone(&self.api);
            self.fetcher
                .spawn(Owner::Session, "logout", async move { api.logout(token).await });
        }
        self.popups.msg_popup("로그아웃되었습니다.");
    }

    fn end_session(&mut self, message: &str) {
        self.clear_session();
        self.popups.error_msg_popup(message);
    }

    fn clear_session(&mut self) {
        self.fetcher.cancel(Owner::Session);
        self.refreshing = false;
        self.session.logout(&self.api);
        self.open(Screen::Login);
    }
}
