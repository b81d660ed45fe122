//! UI rendering for the fleet console.

use chrono::Local;
use console_widgets::PopupView;
use std::fmt::Write;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::routes::{route_for, visible_routes};

const SIDEBAR_WIDTH: u16 = 22;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    if app.session.is_logged_in() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(chunks[1]);
        draw_menu(f, app, body[0]);
        app.page_mut().render(f, body[1]);
    } else {
        app.page_mut().render(f, chunks[1]);
    }

    draw_status_bar(f, app, chunks[2]);

    if let Some(popup) = app.popups.latest() {
        f.render_widget(PopupView::new(popup), f.area());
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let now = Local::now();
    let mut today = String::new();
    // Invalid configured formats fall back to ISO.
    if write!(today, "{}", now.format(&app.config.display.date_format)).is_err() {
        today = now.format("%Y-%m-%d").to_string();
    }
    let mut spans = vec![
        Span::styled(
            " 차량 운영 관리 ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", route_for(app.screen()).title)),
    ];
    if let Some(user) = app.session.user() {
        let who = if user.org_name.is_empty() {
            format!("| {} ({}) ", user.user_name, user.user_id)
        } else {
            format!("| {} ({}) · {} ", user.user_name, user.user_id, user.org_name)
        };
        spans.push(Span::styled(who, Style::default().fg(Color::Gray)));
    }
    spans.push(Span::styled(format!("| {today}"), Style::default().fg(Color::DarkGray)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_menu(f: &mut Frame, app: &App, area: Rect) {
    let current = app.screen();
    let items: Vec<ListItem> = visible_routes(&app.session)
        .into_iter()
        .map(|route| {
            let style = if route.screen == current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if route.screen == current { "▶ " } else { "  " };
            ListItem::new(format!("{marker}{}", route.title)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" 메뉴 "));
    f.render_widget(list, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hints = if !app.popups.is_empty() {
        " Enter/Esc:닫기"
    } else if app.session.is_logged_in() {
        " Tab:이동  Enter:확인  F6:표 전환  s:정렬  Ctrl+N/P:메뉴  Ctrl+L:로그아웃  Ctrl+Q:종료"
    } else {
        " Tab:이동  Enter:확인  Ctrl+Q:종료"
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if app.is_loading() {
        spans.push(Span::styled(
            "  ⏳ 처리 중",
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
