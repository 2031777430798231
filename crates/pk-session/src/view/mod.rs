// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ratatui rendering of the session
//!
//! Pure functions from session state to widgets. Nothing here mutates the
//! session; the surfaces draw whatever the presenter last stored.

pub mod toolbar;

use pk_domain_types::{SessionView, Tab};
use ratatui::{prelude::*, widgets::*};
use strum::IntoEnumIterator;

use crate::settings::ShortcutAction;
use crate::view_model::presenter::{SurfaceKind, ToolbarViewModel};
use crate::view_model::Session;

pub use toolbar::{render_desktop_toolbar, render_mobile_bar};

/// Semantic colors of the terminal viewer
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(20, 20, 30),
            surface: Color::Rgb(30, 30, 45),
            text: Color::Rgb(205, 214, 244),
            muted: Color::Rgb(127, 132, 156),
            primary: Color::Rgb(137, 180, 250),
            accent: Color::Rgb(150, 190, 150),
            warning: Color::Rgb(250, 179, 135),
            error: Color::Rgb(225, 105, 110),
            border: Color::Rgb(69, 71, 90),
        }
    }
}

/// Which toolbars are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SurfaceSelection {
    Desktop,
    Mobile,
    #[default]
    Both,
}

impl SurfaceSelection {
    pub fn includes(&self, kind: SurfaceKind) -> bool {
        matches!(
            (self, kind),
            (SurfaceSelection::Both, _)
                | (SurfaceSelection::Desktop, SurfaceKind::Desktop)
                | (SurfaceSelection::Mobile, SurfaceKind::Mobile)
        )
    }
}

pub fn render_session(frame: &mut Frame<'_>, session: &Session, surfaces: SurfaceSelection, theme: &Theme) {
    let desktop_height = if surfaces.includes(SurfaceKind::Desktop) { 1 } else { 0 };
    let mobile_height = if surfaces.includes(SurfaceKind::Mobile) { 2 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Tabs
            Constraint::Length(desktop_height), // Desktop toolbar
            Constraint::Min(3),                 // Body
            Constraint::Length(1),              // Status line
            Constraint::Length(mobile_height),  // Mobile bottom bar
        ])
        .split(frame.area());

    frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

    let presenter = session.presenter();
    let Some(model) = presenter.desktop().model.as_ref() else {
        return;
    };

    render_tabs(frame, chunks[0], model, theme);
    if desktop_height > 0 {
        render_desktop_toolbar(frame, chunks[1], model, theme);
    }
    render_body(frame, chunks[2], session, model, theme);
    render_status(frame, chunks[3], session, model, theme);
    if mobile_height > 0 {
        render_mobile_bar(frame, chunks[4], presenter.mobile(), theme);
    }
}

fn render_tabs(frame: &mut Frame<'_>, area: Rect, model: &ToolbarViewModel, theme: &Theme) {
    let active = model.view.owning_tab();
    let titles: Vec<Line> = Tab::iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab)))
        .collect();
    let selected = Tab::iter().position(|tab| tab == active).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme.muted).bg(theme.surface))
        .highlight_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame<'_>, area: Rect, session: &Session, model: &ToolbarViewModel, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" {} ", model.title),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ));

    let lines: Vec<Line> = match (&model.view, model.page) {
        (SessionView::Pattern { .. }, Some((page, count))) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Page {} of {}", page, count),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::from(Span::styled(
                format!("Zoom {}", model.zoom_label.as_deref().unwrap_or("-")),
                Style::default().fg(theme.muted),
            ))
            .alignment(Alignment::Center),
        ],
        (SessionView::Project(_), _) => match session.open_project() {
            Some(project) if !project.pattern_ids.is_empty() => project
                .pattern_ids
                .iter()
                .map(|id| Line::from(format!("  • pattern {}", id)))
                .collect(),
            _ => vec![Line::from(Span::styled(
                "No patterns in this project",
                Style::default().fg(theme.muted),
            ))],
        },
        (SessionView::Tab(Tab::Settings), _) | (SessionView::SettingsSection(_), _) => {
            shortcut_lines(session, theme)
        }
        (SessionView::Tab(Tab::Current), _) => vec![Line::from(Span::styled(
            "No pattern open",
            Style::default().fg(theme.muted),
        ))],
        _ => vec![Line::from(Span::styled(
            "Open a pattern to start viewing",
            Style::default().fg(theme.muted),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn shortcut_lines(session: &Session, theme: &Theme) -> Vec<Line<'static>> {
    let shortcuts = &session.ctx().shortcuts;
    ShortcutAction::iter()
        .map(|action| {
            let keys = shortcuts
                .bindings(action)
                .iter()
                .map(|k| k.display())
                .collect::<Vec<_>>()
                .join("  ");
            Line::from(vec![
                Span::styled(format!("{:<20}", action.label()), Style::default().fg(theme.text)),
                Span::styled(keys, Style::default().fg(theme.primary)),
            ])
        })
        .collect()
}

fn render_status(frame: &mut Frame<'_>, area: Rect, session: &Session, model: &ToolbarViewModel, theme: &Theme) {
    let line = if let Some(hint) = model.capture_hint.as_ref() {
        Line::from(Span::styled(hint.clone(), Style::default().fg(theme.accent)))
    } else if let Some(error) = session.last_error() {
        Line::from(Span::styled(error.to_string(), Style::default().fg(theme.error)))
    } else if model.sync_warning {
        Line::from(Span::styled(
            "Some changes could not be saved",
            Style::default().fg(theme.warning),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}
