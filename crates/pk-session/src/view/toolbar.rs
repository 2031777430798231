// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Desktop toolbar and mobile bottom bar

use ratatui::{prelude::*, widgets::*};

use crate::view::Theme;
use crate::view_model::presenter::{CounterChip, Surface, TimerIndicator, ToolbarViewModel};

fn timer_span(model: &ToolbarViewModel, theme: &Theme) -> Span<'static> {
    let (icon, color) = match model.timer {
        TimerIndicator::Running => ("▶", theme.accent),
        TimerIndicator::Paused => ("⏸", theme.warning),
        TimerIndicator::Stopped => ("■", theme.muted),
    };
    let text = if model.reset_confirm {
        format!("{} {} reset?", icon, model.timer_text)
    } else {
        format!("{} {}", icon, model.timer_text)
    };
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn counter_span(chip: &CounterChip, theme: &Theme) -> Span<'static> {
    let style = if chip.active {
        Style::default().fg(theme.bg).bg(theme.primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    Span::styled(format!(" {} {} ", chip.name, chip.value), style)
}

/// Single line: page, zoom, every counter, timer
pub fn render_desktop_toolbar(frame: &mut Frame<'_>, area: Rect, model: &ToolbarViewModel, theme: &Theme) {
    let separator = Span::styled(" │ ", Style::default().fg(theme.border));
    let mut spans = Vec::new();

    if model.can_go_back {
        spans.push(Span::styled("← ", Style::default().fg(theme.muted)));
    }
    if let Some((page, count)) = model.page {
        spans.push(Span::styled(
            format!("Page {}/{}", page, count),
            Style::default().fg(theme.text),
        ));
        if let Some(zoom) = model.zoom_label.as_ref() {
            spans.push(separator.clone());
            spans.push(Span::styled(zoom.clone(), Style::default().fg(theme.muted)));
        }
        spans.push(separator.clone());
    }
    for chip in &model.counters {
        spans.push(counter_span(chip, theme));
    }
    if !model.counters.is_empty() {
        spans.push(separator.clone());
    }
    if model.page.is_some() {
        spans.push(timer_span(model, theme));
    }
    if model.sync_warning {
        spans.push(separator);
        spans.push(Span::styled("⚠ unsaved", Style::default().fg(theme.warning)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface));
    frame.render_widget(paragraph, area);
}

/// Two lines: page and timer, then the active counter with its neighbours
pub fn render_mobile_bar(frame: &mut Frame<'_>, area: Rect, surface: &Surface, theme: &Theme) {
    let Some(model) = surface.model.as_ref() else {
        return;
    };
    let mut top = Vec::new();
    if let Some((page, count)) = model.page {
        top.push(Span::styled(
            format!("◀ {}/{} ▶  ", page, count),
            Style::default().fg(theme.text),
        ));
        top.push(timer_span(model, theme));
    }
    if model.sync_warning {
        top.push(Span::styled("  ⚠", Style::default().fg(theme.warning)));
    }

    let focus = surface
        .scrolled_counter
        .and_then(|id| model.counters.iter().position(|c| c.id == id))
        .unwrap_or(0);
    let start = focus.saturating_sub(1);
    let bottom: Vec<Span> = model
        .counters
        .iter()
        .skip(start)
        .take(3)
        .map(|chip| counter_span(chip, theme))
        .collect();

    let paragraph = Paragraph::new(vec![Line::from(top), Line::from(bottom).alignment(Alignment::Center)])
        .style(Style::default().bg(theme.surface));
    frame.render_widget(paragraph, area);
}
