// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! What is on screen, the in-app back stack and the browser history

use pk_domain_types::{PatternRef, ProjectId, SessionView, Tab};
use tracing::debug;

use crate::context::SessionContext;
use crate::history::NavigationType;
use crate::storage::{keys, read_pattern_marker};

/// An unresolved navigation request
///
/// Pattern and project targets still need a backend lookup before they can
/// become a [`SessionView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Tab(Tab),
    Pattern(PatternRef),
    Project(ProjectId),
    SettingsSection(String),
}

impl From<&SessionView> for NavTarget {
    fn from(view: &SessionView) -> Self {
        match view {
            SessionView::Tab(tab) => NavTarget::Tab(*tab),
            SessionView::Pattern { id, .. } => NavTarget::Pattern(PatternRef::Id(*id)),
            SessionView::Project(id) => NavTarget::Project(*id),
            SessionView::SettingsSection(section) => NavTarget::SettingsSection(section.clone()),
        }
    }
}

/// Parse a URL fragment such as `#pattern/lace-shawl` or `settings/backup`
pub fn parse_fragment(fragment: &str) -> Option<NavTarget> {
    let fragment = fragment.trim().trim_start_matches('#');
    if fragment.is_empty() {
        return None;
    }
    match fragment.split_once('/') {
        Some(("pattern", rest)) => PatternRef::parse(rest).map(NavTarget::Pattern),
        Some(("project", rest)) => rest.trim().parse().ok().map(NavTarget::Project),
        Some(("settings", rest)) if !rest.trim().is_empty() => {
            Some(NavTarget::SettingsSection(rest.trim().to_string()))
        }
        Some(("settings", _)) => Some(NavTarget::Tab(Tab::Settings)),
        Some(_) => None,
        None => fragment.parse().ok().map(NavTarget::Tab),
    }
}

/// Where a transition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    User,
    /// In-app back action; the back stack was already popped
    Back,
    /// Browser back/forward; history already moved
    PopState,
}

#[derive(Debug)]
pub struct NavigationRouter {
    current: SessionView,
    back_stack: Vec<SessionView>,
    /// Set by [`Self::go_back`] and [`Self::begin_pop_state`], consumed by the
    /// next [`Self::switch_to_view`]
    pending_origin: Option<TransitionOrigin>,
}

impl NavigationRouter {
    pub fn new(initial: SessionView) -> Self {
        Self {
            current: initial,
            back_stack: Vec::new(),
            pending_origin: None,
        }
    }

    pub fn current(&self) -> &SessionView {
        &self.current
    }

    pub fn back_stack(&self) -> &[SessionView] {
        &self.back_stack
    }

    pub fn depth(&self) -> usize {
        self.back_stack.len()
    }

    pub fn pending_origin(&self) -> Option<TransitionOrigin> {
        self.pending_origin
    }

    /// Candidate targets for the first view, most specific first
    ///
    /// The default tab always closes the list.
    pub fn initial_candidates(ctx: &SessionContext) -> Vec<NavTarget> {
        let mut candidates = Vec::new();
        let fragment = ctx.history.current_fragment();

        if let Some(fragment) = fragment.as_deref().filter(|f| !f.trim_start_matches('#').is_empty()) {
            candidates.extend(parse_fragment(fragment));
        } else if ctx.history.navigation_type() == NavigationType::Reload {
            if let Some(id) = read_pattern_marker(ctx.session_store.as_ref(), keys::VIEWING_PATTERN_ID) {
                candidates.push(NavTarget::Pattern(PatternRef::Id(id)));
            }
            if let Some(tab) = ctx
                .session_store
                .get(keys::ACTIVE_TAB)
                .and_then(|raw| raw.parse::<Tab>().ok())
            {
                candidates.push(NavTarget::Tab(tab));
            }
        }
        candidates.push(NavTarget::Tab(ctx.default_tab()));
        candidates
    }

    /// Install the first view without touching the back stack
    pub fn set_initial(&mut self, view: SessionView, ctx: &mut SessionContext) {
        ctx.history.replace_state(&view.fragment());
        ctx.remember(keys::ACTIVE_TAB, &view.owning_tab().to_string());
        debug!(view = %view.fragment(), "initial view");
        self.current = view;
        self.back_stack.clear();
        self.pending_origin = None;
    }

    /// Make `view` current; returns false when it already was
    ///
    /// The outgoing view is pushed onto the back stack unless it belongs to
    /// the same family as the target. User transitions push a browser history
    /// entry when `push_history` is set and replace the current one otherwise.
    pub fn switch_to_view(&mut self, view: SessionView, push_history: bool, ctx: &mut SessionContext) -> bool {
        let origin = self.pending_origin.take().unwrap_or(TransitionOrigin::User);
        if view == self.current {
            return false;
        }
        let outgoing = std::mem::replace(&mut self.current, view);
        let fragment = self.current.fragment();

        match origin {
            TransitionOrigin::User => {
                if !outgoing.same_family(&self.current) {
                    self.back_stack.push(outgoing);
                }
                if push_history {
                    ctx.history.push_state(&fragment);
                } else {
                    ctx.history.replace_state(&fragment);
                }
            }
            TransitionOrigin::Back => ctx.history.replace_state(&fragment),
            TransitionOrigin::PopState => {
                if self.back_stack.last() == Some(&self.current) {
                    self.back_stack.pop();
                } else if !outgoing.same_family(&self.current) {
                    self.back_stack.push(outgoing);
                }
            }
        }

        ctx.remember(keys::ACTIVE_TAB, &self.current.owning_tab().to_string());
        debug!(view = %fragment, ?origin, depth = self.back_stack.len(), "switched view");
        true
    }

    /// Pop the back stack, falling back to the default tab
    pub fn go_back(&mut self, ctx: &SessionContext) -> SessionView {
        self.pending_origin = Some(TransitionOrigin::Back);
        self.back_stack
            .pop()
            .unwrap_or_else(|| SessionView::Tab(ctx.default_tab()))
    }

    /// Browser back/forward delivered `fragment`
    pub fn begin_pop_state(&mut self, fragment: &str, ctx: &SessionContext) -> NavTarget {
        self.pending_origin = Some(TransitionOrigin::PopState);
        parse_fragment(fragment).unwrap_or_else(|| NavTarget::Tab(ctx.default_tab()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_parse_to_targets() {
        assert_eq!(
            parse_fragment("#pattern/lace-shawl"),
            Some(NavTarget::Pattern(PatternRef::Slug("lace-shawl".to_string())))
        );
        assert_eq!(
            parse_fragment("pattern/42"),
            Some(NavTarget::Pattern(PatternRef::Id(42)))
        );
        assert_eq!(parse_fragment("#project/3"), Some(NavTarget::Project(3)));
        assert_eq!(
            parse_fragment("#settings/shortcuts"),
            Some(NavTarget::SettingsSection("shortcuts".to_string()))
        );
        assert_eq!(parse_fragment("#settings"), Some(NavTarget::Tab(Tab::Settings)));
        assert_eq!(parse_fragment("#library"), Some(NavTarget::Tab(Tab::Library)));
        assert_eq!(parse_fragment("#project/abc"), None);
        assert_eq!(parse_fragment("#nowhere"), None);
        assert_eq!(parse_fragment("#"), None);
    }

    #[test]
    fn view_converts_back_to_target() {
        let view = SessionView::Pattern {
            id: 42,
            slug: "hat".to_string(),
        };
        assert_eq!(NavTarget::from(&view), NavTarget::Pattern(PatternRef::Id(42)));
    }
}
