// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The viewing session
//!
//! [`Session`] owns the [`SessionContext`] and every component, and is the
//! only place where an operation touches more than one of them: opening and
//! closing the viewer, routing dispatched input, firing due scheduler slots.
//! Every mutating entry point ends with a presenter refresh.

use pk_client_api::LibraryApi;
use pk_domain_types::{Pattern, PatternRef, Project, SessionView};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::context::SessionContext;
use crate::error::{SessionResult, ShortcutError};
use crate::scheduler::Slot;
use crate::settings::{ShortcutAction, MAX_BINDINGS_PER_ACTION};
use crate::storage::keys;
use crate::view_model::counters::CounterRegistry;
use crate::view_model::input::{Command, Dispatch, InputDispatcher, PinchPhase, RawInput};
use crate::view_model::navigation::{NavTarget, NavigationRouter};
use crate::view_model::presenter::{DualSurfacePresenter, ToolbarViewModel};
use crate::view_model::timer::{ResetStep, TimerController};
use crate::view_model::viewer::PatternViewer;

/// A navigation target after its backend lookup
#[derive(Debug, Clone)]
struct Resolved {
    view: SessionView,
    pattern: Option<Pattern>,
    project: Option<Project>,
}

impl Resolved {
    fn plain(view: SessionView) -> Self {
        Self {
            view,
            pattern: None,
            project: None,
        }
    }
}

pub struct Session {
    ctx: SessionContext,
    router: NavigationRouter,
    timer: TimerController,
    counters: CounterRegistry,
    viewer: Option<PatternViewer>,
    input: InputDispatcher,
    presenter: DualSurfacePresenter,
    open_project: Option<Project>,
    last_error: Option<String>,
    unloaded: bool,
}

impl Session {
    pub fn new(ctx: SessionContext) -> Self {
        let router = NavigationRouter::new(SessionView::Tab(ctx.default_tab()));
        let mut session = Self {
            ctx,
            router,
            timer: TimerController::new(),
            counters: CounterRegistry::new(),
            viewer: None,
            input: InputDispatcher::new(),
            presenter: DualSurfacePresenter::new(),
            open_project: None,
            last_error: None,
            unloaded: false,
        };
        session.refresh();
        session
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut SessionContext {
        &mut self.ctx
    }

    pub fn router(&self) -> &NavigationRouter {
        &self.router
    }

    pub fn current_view(&self) -> &SessionView {
        self.router.current()
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn counters(&self) -> &CounterRegistry {
        &self.counters
    }

    pub fn viewer(&self) -> Option<&PatternViewer> {
        self.viewer.as_ref()
    }

    pub fn presenter(&self) -> &DualSurfacePresenter {
        &self.presenter
    }

    pub fn input(&self) -> &InputDispatcher {
        &self.input
    }

    pub fn open_project(&self) -> Option<&Project> {
        self.open_project.as_ref()
    }

    /// Message of the last failed command, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.ctx.scheduler.next_deadline()
    }

    /// Pick the first view from the URL, the reload marker or the default tab
    pub async fn resolve_initial_view(&mut self) -> SessionView {
        for target in NavigationRouter::initial_candidates(&self.ctx) {
            if let Some(resolved) = self.resolve(target).await {
                self.router.set_initial(resolved.view.clone(), &mut self.ctx);
                self.enter(resolved).await;
                self.refresh();
                return self.router.current().clone();
            }
        }
        let fallback = SessionView::Tab(self.ctx.default_tab());
        self.router.set_initial(fallback.clone(), &mut self.ctx);
        self.refresh();
        fallback
    }

    /// Resolve `target` and show it, or the default tab if it does not exist
    ///
    /// The previous view stays current until the lookup finished.
    pub async fn navigate(&mut self, target: NavTarget) -> SessionView {
        let resolved = match self.resolve(target).await {
            Some(resolved) => resolved,
            None => Resolved::plain(SessionView::Tab(self.ctx.default_tab())),
        };
        if self.viewer.is_some() && self.router.current() != &resolved.view {
            self.close_viewer().await;
        }
        self.router.switch_to_view(resolved.view.clone(), true, &mut self.ctx);
        self.enter(resolved).await;
        self.refresh();
        self.router.current().clone()
    }

    pub async fn go_back(&mut self) -> SessionView {
        let target = self.router.go_back(&self.ctx);
        self.navigate(NavTarget::from(&target)).await
    }

    /// Browser back/forward landed on `fragment`
    pub async fn pop_state(&mut self, fragment: &str) -> SessionView {
        let target = self.router.begin_pop_state(fragment, &self.ctx);
        self.navigate(target).await
    }

    pub async fn handle_input(&mut self, input: RawInput) -> SessionResult<()> {
        let is_activity = input.is_activity();
        let viewer_open = self.viewer.is_some();
        let dispatch = self.input.dispatch(input, &mut self.ctx, viewer_open);
        // A toggle resumes an auto-paused timer itself.
        if is_activity && dispatch != Dispatch::Action(ShortcutAction::ToggleTimer) {
            self.timer.note_activity(&mut self.ctx);
        }
        match dispatch {
            Dispatch::Action(action) => return self.execute(action.into()).await,
            Dispatch::Pinch(phase) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    match phase {
                        PinchPhase::Start { distance } => viewer.pinch_start(&self.ctx, distance),
                        PinchPhase::Move { distance } => {
                            viewer.pinch_move(&mut self.ctx, distance);
                        }
                        PinchPhase::End => {
                            viewer.pinch_end(&mut self.ctx);
                        }
                    }
                }
            }
            Dispatch::Scroll { x, y } => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.scroll_to(&mut self.ctx, x, y);
                }
            }
            Dispatch::ScrollBy { dx, dy } => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.scroll_by(&mut self.ctx, dx, dy);
                }
            }
            Dispatch::Captured {
                action,
                key,
                stolen_from,
            } => {
                info!(%action, %key, ?stolen_from, "shortcut rebound");
            }
            Dispatch::CaptureCancelled | Dispatch::Ignored => {}
        }
        self.refresh();
        Ok(())
    }

    /// Apply one command to its owning component
    pub async fn execute(&mut self, command: Command) -> SessionResult<()> {
        debug!(?command, "executing command");
        let result = self.apply(command).await;
        match &result {
            Ok(()) => self.last_error = None,
            Err(err) => {
                warn!(error = %err, "command failed");
                self.last_error = Some(err.to_string());
            }
        }
        self.refresh();
        result
    }

    async fn apply(&mut self, command: Command) -> SessionResult<()> {
        let ctx = &mut self.ctx;
        match command {
            Command::PageNext => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.next_page(ctx);
                }
            }
            Command::PagePrev => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.prev_page(ctx);
                }
            }
            Command::GoToPage(page) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.go_to_page(ctx, page);
                }
            }
            Command::ZoomIn => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.zoom_in(ctx);
                }
            }
            Command::ZoomOut => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.zoom_out(ctx);
                }
            }
            Command::SetZoomMode(mode) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.set_zoom_mode(ctx, mode);
                }
            }
            Command::CounterIncrease => {
                self.counters.adjust_active(ctx, 1)?;
            }
            Command::CounterDecrease => {
                self.counters.adjust_active(ctx, -1)?;
            }
            Command::NextCounter => {
                self.counters.select_next();
            }
            Command::SelectCounter(id) => self.counters.select(id)?,
            Command::IncrementCounter(id) => {
                self.counters.increment(ctx, id)?;
            }
            Command::DecrementCounter(id) => {
                self.counters.decrement(ctx, id)?;
            }
            Command::ResetCounter(id) => self.counters.reset_value(ctx, id).await?,
            Command::AddCounter(name) => {
                self.counters.add(ctx, &name).await?;
            }
            Command::RenameCounter(id, name) => {
                self.counters.rename(ctx, id, &name).await?;
            }
            Command::RemoveCounter(id) => self.counters.remove(ctx, id).await?,
            Command::ToggleTimer => self.timer.toggle(ctx),
            Command::StartTimer => {
                self.timer.start(ctx);
            }
            Command::StopTimer => self.timer.stop(ctx, false),
            Command::ResetTimer => {
                if self.timer.request_reset(ctx) == ResetStep::Done {
                    self.flush().await;
                }
            }
            Command::ExitViewer => {
                if self.viewer.is_some() {
                    self.go_back().await;
                }
            }
            Command::GoBack => {
                self.go_back().await;
            }
            Command::Navigate(target) => {
                self.navigate(target).await;
            }
            Command::SetDefaultTab(tab) => {
                ctx.local.set(keys::DEFAULT_TAB, &tab.to_string())?;
            }
            Command::BeginShortcutCapture { action, slot } => {
                if slot >= MAX_BINDINGS_PER_ACTION {
                    return Err(ShortcutError::SlotOutOfRange {
                        slot,
                        max: MAX_BINDINGS_PER_ACTION,
                    }
                    .into());
                }
                self.input.begin_capture(action, slot);
            }
            Command::CancelShortcutCapture => {
                self.input.cancel_capture();
            }
            Command::UnbindShortcut { action, slot } => {
                if ctx.shortcuts.unbind(action, slot).is_some() {
                    ctx.save_shortcuts();
                }
            }
            Command::ResetShortcuts => {
                ctx.shortcuts.reset_all();
                ctx.save_shortcuts();
            }
            Command::SetMediaKeys(enabled) => {
                ctx.config.media_keys = enabled;
                if enabled && self.viewer.is_some() {
                    ctx.media.start();
                } else {
                    ctx.media.stop();
                }
            }
        }
        Ok(())
    }

    /// Fire every scheduler slot that is due, in deadline order
    pub async fn run_due(&mut self) {
        let now = Instant::now();
        while let Some(slot) = self.ctx.scheduler.pop_due(now) {
            match slot {
                Slot::TimerTick => self.timer.tick(&mut self.ctx),
                Slot::Inactivity => self.timer.inactivity_expired(&mut self.ctx),
                Slot::ResetConfirm => self.timer.reset_window_expired(),
                Slot::SaveDebounce | Slot::SyncRetry => self.flush().await,
            }
        }
        self.refresh();
    }

    /// Send queued writes now and fold server replies back into the counters
    pub async fn flush(&mut self) {
        let reports = self.ctx.flush_writes().await;
        for report in &reports {
            self.counters.reconcile(&self.ctx, report);
        }
    }

    /// The process is going away: beacon the timer, keep the view state
    pub async fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        self.unloaded = true;
        self.timer.stop(&mut self.ctx, true);
        if let Some(viewer) = self.viewer.as_ref() {
            viewer.save_view_state(&mut self.ctx);
        }
        self.input.cancel_capture();
        if self.ctx.sync.has_pending() {
            self.flush().await;
        }
        info!("session unloaded");
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    pub fn refresh(&mut self) {
        let model = ToolbarViewModel::build(
            &self.router,
            &self.timer,
            &self.counters,
            self.viewer.as_ref(),
            self.open_project.as_ref(),
            &self.ctx,
            self.input.capture_target(),
        );
        self.presenter.present(model);
    }

    async fn resolve(&mut self, target: NavTarget) -> Option<Resolved> {
        match target {
            NavTarget::Tab(tab) => Some(Resolved::plain(SessionView::Tab(tab))),
            NavTarget::SettingsSection(section) => {
                Some(Resolved::plain(SessionView::SettingsSection(section)))
            }
            NavTarget::Pattern(reference) => {
                let pattern = fetch_pattern(self.ctx.api.as_ref(), &reference).await?;
                Some(Resolved {
                    view: SessionView::Pattern {
                        id: pattern.id,
                        slug: pattern.slug.clone(),
                    },
                    pattern: Some(pattern),
                    project: None,
                })
            }
            NavTarget::Project(id) => match self.ctx.api.get_project(id).await {
                Ok(Some(project)) => Some(Resolved {
                    view: SessionView::Project(project.id),
                    pattern: None,
                    project: Some(project),
                }),
                Ok(None) => {
                    debug!(project_id = id, "project not found");
                    None
                }
                Err(err) => {
                    warn!(project_id = id, error = %err, "project lookup failed");
                    None
                }
            },
        }
    }

    async fn enter(&mut self, resolved: Resolved) {
        self.open_project = resolved.project;
        if let Some(pattern) = resolved.pattern {
            if self.viewer.is_none() {
                self.open_pattern(pattern).await;
            }
        }
    }

    async fn open_pattern(&mut self, pattern: Pattern) {
        info!(pattern_id = pattern.id, slug = %pattern.slug, "opening pattern");
        self.ctx.remember(keys::VIEWING_PATTERN_ID, &pattern.id.to_string());
        self.ctx.open_pattern = Some(pattern.clone());
        self.timer.attach(&pattern);

        if let Err(err) = self.counters.load(&mut self.ctx, pattern.id).await {
            warn!(pattern_id = pattern.id, error = %err, "failed to load counters");
            self.last_error = Some(err.to_string());
        }
        self.viewer = Some(PatternViewer::open(&mut self.ctx, &pattern));

        if self.ctx.config.media_keys {
            self.ctx.media.start();
        }
        if self.ctx.config.auto_timer {
            self.timer.start(&mut self.ctx);
        }
    }

    /// Stop the timer, keep the view state and flush what the pattern queued
    async fn close_viewer(&mut self) {
        let Some(viewer) = self.viewer.take() else {
            return;
        };
        let pattern_id = viewer.pattern_id();
        self.timer.stop(&mut self.ctx, false);
        viewer.close(&mut self.ctx);
        self.timer.detach(&mut self.ctx);
        self.counters.clear();
        self.ctx.open_pattern = None;
        self.ctx.forget(keys::VIEWING_PATTERN_ID);
        self.ctx.media.stop();
        if self.ctx.sync.has_pending() {
            self.ctx.flush_writes().await;
        }
        info!(pattern_id, "closed pattern");
    }
}

/// Numeric references are tried as an id, then as a slug
async fn fetch_pattern(api: &dyn LibraryApi, reference: &PatternRef) -> Option<Pattern> {
    let result = match reference {
        PatternRef::Id(id) => match api.get_pattern(*id).await {
            Ok(None) => api.get_pattern_by_slug(&id.to_string()).await,
            other => other,
        },
        PatternRef::Slug(slug) => api.get_pattern_by_slug(slug).await,
    };
    match result {
        Ok(Some(pattern)) => Some(pattern),
        Ok(None) => {
            debug!(%reference, "pattern not found");
            None
        }
        Err(err) => {
            warn!(%reference, error = %err, "pattern lookup failed");
            None
        }
    }
}
