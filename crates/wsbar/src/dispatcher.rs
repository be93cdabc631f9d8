//! The event dispatcher: reacts to desktop-changed and window-hint events,
//! one at a time in arrival order, pulling fresh state from the query
//! facade and pushing the result through the render adapter. The workspace
//! model is owned here and only ever touched from inside a handler, so the
//! single-event-at-a-time loop is the whole concurrency story.

use crate::{
    desktop_query::{DesktopQueries, WindowHandle, WorkspaceEvent},
    model::Desktop,
    reconcile::reconcile,
    render::RenderTarget,
};
use anyhow::{ensure, Context, Result};

pub struct Dispatcher<Q, R> {
    desktop: Desktop,
    queries: Q,
    render: R,
    /// The visible list of the last successful pass, head = active.
    last_visible: Vec<usize>,
}

impl<Q: DesktopQueries, R: RenderTarget> Dispatcher<Q, R> {
    pub fn new(desktop: Desktop, queries: Q, render: R) -> Self {
        Self { desktop, queries, render, last_visible: Vec::new() }
    }

    /// Handle one event to completion. Query failures are logged and the
    /// pass is skipped, leaving the previous render state untouched.
    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        log::debug!("Handling workspace event: {:?}", event);
        let result = match event {
            WorkspaceEvent::DesktopChanged => self.on_desktop_changed(),
            WorkspaceEvent::WindowHint(window) => self.on_window_hint(window),
        };
        crate::print_result_err!("while handling workspace event", result);
    }

    fn on_desktop_changed(&mut self) -> Result<()> {
        let visible = self.queries.visible_workspaces().context("Failed to query visible workspaces")?;
        ensure!(!visible.is_empty(), "window manager reported an empty visible workspace list");
        let active = visible[0];
        ensure!(
            active < self.desktop.len(),
            "window manager reported active workspace {} but only {} workspaces are configured",
            active,
            self.desktop.len()
        );

        if self.last_visible.first() != Some(&active) {
            log::debug!("active workspace is now {} ({})", active, self.desktop.workspace(active).name());
        }
        // being switched into means the workspace is no longer urgent
        self.desktop.set_urgent(active, false);

        let windows = self.queries.window_records().context("Failed to query open windows")?;
        let title = self.queries.active_window_title().context("Failed to query active window title")?;
        let class = self.queries.active_window_class().context("Failed to query active window class")?;

        let classification = reconcile(&self.desktop, &visible, &windows, &title, &class)?;
        self.render.apply_classification(classification);
        self.last_visible = visible;
        Ok(())
    }

    fn on_window_hint(&mut self, window: WindowHandle) -> Result<()> {
        if !self.queries.window_urgent(window).with_context(|| format!("Failed to query urgency of window {}", window))? {
            return Ok(());
        }
        let owner =
            self.queries.window_workspace(window).with_context(|| format!("Failed to query workspace of window {}", window))?;
        let active = self.queries.current_workspace().context("Failed to query current workspace")?;
        if owner == active {
            // already focused, no need to flag
            return Ok(());
        }
        if owner >= self.desktop.len() {
            log::warn!("ignoring urgency hint for unknown workspace {} ({} workspaces configured)", owner, self.desktop.len());
            return Ok(());
        }
        self.desktop.set_urgent(owner, true);
        // strict overlay, no content change: skip the full reconciliation
        self.render.apply_urgent_overlay(self.desktop.workspace(owner).slot(), true);
        Ok(())
    }

    #[cfg(test)]
    fn desktop(&self) -> &Desktop {
        &self.desktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        desktop_query::WindowRecord,
        model::WidgetSlot,
        reconcile::{Classification, WorkspaceTag},
        render::RenderMsg,
    };
    use anyhow::{anyhow, bail};
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    /// Scriptable window-manager state standing in for a live X server.
    #[derive(Default)]
    struct WmState {
        visible: Vec<usize>,
        windows: Vec<WindowRecord>,
        active_title: String,
        active_class: String,
        urgent_windows: Vec<WindowHandle>,
        window_owners: Vec<(WindowHandle, usize)>,
        fail_queries: bool,
    }

    #[derive(Clone, Default)]
    struct MockQueries {
        state: Rc<RefCell<WmState>>,
    }

    impl DesktopQueries for MockQueries {
        fn workspace_names(&self) -> Result<Vec<String>> {
            Ok((0..4).map(|i| format!("W{}", i)).collect())
        }

        fn visible_workspaces(&self) -> Result<Vec<usize>> {
            let state = self.state.borrow();
            if state.fail_queries {
                bail!("window manager unreachable");
            }
            Ok(state.visible.clone())
        }

        fn windows(&self) -> Result<Vec<WindowHandle>> {
            Ok(self.state.borrow().window_owners.iter().map(|(w, _)| *w).collect())
        }

        fn window_records(&self) -> Result<Vec<WindowRecord>> {
            let state = self.state.borrow();
            if state.fail_queries {
                bail!("window manager unreachable");
            }
            Ok(state.windows.clone())
        }

        fn window_workspace(&self, window: WindowHandle) -> Result<usize> {
            self.state
                .borrow()
                .window_owners
                .iter()
                .find(|(w, _)| *w == window)
                .map(|(_, ws)| *ws)
                .ok_or_else(|| anyhow!("unknown window {}", window))
        }

        fn window_urgent(&self, window: WindowHandle) -> Result<bool> {
            Ok(self.state.borrow().urgent_windows.contains(&window))
        }

        fn current_workspace(&self) -> Result<usize> {
            self.visible_workspaces()?.first().copied().ok_or_else(|| anyhow!("no visible workspaces"))
        }

        fn active_window_title(&self) -> Result<String> {
            Ok(self.state.borrow().active_title.clone())
        }

        fn active_window_class(&self) -> Result<String> {
            Ok(self.state.borrow().active_class.clone())
        }

        fn switch_to_workspace(&self, workspace: usize) -> Result<()> {
            self.state.borrow_mut().visible = vec![workspace];
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRender {
        log: Rc<RefCell<Vec<RenderMsg>>>,
    }

    impl RenderTarget for RecordingRender {
        fn apply_classification(&self, classification: Classification) {
            self.log.borrow_mut().push(RenderMsg::Classification(classification));
        }

        fn apply_urgent_overlay(&self, slot: WidgetSlot, urgent: bool) {
            self.log.borrow_mut().push(RenderMsg::UrgentOverlay(slot, urgent));
        }
    }

    fn record(workspace: usize, title: &str, class: &str) -> WindowRecord {
        WindowRecord { workspace, title: title.to_string(), class: class.to_string() }
    }

    fn dispatcher(state: WmState) -> (Dispatcher<MockQueries, RecordingRender>, Rc<RefCell<Vec<RenderMsg>>>) {
        let queries = MockQueries { state: Rc::new(RefCell::new(state)) };
        let render = RecordingRender::default();
        let log = render.log.clone();
        let desktop = Desktop::new(queries.workspace_names().unwrap());
        (Dispatcher::new(desktop, queries, render), log)
    }

    // Urgency hint fires for a window owned by W3 while W1 is active: only
    // W3's render slot is updated, with the urgent decoration.
    #[test]
    fn urgency_hint_flags_owner_and_updates_only_its_slot() {
        let window = WindowHandle(0xabc);
        let (mut dispatcher, log) = dispatcher(WmState {
            visible: vec![1],
            urgent_windows: vec![window],
            window_owners: vec![(window, 3)],
            ..Default::default()
        });

        dispatcher.handle_event(WorkspaceEvent::WindowHint(window));

        assert!(dispatcher.desktop().workspace(3).urgent());
        assert!(!dispatcher.desktop().workspace(1).urgent());
        assert_eq!(*log.borrow(), vec![RenderMsg::UrgentOverlay(dispatcher.desktop().workspace(3).slot(), true)]);
    }

    #[test]
    fn urgency_hint_for_active_workspace_is_ignored() {
        let window = WindowHandle(7);
        let (mut dispatcher, log) = dispatcher(WmState {
            visible: vec![2],
            urgent_windows: vec![window],
            window_owners: vec![(window, 2)],
            ..Default::default()
        });

        dispatcher.handle_event(WorkspaceEvent::WindowHint(window));

        assert!(!dispatcher.desktop().workspace(2).urgent());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn non_urgent_hint_is_ignored() {
        let window = WindowHandle(7);
        let (mut dispatcher, log) =
            dispatcher(WmState { visible: vec![0], window_owners: vec![(window, 3)], ..Default::default() });

        dispatcher.handle_event(WorkspaceEvent::WindowHint(window));

        assert!(!dispatcher.desktop().workspace(3).urgent());
        assert!(log.borrow().is_empty());
    }

    // Switching to a workspace whose urgent flag is set clears the flag and
    // renders it as active without the urgent decoration.
    #[test]
    fn switching_into_urgent_workspace_clears_the_flag() {
        let window = WindowHandle(1);
        let (mut dispatcher, log) = dispatcher(WmState {
            visible: vec![1],
            urgent_windows: vec![window],
            window_owners: vec![(window, 3)],
            ..Default::default()
        });

        dispatcher.handle_event(WorkspaceEvent::WindowHint(window));
        assert!(dispatcher.desktop().workspace(3).urgent());

        dispatcher.queries.state.borrow_mut().visible = vec![3];
        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);

        assert!(!dispatcher.desktop().workspace(3).urgent());
        let last = log.borrow().last().cloned().unwrap();
        match last {
            RenderMsg::Classification(classification) => {
                assert_eq!(classification.workspaces[3].tag, WorkspaceTag::Active);
                assert!(!classification.workspaces[3].urgent);
            }
            other => panic!("expected a full classification, got {:?}", other),
        }
    }

    #[test]
    fn desktop_changed_renders_full_classification() {
        let (mut dispatcher, log) = dispatcher(WmState {
            visible: vec![2, 0],
            windows: vec![record(1, "term", "Alacritty"), record(2, "web", "Firefox")],
            active_title: "web".to_string(),
            active_class: "Firefox".to_string(),
            ..Default::default()
        });

        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        match &log[0] {
            RenderMsg::Classification(classification) => {
                let tags: Vec<_> = classification.workspaces.iter().map(|w| w.tag).collect();
                assert_eq!(
                    tags,
                    vec![
                        WorkspaceTag::Visible,
                        WorkspaceTag::HiddenNonEmpty,
                        WorkspaceTag::Active,
                        WorkspaceTag::HiddenEmpty
                    ]
                );
            }
            other => panic!("expected a full classification, got {:?}", other),
        }
    }

    // A failing query skips the pass: nothing rendered, model untouched.
    #[test]
    fn query_failure_skips_the_pass() {
        let (mut dispatcher, log) = dispatcher(WmState { visible: vec![0], fail_queries: true, ..Default::default() });

        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);

        assert!(log.borrow().is_empty());
        assert!(dispatcher.last_visible.is_empty());
    }

    // The widget hands the dispatcher the same shared facade handle it uses
    // for click-to-switch; events must flow through it unchanged.
    #[test]
    fn shared_query_handle_drives_the_dispatcher() {
        let queries = MockQueries { state: Rc::new(RefCell::new(WmState { visible: vec![1], ..Default::default() })) };
        let render = RecordingRender::default();
        let log = render.log.clone();
        let desktop = Desktop::new(queries.workspace_names().unwrap());

        let mut dispatcher = Dispatcher::new(desktop, Rc::new(queries), render);
        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        match &log[0] {
            RenderMsg::Classification(classification) => assert_eq!(classification.active(), Some(1)),
            other => panic!("expected a full classification, got {:?}", other),
        }
    }

    #[test]
    fn empty_visible_list_skips_the_pass() {
        let (mut dispatcher, log) = dispatcher(WmState::default());

        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);

        assert!(log.borrow().is_empty());
    }
}
