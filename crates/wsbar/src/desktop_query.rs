//! The query boundary towards the window manager. Everything the widgets
//! know about desktops and windows flows through [DesktopQueries]; the
//! production implementation lives in [crate::x11].

use anyhow::Result;
use derive_more::Display;
use std::rc::Rc;

/// Window-manager-level handle to a client window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "0x{:x}", _0)]
pub struct WindowHandle(pub u32);

/// Snapshot of one open window, produced fresh on every reconciliation pass.
/// Never cached across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub workspace: usize,
    pub title: String,
    pub class: String,
}

/// The two external event classes the dispatcher subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Anything about the desktop layout changed: current desktop, visible
    /// desktops, desktop names, client list, active window.
    DesktopChanged,
    /// A window's hints changed; may or may not be an urgency change.
    WindowHint(WindowHandle),
}

/// Synchronous, blocking queries against the window manager state.
///
/// All calls pull fresh state; implementations must not cache across calls.
/// `visible_workspaces` returns a non-empty list with the active workspace
/// at the head. A violation of that contract is reported as an error by the
/// caller, not papered over.
pub trait DesktopQueries {
    fn workspace_names(&self) -> Result<Vec<String>>;
    fn visible_workspaces(&self) -> Result<Vec<usize>>;
    fn windows(&self) -> Result<Vec<WindowHandle>>;
    /// Batch-resolve workspace membership, title and class for every open
    /// window.
    fn window_records(&self) -> Result<Vec<WindowRecord>>;
    fn window_workspace(&self, window: WindowHandle) -> Result<usize>;
    fn window_urgent(&self, window: WindowHandle) -> Result<bool>;
    fn current_workspace(&self) -> Result<usize>;
    fn active_window_title(&self) -> Result<String>;
    fn active_window_class(&self) -> Result<String>;
    fn switch_to_workspace(&self, workspace: usize) -> Result<()>;
}

/// The widget and the dispatcher share one facade handle on the same thread.
impl<Q: DesktopQueries + ?Sized> DesktopQueries for Rc<Q> {
    fn workspace_names(&self) -> Result<Vec<String>> {
        (**self).workspace_names()
    }

    fn visible_workspaces(&self) -> Result<Vec<usize>> {
        (**self).visible_workspaces()
    }

    fn windows(&self) -> Result<Vec<WindowHandle>> {
        (**self).windows()
    }

    fn window_records(&self) -> Result<Vec<WindowRecord>> {
        (**self).window_records()
    }

    fn window_workspace(&self, window: WindowHandle) -> Result<usize> {
        (**self).window_workspace(window)
    }

    fn window_urgent(&self, window: WindowHandle) -> Result<bool> {
        (**self).window_urgent(window)
    }

    fn current_workspace(&self) -> Result<usize> {
        (**self).current_workspace()
    }

    fn active_window_title(&self) -> Result<String> {
        (**self).active_window_title()
    }

    fn active_window_class(&self) -> Result<String> {
        (**self).active_window_class()
    }

    fn switch_to_workspace(&self, workspace: usize) -> Result<()> {
        (**self).switch_to_workspace(workspace)
    }
}
