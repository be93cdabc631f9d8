//! The reconciliation engine: a pure computation from freshly queried
//! window-manager state to the per-workspace classification that drives
//! rendering. No I/O happens here; every input is a pre-fetched snapshot,
//! which keeps this testable without a live window manager.

use crate::{desktop_query::WindowRecord, model::Desktop};
use anyhow::{ensure, Result};
use std::collections::HashSet;

/// Base classification of a workspace. Exactly one per workspace per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceTag {
    /// The currently focused workspace (head of the visible list).
    Active,
    /// Shown on some monitor, but not focused.
    Visible,
    HiddenNonEmpty,
    HiddenEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowContent {
    pub title: String,
    pub class: String,
}

/// Classification of a single workspace. `urgent` is an additive decoration
/// on top of the base tag; it is never set for the active workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceView {
    pub name: String,
    pub tag: WorkspaceTag,
    pub urgent: bool,
    pub content: Option<WindowContent>,
}

/// Immutable result of one reconciliation pass, indexed by workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub workspaces: Vec<WorkspaceView>,
}

impl Classification {
    pub fn active(&self) -> Option<usize> {
        self.workspaces.iter().position(|w| w.tag == WorkspaceTag::Active)
    }
}

/// Compute the classification of every workspace from one consistent set of
/// snapshots.
///
/// `visible` is the ordered list of currently visible workspace indices with
/// the active one at the head; it must not be empty. `windows` may list
/// indices in any order and with duplicates. Records pointing outside the
/// configured index range come straight from the window manager and are
/// dropped with a warning (the workspace count is fixed for the process
/// lifetime, see [Desktop]).
pub fn reconcile(
    desktop: &Desktop,
    visible: &[usize],
    windows: &[WindowRecord],
    active_title: &str,
    active_class: &str,
) -> Result<Classification> {
    ensure!(!visible.is_empty(), "window manager reported an empty visible workspace list");
    let active = visible[0];
    ensure!(
        active < desktop.len(),
        "window manager reported active workspace {} but only {} workspaces are configured",
        active,
        desktop.len()
    );

    let visible_set: HashSet<usize> = visible.iter().copied().collect();
    let non_empty: HashSet<usize> = windows
        .iter()
        .map(|w| w.workspace)
        .inspect(|&ws| {
            if ws >= desktop.len() {
                log::warn!("ignoring window on unknown workspace {} ({} workspaces configured)", ws, desktop.len());
            }
        })
        .filter(|&ws| ws < desktop.len())
        .collect();

    let workspaces = desktop
        .indices()
        .map(|index| {
            let tag = if index == active {
                WorkspaceTag::Active
            } else if visible_set.contains(&index) {
                WorkspaceTag::Visible
            } else if non_empty.contains(&index) {
                WorkspaceTag::HiddenNonEmpty
            } else {
                WorkspaceTag::HiddenEmpty
            };
            let content = if index == active {
                (!active_title.is_empty() || !active_class.is_empty())
                    .then(|| WindowContent { title: active_title.to_string(), class: active_class.to_string() })
            } else {
                windows
                    .iter()
                    .find(|w| w.workspace == index)
                    .map(|w| WindowContent { title: w.title.clone(), class: w.class.clone() })
            };
            WorkspaceView {
                name: desktop.workspace(index).name().to_string(),
                tag,
                // switching to a workspace clears its urgency, so the active
                // workspace never carries the decoration
                urgent: desktop.workspace(index).urgent() && tag != WorkspaceTag::Active,
                content,
            }
        })
        .collect();

    Ok(Classification { workspaces })
}
