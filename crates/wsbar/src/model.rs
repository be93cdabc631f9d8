//! The workspace model: the authoritative local snapshot of the window
//! manager's desktops, owned exclusively by the event dispatcher.

/// Opaque handle to the render-side widget slot of a workspace.
/// Issued at construction time, one per workspace, and only ever
/// interpreted by the render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetSlot(usize);

impl WidgetSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,
    urgent: bool,
    slot: WidgetSlot,
}

impl Workspace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn urgent(&self) -> bool {
        self.urgent
    }

    pub fn slot(&self) -> WidgetSlot {
        self.slot
    }
}

/// Fixed-size, index-addressed collection of workspaces. The length is set
/// once, from the initial workspace-name query, and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Desktop {
    workspaces: Vec<Workspace>,
}

impl Desktop {
    pub fn new(names: Vec<String>) -> Self {
        let workspaces = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Workspace { name, urgent: false, slot: WidgetSlot(i) })
            .collect();
        Self { workspaces }
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.workspaces.len()
    }

    /// Look up a workspace by index.
    ///
    /// Panics on out-of-range indices: the index space is validated at
    /// construction, so a bad index here means the workspace count got out
    /// of sync with the window manager, which the model cannot recover from.
    pub fn workspace(&self, index: usize) -> &Workspace {
        match self.workspaces.get(index) {
            Some(workspace) => workspace,
            None => panic!("workspace index {} out of range ({} workspaces configured)", index, self.workspaces.len()),
        }
    }

    /// Set the urgency flag of a workspace. Idempotent: returns `false`
    /// without touching anything when the flag already has the target value.
    pub fn set_urgent(&mut self, index: usize, urgent: bool) -> bool {
        let len = self.workspaces.len();
        let workspace = self
            .workspaces
            .get_mut(index)
            .unwrap_or_else(|| panic!("workspace index {} out of range ({} workspaces configured)", index, len));
        if workspace.urgent == urgent {
            false
        } else {
            workspace.urgent = urgent;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desktop() -> Desktop {
        Desktop::new(vec!["one".to_string(), "two".to_string(), "three".to_string()])
    }

    #[test]
    fn set_urgent_is_idempotent() {
        let mut desktop = desktop();
        assert!(desktop.set_urgent(1, true));
        assert!(!desktop.set_urgent(1, true));
        assert!(desktop.workspace(1).urgent());
        assert!(desktop.set_urgent(1, false));
        assert!(!desktop.set_urgent(1, false));
        assert!(!desktop.workspace(1).urgent());
    }

    #[test]
    fn slots_match_indices() {
        let desktop = desktop();
        let slots: Vec<_> = desktop.indices().map(|i| desktop.workspace(i).slot().index()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_access_panics() {
        desktop().workspace(3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_set_urgent_panics() {
        desktop().set_urgent(17, true);
    }
}
