//! Configuration bundles for the bar and the workspaces widget. There is no
//! config file; everything is CLI flags plus pango-markup decorators that
//! callers can swap out.

use crate::{
    opts::Opt,
    reconcile::{WorkspaceTag, WorkspaceView},
};

pub type Decorator = Box<dyn Fn(&str) -> String>;

/// One decoration function per classification tag, plus the additive urgent
/// decoration. Decorators receive the already-escaped workspace name and
/// return pango markup.
pub struct Decorators {
    pub active: Decorator,
    pub visible: Decorator,
    pub hidden: Decorator,
    pub empty: Decorator,
    pub urgent: Decorator,
}

impl Default for Decorators {
    fn default() -> Self {
        Self {
            active: Box::new(|name| format!("<b>[{}]</b>", name)),
            visible: Box::new(|name| format!("[{}]", name)),
            hidden: Box::new(|name| name.to_string()),
            empty: Box::new(|name| format!("<span alpha=\"50%\">{}</span>", name)),
            urgent: Box::new(|markup| format!("<span foreground=\"#cc241d\">{}</span>", markup)),
        }
    }
}

impl Decorators {
    pub fn decorate(&self, view: &WorkspaceView) -> String {
        let name = glib::markup_escape_text(&view.name);
        let base = match view.tag {
            WorkspaceTag::Active => (self.active)(name.as_str()),
            WorkspaceTag::Visible => (self.visible)(name.as_str()),
            WorkspaceTag::HiddenNonEmpty => (self.hidden)(name.as_str()),
            WorkspaceTag::HiddenEmpty => (self.empty)(name.as_str()),
        };
        if view.urgent {
            (self.urgent)(&base)
        } else {
            base
        }
    }
}

pub struct WorkspacesConfig {
    pub decorators: Decorators,
    /// Pixels between workspace buttons.
    pub spacing: i32,
    /// Hide workspaces without windows entirely instead of dimming them.
    pub hide_empty: bool,
}

impl Default for WorkspacesConfig {
    fn default() -> Self {
        Self { decorators: Decorators::default(), spacing: 4, hide_empty: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct BarConfig {
    pub side: Side,
    pub height: i32,
}

impl BarConfig {
    pub fn from_opts(opts: &Opt) -> Self {
        Self { side: if opts.bottom { Side::Bottom } else { Side::Top }, height: opts.height }
    }
}

impl WorkspacesConfig {
    pub fn from_opts(opts: &Opt) -> Self {
        Self { decorators: Decorators::default(), spacing: opts.spacing, hide_empty: opts.hide_empty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view(name: &str, tag: WorkspaceTag, urgent: bool) -> WorkspaceView {
        WorkspaceView { name: name.to_string(), tag, urgent, content: None }
    }

    #[test]
    fn default_decorations_per_tag() {
        let decorators = Decorators::default();
        assert_eq!(decorators.decorate(&view("dev", WorkspaceTag::Active, false)), "<b>[dev]</b>");
        assert_eq!(decorators.decorate(&view("dev", WorkspaceTag::Visible, false)), "[dev]");
        assert_eq!(decorators.decorate(&view("dev", WorkspaceTag::HiddenNonEmpty, false)), "dev");
        assert_eq!(decorators.decorate(&view("dev", WorkspaceTag::HiddenEmpty, false)), "<span alpha=\"50%\">dev</span>");
    }

    #[test]
    fn urgent_wraps_the_base_decoration() {
        let decorators = Decorators::default();
        assert_eq!(
            decorators.decorate(&view("mail", WorkspaceTag::HiddenNonEmpty, true)),
            "<span foreground=\"#cc241d\">mail</span>"
        );
    }

    #[test]
    fn workspace_names_are_markup_escaped() {
        let decorators = Decorators::default();
        assert_eq!(decorators.decorate(&view("a<b", WorkspaceTag::HiddenNonEmpty, false)), "a&lt;b");
    }
}
