//! The render adapter boundary. The dispatcher talks to rendering through
//! [RenderTarget]; the GTK implementation posts messages to the main
//! context and never blocks, so render calls are fire-and-forget from the
//! core's point of view. A later full classification always supersedes an
//! earlier one, and the urgent overlay is per-slot, so reordering across
//! passes is harmless.

use crate::{model::WidgetSlot, reconcile::Classification};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderMsg {
    Classification(Classification),
    UrgentOverlay(WidgetSlot, bool),
}

pub trait RenderTarget {
    fn apply_classification(&self, classification: Classification);
    fn apply_urgent_overlay(&self, slot: WidgetSlot, urgent: bool);
}

/// Render handle used from the dispatcher thread: forwards render messages
/// to the GTK main context, where the workspace rows apply them.
pub struct GlibRenderHandle {
    sender: glib::Sender<RenderMsg>,
}

impl GlibRenderHandle {
    pub fn new(sender: glib::Sender<RenderMsg>) -> Self {
        Self { sender }
    }
}

impl RenderTarget for GlibRenderHandle {
    fn apply_classification(&self, classification: Classification) {
        crate::print_result_err!(
            "while posting workspace classification to the render loop",
            self.sender.send(RenderMsg::Classification(classification))
        );
    }

    fn apply_urgent_overlay(&self, slot: WidgetSlot, urgent: bool) {
        crate::print_result_err!(
            "while posting urgent overlay to the render loop",
            self.sender.send(RenderMsg::UrgentOverlay(slot, urgent))
        );
    }
}
