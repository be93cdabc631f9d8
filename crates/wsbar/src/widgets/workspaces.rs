//! The workspaces widget: one button per workspace, redrawn from the
//! classifications the dispatcher computes. Building the widget registers
//! the event subscriptions for its lifetime; the caller supplies the query
//! facade and the event-source receiver, so the widget itself never opens
//! connections.

use crate::{
    config::WorkspacesConfig,
    desktop_query::{DesktopQueries, WorkspaceEvent},
    dispatcher::Dispatcher,
    model::Desktop,
    reconcile::{WorkspaceTag, WorkspaceView},
    render::{GlibRenderHandle, RenderMsg},
};
use anyhow::{ensure, Context, Result};
use gtk::prelude::*;
use std::{cell::RefCell, rc::Rc};
use tokio::sync::mpsc::UnboundedReceiver;

struct Row {
    event_box: gtk::EventBox,
    label: gtk::Label,
    /// Last applied view, kept so the urgent overlay can redraw the row
    /// without a full classification.
    last_view: WorkspaceView,
}

pub fn build<Q: DesktopQueries + 'static>(
    config: WorkspacesConfig,
    queries: Rc<Q>,
    mut events: UnboundedReceiver<WorkspaceEvent>,
) -> Result<gtk::Box> {
    let names = queries.workspace_names().context("Failed to query workspace names")?;
    ensure!(!names.is_empty(), "window manager reported no workspaces; is an EWMH window manager running?");
    let desktop = Desktop::new(names.clone());

    let container = gtk::Box::new(gtk::Orientation::Horizontal, config.spacing);
    container.set_widget_name("workspaces");

    let mut rows = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let label = gtk::Label::new(None);
        let event_box = gtk::EventBox::new();
        event_box.add(&label);
        let switcher = queries.clone();
        event_box.connect_button_press_event(move |_, _| {
            crate::print_result_err!("while switching workspace", switcher.switch_to_workspace(index));
            gtk::Inhibit(false)
        });
        container.add(&event_box);
        let last_view = WorkspaceView { name: name.clone(), tag: WorkspaceTag::HiddenEmpty, urgent: false, content: None };
        rows.push(Row { event_box, label, last_view });
    }

    for row in &rows {
        apply_view(row, &config);
    }
    let rows = Rc::new(RefCell::new(rows));

    let (render_tx, render_rx) = glib::MainContext::channel(glib::PRIORITY_DEFAULT);
    render_rx.attach(None, move |msg| {
        handle_render_msg(&rows, &config, msg);
        glib::Continue(true)
    });

    // serialized event loop: one event at a time, to completion, for the
    // lifetime of the widget
    let mut dispatcher = Dispatcher::new(desktop, queries, GlibRenderHandle::new(render_tx));
    glib::MainContext::default().spawn_local(async move {
        // paint the initial state before the first real event
        dispatcher.handle_event(WorkspaceEvent::DesktopChanged);
        crate::loop_select! {
            event = events.recv() => match event {
                Some(event) => dispatcher.handle_event(event),
                None => break,
            }
        }
    });

    Ok(container)
}

fn handle_render_msg(rows: &Rc<RefCell<Vec<Row>>>, config: &WorkspacesConfig, msg: RenderMsg) {
    let mut rows = rows.borrow_mut();
    match msg {
        RenderMsg::Classification(classification) => {
            if classification.workspaces.len() != rows.len() {
                log::warn!(
                    "got a classification for {} workspaces but {} are configured; ignoring it",
                    classification.workspaces.len(),
                    rows.len()
                );
                return;
            }
            for (row, view) in rows.iter_mut().zip(classification.workspaces) {
                row.last_view = view;
                apply_view(row, config);
            }
        }
        RenderMsg::UrgentOverlay(slot, urgent) => match rows.get_mut(slot.index()) {
            Some(row) => {
                row.last_view.urgent = urgent;
                apply_view(row, config);
            }
            None => log::warn!("urgent overlay for unknown widget slot {}", slot.index()),
        },
    }
}

/// A row disappears entirely only when empty workspaces are hidden and
/// nothing (window or urgency decoration) asks for it to be shown.
fn row_hidden(config: &WorkspacesConfig, view: &WorkspaceView) -> bool {
    config.hide_empty && view.tag == WorkspaceTag::HiddenEmpty && !view.urgent
}

fn apply_view(row: &Row, config: &WorkspacesConfig) {
    row.label.set_markup(&config.decorators.decorate(&row.last_view));
    match &row.last_view.content {
        Some(content) => row.event_box.set_tooltip_text(Some(&format!("{} ({})", content.title, content.class))),
        None => row.event_box.set_tooltip_text(None),
    }
    if row_hidden(config, &row.last_view) {
        // also keep a later show_all on an ancestor from re-showing the row
        row.event_box.set_no_show_all(true);
        row.event_box.hide();
    } else {
        row.event_box.set_no_show_all(false);
        row.event_box.show_all();
    }
}
