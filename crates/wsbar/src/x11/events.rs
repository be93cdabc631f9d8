use super::{AtomCollection, MAX_PROPERTY_VALUE_LEN};
use crate::desktop_query::{WindowHandle, WorkspaceEvent};
use anyhow::{Context, Result};
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;
use x11rb::{
    connection::Connection,
    protocol::{xproto::*, Event},
    rust_connection::{DefaultStream, RustConnection},
};

/// Spawn the X property event source on its own thread, with its own
/// connection. Root-window property changes become [WorkspaceEvent::DesktopChanged],
/// client-window hint changes become [WorkspaceEvent::WindowHint]. The
/// thread runs until the receiving side goes away or the X connection dies.
pub fn spawn_event_source(sender: UnboundedSender<WorkspaceEvent>) -> Result<()> {
    let (conn, screen_num) = RustConnection::connect(None).context("Failed to connect to the X server for event tracking")?;
    let root_window = conn.setup().roots[screen_num].root;
    let atoms = AtomCollection::new(&conn)?.reply()?;
    std::thread::Builder::new()
        .name("x11-event-source".to_string())
        .spawn(move || {
            if let Err(err) = run_event_loop(&conn, root_window, &atoms, &sender) {
                log::error!("X event source stopped: {:?}", err);
            }
        })
        .context("Failed to start x11-event-source thread")?;
    Ok(())
}

fn select_property_events(conn: &RustConnection<DefaultStream>, window: u32) -> Result<()> {
    conn.change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE))?
        .check()?;
    Ok(())
}

fn client_windows(conn: &RustConnection<DefaultStream>, root_window: u32, atoms: &AtomCollection) -> Result<Vec<u32>> {
    let reply = conn.get_property(false, root_window, atoms._NET_CLIENT_LIST, AtomEnum::WINDOW, 0, MAX_PROPERTY_VALUE_LEN / 4)?.reply()?;
    Ok(reply.value32().map(|values| values.collect()).unwrap_or_default())
}

/// Subscribe to property changes on every client window we aren't tracking
/// yet. Windows that vanished in the meantime just fail the subscription,
/// which is fine.
fn track_clients(
    conn: &RustConnection<DefaultStream>,
    root_window: u32,
    atoms: &AtomCollection,
    tracked: &mut HashSet<u32>,
) -> Result<()> {
    for window in client_windows(conn, root_window, atoms)? {
        if tracked.insert(window) {
            if let Err(err) = select_property_events(conn, window) {
                log::debug!("Could not track window 0x{:x}: {:?}", window, err);
            }
        }
    }
    Ok(())
}

fn run_event_loop(
    conn: &RustConnection<DefaultStream>,
    root_window: u32,
    atoms: &AtomCollection,
    sender: &UnboundedSender<WorkspaceEvent>,
) -> Result<()> {
    select_property_events(conn, root_window).context("Failed to select property events on the root window")?;
    let mut tracked = HashSet::new();
    track_clients(conn, root_window, atoms, &mut tracked)?;
    conn.flush()?;

    loop {
        let event = conn.wait_for_event().context("Lost the X connection")?;
        let Event::PropertyNotify(event) = event else { continue };

        let workspace_event = if event.window == root_window {
            if event.atom == atoms._NET_CLIENT_LIST {
                // new windows need their hint changes tracked too
                track_clients(conn, root_window, atoms, &mut tracked)?;
                conn.flush()?;
                Some(WorkspaceEvent::DesktopChanged)
            } else if [atoms._NET_CURRENT_DESKTOP, atoms._NET_VISIBLE_DESKTOPS, atoms._NET_DESKTOP_NAMES, atoms._NET_ACTIVE_WINDOW]
                .contains(&event.atom)
            {
                Some(WorkspaceEvent::DesktopChanged)
            } else {
                None
            }
        } else if event.atom == u32::from(AtomEnum::WM_HINTS) || event.atom == atoms._NET_WM_STATE {
            Some(WorkspaceEvent::WindowHint(WindowHandle(event.window)))
        } else {
            None
        };

        if let Some(workspace_event) = workspace_event {
            if sender.send(workspace_event).is_err() {
                // dispatcher is gone, nothing left to notify
                return Ok(());
            }
        }
    }
}
