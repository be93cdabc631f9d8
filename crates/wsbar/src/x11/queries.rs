use super::{AtomCollection, MAX_PROPERTY_VALUE_LEN};
use crate::desktop_query::{DesktopQueries, WindowHandle, WindowRecord};
use anyhow::{Context, Result};
use itertools::Itertools;
use x11rb::{
    connection::Connection,
    protocol::xproto::*,
    rust_connection::{DefaultStream, RustConnection},
};

/// EWMH query facade over one X connection. All queries go against the root
/// window properties the window manager maintains.
pub struct X11Backend {
    conn: RustConnection<DefaultStream>,
    root_window: u32,
    atoms: AtomCollection,
}

impl X11Backend {
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let screen = conn.setup().roots[screen_num].clone();
        let atoms = AtomCollection::new(&conn)?.reply()?;
        Ok(X11Backend { conn, root_window: screen.root, atoms })
    }

    fn read_u32_list(&self, window: u32, property: Atom, type_: Atom) -> Result<Vec<u32>> {
        let reply = self.conn.get_property(false, window, property, type_, 0, MAX_PROPERTY_VALUE_LEN / 4)?.reply()?;
        Ok(reply.value32().map(|values| values.collect()).unwrap_or_default())
    }

    fn read_utf8(&self, window: u32, property: Atom, type_: Atom) -> Result<String> {
        let reply = self.conn.get_property(false, window, property, type_, 0, MAX_PROPERTY_VALUE_LEN / 4)?.reply()?;
        Ok(String::from_utf8_lossy(&reply.value).into_owned())
    }

    fn window_title(&self, window: u32) -> Result<String> {
        let title = self.read_utf8(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)?;
        if !title.is_empty() {
            return Ok(title);
        }
        self.read_utf8(window, self.atoms.WM_NAME, self.atoms.STRING)
    }

    fn window_class(&self, window: u32) -> Result<String> {
        // WM_CLASS is "instance\0class\0"; the class half is what users know
        let raw = self.read_utf8(window, self.atoms.WM_CLASS, self.atoms.STRING)?;
        Ok(raw.split('\0').nth(1).unwrap_or_default().to_string())
    }

    fn active_window(&self) -> Result<Option<u32>> {
        let values = self.read_u32_list(self.root_window, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW.into())?;
        Ok(values.first().copied().filter(|&w| w != 0))
    }
}

impl DesktopQueries for X11Backend {
    fn workspace_names(&self) -> Result<Vec<String>> {
        let raw = self
            .read_utf8(self.root_window, self.atoms._NET_DESKTOP_NAMES, self.atoms.UTF8_STRING)
            .context("Failed to read _NET_DESKTOP_NAMES")?;
        Ok(raw.split('\0').dropping_back(1).map(|name| name.to_string()).collect())
    }

    fn visible_workspaces(&self) -> Result<Vec<usize>> {
        let current = self.current_workspace()?;
        // _NET_VISIBLE_DESKTOPS is an xmonad extension; without it only the
        // current desktop is known to be visible
        let mut visible: Vec<usize> = self
            .read_u32_list(self.root_window, self.atoms._NET_VISIBLE_DESKTOPS, self.atoms.CARDINAL)?
            .into_iter()
            .map(|ws| ws as usize)
            .collect();
        match visible.iter().position(|&ws| ws == current) {
            Some(pos) => {
                // head must be the active workspace
                visible.remove(pos);
                visible.insert(0, current);
            }
            None => visible.insert(0, current),
        }
        Ok(visible)
    }

    fn windows(&self) -> Result<Vec<WindowHandle>> {
        let windows = self
            .read_u32_list(self.root_window, self.atoms._NET_CLIENT_LIST, AtomEnum::WINDOW.into())
            .context("Failed to read _NET_CLIENT_LIST")?;
        Ok(windows.into_iter().map(WindowHandle).collect())
    }

    fn window_records(&self) -> Result<Vec<WindowRecord>> {
        let mut records = Vec::new();
        for window in self.windows()? {
            // windows can disappear between the client-list query and the
            // per-window queries; those are skipped, not errors
            let record = self.window_workspace(window).and_then(|workspace| {
                let title = self.window_title(window.0)?;
                let class = self.window_class(window.0)?;
                Ok(WindowRecord { workspace, title, class })
            });
            match record {
                Ok(record) => records.push(record),
                Err(err) => log::debug!("Skipping window {}: {:?}", window, err),
            }
        }
        Ok(records)
    }

    fn window_workspace(&self, window: WindowHandle) -> Result<usize> {
        let values = self.read_u32_list(window.0, self.atoms._NET_WM_DESKTOP, self.atoms.CARDINAL)?;
        let desktop = values.first().context("window has no _NET_WM_DESKTOP")?;
        anyhow::ensure!(*desktop != u32::MAX, "window {} is sticky (on all workspaces)", window);
        Ok(*desktop as usize)
    }

    fn window_urgent(&self, window: WindowHandle) -> Result<bool> {
        // ICCCM urgency bit in WM_HINTS flags
        const URGENCY_HINT: u32 = 1 << 8;
        let hints = self.read_u32_list(window.0, AtomEnum::WM_HINTS.into(), AtomEnum::WM_HINTS.into())?;
        if hints.first().is_some_and(|flags| flags & URGENCY_HINT != 0) {
            return Ok(true);
        }
        let state = self.read_u32_list(window.0, self.atoms._NET_WM_STATE, self.atoms.ATOM)?;
        Ok(state.contains(&self.atoms._NET_WM_STATE_DEMANDS_ATTENTION))
    }

    fn current_workspace(&self) -> Result<usize> {
        let values = self
            .read_u32_list(self.root_window, self.atoms._NET_CURRENT_DESKTOP, self.atoms.CARDINAL)
            .context("Failed to read _NET_CURRENT_DESKTOP")?;
        Ok(*values.first().context("root window has no _NET_CURRENT_DESKTOP")? as usize)
    }

    fn active_window_title(&self) -> Result<String> {
        match self.active_window()? {
            Some(window) => self.window_title(window),
            None => Ok(String::new()),
        }
    }

    fn active_window_class(&self) -> Result<String> {
        match self.active_window()? {
            Some(window) => self.window_class(window),
            None => Ok(String::new()),
        }
    }

    fn switch_to_workspace(&self, workspace: usize) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: self.root_window,
            type_: self.atoms._NET_CURRENT_DESKTOP,
            data: ClientMessageData::from([workspace as u32, x11rb::CURRENT_TIME, 0, 0, 0]),
        };
        self.conn
            .send_event(false, self.root_window, EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT, event)?
            .check()?;
        self.conn.flush().context("Failed to send requests to X server")
    }
}
