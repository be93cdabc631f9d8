//! The bar window itself: an undecorated GTK dock window anchored to the
//! top or bottom screen edge, with the xprops that make the window manager
//! treat it as a panel and reserve its space.

use crate::{
    config::{BarConfig, Side},
    x11::AtomCollection,
};
use anyhow::{Context, Result};
use gtk::prelude::*;
use x11rb::{
    connection::Connection,
    protocol::xproto::*,
    rust_connection::{DefaultStream, RustConnection},
};

pub fn create_bar_window(config: &BarConfig) -> Result<(gtk::Window, gdk::Rectangle)> {
    let window = gtk::Window::new(gtk::WindowType::Toplevel);
    window.set_title("wsbar");
    window.set_decorated(false);
    window.set_resizable(false);
    window.set_type_hint(gdk::WindowTypeHint::Dock);
    window.stick();

    let display = gdk::Display::default().context("Failed to get the default gdk display")?;
    let monitor = display.primary_monitor().or_else(|| display.monitor(0)).context("No monitor available")?;
    let monitor_rect = monitor.geometry();

    window.set_default_size(monitor_rect.width(), config.height);
    let y = match config.side {
        Side::Top => monitor_rect.y(),
        Side::Bottom => monitor_rect.y() + monitor_rect.height() - config.height,
    };
    window.move_(monitor_rect.x(), y);
    Ok((window, monitor_rect))
}

/// Mark the (realized) bar window as a dock and reserve its screen edge via
/// `_NET_WM_STRUT(_PARTIAL)`.
pub fn set_dock_xprops(window: &gtk::Window, monitor_rect: gdk::Rectangle, config: &BarConfig) -> Result<()> {
    let backend = X11PropBackend::new()?;
    backend.set_xprops_for(window, monitor_rect, config)
}

struct X11PropBackend {
    conn: RustConnection<DefaultStream>,
    root_window: u32,
    atoms: AtomCollection,
}

impl X11PropBackend {
    fn new() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let screen = conn.setup().roots[screen_num].clone();
        let atoms = AtomCollection::new(&conn)?.reply()?;
        Ok(X11PropBackend { conn, root_window: screen.root, atoms })
    }

    fn set_xprops_for(&self, window: &gtk::Window, monitor_rect: gdk::Rectangle, config: &BarConfig) -> Result<()> {
        let gdk_window = window.window().context("Couldn't get gdk window from gtk window")?;
        let win_id =
            gdk_window.downcast_ref::<gdkx11::X11Window>().context("Failed to get x11 window for gtk window")?.xid() as u32;
        let root_window_geometry = self.conn.get_geometry(self.root_window)?.reply()?;

        let mon_end_x = (monitor_rect.x() + monitor_rect.width()) as u32 - 1u32;
        let mon_end_y = (monitor_rect.y() + monitor_rect.height()) as u32 - 1u32;
        let dist = config.height as u32;

        // left, right, top, bottom, left_start_y, left_end_y, right_start_y, right_end_y, top_start_x, top_end_x, bottom_start_x, bottom_end_x
        #[rustfmt::skip]
        let strut_list: Vec<u8> = match config.side {
            Side::Top    => vec![0, 0, dist + monitor_rect.y() as u32, 0,                                                      0, 0, 0, 0, monitor_rect.x() as u32, mon_end_x, 0,                        0],
            Side::Bottom => vec![0, 0, 0,                              root_window_geometry.height as u32 - mon_end_y + dist,  0, 0, 0, 0, 0,                        0,         monitor_rect.x() as u32, mon_end_x],
        }.iter().flat_map(|x| x.to_le_bytes().to_vec()).collect();

        self.conn
            .change_property(PropMode::REPLACE, win_id, self.atoms._NET_WM_STRUT, self.atoms.CARDINAL, 32, 4, &strut_list[0..16])?
            .check()?;
        self.conn
            .change_property(
                PropMode::REPLACE,
                win_id,
                self.atoms._NET_WM_STRUT_PARTIAL,
                self.atoms.CARDINAL,
                32,
                12,
                &strut_list,
            )?
            .check()?;

        x11rb::wrapper::ConnectionExt::change_property32(
            &self.conn,
            PropMode::REPLACE,
            win_id,
            self.atoms._NET_WM_WINDOW_TYPE,
            self.atoms.ATOM,
            &[self.atoms._NET_WM_WINDOW_TYPE_DOCK],
        )?
        .check()?;

        self.conn.flush().context("Failed to send requests to X server")
    }
}
