//! X11/EWMH implementation of the desktop query facade and the property
//! event source.

mod events;
mod queries;

pub use events::spawn_event_source;
pub use queries::X11Backend;

// see https://github.com/dancor/wmctrl/blob/master/main.c
pub(crate) const MAX_PROPERTY_VALUE_LEN: u32 = 4096;

x11rb::atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        _NET_ACTIVE_WINDOW,
        _NET_CLIENT_LIST,
        _NET_CURRENT_DESKTOP,
        _NET_DESKTOP_NAMES,
        _NET_VISIBLE_DESKTOPS,
        _NET_WM_DESKTOP,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_DEMANDS_ATTENTION,
        _NET_WM_STRUT,
        _NET_WM_STRUT_PARTIAL,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DOCK,
        WM_NAME,
        UTF8_STRING,
        CARDINAL,
        ATOM,
        WM_CLASS,
        STRING,
    }
}
