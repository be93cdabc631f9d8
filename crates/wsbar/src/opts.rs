use clap::Parser;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "wsbar", version, about = "Workspace taskbar widgets for EWMH window managers")]
pub struct Opt {
    /// Write out debug logs.
    #[arg(long = "debug", global = true)]
    pub log_debug: bool,

    /// Hide workspaces that have no windows instead of dimming them.
    #[arg(long)]
    pub hide_empty: bool,

    /// Pixels of spacing between workspace buttons.
    #[arg(long, default_value_t = 4)]
    pub spacing: i32,

    /// Height of the bar in pixels.
    #[arg(long, default_value_t = 28)]
    pub height: i32,

    /// Anchor the bar to the bottom edge of the screen instead of the top.
    #[arg(long)]
    pub bottom: bool,
}

impl Opt {
    pub fn from_env() -> Self {
        Self::parse()
    }
}
