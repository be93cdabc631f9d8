extern crate gtk;

use anyhow::{Context, Result};
use gtk::prelude::{ContainerExt, WidgetExt};

mod bar;
mod config;
mod desktop_query;
mod dispatcher;
mod model;
mod opts;
mod reconcile;
mod render;
mod util;
mod widgets;
mod x11;

fn main() {
    let opts = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder().filter(Some("wsbar"), log_level_filter).init();
    }

    if let Err(err) = run(opts) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: opts::Opt) -> Result<()> {
    gtk::init().context("Failed to initialize gtk")?;

    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], move |_| {
        log::info!("Shutting down wsbar...");
        glib::idle_add(|| {
            gtk::main_quit();
            glib::Continue(false)
        });
    });

    let bar_config = config::BarConfig::from_opts(&opts);
    let workspaces_config = config::WorkspacesConfig::from_opts(&opts);

    let (window, monitor_rect) = bar::create_bar_window(&bar_config)?;

    let backend = x11::X11Backend::new().context("Failed to connect to the X server")?;
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    x11::spawn_event_source(event_tx).context("Failed to start the X event source")?;
    let workspaces = widgets::workspaces::build(workspaces_config, std::rc::Rc::new(backend), event_rx)
        .context("Failed to build the workspaces widget")?;
    window.add(&workspaces);
    window.show_all();

    // xprops want the realized x11 window
    crate::print_result_err!("while marking the bar as a dock", bar::set_dock_xprops(&window, monitor_rect, &bar_config));

    gtk::main();
    log::info!("main application thread finished");
    Ok(())
}
