mod app;
mod browser;
mod error;
mod export;
mod logging;
mod model;
mod nav;
mod services;
mod session;
mod stats;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
