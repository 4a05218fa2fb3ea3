//! Application entry point for the vine grid viewer.
//!
//! This binary sets up logging and eframe/egui, and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;
mod wallet;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging goes through `env_logger`; set `RUST_LOG=debug` to see rejected
/// growth and destruction waves, `RUST_LOG=trace` for every destroyed node.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Vine Grid",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
