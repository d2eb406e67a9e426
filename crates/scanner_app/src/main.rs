mod app;
mod config;
mod effects;
mod input;
mod logging;
mod render;

use std::io;
use std::sync::mpsc;

use anyhow::Context;
use scanner_engine::{DecodeSource, EngineHandle, LineDecodeSource};
use scanner_logging::{redact, scanner_info};

use crate::app::App;

fn main() -> anyhow::Result<()> {
    let config = config::load().context("loading configuration")?;
    logging::initialize(config.log_destination, config.log_level);

    scanner_info!(
        "Starting scanner: threshold={} rule={} endpoint={} api_key={}",
        config.scanner.threshold,
        config.scanner.rule.describe(),
        config.lookup.endpoint,
        config
            .lookup
            .api_key
            .as_deref()
            .map(redact)
            .unwrap_or_else(|| "none".to_string())
    );

    let engine = EngineHandle::new(config.lookup.clone()).context("starting lookup engine")?;
    let source = config.decoder_input.clone().map(|path| {
        scanner_info!("Decoder input: {}", path.display());
        Box::new(LineDecodeSource::from_path(path)) as Box<dyn DecodeSource>
    });

    let (input_tx, input_rx) = mpsc::channel();
    input::spawn_stdin_reader(input_tx);

    let app = App::new(config.scanner, engine, source, io::stdout(), config.tick);
    app.run(input_rx, config.autostart)
}
