use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::File;

pub fn init_logging() {
    // No log file is not a reason to die; fall back to no logging.
    if let Ok(file) = File::create("persona.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
        log::info!("Logger initialized.");
    }
}
