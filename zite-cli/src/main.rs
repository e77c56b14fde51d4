use std::process::exit;
use std::time::Instant;

use zite::{Config, Generator};

/// Exit status for an unreadable or malformed configuration file.
const CONFIG_ERROR: i32 = 4;
const GENERATION_ERROR: i32 = 1;

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = match Config::discover(".") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not read config file: {e}");
            exit(CONFIG_ERROR);
        }
    };

    let start = Instant::now();
    let result = Generator::new(config).and_then(|mut generator| {
        log::info!("discovery time: {}ms", start.elapsed().as_millis());
        let render = Instant::now();
        let summary = generator.generate()?;
        log::info!("render time: {}ms", render.elapsed().as_millis());
        Ok(summary)
    });

    match result {
        Ok(summary) => log::info!(
            "rendered {} pages, copied {} files in {}ms",
            summary.rendered, summary.copied, start.elapsed().as_millis()
        ),
        Err(e) => {
            eprintln!("error: {e}");
            exit(GENERATION_ERROR);
        }
    }
}
