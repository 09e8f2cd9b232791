#[macro_use] extern crate clap;
#[macro_use] extern crate log;

pub mod graphics;
pub mod interface;

use std::process;

use env_logger::Env;

use graphics::decoder::ImageCrateDecoder;
use interface::cli::cli_main;
use interface::window::GlutinBackend;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let options = match cli_main() {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    info!("starting lesson {}", options.lesson);
    let payload = options.lesson.payload(&options.assets);

    match skeleton::launch(&mut GlutinBackend, options.config, payload.as_ref(), &ImageCrateDecoder) {
        Ok(teardown) => {
            if !teardown.is_clean() {
                warn!("{} objects were still alive at exit", teardown.leaked.len());
            }
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
