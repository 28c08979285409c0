use std::path::PathBuf;

use spiral_galaxy::params::GalaxyParams;
use spiral_galaxy::viewer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params_path = std::env::args_os().nth(1).map(PathBuf::from);
    let params = match &params_path {
        Some(path) => match GalaxyParams::load(path) {
            Ok(params) => params,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => GalaxyParams::default(),
    };

    if let Err(e) = viewer::run(params, params_path) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
