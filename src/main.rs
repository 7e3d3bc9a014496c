use std::env;
use std::process;

use roguesim::cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
