use std::process::ExitCode;

use testpki::flows;
use testpki::profile::BootstrapConfig;
use testpki::sink::DirSink;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BootstrapConfig::default();
    let sink = DirSink::new(".");

    match flows::run(&config, &sink) {
        Ok(()) => {
            log::info!("OK");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
