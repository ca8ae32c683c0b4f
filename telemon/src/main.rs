use clap::{Arg, Command};
use std::{
    io::{self, Write},
    path::PathBuf,
    process, thread,
};
use telemon_core::{config::CliConfig, shutdown, Config, HardwareInventory, TelemetrySampler};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new("telemon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hardware telemetry sampler - emits one JSON snapshot per interval")
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("MS")
                .help("Sampling interval in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("json-config")
                .long("json-config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("mounts")
                .value_name("MOUNT")
                .help("Mount points to monitor (default: /)")
                .num_args(0..),
        )
        .get_matches();

    let cli_config = CliConfig {
        interval_ms: matches.get_one::<u64>("interval").copied(),
        mounts: matches
            .get_many::<String>("mounts")
            .map(|mounts| mounts.cloned().collect()),
    };

    let json_config_path = matches.get_one::<PathBuf>("json-config");
    let config = Config::load(Some(&cli_config), json_config_path)?;

    shutdown::install()?;
    run_loop(config)
}

fn run_loop(config: Config) -> anyhow::Result<()> {
    let inventory = HardwareInventory::detect(&config.mounts);
    let mut sampler = TelemetrySampler::new(inventory, config.mounts.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // The static inventory record goes out exactly once, before the loop.
    serde_json::to_writer(&mut out, &sampler.inventory().to_static_record())?;
    out.write_all(b"\n")?;
    out.flush()?;

    while !shutdown::requested() {
        let snapshot = sampler.sample();
        serde_json::to_writer(&mut out, &snapshot)?;
        out.write_all(b"\n")?;
        out.flush()?;
        thread::sleep(config.interval());
    }

    Ok(())
}
