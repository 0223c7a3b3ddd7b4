//! CLI tool for batch cell position estimation.
//!
//! Reads an observation log, groups records by cell and prints one
//! position estimate per cell.
//!
//! # Usage
//!
//! ```bash
//! cell_estimate drive.obslog
//! cell_estimate --method wls drive.obslog
//! cell_estimate --config batch.toml drive.obslog
//! ```

use std::env;
use std::fs;

use disha_locate::{
    BatchConfig, GroupingConfig, ObslogPlayer, estimate_positions, group_observations,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct Config {
    log_path: String,
    batch: BatchConfig,
    retention_window_ms: Option<u64>,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut log_path = None;
    let mut batch = BatchConfig::default();
    let mut retention_window_ms = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                let path = args.get(i).ok_or("--config needs a file path")?;
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path, e))?;
                batch = toml::from_str(&text)
                    .map_err(|e| format!("cannot parse {}: {}", path, e))?;
            }
            "--method" | "-m" => {
                i += 1;
                let name = args.get(i).ok_or("--method needs a method name")?;
                batch.method = name.parse()?;
            }
            "--retention-secs" => {
                i += 1;
                let secs: u64 = args
                    .get(i)
                    .ok_or("--retention-secs needs a value")?
                    .parse()
                    .map_err(|e| format!("bad retention value: {}", e))?;
                retention_window_ms = Some(secs * 1000);
            }
            "--help" | "-h" => {
                return Err("Help requested".to_string());
            }
            arg if !arg.starts_with('-') => {
                if log_path.is_some() {
                    return Err("Multiple log files specified".to_string());
                }
                log_path = Some(arg.to_string());
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    let log_path = log_path.ok_or("No log file specified")?;
    Ok(Config {
        log_path,
        batch,
        retention_window_ms,
    })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS] <LOG_FILE>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -m, --method <M>        centroid | intersection | wls | robust");
    eprintln!("  -c, --config <FILE>     Load batch configuration from TOML");
    eprintln!("  --retention-secs <S>    Drop observations older than S seconds");
    eprintln!("                          (relative to the newest record)");
    eprintln!("  -h, --help              Show this help");
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut player = ObslogPlayer::open(&config.log_path)?;
    let observations = player.read_all()?;

    let grouping = GroupingConfig {
        retention_window_ms: config.retention_window_ms,
    };
    let groups = group_observations(&observations, &grouping);
    log::info!(
        "{} observations in {} cell groups (method: {})",
        observations.len(),
        groups.len(),
        config.batch.method
    );

    let estimates = estimate_positions(&groups, &config.batch);
    for estimate in &estimates {
        match (estimate.lat_deg, estimate.lon_deg) {
            (Some(lat), Some(lon)) => println!(
                "{:<24} {:>10.6} {:>11.6}  {:>5} obs  {}",
                estimate.cell_id, lat, lon, estimate.observation_count, estimate.technology
            ),
            _ => println!(
                "{:<24} {:>10} {:>11}  {:>5} obs  {}",
                estimate.cell_id, "-", "-", estimate.observation_count, estimate.technology
            ),
        }
    }

    Ok(())
}
