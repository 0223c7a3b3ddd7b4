//! CLI tool for inspecting observation log files.
//!
//! Displays header metadata and per-cell statistics.
//!
//! # Usage
//!
//! ```bash
//! obslog_info drive.obslog
//! obslog_info --verbose drive.obslog
//! ```

use std::collections::BTreeMap;
use std::env;

use disha_locate::ObslogPlayer;

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
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut log_path = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--verbose" | "-v" => {
                verbose = true;
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
    Ok(Config { log_path, verbose })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS] <LOG_FILE>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose    List every record");
    eprintln!("  -h, --help       Show this help");
}

struct CellStats {
    count: u64,
    min_rssi: i32,
    max_rssi: i32,
    technology: String,
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut player = ObslogPlayer::open(&config.log_path)?;
    let header = player.header().clone();

    println!("Observation log: {}", config.log_path);
    println!("  version:     {}", header.version);
    println!("  records:     {}", header.record_count);
    println!(
        "  time range:  {} .. {} ms ({:.1} s)",
        header.start_time_ms,
        header.end_time_ms,
        header.duration_secs()
    );

    let mut cells: BTreeMap<String, CellStats> = BTreeMap::new();
    while let Some(obs) = player.next_record()? {
        if config.verbose {
            println!(
                "  [{:>10}] ({:.6}, {:.6}) {:>4} dBm {} ({})",
                obs.timestamp_ms, obs.lat_deg, obs.lon_deg, obs.rssi_dbm, obs.cell_id, obs.technology
            );
        }
        let stats = cells.entry(obs.cell_id.clone()).or_insert(CellStats {
            count: 0,
            min_rssi: i32::MAX,
            max_rssi: i32::MIN,
            technology: obs.technology.clone(),
        });
        stats.count += 1;
        stats.min_rssi = stats.min_rssi.min(obs.rssi_dbm);
        stats.max_rssi = stats.max_rssi.max(obs.rssi_dbm);
    }

    println!("  cells:       {}", cells.len());
    for (cell_id, stats) in &cells {
        println!(
            "    {:<24} {:>6} obs  rssi {}..{} dBm  {}",
            cell_id, stats.count, stats.min_rssi, stats.max_rssi, stats.technology
        );
    }

    Ok(())
}
