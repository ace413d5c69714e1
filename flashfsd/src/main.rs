//! # Flash Filesystem Host Daemon
//!
//! Main entry point for the flash filesystem host.

use flashfsd::{load_fs_config, HostRuntime, HostRuntimeConfig};
use services_logger::LogLevel;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(&args[0]);
        process::exit(1);
    });

    let mut runtime = HostRuntime::new(config.clone()).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    let result = if config.script.is_some() {
        runtime.run().map(|()| {
            for line in runtime.take_output() {
                println!("{}", line);
            }
        })
    } else {
        let stdin = io::stdin();
        runtime.run_stream(stdin.lock(), io::stdout())
    };

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = HostRuntimeConfig {
        entropy_seed: clock_seed(),
        ..HostRuntimeConfig::default()
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config.fs = load_fs_config(Path::new(&args[i]))
                    .map_err(|e| format!("Failed to load config: {}", e))?;
            }
            "--script" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --script".to_string());
                }
                let script_path = &args[i];
                let script_text = fs::read_to_string(script_path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(script_text);
            }
            "--volume-bytes" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --volume-bytes".to_string());
                }
                config.volume_bytes = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid volume-bytes value: {}", args[i]))?;
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --seed".to_string());
                }
                config.entropy_seed = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid seed value: {}", args[i]))?;
            }
            "--verbose" | "-v" => {
                config.log_level = LogLevel::Debug;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>      Service configuration (JSON)");
    eprintln!("  -s, --script <FILE>      Command script; stdin is read without one");
    eprintln!("  --volume-bytes <N>       Volume capacity in bytes (default 262144)");
    eprintln!("  --seed <N>               Entropy seed for urandom");
    eprintln!("  -v, --verbose            Log debug entries to stderr");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --script demos/session.fsc --seed 7", program);
    eprintln!("  {} --config flashfs.json --volume-bytes 65536", program);
}
