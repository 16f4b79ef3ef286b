//! CLI entry point for frame capture.
//!
//! Runs one capture over the live desktop and prints the results as a JSON
//! array on stdout. Logs go to stderr so the output stays machine-readable.
//!
//! # Usage
//!
//! ```bash
//! # Capture every visible browser window via shell enumeration
//! frame-capture
//!
//! # Restrict to one site and scan native windows instead
//! frame-capture --whitelist http://example.com --native
//! ```

use std::env;
use std::path::PathBuf;
use std::process;

use frame_capture::{
    CaptureService, Config, DiscoveryStrategy, FrameTreeWalker, SystemEnumerator,
    TextEncodingBridge, Whitelist,
};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Options collected from the command line
#[derive(Debug, Default)]
struct CliOptions {
    /// Whitelist prefixes; overrides the config list when non-empty
    whitelist: Vec<String>,
    /// Discovery strategy override
    strategy: Option<DiscoveryStrategy>,
    /// Alternate config file
    config_path: Option<PathBuf>,
    /// Minimum-content threshold override
    min_fragment_len: Option<usize>,
    /// Show help and exit
    help: bool,
}

/// Parse command line arguments
fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--whitelist" | "-w" => {
                i += 1;
                let prefix = args
                    .get(i)
                    .ok_or("--whitelist requires a URL prefix argument")?;
                options.whitelist.push(prefix.clone());
            }
            "--shell" => options.strategy = Some(DiscoveryStrategy::Shell),
            "--native" => options.strategy = Some(DiscoveryStrategy::NativeWindow),
            "--config" | "-c" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file path argument")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--min-len" => {
                i += 1;
                let value = args.get(i).ok_or("--min-len requires a number argument")?;
                options.min_fragment_len = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --min-len value: {}", value))?,
                );
            }
            "--help" | "-h" => options.help = true,
            arg => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    Ok(options)
}

/// Print help message to stdout
fn print_help() {
    println!("frame-capture - Capture rendered HTML from live browser windows");
    println!();
    println!("USAGE:");
    println!("    frame-capture [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -w, --whitelist <PREFIX>   Admit only URLs starting with PREFIX (repeatable;");
    println!("                               no whitelist means capture everything)");
    println!("        --shell                Discover roots via shell-hosted enumeration (default)");
    println!("        --native               Discover roots by scanning native windows by class");
    println!("    -c, --config <PATH>        Load configuration from PATH");
    println!("        --min-len <N>          Keep non-root frames only above N bytes (default 100)");
    println!("    -h, --help                 Print this help message");
    println!();
    println!("OUTPUT:");
    println!("    JSON array of {{url, frames, captured_at}} records, one per admitted");
    println!("    window, in enumeration order. An empty array is a normal result.");
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'frame-capture --help' for usage.");
            process::exit(2);
        }
    };

    if options.help {
        print_help();
        return;
    }

    // Logging is installed before the config loads so the load diagnostics
    // are not lost; the configured level is applied once it is known.
    let (filter, reload_handle) = reload::Layer::new(EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path.clone()),
        None => Config::load(),
    };

    match EnvFilter::try_new(&config.general.log_level) {
        Ok(level) => {
            let _ = reload_handle.reload(level);
        }
        Err(e) => error!("invalid log_level '{}': {}", config.general.log_level, e),
    }

    let prefixes = if options.whitelist.is_empty() {
        config.capture.whitelist.clone()
    } else {
        options.whitelist.clone()
    };
    let min_fragment_len = options
        .min_fragment_len
        .unwrap_or(config.capture.min_fragment_len);
    let strategy = options.strategy.unwrap_or(if config.discovery.use_shell {
        DiscoveryStrategy::Shell
    } else {
        DiscoveryStrategy::NativeWindow
    });

    // Subsystem init is the one failure that aborts the whole run; it is
    // distinct from a capture that simply finds nothing.
    let enumerator = match SystemEnumerator::new(config.discovery.document_timeout_ms) {
        Ok(enumerator) => enumerator,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let service = CaptureService::new(
        Whitelist::new(prefixes),
        FrameTreeWalker::new(min_fragment_len, config.capture.max_frame_depth),
        TextEncodingBridge::new(&config.encoding.source),
    );

    let output = service.capture(&enumerator, strategy, &config.discovery.window_classes);

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            process::exit(1);
        }
    }
}
