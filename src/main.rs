use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::engine::{AnalysisResult, DetectionEngine};
use phishguard::output::Reporter;
use phishguard::Config;
use std::io::{BufRead, Write};
use std::process;

fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("URL phishing detection combining domain heuristics with a trained classifier")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishguard.yaml"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Analyze a single URL and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Analyze URLs from a file, one per line")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit results as JSON instead of styled text")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate configuration and model artifacts")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize logger based on verbose flag
    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config_path = matches.get_one::<String>("config").unwrap();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let engine = match DetectionEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error loading classifier: {e:#}");
            process::exit(1);
        }
    };

    let json = matches.get_flag("json");
    let reporter = if json { Reporter::plain() } else { Reporter::new() };

    if let Some(url) = matches.get_one::<String>("url") {
        analyze_single(&engine, &reporter, url, json);
    } else if let Some(batch_path) = matches.get_one::<String>("batch") {
        run_batch(&engine, &reporter, batch_path, json);
    } else {
        run_interactive(&engine, &reporter);
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        let config = Config::from_file(path)?;
        log::info!("Loaded configuration from {path}");
        Ok(config)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("🔍 Testing configuration...");
    println!();
    println!("Official domains: {}", config.official_domains.len());
    println!("Known brands: {}", config.known_brands.len());
    println!("Sensitive words: {}", config.sensitive_words.len());
    println!("Model artifact: {}", config.model_path);
    println!("Feature schema: {}", config.feature_names_path);
    println!();

    match DetectionEngine::from_config(config) {
        Ok(engine) => {
            println!(
                "✅ Configuration and model artifacts valid ({} features)",
                engine.schema().len()
            );
        }
        Err(e) => {
            println!("❌ Configuration validation failed:");
            println!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn analyze_single(engine: &DetectionEngine, reporter: &Reporter, url: &str, json: bool) {
    match engine.analyze(url) {
        Ok(result) => print_result(&result, reporter, json),
        Err(e) => {
            reporter.print_error(&e.to_string());
            process::exit(1);
        }
    }
}

fn run_batch(engine: &DetectionEngine, reporter: &Reporter, path: &str, json: bool) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading batch file {path}: {e}");
            process::exit(1);
        }
    };

    let mut analyzed = 0usize;
    let mut flagged = 0usize;
    let mut results: Vec<AnalysisResult> = Vec::new();

    for line in content.lines() {
        let url = line.trim();
        if url.is_empty() || url.starts_with('#') {
            continue;
        }
        match engine.analyze(url) {
            Ok(result) => {
                analyzed += 1;
                if result.verdict.is_phishing() {
                    flagged += 1;
                }
                if json {
                    results.push(result);
                } else {
                    println!("{}", reporter.format_summary_line(&result));
                }
            }
            Err(e) => reporter.print_error(&format!("{url}: {e}")),
        }
    }

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(serialized) => println!("{serialized}"),
            Err(e) => {
                eprintln!("Error serializing results: {e}");
                process::exit(1);
            }
        }
    } else {
        println!();
        println!("{analyzed} analyzed, {flagged} flagged");
    }
}

fn run_interactive(engine: &DetectionEngine, reporter: &Reporter) {
    reporter.print_banner();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{} ", reporter.prompt());
        let _ = std::io::stdout().flush();

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                reporter.print_error(&format!("failed to read input: {e}"));
                break;
            }
        }

        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if url.eq_ignore_ascii_case("quit") || url.eq_ignore_ascii_case("exit") {
            break;
        }

        match engine.analyze(url) {
            Ok(result) => reporter.print_report(&result),
            Err(e) => reporter.print_error(&e.to_string()),
        }
    }

    println!();
    println!("Scanning complete. Stay safe online!");
}

fn print_result(result: &AnalysisResult, reporter: &Reporter, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(serialized) => println!("{serialized}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                process::exit(1);
            }
        }
    } else {
        reporter.print_report(result);
    }
}
