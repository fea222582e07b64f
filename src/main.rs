use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use bulk_user_fetcher::application::BatchFetchUseCase;
use bulk_user_fetcher::infrastructure::{AppConfig, init_logging_with_config, tabular_io};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Fetch "User properties" for a list of user ids from a CSRF-protected web app.
///
/// Credentials are read from the config file or from
/// USER_FETCHER__CREDENTIALS__USERNAME / USER_FETCHER__CREDENTIALS__PASSWORD.
#[derive(Debug, Parser)]
#[command(name = "bulk-user-fetcher", version, long_about = None)]
struct Cli {
    /// CSV file whose first column holds the user ids.
    #[arg(long, value_name = "FILE")]
    ids: PathBuf,

    /// Where to write the fetched records (default: results.csv / results.json).
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Treat the first row of the ids file as data rather than a header.
    #[arg(long)]
    no_header: bool,

    /// Config file (default: <config dir>/bulk-user-fetcher/config.toml, if present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum fetches in flight at once.
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    #[arg(long, value_name = "URL")]
    login_url: Option<String>,

    #[arg(long, value_name = "URL")]
    query_url: Option<String>,

    /// Log level: error, warn, info, debug or trace. RUST_LOG takes precedence.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(concurrency) = self.concurrency {
            config.workers.max_concurrent = concurrency;
        }
        if let Some(url) = &self.login_url {
            config.endpoints.login_url = url.clone();
        }
        if let Some(url) = &self.query_url {
            config.endpoints.query_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| match self.format {
            OutputFormat::Csv => PathBuf::from("results.csv"),
            OutputFormat::Json => PathBuf::from("results.json"),
        })
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        error!("{:#}", err);
        eprintln!("bulk-user-fetcher error: {:#}", err);
        std::process::exit(1);
    }
}

/// Layered config with CLI overrides applied, validated once at the end
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    info!("Configuration: {:?}", config);

    let identifiers = tabular_io::read_identifiers(&cli.ids, !cli.no_header)?;

    let result = BatchFetchUseCase::new(config).execute(identifiers).await?;

    for failure in &result.failures {
        println!("ID {}: {}", failure.identifier, failure.message);
    }

    if result.has_no_data() {
        println!("No valid user properties were fetched.");
        return Ok(());
    }

    let output = cli.output_path();
    match cli.format {
        OutputFormat::Csv => tabular_io::write_records_csv(&output, &result)?,
        OutputFormat::Json => tabular_io::write_records_json(&output, &result)?,
    }
    println!(
        "Fetched {} of {} users into {}",
        result.records.len(),
        result.total(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_minimal_args() {
        let cli = parse(&["bulk-user-fetcher", "--ids", "input_ids.csv"]);
        assert_eq!(cli.ids, PathBuf::from("input_ids.csv"));
        assert_eq!(cli.format, OutputFormat::Csv);
        assert!(!cli.no_header);
        assert_eq!(cli.output_path(), PathBuf::from("results.csv"));
    }

    #[test]
    fn test_ids_is_required() {
        assert!(Cli::try_parse_from(["bulk-user-fetcher"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = parse(&[
            "bulk-user-fetcher",
            "--ids",
            "ids.csv",
            "--format",
            "json",
            "--concurrency",
            "4",
            "--query-url",
            "http://localhost:9000/query/",
            "--log-level",
            "debug",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.workers.max_concurrent, 4);
        assert_eq!(config.endpoints.query_url, "http://localhost:9000/query/");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(cli.output_path(), PathBuf::from("results.json"));
    }

    #[test]
    fn test_cli_override_repairs_file_value_before_validation() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[credentials]\nusername = \"alice\"\npassword = \"secret\"\n\n[workers]\nmax_concurrent = 0"
        )
        .unwrap();
        let config_path = file.path().to_string_lossy().to_string();

        let cli = parse(&[
            "bulk-user-fetcher",
            "--ids",
            "ids.csv",
            "--config",
            &config_path,
            "--concurrency",
            "5",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.workers.max_concurrent, 5);

        let cli = parse(&["bulk-user-fetcher", "--ids", "ids.csv", "--config", &config_path]);
        assert!(load_config(&cli).is_err());
    }
}
