//! Command-line interface for ftt
//!
//! Parses an FTT file, validates the record graph and prints the result.
//!
//! Usage:
//!   ftt `<path>` [--format json|yaml|summary] [--config `<file>`] [--lenient] [--log-level `<level>`]
//!
//! Exit status: 0 on success, 1 when the file raised a fatal diagnostic, 2 when the file or
//! the configuration could not be read.

use clap::{Arg, ArgAction, Command};
use flexi_logger::{Logger, LoggerHandle};
use ftt::ftt::config::{ConfigLoadError, FttConfig, Loader, OutputFormat};
use ftt::{DocumentLoader, DuplicatePolicy, ParseResult};

const EXIT_FATAL: i32 = 1;
const EXIT_IO: i32 = 2;

fn main() {
    let matches = Command::new("ftt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse and validate FTT family-tree files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the .ftt file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (overrides output.format)")
                .value_parser(["json", "yaml", "summary"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Report duplicate ids as errors and keep the first definition")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log level for stderr (default: RUST_LOG, then 'warn')"),
        )
        .get_matches();

    let _logger = init_logging(matches.get_one::<String>("log-level").map(String::as_str));

    let config = load_config(
        matches.get_one::<String>("config").map(String::as_str),
        matches.get_one::<String>("format").map(String::as_str),
        matches.get_flag("lenient"),
    )
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(EXIT_IO);
    });

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let loader = DocumentLoader::from_path(path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(EXIT_IO);
    });

    let result = loader.parse_with(&config.parser);
    print!("{}", render(&result, &config));

    if !result.is_valid() {
        std::process::exit(EXIT_FATAL);
    }
}

fn init_logging(level: Option<&str>) -> Option<LoggerHandle> {
    let logger = match level {
        Some(level) => Logger::try_with_str(level),
        None => Logger::try_with_env_or_str("warn"),
    };
    match logger.and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Logging disabled: {}", err);
            None
        }
    }
}

fn load_config(
    file: Option<&str>,
    format: Option<&str>,
    lenient: bool,
) -> Result<FttConfig, ConfigLoadError> {
    let mut loader = Loader::embedded();
    if let Some(file) = file {
        loader = loader.with_file(file)?;
    }
    if let Some(format) = format {
        loader = loader.with_output_format(format)?;
    }
    if lenient {
        loader = loader.with_duplicate_policy(DuplicatePolicy::Lenient)?;
    }
    loader.build()
}

fn render(result: &ParseResult, config: &FttConfig) -> String {
    let rendered = match config.output.format {
        OutputFormat::Json if config.output.pretty => serde_json::to_string_pretty(result),
        OutputFormat::Json => serde_json::to_string(result),
        OutputFormat::Yaml => {
            return serde_yaml::to_string(result).unwrap_or_else(|e| {
                eprintln!("Error formatting YAML: {}", e);
                std::process::exit(EXIT_IO);
            })
        }
        OutputFormat::Summary => return render_summary(result),
    };
    rendered
        .map(|json| json + "\n")
        .unwrap_or_else(|e| {
            eprintln!("Error formatting JSON: {}", e);
            std::process::exit(EXIT_IO);
        })
}

fn render_summary(result: &ParseResult) -> String {
    let mut out = format!("{}\n", result.summary());
    for diagnostic in result
        .fatal
        .iter()
        .chain(&result.errors)
        .chain(&result.warnings)
    {
        out.push_str(&format!("{}\n", diagnostic));
    }
    out
}
