// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clarabot CLI - contrast, readability and plain-language checks

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clarabot::analyzers::contrast::{scan_contrast, ContrastOptions};
use clarabot::analyzers::inclusive::find_inclusive_issues;
use clarabot::analyzers::readability;
use clarabot::config::{default_config_path, load_config, write_default_config, Config};
use clarabot::document::StaticDocument;
use clarabot::fetch::{HttpFetcher, PageFetcher};
use clarabot::report::{self, generate_report, OutputFormat};
use clarabot::rewrite::{LocalRewriter, RemoteRewriter, RewriteEngine, RewriteOptions, Rewriter};
use clarabot::scanner;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Accessibility checks for contrast, readability and inclusive language
#[derive(Parser)]
#[command(name = "clarabot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (YAML, or TOML by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check text contrast in an HTML file
    Contrast {
        /// HTML file to scan
        file: PathBuf,

        /// Maximum number of elements reported
        #[arg(long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: TableFormat,
    },

    /// Score the readability of a file (`-` for stdin)
    Readability {
        input: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: TableFormat,
    },

    /// List non-inclusive terms in a file (`-` for stdin)
    Inclusive {
        input: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: TableFormat,
    },

    /// Rewrite a file toward a reading grade (`-` for stdin)
    Rewrite {
        input: String,

        /// Target Flesch-Kincaid grade
        #[arg(long)]
        grade: Option<f64>,

        /// Use the configured chat completions endpoint
        #[arg(long)]
        remote: bool,
    },

    /// Run all checks on a file or directory
    Check {
        /// File or directory to scan
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fetch a page and run all checks on it
    Url {
        url: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,
    },
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

/// Output format for single-check commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("clarabot=debug")
    } else {
        EnvFilter::try_new(format!("clarabot={}", level)).unwrap_or_else(|_| EnvFilter::new("clarabot=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_logging(cli.verbose, &config.log.level);

    match cli.command {
        Commands::Contrast { file, limit, format } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document = StaticDocument::parse(&html);
            let options = ContrastOptions {
                limit: limit.unwrap_or(config.contrast.limit).max(1),
            };
            let results = scan_contrast(&document, &document, &options);

            match format {
                TableFormat::Text => print!("{}", report::render_contrast_table(&results)),
                TableFormat::Json => println!("{}", report::render_json(&results)),
            }

            if results.iter().any(|r| !r.passes) {
                std::process::exit(1);
            }
        }

        Commands::Readability { input, format } => {
            let text = read_input(&input)?;
            let result = readability::score(&text);
            match format {
                TableFormat::Text => print!("{}", report::render_readability(&result)),
                TableFormat::Json => println!("{}", report::render_json(&result)),
            }
        }

        Commands::Inclusive { input, format } => {
            let text = read_input(&input)?;
            let issues = find_inclusive_issues(&text);
            match format {
                TableFormat::Text => print!("{}", report::render_inclusive(&issues, &text)),
                TableFormat::Json => println!("{}", report::render_json(&issues)),
            }
        }

        Commands::Rewrite { input, grade, remote } => {
            let text = read_input(&input)?;
            let target = grade.unwrap_or(config.readability.target_grade);
            let rewriter = build_rewriter(&config, remote)?;

            let rewritten = rewriter.rewrite(&text, target).await?;
            println!("{}", rewritten);
            eprintln!(
                "Grade {:.1} -> {:.1} (target {:.1}, {} rewriter)",
                readability::score(&text).grade_level,
                readability::score(&rewritten).grade_level,
                target,
                rewriter.name()
            );
        }

        Commands::Check { path, format, output } => {
            let findings = scanner::scan_path(&path, &config)?;
            let report = generate_report(&findings, format.into());
            write_output(&report, output.as_deref())?;

            if findings.has_errors() {
                std::process::exit(1);
            }
        }

        Commands::Url { url, format, output } => {
            let fetcher = HttpFetcher::new(&config.fetch)?;
            let page = fetcher.fetch(&url).await?;
            let findings = scanner::scan_page(&page, &config);
            let report = generate_report(&findings, format.into());
            write_output(&report, output.as_deref())?;

            if findings.has_errors() {
                std::process::exit(1);
            }
        }

        Commands::InitConfig { path } => {
            let path = path.unwrap_or_else(default_config_path);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            write_default_config(&path)?;
            eprintln!("Default config written to {}", path.display());
        }
    }

    Ok(())
}

fn build_rewriter(config: &Config, remote: bool) -> anyhow::Result<Box<dyn Rewriter>> {
    if remote {
        return Ok(Box::new(RemoteRewriter::from_config(&config.remote)?));
    }

    let engine = RewriteEngine::with_options(RewriteOptions {
        max_iterations: config.readability.max_iterations,
    });
    Ok(Box::new(LocalRewriter::new(engine)))
}

/// Read a file, or stdin for `-`
fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
