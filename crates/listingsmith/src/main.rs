use clap::{Parser, Subcommand};
use listingsmith::{
    evaluate_html, read_input, write_output, write_report, GenerationOptions, ListingGenerator,
};
use listingsmith_common::{logger, AppConfig, ListingSmithError, Result};
use listingsmith_listing::{to_ascii_safe, Language};
use listingsmith_llm::{OpenRouterClient, RetryPolicy};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "listingsmith")]
#[command(about = "ListingSmith - SEO real estate listing generator", long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Property listing JSON file
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Produce a complete HTML document
    #[arg(long)]
    html: bool,

    /// Transliterate output to ASCII
    #[arg(long)]
    safe_output: bool,

    /// Print a quality evaluation to stderr
    #[arg(long)]
    evaluate: bool,

    /// Also write the evaluation report as JSON (implies --evaluate)
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Truncate title and meta description to their length ceilings
    #[arg(long)]
    truncate: bool,

    /// Retries after a rate-limit response, with exponential backoff
    #[arg(long, default_value_t = 0, value_name = "N")]
    retries: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an existing HTML listing against its property JSON
    Evaluate {
        /// Generated HTML (fragments or full document)
        content: PathBuf,

        /// Property listing JSON the content was generated from
        #[arg(long, value_name = "PATH")]
        listing: PathBuf,

        /// Evaluate as this language instead of the listing's (en, pt, es)
        #[arg(long, value_name = "CODE")]
        language: Option<String>,

        /// Print every check instead of the summary
        #[arg(short, long)]
        verbose: bool,

        /// Also write the evaluation report as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load environment variables from .env at project root
    load_dotenv_from_project_root();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Evaluate {
            content,
            listing,
            language,
            verbose,
            report,
        }) => {
            let level = cli
                .log_level
                .or_else(|| std::env::var("LOG_LEVEL").ok())
                .unwrap_or_else(|| "warn".to_string());
            logger::setup_logging(&level, None)?;

            run_evaluate(&content, &listing, language.as_deref(), verbose, report.as_deref())
        }
        None => run_generate(cli).await,
    }
}

/// Evaluate mode: no completion, so no credential is needed
fn run_evaluate(
    content: &Path,
    listing: &Path,
    language: Option<&str>,
    verbose: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let mut listing = read_input(listing)?;
    if let Some(code) = language {
        listing.language = parse_language(code)?;
    }

    let html = std::fs::read_to_string(content)?;
    let report = evaluate_html(&html, &listing)?;

    if verbose {
        println!("{}", report);
    } else {
        println!("{}", report.summary());
    }

    if let Some(path) = report_path {
        write_report(path, &report)?;
    }

    Ok(())
}

fn parse_language(code: &str) -> Result<Language> {
    Language::from_code(code).ok_or_else(|| {
        ListingSmithError::validation(
            "language",
            format!("must be 'en', 'pt', or 'es', got '{}'", code),
        )
    })
}

async fn run_generate(cli: Cli) -> Result<()> {
    // Missing credential is fatal before any work starts
    let mut config = AppConfig::from_env()?;

    // Override with CLI arguments
    if let Some(level) = &cli.log_level {
        std::env::set_var("RUST_LOG", level);
        config.log_level = level.clone();
    }

    // Setup logging
    logger::setup_logging(&config.log_level, config.log_dir.as_deref())?;

    tracing::info!("ListingSmith starting...");
    tracing::debug!("Configuration loaded: {:?}", config);

    let input = cli
        .input
        .ok_or_else(|| ListingSmithError::validation("input", "a listing file is required"))?;
    let listing = read_input(&input)?;

    let client = Arc::new(OpenRouterClient::new(&config)?);
    let generator = ListingGenerator::new(client);

    let options = GenerationOptions {
        document: cli.html,
        ascii_safe: cli.safe_output,
        evaluate: cli.evaluate || cli.report.is_some(),
        truncate: cli.truncate,
        retry: RetryPolicy::with_retries(cli.retries),
    };

    let output = generator.generate(&listing, &options).await?;

    write_output(cli.output.as_deref(), &output.html)?;

    if let Some(report) = &output.report {
        let text = report.to_string();
        if options.ascii_safe {
            eprintln!("{}", to_ascii_safe(&text));
        } else {
            eprintln!("{}", text);
        }

        if let Some(path) = &cli.report {
            write_report(path, report)?;
        }
    }

    tracing::info!("ListingSmith finished");
    Ok(())
}
