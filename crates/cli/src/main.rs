use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, ensure};
use broadsheet_core::digest::{DigestConfig, build_newsletter, render_newsletter, send_newsletter};
use broadsheet_core::{
    DEFAULT_OVERSIZE_THRESHOLD, DEFAULT_SOFT_CAP, ExtractionResult, OutputFormat, Reader, ReaderConfig, fetch_file,
    fetch_stdin,
};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reader view and morning newspaper digest
#[derive(Parser, Debug)]
#[command(name = "broadsheet")]
#[command(author = "Broadsheet Contributors")]
#[command(version)]
#[command(about = "Read web pages as reflowed paragraphs and build a morning paper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a page, a saved HTML file or stdin as reflowed paragraphs
    Read(ReadArgs),

    /// Build the morning paper and email it
    Digest(DigestArgs),

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format for reader results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Html,
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormat::Html,
            Format::Text => OutputFormat::PlainText,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html", value_name = "FORMAT")]
    format: Format,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for the first attempt
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Custom User-Agent for the retry after an empty extraction
    #[arg(long, value_name = "UA")]
    fallback_user_agent: Option<String>,

    /// Only fetch from this host (repeatable; default: any host)
    #[arg(long = "allow-domain", value_name = "HOST")]
    allow_domains: Vec<String>,

    /// Target maximum length of a regrouped paragraph
    #[arg(long, default_value_t = DEFAULT_SOFT_CAP, value_name = "CHARS")]
    soft_cap: usize,

    /// Paragraphs longer than this are regrouped
    #[arg(long, default_value_t = DEFAULT_OVERSIZE_THRESHOLD, value_name = "CHARS")]
    oversize_threshold: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct DigestArgs {
    /// Config file (default: ~/.config/broadsheet/digest.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Build the paper without sending it
    #[arg(long)]
    dry_run: bool,

    /// Also write the rendered HTML to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "broadsheet=debug,broadsheet_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

/// Single-letter schemes are Windows drive letters, not URLs
fn is_url(input: &str) -> bool {
    url::Url::parse(input).is_ok_and(|u| u.scheme().len() > 1)
}

fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            if !output.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }

    Ok(())
}

async fn run_read(args: ReadArgs) -> anyhow::Result<()> {
    ensure!(args.soft_cap > 0, "--soft-cap must be positive");
    ensure!(args.oversize_threshold > 0, "--oversize-threshold must be positive");
    ensure!(args.timeout > 0, "--timeout must be positive");

    let started = Instant::now();

    let mut builder = ReaderConfig::builder()
        .timeout(args.timeout)
        .soft_cap(args.soft_cap)
        .oversize_threshold(args.oversize_threshold)
        .allow_domains(&args.allow_domains);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(ua) = &args.fallback_user_agent {
        builder = builder.fallback_user_agent(ua);
    }
    let reader = Reader::with_config(builder.build());

    let result: ExtractionResult = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        let html = fetch_stdin().context("Failed to read from stdin")?;
        if args.verbose {
            echo::print_detail("Size", &echo::format_size(html.len()));
        }
        reader.read_html(&html, None)
    } else if is_url(&args.input) {
        if args.verbose {
            echo::print_step(1, 3, &format!("Fetching {}", args.input.bright_white().underline()));
            if !args.allow_domains.is_empty() {
                echo::print_detail("Allowed", &args.allow_domains.join(", "));
            }
        }
        reader.read(&args.input).await.with_context(|| format!("Failed to read {}", args.input))?
    } else {
        if args.verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        let html = fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;
        if args.verbose {
            echo::print_detail("Size", &echo::format_size(html.len()));
        }
        reader.read_html(&html, None)
    };

    if args.verbose {
        echo::print_step(2, 3, "Reflowed article text");
        echo::print_read_details(&result);
    }

    if result.is_empty() {
        echo::print_warning("No readable text was found on this page");
    }

    let output = result.to_format(args.format.into()).context("Failed to render output")?;

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        echo::print_timing("Total", started.elapsed());
        eprintln!();
    }

    write_output(&output, args.output.as_deref())
}

async fn run_digest(args: DigestArgs) -> anyhow::Result<()> {
    let started = Instant::now();

    let config = match &args.config {
        Some(path) => {
            DigestConfig::load(path).with_context(|| format!("Failed to load digest config: {}", path.display()))?
        }
        None => DigestConfig::load_default().context("Failed to load digest config")?,
    };

    let total = if args.dry_run { 2 } else { 3 };
    if args.verbose {
        echo::print_step(1, total, &format!("Gathering {} feeds and the sidebar", config.feeds.len()));
    }

    let paper = build_newsletter(&config, chrono::Utc::now()).await.context("Failed to build the newsletter")?;

    if args.verbose {
        echo::print_detail("Subject", &paper.subject_line());
        echo::print_detail("Sections", &paper.sections.len().to_string());
        echo::print_detail("Headlines", &paper.headline_count().to_string());
        echo::print_timing("Gathered", started.elapsed());
        eprintln!();
        echo::print_step(2, total, "Rendering newsletter");
    }

    let html = render_newsletter(&paper);

    if args.dry_run {
        write_output(&html, args.output.as_deref())?;
        echo::print_info("Dry run: newsletter not sent");
        return Ok(());
    }

    if let Some(path) = &args.output {
        write_output(&html, Some(path))?;
    }

    if args.verbose {
        echo::print_step(3, total, &format!("Sending to {} recipient(s)", config.email.to.len()));
    }

    let id = send_newsletter(&config, &paper).await.context("Failed to send the newsletter")?;
    echo::print_success(&format!("Sent \"{}\" (message id {})", paper.subject_line(), id.bright_white()));

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Read(args) => args.verbose,
        Command::Digest(args) => args.verbose,
        Command::Completions { .. } => false,
    };

    init_tracing(verbose);

    if verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Read(args) => run_read(args).await,
        Command::Digest(args) => run_digest(args).await,
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "broadsheet", &mut io::stdout());
            Ok(())
        }
    }
}
