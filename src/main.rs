//! blockport - WordPress to portable block converter

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use blockport::batch::{BatchRunner, read_records};
use blockport::export::{HtmlRenderer, derive_excerpt};
use blockport::media::analyze_tags;
use blockport::model::MediaMap;
use blockport::{Block, Config, Transformer, extract_plain_text, parse_blocks};

#[derive(Parser)]
#[command(name = "blockport")]
#[command(version, about = "WordPress HTML to portable block converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    blockport transform post.html              Print blocks and media as JSON
    blockport render blocks.json               Render blocks as preview HTML
    blockport batch posts.json --out out.json  Convert an exported wp_posts table
    blockport analyze posts.json               Report uncovered media tags")]
struct Cli {
    /// Config file (defaults to ./blockport.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an HTML body into blocks and resolved media
    Transform {
        /// HTML file, or - for stdin
        input: PathBuf,
        /// Directory searched for local media
        #[arg(long)]
        media_root: Option<PathBuf>,
        /// Print JSON on one line
        #[arg(long)]
        compact: bool,
    },
    /// Render blocks as preview HTML
    Render {
        /// Block JSON file, or - for stdin
        input: PathBuf,
        /// Treat the input as HTML and parse it first
        #[arg(long)]
        from_html: bool,
    },
    /// Print the plain text of blocks
    Text {
        /// Block JSON file, or - for stdin
        input: PathBuf,
        /// Print an excerpt instead of the full text
        #[arg(long)]
        excerpt: bool,
    },
    /// Convert a JSON array of wp_posts records
    Batch {
        input: PathBuf,
        /// Migration artifact to write
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        media_root: Option<PathBuf>,
        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Report HTML tags across records that media extraction does not cover
    Analyze {
        input: PathBuf,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Transform {
            input,
            media_root,
            compact,
        } => {
            if let Some(root) = media_root {
                config.media_root = root;
            }
            let html = read_input(&input)?;
            let result = Transformer::from_config(&config).transform(&html);
            let json = if compact {
                serde_json::to_string(&result)
            } else {
                serde_json::to_string_pretty(&result)
            };
            println!("{}", json.map_err(|e| e.to_string())?);
        }
        Command::Render { input, from_html } => {
            let blocks = read_blocks(&input, from_html)?;
            let renderer = HtmlRenderer::with_config(config.render_options());
            println!("{}", renderer.render(&blocks));
        }
        Command::Text { input, excerpt } => {
            let blocks = read_blocks(&input, false)?;
            if excerpt {
                if let Some(text) = derive_excerpt(None, &blocks, config.excerpt_length) {
                    println!("{text}");
                }
            } else {
                println!("{}", extract_plain_text(&blocks));
            }
        }
        Command::Batch {
            input,
            out,
            media_root,
            workers,
        } => {
            if let Some(root) = media_root {
                config.media_root = root;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            let records = read_records(&input).map_err(|e| e.to_string())?;
            let transformer = Transformer::from_config(&config);
            let output = BatchRunner::new(&transformer)
                .workers(config.workers)
                .run(&records)
                .map_err(|e| e.to_string())?;
            output.write_artifact(&out).map_err(|e| e.to_string())?;
            if !cli.quiet {
                print!("{}", output.summary);
            }
        }
        Command::Analyze { input, json } => {
            let records = read_records(&input).map_err(|e| e.to_string())?;
            let analysis = analyze_tags(records.iter().map(|r| r.content.as_str()));
            if json {
                let text = serde_json::to_string_pretty(&analysis).map_err(|e| e.to_string())?;
                println!("{text}");
            } else {
                print!("{analysis}");
            }
        }
        Command::Config => print!("{}", config.to_toml()),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config = match path {
        Some(path) => Config::load_from_path(path)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("config file not found: {}", path.display()))?,
        None => Config::load_or_default().map_err(|e| e.to_string())?,
    };
    Ok(config)
}

fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
    }
}

fn read_blocks(path: &Path, from_html: bool) -> Result<Vec<Block>, String> {
    let input = read_input(path)?;
    if from_html {
        return Ok(parse_blocks(&input, &MediaMap::new()));
    }
    serde_json::from_str(&input).map_err(|e| format!("{}: {e}", path.display()))
}
