//! Pawprint bot — entry point.

use std::path::Path;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use pawprint::{ComponentsBank, HistoryStore, TemplateKey, TemplateStore};
use pawprint_bot::config::{self, resolve_data_dir, BotPaths};
use pawprint_bot::fetch::CataasClient;
use pawprint_bot::pipeline::{self, RunOptions};
use pawprint_bot::post::{PageCredentials, PagePoster};

#[derive(Parser)]
#[command(
    name = "pawprint-bot",
    about = "Daily cat bot — fetch a photo, tag its color, caption it, post it",
    version
)]
struct Cli {
    /// Data directory holding caption pools, components, and history.
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, caption, and publish today's photo (default).
    Post {
        /// Extra tag appended after the detected color. Repeatable.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Fetch and caption, but neither record nor publish.
    Preview {
        /// Extra tag appended after the detected color. Repeatable.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Synthesize a caption from tags alone; no network involved.
    Caption {
        /// Tag to caption for. Repeatable.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Record the caption in the posting history.
        #[arg(long)]
        record: bool,
    },

    /// Print the dominant color of an image file.
    Classify {
        /// Path to the image.
        image: String,
    },

    /// Show recent posting history.
    History {
        /// Entries to show, newest first.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Check the data directory and credentials.
    Doctor,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   pawprint-bot completions bash > ~/.local/share/bash-completion/completions/pawprint-bot
    ///   pawprint-bot completions zsh > ~/.zfunc/_pawprint-bot
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let paths = BotPaths::new(resolve_data_dir(cli.data_dir.as_deref()));

    match cli.command.unwrap_or(Commands::Post { tags: Vec::new() }) {
        Commands::Post { tags } => {
            // Credentials first: fail before touching the network.
            let credentials = PageCredentials::from_env()?;
            let poster = PagePoster::new(credentials);
            let cataas = CataasClient::new();
            let opts = RunOptions {
                extra_tags: tags,
                ..RunOptions::default()
            };

            let report = pipeline::run_post(&cataas, &poster, &paths, &opts).await?;
            println!("Caption: {}", report.caption);
            println!("Image: {}", report.image_url);
            if let Some(receipt) = report.receipt {
                match receipt.post_id.or(receipt.id) {
                    Some(id) => println!("Published: {id}"),
                    None => println!("Published."),
                }
            }
        }

        Commands::Preview { tags } => {
            let cataas = CataasClient::new();
            let opts = RunOptions {
                extra_tags: tags,
                ..RunOptions::default()
            };

            let report = pipeline::run_preview(&cataas, &paths, &opts).await?;
            println!("Image: {}", report.image_url);
            if let Some(color) = report.color {
                println!("Color: {color}");
            }
            println!("Caption: {}", report.caption);
        }

        Commands::Caption { tags, record } => {
            let caption = pipeline::caption_only(&paths, &tags, record);
            println!("{caption}");
        }

        Commands::Classify { image } => {
            match pipeline::classify_file(Path::new(&image))? {
                Some(color) => println!("{color}"),
                None => println!("indeterminate"),
            }
        }

        Commands::History { limit } => {
            let store = HistoryStore::load(paths.history());
            if store.is_empty() {
                println!("Posting history is empty ({})", paths.history().display());
            } else {
                println!("Posting history: {} entries", store.len());
                for entry in store.recent(limit) {
                    println!("  {}  {}", entry.time.format("%Y-%m-%d %H:%M UTC"), entry.caption);
                }
            }
        }

        Commands::Doctor => {
            println!("Data dir: {}", paths.data_dir.display());

            let templates = TemplateStore::load_dir(paths.templates_dir());
            for key in TemplateKey::ALL {
                println!("  {}: {} templates", key.file_name(), templates.pool(key).len());
            }

            let components = ComponentsBank::load(&paths.components());
            println!(
                "  {}: {} intros, {} ctas, {} descriptors, {} emojis",
                config::COMPONENTS_FILE,
                components.intros.len(),
                components.ctas.len(),
                components.descriptors.len(),
                components.emojis.len()
            );

            let history = HistoryStore::load(paths.history());
            println!("  {}: {} entries", config::HISTORY_FILE, history.len());

            match PageCredentials::from_env() {
                Ok(credentials) => println!("Credentials: page {}", credentials.page_id),
                Err(e) => {
                    eprintln!("Credentials: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pawprint-bot", &mut std::io::stdout());
        }
    }

    Ok(())
}
