/*!
 * Settei CLI - Character Creation Helper
 *
 * Command-line front end for the character catalog: browse and filter the
 * panel, toggle completion, cache avatar images, and emit replayable fill
 * plans for the host site's character-creation form.
 */

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use settei_core::catalog::Catalog;
use settei_core::completion::CompletionTracker;
use settei_core::config::HelperConfig;
use settei_core::form_filler::{FormFiller, PlanWriter};
use settei_core::image_store::ImageStore;
use settei_core::infobox::{source_url, Gender};
use settei_core::panel::Panel;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "settei_cli")]
#[command(about = "Settei Helper - character creation form assistant", long_about = None)]
struct Cli {
    /// Config file (default: ~/.settei_helper/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file, overriding the configured paths
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the character panel
    List {
        /// Case-insensitive substring filter on display names
        #[arg(short, long)]
        filter: Option<String>,

        /// Emit rows as JSON instead of the rendered panel
        #[arg(short, long)]
        json: bool,
    },

    /// Toggle a character's completion state
    Toggle {
        /// Catalog identifier
        id: String,
    },

    /// Build a fill plan for one character
    Fill {
        /// Catalog identifier
        id: String,

        /// Gender label for the infobox (male or female)
        #[arg(short, long)]
        gender: Gender,

        /// Write the plan to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import avatar images from a directory into the cache
    ImportImages {
        /// Directory of image files (keyed by file name)
        dir: PathBuf,
    },

    /// Print the source page URL for a character
    Source {
        /// Catalog identifier
        id: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List { filter, json } => cmd_list(&config, cli.catalog, filter, json).await,
        Commands::Toggle { id } => cmd_toggle(&config, &id).await,
        Commands::Fill { id, gender, output } => {
            cmd_fill(&config, cli.catalog, &id, gender, output).await
        }
        Commands::ImportImages { dir } => cmd_import_images(&config, &dir).await,
        Commands::Source { id } => cmd_source(&config, &id),
        Commands::Version => {
            println!("settei_cli v{}", env!("CARGO_PKG_VERSION"));
            println!("Settei Helper - character creation form assistant");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HelperConfig> {
    match path {
        Some(p) => HelperConfig::load(p),
        None => HelperConfig::load(HelperConfig::default_path()),
    }
}

fn load_catalog(config: &HelperConfig, catalog_override: Option<PathBuf>) -> Result<Catalog> {
    match catalog_override {
        Some(path) => Catalog::load_from_file(path),
        None => Catalog::load_with_fallback(&config.catalog_path, &config.fallback_catalog_path),
    }
}

/// Completed set, downgraded to empty when the store is unreadable
async fn completed_or_empty(config: &HelperConfig) -> BTreeSet<String> {
    let tracker = CompletionTracker::new_with_path(config.completion_store_path.clone());
    match tracker.completed_set().await {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Warning: Failed to load completion store: {:#}", e);
            BTreeSet::new()
        }
    }
}

/// Cached avatar keys, downgraded to empty when the store is unreadable
async fn cached_avatars_or_empty(config: &HelperConfig) -> HashSet<String> {
    let store = ImageStore::new_with_path(config.image_store_path.clone());
    match store.keys().await {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Warning: Failed to load image store: {:#}", e);
            HashSet::new()
        }
    }
}

async fn cmd_list(
    config: &HelperConfig,
    catalog_override: Option<PathBuf>,
    filter: Option<String>,
    json: bool,
) -> Result<()> {
    let catalog = load_catalog(config, catalog_override)?;

    if catalog.is_empty() {
        println!("No character records found");
        return Ok(());
    }

    let completed = completed_or_empty(config).await;
    let cached = cached_avatars_or_empty(config).await;

    let mut panel = Panel::build(&catalog, &completed, &cached);
    if let Some(query) = filter {
        panel.set_filter(&query);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&panel.visible_rows())?);
    } else {
        for line in panel.render_lines() {
            println!("{}", line);
        }
        println!(
            "\n{} of {} shown",
            panel.visible_rows().len(),
            panel.rows().len()
        );
    }

    Ok(())
}

async fn cmd_toggle(config: &HelperConfig, id: &str) -> Result<()> {
    let tracker = CompletionTracker::new_with_path(config.completion_store_path.clone());

    if tracker.is_completed(id).await? {
        tracker.unmark_completed(id).await?;
        println!("{}: incomplete", id);
    } else {
        tracker.mark_completed(id).await?;
        println!("{}: completed", id);
    }

    Ok(())
}

async fn cmd_fill(
    config: &HelperConfig,
    catalog_override: Option<PathBuf>,
    id: &str,
    gender: Gender,
    output: Option<PathBuf>,
) -> Result<()> {
    let catalog = load_catalog(config, catalog_override)?;
    let record = match catalog.get(id) {
        Some(r) => r,
        None => bail!("Unknown character id: {}", id),
    };

    // Avatar bytes come from the cache; a broken cache only costs the avatar
    let avatar_bytes = match &record.avatar {
        Some(key) => {
            let store = ImageStore::new_with_path(config.image_store_path.clone());
            match store.load(key).await {
                Ok(bytes) => bytes.map(|b| (key.clone(), b)),
                Err(e) => {
                    eprintln!("Warning: Failed to load avatar {}: {:#}", key, e);
                    None
                }
            }
        }
        None => None,
    };

    let filler = FormFiller::new(
        config.source_url_template.clone(),
        config.markup_mode_delay_ms,
    );
    let mut writer = PlanWriter::new(config.host_fields.clone());

    filler
        .fill(
            &mut writer,
            id,
            record,
            gender,
            avatar_bytes.as_ref().map(|(k, b)| (k.as_str(), b.as_slice())),
        )
        .await?;

    let plan = writer.into_plan(id);
    let json = serde_json::to_string_pretty(&plan)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .context(format!("Failed to write fill plan: {:?}", path))?;
            println!("Fill plan written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn cmd_import_images(config: &HelperConfig, dir: &PathBuf) -> Result<()> {
    let store = ImageStore::new_with_path(config.image_store_path.clone());
    let count = store.import_dir(dir).await?;
    println!("Imported {} images into {}", count, store.get_store_path());
    Ok(())
}

fn cmd_source(config: &HelperConfig, id: &str) -> Result<()> {
    println!("{}", source_url(&config.source_url_template, id));
    Ok(())
}
