//! naturedoc - rich-text content pipeline for Nature Magazine
//!
//! A CLI tool for rendering, normalizing and migrating stored article
//! bodies.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use cli::{Cli, Commands, InputArgs};
use naturedoc::config::{Config, CONFIG_FILE_NAME};
use naturedoc::deserializer::normalize;
use naturedoc::pipeline;
use naturedoc::serializer::{serialize, serialize_pretty};
use naturedoc::store::{ArticleStore, DirStore};
use std::collections::BTreeSet;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Main entry point for the naturedoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { path, force } => {
            handle_init_command(path, force)?;
        }

        Commands::Render {
            source,
            output,
            standalone,
            alignment,
        } => {
            let workspace = Workspace::open(config_path)?;
            let mut options = workspace.config.render.clone();
            options.standalone |= standalone;
            if let Some(alignment) = alignment {
                options.alignment = alignment.into();
            }
            let stored = workspace.read_input(&source)?;
            let rendered = pipeline::render_content(stored.as_deref(), &options);
            if !rendered.diagnostics.is_empty() {
                log::info!(
                    "Rendered {} content with {} recoveries",
                    rendered.shape,
                    rendered.diagnostics.len()
                );
            }
            write_output(output.as_deref(), &rendered.html)?;
        }

        Commands::Normalize {
            source,
            output,
            pretty,
        } => {
            let workspace = Workspace::open(config_path)?;
            let stored = workspace.read_input(&source)?;
            let document = normalize(stored.as_deref()).document;
            let encoded = if pretty {
                serialize_pretty(&document)
            } else {
                serialize(&document)
            };
            write_output(output.as_deref(), &format!("{encoded}\n"))?;
        }

        Commands::Check { source, strict } => {
            let workspace = Workspace::open(config_path)?;
            let stored = workspace.read_input(&source)?;
            handle_check_command(stored.as_deref(), strict, &workspace.config)?;
        }

        Commands::Migrate { dry_run } => {
            let workspace = Workspace::open(config_path)?;
            handle_migrate_command(workspace, dry_run)?;
        }

        Commands::List => {
            let workspace = Workspace::open(config_path)?;
            handle_list_command(&workspace)?;
        }
    }

    Ok(())
}

/// Install the logger: `Info` when verbose, otherwise `RUST_LOG` or `warn`
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// Loaded configuration and the store it points at
struct Workspace {
    config: Config,
    store: DirStore,
}

impl Workspace {
    /// Load the configuration (defaults if absent) and open its store
    fn open(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path.unwrap_or(Path::new(CONFIG_FILE_NAME));
        let config = Config::load_or_default(config_path).with_context(|| {
            format!("Failed to load configuration {}", config_path.display())
        })?;
        let store_root = config.store_path(config_path.parent().unwrap_or(Path::new("")));
        log::info!("Using article store {}", store_root.display());
        Ok(Self {
            config,
            store: DirStore::new(store_root),
        })
    }

    /// Read stored content from a file, stdin, or the article store
    fn read_input(&self, source: &InputArgs) -> Result<Option<String>> {
        if let Some(id) = &source.article {
            let article = self.store.get(id).with_context(|| {
                format!(
                    "Failed to read article '{}' from {}",
                    id,
                    self.store.root().display()
                )
            })?;
            return Ok(article.content);
        }

        match source.input.as_deref() {
            Some(path) if path != Path::new("-") => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Some(strip_final_newline(content)))
            }
            _ => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read stdin")?;
                Ok(Some(strip_final_newline(content)))
            }
        }
    }
}

/// Drop the line ending editors and shells add at the end of a file
fn strip_final_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    content
}

/// Write to `path`, or to stdout when no path is given
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// Handle the init command
fn handle_init_command(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target_path = path.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target_path.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            config_path.display()
        );
    }

    if !target_path.exists() {
        std::fs::create_dir_all(&target_path)
            .with_context(|| format!("Failed to create directory {}", target_path.display()))?;
    }

    let config = Config::default();
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✓ Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} to configure rendering", CONFIG_FILE_NAME);
    println!(
        "  2. Put article files in {}/",
        config.store_path(&target_path).display()
    );
    println!("  3. Run 'naturedoc list' to see them");

    Ok(())
}

/// Handle the check command
fn handle_check_command(stored: Option<&str>, strict: bool, config: &Config) -> Result<()> {
    let normalized = normalize(stored);
    let document = &normalized.document;

    println!("Shape: {}", normalized.shape);
    println!(
        "Blocks: {}, words: {}, images: {}",
        document.blocks().len(),
        document.word_count(),
        document.image_count()
    );
    if !document.is_blank() {
        println!(
            "Excerpt: {}",
            document.excerpt(config.listing.excerpt_chars)
        );
    }
    if let Some(stored) = stored {
        if pipeline::is_current_encoding(stored) {
            println!("Encoding: current");
        } else {
            println!("Encoding: needs migration");
        }
    }

    if normalized.diagnostics.is_empty() {
        println!("✓ No repairs needed");
        return Ok(());
    }

    println!(
        "\n{} recoveries ({} nodes dropped):",
        normalized.diagnostics.len(),
        normalized.dropped_count()
    );
    for diagnostic in &normalized.diagnostics {
        println!("  - {}", diagnostic);
    }
    let stored_blocks: BTreeSet<usize> = normalized
        .diagnostics
        .iter()
        .filter_map(|diagnostic| diagnostic.path()?.indices().first().copied())
        .collect();
    if !stored_blocks.is_empty() {
        println!("Stored blocks affected: {}", stored_blocks.iter().join(", "));
    }

    if strict {
        anyhow::bail!(
            "Content needed {} recoveries",
            normalized.diagnostics.len()
        );
    }
    Ok(())
}

/// Handle the migrate command
fn handle_migrate_command(mut workspace: Workspace, dry_run: bool) -> Result<()> {
    let principal = &workspace.config.principal;
    println!(
        "{} articles in {} as '{}'...",
        if dry_run { "Checking" } else { "Migrating" },
        workspace.store.root().display(),
        principal.name
    );

    let report = pipeline::migrate_store(&mut workspace.store, principal, dry_run)
        .context("Migration failed")?;

    for id in &report.migrated {
        println!("  {} {}", if dry_run { "would migrate" } else { "migrated" }, id);
    }
    println!(
        "\n✓ {} migrated, {} already current, {} without content",
        report.migrated.len(),
        report.current,
        report.skipped
    );
    if report.dropped_nodes > 0 {
        println!(
            "Warning: {} nodes could not be recovered and were dropped",
            report.dropped_nodes
        );
    }

    Ok(())
}

/// Handle the list command
fn handle_list_command(workspace: &Workspace) -> Result<()> {
    let articles = workspace.store.list().with_context(|| {
        format!(
            "Failed to list articles in {}",
            workspace.store.root().display()
        )
    })?;

    if articles.is_empty() {
        println!("No articles in {}", workspace.store.root().display());
        return Ok(());
    }

    for summary in pipeline::summarize_articles(&articles, workspace.config.listing.excerpt_chars) {
        println!(
            "  {} - {} ({} words, {} images)",
            summary.slug, summary.title, summary.word_count, summary.image_count
        );
        if let Some(category) = &summary.category {
            println!("    Category: {}", category);
        }
        if !summary.excerpt.is_empty() {
            println!("    {}", summary.excerpt);
        }
    }

    Ok(())
}
