//! Headless front end: lists archives through the same cached reader the hover monitor uses.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use archive_peek::archive::entry::ArchiveEntry;
use archive_peek::monitor::{ListingBody, ListingView, build_listing_view};
use archive_peek::{ArchiveCatalogReader, CancellationToken, StatisticsCounter, TreeNode, load_settings};

/// Peek inside archives without extracting them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Archives to list
    #[arg(required = true)]
    archives: Vec<PathBuf>,

    /// Show entries as a folder tree
    #[arg(long)]
    tree: bool,

    /// Print each listing as JSON
    #[arg(long)]
    json: bool,

    /// Settings file (default: appsettings.json next to the binary, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref());
    settings.enable_tree_view |= args.tree;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_millis()
        .init();

    let stats = Arc::new(StatisticsCounter::new());
    let reader = ArchiveCatalogReader::new(&settings, Arc::clone(&stats));
    match reader.tool_path() {
        Some(path) => log::info!("Using archive tool at {}", path.display()),
        None => log::info!("No archive tool found, using built-in readers only"),
    }

    let cancel = CancellationToken::new();
    let mut failed = false;
    for archive in &args.archives {
        let entries = match reader.read(archive, &cancel).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("{}: {}", archive.display(), e);
                failed = true;
                continue;
            }
        };
        failed |= entries.first().is_some_and(ArchiveEntry::is_sentinel);

        let view = build_listing_view(entries, &settings);
        if args.json {
            match serde_json::to_string_pretty(&view) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Couldn't serialize listing for {}: {}", archive.display(), e),
            }
        } else {
            print_view(&archive.display().to_string(), &view);
        }
    }

    if settings.show_statistics {
        println!("{}", stats.summary());
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn print_view(label: &str, view: &ListingView) {
    println!("{}", label);
    match &view.body {
        ListingBody::Flat(entries) => {
            for entry in entries {
                println!("  {:>10}  {}", entry.display_size(), entry.display_path());
            }
        }
        ListingBody::Tree(roots) => print_tree(roots),
        ListingBody::ImagePreview(entry) => {
            println!("  [image] {} ({})", entry.display_name(), entry.display_size());
        }
    }
    println!("  {}", view.footer);
}

fn print_tree(nodes: &[TreeNode]) {
    for node in nodes {
        let indent = "  ".repeat(node.depth() + 1);
        if node.is_directory {
            println!("{}{}/", indent, node.name);
        } else {
            println!("{}{}  ({})", indent, node.name, archive_peek::format_size(node.size));
        }
        print_tree(&node.children);
    }
}
