use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use semtag_core::autotag::{auto_tag, AutoTagOptions};
use semtag_core::export::{build_forest, export_metadata};
use semtag_core::{DocumentSnapshot, DocumentTree, MemoryDocument, Settings, TagStore};

#[derive(Parser)]
#[command(name = "semtag")]
#[command(about = "Semantic tagging for design documents: export, auto-tag, generate HTML/CSS")]
#[command(version)]
struct Cli {
    /// Settings file (TOML, YAML or JSON); SEMTAG__* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the tagged forest of a document snapshot as JSON
    Export {
        /// Input document snapshot (.json)
        path: PathBuf,

        /// Write the forest here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate HTML + CSS from an exported forest
    Generate {
        /// Input forest (.json)
        path: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Tag the selection (or every element) from layer names
    AutoTag {
        /// Input document snapshot (.json)
        path: PathBuf,

        /// Consider every element instead of the saved selection
        #[arg(long)]
        all: bool,

        /// Also consider descendants of each selected element
        #[arg(long)]
        descendants: bool,

        /// Save the new tags back into the snapshot
        #[arg(long)]
        write: bool,
    },

    /// Check a forest for nodes the generator would skip
    Check {
        /// Input forest (.json)
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Command::Export { path, out } => cmd_export(&path, out.as_deref(), &settings),
        Command::Generate { path, out_dir } => cmd_generate(&path, out_dir.as_deref()),
        Command::AutoTag {
            path,
            all,
            descendants,
            write,
        } => {
            let mut options = AutoTagOptions::from(&settings.auto_tag);
            options.include_descendants |= descendants;
            cmd_auto_tag(&path, all, write, &options)
        }
        Command::Check { path } => cmd_check(&path),
    }
}

fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))
}

fn read_document(path: &Path) -> Result<MemoryDocument> {
    let source = read_source(path)?;
    let snapshot: DocumentSnapshot = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a document snapshot", path.display()))?;
    MemoryDocument::from_snapshot(snapshot)
        .with_context(|| format!("{} has an invalid element tree", path.display()))
}

fn cmd_export(path: &Path, out: Option<&Path>, settings: &Settings) -> Result<()> {
    let doc = read_document(path)?;
    let mut store = TagStore::new();
    store.load(&doc);

    let metadata = export_metadata(&settings.export, &doc, Utc::now());
    let forest = build_forest(&store, &doc, metadata);
    let json = serde_json::to_string_pretty(&forest)?;

    match out {
        Some(out) => {
            fs::write(out, json + "\n")
                .with_context(|| format!("Error writing {}", out.display()))?;
            info!("Exported {} nodes to {}", forest.node_count(), out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_generate(path: &Path, out_dir: Option<&Path>) -> Result<()> {
    let source = read_source(path)?;
    let output = semtag_codegen::generate_from_json(&source)?;

    // Write output files next to the source
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("forest");
    let dir = out_dir.unwrap_or_else(|| path.parent().unwrap_or(Path::new(".")));

    let html_path = dir.join(format!("{stem}.html"));
    let css_path = dir.join(format!("{stem}.css"));

    // Build a standalone HTML file linking the stylesheet
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n");
    html.push_str(&format!(
        "  <title>{}</title>\n",
        semtag_codegen::escape_html(stem)
    ));
    if !output.css.is_empty() {
        html.push_str(&format!(
            "  <link rel=\"stylesheet\" href=\"{}.css\">\n",
            semtag_codegen::escape_html(stem)
        ));
    }
    html.push_str("</head>\n<body>\n");
    if !output.html.is_empty() {
        html.push_str(&output.html);
        html.push('\n');
    }
    html.push_str("</body>\n</html>\n");

    fs::write(&html_path, &html)
        .with_context(|| format!("Error writing {}", html_path.display()))?;
    if !output.css.is_empty() {
        fs::write(&css_path, format!("{}\n", output.css))
            .with_context(|| format!("Error writing {}", css_path.display()))?;
    }

    eprintln!("Built: {}", html_path.display());
    Ok(())
}

fn cmd_auto_tag(path: &Path, all: bool, write: bool, options: &AutoTagOptions) -> Result<()> {
    let mut doc = read_document(path)?;
    let mut store = TagStore::new();
    store.load(&doc);

    let ids = if all {
        doc.all_elements()
    } else {
        doc.selection()
    };
    if ids.is_empty() {
        bail!("Please select at least one group or layer.");
    }

    let result = auto_tag(&mut store, &mut doc, &ids, options);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if write {
        let json = serde_json::to_string_pretty(&doc.to_snapshot())?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Error writing {}", path.display()))?;
        info!("Saved {} new tags to {}", result.tagged_count, path.display());
    } else if result.tagged_count > 0 {
        warn!("Dry run: pass --write to save the new tags");
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let source = read_source(path)?;
    let nodes = semtag_codegen::parse_nodes(&source)?;

    let mut problems = Vec::new();
    check_nodes(&nodes, "", &mut problems);

    if problems.is_empty() {
        eprintln!("OK: {}", path.display());
        return Ok(());
    }
    for problem in &problems {
        eprintln!("{problem}");
    }
    bail!("{} problem(s) in {}", problems.len(), path.display())
}

fn check_nodes(nodes: &[semtag_codegen::GeneratorNode], parent: &str, problems: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let here = format!("{parent}/{i}");
        if !semtag_codegen::is_valid_tag(&node.tag) {
            problems.push(format!(
                "{here}: {:?} has invalid tag {:?} and will be skipped",
                node.element_name, node.tag
            ));
        } else if semtag_codegen::is_void_element(&node.tag) && !node.children.is_empty() {
            problems.push(format!(
                "{here}: <{}> cannot have children; {} will be dropped",
                node.tag,
                node.children.len()
            ));
        }
        check_nodes(&node.children, &here, problems);
    }
}
