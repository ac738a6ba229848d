//! kollect - Kindle collection manager

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use kollect::metadata::Extractor;
use kollect::{collection, organize, scan};

#[derive(Parser)]
#[command(name = "kollect")]
#[command(version, about = "Kindle collection manager", long_about = None)]
#[command(after_help = "EXAMPLES:
    kollect info book.azw3                Show decoded metadata
    kollect build-index -r kindleroot     Rebuild collections.json from folders
    kollect export -i kindleroot -o out   Copy collections into folders
    kollect rename -r kindleroot          Make filenames human-readable")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show decoded metadata for a single file
    Info {
        /// Document file (MOBI, AZW, AZW3, TPZ, AZW1, AZW2, PDF, ...)
        file: PathBuf,

        /// Device root the file lives under, for canonical-path identity
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
    /// Build collections.json from the folder layout under documents/
    BuildIndex {
        /// Kindle root directory
        #[arg(short, long)]
        root: PathBuf,
    },
    /// Copy collection members into per-collection folders
    Export {
        /// Input Kindle root directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rename documents to readable [author]-title filenames
    Rename {
        /// Kindle root directory
        #[arg(short, long)]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Info { file, root } => info(&file, &root),
        Command::BuildIndex { root } => build_index(&root),
        Command::Export { input, output } => export(&input, &output),
        Command::Rename { root } => rename(&root),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn info(file: &Path, root: &Path) -> kollect::Result<()> {
    let meta = Extractor::new(root).extract(file)?;
    println!("File: {}", meta.source_path.display());
    println!("Canonical: {}", meta.canonical_path);
    if let Some(title) = &meta.title {
        println!("Title: {title}");
    }
    if let Some(author) = &meta.author {
        println!("Author: {author}");
    }
    if let Some(asin) = &meta.asin {
        println!("ASIN: {asin}");
    }
    if let Some(doc_type) = &meta.document_type {
        println!("Type: {doc_type}");
    }
    if meta.is_sample {
        println!("Sample: yes");
    }
    println!("Token: {}", meta.token());
    Ok(())
}

fn build_index(root: &Path) -> kollect::Result<()> {
    let corpus = scan::scan(root)?;
    let index = scan::build_index(root, &corpus)?;
    collection::write_index(root, &index)?;
    println!(
        "Indexed {} files into {} collections",
        corpus.len(),
        index.len()
    );
    Ok(())
}

fn export(input: &Path, output: &Path) -> kollect::Result<()> {
    let corpus = scan::scan(input)?;
    let index = collection::read_index(input);
    organize::export_collections(output, &index, &corpus)?;
    println!("Exported {} collections", index.len());
    Ok(())
}

fn rename(root: &Path) -> kollect::Result<()> {
    let corpus = scan::scan(root)?;
    organize::rename_readable(&corpus)?;
    println!("Processed {} files", corpus.len());
    Ok(())
}
