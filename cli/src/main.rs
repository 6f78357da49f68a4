//! unform CLI - document structure and schema extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use unform::render::publication_to_json;
use unform::{AnnotationSource, DocumentSection, JsonFormat, SchemaEngine, SchemaOptions, Unform};

#[derive(Parser)]
#[command(name = "unform")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Reconstruct document structure and infer field schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a recorded layout into JSON sections
    Reconstruct {
        /// Recorded layout file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Source file name recorded in the output (defaults to the layout file name)
        #[arg(long)]
        filename: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Fail on ambiguous table structure instead of dropping rows
        #[arg(long)]
        strict: bool,

        /// Keep leaf values as reconstructed strings
        #[arg(long)]
        raw: bool,

        /// Keep tables split by page breaks as separate sections
        #[arg(long)]
        no_merge: bool,
    },

    /// Infer the field schema of a recorded layout
    Schema {
        /// Recorded layout file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Schema topic name
        #[arg(short, long)]
        topic: String,

        /// Data source identifier
        #[arg(long, env = "UNFORM_DATA_SOURCE", default_value = "")]
        data_source: String,

        /// Annotation source JSON (`docText` and entities)
        #[arg(short, long, value_name = "FILE")]
        annotations: Option<PathBuf>,

        /// Additional field names to skip
        #[arg(long, value_name = "KEY")]
        skip: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show reconstruction statistics
    Info {
        /// Recorded layout file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Reconstruct {
            input,
            filename,
            output,
            compact,
            strict,
            raw,
            no_merge,
        }) => {
            let mut unform = Unform::new();
            if strict {
                unform = unform.strict();
            }
            if raw {
                unform = unform.raw_values();
            }
            if no_merge {
                unform = unform.without_page_merging();
            }
            cmd_reconstruct(
                &unform,
                &input,
                filename.as_deref(),
                output.as_deref(),
                json_format(compact),
            )
        }
        Some(Commands::Schema {
            input,
            topic,
            data_source,
            annotations,
            skip,
            output,
            compact,
        }) => {
            let mut options = SchemaOptions::new().with_data_source(data_source);
            for key in skip {
                options = options.skip_key(key);
            }
            cmd_schema(
                &input,
                &topic,
                options,
                annotations.as_deref(),
                output.as_deref(),
                json_format(compact),
            )
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: unform <COMMAND> <LAYOUT>".yellow());
            println!("       unform --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_reconstruct(
    unform: &Unform,
    input: &Path,
    filename: Option<&str>,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = match filename {
        Some(name) => unform.reconstruct(&fs::read(input)?, name)?,
        None => unform.reconstruct_file(input)?,
    };

    let stats = &result.document.stats;
    if stats.degraded_count > 0 || stats.dropped_rows > 0 {
        eprintln!(
            "{} {} degraded table(s), {} dropped row(s)",
            "Warning:".yellow().bold(),
            stats.degraded_count,
            stats.dropped_rows
        );
    }

    let json = result.to_json(format)?;
    write_output(output, &json)
}

fn cmd_schema(
    input: &Path,
    topic: &str,
    options: SchemaOptions,
    annotations: Option<&Path>,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let annotations = match annotations {
        Some(path) => AnnotationSource::from_json(&fs::read_to_string(path)?)?,
        None => AnnotationSource::default(),
    };

    let result = Unform::new().reconstruct_file(input)?;
    let engine = SchemaEngine::new(options);
    let outcome = result.infer_schema(&engine, &annotations, topic)?;
    log::info!("schema fingerprint {}", outcome.fingerprint);

    let json = publication_to_json(&outcome.publication, format)?;
    write_output(output, &json)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = Unform::new().reconstruct_file(input)?;
    let doc = &result.document;
    let stats = &doc.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Sections".bold(), doc.sections().len());

    println!();
    println!("{}", "Reconstruction Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Text blocks".bold(), stats.text_count);
    println!("{}: {}", "Merged across pages".bold(), stats.merged_count);
    println!("{}: {}", "Degraded".bold(), stats.degraded_count);
    println!("{}: {}", "Dropped rows".bold(), stats.dropped_rows);

    println!();
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (i, section) in doc.sections().iter().enumerate() {
        match section {
            DocumentSection::Table(table) => println!(
                "  {} table {}, {} row(s)",
                format!("{:>3}", i + 1).dimmed(),
                table.shape,
                table.rows.len()
            ),
            DocumentSection::Text(text) => println!(
                "  {} text {}",
                format!("{:>3}", i + 1).dimmed(),
                text.header.as_deref().unwrap_or("(untitled)")
            ),
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unform".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document structure and schema extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unform".dimmed());
    println!("License: MIT");
}
