use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use h3m_parser::diagnostics::CollectSink;
use h3m_parser::{
    decode_file, find_duplicates, fingerprint, validate, Catalogs, Codepage, DecodeOptions,
    DetectingDecoder, DiagnosticSink, Map, StringDecoder, TracingSink, Utf8Lossy,
};

#[derive(Parser)]
#[command(name = "h3m")]
#[command(about = "Decode and inspect Heroes of Might and Magic III maps")]
struct Cli {
    /// Directory with name tables and template definitions
    #[arg(long, global = true, env = "H3M_TABLES")]
    tables: Option<PathBuf>,

    /// Text encoding: a codepage label such as windows-1251, `utf-8`, or `auto`
    #[arg(long, global = true, default_value = "windows-1252")]
    encoding: String,

    /// Soft ceiling on string lengths, in bytes
    #[arg(long, global = true, default_value_t = 30_000)]
    max_string_len: usize,

    /// Do not report non-zero bytes after the last section
    #[arg(long, global = true)]
    allow_trailing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a map as JSON
    Dump {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Decode every map under the given paths and report failures
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Group maps with identical terrain, objects and events
    Dupes {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List templates and objects missing from the template catalog
    Validate { file: PathBuf },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("h3m_parser=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn string_decoder(label: &str) -> Result<Arc<dyn StringDecoder + Send + Sync>, String> {
    match label.to_ascii_lowercase().as_str() {
        "auto" => Ok(Arc::new(DetectingDecoder::new(Codepage::WINDOWS_1252))),
        "utf-8" | "utf8" => Ok(Arc::new(Utf8Lossy)),
        other => Codepage::for_label(other)
            .map(|cp| Arc::new(cp) as Arc<dyn StringDecoder + Send + Sync>)
            .ok_or_else(|| format!("unknown encoding: {label}")),
    }
}

/// Every `.h3m` file under `paths`, directories walked recursively
fn collect_maps(paths: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("h3m"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn decode(path: &Path, catalogs: &Catalogs, options: &DecodeOptions, sink: &dyn DiagnosticSink) -> h3m_parser::Result<Map> {
    let span = tracing::info_span!("map", path = %path.display());
    let _enter = span.enter();
    decode_file(path, catalogs, options, sink)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let catalogs = match &cli.tables {
        Some(dir) => Catalogs::load_dir(dir)?,
        None => Catalogs::new(),
    };
    let options = DecodeOptions {
        max_string_len: cli.max_string_len,
        check_trailing: !cli.allow_trailing,
        strings: string_decoder(&cli.encoding)?,
    };

    match cli.command {
        Commands::Dump { file, pretty } => {
            let map = decode(&file, &catalogs, &options, &TracingSink)?;
            let json = if pretty {
                serde_json::to_string_pretty(&map)?
            } else {
                serde_json::to_string(&map)?
            };
            println!("{json}");
        }
        Commands::Check { paths } => {
            let files = collect_maps(&paths)?;
            let mut failed = 0usize;
            for file in &files {
                let sink = CollectSink::new();
                match decode(file, &catalogs, &options, &sink) {
                    Ok(map) => {
                        println!(
                            "ok    {} [{}] {} objects, {} diagnostics",
                            file.display(),
                            map.format().short_name(),
                            map.objects.len(),
                            sink.len()
                        );
                        for diagnostic in sink.into_vec() {
                            tracing::debug!(path = %file.display(), "{diagnostic}");
                        }
                    }
                    Err(err) => {
                        failed += 1;
                        println!("FAIL  {} ({:?}): {err}", file.display(), err.class());
                    }
                }
            }
            eprintln!("{} maps, {} failed", files.len(), failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::Dupes { paths } => {
            let files = collect_maps(&paths)?;
            let mut entries = Vec::with_capacity(files.len());
            for file in files {
                match decode(&file, &catalogs, &options, &h3m_parser::NullSink) {
                    Ok(map) => entries.push((file, fingerprint(&map)?)),
                    Err(err) => tracing::warn!(path = %file.display(), "skipped: {err}"),
                }
            }
            let groups = find_duplicates(entries.iter().map(|(file, fp)| ((file, *fp), *fp)));
            for group in &groups {
                println!("{}", group[0].1);
                for (file, _) in group {
                    println!("  {}", file.display());
                }
            }
            eprintln!("{} duplicate groups", groups.len());
        }
        Commands::Validate { file } => {
            if cli.tables.is_none() {
                tracing::warn!("no --tables given; every template will be reported");
            }
            let map = decode(&file, &catalogs, &options, &TracingSink)?;
            let findings = validate(&map, &catalogs);
            for finding in &findings {
                println!("{finding}");
            }
            eprintln!("{} findings", findings.len());
        }
    }

    Ok(())
}
