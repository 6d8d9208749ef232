//! Oxmon Silence - origin-mark tooling for silence windows
//!
//! The `oxmon-silence` command inspects and maintains the local record of
//! silence-window derivations (which window was edited into which, and
//! whether the original was replaced or kept).
//!
//! ## Commands
//!
//! - `status`: show recorded origin marks and the retention setting
//! - `ttl`: change the retention setting
//! - `prune`: apply the retention TTL now
//! - `clear`: drop all origin marks
//! - `export` / `import`: move marks between machines as versioned JSON
//! - `edit`: edit a window on the backend, replacing or cloning it
//! - `sync`: reconcile marks against the backend's live window list

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use tracing::{warn, Level};

use oxmon_origins::{
    export_filename, export_json, filter_active, load_origins, load_ttl, merge, parse_import,
    save_origins, save_ttl, OriginStore, RetentionTtl,
};
use oxmon_silence::{
    edit_window, reconcile_with_backend, EditRequest, HttpSilenceApi, NoticeSeverity,
    WindowPayload,
};
use oxmon_state::{DirKeyValueStore, KeyValueStore};

mod telemetry;

#[derive(Parser)]
#[command(name = "oxmon-silence")]
#[command(author = "Oxmon Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Silence-window origin marks for the Oxmon console", long_about = None)]
struct Cli {
    /// Directory holding the local state files
    #[arg(long, global = true, default_value = ".oxmon")]
    data_dir: PathBuf,

    /// Base URL of the Oxmon backend (required by `edit` and `sync`)
    #[arg(long, global = true, env = "OXMON_API_URL")]
    api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show recorded origin marks and the retention setting
    Status,

    /// Set how long origin marks are retained
    Ttl {
        /// Retention in days (1, 7, or 30)
        days: u32,
    },

    /// Drop origin marks older than the retention setting
    Prune,

    /// Drop all origin marks
    Clear,

    /// Write all origin marks to a versioned JSON file
    Export {
        /// Output path (default: silence-origin-marks-<timestamp>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Merge origin marks from an exported JSON file
    Import {
        /// File to import (.json)
        file: PathBuf,
    },

    /// Edit a silence window, replacing or cloning the original
    Edit {
        /// Id of the window being edited
        source_id: String,

        /// Alert pattern the new window suppresses
        #[arg(long)]
        pattern: String,

        /// Start of the new window (RFC3339)
        #[arg(long)]
        start: String,

        /// End of the new window (RFC3339)
        #[arg(long)]
        end: String,

        /// Recurrence rule for the new window
        #[arg(long)]
        recurrence: Option<String>,

        /// Delete the original window once the new one exists
        #[arg(long)]
        replace: bool,
    },

    /// Reconcile origin marks against the backend's live windows
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    let kv = DirKeyValueStore::new(&cli.data_dir)
        .with_context(|| format!("failed to open data dir {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::Status => cmd_status(&kv),
        Commands::Ttl { days } => cmd_ttl(&kv, days),
        Commands::Prune => cmd_prune(&kv),
        Commands::Clear => cmd_clear(&kv),
        Commands::Export { out } => cmd_export(&kv, out.as_deref()),
        Commands::Import { file } => cmd_import(&kv, &file),
        Commands::Edit {
            source_id,
            pattern,
            start,
            end,
            recurrence,
            replace,
        } => {
            let api = backend_api(&cli.api_url)?;
            let payload = WindowPayload {
                pattern,
                start_time: parse_rfc3339(&start)?,
                end_time: parse_rfc3339(&end)?,
                recurrence,
            };
            let request = EditRequest {
                source_id,
                payload,
                replace_original: replace,
            };
            cmd_edit(&api, &kv, &request).await
        }
        Commands::Sync => {
            let api = backend_api(&cli.api_url)?;
            cmd_sync(&api, &kv).await
        }
    }
}

fn backend_api(api_url: &Option<String>) -> Result<HttpSilenceApi> {
    let url = api_url
        .as_deref()
        .context("--api-url (or OXMON_API_URL) is required for this command")?;
    Ok(HttpSilenceApi::new(url))
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("'{raw}' is not an RFC3339 timestamp"))
}

/// Persist the store, degrading to a warning on failure. Origin marks are
/// a convenience; losing them must never fail the command.
fn persist_best_effort(kv: &dyn KeyValueStore, store: &OriginStore) {
    if let Err(err) = save_origins(kv, store) {
        warn!(%err, "could not persist origin marks; changes are lost after this run");
    }
}

fn cmd_status(kv: &dyn KeyValueStore) -> Result<()> {
    let now = Utc::now();
    let store = load_origins(kv, now);
    let ttl = load_ttl(kv);

    let counts = store.mode_counts();
    println!(
        "Origin marks: {} (replaced {}, cloned {})",
        store.len(),
        counts.replaced,
        counts.cloned
    );
    println!("Retention: {ttl}");

    if store.has_any() {
        let mut marks: Vec<_> = store.iter().collect();
        marks.sort_by(|(id_a, a), (id_b, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| id_a.cmp(id_b))
        });

        println!();
        println!("{:<38} {:<38} {:<9} CREATED", "WINDOW", "SOURCE", "MODE");
        for (id, meta) in marks {
            println!(
                "{:<38} {:<38} {:<9} {}",
                id,
                meta.source_id,
                meta.mode,
                meta.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            );
        }
    }
    Ok(())
}

fn cmd_ttl(kv: &dyn KeyValueStore, days: u32) -> Result<()> {
    let Some(ttl) = RetentionTtl::from_days(days) else {
        bail!("retention must be 1, 7, or 30 days");
    };
    save_ttl(kv, ttl).context("failed to persist retention setting")?;
    println!("Retention set to {ttl}");
    Ok(())
}

fn cmd_prune(kv: &dyn KeyValueStore) -> Result<()> {
    let now = Utc::now();
    let store = load_origins(kv, now);
    let ttl = load_ttl(kv);

    match filter_active(&store, ttl.duration(), now) {
        Cow::Borrowed(_) => println!("Nothing to prune ({} marks within {ttl})", store.len()),
        Cow::Owned(pruned) => {
            let dropped = store.len() - pruned.len();
            persist_best_effort(kv, &pruned);
            println!("Pruned {dropped} marks, {} remaining", pruned.len());
        }
    }
    Ok(())
}

fn cmd_clear(kv: &dyn KeyValueStore) -> Result<()> {
    persist_best_effort(kv, &OriginStore::new());
    println!("All origin marks cleared");
    Ok(())
}

fn cmd_export(kv: &dyn KeyValueStore, out: Option<&Path>) -> Result<()> {
    let now = Utc::now();
    let store = load_origins(kv, now);
    let ttl = load_ttl(kv);

    let document = export_json(&store, ttl, now)?;
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export_filename(now)));
    fs::write(&path, document).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Exported {} marks to {}", store.len(), path.display());
    Ok(())
}

fn cmd_import(kv: &dyn KeyValueStore, file: &Path) -> Result<()> {
    if file.extension().and_then(|e| e.to_str()) != Some("json") {
        bail!("import expects a .json file");
    }
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    let now = Utc::now();
    let imported = parse_import(&text, now)?;

    let current = load_origins(kv, now);
    let merged = merge(&current, &imported);
    let added = merged.len() - current.len();
    persist_best_effort(kv, &merged);

    println!(
        "Imported {} marks ({added} new), {} total",
        imported.len(),
        merged.len()
    );
    Ok(())
}

async fn cmd_edit(api: &HttpSilenceApi, kv: &dyn KeyValueStore, request: &EditRequest) -> Result<()> {
    let now = Utc::now();
    let mut store = load_origins(kv, now);

    let report = edit_window(api, &mut store, request, now).await?;

    for notice in &report.notices {
        match notice.severity {
            NoticeSeverity::Success => println!("ok: {}", notice.message),
            NoticeSeverity::Warning => println!("warning: {}", notice.message),
            NoticeSeverity::Error => eprintln!("error: {}", notice.message),
        }
    }

    match (&report.created_id, report.recorded_mode) {
        (Some(id), Some(mode)) => {
            persist_best_effort(kv, &store);
            println!("New window {id} marked as {mode}");
        }
        (Some(id), None) => println!("New window {id} created (not marked)"),
        _ => println!("New window created, id could not be resolved (not marked)"),
    }
    Ok(())
}

async fn cmd_sync(api: &HttpSilenceApi, kv: &dyn KeyValueStore) -> Result<()> {
    let now = Utc::now();
    let store = load_origins(kv, now);
    let ttl = load_ttl(kv);

    match reconcile_with_backend(api, &store, ttl, now).await? {
        Cow::Borrowed(_) => println!("Origin marks already in sync ({} kept)", store.len()),
        Cow::Owned(reconciled) => {
            let dropped = store.len() - reconciled.len();
            persist_best_effort(kv, &reconciled);
            println!("Dropped {dropped} stale marks, {} remaining", reconciled.len());
        }
    }
    Ok(())
}
