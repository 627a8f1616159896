// LiveTail - GPL-3.0-or-later
// This file is part of LiveTail.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// LiveTail is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LiveTail is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LiveTail.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use livetail::api::{HttpLogsApi, LogsApi};
use livetail::config::Settings;
use livetail::core::{histogram, Filter, Namespace, Source, TimeRange};
use livetail::state::{LogsAction, LogsState};
use livetail::ui::LogTable;
use livetail::viewer::LiveSession;
#[cfg(feature = "ram-profiling")]
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "livetail")]
#[command(author = "Daniel Freiermuth")]
#[command(version)]
#[command(about = "Tail a log-viewer backend in the terminal", long_about = None)]
struct Args {
    /// Base URL of the log-viewer API
    #[arg(long)]
    server: Option<String>,

    /// Source id to open instead of the first one
    #[arg(long)]
    source: Option<String>,

    /// Namespace as `database` or `database.retention_policy`
    #[arg(long)]
    namespace: Option<String>,

    /// Free-text search term
    #[arg(long, default_value = "")]
    search: String,

    /// Tag filter such as `host==web-1` or `appname=~^nginx` (repeatable)
    #[arg(long = "filter", value_name = "EXPR")]
    filters: Vec<String>,

    /// Lower bound of the time range (RFC 3339)
    #[arg(long)]
    lower: Option<String>,

    /// Upper bound of the time range (RFC 3339); pins the window
    #[arg(long)]
    upper: Option<String>,

    /// Polling period in seconds
    #[arg(long)]
    interval: Option<u64>,

    /// Number of table rows to print
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Exit after the first dataset is shown
    #[arg(long)]
    once: bool,

    /// Persist server, source, namespace and interval as new defaults
    #[arg(long)]
    save_settings: bool,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

fn parse_time(text: &str) -> anyhow::Result<DateTime<Utc>> {
    let at = DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("Invalid timestamp {text:?}"))?;
    Ok(at.with_timezone(&Utc))
}

fn time_range(args: &Args) -> anyhow::Result<TimeRange> {
    let lower = args.lower.as_deref().map(parse_time).transpose()?;
    let upper = args.upper.as_deref().map(parse_time).transpose()?;

    match (lower, upper) {
        (lower, None) => Ok(TimeRange::live(lower)),
        (Some(lower), Some(upper)) => Ok(TimeRange::pinned(lower, upper)),
        (None, Some(_)) => bail!("--upper needs --lower"),
    }
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(server) = &args.server {
        settings.server_url.clone_from(server);
    }
    if let Some(source) = &args.source {
        settings.source_id = Some(source.clone());
    }
    if let Some(namespace) = &args.namespace {
        settings.namespace = Some(Namespace::parse(namespace));
    }
    if let Some(interval) = args.interval {
        settings.poll_interval_secs = interval;
    }
}

fn initial_state(settings: &Settings, args: &Args) -> anyhow::Result<LogsState> {
    let mut logs = LogsState::default();
    logs.current_source = settings.source_id.as_ref().map(|id| Source {
        id: id.clone(),
        name: id.clone(),
        url: String::new(),
    });
    logs.current_namespace.clone_from(&settings.namespace);

    logs.apply(LogsAction::SetTimeRange(time_range(args)?));
    logs.apply(LogsAction::SetSearchTerm(args.search.clone()));
    for expression in &args.filters {
        let filter = Filter::parse(expression)
            .with_context(|| format!("Invalid filter {expression:?}"))?;
        logs.apply(LogsAction::AddFilter(filter));
    }
    Ok(logs)
}

fn print_window<A: LogsApi + 'static>(session: &mut LiveSession<A>, limit: usize) {
    let anchor = session.table_scroll_to_row();
    let logs = session.logs();
    let buffer = logs.display_buffer();
    let status = if session.window().is_live(logs) {
        "live"
    } else {
        "paused"
    };

    let groups: Vec<String> = histogram::group_totals(&logs.histogram)
        .iter()
        .map(|(group, total)| format!("{group}: {total}"))
        .collect();
    println!(
        "-- {} rows, {} events in range [{}], {status}",
        buffer.len(),
        logs.histogram_total(),
        groups.join(", ")
    );
    if let Some(row) = anchor {
        tracing::debug!("Table anchored at row {row}");
    }
    print!("{}", LogTable::render(&buffer, logs.log_config(), limit));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g. RUST_LOG=livetail=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "LiveTail starting up (version {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let args = Args::parse();

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        tracing::info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracing::info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    let mut settings = Settings::load();
    apply_overrides(&mut settings, &args);
    if args.save_settings {
        settings.save()?;
    }

    let api = HttpLogsApi::new(&settings.server_url)
        .with_context(|| format!("Cannot use server {}", settings.server_url))?;
    tracing::info!("Connecting to {}", api.base_url());

    let logs = initial_state(&settings, &args)?;
    let mut session = LiveSession::new(
        Arc::new(api),
        settings.log_config_url(),
        settings.poll_interval(),
        logs,
    );
    session.mount();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut shown = session.logs().data_version();

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for Ctrl-C: {e}");
                }
                tracing::info!("Interrupted, shutting down");
                break;
            }
            running = session.step() => {
                if !running {
                    if session.window().is_mounted() {
                        tracing::info!("Range is pinned or polling is off, nothing left to wait for");
                    }
                    break;
                }
            }
        }

        let version = session.logs().data_version();
        if version != shown {
            shown = version;
            print_window(&mut session, args.limit);
            if args.once {
                break;
            }
        }
    }

    session.unmount();
    Ok(())
}
