//! `wardwatch` — command-line front end for the wardwatch API.
//!
//! # Usage
//!
//! ```
//! wardwatch --url http://localhost:8080 --user admin --password secret wards list --search east
//! wardwatch --config ~/.config/wardwatch/config.toml workers delete <id> <id>
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client::{ApiClient, ApiConfig, ListOptions, ReportFilter, Resource, ScanFilter};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wardwatch_core::{
  Patch,
  activity::{
    NewCitizenReport, NewScanLog, NewTracker, ReportPatch, ReportPriority, ReportStatus,
    ScanMethod, TrackerMethod,
  },
  household::{HouseholdPatch, HouseholdStatus, NewHousehold},
  ward::{NewWard, WardPatch},
  worker::{NewWorker, WorkerPatch},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wardwatch", about = "Administer wards, workers and households")]
struct Cli {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the wardwatch server (default: http://localhost:8080).
  #[arg(long, env = "WARDWATCH_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "WARDWATCH_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "WARDWATCH_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Dashboard totals.
  Stats,
  /// Server liveness and version.
  Health,
  #[command(subcommand)]
  Wards(WardCommand),
  #[command(subcommand)]
  Workers(WorkerCommand),
  #[command(subcommand)]
  Households(HouseholdCommand),
  /// Register a tracker device.
  Tracker {
    #[arg(long, value_parser = wire::<TrackerMethod>, default_value = "nfc")]
    method: TrackerMethod,
    #[arg(long)]
    house:  Option<Uuid>,
  },
  #[command(subcommand)]
  Scans(ScanCommand),
  #[command(subcommand)]
  Reports(ReportCommand),
}

/// Listing flags shared by wards, workers and households.
#[derive(Args, Debug)]
struct ListArgs {
  #[arg(long)]
  search:     Option<String>,
  /// Ward-name substring (workers and households only).
  #[arg(long)]
  ward:       Option<String>,
  #[arg(long)]
  from_date:  Option<String>,
  #[arg(long)]
  to_date:    Option<String>,
  #[arg(long)]
  sort_by:    Option<String>,
  #[arg(long)]
  sort_order: Option<String>,
  #[arg(long)]
  page:       Option<u32>,
  #[arg(long)]
  limit:      Option<u32>,
}

impl From<ListArgs> for ListOptions {
  fn from(a: ListArgs) -> Self {
    Self {
      search:     a.search,
      ward:       a.ward,
      from_date:  a.from_date,
      to_date:    a.to_date,
      sort_by:    a.sort_by,
      sort_order: a.sort_order,
      page:       a.page,
      limit:      a.limit,
    }
  }
}

#[derive(Subcommand, Debug)]
enum WardCommand {
  List(ListArgs),
  Get { id: Uuid },
  Add {
    #[arg(long)]
    name:       String,
    #[arg(long)]
    supervisor: Option<Uuid>,
  },
  Update {
    id:               Uuid,
    #[arg(long)]
    name:             Option<String>,
    #[arg(long, conflicts_with = "clear_supervisor")]
    supervisor:       Option<Uuid>,
    #[arg(long)]
    clear_supervisor: bool,
  },
  /// Delete one or more wards, reporting each outcome.
  Delete {
    #[arg(required = true)]
    ids: Vec<Uuid>,
  },
  /// Randomly reassign every worker to an existing ward.
  Redistribute,
}

#[derive(Subcommand, Debug)]
enum WorkerCommand {
  List(ListArgs),
  Get { id: Uuid },
  Add {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    contact: String,
    #[arg(long)]
    ward:    Option<Uuid>,
    #[arg(long)]
    active:  bool,
  },
  Update {
    id:         Uuid,
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    contact:    Option<String>,
    #[arg(long, conflicts_with = "clear_ward")]
    ward:       Option<Uuid>,
    #[arg(long)]
    clear_ward: bool,
    #[arg(long)]
    active:     Option<bool>,
  },
  Delete {
    #[arg(required = true)]
    ids: Vec<Uuid>,
  },
}

#[derive(Subcommand, Debug)]
enum HouseholdCommand {
  List(ListArgs),
  Get { id: Uuid },
  Add {
    #[arg(long)]
    owner:   String,
    #[arg(long)]
    address: String,
    #[arg(long, value_parser = wire::<HouseholdStatus>, default_value = "active")]
    status:  HouseholdStatus,
    #[arg(long)]
    ward:    Option<Uuid>,
    #[arg(long)]
    tracker: Option<i64>,
  },
  Update {
    id:            Uuid,
    #[arg(long)]
    owner:         Option<String>,
    #[arg(long)]
    address:       Option<String>,
    #[arg(long, value_parser = wire::<HouseholdStatus>)]
    status:        Option<HouseholdStatus>,
    #[arg(long, conflicts_with = "clear_ward")]
    ward:          Option<Uuid>,
    #[arg(long)]
    clear_ward:    bool,
    #[arg(long, conflicts_with = "clear_tracker")]
    tracker:       Option<i64>,
    #[arg(long)]
    clear_tracker: bool,
  },
  Delete {
    #[arg(required = true)]
    ids: Vec<Uuid>,
  },
}

#[derive(Subcommand, Debug)]
enum ScanCommand {
  List {
    #[arg(long)]
    house:  Option<Uuid>,
    #[arg(long)]
    worker: Option<Uuid>,
    #[arg(long, value_parser = wire::<ScanMethod>)]
    method: Option<ScanMethod>,
    #[arg(long)]
    synced: Option<bool>,
    #[arg(long)]
    page:   Option<u32>,
    #[arg(long)]
    limit:  Option<u32>,
  },
  Add {
    #[arg(long)]
    house:  Uuid,
    #[arg(long)]
    worker: Option<Uuid>,
    #[arg(long, allow_hyphen_values = true)]
    lat:    Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon:    Option<f64>,
    #[arg(long, value_parser = wire::<ScanMethod>, default_value = "nfc")]
    method: ScanMethod,
    #[arg(long)]
    synced: bool,
  },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
  List {
    #[arg(long)]
    search:   Option<String>,
    #[arg(long, value_parser = wire::<ReportStatus>)]
    status:   Option<ReportStatus>,
    #[arg(long, value_parser = wire::<ReportPriority>)]
    priority: Option<ReportPriority>,
    #[arg(long)]
    page:     Option<u32>,
    #[arg(long)]
    limit:    Option<u32>,
  },
  Add {
    #[arg(long)]
    house:    Uuid,
    #[arg(long)]
    contact:  String,
    #[arg(long, value_parser = wire::<ReportPriority>)]
    priority: Option<ReportPriority>,
    #[arg(long)]
    notes:    Option<String>,
  },
  Update {
    id:          Uuid,
    #[arg(long, value_parser = wire::<ReportStatus>)]
    status:      Option<ReportStatus>,
    #[arg(long, value_parser = wire::<ReportPriority>)]
    priority:    Option<ReportPriority>,
    #[arg(long)]
    notes:       Option<String>,
    #[arg(long, conflicts_with = "notes")]
    clear_notes: bool,
  },
}

/// Parse an enum from its JSON wire name (`in_progress`, `qr_code`, …).
fn wire<T: DeserializeOwned>(s: &str) -> Result<T, String> {
  serde_json::from_value(serde_json::Value::String(s.to_string()))
    .map_err(|_| format!("unrecognised value {s:?}"))
}

/// `--x` / `--clear-x` pair → sparse patch field.
fn patch<T>(value: Option<T>, clear: bool) -> Patch<T> {
  match (value, clear) {
    (Some(v), _) => Patch::Set(v),
    (None, true) => Patch::Clear,
    (None, false) => Patch::Keep,
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let file_cfg: ConfigFile = if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: cli
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: cli
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: cli
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, cli.command).await
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("serialising output")?);
  Ok(())
}

/// Print each bulk-delete outcome; fail if any id failed.
fn report_deletes(outcomes: Vec<(Uuid, Result<()>)>) -> Result<()> {
  let mut failed = 0;
  for (id, outcome) in &outcomes {
    match outcome {
      Ok(()) => println!("deleted {id}"),
      Err(e) => {
        failed += 1;
        eprintln!("failed {id}: {e:#}");
      }
    }
  }
  if failed > 0 {
    anyhow::bail!("{failed} of {} deletions failed", outcomes.len());
  }
  Ok(())
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Stats => print(&client.stats().await?),
    Command::Health => print(&client.health().await?),
    Command::Wards(cmd) => wards(client, cmd).await,
    Command::Workers(cmd) => workers(client, cmd).await,
    Command::Households(cmd) => households(client, cmd).await,
    Command::Tracker { method, house } => {
      print(&client.add_tracker(&NewTracker { method, house_id: house }).await?)
    }
    Command::Scans(cmd) => scans(client, cmd).await,
    Command::Reports(cmd) => reports(client, cmd).await,
  }
}

async fn wards(client: &ApiClient, cmd: WardCommand) -> Result<()> {
  match cmd {
    WardCommand::List(args) => print(&client.list_wards(&args.into()).await?),
    WardCommand::Get { id } => print(&client.get_ward(id).await?),
    WardCommand::Add { name, supervisor } => {
      let input = NewWard { ward_name: name, supervisor_id: supervisor };
      print(&client.add_ward(&input).await?)
    }
    WardCommand::Update { id, name, supervisor, clear_supervisor } => {
      let patch = WardPatch {
        ward_name:     name,
        supervisor_id: patch(supervisor, clear_supervisor),
      };
      print(&client.update_ward(id, &patch).await?)
    }
    WardCommand::Delete { ids } => {
      report_deletes(client.delete_many(Resource::Wards, &ids).await)
    }
    WardCommand::Redistribute => print(&client.redistribute_workers().await?),
  }
}

async fn workers(client: &ApiClient, cmd: WorkerCommand) -> Result<()> {
  match cmd {
    WorkerCommand::List(args) => print(&client.list_workers(&args.into()).await?),
    WorkerCommand::Get { id } => print(&client.get_worker(id).await?),
    WorkerCommand::Add { name, contact, ward, active } => {
      let input = NewWorker {
        worker_name:    name,
        contact_number: contact,
        ward_id:        ward,
        status:         active,
      };
      print(&client.add_worker(&input).await?)
    }
    WorkerCommand::Update { id, name, contact, ward, clear_ward, active } => {
      let patch = WorkerPatch {
        worker_name:    name,
        contact_number: contact,
        ward_id:        patch(ward, clear_ward),
        status:         active,
      };
      print(&client.update_worker(id, &patch).await?)
    }
    WorkerCommand::Delete { ids } => {
      report_deletes(client.delete_many(Resource::Workers, &ids).await)
    }
  }
}

async fn households(client: &ApiClient, cmd: HouseholdCommand) -> Result<()> {
  match cmd {
    HouseholdCommand::List(args) => print(&client.list_households(&args.into()).await?),
    HouseholdCommand::Get { id } => print(&client.get_household(id).await?),
    HouseholdCommand::Add { owner, address, status, ward, tracker } => {
      let input = NewHousehold {
        owner_number: owner,
        address,
        status,
        ward_id: ward,
        tracker_id: tracker,
      };
      print(&client.add_household(&input).await?)
    }
    HouseholdCommand::Update {
      id,
      owner,
      address,
      status,
      ward,
      clear_ward,
      tracker,
      clear_tracker,
    } => {
      let patch = HouseholdPatch {
        owner_number: owner,
        address,
        status,
        ward_id: patch(ward, clear_ward),
        tracker_id: patch(tracker, clear_tracker),
      };
      print(&client.update_household(id, &patch).await?)
    }
    HouseholdCommand::Delete { ids } => {
      report_deletes(client.delete_many(Resource::Households, &ids).await)
    }
  }
}

async fn scans(client: &ApiClient, cmd: ScanCommand) -> Result<()> {
  match cmd {
    ScanCommand::List { house, worker, method, synced, page, limit } => {
      let filter = ScanFilter {
        house_id: house,
        worker_id: worker,
        method,
        synced,
        page,
        limit,
      };
      print(&client.list_scans(&filter).await?)
    }
    ScanCommand::Add { house, worker, lat, lon, method, synced } => {
      let input = NewScanLog {
        house_id:      house,
        worker_id:     worker,
        gps_latitude:  lat,
        gps_longitude: lon,
        sync_status:   synced,
        scan_method:   method,
      };
      print(&client.record_scan(&input).await?)
    }
  }
}

async fn reports(client: &ApiClient, cmd: ReportCommand) -> Result<()> {
  match cmd {
    ReportCommand::List { search, status, priority, page, limit } => {
      let filter = ReportFilter { search, status, priority, page, limit };
      print(&client.list_reports(&filter).await?)
    }
    ReportCommand::Add { house, contact, priority, notes } => {
      let input = NewCitizenReport {
        house_id:         house,
        citizen_contact:  contact,
        priority,
        additional_notes: notes,
      };
      print(&client.file_report(&input).await?)
    }
    ReportCommand::Update { id, status, priority, notes, clear_notes } => {
      let patch = ReportPatch {
        status,
        priority: priority.map_or(Patch::Keep, Patch::Set),
        additional_notes: patch(notes, clear_notes),
      };
      print(&client.update_report(id, &patch).await?)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_names_parse() {
    assert_eq!(wire::<ReportStatus>("in_progress").unwrap(), ReportStatus::InProgress);
    assert_eq!(wire::<TrackerMethod>("qr_code").unwrap(), TrackerMethod::QrCode);
    assert!(wire::<ScanMethod>("carrier-pigeon").is_err());
  }

  #[test]
  fn clear_flag_maps_to_patch_clear() {
    assert_eq!(patch::<Uuid>(None, true), Patch::Clear);
    assert_eq!(patch::<Uuid>(None, false), Patch::Keep);
    let id = Uuid::new_v4();
    assert_eq!(patch(Some(id), false), Patch::Set(id));
  }

  #[test]
  fn subcommands_parse() {
    let cli = Cli::try_parse_from([
      "wardwatch",
      "--url",
      "http://example.test",
      "reports",
      "update",
      "00000000-0000-4000-8000-000000000000",
      "--status",
      "resolved",
      "--clear-notes",
    ])
    .unwrap();
    match cli.command {
      Command::Reports(ReportCommand::Update { status, clear_notes, .. }) => {
        assert_eq!(status, Some(ReportStatus::Resolved));
        assert!(clear_notes);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn clear_conflicts_with_value() {
    let result = Cli::try_parse_from([
      "wardwatch",
      "workers",
      "update",
      "00000000-0000-4000-8000-000000000000",
      "--ward",
      "00000000-0000-4000-8000-000000000001",
      "--clear-ward",
    ]);
    assert!(result.is_err());
  }
}
