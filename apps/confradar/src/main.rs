use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use client_core::{
    ConferenceSource, ConferenceView, DetailState, HttpConferenceClient, ListState, StaticSource,
};
use shared::{
    filter::{FilterCriteria, SortKey, SortOrder},
    preferences::{
        DateFormat, DisplaySettings, NotificationSettings, PreferenceMutation, Theme,
        TimezoneMode, UserPreferences, ViewMode,
    },
};
use storage::{Catalog, FileStore, PreferenceStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;

use render::DisplayOptions;

#[derive(Parser, Debug)]
#[command(name = "confradar", about = "Browse academic conference deadlines")]
struct Cli {
    /// Conference API to query.
    #[arg(
        long,
        env = "CONFRADAR_SERVER_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    server_url: String,
    /// Use the bundled catalog instead of a server.
    #[arg(long)]
    offline: bool,
    /// Use this JSON catalog instead of a server.
    #[arg(long, conflicts_with = "offline")]
    catalog: Option<PathBuf>,
    /// Simulated latency for offline sources, in milliseconds.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
    /// Directory holding persisted preferences.
    #[arg(long, env = "CONFRADAR_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List conferences matching the given filters.
    List(ListArgs),
    /// Show one conference.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Deadlines due in the next few days.
    Upcoming {
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Inspect or change persisted preferences.
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
    /// Report data-quality issues in the catalog.
    Validate,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// A shared query string such as `search=neur&sortBy=name`; flags override it.
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// Repeat to match any of several tags.
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    sort: Option<SortKey>,
    #[arg(long)]
    order: Option<SortOrder>,
    /// Only conferences marked as favorite.
    #[arg(long)]
    favorites: bool,
    /// Override the persisted view mode for this run.
    #[arg(long)]
    view: Option<ViewMode>,
    #[arg(long)]
    json: bool,
    /// Print the query string for these filters and exit.
    #[arg(long)]
    print_query: bool,
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    Show,
    Theme { theme: Theme },
    View { mode: ViewMode },
    Favorite { id: String },
    Timezone {
        mode: TimezoneMode,
        /// Zone used in local mode, e.g. `Europe/Berlin` or `UTC+02:00`;
        /// `system` follows the machine's timezone.
        #[arg(long)]
        label: Option<String>,
    },
    DateFormat { format: DateFormat },
    Notifications {
        #[arg(long)]
        enabled: bool,
        #[arg(long)]
        days: Option<u32>,
    },
    Reset,
}

impl ListArgs {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = self
            .query
            .as_deref()
            .map(FilterCriteria::from_query_string)
            .unwrap_or_default();
        if let Some(search) = &self.search {
            criteria = criteria.with_search(search.clone());
        }
        if !self.tags.is_empty() {
            criteria = criteria.with_tags(self.tags.iter().cloned());
        }
        if self.year.is_some() {
            criteria = criteria.with_year(self.year);
        }
        if let Some(location) = &self.location {
            criteria = criteria.with_location(Some(location.clone()));
        }
        let sort_by = self.sort.unwrap_or(criteria.sort_by);
        let sort_order = self.order.unwrap_or(criteria.sort_order);
        criteria.sorted_by(sort_by, sort_order)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    match &cli.command {
        Command::List(args) => list(&cli, args).await,
        Command::Show { id, json } => show(&cli, id, *json).await,
        Command::Upcoming { days, json } => upcoming(&cli, *days, *json).await,
        Command::Prefs { action } => prefs(&cli, action.as_ref().unwrap_or(&PrefsAction::Show)),
        Command::Validate => validate(&cli),
    }
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
    Ok(base.join("confradar"))
}

fn open_preferences(cli: &Cli) -> Result<PreferenceStore> {
    let dir = data_dir(cli)?;
    debug!(dir = %dir.display(), "opening preferences");
    Ok(PreferenceStore::open(Arc::new(FileStore::new(dir))))
}

fn load_catalog(cli: &Cli) -> Result<Catalog> {
    match &cli.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog '{}'", path.display())),
        None => Catalog::embedded().context("bundled catalog is invalid"),
    }
}

fn build_source(cli: &Cli) -> Result<Arc<dyn ConferenceSource>> {
    if cli.offline || cli.catalog.is_some() {
        let source = StaticSource::new(load_catalog(cli)?)
            .with_latency(Duration::from_millis(cli.latency_ms));
        info!(conferences = source.catalog().len(), "using local catalog");
        return Ok(Arc::new(source));
    }
    let client = HttpConferenceClient::new(&cli.server_url)
        .with_context(|| format!("invalid server url '{}'", cli.server_url))?;
    info!(server_url = %client.base_url(), "using conference server");
    Ok(Arc::new(client))
}

async fn list(cli: &Cli, args: &ListArgs) -> Result<()> {
    let criteria = args.criteria();
    if args.print_query {
        println!("{}", criteria.to_query_string());
        return Ok(());
    }

    let store = open_preferences(cli)?;
    let preferences = store.snapshot();
    let view = ConferenceView::new(build_source(cli)?);
    view.load_list(&criteria).await;

    let mut conferences = match view.list_state() {
        ListState::Ready(conferences) => conferences,
        ListState::Error(error) => bail!("failed to load conferences: {error}"),
        ListState::Idle | ListState::Loading => bail!("conference list did not resolve"),
    };
    if args.favorites {
        conferences.retain(|conference| preferences.is_favorite(conference.id.as_str()));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&conferences)?);
        return Ok(());
    }
    let mut options = DisplayOptions::from_preferences(&preferences, Utc::now());
    if let Some(view_mode) = args.view {
        options.view_mode = view_mode;
    }
    print!(
        "{}",
        render::render_conferences(&conferences, &preferences, &options)
    );
    Ok(())
}

async fn show(cli: &Cli, id: &str, json: bool) -> Result<()> {
    let store = open_preferences(cli)?;
    let preferences = store.snapshot();
    let view = ConferenceView::new(build_source(cli)?);
    view.load_detail(id).await;

    match view.detail_state() {
        DetailState::Ready(conference) if json => {
            println!("{}", serde_json::to_string_pretty(&conference)?);
        }
        DetailState::Ready(conference) => {
            let options = DisplayOptions::from_preferences(&preferences, Utc::now());
            print!(
                "{}",
                render::render_detail(&conference, &preferences, &options)
            );
        }
        DetailState::NotFound(id) => print!("{}", render::render_not_found(id.as_str())),
        DetailState::Error(error) => bail!("failed to load conference '{id}': {error}"),
        DetailState::Idle | DetailState::Loading(_) => {
            bail!("conference '{id}' did not resolve")
        }
    }
    Ok(())
}

async fn upcoming(cli: &Cli, days: Option<u32>, json: bool) -> Result<()> {
    let source = build_source(cli)?;
    let entries = source
        .upcoming_deadlines(days)
        .await
        .context("failed to load upcoming deadlines")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    let preferences = open_preferences(cli)?.snapshot();
    let options = DisplayOptions::from_preferences(&preferences, Utc::now());
    print!("{}", render::render_upcoming(&entries, &options));
    Ok(())
}

fn prefs(cli: &Cli, action: &PrefsAction) -> Result<()> {
    let mut store = open_preferences(cli)?;
    let current = store.snapshot();
    let mutation = match action {
        PrefsAction::Show => {
            print!("{}", render::render_preferences(&current));
            return Ok(());
        }
        PrefsAction::Theme { theme } => PreferenceMutation::SetTheme(*theme),
        PrefsAction::View { mode } => PreferenceMutation::SetViewMode(*mode),
        PrefsAction::Favorite { id } => PreferenceMutation::ToggleFavorite(id.as_str().into()),
        PrefsAction::Timezone { mode, label } => {
            if let Some(label) = label {
                let timezone = if label.eq_ignore_ascii_case("system") {
                    String::new()
                } else if shared::dates::parse_timezone(label).is_some() {
                    label.trim().to_string()
                } else {
                    bail!("unrecognised timezone '{label}'");
                };
                store.apply(PreferenceMutation::SetDisplaySettings(DisplaySettings {
                    timezone,
                    ..current.display.clone()
                }));
            }
            PreferenceMutation::SetTimezoneMode(*mode)
        }
        PrefsAction::DateFormat { format } => {
            PreferenceMutation::SetDisplaySettings(DisplaySettings {
                date_format: *format,
                ..current.display.clone()
            })
        }
        PrefsAction::Notifications { enabled, days } => {
            PreferenceMutation::SetNotificationSettings(NotificationSettings {
                enabled: *enabled,
                days_before_deadline: days
                    .unwrap_or(current.notifications.days_before_deadline),
            })
        }
        PrefsAction::Reset => PreferenceMutation::Reset,
    };

    let updated: UserPreferences = store.apply(mutation);
    if let Some(error) = store.persist_error() {
        eprintln!("warning: preferences were not saved: {error}");
    }
    print!("{}", render::render_preferences(&updated));
    Ok(())
}

fn validate(cli: &Cli) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let issues = catalog.validate();
    if issues.is_empty() {
        println!("{} conferences, no issues found", catalog.len());
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    bail!("{} issue(s) in {} conferences", issues.len(), catalog.len())
}
