//! planwatch CLI
//!
//! Command-line front end for the planwatch backend: search and inspect
//! planning applications, stream document analyses, and manage alerts.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod analyze;
mod inbox;
mod output;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use application::{SearchFilterStore, ViewMode};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use domain::{
    AlertArea, AlertCriteria, AlertFrequency, ApplicationStatus, BulkActionKind, GeoLocation,
    HeatmapQuery, NewAlert, ReportRequest, SortOrder, UserSettings, normalized_triples,
};
use infrastructure::{AppConfig, AppContext, init_logging};
use serde::Serialize;
use tracing::debug;

use crate::{
    analyze::Outcome,
    inbox::{InboxFilterArgs, SelectionArgs},
};

/// Interval between report status polls
const REPORT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Give up waiting for a report after this many polls
const REPORT_MAX_POLLS: u32 = 100;

/// planwatch CLI
#[derive(Parser)]
#[command(name = "planwatch")]
#[command(author, version, about = "Irish planning application monitor", long_about = None)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ./planwatch.toml if present)
    #[arg(short, long, global = true, env = "PLANWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search planning applications
    Search(SearchArgs),

    /// Show one application
    Show {
        /// Application id
        id: String,

        /// Include lodged documents
        #[arg(long)]
        documents: bool,

        /// Include the decision timeline
        #[arg(long)]
        timeline: bool,

        /// Include BCMS notices for the application number
        #[arg(long)]
        bcms: bool,
    },

    /// Analyse an application's documents, streaming progress
    ///
    /// Ctrl-C stops the analysis.
    Analyze(AnalyzeArgs),

    /// Manage alerts
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },

    /// Work through applications delivered by alerts
    Inbox {
        #[command(subcommand)]
        command: InboxCommands,
    },

    /// Zoning at a point
    #[command(allow_negative_numbers = true)]
    Zoning {
        latitude: f64,
        longitude: f64,
    },

    /// Property sales near a point, or the sale history of an address
    #[command(allow_negative_numbers = true)]
    Property {
        #[arg(long, requires = "lng", conflicts_with = "address")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Search radius in metres
        #[arg(long, default_value_t = 500)]
        radius: u32,

        #[arg(long, required_unless_present = "lat")]
        address: Option<String>,
    },

    /// Application density as `lat,lng,weight` triples
    Heatmap {
        #[arg(long)]
        authority: Option<String>,

        #[arg(long)]
        status: Option<ApplicationStatus>,

        /// Only applications received on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Print raw weights instead of weights scaled to 0..=1
        #[arg(long)]
        raw: bool,
    },

    /// Pre-planning reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Print a link to the billing portal
    Billing {
        /// Where the portal sends the user back to
        #[arg(long, default_value = "https://planwatch.ie/account")]
        return_url: String,
    },

    /// Update notification settings
    Settings {
        #[arg(long)]
        email_notifications: Option<bool>,

        #[arg(long)]
        digest: Option<AlertFrequency>,

        #[arg(long)]
        default_authority: Option<String>,
    },

    /// Show the signed-in user
    Whoami,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Free-text search
    query: Option<String>,

    #[arg(long)]
    authority: Option<String>,

    #[arg(long)]
    status: Option<ApplicationStatus>,

    /// Received on or after (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Received on or before (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = SortArg::Newest)]
    sort: SortArg,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 25)]
    page_size: u32,

    /// table, cards or map
    #[arg(long, default_value_t = ViewMode::Table)]
    view: ViewMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    Decision,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => Self::Newest,
            SortArg::Oldest => Self::Oldest,
            SortArg::Decision => Self::DecisionDate,
        }
    }
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Application number, e.g. FW24A/0123
    application_number: String,

    /// Maximum documents to analyse
    #[arg(long)]
    max_documents: Option<u32>,

    /// Skip drawings
    #[arg(long)]
    no_drawings: bool,

    /// Ignore cached results
    #[arg(long)]
    skip_cache: bool,

    /// Only priority documents
    #[arg(long)]
    priority_only: bool,
}

#[derive(Subcommand)]
enum AlertCommands {
    /// List alerts
    List,

    /// Create an alert
    #[command(allow_negative_numbers = true)]
    Create {
        name: String,

        #[arg(long = "keyword")]
        keywords: Vec<String>,

        #[arg(long = "authority")]
        authorities: Vec<String>,

        #[arg(long = "status")]
        statuses: Vec<ApplicationStatus>,

        /// Centre of a watched area
        #[arg(long, requires_all = ["lng", "radius"])]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Radius of the watched area in metres
        #[arg(long, requires = "lat")]
        radius: Option<u32>,

        #[arg(long, default_value = "daily")]
        frequency: AlertFrequency,
    },

    /// Delete an alert
    Delete { id: String },
}

#[derive(Subcommand)]
enum InboxCommands {
    /// List a page of the inbox
    List(InboxFilterArgs),

    /// Mark items read
    Read {
        #[command(flatten)]
        filters: InboxFilterArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Mark items unread
    Unread {
        #[command(flatten)]
        filters: InboxFilterArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Archive items
    Archive {
        #[command(flatten)]
        filters: InboxFilterArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Number of unread items
    Count,
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Request a pre-planning report for an address or point
    #[command(allow_negative_numbers = true)]
    Request {
        #[arg(long, required_unless_present = "lat")]
        address: Option<String>,

        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Radius in metres
        #[arg(long)]
        radius: Option<u32>,

        /// Related application number
        #[arg(long)]
        application: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Poll until the report is ready or failed
        #[arg(long)]
        wait: bool,
    },

    /// Show a report
    Get { id: String },

    /// List reports
    List,
}

/// Print `value` as JSON or through `text`
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", output::json(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn search_filters(args: &SearchArgs) -> anyhow::Result<SearchFilterStore> {
    let store = SearchFilterStore::new();
    store.set_search(args.query.clone());
    store.set_planning_authority(args.authority.clone());
    store.set_status(args.status);
    store.set_received_range(args.from, args.to)?;
    store.set_sort(args.sort.into());
    store.set_page_size(args.page_size)?;
    store.set_page(args.page)?;
    store.set_view_mode(args.view);
    Ok(store)
}

fn report_request(
    address: Option<String>,
    point: Option<(f64, f64)>,
    radius: Option<u32>,
    application: Option<String>,
    notes: Option<String>,
) -> anyhow::Result<ReportRequest> {
    let mut request = match (address, point) {
        (_, Some((lat, lng))) => ReportRequest::for_location(GeoLocation::new(lat, lng)?),
        (Some(address), None) => ReportRequest::for_address(address),
        (None, None) => bail!("either --address or --lat/--lng is required"),
    };
    if let Some(radius) = radius {
        request.radius_m = radius;
    }
    request.application_number = application;
    request.notes = notes;
    request.validate()?;
    Ok(request)
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging, cli.verbose)?;
    let context = AppContext::from_config(&config)?;
    let json = cli.json;
    debug!(json, "Starting planwatch");

    match cli.command {
        Commands::Search(args) => {
            let filters = search_filters(&args)?;
            let page = context.queries.search(&filters.query()).await?;
            emit(json, &page, |page| match filters.view_mode() {
                ViewMode::Table => output::application_table(page),
                ViewMode::Cards => output::application_cards(page),
                ViewMode::Map => output::application_map(page),
            })?;
        },

        Commands::Show {
            id,
            documents,
            timeline,
            bcms,
        } => {
            let application = context.queries.application(&id).await?;
            emit(json, &application, output::application_detail)?;

            if documents {
                let docs = context.api.applications().documents(&id).await?;
                emit(json, &docs, |docs| {
                    docs.iter()
                        .map(|d| {
                            format!(
                                "  {} {}{}",
                                d.published_date.map_or_else(|| "-".to_string(), |p| p.to_string()),
                                d.name,
                                if d.is_drawing { " (drawing)" } else { "" }
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            if timeline {
                let events = context.api.applications().timeline(&id).await?;
                emit(json, &events, |events| {
                    events
                        .iter()
                        .map(|e| format!("  {} {:<20} {}", e.date, e.event_type, e.description))
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            if bcms {
                let notices = context
                    .api
                    .bcms()
                    .notices_for_application(&application.summary.application_number)
                    .await?;
                emit(json, &notices, |notices| output::bcms_notices(notices))?;
            }
        },

        Commands::Analyze(args) => {
            let mut request = context
                .analysis
                .config()
                .request_for(&args.application_number)?;
            if let Some(max) = args.max_documents {
                request = request.with_max_documents(max);
            }
            if args.no_drawings {
                request = request.with_drawings(false);
            }
            if args.skip_cache {
                request = request.with_skip_cache(true);
            }
            if args.priority_only {
                request = request.with_priority_only(true);
            }

            match analyze::run(&context.analysis, &request, json).await? {
                Outcome::Completed(result) => {
                    emit(json, &result, output::analysis_summary)?;
                },
                Outcome::Failed(error) => bail!("Analysis failed: {error}"),
                Outcome::Cancelled => {
                    eprintln!("Analysis cancelled");
                    std::process::exit(130);
                },
            }
        },

        Commands::Alerts { command } => match command {
            AlertCommands::List => {
                let alerts = context.queries.alerts().await?;
                emit(json, &alerts, |alerts| {
                    if alerts.is_empty() {
                        return "No alerts".to_string();
                    }
                    alerts
                        .iter()
                        .map(|a| {
                            format!(
                                "{:<12} {:<30} {:<8} {}",
                                a.id,
                                a.name,
                                a.frequency.as_str(),
                                if a.enabled { "enabled" } else { "paused" }
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            },
            AlertCommands::Create {
                name,
                keywords,
                authorities,
                statuses,
                lat,
                lng,
                radius,
                frequency,
            } => {
                let area = match (lat, lng, radius) {
                    (Some(lat), Some(lng), Some(radius_m)) => Some(AlertArea {
                        center: GeoLocation::new(lat, lng)?,
                        radius_m,
                    }),
                    _ => None,
                };
                let alert = NewAlert {
                    name,
                    criteria: AlertCriteria {
                        keywords,
                        planning_authorities: authorities,
                        statuses,
                        area,
                    },
                    frequency,
                };
                let created = context.queries.create_alert(&alert).await?;
                emit(json, &created, |a| format!("✅ Created alert {} ({})", a.name, a.id))?;
            },
            AlertCommands::Delete { id } => {
                context.queries.delete_alert(&id).await?;
                if !json {
                    println!("🗑️  Deleted alert {id}");
                }
            },
        },

        Commands::Inbox { command } => {
            let (filters, selection, kind) = match command {
                InboxCommands::List(filters) => {
                    let state = inbox::load(&context.queries, &filters).await?;
                    return emit(json, state.items(), |_| inbox::render(&state));
                },
                InboxCommands::Count => {
                    let unread = context.queries.unread_count().await?;
                    return emit(json, &unread, |n| format!("{n} unread"));
                },
                InboxCommands::Read { filters, selection } => {
                    (filters, selection, BulkActionKind::MarkRead)
                },
                InboxCommands::Unread { filters, selection } => {
                    (filters, selection, BulkActionKind::MarkUnread)
                },
                InboxCommands::Archive { filters, selection } => {
                    (filters, selection, BulkActionKind::Archive)
                },
            };

            let mut state = inbox::load(&context.queries, &filters).await?;
            let outcome = inbox::act(&context.queries, &mut state, &selection, kind).await?;
            emit(json, &outcome, |o| {
                format!("Updated {} item(s)\n{}", o.updated, inbox::render(&state))
            })?;
        },

        Commands::Zoning {
            latitude,
            longitude,
        } => {
            let info = context.queries.zoning(latitude, longitude).await?;
            emit(json, &info, output::zoning)?;
        },

        Commands::Property {
            lat,
            lng,
            radius,
            address,
        } => {
            let sales = match (lat, lng, address) {
                (Some(lat), Some(lng), _) => {
                    context.api.property().sales_near(lat, lng, radius).await?
                },
                (_, _, Some(address)) => context.api.property().history(&address).await?,
                _ => bail!("either --address or --lat/--lng is required"),
            };
            emit(json, &sales, |sales| output::property_sales(sales))?;
        },

        Commands::Heatmap {
            authority,
            status,
            since,
            raw,
        } => {
            let query = HeatmapQuery {
                planning_authority: authority,
                status,
                since,
                bounds: None,
            };
            let points = context.api.heatmap().points(&query).await?;
            let triples = if raw {
                points.iter().map(domain::HeatmapPoint::to_weighted).collect()
            } else {
                normalized_triples(&points)
            };
            emit(json, &triples, |triples| output::heatmap(&points, triples))?;
        },

        Commands::Report { command } => match command {
            ReportCommands::Request {
                address,
                lat,
                lng,
                radius,
                application,
                notes,
                wait,
            } => {
                let request = report_request(address, lat.zip(lng), radius, application, notes)?;
                let mut report = context.api.reports().request_pre_planning(&request).await?;

                if wait {
                    let mut polls = 0;
                    while !report.status.is_terminal() {
                        if polls >= REPORT_MAX_POLLS {
                            bail!("Report {} still {:?} after waiting", report.id, report.status);
                        }
                        polls += 1;
                        tokio::time::sleep(REPORT_POLL_INTERVAL).await;
                        report = context.api.reports().get(&report.id).await?;
                    }
                }
                emit(json, &report, output::report)?;
            },
            ReportCommands::Get { id } => {
                let report = context.api.reports().get(&id).await?;
                emit(json, &report, output::report)?;
            },
            ReportCommands::List => {
                let reports = context.api.reports().list().await?;
                emit(json, &reports, |reports| {
                    reports
                        .iter()
                        .map(output::report)
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            },
        },

        Commands::Billing { return_url } => {
            let session = context.api.billing().portal_session(&return_url).await?;
            emit(json, &session, |s| format!("Open the billing portal: {}", s.url))?;
        },

        Commands::Settings {
            email_notifications,
            digest,
            default_authority,
        } => {
            let current = context.api.users().me().await?.settings;
            let settings = UserSettings {
                email_notifications: email_notifications.unwrap_or(current.email_notifications),
                digest_frequency: digest.unwrap_or(current.digest_frequency),
                default_planning_authority: default_authority
                    .or(current.default_planning_authority),
            };
            let saved = context.api.users().update_settings(&settings).await?;
            emit(json, &saved, |s| {
                format!(
                    "Email notifications: {}\nDigest: {}",
                    if s.email_notifications { "on" } else { "off" },
                    s.digest_frequency.as_str()
                )
            })?;
        },

        Commands::Whoami => {
            if !context.credentials.is_authenticated() {
                bail!("Not signed in: set PLANWATCH__CREDENTIALS__TOKEN");
            }
            let me = context.api.users().me().await?;
            emit(json, &me, |me| {
                format!(
                    "{} <{}>\n  Plan: {:?}",
                    me.display_name.as_deref().unwrap_or(&me.id),
                    me.email,
                    me.plan
                )
            })?;
        },
    }

    Ok(())
}
