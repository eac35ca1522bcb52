//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use resdesk_core::config;
use resdesk_core::models::{EquipmentStatus, Role};
use resdesk_core::report::{ReportFilters, ReportKind};
use tokio_util::sync::CancellationToken;

mod commands;
mod context;
mod guards;
mod render;

use context::AppContext;

#[derive(Parser)]
#[command(name = "resdesk")]
#[command(version)]
#[command(about = "Command-line client for the resdesk reservations API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides RESDESK_BASE_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "RESDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESDESK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Log out and forget the saved session
    Logout,
    /// Show the logged-in user's profile
    Whoami,

    /// Browse and manage events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Manage the equipment inventory
    Equipment {
        #[command(subcommand)]
        command: EquipmentCommands,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage equipment reservations
    Reservations {
        #[command(subcommand)]
        command: ReservationCommands,
    },
    /// Generate events, equipment and reservations reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum EventCommands {
    /// List all events
    List,
    /// Events in progress or starting within the next 24 hours
    Upcoming,
    /// Create an event
    Create(EventArgs),
    /// Register for an event
    Join {
        #[arg(value_name = "EVENT_ID")]
        id: i64,
    },
    /// List an event's participants
    Participants {
        #[arg(value_name = "EVENT_ID")]
        id: i64,
    },
}

#[derive(clap::Args)]
struct EventArgs {
    #[arg(long)]
    title: String,
    /// Start, e.g. "2025-01-15 09:00"
    #[arg(long)]
    start: String,
    /// End, e.g. "2025-01-15 17:00"
    #[arg(long)]
    end: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    location: String,
    /// Event type (info, offer, tournament)
    #[arg(long = "type", default_value = "info")]
    kind: String,
    #[arg(long)]
    capacity: Option<i64>,
    /// Let users register for the event
    #[arg(long)]
    allow_registration: bool,
    /// Image URL
    #[arg(long)]
    image: Option<String>,
}

#[derive(clap::Subcommand)]
enum EquipmentCommands {
    /// List equipment
    List,
    /// Show one item
    Show {
        #[arg(value_name = "EQUIPMENT_ID")]
        id: i64,
    },
    /// Add an item (administrators)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        sku: String,
        /// available, in_use, maintenance or retired
        #[arg(long, default_value = "available")]
        status: EquipmentStatus,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Edit an item; omitted fields keep their current value
    Update {
        #[arg(value_name = "EQUIPMENT_ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        status: Option<EquipmentStatus>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an item (administrators)
    Delete {
        #[arg(value_name = "EQUIPMENT_ID")]
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum UserCommands {
    /// List user accounts
    List,
    /// Show one account
    Show {
        #[arg(value_name = "USER_ID")]
        id: i64,
    },
    /// Create an account (administrators)
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        display_name: String,
        /// admin, manager or user
        #[arg(long, default_value = "user")]
        role: Role,
        /// Create the account disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Edit an account; omitted fields keep their current value
    Update {
        #[arg(value_name = "USER_ID")]
        id: i64,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// New password (unchanged when omitted)
        #[arg(long)]
        password: Option<String>,
        /// admin, manager or user (administrators only)
        #[arg(long)]
        role: Option<Role>,
        /// Enable or disable the account (administrators only)
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete an account (administrators)
    Delete {
        #[arg(value_name = "USER_ID")]
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ReservationCommands {
    /// List reservations (everyone's for managers and administrators)
    List,
    /// Request a reservation
    Create {
        /// Start, e.g. "2025-01-15 09:00"
        #[arg(long)]
        start: String,
        /// End, e.g. "2025-01-15 17:00"
        #[arg(long)]
        end: String,
        #[arg(long, value_name = "EQUIPMENT_ID")]
        equipment: Option<i64>,
    },
    /// Confirm a pending reservation
    Confirm {
        #[arg(value_name = "RESERVATION_ID")]
        id: i64,
    },
    /// Mark a confirmed or active reservation as completed
    Complete {
        #[arg(value_name = "RESERVATION_ID")]
        id: i64,
    },
    /// Move the end of one of your reservations
    Extend {
        #[arg(value_name = "RESERVATION_ID")]
        id: i64,
        /// New end, e.g. "2025-01-15 19:00"
        #[arg(long)]
        until: String,
    },
}

#[derive(clap::Args)]
struct ReportArgs {
    /// events, equipment or reservations
    #[arg(value_name = "KIND")]
    kind: ReportKind,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    end_date: Option<String>,
    /// e.g. pending, available
    #[arg(long)]
    status: Option<String>,
}

impl ReportArgs {
    fn filters(&self) -> ReportFilters {
        ReportFilters {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(clap::Subcommand)]
enum ReportCommands {
    /// Print the report URL
    Url(ReportArgs),
    /// Open the report in the default browser
    Open(ReportArgs),
    /// Save the report document to a file
    Download {
        #[command(flatten)]
        report: ReportArgs,
        /// Output file (default: <kind>-report.<pdf|html>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = resdesk_core::logging::init(&config.logging)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, config).await })
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    let Cli { command, base_url } = cli;

    // config commands never touch the server
    if let Commands::Config { command } = command {
        return config_command(command);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling requests");
            interrupt.cancel();
        }
    });

    let ctx = AppContext::open(&config, base_url.as_deref(), cancel).await?;

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email.as_deref(), password.as_deref()).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            display_name,
        } => {
            commands::auth::register(&ctx, username, email, password, display_name).await?;
        }
        Commands::Logout => return commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx)?,

        Commands::Events { command } => match command {
            EventCommands::List => commands::events::list(&ctx).await?,
            EventCommands::Upcoming => commands::events::upcoming(&ctx).await?,
            EventCommands::Create(args) => commands::events::create(&ctx, args.into()).await?,
            EventCommands::Join { id } => commands::events::join(&ctx, id).await?,
            EventCommands::Participants { id } => commands::events::participants(&ctx, id).await?,
        },

        Commands::Equipment { command } => match command {
            EquipmentCommands::List => commands::equipment::list(&ctx).await?,
            EquipmentCommands::Show { id } => commands::equipment::show(&ctx, id).await?,
            EquipmentCommands::Create {
                name,
                sku,
                status,
                notes,
            } => {
                let form = resdesk_core::models::EquipmentForm {
                    name,
                    sku,
                    status: status.to_string(),
                    notes,
                };
                commands::equipment::create(&ctx, &form).await?;
            }
            EquipmentCommands::Update {
                id,
                name,
                sku,
                status,
                notes,
            } => {
                let changes = commands::equipment::EquipmentChanges {
                    name,
                    sku,
                    status,
                    notes,
                };
                commands::equipment::update(&ctx, id, changes).await?;
            }
            EquipmentCommands::Delete { id, yes } => {
                commands::equipment::delete(&ctx, id, yes).await?;
            }
        },

        Commands::Users { command } => match command {
            UserCommands::List => commands::users::list(&ctx).await?,
            UserCommands::Show { id } => commands::users::show(&ctx, id).await?,
            UserCommands::Create {
                username,
                email,
                password,
                display_name,
                role,
                inactive,
            } => {
                let user = resdesk_core::models::NewUser {
                    username,
                    email,
                    password,
                    display_name,
                    role_id: role.id(),
                    is_active: !inactive,
                };
                commands::users::create(&ctx, &user).await?;
            }
            UserCommands::Update {
                id,
                display_name,
                email,
                password,
                role,
                active,
            } => {
                let changes = commands::users::UserChanges {
                    display_name,
                    email,
                    password,
                    role,
                    active,
                };
                commands::users::update(&ctx, id, changes).await?;
            }
            UserCommands::Delete { id, yes } => commands::users::delete(&ctx, id, yes).await?,
        },

        Commands::Reservations { command } => match command {
            ReservationCommands::List => commands::reservations::list(&ctx).await?,
            ReservationCommands::Create {
                start,
                end,
                equipment,
            } => {
                let reservation = resdesk_core::models::NewReservation {
                    start_time: start,
                    end_time: end,
                    equipment_id: equipment,
                };
                commands::reservations::create(&ctx, &reservation).await?;
            }
            ReservationCommands::Confirm { id } => {
                commands::reservations::confirm(&ctx, id).await?;
            }
            ReservationCommands::Complete { id } => {
                commands::reservations::complete(&ctx, id).await?;
            }
            ReservationCommands::Extend { id, until } => {
                commands::reservations::extend(&ctx, id, &until).await?;
            }
        },

        Commands::Reports { command } => match command {
            ReportCommands::Url(args) => {
                commands::reports::url(&ctx, args.kind, &args.filters())?;
            }
            ReportCommands::Open(args) => {
                commands::reports::open(&ctx, args.kind, &args.filters())?;
            }
            ReportCommands::Download { report, output } => {
                commands::reports::download(&ctx, report.kind, &report.filters(), output)
                    .await?;
            }
        },

        Commands::Config { command } => return config_command(command),
    }

    ctx.persist()
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Generate => commands::config::generate(),
    }
}

impl From<EventArgs> for resdesk_core::models::NewEvent {
    fn from(args: EventArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            start_at: args.start,
            end_at: args.end,
            location: args.location,
            kind: args.kind,
            allow_registration: args.allow_registration,
            capacity: args.capacity,
            image: args.image.filter(|image| !image.trim().is_empty()),
        }
    }
}
