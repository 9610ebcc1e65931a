//! Roster CLI
//!
//! Terminal front end for the users administration console.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roster_core::transport::UreqTransport;
use roster_core::{Config, Console, DraftField, LoadOutcome, Session, UserId};

mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster - manage user records on a remote users API")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the users API (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Records per page (overrides config)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of users
    #[command(alias = "ls")]
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Add a user
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit a user shown on the given page
    Edit {
        /// User ID
        id: UserId,
        /// Page the user is on
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: UserId,
        /// Page to show afterwards
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show backend and database status codes
    Health,
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Profile photo file
    #[arg(long)]
    photo: Option<PathBuf>,
}

impl FieldArgs {
    fn values(&self) -> [(DraftField, Option<&str>); 4] {
        [
            (DraftField::FirstName, self.first_name.as_deref()),
            (DraftField::LastName, self.last_name.as_deref()),
            (DraftField::Email, self.email.as_deref()),
            (DraftField::PhoneNumber, self.phone.as_deref()),
        ]
    }

    /// Copy the given flags into the open form; absent flags keep the draft.
    fn apply(&self, console: &mut Console) -> Result<()> {
        for (field, value) in self.values() {
            if let Some(value) = value {
                console.set_field(field, Some(value))?;
            }
        }
        if let Some(path) = &self.photo {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read photo: {:?}", path))?;
            console.set_photo(Some(bytes))?;
        }
        Ok(())
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roster_core=warn,roster=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    info!("Using API at {}", config.api_url);

    let output = Output::new(OutputFormat::from_flag(cli.json));
    let console = Console::from_config(&config)?;
    let mut session = Session::new(console, UreqTransport::new(config.timeout()));

    match cli.command {
        Commands::List { page } => {
            load(&mut session, page)?;
            output.print_page(session.console().list());
        }
        Commands::Add { fields } => {
            session.console_mut().open_add();
            fields.apply(session.console_mut())?;
            session.submit_form().map_err(|e| anyhow!(e.user_message()))?;
            output.print_notifications(session.console());
        }
        Commands::Edit { id, page, fields } => {
            load(&mut session, page)?;
            session.console_mut().open_edit(id)?;
            fields.apply(session.console_mut())?;
            session.submit_form().map_err(|e| anyhow!(e.user_message()))?;
            output.print_notifications(session.console());
            output.print_page(session.console().list());
        }
        Commands::Delete { id, page } => {
            load(&mut session, page)?;
            session.delete(id).map_err(|e| anyhow!(e.user_message()))?;
            output.print_notifications(session.console());
            output.print_page(session.console().list());
        }
        Commands::Health => {
            output.print_health(&session.check_health());
        }
    }

    session.console_mut().teardown();
    Ok(())
}

fn load(session: &mut Session<UreqTransport>, page: u32) -> Result<()> {
    match session.load_page(page)? {
        LoadOutcome::Applied => Ok(()),
        LoadOutcome::Failed(message) => bail!("Error: {}", message),
        LoadOutcome::Stale => bail!("page {} was superseded by a newer request", page),
    }
}
