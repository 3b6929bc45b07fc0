use crate::commands;
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use jobtrack::error::AppError;
use jobtrack::jobs::{FilterQuery, JobStatus};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jobtrack",
    about = "Track job applications against the remote job store",
    version
)]
struct Cli {
    /// Read from the locally mirrored snapshot instead of the remote API
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create an account on the remote job store
    Signup(SignupArgs),
    /// Sign in and remember the session token
    Login(LoginArgs),
    /// Forget the saved session token
    Logout,
    /// List applications, filtered and sorted
    List(FilterArgs),
    /// Show one application in full
    Show { id: String },
    /// Record a new application
    Add(AddArgs),
    /// Change fields of an existing application
    Edit(EditArgs),
    /// Remove an application
    Delete { id: String },
    /// Summarize applications by status and month
    Stats,
    /// Write applications as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct SignupArgs {
    #[arg(long)]
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
    /// Must repeat --password
    #[arg(long)]
    pub(crate) confirm_password: String,
}

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FilterArgs {
    /// Status to keep, or "all"
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Case-insensitive text matched against title, company, and notes
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// applicationDate, company, jobTitle, or status
    #[arg(long)]
    pub(crate) sort_by: Option<String>,
    /// asc or desc
    #[arg(long)]
    pub(crate) sort_direction: Option<String>,
    /// Earliest application date (YYYY-MM-DD), used together with --end
    #[arg(long)]
    pub(crate) start: Option<String>,
    /// Latest application date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub(crate) end: Option<String>,
}

impl From<FilterArgs> for FilterQuery {
    fn from(args: FilterArgs) -> Self {
        FilterQuery {
            status: args.status,
            search: args.search,
            sort_by: args.sort_by,
            sort_direction: args.sort_direction,
            start: args.start,
            end: args.end,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long)]
    pub(crate) company: String,
    /// Application date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    #[arg(long, value_parser = crate::infra::parse_status, default_value = "Applied")]
    pub(crate) status: JobStatus,
    #[arg(long)]
    pub(crate) link: Option<String>,
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct EditArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) company: Option<String>,
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    #[arg(long, value_parser = crate::infra::parse_status)]
    pub(crate) status: Option<JobStatus>,
    /// New posting URL; pass an empty string to clear it
    #[arg(long)]
    pub(crate) link: Option<String>,
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Destination file; stdout when omitted
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let offline = cli.offline;
    let ctx = move || commands::context(offline);

    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => server::run(args).await,
        Command::Signup(args) => commands::signup(&ctx()?, args).await,
        Command::Login(args) => commands::login(&ctx()?, args).await,
        Command::Logout => commands::logout(&ctx()?),
        Command::List(args) => commands::list(&ctx()?, args).await,
        Command::Show { id } => commands::show(&ctx()?, id).await,
        Command::Add(args) => commands::add(&ctx()?, args).await,
        Command::Edit(args) => commands::edit(&ctx()?, args).await,
        Command::Delete { id } => commands::delete(&ctx()?, id).await,
        Command::Stats => commands::stats(&ctx()?).await,
        Command::Export(args) => commands::export(&ctx()?, args).await,
    }
}
