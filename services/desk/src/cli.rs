use crate::commands;
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use school_desk::config::AppConfig;
use school_desk::error::AppError;
use school_desk::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "School Desk",
    about = "Score tests, import admissions, and work with the school dashboard from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the local HTTP service (default command)
    Serve(ServeArgs),
    /// Sign in to the dashboard API and store the session
    Login {
        #[command(subcommand)]
        command: LoginCommand,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in role and the sections it may open
    Whoami,
    /// Load campuses, subjects and students for the signed-in role
    Dashboard(DashboardArgs),
    /// Score, rank and submit test results
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },
    /// Validate and upload admission sheets
    Admissions {
        #[command(subcommand)]
        command: AdmissionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LoginCommand {
    /// Staff or administrator sign-in
    User(UserLoginArgs),
    /// Parent sign-in with the child's registration number
    Parent(ParentLoginArgs),
}

#[derive(Subcommand, Debug)]
enum ResultsCommand {
    /// Score and rank a test, printing standings and a cohort summary
    Compute(ComputeArgs),
    /// Score a test and upsert the results into the results store
    Submit(SubmitArgs),
}

#[derive(Subcommand, Debug)]
enum AdmissionsCommand {
    /// Validate an admissions sheet and create the accepted students
    Import(ImportArgs),
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
pub(crate) struct UserLoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) password: String,
}

#[derive(Args, Debug)]
pub(crate) struct ParentLoginArgs {
    /// Registration number of the student
    #[arg(long)]
    pub(crate) reg_number: String,
    #[arg(long)]
    pub(crate) password: String,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// List the students enrolled on this campus
    #[arg(long)]
    pub(crate) campus: Option<String>,
}

/// Where the answer key and the answer sheets come from. Either side falls back to the
/// dashboard API when no file is given.
#[derive(Args, Debug)]
pub(crate) struct ResultSource {
    /// Test name as recorded in the solution and report banks
    #[arg(long = "test")]
    pub(crate) test_name: String,
    /// Answer sheet (CSV or Excel) instead of the report bank
    #[arg(long)]
    pub(crate) reports: Option<PathBuf>,
    /// Answer key (CSV or Excel) instead of the solution bank
    #[arg(long)]
    pub(crate) solutions: Option<PathBuf>,
    /// Test date for answer sheets without a date column
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Earliest report date fetched from the report bank
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Latest report date fetched from the report bank
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
}

impl ResultSource {
    pub(crate) fn is_local(&self) -> bool {
        self.reports.is_some() && self.solutions.is_some()
    }
}

#[derive(Args, Debug)]
pub(crate) struct ComputeArgs {
    #[command(flatten)]
    pub(crate) source: ResultSource,
    /// Number of toppers listed in the summary
    #[arg(long, default_value_t = 3)]
    pub(crate) top: usize,
    /// Also roll results up per student per month
    #[arg(long)]
    pub(crate) monthly: bool,
    /// Print the scored cohorts as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    #[command(flatten)]
    pub(crate) source: ResultSource,
    /// Overwrite existing results without asking
    #[arg(long)]
    pub(crate) yes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Admissions sheet (CSV or Excel)
    pub(crate) path: PathBuf,
    /// Validate only; create nothing
    #[arg(long)]
    pub(crate) dry_run: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Login {
            command: LoginCommand::User(args),
        } => commands::login_user(&config, args).await,
        Command::Login {
            command: LoginCommand::Parent(args),
        } => commands::login_parent(&config, args).await,
        Command::Logout => commands::logout(&config),
        Command::Whoami => commands::whoami(&config),
        Command::Dashboard(args) => commands::dashboard(&config, args).await,
        Command::Results {
            command: ResultsCommand::Compute(args),
        } => commands::compute_results(&config, args).await,
        Command::Results {
            command: ResultsCommand::Submit(args),
        } => commands::submit_results(&config, args).await,
        Command::Admissions {
            command: AdmissionsCommand::Import(args),
        } => commands::import_admissions(&config, args).await,
    }
}
