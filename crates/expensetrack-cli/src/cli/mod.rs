//! CLI entry and dispatch.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use expensetrack_core::config::{self, paths};
use expensetrack_core::{interrupt, logging};
use expensetrack_types::Category;

mod commands;

#[derive(Parser)]
#[command(name = "expensetrack")]
#[command(version)]
#[command(about = "Track expenses and bank balances from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and remember the session on this device
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (read from stdin when not set)
        #[arg(long, env = "EXPENSETRACK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user's profile
    #[command(alias = "profile")]
    Whoami,

    /// Show salary, spending and recent transactions
    Dashboard,

    /// List bank accounts and their balances
    Banks,

    /// List or add expenses
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },

    /// Show spending per category
    Report,

    /// List the categories accepted by `expenses add`
    Categories,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ExpenseCommands {
    /// Show expense history grouped by date
    List,
    /// Record a new expense
    Add {
        /// Amount spent, e.g. 250 or 99.50
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        /// Category label or short name (default: food)
        #[arg(long, short)]
        category: Option<Category>,

        /// What the money was spent on (default: the category)
        #[arg(long, short)]
        description: Option<String>,

        /// Bank account id to charge (default: salary bank)
        #[arg(long)]
        bank: Option<i64>,

        /// Date of the expense, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Point the client at a different API root
    SetApiUrl {
        /// New base URL, e.g. http://localhost:8000/api
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.logging, &paths::logs_dir())?;
    tracing::debug!(home = %paths::expensetrack_home().display(), "Starting");

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetApiUrl { url } => commands::config::set_api_url(&url),
        },

        Commands::Categories => {
            commands::expenses::categories();
            Ok(())
        }

        Commands::Login { email, password } => {
            let mut app = commands::restore_app(&config)?;
            commands::auth::login(&mut app, &email, password).await
        }

        Commands::Logout => {
            let mut app = commands::restore_app(&config)?;
            commands::auth::logout(&mut app).await
        }

        Commands::Whoami => {
            let app = commands::restore_app(&config)?;
            commands::profile::whoami(&app, &config)
        }

        Commands::Dashboard => {
            let app = commands::open_app(&config).await?;
            commands::dashboard::show(&app, &config)
        }

        Commands::Banks => {
            let app = commands::open_app(&config).await?;
            commands::banks::list(&app, &config)
        }

        Commands::Expenses { command } => {
            let mut app = commands::open_app(&config).await?;
            match command {
                ExpenseCommands::List => commands::expenses::list(&app, &config),
                ExpenseCommands::Add {
                    amount,
                    category,
                    description,
                    bank,
                    date,
                } => {
                    let draft = expensetrack_core::expenses::ExpenseDraft {
                        amount,
                        category,
                        description,
                        bank_id: bank,
                        date,
                    };
                    commands::expenses::add(&mut app, &config, draft).await
                }
            }
        }

        Commands::Report => {
            let app = commands::open_app(&config).await?;
            commands::report::show(&app, &config)
        }
    }
}
