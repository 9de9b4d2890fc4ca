use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use healthwire::app::App;
use healthwire::commands::{self, FeedOptions, SettingsUpdate};
use healthwire::config::Config;
use healthwire::news::{Category, Language};
use healthwire::storage::{AiVerbosity, Database, DatabaseError, ReactionKind, RefreshInterval};

/// Get the config directory path (~/.config/healthwire/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("healthwire"))
}

/// Feed category argument; `all` means no filter.
#[derive(Debug, Clone, Copy)]
struct CategoryFilter(Option<Category>);

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter(None))
        } else {
            s.parse().map(|c| CategoryFilter(Some(c)))
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "healthwire",
    version,
    about = "Health news with AI summaries, rewrites and tips"
)]
struct Args {
    /// Config file (default: ~/.config/healthwire/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the local store (default: ~/.config/healthwire)
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Reset the local store (delete and recreate)
    #[arg(long, global = true)]
    reset_db: bool,

    /// Language for this invocation (english, hindi, telugu)
    #[arg(long, short = 'l', global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with a username and password
    Login {
        username: String,
        #[arg(long, env = "HEALTHWIRE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (same as login)
    Signup {
        username: String,
        #[arg(long, env = "HEALTHWIRE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Breaking-news ticker and article previews
    Home {
        /// Show every article instead of holding back the last two
        #[arg(long)]
        all: bool,
    },
    /// News feed with AI summaries, sentiment, reactions and comments
    Feed {
        /// disease, nutrition, fitness, accident, general or all
        #[arg(long, short = 'c')]
        category: Option<CategoryFilter>,
        /// Page number, starting at 1
        #[arg(long, short = 'p', default_value_t = 1)]
        page: usize,
        /// Regenerate summaries for this page
        #[arg(long)]
        refresh: bool,
        /// Headline date (YYYY-MM-DD), default: newest in the dataset
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Full article with a friendly rewrite and a health tip
    Article {
        id: String,
        /// Generate a new rewrite instead of using the cached one
        #[arg(long)]
        regenerate: bool,
    },
    /// Save an article
    Save { id: String },
    /// Remove a saved article
    Unsave { id: String },
    /// List saved articles
    Saved,
    /// Comment on an article
    Comment { id: String, text: String },
    /// React to an article
    React { id: String, reaction: ReactionKind },
    /// Statistics and the daily health challenge
    Dashboard {
        /// Challenge date (YYYY-MM-DD), default: today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Nutritional insight for a food log
    Nutrition {
        /// What you ate, e.g. "rice, dal, two sweets"
        food_log: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Normal ranges for common health metrics
    Metrics,
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Inspect or clear cached AI responses
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        refresh_interval: Option<RefreshInterval>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        ai_verbosity: Option<AiVerbosity>,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    Stats,
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    tracing::debug!(?config, "Configuration loaded");

    let data_dir = args.data_dir.clone().unwrap_or(config_dir);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        eprintln!("Created data directory: {}", data_dir.display());
    }

    // User-only access to the store directory
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&data_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&data_dir, perms) {
                    tracing::warn!(
                        path = %data_dir.display(),
                        error = %e,
                        "Failed to set data directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %data_dir.display(),
                    error = %e,
                    "Failed to read data directory metadata"
                );
            }
        }
    }

    let db_path = data_dir.join("healthwire.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        eprintln!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of healthwire appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let app = App::new(config, db)
        .await
        .context("Failed to create application")?
        .with_language(args.language);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Login { username, password } | Command::Signup { username, password } => {
            commands::login(&app, &mut out, &username, &password).await
        }
        Command::Logout => commands::logout(&app, &mut out).await,
        Command::Whoami => commands::whoami(&app, &mut out).await,
        Command::Home { all } => commands::home(&app, &mut out, all).await,
        Command::Feed {
            category,
            page,
            refresh,
            date,
        } => {
            let options = FeedOptions {
                category: category.and_then(|c| c.0),
                page,
                refresh,
                date,
            };
            commands::feed(&app, &mut out, options).await
        }
        Command::Article { id, regenerate } => {
            commands::article(&app, &mut out, &id, regenerate).await
        }
        Command::Save { id } => commands::save(&app, &mut out, &id).await,
        Command::Unsave { id } => commands::unsave(&app, &mut out, &id).await,
        Command::Saved => commands::saved(&app, &mut out).await,
        Command::Comment { id, text } => commands::comment(&app, &mut out, &id, &text).await,
        Command::React { id, reaction } => commands::react(&app, &mut out, &id, reaction).await,
        Command::Dashboard { date } => commands::dashboard(&app, &mut out, date).await,
        Command::Nutrition { food_log, date } => {
            commands::nutrition(&app, &mut out, &food_log, date).await
        }
        Command::Metrics => commands::metrics(&mut out),
        Command::Settings(SettingsCommand::Show) => commands::settings_show(&app, &mut out).await,
        Command::Settings(SettingsCommand::Set {
            language,
            refresh_interval,
            notifications,
            ai_verbosity,
        }) => {
            let update = SettingsUpdate {
                language,
                refresh_interval,
                notifications,
                ai_verbosity,
            };
            commands::settings_set(&app, &mut out, &update).await
        }
        Command::Cache(CacheCommand::Stats) => commands::cache_stats(&app, &mut out).await,
        Command::Cache(CacheCommand::Clear) => commands::cache_clear(&app, &mut out).await,
    }
}
