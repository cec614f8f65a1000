//! CrackAlgo command line
//!
//! Every subcommand maps onto one command of the library and prints its
//! result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crackalgo::commands::{self, AppState, QuestionFilter};
use crackalgo::{setup_logging, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "crackalgo")]
#[command(version, about = "Gamified DSA practice: solve questions, earn XP and coins")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List questions
    Questions {
        /// Easy, Medium, Hard or Expert
        #[arg(short, long)]
        difficulty: Option<String>,

        #[arg(short, long)]
        tag: Option<String>,

        /// Case-insensitive keyword
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one question
    Show {
        id: u32,

        /// Print the statement as HTML
        #[arg(long)]
        html: bool,
    },

    /// Run code against a question's test cases without recording it
    Run {
        id: u32,

        /// Source file
        file: PathBuf,
    },

    /// Submit a solution and record progress
    Submit {
        id: u32,

        /// Source file
        file: PathBuf,
    },

    /// Current progress snapshot
    Progress,

    /// Current level
    Level,

    /// Achievements with unlock state
    Achievements,

    /// Badges with unlock times
    Badges,

    /// Completion rate, XP per question and favourite topics
    Analytics,

    Leaderboard,

    /// List shop items
    Shop {
        /// hint, powerup, cosmetic or boost
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Buy a shop item
    Buy { item_id: String },

    /// Coin balance and history
    Coins,

    /// List challenges
    Challenges {
        /// waiting, active or completed
        #[arg(short, long)]
        status: Option<String>,

        /// Only challenges you have joined
        #[arg(short, long)]
        mine: bool,
    },

    /// Join a challenge
    Join { challenge_id: String },

    /// Leave a challenge
    Leave { challenge_id: String },

    /// Submit a solution to a joined challenge
    Finish {
        challenge_id: String,

        /// Source file
        file: PathBuf,
    },

    /// Sign in with email and password
    Login {
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Sign in with a federated provider's id token
    LoginWith {
        /// e.g. google.com
        provider: String,

        id_token: String,
    },

    /// Create an account
    Signup {
        email: String,

        #[arg(short, long)]
        password: String,
    },

    Logout,

    /// Show the signed-in user
    Whoami,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

async fn dispatch(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Questions {
            difficulty,
            tag,
            search,
        } => {
            let filter = QuestionFilter {
                difficulty,
                tag,
                search,
            };
            print_json(&commands::list_questions(filter, state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Show { id, html } => {
            let detail = commands::get_question(id, state)
                .await
                .map_err(anyhow::Error::msg)?;
            if html {
                println!("{}", detail.statement_html);
                Ok(())
            } else {
                print_json(&detail)
            }
        }
        Command::Run { id, file } => {
            let code = read_source(&file)?;
            print_json(&commands::run_code(id, code, state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Submit { id, file } => {
            let code = read_source(&file)?;
            print_json(
                &commands::submit_solution(id, code, state)
                    .await
                    .map_err(anyhow::Error::msg)?,
            )
        }
        Command::Progress => {
            print_json(&commands::get_progress(state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Level => print_json(&commands::get_level(state).await.map_err(anyhow::Error::msg)?),
        Command::Achievements => {
            print_json(&commands::get_achievements(state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Badges => {
            print_json(&commands::get_badges(state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Analytics => {
            print_json(&commands::get_analytics(state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Leaderboard => {
            print_json(&commands::get_leaderboard(state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Shop { category } => print_json(
            &commands::list_shop_items(category, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Buy { item_id } => {
            print_json(&commands::buy_item(item_id, state).await.map_err(anyhow::Error::msg)?)
        }
        Command::Coins => print_json(&commands::get_coins(state).await.map_err(anyhow::Error::msg)?),
        Command::Challenges { status: _, mine: true } => print_json(
            &commands::joined_challenges(state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Challenges { status, mine: false } => print_json(
            &commands::list_challenges(status, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Join { challenge_id } => print_json(
            &commands::join_challenge(challenge_id, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Leave { challenge_id } => print_json(
            &commands::leave_challenge(challenge_id, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Finish { challenge_id, file } => {
            let code = read_source(&file)?;
            print_json(
                &commands::finish_challenge(challenge_id, code, state)
                    .await
                    .map_err(anyhow::Error::msg)?,
            )
        }
        Command::Login { email, password } => print_json(
            &commands::login(email, password, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::LoginWith { provider, id_token } => print_json(
            &commands::login_with_provider(provider, id_token, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Signup { email, password } => print_json(
            &commands::signup(email, password, state)
                .await
                .map_err(anyhow::Error::msg)?,
        ),
        Command::Logout => {
            commands::logout(state).await.map_err(anyhow::Error::msg)?;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            match commands::get_current_user(state)
                .await
                .map_err(anyhow::Error::msg)?
            {
                Some(user) => print_json(&user),
                None => {
                    println!("Not signed in (using {})", commands::GUEST_USER_ID);
                    Ok(())
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        config.log_filter()
    };
    setup_logging(level).context("failed to initialise logging")?;

    log::debug!(
        "crackalgo {} on {}, data at {}",
        env!("CARGO_PKG_VERSION"),
        crackalgo::utils::get_platform(),
        config.database_path().display()
    );

    let state = AppState::open(&config).context("failed to open storage")?;
    dispatch(args.command, &state).await
}
