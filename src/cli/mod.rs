//! Command-line interface parsing and handling
//!
//! This module parses arguments, prepares the shared runtime pieces (config,
//! logging, token storage, API client) and dispatches to the subcommands.

pub mod config_cmd;
pub mod context;
pub mod login;

use std::error::Error;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::core::auth::{self, RestoreOutcome};
use crate::core::config::Config;
use crate::core::controller::ConversationController;
use crate::core::conversation::ManagerType;
use crate::core::debug::{self as debug_tools, DebugReport};
use crate::core::routes::OAuthProvider;
use crate::ui::chat_loop::{run_chat, ChatExit, ChatOptions};
use crate::utils::logging::{self, LogTarget, LOG_FILE_ENV};

use context::CliContext;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "huddle")]
#[command(version = VERSION)]
#[command(about = "A terminal client for AI coaching conversations")]
#[command(
    long_about = "Huddle is a full-screen terminal client for a conversational AI coaching \
service. Sign in with an OAuth provider, pick a coach and chat.\n\n\
Environment Variables:\n\
  HUDDLE_API_URL    Base URL of the coaching API (default http://localhost:8000/api)\n\
  HUDDLE_TOKEN      Use this auth token for the session instead of the keyring\n\
  HUDDLE_LOG        Write diagnostics to this file\n\
  RUST_LOG          Log filter (default huddle=info)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Shift+Enter       Insert a newline\n\
  Ctrl+E            Edit the draft in a larger editor (Ctrl+S save, Esc cancel)\n\
  Tab               Move focus between the message box and the temperature slider\n\
  Left/Right        Adjust temperature by 0.01 (PgUp/PgDn by 0.10)\n\
  Ctrl+N            Start a new conversation\n\
  F2                Show the debug panel (Ctrl+R inside it resets all state)\n\
  Ctrl+C / Esc      Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the coaching API
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Write diagnostics to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Keep the auth token in memory only; never touch the system keyring
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Resume an existing conversation instead of starting a new one
        #[arg(short = 'c', long, value_name = "ID")]
        conversation: Option<String>,
        /// Coach persona for a new conversation
        #[arg(short = 'm', long, value_name = "TYPE")]
        manager: Option<ManagerType>,
    },
    /// Sign in through an OAuth provider
    Login {
        #[arg(short = 'p', long, default_value = "google")]
        provider: OAuthProvider,
        /// Finish a sign-in by pasting the URL the provider redirected to
        #[arg(long, value_name = "URL")]
        callback_url: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your conversations, newest first
    Conversations,
    /// Inspect or reset local client state
    Debug {
        #[arg(value_enum, default_value_t = DebugAction::Show)]
        action: DebugAction,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to store
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    Show,
    Reset,
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Chat { .. })
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    let command = args.command.take().unwrap_or(Commands::Chat {
        conversation: None,
        manager: None,
    });
    let config = Config::load()?;

    let env_log = std::env::var(LOG_FILE_ENV).ok();
    let target = LogTarget::resolve(
        args.log.as_deref(),
        env_log.as_deref(),
        config.log_file.as_deref(),
        command.is_interactive(),
    );
    logging::init(&target)?;

    match command {
        Commands::Set { key, value } => config_cmd::set(&key, &value),
        Commands::Unset { key } => config_cmd::unset(&key),
        Commands::Config => config_cmd::show(),
        command => {
            let ctx = CliContext::from_env(&args, config)?;
            run_session_command(ctx, command).await
        }
    }
}

async fn run_session_command(ctx: CliContext, command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Login {
            provider,
            callback_url,
        } => login::run(&ctx, provider, callback_url.as_deref()).await,
        Commands::Logout => {
            let removed = auth::logout(&ctx.session, &ctx.tokens).await?;
            if removed {
                println!("✅ Signed out");
            } else {
                println!("Not signed in");
            }
            Ok(())
        }
        Commands::Whoami => {
            match auth::restore_session(ctx.api.as_ref(), &ctx.session, &ctx.tokens).await? {
                RestoreOutcome::SignedIn(user) => {
                    println!("{} <{}>", user.display_name(), user.email);
                }
                RestoreOutcome::SignedOut => println!("Not signed in"),
                RestoreOutcome::Expired => {
                    println!("Your session expired and has been cleared. Run `huddle login`.")
                }
            }
            Ok(())
        }
        Commands::Conversations => {
            require_sign_in(&ctx).await?;
            let controller = ConversationController::new(ctx.api.clone(), ctx.session.clone());
            let conversations = controller.list_conversations().await?;
            if conversations.is_empty() {
                println!("No conversations yet. Run `huddle chat` to start one.");
            }
            for conversation in conversations {
                println!("{}  {}", conversation.conversation_id, conversation.label());
            }
            Ok(())
        }
        Commands::Debug { action } => run_debug(&ctx, action).await,
        Commands::Chat {
            conversation,
            manager,
        } => run_chat_command(ctx, conversation, manager).await,
        Commands::Set { .. } | Commands::Unset { .. } | Commands::Config => {
            Err("configuration commands do not need a session".into())
        }
    }
}

async fn require_sign_in(ctx: &CliContext) -> Result<(), Box<dyn Error>> {
    match auth::restore_session(ctx.api.as_ref(), &ctx.session, &ctx.tokens).await? {
        RestoreOutcome::SignedIn(_) => Ok(()),
        RestoreOutcome::SignedOut => Err("Not signed in. Run `huddle login` first.".into()),
        RestoreOutcome::Expired => {
            Err("Your session expired. Run `huddle login` to sign in again.".into())
        }
    }
}

async fn run_debug(ctx: &CliContext, action: DebugAction) -> Result<(), Box<dyn Error>> {
    match action {
        DebugAction::Show => {
            if let Err(err) =
                auth::restore_session(ctx.api.as_ref(), &ctx.session, &ctx.tokens).await
            {
                warn!(error = %err, "could not verify stored token");
            }
            let store = ctx.session.snapshot().await;
            let report = DebugReport::collect(&ctx.api_base_url, &ctx.tokens, &store, None);
            for (label, value) in report.lines() {
                println!("{label:<14} {value}");
            }
            Ok(())
        }
        DebugAction::Reset => {
            let route = debug_tools::reset(&ctx.session, &ctx.tokens).await?;
            println!("✅ Client state reset. Next: {}", route.path());
            Ok(())
        }
    }
}

async fn run_chat_command(
    ctx: CliContext,
    conversation: Option<String>,
    manager: Option<ManagerType>,
) -> Result<(), Box<dyn Error>> {
    require_sign_in(&ctx).await?;

    let starting_temperature = ctx.config.temperature();
    ctx.session
        .update(|store| store.set_temperature(starting_temperature))
        .await;

    let controller = ConversationController::new(ctx.api.clone(), ctx.session.clone());
    let options = ChatOptions {
        api_base_url: ctx.api_base_url.clone(),
        conversation_id: conversation,
        manager: manager.unwrap_or_else(|| ctx.config.default_manager_type()),
        input_max_height: ctx.config.input_max_height(),
    };

    let exit = run_chat(controller, ctx.tokens.clone(), options).await?;

    let final_temperature = ctx.session.read(|store| store.temperature()).await;
    if exit != ChatExit::Reset && final_temperature != starting_temperature {
        let mut config = ctx.config.clone();
        config.temperature = Some(final_temperature);
        match config.save() {
            Ok(()) => info!(temperature = %final_temperature, "saved temperature"),
            Err(err) => warn!(error = %err, "could not save temperature"),
        }
    }

    match exit {
        ChatExit::Quit => Ok(()),
        ChatExit::SignedOut => {
            Err("Your session is no longer valid. Run `huddle login` to sign in again.".into())
        }
        ChatExit::Reset => {
            println!("Client state reset. Run `huddle login` to sign in again.");
            Ok(())
        }
    }
}
