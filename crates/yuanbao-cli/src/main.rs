//! yuanbao - chat with Tencent Yuanbao from the terminal.
//!
//! Authenticates with cookies exported from a logged-in browser session,
//! sends a single message, and prints the model's thinking trace followed
//! by its answer.

mod cli;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yuanbao_core::auth::{
    check_cookies, cookies_from_env, find_valid_cookie, load_cookies, merge_cookies, CookieError,
};
use yuanbao_core::models::ModelList;
use yuanbao_core::output::{render_reply, render_reply_json};
use yuanbao_core::{ChatModel, ChatOptions, Config, UserInfoStore, YuanbaoClient};

use cli::{ChatArgs, Cli, Commands, EnvArgs};

/// Printed when no cookie passes validation
const NO_COOKIE_MESSAGE: &str = "没有可用的cookie，请检查.env文件";

/// Printed to stderr while waiting for the reply
const WAITING_MESSAGE: &str = "正在与回答中...";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
    // Logs go to stderr so stdout carries only the reply.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Read before dotenvy fills the environment from .env, which would
    // otherwise turn the first file entry into a spurious extra candidate.
    let env_cookie = cookies_from_env();

    // Load .env file if present (silently ignore if not found). dotenvy
    // stops at the first line it cannot parse, and unquoted cookie values
    // are such lines: keep other settings above them or quote the cookies.
    // Cookies themselves are read by `load_cookies`, not from here.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config");
        Config::default()
    });

    match cli.command {
        Commands::Chat(args) => run_chat(args, &config, env_cookie).await,
        Commands::Check(args) => run_check(args, &config, env_cookie).await,
        Commands::Models => print_models(),
    }
}

/// Gather cookie candidates: env file entries first, then the process env.
fn collect_cookies(env_file: &Path, env_cookie: Option<String>) -> Result<Vec<String>> {
    let cookies = match load_cookies(env_file) {
        Ok(cookies) => cookies,
        Err(CookieError::EnvFileNotFound(path)) if env_cookie.is_some() => {
            warn!(path = %path.display(), "Env file not found, using YUANBAO_COOKIE from environment");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    Ok(merge_cookies(cookies, env_cookie))
}

fn build_client(args: &EnvArgs, config: &Config) -> Result<YuanbaoClient> {
    YuanbaoClient::new(args.timeout.unwrap_or_else(|| config.timeout_secs()))
}

/// Inputs of one chat call, resolved from arguments and config.
struct ChatPlan {
    conversation_id: String,
    message: String,
    options: ChatOptions,
    json: bool,
    user_store: Option<UserInfoStore>,
}

/// Resolve and validate everything that needs no network access.
fn plan_chat(args: &ChatArgs, config: &Config) -> Result<ChatPlan> {
    let conversation_id = args
        .conversation
        .clone()
        .or_else(|| config.conversation_id.clone())
        .context("No conversation ID - pass --conversation or set conversation_id in config")?;
    if !YuanbaoClient::is_valid_guid(&conversation_id) {
        anyhow::bail!("Invalid conversation ID: {}", conversation_id);
    }

    let model = match args.model.as_deref() {
        Some(name) => ChatModel::parse_name(name).unwrap_or_else(|| {
            warn!(model = name, "Unknown model, using {}", ChatModel::default());
            ChatModel::default()
        }),
        None => config.chat_model(),
    };

    Ok(ChatPlan {
        conversation_id,
        message: args.message.clone(),
        options: ChatOptions {
            model,
            internet_search: args.internet || config.internet,
        },
        json: args.json,
        user_store: (!args.no_save_user).then(|| UserInfoStore::new(config.user_info_path())),
    })
}

async fn run_chat(args: ChatArgs, config: &Config, env_cookie: Option<String>) -> Result<()> {
    let plan = plan_chat(&args, config)?;
    let env_file = args.env.env_file.clone().unwrap_or_else(|| config.env_file());
    let client = build_client(&args.env, config)?;
    let cookies = collect_cookies(&env_file, env_cookie);

    chat_with_cookies(&client, cookies, &plan, &mut io::stdout(), &mut io::stderr()).await
}

/// Pick a valid cookie, send the message, and write the reply to `out`.
async fn chat_with_cookies(
    client: &YuanbaoClient,
    cookies: Result<Vec<String>>,
    plan: &ChatPlan,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let found = match cookies {
        Ok(cookies) => find_valid_cookie(client, &cookies).await.map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    let (cookie, user) = match found {
        Ok(found) => found,
        Err(e) => {
            writeln!(err, "{}", NO_COOKIE_MESSAGE)?;
            return Err(e);
        }
    };
    info!(user = %user.user_id_display(), "Authenticated");

    if let Some(store) = &plan.user_store {
        if let Err(e) = store.save(&user) {
            warn!(error = %e, "Failed to save user info");
        }
    }

    writeln!(err, "{}", WAITING_MESSAGE)?;
    let reply = client
        .with_cookie(cookie)
        .chat(&plan.conversation_id, &plan.message, plan.options)
        .await?;

    if plan.json {
        writeln!(out, "{}", render_reply_json(&reply)?)?;
    } else {
        writeln!(out, "{}", render_reply(&reply))?;
    }
    Ok(())
}

async fn run_check(args: EnvArgs, config: &Config, env_cookie: Option<String>) -> Result<()> {
    let env_file = args.env_file.clone().unwrap_or_else(|| config.env_file());
    let cookies = collect_cookies(&env_file, env_cookie)?;
    let client = build_client(&args, config)?;

    check_all(&client, &cookies, &mut io::stdout()).await
}

/// Report every cookie's state; fails when none is valid.
async fn check_all(client: &YuanbaoClient, cookies: &[String], out: &mut impl Write) -> Result<()> {
    if cookies.is_empty() {
        return Err(CookieError::NoCookies.into());
    }

    let checks = check_cookies(client, cookies).await;

    for check in &checks {
        match &check.result {
            Ok(user) if check.is_valid() => {
                let name = user.nickname().unwrap_or("-");
                writeln!(out, "[✓] {}  user={} ({})", check.masked, user.user_id_display(), name)?;
            }
            Ok(user) => {
                writeln!(out, "[✗] {}  inactive session (status {:?})", check.masked, user.status)?;
            }
            Err(e) => writeln!(out, "[✗] {}  {}", check.masked, e)?,
        }
    }

    let valid = checks.iter().filter(|c| c.is_valid()).count();
    writeln!(out, "{}/{} cookies valid", valid, checks.len())?;

    if valid == 0 {
        return Err(CookieError::NoValidCookie { tried: checks.len() }.into());
    }
    Ok(())
}

fn print_models() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&ModelList::catalog())?);
    Ok(())
}
