use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "yuanbao",
    author,
    version,
    about = "Chat with Tencent Yuanbao from the terminal",
    long_about = "Sends a message to Yuanbao using browser session cookies and prints the thinking trace and the answer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and print the thinking trace and answer
    Chat(ChatArgs),
    /// Validate every cookie in the env file
    Check(EnvArgs),
    /// Print the model catalogue as JSON
    Models,
}

#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Env file with one or more YUANBAO_COOKIE entries
    #[arg(long, env = "YUANBAO_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Message to send
    pub message: String,

    /// Conversation UUID (from the Yuanbao web URL)
    #[arg(short, long)]
    pub conversation: Option<String>,

    /// Model: deep_seek_v3, deep_seek_r1, hunyuan or hunyuan_t1
    #[arg(short, long)]
    pub model: Option<String>,

    /// Let the model search the web
    #[arg(long)]
    pub internet: bool,

    /// Do not write the validated user's info to disk
    #[arg(long)]
    pub no_save_user: bool,

    /// Print the reply as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub env: EnvArgs,
}
