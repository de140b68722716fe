use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Manage invoices by chatting with an assistant",
    long_about = None
)]
pub struct Args {
    /// Config file (defaults to ~/.invoicechat/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the credential-holding relay server
    Relay {
        /// Address to listen on, e.g. 127.0.0.1:8787
        #[arg(long)]
        bind: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Send a single request and print the answer; piped stdin is added as context
    Ask {
        #[command(flatten)]
        session: SessionArgs,

        /// What to ask, e.g. "list my overdue invoices"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct SessionArgs {
    /// Model to use (overrides the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Relay endpoint URL (overrides the config file)
    #[arg(long)]
    pub relay_url: Option<String>,

    /// Keep invoices in memory only for this run
    #[arg(long)]
    pub ephemeral: bool,
}
