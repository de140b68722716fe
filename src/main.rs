use clap::Parser;
use invoicechat::app::Application;
use invoicechat::cli::{Args, Command};
use invoicechat::commands::create_command_registry;
use invoicechat::config::Config;
use invoicechat::core::error::InvoiceChatError;
use invoicechat::core::logging::{LogProfile, init_tracing};
use invoicechat::display;
use std::process::ExitCode;

async fn run(args: Args) -> Result<bool, InvoiceChatError> {
    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Relay { bind } => {
            if let Some(bind) = bind {
                config.relay.bind = bind;
            }
            invoicechat::relay::serve(&config.relay).await?;
            Ok(true)
        }
        Command::Chat { session } => {
            let app = Application::new(config, create_command_registry());
            app.run_chat(&session).await?;
            Ok(true)
        }
        Command::Ask { session, query } => {
            let app = Application::new(config, create_command_registry());
            app.run_ask(&session, &query.join(" ")).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let profile = match args.command {
        Command::Relay { .. } => LogProfile::Relay,
        _ => LogProfile::Chat,
    };
    init_tracing(profile, args.verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!(error = ?e, "exiting with error");
            display::display_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
