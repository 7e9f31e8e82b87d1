mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sdnboard_core::{
    Access, ConfiguredAuthenticator, Dashboard, FileSessionStore, SessionGate, SessionStore,
};

use crate::cli::{Cli, Command};
use crate::error::{CliError, ErrorContext};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;

    match cli.command {
        // Config commands don't need a controller
        Command::Config(args) => commands::config_cmd::handle(args, global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "sdnboard", &mut std::io::stdout());
            Ok(())
        }

        // Everything else goes through the session gate
        cmd => {
            let resolved = config::resolve(global)?;
            let timeout_secs = resolved.controller.timeout.as_secs();
            let ctx = ErrorContext {
                profile: &resolved.profile_name,
                timeout_secs,
            };
            let core = |e| CliError::from_core(e, &ctx);

            let client = resolved.controller.build_client().map_err(core)?;
            let authenticator =
                ConfiguredAuthenticator::from_mode(&resolved.controller.auth, Arc::clone(&client));
            let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(
                config::session_dir(&resolved.profile_name),
            ));
            let gate = SessionGate::new(authenticator, store);

            match cmd {
                Command::Login(args) => commands::session::login(&gate, &args, global, &ctx).await,
                Command::Logout => commands::session::logout(&gate, global, &ctx),
                Command::Status => commands::session::status(&gate, &resolved, global, &ctx),
                cmd => {
                    // Protected: refuse before anything is fetched.
                    match gate.enter_protected().await.map_err(core)? {
                        Access::Granted(_) => {}
                        Access::Redirect(_) => {
                            return Err(CliError::NotLoggedIn {
                                profile: resolved.profile_name.clone(),
                            });
                        }
                    }

                    let dashboard = Dashboard::new(client, resolved.controller.layout);
                    tracing::debug!(
                        command = ?cmd,
                        layout = %dashboard.layout(),
                        "dispatching command"
                    );
                    commands::dispatch(cmd, &dashboard, global, &ctx).await
                }
            }
        }
    }
}
