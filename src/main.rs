use std::process;

use clap::Parser;
use ssu::cli::args::{Cli, Commands, parse_error_exit_code};
use ssu::cli::command::{check_certificate, renew_certificate};
use ssu::config::get_all_config;
use ssu::domain::RenewOutcome;
use tabled::Table;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(parse_error_exit_code(&e));
        }
    };

    if let Err(e) = run(cli).await {
        error!("{}", e);
        if e.is_precondition() {
            info!("Nothing was changed in the secret store");
        }
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> ssu::Result<()> {
    let mut config = get_all_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Renew(args) => {
            args.apply(&mut config);
            match renew_certificate(&args, &config).await? {
                RenewOutcome::StillFresh { days_remaining } => info!(
                    "Certificate for {} is still valid for {} days, nothing to do",
                    args.domain, days_remaining
                ),
                RenewOutcome::Renewed { names } => info!(
                    "Certificate for {} stored in secret {}",
                    names.join(", "),
                    args.secret_name
                ),
            }
        }
        Commands::Check(args) => match check_certificate(&args, &config).await? {
            Some(info) => {
                let table = Table::new(vec![info]).to_string();
                println!("{}", table);
            }
            None => println!("Secret {} holds no certificate yet", args.secret_name),
        },
        Commands::Version => {
            println!("SSL secret updater version {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}
