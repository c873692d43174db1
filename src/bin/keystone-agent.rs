use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keystone_agent::config::identity::ClientConfig;
use keystone_agent::config::loader;
use keystone_agent::server;
use keystone_agent::utils::constants::DEFAULT_CONFIG_PATH;
use keystone_agent::utils::logging::{self, LogLevel};
use keystone_agent::KeystoneClient;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the identity operations over HTTP (default)
    Serve,
    /// Print the admin token, its expiry and tenant id
    Token,
    /// Print the service catalog
    Catalog,
    /// Print tenant information
    Tenant { tenant_id: String },
    /// Validate a user token, optionally for a tenant
    Validate {
        token: String,
        #[arg(long)]
        tenant: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create identity client
    // -------------------------------

    let client_config = ClientConfig::try_from(&service_config)?;
    info!(url = %client_config.base_url, "identity service");
    let client = KeystoneClient::new(client_config).context("cannot build identity client")?;

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Service starting...");
            server::server::start(&service_config.settings, client).await?;
        }
        Command::Token => print_json(&client.tenant_id_and_token().await?)?,
        Command::Catalog => print_json(&client.service_catalog().await?)?,
        Command::Tenant { tenant_id } => print_json(&client.tenant_info(&tenant_id).await?)?,
        Command::Validate { token, tenant } => {
            let body = match tenant {
                Some(tenant_id) => client.validate_token_for_tenant(&tenant_id, &token).await?,
                None => client.validate_token(&token).await?,
            };
            print_json(&body)?
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
