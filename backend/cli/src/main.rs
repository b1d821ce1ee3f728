mod demo;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use hookforge_config::{config_dir, config_file_path, load_and_prepare, HookforgeConfig};
use hookforge_core::Interaction;
use hookforge_gateway::{
    start_server, AppContext, DispatchError, Dispatcher, ErrorHook, GatewayState, ResponseMessages,
    RestClient,
};
use hookforge_logging::{init_logger, redact_sensitive_data};
use hookforge_security::SignatureVerifier;

#[derive(Parser)]
#[command(name = "hookforge")]
#[command(about = "HookForge interaction endpoint server")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register commands and serve the interaction endpoint
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Push the command set to the platform once and exit
    Sync,
    /// Print the redacted config and its validation report
    CheckConfig,
    /// Delete a registered command by its remote id
    DeleteCommand {
        id: String,
        /// Guild the command is scoped to
        #[arg(long)]
        guild: Option<String>,
    },
}

/// Logs resolution, handler and decode failures with secrets scrubbed.
struct LogErrorHook;

#[async_trait]
impl ErrorHook for LogErrorHook {
    async fn on_error(&self, interaction: Option<&Interaction>, error: &DispatchError) {
        let message = redact_sensitive_data(&error.to_string());
        match interaction {
            Some(interaction) => error!(
                interaction_id = %interaction.id,
                kind = %interaction.kind,
                "[Dispatch] {}",
                message
            ),
            None => error!("[Dispatch] undecodable interaction: {}", message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::CheckConfig => check_config(&path).await,
        command => {
            let config = load_and_prepare(&path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            init_logger(&config.log_dir, &config.log_level);

            match command {
                Commands::Serve { port } => {
                    let config = HookforgeConfig { port: port.unwrap_or(config.port), ..config };
                    run_server(config).await
                }
                Commands::Sync => {
                    let mut ctx = build_context(&config);
                    sync(&config, &mut ctx).await
                }
                Commands::DeleteCommand { id, guild } => {
                    rest_client(&config).delete_command(&id, guild.as_deref()).await?;
                    println!("Deleted command {id}");
                    Ok(())
                }
                Commands::CheckConfig => Ok(()),
            }
        }
    }
}

fn rest_client(config: &HookforgeConfig) -> RestClient {
    RestClient::new(&config.api_base, &config.application_id, &config.token)
}

fn build_context(config: &HookforgeConfig) -> AppContext {
    let mut ctx = AppContext::new(rest_client(config));
    demo::register(&mut ctx);
    info!(
        commands = ctx.commands.len(),
        components = ctx.components.len(),
        "[Commands] registered demo set"
    );
    ctx
}

async fn sync(config: &HookforgeConfig, ctx: &mut AppContext) -> Result<()> {
    let report = ctx.sync_commands().await?;
    info!(synced = report.synced.len(), "[Sync] commands registered");

    if let Some(channel) = &config.sync_log_channel_id {
        let mut notice = format!("Synced {} commands.", report.synced.len());
        if !report.missing.is_empty() {
            let names: Vec<_> = report.missing.iter().map(|k| k.to_string()).collect();
            notice.push_str(&format!(" Not acknowledged: {}.", names.join(", ")));
        }
        if let Err(e) = ctx.rest.send_message(channel, &serde_json::json!({ "content": notice })).await {
            warn!("[Sync] failed to post sync notice: {:#}", e);
        }
    }
    Ok(())
}

async fn run_server(config: HookforgeConfig) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr()))?;
    info!(port = config.port, bind = %config.bind_address, "Starting HookForge");

    let mut ctx = build_context(&config);
    if config.sync_on_startup {
        // A failed sync leaves commands queued; the endpoint still serves.
        if let Err(e) = sync(&config, &mut ctx).await {
            error!("[Sync] startup sync failed: {:#}", e);
        }
    }

    let verifier = SignatureVerifier::from_hex(&config.public_key).context("Invalid public key")?;
    let dispatcher = Dispatcher::new(verifier)
        .with_messages(ResponseMessages {
            not_found: config.not_found_message.clone(),
            check_failed: config.check_failed_message.clone(),
            error: config.error_message.clone(),
        })
        .with_error_hook(Arc::new(LogErrorHook));

    let state = GatewayState::new(dispatcher, ctx);
    start_server(addr, &config.route, state).await
}

async fn check_config(path: &std::path::Path) -> Result<()> {
    let raw = hookforge_config::load_raw_config(path).await?;
    let config: HookforgeConfig = serde_json::from_value(hookforge_config::resolve_env_vars(&raw)?)
        .context("Failed to deserialize config")?;
    let config = hookforge_config::apply_env_overrides(config)?;

    println!("# {}", path.display());
    println!("{}", serde_yaml::to_string(&hookforge_config::redact(&config))?);

    let report = hookforge_config::validate(&config);
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    if report.is_valid() {
        println!("Config OK");
        Ok(())
    } else {
        anyhow::bail!("{} config errors", report.errors.len())
    }
}
