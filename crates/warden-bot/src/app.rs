//! Process setup and the gateway event loop

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use warden_common::{AppConfig, AppError, AppResult};
use warden_db::{create_pool, ensure_schema, PgBanRepository, PgPendingCheckRepository};
use warden_discord::{DiscordClient, GatewayClient, GatewayEvent};
use warden_service::{BanService, EvaluationTicker, JoinOutcome, ServiceContext};

use crate::commands::Dispatcher;

/// Buffered gateway events before the connection waits on the handler
const EVENT_BUFFER: usize = 256;

/// Initialize every dependency and build the service context
pub async fn create_context(config: &AppConfig) -> AppResult<(Arc<ServiceContext>, Arc<DiscordClient>)> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(AppError::database)?;
    ensure_schema(&pool).await.map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    let discord = Arc::new(DiscordClient::new(
        &config.discord.token,
        config.discord.request_timeout(),
    )?);

    let ctx = ServiceContext::builder()
        .ban_repo(Arc::new(PgBanRepository::new(pool.clone())))
        .check_repo(Arc::new(PgPendingCheckRepository::new(pool)))
        .platform(discord.clone())
        .moderation(config.moderation.clone())
        .activity(config.activity.clone())
        .build()
        .map_err(AppError::internal)?;

    match BanService::new(&ctx).entries().await {
        Ok(entries) => info!(entries = entries.len(), "Blacklist loaded"),
        Err(e) => warn!(error = %e, "Could not count blacklist entries"),
    }

    Ok((Arc::new(ctx), discord))
}

/// Run the bot until Ctrl-C or a fatal gateway error
pub async fn run(config: AppConfig) -> AppResult<()> {
    let (ctx, discord) = create_context(&config).await?;

    let gateway_url = discord.gateway_url().await?;
    debug!(url = %gateway_url, "Resolved gateway URL");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);

    let ticker = tokio::spawn(EvaluationTicker::new(ctx.clone(), shutdown_rx.clone()).run());
    let gateway = tokio::spawn(
        GatewayClient::new(config.discord.token.clone(), gateway_url, events_tx, shutdown_rx).run(),
    );

    let dispatcher = Arc::new(Dispatcher::new(ctx.clone(), config.discord.command_prefix.clone()));

    info!("Warden is running");

    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Some(event) = event else {
                    debug!("Gateway event channel closed");
                    break;
                };
                spawn_handler(ctx.clone(), dispatcher.clone(), event);
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Shutdown requested");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    drop(events_rx);

    join_quietly("ticker", ticker).await;
    match gateway.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(AppError::gateway(e)),
        Err(e) => error!(error = %e, "Gateway task panicked"),
    }

    info!("Warden stopped");
    Ok(())
}

fn spawn_handler(ctx: Arc<ServiceContext>, dispatcher: Arc<Dispatcher>, event: GatewayEvent) {
    tokio::spawn(async move {
        match event {
            GatewayEvent::Ready { user_id, .. } => info!(user_id = %user_id, "Connected to Discord"),
            GatewayEvent::MemberJoin(member) => {
                match BanService::new(&ctx).on_member_join(&member).await {
                    JoinOutcome::NotBlacklisted => {}
                    JoinOutcome::Enforced { role, .. } => {
                        info!(user_id = %member.user_id, role = ?role, "Blacklist enforced on join");
                    }
                    JoinOutcome::LookupFailed(reason) => {
                        warn!(user_id = %member.user_id, reason = %reason, "Could not check blacklist on join");
                    }
                }
            }
            GatewayEvent::MessageCreate(message) => dispatcher.handle(&message).await,
        }
    });
}

async fn join_quietly(name: &'static str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!(task = name, error = %e, "Background task panicked");
    }
}
