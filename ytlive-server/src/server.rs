//! ytlive-server/src/server.rs
//!
//! Builds the ServerContext, starts the background tasks and serves HTTP
//! until Ctrl-C (or SIGTERM on unix).

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use ytlive_core::Error;
use ytlive_core::eventbus::UserEventBus;
use ytlive_core::services::WebhookWorker;
use ytlive_core::tasks::spawn_lease_renewal_task;
use ytlive_core::websub::{self, WebhookState};

use crate::Args;
use crate::api::{self, ApiState};
use crate::context::ServerContext;
use crate::ws;

pub async fn run_server(args: Args) -> Result<(), Error> {
    let mut ctx = ServerContext::new(&args).await?;

    match ctx.quota.usage_today().await {
        Ok(summary) => info!(
            "YouTube quota for {}: {} / {} units used",
            summary.date, summary.used, summary.limit
        ),
        Err(e) => warn!("Could not read today's quota usage => {:?}", e),
    }

    // 1) Webhook worker drains what the callback handler enqueues
    let worker_handle = match ctx.webhook_rx.take() {
        Some(rx) => WebhookWorker::new(rx, ctx.reconciler.clone(), ctx.dead_letters.clone(), ctx.clock.clone())
            .spawn(),
        None => return Err(Error::EventBus("webhook receiver already taken".into())),
    };

    // 2) Fallback poller
    let poller_handle = ctx.poller.clone().spawn(ctx.event_bus.shutdown_rx.clone());

    // 3) Lease renewal
    let renewal_handle = spawn_lease_renewal_task(
        ctx.subscriptions.clone(),
        ctx.channels.clone(),
        ctx.subscription_manager.clone(),
        ctx.clock.clone(),
        ctx.lease_renewal.clone(),
        ctx.event_bus.shutdown_rx.clone(),
    );

    // 4) HTTP
    let app = build_router(&ctx);
    let addr: SocketAddr = args.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {} (WebSub callback at {})", addr, websub::webhook::CALLBACK_PATH);

    let bus = ctx.event_bus.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(bus.clone()))
        .await?;

    // Cleanup
    bus.shutdown();
    info!("HTTP server stopped; waiting for background tasks...");
    for (name, handle) in [("poller", poller_handle), ("lease renewal", renewal_handle)] {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("{} task did not stop in time", name);
        }
    }

    // The router (and every queue sender with it) is gone, so the worker
    // finishes once the backlog is drained.
    drop(ctx);
    if tokio::time::timeout(Duration::from_secs(10), worker_handle).await.is_err() {
        warn!("Webhook worker did not drain in time");
    }

    info!("Server shutdown complete.");
    Ok(())
}

fn build_router(ctx: &ServerContext) -> Router {
    let webhook_state = WebhookState::new(
        &ctx.websub_secret,
        ctx.webhook_queue.clone(),
        ctx.dead_letters.clone(),
        ctx.clock.clone(),
    );
    let api_state = ApiState {
        tracking: ctx.tracking.clone(),
        notifications: ctx.notifications.clone(),
        quota: ctx.quota.clone(),
    };

    Router::new()
        .merge(websub::router(webhook_state))
        .merge(api::router(api_state))
        .merge(api::dead_letter_router(ctx.dead_letters.clone()))
        .merge(api::health_router())
        .merge(ws::router(ctx.event_bus.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn shutdown_signal(bus: UserEventBus) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C detected; shutting down..."),
        _ = terminate => info!("SIGTERM received; shutting down..."),
    }
    // Open WebSockets watch this flag and close themselves.
    bus.shutdown();
}
