//! Process entry point: load config, open the store, wire up the Chain
//! Oracle, Dispatcher, Confirmer, Updater, and RPC frontend in that order,
//! and run until `SIGINT`/`SIGTERM`.

use clap::Parser;
use eyre::{Context, Result};
use lightnode_confirmer::{Confirmer, ConfirmerConfig};
use lightnode_config::Cli;
use lightnode_dispatcher::Dispatcher;
use lightnode_oracle::JsonRpcChainOracle;
use lightnode_rpc::RpcRouter;
use lightnode_store::{PeerStore, RedbTxStore};
use lightnode_types::{
    entropy::StdEntropy,
    shutdown::Notifier,
    task_manager::TaskManager,
    SystemClock,
};
use lightnode_updater::{Updater, UpdaterConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load().context("failed to load configuration")?;

    init_tracing(&config);

    let bootstrap_peers = config.bootstrap_peers().context("invalid bootstrap peer list")?;

    let clock = Arc::new(SystemClock);
    let entropy = Arc::new(StdEntropy);

    let store = Arc::new(
        RedbTxStore::open(&config.data_dir)
            .with_context(|| format!("failed to open transaction store at {}", config.data_dir))?,
    );
    let peer_store = Arc::new(
        PeerStore::open(&config.peer_store_path, bootstrap_peers)
            .with_context(|| format!("failed to open peer store at {}", config.peer_store_path))?,
    );
    let oracle = Arc::new(JsonRpcChainOracle::new(config.chain_oracle_endpoints.clone()));

    let dispatcher = Arc::new(Dispatcher::new(
        config.dispatcher_cap,
        config.dispatcher_workers,
        peer_store.clone(),
        entropy.clone(),
    ));

    let confirmer = Arc::new(Confirmer::new(
        store.clone(),
        oracle,
        dispatcher.clone(),
        peer_store.clone(),
        clock.clone(),
        ConfirmerConfig {
            poll_interval: config.poll_interval,
            expiry: config.expiry,
            dispatcher_timeout: config.dispatcher_timeout,
        },
    ));

    let updater = Arc::new(Updater::new(
        peer_store.clone(),
        entropy.clone(),
        UpdaterConfig {
            poll_rate: config.updater_poll_rate,
            timeout: config.updater_timeout,
            probe_timeout: config.updater_probe_timeout,
            sample_size: config.updater_sample_size,
            bootstrap_sample_size: config.updater_bootstrap_sample_size,
        },
    ));

    let router = Arc::new(RpcRouter::new(
        store.clone(),
        peer_store.clone(),
        dispatcher.clone(),
        clock.clone(),
        config.dispatcher_timeout,
    ));

    let notifier = Notifier::new();
    let tasks = TaskManager::new("lightnode");

    tasks.spawn({
        let confirmer = confirmer.clone();
        let shutdown = notifier.subscribe();
        async move { confirmer.run(shutdown).await }
    });
    tasks.spawn({
        let updater = updater.clone();
        let shutdown = notifier.subscribe();
        async move { updater.run(shutdown).await }
    });

    let server_handle = lightnode_rpc::serve(config.listen_addr, router)
        .await
        .with_context(|| format!("failed to start RPC server on {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "lightnode listening");

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping");

    notifier.notify();
    let _ = server_handle.stop();
    tasks.join().await;
    server_handle.stopped().await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_tracing(config: &lightnode_config::Config) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match config.log_format {
        lightnode_config::LogFormat::Json => subscriber.json().init(),
        lightnode_config::LogFormat::Pretty => subscriber.pretty().init(),
    }
}
