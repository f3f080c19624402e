mod cli;

use crate::cli::{GeneratorArg, ObjectStoreArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use qrbridge_admin::AdminSettings;
use qrbridge_core::{ObjectStore, Repository};
use qrbridge_gateway::{App, AppState, GatewaySettings};
use qrbridge_generator::{Base36Generator, LinkGenerator, SeqGenerator};
use qrbridge_redirector::KeepAliveProbe;
use qrbridge_storage::{InMemoryObjectStore, InMemoryRepository, LocalObjectStore, PostgresRepository};
use qrbridge_telemetry::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;

    let _telemetry = qrbridge_telemetry::init(
        &TelemetryConfig::builder()
            .service_name("qrbridge-gateway")
            .log_format(config.log_format)
            .otlp_endpoint(config.otlp_endpoint.clone())
            .otlp_protocol(config.otlp_protocol)
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        domain = %config.domain,
        storage_backend = %config.storage,
        object_store = %config.object_store,
        generator = %config.generator,
        "starting gateway server"
    );

    let object_store: Arc<dyn ObjectStore> = match config.object_store {
        ObjectStoreArg::InMemory => Arc::new(InMemoryObjectStore::new(config.assets_base_url())),
        ObjectStoreArg::Local => Arc::new(LocalObjectStore::new(
            config.assets_dir.clone(),
            config.assets_base_url(),
        )),
    };

    let mut settings = GatewaySettings::builder()
        .domain(config.domain.clone())
        .admin(
            AdminSettings::builder()
                .max_link_attempts(config.max_link_attempts)
                .build(),
        )
        .build();
    if let Some(path) = &config.default_logo {
        let logo = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read default logo {}", path.display()))?;
        settings.default_logo = Some(logo);
    }

    match config.storage {
        StorageBackendArg::InMemory => {
            let repository = Arc::new(InMemoryRepository::new());
            run_server(&config, repository, object_store, settings).await?;
        }
        StorageBackendArg::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("database url is required when storage backend is postgres")?;
            let repository = PostgresRepository::connect(database_url, config.max_connections)
                .await
                .context("failed to connect to postgres")?;
            repository
                .migrate()
                .await
                .context("failed to run migrations")?;
            run_server(&config, Arc::new(repository), object_store, settings).await?;
        }
    }

    Ok(())
}

async fn run_server<R: Repository>(
    config: &CLI,
    repository: Arc<R>,
    object_store: Arc<dyn ObjectStore>,
    settings: GatewaySettings,
) -> anyhow::Result<()> {
    let generator = link_generator(config, repository.as_ref()).await?;
    let keep_alive = config.keep_alive_interval.map(|secs| {
        info!(period_secs = secs, "scheduling keep-alive probe");
        KeepAliveProbe::new(Arc::clone(&repository)).spawn_every(Duration::from_secs(secs))
    });

    let state = AppState::new(repository, generator, object_store, settings);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = keep_alive {
        handle.abort();
    }
    info!("gateway stopped");
    Ok(())
}

async fn link_generator<R: Repository>(
    config: &CLI,
    repository: &R,
) -> anyhow::Result<LinkGenerator> {
    let generator = match config.generator {
        GeneratorArg::Random => LinkGenerator::from(
            Base36Generator::builder()
                .length(config.link_length)
                .build(),
        ),
        GeneratorArg::Seq => {
            let mappings = repository
                .list_mappings()
                .await
                .context("failed to read existing links for the sequential generator")?;
            let generator = SeqGenerator::resuming(
                config.generator_prefix.clone(),
                mappings.iter().map(|m| m.random_link.as_str()),
            );
            info!(
                next = generator.next_value(),
                prefix = %config.generator_prefix,
                "resuming sequential links"
            );
            LinkGenerator::from(generator)
        }
    };
    Ok(generator)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
