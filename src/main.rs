use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curator_api::{
    api::{cors_layer, create_router, AppState},
    config::Config,
    db::{self, create_redis_client, Cache, CacheWriterHandle, MemoryStore, PgStore, Stores},
    metrics::Metrics,
    services::summarizer::{CachedSummarizer, OpenAiSummarizer, Summarizer, SummarizerGateway},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curator_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let metrics = Metrics::new()?;

    let stores = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            tracing::info!("Connected to PostgreSQL, migrations applied");
            Stores::metered(Arc::new(PgStore::new(pool)), metrics.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Stores::metered(Arc::new(MemoryStore::new()), metrics.clone())
        }
    };

    let (summarizer, cache_handle) = build_summarizer(&config).await?;

    let state = AppState::new(stores, summarizer, metrics);
    let app = create_router(state).layer(cors_layer(config.cors_origin.as_deref())?);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// OpenAI when a key is configured, cached in Redis when a Redis URL is set
async fn build_summarizer(
    config: &Config,
) -> Result<(SummarizerGateway, Option<CacheWriterHandle>)> {
    let Some(api_key) = config.openai_api_key.clone() else {
        tracing::warn!("OPENAI_API_KEY not set, summaries fall back to extraction");
        return Ok((SummarizerGateway::unavailable(), None));
    };

    let provider: Arc<dyn Summarizer> = Arc::new(OpenAiSummarizer::new(
        api_key,
        config.openai_api_url.clone(),
        config.openai_model.clone(),
        config.openai_max_tokens,
    ));

    let Some(redis_url) = &config.redis_url else {
        tracing::info!(provider = provider.name(), "Summarizer ready without cache");
        return Ok((
            SummarizerGateway::new(provider, config.summary_timeout()),
            None,
        ));
    };

    let client = create_redis_client(redis_url)?;
    let (cache, handle) = Cache::new(client).await;
    let cached: Arc<dyn Summarizer> = Arc::new(CachedSummarizer::new(
        provider,
        cache,
        config.summary_cache_ttl,
    ));
    tracing::info!(provider = cached.name(), "Summarizer ready with Redis cache");

    Ok((
        SummarizerGateway::new(cached, config.summary_timeout()),
        Some(handle),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
