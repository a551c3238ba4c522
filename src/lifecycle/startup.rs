//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared resource handles from configuration
//! - Compose the route table and the stage pipeline
//! - Bind the listener last, once everything else is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Route order: health, application routes, auth catch-all
//! - Stage order: origin policy, timing, docs, static assets, decorate

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use url::Url;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::pipeline::stages::{
    DecorateStage, DocsStage, OriginPolicyStage, StaticAssetsStage, TimingStage,
};
use crate::pipeline::{BoxError, Service};
use crate::resources::{CacheHandle, DatabaseHandle, ResourceError, Resources};
use crate::routes::{auth_routes, health_routes, AuthDelegate};
use crate::routing::{Route, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database handle: {0}")]
    Database(#[source] ResourceError),

    #[error("cache handle: {0}")]
    Cache(#[source] ResourceError),

    #[error("auth upstream {url}: {source}")]
    AuthUpstream {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("API documentation: {0}")]
    Docs(#[from] serde_json::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the database and cache handles. The cache supervisor stops on
/// `shutdown`.
pub fn connect_resources(
    config: &ServiceConfig,
    shutdown: &Shutdown,
) -> Result<Resources, StartupError> {
    let database = DatabaseHandle::connect(&config.database).map_err(StartupError::Database)?;
    let cache =
        CacheHandle::connect(&config.cache, shutdown.subscribe()).map_err(StartupError::Cache)?;
    Ok(Resources::new(database, cache))
}

/// Delegate forwarding to the configured auth service.
pub fn upstream_delegate(config: &ServiceConfig) -> Result<AuthDelegate, StartupError> {
    let url = &config.auth.upstream_url;
    let error = |source: BoxError| StartupError::AuthUpstream {
        url: url.clone(),
        source,
    };
    let parsed = Url::parse(url).map_err(|e| error(Box::new(e)))?;
    AuthDelegate::upstream(&parsed).map_err(error)
}

/// Compose the pipeline with the built-in routes only.
pub fn compose(
    config: &ServiceConfig,
    resources: Resources,
    auth: AuthDelegate,
) -> Result<Service, StartupError> {
    compose_with_routes(config, resources, auth, Vec::new())
}

/// Compose the pipeline; `extra` routes sit between health and auth.
pub fn compose_with_routes(
    config: &ServiceConfig,
    resources: Resources,
    auth: AuthDelegate,
    extra: Vec<Route>,
) -> Result<Service, StartupError> {
    let mut table = RouteTable::new();
    table.extend(health_routes());
    table.extend(extra);
    table.extend(auth_routes(&config.auth.prefix, auth));
    let routes = Arc::new(table);

    let mut builder = Service::builder(Arc::clone(&routes))
        .stage(OriginPolicyStage::new(&config.cors))
        .stage(TimingStage::new());
    if config.docs.enabled {
        builder = builder.stage(DocsStage::new(&config.docs, &routes)?);
    }
    if config.static_files.enabled {
        builder = builder.stage(StaticAssetsStage::new(
            &config.static_files,
            Arc::clone(&routes),
        ));
    }
    Ok(builder.stage(DecorateStage::new(resources)).build())
}

/// A composed service bound to its listener, ready to serve.
pub struct Application {
    server: HttpServer,
    listener: TcpListener,
}

impl Application {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` is triggered.
    pub async fn run(self, shutdown: &Shutdown) -> std::io::Result<()> {
        self.server.run(self.listener, shutdown.subscribe()).await
    }
}

/// Build everything described by `config` and bind the listener.
pub async fn start(config: &ServiceConfig, shutdown: &Shutdown) -> Result<Application, StartupError> {
    let resources = connect_resources(config, shutdown)?;
    let auth = upstream_delegate(config)?;
    let service = compose(config, resources, auth)?;

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Listening for connections");

    Ok(Application {
        server: HttpServer::new(Arc::new(service)),
        listener,
    })
}
