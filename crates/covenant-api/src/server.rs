//! Server assembly and lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

use covenant_core::{Error, Result};
use covenant_service::ContractOrchestrator;
use covenant_store::{ContractStore, InMemoryContractStore, SqliteContractStore};

use crate::clients::{ArgoClient, CspInfoClient};
use crate::config::Config;
use crate::grpc::ContractGrpcService;
use crate::seed::{SeedOutcome, ensure_default_contract};

/// The Covenant gRPC server.
#[derive(Debug)]
pub struct Server {
    config: Config,
    orchestrator: Arc<ContractOrchestrator>,
}

impl Server {
    /// Opens the store, seeds it if configured, and wires the downstream
    /// clients that have addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the database cannot
    /// be opened, seeding fails, or a downstream endpoint is malformed.
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn ContractStore> = if config.uses_in_memory_db() {
            tracing::warn!("using in-memory contract store (debug only)");
            Arc::new(InMemoryContractStore::new())
        } else {
            tracing::info!(path = %config.db_path, "opening contract database");
            Arc::new(SqliteContractStore::open(&config.db_path)?)
        };

        if config.seed_default_contract {
            match ensure_default_contract(store.as_ref()).await? {
                SeedOutcome::Created(_) => {}
                SeedOutcome::AlreadyPresent(id) => {
                    tracing::debug!(contract_id = %id, "default contract already present");
                }
            }
        }

        let timeout = config.downstream_timeout();
        let mut orchestrator = ContractOrchestrator::new(store)
            .with_workflow_settings(config.workflow_settings())
            .with_call_timeout(timeout);

        match config.info_endpoint() {
            Some(uri) => {
                tracing::info!(endpoint = %uri, "CSP-info client configured");
                orchestrator =
                    orchestrator.with_provisioner(Arc::new(CspInfoClient::connect_lazy(uri, timeout)?));
            }
            None => tracing::warn!("COVENANT_INFO_ADDRESS not set"),
        }
        match config.argo_base_url() {
            Some(url) => {
                tracing::info!(endpoint = %url, "workflow client configured");
                orchestrator =
                    orchestrator.with_workflow_submitter(Arc::new(ArgoClient::new(url, timeout)));
            }
            None => tracing::warn!("COVENANT_ARGO_ADDRESS not set"),
        }
        if !orchestrator.can_create() {
            tracing::warn!("downstream services not configured; CreateContract answers UNIMPLEMENTED");
        }

        Ok(Self::with_orchestrator(config, Arc::new(orchestrator)))
    }

    /// Creates a server around an already wired orchestrator.
    #[must_use]
    pub const fn with_orchestrator(config: Config, orchestrator: Arc<ContractOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the gRPC service this server exposes.
    #[must_use]
    pub fn service(&self) -> ContractGrpcService {
        ContractGrpcService::new(Arc::clone(&self.orchestrator))
    }

    /// Binds the configured port and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the transport fails.
    pub async fn serve(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.grpc_port));
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::Internal {
            message: format!("failed to bind to {addr}: {e}"),
        })?;

        tracing::info!(grpc_port = self.config.grpc_port, "starting Covenant gRPC server");
        self.serve_with_listener(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn serve_with_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tonic::transport::Server::builder()
            .add_service(self.service().into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
            .map_err(|e| Error::Internal {
                message: format!("server error: {e}"),
            })?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debug_config() -> Config {
        Config {
            debug: true,
            db_path: crate::config::IN_MEMORY_DB.to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn unwired_server_cannot_create() -> Result<()> {
        let server = Server::from_config(debug_config()).await?;
        assert!(!server.orchestrator.can_create());
        Ok(())
    }

    #[tokio::test]
    async fn addresses_wire_both_clients() -> Result<()> {
        let config = Config {
            info_address: Some("127.0.0.1".to_string()),
            argo_address: Some("127.0.0.1".to_string()),
            ..debug_config()
        };
        let server = Server::from_config(config).await?;
        assert!(server.orchestrator.can_create());
        Ok(())
    }

    #[tokio::test]
    async fn seeding_creates_default_contract() -> Result<()> {
        let config = Config {
            seed_default_contract: true,
            ..debug_config()
        };
        let server = Server::from_config(config).await?;
        let default = server
            .orchestrator
            .get_default_contract()
            .await
            .map_err(|e| Error::Internal { message: e.to_string() })?;
        assert!(default.is_default());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = Config {
            downstream_timeout_secs: 0,
            ..debug_config()
        };
        assert!(Server::from_config(config).await.is_err());
    }
}
