use std::{future::Future, net::SocketAddr, sync::Arc};

use tokio::{
    net::TcpListener,
    spawn,
    sync::Semaphore,
    time::{self, Duration},
};
use tracing::{debug, error, info, warn};

use crate::{connect::HttpConnection, error::ServerError, service::HttpService};

const MAX_CONNECTIONS: usize = 1000;
const CONNECTION_TIMEOUT: u64 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: String,
    pub service: Arc<HttpService>,
    /// Idle read timeout in seconds
    pub timeout: u64,
    pub max_connections: usize,
    pub keep_alive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            service: Arc::new(HttpService::default()),
            timeout: CONNECTION_TIMEOUT,
            max_connections: MAX_CONNECTIONS,
            keep_alive: true,
        }
    }
}

#[derive(Default, Debug)]
pub struct HttpServer {
    pub config: ServerConfig,
}

impl HttpServer {
    pub fn new() -> Self {
        HttpServer {
            config: ServerConfig::default(),
        }
    }

    pub fn set_service(&mut self, service: HttpService) -> &mut Self {
        self.config.service = Arc::new(service);
        self
    }

    pub fn set_address(&mut self, address: &str) -> &mut Self {
        self.config.address = address.to_string();
        self
    }

    /// Open the listening socket without accepting yet
    pub async fn bind(&self) -> Result<BoundServer, ServerError> {
        let listener = TcpListener::bind(&self.config.address)
            .await
            .map_err(|e| ServerError::bind(self.config.address.as_str(), e))?;

        Ok(BoundServer {
            listener,
            config: self.config.clone(),
        })
    }
}

/// A server whose listener is open
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes, then drop the listener
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!(
            "Serving HTTP on {} port {} (http://{}/) ...",
            addr.ip(),
            addr.port(),
            addr
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Get permit failed: {}", e);
                        time::sleep(Duration::from_secs(self.config.timeout)).await;
                        continue;
                    }
                },
            };

            let (socket, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        warn!("Accept connection failed: {}", e);
                        continue;
                    }
                },
            };

            debug!("New connection from {}", peer);

            let mut connection =
                HttpConnection::new(socket, peer, self.config.service.clone(), self.config.timeout);
            connection.keep_alive(self.config.keep_alive);

            spawn(async move {
                let _permit = permit;

                if let Err(e) = connection.process().await {
                    if e.is_disconnect() {
                        debug!("Connection from {} dropped: {}", peer, e);
                    } else {
                        warn!("Connection error from {}: {}", peer, e);
                    }
                };
            });
        }

        info!("Stopped accepting connections on {}", addr);
        Ok(())
    }
}
