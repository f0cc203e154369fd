pub mod handler;
pub mod mimetype;
pub mod policy;
pub mod service;
pub mod static_files;

use std::{net::SocketAddr, sync::Arc};

use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::Notify,
};
use tokio_rustls::TlsAcceptor;

pub use self::{
    handler::{Handler, Reply, RequestInfo},
    policy::{HeaderPolicy, WithPolicy},
    service::Service,
    static_files::StaticFiles,
};
use crate::{
    certificate::{CertificatePaths, CertificateProvider},
    config::Config,
    error::ServerError,
    filesystem::{Filesystem, local::LocalFS},
    tls,
};

/// The handler chain used for serving the document root
pub type DefaultHandler = WithPolicy<StaticFiles>;

pub struct Server<H = DefaultHandler> {
    /// The configuration for the server
    config: Arc<Config>,

    /// Wraps accepted connections in TLS
    acceptor: TlsAcceptor,

    /// The shutdown signal for the server
    signal: Arc<Notify>,

    /// Whether Ctrl+C stops the server (default: true)
    handle_signals: bool,

    /// The service for handling requests
    service: Service<H>,
}

impl Server<DefaultHandler> {
    /// Create a server for the document root, using the default header policy stack
    pub fn new(
        config: Arc<Config>,
        filesystem: Arc<dyn Filesystem>,
        acceptor: TlsAcceptor,
    ) -> Result<Self, ServerError> {
        let policy = HeaderPolicy::from_config(&config.headers)?;
        let handler = WithPolicy::new(StaticFiles::new(filesystem), policy);
        Ok(Self::with_handler(config, handler, acceptor))
    }

    /// Run the startup sequence: make sure the certificate pair exists, load it into a TLS
    /// context and open the document root.
    ///
    /// Nothing is bound yet when this returns, see [`Server::run`].
    pub fn bootstrap(
        config: Config,
        provider: &dyn CertificateProvider,
    ) -> Result<Self, ServerError> {
        config.validate()?;

        let paths = CertificatePaths::from(&config.certificate);
        provider.ensure(&paths)?;

        let acceptor = tls::build_acceptor(&paths)?;
        let filesystem = LocalFS::new(config.document_root())?;

        Self::new(Arc::new(config), Arc::new(filesystem), acceptor)
    }
}

impl<H: Handler + 'static> Server<H> {
    pub fn with_handler(config: Arc<Config>, handler: H, acceptor: TlsAcceptor) -> Self {
        debug!("Creating a new server instance");

        Server {
            config,
            acceptor,
            signal: Arc::new(Notify::new()),
            handle_signals: true,
            service: Service::new(Arc::new(handler)),
        }
    }

    /// Get the current configuration of the server.
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn set_handle_signals(&mut self, handle: bool) {
        self.handle_signals = handle;
    }

    /// Stop accepting connections; [`Server::serve`] returns shortly after
    pub fn shutdown(&self) {
        self.signal.notify_one();
    }

    /// Watch for a shutdown signal (like Ctrl+C) and notify the server to stop.
    fn watch_for_shutdown(&self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.handle_signals {
            debug!("Signal handling is disabled, skipping signal watcher");
            return None;
        }

        let signal = Arc::clone(&self.signal);
        Some(tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received interrupt, stopping the server");
                    signal.notify_one();
                }
                Err(e) => error!("Failed to install Ctrl+C handler: {e}"),
            }
        }))
    }

    /// Get the socket address for the server based on the configuration.
    pub fn get_socket_address(&self) -> Result<SocketAddr, ServerError> {
        let raw_addr = format!("{}:{}", self.config.host, self.config.port);
        raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ServerError::InvalidRawSocketAddress {
                address: raw_addr.clone(),
                message: e.to_string(),
            })
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let socket_addr = self.get_socket_address()?;
        TcpListener::bind(socket_addr)
            .await
            .map_err(ServerError::PortBindFailed)
    }

    /// Bind the configured address and serve until shut down
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Accept connections on `listener` until shut down.
    ///
    /// In-flight connections are not drained, they end with the runtime.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            info!("Listening on https://{addr}");
        }

        let watcher = self.watch_for_shutdown();

        loop {
            tokio::select! {
                _ = self.signal.notified() => {
                    debug!("Shutdown signal received, exiting server loop");
                    break;
                }

                connection = listener.accept() => match connection {
                    Ok((stream, peer)) => self.handle_connection(stream, peer),
                    Err(e) => error!("{}", ServerError::FailedToAcceptConnection(e)),
                },
            }
        }

        if let Some(watcher) = watcher {
            watcher.abort();
        }

        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        debug!("Accepted connection from {peer}");

        let acceptor = self.acceptor.clone();
        let service = self.service.for_peer(peer);

        // Handshake and serve each connection in its own task
        tokio::task::spawn(async move {
            let stream = match acceptor.accept(stream).await {
                Ok(stream) => stream,
                Err(err) => {
                    debug!("TLS handshake with {peer} failed: {err}");
                    return;
                }
            };

            let io = TokioIo::new(stream);
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Failed to serve connection from {peer}: {err:?}");
            }
        });
    }
}
