use axum::Router;
use axum::handler::Handler;
use axum::routing::{self, MethodRouter};
use axum_server::Handle;
use blocks_hooks::{Hook, shutdown_signal};
use blocks_logger::{LogContext, Logx, default_logger};
use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::{
    DEFAULT_ADDRESS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STOP_TIMEOUT, ServerConfig, TlsConfig,
    parse_address,
};
use crate::error::{ServerError, ServerErrorExt};
use crate::middleware::{self, MiddlewareSettings};
use crate::routes::{self, RouteInfo};

/// Fluent configuration for a [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
pub struct ServerBuilder {
    address: String,
    stop_timeout: Duration,
    print_routes: bool,
    logger: Arc<dyn Logx>,
    hooks: Option<Hook>,
    tls: Option<TlsConfig>,
    middleware: MiddlewareSettings,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_owned(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            print_routes: false,
            logger: default_logger(),
            hooks: None,
            tls: None,
            middleware: MiddlewareSettings {
                request_id: true,
                real_ip: true,
                recover: true,
                trace: true,
                request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
                cors_origins: Vec::new(),
            },
        }
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("stop_timeout", &self.stop_timeout)
            .field("print_routes", &self.print_routes)
            .field("tls", &self.tls)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

impl ServerBuilder {
    /// Applies every field of `cfg`, replacing earlier settings.
    pub fn config(mut self, cfg: ServerConfig) -> Self {
        self.address = cfg.address;
        self.stop_timeout = Duration::from_secs(cfg.stop_timeout_secs);
        self.print_routes = cfg.print_routes;
        self.tls = cfg.tls;
        self.middleware = MiddlewareSettings {
            request_id: cfg.request_id,
            real_ip: cfg.real_ip,
            recover: cfg.recover,
            trace: cfg.trace,
            request_timeout: (cfg.request_timeout_secs > 0)
                .then(|| Duration::from_secs(cfg.request_timeout_secs)),
            cors_origins: cfg.cors_origins,
        };
        self
    }

    /// Listen address, `host:port` or `:port`.
    pub fn addr(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// How long in-flight requests may take to finish after shutdown starts.
    pub const fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Per-request timeout answered with `504`; `None` disables it.
    pub const fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.middleware.request_timeout = timeout;
        self
    }

    /// Prints the route table to stdout before serving.
    pub const fn print_routes(mut self, enabled: bool) -> Self {
        self.print_routes = enabled;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logx>) -> Self {
        self.logger = logger;
        self
    }

    /// Runs `hooks` after the server has drained.
    pub fn hooks(mut self, hooks: Hook) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub const fn request_id(mut self, enabled: bool) -> Self {
        self.middleware.request_id = enabled;
        self
    }

    pub const fn real_ip(mut self, enabled: bool) -> Self {
        self.middleware.real_ip = enabled;
        self
    }

    /// Converts handler panics into `500` responses.
    pub const fn recover(mut self, enabled: bool) -> Self {
        self.middleware.recover = enabled;
        self
    }

    pub const fn trace(mut self, enabled: bool) -> Self {
        self.middleware.trace = enabled;
        self
    }

    /// Enables CORS for `origins`; `"*"` mirrors the caller's origin.
    pub fn cors<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.cors_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Serves HTTPS with the given PEM files. Requires the `tls` feature.
    pub fn tls(mut self, cert: impl Into<std::path::PathBuf>, key: impl Into<std::path::PathBuf>) -> Self {
        self.tls = Some(TlsConfig { cert: cert.into(), key: key.into() });
        self
    }

    fn validate_tls(&self) -> Result<(), ServerError> {
        let Some(tls) = &self.tls else {
            return Ok(());
        };
        if !cfg!(feature = "tls") {
            return Err(ServerError::Tls {
                message: "TLS requested but blocks-server was built without the `tls` feature".into(),
                context: None,
            });
        }
        for (what, path) in [("certificate", &tls.cert), ("key", &tls.key)] {
            if !path.exists() {
                return Err(ServerError::Tls {
                    message: format!("{what} not found at {}", path.display()).into(),
                    context: None,
                });
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = tls.key.metadata().context("reading TLS key metadata")?.permissions().mode();
            if mode & 0o077 != 0 {
                tracing::warn!(key = %tls.key.display(), "TLS private key is readable by group/others (should be 600)");
            }
        }
        Ok(())
    }

    /// Validates the address and TLS files and produces a [`Server`].
    ///
    /// # Errors
    /// * [`ServerError::InvalidAddress`] when the address does not resolve.
    /// * [`ServerError::Tls`] when TLS is requested but unusable.
    pub fn build(self) -> Result<Server, ServerError> {
        self.validate_tls()?;
        let addr = parse_address(&self.address)?;

        Ok(Server {
            addr,
            stop_timeout: self.stop_timeout,
            print_routes: self.print_routes,
            logger: self.logger,
            hooks: self.hooks,
            tls: self.tls,
            middleware: self.middleware,
            router: Router::new(),
            routes: Vec::new(),
        })
    }
}

/// A configured HTTP server: register routes, then [`Server::run`].
///
/// ```rust,no_run
/// use blocks_server::Server;
///
/// async fn ping() -> &'static str {
///     "pong"
/// }
///
/// # async fn example() -> Result<(), blocks_server::ServerError> {
/// Server::builder().addr(":5098").print_routes(true).build()?.get("/ping", ping).run().await
/// # }
/// ```
#[must_use = "call .run().await to start the server"]
pub struct Server {
    addr: SocketAddr,
    stop_timeout: Duration,
    print_routes: bool,
    logger: Arc<dyn Logx>,
    hooks: Option<Hook>,
    tls: Option<TlsConfig>,
    middleware: MiddlewareSettings,
    router: Router,
    routes: Vec<RouteInfo>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("addr", &self.addr)
            .field("stop_timeout", &self.stop_timeout)
            .field("routes", &self.routes)
            .field("tls", &self.tls.is_some())
            .finish_non_exhaustive()
    }
}

macro_rules! method_route {
    ($(#[$doc:meta])* $name:ident, $method:literal) => {
        $(#[$doc])*
        pub fn $name<H, T>(mut self, path: &str, handler: H) -> Self
        where
            H: Handler<T, ()>,
            T: 'static,
        {
            self.router = self.router.route(path, routing::$name(handler));
            self.routes.push(RouteInfo::new($method, path, type_name::<H>()));
            self
        }
    };
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    method_route!(
        /// Registers a `GET` handler.
        get, "GET"
    );
    method_route!(
        /// Registers a `POST` handler.
        post, "POST"
    );
    method_route!(put, "PUT");
    method_route!(patch, "PATCH");
    method_route!(delete, "DELETE");

    /// Registers an arbitrary method router; listed as `ANY`.
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.router = self.router.route(path, method_router);
        self.routes.push(RouteInfo::new("ANY", path, "axum::routing::MethodRouter"));
        self
    }

    /// Merges a prepared router. Its routes are not listed by
    /// [`Server::render_routes`].
    pub fn merge(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    /// Nests a prepared router under `path`.
    pub fn nest(mut self, path: &str, router: Router) -> Self {
        self.router = self.router.nest(path, router);
        self.routes.push(RouteInfo::new("NEST", path, "axum::Router"));
        self
    }

    /// Direct access to the underlying router (state, fallbacks, custom layers).
    pub fn with_router(mut self, f: impl FnOnce(Router) -> Router) -> Self {
        self.router = f(self.router);
        self
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The route table as plain text.
    #[must_use]
    pub fn render_routes(&self, exclude: &[&str]) -> String {
        routes::render(&self.routes, exclude, false)
    }

    /// Prints the colored route table to stdout.
    #[allow(clippy::print_stdout)]
    pub fn print_routes(&self, exclude: &[&str]) {
        print!("{}", routes::render(&self.routes, exclude, true));
    }

    /// The router wrapped in the configured middleware.
    #[must_use]
    pub fn into_router(self) -> Router {
        middleware::apply(self.router, &self.middleware)
    }

    /// Serves until SIGINT/SIGTERM.
    ///
    /// # Errors
    /// Returns [`ServerError::Io`] when binding or serving fails.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            match shutdown_signal().await {
                Ok(signal) => info!(%signal, "shutdown signal received"),
                Err(e) => error!("error while waiting for shutdown signal: {e}"),
            }
        })
        .await
    }

    /// Serves until `signal` resolves, then drains within the stop timeout
    /// and runs the registered hooks.
    ///
    /// # Errors
    /// Returns [`ServerError::Io`] when binding or serving fails.
    pub async fn run_until<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.print_routes {
            self.print_routes(&[]);
        }

        let Self { addr, stop_timeout, logger, hooks, tls, middleware, router, .. } = self;
        let app = middleware::apply(router, &middleware)
            .into_make_service_with_connect_info::<SocketAddr>();

        let handle = Handle::<SocketAddr>::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            signal.await;
            shutdown.graceful_shutdown(Some(stop_timeout));
        });

        let ctx = LogContext::new();
        let scheme = if tls.is_some() { "HTTPS" } else { "HTTP" };
        logger.info(&ctx, &format!("{scheme} server starting on {addr}"));

        let bound = handle.clone();
        let announcer = Arc::clone(&logger);
        let announce = tokio::spawn(async move {
            if let Some(local) = bound.listening().await {
                announcer.info(&LogContext::new(), &format!("{scheme} server listening on {local}"));
            }
        });

        let served = async {
            match tls {
                #[cfg(feature = "tls")]
                Some(tls) => {
                    let rustls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                        .await
                        .context("loading TLS certificate")?;
                    axum_server::bind_rustls(addr, rustls)
                        .handle(handle)
                        .serve(app)
                        .await
                        .context("HTTPS server failed")
                },
                #[cfg(not(feature = "tls"))]
                Some(_) => Err(ServerError::Tls {
                    message: "built without the `tls` feature".into(),
                    context: None,
                }),
                None => axum_server::bind(addr)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTP server failed"),
            }
        }
        .await;
        // `listening` never resolves when binding failed.
        announce.abort();
        served?;

        if let Some(hooks) = hooks {
            hooks.shutdown().await;
        }
        logger.info(&ctx, "server stopped");
        Ok(())
    }
}
