use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{self, FromRedisValue};
use bb8_redis::RedisConnectionManager;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{RedisError, RedisErrorExt};
use crate::options::RedisOptions;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

static CLIENT: OnceCell<RedisClient> = OnceCell::const_new();

/// Pooled connection handle. Cheap to clone.
#[derive(Clone)]
pub struct RedisClient {
    pool: Pool<RedisConnectionManager>,
    options: Arc<RedisOptions>,
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("options", &self.options)
            .field("state", &self.pool.state())
            .finish()
    }
}

impl RedisClient {
    /// Builds the connection pool and verifies the server answers `PING`
    /// within two seconds.
    ///
    /// # Errors
    /// [`RedisError::Redis`] with context `"ping failed"` when the server is
    /// unreachable, or when the address cannot form a valid URL.
    pub async fn connect(options: RedisOptions) -> Result<Self, RedisError> {
        let options = options.with_defaults();
        let manager = RedisConnectionManager::new(options.connection_url())
            .context("parsing connection url")?;

        let pool = Pool::builder()
            .max_size(options.pool_size)
            .min_idle((options.min_idle > 0).then_some(options.min_idle))
            .connection_timeout(options.dial_timeout)
            .retry_connection(true)
            .build_unchecked(manager);

        let client = Self { pool, options: Arc::new(options) };
        client.ping().await.context("ping failed")?;

        info!(
            addr = %client.options.addr,
            db = client.options.db,
            tls = client.options.use_tls,
            namespace = %client.options.namespace,
            "redis connected"
        );
        Ok(client)
    }

    async fn ping(&self) -> Result<(), redis::RedisError> {
        let attempt = async {
            let mut conn = self.pool.get().await.map_err(|err| match err {
                RunError::User(source) => source,
                RunError::TimedOut => timed_out("connecting"),
            })?;
            redis::cmd("PING").query_async::<String>(&mut *conn).await
        };

        tokio::time::timeout(PING_TIMEOUT, attempt)
            .await
            .unwrap_or_else(|_| Err(timed_out("waiting for PONG")))
            .map(drop)
    }

    #[must_use]
    pub fn options(&self) -> &RedisOptions {
        &self.options
    }

    /// Applies the configured namespace: `namespace:key`, or `key` as is.
    #[must_use]
    pub fn key(&self, key: &str) -> String {
        namespaced(&self.options.namespace, key)
    }

    /// Checks out a connection, retrying with backoff on failure.
    async fn checkout(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, RedisError> {
        let mut attempt = 0;
        loop {
            match self.pool.get().await {
                Ok(conn) => return Ok(conn),
                Err(err) if attempt < self.options.max_retries => {
                    let delay = self.options.backoff(attempt);
                    debug!(attempt, ?delay, "redis checkout failed, retrying: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(RunError::User(source)) => {
                    return Err(RedisError::Redis { source, context: Some("checkout".into()) });
                },
                Err(RunError::TimedOut) => {
                    return Err(RedisError::Timeout {
                        message: "no pooled connection became available".into(),
                        context: None,
                    });
                },
            }
        }
    }

    /// Runs `cmd` under the response and command timeouts.
    pub(crate) async fn query<T: FromRedisValue>(
        &self,
        cmd: &redis::Cmd,
        label: String,
    ) -> Result<T, RedisError> {
        let round_trip = async {
            let mut conn = self.checkout().await?;
            bounded(self.options.response_timeout, async {
                cmd.query_async::<T>(&mut *conn).await.map_err(RedisError::from)
            })
            .await
        };

        bounded(self.options.command_timeout, round_trip).await.context(label)
    }
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, RedisError>
where
    F: Future<Output = Result<T, RedisError>>,
{
    if limit.is_zero() {
        return fut.await;
    }
    tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
        Err(RedisError::Timeout {
            message: format!("no reply within {}ms", limit.as_millis()).into(),
            context: None,
        })
    })
}

fn timed_out(what: &'static str) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::Io, "timed out", what.to_owned()))
}

pub(crate) fn namespaced(namespace: &str, key: &str) -> String {
    if namespace.is_empty() { key.to_owned() } else { format!("{namespace}:{key}") }
}

/// Connects the process-wide client. Only the first successful call
/// connects; later calls return the existing client and ignore `options`.
/// Concurrent first calls share a single attempt.
///
/// # Errors
/// Whatever [`RedisClient::connect`] returns. A failed attempt leaves the
/// client uninitialized so a later call may retry.
pub async fn init(options: RedisOptions) -> Result<RedisClient, RedisError> {
    CLIENT.get_or_try_init(|| RedisClient::connect(options)).await.cloned()
}

/// The process-wide client.
///
/// # Errors
/// [`RedisError::NotInitialized`] before a successful [`init`].
pub fn client() -> Result<RedisClient, RedisError> {
    CLIENT.get().cloned().ok_or(RedisError::NotInitialized { context: None })
}

#[must_use]
pub fn is_initialized() -> bool {
    CLIENT.initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(namespaced("", "user:1"), "user:1");
        assert_eq!(namespaced("app", "user:1"), "app:user:1");
    }

    #[test]
    fn global_client_requires_init() {
        assert!(!is_initialized());
        assert!(matches!(client(), Err(RedisError::NotInitialized { .. })));
    }

    #[tokio::test]
    async fn zero_limit_disables_timeout() {
        let value = bounded(Duration::ZERO, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn elapsed_limit_is_a_timeout() {
        let result: Result<(), _> = bounded(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(RedisError::Timeout { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_fails_ping() {
        let opts = RedisOptions {
            dial_timeout: Duration::from_millis(200),
            ..RedisOptions::new("127.0.0.1:1")
        };
        let err = RedisClient::connect(opts).await.unwrap_err();
        assert!(matches!(err, RedisError::Redis { .. }));
        assert!(err.to_string().contains("ping failed"));
    }
}
