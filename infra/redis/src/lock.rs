use bb8_redis::redis;
use std::time::Duration;

use crate::cache::ttl_millis;
use crate::client::RedisClient;
use crate::error::RedisError;

// Deletes KEYS[1] only while it still holds ARGV[1].
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
  return redis.call("DEL", KEYS[1])
else
  return 0
end"#;

impl RedisClient {
    /// Takes the lock at `key` if nobody holds it (`SET NX PX`).
    ///
    /// `value` identifies the holder for [`RedisClient::safer_unlock`].
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn try_lock(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, RedisError> {
        let key = self.key(key);
        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(value).arg("NX");
        if !ttl.is_zero() {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        let reply: Option<String> = self.query(&cmd, format!("SET NX {key}")).await?;
        Ok(reply.is_some())
    }

    /// Releases the lock regardless of who holds it.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn unlock(&self, key: &str) -> Result<(), RedisError> {
        let key = self.key(key);
        self.query::<i64>(redis::cmd("DEL").arg(&key), format!("DEL {key}")).await.map(drop)
    }

    /// Releases the lock only if it is still held with `value`.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn safer_unlock(&self, key: &str, value: &str) -> Result<bool, RedisError> {
        let key = self.key(key);
        let deleted: i64 = self
            .query(
                redis::cmd("EVAL").arg(COMPARE_AND_DELETE).arg(1).arg(&key).arg(value),
                format!("EVAL compare-and-delete {key}"),
            )
            .await?;
        Ok(deleted == 1)
    }
}
