use bb8_redis::redis;

use crate::client::RedisClient;
use crate::error::RedisError;

impl RedisClient {
    /// The next value of the counter at `key`, starting at 1.
    ///
    /// # Errors
    /// [`RedisError::Redis`] or [`RedisError::Timeout`].
    pub async fn next_id(&self, key: &str) -> Result<i64, RedisError> {
        self.incr(key).await
    }

    /// Reserves `n` consecutive ids and returns the inclusive range.
    ///
    /// # Errors
    /// [`RedisError::Validation`] when `n` is zero, before touching Redis.
    pub async fn next_batch(&self, key: &str, n: u32) -> Result<(i64, i64), RedisError> {
        if n == 0 {
            return Err(RedisError::Validation {
                message: "batch size must be greater than zero".into(),
                context: Some(format!("next_batch {key}").into()),
            });
        }
        let key = self.key(key);
        let end: i64 =
            self.query(redis::cmd("INCRBY").arg(&key).arg(n), format!("INCRBY {key}")).await?;
        Ok((end - i64::from(n) + 1, end))
    }

    /// `prefix` followed by the next id zero-padded to `pad` digits (at
    /// least one).
    ///
    /// # Errors
    /// As [`RedisClient::next_id`].
    pub async fn next_prefixed(&self, key: &str, prefix: &str, pad: usize) -> Result<String, RedisError> {
        let id = self.next_id(key).await?;
        Ok(format_prefixed(prefix, id, pad))
    }
}

pub(crate) fn format_prefixed(prefix: &str, id: i64, pad: usize) -> String {
    format!("{prefix}{id:0width$}", width = pad.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_zero_padded() {
        assert_eq!(format_prefixed("ORD-", 42, 6), "ORD-000042");
        assert_eq!(format_prefixed("", 7, 0), "7");
        assert_eq!(format_prefixed("U", 123_456, 3), "U123456");
    }
}
