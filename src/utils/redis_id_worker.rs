//! 전역 ID 생성기
//!
//! 우리의 ID 생성 전략은 타임스탬프 + Redis 키 자동 증가 시퀀스입니다.
//!
//! ```text
//! 63      62                31                0
//! ┌───────┬─────────────────┬─────────────────┐
//! │ 부호  │ 초 단위 타임스탬프 │ 일 단위 카운터   │
//! └───────┴─────────────────┴─────────────────┘
//! ```
//!
//! 카운터 키는 `icr:<prefix>:<yyyy:MM:dd>:` 형태로 날짜마다 새로 만들어지므로
//! 자정에 자동으로 1부터 다시 시작하고, 같은 스토어를 공유하는 모든 호스트
//! 사이에서 INCR의 원자성만으로 유일성이 보장됩니다.

use std::sync::Arc;

use chrono::Utc;

use crate::caching::redis::RedisClient;
use crate::core::errors::AppResult;
use crate::utils::redis_constants::ICR_KEY_PREFIX;

/// 기준 시각: 2022-01-01T00:00:00Z
const BEGIN_TIMESTAMP: i64 = 1_640_995_200;

/// 카운터(하위) 비트 수
const COUNT_BITS: u32 = 32;

/// 타임스탬프와 카운터를 64비트 ID로 합성합니다.
pub(crate) fn compose_id(timestamp: i64, count: i64) -> i64 {
    (timestamp << COUNT_BITS) | count
}

/// Redis 기반 전역 ID 생성기
pub struct RedisIdWorker {
    redis: Arc<RedisClient>,
}

impl RedisIdWorker {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    /// 접두사별로 단조 증가하는 64비트 ID를 발급합니다.
    ///
    /// 같은 날 안에서는 삽입 순서대로 엄격히 증가하며, 날짜가 바뀌면
    /// 카운터가 1부터 다시 시작합니다(키 자체가 바뀌므로 별도 리셋 불필요).
    /// 호스트 간 시계 차이로 타임스탬프 구간이 국소적으로 역전될 수는 있으나
    /// `(타임스탬프, 카운터)` 쌍은 충돌하지 않습니다.
    pub async fn next_id(&self, key_prefix: &str) -> AppResult<i64> {
        //  1. 타임스탬프 생성
        let now = Utc::now();
        let timestamp = now.timestamp() - BEGIN_TIMESTAMP;

        //  2. 일 단위 시퀀스 - 키가 처음 만들어지는 날의 첫 값은 1
        let date_label = now.format("%Y:%m:%d").to_string();
        let counter_key = format!("{}{}:{}:", ICR_KEY_PREFIX, key_prefix, date_label);
        let count = self.redis.incr(&counter_key).await?;

        //  3. 합성 후 반환
        Ok(compose_id(timestamp, count))
    }
}
