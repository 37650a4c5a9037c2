//! Redis 기반 분산 락
//!
//! `SET key token NX EX ttl`로 획득하고, Lua 비교-삭제 스크립트로 해제하는
//! 단순한 상호 배제 프리미티브입니다.
//!
//! ## 오인 삭제 방지
//!
//! 락 값에는 획득 주체를 식별하는 토큰이 저장됩니다. 해제 시 현재 값과
//! 토큰을 비교한 뒤 일치할 때만 삭제하므로, TTL 만료 후 다른 주체가 먼저
//! 획득한 락을 지연된 해제가 지워 버리는 경합이 닫힙니다. 비교와 삭제는
//! 단일 스크립트 안에서 원자적으로 수행되어야 합니다.
//!
//! ## Non-goals
//!
//! 재진입, 공정성(대기열), 보호 대상 리소스에 대한 펜싱 토큰은 제공하지
//! 않습니다. 임계 구역의 수행 시간은 TTL보다 충분히 짧게 유지해야 합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use redis::Script;
use uuid::Uuid;

use crate::caching::redis::RedisClient;
use crate::core::errors::AppResult;
use crate::utils::redis_constants::LOCK_KEY_PREFIX;

/// 프로세스 단위 토큰 접두사
///
/// 프로세스 재시작마다 새로 생성되므로, 서로 다른 프로세스가 같은
/// 핸들 시퀀스를 쓰더라도 토큰이 충돌하지 않습니다.
static TOKEN_PREFIX: Lazy<String> = Lazy::new(|| Uuid::new_v4().simple().to_string());

/// 프로세스 내 핸들 일련번호 (스레드 / 태스크 식별 대용)
static HANDLE_SEQ: AtomicU64 = AtomicU64::new(0);

/// 비교-삭제 해제 스크립트: 저장된 토큰이 내 토큰일 때만 삭제
const UNLOCK_SCRIPT_SRC: &str = r#"
if (redis.call('get', KEYS[1]) == ARGV[1]) then
    return redis.call('del', KEYS[1])
end
return 0
"#;

static UNLOCK_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(UNLOCK_SCRIPT_SRC));

/// 분산 락 핸들
///
/// 임계 구역마다 새로 생성하고 사용 후 버립니다.
///
/// # Examples
///
/// ```rust,ignore
/// let lock = RedisLock::new(redis.clone(), format!("order:{}", user_id));
/// if !lock.try_lock(10).await? {
///     return Err(AppError::ConflictError("락 경합".to_string()));
/// }
/// let result = do_critical_section().await;
/// lock.unlock().await?;
/// ```
pub struct RedisLock {
    name: String,
    token: String,
    redis: Arc<RedisClient>,
}

impl RedisLock {
    /// 리소스 이름으로 새 락 핸들을 생성합니다.
    ///
    /// 실제 Redis 키는 `lock:<name>`이 됩니다. 토큰은 프로세스 접두사와
    /// 핸들 일련번호의 조합으로, 핸들마다 유일합니다.
    pub fn new(redis: Arc<RedisClient>, name: impl Into<String>) -> Self {
        let token = format!(
            "{}-{}",
            TOKEN_PREFIX.as_str(),
            HANDLE_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        Self {
            name: name.into(),
            token,
            redis,
        }
    }

    /// 락의 실제 Redis 키를 반환합니다.
    pub fn key(&self) -> String {
        format!("{}{}", LOCK_KEY_PREFIX, self.name)
    }

    /// 이 핸들의 소유 토큰을 반환합니다.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// 락 획득을 시도합니다. 블로킹 / 재시도는 하지 않습니다.
    ///
    /// 폴링할지 즉시 실패할지는 호출자가 결정합니다. 폴링한다면 짧은 고정
    /// 지연과 재시도 상한을 두어야 합니다.
    pub async fn try_lock(&self, ttl_secs: u64) -> AppResult<bool> {
        self.redis.set_nx_ex(&self.key(), &self.token, ttl_secs).await
    }

    /// 락을 해제합니다.
    ///
    /// 저장된 값이 이 핸들의 토큰과 일치할 때만 키를 삭제합니다.
    /// 불일치(이미 만료되어 다른 주체가 획득)라면 아무것도 하지 않습니다.
    pub async fn unlock(&self) -> AppResult<()> {
        self.redis
            .eval_script(&UNLOCK_SCRIPT, &[&self.key()], &[&self.token])
            .await?;
        Ok(())
    }
}
