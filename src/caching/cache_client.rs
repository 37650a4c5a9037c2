//! # 범용 캐시 헬퍼 (CacheClient)
//!
//! 캐시 관통(cache penetration)과 캐시 붕괴(cache breakdown)를 방어하는
//! 읽기 경유(cache-aside) 헬퍼입니다. 엔티티 타입에 대해 제네릭하며,
//! 호출마다 키 접두사와 폴백 로더를 받는 상태 없는 구성 요소입니다.
//!
//! ## 두 가지 조회 전략
//!
//! ### 1. 관통 방어 (`query_with_pass_through`)
//!
//! 캐시 미스 시 저장소로 폴백하고, 저장소에도 없으면 짧은 TTL의
//! 톰스톤(빈 문자열)을 캐싱합니다. 존재하지 않는 키에 대한 반복 조회가
//! 매번 저장소를 때리는 것을 막습니다.
//!
//! ### 2. 논리 만료 (`query_with_logical_expire`)
//!
//! 핫 키 전용 경로입니다. 엔트리는 물리 TTL 없이 저장되고, 페이로드에
//! 내장된 논리 만료 시각만 검사합니다. 만료된 경우에도 호출자는 즉시
//! 이전 값을 돌려받고(stale-while-revalidate), 재구축은 재구축 락을 획득한
//! 단 하나의 워커만 백그라운드에서 수행합니다. 수많은 동시 호출자가 같은
//! 만료 키를 동시에 재계산하는 붕괴 현상이 제거되는 대신, 유계(bounded)
//! 스테일 읽기를 허용합니다.
//!
//! 이 경로는 사전 워밍(warm-up)을 전제하며, 캐시에 키가 없으면 저장소를
//! 동기 조회하지 않고 즉시 "없음"을 반환합니다.
//!
//! ## 재구축 풀
//!
//! 재구축 태스크는 세마포어로 상한이 걸린 풀에서 실행됩니다. 풀이 포화되면
//! 태스크는 큐잉되지 않고 버려지며, 스테일 엔트리는 다음 조회 사이클에서
//! 재구축이 성공할 때까지 계속 제공됩니다 (무한 큐 대신 배압 유지).

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::caching::redis::RedisClient;
use crate::config::CacheConfig;
use crate::core::errors::AppResult;
use crate::utils::redis_constants::{CACHE_NULL_TTL, LOCK_SHOP_RESOURCE, LOCK_SHOP_TTL};
use crate::utils::redis_lock::RedisLock;

/// 논리 만료 엔벨로프
///
/// 스토어의 물리 TTL과 무관하게 페이로드 안에 자체 만료 시각을 내장합니다.
/// 물리 TTL은 설정하지 않으므로 엔트리는 논리 만료 이후에도 남아 있어,
/// 재구축이 끝나기 전까지 스테일 읽기가 가능합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisData<T> {
    /// 논리 만료 시각
    pub expire_time: DateTime<Utc>,
    /// 실제 페이로드
    pub data: T,
}

/// 범용 읽기 경유 캐시 헬퍼
#[derive(Clone)]
pub struct CacheClient {
    redis: Arc<RedisClient>,
    /// 재구축 태스크 상한 풀
    rebuild_pool: Arc<Semaphore>,
}

impl CacheClient {
    /// 환경 설정(`CACHE_REBUILD_POOL_SIZE`)의 풀 크기로 생성합니다.
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self::with_pool_size(redis, CacheConfig::rebuild_pool_size())
    }

    /// 명시적 풀 크기로 생성합니다.
    pub fn with_pool_size(redis: Arc<RedisClient>, pool_size: usize) -> Self {
        Self {
            redis,
            rebuild_pool: Arc::new(Semaphore::new(pool_size)),
        }
    }

    /// 값을 고정 TTL과 함께 저장합니다.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> AppResult<()> {
        self.redis.set_json_ex(key, value, ttl_secs).await
    }

    /// 값을 논리 만료 엔벨로프로 감싸 물리 TTL **없이** 저장합니다.
    pub async fn set_with_logical_expire<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> AppResult<()> {
        let envelope = RedisData {
            expire_time: Utc::now() + Duration::seconds(ttl_secs as i64),
            data: value,
        };
        let json = serde_json::to_string(&envelope)?;
        self.redis.set_raw(key, &json).await
    }

    /// 캐시 관통 방어 조회
    ///
    /// 1. 캐시 히트(비톰스톤)면 역직렬화하여 반환
    /// 2. 톰스톤 히트면 저장소를 건드리지 않고 즉시 `Ok(None)`
    /// 3. 미스면 로더 호출. 결과가 없으면 짧은 TTL의 톰스톤을 캐싱
    /// 4. 결과가 있으면 `ttl_secs`로 캐싱 후 반환
    ///
    /// 동기 경로의 로더 에러는 호출자에게 그대로 전파됩니다.
    pub async fn query_with_pass_through<T, ID, F, Fut>(
        &self,
        key_prefix: &str,
        id: ID,
        db_fallback: F,
        ttl_secs: u64,
    ) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        ID: Display,
        F: FnOnce(ID) -> Fut,
        Fut: Future<Output = AppResult<Option<T>>>,
    {
        let key = format!("{}{}", key_prefix, id);

        //  1. 캐시 조회
        if let Some(json) = self.redis.get_raw(&key).await? {
            if !json.is_empty() {
                return Ok(Some(serde_json::from_str(&json)?));
            }
            //  2. 톰스톤 히트 - 저장소 폴백 없이 즉시 반환
            return Ok(None);
        }

        //  3. 미스 - 저장소에서 조회
        match db_fallback(id).await? {
            None => {
                //  관통 방어: 빈 값을 짧은 TTL로 캐싱
                self.redis.set_ex_raw(&key, "", CACHE_NULL_TTL).await?;
                Ok(None)
            }
            Some(value) => {
                //  4. 조회 성공 - 캐시에 적재 후 반환
                self.set(&key, &value, ttl_secs).await?;
                Ok(Some(value))
            }
        }
    }

    /// 논리 만료 기반 조회 (stale-while-revalidate)
    ///
    /// 1. 캐시에 키가 없으면 `Ok(None)` - 이 경로는 사전 워밍을 전제하며
    ///    저장소를 동기 조회하지 않음
    /// 2. 논리 만료 전이면 값을 즉시 반환
    /// 3. 만료면 백그라운드 재구축 제출을 시도 - 풀 포화 / 락 경합 / 락 획득
    ///    중의 전송 오류는 모두 "이번 사이클은 제출 생략"으로 처리
    /// 4. (3)의 결과와 무관하게 스테일 값을 즉시 반환 - 호출자는 재구축을
    ///    절대 기다리지 않음
    ///
    /// 재구축 중의 로더 에러는 잡아서 로깅하며, 어떤 종료 경로에서도
    /// 재구축 락은 해제됩니다.
    pub async fn query_with_logical_expire<T, ID, F, Fut>(
        &self,
        key_prefix: &str,
        id: ID,
        db_fallback: F,
        ttl_secs: u64,
    ) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        ID: Display + Send + 'static,
        F: FnOnce(ID) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<Option<T>>> + Send + 'static,
    {
        let key = format!("{}{}", key_prefix, id);

        //  1. 캐시 조회 - 워밍되지 않은 키는 즉시 없음 처리
        let json = match self.redis.get_raw(&key).await? {
            Some(json) if !json.is_empty() => json,
            _ => return Ok(None),
        };

        //  2. 엔벨로프 역직렬화 후 논리 만료 판정
        let envelope: RedisData<T> = serde_json::from_str(&json)?;
        if envelope.expire_time > Utc::now() {
            return Ok(Some(envelope.data));
        }

        //  3. 만료 - 재구축 제출 시도 (결과와 무관하게 스테일 제공)
        self.submit_rebuild(key, id, db_fallback, ttl_secs).await;

        //  4. 스테일 값 즉시 반환
        Ok(Some(envelope.data))
    }

    /// 백그라운드 재구축 제출
    ///
    /// 풀 포화, 락 경합, 락 획득 중의 전송 오류는 전부 "이번 사이클은
    /// 재구축하지 않음"으로 수렴합니다. 스테일 값은 이미 호출자 손에 있으므로
    /// 어떤 실패도 에러로 전파하지 않습니다.
    async fn submit_rebuild<T, ID, F, Fut>(&self, key: String, id: ID, db_fallback: F, ttl_secs: u64)
    where
        T: Serialize + Send + Sync + 'static,
        ID: Display + Send + 'static,
        F: FnOnce(ID) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<Option<T>>> + Send + 'static,
    {
        //  풀 여유가 있을 때만 락 획득을 시도 - 포화 상태에서 락을 잡으면
        //  TTL까지 아무도 재구축하지 못하는 구간이 생김
        let permit = match self.rebuild_pool.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                log::warn!("재구축 풀 포화, 태스크 버림 (key={})", key);
                return;
            }
        };

        let lock = RedisLock::new(self.redis.clone(), format!("{}{}", LOCK_SHOP_RESOURCE, id));
        match lock.try_lock(LOCK_SHOP_TTL).await {
            Ok(true) => {
                let cache = self.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let result: AppResult<()> = async {
                        match db_fallback(id).await? {
                            Some(fresh) => {
                                cache.set_with_logical_expire(&key, &fresh, ttl_secs).await
                            }
                            //  재구축 중 엔티티가 사라졌으면 키를 제거해
                            //  이후 조회가 "없음"으로 수렴하도록 함
                            None => cache.redis.del(&key).await,
                        }
                    }
                    .await;

                    if let Err(e) = result {
                        log::error!("캐시 재구축 실패 (key={}): {}", key, e);
                    }
                    //  성공 / 실패와 무관하게 재구축 락은 반드시 해제
                    if let Err(e) = lock.unlock().await {
                        log::error!("재구축 락 해제 실패 (key={}): {}", key, e);
                    }
                });
            }
            //  다른 워커가 이미 재구축 중
            Ok(false) => {}
            Err(e) => {
                log::warn!("재구축 락 획득 실패, 스테일 값으로 계속 (key={}): {}", key, e);
            }
        }
    }
}
