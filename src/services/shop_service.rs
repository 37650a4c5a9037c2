//! 매장 조회 서비스
//!
//! CacheClient를 통해 매장 엔티티의 캐시 경유 조회를 제공합니다.
//! 일반 매장은 관통 방어 경로를, 이벤트 등으로 달궈진 핫 매장은
//! 워밍 + 논리 만료 경로를 사용합니다.

use std::sync::Arc;

use crate::caching::cache_client::CacheClient;
use crate::caching::redis::RedisClient;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::Shop;
use crate::repositories::ShopStore;
use crate::utils::redis_constants::{CACHE_SHOP_KEY, CACHE_SHOP_TTL};

/// 매장 조회 / 캐시 관리 서비스
pub struct ShopService {
    cache_client: Arc<CacheClient>,
    redis: Arc<RedisClient>,
    shop_store: Arc<dyn ShopStore>,
}

impl ShopService {
    pub fn new(
        cache_client: Arc<CacheClient>,
        redis: Arc<RedisClient>,
        shop_store: Arc<dyn ShopStore>,
    ) -> Self {
        Self {
            cache_client,
            redis,
            shop_store,
        }
    }

    /// ID로 매장을 조회합니다 (관통 방어 경로).
    ///
    /// 캐시 미스 시 저장소로 폴백하고, 저장소에도 없으면 톰스톤을 심어
    /// 존재하지 않는 ID에 대한 반복 폴백을 차단합니다.
    pub async fn query_by_id(&self, id: i64) -> AppResult<Option<Shop>> {
        let store = self.shop_store.clone();
        self.cache_client
            .query_with_pass_through(
                CACHE_SHOP_KEY,
                id,
                move |id| async move { store.find_by_id(id).await },
                CACHE_SHOP_TTL,
            )
            .await
    }

    /// ID로 핫 매장을 조회합니다 (논리 만료 경로).
    ///
    /// [`save_shop_to_redis`](Self::save_shop_to_redis)로 미리 워밍된 키를
    /// 전제합니다. 만료된 엔트리는 백그라운드에서 재구축되며 호출자는
    /// 스테일 값을 즉시 받습니다.
    pub async fn query_by_id_logical(&self, id: i64) -> AppResult<Option<Shop>> {
        let store = self.shop_store.clone();
        self.cache_client
            .query_with_logical_expire(
                CACHE_SHOP_KEY,
                id,
                move |id| async move { store.find_by_id(id).await },
                CACHE_SHOP_TTL,
            )
            .await
    }

    /// 매장 캐시를 워밍합니다 - 논리 만료 엔벨로프로 적재.
    pub async fn save_shop_to_redis(&self, id: i64, ttl_secs: u64) -> AppResult<()> {
        let shop = self.shop_store.find_by_id(id).await?.ok_or_else(|| {
            AppError::ValidationError(format!("존재하지 않는 매장입니다: {}", id))
        })?;

        let key = format!("{}{}", CACHE_SHOP_KEY, id);
        self.cache_client
            .set_with_logical_expire(&key, &shop, ttl_secs)
            .await
    }

    /// 매장 정보를 갱신합니다.
    ///
    /// 선 저장소 갱신, 후 캐시 삭제 순서입니다. 캐시를 먼저 지우면
    /// 갱신 완료 전의 조회가 이전 값을 다시 적재할 수 있습니다.
    pub async fn update_shop(&self, shop: &Shop) -> AppResult<()> {
        let updated = self.shop_store.update(shop).await?;
        if !updated {
            return Err(AppError::ValidationError(format!(
                "존재하지 않는 매장입니다: {}",
                shop.id
            )));
        }

        self.redis
            .del(&format!("{}{}", CACHE_SHOP_KEY, shop.id))
            .await
    }
}
