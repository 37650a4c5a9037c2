//! # 플래시 세일 주문 파이프라인
//!
//! 구매 시도별 상태 흐름:
//!
//! ```text
//! SUBMITTED ──(진입 스크립트)──▶ ADMITTED ─▶ ENQUEUED ─▶ PERSISTED
//!      │                                         │
//!      └─▶ REJECTED (재고 소진 / 중복)            └─▶ FAILED ─▶ PENDING_RECOVERY ─▶ PERSISTED | DEAD
//! ```
//!
//! ## 진입 판정 (동기, 원자)
//!
//! 재고 체크 + 중복 구매 체크 + 재고 차감 + 구매자 기록 + 작업 엔트리
//! 추가(XADD)가 단일 Lua 스크립트 안에서 수행됩니다. Redis의 단일 스레드
//! 스크립트 실행이 판정을 선형화하므로, 같은 쿠폰에 대한 두 진입이 동시에
//! `stock=1`을 관찰하고 둘 다 성공하는 일은 없습니다. 호출자에게 보이는
//! 동기화 지점은 이 왕복 한 번뿐이며, 판정 자체에는 락이 필요 없습니다.
//!
//! XADD가 스크립트 안에 있으므로 승인된 구매가 작업 엔트리를 잃는 일도
//! 없습니다 (승인과 큐 적재 사이에 프로세스가 죽어도 무결).
//!
//! ## 비동기 영속화
//!
//! 컨슈머 그룹 `g1`의 백그라운드 컨슈머가 엔트리를 읽어 사용자 단위 락을
//! 잡고(재전송 대비 방어) 주문을 영속화한 뒤에만 ACK합니다. 영속화 순서는
//! 사용자 간 비즈니스 의미가 없습니다 - 자격의 유일한 진실 공급원은 진입
//! 판정이지 영속화 순서가 아닙니다.
//!
//! ## pending 복구
//!
//! 컨슈머 예외(프로세스 재시작 포함) 시 자기 pending 엔트리를 오프셋 `0`부터
//! 다시 읽어 하나씩 재시도합니다. 재시도 예산을 소진한 엔트리는 사라지는
//! 대신 데드 레터 스트림으로 옮겨집니다 - 재고는 이미 차감된 상태이므로
//! 주문 유실은 UX 문제가 아니라 정합성 버그입니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use redis::Script;
use tokio::sync::watch;

use crate::caching::redis::{RedisClient, StreamEntry};
use crate::config::StreamConfig;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::domain::entities::{SeckillVoucher, VoucherOrder};
use crate::repositories::{SeckillVoucherStore, VoucherOrderStore};
use crate::utils::redis_constants::{
    LOCK_ORDER_RESOURCE, LOCK_ORDER_TTL, ORDER_CONSUMER_GROUP, ORDER_DEAD_STREAM_KEY,
    ORDER_STREAM_KEY, SECKILL_ORDER_KEY, SECKILL_STOCK_KEY,
};
use crate::utils::redis_id_worker::RedisIdWorker;
use crate::utils::redis_lock::RedisLock;

/// 진입 판정 스크립트 소스
///
/// 반환 코드: 0 = 승인, 1 = 재고 소진, 2 = 중복 구매.
/// 재고 / 구매자 집합 / 스트림 키는 `redis_constants`에서 끼워 넣으므로
/// 네이밍 계약과 갈라질 수 없습니다.
fn seckill_script_source() -> String {
    format!(
        r#"
local voucherId = ARGV[1]
local userId = ARGV[2]
local orderId = ARGV[3]

local stockKey = '{stock}' .. voucherId
local orderKey = '{order}' .. voucherId

if (tonumber(redis.call('get', stockKey)) <= 0) then
    return 1
end

if (redis.call('sismember', orderKey, userId) == 1) then
    return 2
end

redis.call('incrby', stockKey, -1)
redis.call('sadd', orderKey, userId)
redis.call('xadd', '{stream}', '*', 'userId', userId, 'voucherId', voucherId, 'id', orderId)
return 0
"#,
        stock = SECKILL_STOCK_KEY,
        order = SECKILL_ORDER_KEY,
        stream = ORDER_STREAM_KEY,
    )
}

static SECKILL_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(&seckill_script_source()));

/// 플래시 세일 주문 서비스
pub struct VoucherOrderService {
    redis: Arc<RedisClient>,
    id_worker: Arc<RedisIdWorker>,
    voucher_store: Arc<dyn SeckillVoucherStore>,
    order_store: Arc<dyn VoucherOrderStore>,
    stream_config: StreamConfig,
}

impl VoucherOrderService {
    pub fn new(
        redis: Arc<RedisClient>,
        id_worker: Arc<RedisIdWorker>,
        voucher_store: Arc<dyn SeckillVoucherStore>,
        order_store: Arc<dyn VoucherOrderStore>,
    ) -> Self {
        Self::with_config(
            redis,
            id_worker,
            voucher_store,
            order_store,
            StreamConfig::default(),
        )
    }

    pub fn with_config(
        redis: Arc<RedisClient>,
        id_worker: Arc<RedisIdWorker>,
        voucher_store: Arc<dyn SeckillVoucherStore>,
        order_store: Arc<dyn VoucherOrderStore>,
        stream_config: StreamConfig,
    ) -> Self {
        Self {
            redis,
            id_worker,
            voucher_store,
            order_store,
            stream_config,
        }
    }

    /// 쿠폰을 저장하고 Redis 재고 카운터를 워밍합니다.
    ///
    /// 진입 스크립트는 `seckill:stock:<voucherId>` 키의 존재를 전제하므로,
    /// 판매 시작 전에 반드시 호출되어야 합니다.
    pub async fn prime_voucher(&self, voucher: &SeckillVoucher) -> AppResult<()> {
        self.voucher_store.save(voucher).await?;
        self.redis
            .set_raw(
                &format!("{}{}", SECKILL_STOCK_KEY, voucher.voucher_id),
                &voucher.stock.to_string(),
            )
            .await
    }

    /// 플래시 세일 구매 진입
    ///
    /// 사용자 식별은 전역 상태가 아니라 인자로 명시적으로 전달받습니다.
    /// 승인되면 주문 ID를 즉시 반환하며, 실제 주문 행의 영속화는 비동기로
    /// 진행됩니다 (고객 체감 지연에서 영속화 제외).
    ///
    /// # Errors
    ///
    /// * `StockExhausted` - 재고 소진 (판정 코드 1)
    /// * `ConflictError` - 같은 사용자의 중복 구매 (판정 코드 2)
    pub async fn seckill_voucher(&self, voucher_id: i64, user_id: i64) -> AppResult<i64> {
        //  1. 주문 ID 선발급 - 스크립트가 작업 엔트리에 함께 기록
        let order_id = self.id_worker.next_id("order").await?;

        //  2. 진입 판정 스크립트 실행 (단일 왕복, 원자)
        let code = self
            .redis
            .eval_script(
                &SECKILL_SCRIPT,
                &[],
                &[
                    &voucher_id.to_string(),
                    &user_id.to_string(),
                    &order_id.to_string(),
                ],
            )
            .await?;

        match code {
            0 => Ok(order_id),
            1 => Err(AppError::StockExhausted("재고가 부족합니다".to_string())),
            2 => Err(AppError::ConflictError(
                "이미 구매한 사용자입니다".to_string(),
            )),
            other => Err(AppError::InternalError(format!(
                "알 수 없는 진입 판정 코드: {}",
                other
            ))),
        }
    }

    /// 주문 스트림 컨슈머 루프
    ///
    /// 종료 신호가 올 때까지 새 엔트리를 소비합니다. 읽기는 최대
    /// `block_millis`만 블로킹하므로 그 주기로 종료 신호를 점검합니다.
    /// 처리 중 예외가 발생하면 pending 복구를 먼저 수행한 뒤 정상 소비를
    /// 재개합니다.
    pub async fn run_order_consumer(&self, shutdown: watch::Receiver<bool>) -> AppResult<()> {
        self.redis
            .ensure_group(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP)
            .await?;

        //  재시작 직후: 이전 프로세스가 남긴 pending부터 정리
        self.handle_pending_list().await;

        log::info!(
            "📦 주문 컨슈머 시작 (group={}, consumer={})",
            ORDER_CONSUMER_GROUP,
            self.stream_config.consumer_name
        );

        while !*shutdown.borrow() {
            //  1. 새 엔트리 읽기 (최대 block_millis 대기)
            let entries = match self
                .redis
                .xread_group(
                    ORDER_STREAM_KEY,
                    ORDER_CONSUMER_GROUP,
                    &self.stream_config.consumer_name,
                    1,
                    Some(self.stream_config.block_millis),
                    ">",
                )
                .await
            {
                Ok(entries) => entries,
                Err(e) => {
                    log::error!("주문 스트림 읽기 실패: {}", e);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    continue;
                }
            };

            //  2. 타임아웃 - 다음 루프에서 종료 신호 재점검
            let Some(entry) = entries.into_iter().next() else {
                continue;
            };

            //  3. 주문 생성 후 4. ACK - 영속화 성공 전에는 절대 ACK하지 않음
            match self.process_entry(&entry).await {
                Ok(()) => {
                    if let Err(e) = self
                        .redis
                        .xack(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP, &entry.id)
                        .await
                    {
                        log::error!("XACK 실패 (entry={}): {}", entry.id, e);
                    }
                }
                Err(e) => {
                    log::error!("주문 처리 예외 (entry={}): {}", entry.id, e);
                    self.handle_pending_list().await;
                }
            }
        }

        log::info!("주문 컨슈머 종료");
        Ok(())
    }

    /// pending(미확인) 엔트리 복구
    ///
    /// 자기 pending 목록을 오프셋 0부터 하나씩 재처리합니다. 엔트리별
    /// 재시도 예산을 소진하면 데드 레터 스트림으로 옮기고 ACK하여
    /// 운영자 눈에 띄는 상태로 남깁니다.
    async fn handle_pending_list(&self) {
        let mut attempts: HashMap<String, u32> = HashMap::new();

        loop {
            let entries = match self
                .redis
                .xread_group(
                    ORDER_STREAM_KEY,
                    ORDER_CONSUMER_GROUP,
                    &self.stream_config.consumer_name,
                    1,
                    None,
                    "0",
                )
                .await
            {
                Ok(entries) => entries,
                Err(e) => {
                    log::error!("pending 목록 읽기 실패: {}", e);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    continue;
                }
            };

            //  pending이 비었으면 정상 소비 재개
            let Some(entry) = entries.into_iter().next() else {
                break;
            };

            match self.process_entry(&entry).await {
                Ok(()) => {
                    if let Err(e) = self
                        .redis
                        .xack(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP, &entry.id)
                        .await
                    {
                        log::error!("pending XACK 실패 (entry={}): {}", entry.id, e);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }
                }
                Err(e) => {
                    let tries = attempts.entry(entry.id.clone()).or_insert(0);
                    *tries += 1;

                    if *tries >= self.stream_config.max_retries {
                        log::error!(
                            "💀 재시도 예산 소진, 데드 레터로 이동 (entry={}): {}",
                            entry.id,
                            e
                        );
                        self.dead_letter(&entry, &e).await;
                    } else {
                        log::error!(
                            "pending 주문 처리 예외 (entry={}, 시도={}): {}",
                            entry.id,
                            tries,
                            e
                        );
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }
                }
            }
        }
    }

    /// 엔트리를 데드 레터 스트림으로 복사하고 원본을 ACK합니다.
    async fn dead_letter(&self, entry: &StreamEntry, cause: &AppError) {
        let mut fields: Vec<(&str, String)> = entry
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        let cause_text = cause.to_string();
        fields.push(("error", cause_text));
        fields.push(("sourceEntry", entry.id.clone()));

        if let Err(e) = self.redis.xadd(ORDER_DEAD_STREAM_KEY, &fields).await {
            //  데드 레터 기록 실패 시에는 ACK하지 않고 pending에 남겨 둠
            log::error!("데드 레터 기록 실패 (entry={}): {}", entry.id, e);
            return;
        }
        if let Err(e) = self
            .redis
            .xack(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP, &entry.id)
            .await
        {
            log::error!("데드 레터 이동 후 XACK 실패 (entry={}): {}", entry.id, e);
        }
    }

    async fn process_entry(&self, entry: &StreamEntry) -> AppResult<()> {
        let order = Self::parse_order(&entry.fields)?;
        self.handle_voucher_order(&order).await
    }

    /// 스트림 엔트리 필드를 주문으로 복원합니다.
    fn parse_order(fields: &HashMap<String, String>) -> AppResult<VoucherOrder> {
        fn field(fields: &HashMap<String, String>, name: &str) -> AppResult<i64> {
            fields
                .get(name)
                .ok_or_else(|| {
                    AppError::ValidationError(format!("스트림 엔트리에 {} 필드가 없습니다", name))
                })?
                .parse::<i64>()
                .with_context(|| format!("스트림 필드 {} 파싱 실패", name))
        }

        let id = field(fields, "id")?;
        let user_id = field(fields, "userId")?;
        let voucher_id = field(fields, "voucherId")?;
        Ok(VoucherOrder::new(id, user_id, voucher_id))
    }

    /// 사용자 단위 락 안에서 주문을 영속화합니다.
    ///
    /// 진입 단계에서 이미 중복을 걸렀지만, 프로세스 재시작 / 재전달이
    /// 같은 엔트리를 다시 가져올 수 있으므로 방어적으로 락을 잡습니다.
    /// 락 경합은 에러로 반환되어 엔트리가 pending에 남고, 복구 경로에서
    /// 재시도됩니다.
    async fn handle_voucher_order(&self, order: &VoucherOrder) -> AppResult<()> {
        let lock = RedisLock::new(
            self.redis.clone(),
            format!("{}{}", LOCK_ORDER_RESOURCE, order.user_id),
        );

        if !lock.try_lock(LOCK_ORDER_TTL).await? {
            return Err(AppError::ConflictError(format!(
                "사용자 {} 주문 락 경합",
                order.user_id
            )));
        }

        let result = self.create_voucher_order(order).await;

        //  영속화 성공 / 실패와 무관하게 락은 해제
        if let Err(e) = lock.unlock().await {
            log::error!("주문 락 해제 실패 (user={}): {}", order.user_id, e);
        }
        result
    }

    /// 주문 영속화 - 멱등
    ///
    /// 1. 영속화 시점 중복 가드: 이미 같은 `(user, voucher)` 주문이 있으면
    ///    로깅 후 정상 종료 (재전달된 엔트리의 재처리는 no-op)
    /// 2. 행 수준 조건부 재고 차감 (`stock > 0`) - 진입 판정이 이미 Redis
    ///    재고를 차감했고, 이것은 영속 재고의 이중 안전장치
    /// 3. 주문 행 저장 - 유니크 제약 경합으로 거부되면 (2)의 차감을 복원
    ///
    /// 2 / 3의 실패는 에러로 전파되어 스트림 엔트리가 ACK되지 않고
    /// pending 복구에서 재시도됩니다.
    pub async fn create_voucher_order(&self, order: &VoucherOrder) -> AppResult<()> {
        //  1. 중복 가드 - Redis 판정 이후 저장소 기준으로 한 번 더
        if self
            .order_store
            .exists(order.user_id, order.voucher_id)
            .await?
        {
            log::warn!(
                "이미 존재하는 주문, 재처리 생략 (user={}, voucher={})",
                order.user_id,
                order.voucher_id
            );
            return Ok(());
        }

        //  2. 조건부 재고 차감
        let decremented = self.voucher_store.decrement_stock(order.voucher_id).await?;
        if !decremented {
            return Err(AppError::DatabaseError(format!(
                "영속 재고 차감 실패 (voucher={})",
                order.voucher_id
            )));
        }

        //  3. 주문 저장
        let saved = self.order_store.save(order).await?;
        if !saved {
            //  유니크 제약에 걸렸다면 경쟁 컨슈머가 먼저 저장한 것 - 기존
            //  주문을 유지하되, 그쪽 차감만 유효하므로 이쪽 차감분은 복원
            log::warn!(
                "주문 저장이 유니크 제약과 충돌, 재고 복원 후 기존 주문 유지 (user={}, voucher={})",
                order.user_id,
                order.voucher_id
            );
            self.voucher_store.increment_stock(order.voucher_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{InMemorySeckillVoucherStore, InMemoryVoucherOrderStore};
    use chrono::{Duration as ChronoDuration, Utc};

    fn voucher(voucher_id: i64, stock: i64) -> SeckillVoucher {
        SeckillVoucher {
            voucher_id,
            stock,
            begin_time: Utc::now() - ChronoDuration::hours(1),
            end_time: Utc::now() + ChronoDuration::hours(1),
        }
    }

    fn offline_service(
        voucher_store: Arc<InMemorySeckillVoucherStore>,
        order_store: Arc<InMemoryVoucherOrderStore>,
    ) -> VoucherOrderService {
        // 연결 없이 구성만 - create_voucher_order는 Redis를 건드리지 않음
        let redis = Arc::new(RedisClient::with_url("redis://localhost:6379").unwrap());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        VoucherOrderService::new(redis, id_worker, voucher_store, order_store)
    }

    #[test]
    fn test_seckill_script_embeds_key_constants() {
        // 스크립트가 쓰는 키는 상수 모듈과 한 곳에서 나와야 함
        let src = seckill_script_source();
        assert!(src.contains(&format!("'{}'", SECKILL_STOCK_KEY)));
        assert!(src.contains(&format!("'{}'", SECKILL_ORDER_KEY)));
        assert!(src.contains(&format!("'{}'", ORDER_STREAM_KEY)));
    }

    #[test]
    fn test_parse_order_fields() {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), "123456789".to_string());
        fields.insert("userId".to_string(), "1010".to_string());
        fields.insert("voucherId".to_string(), "7".to_string());

        let order = VoucherOrderService::parse_order(&fields).unwrap();
        assert_eq!(order.id, 123_456_789);
        assert_eq!(order.user_id, 1010);
        assert_eq!(order.voucher_id, 7);
    }

    #[test]
    fn test_parse_order_missing_field() {
        let mut fields = HashMap::new();
        fields.insert("userId".to_string(), "1010".to_string());

        let result = VoucherOrderService::parse_order(&fields);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_parse_order_bad_number() {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), "abc".to_string());
        fields.insert("userId".to_string(), "1010".to_string());
        fields.insert("voucherId".to_string(), "7".to_string());

        let result = VoucherOrderService::parse_order(&fields);
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_create_voucher_order_idempotent() {
        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        voucher_store.save(&voucher(7, 10)).await.unwrap();

        let service = offline_service(voucher_store.clone(), order_store.clone());
        let order = VoucherOrder::new(1, 1010, 7);

        service.create_voucher_order(&order).await.unwrap();
        assert_eq!(order_store.count(), 1);

        // 같은 엔트리 재처리 - 주문도 재고도 변하면 안 됨
        service.create_voucher_order(&order).await.unwrap();
        assert_eq!(order_store.count(), 1);
        assert_eq!(
            voucher_store.find_by_id(7).await.unwrap().unwrap().stock,
            9
        );
    }

    #[tokio::test]
    async fn test_create_voucher_order_stock_floor() {
        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        voucher_store.save(&voucher(7, 0)).await.unwrap();

        let service = offline_service(voucher_store, order_store.clone());
        let order = VoucherOrder::new(1, 1010, 7);

        // 영속 재고가 이미 0이면 저장하지 않고 에러 - pending 재시도 대상
        let result = service.create_voucher_order(&order).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(order_store.count(), 0);
    }

    /// 락 TTL 만료 후 재전달에서만 도달 가능한 경합: exists 체크는 통과했지만
    /// 저장이 유니크 제약에 거부된 경우, 이쪽에서 차감한 재고는 복원돼야 함
    #[tokio::test]
    async fn test_unique_conflict_restores_stock() {
        use async_trait::async_trait;

        // exists=false 직후 save=false - 체크와 저장 사이에 경쟁자가 끼어든 상황
        struct RacingOrderStore;

        #[async_trait]
        impl VoucherOrderStore for RacingOrderStore {
            async fn exists(&self, _user_id: i64, _voucher_id: i64) -> AppResult<bool> {
                Ok(false)
            }

            async fn save(&self, _order: &VoucherOrder) -> AppResult<bool> {
                Ok(false)
            }
        }

        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        voucher_store.save(&voucher(7, 5)).await.unwrap();

        let redis = Arc::new(RedisClient::with_url("redis://localhost:6379").unwrap());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        let service = VoucherOrderService::new(
            redis,
            id_worker,
            voucher_store.clone(),
            Arc::new(RacingOrderStore),
        );

        let order = VoucherOrder::new(1, 1010, 7);
        service.create_voucher_order(&order).await.unwrap();

        // 경쟁 승자의 차감만 유효 - 이쪽 차감분은 복원되어 5 유지
        assert_eq!(
            voucher_store.find_by_id(7).await.unwrap().unwrap().stock,
            5
        );
    }

    /// 라이브 Redis 필요: 재고 1, 서로 다른 두 사용자 → 정확히 한 명만 승인
    #[tokio::test]
    #[ignore]
    async fn test_admission_single_stock_two_users() {
        let redis = Arc::new(RedisClient::new().await.unwrap());
        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        let service = Arc::new(VoucherOrderService::new(
            redis.clone(),
            id_worker,
            voucher_store,
            order_store,
        ));

        let voucher_id = 990001;
        let _ = redis.del(&format!("seckill:order:{}", voucher_id)).await;
        service.prime_voucher(&voucher(voucher_id, 1)).await.unwrap();

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.seckill_voucher(voucher_id, 1).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.seckill_voucher(voucher_id, 2).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let admitted = results.iter().filter(|r| r.is_ok()).count();
        let exhausted = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::StockExhausted(_))))
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(exhausted, 1);
    }

    /// 라이브 Redis 필요: 재고 N일 때 동시 시도 중 정확히 N건만 승인
    #[tokio::test]
    #[ignore]
    async fn test_admission_exactly_n_succeed() {
        let redis = Arc::new(RedisClient::new().await.unwrap());
        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        let service = Arc::new(VoucherOrderService::new(
            redis.clone(),
            id_worker,
            voucher_store,
            order_store,
        ));

        let voucher_id = 990002;
        let stock = 5i64;
        let _ = redis.del(&format!("seckill:order:{}", voucher_id)).await;
        service
            .prime_voucher(&voucher(voucher_id, stock))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for user_id in 1..=20i64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.seckill_voucher(voucher_id, user_id).await
            }));
        }

        let mut admitted = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AppError::StockExhausted(_)) => exhausted += 1,
                Err(e) => panic!("예상 밖 에러: {}", e),
            }
        }

        assert_eq!(admitted, stock as usize);
        assert_eq!(exhausted, 20 - stock as usize);

        let remaining = redis
            .get_raw(&format!("seckill:stock:{}", voucher_id))
            .await
            .unwrap();
        assert_eq!(remaining.as_deref(), Some("0"));
    }

    /// 라이브 Redis 필요: 같은 사용자의 두 번째 시도는 Conflict
    #[tokio::test]
    #[ignore]
    async fn test_admission_duplicate_user_conflict() {
        let redis = Arc::new(RedisClient::new().await.unwrap());
        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        let service = VoucherOrderService::new(
            redis.clone(),
            id_worker,
            voucher_store,
            order_store,
        );

        let voucher_id = 990003;
        let _ = redis.del(&format!("seckill:order:{}", voucher_id)).await;
        service.prime_voucher(&voucher(voucher_id, 10)).await.unwrap();

        assert!(service.seckill_voucher(voucher_id, 1010).await.is_ok());
        let second = service.seckill_voucher(voucher_id, 1010).await;
        assert!(matches!(second, Err(AppError::ConflictError(_))));
    }

    /// 라이브 Redis 필요: 파싱 불가 엔트리는 재시도 예산 소진 후 데드 레터
    /// 스트림으로 옮겨지고(에러 + 원본 엔트리 ID 포함) pending에서 제거돼야 함
    #[tokio::test]
    #[ignore]
    async fn test_poison_entry_moves_to_dead_letter() {
        let redis = Arc::new(RedisClient::new().await.unwrap());

        // 스트림을 비워 이 테스트의 엔트리만 관찰
        let _ = redis.del(ORDER_STREAM_KEY).await;
        let _ = redis.del(ORDER_DEAD_STREAM_KEY).await;
        redis
            .ensure_group(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP)
            .await
            .unwrap();

        // 숫자가 아닌 id 필드 - 주문 복원이 결정적으로 실패
        let poison_id = redis
            .xadd(
                ORDER_STREAM_KEY,
                &[
                    ("id", "not-a-number".to_string()),
                    ("userId", "1010".to_string()),
                    ("voucherId", "7".to_string()),
                ],
            )
            .await
            .unwrap();

        let voucher_store = Arc::new(InMemorySeckillVoucherStore::new());
        let order_store = Arc::new(InMemoryVoucherOrderStore::new());
        let id_worker = Arc::new(RedisIdWorker::new(redis.clone()));
        let config = StreamConfig {
            consumer_name: "c-dead-letter-test".to_string(),
            block_millis: 100,
            max_retries: 2,
        };
        let service = VoucherOrderService::with_config(
            redis.clone(),
            id_worker,
            voucher_store,
            order_store,
            config.clone(),
        );

        // 엔트리를 이 컨슈머의 pending으로 만든 뒤 복구 수행
        // (동시에 도는 다른 테스트의 엔트리는 그대로 ACK하고 건너뜀)
        loop {
            let claimed = redis
                .xread_group(
                    ORDER_STREAM_KEY,
                    ORDER_CONSUMER_GROUP,
                    &config.consumer_name,
                    1,
                    None,
                    ">",
                )
                .await
                .unwrap();
            let entry = claimed.into_iter().next().expect("포이즌 엔트리 클레임 실패");
            if entry.id == poison_id {
                break;
            }
            redis
                .xack(ORDER_STREAM_KEY, ORDER_CONSUMER_GROUP, &entry.id)
                .await
                .unwrap();
        }

        service.handle_pending_list().await;

        // pending에서 제거됨
        let pending = redis
            .xread_group(
                ORDER_STREAM_KEY,
                ORDER_CONSUMER_GROUP,
                &config.consumer_name,
                1,
                None,
                "0",
            )
            .await
            .unwrap();
        assert!(pending.is_empty());

        // 데드 레터 스트림에 에러 메시지와 원본 엔트리 ID가 실려 있음
        redis
            .ensure_group(ORDER_DEAD_STREAM_KEY, "g-dead-inspect")
            .await
            .unwrap();
        let dead = redis
            .xread_group(
                ORDER_DEAD_STREAM_KEY,
                "g-dead-inspect",
                "inspector",
                10,
                None,
                ">",
            )
            .await
            .unwrap();
        assert_eq!(dead.len(), 1);
        let entry = &dead[0];
        assert_eq!(entry.fields.get("sourceEntry"), Some(&poison_id));
        assert!(!entry.fields.get("error").unwrap().is_empty());
        assert_eq!(entry.fields.get("userId"), Some(&"1010".to_string()));
    }
}
