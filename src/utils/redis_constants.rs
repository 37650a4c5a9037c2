//! Redis 키 네이밍 상수
//!
//! 키 네이밍 규칙은 외부 도구와의 상호 운용 / 테스트 가능성을 위해
//! 반드시 유지되어야 합니다.

/// 매장 캐시 키 접두사: `cache:shop:<id>`
pub const CACHE_SHOP_KEY: &str = "cache:shop:";

/// 매장 캐시 TTL (초)
pub const CACHE_SHOP_TTL: u64 = 30 * 60;

/// 톰스톤(빈 값) 캐시 TTL (초) - 캐시 관통 방어용이므로 짧게 유지
pub const CACHE_NULL_TTL: u64 = 2 * 60;

/// 분산 락 공통 접두사: `lock:<resource>`
pub const LOCK_KEY_PREFIX: &str = "lock:";

/// 캐시 재구축 락 리소스 접두사: `lock:shop:<id>`
pub const LOCK_SHOP_RESOURCE: &str = "shop:";

/// 재구축 락 TTL (초)
pub const LOCK_SHOP_TTL: u64 = 10;

/// 주문 영속화 락 리소스 접두사: `lock:order:<userId>`
pub const LOCK_ORDER_RESOURCE: &str = "order:";

/// 주문 락 TTL (초)
pub const LOCK_ORDER_TTL: u64 = 10;

/// 플래시 세일 재고 키 접두사: `seckill:stock:<voucherId>`
pub const SECKILL_STOCK_KEY: &str = "seckill:stock:";

/// 플래시 세일 구매자 집합 키 접두사: `seckill:order:<voucherId>`
pub const SECKILL_ORDER_KEY: &str = "seckill:order:";

/// 전역 ID 카운터 키 접두사: `icr:<prefix>:<yyyy:MM:dd>:`
pub const ICR_KEY_PREFIX: &str = "icr:";

/// 주문 작업 스트림 이름
pub const ORDER_STREAM_KEY: &str = "stream.orders";

/// 재시도 예산 소진 후 이동되는 데드 레터 스트림 이름
pub const ORDER_DEAD_STREAM_KEY: &str = "stream.orders.dead";

/// 주문 스트림 컨슈머 그룹 이름
pub const ORDER_CONSUMER_GROUP: &str = "g1";
