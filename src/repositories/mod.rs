//! # 영속 저장소 리포지토리 trait
//!
//! 관계형 영속화는 이 서브시스템의 범위 밖이며, 여기서는 캐시 / 주문
//! 파이프라인이 의존하는 최소 연산만 trait으로 추상화합니다. 실제 배포에서는
//! 행 저장소 구현이 주입되고, 테스트와 로컬 실행에서는 [`memory`] 모듈의
//! 인메모리 구현을 사용합니다.
//!
//! 트랜잭션 관리는 제공하지 않습니다. 영속화 단계는 프록시 자기 호출 같은
//! 간접 계층 없이 명시적 협력자 메서드 호출로 수행됩니다.

pub mod memory;

use async_trait::async_trait;

use crate::core::errors::AppResult;
use crate::domain::entities::{SeckillVoucher, Shop, VoucherOrder};

/// 매장 저장소
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// ID로 매장을 조회합니다. 없으면 `Ok(None)` (에러 아님).
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Shop>>;

    /// 매장 정보를 갱신합니다. 대상 행이 없으면 `Ok(false)`.
    async fn update(&self, shop: &Shop) -> AppResult<bool>;
}

/// 플래시 세일 쿠폰 저장소
#[async_trait]
pub trait SeckillVoucherStore: Send + Sync {
    async fn find_by_id(&self, voucher_id: i64) -> AppResult<Option<SeckillVoucher>>;

    /// 쿠폰을 저장(또는 덮어쓰기)합니다.
    async fn save(&self, voucher: &SeckillVoucher) -> AppResult<()>;

    /// 조건부 재고 차감: `stock > 0`일 때만 1 차감합니다.
    ///
    /// `UPDATE ... SET stock = stock - 1 WHERE voucher_id = ? AND stock > 0`에
    /// 해당하는 연산입니다. 차감했으면 `true`, 조건 불충족이면 `false`.
    async fn decrement_stock(&self, voucher_id: i64) -> AppResult<bool>;

    /// 재고를 1 복원합니다.
    ///
    /// 차감 후 주문 저장이 유니크 제약 경합으로 무효가 됐을 때의 보상
    /// 연산입니다. 경합 승자의 차감만 유효해야 합니다.
    async fn increment_stock(&self, voucher_id: i64) -> AppResult<()>;
}

/// 쿠폰 주문 저장소
#[async_trait]
pub trait VoucherOrderStore: Send + Sync {
    /// `(user_id, voucher_id)` 주문 존재 여부 - 영속화 시점 중복 가드에 사용
    async fn exists(&self, user_id: i64, voucher_id: i64) -> AppResult<bool>;

    /// 주문을 저장합니다.
    ///
    /// `(user_id, voucher_id)` 유니크 제약이 있는 저장소라면 중복 삽입 시
    /// `Ok(false)`를 반환해야 합니다 (에러가 아니라 멱등 처리 대상).
    async fn save(&self, order: &VoucherOrder) -> AppResult<bool>;
}
