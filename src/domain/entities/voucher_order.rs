//! 쿠폰 주문 엔티티

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 쿠폰 주문
///
/// `(user_id, voucher_id)` 쌍당 최대 하나만 존재합니다. 진입 판정
/// 스크립트의 사전 체크와 영속화 시점의 중복 가드가 이중으로 보장합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherOrder {
    /// 전역 ID 생성기가 발급한 주문 ID
    pub id: i64,
    pub user_id: i64,
    pub voucher_id: i64,
    pub create_time: DateTime<Utc>,
}

impl VoucherOrder {
    pub fn new(id: i64, user_id: i64, voucher_id: i64) -> Self {
        Self {
            id,
            user_id,
            voucher_id,
            create_time: Utc::now(),
        }
    }
}
