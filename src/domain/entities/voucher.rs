//! 플래시 세일 쿠폰 엔티티

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 플래시 세일(순간 특가) 쿠폰
///
/// 재고는 절대 음수가 되지 않습니다. 차감은 차감 전 재고가 0보다 클 때만
/// 성공하며, 실시간 진입 판정은 Redis의 `seckill:stock:<voucherId>` 카운터가,
/// 영속 재고는 저장소의 조건부 갱신이 각각 담당합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeckillVoucher {
    pub voucher_id: i64,
    /// 남은 재고
    pub stock: i64,
    /// 판매 시작 시각
    pub begin_time: DateTime<Utc>,
    /// 판매 종료 시각
    pub end_time: DateTime<Utc>,
}
