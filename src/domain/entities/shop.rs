//! 매장 엔티티

use serde::{Deserialize, Serialize};

/// 매장 정보
///
/// 캐시 관통 / 논리 만료 조회의 대표 대상 엔티티입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    /// 매장 분류 ID
    pub type_id: i64,
    pub address: String,
    /// 평균 객단가
    pub avg_price: i64,
    /// 누적 판매량
    pub sold: i64,
    /// 평점 (1~50, 소수점 한 자리 * 10)
    pub score: i64,
}
