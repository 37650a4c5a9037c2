//! 영속 엔티티 정의
//!
//! 저장소 trait과 캐시 페이로드가 공유하는 도메인 타입들입니다.
//! 모든 엔티티는 serde 직렬화를 지원합니다 (캐시 페이로드 요건).

pub mod shop;
pub mod voucher;
pub mod voucher_order;

pub use shop::Shop;
pub use voucher::SeckillVoucher;
pub use voucher_order::VoucherOrder;
