//! 도메인 모델 모듈

pub mod entities;

pub use entities::{SeckillVoucher, Shop, VoucherOrder};
