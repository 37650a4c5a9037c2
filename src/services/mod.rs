//! 비즈니스 서비스 모듈

pub mod shop_service;
pub mod voucher_order_service;

pub use shop_service::ShopService;
pub use voucher_order_service::VoucherOrderService;
