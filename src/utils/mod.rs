//! 공통 유틸리티 모듈
//!
//! Redis 키 네이밍 상수, 분산 락, 전역 ID 생성기를 제공합니다.

pub mod redis_constants;
pub mod redis_id_worker;
pub mod redis_lock;

pub use redis_id_worker::RedisIdWorker;
pub use redis_lock::RedisLock;
