//! 캐싱 계층 모듈
//!
//! Redis 클라이언트 래퍼와 범용 캐시 헬퍼(CacheClient)를 제공합니다.

pub mod cache_client;
pub mod redis;

pub use cache_client::{CacheClient, RedisData};
pub use redis::{RedisClient, StreamEntry};
