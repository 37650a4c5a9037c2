//! 로컬 리뷰 플랫폼 백엔드 - 캐싱 / 고동시성 주문 서브시스템
//!
//! Redis를 기반으로 한 범용 캐시 계층과 플래시 세일(순간 특가) 주문 파이프라인을
//! 제공합니다. HTTP 라우팅과 관계형 영속화는 이 크레이트의 범위 밖이며,
//! 리포지토리 trait 뒤의 외부 협력자로 취급됩니다.
//!
//! # Features
//!
//! - **캐시 관통 방어**: 존재하지 않는 키에 대한 짧은 TTL 톰스톤 캐싱
//! - **캐시 붕괴 방어**: 논리 만료 + 비동기 재구축 (stale-while-revalidate)
//! - **분산 락**: SET NX EX + Lua 비교-삭제 기반의 안전한 해제
//! - **전역 ID 생성**: 타임스탬프 + Redis 일 단위 자동 증가 카운터
//! - **주문 파이프라인**: Lua 원자 진입 판정 → Redis Stream 비동기 영속화
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │      Services        │ ← ShopService / VoucherOrderService
//! └──────────────────────┘
//!       │            │
//!       ▼            ▼
//! ┌──────────┐ ┌───────────┐
//! │ Caching  │ │   Utils   │ ← CacheClient / RedisLock / RedisIdWorker
//! └──────────┘ └───────────┘
//!       │            │
//!       ▼            ▼
//! ┌──────────────────────┐
//! │     RedisClient      │ ← 문자열 / 스크립트 / 스트림 연산
//! └──────────────────────┘
//!
//! ┌──────────────────────┐
//! │    Repositories      │ ← 영속 저장소 trait (외부 협력자)
//! └──────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use review_service_backend::caching::redis::RedisClient;
//! use review_service_backend::services::VoucherOrderService;
//!
//! let redis = Arc::new(RedisClient::new().await?);
//! let service = VoucherOrderService::new(redis, id_worker, voucher_store, order_store);
//!
//! // 진입 판정 + 주문 ID 반환 (영속화는 비동기)
//! let order_id = service.seckill_voucher(voucher_id, user_id).await?;
//! ```

pub mod core;
pub mod config;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
