//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 캐싱 / 주문 서브시스템을 위한 통합 에러 처리 시스템입니다.
//! `thiserror`를 사용하여 타입 안전하고 일관된 에러 처리를 제공합니다.
//!
//! ## 에러 분류
//!
//! | AppError | 의미 | 발생 시나리오 |
//! |----------|------|---------------|
//! | `StockExhausted` | 재고 소진 | 진입 판정에서 재고 0 |
//! | `ConflictError` | 중복 / 경합 | 중복 구매, 주문 락 경합 |
//! | `RedisError` | 일시적 스토어 장애 | Redis 네트워크 / 타임아웃 |
//! | `DatabaseError` | 영속화 실패 | 진입 승인 후 주문 저장 실패 |
//! | `SerializationError` | 직렬화 실패 | 캐시 페이로드 JSON 변환 오류 |
//! | `ValidationError` | 입력값 검증 실패 | 잘못된 스트림 엔트리 필드 |
//! | `InternalError` | 예상치 못한 오류 | 알 수 없는 판정 코드 등 |
//!
//! "엔티티 없음"은 에러가 아니라 정상 결과이므로 조회 경로는
//! `Ok(None)`을 반환하며, 이 열거형에 NotFound 변형은 없습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use review_service_backend::core::errors::{AppError, AppResult};
//!
//! async fn seckill(voucher_id: i64, user_id: i64) -> AppResult<i64> {
//!     match admission_code {
//!         0 => Ok(order_id),
//!         1 => Err(AppError::StockExhausted("재고가 부족합니다".to_string())),
//!         2 => Err(AppError::ConflictError("이미 구매한 사용자입니다".to_string())),
//!         _ => Err(AppError::InternalError("알 수 없는 판정 코드".to_string())),
//!     }
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 캐싱 / 주문 서브시스템에서 발생할 수 있는 모든 종류의 에러를 포괄하는
/// 열거형입니다. 진입 판정 에러(`StockExhausted`, `ConflictError`)는 호출자에게
/// 동기적으로 전달되고, 영속화 에러(`DatabaseError`)는 스트림 pending 복구
/// 경로에서 재시도됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 영속 저장소 관련 에러 (진입 승인 후의 영속화 실패 포함)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis 관련 에러 (일시적 스토어 장애)
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 직렬화 / 역직렬화 에러
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 입력값 검증 에러
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 충돌 / 중복 에러 (중복 구매, 락 경합)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 재고 소진 에러
    #[error("Stock exhausted: {0}")]
    StockExhausted(String),

    /// 내부 서버 에러
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::RedisError(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::SerializationError(e.to_string())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
