//! 캐시 계층 설정

use log::error;

/// 캐시 재구축 관련 설정
///
/// # Environment Variables
///
/// * `CACHE_REBUILD_POOL_SIZE` - 동시 재구축 태스크 상한 (기본값: 10)
pub struct CacheConfig;

impl CacheConfig {
    /// 재구축 워커 풀 크기를 반환합니다.
    ///
    /// 풀이 포화되면 재구축 제출은 큐잉되지 않고 버려집니다.
    pub fn rebuild_pool_size() -> usize {
        std::env::var("CACHE_REBUILD_POOL_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .unwrap_or_else(|e| {
                error!("CACHE_REBUILD_POOL_SIZE 파싱 실패: {}. 기본값 10 사용", e);
                10
            })
    }
}
