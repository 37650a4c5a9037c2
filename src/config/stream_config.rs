//! 주문 스트림 컨슈머 설정

use log::error;

/// 주문 스트림 소비 설정
///
/// # Environment Variables
///
/// * `ORDER_CONSUMER_NAME` - 컨슈머 그룹 내 컨슈머 이름 (기본값: "c1")
/// * `ORDER_STREAM_BLOCK_MILLIS` - XREADGROUP 블로킹 대기 시간 (기본값: 2000)
/// * `ORDER_MAX_RETRIES` - pending 엔트리별 재시도 예산 (기본값: 3)
///
/// 컨슈머 이름은 논리 컨슈머마다 달라야 합니다. 같은 이름의 컨슈머 두 개가
/// 동시에 돌면 그룹 커서를 두고 경합하게 됩니다.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// 컨슈머 그룹 내 이 컨슈머의 이름
    pub consumer_name: String,
    /// 새 엔트리 대기 시간 (밀리초) - 종료 신호 점검 주기이기도 함
    pub block_millis: usize,
    /// pending 엔트리별 재시도 예산 - 소진 시 데드 레터로 이동
    pub max_retries: u32,
}

impl StreamConfig {
    /// 환경 변수에서 설정을 로드합니다.
    pub fn from_env() -> Self {
        let consumer_name =
            std::env::var("ORDER_CONSUMER_NAME").unwrap_or_else(|_| "c1".to_string());

        let block_millis = std::env::var("ORDER_STREAM_BLOCK_MILLIS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<usize>()
            .unwrap_or_else(|e| {
                error!("ORDER_STREAM_BLOCK_MILLIS 파싱 실패: {}. 기본값 2000 사용", e);
                2000
            });

        let max_retries = std::env::var("ORDER_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .unwrap_or_else(|e| {
                error!("ORDER_MAX_RETRIES 파싱 실패: {}. 기본값 3 사용", e);
                3
            });

        Self {
            consumer_name,
            block_millis,
            max_retries,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            consumer_name: "c1".to_string(),
            block_millis: 2000,
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.consumer_name, "c1");
        assert_eq!(config.block_millis, 2000);
        assert_eq!(config.max_retries, 3);
    }
}
