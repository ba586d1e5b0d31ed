use thiserror::Error;

/// 统一错误类型
///
/// 数据质量问题只在本地降级处理, 不经过此类型
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("config error: {0}")]
    Config(String),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid work item #{index}: {reason}")]
    InvalidWorkItem { index: usize, reason: String },

    #[error("invalid observation: {0}")]
    InvalidObservation(String),
}

impl EstimateError {
    pub fn invalid_item(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidWorkItem {
            index,
            reason: reason.into(),
        }
    }

    /// 是否为请求参数错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Workbook(_) | Self::InvalidWorkItem { .. } | Self::InvalidObservation(_)
        )
    }
}

impl From<config::ConfigError> for EstimateError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EstimateError>;
