//! Error types and handling for the travel guide service

use thiserror::Error;

/// Main error type for the travel guide service
#[derive(Error, Debug)]
pub enum TravelGuideError {
    /// Configuration-related errors, fatal at startup
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors (model or map REST calls)
    #[error("API error: {message}")]
    Api { message: String },

    /// A spot category could not be read or parsed
    #[error("Failed to load category '{category}': {message}")]
    DataLoad { category: String, message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// JSON encoding or decoding errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl TravelGuideError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new data load error for a category
    pub fn data_load<C: Into<String>, S: Into<String>>(category: C, message: S) -> Self {
        Self::DataLoad {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelGuideError::Config { .. } => {
                "服务配置错误，请检查配置文件和 API 密钥。".to_string()
            }
            TravelGuideError::Api { .. } => "网络连接异常，回答生成失败，请稍后重试。".to_string(),
            TravelGuideError::DataLoad { .. } => "景点数据加载失败。".to_string(),
            TravelGuideError::Validation { message } => format!("请求无效：{message}"),
            TravelGuideError::Json { .. } => "系统服务繁忙，请稍后重试。".to_string(),
        }
    }
}
