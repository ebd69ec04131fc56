//! 统一错误处理模块
//!
//! 提供词典抓取与babylon文件处理的统一错误类型定义和处理机制

// 标准库导入
use std::fmt;

// 第三方crate导入
use anyhow::Error as AnyhowError;

/// 词典工具统一错误类型
///
/// 定义了抓取、解析、转写、拼接等环节可能出现的所有错误
#[derive(Debug)]
pub enum DictError {
    /// babylon文件格式错误（记录分隔行不为空）
    Format {
        /// 文件路径
        path: String,
        /// 出错的行号（从1开始）
        line: usize,
        /// 出错行的内容
        content: String,
    },

    /// 网络请求超时
    NetworkTimeout {
        /// 请求地址
        url: String,
    },

    /// 网络请求相关错误
    Network {
        /// 错误消息
        message: String,
        /// HTTP状态码（如果适用）
        status_code: Option<u16>,
    },

    /// HTML解析相关错误
    HtmlParse {
        /// 具体错误信息
        details: String,
    },

    /// 文件操作相关错误
    FileOperation {
        /// 文件路径
        path: String,
        /// 操作类型（读取、写入、重命名等）
        operation: String,
        /// 底层错误信息
        source: String,
    },

    /// 配置相关错误
    Configuration {
        /// 配置项名称
        field: String,
        /// 错误原因
        reason: String,
    },

    /// 输入验证错误
    InputValidation {
        /// 输入值
        input: String,
        /// 验证失败原因
        reason: String,
    },

    /// 文字转写失败
    Transliteration {
        /// 出错的文本
        text: String,
        /// 错误原因
        reason: String,
    },

    /// 内部处理错误（包装anyhow::Error）
    Internal {
        /// 包装的错误
        source: AnyhowError,
    },
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::Format { path, line, content } => {
                write!(f, "babylon格式错误 [{}:{}]: 记录分隔行应为空, 实际为 {:?}", path, line, content)
            }
            DictError::NetworkTimeout { url } => {
                write!(f, "网络请求超时: {}", url)
            }
            DictError::Network { message, status_code } => {
                if let Some(code) = status_code {
                    write!(f, "网络请求失败 [{}]: {}", code, message)
                } else {
                    write!(f, "网络请求失败: {}", message)
                }
            }
            DictError::HtmlParse { details } => {
                write!(f, "HTML解析失败: {}", details)
            }
            DictError::FileOperation { path, operation, source } => {
                write!(f, "文件{}操作失败 [{}]: {}", operation, path, source)
            }
            DictError::Configuration { field, reason } => {
                write!(f, "配置错误 [{}]: {}", field, reason)
            }
            DictError::InputValidation { input, reason } => {
                write!(f, "输入验证失败 [{}]: {}", input, reason)
            }
            DictError::Transliteration { text, reason } => {
                write!(f, "转写失败 [{}]: {}", text, reason)
            }
            DictError::Internal { source } => {
                write!(f, "内部处理错误: {}", source)
            }
        }
    }
}

impl std::error::Error for DictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DictError::Internal { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl DictError {
    /// 是否为网络超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, DictError::NetworkTimeout { .. })
    }
}

/// 词典工具结果类型别名
pub type Result<T> = std::result::Result<T, DictError>;

/// 便捷的错误创建宏
#[macro_export]
macro_rules! dict_error {
    (format, $path:expr, $line:expr, $content:expr) => {
        $crate::error::DictError::Format {
            path: $path.to_string(),
            line: $line,
            content: $content.to_string(),
        }
    };
    (timeout, $url:expr) => {
        $crate::error::DictError::NetworkTimeout {
            url: $url.to_string(),
        }
    };
    (network, $msg:expr) => {
        $crate::error::DictError::Network {
            message: $msg.to_string(),
            status_code: None,
        }
    };
    (network, $msg:expr, $code:expr) => {
        $crate::error::DictError::Network {
            message: $msg.to_string(),
            status_code: Some($code),
        }
    };
    (html_parse, $details:expr) => {
        $crate::error::DictError::HtmlParse {
            details: $details.to_string(),
        }
    };
    (file_op, $path:expr, $op:expr, $source:expr) => {
        $crate::error::DictError::FileOperation {
            path: $path.to_string(),
            operation: $op.to_string(),
            source: $source.to_string(),
        }
    };
    (config, $field:expr, $reason:expr) => {
        $crate::error::DictError::Configuration {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    (input_validation, $input:expr, $reason:expr) => {
        $crate::error::DictError::InputValidation {
            input: $input.to_string(),
            reason: $reason.to_string(),
        }
    };
    (transliteration, $text:expr, $reason:expr) => {
        $crate::error::DictError::Transliteration {
            text: $text.to_string(),
            reason: $reason.to_string(),
        }
    };
}

/// 从anyhow::Error转换为DictError
impl From<AnyhowError> for DictError {
    fn from(error: AnyhowError) -> Self {
        DictError::Internal { source: error }
    }
}

/// 从reqwest::Error转换为DictError
///
/// 超时单独归类，便于上层按分区终止
impl From<reqwest::Error> for DictError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            let url = error
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return DictError::NetworkTimeout { url };
        }
        let status_code = error.status().map(|s| s.as_u16());
        DictError::Network {
            message: error.to_string(),
            status_code,
        }
    }
}

/// 从std::io::Error转换为DictError
impl From<std::io::Error> for DictError {
    fn from(error: std::io::Error) -> Self {
        DictError::FileOperation {
            path: "unknown".to_string(),
            operation: "io".to_string(),
            source: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DictError::Network {
            message: "Connection failed".to_string(),
            status_code: Some(500),
        };

        assert_eq!(format!("{}", err), "网络请求失败 [500]: Connection failed");
    }

    #[test]
    fn test_format_error_display() {
        let err = dict_error!(format, "a.babylon", 3, "oops");
        assert_eq!(
            format!("{}", err),
            "babylon格式错误 [a.babylon:3]: 记录分隔行应为空, 实际为 \"oops\""
        );
    }

    #[test]
    fn test_error_macro() {
        let err = dict_error!(network, "Test error", 404);
        match err {
            DictError::Network { message, status_code } => {
                assert_eq!(message, "Test error");
                assert_eq!(status_code, Some(404));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_timeout_detection() {
        let err = dict_error!(timeout, "http://example.com");
        assert!(err.is_timeout());
        assert!(!dict_error!(network, "x").is_timeout());
    }

    #[test]
    fn test_anyhow_conversion() {
        let anyhow_err = anyhow::anyhow!("Test anyhow error");
        let dict_err: DictError = anyhow_err.into();

        match dict_err {
            DictError::Internal { .. } => {
                // Test passes
            }
            _ => panic!("Wrong error type"),
        }
    }
}
