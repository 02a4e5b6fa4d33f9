//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_report_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ReportError {
            $($variant(String),)*
        }

        impl ReportError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ReportError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ReportError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ReportError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ReportError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ReportError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_report_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    UpstreamFailure("E005", "Upstream Failure"),
    InvalidArgument("E006", "Invalid Argument"),
    NotFound("E007", "Resource Not Found"),
    PartialDataMissing("E008", "Partial Data Missing"),
    Serialization("E009", "Serialization Error"),
    Export("E010", "Export Error"),
}

impl ReportError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ReportError {}

// 协作方（数据库、HTTP 服务）的错误统一视为上游失败，原样透传
impl From<sea_orm::DbErr> for ReportError {
    fn from(err: sea_orm::DbErr) -> Self {
        ReportError::UpstreamFailure(err.to_string())
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        ReportError::UpstreamFailure(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ReportError::cache_connection("test").code(), "E001");
        assert_eq!(ReportError::database_config("test").code(), "E003");
        assert_eq!(ReportError::upstream_failure("test").code(), "E005");
        assert_eq!(ReportError::not_found("test").code(), "E007");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ReportError::invalid_argument("test").error_type(),
            "Invalid Argument"
        );
        assert_eq!(
            ReportError::partial_data_missing("test").error_type(),
            "Partial Data Missing"
        );
    }

    #[test]
    fn test_error_message() {
        let err = ReportError::not_found("任务不存在: 42");
        assert_eq!(err.message(), "任务不存在: 42");
    }

    #[test]
    fn test_format_simple() {
        let err = ReportError::upstream_failure("content service timeout");
        let formatted = err.format_simple();
        assert!(formatted.contains("Upstream Failure"));
        assert!(formatted.contains("content service timeout"));
    }
}
