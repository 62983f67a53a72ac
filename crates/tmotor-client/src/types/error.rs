//! 客户端错误类型
//!
//! 错误分级：
//!
//! - **配置错误**：构造时失败（总线地址越界、接口名非法），致命
//! - **未使能**：在 `Unpowered` 状态下发命令，调用者先 `enable()` 即可恢复
//! - **驱动错误**：上电、增益选择、归零失败，对本次调用致命
//!
//! 单周期的通信失败不会出现在这里：会话层吸收它们并返回陈旧反馈
//! （见 [`FeedbackRead`](crate::state::FeedbackRead)）。

use thiserror::Error;
use tmotor_driver::DriverError;

/// 客户端错误
#[derive(Error, Debug)]
pub enum MotorError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 参数无效
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// 参数名
        param: String,
        /// 原因
        reason: String,
    },

    /// 执行器未使能
    #[error("Actuator not enabled")]
    NotEnabled,

    /// 驱动错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl MotorError {
    /// 是否为致命错误
    ///
    /// 致命错误表示执行器可能处于未知状态，调用者应停止并断电。
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Driver(e) => !e.is_transient(),
            _ => false,
        }
    }

    /// 是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::InvalidParameter { .. })
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// 创建参数无效错误
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, MotorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", MotorError::NotEnabled), "Actuator not enabled");

        let e = MotorError::invalid_parameter("duration", "must be positive");
        assert_eq!(
            format!("{}", e),
            "Invalid parameter 'duration': must be positive"
        );

        let e = MotorError::from(DriverError::device("overcurrent"));
        assert!(format!("{}", e).contains("Device fault: overcurrent"));
    }

    #[test]
    fn test_classification() {
        assert!(MotorError::config("bad id").is_config_error());
        assert!(MotorError::invalid_parameter("x", "y").is_config_error());
        assert!(!MotorError::NotEnabled.is_config_error());

        assert!(MotorError::from(DriverError::device("overheat")).is_fatal());
        assert!(!MotorError::from(DriverError::Timeout).is_fatal());
        assert!(!MotorError::NotEnabled.is_fatal());
    }
}
