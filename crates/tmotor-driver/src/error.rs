//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 总线 IO 错误
    #[error("Bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 读取超时（未收到应答帧）
    #[error("Read timeout")]
    Timeout,

    /// 设备未上电（未进入 MIT 模式）
    #[error("Device not started")]
    NotStarted,

    /// 上电/断电序列失败
    #[error("Power sequence failed: {0}")]
    PowerSequence(String),

    /// 设备报告的故障
    #[error("Device fault: {0}")]
    Device(String),

    /// 无效输入（如非有限数值）
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 是否为瞬时通信错误
    ///
    /// 瞬时错误只影响单次收发，下一个控制周期可能恢复。
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Io(_))
    }

    /// 创建设备故障错误
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}
