//! 驱动状态数据结构
//!
//! 反馈快照与增益模式，均为 `Copy` 的纯数据。

/// 执行器反馈
///
/// 一次 `commit()` 之后从驱动读取到的状态。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feedback {
    /// 输出轴位置（rad）
    pub position: f64,
    /// 输出轴速度（rad/s）
    pub velocity: f64,
    /// 输出力矩（Nm）
    pub torque: f64,
    /// 驱动温度（°C）
    pub temperature: f64,
}

impl Feedback {
    /// 全零反馈（会话初始值）
    pub const ZERO: Self = Feedback {
        position: 0.0,
        velocity: 0.0,
        torque: 0.0,
        temperature: 0.0,
    };
}

/// 增益模式
///
/// 在下一次 `commit()` 之前通过 `MotorDriver::set_gains` 选定，决定驱动内部的
/// MIT 控制律 `τ = kp·(p* − p) + kd·(v* − v) + τff` 使用哪些项。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GainKind {
    /// 位置 + 速度增益（轨迹跟踪、阻抗控制）
    Impedance {
        /// 位置增益（Nm/rad）
        kp: f64,
        /// 速度增益（Nm/(rad/s)）
        kd: f64,
    },
    /// 仅速度增益（速度控制）
    Velocity {
        /// 速度增益（Nm/(rad/s)）
        kd: f64,
    },
    /// 零增益（纯力矩控制）
    Torque,
}

impl GainKind {
    /// 位置增益
    pub fn kp(&self) -> f64 {
        match *self {
            Self::Impedance { kp, .. } => kp,
            Self::Velocity { .. } | Self::Torque => 0.0,
        }
    }

    /// 速度增益
    pub fn kd(&self) -> f64 {
        match *self {
            Self::Impedance { kd, .. } | Self::Velocity { kd } => kd,
            Self::Torque => 0.0,
        }
    }

    /// 模式名称（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Impedance { .. } => "impedance",
            Self::Velocity { .. } => "velocity",
            Self::Torque => "torque",
        }
    }
}
