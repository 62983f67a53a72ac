//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use tmotor_sdk::prelude::*;
//! ```

// 会话与配置
pub use crate::client::{ActuatorSession, FeedbackRead, MotorConfig, PowerState};
// 控制流程
pub use crate::client::control::{
    CancelToken, HoldOutcome, TorqueProfile, TrackOptions, TrackOutcome, TrajectoryKind,
};
// 类型系统
pub use crate::client::types::{Deg, NewtonMeter, Rad};

// 驱动层
pub use crate::driver::MotorDriver;
pub use crate::driver::sim::SimulatedActuator;

// 错误类型
pub use crate::client::MotorError;
pub use crate::driver::DriverError;
