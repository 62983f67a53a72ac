//! TMotor SDK - T-Motor MIT 模式执行器 Rust SDK
//!
//! 单个执行器的上电管理、轨迹跟踪、速度/力矩保持与周期力矩控制。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **驱动层** (`driver`): [`MotorDriver`] 能力接口、仿真与 Mock 后端
//! - **客户端层** (`client`): 会话状态机、配置、轨迹与控制流程
//!
//! # 快速开始
//!
//! ```rust
//! use std::time::Duration;
//! use tmotor_sdk::prelude::*;
//!
//! let mut session = ActuatorSession::new(SimulatedActuator::default(), MotorConfig::default())
//!     .with_settle_delays(Duration::ZERO, Duration::ZERO);
//! {
//!     let mut powered = session.power_on()?;
//!     powered.set_torque(NewtonMeter(0.5), Duration::from_millis(30), &CancelToken::new())?;
//! }
//! assert!(!session.is_power_on());
//! # Ok::<(), tmotor_sdk::MotorError>(())
//! ```

pub use tmotor_client as client;
pub use tmotor_driver as driver;

pub mod prelude;

// 客户端层（推荐入口）
pub use client::control::{
    CancelToken, CrankSample, HoldOutcome, TorqueProfile, TrackOptions, TrackOutcome, Trajectory,
    TrajectoryKind,
};
pub use client::{
    ActuatorSession, FeedbackRead, MotorConfig, MotorConfigBuilder, MotorError, PowerGuard,
    PowerState,
};

// 驱动层
pub use driver::sim::SimulatedActuator;
pub use driver::{DriverError, Feedback, GainKind, MotorDriver};

/// 默认日志过滤指令
pub const DEFAULT_LOG_DIRECTIVES: &str = "tmotor_client=info,tmotor_driver=info,tmotor_sdk=info";

/// 安装默认的 `tracing` 订阅者（可选）
///
/// 库本身从不隐式安装订阅者。应用可以调用本函数获得默认配置：
/// `RUST_LOG` 优先，未设置时使用 [`DEFAULT_LOG_DIRECTIVES`]。
/// 已经安装过订阅者时返回 `false`。
pub fn init_logger() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    let installed = tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok();
    if installed {
        tracing::debug!("Default tracing subscriber installed");
    }
    installed
}
