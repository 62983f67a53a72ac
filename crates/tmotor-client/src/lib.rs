//! 客户端接口模块
//!
//! 单个 T-Motor MIT 模式执行器的用户接口，包括：
//! - 会话状态机（上电/断电、作用域守卫、陈旧反馈标记）
//! - 强类型单位（Rad、Deg、NewtonMeter）
//! - 轨迹曲线、周期力矩曲线与控制流程
//! - 可校验的配置（支持 TOML）
//!
//! 总线收发由 [`MotorDriver`] 的实现者负责，见 `tmotor-driver`。
//!
//! # 示例
//!
//! ```rust
//! use std::time::Duration;
//! use tmotor_client::control::{CancelToken, TrackOptions};
//! use tmotor_client::{ActuatorSession, MotorConfig, Rad};
//! use tmotor_driver::sim::SimulatedActuator;
//!
//! let mut session = ActuatorSession::new(SimulatedActuator::default(), MotorConfig::default())
//!     .with_settle_delays(Duration::ZERO, Duration::ZERO);
//! let mut powered = session.power_on()?;
//! let outcome = powered.track_trajectory(
//!     Rad(0.2),
//!     Duration::from_millis(100),
//!     &TrackOptions::default(),
//!     &CancelToken::new(),
//! )?;
//! assert!(outcome.is_reached());
//! # Ok::<(), tmotor_client::MotorError>(())
//! ```

pub mod config;
pub mod control;
pub mod state;
pub mod types;

pub use config::{CONTROL_LOOP_FREQUENCY, MOTOR_ID_RANGE, MotorConfig, MotorConfigBuilder};
pub use state::{ActuatorSession, FeedbackRead, PowerGuard, PowerState};
pub use tmotor_driver::{DriverError, Feedback, GainKind, MotorDriver};
pub use types::*;
