//! 控制模块
//!
//! - `trajectory` - 轨迹曲线与采样
//! - `torque_profile` - 双过渡区周期力矩曲线
//! - `modes` - 位置/速度/力矩/单次命令流程
//! - `crank` - 周期力矩流程
//! - `cancel` - 取消令牌

pub mod cancel;
pub mod crank;
pub mod modes;
pub mod torque_profile;
pub mod trajectory;

pub use cancel::CancelToken;
pub use crank::CrankSample;
pub use modes::{HoldOutcome, STEP_COMMAND_THRESHOLD, TrackOptions, TrackOutcome};
pub use torque_profile::{TorqueProfile, smooth_transition};
pub use trajectory::{Trajectory, TrajectoryKind, TrajectorySample, TrajectorySamples};
