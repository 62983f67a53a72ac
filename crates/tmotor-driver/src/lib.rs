//! # TMotor Driver Layer
//!
//! 执行器驱动能力抽象。真正的总线驱动（CAN 帧编码、MIT 协议解包、链路配置）
//! 由外部提供，本 crate 只定义上层依赖的能力接口：
//!
//! - [`MotorDriver`] trait：上电/断电、两阶段写入（stage → commit）、反馈读取、增益选择、归零
//! - [`Feedback`] / [`GainKind`]：反馈快照与增益模式
//! - [`sim::SimulatedActuator`]：刚体转子仿真后端（无硬件时使用）
//! - `mock::MockDriver`：可编程的测试替身（`mock` feature）
//!
//! # 两阶段写入
//!
//! `stage_*` 只暂存参考值，`commit()` 才会真正发送并刷新反馈：
//!
//! ```rust
//! use tmotor_driver::{GainKind, MotorDriver};
//! use tmotor_driver::sim::SimulatedActuator;
//!
//! let mut driver = SimulatedActuator::default();
//! driver.power_on()?;
//! driver.set_gains(GainKind::Impedance { kp: 10.0, kd: 0.5 })?;
//! driver.stage_position(0.5);
//! driver.stage_velocity(0.0);
//! driver.stage_torque(0.0);
//! driver.commit()?;
//! let feedback = driver.read_feedback()?;
//! # let _ = feedback;
//! driver.power_off()?;
//! # Ok::<(), tmotor_driver::DriverError>(())
//! ```

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod sim;
pub mod state;

pub use error::DriverError;
pub use state::{Feedback, GainKind};

/// 执行器驱动能力
///
/// 与外部底层驱动之间的唯一接缝。实现者负责总线收发；调用者（会话层）负责
/// 状态机、重试策略和时序。
pub trait MotorDriver {
    /// 上电并进入 MIT 控制模式
    fn power_on(&mut self) -> Result<(), DriverError>;

    /// 退出控制模式并断电
    fn power_off(&mut self) -> Result<(), DriverError>;

    /// 暂存位置参考（rad），下一次 `commit()` 生效
    fn stage_position(&mut self, position: f64);

    /// 暂存速度参考（rad/s），下一次 `commit()` 生效
    fn stage_velocity(&mut self, velocity: f64);

    /// 暂存前馈力矩（Nm），下一次 `commit()` 生效
    fn stage_torque(&mut self, torque: f64);

    /// 发送暂存的参考值并刷新反馈
    ///
    /// 可能以瞬时通信错误失败（见 [`DriverError::is_transient`]）。
    fn commit(&mut self) -> Result<(), DriverError>;

    /// 读取最近一次 `commit()` 刷新的反馈
    fn read_feedback(&mut self) -> Result<Feedback, DriverError>;

    /// 选择增益模式，下一次 `commit()` 生效
    fn set_gains(&mut self, gains: GainKind) -> Result<(), DriverError>;

    /// 以当前物理角度作为新的位置原点
    ///
    /// 调用者需要在之后留出稳定时间再信任反馈。
    fn zero_position(&mut self) -> Result<(), DriverError>;
}

impl<D: MotorDriver + ?Sized> MotorDriver for Box<D> {
    fn power_on(&mut self) -> Result<(), DriverError> {
        (**self).power_on()
    }

    fn power_off(&mut self) -> Result<(), DriverError> {
        (**self).power_off()
    }

    fn stage_position(&mut self, position: f64) {
        (**self).stage_position(position)
    }

    fn stage_velocity(&mut self, velocity: f64) {
        (**self).stage_velocity(velocity)
    }

    fn stage_torque(&mut self, torque: f64) {
        (**self).stage_torque(torque)
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        (**self).commit()
    }

    fn read_feedback(&mut self) -> Result<Feedback, DriverError> {
        (**self).read_feedback()
    }

    fn set_gains(&mut self, gains: GainKind) -> Result<(), DriverError> {
        (**self).set_gains(gains)
    }

    fn zero_position(&mut self) -> Result<(), DriverError> {
        (**self).zero_position()
    }
}
