//! 执行器会话状态机
//!
//! 两个状态：`Unpowered`（初始）与 `Powered`。状态在运行时检查，
//! 因为未上电时调用 `update()` 需要得到 `NotEnabled` 错误而不是编译失败。
//!
//! ```text
//!             enable()
//!  Unpowered ─────────▶ Powered
//!      ▲                   │
//!      └───────────────────┘
//!        disable() / Drop
//! ```
//!
//! 断电保证：`Drop` 会尝试断电；[`ActuatorSession::power_on`] 返回的
//! [`PowerGuard`] 在作用域结束时断电（包括 `?` 提前返回与 panic 展开）。

use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use tmotor_driver::{Feedback, GainKind, MotorDriver};
use tracing::{debug, info, warn};

use crate::config::MotorConfig;
use crate::types::{MotorError, NewtonMeter, Rad, Result};

/// 上电后的稳定等待时间
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// 归零后的稳定等待时间
pub const ZERO_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// 电源状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Unpowered,
    Powered,
}

/// 一次反馈读取的结果
///
/// 单周期的通信失败不会作为错误返回：会话保留上一次的快照并标记为 `Stale`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackRead {
    /// 本周期读取成功
    Fresh(Feedback),
    /// 本周期通信失败，返回上一次的快照
    Stale(Feedback),
}

impl FeedbackRead {
    /// 反馈快照（无论新旧）
    pub fn feedback(&self) -> Feedback {
        match *self {
            Self::Fresh(fb) | Self::Stale(fb) => fb,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// 单个执行器的会话
///
/// 持有驱动与配置，负责上电/断电、增益选择、两阶段写入和反馈缓存。
/// 控制流程（轨迹、速度、力矩等）见 [`crate::control`]。
pub struct ActuatorSession<D: MotorDriver> {
    driver: D,
    config: MotorConfig,
    state: PowerState,
    powered_at: Option<Instant>,
    last_uptime: Option<Duration>,
    feedback: Feedback,
    armed: Option<GainKind>,
    over_temperature: bool,
    settle_delay: Duration,
    zero_settle_delay: Duration,
}

impl<D: MotorDriver> ActuatorSession<D> {
    /// 创建会话（不会上电）
    pub fn new(driver: D, config: MotorConfig) -> Self {
        debug!(
            "Creating session for {} id={} on {}",
            config.motor_type(),
            config.motor_id(),
            config.interface()
        );
        Self {
            driver,
            config,
            state: PowerState::Unpowered,
            powered_at: None,
            last_uptime: None,
            feedback: Feedback::ZERO,
            armed: None,
            over_temperature: false,
            settle_delay: SETTLE_DELAY,
            zero_settle_delay: ZERO_SETTLE_DELAY,
        }
    }

    /// 覆盖上电与归零的稳定等待时间（仿真与测试用）
    pub fn with_settle_delays(mut self, enable: Duration, zero: Duration) -> Self {
        self.settle_delay = enable;
        self.zero_settle_delay = zero;
        self
    }

    // ==================== 生命周期 ====================

    /// 上电
    ///
    /// 已上电时记录警告并直接返回，上电时间戳保持不变。
    /// 驱动上电失败时错误向上传播，会话保持 `Unpowered`。
    pub fn enable(&mut self) -> Result<()> {
        if self.state == PowerState::Powered {
            warn!(
                "Actuator id={} already enabled, ignoring enable request",
                self.config.motor_id()
            );
            return Ok(());
        }

        info!(
            "Enabling {} id={} on {}",
            self.config.motor_type(),
            self.config.motor_id(),
            self.config.interface()
        );
        self.driver.power_on()?;
        self.state = PowerState::Powered;
        self.powered_at = Some(Instant::now());

        if !self.settle_delay.is_zero() {
            spin_sleep::sleep(self.settle_delay);
        }

        let read = self.refresh();
        info!(
            "Actuator id={} enabled at position {}",
            self.config.motor_id(),
            Rad(read.feedback().position)
        );
        Ok(())
    }

    /// 断电（尽力而为）
    ///
    /// 未上电时不做任何事。驱动断电失败只记录日志，会话仍然进入 `Unpowered`。
    pub fn disable(&mut self) {
        if self.state == PowerState::Unpowered {
            debug!("Actuator id={} already disabled", self.config.motor_id());
            return;
        }

        let uptime = self.uptime();
        if let Err(e) = self.driver.power_off() {
            warn!(
                "Power-off failed for actuator id={}: {}. Marking session unpowered anyway.",
                self.config.motor_id(),
                e
            );
        }

        self.state = PowerState::Unpowered;
        self.powered_at = None;
        self.armed = None;
        self.last_uptime = Some(uptime);
        info!(
            "Actuator id={} disabled after {:.2}s",
            self.config.motor_id(),
            uptime.as_secs_f64()
        );
    }

    /// 上电并返回作用域守卫，守卫析构时断电
    ///
    /// ```rust
    /// use tmotor_client::{ActuatorSession, MotorConfig};
    /// use tmotor_driver::sim::SimulatedActuator;
    /// use std::time::Duration;
    ///
    /// let mut session = ActuatorSession::new(SimulatedActuator::default(), MotorConfig::default())
    ///     .with_settle_delays(Duration::ZERO, Duration::ZERO);
    /// {
    ///     let mut guard = session.power_on()?;
    ///     guard.update()?;
    /// }
    /// assert!(!session.is_power_on());
    /// # Ok::<(), tmotor_client::MotorError>(())
    /// ```
    pub fn power_on(&mut self) -> Result<PowerGuard<'_, D>> {
        self.enable()?;
        Ok(PowerGuard { session: self })
    }

    /// 提交暂存的命令并刷新反馈
    ///
    /// 未上电时返回 `NotEnabled`；通信失败时返回上一次快照（`Stale`）。
    pub fn update(&mut self) -> Result<FeedbackRead> {
        self.ensure_enabled()?;
        Ok(self.refresh())
    }

    /// 以当前位置作为新的零点
    ///
    /// 归零后等待稳定时间，再读取一次反馈。
    pub fn zero_position(&mut self) -> Result<FeedbackRead> {
        self.ensure_enabled()?;
        info!("Zeroing actuator id={}", self.config.motor_id());
        self.driver.zero_position()?;
        if !self.zero_settle_delay.is_zero() {
            spin_sleep::sleep(self.zero_settle_delay);
        }
        Ok(self.refresh())
    }

    // ==================== 查询 ====================

    pub fn power_state(&self) -> PowerState {
        self.state
    }

    pub fn is_power_on(&self) -> bool {
        self.state == PowerState::Powered
    }

    /// 本次上电以来的时长，未上电时为 0
    pub fn uptime(&self) -> Duration {
        self.powered_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// 上一次上电周期的时长（断电时记录）
    pub fn last_uptime(&self) -> Option<Duration> {
        self.last_uptime
    }

    /// 本次上电的时间戳
    pub fn powered_at(&self) -> Option<Instant> {
        self.powered_at
    }

    /// 最近一次成功读取的反馈
    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn position(&self) -> Rad {
        Rad(self.feedback.position)
    }

    /// 速度（rad/s）
    pub fn velocity(&self) -> f64 {
        self.feedback.velocity
    }

    pub fn torque(&self) -> NewtonMeter {
        NewtonMeter(self.feedback.torque)
    }

    /// 温度（°C）
    pub fn temperature(&self) -> f64 {
        self.feedback.temperature
    }

    /// 最近一次反馈是否超过配置的温度上限
    pub fn is_over_temperature(&self) -> bool {
        self.feedback.temperature > self.config.max_temperature()
    }

    /// 当前选定的增益模式（断电后清空）
    pub fn armed_mode(&self) -> Option<GainKind> {
        self.armed
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    // ==================== 内部写入接口 ====================

    pub(crate) fn ensure_enabled(&self) -> Result<()> {
        match self.state {
            PowerState::Powered => Ok(()),
            PowerState::Unpowered => Err(MotorError::NotEnabled),
        }
    }

    /// 选择增益模式
    pub(crate) fn arm(&mut self, gains: GainKind) -> Result<()> {
        self.driver.set_gains(gains)?;
        if self.armed != Some(gains) {
            debug!(
                "Actuator id={} armed for {} (kp={}, kd={})",
                self.config.motor_id(),
                gains.name(),
                gains.kp(),
                gains.kd()
            );
        }
        self.armed = Some(gains);
        Ok(())
    }

    /// 暂存三路参考值，提交并刷新反馈
    pub(crate) fn write(&mut self, position: f64, velocity: f64, torque: f64) -> FeedbackRead {
        self.driver.stage_position(position);
        self.driver.stage_velocity(velocity);
        self.driver.stage_torque(torque);
        self.refresh()
    }

    fn refresh(&mut self) -> FeedbackRead {
        let result = self.driver.commit().and_then(|()| self.driver.read_feedback());
        match result {
            Ok(feedback) => {
                self.feedback = feedback;
                self.watch_temperature();
                FeedbackRead::Fresh(feedback)
            },
            Err(e) if e.is_transient() => {
                debug!(
                    "Transient feedback failure on actuator id={}: {}, keeping previous snapshot",
                    self.config.motor_id(),
                    e
                );
                FeedbackRead::Stale(self.feedback)
            },
            Err(e) => {
                warn!(
                    "Feedback failure on actuator id={}: {}, keeping previous snapshot",
                    self.config.motor_id(),
                    e
                );
                FeedbackRead::Stale(self.feedback)
            },
        }
    }

    /// 温度越限时告警一次，回落后复位
    fn watch_temperature(&mut self) {
        let over = self.is_over_temperature();
        if over && !self.over_temperature {
            warn!(
                "Actuator id={} temperature {:.1}°C exceeds limit {:.1}°C",
                self.config.motor_id(),
                self.feedback.temperature,
                self.config.max_temperature()
            );
        }
        self.over_temperature = over;
    }
}

impl<D: MotorDriver> Drop for ActuatorSession<D> {
    fn drop(&mut self) {
        self.disable();
    }
}

/// 上电作用域守卫
///
/// 通过 `Deref`/`DerefMut` 访问会话；析构时调用 [`ActuatorSession::disable`]。
pub struct PowerGuard<'a, D: MotorDriver> {
    session: &'a mut ActuatorSession<D>,
}

impl<D: MotorDriver> Deref for PowerGuard<'_, D> {
    type Target = ActuatorSession<D>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<D: MotorDriver> DerefMut for PowerGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<D: MotorDriver> Drop for PowerGuard<'_, D> {
    fn drop(&mut self) {
        self.session.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmotor_driver::DriverError;
    use tmotor_driver::mock::{DriverCall, MockDriver};

    fn session(driver: &MockDriver) -> ActuatorSession<MockDriver> {
        ActuatorSession::new(driver.clone(), MotorConfig::default())
            .with_settle_delays(Duration::ZERO, Duration::ZERO)
    }

    fn feedback(position: f64, temperature: f64) -> Feedback {
        Feedback {
            position,
            temperature,
            ..Feedback::ZERO
        }
    }

    #[test]
    fn test_update_requires_enable() {
        let probe = MockDriver::new();
        let mut s = session(&probe);
        assert!(matches!(s.update(), Err(MotorError::NotEnabled)));
        assert_eq!(probe.commit_count(), 0);
    }

    #[test]
    fn test_enable_reads_feedback() {
        let probe = MockDriver::new();
        probe.set_feedback(feedback(0.3, 30.0));
        let mut s = session(&probe);

        s.enable().unwrap();
        assert!(s.is_power_on());
        assert!(probe.is_powered());
        assert_eq!(probe.commit_count(), 1);
        assert_eq!(s.position(), Rad(0.3));
        assert_eq!(s.temperature(), 30.0);
    }

    #[test]
    fn test_double_enable_keeps_timestamp() {
        let probe = MockDriver::new();
        let mut s = session(&probe);

        s.enable().unwrap();
        let first = s.powered_at();
        s.enable().unwrap();

        assert_eq!(s.powered_at(), first);
        assert_eq!(probe.count(|c| *c == DriverCall::PowerOn), 1);
    }

    #[test]
    fn test_enable_failure_stays_unpowered() {
        let probe = MockDriver::new();
        probe.fail_power_on(true);
        let mut s = session(&probe);

        let err = s.enable().unwrap_err();
        assert!(matches!(
            err,
            MotorError::Driver(DriverError::PowerSequence(_))
        ));
        assert_eq!(s.power_state(), PowerState::Unpowered);
        assert_eq!(s.powered_at(), None);
    }

    #[test]
    fn test_disable_is_best_effort() {
        let probe = MockDriver::new();
        let mut s = session(&probe);
        s.enable().unwrap();
        s.arm(GainKind::Torque).unwrap();

        probe.fail_power_off(true);
        s.disable();

        assert!(!s.is_power_on());
        assert_eq!(s.armed_mode(), None);
        assert_eq!(s.uptime(), Duration::ZERO);
        assert!(s.last_uptime().is_some());
    }

    #[test]
    fn test_disable_when_unpowered_is_noop() {
        let probe = MockDriver::new();
        let mut s = session(&probe);
        s.disable();
        assert!(probe.calls().is_empty());
        assert_eq!(s.last_uptime(), None);
    }

    #[test]
    fn test_transient_failure_returns_stale() {
        let probe = MockDriver::new();
        probe.set_feedback(feedback(1.0, 25.0));
        let mut s = session(&probe);
        s.enable().unwrap();

        probe.set_feedback(feedback(2.0, 25.0));
        probe.fail_next_commits(1);
        let read = s.update().unwrap();
        assert!(read.is_stale());
        assert_eq!(read.feedback().position, 1.0);

        probe.fail_next_reads(1);
        assert!(s.update().unwrap().is_stale());

        let read = s.update().unwrap();
        assert!(read.is_fresh());
        assert_eq!(read.feedback().position, 2.0);
    }

    #[test]
    fn test_power_guard_disables_on_scope_exit() {
        let probe = MockDriver::new();
        let mut s = session(&probe);
        {
            let mut guard = s.power_on().unwrap();
            assert!(guard.is_power_on());
            guard.update().unwrap();
        }
        assert!(!s.is_power_on());
        assert!(!probe.is_powered());
    }

    #[test]
    fn test_power_guard_disables_on_early_return() {
        fn failing(s: &mut ActuatorSession<MockDriver>) -> Result<()> {
            let _guard = s.power_on()?;
            Err(MotorError::invalid_parameter("x", "forced"))
        }

        let probe = MockDriver::new();
        let mut s = session(&probe);
        assert!(failing(&mut s).is_err());
        assert!(!probe.is_powered());
    }

    #[test]
    fn test_drop_disables() {
        let probe = MockDriver::new();
        {
            let mut s = session(&probe);
            s.enable().unwrap();
        }
        assert!(!probe.is_powered());
        assert_eq!(probe.count(|c| *c == DriverCall::PowerOff), 1);
    }

    #[test]
    fn test_zero_position() {
        let probe = MockDriver::new();
        probe.set_feedback(feedback(0.8, 25.0));
        let mut s = session(&probe);
        assert!(matches!(s.zero_position(), Err(MotorError::NotEnabled)));

        s.enable().unwrap();
        let read = s.zero_position().unwrap();
        assert_eq!(read.feedback().position, 0.0);
        assert_eq!(probe.count(|c| *c == DriverCall::ZeroPosition), 1);
    }

    #[test]
    fn test_over_temperature() {
        let probe = MockDriver::new();
        probe.set_feedback(feedback(0.0, 40.0));
        let mut s = session(&probe);
        s.enable().unwrap();
        assert!(!s.is_over_temperature());

        probe.set_feedback(feedback(0.0, 55.0));
        s.update().unwrap();
        assert!(s.is_over_temperature());

        probe.set_feedback(feedback(0.0, 45.0));
        s.update().unwrap();
        assert!(!s.is_over_temperature());
    }

    #[test]
    fn test_feedback_read_accessors() {
        let fb = feedback(0.5, 20.0);
        assert_eq!(FeedbackRead::Fresh(fb).feedback(), fb);
        assert!(FeedbackRead::Stale(fb).is_stale());
        assert!(!FeedbackRead::Stale(fb).is_fresh());
    }
}
