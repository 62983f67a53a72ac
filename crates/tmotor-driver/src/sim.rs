//! 仿真执行器
//!
//! 刚体转子模型（转动惯量 + 粘滞阻尼），由 MIT 控制律驱动：
//!
//! ```text
//! τ = clamp(kp·(p* − p) + kd·(v* − v) + τff, ±τmax)
//! J·a = τ − b·v
//! ```
//!
//! 每次 `commit()` 按距上一次提交的墙钟时间积分（固定 1ms 子步长）。
//! 温度使用一阶热模型：铜损 `k·τ²` 加热，向环境温度指数衰减。
//! 温度达到保护阈值时驱动锁定输出，`commit()` 与 `set_gains()` 返回设备故障，
//! 冷却到阈值以下后重新上电才能解除。

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::{DriverError, Feedback, GainKind, MotorDriver};

/// 积分子步长（秒）
const SUBSTEP: f64 = 1e-3;

/// 单次提交允许积分的最长时间（秒）
///
/// 调用者长时间不提交时，不把整段空档一次性积分进去。
const MAX_COMMIT_GAP: f64 = 0.05;

/// 仿真参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// 输出端等效转动惯量（kg·m²）
    pub inertia: f64,
    /// 粘滞阻尼（Nm/(rad/s)）
    pub damping: f64,
    /// 峰值力矩（Nm）
    pub torque_limit: f64,
    /// 环境温度（°C）
    pub ambient_temperature: f64,
    /// 铜损加热系数（°C/(Nm²·s)）
    pub thermal_gain: f64,
    /// 散热速率（1/s）
    pub thermal_decay: f64,
    /// 过温保护阈值（°C）
    pub thermal_cutoff: f64,
}

impl SimParams {
    /// 按电机型号查找预设参数
    ///
    /// 未知型号返回 `None`。
    pub fn for_model(model: &str) -> Option<Self> {
        let (inertia, damping, torque_limit) = match model {
            "AK80-64" => (0.35, 0.8, 120.0),
            "AK80-9" => (0.012, 0.05, 18.0),
            "AK80-10" => (0.015, 0.06, 25.0),
            "AK70-10" => (0.012, 0.05, 24.8),
            "AK60-6" => (0.004, 0.02, 9.0),
            _ => return None,
        };
        Some(Self {
            inertia,
            damping,
            torque_limit,
            ..Self::default()
        })
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            inertia: 0.05,
            damping: 0.1,
            torque_limit: 25.0,
            ambient_temperature: 25.0,
            thermal_gain: 0.002,
            thermal_decay: 0.01,
            thermal_cutoff: 90.0,
        }
    }
}

/// 仿真执行器
#[derive(Debug)]
pub struct SimulatedActuator {
    params: SimParams,
    powered: bool,
    gains: GainKind,
    staged_position: f64,
    staged_velocity: f64,
    staged_torque: f64,
    raw_position: f64,
    origin: f64,
    velocity: f64,
    torque: f64,
    temperature: f64,
    faulted: bool,
    last_commit: Option<Instant>,
    powered_off_at: Option<Instant>,
}

impl SimulatedActuator {
    /// 使用给定参数创建仿真执行器
    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            powered: false,
            gains: GainKind::Torque,
            staged_position: 0.0,
            staged_velocity: 0.0,
            staged_torque: 0.0,
            raw_position: 0.0,
            origin: 0.0,
            velocity: 0.0,
            torque: 0.0,
            temperature: params.ambient_temperature,
            faulted: false,
            last_commit: None,
            powered_off_at: None,
        }
    }

    /// 按型号创建，未知型号使用默认参数
    pub fn for_model(model: &str) -> Self {
        let params = SimParams::for_model(model).unwrap_or_else(|| {
            debug!("No simulation preset for {}, using defaults", model);
            SimParams::default()
        });
        Self::new(params)
    }

    /// 仿真参数
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// 过温保护是否已触发
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// 以固定时间步推进仿真（不依赖墙钟）
    pub fn advance(&mut self, dt: f64) {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP);
            let position = self.raw_position - self.origin;
            let command = self.gains.kp() * (self.staged_position - position)
                + self.gains.kd() * (self.staged_velocity - self.velocity)
                + self.staged_torque;
            let limit = self.params.torque_limit;
            self.torque = if self.powered && !self.faulted {
                command.clamp(-limit, limit)
            } else {
                0.0
            };

            let accel = (self.torque - self.params.damping * self.velocity) / self.params.inertia;
            self.velocity += accel * h;
            self.raw_position += self.velocity * h;

            let heating = self.params.thermal_gain * self.torque * self.torque;
            let cooling =
                self.params.thermal_decay * (self.temperature - self.params.ambient_temperature);
            self.temperature += (heating - cooling) * h;

            if self.powered && !self.faulted && self.temperature >= self.params.thermal_cutoff {
                self.faulted = true;
                self.torque = 0.0;
                warn!(
                    "Simulated thermal cutoff tripped at {:.1}°C",
                    self.temperature
                );
            }

            remaining -= h;
        }
    }

    /// 断电期间按指数规律冷却
    fn cool_down(&mut self, seconds: f64) {
        let ambient = self.params.ambient_temperature;
        let decay = (-self.params.thermal_decay * seconds).exp();
        self.temperature = ambient + (self.temperature - ambient) * decay;
    }

    fn fault(&self) -> DriverError {
        DriverError::device(format!(
            "thermal cutoff active ({:.1}°C, limit {:.1}°C)",
            self.temperature, self.params.thermal_cutoff
        ))
    }

    fn snapshot(&self) -> Feedback {
        Feedback {
            position: self.raw_position - self.origin,
            velocity: self.velocity,
            torque: self.torque,
            temperature: self.temperature,
        }
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new(SimParams::default())
    }
}

impl MotorDriver for SimulatedActuator {
    fn power_on(&mut self) -> Result<(), DriverError> {
        if let Some(at) = self.powered_off_at.take() {
            self.cool_down(at.elapsed().as_secs_f64());
        }
        if self.temperature >= self.params.thermal_cutoff {
            return Err(self.fault());
        }
        self.faulted = false;
        self.powered = true;
        self.last_commit = Some(Instant::now());
        debug!("Simulated actuator powered on");
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), DriverError> {
        self.powered = false;
        self.torque = 0.0;
        self.gains = GainKind::Torque;
        self.last_commit = None;
        self.powered_off_at = Some(Instant::now());
        debug!("Simulated actuator powered off");
        Ok(())
    }

    fn stage_position(&mut self, position: f64) {
        self.staged_position = position;
    }

    fn stage_velocity(&mut self, velocity: f64) {
        self.staged_velocity = velocity;
    }

    fn stage_torque(&mut self, torque: f64) {
        self.staged_torque = torque;
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        if !self.powered {
            return Err(DriverError::NotStarted);
        }
        if !(self.staged_position.is_finite()
            && self.staged_velocity.is_finite()
            && self.staged_torque.is_finite())
        {
            return Err(DriverError::InvalidInput(
                "non-finite reference".to_string(),
            ));
        }

        let now = Instant::now();
        let dt = self
            .last_commit
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0)
            .min(MAX_COMMIT_GAP);
        self.last_commit = Some(now);
        self.advance(dt);
        if self.faulted {
            return Err(self.fault());
        }

        trace!(
            "sim commit: dt={:.4}s pos={:.4} vel={:.4} tau={:.3}",
            dt,
            self.raw_position - self.origin,
            self.velocity,
            self.torque
        );
        Ok(())
    }

    fn read_feedback(&mut self) -> Result<Feedback, DriverError> {
        Ok(self.snapshot())
    }

    fn set_gains(&mut self, gains: GainKind) -> Result<(), DriverError> {
        if self.faulted {
            return Err(self.fault());
        }
        self.gains = gains;
        Ok(())
    }

    fn zero_position(&mut self) -> Result<(), DriverError> {
        if !self.powered {
            return Err(DriverError::NotStarted);
        }
        self.origin = self.raw_position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered(params: SimParams) -> SimulatedActuator {
        let mut sim = SimulatedActuator::new(params);
        sim.power_on().unwrap();
        sim
    }

    #[test]
    fn test_presets() {
        assert!(SimParams::for_model("AK80-64").is_some());
        assert!(SimParams::for_model("AK70-10").is_some());
        assert!(SimParams::for_model("XYZ").is_none());
    }

    #[test]
    fn test_impedance_settles_at_target() {
        let mut sim = powered(SimParams::default());
        sim.set_gains(GainKind::Impedance { kp: 10.0, kd: 0.5 }).unwrap();
        sim.stage_position(1.0);
        sim.advance(5.0);

        let fb = sim.read_feedback().unwrap();
        assert!((fb.position - 1.0).abs() < 1e-2, "position {}", fb.position);
        assert!(fb.velocity.abs() < 1e-2);
    }

    #[test]
    fn test_torque_is_clamped() {
        let params = SimParams {
            torque_limit: 2.0,
            ..SimParams::default()
        };
        let mut sim = powered(params);
        sim.stage_torque(50.0);
        sim.advance(0.01);
        assert_eq!(sim.read_feedback().unwrap().torque, 2.0);
    }

    #[test]
    fn test_unpowered_produces_no_torque() {
        let mut sim = SimulatedActuator::default();
        sim.stage_torque(5.0);
        sim.advance(0.1);
        let fb = sim.read_feedback().unwrap();
        assert_eq!(fb.torque, 0.0);
        assert_eq!(fb.velocity, 0.0);
        assert!(matches!(sim.commit(), Err(DriverError::NotStarted)));
    }

    #[test]
    fn test_zero_position_moves_origin() {
        let mut sim = powered(SimParams::default());
        sim.stage_torque(1.0);
        sim.advance(0.5);
        assert!(sim.read_feedback().unwrap().position > 0.0);

        sim.zero_position().unwrap();
        assert_eq!(sim.read_feedback().unwrap().position, 0.0);
    }

    #[test]
    fn test_sustained_torque_heats_motor() {
        let mut sim = powered(SimParams::default());
        let ambient = sim.params().ambient_temperature;
        sim.stage_torque(20.0);
        sim.advance(2.0);
        assert!(sim.read_feedback().unwrap().temperature > ambient);
    }

    #[test]
    fn test_thermal_cutoff_latches_fault() {
        let params = SimParams {
            thermal_gain: 100.0,
            thermal_cutoff: 40.0,
            ..SimParams::default()
        };
        let mut sim = powered(params);
        sim.stage_torque(20.0);
        sim.advance(0.1);

        assert!(sim.is_faulted());
        assert_eq!(sim.read_feedback().unwrap().torque, 0.0);

        let err = sim.commit().unwrap_err();
        assert!(matches!(err, DriverError::Device(_)));
        assert!(!err.is_transient());
        assert!(matches!(
            sim.set_gains(GainKind::Torque),
            Err(DriverError::Device(_))
        ));

        sim.power_off().unwrap();
        assert!(matches!(sim.power_on(), Err(DriverError::Device(_))));
    }

    #[test]
    fn test_power_cycle_clears_fault_after_cooling() {
        let params = SimParams {
            thermal_gain: 100.0,
            thermal_cutoff: 40.0,
            thermal_decay: 1e6,
            ..SimParams::default()
        };
        let mut sim = powered(params);
        sim.stage_torque(20.0);
        sim.advance(0.001);
        assert!(sim.is_faulted());

        sim.power_off().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        sim.power_on().unwrap();
        assert!(!sim.is_faulted());
        assert!(sim.set_gains(GainKind::Torque).is_ok());
    }

    #[test]
    fn test_non_finite_reference_rejected() {
        let mut sim = powered(SimParams::default());
        sim.stage_position(f64::NAN);
        assert!(matches!(sim.commit(), Err(DriverError::InvalidInput(_))));
    }
}
