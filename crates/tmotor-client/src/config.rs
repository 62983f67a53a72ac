//! 执行器配置
//!
//! [`MotorConfig`] 构造后不可变，所有字段在 [`MotorConfigBuilder::build`] 中校验。
//! 配置也可以从 TOML 读取，字段名与构建器一致，缺省字段使用默认值：
//!
//! ```toml
//! motor_type = "AK80-64"
//! interface = "can0"
//! motor_id = 2
//! max_temperature = 80.0
//! default_kd = 2.0
//! ```

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{MotorError, Result};

/// 总线地址（电机 ID）有效范围
pub const MOTOR_ID_RANGE: RangeInclusive<u8> = 1..=32;

/// 控制循环频率（Hz）
pub const CONTROL_LOOP_FREQUENCY: f64 = 100.0;

/// 执行器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MotorConfigBuilder", into = "MotorConfigBuilder")]
pub struct MotorConfig {
    motor_type: String,
    interface: String,
    motor_id: u8,
    max_temperature: f64,
    default_kp: f64,
    default_kd: f64,
    step_timeout: Duration,
    step_tolerance: f64,
    control_period: Duration,
}

impl MotorConfig {
    /// 创建配置构建器
    pub fn builder() -> MotorConfigBuilder {
        MotorConfigBuilder::default()
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MotorError::config(e.to_string()))
    }

    /// 从 TOML 文件读取
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| MotorError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// 电机型号（如 "AK80-64"）
    pub fn motor_type(&self) -> &str {
        &self.motor_type
    }

    /// 总线接口名称（如 "can0"）
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 总线地址
    pub fn motor_id(&self) -> u8 {
        self.motor_id
    }

    /// 最高安全温度（°C）
    pub fn max_temperature(&self) -> f64 {
        self.max_temperature
    }

    /// 默认位置增益（Nm/rad）
    pub fn default_kp(&self) -> f64 {
        self.default_kp
    }

    /// 默认速度增益（Nm/(rad/s)）
    pub fn default_kd(&self) -> f64 {
        self.default_kd
    }

    /// 阶跃命令收敛超时
    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    /// 阶跃命令位置容差（rad）
    pub fn step_tolerance(&self) -> f64 {
        self.step_tolerance
    }

    /// 控制周期
    pub fn control_period(&self) -> Duration {
        self.control_period
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            motor_type: "AK80-64".to_string(),
            interface: "can0".to_string(),
            motor_id: 1,
            max_temperature: 50.0,
            default_kp: 10.0,
            default_kd: 0.5,
            step_timeout: Duration::from_secs(5),
            step_tolerance: 0.05,
            control_period: secs_to_duration(1.0 / CONTROL_LOOP_FREQUENCY),
        }
    }
}

/// 配置构建器
///
/// 时长字段以秒为单位，便于在 TOML 中书写。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotorConfigBuilder {
    pub motor_type: String,
    pub interface: String,
    pub motor_id: u8,
    pub max_temperature: f64,
    pub default_kp: f64,
    pub default_kd: f64,
    pub step_timeout: f64,
    pub step_tolerance: f64,
    pub control_period: f64,
}

impl Default for MotorConfigBuilder {
    fn default() -> Self {
        MotorConfig::default().into()
    }
}

impl MotorConfigBuilder {
    pub fn motor_type(mut self, motor_type: impl Into<String>) -> Self {
        self.motor_type = motor_type.into();
        self
    }

    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn motor_id(mut self, motor_id: u8) -> Self {
        self.motor_id = motor_id;
        self
    }

    pub fn max_temperature(mut self, celsius: f64) -> Self {
        self.max_temperature = celsius;
        self
    }

    pub fn default_kp(mut self, kp: f64) -> Self {
        self.default_kp = kp;
        self
    }

    pub fn default_kd(mut self, kd: f64) -> Self {
        self.default_kd = kd;
        self
    }

    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout.as_secs_f64();
        self
    }

    pub fn step_tolerance(mut self, tolerance: f64) -> Self {
        self.step_tolerance = tolerance;
        self
    }

    pub fn control_period(mut self, period: Duration) -> Self {
        self.control_period = period.as_secs_f64();
        self
    }

    /// 校验并构造配置
    ///
    /// # 错误
    ///
    /// - 电机 ID 不在 [`MOTOR_ID_RANGE`] 内
    /// - 接口名不是 `can<数字>` 形式
    /// - 增益为负或非有限值，温度、超时、容差、周期非正
    pub fn build(self) -> Result<MotorConfig> {
        if self.motor_type.trim().is_empty() {
            return Err(MotorError::config("motor_type must not be empty"));
        }
        if !MOTOR_ID_RANGE.contains(&self.motor_id) {
            return Err(MotorError::config(format!(
                "motor_id must be between {} and {}, got {}",
                MOTOR_ID_RANGE.start(),
                MOTOR_ID_RANGE.end(),
                self.motor_id
            )));
        }
        if !is_valid_interface(&self.interface) {
            return Err(MotorError::config(format!(
                "Invalid CAN interface: {:?}",
                self.interface
            )));
        }
        ensure_positive("max_temperature", self.max_temperature)?;
        ensure_non_negative("default_kp", self.default_kp)?;
        ensure_non_negative("default_kd", self.default_kd)?;
        ensure_positive("step_timeout", self.step_timeout)?;
        ensure_positive("step_tolerance", self.step_tolerance)?;
        ensure_positive("control_period", self.control_period)?;

        Ok(MotorConfig {
            motor_type: self.motor_type,
            interface: self.interface,
            motor_id: self.motor_id,
            max_temperature: self.max_temperature,
            default_kp: self.default_kp,
            default_kd: self.default_kd,
            step_timeout: secs_to_duration(self.step_timeout),
            step_tolerance: self.step_tolerance,
            control_period: secs_to_duration(self.control_period),
        })
    }
}

impl From<MotorConfig> for MotorConfigBuilder {
    fn from(config: MotorConfig) -> Self {
        Self {
            motor_type: config.motor_type,
            interface: config.interface,
            motor_id: config.motor_id,
            max_temperature: config.max_temperature,
            default_kp: config.default_kp,
            default_kd: config.default_kd,
            step_timeout: config.step_timeout.as_secs_f64(),
            step_tolerance: config.step_tolerance,
            control_period: config.control_period.as_secs_f64(),
        }
    }
}

impl TryFrom<MotorConfigBuilder> for MotorConfig {
    type Error = MotorError;

    fn try_from(builder: MotorConfigBuilder) -> Result<Self> {
        builder.build()
    }
}

/// 秒 → `Duration`，按纳秒四舍五入，使 0.01 精确对应 10ms
fn secs_to_duration(secs: f64) -> Duration {
    Duration::from_nanos((secs * 1e9).round() as u64)
}

/// 接口名必须形如 `can0`、`can12`
fn is_valid_interface(name: &str) -> bool {
    match name.strip_prefix("can") {
        Some(index) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn ensure_positive(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MotorError::config(format!(
            "{} must be a positive finite number, got {}",
            param, value
        )))
    }
}

fn ensure_non_negative(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotorError::config(format!(
            "{} must be a non-negative finite number, got {}",
            param, value
        )))
    }
}
