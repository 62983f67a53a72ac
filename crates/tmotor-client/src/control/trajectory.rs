//! 轨迹生成器
//!
//! 把 `(起点, 终点, 时长)` 转换为随时间变化的位置/速度参考。
//!
//! # 算法
//!
//! 归一化时间 `τ = t / T`，位置 `p = p0 + Δ·s(τ)`，速度 `v = Δ·s'(τ)`：
//!
//! ```text
//! minimum_jerk: s = 10τ³ − 15τ⁴ + 6τ⁵       s' = (30τ² − 60τ³ + 30τ⁴) / T
//! cubic:        s = −2τ³ + 3τ²              s' = (−6τ² + 6τ) / T
//! linear:       s = τ                       s' = 1 / T
//! ```
//!
//! - **minimum_jerk**: 两端速度、加速度均为 0（五次多项式边界条件）
//! - **cubic**: 两端速度为 0，加速度不连续
//! - **linear**: 匀速，两端速度阶跃
//!
//! `t >= T` 时所有曲线都返回 `(终点, 0)`，保证不会越过目标且末速度为 0。
//! 原始函数在 `T = 0` 时无定义（除零），由调用者转入阶跃模式；
//! [`Trajectory`] 描述符在构造时拒绝非正时长。
//!
//! # 示例
//!
//! ```rust
//! use tmotor_client::control::trajectory::minimum_jerk;
//!
//! let (p, v) = minimum_jerk(0.0, 1.5708, 1.0, 2.0);
//! assert!((p - 0.7854).abs() < 1e-4);
//! assert!((v - 1.4726).abs() < 1e-4);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{MotorError, Rad, Result};

/// 最小加加速度（五次多项式）轨迹
pub fn minimum_jerk(start: f64, end: f64, t: f64, duration: f64) -> (f64, f64) {
    if t >= duration {
        return (end, 0.0);
    }

    let tau = t / duration;
    let delta = end - start;
    let tau2 = tau * tau;
    let tau3 = tau2 * tau;

    let s = 10.0 * tau3 - 15.0 * tau3 * tau + 6.0 * tau3 * tau2;
    let s_dot = (30.0 * tau2 - 60.0 * tau3 + 30.0 * tau2 * tau2) / duration;

    (start + delta * s, delta * s_dot)
}

/// 三次多项式轨迹
pub fn cubic(start: f64, end: f64, t: f64, duration: f64) -> (f64, f64) {
    if t >= duration {
        return (end, 0.0);
    }

    let tau = t / duration;
    let delta = end - start;

    let s = -2.0 * tau * tau * tau + 3.0 * tau * tau;
    let s_dot = (-6.0 * tau * tau + 6.0 * tau) / duration;

    (start + delta * s, delta * s_dot)
}

/// 线性插值轨迹
pub fn linear(start: f64, end: f64, t: f64, duration: f64) -> (f64, f64) {
    if t >= duration {
        return (end, 0.0);
    }

    let velocity = (end - start) / duration;
    (start + velocity * t, velocity)
}

/// 轨迹曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrajectoryKind {
    #[default]
    MinimumJerk,
    Cubic,
    Linear,
}

impl TrajectoryKind {
    /// 所有曲线类型
    pub const ALL: [TrajectoryKind; 3] = [Self::MinimumJerk, Self::Cubic, Self::Linear];

    /// 在时刻 `t`（秒）采样 `(position, velocity)`
    #[inline]
    pub fn sample(self, start: f64, end: f64, t: f64, duration: f64) -> (f64, f64) {
        match self {
            Self::MinimumJerk => minimum_jerk(start, end, t, duration),
            Self::Cubic => cubic(start, end, t, duration),
            Self::Linear => linear(start, end, t, duration),
        }
    }

    /// 名称（与 `FromStr` 互逆）
    pub fn name(self) -> &'static str {
        match self {
            Self::MinimumJerk => "minimum_jerk",
            Self::Cubic => "cubic",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for TrajectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrajectoryKind {
    type Err = MotorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minimum_jerk" => Ok(Self::MinimumJerk),
            "cubic" => Ok(Self::Cubic),
            "linear" => Ok(Self::Linear),
            other => Err(MotorError::invalid_parameter(
                "trajectory_kind",
                format!("unknown trajectory type: {}", other),
            )),
        }
    }
}

/// 轨迹描述符
///
/// 纯值类型，每次运动重新构造。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    start: Rad,
    goal: Rad,
    duration: Duration,
    kind: TrajectoryKind,
}

impl Trajectory {
    /// 创建轨迹描述符
    ///
    /// # 错误
    ///
    /// 时长为 0 或起止点非有限值时返回 `InvalidParameter`。
    pub fn new(start: Rad, goal: Rad, duration: Duration, kind: TrajectoryKind) -> Result<Self> {
        if duration.is_zero() {
            return Err(MotorError::invalid_parameter(
                "duration",
                "trajectory duration must be positive",
            ));
        }
        if !start.0.is_finite() || !goal.0.is_finite() {
            return Err(MotorError::invalid_parameter(
                "position",
                "trajectory endpoints must be finite",
            ));
        }
        Ok(Self {
            start,
            goal,
            duration,
            kind,
        })
    }

    pub fn start(&self) -> Rad {
        self.start
    }

    pub fn goal(&self) -> Rad {
        self.goal
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn kind(&self) -> TrajectoryKind {
        self.kind
    }

    /// 在经过时间 `elapsed` 处采样
    pub fn sample_at(&self, elapsed: Duration) -> (Rad, f64) {
        let (p, v) = self.kind.sample(
            self.start.0,
            self.goal.0,
            elapsed.as_secs_f64(),
            self.duration.as_secs_f64(),
        );
        (Rad(p), v)
    }

    /// 以固定频率离散采样的迭代器
    ///
    /// 采样点覆盖 `[0, T]` 两端，最后一个点恰好是 `(goal, 0)`。
    ///
    /// # Panics
    ///
    /// `frequency_hz` 不是正数时 panic。
    pub fn samples(&self, frequency_hz: f64) -> TrajectorySamples {
        assert!(
            frequency_hz > 0.0,
            "frequency_hz must be positive, got: {}",
            frequency_hz
        );
        let total_samples = (self.duration.as_secs_f64() * frequency_hz).ceil() as usize + 1;
        TrajectorySamples {
            trajectory: *self,
            period: 1.0 / frequency_hz,
            current_index: 0,
            total_samples,
        }
    }
}

/// 离散采样点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// 距起点的时间（秒）
    pub time: f64,
    pub position: Rad,
    /// 速度（rad/s）
    pub velocity: f64,
}

/// 轨迹采样迭代器
///
/// 由 [`Trajectory::samples`] 创建，按需生成采样点。
#[derive(Debug, Clone)]
pub struct TrajectorySamples {
    trajectory: Trajectory,
    period: f64,
    current_index: usize,
    total_samples: usize,
}

impl TrajectorySamples {
    /// 重置到起点
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    /// 总采样点数
    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// 当前进度（0.0 到 1.0）
    pub fn progress(&self) -> f64 {
        (self.current_index as f64) / (self.total_samples as f64)
    }
}

impl Iterator for TrajectorySamples {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.total_samples {
            return None;
        }

        let duration = self.trajectory.duration.as_secs_f64();
        // 最后一个点固定在 T，避免 `k·(1/f)` 的舍入误差落在 T 之前
        let time = if self.current_index + 1 == self.total_samples {
            duration
        } else {
            (self.current_index as f64 * self.period).min(duration)
        };
        let (position, velocity) = self.trajectory.kind.sample(
            self.trajectory.start.0,
            self.trajectory.goal.0,
            time,
            duration,
        );
        self.current_index += 1;

        Some(TrajectorySample {
            time,
            position: Rad(position),
            velocity,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_samples - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrajectorySamples {}
