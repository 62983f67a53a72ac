//! 控制模式
//!
//! 在 [`ActuatorSession`] 上实现四种命令流程：
//!
//! | 流程 | 增益 | 循环 |
//! |------|------|------|
//! | [`track_trajectory`](ActuatorSession::track_trajectory) | 位置 + 速度 | 阶跃收敛 / 轨迹跟踪 |
//! | [`set_velocity`](ActuatorSession::set_velocity) | 仅速度 | 保持时长后零速停止 |
//! | [`set_torque`](ActuatorSession::set_torque) | 零增益 | 保持时长后零力矩停止 |
//! | [`send_command`](ActuatorSession::send_command) | 调用者指定 | 单次写入 |
//!
//! 所有循环以配置的固定周期（默认 10ms）运行，不做漂移补偿；每个周期检查一次
//! [`CancelToken`]，取消后写入安全停止命令再返回。

use std::time::{Duration, Instant};

use tmotor_driver::{GainKind, MotorDriver};
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::trajectory::{Trajectory, TrajectoryKind};
use crate::state::{ActuatorSession, FeedbackRead};
use crate::types::{MotorError, NewtonMeter, Rad, Result};

/// 时长不超过该阈值的位置命令按阶跃处理
pub const STEP_COMMAND_THRESHOLD: Duration = Duration::from_millis(20);

/// 位置跟踪选项
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackOptions {
    /// 位置增益，`None` 时使用配置默认值
    pub kp: Option<f64>,
    /// 速度增益，`None` 时使用配置默认值
    pub kd: Option<f64>,
    /// 每个周期叠加的前馈力矩
    pub feedforward: NewtonMeter,
    /// 轨迹曲线
    pub kind: TrajectoryKind,
}

impl TrackOptions {
    pub fn with_gains(mut self, kp: f64, kd: f64) -> Self {
        self.kp = Some(kp);
        self.kd = Some(kd);
        self
    }

    pub fn with_feedforward(mut self, torque: NewtonMeter) -> Self {
        self.feedforward = torque;
        self
    }

    pub fn with_kind(mut self, kind: TrajectoryKind) -> Self {
        self.kind = kind;
        self
    }
}

/// 位置跟踪结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackOutcome {
    /// 阶跃命令在超时前收敛
    Converged {
        /// 最终位置误差（rad）
        error: f64,
        elapsed: Duration,
    },
    /// 阶跃命令超时未收敛（非致命）
    NotConverged {
        /// 超时时的位置误差（rad）
        error: f64,
    },
    /// 轨迹执行完毕（含最终校正写入）
    Completed { final_position: Rad },
    /// 被取消，执行器保持在取消时的位置
    Cancelled { position: Rad },
}

impl TrackOutcome {
    /// 是否到达目标（收敛或轨迹完成）
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Converged { .. } | Self::Completed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// 速度/力矩保持结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// 时长为 0：命令已写入并无限期保持
    Latched,
    /// 保持到时长结束并已写入零值停止
    Completed { ticks: u64 },
    /// 被取消并已写入零值停止
    Cancelled { ticks: u64 },
}

fn ensure_finite(param: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MotorError::invalid_parameter(
            param,
            format!("must be finite, got {}", value),
        ))
    }
}

fn ensure_gain(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotorError::invalid_parameter(
            param,
            format!("gain must be finite and non-negative, got {}", value),
        ))
    }
}

impl<D: MotorDriver> ActuatorSession<D> {
    /// 运动到目标位置
    ///
    /// - `duration <= 20ms`：阶跃模式。每个周期写入目标，误差小于配置容差即收敛；
    ///   超过配置的阶跃超时返回 [`TrackOutcome::NotConverged`]（不是错误）。
    /// - 更长时长：按 `options.kind` 在墙钟经过时间处采样轨迹，每周期写入一次，
    ///   结束后再写入一次精确目标。
    ///
    /// 前馈力矩在每次写入中生效。
    pub fn track_trajectory(
        &mut self,
        goal: Rad,
        duration: Duration,
        options: &TrackOptions,
        cancel: &CancelToken,
    ) -> Result<TrackOutcome> {
        self.ensure_enabled()?;
        ensure_finite("goal", goal.0)?;
        ensure_finite("feedforward", options.feedforward.0)?;
        let kp = options.kp.unwrap_or(self.config().default_kp());
        let kd = options.kd.unwrap_or(self.config().default_kd());
        ensure_gain("kp", kp)?;
        ensure_gain("kd", kd)?;

        self.arm(GainKind::Impedance { kp, kd })?;

        if duration <= STEP_COMMAND_THRESHOLD {
            self.step_to(goal, options.feedforward, cancel)
        } else {
            self.follow_trajectory(goal, duration, options, cancel)
        }
    }

    fn step_to(
        &mut self,
        goal: Rad,
        feedforward: NewtonMeter,
        cancel: &CancelToken,
    ) -> Result<TrackOutcome> {
        let tolerance = self.config().step_tolerance();
        let timeout = self.config().step_timeout();
        let period = self.config().control_period();
        info!(
            "Step command to {} (tolerance {:.3} rad, timeout {:?})",
            goal, tolerance, timeout
        );

        let started = Instant::now();
        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancel_track());
            }

            let read = self.write(goal.0, 0.0, feedforward.0);
            let error = (read.feedback().position - goal.0).abs();
            if error < tolerance {
                let elapsed = started.elapsed();
                info!(
                    "Step converged: error {:.4} rad after {:.3}s",
                    error,
                    elapsed.as_secs_f64()
                );
                return Ok(TrackOutcome::Converged { error, elapsed });
            }

            if started.elapsed() >= timeout {
                warn!(
                    "Step did not converge within {:?}: final error {:.4} rad (tolerance {:.3})",
                    timeout, error, tolerance
                );
                return Ok(TrackOutcome::NotConverged { error });
            }

            spin_sleep::sleep(period);
        }
    }

    fn follow_trajectory(
        &mut self,
        goal: Rad,
        duration: Duration,
        options: &TrackOptions,
        cancel: &CancelToken,
    ) -> Result<TrackOutcome> {
        let start = self.position();
        let trajectory = Trajectory::new(start, goal, duration, options.kind)?;
        let period = self.config().control_period();
        let feedforward = options.feedforward.0;
        info!(
            "Trajectory {} -> {} over {:.3}s ({})",
            start,
            goal,
            duration.as_secs_f64(),
            options.kind
        );

        let started = Instant::now();
        let mut ticks: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancel_track());
            }

            let elapsed = started.elapsed();
            if elapsed >= duration {
                break;
            }

            let (position, velocity) = trajectory.sample_at(elapsed);
            let read = self.write(position.0, velocity, feedforward);
            if read.is_stale() {
                debug!("Trajectory tick {} used stale feedback", ticks);
            }
            ticks += 1;

            spin_sleep::sleep(period);
        }

        let read = self.write(goal.0, 0.0, feedforward);
        let final_position = Rad(read.feedback().position);
        info!(
            "Trajectory finished after {} ticks at {} (target {})",
            ticks, final_position, goal
        );
        Ok(TrackOutcome::Completed { final_position })
    }

    /// 取消位置跟踪：保持当前位置
    fn cancel_track(&mut self) -> TrackOutcome {
        let position = self.feedback().position;
        self.write(position, 0.0, 0.0);
        info!("Position tracking cancelled at {}", Rad(position));
        TrackOutcome::Cancelled {
            position: Rad(position),
        }
    }

    /// 速度控制
    ///
    /// `duration` 为 0 时写入一次并返回 [`HoldOutcome::Latched`]，执行器保持该速度；
    /// 否则在时长内每周期写入，结束或取消后写入零速度。
    /// `kd` 为 `None` 时使用配置默认值。
    pub fn set_velocity(
        &mut self,
        velocity: f64,
        kd: Option<f64>,
        duration: Duration,
        cancel: &CancelToken,
    ) -> Result<HoldOutcome> {
        self.ensure_enabled()?;
        ensure_finite("velocity", velocity)?;
        let kd = kd.unwrap_or(self.config().default_kd());
        ensure_gain("kd", kd)?;

        self.arm(GainKind::Velocity { kd })?;
        info!(
            "Velocity command {:.3} rad/s (kd={}) for {:?}",
            velocity, kd, duration
        );
        self.hold(duration, cancel, |s| {
            let position = s.feedback().position;
            s.write(position, velocity, 0.0)
        })
    }

    /// 力矩控制
    ///
    /// 时长语义与 [`set_velocity`](Self::set_velocity) 相同，停止时写入零力矩。
    pub fn set_torque(
        &mut self,
        torque: NewtonMeter,
        duration: Duration,
        cancel: &CancelToken,
    ) -> Result<HoldOutcome> {
        self.ensure_enabled()?;
        ensure_finite("torque", torque.0)?;

        self.arm(GainKind::Torque)?;
        info!("Torque command {} for {:?}", torque, duration);
        self.hold(duration, cancel, |s| {
            let position = s.feedback().position;
            s.write(position, 0.0, torque.0)
        })
    }

    /// 单次 MIT 命令，不进入循环
    pub fn send_command(
        &mut self,
        position: Rad,
        velocity: f64,
        kp: f64,
        kd: f64,
        feedforward: NewtonMeter,
    ) -> Result<FeedbackRead> {
        self.ensure_enabled()?;
        ensure_finite("position", position.0)?;
        ensure_finite("velocity", velocity)?;
        ensure_finite("feedforward", feedforward.0)?;
        ensure_gain("kp", kp)?;
        ensure_gain("kd", kd)?;

        self.arm(GainKind::Impedance { kp, kd })?;
        Ok(self.write(position.0, velocity, feedforward.0))
    }

    fn hold(
        &mut self,
        duration: Duration,
        cancel: &CancelToken,
        mut command: impl FnMut(&mut Self) -> FeedbackRead,
    ) -> Result<HoldOutcome> {
        if duration.is_zero() {
            command(self);
            return Ok(HoldOutcome::Latched);
        }

        let period = self.config().control_period();
        let started = Instant::now();
        let mut ticks: u64 = 0;
        let mut cancelled = false;
        while started.elapsed() < duration {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            command(self);
            ticks += 1;
            spin_sleep::sleep(period);
        }

        let position = self.feedback().position;
        self.write(position, 0.0, 0.0);

        if cancelled {
            info!("Hold cancelled after {} ticks, actuator stopped", ticks);
            Ok(HoldOutcome::Cancelled { ticks })
        } else {
            info!("Hold finished after {} ticks, actuator stopped", ticks);
            Ok(HoldOutcome::Completed { ticks })
        }
    }
}
