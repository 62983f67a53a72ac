//! 位置命令
//!
//! 时长不超过 20ms 时按阶跃处理（收敛或超时），否则按所选曲线跟踪轨迹。

use anyhow::Result;
use clap::Args;
use tmotor_sdk::prelude::*;

use crate::connection::{ConnectionArgs, cancel_on_ctrlc, print_feedback};
use crate::validation::{RangeValidator, duration_secs};

/// 位置命令参数
#[derive(Args, Debug)]
pub struct PositionCommand {
    /// 目标位置（默认 rad）
    #[arg(short, long, allow_negative_numbers = true)]
    pub target: f64,

    /// 以角度解释目标位置
    #[arg(long)]
    pub degrees: bool,

    /// 运动时长（秒），0 表示阶跃
    #[arg(short, long, default_value_t = 1.0)]
    pub duration: f64,

    /// 轨迹曲线：minimum_jerk / cubic / linear
    #[arg(short, long, default_value_t = TrajectoryKind::MinimumJerk)]
    pub kind: TrajectoryKind,

    /// 位置增益（默认取配置）
    #[arg(long)]
    pub kp: Option<f64>,

    /// 速度增益（默认取配置）
    #[arg(long)]
    pub kd: Option<f64>,

    /// 前馈力矩（Nm）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub feedforward: f64,
}

impl PositionCommand {
    /// 目标位置（rad）
    pub fn target_rad(&self) -> Result<Rad> {
        let target = if self.degrees {
            Deg(self.target).to_rad()
        } else {
            Rad(self.target)
        };
        RangeValidator::position().validate(target.0).map(Rad)
    }

    pub fn options(&self) -> TrackOptions {
        TrackOptions {
            kp: self.kp,
            kd: self.kd,
            feedforward: NewtonMeter(self.feedforward),
            kind: self.kind,
        }
    }

    pub fn execute(&self, connection: &ConnectionArgs) -> Result<()> {
        let target = self.target_rad()?;
        let duration = duration_secs(self.duration)?;
        let cancel = cancel_on_ctrlc()?;

        let mut session = connection.open()?;
        let mut powered = session.power_on()?;
        print_feedback("⚡ 已上电", &powered);

        println!(
            "⏳ 运动到 {} ({})，时长 {:.3}s，曲线 {}",
            target,
            target.to_deg(),
            duration.as_secs_f64(),
            self.kind
        );
        let outcome = powered.track_trajectory(target, duration, &self.options(), &cancel)?;

        match outcome {
            TrackOutcome::Converged { error, elapsed } => {
                println!(
                    "✅ 已收敛：误差 {:.4} rad，用时 {:.3}s",
                    error,
                    elapsed.as_secs_f64()
                );
            },
            TrackOutcome::NotConverged { error } => {
                println!("⚠️  超时未收敛：最终误差 {:.4} rad", error);
            },
            TrackOutcome::Completed { final_position } => {
                println!("✅ 轨迹完成：最终位置 {}", final_position);
            },
            TrackOutcome::Cancelled { position } => {
                println!("🛑 已取消：停在 {}", position);
            },
        }
        print_feedback("📍", &powered);
        Ok(())
    }
}
