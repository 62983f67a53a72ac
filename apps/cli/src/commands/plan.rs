//! 轨迹规划预览
//!
//! 打印离散采样表，不连接执行器。

use anyhow::Result;
use clap::Args;
use tmotor_sdk::Trajectory;
use tmotor_sdk::prelude::*;

use crate::validation::{RangeValidator, duration_secs};

/// 规划命令参数
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// 起点（rad）
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub start: f64,

    /// 终点（rad）
    #[arg(short, long, allow_negative_numbers = true)]
    pub goal: f64,

    /// 时长（秒）
    #[arg(short, long, default_value_t = 1.0)]
    pub duration: f64,

    /// 轨迹曲线：minimum_jerk / cubic / linear
    #[arg(short, long, default_value_t = TrajectoryKind::MinimumJerk)]
    pub kind: TrajectoryKind,

    /// 采样频率（Hz）
    #[arg(short, long, default_value_t = 10.0)]
    pub frequency: f64,
}

impl PlanCommand {
    pub fn trajectory(&self) -> Result<Trajectory> {
        let validator = RangeValidator::position();
        let start = Rad(validator.validate(self.start)?);
        let goal = Rad(validator.validate(self.goal)?);
        Ok(Trajectory::new(
            start,
            goal,
            duration_secs(self.duration)?,
            self.kind,
        )?)
    }

    pub fn execute(&self) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            anyhow::bail!("采样频率必须为正数，得到 {}", self.frequency);
        }
        let trajectory = self.trajectory()?;
        let samples = trajectory.samples(self.frequency);

        println!(
            "📈 {} → {}，{:.3}s，{}，{} 个采样点",
            trajectory.start(),
            trajectory.goal(),
            trajectory.duration().as_secs_f64(),
            trajectory.kind(),
            samples.total_samples()
        );
        println!("{:>9}  {:>10}  {:>10}", "t (s)", "pos (rad)", "vel (rad/s)");
        for sample in samples {
            println!(
                "{:>9.3}  {:>+10.4}  {:>+10.4}",
                sample.time, sample.position.0, sample.velocity
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_rejected() {
        let command = PlanCommand {
            start: 0.0,
            goal: 1.0,
            duration: 0.0,
            kind: TrajectoryKind::Linear,
            frequency: 10.0,
        };
        assert!(command.trajectory().is_err());
    }

    #[test]
    fn test_trajectory_built() {
        let command = PlanCommand {
            start: 0.0,
            goal: -1.0,
            duration: 2.0,
            kind: TrajectoryKind::Cubic,
            frequency: 5.0,
        };
        let trajectory = command.trajectory().unwrap();
        assert_eq!(trajectory.goal(), Rad(-1.0));
        assert_eq!(trajectory.samples(5.0).total_samples(), 11);
    }
}
