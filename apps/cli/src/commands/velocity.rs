//! 速度命令

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tmotor_sdk::prelude::*;

use crate::connection::{ConnectionArgs, cancel_on_ctrlc, print_feedback, wait_for_cancel};
use crate::validation::duration_secs;

/// 速度命令参数
#[derive(Args, Debug)]
pub struct VelocityCommand {
    /// 目标速度（rad/s）
    #[arg(short, long, allow_negative_numbers = true)]
    pub target: f64,

    /// 速度增益（默认取配置）
    #[arg(long)]
    pub kd: Option<f64>,

    /// 保持时长（秒），0 表示保持到 Ctrl-C
    #[arg(short, long, default_value_t = 1.0)]
    pub duration: f64,
}

impl VelocityCommand {
    pub fn execute(&self, connection: &ConnectionArgs) -> Result<()> {
        let duration = duration_secs(self.duration)?;
        let cancel = cancel_on_ctrlc()?;

        let mut session = connection.open()?;
        let mut powered = session.power_on()?;

        println!("⏳ 速度 {:+.3} rad/s，时长 {:?}", self.target, duration);
        match powered.set_velocity(self.target, self.kd, duration, &cancel)? {
            HoldOutcome::Latched => {
                wait_for_cancel(&mut powered, &cancel)?;
                powered.set_velocity(0.0, self.kd, Duration::ZERO, &cancel)?;
                println!("🛑 已停止");
            },
            HoldOutcome::Completed { ticks } => println!("✅ 完成：{} 个周期", ticks),
            HoldOutcome::Cancelled { ticks } => println!("🛑 已取消：{} 个周期", ticks),
        }
        print_feedback("📍", &powered);
        Ok(())
    }
}
