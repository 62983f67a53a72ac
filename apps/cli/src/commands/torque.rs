//! 力矩命令

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tmotor_sdk::prelude::*;

use crate::connection::{ConnectionArgs, cancel_on_ctrlc, print_feedback, wait_for_cancel};
use crate::validation::duration_secs;

/// 力矩命令参数
#[derive(Args, Debug)]
pub struct TorqueCommand {
    /// 目标力矩（Nm）
    #[arg(short, long, allow_negative_numbers = true)]
    pub target: f64,

    /// 保持时长（秒），0 表示保持到 Ctrl-C
    #[arg(short, long, default_value_t = 1.0)]
    pub duration: f64,
}

impl TorqueCommand {
    pub fn execute(&self, connection: &ConnectionArgs) -> Result<()> {
        let duration = duration_secs(self.duration)?;
        let torque = NewtonMeter(self.target);
        let cancel = cancel_on_ctrlc()?;

        let mut session = connection.open()?;
        let mut powered = session.power_on()?;

        println!("⏳ 力矩 {}，时长 {:?}", torque, duration);
        match powered.set_torque(torque, duration, &cancel)? {
            HoldOutcome::Latched => {
                wait_for_cancel(&mut powered, &cancel)?;
                powered.set_torque(NewtonMeter::ZERO, Duration::ZERO, &cancel)?;
                println!("🛑 已停止");
            },
            HoldOutcome::Completed { ticks } => println!("✅ 完成：{} 个周期", ticks),
            HoldOutcome::Cancelled { ticks } => println!("🛑 已取消：{} 个周期", ticks),
        }
        print_feedback("📍", &powered);
        Ok(())
    }
}
