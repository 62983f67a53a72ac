//! 阻抗命令
//!
//! 以固定周期重复发送同一条 MIT 命令 `(p*, v*, kp, kd, τff)`，时长结束或 Ctrl-C 后停止。

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use tmotor_sdk::prelude::*;

use crate::connection::{ConnectionArgs, cancel_on_ctrlc, print_feedback};
use crate::validation::{RangeValidator, duration_secs};

/// 阻抗命令参数
#[derive(Args, Debug)]
pub struct ImpedanceCommand {
    /// 平衡位置（rad）
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub position: f64,

    /// 参考速度（rad/s）
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub velocity: f64,

    /// 位置增益（Nm/rad）
    #[arg(long)]
    pub kp: f64,

    /// 速度增益（Nm/(rad/s)）
    #[arg(long)]
    pub kd: f64,

    /// 前馈力矩（Nm）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub feedforward: f64,

    /// 保持时长（秒），0 表示只发送一次
    #[arg(short, long, default_value_t = 5.0)]
    pub duration: f64,
}

impl ImpedanceCommand {
    pub fn execute(&self, connection: &ConnectionArgs) -> Result<()> {
        let position = Rad(RangeValidator::position().validate(self.position)?);
        let duration = duration_secs(self.duration)?;
        let feedforward = NewtonMeter(self.feedforward);
        let cancel = cancel_on_ctrlc()?;

        let mut session = connection.open()?;
        let mut powered = session.power_on()?;
        let period = powered.config().control_period();

        println!(
            "⏳ 阻抗 p*={} v*={:+.3} kp={} kd={} τff={}",
            position, self.velocity, self.kp, self.kd, feedforward
        );
        let started = Instant::now();
        let mut ticks: u64 = 0;
        loop {
            powered.send_command(position, self.velocity, self.kp, self.kd, feedforward)?;
            ticks += 1;
            if cancel.is_cancelled() || started.elapsed() >= duration {
                break;
            }
            spin_sleep::sleep(period);
        }

        // 退出前松开：零增益零力矩
        powered.set_torque(NewtonMeter::ZERO, Duration::ZERO, &cancel)?;
        println!("✅ 发送 {} 个周期", ticks);
        print_feedback("📍", &powered);
        Ok(())
    }
}
