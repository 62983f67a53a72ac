//! 曲柄命令
//!
//! 上半周助力、下半周阻力的周期力矩循环，每个周期打印一行状态，Ctrl-C 结束。

use anyhow::Result;
use clap::Args;
use tmotor_sdk::CrankSample;
use tmotor_sdk::client::control::torque_profile::{
    DEFAULT_ASSIST_TORQUE, DEFAULT_RESIST_TORQUE, DEFAULT_ZONE_WIDTH,
};
use tmotor_sdk::prelude::*;

use crate::connection::{ConnectionArgs, cancel_on_ctrlc};

/// 曲柄命令参数
#[derive(Args, Debug)]
pub struct CrankCommand {
    /// 助力力矩（Nm）
    #[arg(long, default_value_t = DEFAULT_ASSIST_TORQUE, allow_negative_numbers = true)]
    pub assist: f64,

    /// 阻力力矩（Nm）
    #[arg(long, default_value_t = DEFAULT_RESIST_TORQUE, allow_negative_numbers = true)]
    pub resist: f64,

    /// 过渡区宽度（rad）
    #[arg(long, default_value_t = DEFAULT_ZONE_WIDTH)]
    pub zone: f64,

    /// 每 N 个周期打印一次（1 表示每个周期）
    #[arg(long, default_value_t = 1)]
    pub print_every: u64,
}

impl CrankCommand {
    pub fn profile(&self) -> Result<TorqueProfile> {
        Ok(TorqueProfile::new(
            NewtonMeter(self.assist),
            NewtonMeter(self.resist),
            Rad(self.zone),
        )?)
    }

    pub fn execute(&self, connection: &ConnectionArgs) -> Result<()> {
        let profile = self.profile()?;
        let every = self.print_every.max(1);
        let cancel = cancel_on_ctrlc()?;

        let mut session = connection.open()?;
        let mut powered = session.power_on()?;

        println!(
            "🔄 曲柄循环：助力 {}，阻力 {}，过渡区 {}（Ctrl-C 结束）",
            profile.assist(),
            profile.resist(),
            profile.zone()
        );
        let ticks = powered.run_periodic_torque(&profile, &cancel, |sample: &CrankSample| {
            if sample.tick % every == 0 {
                println!(
                    "[{:>8.3}s] angle={:+.4} rad ({:+7.1}°)  vel={:+.3} rad/s  tau={:+.3} Nm{}",
                    sample.elapsed.as_secs_f64(),
                    sample.angle.0,
                    sample.angle.wrap_two_pi().to_deg().0,
                    sample.velocity,
                    sample.torque.0,
                    if sample.stale { "  (stale)" } else { "" }
                );
            }
        })?;

        println!("✅ 曲柄循环结束：{} 个周期", ticks);
        Ok(())
    }
}
