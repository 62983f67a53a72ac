//! 周期力矩（曲柄）流程
//!
//! 每个周期根据当前角度查询 [`TorqueProfile`]，以单次力矩命令写入，并把采样回调给调用者。
//! 流程没有时长上限，只能通过 [`CancelToken`] 结束；结束时写入零力矩。

use std::time::{Duration, Instant};

use tmotor_driver::{GainKind, MotorDriver};
use tracing::info;

use super::cancel::CancelToken;
use super::torque_profile::TorqueProfile;
use crate::state::ActuatorSession;
use crate::types::{NewtonMeter, Rad, Result};

/// 曲柄流程的单周期采样
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrankSample {
    /// 周期序号（从 0 开始）
    pub tick: u64,
    /// 自流程开始的时长
    pub elapsed: Duration,
    /// 用于查询力矩曲线的角度
    pub angle: Rad,
    /// 写入后读到的速度（rad/s）
    pub velocity: f64,
    /// 本周期命令的力矩
    pub torque: NewtonMeter,
    /// 本周期反馈是否陈旧
    pub stale: bool,
}

impl<D: MotorDriver> ActuatorSession<D> {
    /// 运行周期力矩流程，返回执行的周期数
    pub fn run_periodic_torque(
        &mut self,
        profile: &TorqueProfile,
        cancel: &CancelToken,
        mut on_tick: impl FnMut(&CrankSample),
    ) -> Result<u64> {
        self.ensure_enabled()?;
        self.arm(GainKind::Torque)?;
        info!(
            "Periodic torque started: assist {}, resist {}, zone {}",
            profile.assist(),
            profile.resist(),
            profile.zone()
        );

        let period = self.config().control_period();
        let started = Instant::now();
        let mut ticks: u64 = 0;
        while !cancel.is_cancelled() {
            let angle = self.position();
            let torque = profile.torque_at(angle);
            let read = self.write(angle.0, 0.0, torque.0);

            on_tick(&CrankSample {
                tick: ticks,
                elapsed: started.elapsed(),
                angle,
                velocity: read.feedback().velocity,
                torque,
                stale: read.is_stale(),
            });
            ticks += 1;

            spin_sleep::sleep(period);
        }

        let position = self.feedback().position;
        self.write(position, 0.0, 0.0);
        info!("Periodic torque stopped after {} ticks", ticks);
        Ok(ticks)
    }
}
