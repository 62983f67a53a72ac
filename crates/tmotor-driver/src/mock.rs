//! Mock 驱动
//!
//! 无硬件依赖的测试替身。`MockDriver` 可 `Clone`，所有克隆共享同一份内部状态，
//! 因此测试可以把一个克隆交给会话，保留另一个克隆作为探针检查调用记录、
//! 注入故障或改写反馈。

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{DriverError, Feedback, GainKind, MotorDriver};

/// 驱动调用记录
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    PowerOn,
    PowerOff,
    SetGains(GainKind),
    /// 一次 `commit()`，携带当时暂存的参考值
    Commit {
        position: f64,
        velocity: f64,
        torque: f64,
    },
    ZeroPosition,
}

/// 反馈跟随行为
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    /// 反馈保持不变（只能通过 `set_feedback` 修改）
    #[default]
    Hold,
    /// 每次 `commit()` 后反馈立即等于暂存参考
    ///
    /// 位置只在 kp > 0 时跟随，模拟阻抗模式下“一个周期到位”的理想执行器。
    Follow,
}

#[derive(Debug, Default)]
struct Staged {
    position: f64,
    velocity: f64,
    torque: f64,
}

#[derive(Debug, Default)]
struct MockState {
    powered: bool,
    staged: Staged,
    gains: Option<GainKind>,
    feedback: Feedback,
    tracking: Tracking,
    calls: Vec<DriverCall>,
    fail_power_on: bool,
    fail_power_off: bool,
    fail_commits: usize,
    fail_reads: usize,
}

/// 可编程的 Mock 驱动
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// 创建新的 Mock 驱动（反馈保持不变）
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建反馈跟随参考值的 Mock 驱动
    pub fn following() -> Self {
        let driver = Self::default();
        driver.state.lock().tracking = Tracking::Follow;
        driver
    }

    /// 设置反馈跟随行为
    pub fn set_tracking(&self, tracking: Tracking) {
        self.state.lock().tracking = tracking;
    }

    /// 直接改写反馈
    pub fn set_feedback(&self, feedback: Feedback) {
        self.state.lock().feedback = feedback;
    }

    /// 下一次 `power_on()` 是否失败
    pub fn fail_power_on(&self, fail: bool) {
        self.state.lock().fail_power_on = fail;
    }

    /// 下一次 `power_off()` 是否失败
    pub fn fail_power_off(&self, fail: bool) {
        self.state.lock().fail_power_off = fail;
    }

    /// 让接下来的 `count` 次 `commit()` 以超时失败
    pub fn fail_next_commits(&self, count: usize) {
        self.state.lock().fail_commits = count;
    }

    /// 让接下来的 `count` 次 `read_feedback()` 以超时失败
    pub fn fail_next_reads(&self, count: usize) {
        self.state.lock().fail_reads = count;
    }

    /// 全部调用记录
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    /// 清空调用记录
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// 驱动当前是否上电
    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    /// 当前选定的增益模式
    pub fn gains(&self) -> Option<GainKind> {
        self.state.lock().gains
    }

    /// 当前反馈
    pub fn feedback(&self) -> Feedback {
        self.state.lock().feedback
    }

    /// 指定调用出现的次数
    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// 成功的 `commit()` 次数
    pub fn commit_count(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::Commit { .. }))
    }

    /// 最后一次成功 `commit()` 的参考值 `(position, velocity, torque)`
    pub fn last_commit(&self) -> Option<(f64, f64, f64)> {
        self.state.lock().calls.iter().rev().find_map(|c| match *c {
            DriverCall::Commit {
                position,
                velocity,
                torque,
            } => Some((position, velocity, torque)),
            _ => None,
        })
    }
}

impl MotorDriver for MockDriver {
    fn power_on(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.fail_power_on {
            return Err(DriverError::PowerSequence(
                "mock power-on failure".to_string(),
            ));
        }
        state.powered = true;
        state.calls.push(DriverCall::PowerOn);
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.push(DriverCall::PowerOff);
        if state.fail_power_off {
            return Err(DriverError::PowerSequence(
                "mock power-off failure".to_string(),
            ));
        }
        state.powered = false;
        state.gains = None;
        Ok(())
    }

    fn stage_position(&mut self, position: f64) {
        self.state.lock().staged.position = position;
    }

    fn stage_velocity(&mut self, velocity: f64) {
        self.state.lock().staged.velocity = velocity;
    }

    fn stage_torque(&mut self, torque: f64) {
        self.state.lock().staged.torque = torque;
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if !state.powered {
            return Err(DriverError::NotStarted);
        }
        if state.fail_commits > 0 {
            state.fail_commits -= 1;
            return Err(DriverError::Timeout);
        }

        let (position, velocity, torque) =
            (state.staged.position, state.staged.velocity, state.staged.torque);
        state.calls.push(DriverCall::Commit {
            position,
            velocity,
            torque,
        });

        if state.tracking == Tracking::Follow {
            let kp = state.gains.map(|g| g.kp()).unwrap_or(0.0);
            if kp > 0.0 {
                state.feedback.position = position;
            }
            state.feedback.velocity = velocity;
            state.feedback.torque = torque;
        }
        Ok(())
    }

    fn read_feedback(&mut self) -> Result<Feedback, DriverError> {
        let mut state = self.state.lock();
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(DriverError::Timeout);
        }
        Ok(state.feedback)
    }

    fn set_gains(&mut self, gains: GainKind) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.gains = Some(gains);
        state.calls.push(DriverCall::SetGains(gains));
        Ok(())
    }

    fn zero_position(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if !state.powered {
            return Err(DriverError::NotStarted);
        }
        state.feedback.position = 0.0;
        state.calls.push(DriverCall::ZeroPosition);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let probe = MockDriver::new();
        let mut driver = probe.clone();

        driver.power_on().unwrap();
        assert!(probe.is_powered());
        assert_eq!(probe.calls(), vec![DriverCall::PowerOn]);
    }

    #[test]
    fn test_commit_requires_power() {
        let mut driver = MockDriver::new();
        assert!(matches!(driver.commit(), Err(DriverError::NotStarted)));
    }

    #[test]
    fn test_follow_tracks_position_only_with_kp() {
        let mut driver = MockDriver::following();
        driver.power_on().unwrap();

        driver.set_gains(GainKind::Velocity { kd: 1.0 }).unwrap();
        driver.stage_position(1.0);
        driver.stage_velocity(0.5);
        driver.commit().unwrap();
        let fb = driver.read_feedback().unwrap();
        assert_eq!(fb.position, 0.0);
        assert_eq!(fb.velocity, 0.5);

        driver.set_gains(GainKind::Impedance { kp: 5.0, kd: 0.5 }).unwrap();
        driver.commit().unwrap();
        assert_eq!(driver.read_feedback().unwrap().position, 1.0);
    }

    #[test]
    fn test_injected_commit_failures() {
        let probe = MockDriver::new();
        let mut driver = probe.clone();
        driver.power_on().unwrap();
        probe.fail_next_commits(2);

        assert!(driver.commit().unwrap_err().is_transient());
        assert!(driver.commit().is_err());
        assert!(driver.commit().is_ok());
        assert_eq!(probe.commit_count(), 1);
    }

    #[test]
    fn test_last_commit() {
        let probe = MockDriver::new();
        let mut driver = probe.clone();
        driver.power_on().unwrap();
        assert_eq!(probe.last_commit(), None);

        driver.stage_position(0.3);
        driver.stage_velocity(0.1);
        driver.stage_torque(2.0);
        driver.commit().unwrap();
        assert_eq!(probe.last_commit(), Some((0.3, 0.1, 2.0)));
    }
}
