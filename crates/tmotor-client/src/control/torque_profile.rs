//! 双过渡区周期力矩曲线
//!
//! 用于曲柄类周期运动：上半周（0 ~ π）输出助力力矩，下半周（π ~ 2π）输出阻力力矩，
//! 在 π 与 0/2π 附近各有一个宽度为 `zone` 的余弦过渡区：
//!
//! ```text
//!  力矩
//!   Ta ┤‾‾‾‾‾‾‾‾‾‾‾‾‾‾╮                     ╭‾‾
//!      │               ╲                   ╱
//!   Tr ┤                ╰‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╯
//!      └──┴────────────┴──────────────────┴──── 角度
//!         0            π                  2π
//! ```
//!
//! 过渡区内使用半余弦缓动 `c = (1 − cos(π·ratio)) / 2`，两端斜率为 0，
//! 所以输出处处连续，且在过渡区边界可导；输出永远落在 `[min(Ta,Tr), max(Ta,Tr)]` 内。
//! 两个过渡区不能重叠，要求 `zone < π`。

use std::f64::consts::{PI, TAU};

use crate::types::{MotorError, NewtonMeter, Rad, Result};

/// 默认助力力矩（Nm）
pub const DEFAULT_ASSIST_TORQUE: f64 = 15.0;

/// 默认阻力力矩（Nm）
pub const DEFAULT_RESIST_TORQUE: f64 = -5.0;

/// 默认过渡区宽度（rad，约 20°）
pub const DEFAULT_ZONE_WIDTH: f64 = 0.349;

/// 半余弦缓动权重：`ratio = 0` 时为 0，`ratio = 1` 时为 1
#[inline]
fn cosine_ease(ratio: f64) -> f64 {
    (1.0 - (PI * ratio).cos()) / 2.0
}

/// 计算给定角度的力矩（原始函数，不做参数校验）
///
/// - `angle`: 任意实数角度（rad），内部归一化到 [0, 2π)
/// - `assist`: 助力力矩 Ta
/// - `resist`: 阻力力矩 Tr
/// - `zone`: 过渡区宽度 Z，调用者保证 `0 < Z < π`
pub fn smooth_transition(angle: f64, assist: f64, resist: f64, zone: f64) -> f64 {
    let half_zone = zone / 2.0;
    let angle = angle.rem_euclid(TAU);

    // 过渡区 1：π 附近，Ta → Tr
    if (PI - half_zone..=PI + half_zone).contains(&angle) {
        let ratio = (angle - (PI - half_zone)) / zone;
        let c = cosine_ease(ratio);
        return assist * (1.0 - c) + resist * c;
    }

    // 过渡区 2：0/2π 附近，Tr → Ta；先映射到 (−π, π] 使区间连续
    let wrapped = if angle <= PI { angle } else { angle - TAU };
    if wrapped.abs() <= half_zone {
        let ratio = (wrapped + half_zone) / zone;
        let c = cosine_ease(ratio);
        return resist * (1.0 - c) + assist * c;
    }

    if angle < PI { assist } else { resist }
}

/// 周期力矩曲线参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueProfile {
    assist: NewtonMeter,
    resist: NewtonMeter,
    zone: Rad,
}

impl TorqueProfile {
    /// 创建力矩曲线
    ///
    /// # 错误
    ///
    /// 力矩非有限值，或过渡区宽度不在 `(0, π)` 内时返回 `InvalidParameter`。
    pub fn new(assist: NewtonMeter, resist: NewtonMeter, zone: Rad) -> Result<Self> {
        if !assist.0.is_finite() || !resist.0.is_finite() {
            return Err(MotorError::invalid_parameter(
                "torque",
                "assist and resist torques must be finite",
            ));
        }
        if !(zone.0 > 0.0 && zone.0 < PI) {
            return Err(MotorError::invalid_parameter(
                "zone",
                format!("transition zone width must be in (0, π), got {}", zone.0),
            ));
        }
        Ok(Self {
            assist,
            resist,
            zone,
        })
    }

    pub fn assist(&self) -> NewtonMeter {
        self.assist
    }

    pub fn resist(&self) -> NewtonMeter {
        self.resist
    }

    pub fn zone(&self) -> Rad {
        self.zone
    }

    /// 计算给定角度的力矩命令
    pub fn torque_at(&self, angle: Rad) -> NewtonMeter {
        NewtonMeter(smooth_transition(
            angle.0,
            self.assist.0,
            self.resist.0,
            self.zone.0,
        ))
    }
}

impl Default for TorqueProfile {
    fn default() -> Self {
        Self {
            assist: NewtonMeter(DEFAULT_ASSIST_TORQUE),
            resist: NewtonMeter(DEFAULT_RESIST_TORQUE),
            zone: Rad(DEFAULT_ZONE_WIDTH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const TA: f64 = 15.0;
    const TR: f64 = -5.0;
    const Z: f64 = 0.349;

    fn profile(angle: f64) -> f64 {
        smooth_transition(angle, TA, TR, Z)
    }

    #[test]
    fn test_window_midpoint_scenario() {
        assert!((profile(PI) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_upper_half_scenario() {
        assert_eq!(profile(FRAC_PI_2), 15.0);
    }

    #[test]
    fn test_lower_half() {
        assert_eq!(profile(1.5 * PI), -5.0);
    }

    #[test]
    fn test_zero_window_midpoint() {
        assert!((profile(0.0) - 5.0).abs() < 1e-12);
        assert!((profile(TAU - 1e-12) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_edges_match_plateaus() {
        let h = Z / 2.0;
        assert!((profile(PI - h) - TA).abs() < 1e-12);
        assert!((profile(PI + h) - TR).abs() < 1e-12);
        assert!((profile(-h) - TR).abs() < 1e-12);
        assert!((profile(h) - TA).abs() < 1e-12);
    }

    #[test]
    fn test_continuity_across_boundaries() {
        let h = Z / 2.0;
        let eps = 1e-9;
        for edge in [PI - h, PI + h, h, TAU - h] {
            let jump = (profile(edge + eps) - profile(edge - eps)).abs();
            assert!(jump < 1e-6, "jump {} at {}", jump, edge);
        }
    }

    #[test]
    fn test_zero_slope_at_edges() {
        let h = Z / 2.0;
        let d = 1e-6;
        for edge in [PI - h, PI + h, h, TAU - h] {
            let slope_in = (profile(edge + d) - profile(edge - d)) / (2.0 * d);
            assert!(slope_in.abs() < 1e-3, "slope {} at {}", slope_in, edge);
        }
    }

    #[test]
    fn test_wraps_unbounded_angles() {
        for k in [-3.0, -1.0, 1.0, 7.0] {
            let a = FRAC_PI_2 + k * TAU;
            assert!((profile(a) - TA).abs() < 1e-9);
            let a = PI + k * TAU;
            assert!((profile(a) - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_profile_validation() {
        assert!(TorqueProfile::new(NewtonMeter(1.0), NewtonMeter(-1.0), Rad(0.0)).is_err());
        assert!(TorqueProfile::new(NewtonMeter(1.0), NewtonMeter(-1.0), Rad(PI)).is_err());
        assert!(TorqueProfile::new(NewtonMeter(f64::NAN), NewtonMeter(-1.0), Rad(0.3)).is_err());
        assert!(TorqueProfile::new(NewtonMeter(1.0), NewtonMeter(-1.0), Rad(0.3)).is_ok());
    }

    #[test]
    fn test_default_profile() {
        let p = TorqueProfile::default();
        assert_eq!(p.torque_at(Rad(FRAC_PI_2)), NewtonMeter(15.0));
        assert!((p.torque_at(Rad::PI).0 - 5.0).abs() < 1e-12);
    }

    proptest! {
        /// 输出落在 [min(Ta,Tr), max(Ta,Tr)] 内
        #[test]
        fn prop_output_bounded(
            angle in -100.0..100.0f64,
            assist in -50.0..50.0f64,
            resist in -50.0..50.0f64,
            zone in 0.01..3.0f64,
        ) {
            let tau = smooth_transition(angle, assist, resist, zone);
            prop_assert!(tau >= assist.min(resist) - 1e-9);
            prop_assert!(tau <= assist.max(resist) + 1e-9);
        }

        /// 斜率不超过 |Ta − Tr|·π / (2Z)
        #[test]
        fn prop_output_continuous(
            angle in -20.0..20.0f64,
            assist in -50.0..50.0f64,
            resist in -50.0..50.0f64,
            zone in 0.05..3.0f64,
        ) {
            let delta = 1e-6;
            let a = smooth_transition(angle, assist, resist, zone);
            let b = smooth_transition(angle + delta, assist, resist, zone);
            let max_slope = (assist - resist).abs() * PI / (2.0 * zone);
            prop_assert!((b - a).abs() <= max_slope * delta * 1.01 + 1e-9);
        }

        /// 以 2π 为周期
        #[test]
        fn prop_output_periodic(
            angle in -20.0..20.0f64,
            turns in -5i32..5,
            zone in 0.05..3.0f64,
        ) {
            let a = smooth_transition(angle, TA, TR, zone);
            let b = smooth_transition(angle + turns as f64 * TAU, TA, TR, zone);
            prop_assert!((a - b).abs() < 1e-6);
        }
    }
}
