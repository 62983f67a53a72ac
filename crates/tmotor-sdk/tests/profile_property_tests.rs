//! 轨迹曲线属性测试
//!
//! 使用 proptest 验证数学属性。

use std::f64::consts::PI;
use std::time::Duration;

use proptest::prelude::*;
use tmotor_sdk::client::control::smooth_transition;
use tmotor_sdk::client::control::trajectory::{cubic, linear, minimum_jerk};
use tmotor_sdk::{Trajectory, TrajectoryKind};
use tmotor_sdk::prelude::Rad;

fn kind() -> impl Strategy<Value = TrajectoryKind> {
    prop_oneof![
        Just(TrajectoryKind::MinimumJerk),
        Just(TrajectoryKind::Cubic),
        Just(TrajectoryKind::Linear),
    ]
}

proptest! {
    /// 0 <= t < T 时位置位于起止点之间
    #[test]
    fn position_between_endpoints(
        kind in kind(),
        start in -10.0..10.0f64,
        end in -10.0..10.0f64,
        duration in 0.05..10.0f64,
        fraction in 0.0..1.0f64,
    ) {
        let t = duration * fraction;
        let (p, _) = kind.sample(start, end, t, duration);
        let lo = start.min(end) - 1e-9;
        let hi = start.max(end) + 1e-9;
        prop_assert!(p >= lo && p <= hi, "{} outside [{}, {}]", p, lo, hi);
    }

    /// t >= T 时所有曲线恰好返回 (end, 0)
    #[test]
    fn terminal_clamp(
        kind in kind(),
        start in -10.0..10.0f64,
        end in -10.0..10.0f64,
        duration in 0.05..10.0f64,
        overshoot in 0.0..100.0f64,
    ) {
        let (p, v) = kind.sample(start, end, duration + overshoot, duration);
        prop_assert_eq!(p, end);
        prop_assert_eq!(v, 0.0);
    }

    /// 五次与三次曲线起点速度为 0，直线曲线为匀速
    #[test]
    fn start_velocity(
        start in -10.0..10.0f64,
        end in -10.0..10.0f64,
        duration in 0.05..10.0f64,
    ) {
        prop_assert!(minimum_jerk(start, end, 0.0, duration).1.abs() < 1e-12);
        prop_assert!(cubic(start, end, 0.0, duration).1.abs() < 1e-12);

        let (_, v) = linear(start, end, 0.0, duration);
        prop_assert!((v - (end - start) / duration).abs() < 1e-9);
    }

    /// 离散采样覆盖两端，最后一个点是 (goal, 0)
    #[test]
    fn sampler_ends_at_goal(
        kind in kind(),
        goal in -5.0..5.0f64,
        millis in 30u64..3000,
        frequency in 10.0..1000.0f64,
    ) {
        let duration = Duration::from_millis(millis);
        let trajectory = Trajectory::new(Rad(0.0), Rad(goal), duration, kind).unwrap();
        let samples: Vec<_> = trajectory.samples(frequency).collect();

        let expected = (duration.as_secs_f64() * frequency).ceil() as usize + 1;
        prop_assert_eq!(samples.len(), expected);
        prop_assert_eq!(samples[0].time, 0.0);

        let last = samples[samples.len() - 1];
        prop_assert_eq!(last.position, Rad(goal));
        prop_assert_eq!(last.velocity, 0.0);
    }
}

#[test]
fn test_reference_values() {
    let (p, v) = minimum_jerk(0.0, 1.5708, 1.0, 2.0);
    assert!((p - 0.7854).abs() < 1e-4);
    assert!((v - 1.4726).abs() < 1e-4);

    assert!((smooth_transition(PI, 15.0, -5.0, 0.349) - 5.0).abs() < 1e-12);
    assert_eq!(smooth_transition(PI / 2.0, 15.0, -5.0, 0.349), 15.0);
}
