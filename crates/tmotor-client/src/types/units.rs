//! 强类型单位
//!
//! 使用 NewType 模式防止弧度、角度、力矩混用。速度保持 `f64`（rad/s）。
//!
//! ```rust
//! use tmotor_client::types::{Deg, Rad};
//!
//! let zone = Deg(20.0).to_rad();
//! assert!((zone.0 - 0.349).abs() < 1e-3);
//! assert!((Rad::PI.to_deg().0 - 180.0).abs() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// 弧度
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Rad(pub f64);

impl Rad {
    /// 零弧度
    pub const ZERO: Self = Rad(0.0);

    /// π 弧度（180度）
    pub const PI: Self = Rad(std::f64::consts::PI);

    /// 2π 弧度（360度）
    pub const TAU: Self = Rad(std::f64::consts::TAU);

    /// π/2 弧度（90度）
    pub const FRAC_PI_2: Self = Rad(std::f64::consts::FRAC_PI_2);

    #[inline]
    pub const fn new(value: f64) -> Self {
        Rad(value)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// 转换为角度
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0.to_degrees())
    }

    #[inline]
    pub fn abs(self) -> Self {
        Rad(self.0.abs())
    }

    /// 归一化到 [0, 2π)
    ///
    /// 对极小的负数，浮点取余可能恰好得到 2π，调用者应容忍该边界值。
    #[inline]
    pub fn wrap_two_pi(self) -> Self {
        Rad(self.0.rem_euclid(std::f64::consts::TAU))
    }
}

impl fmt::Display for Rad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

impl Add for Rad {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Rad(self.0 + rhs.0)
    }
}

impl Sub for Rad {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Rad(self.0 - rhs.0)
    }
}

impl Mul<f64> for Rad {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Rad(self.0 * rhs)
    }
}

impl Neg for Rad {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Rad(-self.0)
    }
}

/// 角度
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Deg(pub f64);

impl Deg {
    /// 转换为弧度
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0.to_radians())
    }
}

impl fmt::Display for Deg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

/// 力矩（牛·米）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct NewtonMeter(pub f64);

impl NewtonMeter {
    /// 零力矩
    pub const ZERO: Self = NewtonMeter(0.0);

    #[inline]
    pub const fn new(value: f64) -> Self {
        NewtonMeter(value)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn abs(self) -> Self {
        NewtonMeter(self.0.abs())
    }
}

impl fmt::Display for NewtonMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} Nm", self.0)
    }
}

impl Add for NewtonMeter {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        NewtonMeter(self.0 + rhs.0)
    }
}

impl Sub for NewtonMeter {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        NewtonMeter(self.0 - rhs.0)
    }
}

impl Mul<f64> for NewtonMeter {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        NewtonMeter(self.0 * rhs)
    }
}

impl Neg for NewtonMeter {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        NewtonMeter(-self.0)
    }
}
