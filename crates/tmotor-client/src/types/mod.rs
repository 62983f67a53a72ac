//! 类型系统：强类型单位与错误类型

mod error;
mod units;

pub use error::{MotorError, Result};
pub use units::{Deg, NewtonMeter, Rad};
