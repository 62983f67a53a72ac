//! 会话状态管理
//!
//! 上电/断电状态机、反馈缓存与作用域守卫。

pub mod machine;

pub use machine::{
    ActuatorSession, FeedbackRead, PowerGuard, PowerState, SETTLE_DELAY, ZERO_SETTLE_DELAY,
};
