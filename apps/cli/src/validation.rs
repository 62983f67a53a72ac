//! 输入验证模块
//!
//! MIT 协议把位置、速度、力矩编码在有限区间内，超出区间的命令会在驱动侧饱和。
//! CLI 在连接执行器之前就拒绝这类输入。

use anyhow::Result;

/// MIT 协议位置区间（rad）
pub const POSITION_LIMIT: f64 = 12.5;

/// 命令范围验证器
pub struct RangeValidator {
    name: &'static str,
    unit: &'static str,
    limit: f64,
}

impl RangeValidator {
    pub const fn new(name: &'static str, unit: &'static str, limit: f64) -> Self {
        Self { name, unit, limit }
    }

    /// 位置命令验证器
    pub const fn position() -> Self {
        Self::new("位置", "rad", POSITION_LIMIT)
    }

    /// 验证数值有限且位于 `[-limit, limit]`
    pub fn validate(&self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            anyhow::bail!("{}无效: {}", self.name, value);
        }
        if value.abs() > self.limit {
            anyhow::bail!(
                "{} {:.3} {} 超出范围 [{:.1}, {:.1}]",
                self.name,
                value,
                self.unit,
                -self.limit,
                self.limit
            );
        }
        Ok(value)
    }
}

/// 验证持续时间（秒）并转换为 `Duration`
pub fn duration_secs(secs: f64) -> Result<std::time::Duration> {
    if !secs.is_finite() || secs < 0.0 {
        anyhow::bail!("持续时间必须是非负有限值，得到 {}", secs);
    }
    std::time::Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("持续时间超出范围: {} ({})", secs, e))
}
