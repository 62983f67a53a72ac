//! 命令定义和实现

pub mod crank;
pub mod impedance;
pub mod plan;
pub mod position;
pub mod torque;
pub mod velocity;

pub use crank::CrankCommand;
pub use impedance::ImpedanceCommand;
pub use plan::PlanCommand;
pub use position::PositionCommand;
pub use torque::TorqueCommand;
pub use velocity::VelocityCommand;
