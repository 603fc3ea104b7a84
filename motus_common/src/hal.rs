//! Hardware abstraction vocabulary.
//!
//! - [`joint`] - Lock-free joint state cells and the handles a controller holds
//! - [`directory`] - Named lookup of joint handles and the hardware cycle trait

pub mod directory;
pub mod joint;

pub use directory::{HalError, LookupError, ResourceDirectory, RobotHardware};
pub use joint::{CommandInterface, JointHandle, JointState};
