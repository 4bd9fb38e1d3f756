//! Pipeline stage functions.
//!
//! One function per stage, each operating on the pipeline state. The
//! controller calls them in reverse order every cycle so downstream slots
//! drain before upstream stages try to forward into them.

/// Instruction decode stage.
pub mod decode;
/// Instruction execute stage.
pub mod execute;
/// Instruction fetch stage.
pub mod fetch;
/// Memory access stage.
pub mod memory;
/// Register write-back stage.
pub mod write_back;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::memory_stage;
pub use write_back::write_back_stage;
