pub mod cancel;
pub mod helper;
pub mod task_supervisor;
