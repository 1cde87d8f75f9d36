pub mod ids;
pub mod timestamp;

pub use ids::AlertId;
pub use timestamp::Timestamp;
