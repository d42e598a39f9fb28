pub mod heatmap;
pub mod log_flow;
pub mod performance;
pub mod reward;
pub mod stats;
pub mod streak;
pub mod sunnah;
