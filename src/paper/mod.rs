pub mod simulator;
pub mod tracker;

pub use simulator::{PaperSession, SessionAction, Slate, SlateBet};
pub use tracker::{compute_metrics, SessionMetrics};
