mod engine;
mod state;

pub use engine::{evaluate, Evaluation, Outcome};
pub use state::StreakState;
