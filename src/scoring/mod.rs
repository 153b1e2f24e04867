pub mod aggregate;
pub mod answers;
pub mod category;
pub mod config;
pub mod deal_breaker;
pub mod engine;
pub mod factors;
pub mod interaction;
pub mod normalize;
pub mod tiers;
pub mod trace;
pub mod validation;

pub use answers::{AnswerValue, RawAnswer, RaterSubmission};
pub use config::*;
pub use engine::{evaluate, EvaluationResult};
pub use factors::Adjustment;
pub use trace::{EvaluationContext, FlawedCategory};
pub use validation::validate_scoring;
