pub mod pii;

pub use pii::validate_candidate_id;
