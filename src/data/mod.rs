//! Review dataset loading, sampling and splitting

mod loader;
mod review;
mod split;

pub use loader::{load_reviews, load_reviews_from_reader};
pub use review::{Label, ReviewRecord};
pub use split::{random_split, select, train_test_split};
