mod analytics;
mod clubs;
mod env;
mod registration;
mod sessions;
mod utils;

pub use utils::{test_db, test_utils};
