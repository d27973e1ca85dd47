pub mod analytics;
pub mod auth;
pub mod clubs;
pub mod competitions;
pub mod martial_arts;
pub mod members;
pub mod results;

pub use analytics::*;
pub use auth::*;
pub use clubs::*;
pub use competitions::*;
pub use martial_arts::*;
pub use members::*;
pub use results::*;

use serde::Serialize;

#[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct CreatedResponse {
    pub id: i64,
}
