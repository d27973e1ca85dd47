pub mod clubs;
pub mod competitions;
pub mod martial_arts;
pub mod members;
pub mod registration;
pub mod results;
pub mod users;

pub use clubs::*;
pub use competitions::*;
pub use martial_arts::*;
pub use members::*;
pub use registration::*;
pub use results::*;
pub use users::*;
