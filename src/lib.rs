mod attribute_value;
mod bucket;
pub mod builtins;
mod clock;
mod condition;
mod condition_set;
mod context;
mod error;
mod eval;
mod field;
mod ip;
mod registry;
mod settings;
mod store;
mod switch;
mod test_common;
mod user;
mod util;

pub use attribute_value::*;
pub use bucket::*;
pub use clock::*;
pub use condition::*;
pub use condition_set::*;
pub use context::*;
pub use error::*;
pub use eval::*;
pub use field::*;
pub use ip::*;
pub use registry::*;
pub use settings::*;
pub use store::*;
pub use switch::*;
pub use user::*;
