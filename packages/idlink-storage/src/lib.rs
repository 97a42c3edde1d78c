pub mod contacts;
pub mod db;
pub mod models;
pub mod schema;
pub mod store;

mod error;

pub use error::Error;
pub use models::{Contact, LinkPrecedence, NewContact};
pub use store::{BoxFuture, ContactStore, IdentityLock};

pub type Result<T, E = Error> = std::result::Result<T, E>;
