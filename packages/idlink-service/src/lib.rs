pub mod fragment;
pub mod identify;
pub mod locate;
pub mod resolve;
pub mod view;

mod error;
mod phone_serde;

pub use error::{Error, Result};
pub use fragment::Fragment;
pub use identify::{IdentifyRequest, IdentifyResponse};
pub use resolve::Resolution;
pub use view::IdentityView;

use std::sync::Arc;

use idlink_config::Config;
use idlink_storage::ContactStore;

pub struct IdentityService {
	pub cfg: Config,
	pub store: Arc<dyn ContactStore>,
}
impl IdentityService {
	pub fn new(cfg: Config, store: Arc<dyn ContactStore>) -> Self {
		Self { cfg, store }
	}
}
