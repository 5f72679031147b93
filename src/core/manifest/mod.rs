pub mod store;
pub mod sync;

pub use store::{ModManifest, PackDescriptor};
pub use sync::ensure_up_to_date;
