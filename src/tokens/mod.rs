pub mod reconcile;
pub mod sources;
pub mod types;

pub use reconcile::reconcile;
pub use types::{PartialTokenMetadata, TokenDisplayRecord};
