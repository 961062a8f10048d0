pub mod telegram;

use anyhow::Result;

use crate::normalize::NormalizedItem;

/// Seam to the messaging collaborator: one synchronous send per item,
/// success or a transport error. Retries, if anyone wants them, live
/// outside this trait.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, item: &NormalizedItem) -> Result<()>;
}
