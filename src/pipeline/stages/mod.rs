//! Built-in pipeline stages, listed in their default order.

pub mod decorate;
pub mod docs;
pub mod origin;
pub mod static_assets;
pub mod timing;

pub use decorate::DecorateStage;
pub use docs::DocsStage;
pub use origin::{AllowedOrigins, OriginPolicyStage};
pub use static_assets::StaticAssetsStage;
pub use timing::TimingStage;
