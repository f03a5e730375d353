//! Configuration module

mod site;

pub use site::drafts_from_env;
pub use site::DirConfig;
pub use site::HighlightConfig;
pub use site::PostsConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILES;
