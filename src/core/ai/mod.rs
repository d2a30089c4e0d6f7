pub mod http;
pub mod prompt;
pub mod provider;
pub mod providers;

pub use prompt::PromptTemplate;
pub use provider::{AIProvider, ProviderConfig};
