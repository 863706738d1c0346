mod retry;
mod zhipu;

pub use retry::retry_with_backoff;
pub use zhipu::ZhipuProvider;
