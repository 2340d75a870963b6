pub mod client;
pub mod pagination;
pub mod pipeline;
pub mod retry;
