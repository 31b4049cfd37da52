pub mod http;
pub mod oneshot;
