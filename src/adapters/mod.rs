// Adapters layer: concrete implementations of the domain ports (HTTP API, session file).

pub mod http;
pub mod storage;
