pub mod kv;
pub mod logging;
pub mod speech;
pub mod storage;
