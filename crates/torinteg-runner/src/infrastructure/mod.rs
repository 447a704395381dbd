//! Infrastructure layer: the file system and the process-wide log
//! subscriber.

pub mod logging;
pub mod storage;
