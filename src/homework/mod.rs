//! 作业状态 - 拉取、校验、格式化

pub mod client;
pub mod formatter;
pub mod record;
pub mod status;
pub mod validator;

pub use client::{HomeworkSource, PracticumClient, PracticumConfig, DEFAULT_ENDPOINT};
pub use formatter::format_status;
pub use record::HomeworkRecord;
pub use status::HomeworkStatus;
pub use validator::validate_response;
