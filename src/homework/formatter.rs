//! 状态消息格式化

use super::record::HomeworkRecord;
use super::status::HomeworkStatus;
use crate::error::BotError;

/// 把一条作业记录转换为通知文本
///
/// 格式：`Changed review status for "{homework_name}". {verdict}`
pub fn format_status(record: &HomeworkRecord) -> Result<String, BotError> {
    let name = record
        .homework_name
        .as_deref()
        .ok_or(BotError::MissingField("homework_name"))?;

    let code = record
        .status
        .as_deref()
        .ok_or(BotError::UnknownStatus(None))?;

    let status = HomeworkStatus::from_code(code)
        .ok_or_else(|| BotError::UnknownStatus(Some(code.to_string())))?;

    Ok(format!(
        "Changed review status for \"{}\". {}",
        name,
        status.verdict()
    ))
}
