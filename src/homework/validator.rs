//! 响应校验 - 浅层检查 API 响应结构

use super::record::HomeworkRecord;
use crate::error::BotError;
use serde_json::Value;
use tracing::{debug, info};

/// 描述 JSON 值的类型（用于错误信息）
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 校验 API 响应并取出作业列表
///
/// - 响应不是对象 → `MalformedResponse`
/// - `homeworks` 缺失或不是数组 → `MalformedResponse`
///
/// 列表元素不做校验，交给 formatter 逐条处理。
pub fn validate_response(payload: &Value) -> Result<Vec<HomeworkRecord>, BotError> {
    let object = payload.as_object().ok_or_else(|| {
        BotError::MalformedResponse(format!("expected a JSON object, got {}", json_type(payload)))
    })?;

    let homeworks = match object.get("homeworks") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(BotError::MalformedResponse(format!(
                "`homeworks` must be an array, got {}",
                json_type(other)
            )))
        }
        None => {
            return Err(BotError::MalformedResponse(
                "`homeworks` key is missing".to_string(),
            ))
        }
    };

    debug!(payload = %payload, "Response passed validation");
    info!(count = homeworks.len(), "Homeworks in response");

    Ok(homeworks.iter().cloned().map(HomeworkRecord::from_value).collect())
}
