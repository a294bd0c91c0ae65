//! 作业记录

use serde_json::Value;

/// API 返回的一条作业记录
///
/// 只关心 `homework_name` 和 `status`，其余字段原样保存在 `raw` 中。
/// 字段类型不是字符串时视为缺失。
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkRecord {
    pub homework_name: Option<String>,
    pub status: Option<String>,
    pub raw: Value,
}

impl HomeworkRecord {
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        let homework_name = homework_name.into();
        let status = status.into();
        let raw = serde_json::json!({ "homework_name": homework_name, "status": status });
        Self {
            homework_name: Some(homework_name),
            status: Some(status),
            raw,
        }
    }

    /// 从任意 JSON 值构造（非对象得到空记录）
    pub fn from_value(raw: Value) -> Self {
        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            homework_name: field("homework_name"),
            status: field("status"),
            raw,
        }
    }
}

impl From<Value> for HomeworkRecord {
    fn from(raw: Value) -> Self {
        Self::from_value(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_extra_fields() {
        let raw = json!({
            "id": 123,
            "homework_name": "hw1.zip",
            "status": "approved",
            "reviewer_comment": "ok",
        });
        let record = HomeworkRecord::from_value(raw.clone());
        assert_eq!(record.homework_name.as_deref(), Some("hw1.zip"));
        assert_eq!(record.status.as_deref(), Some("approved"));
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn test_non_string_fields_are_absent() {
        let record = HomeworkRecord::from_value(json!({"homework_name": 42, "status": null}));
        assert!(record.homework_name.is_none());
        assert!(record.status.is_none());
    }

    #[test]
    fn test_non_object_is_empty_record() {
        let record = HomeworkRecord::from_value(json!("hw1"));
        assert!(record.homework_name.is_none());
        assert!(record.status.is_none());
    }
}
