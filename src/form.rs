use std::{collections::BTreeMap, fmt::Display};

use axum::Form;
use garde::Validate;
use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// 字段级校验错误
///
/// 序列化为 `{"field": ["message", ...]}`，非字段错误使用 `__all__` 键。
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// 只含一条错误
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }
}

impl From<garde::Report> for FieldErrors {
    fn from(report: garde::Report) -> Self {
        let mut errors = FieldErrors::default();
        for (path, error) in report.iter() {
            let field = path.to_string();
            let field = if field.is_empty() {
                FieldErrors::NON_FIELD.to_string()
            } else {
                field
            };
            errors.add(field, error.message());
        }
        errors
    }
}

/// 运行表单上的 garde 规则
pub fn validate<F>(form: &F) -> Result<(), FieldErrors>
where
    F: Validate,
    F::Context: Default,
{
    form.validate().map_err(FieldErrors::from)
}

/// 取出表单，请求体缺失或无法解码时按空表单处理
///
/// 空表单的每个字段都会在校验时报告 [`REQUIRED`]。
pub fn form_or_default<F: Default, E: Display>(body: Result<Form<F>, E>) -> F {
    match body {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable form body");
            F::default()
        }
    }
}

/// 必填：去除首尾空白后不能为空
pub fn required(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new(REQUIRED));
    }
    Ok(())
}

/// 对象主键：必填且为整数
pub fn object_id(value: &str, ctx: &()) -> garde::Result {
    required(value, ctx)?;
    match parse_id(value) {
        Some(_) => Ok(()),
        None => Err(garde::Error::new(INVALID_CHOICE)),
    }
}

pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, Validate)]
    #[serde(default)]
    struct SampleForm {
        #[garde(custom(object_id))]
        article: String,
        #[garde(custom(required))]
        body: String,
        #[garde(length(chars, max = 3))]
        tag: String,
    }

    fn sample(article: &str, body: &str, tag: &str) -> SampleForm {
        SampleForm {
            article: article.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_missing_and_blank_fields_are_required() {
        let errors = validate(&sample("", "   ", "")).unwrap_err();

        assert_eq!(errors.get("body"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("article"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.get("tag").is_none());
    }

    #[test]
    fn test_non_integer_id_is_invalid_choice() {
        let errors = validate(&sample("abc", "hi", "")).unwrap_err();
        assert_eq!(errors.get("article"), Some(&[INVALID_CHOICE.to_string()][..]));
        assert!(errors.get("body").is_none());
    }

    #[test]
    fn test_crate_rules_are_reported_per_field() {
        let errors = validate(&sample("1", "hi", "toolong")).unwrap_err();
        assert_eq!(errors.get("tag").map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_valid_form() {
        let form = sample(" 42 ", " hello ", "ab");
        assert!(validate(&form).is_ok());
        assert_eq!(parse_id(&form.article), Some(42));
    }

    #[test]
    fn test_unreadable_body_becomes_empty_form() {
        let form: SampleForm = form_or_default(Err::<Form<SampleForm>, _>("missing body"));
        assert!(form.article.is_empty() && form.body.is_empty());
        assert!(validate(&form).is_err());
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = FieldErrors::single("body", REQUIRED);
        errors.add(FieldErrors::NON_FIELD, "bad");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "__all__": ["bad"], "body": [REQUIRED] })
        );
    }
}
