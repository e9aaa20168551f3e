//! 产品输入校验
//!
//! 新建与更新共用同一张字段规则表：新建时每个字段都必填，
//! 更新时只校验请求中出现的字段，边界完全相同。出现但为空白的字段
//! 在两种情况下都视为缺失。

use std::borrow::Cow;

use serde_json::{Map, Value};
use validator::{ValidateLength, ValidateUrl, ValidationError, ValidationErrors};

use super::model::{NewProduct, ProductChanges};

pub const PRICE_MIN: f64 = 0.0;
pub const PRICE_MAX: f64 = 999_999.99;

/// 字段是否必须出现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Price,
    Image,
    Properties,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Price => "price",
            Field::Image => "image",
            Field::Properties => "properties",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Text { max: u64 },
    Url { max: u64 },
    JsonText { max: u64 },
    Numeric { min: f64, max: f64 },
}

const PRODUCT_RULES: [(Field, Rule); 5] = [
    (Field::Name, Rule::Text { max: 20 }),
    (Field::Description, Rule::Text { max: 100 }),
    (
        Field::Price,
        Rule::Numeric {
            min: PRICE_MIN,
            max: PRICE_MAX,
        },
    ),
    (Field::Image, Rule::Url { max: 255 }),
    (Field::Properties, Rule::JsonText { max: 200 }),
];

enum Accepted {
    Text(String),
    Number(f64),
}

/// 校验新建请求，所有字段必填
pub fn validate_new_product(input: &Map<String, Value>) -> Result<NewProduct, ValidationErrors> {
    // 必填模式下缺失的字段都会记录错误，返回 Ok 时五个字段必然齐全
    match validate_fields(input, Presence::Required)?.into_new_product() {
        Some(product) => Ok(product),
        None => unreachable!("required validation accepted an incomplete product"),
    }
}

/// 校验更新请求，只处理出现的字段
pub fn validate_product_changes(
    input: &Map<String, Value>,
) -> Result<ProductChanges, ValidationErrors> {
    validate_fields(input, Presence::Optional)
}

pub fn validate_fields(
    input: &Map<String, Value>,
    presence: Presence,
) -> Result<ProductChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut changes = ProductChanges::default();

    for (field, rule) in PRODUCT_RULES {
        let key = field.key();
        let value = match input.get(key) {
            None if presence == Presence::Optional => continue,
            Some(value) if !is_blank(value) => value,
            _ => {
                errors.add(key, required(key));
                continue;
            }
        };

        match rule.check(key, value) {
            Ok(accepted) => assign(&mut changes, field, accepted),
            Err(failures) => {
                for failure in failures {
                    errors.add(key, failure);
                }
            }
        }
    }

    if errors.errors().is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

fn assign(changes: &mut ProductChanges, field: Field, accepted: Accepted) {
    match (field, accepted) {
        (Field::Name, Accepted::Text(text)) => changes.name = Some(text),
        (Field::Description, Accepted::Text(text)) => changes.description = Some(text),
        (Field::Image, Accepted::Text(text)) => changes.image = Some(text),
        (Field::Properties, Accepted::Text(text)) => changes.properties = Some(text),
        (Field::Price, Accepted::Number(price)) => changes.price = Some(price),
        _ => unreachable!("rule table pairs each field with a matching rule"),
    }
}

impl Rule {
    fn check(self, key: &'static str, value: &Value) -> Result<Accepted, Vec<ValidationError>> {
        match self {
            Rule::Text { max } => {
                let Some(text) = value.as_str().map(str::to_owned) else {
                    return Err(vec![failure("string", format!("The {key} field must be a string."))]);
                };
                if !text.validate_length(None, Some(max), None) {
                    return Err(vec![too_long(key, max)]);
                }
                Ok(Accepted::Text(text))
            }
            Rule::Url { max } => {
                let Some(text) = value.as_str().map(str::to_owned) else {
                    return Err(vec![not_url(key)]);
                };
                let mut failures = Vec::new();
                if !text.validate_url() {
                    failures.push(not_url(key));
                }
                if !text.validate_length(None, Some(max), None) {
                    failures.push(too_long(key, max));
                }
                finish(failures, Accepted::Text(text))
            }
            Rule::JsonText { max } => {
                let Some(text) = value.as_str().map(str::to_owned) else {
                    return Err(vec![not_json(key)]);
                };
                let mut failures = Vec::new();
                if serde_json::from_str::<Value>(&text).is_err() {
                    failures.push(not_json(key));
                }
                if !text.validate_length(None, Some(max), None) {
                    failures.push(too_long(key, max));
                }
                finish(failures, Accepted::Text(text))
            }
            Rule::Numeric { min, max } => {
                let Some(number) = numeric(value) else {
                    return Err(vec![failure("numeric", format!("The {key} field must be a number."))]);
                };
                let mut failures = Vec::new();
                if number < min {
                    let mut error = failure("range", format!("The {key} field must be at least {min}."));
                    error.add_param(Cow::from("min"), &min);
                    failures.push(error);
                }
                if number > max {
                    let mut error = failure(
                        "range",
                        format!("The {key} field must not be greater than {max}."),
                    );
                    error.add_param(Cow::from("max"), &max);
                    failures.push(error);
                }
                finish(failures, Accepted::Number(number))
            }
        }
    }
}

fn finish(failures: Vec<ValidationError>, accepted: Accepted) -> Result<Accepted, Vec<ValidationError>> {
    if failures.is_empty() {
        Ok(accepted)
    } else {
        Err(failures)
    }
}

/// JSON 数字或可解析为有限数值的字符串
fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn failure(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn required(key: &str) -> ValidationError {
    failure("required", format!("The {key} field is required."))
}

fn not_url(key: &str) -> ValidationError {
    failure("url", format!("The {key} field must be a valid URL."))
}

fn not_json(key: &str) -> ValidationError {
    failure("json", format!("The {key} field must be a valid JSON string."))
}

fn too_long(key: &str, max: u64) -> ValidationError {
    let mut error = failure(
        "length",
        format!("The {key} field must not be greater than {max} characters."),
    );
    error.add_param(Cow::from("max"), &max);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    fn messages(errors: &ValidationErrors, key: &str) -> Vec<String> {
        errors
            .field_errors()
            .into_iter()
            .find(|(field, _)| field.to_string() == key)
            .map(|(_, errs)| {
                errs.iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn valid_input() -> Value {
        json!({
            "name": "Mug",
            "description": "Ceramic mug",
            "price": 9.99,
            "image": "http://x.test/m.png",
            "properties": "{\"color\":\"red\"}"
        })
    }

    #[test]
    fn test_valid_new_product() {
        let product = validate_new_product(&object(valid_input())).unwrap();
        assert_eq!(product.name, "Mug");
        assert_eq!(product.price, 9.99);
        assert_eq!(product.properties, "{\"color\":\"red\"}");
    }

    #[test]
    fn test_missing_fields_are_required_on_create() {
        let errors = validate_new_product(&Map::new()).unwrap_err();
        for key in ["name", "description", "price", "image", "properties"] {
            assert_eq!(
                messages(&errors, key),
                vec![format!("The {key} field is required.")]
            );
        }
    }

    #[test]
    fn test_blank_values_count_as_missing_on_create() {
        let mut input = object(valid_input());
        input.insert("name".into(), json!("   "));
        input.insert("description".into(), Value::Null);

        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["The name field is required."]);
        assert_eq!(
            messages(&errors, "description"),
            vec!["The description field is required."]
        );
        assert!(messages(&errors, "price").is_empty());
    }

    #[test]
    fn test_name_length_is_counted_in_characters() {
        let mut input = object(valid_input());
        input.insert("name".into(), json!("é".repeat(20)));
        assert!(validate_new_product(&input).is_ok());

        input.insert("name".into(), json!("a".repeat(21)));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(
            messages(&errors, "name"),
            vec!["The name field must not be greater than 20 characters."]
        );
    }

    #[test]
    fn test_non_string_name_is_rejected() {
        let mut input = object(valid_input());
        input.insert("name".into(), json!(42));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["The name field must be a string."]);
    }

    #[test]
    fn test_image_reports_every_failure() {
        let mut input = object(valid_input());
        input.insert("image".into(), json!("x".repeat(300)));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(
            messages(&errors, "image"),
            vec![
                "The image field must be a valid URL.",
                "The image field must not be greater than 255 characters.",
            ]
        );
    }

    #[test]
    fn test_properties_must_be_json_text() {
        let mut input = object(valid_input());
        input.insert("properties".into(), json!("{color: red}"));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(
            messages(&errors, "properties"),
            vec!["The properties field must be a valid JSON string."]
        );

        // 结构化对象不是 JSON 文本
        input.insert("properties".into(), json!({"color": "red"}));
        assert!(validate_new_product(&input).is_err());
    }

    #[test]
    fn test_price_accepts_numeric_strings() {
        let mut input = object(valid_input());
        input.insert("price".into(), json!("12.50"));
        assert_eq!(validate_new_product(&input).unwrap().price, 12.5);
    }

    #[test]
    fn test_price_bounds() {
        let mut input = object(valid_input());
        input.insert("price".into(), json!(1_000_000));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(
            messages(&errors, "price"),
            vec!["The price field must not be greater than 999999.99."]
        );

        input.insert("price".into(), json!(-1));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(messages(&errors, "price"), vec!["The price field must be at least 0."]);

        input.insert("price".into(), json!("cheap"));
        let errors = validate_new_product(&input).unwrap_err();
        assert_eq!(messages(&errors, "price"), vec!["The price field must be a number."]);
    }

    #[test]
    fn test_update_only_validates_present_fields() {
        let changes = validate_product_changes(&object(json!({"name": "X"}))).unwrap();
        assert_eq!(
            changes,
            ProductChanges {
                name: Some("X".to_string()),
                ..Default::default()
            }
        );

        let changes = validate_product_changes(&Map::new()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_update_rejects_null_for_present_field() {
        let errors = validate_product_changes(&object(json!({"name": null}))).unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["The name field is required."]);
    }

    #[test]
    fn test_update_rejects_blank_required_fields() {
        let errors = validate_product_changes(&object(json!({
            "name": "",
            "description": "   ",
            "price": 5
        })))
        .unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["The name field is required."]);
        assert_eq!(
            messages(&errors, "description"),
            vec!["The description field is required."]
        );
        assert!(messages(&errors, "price").is_empty());
    }

    #[test]
    fn test_update_applies_same_bounds() {
        let errors = validate_product_changes(&object(json!({
            "description": "d".repeat(101),
            "price": 1_000_000.0
        })))
        .unwrap_err();
        assert_eq!(
            messages(&errors, "description"),
            vec!["The description field must not be greater than 100 characters."]
        );
        assert_eq!(messages(&errors, "price").len(), 1);
        assert!(messages(&errors, "name").is_empty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut input = object(valid_input());
        input.insert("id".into(), json!(99));
        input.insert("created_at".into(), json!("yesterday"));
        assert!(validate_new_product(&input).is_ok());
    }
}
