//! Synchronous parse-or-fail schema validation
//!
//! A [`Schema`] is an ordered set of per-field rules. `parse` walks every
//! rule, collects path-annotated issues and fails with
//! [`Error::Schema`](crate::core::error::Error::Schema) when any rule
//! rejects. Rules are plain composable closures.

use std::sync::Arc;

use crate::core::error::{Error, FieldIssue, Result};
use crate::core::field::{FieldFormat, FieldValue};
use crate::core::record::Record;

/// A single validation rule over one field value
pub type Rule = Arc<dyn Fn(&str, &FieldValue) -> std::result::Result<(), String> + Send + Sync>;

/// An ordered collection of field rules
#[derive(Clone, Default)]
pub struct Schema {
    rules: Vec<(String, Vec<Rule>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach rules to a field; order of declaration is evaluation order
    pub fn field(mut self, name: &str, rules: Vec<Rule>) -> Self {
        self.rules.push((name.to_string(), rules));
        self
    }

    /// Validate a record, collecting every issue before failing
    pub fn parse(&self, record: &Record) -> Result<()> {
        let mut issues = Vec::new();
        for (field, rules) in &self.rules {
            let value = record.get(field).cloned().unwrap_or(FieldValue::Null);
            for rule in rules {
                if let Err(message) = rule(field, &value) {
                    issues.push(FieldIssue {
                        path: field.clone(),
                        message,
                    });
                }
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Schema(issues))
        }
    }
}

/// Rule: field must be present and non-null
pub fn required() -> Rule {
    Arc::new(|field: &str, value: &FieldValue| {
        if value.is_null() {
            Err(format!("Field '{field}' is required"))
        } else {
            Ok(())
        }
    })
}

/// Rule: value must be a string (null passes; combine with `required`)
pub fn string() -> Rule {
    Arc::new(|field: &str, value: &FieldValue| match value {
        FieldValue::Null | FieldValue::String(_) => Ok(()),
        _ => Err(format!("Field '{field}' must be a string")),
    })
}

/// Rule: value must be an integer (null passes)
pub fn integer() -> Rule {
    Arc::new(|field: &str, value: &FieldValue| match value {
        FieldValue::Null | FieldValue::Integer(_) => Ok(()),
        _ => Err(format!("Field '{field}' must be an integer")),
    })
}

/// Rule: string length lower bound
pub fn min_len(min: usize) -> Rule {
    Arc::new(move |field: &str, value: &FieldValue| match value.as_string() {
        Some(s) if s.len() < min => Err(format!(
            "Field '{field}' must be at least {min} characters long"
        )),
        _ => Ok(()),
    })
}

/// Rule: string length upper bound
pub fn max_len(max: usize) -> Rule {
    Arc::new(move |field: &str, value: &FieldValue| match value.as_string() {
        Some(s) if s.len() > max => Err(format!(
            "Field '{field}' must be at most {max} characters long"
        )),
        _ => Ok(()),
    })
}

/// Rule: string must satisfy a [`FieldFormat`]
pub fn format(format: FieldFormat) -> Rule {
    Arc::new(move |field: &str, value: &FieldValue| {
        if value.is_null() || format.validate(value) {
            Ok(())
        } else {
            Err(format!("Field '{field}' has an invalid format"))
        }
    })
}

/// Rule: string must be a valid e-mail address
pub fn email() -> Rule {
    format(FieldFormat::Email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.set(k, v.clone());
        }
        r
    }

    #[test]
    fn test_empty_schema_accepts_anything() {
        let schema = Schema::new();
        assert!(schema.parse(&Record::new()).is_ok());
    }

    #[test]
    fn test_required_missing_field() {
        let schema = Schema::new().field("name", vec![required()]);
        let err = schema.parse(&Record::new()).unwrap_err();
        match err {
            Error::Schema(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "name");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_required_present_field() {
        let schema = Schema::new().field("name", vec![required(), string()]);
        let rec = record(&[("name", FieldValue::String("ok".into()))]);
        assert!(schema.parse(&rec).is_ok());
    }

    #[test]
    fn test_collects_all_issues() {
        let schema = Schema::new()
            .field("name", vec![required()])
            .field("age", vec![required(), integer()]);
        let rec = record(&[("age", FieldValue::String("old".into()))]);
        match schema.parse(&rec).unwrap_err() {
            Error::Schema(issues) => {
                let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
                assert_eq!(paths, vec!["name", "age"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_min_max_len() {
        let schema = Schema::new().field("code", vec![min_len(3), max_len(5)]);
        assert!(
            schema
                .parse(&record(&[("code", FieldValue::String("abcd".into()))]))
                .is_ok()
        );
        assert!(
            schema
                .parse(&record(&[("code", FieldValue::String("ab".into()))]))
                .is_err()
        );
        assert!(
            schema
                .parse(&record(&[("code", FieldValue::String("abcdef".into()))]))
                .is_err()
        );
    }

    #[test]
    fn test_email_rule() {
        let schema = Schema::new().field("email", vec![required(), email()]);
        assert!(
            schema
                .parse(&record(&[(
                    "email",
                    FieldValue::String("a@example.com".into())
                )]))
                .is_ok()
        );
        assert!(
            schema
                .parse(&record(&[("email", FieldValue::String("nope".into()))]))
                .is_err()
        );
    }

    #[test]
    fn test_type_rules_pass_on_null() {
        // presence is `required`'s job; type rules only constrain present values
        let schema = Schema::new().field("age", vec![integer()]);
        assert!(schema.parse(&Record::new()).is_ok());
    }
}
