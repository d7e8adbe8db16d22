//! Permission gate over the verified principal
//!
//! Meant to run after a credential gate has attached a principal to the
//! request context. Passing requires either a blanket allow, a wildcard or
//! superuser marker on the configured field, or that the field holds every
//! required permission.

use std::sync::Arc;

use crate::core::error::Error;
use crate::core::field::FieldValue;
use crate::core::plugin::PluginFn;

const WILDCARD: &str = "*";
const SUPERUSER: &str = "superuser";

/// Configuration for [`verify_permissions`]
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Permissions the request must hold, all of them
    pub permissions: Vec<String>,
    /// Principal field carrying the held permissions
    pub permissions_field: String,
    /// Skip the check entirely
    pub allow_all: bool,
}

impl GuardConfig {
    pub fn new(permissions: &[&str], permissions_field: &str) -> Self {
        Self {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            permissions_field: permissions_field.to_string(),
            allow_all: false,
        }
    }

    pub fn allow_all(mut self) -> Self {
        self.allow_all = true;
        self
    }
}

/// Input plugin gating a route on the principal's permissions
pub fn verify_permissions(config: GuardConfig) -> PluginFn {
    let config = Arc::new(config);
    Arc::new(move |ctx| {
        let config = config.clone();
        Box::pin(async move {
            if config.allow_all {
                return Ok(());
            }
            let principal = ctx
                .principal
                .as_ref()
                .ok_or_else(|| Error::Unauthorized("No verified principal".into()))?;
            let held = principal
                .get(&config.permissions_field)
                .ok_or_else(|| Error::Unauthorized("Insufficient permissions".into()))?;
            if check(held, &config.permissions) {
                Ok(())
            } else {
                Err(Error::Unauthorized("Insufficient permissions".into()))
            }
        })
    })
}

fn check(held: &FieldValue, required: &[String]) -> bool {
    match held {
        FieldValue::String(marker) => marker == WILDCARD || marker == SUPERUSER,
        FieldValue::List(items) => {
            let held: Vec<&str> = items.iter().filter_map(FieldValue::as_string).collect();
            if held.contains(&WILDCARD) || held.contains(&SUPERUSER) {
                return true;
            }
            required.iter().all(|p| held.contains(&p.as_str()))
        }
        _ => false,
    }
}
