use crate::models::normalize_customer_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One GAQL result row: resource name to scalar or to a nested field map
pub type Row = Map<String, Value>;

/// Outcome of a single GAQL search, successful or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryResultEnvelope {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub total_results: usize,
}

impl QueryResultEnvelope {
    pub fn success(customer_id: &str, query: &str, results: Vec<Row>) -> Self {
        Self {
            success: true,
            total_results: results.len(),
            results,
            error: None,
            status_code: None,
            customer_id: customer_id.to_string(),
            query: query.to_string(),
        }
    }

    pub fn failure(
        customer_id: &str,
        query: &str,
        error: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            error: Some(error.into()),
            status_code,
            customer_id: customer_id.to_string(),
            query: query.to_string(),
            total_results: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub customer_id: String,
    pub resource_name: String,
}

impl Account {
    /// Build from a `customers/<id>` resource name
    pub fn from_resource_name(resource_name: &str) -> Self {
        let id = resource_name.rsplit('/').next().unwrap_or(resource_name);
        Account {
            customer_id: normalize_customer_id(id),
            resource_name: resource_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccountsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl AccountsEnvelope {
    pub fn success(accounts: Vec<Account>) -> Self {
        Self {
            success: true,
            count: accounts.len(),
            accounts,
            error: None,
            status_code: None,
        }
    }

    pub fn failure(error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            accounts: Vec::new(),
            count: 0,
            error: Some(error.into()),
            status_code,
        }
    }
}
