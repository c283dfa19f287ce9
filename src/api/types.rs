//! Request and response shapes of the transactions API.

use serde::{Deserialize, Serialize};

/// Id of the "All Employees" filter entry.
pub const EMPTY_EMPLOYEE_ID: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The "no filter" selection shown first in the employee picker.
    pub fn empty() -> Self {
        Self::new(EMPTY_EMPLOYEE_ID, "All", "Employees")
    }

    pub fn is_empty_selection(&self) -> bool {
        self.id == EMPTY_EMPLOYEE_ID
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub merchant: String,
    pub employee: Employee,
    pub date: String,
    pub approved: bool,
}

/// One page of results plus the index of the following page, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: T,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedRequestParams {
    pub page: Option<u32>,
}

impl PaginatedRequestParams {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    pub employee_id: String,
}

impl RequestByEmployeeParams {
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}

impl SetTransactionApprovalParams {
    pub fn new(transaction_id: impl Into<String>, value: bool) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes_are_camel_case() {
        let employee = Employee::new("e1", "Ada", "Lovelace");
        assert_eq!(
            serde_json::to_value(&employee).unwrap(),
            json!({"id": "e1", "firstName": "Ada", "lastName": "Lovelace"})
        );

        let page = PaginatedResponse::<Vec<u8>> {
            data: vec![],
            next_page: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"data": [], "nextPage": 1})
        );

        let params = SetTransactionApprovalParams::new("t1", true);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"transactionId": "t1", "value": true})
        );
    }

    #[test]
    fn test_empty_employee() {
        let all = Employee::empty();
        assert!(all.is_empty_selection());
        assert_eq!(all.full_name(), "All Employees");
        assert!(!Employee::new("e1", "A", "B").is_empty_selection());
    }
}
