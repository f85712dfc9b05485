//! Employee records and salary rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Stored employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    /// Employee identifier
    #[schema(example = 42)]
    pub id: i64,

    /// Full name
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,

    /// Job title
    #[schema(example = "Software Engineer")]
    pub job_title: String,

    /// Country of employment
    #[schema(example = "India")]
    pub country: String,

    /// Gross yearly salary
    #[schema(example = 85000.0)]
    pub gross_salary: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct EmployeeInput {
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub full_name: String,

    #[validate(length(min = 1, message = "job_title must not be empty"))]
    pub job_title: String,

    #[validate(length(min = 1, message = "country must not be empty"))]
    pub country: String,

    #[validate(range(min = 0.0, message = "gross_salary must not be negative"))]
    pub gross_salary: f64,
}

/// Net salary breakdown for a single employee
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NetSalary {
    pub gross_salary: f64,
    pub deduction_amount: f64,
    pub net_salary: f64,
}

impl NetSalary {
    /// Apply the deduction rate of the employee's country
    pub fn for_employee(employee: &Employee) -> Self {
        let rate = deduction_rate(&employee.country);
        let deduction_amount = employee.gross_salary * rate;

        Self {
            gross_salary: employee.gross_salary,
            deduction_amount,
            net_salary: employee.gross_salary - deduction_amount,
        }
    }
}

/// Salary aggregates over a group of employees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryMetrics {
    pub min_salary: f64,
    pub max_salary: f64,
    pub avg_salary: f64,
}

/// Deduction rate applied to gross salary, by country name.
///
/// Countries without a rule have no deduction.
pub fn deduction_rate(country: &str) -> f64 {
    match country {
        "India" => 0.10,
        "United States" => 0.12,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(country: &str, gross_salary: f64) -> Employee {
        let now = Utc::now();
        Employee {
            id: 1,
            full_name: "Test Employee".to_string(),
            job_title: "Engineer".to_string(),
            country: country.to_string(),
            gross_salary,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_deduction_rates() {
        assert_eq!(deduction_rate("India"), 0.10);
        assert_eq!(deduction_rate("United States"), 0.12);
        assert_eq!(deduction_rate("Germany"), 0.0);
        // Matching is exact
        assert_eq!(deduction_rate("india"), 0.0);
    }

    #[test]
    fn test_net_salary_india() {
        let net = NetSalary::for_employee(&employee("India", 1000.0));
        assert_eq!(net.gross_salary, 1000.0);
        assert!((net.deduction_amount - 100.0).abs() < 1e-9);
        assert!((net.net_salary - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_salary_united_states() {
        let net = NetSalary::for_employee(&employee("United States", 50000.0));
        assert!((net.deduction_amount - 6000.0).abs() < 1e-9);
        assert!((net.net_salary - 44000.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_salary_without_rule() {
        let net = NetSalary::for_employee(&employee("Japan", 1234.5));
        assert_eq!(net.deduction_amount, 0.0);
        assert_eq!(net.net_salary, 1234.5);
    }

    #[test]
    fn test_employee_input_validation() {
        let valid = EmployeeInput {
            full_name: "Ada".to_string(),
            job_title: "Engineer".to_string(),
            country: "India".to_string(),
            gross_salary: 0.0,
        };
        assert!(valid.validate().is_ok());

        let empty_name = EmployeeInput {
            full_name: String::new(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let negative = EmployeeInput {
            gross_salary: -1.0,
            ..valid
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_employee_input_requires_all_fields() {
        let missing_salary = r#"{"full_name":"Ada","job_title":"Engineer","country":"India"}"#;
        assert!(serde_json::from_str::<EmployeeInput>(missing_salary).is_err());

        let json = serde_json::to_value(employee("India", 10.0)).unwrap();
        assert_eq!(json["gross_salary"], 10.0);
        assert!(json.get("deleted_at").is_none());
    }
}
