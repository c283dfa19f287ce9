//! Fixture data served by the mock backend.

use super::types::{Employee, Transaction};

pub fn employees() -> Vec<Employee> {
    vec![
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0001", "James", "Smith"),
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0002", "Mary", "Johnson"),
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0003", "Robert", "Williams"),
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0004", "Patricia", "Brown"),
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0005", "Michael", "Jones"),
        Employee::new("ed1c2a6e-1d8a-4c32-a9a1-1d5e6f0a0006", "Linda", "Garcia"),
    ]
}

pub fn transactions(employees: &[Employee]) -> Vec<Transaction> {
    // (id suffix, amount, merchant, employee index, date, approved)
    const ROWS: &[(&str, f64, &str, usize, &str, bool)] = &[
        ("0001", 843.32, "Social Media Ads Inc", 0, "2021-09-01", false),
        ("0002", 917.11, "Flights R Us", 1, "2021-09-03", true),
        ("0003", 129.95, "Office Depot", 2, "2021-09-05", false),
        ("0004", 2150.00, "Cloud Hosting Co", 3, "2021-09-08", true),
        ("0005", 64.20, "Coffee Corner", 4, "2021-09-09", false),
        ("0006", 312.48, "Conference Center", 5, "2021-09-12", false),
        ("0007", 58.75, "Rideshare", 0, "2021-09-14", true),
        ("0008", 1499.00, "Laptop Store", 1, "2021-09-15", false),
        ("0009", 210.10, "Team Lunch Bistro", 2, "2021-09-18", false),
        ("0010", 89.99, "Software Subscriptions", 3, "2021-09-20", true),
        ("0011", 430.00, "Hotel Central", 4, "2021-09-22", false),
        ("0012", 19.99, "Stationery Plus", 5, "2021-09-23", false),
        ("0013", 675.40, "Flights R Us", 0, "2021-09-25", false),
        ("0014", 244.18, "Print Shop", 1, "2021-09-27", true),
        ("0015", 1020.55, "Social Media Ads Inc", 2, "2021-09-28", false),
        ("0016", 77.30, "Coffee Corner", 3, "2021-09-30", false),
    ];

    if employees.is_empty() {
        return Vec::new();
    }
    ROWS.iter()
        .map(|(suffix, amount, merchant, employee, date, approved)| Transaction {
            id: format!("7a1b9f3c-55d2-4e8a-b0c4-9d2e8f1a{}", suffix),
            amount: *amount,
            merchant: merchant.to_string(),
            employee: employees[employee % employees.len()].clone(),
            date: date.to_string(),
            approved: *approved,
        })
        .collect()
}
