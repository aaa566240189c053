//! Profile update contract

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::Weekday;
use hr_core::error::ValidationErrors;
use hr_models::{Role, User};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

/// Optional leading `+`, then 10 to 15 digits
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

const MAX_NAME_LENGTH: usize = 255;
const MAX_ADDRESS_LENGTH: usize = 500;

/// Body of `PUT /users/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Day name, or an empty string to clear it
    pub weekly_off: Option<String>,
    pub role: Option<String>,
    pub store_name: Option<String>,
    pub basic_salary: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub weekly_off: Option<Option<Weekday>>,
    pub role: Option<Role>,
    pub store_name: Option<String>,
    pub basic_salary: Option<Decimal>,
}

impl ProfileChanges {
    /// Fields only HR or MD may change
    pub fn privileged_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.role.is_some() {
            fields.push("role");
        }
        if self.store_name.is_some() {
            fields.push("storeName");
        }
        if self.basic_salary.is_some() {
            fields.push("basicSalary");
        }
        fields
    }

    /// Apply everything except the store move, which needs a lookup
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone()).filter(|p| !p.is_empty());
        }
        if let Some(address) = &self.address {
            user.address = Some(address.clone()).filter(|a| !a.is_empty());
        }
        if let Some(weekly_off) = self.weekly_off {
            user.weekly_off = weekly_off;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(salary) = self.basic_salary {
            user.basic_salary = salary;
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileContract;

impl ProfileContract {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_phone(&self, phone: &str, errors: &mut ValidationErrors) {
        if !phone.is_empty() && !PHONE_PATTERN.is_match(phone) {
            errors.add("phone", "must be 10 to 15 digits with an optional leading +");
        }
    }

    pub fn validate_weekly_off(&self, raw: &str, errors: &mut ValidationErrors) -> Option<Option<Weekday>> {
        if raw.is_empty() {
            return Some(None);
        }
        match raw.parse::<Weekday>() {
            Ok(day) => Some(Some(day)),
            Err(_) => {
                errors.add("weeklyOff", "is not a day of the week");
                None
            }
        }
    }
}

impl Contract<UpdateProfileRequest> for ProfileContract {
    type Output = ProfileChanges;

    fn validate(&self, input: &UpdateProfileRequest) -> ValidationResult<ProfileChanges> {
        let mut errors = ValidationErrors::new();
        let mut changes = ProfileChanges::default();

        if let Some(name) = input.name.as_deref() {
            if let Some(name) = base::required("name", Some(name), &mut errors) {
                base::max_length("name", Some(name), MAX_NAME_LENGTH, &mut errors);
                changes.name = Some(name.to_string());
            }
        }
        if let Some(phone) = input.phone.as_deref().map(str::trim) {
            self.validate_phone(phone, &mut errors);
            changes.phone = Some(phone.to_string());
        }
        if let Some(address) = input.address.as_deref().map(str::trim) {
            base::max_length("address", Some(address), MAX_ADDRESS_LENGTH, &mut errors);
            changes.address = Some(address.to_string());
        }
        if let Some(raw) = input.weekly_off.as_deref().map(str::trim) {
            changes.weekly_off = self.validate_weekly_off(raw, &mut errors);
        }
        if let Some(raw) = input.role.as_deref().map(str::trim) {
            match Role::from_str(raw) {
                Ok(role) => changes.role = Some(role),
                Err(_) => errors.add("role", "is not a known role"),
            }
        }
        if let Some(store_name) = input.store_name.as_deref() {
            if let Some(store_name) = base::required("storeName", Some(store_name), &mut errors) {
                changes.store_name = Some(store_name.to_string());
            }
        }
        base::non_negative("basicSalary", input.basic_salary, &mut errors);
        base::fits("basicSalary", input.basic_salary, base::AMOUNT, &mut errors);
        changes.basic_salary = input.basic_salary;

        errors.into_result()?;
        if changes == ProfileChanges::default() {
            let mut errors = ValidationErrors::new();
            errors.add_base("no changes submitted");
            return Err(errors);
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(value: serde_json::Value) -> UpdateProfileRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_phone_pattern() {
        let contract = ProfileContract::new();
        for ok in ["9876543210", "+919876543210", "123456789012345"] {
            let mut errors = ValidationErrors::new();
            contract.validate_phone(ok, &mut errors);
            assert!(errors.is_empty(), "{} should be accepted", ok);
        }
        for bad in ["12345", "+91 98765 43210", "98765-43210", "1234567890123456"] {
            let mut errors = ValidationErrors::new();
            contract.validate_phone(bad, &mut errors);
            assert!(errors.has_error("phone"), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_self_service_changes() {
        let changes = ProfileContract::new()
            .validate(&request(serde_json::json!({
                "name": " Meera ",
                "phone": "+919876543210",
                "weeklyOff": "Wednesday"
            })))
            .unwrap();
        assert!(changes.privileged_fields().is_empty());

        let mut user = User::new("Old", "meera@example.com", Role::Employee);
        changes.apply(&mut user);
        assert_eq!(user.name, "Meera");
        assert_eq!(user.weekly_off, Some(Weekday::Wed));
    }

    #[test]
    fn test_clearing_weekly_off() {
        let changes = ProfileContract::new()
            .validate(&request(serde_json::json!({ "weeklyOff": "" })))
            .unwrap();
        assert_eq!(changes.weekly_off, Some(None));
    }

    #[test]
    fn test_privileged_fields_are_reported() {
        let changes = ProfileContract::new()
            .validate(&request(serde_json::json!({
                "role": "store_director",
                "basicSalary": 30000
            })))
            .unwrap();
        assert_eq!(changes.privileged_fields(), vec!["role", "basicSalary"]);
        assert_eq!(changes.basic_salary, Some(dec!(30000)));
    }

    #[test]
    fn test_invalid_fields() {
        let errors = ProfileContract::new()
            .validate(&request(serde_json::json!({
                "name": "",
                "role": "admin",
                "weeklyOff": "someday",
                "basicSalary": -1
            })))
            .unwrap_err();
        for field in ["name", "role", "weeklyOff", "basicSalary"] {
            assert!(errors.has_error(field), "missing error for {}", field);
        }
    }
}
