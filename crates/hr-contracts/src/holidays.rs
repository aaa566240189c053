//! Store holiday settings contracts

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hr_core::error::ValidationErrors;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

pub const MAX_HOLIDAYS: usize = 366;
const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayEntryRequest {
    pub date: Option<String>,
    pub name: Option<String>,
}

/// Body of `PUT /settings/holidays`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidaySettingsRequest {
    pub store_name: Option<String>,
    #[serde(default)]
    pub holidays: Vec<HolidayEntryRequest>,
}

/// Query of `DELETE /settings/holidays`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayDeleteParams {
    pub store_name: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolidayEntry {
    pub date: DateTime<Utc>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolidaySettings {
    pub store_name: String,
    pub holidays: Vec<HolidayEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolidayRemoval {
    pub store_name: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HolidaySettingsContract;

impl HolidaySettingsContract {
    pub fn new() -> Self {
        Self
    }
}

impl Contract<HolidaySettingsRequest> for HolidaySettingsContract {
    type Output = HolidaySettings;

    fn validate(&self, input: &HolidaySettingsRequest) -> ValidationResult<HolidaySettings> {
        let mut errors = ValidationErrors::new();
        let store_name = base::required("storeName", input.store_name.as_deref(), &mut errors);

        if input.holidays.len() > MAX_HOLIDAYS {
            errors.add("holidays", format!("must have at most {} entries", MAX_HOLIDAYS));
        }

        let mut seen = HashSet::new();
        let mut holidays = Vec::with_capacity(input.holidays.len());
        for (i, entry) in input.holidays.iter().enumerate() {
            let date_field = format!("holidays[{}].date", i);
            let name_field = format!("holidays[{}].name", i);

            let date = base::required_date(&date_field, entry.date.as_deref(), &mut errors);
            let name = base::required(&name_field, entry.name.as_deref(), &mut errors);
            base::max_length(&name_field, name, MAX_NAME_LENGTH, &mut errors);

            if let Some(date) = date {
                if !seen.insert(date) {
                    errors.add(date_field, "is duplicated");
                }
            }
            if let (Some(date), Some(name)) = (date, name) {
                holidays.push(HolidayEntry {
                    date,
                    name: name.to_string(),
                });
            }
        }

        match store_name {
            Some(store_name) if errors.is_empty() => Ok(HolidaySettings {
                store_name: store_name.to_string(),
                holidays,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HolidayDeleteContract;

impl Contract<HolidayDeleteParams> for HolidayDeleteContract {
    type Output = HolidayRemoval;

    fn validate(&self, input: &HolidayDeleteParams) -> ValidationResult<HolidayRemoval> {
        let mut errors = ValidationErrors::new();
        let store_name = base::required("storeName", input.store_name.as_deref(), &mut errors);
        let date = base::required_date("date", input.date.as_deref(), &mut errors);
        match (store_name, date) {
            (Some(store_name), Some(date)) => Ok(HolidayRemoval {
                store_name: store_name.to_string(),
                date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> HolidaySettingsRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_settings() {
        let settings = HolidaySettingsContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Bandra",
                "holidays": [
                    { "date": "2024-08-15", "name": "Independence Day" },
                    { "date": "2024-10-02", "name": "Gandhi Jayanti" }
                ]
            })))
            .unwrap();
        assert_eq!(settings.store_name, "Bandra");
        assert_eq!(settings.holidays.len(), 2);
    }

    #[test]
    fn test_entry_errors_are_indexed() {
        let errors = HolidaySettingsContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Bandra",
                "holidays": [
                    { "date": "2024-08-15", "name": "Independence Day" },
                    { "date": "2024-08-15", "name": "Again" },
                    { "date": "15-08-2024", "name": "" }
                ]
            })))
            .unwrap_err();
        assert!(errors.has_error("holidays[1].date"));
        assert!(errors.has_error("holidays[2].date"));
        assert!(errors.has_error("holidays[2].name"));
        assert!(!errors.has_error("holidays[0].date"));
    }

    #[test]
    fn test_store_name_required() {
        let errors = HolidaySettingsContract::new()
            .validate(&request(serde_json::json!({ "holidays": [] })))
            .unwrap_err();
        assert!(errors.has_error("storeName"));
    }

    #[test]
    fn test_delete_params() {
        let removal = HolidayDeleteContract
            .validate(&HolidayDeleteParams {
                store_name: Some("Bandra".into()),
                date: Some("2024-08-15".into()),
            })
            .unwrap();
        assert_eq!(removal.store_name, "Bandra");

        let errors = HolidayDeleteContract
            .validate(&HolidayDeleteParams::default())
            .unwrap_err();
        assert!(errors.has_error("storeName"));
        assert!(errors.has_error("date"));
    }
}
