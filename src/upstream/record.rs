//! Mapping of data.gov.in records onto [`DistrictRecord`]
//!
//! The API returns every field as loosely typed JSON: numbers, numeric
//! strings, empty strings, "NA" or nothing at all. Numeric fields go
//! through [`MetricValue`] so that a bad value degrades to 0.0 instead of
//! failing the whole refresh.

use serde_json::{Map, Value};

use crate::data::DistrictRecord;

/// Outcome of reading one numeric field
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A finite number, from a JSON number or a numeric string
    Present(f64),
    /// Absent, null, or blank
    Missing,
    /// Anything else; carries the raw value for logging
    Malformed(String),
}

impl MetricValue {
    pub fn parse(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => MetricValue::Missing,
            Some(Value::Number(number)) => match number.as_f64() {
                Some(value) if value.is_finite() => MetricValue::Present(value),
                _ => MetricValue::Malformed(number.to_string()),
            },
            Some(Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return MetricValue::Missing;
                }
                match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() => MetricValue::Present(value),
                    _ => MetricValue::Malformed(text.clone()),
                }
            }
            Some(other) => MetricValue::Malformed(other.to_string()),
        }
    }

    /// Value to store; 0.0 unless present
    pub fn value(&self) -> f64 {
        match self {
            MetricValue::Present(value) => *value,
            MetricValue::Missing | MetricValue::Malformed(_) => 0.0,
        }
    }
}

/// A numeric field that could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedField {
    pub field: &'static str,
    pub raw: String,
}

/// Result of mapping one upstream object
#[derive(Debug, Clone)]
pub struct MappedRecord {
    pub record: DistrictRecord,
    pub malformed: Vec<MalformedField>,
}

fn text_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Map one element of the `records` array
///
/// `fin_year` is the year that was requested, not the one echoed back.
pub fn map_record(raw: &Map<String, Value>, fin_year: &str) -> MappedRecord {
    let mut malformed = Vec::new();
    let mut metric = |field: &'static str| {
        let parsed = MetricValue::parse(raw.get(field));
        if let MetricValue::Malformed(raw_value) = &parsed {
            malformed.push(MalformedField {
                field,
                raw: raw_value.clone(),
            });
        }
        parsed.value()
    };

    let record = DistrictRecord {
        state_name: text_field(raw, "state_name"),
        district_name: text_field(raw, "district_name"),
        fin_year: fin_year.to_string(),
        month: text_field(raw, "month"),
        approved_labour_budget: metric("Approved_Labour_Budget"),
        average_wage_rate_per_day_per_person: metric("Average_Wage_rate_per_day_per_person"),
        average_days_of_employment_provided_per_household: metric(
            "Average_days_of_employment_provided_per_Household",
        ),
        differently_abled_persons_worked: metric("Differently_abled_persons_worked"),
        material_and_skilled_wages: metric("Material_and_skilled_Wages"),
        number_of_completed_works: metric("Number_of_Completed_Works"),
        number_of_gps_with_nil_exp: metric("Number_of_GPs_with_NIL_exp"),
        number_of_ongoing_works: metric("Number_of_Ongoing_Works"),
        persondays_of_central_liability_so_far: metric("Persondays_of_Central_Liability_so_far"),
        sc_persondays: metric("SC_persondays"),
        st_persondays: metric("ST_persondays"),
        total_adm_expenditure: metric("Total_Adm_Expenditure"),
        total_exp: metric("Total_Exp"),
        total_households_worked: metric("Total_Households_Worked"),
        total_individuals_worked: metric("Total_Individuals_Worked"),
        total_no_of_active_job_cards: metric("Total_No_of_Active_Job_Cards"),
        total_no_of_active_workers: metric("Total_No_of_Active_Workers"),
        total_no_of_hhs_completed_100_days_of_wage_employment: metric(
            "Total_No_of_HHs_completed_100_Days_of_Wage_Employment",
        ),
        total_no_of_jobcards_issued: metric("Total_No_of_JobCards_issued"),
        total_no_of_workers: metric("Total_No_of_Workers"),
        total_no_of_works_takenup: metric("Total_No_of_Works_Takenup"),
        wages: metric("Wages"),
        women_persondays: metric("Women_Persondays"),
        percent_of_category_b_works: metric("percent_of_Category_B_Works"),
        percent_of_expenditure_on_agriculture_allied_works: metric(
            "percent_of_Expenditure_on_Agriculture_Allied_Works",
        ),
        percent_of_nrm_expenditure: metric("percent_of_NRM_Expenditure"),
        percentage_payments_generated_within_15_days: metric(
            "percentage_payments_generated_within_15_days",
        ),
    };

    MappedRecord { record, malformed }
}
