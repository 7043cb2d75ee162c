//! Data models
//!
//! Rust structs representing database rows and their public projections.
//! Serialized field names keep the data.gov.in spelling so the frontend
//! can use upstream and stored records interchangeably.

use serde::{Deserialize, Serialize};

/// `fin_year` value meaning "do not filter by year"
pub const ALL_YEARS: &str = "All";

// =============================================================================
// District record
// =============================================================================

/// One district/month row of MGNREGA statistics
///
/// Every metric defaults to 0.0 when the upstream value is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct DistrictRecord {
    pub state_name: Option<String>,
    pub district_name: Option<String>,
    /// Financial year the record was requested for, e.g. "2023-2024"
    pub fin_year: String,
    pub month: Option<String>,

    #[serde(rename = "Approved_Labour_Budget")]
    pub approved_labour_budget: f64,
    #[serde(rename = "Average_Wage_rate_per_day_per_person")]
    pub average_wage_rate_per_day_per_person: f64,
    #[serde(rename = "Average_days_of_employment_provided_per_Household")]
    pub average_days_of_employment_provided_per_household: f64,
    #[serde(rename = "Differently_abled_persons_worked")]
    pub differently_abled_persons_worked: f64,
    #[serde(rename = "Material_and_skilled_Wages")]
    pub material_and_skilled_wages: f64,
    #[serde(rename = "Number_of_Completed_Works")]
    pub number_of_completed_works: f64,
    #[serde(rename = "Number_of_GPs_with_NIL_exp")]
    pub number_of_gps_with_nil_exp: f64,
    #[serde(rename = "Number_of_Ongoing_Works")]
    pub number_of_ongoing_works: f64,
    #[serde(rename = "Persondays_of_Central_Liability_so_far")]
    pub persondays_of_central_liability_so_far: f64,
    #[serde(rename = "SC_persondays")]
    pub sc_persondays: f64,
    #[serde(rename = "ST_persondays")]
    pub st_persondays: f64,
    #[serde(rename = "Total_Adm_Expenditure")]
    pub total_adm_expenditure: f64,
    #[serde(rename = "Total_Exp")]
    pub total_exp: f64,
    #[serde(rename = "Total_Households_Worked")]
    pub total_households_worked: f64,
    #[serde(rename = "Total_Individuals_Worked")]
    pub total_individuals_worked: f64,
    #[serde(rename = "Total_No_of_Active_Job_Cards")]
    pub total_no_of_active_job_cards: f64,
    #[serde(rename = "Total_No_of_Active_Workers")]
    pub total_no_of_active_workers: f64,
    #[serde(rename = "Total_No_of_HHs_completed_100_Days_of_Wage_Employment")]
    pub total_no_of_hhs_completed_100_days_of_wage_employment: f64,
    #[serde(rename = "Total_No_of_JobCards_issued")]
    pub total_no_of_jobcards_issued: f64,
    #[serde(rename = "Total_No_of_Workers")]
    pub total_no_of_workers: f64,
    #[serde(rename = "Total_No_of_Works_Takenup")]
    pub total_no_of_works_takenup: f64,
    #[serde(rename = "Wages")]
    pub wages: f64,
    #[serde(rename = "Women_Persondays")]
    pub women_persondays: f64,
    #[serde(rename = "percent_of_Category_B_Works")]
    pub percent_of_category_b_works: f64,
    #[serde(rename = "percent_of_Expenditure_on_Agriculture_Allied_Works")]
    pub percent_of_expenditure_on_agriculture_allied_works: f64,
    #[serde(rename = "percent_of_NRM_Expenditure")]
    pub percent_of_nrm_expenditure: f64,
    #[serde(rename = "percentage_payments_generated_within_15_days")]
    pub percentage_payments_generated_within_15_days: f64,
}

/// A persisted record together with its synthetic row id
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StoredDistrictRecord {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: DistrictRecord,
}

// =============================================================================
// Query projection
// =============================================================================

/// Row shape returned by `GET /get_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DistrictSummary {
    pub district_name: Option<String>,
    #[serde(rename = "Approved_Labour_Budget")]
    pub approved_labour_budget: f64,
    #[serde(rename = "Average_Wage_rate_per_day_per_person")]
    pub average_wage_rate_per_day_per_person: f64,
    #[serde(rename = "Average_days_of_employment_provided_per_Household")]
    pub average_days_of_employment_provided_per_household: f64,
    #[serde(rename = "Total_Households_Worked")]
    pub total_households_worked: f64,
    #[serde(rename = "Total_Individuals_Worked")]
    pub total_individuals_worked: f64,
    #[serde(rename = "Total_Exp")]
    pub total_exp: f64,
    #[serde(rename = "Wages")]
    pub wages: f64,
}

impl From<&DistrictRecord> for DistrictSummary {
    fn from(record: &DistrictRecord) -> Self {
        Self {
            district_name: record.district_name.clone(),
            approved_labour_budget: record.approved_labour_budget,
            average_wage_rate_per_day_per_person: record.average_wage_rate_per_day_per_person,
            average_days_of_employment_provided_per_household: record
                .average_days_of_employment_provided_per_household,
            total_households_worked: record.total_households_worked,
            total_individuals_worked: record.total_individuals_worked,
            total_exp: record.total_exp,
            wages: record.wages,
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Read filter over `district_data`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive substring of `state_name`
    pub state_name: Option<String>,
    /// Exact `fin_year`; `None` matches every year
    pub fin_year: Option<String>,
}

impl RecordFilter {
    /// Build a filter from request parameters
    ///
    /// `state_name` is trimmed and a blank one matches every row; the
    /// `"All"` sentinel (or an empty string) for `fin_year` disables year
    /// filtering.
    pub fn new(state_name: &str, fin_year: Option<&str>) -> Self {
        let state_name = Some(state_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let fin_year = fin_year
            .map(str::trim)
            .filter(|year| !year.is_empty() && *year != ALL_YEARS)
            .map(str::to_string);

        Self {
            state_name,
            fin_year,
        }
    }
}
