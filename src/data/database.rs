//! SQLite database operations
//!
//! All database access goes through this module.

use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Insert columns in bind order (everything but `id`)
const INSERT_COLUMNS: [&str; 31] = [
    "state_name",
    "district_name",
    "fin_year",
    "month",
    "approved_labour_budget",
    "average_wage_rate_per_day_per_person",
    "average_days_of_employment_provided_per_household",
    "differently_abled_persons_worked",
    "material_and_skilled_wages",
    "number_of_completed_works",
    "number_of_gps_with_nil_exp",
    "number_of_ongoing_works",
    "persondays_of_central_liability_so_far",
    "sc_persondays",
    "st_persondays",
    "total_adm_expenditure",
    "total_exp",
    "total_households_worked",
    "total_individuals_worked",
    "total_no_of_active_job_cards",
    "total_no_of_active_workers",
    "total_no_of_hhs_completed_100_days_of_wage_employment",
    "total_no_of_jobcards_issued",
    "total_no_of_workers",
    "total_no_of_works_takenup",
    "wages",
    "women_persondays",
    "percent_of_category_b_works",
    "percent_of_expenditure_on_agriculture_allied_works",
    "percent_of_nrm_expenditure",
    "percentage_payments_generated_within_15_days",
];

const SUMMARY_COLUMNS: &str = "district_name, approved_labour_budget, \
     average_wage_rate_per_day_per_person, average_days_of_employment_provided_per_household, \
     total_households_worked, total_individuals_worked, total_exp, wages";

/// Rows per multi-row INSERT; keeps binds under SQLite's 999 parameter floor.
const INSERT_CHUNK_ROWS: usize = 999 / INSERT_COLUMNS.len();

fn insert_builder<'args>(records: &[DistrictRecord]) -> QueryBuilder<'args, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO district_data ({}) ",
        INSERT_COLUMNS.join(", ")
    ));

    builder.push_values(records, |mut row, record| {
        row.push_bind(record.state_name.clone())
            .push_bind(record.district_name.clone())
            .push_bind(record.fin_year.clone())
            .push_bind(record.month.clone())
            .push_bind(record.approved_labour_budget)
            .push_bind(record.average_wage_rate_per_day_per_person)
            .push_bind(record.average_days_of_employment_provided_per_household)
            .push_bind(record.differently_abled_persons_worked)
            .push_bind(record.material_and_skilled_wages)
            .push_bind(record.number_of_completed_works)
            .push_bind(record.number_of_gps_with_nil_exp)
            .push_bind(record.number_of_ongoing_works)
            .push_bind(record.persondays_of_central_liability_so_far)
            .push_bind(record.sc_persondays)
            .push_bind(record.st_persondays)
            .push_bind(record.total_adm_expenditure)
            .push_bind(record.total_exp)
            .push_bind(record.total_households_worked)
            .push_bind(record.total_individuals_worked)
            .push_bind(record.total_no_of_active_job_cards)
            .push_bind(record.total_no_of_active_workers)
            .push_bind(record.total_no_of_hhs_completed_100_days_of_wage_employment)
            .push_bind(record.total_no_of_jobcards_issued)
            .push_bind(record.total_no_of_workers)
            .push_bind(record.total_no_of_works_takenup)
            .push_bind(record.wages)
            .push_bind(record.women_persondays)
            .push_bind(record.percent_of_category_b_works)
            .push_bind(record.percent_of_expenditure_on_agriculture_allied_works)
            .push_bind(record.percent_of_nrm_expenditure)
            .push_bind(record.percentage_payments_generated_within_15_days);
    });

    builder
}

/// Escape LIKE metacharacters so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter<'args>(builder: &mut QueryBuilder<'args, Sqlite>, filter: &RecordFilter) {
    builder.push(" WHERE 1 = 1");

    // Both sides go through SQLite's lower() so stored text always matches itself.
    let state_name = filter
        .state_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if let Some(state_name) = state_name {
        let pattern = format!("%{}%", escape_like(state_name));
        builder
            .push(" AND lower(state_name) LIKE lower(")
            .push_bind(pattern)
            .push(") ESCAPE '\\'");
    }

    if let Some(fin_year) = &filter.fin_year {
        builder.push(" AND fin_year = ").push_bind(fin_year.clone());
    }

    builder.push(" ORDER BY id");
}

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Creates the `district_data` table if it is missing.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append a single record
    ///
    /// # Returns
    /// The synthetic row id assigned by SQLite
    pub async fn insert_record(&self, record: &DistrictRecord) -> Result<i64, AppError> {
        let result = insert_builder(std::slice::from_ref(record))
            .build()
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Append one financial year's records in a single transaction
    ///
    /// Either every record is written or none is.
    ///
    /// # Returns
    /// Number of rows inserted
    pub async fn insert_year(&self, records: &[DistrictRecord]) -> Result<u64, AppError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let result = insert_builder(chunk).build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Full rows matching `filter`, in insertion order
    pub async fn query_records(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredDistrictRecord>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM district_data");
        push_filter(&mut builder, filter);

        let records = builder
            .build_query_as::<StoredDistrictRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Eight-column projection of rows matching `filter`, in insertion order
    pub async fn query_summaries(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<DistrictSummary>, AppError> {
        let mut builder = QueryBuilder::new(format!("SELECT {SUMMARY_COLUMNS} FROM district_data"));
        push_filter(&mut builder, filter);

        let summaries = builder
            .build_query_as::<DistrictSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(summaries)
    }

    /// Total number of stored rows
    pub async fn count_records(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM district_data")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
