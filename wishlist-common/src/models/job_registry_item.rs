use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};

use crate::schema::job_registry;

#[derive(Clone, Debug, Identifiable, Queryable)]
#[diesel(table_name = job_registry, primary_key(job_name))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRegistryItem {
    pub job_name: String,
    pub last_run_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_registry)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewJobRegistryItem<'a> {
    pub job_name: &'a str,
    pub last_run_timestamp: NaiveDateTime,
}
