use wishlist_common::db::job_registry::Dao as JobRegistryDao;
use wishlist_common::db::DbThreadPool;

use chrono::{NaiveDateTime, Utc};
use futures::future;
use std::time::{Duration, Instant};
use tokio::time;

use crate::jobs::Job;

struct JobContainer {
    job: Box<dyn Job>,
    run_frequency: Duration,
    last_run_time: NaiveDateTime,
}

impl JobContainer {
    fn is_due(&self, now: NaiveDateTime) -> bool {
        let elapsed = (now - self.last_run_time)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed >= self.run_frequency
    }
}

pub struct JobRunner {
    jobs: Vec<JobContainer>,
    update_frequency: Duration,
    db_thread_pool: DbThreadPool,
}

impl JobRunner {
    pub fn new(update_frequency: Duration, db_thread_pool: DbThreadPool) -> Self {
        Self {
            jobs: Vec::new(),
            update_frequency,
            db_thread_pool,
        }
    }

    /// Adds a job to the runner. If the job has run before, its next run is scheduled
    /// relative to the last run recorded in the job registry; otherwise it first runs one
    /// `run_frequency` from now.
    pub async fn register(&mut self, job: Box<dyn Job>, run_frequency: Duration) {
        let job_name_ref = job.name();

        log::info!(
            "Registered job \"{}\" to run every {} seconds",
            job_name_ref,
            run_frequency.as_secs()
        );

        let dao = JobRegistryDao::new(&self.db_thread_pool);
        let last_run_time = tokio::task::spawn_blocking(move || {
            dao.get_job_last_run_timestamp(job_name_ref)
                .unwrap_or_else(|e| {
                    log::error!(
                        "Failed to get last run timestamp for job '{}': {}",
                        job_name_ref,
                        e
                    );
                    None
                })
        })
        .await
        .unwrap_or_else(|e| {
            log::error!("Failed to join Tokio task: {}", e);
            None
        });

        let job_container = JobContainer {
            job,
            run_frequency,
            last_run_time: last_run_time.unwrap_or_else(|| Utc::now().naive_utc()),
        };

        self.jobs.push(job_container);
    }

    /// Runs every job that is due and ready, then records the runs. Returns the number of
    /// jobs that were executed.
    async fn run_due_jobs(&mut self) -> usize {
        let now = Utc::now().naive_utc();

        let mut job_names = Vec::with_capacity(self.jobs.len());
        let mut job_futures = Vec::with_capacity(self.jobs.len());
        let mut record_job_run_futures = Vec::with_capacity(self.jobs.len());

        for job_container in &mut self.jobs {
            if !job_container.is_due(now) || !job_container.job.is_ready() {
                continue;
            }

            job_container.last_run_time = now;

            let name_ref = job_container.job.name();
            log::info!("Executing job \"{}\"", name_ref);
            job_names.push(name_ref);
            job_futures.push(job_container.job.execute());

            let dao = JobRegistryDao::new(&self.db_thread_pool);
            let record_run_task = tokio::task::spawn_blocking(move || {
                dao.set_job_last_run_timestamp(name_ref, now)
            });

            record_job_run_futures.push(record_run_task);
        }

        let (job_results, recording_results) = future::join(
            future::join_all(job_futures),
            future::join_all(record_job_run_futures),
        )
        .await;

        for (name, result) in job_names.iter().zip(job_results) {
            match result {
                Ok(()) => log::info!("Job \"{}\" finished successfully", name),
                Err(e) => log::error!("Job \"{}\" failed: {}", name, e),
            }
        }

        for result in recording_results.into_iter() {
            match result {
                Ok(Ok(())) => (),
                Ok(Err(e)) => log::error!("Error recording job run: {}", e),
                Err(e) => log::error!("Error recording job run: {}", e),
            }
        }

        job_names.len()
    }

    pub async fn start(&mut self) -> ! {
        loop {
            let before = Instant::now();

            self.run_due_jobs().await;

            let delta = before.elapsed();

            if delta < self.update_frequency {
                time::sleep(self.update_frequency - delta).await;
            }
        }
    }
}
