use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use runner::JobRunner;

use wishlist_common::db;

mod env;
mod jobs;
mod runner;

use jobs::{ClearExpiredInviteCodesJob, ClearExpiredSessionsJob};

fn main() {
    let db_thread_pool = match db::create_db_thread_pool(
        &env::CONF.db_path,
        env::CONF.db_max_connections,
        env::CONF.db_idle_timeout,
        env::CONF.db_busy_timeout,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(env::CONF.worker_threads)
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to launch asynchronous runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        let logger = match Logger::try_with_str(&env::CONF.log_level) {
            Ok(l) => l,
            Err(e) => {
                eprintln!(
                    "ERROR: Invalid log level: {e}. Options: ERROR, WARN, INFO, DEBUG, TRACE. \
                     Example: `info, wishlist_job_scheduler::runner=debug`"
                );
                std::process::exit(1);
            }
        };

        let _logger = match logger
            .log_to_file(FileSpec::default().directory("./logs"))
            .rotate(
                Criterion::Age(Age::Day),
                Naming::Timestamps,
                Cleanup::KeepLogAndCompressedFiles(60, 365),
            )
            .cleanup_in_background_thread(true)
            .duplicate_to_stdout(Duplicate::All)
            .write_mode(WriteMode::BufferAndFlush)
            .format(|writer, now, record| {
                write!(
                    writer,
                    "{:5} | {} | {}:{} | {}",
                    record.level(),
                    now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                    record.module_path().unwrap_or("<unknown>"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .use_utc()
            .start()
        {
            Ok(l) => l,
            Err(e) => {
                eprintln!("ERROR: Failed to start logger: {e}");
                std::process::exit(1);
            }
        };

        // Either binary may be the first to open the database
        if let Err(e) = db::run_migrations(&db_thread_pool) {
            log::error!("{e}");
            std::process::exit(1);
        }

        let mut job_runner = JobRunner::new(env::CONF.update_frequency, db_thread_pool.clone());

        job_runner
            .register(
                Box::new(ClearExpiredSessionsJob::new(db_thread_pool.clone())),
                env::CONF.clear_expired_sessions_job_frequency,
            )
            .await;

        job_runner
            .register(
                Box::new(ClearExpiredInviteCodesJob::new(db_thread_pool.clone())),
                env::CONF.clear_expired_invite_codes_job_frequency,
            )
            .await;

        let runner_handle = tokio::spawn(async move { job_runner.start().await });

        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received shutdown signal. Stopping job runner.");
                runner_handle.abort();
            }
            Err(e) => {
                log::error!("Failed to listen for shutdown signal: {e}");

                if let Err(e) = runner_handle.await {
                    log::error!("Job runner stopped unexpectedly: {e}");
                }
            }
        }
    });
}
