use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};

use wishlist_common::db;

mod env;
mod handlers;
mod middleware;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 8080u16;
    let mut host = String::from("127.0.0.1");

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            "--host" => {
                host = match args.next() {
                    Some(h) => h,
                    None => {
                        eprintln!("ERROR: --host option specified but no host was given");
                        std::process::exit(1);
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let logger = match Logger::try_with_str(&env::CONF.log_level) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("ERROR: Invalid log level: {e}");
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
        .write_mode(WriteMode::Async)
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

    let actix_workers = env::CONF.actix_worker_count;

    // To prevent resource starvation, max connections must be at least as large as the number of
    // actix workers
    let db_max_connections = env::CONF.db_max_connections.max(actix_workers as u32);

    log::info!("Opening database at {}...", env::CONF.db_path);

    let db_thread_pool = match db::create_db_thread_pool(
        &env::CONF.db_path,
        db_max_connections,
        env::CONF.db_idle_timeout,
        env::CONF.db_busy_timeout,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    match db::run_migrations(&db_thread_pool) {
        Ok(0) => log::info!("Database schema is up to date"),
        Ok(count) => log::info!("Applied {count} database migration(s)"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }

    let base_addr = format!("{host}:{port}");
    log::info!("Listening on {base_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db_thread_pool.clone()))
            .configure(services::configure)
            .wrap(middleware::RequestLog)
    })
    .workers(actix_workers)
    .shutdown_timeout(env::CONF.shutdown_timeout.as_secs())
    .bind(base_addr)?
    .run()
    .await?;

    log::info!("Server stopped");

    // Safe because all other threads have been joined
    unsafe {
        env::CONF.zeroize();
    }

    Ok(())
}
