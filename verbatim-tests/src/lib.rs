mod books;
mod bulk;
mod dumps;
mod payments;

use books::books;
use bulk::bulk;
use dumps::dumps;
use payments::payments;
use log::LevelFilter;
use std::env;
use verbatim::Executor;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every shared scenario against a live connection.
pub async fn execute_tests<E: Executor>(mut executor: E) {
    books(&mut executor).await;
    dumps(&mut executor).await;
    payments(&mut executor).await;
    bulk(&mut executor).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
