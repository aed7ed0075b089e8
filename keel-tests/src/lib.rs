mod books;
mod counting;
#[cfg(not(feature = "disable-locking"))]
mod locking;
mod multiple;
mod posts;

use crate::{
    books::books,
    counting::counting,
    multiple::multiple,
    posts::{post_casts, posts},
};
use keel::Connection;
#[cfg(not(feature = "disable-locking"))]
use locking::locking;
use log::LevelFilter;
use std::env;

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

pub fn execute_tests<C: Connection>(mut connection: C) {
    posts(&mut connection);
    post_casts(&mut connection);
    counting(&mut connection);
    books(&mut connection);
    multiple(&mut connection);
    #[cfg(not(feature = "disable-locking"))]
    locking(&mut connection);
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

/// Run a script of statements, dropping and creating a table for example.
pub(crate) fn setup<E: keel::Executor>(executor: &mut E, sql: &str) {
    executor
        .run(keel::Query::Raw(sql.into()))
        .unwrap_or_else(|e| panic!("Failed to run the setup script: {e:#}\n{sql}"));
}
