mod app_context;

pub use app_context::{AppContext, ensure_database_dir};

#[cfg(test)]
pub use app_context::test_support;
