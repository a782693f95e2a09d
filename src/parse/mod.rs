pub mod lines;
pub mod selftest_log;
