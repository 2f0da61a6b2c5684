mod common;

mod rate_limit_tests;
