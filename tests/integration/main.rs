//! End-to-end tests against mock sites and a mock classifier

mod crawl_tests;
