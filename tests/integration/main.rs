//! Integration test harness
//!
//! Every test starts a wiremock server, mirrors it into a temporary
//! directory with the plain-HTTP renderer, and checks the resulting tree.

mod crawl_tests;
