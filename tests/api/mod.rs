//! REST API tests

mod auth_tests;
mod heartbeat_tests;
mod room_tests;
mod user_tests;
