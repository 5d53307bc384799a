pub mod api_router;
pub mod auth;
pub mod bids;
pub mod dashboard;
pub mod leads;
pub mod outreach;
pub mod shared;
pub mod tasks;
pub mod team;
pub mod tests;
pub mod web_server;
