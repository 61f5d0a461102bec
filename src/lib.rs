pub mod core;
pub mod models;
pub mod site;
pub mod scrape;
pub mod tracker;
pub mod dispatch;
pub mod monitor;
