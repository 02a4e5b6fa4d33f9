pub mod reports;

pub use reports::configure_reports_routes;
