pub mod budgets;
pub mod cli;
pub mod dashboard;
pub mod database;
pub mod http_err;
pub mod ledger;
pub mod server;
