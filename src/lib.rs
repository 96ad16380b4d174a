pub mod client;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod todo;
