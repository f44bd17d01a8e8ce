pub mod db;
pub mod envelope;
