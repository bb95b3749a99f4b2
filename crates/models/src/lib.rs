//! SeaORM entities for the booking schema plus row-level validation helpers.

pub mod errors;
pub mod db;
pub mod user;
pub mod service;
pub mod appointment;

#[cfg(test)]
mod tests;
