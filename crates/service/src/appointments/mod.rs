//! Appointment engine: booking, conflict detection and the
//! booked → confirmed/canceled state machine.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::{Appointment, AppointmentStatus};
pub use service::AppointmentService;
