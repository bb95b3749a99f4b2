use axum::http::StatusCode;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

/// Booking counters in an application-owned registry.
pub struct Metrics {
    registry: Registry,
    pub bookings_total: IntCounter,
    pub booking_conflicts_total: IntCounter,
    pub confirmations_total: IntCounter,
    pub cancellations_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let c = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("booking_api".into()), None)?;
        Ok(Self {
            bookings_total: counter(&registry, "appointments_booked_total", "Appointments successfully booked")?,
            booking_conflicts_total: counter(&registry, "appointment_conflicts_total", "Bookings rejected for an overlapping slot")?,
            confirmations_total: counter(&registry, "appointments_confirmed_total", "Appointments confirmed")?,
            cancellations_total: counter(&registry, "appointments_canceled_total", "Appointments canceled")?,
            registry,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> (StatusCode, String) {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
        }
        (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
    }
}
