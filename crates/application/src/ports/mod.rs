//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application reaches the backend.
//! Adapters in the infrastructure layer implement these ports.

mod planning_backend_port;

#[cfg(test)]
pub use planning_backend_port::MockPlanningBackendPort;
pub use planning_backend_port::PlanningBackendPort;
