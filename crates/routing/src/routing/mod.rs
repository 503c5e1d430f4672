//! Routing for the FHIR RESTful API.
//!
//! | Method | Path | Interaction |
//! |--------|------|-------------|
//! | GET | `/health` | liveness |
//! | POST | `/[type]` | create |
//! | GET | `/[type]` | search-type |
//! | POST | `/[type]/_search` | search-type |
//! | GET | `/[type]/_history` | history-type |
//! | GET | `/[type]/[id]` | read |
//! | PUT | `/[type]/[id]` | update |
//! | PATCH | `/[type]/[id]` | patch |
//! | DELETE | `/[type]/[id]` | delete |
//! | GET | `/[type]/[id]/_history` | history-instance |
//! | GET | `/[type]/[id]/_history/[vid]` | vread |
//!
//! Every interaction route is also served under `/tenant/[tenant]`.

pub mod fhir_routes;
pub mod interactions;

pub use fhir_routes::create_routes;
