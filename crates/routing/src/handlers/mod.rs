//! The resource handler and the interface it implements.
//!
//! - [`CrudHandler`] - the nine interactions the HTTP layer dispatches to
//! - [`ResourceHandler`] - validates input and delegates to injected
//!   persistence, search, history and authorization collaborators

pub mod crud_handler;
pub mod resource_handler;

pub use crud_handler::CrudHandler;
pub use resource_handler::ResourceHandler;
