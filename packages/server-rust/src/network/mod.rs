//! HTTP transport: configuration, routing, middleware, fault recording and
//! shutdown control.

pub mod config;
pub mod docs;
pub mod faults;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::*;
pub use docs::ApiDoc;
pub use faults::FaultReport;
pub use handlers::AppState;
pub use module::NetworkModule;
pub use shutdown::*;
