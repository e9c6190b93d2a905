// # Routes Module
//
// - This module contains all HTTP route handlers for the Garden Server.
// - Routes are organized by functionality into separate submodules.
//
//  ## Available Route Modules
// - `health`: Health check and monitoring endpoints
// - `garden`: Yield optimization and pairing endpoints
//
// - ## Adding New Routes
// - To add new route modules:
// - 1. Create a new file in the `routes/` directory
// - 2. Add the module declaration here with `pub mod module_name;`
// - 3. Register the routes in `server.rs` using the Router

/// Health check and monitoring endpoints
pub mod health;

/// Yield optimization and pairing endpoints
pub mod garden;
