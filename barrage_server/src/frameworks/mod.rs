// Frameworks layer: environment config, scenario files and the runtime host.

pub mod config;
pub mod scenario;
pub mod server;
