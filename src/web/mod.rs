pub mod control;
pub mod server;


pub use control::ControlSurface;
pub use server::WebServer;
