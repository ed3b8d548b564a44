//! Tonight's observing plan: which celestial bodies are worth looking at from
//! a given location, given the observer's equipment and the seeing forecast.

pub mod config;
pub mod constants;
pub mod distance;
pub mod error;
pub mod formatters;
pub mod http;
pub mod models;
pub mod night;
pub mod rating;
pub mod request;
pub mod service;
pub mod sources;
pub mod targets;
pub mod weather;

pub use config::AppConfig;
pub use error::{AstroError, AstroResult};
pub use night::{NightReport, ViewingPlanner};
pub use request::ViewingRequest;
