pub mod configuration;
pub mod controllers;
pub mod domain;
pub mod helper;
pub mod ports;
pub mod proto;
pub mod repositories;
pub mod startup;
pub mod telemetry;
