//! AWS-oriented adapters and handlers for the UI asset deployer.
//!
//! Domain types live in `ui_assets_core`; this crate wires them to S3, the
//! CloudFormation callback endpoint and the Lambda runtime.

pub mod adapters;
pub mod handlers;
pub mod settings;
pub mod telemetry;
