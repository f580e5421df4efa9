//! # Payload Synthesis
//!
//! Builds randomized but schema-consistent tracking events.
//!
//! - **catalog**: fixed page, referrer, user-agent and locale pools
//! - **synthesizer**: weighted event kinds, viewports, purchases
//! - **schema**: the `flat` and `nested` wire formats
//!
//! ```rust
//! use pixel_loadgen::config::PayloadConfig;
//! use pixel_loadgen::payload::{PayloadSchema, PayloadSynthesizer};
//!
//! let mut synth = PayloadSynthesizer::new(&PayloadConfig::default(), Some(7));
//! let user = synth.user();
//! let event = synth.event(&user);
//! let body = PayloadSchema::Flat.encode(&event).unwrap();
//! assert!(!body.is_empty());
//! ```

pub mod catalog;
pub mod schema;
pub mod synthesizer;

pub use schema::PayloadSchema;
pub use synthesizer::PayloadSynthesizer;
