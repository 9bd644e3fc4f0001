//! refdoc: descriptor graph, inheritance-aware attribute resolution and
//! rule-based routing for API documentation generators.
//!
//! The pipeline reads reflected descriptors ([`parser`]), stores them in a
//! [`descriptor::DescriptorGraph`], fills undocumented attributes from
//! inherited elements on read ([`resolve`]), places every element and
//! reference with ordered rule lists ([`router`]) and writes pages
//! ([`render`]).

pub mod descriptor;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod router;
