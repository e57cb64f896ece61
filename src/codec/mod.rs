//! Byte codecs at the call boundary.
//!
//! - [`decoder`]: problem bytes → validated [`Problem`](crate::models::Problem)
//! - [`encoder`]: best [`Schedule`](crate::models::Schedule) → result bytes

pub mod decoder;
pub mod encoder;

pub use decoder::{MessagePackDecoder, ProblemDecoder, decode_problem};
pub use encoder::{decode_schedule, encode_schedule};
