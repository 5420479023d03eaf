//! Request data types shared by strata crates
//!
//! Currently this is the multi-value mapping used for
//! `application/x-www-form-urlencoded` and multipart form bodies.

pub mod query_dict;

pub use query_dict::{QueryDict, QueryDictError};
