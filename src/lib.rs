//! A DNS message codec, and an iterative resolver that walks the hierarchy
//! down from the root servers itself instead of forwarding to another
//! recursive resolver.
//!
//! # Example
//!
//! ```rust,no_run
//! use walkdns::clients::{Config, Resolver};
//! use walkdns::{Message, Type};
//!
//! let resolver = Resolver::new(Config::default());
//! let response = resolver
//!     .resolve(&Message::query("example.com", Type::A))
//!     .expect("resolution failed");
//!
//! println!("{}", response);
//! ```

#[macro_use]
mod cfg;

mod bail;
mod display;
mod dns;
mod errors;
mod io;
mod server;

pub mod clients;
pub mod hints;
pub mod name;
pub mod resource;
pub mod types;

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate lazy_static;

pub use crate::dns::HEADER_LEN;
pub use crate::errors::Error;
pub use crate::types::*;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::types::Message;
#[doc(inline)]
pub use crate::types::Question;
#[doc(inline)]
pub use crate::types::Record;
#[doc(inline)]
pub use crate::types::Resource;

#[doc(inline)]
pub use crate::resource::MX;

#[doc(inline)]
pub use crate::types::Class;

#[doc(inline)]
pub use crate::types::Type;
