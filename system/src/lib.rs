pub extern crate bincode;
pub extern crate serde;
pub extern crate serde_json;

mod codec;
mod document_store;
mod error;
mod message;
mod palette;
mod participant_tracker;
mod property_bag;
mod session;
mod session_registry;
mod types;

pub use codec::*;
pub use document_store::DocumentStore;
pub use error::*;
pub use message::*;
pub use palette::*;
pub use participant_tracker::*;
pub use property_bag::PropertyBag;
pub use session::Session;
pub use session_registry::SessionRegistry;
pub use types::*;
