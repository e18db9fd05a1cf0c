//! OneBot v11 adapter for the invite warden.
//!
//! - [`OneBotClient`] performs group actions over the HTTP action API
//! - [`parse_event`] turns event posts into platform-neutral events
//! - [`OneBotTransportFactory`] builds clients for peers as they connect

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod event;
mod factory;

pub use client::OneBotClient;
pub use event::parse_event;
pub use factory::OneBotTransportFactory;
