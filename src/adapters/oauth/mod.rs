//! OAuth identity provider adapters.
//!
//! - `LinuxDoIdentityProvider` - production adapter for connect.linux.do
//! - `MockIdentityProvider` - canned profiles for tests

mod linuxdo;
mod mock;

pub use linuxdo::{LinuxDoConfig, LinuxDoIdentityProvider, DEFAULT_TOKEN_URL, DEFAULT_USER_URL};
pub use mock::MockIdentityProvider;
