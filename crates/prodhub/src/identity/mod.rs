//! Authenticated identity: the replay-latest stream and auth providers.

mod memory;
mod stream;

pub use memory::InMemoryAuthProvider;
pub use stream::IdentityStream;
