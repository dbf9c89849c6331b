//! Cross-stage handoff primitives.

pub mod mailbox;
pub mod shutdown;

pub use mailbox::{Delivery, Mailbox, MailboxPolicy, MailboxStats, PutError};
pub use shutdown::{ShutdownSignal, Wake};
