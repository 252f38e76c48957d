//! Domain entities - core business objects

mod ban;
mod channel;
mod guild;
mod member;
mod message;
mod pending_check;
mod role;

pub use ban::BanEntry;
pub use channel::Channel;
pub use guild::Guild;
pub use member::Member;
pub use message::{Embed, EmbedField, Message, OutgoingMessage};
pub use pending_check::{overdue_cutoff, PendingCheck};
pub use role::Role;
