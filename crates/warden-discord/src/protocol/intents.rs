//! Gateway intents

use bitflags::bitflags;

bitflags! {
    /// Event groups requested at Identify
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        const GUILDS                  = 1 << 0;
        /// Privileged; needed for member joins and member listing
        const GUILD_MEMBERS           = 1 << 1;
        const GUILD_MESSAGES          = 1 << 9;
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Privileged; needed to read command text
        const MESSAGE_CONTENT         = 1 << 15;
    }
}

impl Intents {
    /// Intents this bot identifies with
    #[must_use]
    pub const fn required() -> Self {
        Self::GUILDS
            .union(Self::GUILD_MEMBERS)
            .union(Self::GUILD_MESSAGES)
            .union(Self::GUILD_MESSAGE_REACTIONS)
            .union(Self::MESSAGE_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_bits() {
        assert_eq!(Intents::required().bits(), 1 + 2 + 512 + 1024 + 32768);
        assert!(Intents::required().contains(Intents::GUILD_MEMBERS));
    }
}
