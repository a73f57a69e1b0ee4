//! Newtype identifiers shared across the engine and room layers, so neither has to depend on
//! the other just to name a player or a word.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(RoomId, "Identifies a room for its whole lifetime.");
uuid_id!(PlayerId, "Identifies a player (and their session) across reconnects within a room.");
uuid_id!(SpectatorId, "Identifies a spectator session.");
uuid_id!(WordId, "Identifies one claimed word. A steal destroys the victim's id and mints a new one.");
uuid_id!(PreStealEntryId, "Identifies one entry in a player's pre-steal list.");
uuid_id!(ClaimEventId, "Identifies one claim event, manual or pre-steal, for replay/log annotation.");
