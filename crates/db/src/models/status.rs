//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID, if known.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( v if v == $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Prompt lifecycle status.
    PromptStatus {
        Scheduled = 1,
        Active = 2,
        Voting = 3,
        Completed = 4,
    }
}

impl PromptStatus {
    /// Lowercase name matching the `prompt_statuses.name` seed value.
    pub fn name(self) -> &'static str {
        match self {
            PromptStatus::Scheduled => "scheduled",
            PromptStatus::Active => "active",
            PromptStatus::Voting => "voting",
            PromptStatus::Completed => "completed",
        }
    }

    /// Parse a lowercase status name (used by `?status=` filters).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "scheduled" => Some(PromptStatus::Scheduled),
            "active" => Some(PromptStatus::Active),
            "voting" => Some(PromptStatus::Voting),
            "completed" => Some(PromptStatus::Completed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challenge_core::phase;

    #[test]
    fn ids_match_core_constants() {
        assert_eq!(PromptStatus::Scheduled.id(), phase::STATUS_SCHEDULED);
        assert_eq!(PromptStatus::Active.id(), phase::STATUS_ACTIVE);
        assert_eq!(PromptStatus::Voting.id(), phase::STATUS_VOTING);
        assert_eq!(PromptStatus::Completed.id(), phase::STATUS_COMPLETED);
    }

    #[test]
    fn names_round_trip() {
        for id in 1..=4 {
            let status = PromptStatus::from_id(id).unwrap();
            assert_eq!(PromptStatus::from_name(status.name()), Some(status));
        }
        assert_eq!(PromptStatus::from_id(0), None);
        assert_eq!(PromptStatus::from_name("archived"), None);
    }
}
