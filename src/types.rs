//! Closed vocabularies shared by contacts, expenses, events and users.
//!
//! Each enum stores as its snake_case label (SQL and JSON alike) and parses
//! strictly: unknown labels are a `ParseEnumError`, never a fallback variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// String label for SQL storage.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseEnumError::new($kind, s))
            }
        }
    };
}

text_enum! {
    /// How the contact entered the pipeline.
    ContactSource as "contact source" {
        Event => "event",
        Referral => "referral",
        DirectClient => "direct_client",
        NonDirectClient => "non_direct_client",
        SocialMedia => "social_media",
        Other => "other",
    }
}

text_enum! {
    Profession as "profession" {
        Agent => "agent",
        Lender => "lender",
        Attorney => "attorney",
        Builder => "builder",
        Other => "other",
    }
}

text_enum! {
    /// Channel for contacts sourced from social media.
    SocialChannel as "social channel" {
        Linkedin => "linkedin",
        Facebook => "facebook",
        Instagram => "instagram",
        Other => "other",
    }
}

text_enum! {
    ExpenseCategory as "expense category" {
        Meal => "meal",
        Gift => "gift",
        EventTicket => "event_ticket",
        Travel => "travel",
        Marketing => "marketing",
        Other => "other",
    }
}

text_enum! {
    /// Kind of in-person touchpoint recorded against a warm lead.
    WarmLeadEventType as "warm lead event type" {
        Type1 => "type_1",
        Type2 => "type_2",
        Type3 => "type_3",
    }
}

text_enum! {
    AppRole as "role" {
        Admin => "admin",
        BdUser => "bd_user",
    }
}

impl ExpenseCategory {
    /// Display label: "event_ticket" becomes "Event ticket".
    pub fn label(&self) -> String {
        let text = self.as_str().replace('_', " ");
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
