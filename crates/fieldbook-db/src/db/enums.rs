//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and
//! `PostgreSQL`,
//! and converts losslessly to and from its `fieldbook_core::types` counterpart.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident mirrors $($core:ident)::+ {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            AsExpression,
            FromSqlRow,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[diesel(sql_type = Text)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Returns the database string representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                match bytes.as_bytes() {
                    $(b if b == $text.as_bytes() => Ok(Self::$variant),)+
                    _ => Err("Unrecognized enum variant".into()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for $($core)::+ {
            fn from(db_value: $name) -> Self {
                match db_value {
                    $($name::$variant => Self::$variant),+
                }
            }
        }

        impl From<$($core)::+> for $name {
            fn from(core_value: $($core)::+) -> Self {
                type Core = $($core)::+;
                match core_value {
                    $(Core::$variant => Self::$variant),+
                }
            }
        }
    };
}

text_enum! {
    /// Maps to `schedule_slot.status`.
    SlotStatus mirrors fieldbook_core::types::SlotStatus {
        Available => "available",
        Booked => "booked",
    }
}

text_enum! {
    /// Maps to `booking_request.status`.
    RequestStatus mirrors fieldbook_core::types::RequestStatus {
        Pending => "pending",
        Booked => "booked",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Maps to `booking.status`.
    BookingStatus mirrors fieldbook_core::types::BookingStatus {
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Maps to `payment.mode`.
    PaymentMode mirrors fieldbook_core::types::PaymentMode {
        Cash => "cash",
        Online => "online",
    }
}

text_enum! {
    /// Maps to `payment.status`.
    PaymentStatus mirrors fieldbook_core::types::PaymentStatus {
        Pending => "pending",
        Completed => "completed",
    }
}
