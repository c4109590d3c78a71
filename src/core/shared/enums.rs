//! Closed-set columns stored as PostgreSQL `SMALLINT`.
//!
//! Each enum maps to a fixed integer code on the wire to the database and to a
//! SCREAMING_SNAKE_CASE string in JSON, which is what the forms submit.

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::SmallInt;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::io::Write;

macro_rules! smallint_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
        #[diesel(sql_type = SmallInt)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[repr(i16)]
        pub enum $name {
            $($variant = $code),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ToSql<SmallInt, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                let v = *self as i16;
                out.write_all(&v.to_be_bytes())?;
                Ok(serialize::IsNull::No)
            }
        }

        impl FromSql<SmallInt, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let value = i16::from_sql(bytes)?;
                match value {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), value).into()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

smallint_enum! {
    /// Account role. Super admins manage everything; supervisors work inside
    /// the projects they are assigned to.
    pub enum Role {
        SuperAdmin = 0 => "SUPER_ADMIN",
        Supervisor = 1 => "SUPERVISOR",
    }
}

smallint_enum! {
    pub enum ProjectStatus {
        Pending = 0 => "PENDING",
        Active = 1 => "ACTIVE",
        Paused = 2 => "PAUSED",
        Completed = 3 => "COMPLETED",
        Cancelled = 4 => "CANCELLED",
    }
}

impl ProjectStatus {
    /// Projects in these states still have work attached and must not be deleted.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Pending
    }
}

smallint_enum! {
    pub enum WorkerType {
        Permanent = 0 => "PERMANENT",
        Temporary = 1 => "TEMPORARY",
    }
}

smallint_enum! {
    pub enum AttendanceStatus {
        Present = 0 => "PRESENT",
        Absent = 1 => "ABSENT",
        HalfDay = 2 => "HALF_DAY",
    }
}

smallint_enum! {
    /// Review state shared by material and labor requests.
    pub enum RequestStatus {
        Pending = 0 => "PENDING",
        Approved = 1 => "APPROVED",
        Rejected = 2 => "REJECTED",
    }
}

smallint_enum! {
    pub enum PaymentMethod {
        Cash = 0 => "CASH",
        BankTransfer = 1 => "BANK_TRANSFER",
        MobileMoney = 2 => "MOBILE_MONEY",
    }
}
