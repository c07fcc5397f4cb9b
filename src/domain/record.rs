use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Scalar value of a record, positioned by the virtual channel's attribute order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

macro_rules! value_from {
    ($variant:ident: $target:ty => $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

value_from!(Int: i64 => i8, i16, i32, i64, u8, u16, u32);
value_from!(UInt: u64 => u64);
value_from!(Float: f64 => f32, f64);
value_from!(Text: String => String, &str);

/// Data record of a virtual channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Absolute time, unique per virtual channel on the server
    pub timestamp: DateTime<Utc>,
    /// Values in order of the virtual channel attributes
    pub values: Vec<Value>,
}

impl Record {
    pub fn new<Tz: TimeZone>(timestamp: DateTime<Tz>, values: Vec<Value>) -> Self {
        Self {
            timestamp: timestamp.with_timezone(&Utc),
            values,
        }
    }
}
