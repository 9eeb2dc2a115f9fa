use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::decode::{decode_scalar, DecodeContext};
use crate::selection::{Field, Selectable};

/// The GraphQL `ID` scalar.
///
/// Serialized as a string. Servers that send numeric identifiers are accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ID(pub String);

impl ID {
    pub fn new(id: impl Into<String>) -> Self {
        ID(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ID {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => ID(text),
            Raw::Number(number) => ID(number.to_string()),
        })
    }
}

impl fmt::Display for ID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ID {
    fn from(id: &str) -> Self {
        ID(id.to_string())
    }
}

impl From<String> for ID {
    fn from(id: String) -> Self {
        ID(id)
    }
}

impl PartialEq<str> for ID {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ID {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

macro_rules! leaf_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Selectable for $ty {
                fn selections(_: Option<&Self>) -> Vec<Field> {
                    Vec::new()
                }

                fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
                    decode_scalar(self, value, cx)
                }
            }
        )*
    };
}

leaf_scalars!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, ID, (),
);

/// Raw JSON: selected as a leaf and kept exactly as the server sent it, `null` included.
impl Selectable for Value {
    fn selections(_: Option<&Self>) -> Vec<Field> {
        Vec::new()
    }

    fn decode(&mut self, value: &Value, _: &mut DecodeContext) {
        *self = value.clone();
    }
}
