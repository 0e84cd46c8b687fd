//! Identifiers for clusters, resource groups and resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A cluster, attribute or command identifier.
///
/// Ids arrive either as numbers taken from the cluster library
/// (`6`, `0x0402`) or as symbolic keys (`"genOnOff"`, `"onOff"`).
/// The directory decides which canonical key an id maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(u32),
    Key(String),
}

impl Id {
    /// Parse a string id; canonical decimal numbers become [`Id::Num`].
    ///
    /// `"007"` or `"+7"` stay keys so that `to_string` gives back the input.
    pub fn parse(s: &str) -> Self {
        match s.parse::<u32>() {
            Ok(n) if n.to_string() == s => Id::Num(n),
            _ => Id::Key(s.to_string()),
        }
    }

    /// The numeric id, if this is one.
    pub fn as_num(&self) -> Option<u32> {
        match self {
            Id::Num(n) => Some(*n),
            Id::Key(_) => None,
        }
    }

    /// The symbolic key, if this is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Id::Num(_) => None,
            Id::Key(k) => Some(k),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Key(k) => f.write_str(k),
        }
    }
}

impl From<u32> for Id {
    fn from(n: u32) -> Self {
        Id::Num(n)
    }
}

impl From<u16> for Id {
    fn from(n: u16) -> Self {
        Id::Num(n.into())
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::parse(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::parse(&s)
    }
}

impl From<&String> for Id {
    fn from(s: &String) -> Self {
        Id::parse(s)
    }
}

impl From<&Id> for Id {
    fn from(id: &Id) -> Self {
        id.clone()
    }
}

// ===========================================================================
// Sid
// ===========================================================================

/// Kind of resource group held by a [`Spec`](crate::Spec).
///
/// Five kinds are recognized by the cluster model; anything else is kept
/// as [`Sid::Custom`] and stored without validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sid {
    /// Direction flag: a single numeric `value` (bit0 in, bit1 out).
    Dir,
    /// Attribute values.
    Attrs,
    /// Attribute access flags (`R`, `W`, `RW`, `WR`).
    Acls,
    /// Functional commands.
    Cmds,
    /// Command responses.
    CmdRsps,
    Custom(String),
}

impl Sid {
    /// The recognized kinds in their canonical order.
    pub const KNOWN: [Sid; 5] = [Sid::Dir, Sid::Attrs, Sid::Acls, Sid::Cmds, Sid::CmdRsps];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Sid::Dir => "dir",
            Sid::Attrs => "attrs",
            Sid::Acls => "acls",
            Sid::Cmds => "cmds",
            Sid::CmdRsps => "cmdRsps",
            Sid::Custom(s) => s,
        }
    }

    /// Whether this is a kind outside the five recognized ones.
    pub fn is_custom(&self) -> bool {
        matches!(self, Sid::Custom(_))
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sid {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dir" => Sid::Dir,
            "attrs" => Sid::Attrs,
            "acls" => Sid::Acls,
            "cmds" => Sid::Cmds,
            "cmdRsps" => Sid::CmdRsps,
            other => Sid::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Sid {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(sid) => sid,
            Err(never) => match never {},
        }
    }
}

impl From<&Sid> for Sid {
    fn from(sid: &Sid) -> Self {
        sid.clone()
    }
}
