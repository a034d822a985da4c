use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

mod error;
mod utils;

pub use error::{Error, Result};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// A validated container identifier.
///
/// Identifiers end up in engine request paths, so only the characters the
/// engine itself uses for ids and names are accepted.
///
/// # Examples
///
/// ```
/// # use unit_reporter::container::ContainerID;
/// let raw_id = "abc123abc123abc123abc123abc123abc123abc123abc123abc123abc123abcd";
/// let container_id = ContainerID::new(raw_id).unwrap();
/// assert_eq!(container_id.as_ref(), raw_id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the input is empty, longer than
    /// [`CONTAINER_ID_MAX_LEN`] or contains characters outside of `[A-Za-z0-9_.-]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use unit_reporter::container::ContainerID;
    /// assert!(ContainerID::new("web-1").is_ok());
    /// assert!(ContainerID::new("../etc").is_err());
    /// ```
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty()
            || src.len() > CONTAINER_ID_MAX_LEN
            || !utils::is_valid_id(src.as_bytes())
        {
            return Err(Error::InvalidContainerID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for ContainerID {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ContainerID {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ContainerID::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A container as returned by the runtime's list operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: ContainerID,
    pub names: Vec<String>,
}

impl ContainerSummary {
    pub fn new(id: ContainerID, names: Vec<String>) -> Self {
        Self { id, names }
    }

    /// The name reported for this container.
    ///
    /// Uses the first runtime name with exactly one leading `/` removed, or an
    /// empty string if the runtime reported no names at all.
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|name| name.strip_prefix('/').unwrap_or(name))
            .unwrap_or_default()
    }
}

/// The runtime state of a freshly inspected container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerState {
    pub running: bool,
    pub restarting: bool,
}
