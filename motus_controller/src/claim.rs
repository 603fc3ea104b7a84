//! Actuator resource claimer.
//!
//! All-or-nothing: the name list is validated as a whole before the first
//! lookup, every name is resolved into a temporary set, and only a fully
//! resolved set is returned. On any failure the temporary set is dropped, so
//! no caller ever holds a partial grip on the hardware.

use heapless::Vec as FixedVec;
use motus_common::consts::MAX_ACTUATORS;
use motus_common::hal::{CommandInterface, JointHandle, LookupError, ResourceDirectory};
use motus_common::params::{ParameterSource, type_name};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Why a claim failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaimError {
    /// No actuator list at the configured key.
    #[error("no actuators given (expected parameter '{key}')")]
    MissingParameter {
        /// Parameter key.
        key: String,
    },

    /// The parameter is not a list.
    #[error("malformed actuator specification at '{key}': expected array, found {found}")]
    Malformed {
        /// Parameter key.
        key: String,
        /// TOML type found instead.
        found: &'static str,
    },

    /// A list entry is not a string.
    #[error("actuator names at '{key}' must all be strings: entry {index} is {found}")]
    NonStringEntry {
        /// Parameter key.
        key: String,
        /// Offending index.
        index: usize,
        /// TOML type found instead.
        found: &'static str,
    },

    /// A name appears twice.
    #[error("actuator '{name}' listed more than once")]
    DuplicateName {
        /// Repeated name.
        name: String,
    },

    /// More names than the fixed capacity.
    #[error("{count} actuators requested, at most {max} supported")]
    TooMany {
        /// Requested count.
        count: usize,
        /// Capacity.
        max: usize,
    },

    /// The directory could not resolve a name.
    #[error("could not claim actuator '{name}' through the {interface} interface: {source}")]
    ResourceUnavailable {
        /// Offending name.
        name: String,
        /// Interface requested.
        interface: CommandInterface,
        /// Directory error.
        #[source]
        source: LookupError,
    },
}

impl ClaimError {
    /// Name of the actuator that could not be resolved, if that was the cause.
    pub fn offending_name(&self) -> Option<&str> {
        match self {
            Self::ResourceUnavailable { name, .. } | Self::DuplicateName { name } => Some(name),
            _ => None,
        }
    }

    /// Whether this is a configuration problem rather than a hardware one.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::ResourceUnavailable { .. })
    }
}

/// Ordered, fixed-capacity set of claimed actuators.
///
/// Index `i` corresponds to entry `i` of the configured name list and to
/// entry `i` of every command vector.
#[derive(Debug, Clone, Default)]
pub struct ClaimedActuatorSet {
    handles: FixedVec<JointHandle, MAX_ACTUATORS>,
}

impl ClaimedActuatorSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claimed actuators.
    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether nothing is claimed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles in claim order.
    #[inline]
    pub fn as_slice(&self) -> &[JointHandle] {
        &self.handles
    }

    /// Iterate handles in claim order.
    pub fn iter(&self) -> std::slice::Iter<'_, JointHandle> {
        self.handles.iter()
    }

    /// Names in claim order.
    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(JointHandle::name).collect()
    }
}

impl<'a> IntoIterator for &'a ClaimedActuatorSet {
    type Item = &'a JointHandle;
    type IntoIter = std::slice::Iter<'a, JointHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read and validate the actuator name list at `key`.
///
/// No directory is touched here; any format problem surfaces before the
/// first lookup.
pub fn actuator_names(params: &dyn ParameterSource, key: &str) -> Result<Vec<String>, ClaimError> {
    let value = params.get(key).ok_or_else(|| ClaimError::MissingParameter {
        key: key.to_string(),
    })?;
    let entries = value.as_array().ok_or_else(|| ClaimError::Malformed {
        key: key.to_string(),
        found: type_name(value),
    })?;
    if entries.len() > MAX_ACTUATORS {
        return Err(ClaimError::TooMany {
            count: entries.len(),
            max: MAX_ACTUATORS,
        });
    }

    let mut names = Vec::with_capacity(entries.len());
    let mut seen = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let name = entry.as_str().ok_or_else(|| ClaimError::NonStringEntry {
            key: key.to_string(),
            index,
            found: type_name(entry),
        })?;
        if !seen.insert(name) {
            return Err(ClaimError::DuplicateName {
                name: name.to_string(),
            });
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Resolve every name through `directory`.
///
/// Returns a set index-aligned with `names`, or an error naming the first
/// actuator that could not be resolved. Handles resolved before the failure
/// are released.
pub fn claim(
    directory: &dyn ResourceDirectory,
    names: &[String],
    interface: CommandInterface,
) -> Result<ClaimedActuatorSet, ClaimError> {
    if names.len() > MAX_ACTUATORS {
        return Err(ClaimError::TooMany {
            count: names.len(),
            max: MAX_ACTUATORS,
        });
    }

    let mut pending = ClaimedActuatorSet::new();
    for name in names {
        let handle = directory
            .lookup(name, interface)
            .map_err(|source| ClaimError::ResourceUnavailable {
                name: name.clone(),
                interface,
                source,
            })?;
        debug!("Found joint '{}' in the '{}' interface", name, interface);
        pending
            .handles
            .push(handle)
            .map_err(|_| ClaimError::TooMany {
                count: names.len(),
                max: MAX_ACTUATORS,
            })?;
    }
    Ok(pending)
}

/// [`actuator_names`] followed by [`claim`].
pub fn claim_from_parameters(
    directory: &dyn ResourceDirectory,
    params: &dyn ParameterSource,
    key: &str,
    interface: CommandInterface,
) -> Result<ClaimedActuatorSet, ClaimError> {
    let names = actuator_names(params, key)?;
    claim(directory, &names, interface)
}
