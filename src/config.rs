//! Simulation files: which weapons to compare and how long to run for. Requires the `std` feature.
//!
//! A simulation file is JSON:
//! ```json
//! {
//! 	"iterations": 1000,
//! 	"seed": 42,
//! 	"weapons": [
//! 		{ "name": "Longsword", "damage": "1d8", "bonus": [{ "type": "Strength", "bonus": 3 }] },
//! 		{ "name": "Rapier", "damage": "1d6", "critRange": "18-20" }
//! 	]
//! }
//! ```
//!
//! `weapons` may also be an object keyed by label, in which case a weapon without a name is registered under its
//! label.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use std::{fs, io, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::{
	stats::{Stats, DEFAULT_ITERATIONS},
	weapon::{self, Weapon, WeaponDescriptor},
};

/// Contents of a simulation file
///
/// # Examples
/// ```
/// use arsenal::config::Config;
///
/// let config = Config::from_json(r#"{ "weapons": { "main": { "damage": "2d6" }, "off": { "name": "Dagger" } } }"#)?;
/// assert_eq!(config.iterations(), 100);
///
/// let stats = config.stats()?;
/// assert!(stats.weapon("main").is_some());
/// assert!(stats.weapon("Dagger").is_some());
/// # Ok::<(), arsenal::config::Error>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(clippy::exhaustive_structs)]
pub struct Config {
	/// Number of iterations to run; [`DEFAULT_ITERATIONS`] if absent
	pub iterations: Option<u64>,

	/// Seed for reproducible (non-cryptographic) randomness; the OS random source is used if absent
	pub seed: Option<u64>,

	/// Weapons to simulate
	pub weapons: Weapons,
}

impl Config {
	/// Parses a simulation file's contents.
	///
	/// # Errors
	/// If the JSON is malformed or doesn't match the expected shape, [`Error::Parse`] is returned.
	pub fn from_json(json: &str) -> Result<Self, Error> {
		Ok(serde_json::from_str(json)?)
	}

	/// Reads and parses a simulation file.
	///
	/// # Errors
	/// If the file can't be read, [`Error::Io`] is returned. If its contents are invalid, [`Error::Parse`] is
	/// returned.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref();
		let json = fs::read_to_string(path).map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;

		let config = Self::from_json(&json)?;
		tracing::debug!(path = %path.display(), weapons = config.weapons.len(), "loaded simulation file");
		Ok(config)
	}

	/// Number of iterations to run.
	#[must_use]
	#[inline]
	pub fn iterations(&self) -> u64 {
		self.iterations.unwrap_or(DEFAULT_ITERATIONS)
	}

	/// Builds every weapon and registers them with a fresh aggregator.
	///
	/// # Errors
	/// If any weapon descriptor is invalid, [`Error::Weapon`] is returned.
	pub fn stats(&self) -> Result<Stats, Error> {
		let mut stats = Stats::new();

		match &self.weapons {
			Weapons::List(descriptors) => {
				let weapons = descriptors
					.iter()
					.cloned()
					.map(Weapon::try_from)
					.collect::<Result<Vec<_>, _>>()?;
				stats.register_all(weapons);
			}
			Weapons::Map(descriptors) => {
				let weapons = descriptors
					.iter()
					.map(|(label, descriptor)| {
						let mut descriptor = descriptor.clone();
						if descriptor.name.as_deref().map_or(true, str::is_empty) {
							descriptor.name = Some(label.clone());
						}
						Ok((label.clone(), Weapon::try_from(descriptor)?))
					})
					.collect::<Result<Vec<_>, Error>>()?;
				stats.register_map(weapons);
			}
		}

		Ok(stats)
	}
}

/// Weapon descriptors of a simulation file, either as a list or keyed by label
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Weapons {
	/// Weapons in order
	List(Vec<WeaponDescriptor>),

	/// Weapons by label
	Map(BTreeMap<String, WeaponDescriptor>),
}

impl Weapons {
	/// Number of weapon descriptors.
	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			Self::List(descriptors) => descriptors.len(),
			Self::Map(descriptors) => descriptors.len(),
		}
	}

	/// Whether there are no weapon descriptors.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for Weapons {
	#[inline]
	fn default() -> Self {
		Self::List(Vec::new())
	}
}

/// An error resulting from loading a simulation file
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The file couldn't be read.
	#[error("unable to read {}: {source}", .path.display())]
	Io {
		/// Path of the file
		path: PathBuf,

		/// Underlying I/O error
		#[source]
		source: io::Error,
	},

	/// The file isn't valid JSON or doesn't describe a simulation.
	#[error("invalid simulation file: {0}")]
	Parse(#[from] serde_json::Error),

	/// A weapon descriptor is invalid.
	#[error("invalid weapon: {0}")]
	Weapon(#[from] weapon::Error),
}
