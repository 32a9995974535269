//! Repeated attack simulation for one or more weapons and the reduction of the results into averages.

use alloc::{
	collections::BTreeMap,
	format,
	string::{String, ToString},
	vec::Vec,
};

use serde::Serialize;

use crate::{
	dice::{self, Roller},
	weapon::{AttackMode, Damage, Weapon},
};

/// Key of the derived sum of all per-type averages
pub const TOTAL_DAMAGE: &str = "Total Damage";

/// Number of iterations a simulation runs for when none is specified
pub const DEFAULT_ITERATIONS: u64 = 100;

/// Most attack results reserved up front per weapon and kind of attack; histories grow past this as needed
const MAX_PREALLOCATED: usize = 4096;

/// Average damage per damage type, plus [`TOTAL_DAMAGE`]
pub type Averages = BTreeMap<String, f64>;

/// Sums a set of attack results per damage type.
///
/// # Errors
/// If a sum doesn't fit in an `i64`, [`dice::Error::Overflow`] is returned.
///
/// # Examples
/// ```
/// use arsenal::{stats::reduce, weapon::Damage};
///
/// let attacks: Vec<Damage> = vec![
/// 	[("Physical".to_owned(), 4), ("Fire".to_owned(), 2)].into(),
/// 	[("Physical".to_owned(), 6)].into(),
/// ];
/// let reduced = reduce(&attacks)?;
/// assert_eq!(reduced["Physical"], 10);
/// assert_eq!(reduced["Fire"], 2);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
pub fn reduce<'a>(attacks: impl IntoIterator<Item = &'a Damage>) -> Result<Damage, dice::Error> {
	attacks.into_iter().try_fold(Damage::new(), |mut reduced, attack| {
		for (kind, value) in attack {
			let total = reduced.entry(kind.clone()).or_insert(0);
			*total = total
				.checked_add(*value)
				.ok_or_else(|| dice::Error::Overflow(format!("total {kind} damage")))?;
		}
		Ok(reduced)
	})
}

/// Divides reduced damage by the number of iterations it was accumulated over, adding the [`TOTAL_DAMAGE`] of all
/// types. Zero iterations yield averages of zero.
///
/// # Examples
/// ```
/// use arsenal::{stats::{averages, TOTAL_DAMAGE}, weapon::Damage};
///
/// let reduced: Damage = [("Physical".to_owned(), 30), ("Fire".to_owned(), 10)].into();
/// let averages = averages(&reduced, 10);
/// assert_eq!(averages["Physical"], 3.0);
/// assert_eq!(averages["Fire"], 1.0);
/// assert_eq!(averages[TOTAL_DAMAGE], 4.0);
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "Damage sums and iteration counts are far below 2^52")]
pub fn averages(reduced: &Damage, iterations: u64) -> Averages {
	let mut total = 0.0;
	let mut averages: Averages = reduced
		.iter()
		.map(|(kind, sum)| {
			let average = if iterations == 0 {
				0.0
			} else {
				*sum as f64 / iterations as f64
			};
			total += average;
			(kind.clone(), average)
		})
		.collect();
	averages.insert(TOTAL_DAMAGE.to_string(), total);
	averages
}

/// Simulates attacks with registered weapons and keeps every result for later reduction
///
/// # Examples
/// ```
/// use arsenal::{dice::RandomBuffer, Stats, Weapon};
///
/// let mut stats = Stats::new();
/// stats.register(Weapon::new("Dagger"));
///
/// let mut roller = RandomBuffer::with_seed(42);
/// stats.run(&mut roller, 100)?.run(&mut roller, 50)?;
/// assert_eq!(stats.iterations(), 150);
/// assert_eq!(stats.attacks("Dagger").map(<[_]>::len), Some(150));
///
/// let report = stats.report(&mut roller)?;
/// assert_eq!(report.weapons["Dagger"].max["Physical"], 8.0);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Stats {
	/// Registered weapons by name
	weapons: BTreeMap<String, Weapon>,

	/// Results of genuine attacks by weapon name
	attacks: BTreeMap<String, Vec<Damage>>,

	/// Results of forced critical attacks by weapon name
	crit_attacks: BTreeMap<String, Vec<Damage>>,

	/// Total iterations run so far
	iterations: u64,
}

impl Stats {
	/// Creates a new aggregator with no weapons registered.
	#[must_use]
	#[inline]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a weapon under its name.
	pub fn register(&mut self, weapon: Weapon) -> &mut Self {
		let name = weapon.name().to_string();
		self.insert(name, weapon);
		self
	}

	/// Registers every weapon in a sequence under its name.
	pub fn register_all(&mut self, weapons: impl IntoIterator<Item = Weapon>) -> &mut Self {
		for weapon in weapons {
			self.register(weapon);
		}
		self
	}

	/// Registers every weapon in a labelled collection under its name, or under its label if the weapon's name is
	/// empty.
	pub fn register_map<K: Into<String>>(&mut self, weapons: impl IntoIterator<Item = (K, Weapon)>) -> &mut Self {
		for (label, weapon) in weapons {
			let name = if weapon.name().is_empty() {
				label.into()
			} else {
				weapon.name().to_string()
			};
			self.insert(name, weapon);
		}
		self
	}

	/// Stores a weapon with empty histories, replacing any weapon that already has the name.
	fn insert(&mut self, name: String, weapon: Weapon) {
		if self.weapons.contains_key(&name) {
			tracing::warn!(weapon = %name, "replacing registered weapon and clearing its history");
		}

		self.attacks.insert(name.clone(), Vec::new());
		self.crit_attacks.insert(name.clone(), Vec::new());
		self.weapons.insert(name, weapon);
	}

	/// Runs `iterations` genuine attacks and `iterations` forced critical attacks with every registered weapon.
	///
	/// The run is all-or-nothing: if any attack fails, no results are kept and no weapon's crit count changes.
	///
	/// # Errors
	/// If rolling fails or damage overflows, an error variant is returned.
	pub fn run<R: Roller + ?Sized>(&mut self, roller: &mut R, iterations: u64) -> Result<&mut Self, dice::Error> {
		let capacity = usize::try_from(iterations).map_or(MAX_PREALLOCATED, |n| n.min(MAX_PREALLOCATED));
		let mut batches = Vec::with_capacity(self.weapons.len());

		for (name, weapon) in &self.weapons {
			let mut weapon = weapon.clone();
			let mut attacks = Vec::with_capacity(capacity);
			let mut crit_attacks = Vec::with_capacity(capacity);

			for _ in 0..iterations {
				attacks.push(weapon.attack(roller, AttackMode::Roll)?);
				crit_attacks.push(weapon.attack(roller, AttackMode::Crit)?);
			}

			tracing::debug!(weapon = %name, iterations, crits = weapon.crit_count(), "simulated attacks");
			batches.push((name.clone(), weapon, attacks, crit_attacks));
		}

		for (name, weapon, attacks, crit_attacks) in batches {
			self.attacks.entry(name.clone()).or_default().extend(attacks);
			self.crit_attacks.entry(name.clone()).or_default().extend(crit_attacks);
			self.weapons.insert(name, weapon);
		}
		self.iterations = self.iterations.saturating_add(iterations);

		Ok(self)
	}

	/// Reduces every weapon's history into a report. The max projection of each weapon comes from one forced max
	/// attack made here.
	///
	/// # Errors
	/// If rolling for a max projection fails or a history's totals overflow, an error variant is returned.
	pub fn report<R: Roller + ?Sized>(&mut self, roller: &mut R) -> Result<Report, dice::Error> {
		let mut weapons = BTreeMap::new();

		for (name, weapon) in &mut self.weapons {
			let attacks = self.attacks.get(name).map_or(&[][..], Vec::as_slice);
			let crit_attacks = self.crit_attacks.get(name).map_or(&[][..], Vec::as_slice);

			weapons.insert(
				name.clone(),
				WeaponReport {
					max: averages(&weapon.attack(roller, AttackMode::Max)?, 1),
					crit_avg: averages(&reduce(crit_attacks)?, self.iterations),
					avg: averages(&reduce(attacks)?, self.iterations),
					crit_rate_percent: weapon.crit_rate(self.iterations) * 100.0,
				},
			);
		}

		Ok(Report {
			iterations: self.iterations,
			weapons,
		})
	}

	/// Total iterations run so far.
	#[must_use]
	#[inline]
	pub const fn iterations(&self) -> u64 {
		self.iterations
	}

	/// Looks up a registered weapon by name.
	#[must_use]
	#[inline]
	pub fn weapon(&self, name: &str) -> Option<&Weapon> {
		self.weapons.get(name)
	}

	/// Iterates over the registered weapons in name order.
	pub fn weapons(&self) -> impl Iterator<Item = &Weapon> {
		self.weapons.values()
	}

	/// Results of a weapon's genuine attacks so far.
	#[must_use]
	pub fn attacks(&self, name: &str) -> Option<&[Damage]> {
		self.attacks.get(name).map(Vec::as_slice)
	}

	/// Results of a weapon's forced critical attacks so far.
	#[must_use]
	pub fn crit_attacks(&self, name: &str) -> Option<&[Damage]> {
		self.crit_attacks.get(name).map(Vec::as_slice)
	}
}

/// Statistics for every weapon of a [`Stats`] run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::exhaustive_structs)]
pub struct Report {
	/// Iterations the statistics cover
	pub iterations: u64,

	/// Statistics by weapon name
	pub weapons: BTreeMap<String, WeaponReport>,
}

/// Statistics for a single weapon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::exhaustive_structs)]
pub struct WeaponReport {
	/// Damage of a forced max attack
	pub max: Averages,

	/// Average damage of forced critical attacks
	pub crit_avg: Averages,

	/// Average damage of genuine attacks
	pub avg: Averages,

	/// Percentage of genuine attacks that were critical hits
	pub crit_rate_percent: f64,
}
