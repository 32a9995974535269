use crate::{
	dice::{
		self,
		roller::{Bytes, RandomBuffer, Roller, Val as ValRoller},
	},
	stats::{averages, reduce, Stats, TOTAL_DAMAGE},
	weapon::{Damage, Weapon, PHYSICAL},
};

/// Roller that reads successfully a fixed number of times and then runs dry
struct Limited {
	left: u32,
}

impl Roller for Limited {
	fn read(&mut self, _bound: u32) -> Result<u32, dice::Error> {
		if self.left == 0 {
			return Err(dice::Error::RandomUnavailable("limited".to_owned()));
		}
		self.left -= 1;
		Ok(1)
	}
}

fn weapon(name: &str, damage: &str) -> Weapon {
	let mut weapon = Weapon::new(name);
	weapon.set_damage(damage).unwrap();
	weapon
}

#[test]
fn reduce_sums_per_type() {
	let attacks: Vec<Damage> = vec![
		[(PHYSICAL.to_owned(), 3), ("Fire".to_owned(), 1)].into(),
		[(PHYSICAL.to_owned(), 5)].into(),
		[("Cold".to_owned(), 2)].into(),
	];
	let reduced = reduce(&attacks).unwrap();
	assert_eq!(reduced.len(), 3);
	assert_eq!(reduced[PHYSICAL], 8);
	assert_eq!(reduced["Fire"], 1);
	assert_eq!(reduced["Cold"], 2);
	assert!(reduce(&Vec::<Damage>::new()).unwrap().is_empty());
}

#[test]
fn reduce_overflow() {
	let half = i64::MAX / 2 + 1;
	let attacks: Vec<Damage> = vec![[(PHYSICAL.to_owned(), half)].into(); 4];
	assert!(matches!(reduce(&attacks), Err(dice::Error::Overflow(..))));
	assert_eq!(reduce(&attacks[..1]).unwrap()[PHYSICAL], half);
}

#[test]
fn report_overflow() {
	let mut stats = Stats::new();
	stats.register(weapon("Siege Engine", &(i64::MAX / 3 + 1).to_string()));

	// Every single attack fits, doubled crits included, but four of them don't
	stats.run(&mut ValRoller(1), 4).unwrap();
	assert!(matches!(stats.report(&mut ValRoller(1)), Err(dice::Error::Overflow(..))));
}

#[test]
fn huge_runs_fail_without_preallocating() {
	let mut stats = Stats::new();
	stats.register(weapon("Axe", "1d8"));

	let result = stats.run(&mut Limited { left: 0 }, u64::MAX);
	assert!(matches!(result, Err(dice::Error::RandomUnavailable(..))));
	assert_eq!(stats.iterations(), 0);
}

#[test]
fn averages_add_total() {
	let reduced: Damage = [(PHYSICAL.to_owned(), 45), ("Fire".to_owned(), 15)].into();
	let result = averages(&reduced, 10);
	assert!((result[PHYSICAL] - 4.5).abs() < f64::EPSILON);
	assert!((result["Fire"] - 1.5).abs() < f64::EPSILON);
	assert!((result[TOTAL_DAMAGE] - 6.0).abs() < f64::EPSILON);
}

#[test]
fn zero_iteration_averages() {
	let reduced: Damage = [(PHYSICAL.to_owned(), 45)].into();
	let result = averages(&reduced, 0);
	assert!(result[PHYSICAL].abs() < f64::EPSILON);
	assert!(result[TOTAL_DAMAGE].abs() < f64::EPSILON);

	let empty = averages(&Damage::new(), 5);
	assert_eq!(empty.len(), 1);
	assert!(empty[TOTAL_DAMAGE].abs() < f64::EPSILON);
}

#[test]
fn run_appends_histories() {
	let mut stats = Stats::new();
	stats.register(weapon("Longsword", "1d8")).register(weapon("Dagger", "1d4"));

	let mut roller = RandomBuffer::with_seed(1);
	stats.run(&mut roller, 100).unwrap();
	assert_eq!(stats.iterations(), 100);
	for name in ["Longsword", "Dagger"] {
		assert_eq!(stats.attacks(name).map(<[_]>::len), Some(100));
		assert_eq!(stats.crit_attacks(name).map(<[_]>::len), Some(100));
	}

	stats.run(&mut roller, 25).unwrap();
	assert_eq!(stats.iterations(), 125);
	assert_eq!(stats.attacks("Dagger").map(<[_]>::len), Some(125));
	assert_eq!(stats.crit_attacks("Longsword").map(<[_]>::len), Some(125));
	assert_eq!(stats.attacks("Rapier"), None);
}

#[test]
fn crit_attacks_are_multiplied() {
	let mut stats = Stats::new();
	stats.register(weapon("Club", "1d6"));
	stats.run(&mut RandomBuffer::with_seed(3), 200).unwrap();

	for damage in stats.crit_attacks("Club").unwrap() {
		assert!([2, 4, 6, 8, 10, 12].contains(&damage[PHYSICAL]));
	}
	for damage in stats.attacks("Club").unwrap() {
		assert!((1..=12).contains(&damage[PHYSICAL]));
	}
}

#[test]
fn run_counts_only_genuine_crits() {
	let mut stats = Stats::new();
	stats.register(weapon("Club", "1d6"));

	// Every d20 shows 1, so only the forced attacks crit
	stats.run(&mut ValRoller(1), 50).unwrap();
	assert_eq!(stats.weapon("Club").unwrap().crit_count(), 0);

	stats.run(&mut ValRoller(20), 50).unwrap();
	assert_eq!(stats.weapon("Club").unwrap().crit_count(), 50);
}

#[test]
fn registering_again_replaces_and_clears() {
	let mut stats = Stats::new();
	stats.register(weapon("Spear", "1d6"));
	stats.run(&mut ValRoller(20), 10).unwrap();
	assert_eq!(stats.attacks("Spear").map(<[_]>::len), Some(10));

	stats.register(weapon("Spear", "1d8"));
	assert_eq!(stats.attacks("Spear").map(<[_]>::len), Some(0));
	assert_eq!(stats.crit_attacks("Spear").map(<[_]>::len), Some(0));
	assert_eq!(stats.weapon("Spear").unwrap().crit_count(), 0);
	assert_eq!(stats.weapons().count(), 1);
}

#[test]
fn register_all_and_map() {
	let mut stats = Stats::new();
	stats.register_all([weapon("Axe", "1d8"), weapon("Bow", "1d6")]);
	stats.register_map([("offhand", weapon("", "1d4")), ("main", weapon("Maul", "2d6"))]);

	let names: Vec<&str> = stats.weapons().map(Weapon::name).collect();
	assert_eq!(names, ["Axe", "Bow", "Maul", ""]);
	assert!(stats.weapon("offhand").is_some());
	assert!(stats.weapon("main").is_none());
	assert_eq!(stats.weapon("Maul").map(Weapon::damage).map(ToString::to_string), Some("2d6".to_owned()));
}

#[test]
fn failed_run_keeps_nothing() {
	let mut stats = Stats::new();
	stats.register(weapon("Axe", "1d8")).register(weapon("Bow", "1d6"));
	stats.run(&mut ValRoller(20), 5).unwrap();

	// Enough reads for the first weapon's run, but not the second's
	let result = stats.run(&mut Limited { left: 40 }, 10);
	assert!(matches!(result, Err(dice::Error::RandomUnavailable(..))));
	assert_eq!(stats.iterations(), 5);
	assert_eq!(stats.attacks("Axe").map(<[_]>::len), Some(5));
	assert_eq!(stats.crit_attacks("Bow").map(<[_]>::len), Some(5));
	assert_eq!(stats.weapon("Axe").unwrap().crit_count(), 5);
}

#[test]
fn report_shape() {
	let mut stats = Stats::new();
	let mut sword = weapon("Sword", "1d8");
	sword.enchant("Fire", "1d6").unwrap();
	stats.register(sword);

	stats.run(&mut ValRoller(20), 10).unwrap();
	let report = stats.report(&mut ValRoller(1)).unwrap();
	assert_eq!(report.iterations, 10);

	let sword = &report.weapons["Sword"];
	assert!((sword.max[PHYSICAL] - 16.0).abs() < f64::EPSILON);
	assert!((sword.max["Fire"] - 12.0).abs() < f64::EPSILON);
	assert!((sword.max[TOTAL_DAMAGE] - 28.0).abs() < f64::EPSILON);
	assert!((sword.avg[PHYSICAL] - 40.0).abs() < f64::EPSILON);
	assert!((sword.crit_avg["Fire"] - 40.0).abs() < f64::EPSILON);
	assert!((sword.avg[TOTAL_DAMAGE] - 80.0).abs() < f64::EPSILON);
	assert!((sword.crit_rate_percent - 100.0).abs() < f64::EPSILON);
}

#[test]
fn report_without_runs() {
	let mut stats = Stats::new();
	stats.register(weapon("Sling", "1d4"));

	let report = stats.report(&mut RandomBuffer::new(Bytes::new([0_u8; 0]))).unwrap();
	let sling = &report.weapons["Sling"];
	assert_eq!(report.iterations, 0);
	assert_eq!(sling.avg.len(), 1);
	assert!(sling.avg[TOTAL_DAMAGE].abs() < f64::EPSILON);
	assert!(sling.crit_rate_percent.abs() < f64::EPSILON);
	assert!((sling.max[PHYSICAL] - 8.0).abs() < f64::EPSILON);
}

#[test]
#[cfg(feature = "std")]
fn report_serializes() {
	let mut stats = Stats::new();
	stats.register(weapon("Sling", "2"));
	stats.run(&mut ValRoller(1), 4).unwrap();

	let json = serde_json::to_value(stats.report(&mut ValRoller(1)).unwrap()).unwrap();
	assert_eq!(json["iterations"], 4);
	assert_eq!(json["weapons"]["Sling"]["avg"]["Physical"], 2.0);
	assert_eq!(json["weapons"]["Sling"]["critAvg"]["Total Damage"], 4.0);
	assert_eq!(json["weapons"]["Sling"]["critRatePercent"], 0.0);
}
