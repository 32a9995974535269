use crate::dice::{
	roller::{Bytes, RandomBuffer, Roller, Val as ValRoller},
	Dice, Error,
};

#[test]
fn default_dice() {
	assert_eq!(Dice::default(), Dice::new(1, 4));
}

#[test]
fn dice_display() {
	assert_eq!(Dice::new(2, 6).to_string(), "2d6");
	assert_eq!(Dice::new(1, 100).to_string(), "1d100");
}

#[test]
fn dice_equality() {
	assert_eq!(Dice::new(4, 8), Dice::new(4, 8));
	assert_ne!(Dice::new(4, 8), Dice::new(4, 20));
	assert_ne!(Dice::new(4, 8), Dice::new(2, 8));
}

#[test]
fn max_totals() {
	for count in (1..=20).chain([255, 256, 300, 10_000]) {
		for sides in [1, 4, 6, 8, 10, 12, 20, 100, 255, 256, 1000] {
			let dice = Dice::new(count, sides);
			assert_eq!(dice.max_total().unwrap(), i64::from(count) * i64::from(sides));
			assert_eq!(ValRoller(1).roll(&dice, true).unwrap(), dice.max_total().unwrap());
		}
	}
}

#[test]
fn max_total_overflow() {
	let dice = Dice::new(u32::MAX, u32::MAX);
	assert!(matches!(dice.max_total(), Err(Error::Overflow(..))));
	assert!(matches!(ValRoller(1).roll(&dice, true), Err(Error::Overflow(..))));
	assert_eq!(Dice::new(u32::MAX, 2).max_total().unwrap(), i64::from(u32::MAX) * 2);
}

#[test]
fn many_dice_with_many_sides() {
	let mut roller = RandomBuffer::with_seed(5);
	let dice = Dice::new(300, 1000);
	for _ in 0..20 {
		let total = roller.roll(&dice, false).unwrap();
		assert!((300..=300 * 256).contains(&total));
	}
}

#[test]
fn max_roll_consumes_no_randomness() {
	let mut roller = RandomBuffer::new(Bytes::new([0_u8; 0]));
	assert_eq!(roller.roll(&Dice::new(3, 6), true).unwrap(), 18);
	assert!(matches!(
		roller.roll(&Dice::new(3, 6), false),
		Err(Error::RandomUnavailable(..))
	));
}

#[test]
fn rolls_sum_individual_draws() {
	let mut roller = RandomBuffer::new(Bytes::new([0, 1, 5]));
	assert_eq!(roller.roll(&Dice::new(3, 6), false).unwrap(), 1 + 2 + 6);
}

#[test]
fn convenience_dice() {
	let mut roller = ValRoller(1);
	assert_eq!(roller.d6(0, true).unwrap(), 6);
	assert_eq!(roller.d8(1, true).unwrap(), 8);
	assert_eq!(roller.d10(2, true).unwrap(), 20);
	assert_eq!(roller.d12(3, true).unwrap(), 36);
	assert_eq!(roller.d20(0, true).unwrap(), 20);
	assert_eq!(roller.d100(2, true).unwrap(), 200);
	assert_eq!(roller.d20(4, false).unwrap(), 4);
}

#[test]
fn zero_count_rolls_one_die() {
	let mut roller = RandomBuffer::new(Bytes::new([7, 7, 7]));
	assert_eq!(roller.d8(0, false).unwrap(), 8);
	assert_eq!(roller.remaining(), 255);
}

#[test]
fn errors_display() {
	let err = Error::InvalidExpression {
		expr: "abc".to_owned(),
		reason: "nope".to_owned(),
		span: 0..3,
	};
	assert_eq!(err.to_string(), "invalid dice expression \"abc\": nope");
	assert_eq!(
		Error::RandomUnavailable("no entropy".to_owned()).to_string(),
		"random bytes unavailable: no entropy"
	);
}
