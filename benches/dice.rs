#![feature(test)]

extern crate test;

use test::Bencher;

use arsenal::dice::{Dice, RandomBuffer, Roller};

#[bench]
fn roll_4d8(b: &mut Bencher) {
	let dice = Dice::new(4, 8);
	let mut roller = RandomBuffer::with_seed(42);
	b.iter(|| roller.roll(&dice, false).unwrap());
}

#[bench]
fn roll_100d20(b: &mut Bencher) {
	let dice = Dice::new(100, 20);
	let mut roller = RandomBuffer::with_seed(42);
	b.iter(|| roller.roll(&dice, false).unwrap());
}

#[bench]
fn roll_255d255(b: &mut Bencher) {
	let dice = Dice::new(255, 255);
	let mut roller = RandomBuffer::with_seed(42);
	b.iter(|| roller.roll(&dice, false).unwrap());
}

#[bench]
fn roll_4d8_os(b: &mut Bencher) {
	let dice = Dice::new(4, 8);
	let mut roller = RandomBuffer::os();
	b.iter(|| roller.roll(&dice, false).unwrap());
}

#[bench]
fn max_100d20(b: &mut Bencher) {
	let dice = Dice::new(100, 20);
	let mut roller = RandomBuffer::with_seed(42);
	b.iter(|| roller.roll(&dice, true).unwrap());
}
