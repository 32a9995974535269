#![feature(test)]

extern crate test;

use test::Bencher;

use arsenal::{expr::Term, Expr};

#[bench]
fn parse_dice(b: &mut Bencher) {
	b.iter(|| "2d6".parse::<Term>().unwrap());
}

#[bench]
fn parse_number(b: &mut Bencher) {
	b.iter(|| "-12".parse::<Term>().unwrap());
}

#[bench]
fn parse_invalid(b: &mut Bencher) {
	b.iter(|| "2d6+1".parse::<Term>().unwrap_err());
}

#[bench]
fn normalize_list(b: &mut Bencher) {
	let expr = Expr::List(vec![Expr::from("1d8"), Expr::from("2d6"), Expr::from(3_i64), Expr::from("d4")]);
	b.iter(|| expr.normalize().unwrap());
}
