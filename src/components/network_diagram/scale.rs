//! Linear scales and colour interpolation used by the styling pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Channel-wise interpolation, `t` clamped to `[0, 1]`.
	pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
		let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Rgb::new(
			mix(self.r, other.r),
			mix(self.g, other.g),
			mix(self.b, other.b),
		)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

impl FromStr for Rgb {
	type Err = ColorParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ColorParseError(s.to_string());
		let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
		if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(err());
		}
		let channel = |i: usize, len: usize| {
			u8::from_str_radix(&hex[i * len..(i + 1) * len], 16).map_err(|_| err())
		};
		match hex.len() {
			6 => Ok(Rgb::new(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
			// #rgb shorthand doubles each digit
			3 => Ok(Rgb::new(
				channel(0, 1)? * 17,
				channel(1, 1)? * 17,
				channel(2, 1)? * 17,
			)),
			_ => Err(err()),
		}
	}
}

impl TryFrom<String> for Rgb {
	type Error = ColorParseError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<Rgb> for String {
	fn from(value: Rgb) -> Self {
		value.to_string()
	}
}

/// Piecewise-linear map from a numeric domain onto a numeric range, clamped
/// at both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	pub fn apply(&self, v: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let span = d1 - d0;
		if span == 0.0 || !v.is_finite() {
			return r0;
		}
		let t = ((v - d0) / span).clamp(0.0, 1.0);
		r0 + (r1 - r0) * t
	}
}

/// Diverging colour scale over weights in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightColorScale {
	pub negative: Rgb,
	pub midpoint: Option<Rgb>,
	pub positive: Rgb,
}

impl WeightColorScale {
	pub fn color(&self, weight: f64) -> Rgb {
		let w = if weight.is_finite() { weight.clamp(-1.0, 1.0) } else { 0.0 };
		match self.midpoint {
			Some(mid) if w < 0.0 => self.negative.lerp(mid, w + 1.0),
			Some(mid) => mid.lerp(self.positive, w),
			None => self.negative.lerp(self.positive, (w + 1.0) / 2.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_and_prints_hex() {
		let c: Rgb = "#9E58B4".parse().unwrap();
		assert_eq!(c, Rgb::new(0x9e, 0x58, 0xb4));
		assert_eq!(c.to_string(), "#9e58b4");
		assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
		assert!("9e58b4".parse::<Rgb>().is_err());
		assert!("#12345".parse::<Rgb>().is_err());
		assert!("#gg0000".parse::<Rgb>().is_err());
	}

	#[test]
	fn serde_uses_hex_strings() {
		let c = Rgb::new(0x3b, 0x82, 0xf6);
		let json = serde_json::to_string(&c).unwrap();
		assert_eq!(json, "\"#3b82f6\"");
		let back: Rgb = serde_json::from_str(&json).unwrap();
		assert_eq!(back, c);
		assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
	}

	#[test]
	fn linear_scale_clamps() {
		let s = LinearScale::new((0.0, 1.0), (0.0, 0.5));
		assert_eq!(s.apply(0.5), 0.25);
		assert_eq!(s.apply(2.0), 0.5);
		assert_eq!(s.apply(-1.0), 0.0);
		assert_eq!(LinearScale::new((1.0, 1.0), (3.0, 4.0)).apply(1.0), 3.0);
	}

	#[test]
	fn weight_colors_hit_endpoints() {
		let blue = Rgb::new(0, 0, 0xff);
		let red = Rgb::new(0xff, 0, 0);
		let diverging = WeightColorScale {
			negative: blue,
			midpoint: Some(Rgb::WHITE),
			positive: red,
		};
		assert_eq!(diverging.color(-1.0), blue);
		assert_eq!(diverging.color(0.0), Rgb::WHITE);
		assert_eq!(diverging.color(1.0), red);
		assert_eq!(diverging.color(5.0), red);

		let two_stop = WeightColorScale {
			negative: blue,
			midpoint: None,
			positive: red,
		};
		assert_eq!(two_stop.color(0.0), Rgb::new(0x80, 0, 0x80));
	}
}
