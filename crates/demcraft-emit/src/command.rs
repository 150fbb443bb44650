//! Fill commands and block palettes.

use crate::EmitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest number of blocks a single `fill` may cover.
pub const FILL_VOLUME_LIMIT: u64 = 32_768;

/// Blocks used for the three terrain layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Bulk material below the subsoil.
    pub foundation: String,
    /// Three layers directly below the surface.
    pub subsoil: String,
    /// Top block of every column.
    pub surface: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foundation: "stone".to_string(),
            subsoil: "dirt".to_string(),
            surface: "grass_block".to_string(),
        }
    }
}

impl Palette {
    /// Check that every block id is a single non-empty token.
    pub fn validate(&self) -> Result<(), EmitError> {
        for block in [&self.foundation, &self.subsoil, &self.surface] {
            if block.is_empty() || block.chars().any(char::is_whitespace) {
                return Err(EmitError::InvalidConfig(format!(
                    "block id `{}` must be a single word",
                    block
                )));
            }
        }
        Ok(())
    }
}

/// A cuboid `fill` with x/z relative to the execution origin and absolute y.
///
/// Rendered as `fill ~x0 y0 ~z0 ~x1 y1 ~z1 block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillCommand {
    /// First corner `(x, y, z)`.
    pub from: (i32, i32, i32),
    /// Opposite corner `(x, y, z)`, inclusive.
    pub to: (i32, i32, i32),
    /// Block id.
    pub block: String,
}

impl FillCommand {
    /// Number of blocks covered.
    pub fn volume(&self) -> u64 {
        let span = |a: i32, b: i32| (a - b).unsigned_abs() as u64 + 1;
        span(self.from.0, self.to.0) * span(self.from.1, self.to.1) * span(self.from.2, self.to.2)
    }

    /// Every block position covered, in x, then z, then y order.
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32, i32)> {
        let (x0, x1) = ordered(self.from.0, self.to.0);
        let (y0, y1) = ordered(self.from.1, self.to.1);
        let (z0, z1) = ordered(self.from.2, self.to.2);
        (x0..=x1).flat_map(move |x| (z0..=z1).flat_map(move |z| (y0..=y1).map(move |y| (x, y, z))))
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl fmt::Display for FillCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fill ~{} {} ~{} ~{} {} ~{} {}",
            self.from.0, self.from.1, self.from.2, self.to.0, self.to.1, self.to.2, self.block
        )
    }
}

fn relative(line: &str, token: &str) -> Result<i32, EmitError> {
    let rest = token.strip_prefix('~').ok_or_else(|| {
        EmitError::parse(line, format!("expected relative coordinate, got `{}`", token))
    })?;
    if rest.is_empty() {
        return Ok(0);
    }
    rest.parse()
        .map_err(|_| EmitError::parse(line, format!("bad coordinate `{}`", token)))
}

fn absolute(line: &str, token: &str) -> Result<i32, EmitError> {
    token
        .parse()
        .map_err(|_| EmitError::parse(line, format!("bad height `{}`", token)))
}

impl FromStr for FillCommand {
    type Err = EmitError;

    fn from_str(line: &str) -> Result<Self, EmitError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 8 || tokens[0] != "fill" {
            return Err(EmitError::parse(line, "expected `fill x y z x y z block`"));
        }
        Ok(FillCommand {
            from: (
                relative(line, tokens[1])?,
                absolute(line, tokens[2])?,
                relative(line, tokens[3])?,
            ),
            to: (
                relative(line, tokens[4])?,
                absolute(line, tokens[5])?,
                relative(line, tokens[6])?,
            ),
            block: tokens[7].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let fill = FillCommand {
            from: (0, 60, 3),
            to: (12, 63, 3),
            block: "dirt".to_string(),
        };
        let text = fill.to_string();
        assert_eq!(text, "fill ~0 60 ~3 ~12 63 ~3 dirt");
        assert_eq!(text.parse::<FillCommand>().unwrap(), fill);
    }

    #[test]
    fn test_parse_bare_tilde_and_negative() {
        let fill: FillCommand = "fill ~ -5 ~-2 ~4 -1 ~ stone".parse().unwrap();
        assert_eq!(fill.from, (0, -5, -2));
        assert_eq!(fill.to, (4, -1, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("fill 0 1 2 3 4 5 stone".parse::<FillCommand>().is_err());
        assert!("fill ~0 ~1 ~2 ~3 ~4 ~5 stone".parse::<FillCommand>().is_err());
        assert!("setblock ~0 1 ~2 stone".parse::<FillCommand>().is_err());
        assert!("fill ~0 1 ~2 ~3 4 ~5".parse::<FillCommand>().is_err());
    }

    #[test]
    fn test_volume_and_positions() {
        let fill = FillCommand {
            from: (2, 10, 0),
            to: (0, 11, 0),
            block: "stone".to_string(),
        };
        assert_eq!(fill.volume(), 6);
        let positions: Vec<_> = fill.positions().collect();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], (0, 10, 0));
        assert_eq!(positions[5], (2, 11, 0));
    }

    #[test]
    fn test_palette_validation() {
        assert!(Palette::default().validate().is_ok());
        let bad = Palette {
            surface: "grass block".to_string(),
            ..Palette::default()
        };
        assert!(bad.validate().is_err());
    }
}
