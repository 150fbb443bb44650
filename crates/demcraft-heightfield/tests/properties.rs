//! Property tests for the elevation to level mapping.

use demcraft_dem::{ElevationField, GeoBoundingBox, Sample};
use demcraft_heightfield::HeightFieldBuilder;
use proptest::prelude::*;

fn grid(width: usize, height: usize, samples: Vec<Sample>) -> ElevationField {
    let bbox = GeoBoundingBox::new(0.0, width as f64, 0.0, height as f64).unwrap();
    ElevationField::from_samples(bbox, 1.0, samples).unwrap()
}

#[test]
fn test_all_zero_field_is_flat() {
    let field = grid(10, 10, vec![Sample::Measured(0); 100]);
    let heights = HeightFieldBuilder::new(30.0, 64).build(&field).unwrap();

    for z in 0..10 {
        assert!(heights.row(z).iter().all(|&level| level == 64));
    }
    assert_eq!(heights.min_level(), 64);
    assert_eq!(heights.max_level(), 64);
}

#[test]
fn test_checkerboard_alternates() {
    let samples = (0..64)
        .map(|i| {
            let (x, z) = (i % 8, i / 8);
            Sample::Measured(if (x + z) % 2 == 0 { 0 } else { 300 })
        })
        .collect();
    let heights = HeightFieldBuilder::new(30.0, 64)
        .build(&grid(8, 8, samples))
        .unwrap();

    assert_eq!(heights.row(0), &[64, 74, 64, 74, 64, 74, 64, 74]);
    assert_eq!(heights.row(1), &[74, 64, 74, 64, 74, 64, 74, 64]);
    assert_eq!(heights.max_level(), 74);
    assert_eq!(heights.distinct_levels(), 2);
}

proptest! {
    #[test]
    fn test_levels_are_monotonic(
        elevations in prop::collection::vec(-500i16..9000, 2..40),
        scale in 0.5..200.0_f64,
        base in -64i32..128,
    ) {
        let width = elevations.len();
        let samples = elevations.iter().map(|&e| Sample::Measured(e)).collect();
        let heights = HeightFieldBuilder::new(scale, base)
            .build(&grid(width, 1, samples))
            .unwrap();

        for a in 0..width {
            for b in 0..width {
                if elevations[a] < elevations[b] {
                    prop_assert!(heights.level(a, 0) <= heights.level(b, 0));
                }
            }
        }
    }

    #[test]
    fn test_levels_within_range(
        elevations in prop::collection::vec(-500i16..9000, 1..40),
        scale in 0.5..200.0_f64,
    ) {
        let width = elevations.len();
        let samples = elevations.iter().map(|&e| Sample::Measured(e)).collect();
        let heights = HeightFieldBuilder::new(scale, 64)
            .build(&grid(width, 1, samples))
            .unwrap();

        for x in 0..width {
            let level = heights.level(x, 0);
            prop_assert!(level >= heights.min_level());
            prop_assert!(level <= heights.max_level());
        }
    }
}
