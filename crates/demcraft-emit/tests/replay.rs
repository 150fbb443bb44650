//! Replays emitted packs to check the terrain they build and the loader
//! protocols that drive them.

use demcraft_emit::{
    verify_chunks, ChunkGrid, EmitError, Emitter, EmitterConfig, FunctionPack, Host,
};
use demcraft_heightfield::HeightField;
use proptest::prelude::*;
use std::collections::HashSet;

fn emitter(chunk_size: usize) -> Emitter {
    Emitter::new(EmitterConfig {
        chunk_size,
        ..EmitterConfig::default()
    })
    .unwrap()
}

fn render(field: &HeightField, chunk_size: usize) -> (Emitter, FunctionPack) {
    let emitter = emitter(chunk_size);
    let pack = emitter.render(field).unwrap();
    (emitter, pack)
}

/// Smooth-ish terrain with a ridge, so runs of several lengths appear.
fn ridge(width: usize, length: usize) -> HeightField {
    let levels = (0..width * length)
        .map(|i| {
            let (x, z) = ((i % width) as i32, (i / width) as i32);
            64 + (x - z).abs() / 2
        })
        .collect();
    HeightField::from_levels(width, length, levels, 64).unwrap()
}

#[test]
fn test_every_chunk_rebuilds_its_cells() {
    let field = ridge(23, 17);
    let (emitter, pack) = render(&field, 8);
    let mut host = Host::from_pack(&pack);

    let checked = verify_chunks(
        &mut host,
        &field,
        &emitter.layers(&field),
        &pack.grid(),
        &emitter.config().names,
    )
    .unwrap();
    assert_eq!(checked, 23 * 17);
    assert!(host.failures().is_empty());
}

#[test]
fn test_load_all_builds_the_whole_field() {
    let field = ridge(12, 12);
    let (emitter, pack) = render(&field, 5);
    let mut host = Host::from_pack(&pack);

    let report = host.run_function("terrain/load_all").unwrap();
    assert_eq!(report.fills, pack.summary().fill_commands);
    assert_eq!(host.column_count(), 144);
    host.check_cells(&field, &emitter.layers(&field), 0..12, 0..12)
        .unwrap();
    assert_eq!(host.chat().last().unwrap(), "Terrain loaded (9 chunks)");
}

#[test]
fn test_row_function_builds_one_chunk_row() {
    let field = ridge(10, 10);
    let (_, pack) = render(&field, 4);
    let mut host = Host::from_pack(&pack);

    host.run_function("terrain/row_1").unwrap();
    assert_eq!(host.column_count(), 10 * 4);
    assert!(host.surface(0, 3).is_none());
    assert!(host.surface(9, 4).is_some());
    assert!(host.surface(0, 8).is_none());
}

#[test]
fn test_incremental_loading_terminates() {
    let field = ridge(10, 9);
    let (emitter, pack) = render(&field, 4);
    assert_eq!(pack.grid().rows(), 3);
    let mut host = Host::from_pack(&pack);

    host.run_function("terrain/setup").unwrap();
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(0));

    let first = host.run_function("terrain/load_next").unwrap();
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(1));
    assert_eq!(host.column_count(), 10 * 4);
    assert!(first.fills > 0);
    assert!(first.fills <= pack.summary().largest_row_commands);

    host.run_function("terrain/load_next").unwrap();
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(2));
    assert!(!host.chat().iter().any(|m| m.starts_with("Terrain complete")));

    host.run_function("terrain/load_next").unwrap();
    let completions = host
        .chat()
        .iter()
        .filter(|m| m.as_str() == "Terrain complete (3 rows)")
        .count();
    assert_eq!(completions, 1);
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(0));
    assert_eq!(host.column_count(), 90);
    host.check_cells(&field, &emitter.layers(&field), 0..10, 0..9)
        .unwrap();
}

#[test]
fn test_counter_left_past_the_last_row_is_reset() {
    let field = ridge(10, 9);
    let (emitter, pack) = render(&field, 4);
    let mut host = Host::from_pack(&pack);

    // A larger pack loaded earlier left its counter beyond this pack's rows.
    host.run_function("terrain/setup").unwrap();
    host.add_function(
        "earlier/progress",
        vec!["scoreboard players set progress terrain_row 5".to_string()],
    );
    host.run_function("earlier/progress").unwrap();

    host.run_function("terrain/load_next").unwrap();
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(0));
    assert_eq!(host.column_count(), 0);

    for _ in 0..3 {
        host.run_function("terrain/load_next").unwrap();
    }
    let completions = host
        .chat()
        .iter()
        .filter(|m| m.as_str() == "Terrain complete (3 rows)")
        .count();
    assert_eq!(completions, 2);
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(0));
    host.check_cells(&field, &emitter.layers(&field), 0..10, 0..9)
        .unwrap();
}

#[test]
fn test_load_next_without_setup_does_nothing() {
    let field = ridge(4, 4);
    let (_, pack) = render(&field, 2);
    let mut host = Host::from_pack(&pack);

    let report = host.run_function("terrain/load_next").unwrap();
    assert_eq!(report.fills, 0);
    assert_eq!(host.column_count(), 0);
    assert!(report.failures > 0);
}

#[test]
fn test_setup_is_idempotent() {
    let field = ridge(8, 8);
    let (_, pack) = render(&field, 4);
    let mut host = Host::from_pack(&pack);

    // The first remove has nothing to remove; that failure is harmless.
    let first = host.run_function("terrain/setup").unwrap();
    assert_eq!(first.failures, 1);
    host.run_function("terrain/load_next").unwrap();
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(1));

    let second = host.run_function("terrain/setup").unwrap();
    assert_eq!(second.failures, 0);
    assert_eq!(host.scores().objective_count(), 1);
    assert_eq!(host.scores().get("progress", "terrain_row"), Some(0));
}

#[test]
fn test_all_zero_scenario() {
    let field = HeightField::from_levels(32, 20, vec![64; 32 * 20], 64).unwrap();
    let (_, pack) = render(&field, 32);
    let summary = pack.summary();

    assert_eq!(summary.chunk_files, 1);
    assert_eq!(summary.runs, 20);
    assert_eq!(summary.fill_commands, 60);

    let chunk = pack.get("terrain/chunk_0_0").unwrap();
    assert_eq!(
        &chunk.lines[..3],
        [
            "fill ~0 60 ~0 ~31 60 ~0 stone",
            "fill ~0 61 ~0 ~31 63 ~0 dirt",
            "fill ~0 64 ~0 ~31 64 ~0 grass_block",
        ]
    );
}

#[test]
fn test_checkerboard_scenario() {
    let levels = (0..64)
        .map(|i| if (i % 8 + i / 8) % 2 == 0 { 64 } else { 74 })
        .collect();
    let field = HeightField::from_levels(8, 8, levels, 64).unwrap();
    let (emitter, pack) = render(&field, 32);

    assert_eq!(pack.summary().runs, 64);
    assert_eq!(pack.summary().fill_commands, 192);

    let mut host = Host::from_pack(&pack);
    host.run_function("terrain/load_all").unwrap();
    assert_eq!(host.surface(0, 0), Some(64));
    assert_eq!(host.surface(1, 0), Some(74));
    assert_eq!(host.block(1, 60, 0), Some("stone"));
    host.check_cells(&field, &emitter.layers(&field), 0..8, 0..8)
        .unwrap();
}

#[test]
fn test_empty_field() {
    let field = HeightField::from_levels(0, 0, Vec::new(), 64).unwrap();
    let (_, pack) = render(&field, 32);

    assert_eq!(pack.summary().chunk_files, 0);
    assert_eq!(pack.functions().len(), 3);

    let mut host = Host::from_pack(&pack);
    let report = host.run_function("terrain/load_all").unwrap();
    assert_eq!(report.commands, 0);
    host.run_function("terrain/load_next").unwrap();
    assert_eq!(host.chat(), ["Nothing to load: the terrain is empty"]);
}

#[test]
fn test_verification_catches_a_wrong_chunk() {
    let field = ridge(6, 6);
    let (emitter, pack) = render(&field, 3);
    let mut host = Host::from_pack(&pack);

    let mut lines = pack.get("terrain/chunk_1_1").unwrap().lines.clone();
    lines.pop();
    host.add_function("terrain/chunk_1_1", lines);

    let result = verify_chunks(
        &mut host,
        &field,
        &emitter.layers(&field),
        &pack.grid(),
        &emitter.config().names,
    );
    assert!(matches!(result, Err(EmitError::VerificationFailed { .. })));
}

#[test]
fn test_written_pack_replays_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let field = ridge(9, 7);
    let emitter = emitter(4);
    let pack = emitter.emit(&field, dir.path()).unwrap();

    let files = std::fs::read_dir(dir.path().join("terrain")).unwrap().count();
    assert_eq!(files, pack.functions().len());

    let mut host = Host::load_dir(dir.path(), "terrain").unwrap();
    let checked = verify_chunks(
        &mut host,
        &field,
        &emitter.layers(&field),
        &pack.grid(),
        &emitter.config().names,
    )
    .unwrap();
    assert_eq!(checked, 63);
}

fn field_strategy() -> impl Strategy<Value = HeightField> {
    (1usize..12, 1usize..12).prop_flat_map(|(w, l)| {
        prop::collection::vec(60i32..72, w * l)
            .prop_map(move |levels| HeightField::from_levels(w, l, levels, 60).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_chunks_are_lossless(field in field_strategy(), chunk_size in 1usize..7) {
        let (emitter, pack) = render(&field, chunk_size);
        let mut host = Host::from_pack(&pack);
        let checked = verify_chunks(
            &mut host,
            &field,
            &emitter.layers(&field),
            &pack.grid(),
            &emitter.config().names,
        ).unwrap();
        prop_assert_eq!(checked, field.width() * field.length());
        prop_assert_eq!(pack.summary().fill_commands, pack.summary().runs * 3);
    }

    #[test]
    fn prop_chunks_cover_every_cell_once(
        width in 0usize..50,
        length in 0usize..50,
        size in 1usize..20,
    ) {
        let grid = ChunkGrid::new(width, length, size);
        let mut seen = HashSet::new();
        for coord in grid.iter() {
            let bounds = grid.bounds(coord);
            prop_assert!(bounds.cells() > 0);
            for z in bounds.z.clone() {
                for x in bounds.x.clone() {
                    prop_assert!(seen.insert((x, z)));
                }
            }
        }
        prop_assert_eq!(seen.len(), width * length);
    }
}
