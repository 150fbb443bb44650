//! Loader scripts layered on top of the chunk functions.
//!
//! Three ways to run the same chunk functions are emitted:
//!
//! - `load_all` calls every chunk in row-major order. It only works when the
//!   host allows the whole grid in one run.
//! - `row_<cz>` calls the chunks of one chunk row.
//! - `load_next` runs exactly one row per invocation, selected by a score
//!   kept in the host's scoreboard, then advances the score. When the score
//!   reaches the row count it reports completion and resets to 0.
//!
//! `setup` (re)creates the scoreboard objective and zeroes the counter; it
//! removes the objective first so running it twice never duplicates it.
//!
//! The counter lives in the host, not in this process. Each `load_next`
//! invocation reads the value the previous one wrote, so two invocations
//! touching the same counter must never run at the same time.

use crate::chunk::{ChunkCoord, ChunkGrid};
use crate::EmitError;
use serde::{Deserialize, Serialize};

/// Names used by the loader scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderNames {
    /// Function namespace; files land in `<output>/<namespace>/`.
    pub namespace: String,
    /// Scoreboard objective holding the row counter.
    pub objective: String,
    /// Fake player that owns the counter score.
    pub counter_holder: String,
}

impl Default for LoaderNames {
    fn default() -> Self {
        Self {
            namespace: "terrain".to_string(),
            objective: "terrain_row".to_string(),
            counter_holder: "progress".to_string(),
        }
    }
}

impl LoaderNames {
    /// Check that every name is usable in a function path or command.
    pub fn validate(&self) -> Result<(), EmitError> {
        let ns_ok = !self.namespace.is_empty()
            && self
                .namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !ns_ok {
            return Err(EmitError::InvalidConfig(format!(
                "namespace `{}` must be lowercase letters, digits or underscores",
                self.namespace
            )));
        }
        for (what, name) in [
            ("objective", &self.objective),
            ("counter holder", &self.counter_holder),
        ] {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(EmitError::InvalidConfig(format!(
                    "{} `{}` must be a single word",
                    what, name
                )));
            }
        }
        Ok(())
    }

    /// Function name of a chunk.
    pub fn chunk_function(&self, coord: ChunkCoord) -> String {
        format!("{}/chunk_{}_{}", self.namespace, coord.cx, coord.cz)
    }

    /// Function name of a chunk row.
    pub fn row_function(&self, cz: usize) -> String {
        format!("{}/row_{}", self.namespace, cz)
    }

    /// Function name of the one-shot loader.
    pub fn load_all_function(&self) -> String {
        format!("{}/load_all", self.namespace)
    }

    /// Function name of the incremental loader.
    pub fn load_next_function(&self) -> String {
        format!("{}/load_next", self.namespace)
    }

    /// Function name of the counter setup.
    pub fn setup_function(&self) -> String {
        format!("{}/setup", self.namespace)
    }

    /// One-shot loader: every chunk in row-major order with progress lines.
    pub fn load_all_script(&self, grid: &ChunkGrid, width: usize, length: usize) -> Vec<String> {
        let mut lines = vec![
            format!(
                "# Terrain loader: {}x{} cells in {} chunk(s) of {}x{}",
                width,
                length,
                grid.len(),
                grid.size(),
                grid.size()
            ),
            "# Runs every chunk at once; use load_next when the host limits commands per run"
                .to_string(),
        ];

        let rows = grid.rows();
        for cz in 0..rows {
            lines.push(format!("say Terrain row {}/{}", cz + 1, rows));
            lines.extend(
                grid.row(cz)
                    .map(|coord| format!("function {}", self.chunk_function(coord))),
            );
        }

        lines.push("# End of terrain loader".to_string());
        if !grid.is_empty() {
            lines.push(format!("say Terrain loaded ({} chunks)", grid.len()));
        }
        lines
    }

    /// Row loader: the chunks of row `cz` in column order.
    pub fn row_script(&self, grid: &ChunkGrid, cz: usize) -> Vec<String> {
        let mut lines = vec![format!("# Terrain chunk row {}/{}", cz + 1, grid.rows())];
        lines.extend(
            grid.row(cz)
                .map(|coord| format!("function {}", self.chunk_function(coord))),
        );
        lines
    }

    /// Incremental loader: one row per invocation, driven by the counter.
    pub fn load_next_script(&self, grid: &ChunkGrid) -> Vec<String> {
        let rows = grid.rows();
        let mut lines = vec![
            "# Incremental terrain loader: one chunk row per invocation".to_string(),
            format!(
                "# Progress is kept in score {} {}; run {} first",
                self.counter_holder,
                self.objective,
                self.setup_function()
            ),
        ];
        if rows == 0 {
            lines.push("say Nothing to load: the terrain is empty".to_string());
            return lines;
        }

        for cz in 0..rows {
            lines.push(format!(
                "{} run function {}",
                self.score_matches(&cz.to_string()),
                self.row_function(cz)
            ));
        }
        lines.push(format!(
            "scoreboard players add {} {} 1",
            self.counter_holder, self.objective
        ));
        // `rows..` also catches a counter left above the row count by a larger pack
        let finished = self.score_matches(&format!("{}..", rows));
        lines.push(format!("{} run say Terrain complete ({} rows)", finished, rows));
        lines.push(format!(
            "{} run scoreboard players set {} {} 0",
            finished, self.counter_holder, self.objective
        ));
        lines
    }

    /// Counter setup: recreate the objective and start from row 0.
    pub fn setup_script(&self, grid: &ChunkGrid) -> Vec<String> {
        vec![
            "# Reset incremental terrain loading".to_string(),
            format!("scoreboard objectives remove {}", self.objective),
            format!("scoreboard objectives add {} dummy", self.objective),
            format!(
                "scoreboard players set {} {} 0",
                self.counter_holder, self.objective
            ),
            format!(
                "say Terrain loader ready: {} row(s), run {} once per row",
                grid.rows(),
                self.load_next_function()
            ),
        ]
    }

    fn score_matches(&self, range: &str) -> String {
        format!(
            "execute if score {} {} matches {}",
            self.counter_holder, self.objective, range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names() {
        let names = LoaderNames::default();
        assert_eq!(
            names.chunk_function(ChunkCoord { cx: 3, cz: 1 }),
            "terrain/chunk_3_1"
        );
        assert_eq!(names.row_function(2), "terrain/row_2");
        assert_eq!(names.load_next_function(), "terrain/load_next");
    }

    #[test]
    fn test_validate_names() {
        assert!(LoaderNames::default().validate().is_ok());
        let bad_ns = LoaderNames {
            namespace: "Terrain".to_string(),
            ..LoaderNames::default()
        };
        assert!(bad_ns.validate().is_err());
        let bad_holder = LoaderNames {
            counter_holder: "two words".to_string(),
            ..LoaderNames::default()
        };
        assert!(bad_holder.validate().is_err());
    }

    #[test]
    fn test_load_all_script() {
        let grid = ChunkGrid::new(40, 20, 16);
        let lines = LoaderNames::default().load_all_script(&grid, 40, 20);
        let calls: Vec<&String> = lines.iter().filter(|l| l.starts_with("function ")).collect();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], "function terrain/chunk_0_0");
        assert_eq!(calls[3], "function terrain/chunk_0_1");
        assert_eq!(lines.last().unwrap(), "say Terrain loaded (6 chunks)");
    }

    #[test]
    fn test_load_all_empty_has_only_commentary() {
        let grid = ChunkGrid::new(0, 0, 16);
        let lines = LoaderNames::default().load_all_script(&grid, 0, 0);
        assert!(lines.iter().all(|l| l.starts_with('#')));
    }

    #[test]
    fn test_load_next_script() {
        let grid = ChunkGrid::new(10, 10, 4);
        let lines = LoaderNames::default().load_next_script(&grid);
        let has = |line: &str| lines.iter().any(|l| l == line);
        assert!(has(
            "execute if score progress terrain_row matches 0 run function terrain/row_0"
        ));
        assert!(has(
            "execute if score progress terrain_row matches 2 run function terrain/row_2"
        ));
        assert!(has("scoreboard players add progress terrain_row 1"));
        assert!(has(
            "execute if score progress terrain_row matches 3.. run say Terrain complete (3 rows)"
        ));
        assert_eq!(
            lines.last().unwrap(),
            "execute if score progress terrain_row matches 3.. \
             run scoreboard players set progress terrain_row 0"
        );
    }

    #[test]
    fn test_setup_script_recreates_objective() {
        let grid = ChunkGrid::new(10, 10, 4);
        let lines = LoaderNames::default().setup_script(&grid);
        let position = |line: &str| lines.iter().position(|l| l == line).unwrap();
        let remove = position("scoreboard objectives remove terrain_row");
        let add = position("scoreboard objectives add terrain_row dummy");
        assert!(remove < add);
    }
}
