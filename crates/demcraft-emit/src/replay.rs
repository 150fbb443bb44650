//! Offline replay of emitted function files.
//!
//! [`Host`] interprets the command subset the emitter produces: `fill`,
//! `function`, `say`, `scoreboard objectives add|remove`,
//! `scoreboard players set|add` and `execute if score .. matches .. run ..`.
//! Commands the real host would reject at run time (adding an existing
//! objective, scoring an unknown one, oversized fills) are recorded as
//! [`CommandFailure`]s and execution continues, as it does in game. Lines the
//! interpreter does not understand and calls to unknown functions are errors.

use crate::chunk::ChunkGrid;
use crate::command::{FillCommand, FILL_VOLUME_LIMIT};
use crate::pack::{FunctionPack, FUNCTION_EXTENSION};
use crate::protocol::LoaderNames;
use crate::rle::TerrainLayers;
use crate::EmitError;
use demcraft_heightfield::HeightField;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Function calls nested deeper than this are rejected.
pub const MAX_FUNCTION_DEPTH: usize = 64;

/// Block placed by `fill` that clears positions instead of storing them.
const AIR: &str = "air";

/// Scores held by the host between invocations.
///
/// This is the only state that survives from one function invocation to the
/// next. A reader sees whatever the last writer stored: the incremental loader
/// reads the counter, runs one row and writes the counter back, so at most one
/// invocation may be in flight per counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    objectives: BTreeMap<String, HashMap<String, i32>>,
}

impl ScoreBoard {
    /// Create an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an objective exists.
    pub fn has_objective(&self, objective: &str) -> bool {
        self.objectives.contains_key(objective)
    }

    /// Number of objectives.
    pub fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    /// Add an objective. Returns false if it already existed.
    pub fn add_objective(&mut self, objective: &str) -> bool {
        if self.has_objective(objective) {
            return false;
        }
        self.objectives.insert(objective.to_string(), HashMap::new());
        true
    }

    /// Remove an objective and all its scores. Returns false if it was absent.
    pub fn remove_objective(&mut self, objective: &str) -> bool {
        self.objectives.remove(objective).is_some()
    }

    /// Score of a holder, if set.
    pub fn get(&self, holder: &str, objective: &str) -> Option<i32> {
        self.objectives.get(objective)?.get(holder).copied()
    }

    /// Set a score. Returns false if the objective does not exist.
    pub fn set(&mut self, holder: &str, objective: &str, value: i32) -> bool {
        match self.objectives.get_mut(objective) {
            Some(scores) => {
                scores.insert(holder.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Add to a score, treating an unset score as 0.
    ///
    /// Returns the new value, or `None` if the objective does not exist.
    pub fn add(&mut self, holder: &str, objective: &str, delta: i32) -> Option<i32> {
        let scores = self.objectives.get_mut(objective)?;
        let score = scores.entry(holder.to_string()).or_insert(0);
        *score = score.wrapping_add(delta);
        Some(*score)
    }
}

/// A command the host accepted syntactically but refused to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Function the command belongs to.
    pub function: String,
    /// Command text.
    pub command: String,
    /// Why it failed.
    pub reason: String,
}

/// Counts for one top-level invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Commands executed, including nested function bodies.
    pub commands: usize,
    /// Fill commands executed.
    pub fills: usize,
    /// Commands that failed.
    pub failures: usize,
}

/// Integer range accepted by `matches`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScoreRange {
    min: Option<i32>,
    max: Option<i32>,
}

impl ScoreRange {
    fn parse(line: &str, token: &str) -> Result<Self, EmitError> {
        let bound = |s: &str| -> Result<Option<i32>, EmitError> {
            if s.is_empty() {
                return Ok(None);
            }
            s.parse()
                .map(Some)
                .map_err(|_| EmitError::parse(line, format!("bad score range `{}`", token)))
        };
        let range = match token.split_once("..") {
            Some((lo, hi)) => ScoreRange {
                min: bound(lo)?,
                max: bound(hi)?,
            },
            None => {
                let exact = bound(token)?;
                ScoreRange {
                    min: exact,
                    max: exact,
                }
            }
        };
        if range.min.is_none() && range.max.is_none() {
            return Err(EmitError::parse(line, "empty score range"));
        }
        Ok(range)
    }

    fn contains(&self, value: i32) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// An in-memory stand-in for the game host.
#[derive(Debug, Default)]
pub struct Host {
    functions: HashMap<String, Vec<String>>,
    scores: ScoreBoard,
    world: HashMap<(i32, i32), BTreeMap<i32, String>>,
    chat: Vec<String>,
    failures: Vec<CommandFailure>,
    origin: (i32, i32),
    report: RunReport,
}

impl Host {
    /// Create a host with no functions and an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that knows every function of a pack.
    pub fn from_pack(pack: &FunctionPack) -> Self {
        let mut host = Self::new();
        for function in pack.functions() {
            host.add_function(&function.name, function.lines.clone());
        }
        host
    }

    /// Create a host from the function files in `<dir>/<namespace>/`.
    pub fn load_dir(dir: &Path, namespace: &str) -> Result<Self, EmitError> {
        let ns_dir = dir.join(namespace);
        let io_err = |source| EmitError::Io {
            path: ns_dir.clone(),
            source,
        };
        let mut host = Self::new();
        for entry in fs::read_dir(&ns_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().map_or(true, |ext| ext != FUNCTION_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|source| EmitError::Io {
                path: path.clone(),
                source,
            })?;
            let name = format!("{}/{}", namespace, stem);
            host.add_function(&name, text.lines().map(str::to_string).collect());
        }
        debug!("Loaded {} function(s) from {}", host.functions.len(), ns_dir.display());
        Ok(host)
    }

    /// Register or replace a function.
    pub fn add_function(&mut self, name: &str, lines: Vec<String>) {
        self.functions.insert(name.to_string(), lines);
    }

    /// Whether a function is registered.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Position relative coordinates resolve against, as `(x, z)`.
    pub fn set_origin(&mut self, x: i32, z: i32) {
        self.origin = (x, z);
    }

    /// Scoreboard state.
    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Every `say` message so far, oldest first.
    pub fn chat(&self) -> &[String] {
        &self.chat
    }

    /// Every refused command so far.
    pub fn failures(&self) -> &[CommandFailure] {
        &self.failures
    }

    /// Block at a world position.
    pub fn block(&self, x: i32, y: i32, z: i32) -> Option<&str> {
        self.world.get(&(x, z))?.get(&y).map(String::as_str)
    }

    /// Blocks of one column keyed by height.
    pub fn column(&self, x: i32, z: i32) -> Option<&BTreeMap<i32, String>> {
        self.world.get(&(x, z))
    }

    /// Highest non-air block of a column.
    pub fn surface(&self, x: i32, z: i32) -> Option<i32> {
        self.world.get(&(x, z))?.keys().next_back().copied()
    }

    /// Number of columns holding at least one block.
    pub fn column_count(&self) -> usize {
        self.world.len()
    }

    /// Forget all placed blocks.
    pub fn clear_world(&mut self) {
        self.world.clear();
    }

    /// Invoke a function as the player would.
    pub fn run_function(&mut self, name: &str) -> Result<RunReport, EmitError> {
        self.report = RunReport::default();
        self.call(name, 0)?;
        trace!("{}: {:?}", name, self.report);
        Ok(self.report)
    }

    fn call(&mut self, name: &str, depth: usize) -> Result<(), EmitError> {
        if depth >= MAX_FUNCTION_DEPTH {
            self.fail(name, &format!("function {}", name), "function calls nested too deep");
            return Ok(());
        }
        let lines = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| EmitError::UnknownFunction(name.to_string()))?;
        for line in &lines {
            let command = line.trim();
            if command.is_empty() || command.starts_with('#') {
                continue;
            }
            self.execute(name, command, depth)?;
        }
        Ok(())
    }

    fn execute(&mut self, function: &str, command: &str, depth: usize) -> Result<(), EmitError> {
        self.report.commands += 1;
        let (head, rest) = command.split_once(' ').unwrap_or((command, ""));
        match head {
            "say" => self.chat.push(rest.to_string()),
            "function" => {
                let target = rest.trim();
                if target.is_empty() || target.contains(' ') {
                    return Err(EmitError::parse(command, "expected `function <name>`"));
                }
                self.call(target, depth + 1)?;
            }
            "fill" => {
                let fill: FillCommand = command.parse()?;
                self.fill(function, command, &fill);
            }
            "scoreboard" => self.scoreboard(function, command)?,
            "execute" => self.execute_if_score(function, command, depth)?,
            _ => return Err(EmitError::parse(command, format!("unsupported command `{}`", head))),
        }
        Ok(())
    }

    fn fill(&mut self, function: &str, command: &str, fill: &FillCommand) {
        let volume = fill.volume();
        if volume > FILL_VOLUME_LIMIT {
            self.fail(
                function,
                command,
                &format!(
                    "too many blocks in the specified area ({} > {})",
                    volume, FILL_VOLUME_LIMIT
                ),
            );
            return;
        }
        self.report.fills += 1;
        let (ox, oz) = self.origin;
        for (x, y, z) in fill.positions() {
            let key = (ox + x, oz + z);
            if fill.block == AIR {
                if let Some(column) = self.world.get_mut(&key) {
                    column.remove(&y);
                    if column.is_empty() {
                        self.world.remove(&key);
                    }
                }
            } else {
                self.world.entry(key).or_default().insert(y, fill.block.clone());
            }
        }
    }

    fn scoreboard(&mut self, function: &str, command: &str) -> Result<(), EmitError> {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        match tokens.get(1..3) {
            Some(["objectives", "add"]) => {
                let (Some(objective), Some(_criteria)) = (tokens.get(3), tokens.get(4)) else {
                    return Err(EmitError::parse(
                        command,
                        "expected `objectives add <name> <criteria>`",
                    ));
                };
                if !self.scores.add_objective(objective) {
                    self.fail(function, command, "an objective already exists by that name");
                }
            }
            Some(["objectives", "remove"]) => {
                let Some(objective) = tokens.get(3) else {
                    return Err(EmitError::parse(command, "expected `objectives remove <name>`"));
                };
                if !self.scores.remove_objective(objective) {
                    self.fail(function, command, "unknown scoreboard objective");
                }
            }
            Some(["players", op @ ("set" | "add")]) => {
                let (Some(holder), Some(objective), Some(value)) =
                    (tokens.get(3), tokens.get(4), tokens.get(5))
                else {
                    return Err(EmitError::parse(
                        command,
                        "expected `players <op> <holder> <objective> <value>`",
                    ));
                };
                let value: i32 = value
                    .parse()
                    .map_err(|_| EmitError::parse(command, format!("bad score `{}`", value)))?;
                let ok = if *op == "set" {
                    self.scores.set(holder, objective, value)
                } else {
                    self.scores.add(holder, objective, value).is_some()
                };
                if !ok {
                    self.fail(function, command, "unknown scoreboard objective");
                }
            }
            _ => return Err(EmitError::parse(command, "unsupported scoreboard command")),
        }
        Ok(())
    }

    fn execute_if_score(
        &mut self,
        function: &str,
        command: &str,
        depth: usize,
    ) -> Result<(), EmitError> {
        let tokens: Vec<&str> = command.splitn(9, ' ').collect();
        let &[_, "if", "score", holder, objective, "matches", range, "run", inner] =
            tokens.as_slice()
        else {
            return Err(EmitError::parse(
                command,
                "expected `execute if score <holder> <objective> matches <range> run <command>`",
            ));
        };
        let range = ScoreRange::parse(command, range)?;

        if !self.scores.has_objective(objective) {
            self.fail(function, command, "unknown scoreboard objective");
            return Ok(());
        }
        match self.scores.get(holder, objective) {
            Some(value) if range.contains(value) => self.execute(function, inner.trim(), depth),
            _ => Ok(()),
        }
    }

    fn fail(&mut self, function: &str, command: &str, reason: &str) {
        self.report.failures += 1;
        self.failures.push(CommandFailure {
            function: function.to_string(),
            command: command.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Compare the placed columns of a cell range against a height field.
    ///
    /// Every cell must hold exactly the layered column `layers` describes for
    /// its level, and nothing else.
    pub fn check_cells(
        &self,
        field: &HeightField,
        layers: &TerrainLayers,
        x: std::ops::Range<usize>,
        z: std::ops::Range<usize>,
    ) -> Result<usize, EmitError> {
        let mut checked = 0;
        for cz in z {
            for cx in x.clone() {
                let level = field.level(cx, cz);
                let mismatch = |reason: String| EmitError::VerificationFailed {
                    x: cx,
                    z: cz,
                    reason,
                };
                let column = self
                    .column(cx as i32, cz as i32)
                    .ok_or_else(|| mismatch("column is empty".to_string()))?;

                let expected = (level - layers.floor() + 1) as usize;
                if column.len() != expected {
                    return Err(mismatch(format!(
                        "expected {} blocks up to level {}, found {}",
                        expected,
                        level,
                        column.len()
                    )));
                }
                for (&y, block) in column {
                    match layers.block_at(level, y) {
                        Some(want) if want == block.as_str() => {}
                        want => {
                            return Err(mismatch(format!(
                                "block at y={} is {}, expected {}",
                                y,
                                block,
                                want.unwrap_or(AIR)
                            )))
                        }
                    }
                }
                checked += 1;
            }
        }
        Ok(checked)
    }
}

/// Replay every chunk function one at a time and check it rebuilds its part
/// of the field exactly. Returns the number of cells checked.
pub fn verify_chunks(
    host: &mut Host,
    field: &HeightField,
    layers: &TerrainLayers,
    grid: &ChunkGrid,
    names: &LoaderNames,
) -> Result<usize, EmitError> {
    let mut checked = 0;
    for coord in grid.iter() {
        host.clear_world();
        let name = names.chunk_function(coord);
        let report = host.run_function(&name)?;
        if report.failures > 0 {
            let bounds = grid.bounds(coord);
            return Err(EmitError::VerificationFailed {
                x: bounds.x.start,
                z: bounds.z.start,
                reason: format!("{} command(s) failed in {}", report.failures, name),
            });
        }
        let bounds = grid.bounds(coord);
        let cells = bounds.cells();
        if host.column_count() != cells {
            return Err(EmitError::VerificationFailed {
                x: bounds.x.start,
                z: bounds.z.start,
                reason: format!(
                    "{} placed blocks in {} columns, expected {}",
                    name,
                    host.column_count(),
                    cells
                ),
            });
        }
        checked += host.check_cells(field, layers, bounds.x, bounds.z)?;
    }
    host.clear_world();
    debug!("Verified {} cell(s) in {} chunk(s)", checked, grid.len());
    Ok(checked)
}
