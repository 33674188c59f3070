//! The external SAT solver contract.
//!
//! The production driver spawns a glucose-style solver binary once per
//! query: DIMACS in, model or `UNSAT` marker out, plus a DRAT proof file
//! requested with `-certified`. All files live in a private temporary
//! directory owned by the call and disappear with it.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use log::{debug, info};

use crate::sat::cnf::CnfBuilder;
use crate::Error;

/// One line of a DRAT proof: a clause addition, or a deletion when the
/// line was prefixed with `d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofLine {
    pub deletion: bool,
    pub literals: Vec<i32>,
}

/// Outcome of one solver query.
#[derive(Debug, Clone)]
pub enum SatOutcome {
    /// A total assignment as a list of signed literals over variables 1..N.
    Sat(Vec<i32>),
    /// The raw DRAT proof lines, in emission order.
    Unsat(Vec<ProofLine>),
}

/// The seam between the pipeline and a concrete solver.
pub trait SatSolver {
    fn solve(&mut self, cnf: &CnfBuilder) -> Result<SatOutcome, Error>;
}

/// Drives an external glucose-compatible solver binary.
///
/// Invocation contract: argument 1 is the DIMACS input, argument 2 the
/// model output, and `-certified -certified-output=PATH` requests the DRAT
/// proof. Stdin is closed and stdout/stderr are discarded. A non-zero exit
/// status is accepted as long as the output files parse.
#[derive(Debug, Clone)]
pub struct GlucoseSolver {
    binary: PathBuf,
}

impl GlucoseSolver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl SatSolver for GlucoseSolver {
    fn solve(&mut self, cnf: &CnfBuilder) -> Result<SatOutcome, Error> {
        let start = Instant::now();
        let dir = tempfile::tempdir()?;
        let cnf_path = dir.path().join("formula.cnf");
        let model_path = dir.path().join("model.txt");
        let proof_path = dir.path().join("proof.drat");

        let mut file = fs::File::create(&cnf_path)?;
        cnf.write_dimacs(&mut file)?;

        let status = Command::new(&self.binary)
            .arg(&cnf_path)
            .arg(&model_path)
            .arg("-certified")
            .arg(format!("-certified-output={}", proof_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| {
                Error::SolverFailure(format!(
                    "failed to launch {}: {source}",
                    self.binary.display()
                ))
            })?;
        debug!("solver exited with {status} after {:?}", start.elapsed());

        let model = fs::read_to_string(&model_path).map_err(|_| {
            Error::SolverFailure(format!(
                "solver produced no model file ({} variables, {} clauses)",
                cnf.variable_count(),
                cnf.clause_count()
            ))
        })?;
        let outcome = match parse_model(&model)? {
            Some(assignment) => SatOutcome::Sat(assignment),
            None => {
                let proof = fs::read_to_string(&proof_path).map_err(|_| {
                    Error::SolverFailure("solver reported UNSAT but wrote no proof".into())
                })?;
                SatOutcome::Unsat(parse_proof(&proof)?)
            }
        };
        info!(
            "solved {} variables / {} clauses in {:?}",
            cnf.variable_count(),
            cnf.clause_count(),
            start.elapsed()
        );
        Ok(outcome)
    }
}

/// Parses a model file: `None` when the first token is the `UNSAT` marker,
/// otherwise the list of signed literals.
pub fn parse_model(content: &str) -> Result<Option<Vec<i32>>, Error> {
    if content.lines().next().map(str::trim) == Some("UNSAT") {
        return Ok(None);
    }
    let mut literals = Vec::new();
    for token in content.split_whitespace() {
        let literal: i32 = token.parse().map_err(|_| {
            Error::SolverFailure(format!("unparseable literal in model: {token:?}"))
        })?;
        if literal != 0 {
            literals.push(literal);
        }
    }
    Ok(Some(literals))
}

/// Parses a DRAT proof: one `0`-terminated literal list per line, with an
/// optional leading `d` marking a deletion.
pub fn parse_proof(content: &str) -> Result<Vec<ProofLine>, Error> {
    let mut lines = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (deletion, rest) = match line.strip_prefix('d') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let mut literals = Vec::new();
        let mut terminated = false;
        for token in rest.split_whitespace() {
            let literal: i32 = token.parse().map_err(|_| {
                Error::SolverFailure(format!("unparseable literal in proof: {token:?}"))
            })?;
            if literal == 0 {
                terminated = true;
                break;
            }
            literals.push(literal);
        }
        if !terminated {
            return Err(Error::SolverFailure(format!(
                "proof line is not 0-terminated: {line:?}"
            )));
        }
        lines.push(ProofLine { deletion, literals });
    }
    Ok(lines)
}
