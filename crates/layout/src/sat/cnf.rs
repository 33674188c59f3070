//! Clause accumulation and DIMACS serialisation.

use std::io::Write;

#[derive(Debug, Clone)]
enum CnfRow {
    Clause(Vec<i32>),
    Comment(String),
}

/// Collects clauses and comment rows and serialises them as DIMACS CNF.
///
/// A clause is a non-empty list of signed variable ids. The builder tracks
/// the largest variable id it has seen so the `p cnf` header is correct.
#[derive(Debug, Clone, Default)]
pub struct CnfBuilder {
    rows: Vec<CnfRow>,
    variable_count: i32,
    clause_count: usize,
}

impl CnfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: Vec<i32>) {
        debug_assert!(!clause.is_empty(), "clauses must not be empty");
        debug_assert!(clause.iter().all(|&lit| lit != 0), "literal 0 is reserved");
        for &literal in &clause {
            self.variable_count = self.variable_count.max(literal.abs());
        }
        self.rows.push(CnfRow::Clause(clause));
        self.clause_count += 1;
    }

    pub fn add_comment(&mut self, comment: &str) {
        self.rows.push(CnfRow::Comment(comment.to_owned()));
    }

    pub fn variable_count(&self) -> i32 {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Clauses in insertion order, without comments.
    pub fn clauses(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.rows.iter().filter_map(|row| match row {
            CnfRow::Clause(clause) => Some(clause.as_slice()),
            CnfRow::Comment(_) => None,
        })
    }

    pub fn write_dimacs(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "p cnf {} {}",
            self.variable_count, self.clause_count
        )?;
        for row in &self.rows {
            match row {
                CnfRow::Comment(comment) => writeln!(writer, "c {comment}")?,
                CnfRow::Clause(clause) => {
                    for literal in clause {
                        write!(writer, "{literal} ")?;
                    }
                    writeln!(writer, "0")?;
                }
            }
        }
        Ok(())
    }

    pub fn to_dimacs(&self) -> String {
        let mut buffer = Vec::new();
        self.write_dimacs(&mut buffer)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(buffer).expect("DIMACS output is ASCII")
    }
}
