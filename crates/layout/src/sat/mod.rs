//! Everything that talks SAT: clause assembly, DIMACS serialisation, the
//! solver subprocess driver and the bijection between shape decisions and
//! solver variables.

pub mod clauses;
pub mod cnf;
pub mod solver;
pub mod variables;
