use varisat::{ExtendFormula, Lit, Solver, Var};

/// The SAT engine failed to produce an answer.
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    /// The engine itself gave up, with its own explanation.
    #[display("SAT engine failed: {message}")]
    Failed {
        /// What the engine reported.
        message: String,
    },
    /// The engine reported satisfiability but handed back no model.
    #[display("SAT engine reported a solution but produced no model")]
    MissingModel,
}

/// A complete truth assignment, as found by an [`Engine`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// Collect a model given as the list of literals made true.
    pub fn from_model(model: &[Lit]) -> Self {
        let len = model.iter().map(|lit| lit.index() + 1).max().unwrap_or(0);
        let mut values = vec![false; len];
        for lit in model {
            values[lit.index()] = lit.is_positive();
        }

        Self { values }
    }

    /// The value of `var`; variables the model does not mention are false.
    pub fn value(&self, var: Var) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Whether `lit` is true under this assignment.
    pub fn holds(&self, lit: Lit) -> bool {
        self.value(lit.var()) == lit.is_positive()
    }
}

/// The capabilities required of a SAT engine.
///
/// Clauses are permanent once added. Temporary constraints are expressed by guarding a clause with a fresh activation literal,
/// assuming that literal for the calls that need the clause, and adding its negation as a unit clause to retire it.
pub trait Engine {
    /// Allocate a fresh variable.
    fn new_var(&mut self) -> Var;

    /// Add a permanent clause.
    fn add_clause(&mut self, clause: &[Lit]);

    /// Search for an assignment satisfying every clause and every literal of `assumptions`.
    ///
    /// Returns `Ok(None)` when none exists.
    fn solve_under(&mut self, assumptions: &[Lit]) -> Result<Option<Assignment>, EngineError>;
}

impl Engine for Solver<'_> {
    fn new_var(&mut self) -> Var {
        ExtendFormula::new_var(self)
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        ExtendFormula::add_clause(self, clause)
    }

    fn solve_under(&mut self, assumptions: &[Lit]) -> Result<Option<Assignment>, EngineError> {
        // replaces whatever the previous call assumed
        self.assume(assumptions);

        // the model is only available until the next `assume`
        match self.solve() {
            Ok(true) => self.model()
                .map(|model| Some(Assignment::from_model(&model)))
                .ok_or(EngineError::MissingModel),
            Ok(false) => Ok(None),
            Err(err) => Err(EngineError::Failed { message: err.to_string() }),
        }
    }
}
