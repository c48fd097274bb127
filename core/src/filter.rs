//! # Session Filter Engine
//!
//! Pure attribute predicates over session records.
//!
//! A predicate is an (attribute, operator, operand) triple. Applying one
//! to a center list retains the sessions it matches and drops every center
//! left without sessions. Predicates compose by sequential narrowing, so a
//! chain is a logical AND and the final set is independent of application
//! order.

use vaxwatch_common::model::{Center, Dose, Session, Vaccine};

/// Session attributes a predicate can inspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAttr {
    AvailableCapacity,
    Dose1Capacity,
    Dose2Capacity,
    MinAgeLimit,
    Vaccine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Equals,
    GreaterThan,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Number(u32),
    Text(String),
}

/// One attribute check against a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub attr: SessionAttr,
    pub op: Op,
    pub operand: Operand,
}

impl Predicate {
    pub fn new(attr: SessionAttr, op: Op, operand: Operand) -> Self {
        Self { attr, op, operand }
    }

    /// Whether `session` satisfies this predicate.
    ///
    /// `Equals` compares numbers exactly or strings case-sensitively
    /// (vaccine operands are uppercased before they get here).
    /// `GreaterThan` is a strict numeric comparison; a type-mismatched
    /// pairing matches nothing.
    pub fn matches(&self, session: &Session) -> bool {
        match (&self.operand, self.attr) {
            (Operand::Number(n), attr) => {
                let Some(value) = numeric_attr(attr, session) else {
                    return false;
                };
                match self.op {
                    Op::Equals => value == *n,
                    Op::GreaterThan => value > *n,
                }
            }
            (Operand::Text(t), SessionAttr::Vaccine) => match self.op {
                Op::Equals => session.vaccine == *t,
                Op::GreaterThan => false,
            },
            (Operand::Text(_), _) => false,
        }
    }
}

fn numeric_attr(attr: SessionAttr, session: &Session) -> Option<u32> {
    match attr {
        SessionAttr::AvailableCapacity => Some(session.available_capacity),
        SessionAttr::Dose1Capacity => Some(session.available_capacity_dose1),
        SessionAttr::Dose2Capacity => Some(session.available_capacity_dose2),
        SessionAttr::MinAgeLimit => Some(session.min_age_limit),
        SessionAttr::Vaccine => None,
    }
}

/// Applies one predicate, pruning non-matching sessions and dropping
/// centers left with none.
pub fn apply(centers: Vec<Center>, predicate: &Predicate) -> Vec<Center> {
    centers
        .into_iter()
        .filter_map(|mut center| {
            center.sessions.retain(|session| predicate.matches(session));
            if center.sessions.is_empty() {
                None
            } else {
                Some(center)
            }
        })
        .collect()
}

/// Applies a chain of predicates by sequential narrowing.
pub fn apply_chain(centers: Vec<Center>, chain: &[Predicate]) -> Vec<Center> {
    chain
        .iter()
        .fold(centers, |remaining, predicate| apply(remaining, predicate))
}

/// The user-selected filters for one run.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    pub min_age: Option<u32>,
    pub vaccine: Option<Vaccine>,
    pub dose: Option<Dose>,
}

impl Criteria {
    /// Builds the standard per-cycle chain: overall capacity first, then
    /// the optional age, vaccine and dose-capacity prunes.
    pub fn chain(&self) -> Vec<Predicate> {
        let mut chain: Vec<Predicate> = vec![Predicate::new(
            SessionAttr::AvailableCapacity,
            Op::GreaterThan,
            Operand::Number(0),
        )];

        if let Some(age) = self.min_age {
            chain.push(Predicate::new(
                SessionAttr::MinAgeLimit,
                Op::Equals,
                Operand::Number(age),
            ));
        }

        if let Some(vaccine) = self.vaccine {
            chain.push(Predicate::new(
                SessionAttr::Vaccine,
                Op::Equals,
                Operand::Text(vaccine.as_str().to_string()),
            ));
        }

        match self.dose {
            Some(Dose::First) => chain.push(Predicate::new(
                SessionAttr::Dose1Capacity,
                Op::GreaterThan,
                Operand::Number(0),
            )),
            Some(Dose::Second) => chain.push(Predicate::new(
                SessionAttr::Dose2Capacity,
                Op::GreaterThan,
                Operand::Number(0),
            )),
            None => {}
        }

        chain
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
