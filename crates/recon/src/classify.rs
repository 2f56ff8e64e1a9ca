use crate::config::DisciplineMapping;
use crate::error::ReconError;
use crate::model::{Buckets, Completeness, EstimateKind, TicketRow, TicketTable};

/// Which of a discipline's three values a ticket carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub original: bool,
    pub ai: bool,
    pub actual: bool,
}

impl Presence {
    pub fn of(row: &TicketRow, mapping: &DisciplineMapping) -> Self {
        Self {
            original: row.cell(&mapping.original).is_some(),
            ai: row.cell(&mapping.ai).is_some(),
            actual: row.cell(&mapping.actual).is_some(),
        }
    }

    pub fn has(&self, kind: EstimateKind) -> bool {
        match kind {
            EstimateKind::Original => self.original,
            EstimateKind::Ai => self.ai,
            EstimateKind::Actual => self.actual,
        }
    }

    pub fn count(&self) -> usize {
        [self.original, self.ai, self.actual].iter().filter(|&&p| p).count()
    }

    pub fn completeness(&self) -> Completeness {
        match self.count() {
            3 => Completeness::Complete,
            0 => Completeness::Missing,
            _ => Completeness::Partial,
        }
    }
}

pub fn classify_ticket(row: &TicketRow, mapping: &DisciplineMapping) -> Completeness {
    Presence::of(row, mapping).completeness()
}

/// Partition every ticket key by how complete its data is for one discipline.
pub fn classify(table: &TicketTable, mapping: &DisciplineMapping) -> Result<Buckets, ReconError> {
    mapping.resolve(table)?;

    let mut buckets = Buckets::default();
    for row in table.rows() {
        buckets.insert(row.key.clone(), classify_ticket(row, mapping));
    }
    Ok(buckets)
}
