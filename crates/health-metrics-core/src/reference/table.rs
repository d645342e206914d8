//! Ordered interval tables.

use serde::{Deserialize, Serialize};

use super::{Domain, ReferenceError, ReferenceResult};

/// Upper edge of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpperBound {
    /// Band holds values strictly below the edge.
    Below(f64),
    /// Band holds values up to and including the edge.
    Through(f64),
    /// No upper edge. Only valid on the final band.
    Open,
}

impl UpperBound {
    fn admits(self, value: f64) -> bool {
        match self {
            UpperBound::Below(edge) => value < edge,
            UpperBound::Through(edge) => value <= edge,
            UpperBound::Open => true,
        }
    }

    /// Edge value, `None` for the open band.
    pub fn edge(self) -> Option<f64> {
        match self {
            UpperBound::Below(edge) | UpperBound::Through(edge) => Some(edge),
            UpperBound::Open => None,
        }
    }
}

/// A single interval of a reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band<C> {
    /// Lower edge of the band
    pub lower: f64,
    /// Whether `lower` itself falls in this band
    pub lower_inclusive: bool,
    /// Upper edge of the band
    pub upper: UpperBound,
    /// Category assigned to values in the band
    pub category: C,
}

/// Ordered, contiguous bands partitioning `[0, +inf)` for one domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeTable<C> {
    domain: Domain,
    bands: Vec<Band<C>>,
}

impl<C: Copy> RangeTable<C> {
    /// Build a table from upper edges in ascending order.
    ///
    /// Lower edges are implied: the first band starts at zero, every other band
    /// starts where the previous one ends. Fails if the edges are not finite and
    /// strictly increasing, or if the last band is not open.
    pub fn new(
        domain: Domain,
        uppers: impl IntoIterator<Item = (UpperBound, C)>,
    ) -> ReferenceResult<Self> {
        let table = Self::new_unchecked(domain, uppers);
        table.validate()?;
        Ok(table)
    }

    /// Build without validation. Used for the compiled-in standard tables,
    /// which are covered by tests.
    pub(crate) fn new_unchecked(
        domain: Domain,
        uppers: impl IntoIterator<Item = (UpperBound, C)>,
    ) -> Self {
        let mut bands = Vec::new();
        let mut lower = 0.0;
        let mut lower_inclusive = true;

        for (upper, category) in uppers {
            bands.push(Band {
                lower,
                lower_inclusive,
                upper,
                category,
            });
            if let Some(edge) = upper.edge() {
                lower = edge;
            }
            lower_inclusive = matches!(upper, UpperBound::Below(_));
        }

        Self { domain, bands }
    }

    fn validate(&self) -> ReferenceResult<()> {
        let invalid = |reason: String| ReferenceError::InvalidTable {
            domain: self.domain,
            reason,
        };

        let last = self
            .bands
            .last()
            .ok_or_else(|| invalid("table has no bands".into()))?;
        if last.upper != UpperBound::Open {
            return Err(invalid("final band must be open-ended".into()));
        }

        let mut previous = 0.0;
        for (index, band) in self.bands.iter().enumerate() {
            let Some(edge) = band.upper.edge() else {
                if index + 1 != self.bands.len() {
                    return Err(invalid(format!("band {} is open but not last", index)));
                }
                continue;
            };
            if !edge.is_finite() {
                return Err(invalid(format!("band {} has non-finite edge", index)));
            }
            if edge <= previous {
                return Err(invalid(format!(
                    "band {} edge {} does not exceed {}",
                    index, edge, previous
                )));
            }
            previous = edge;
        }

        Ok(())
    }

    /// Category for a value. Fails on negative or non-finite input.
    pub fn categorize(&self, value: f64) -> ReferenceResult<C> {
        if !value.is_finite() || value < 0.0 {
            return Err(ReferenceError::OutOfDomain {
                domain: self.domain,
                value,
            });
        }

        self.bands
            .iter()
            .find(|band| band.upper.admits(value))
            .map(|band| band.category)
            .ok_or(ReferenceError::OutOfDomain {
                domain: self.domain,
                value,
            })
    }

    /// Domain this table covers.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Bands in ascending order.
    pub fn bands(&self) -> &[Band<C>] {
        &self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Low,
        Mid,
        High,
    }

    fn table() -> RangeTable<Level> {
        RangeTable::new(
            Domain::HeartRate,
            [
                (UpperBound::Below(10.0), Level::Low),
                (UpperBound::Through(20.0), Level::Mid),
                (UpperBound::Open, Level::High),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lower_edges_are_implied() {
        let t = table();
        let bands = t.bands();

        assert_eq!(bands[0].lower, 0.0);
        assert!(bands[0].lower_inclusive);
        assert_eq!(bands[1].lower, 10.0);
        assert!(bands[1].lower_inclusive);
        assert_eq!(bands[2].lower, 20.0);
        assert!(!bands[2].lower_inclusive);
    }

    #[test]
    fn test_edge_inclusion() {
        let t = table();
        assert_eq!(t.categorize(0.0).unwrap(), Level::Low);
        assert_eq!(t.categorize(9.999).unwrap(), Level::Low);
        assert_eq!(t.categorize(10.0).unwrap(), Level::Mid);
        assert_eq!(t.categorize(20.0).unwrap(), Level::Mid);
        assert_eq!(t.categorize(20.001).unwrap(), Level::High);
        assert_eq!(t.categorize(1e9).unwrap(), Level::High);
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        let t = table();
        for value in [-0.1, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                t.categorize(value),
                Err(ReferenceError::OutOfDomain { domain: Domain::HeartRate, .. })
            ));
        }
    }

    #[test]
    fn test_rejects_unsorted_edges() {
        let result = RangeTable::new(
            Domain::Bmi,
            [
                (UpperBound::Below(25.0), Level::Low),
                (UpperBound::Below(18.5), Level::Mid),
                (UpperBound::Open, Level::High),
            ],
        );
        assert!(matches!(result, Err(ReferenceError::InvalidTable { .. })));
    }

    #[test]
    fn test_rejects_closed_final_band() {
        let result = RangeTable::new(
            Domain::Bmi,
            [
                (UpperBound::Below(18.5), Level::Low),
                (UpperBound::Below(25.0), Level::Mid),
            ],
        );
        assert!(matches!(result, Err(ReferenceError::InvalidTable { .. })));
    }

    #[test]
    fn test_rejects_open_band_in_middle() {
        let result = RangeTable::new(
            Domain::Bmi,
            [
                (UpperBound::Below(18.5), Level::Low),
                (UpperBound::Open, Level::Mid),
                (UpperBound::Open, Level::High),
            ],
        );
        assert!(matches!(result, Err(ReferenceError::InvalidTable { .. })));
    }

    #[test]
    fn test_rejects_empty_table() {
        let result = RangeTable::<Level>::new(Domain::Bmi, []);
        assert!(matches!(result, Err(ReferenceError::InvalidTable { .. })));
    }
}
