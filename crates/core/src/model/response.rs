use serde::{Deserialize, Serialize};

/// Where the learner dropped one grouping item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub item: String,
    pub category: String,
}

/// The learner's captured answer, one shape per typology.
///
/// The presentation layer builds these from the final on-screen state; any
/// shuffling it did while rendering never reaches the validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// `multiple_choice` and `true_false`: the selected option id, if any.
    Choice { selected: Option<String> },
    /// One input per gap, in template order.
    FillGaps { inputs: Vec<String> },
    /// Canonical order keys of the items, in the order they sit on screen.
    Ordering { order: Vec<u32> },
    /// Right-hand values as currently aligned with each left item, by position.
    Matching { rights: Vec<String> },
    /// Final category assignments plus how many items are still in the staging pool.
    Grouping {
        placements: Vec<Placement>,
        unplaced: usize,
    },
}

impl Response {
    #[must_use]
    pub fn choice(selected: impl Into<String>) -> Self {
        Self::Choice {
            selected: Some(selected.into()),
        }
    }

    #[must_use]
    pub fn no_choice() -> Self {
        Self::Choice { selected: None }
    }

    #[must_use]
    pub fn fill_gaps<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FillGaps {
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn ordering(order: impl Into<Vec<u32>>) -> Self {
        Self::Ordering {
            order: order.into(),
        }
    }

    #[must_use]
    pub fn matching<I, S>(rights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Matching {
            rights: rights.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn grouping(placements: Vec<Placement>, unplaced: usize) -> Self {
        Self::Grouping {
            placements,
            unplaced,
        }
    }

    /// Short name of the response shape, used in mismatch errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Choice { .. } => "choice",
            Response::FillGaps { .. } => "fill_gaps",
            Response::Ordering { .. } => "ordering",
            Response::Matching { .. } => "matching",
            Response::Grouping { .. } => "grouping",
        }
    }
}

impl Placement {
    #[must_use]
    pub fn new(item: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_is_tagged_by_kind() {
        let json = serde_json::to_value(Response::ordering(vec![2, 1])).unwrap();
        assert_eq!(json["kind"], "ordering");
        assert_eq!(json["order"], serde_json::json!([2, 1]));
    }

    #[test]
    fn kind_names_shapes() {
        assert_eq!(Response::no_choice().kind(), "choice");
        assert_eq!(Response::grouping(Vec::new(), 0).kind(), "grouping");
    }
}
