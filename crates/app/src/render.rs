//! Terminal layout of one exercise and parsing of the learner's typed answer.
//!
//! Ordering, matching and grouping are shuffled here, at render time. The
//! engine only ever sees the final arrangement as a `Response`.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::SliceRandom;

use visor_core::model::interaction::TemplatePart;
use visor_core::model::{Interaction, Placement, Response};

/// What was shown on screen, kept so typed input can be mapped back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Choice {
        options: Vec<(String, String)>,
    },
    FillGaps {
        sentence: String,
        gaps: usize,
    },
    /// `(canonical order, text)` in displayed order.
    Ordering {
        steps: Vec<(u32, String)>,
    },
    Matching {
        lefts: Vec<String>,
        rights: Vec<String>,
    },
    Grouping {
        items: Vec<String>,
        categories: Vec<String>,
    },
    Ungradeable {
        type_name: String,
    },
}

impl Layout {
    pub fn new<R: Rng>(interaction: &Interaction, rng: &mut R) -> Self {
        match interaction {
            Interaction::MultipleChoice(choice) | Interaction::TrueFalse(choice) => Layout::Choice {
                options: choice
                    .options
                    .iter()
                    .map(|opt| (opt.id.clone(), opt.text.clone()))
                    .collect(),
            },
            Interaction::FillGaps(fill) => {
                let mut sentence = String::new();
                for part in &fill.parts {
                    match part {
                        TemplatePart::Text(text) => sentence.push_str(text),
                        TemplatePart::Gap(i) => {
                            let _ = write!(sentence, "__({})__", i + 1);
                        }
                    }
                }
                Layout::FillGaps {
                    sentence,
                    gaps: fill.gaps.len(),
                }
            }
            Interaction::Ordering(ordering) => {
                let mut steps: Vec<(u32, String)> = ordering
                    .sequence
                    .iter()
                    .map(|step| (step.order, step.text.clone()))
                    .collect();
                steps.shuffle(rng);
                Layout::Ordering { steps }
            }
            Interaction::Matching(matching) => {
                let lefts = matching.pairs.iter().map(|p| p.left.clone()).collect();
                let mut rights: Vec<String> =
                    matching.pairs.iter().map(|p| p.right.clone()).collect();
                rights.shuffle(rng);
                Layout::Matching { lefts, rights }
            }
            Interaction::Grouping(grouping) => {
                let mut items: Vec<String> = Vec::new();
                for item in &grouping.items {
                    if !items.contains(&item.text) {
                        items.push(item.text.clone());
                    }
                }
                items.shuffle(rng);
                Layout::Grouping {
                    items,
                    categories: grouping.categories.clone(),
                }
            }
            Interaction::Unsupported { type_name } => Layout::Ungradeable {
                type_name: type_name.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_gradeable(&self) -> bool {
        !matches!(self, Layout::Ungradeable { .. })
    }

    /// Body lines printed under the prompt.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Layout::Choice { options } => {
                for (n, (id, text)) in options.iter().enumerate() {
                    let _ = writeln!(out, "  {}) {text}  [{id}]", n + 1);
                }
            }
            Layout::FillGaps { sentence, .. } => {
                let _ = writeln!(out, "  {sentence}");
            }
            Layout::Ordering { steps } => {
                for (n, (_, text)) in steps.iter().enumerate() {
                    let _ = writeln!(out, "  {}) {text}", n + 1);
                }
            }
            Layout::Matching { lefts, rights } => {
                for (n, left) in lefts.iter().enumerate() {
                    let _ = writeln!(out, "  {}) {left}", n + 1);
                }
                for (n, right) in rights.iter().enumerate() {
                    let _ = writeln!(out, "  {}) {right}", letter(n));
                }
            }
            Layout::Grouping { items, categories } => {
                for (n, category) in categories.iter().enumerate() {
                    let _ = writeln!(out, "  [{}] {category}", n + 1);
                }
                for (n, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "  {}) {item}", n + 1);
                }
            }
            Layout::Ungradeable { type_name } => {
                let _ = writeln!(out, "  ({type_name} exercises cannot be answered here)");
            }
        }
        out
    }

    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Layout::Choice { .. } => "option number or id",
            Layout::FillGaps { .. } => "one answer per gap, separated by |",
            Layout::Ordering { .. } => "step numbers in the right order, e.g. 3 1 2",
            Layout::Matching { .. } => "one letter per numbered item, e.g. b a c",
            Layout::Grouping { .. } => "a category number per item, - to leave it unplaced",
            Layout::Ungradeable { .. } => "press Enter to skip",
        }
    }

    /// Turn one line of input into the response shape the engine expects.
    ///
    /// # Errors
    ///
    /// Returns an error describing what the input should look like.
    pub fn parse(&self, input: &str) -> Result<Response> {
        let input = input.trim();
        match self {
            Layout::Choice { options } => {
                if input.is_empty() {
                    return Ok(Response::no_choice());
                }
                if let Some((id, _)) = options.iter().find(|(id, _)| id == input) {
                    return Ok(Response::choice(id.clone()));
                }
                let n = number(input, options.len())?;
                Ok(Response::choice(options[n].0.clone()))
            }
            Layout::FillGaps { gaps, .. } => {
                let inputs: Vec<&str> = input.split('|').map(str::trim).collect();
                if inputs.len() != *gaps {
                    bail!("expected {gaps} answers separated by |, got {}", inputs.len());
                }
                Ok(Response::fill_gaps(inputs))
            }
            Layout::Ordering { steps } => {
                let picks = tokens(input, steps.len())?
                    .map(|tok| number(tok, steps.len()))
                    .collect::<Result<Vec<_>>>()?;
                let mut seen = vec![false; steps.len()];
                for &n in &picks {
                    if std::mem::replace(&mut seen[n], true) {
                        bail!("step {} listed twice", n + 1);
                    }
                }
                Ok(Response::ordering(
                    picks.into_iter().map(|n| steps[n].0).collect::<Vec<_>>(),
                ))
            }
            Layout::Matching { lefts, rights } => {
                let picked = tokens(input, lefts.len())?
                    .map(|tok| {
                        let n = letter_index(tok)
                            .filter(|n| *n < rights.len())
                            .with_context(|| format!("unknown letter {tok:?}"))?;
                        Ok(rights[n].clone())
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Response::matching(picked))
            }
            Layout::Grouping { items, categories } => {
                let mut placements = Vec::new();
                let mut unplaced = 0;
                for (item, tok) in items.iter().zip(tokens(input, items.len())?) {
                    if tok == "-" {
                        unplaced += 1;
                    } else {
                        let n = number(tok, categories.len())?;
                        placements.push(Placement::new(item.clone(), categories[n].clone()));
                    }
                }
                Ok(Response::grouping(placements, unplaced))
            }
            Layout::Ungradeable { type_name } => bail!("{type_name} exercises cannot be graded"),
        }
    }
}

fn tokens(input: &str, expected: usize) -> Result<impl Iterator<Item = &str>> {
    let count = input.split_whitespace().count();
    if count != expected {
        bail!("expected {expected} entries, got {count}");
    }
    Ok(input.split_whitespace())
}

/// One-based `input` to a zero-based index below `len`.
fn number(input: &str, len: usize) -> Result<usize> {
    let n: usize = input
        .parse()
        .with_context(|| format!("{input:?} is not a number"))?;
    if n == 0 || n > len {
        bail!("{n} is out of range 1..={len}");
    }
    Ok(n - 1)
}

fn letter(n: usize) -> char {
    u8::try_from(n)
        .ok()
        .and_then(|n| b'a'.checked_add(n))
        .map_or('?', char::from)
}

fn letter_index(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    let c = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() || !c.is_ascii_lowercase() {
        return None;
    }
    Some(usize::from(c as u8 - b'a'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn layout(type_name: &str, value: serde_json::Value) -> Layout {
        Layout::new(
            &Interaction::from_raw(type_name, &value),
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn choice_accepts_number_id_or_nothing() {
        let layout = layout("true_false", json!({"answer": true}));
        assert_eq!(layout.parse("1").unwrap(), Response::choice("true"));
        assert_eq!(layout.parse("false").unwrap(), Response::choice("false"));
        assert_eq!(layout.parse("  ").unwrap(), Response::no_choice());
        assert!(layout.parse("7").is_err());
    }

    #[test]
    fn fill_gaps_numbers_blanks() {
        let layout = layout("fill_gaps", json!({"template": "A [b] c [d]."}));
        assert!(layout.render().contains("A __(1)__ c __(2)__."));
        assert_eq!(
            layout.parse("b | d").unwrap(),
            Response::fill_gaps(["b", "d"])
        );
        assert!(layout.parse("only one").is_err());
    }

    #[test]
    fn ordering_maps_display_positions_to_canonical_order() {
        let layout = layout("ordering", json!({"sequence": ["first", "second", "third"]}));
        let Layout::Ordering { steps } = &layout else {
            panic!("expected ordering layout");
        };
        let mut by_order = steps.clone();
        by_order.sort();
        let input: Vec<String> = by_order
            .iter()
            .map(|step| (steps.iter().position(|s| s == step).unwrap() + 1).to_string())
            .collect();

        assert_eq!(
            layout.parse(&input.join(" ")).unwrap(),
            Response::ordering(vec![1, 2, 3])
        );
        assert!(layout.parse("1 1 2").is_err());
    }

    #[test]
    fn matching_maps_letters_to_right_values() {
        let layout = layout(
            "matching",
            json!({"pairs": [{"left": "dog", "right": "perro"}, {"left": "cat", "right": "gato"}]}),
        );
        let Layout::Matching { rights, .. } = &layout else {
            panic!("expected matching layout");
        };
        let a = rights[0].clone();
        let b = rights[1].clone();
        assert_eq!(layout.parse("a b").unwrap(), Response::matching([a, b]));
        assert!(layout.parse("a z").is_err());
    }

    #[test]
    fn grouping_counts_unplaced_items() {
        let layout = layout(
            "grouping",
            json!({"categories": ["x", "y"], "items": [
                {"text": "1", "category": "x"}, {"text": "2", "category": "y"}
            ]}),
        );
        let Response::Grouping { placements, unplaced } = layout.parse("1 -").unwrap() else {
            panic!("expected grouping response");
        };
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].category, "x");
        assert_eq!(unplaced, 1);
    }

    #[test]
    fn unsupported_types_render_but_never_parse() {
        let layout = layout("hotspot", json!({}));
        assert!(!layout.is_gradeable());
        assert!(layout.render().contains("hotspot"));
        assert!(layout.parse("").is_err());
    }
}
