//! # Pages
//!
//! Pure layout: field list in, ordered pages out.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use shared_types::FormField;

/// One screen of the survey. Derived, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Heading.
    pub title: String,
    /// Fields in display order.
    pub fields: Vec<FormField>,
}

impl Page {
    /// Ids of the fields on this page.
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }
}

/// Reorder fields. A seed makes the order reproducible.
pub fn shuffle_fields(fields: &mut [FormField], seed: Option<u64>) {
    match seed {
        Some(seed) => fields.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => fields.shuffle(&mut rand::thread_rng()),
    }
}

/// Split `fields` into pages.
///
/// A page-break marker closes the accumulated page and is dropped; a field
/// flagged "start new page" closes it and opens the next one. Empty pages
/// are never emitted, except that a form without fields still has one page.
/// A page closed by a labelled marker takes that label, other pages are
/// `Page N`. A form with a single page is titled `form_title`.
pub fn paginate(fields: &[FormField], form_title: &str) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<FormField> = Vec::new();

    for field in fields {
        let breaks = field.is_page_break() || field.settings.start_new_page;
        if breaks && !current.is_empty() {
            let label = field.label.trim();
            let title = if field.is_page_break() && !label.is_empty() {
                label.to_string()
            } else {
                format!("Page {}", pages.len() + 1)
            };
            pages.push(Page {
                title,
                fields: std::mem::take(&mut current),
            });
        }
        if !field.is_page_break() {
            current.push(field.clone());
        }
    }

    if !current.is_empty() || pages.is_empty() {
        let title = if pages.is_empty() {
            form_title.to_string()
        } else {
            format!("Page {}", pages.len() + 1)
        };
        pages.push(Page {
            title,
            fields: current,
        });
    }
    pages
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::FieldKind;

    /// Field lists built from non-empty segments joined by single markers.
    fn arb_segments() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..6, 1..8)
    }

    fn build(segments: &[usize]) -> Vec<FormField> {
        let mut fields = Vec::new();
        let mut n = 0;
        for (i, len) in segments.iter().enumerate() {
            if i > 0 {
                fields.push(FormField::page_break(format!("br{i}")));
            }
            for _ in 0..*len {
                fields.push(FormField::new(format!("q{n}"), "Q", FieldKind::Text));
                n += 1;
            }
        }
        fields
    }

    proptest! {
        #[test]
        fn no_markers_means_one_page_in_order(len in 1usize..40) {
            let fields = build(&[len]);
            let pages = paginate(&fields, "Survey");
            prop_assert_eq!(pages.len(), 1);
            prop_assert_eq!(&pages[0].fields, &fields);
        }

        #[test]
        fn n_markers_give_n_plus_one_pages(segments in arb_segments()) {
            let fields = build(&segments);
            let markers = fields.iter().filter(|f| f.is_page_break()).count();
            let pages = paginate(&fields, "Survey");
            prop_assert_eq!(pages.len(), markers + 1);
            for (page, len) in pages.iter().zip(&segments) {
                prop_assert_eq!(page.fields.len(), *len);
            }
        }

        #[test]
        fn pagination_preserves_input_order(segments in arb_segments()) {
            let fields = build(&segments);
            let flattened: Vec<_> = paginate(&fields, "Survey")
                .into_iter()
                .flat_map(|p| p.fields)
                .collect();
            let inputs: Vec<_> = fields.into_iter().filter(|f| !f.is_page_break()).collect();
            prop_assert_eq!(flattened, inputs);
        }

        #[test]
        fn seeded_shuffle_is_a_permutation(len in 0usize..30, seed in any::<u64>()) {
            let fields = build(&[len.max(1)]);
            let mut shuffled = fields.clone();
            shuffle_fields(&mut shuffled, Some(seed));
            let mut again = fields.clone();
            shuffle_fields(&mut again, Some(seed));
            prop_assert_eq!(&shuffled, &again);
            prop_assert_eq!(shuffled.len(), fields.len());
        }
    }
}
