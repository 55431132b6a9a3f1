//! Locating and replacing translatable text runs in a slide tree.
//!
//! Traversal order is the only correspondence key between extraction
//! and reinsertion: both passes walk the tree depth-first, pre-order,
//! children in document order, and consider exactly the same leaves.
//! No positional IDs exist in the markup itself.

use crate::xml::{XmlElement, XmlNode};

/// Tag name of a DrawingML text run. The prefix is part of the name;
/// slide parts always bind the `a` prefix to the DrawingML namespace.
pub const TEXT_RUN_TAG: &str = "a:t";

/// Collect every translatable text value, in document order.
///
/// A value qualifies if it is a direct text child of a text-run element
/// and is non-empty after trimming. Empty and whitespace-only runs are
/// skipped entirely and never occupy a slot.
pub fn collect_texts(root: &XmlElement) -> Vec<String> {
    let mut texts = Vec::new();
    collect_into(root, &mut texts);
    texts
}

fn collect_into(element: &XmlElement, texts: &mut Vec<String>) {
    let is_run = element.name == TEXT_RUN_TAG;
    for child in &element.children {
        match child {
            XmlNode::Text(value) if is_run => {
                if !value.trim().is_empty() {
                    texts.push(value.clone());
                }
            }
            XmlNode::Element(e) => collect_into(e, texts),
            _ => {}
        }
    }
}

/// Overwrite translatable text values in place, in document order.
///
/// The Nth qualifying leaf receives `replacements[N]`. If the
/// replacement list is shorter than the number of qualifying leaves,
/// the remaining leaves keep their original text; count validation is
/// the caller's job. Returns the number of leaves overwritten.
///
/// Two-phase: qualifying slots are collected first (the identical
/// traversal as [`collect_texts`]), then assigned by index, so no
/// counter is threaded through the recursion.
pub fn inject_texts(root: &mut XmlElement, replacements: &[String]) -> usize {
    let mut slots = Vec::new();
    slots_into(root, &mut slots);

    let count = slots.len().min(replacements.len());
    for (slot, replacement) in slots.into_iter().zip(replacements) {
        *slot = replacement.clone();
    }
    count
}

fn slots_into<'a>(element: &'a mut XmlElement, slots: &mut Vec<&'a mut String>) {
    let is_run = element.name == TEXT_RUN_TAG;
    for child in element.children.iter_mut() {
        match child {
            XmlNode::Text(value) if is_run => {
                if !value.trim().is_empty() {
                    slots.push(value);
                }
            }
            XmlNode::Element(e) => slots_into(e, slots),
            _ => {}
        }
    }
}
