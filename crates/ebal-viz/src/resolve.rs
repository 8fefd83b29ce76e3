//! Deterministic draw order and color assignment.

use std::collections::{HashMap, HashSet};

use ebal_core::{BalanceView, FlowKey, NodeLabel};
use serde::{Deserialize, Serialize};

use crate::style::{Color, OrderSpec, StyleSpec};

/// Order and colors for one bus balance, ready for composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBalance {
    pub bus: NodeLabel,
    pub ordered_in: Vec<FlowKey>,
    pub ordered_out: Vec<FlowKey>,
    pub colors: HashMap<FlowKey, Color>,
}

/// Applies `order` and `style` to a balance view.
///
/// Each group is the explicit order filtered to its members, followed by
/// the remaining members in encounter order. Colors come from the
/// overrides where given, otherwise from the next free palette slot in
/// first-assignment order; the result is identical for identical inputs.
pub fn resolve(view: &BalanceView, order: &OrderSpec, style: &StyleSpec) -> ResolvedBalance {
    let ordered_in = apply_order(&view.inflows, &order.inorder);
    let ordered_out = apply_order(&view.outflows, &order.outorder);

    let mut colors = HashMap::new();
    let mut taken: HashSet<Color> = HashSet::new();
    let mut cursor = 0usize;

    for key in ordered_in.iter().chain(ordered_out.iter()) {
        if colors.contains_key(key) {
            continue;
        }
        let color = match style.overrides.get(key) {
            Some(color) => *color,
            None => next_free(&style.palette, &taken, &mut cursor),
        };
        taken.insert(color);
        colors.insert(key.clone(), color);
    }

    ResolvedBalance {
        bus: view.bus.clone(),
        ordered_in,
        ordered_out,
        colors,
    }
}

fn apply_order(group: &[FlowKey], explicit: &[FlowKey]) -> Vec<FlowKey> {
    let mut ordered: Vec<FlowKey> = explicit
        .iter()
        .filter(|key| group.contains(key))
        .cloned()
        .collect();
    for key in group {
        if !ordered.contains(key) {
            ordered.push(key.clone());
        }
    }
    ordered
}

/// Next palette color not yet taken; once every palette entry is in use
/// the cycle wraps and colors start repeating.
fn next_free(palette: &[Color], taken: &HashSet<Color>, cursor: &mut usize) -> Color {
    if palette.is_empty() {
        return Color::rgb(0x7f, 0x7f, 0x7f);
    }
    for _ in 0..palette.len() {
        let candidate = palette[*cursor % palette.len()];
        *cursor += 1;
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    let wrapped = palette[*cursor % palette.len()];
    *cursor += 1;
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebal_core::NodeLabel;

    fn view() -> BalanceView {
        BalanceView {
            bus: NodeLabel::from("bel"),
            inflows: vec![
                FlowKey::new("wind", "bel"),
                FlowKey::new("pv", "bel"),
                FlowKey::new("pp_gas", "bel"),
            ],
            outflows: vec![
                FlowKey::new("bel", "demand"),
                FlowKey::new("bel", "excess"),
            ],
        }
    }

    #[test]
    fn explicit_order_comes_first_then_encounter_order() {
        let order = OrderSpec::default().with_inorder(vec![
            FlowKey::new("pv", "bel"),
            FlowKey::new("biomass", "bel"), // not in this view; ignored
        ]);
        let resolved = resolve(&view(), &order, &StyleSpec::default());
        let sources: Vec<_> = resolved
            .ordered_in
            .iter()
            .map(|k| k.source.as_str())
            .collect();
        assert_eq!(sources, ["pv", "wind", "pp_gas"]);
    }

    #[test]
    fn resolve_is_deterministic() {
        let order = OrderSpec::default();
        let style = StyleSpec::default();
        let first = resolve(&view(), &order, &style);
        let second = resolve(&view(), &order, &style);
        assert_eq!(first, second);
    }

    #[test]
    fn overrides_win_and_fallback_skips_taken_colors() {
        let wind = FlowKey::new("wind", "bel");
        let style = StyleSpec::default().with_color(wind.clone(), crate::style::DEFAULT_PALETTE[0]);
        let resolved = resolve(&view(), &OrderSpec::default(), &style);

        assert_eq!(resolved.colors[&wind], crate::style::DEFAULT_PALETTE[0]);
        // pv falls back and must not collide with the override
        let pv = FlowKey::new("pv", "bel");
        assert_ne!(resolved.colors[&pv], resolved.colors[&wind]);
    }

    #[test]
    fn distinct_flows_get_distinct_colors_within_palette() {
        let resolved = resolve(&view(), &OrderSpec::default(), &StyleSpec::default());
        let mut seen = std::collections::HashSet::new();
        for color in resolved.colors.values() {
            assert!(seen.insert(*color));
        }
    }

    #[test]
    fn exhausted_palette_wraps() {
        let style = StyleSpec::default().with_palette(vec![Color::rgb(1, 2, 3)]);
        let resolved = resolve(&view(), &OrderSpec::default(), &style);
        for color in resolved.colors.values() {
            assert_eq!(*color, Color::rgb(1, 2, 3));
        }
    }
}
