use nova_hir::Modifiers;
use nova_types::Modifiers as Flags;

use super::{AnnotationOwner, Converter, Result};
use crate::ast::{Modifier, NodeId};
use crate::position::offset;

impl Converter<'_> {
    /// Modifier keywords and declaration annotations, interleaved in source
    /// order. Keywords are found by scanning the modifier span; flags the
    /// front-end implied without a keyword produce no node.
    pub(crate) fn convert_modifiers(
        &mut self,
        modifiers: &Modifiers,
        owner: AnnotationOwner,
    ) -> Result<Vec<NodeId>> {
        let mut items: Vec<(usize, NodeId)> = Vec::new();
        let mut skip = Vec::with_capacity(modifiers.annotations.len());
        for &id in &modifiers.annotations {
            let node = self.convert_annotation(id, owner)?;
            let range = self.ast.range(node);
            skip.push(range);
            items.push((offset(range), node));
        }

        if let Some(span) = modifiers.span {
            let range = self.range_of(span);
            let mut seen = Flags::empty();
            for (word, word_range) in self.tracker.words(range, &skip) {
                let Some(flag) = Flags::from_keyword(&word) else {
                    continue;
                };
                let node = self.alloc_range(Modifier { keyword: flag }, word_range);
                if seen.contains(flag) {
                    self.mark_malformed(node, format!("duplicate modifier `{word}`"));
                }
                seen |= flag;
                items.push((offset(word_range), node));
            }
        }

        items.sort_by_key(|(start, _)| *start);
        Ok(items.into_iter().map(|(_, node)| node).collect())
    }
}
