//! Annotation nodes, and distribution of a flat annotation stream over the
//! parts of a type reference.

use nova_hir::{AnnotationId, AnnotationKind, Resolution};
use nova_syntax::JavaFeature;
use nova_types::{ClassId, MethodId, ModuleId, PackageId, TypeVarId, VarId};

use super::{Converter, Origin, Result};
use crate::ast::{
    MarkerAnnotation, MemberValuePair, Node, NodeId, NormalAnnotation, SingleMemberAnnotation,
};

/// What an annotation node annotates. Keys of declaration annotations are
/// derived from the annotated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AnnotationOwner {
    Class(ClassId),
    Method(MethodId),
    Var(VarId),
    TypeParam(TypeVarId),
    Package(PackageId),
    Module(ModuleId),
    /// A type-use annotation.
    TypeUse,
    /// An annotation written as a member value of another annotation.
    Value,
    /// The annotated declaration did not resolve.
    Unknown,
}

impl AnnotationOwner {
    pub(crate) fn var(var: Option<VarId>) -> Self {
        var.map_or(AnnotationOwner::Unknown, AnnotationOwner::Var)
    }

    pub(crate) fn method(method: Option<MethodId>) -> Self {
        method.map_or(AnnotationOwner::Unknown, AnnotationOwner::Method)
    }

    pub(crate) fn class(class: Option<ClassId>) -> Self {
        class.map_or(AnnotationOwner::Unknown, AnnotationOwner::Class)
    }
}

/// Result of [`distribute`]: for every target, the indices of the
/// annotations it receives, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Distribution {
    pub slots: Vec<Vec<usize>>,
    /// Positions were inconsistent; some annotation went to a fallback target.
    pub malformed: bool,
}

/// Assign annotations to targets by position.
///
/// `anchors[i]` is the offset of the token that starts target `i` (a name
/// segment, a `[`, a `...`), in source order. An annotation belongs to the
/// first target whose anchor follows it. Annotations after the last anchor
/// go to the last target and mark the distribution malformed. Every
/// annotation lands in exactly one slot.
pub(crate) fn distribute(starts: &[usize], anchors: &[usize]) -> Distribution {
    let mut slots = vec![Vec::new(); anchors.len()];
    let mut malformed = anchors.windows(2).any(|pair| pair[0] > pair[1]);
    if anchors.is_empty() {
        return Distribution {
            slots,
            malformed: !starts.is_empty(),
        };
    }
    for (idx, &start) in starts.iter().enumerate() {
        match anchors.iter().position(|&anchor| anchor > start) {
            Some(target) => slots[target].push(idx),
            None => {
                malformed = true;
                slots[anchors.len() - 1].push(idx);
            }
        }
    }
    Distribution { slots, malformed }
}

impl Converter<'_> {
    pub(crate) fn convert_annotation(
        &mut self,
        id: AnnotationId,
        owner: AnnotationOwner,
    ) -> Result<NodeId> {
        let annotation = self.annotation(id)?;
        let type_name = self.convert_name_ref(&annotation.name, None);
        let node: Node = match &annotation.kind {
            AnnotationKind::Marker => MarkerAnnotation { type_name }.into(),
            AnnotationKind::SingleMember(value) => SingleMemberAnnotation {
                type_name,
                value: self.convert_expr(*value)?,
            }
            .into(),
            AnnotationKind::Normal(pairs) => {
                let mut values = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let resolution = pair.method.map_or(Resolution::Unresolved, Resolution::Method);
                    let name = self.simple_name(
                        &pair.name,
                        Origin::Name {
                            resolution,
                            expr: None,
                        },
                    );
                    let value = self.convert_expr(pair.value)?;
                    let node = self.alloc(MemberValuePair { name, value }, pair.span);
                    self.record(
                        node,
                        Origin::MemberValuePair {
                            annotation: id,
                            owner,
                            name: pair.name.name.clone(),
                        },
                    );
                    values.push(node);
                }
                NormalAnnotation { type_name, values }.into()
            }
        };
        let node = self.alloc(node, annotation.span);
        self.record(node, Origin::Annotation { id, owner });
        self.mark_recovered(node, annotation.recovered);
        self.gate(node, JavaFeature::Annotations);
        if owner == AnnotationOwner::TypeUse {
            self.gate(node, JavaFeature::TypeAnnotations);
        }
        Ok(node)
    }

    pub(crate) fn convert_annotations(
        &mut self,
        ids: &[AnnotationId],
        owner: AnnotationOwner,
    ) -> Result<Vec<NodeId>> {
        ids.iter()
            .map(|id| self.convert_annotation(*id, owner))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_go_to_the_next_anchor() {
        // `@A java.util.@B @C List @D [] @E []`
        let starts = [0, 13, 16, 24, 30];
        let anchors = [3, 8, 19, 27, 33];
        let dist = distribute(&starts, &anchors);
        assert!(!dist.malformed);
        assert_eq!(
            dist.slots,
            vec![vec![0], vec![], vec![1, 2], vec![3], vec![4]]
        );
    }

    #[test]
    fn trailing_annotations_fall_back_to_the_last_target() {
        let dist = distribute(&[0, 10], &[5]);
        assert!(dist.malformed);
        assert_eq!(dist.slots, vec![vec![0, 1]]);
    }

    #[test]
    fn no_targets_means_malformed_only_with_annotations() {
        assert!(!distribute(&[], &[]).malformed);
        assert!(distribute(&[1], &[]).malformed);
    }

    #[test]
    fn every_annotation_is_assigned_exactly_once() {
        let starts = [1, 2, 9, 40, 41];
        let anchors = [5, 3, 30];
        let dist = distribute(&starts, &anchors);
        assert!(dist.malformed);
        let mut seen: Vec<usize> = dist.slots.concat();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
