//! Type references to type nodes.
//!
//! A reference is converted in three steps. First the token layout is read
//! back from the source: where each name segment starts, where the element
//! type ends, and where every `[` and the `...` are. The flat annotation
//! stream is then split over those targets with [`distribute`]. Finally the
//! element node is built and wrapped in an `ArrayType` when dimensions were
//! written.
//!
//! Named chains follow one rule: the segments before the first annotated or
//! parameterized segment form a plain dotted name. That segment becomes a
//! `NameQualifiedType` when it is annotated and qualified, a `SimpleType`
//! otherwise; its arguments wrap it in a `ParameterizedType`; every later
//! segment is a `QualifiedType` over what came before.

use nova_core::{Name, TextRange};
use nova_hir::{
    AnnotationId, NameRef, NameSegment, Resolution, TypeRef, TypeRefId, TypeRefKind, TypeSegment,
    WildcardBoundKind,
};
use nova_syntax::JavaFeature;
use nova_types::{with_annotations, AnnotationInstance, Span, Type};

use super::{distribute, AnnotationOwner, Converter, Origin, Result};
use crate::ast::{
    ArrayType, Dimension, IntersectionType, NameQualifiedType, NodeId, ParameterizedType,
    PrimitiveType, QualifiedName, QualifiedType, SimpleName, SimpleType, UnionType, WildcardType,
};
use crate::position::{end_offset, offset, text_range};
use crate::ConvertError;

/// A converted type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConvertedType {
    pub node: NodeId,
    pub varargs: bool,
    /// Annotations written right before `...`.
    pub varargs_annotations: Vec<NodeId>,
}

/// `ty` with `dims` array levels removed.
fn peel(ty: &Type, dims: usize) -> Type {
    let mut ty = ty;
    for _ in 0..dims {
        match ty {
            Type::Array(component, _) => ty = component,
            _ => break,
        }
    }
    ty.clone()
}

fn raw_of(resolution: &Resolution) -> Option<Type> {
    match resolution {
        Resolution::Type(Type::Class(class)) => Some(Type::class(class.def, Vec::new())),
        Resolution::Type(other) => Some(other.clone()),
        _ => None,
    }
}

fn cover(ranges: impl IntoIterator<Item = TextRange>) -> Option<TextRange> {
    ranges.into_iter().reduce(|a, b| a.cover(b))
}

impl Converter<'_> {
    /// Convert a type reference that cannot be variable arity.
    pub(crate) fn convert_type(&mut self, id: TypeRefId) -> Result<NodeId> {
        let converted = self.convert_type_ref(id, false)?;
        if converted.varargs {
            self.mark_malformed(converted.node, "`...` outside of a parameter declaration");
        }
        Ok(converted.node)
    }

    pub(crate) fn convert_type_ref(&mut self, id: TypeRefId, allow_union: bool) -> Result<ConvertedType> {
        let type_ref = self.type_ref(id)?;
        let tracked = self.tracker.range(type_ref.span);
        let whole = tracked.range;

        let mut annotation_ranges = Vec::with_capacity(type_ref.annotations.len());
        for &annotation in &type_ref.annotations {
            annotation_ranges.push(self.range_of(self.annotation(annotation)?.span));
        }
        let starts: Vec<usize> = annotation_ranges.iter().map(|range| offset(*range)).collect();

        if matches!(
            type_ref.kind,
            TypeRefKind::Intersection(_) | TypeRefKind::Union(_)
        ) && !type_ref.annotations.is_empty()
        {
            return Err(ConvertError::Unsupported(
                "type annotations directly on an intersection or union type".to_string(),
            ));
        }

        let (element_anchors, element_end) = self.element_layout(type_ref, whole, &annotation_ranges)?;
        let mut problems = Vec::new();

        let dims = if type_ref.dims > 0 || type_ref.varargs {
            self.tracker
                .dimensions(element_end, end_offset(whole), &annotation_ranges)
        } else {
            Default::default()
        };
        let mut brackets = dims.brackets;
        if brackets.len() != type_ref.dims {
            problems.push(format!(
                "expected {} array dimensions, found {}",
                type_ref.dims,
                brackets.len()
            ));
            brackets.truncate(type_ref.dims);
            let at = brackets.last().map_or(element_end, |range| end_offset(*range));
            while brackets.len() < type_ref.dims {
                brackets.push(text_range(at, at));
            }
        }
        let ellipsis = match (type_ref.varargs, dims.ellipsis) {
            (false, _) => None,
            (true, Some(range)) => Some(range),
            (true, None) => {
                problems.push("variable arity type without `...`".to_string());
                let at = end_offset(whole);
                Some(text_range(at, at))
            }
        };

        let mut anchors = element_anchors.clone();
        anchors.extend(brackets.iter().map(|range| offset(*range)));
        anchors.extend(ellipsis.iter().map(|range| offset(*range)));
        let distribution = distribute(&starts, &anchors);
        if distribution.malformed {
            problems.push("type annotation positions do not match the type's structure".to_string());
        }
        let mut slots: Vec<Vec<AnnotationId>> = distribution
            .slots
            .iter()
            .map(|slot| slot.iter().map(|idx| type_ref.annotations[*idx]).collect())
            .collect();
        let varargs_slot = if ellipsis.is_some() { slots.pop() } else { None };
        let dim_slots = slots.split_off(element_anchors.len());
        let element_slots = slots;

        let element_ty = type_ref.ty.as_ref().map(|ty| peel(ty, type_ref.dims));
        let element = self.convert_element(type_ref, whole, element_end, element_slots, element_ty, allow_union)?;

        let node = if brackets.is_empty() {
            element
        } else {
            let mut dimensions = Vec::with_capacity(brackets.len());
            for (bracket, slot) in brackets.iter().zip(dim_slots) {
                dimensions.push(self.dimension(*bracket, &slot)?);
            }
            let range = self
                .ast
                .range(element)
                .cover(cover(dimensions.iter().map(|d| self.ast.range(*d))).unwrap_or(whole));
            let array = self.alloc_range(
                ArrayType {
                    element_type: element,
                    dimensions,
                },
                range,
            );
            self.record(
                array,
                Origin::Type {
                    ty: type_ref.ty.clone(),
                    generic_declaration: false,
                },
            );
            array
        };

        let varargs_annotations = match varargs_slot {
            Some(slot) => self.convert_annotations(&slot, AnnotationOwner::TypeUse)?,
            None => Vec::new(),
        };

        if tracked.clamped {
            problems.push(format!("source span {:?} lies outside the buffer", type_ref.span));
        }
        for problem in problems {
            self.mark_malformed(node, problem);
        }
        self.mark_recovered(node, type_ref.recovered);

        Ok(ConvertedType {
            node,
            varargs: type_ref.varargs,
            varargs_annotations,
        })
    }

    /// Anchor offsets of the element's annotation targets, and the offset
    /// where the element ends (dimensions start after it).
    fn element_layout(
        &self,
        type_ref: &TypeRef,
        whole: TextRange,
        annotations: &[TextRange],
    ) -> Result<(Vec<usize>, usize)> {
        Ok(match &type_ref.kind {
            TypeRefKind::Primitive(_) | TypeRefKind::Void | TypeRefKind::Var | TypeRefKind::Wildcard(None) => {
                match self.tracker.first_token_outside(whole, annotations) {
                    Some(token) => (vec![token.start()], token.end()),
                    None => (vec![end_offset(whole)], end_offset(whole)),
                }
            }
            TypeRefKind::Wildcard(Some(_)) => {
                let anchor = self
                    .tracker
                    .first_token_outside(whole, annotations)
                    .map_or(offset(whole), |token| token.start());
                (vec![anchor], end_offset(whole))
            }
            TypeRefKind::Named(segments) if !segments.is_empty() => {
                let anchors: Vec<usize> = segments
                    .iter()
                    .map(|segment| offset(self.range_of(segment.span)))
                    .collect();
                let last = &segments[segments.len() - 1];
                let name_end = end_offset(self.range_of(last.span));
                let end = match &last.args {
                    Some(_) => self
                        .tracker
                        .closing_angle(name_end, end_offset(whole))
                        .unwrap_or(name_end),
                    None => name_end,
                };
                (anchors, end)
            }
            TypeRefKind::Named(_) | TypeRefKind::Missing => {
                (vec![end_offset(whole)], end_offset(whole))
            }
            TypeRefKind::Intersection(parts) | TypeRefKind::Union(parts) => {
                let end = match parts.last() {
                    Some(last) => end_offset(self.range_of(self.type_ref(*last)?.span)),
                    None => end_offset(whole),
                };
                (Vec::new(), end)
            }
        })
    }

    fn convert_element(
        &mut self,
        type_ref: &TypeRef,
        whole: TextRange,
        element_end: usize,
        slots: Vec<Vec<AnnotationId>>,
        element_ty: Option<Type>,
        allow_union: bool,
    ) -> Result<NodeId> {
        let first_slot = slots.first().cloned().unwrap_or_default();
        let node = match &type_ref.kind {
            TypeRefKind::Primitive(_) | TypeRefKind::Void => {
                let annotations = self.convert_annotations(&first_slot, AnnotationOwner::TypeUse)?;
                let primitive = match &type_ref.kind {
                    TypeRefKind::Primitive(primitive) => Some(*primitive),
                    _ => None,
                };
                let keyword = self.keyword_range(whole, element_end, &annotations);
                let range = self.cover_nodes(&annotations, keyword);
                let node = self.alloc_range(
                    PrimitiveType {
                        annotations,
                        primitive,
                    },
                    range,
                );
                self.record(
                    node,
                    Origin::Type {
                        ty: element_ty,
                        generic_declaration: false,
                    },
                );
                node
            }
            TypeRefKind::Var => {
                let annotations = self.convert_annotations(&first_slot, AnnotationOwner::TypeUse)?;
                let keyword = self.keyword_range(whole, element_end, &annotations);
                let name = self.alloc_range(
                    SimpleName {
                        identifier: Name::new("var"),
                    },
                    keyword,
                );
                let origin = Origin::Type {
                    ty: element_ty,
                    generic_declaration: false,
                };
                self.record(name, origin.clone());
                let range = self.cover_nodes(&annotations, keyword);
                let node = self.alloc_range(SimpleType { annotations, name }, range);
                self.record(node, origin);
                self.gate(node, JavaFeature::VarLocalInference);
                node
            }
            TypeRefKind::Named(segments) if !segments.is_empty() => {
                self.convert_named(segments, slots, element_ty, whole)?
            }
            TypeRefKind::Named(_) | TypeRefKind::Missing => {
                let annotations = self.convert_annotations(&first_slot, AnnotationOwner::TypeUse)?;
                let name = self.missing_name(offset(whole));
                let range = self.cover_nodes(&annotations, self.ast.range(name));
                let node = self.alloc_range(SimpleType { annotations, name }, range);
                self.record(
                    node,
                    Origin::Type {
                        ty: None,
                        generic_declaration: false,
                    },
                );
                self.mark_malformed(node, "missing type");
                node
            }
            TypeRefKind::Wildcard(bound) => {
                let annotations = self.convert_annotations(&first_slot, AnnotationOwner::TypeUse)?;
                let (bound, upper_bound) = match bound {
                    Some((kind, bound)) => (
                        Some(self.convert_type(*bound)?),
                        *kind == WildcardBoundKind::Extends,
                    ),
                    None => (None, true),
                };
                let question = self
                    .tracker
                    .first_token_outside(whole, &[])
                    .map_or(whole, |token| token.range);
                let mut range = self.cover_nodes(&annotations, question);
                if let Some(bound) = bound {
                    range = range.cover(self.ast.range(bound));
                }
                let node = self.alloc_range(
                    WildcardType {
                        annotations,
                        bound,
                        upper_bound,
                    },
                    range,
                );
                self.record(
                    node,
                    Origin::Type {
                        ty: element_ty,
                        generic_declaration: false,
                    },
                );
                self.gate(node, JavaFeature::Generics);
                node
            }
            TypeRefKind::Intersection(parts) => {
                let types = self.convert_all(parts, |this, part| this.convert_type(part))?;
                let range = self.cover_nodes(&types, whole);
                let node = self.alloc_range(IntersectionType { types }, range);
                self.record(
                    node,
                    Origin::Type {
                        ty: element_ty,
                        generic_declaration: false,
                    },
                );
                node
            }
            TypeRefKind::Union(parts) => {
                if !allow_union {
                    return Err(ConvertError::Unsupported(
                        "union type outside of a catch clause".to_string(),
                    ));
                }
                let types = self.convert_all(parts, |this, part| this.convert_type(part))?;
                let range = self.cover_nodes(&types, whole);
                let node = self.alloc_range(UnionType { types }, range);
                self.record(
                    node,
                    Origin::Type {
                        ty: element_ty,
                        generic_declaration: false,
                    },
                );
                self.gate(node, JavaFeature::MultiCatch);
                node
            }
        };
        Ok(node)
    }

    /// Range of a keyword-like element (`int`, `void`, `var`): the first token
    /// after its annotations.
    fn keyword_range(&self, whole: TextRange, element_end: usize, annotations: &[NodeId]) -> TextRange {
        let skip: Vec<TextRange> = annotations.iter().map(|a| self.ast.range(*a)).collect();
        match self.tracker.first_token_outside(whole, &skip) {
            Some(token) if token.end() <= element_end => token.range,
            _ => text_range(offset(whole), element_end.max(offset(whole))),
        }
    }

    /// `fallback` extended over `nodes`.
    fn cover_nodes(&self, nodes: &[NodeId], fallback: TextRange) -> TextRange {
        nodes
            .iter()
            .map(|node| self.ast.range(*node))
            .fold(fallback, |acc, range| acc.cover(range))
    }

    fn convert_named(
        &mut self,
        segments: &[TypeSegment],
        slots: Vec<Vec<AnnotationId>>,
        element_ty: Option<Type>,
        whole: TextRange,
    ) -> Result<NodeId> {
        let count = segments.len();
        let first = (0..count)
            .find(|&idx| segments[idx].args.is_some() || !slots[idx].is_empty())
            .unwrap_or(count - 1);

        let prefix = (first > 0).then(|| {
            let name = NameRef {
                segments: segments[..first]
                    .iter()
                    .map(|segment| NameSegment {
                        name: segment.name.clone(),
                        span: segment.span,
                        resolution: segment.resolution.clone(),
                    })
                    .collect(),
                span: Span::new(segments[0].span.start, segments[first - 1].span.end),
            };
            self.convert_name_ref(&name, None)
        });

        let segment = &segments[first];
        let annotations = self.convert_annotations(&slots[first], AnnotationOwner::TypeUse)?;
        let instances = self.instances(&slots[first])?;
        let name = self.segment_name(segment);
        let origin = self.segment_origin(segment, first == count - 1, &element_ty, instances.clone());
        let mut current = match prefix {
            Some(qualifier) if !annotations.is_empty() => {
                let range = self.ast.range(qualifier).cover(self.ast.range(name));
                self.alloc_range(
                    NameQualifiedType {
                        qualifier,
                        annotations,
                        name,
                    },
                    range,
                )
            }
            Some(qualifier) => {
                let range = self.ast.range(qualifier).cover(self.ast.range(name));
                let qualified = self.alloc_range(QualifiedName { qualifier, name }, range);
                self.record(
                    qualified,
                    Origin::Name {
                        resolution: segment.resolution.clone(),
                        expr: None,
                    },
                );
                self.alloc_range(
                    SimpleType {
                        annotations: Vec::new(),
                        name: qualified,
                    },
                    range,
                )
            }
            None => {
                let range = self.cover_nodes(&annotations, self.ast.range(name));
                self.alloc_range(SimpleType { annotations, name }, range)
            }
        };
        self.record(current, origin);
        current = self.wrap_arguments(current, segment, first == count - 1, &element_ty, instances, whole)?;

        for (idx, segment) in segments.iter().enumerate().skip(first + 1) {
            let annotations = self.convert_annotations(&slots[idx], AnnotationOwner::TypeUse)?;
            let instances = self.instances(&slots[idx])?;
            let name = self.segment_name(segment);
            let range = self.ast.range(current).cover(self.ast.range(name));
            let qualified = self.alloc_range(
                QualifiedType {
                    qualifier: current,
                    annotations,
                    name,
                },
                range,
            );
            let origin = self.segment_origin(segment, idx == count - 1, &element_ty, instances.clone());
            self.record(qualified, origin);
            current = self.wrap_arguments(qualified, segment, idx == count - 1, &element_ty, instances, whole)?;
        }
        Ok(current)
    }

    fn segment_name(&mut self, segment: &TypeSegment) -> NodeId {
        let node = self.alloc(
            SimpleName {
                identifier: segment.name.clone(),
            },
            segment.span,
        );
        self.record(
            node,
            Origin::Name {
                resolution: segment.resolution.clone(),
                expr: None,
            },
        );
        node
    }

    /// Origin of the unparameterized node for `segment`.
    fn segment_origin(
        &self,
        segment: &TypeSegment,
        is_last: bool,
        element_ty: &Option<Type>,
        annotations: Vec<AnnotationInstance>,
    ) -> Origin {
        if segment.args.is_some() {
            return Origin::Type {
                ty: raw_of(&segment.resolution).map(|ty| with_annotations(&ty, annotations)),
                generic_declaration: true,
            };
        }
        let ty = if is_last {
            element_ty.as_ref().map(|ty| with_annotations(ty, annotations))
        } else {
            raw_of(&segment.resolution).map(|ty| with_annotations(&ty, annotations))
        };
        Origin::Type {
            ty,
            generic_declaration: false,
        }
    }

    fn wrap_arguments(
        &mut self,
        base: NodeId,
        segment: &TypeSegment,
        is_last: bool,
        element_ty: &Option<Type>,
        annotations: Vec<AnnotationInstance>,
        whole: TextRange,
    ) -> Result<NodeId> {
        let Some(args) = &segment.args else {
            return Ok(base);
        };
        let type_arguments = self.convert_all(args, |this, arg| this.convert_type(arg))?;
        let name_end = end_offset(self.range_of(segment.span));
        let end = self
            .tracker
            .closing_angle(name_end, end_offset(whole))
            .or_else(|| type_arguments.last().map(|arg| end_offset(self.ast.range(*arg))))
            .unwrap_or(name_end);
        let start = offset(self.ast.range(base));
        let diamond = type_arguments.is_empty();
        let node = self.alloc_range(
            ParameterizedType {
                ty: base,
                type_arguments,
            },
            text_range(start, end.max(start)),
        );

        let ty = if is_last {
            element_ty.as_ref().map(|ty| with_annotations(ty, annotations))
        } else {
            let mut arg_types = Vec::with_capacity(args.len());
            for arg in args {
                arg_types.push(self.type_ref(*arg)?.ty.clone());
            }
            match (raw_of(&segment.resolution), arg_types.into_iter().collect::<Option<Vec<_>>>()) {
                (Some(Type::Class(class)), Some(args)) => Some(with_annotations(
                    &Type::class(class.def, args),
                    annotations,
                )),
                _ => None,
            }
        };
        self.record(
            node,
            Origin::Type {
                ty,
                generic_declaration: false,
            },
        );
        self.gate(node, JavaFeature::Generics);
        if diamond {
            self.gate(node, JavaFeature::Diamond);
        }
        Ok(node)
    }

    fn instances(&self, ids: &[AnnotationId]) -> Result<Vec<AnnotationInstance>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.extend(self.annotation(*id)?.resolved.clone());
        }
        Ok(out)
    }

    fn dimension(&mut self, bracket: TextRange, annotations: &[AnnotationId]) -> Result<NodeId> {
        let annotations = self.convert_annotations(annotations, AnnotationOwner::TypeUse)?;
        let range = self.cover_nodes(&annotations, bracket);
        Ok(self.alloc_range(Dimension { annotations }, range))
    }

    /// `[]` pairs written after a declarator name or a method's parameter
    /// list, each with its share of `annotations`. Returns the dimension
    /// nodes and a problem description when the source disagrees with
    /// `count`.
    pub(crate) fn convert_extra_dimensions(
        &mut self,
        after: usize,
        until: usize,
        count: usize,
        annotations: &[AnnotationId],
    ) -> Result<(Vec<NodeId>, Option<String>)> {
        if count == 0 && annotations.is_empty() {
            return Ok((Vec::new(), None));
        }
        let mut ranges = Vec::with_capacity(annotations.len());
        for &annotation in annotations {
            ranges.push(self.range_of(self.annotation(annotation)?.span));
        }
        let mut brackets = self.tracker.extra_dimensions(after, until, &ranges);
        let mut problem = None;
        if brackets.len() != count {
            problem = Some(format!(
                "expected {count} extra dimensions, found {}",
                brackets.len()
            ));
            brackets.truncate(count);
            let at = brackets.last().map_or(after, |range| end_offset(*range));
            while brackets.len() < count {
                brackets.push(text_range(at, at));
            }
        }
        let starts: Vec<usize> = ranges.iter().map(|range| offset(*range)).collect();
        let anchors: Vec<usize> = brackets.iter().map(|range| offset(*range)).collect();
        let distribution = distribute(&starts, &anchors);
        if distribution.malformed && problem.is_none() {
            problem = Some("extra dimension annotations out of place".to_string());
        }
        let mut nodes = Vec::with_capacity(brackets.len());
        for (bracket, slot) in brackets.iter().zip(distribution.slots) {
            let slot: Vec<AnnotationId> = slot.iter().map(|idx| annotations[*idx]).collect();
            nodes.push(self.dimension(*bracket, &slot)?);
        }
        Ok((nodes, problem))
    }
}
