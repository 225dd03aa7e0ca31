//! A Java DOM: one compilation unit converted into an immutable node tree
//! with exact source ranges and lazily resolved bindings.
//!
//! The input is a [`ResolvedUnit`] produced by some front-end: the source
//! text, the HIR of the unit and the symbol table attribution filled in.
//! [`convert`] walks it once and returns a [`Dom`]:
//!
//! - [`ast`]: the node arena. Node ranges are trimmed of trivia and always
//!   nest; nodes built from input that did not validate carry
//!   [`NodeFlags::MALFORMED`].
//! - [`bindings`]: resolved symbols behind nodes, computed on demand and
//!   memoized for the lifetime of the `Dom`.
//! - [`Dom::to_source_string`]: the canonical surface form of a subtree.
//!
//! ```ignore
//! let dom = nova_dom::convert(unit, ConvertOptions::default())?;
//! for node in dom.descendants(dom.root()) {
//!     if let Some(binding) = dom.resolve_binding(node) {
//!         println!("{} -> {}", dom.to_source_string(node), binding.key());
//!     }
//! }
//! ```

pub mod ast;
pub mod bindings;
mod convert;
mod dom;
mod error;
mod options;
mod position;
mod printer;

pub use ast::{Node, NodeFlags, NodeId, NodeKind};
pub use bindings::{
    AnnotationBinding, Binding, BindingKind, MemberValuePairBinding, MethodBinding,
    ModuleBinding, PackageBinding, TypeBinding, VariableBinding,
};
pub use dom::{Dom, Problem};
pub use error::{ConfigError, ConvertError, InvariantViolation};
pub use nova_hir::ResolvedUnit;
pub use options::ConvertOptions;

/// Convert one compilation unit.
///
/// Malformed source never fails the conversion; affected nodes are flagged
/// and reported through [`Dom::problems`]. An error means the input itself
/// is inconsistent (for example an id pointing outside its arena).
///
/// # Panics
///
/// With [`ConvertOptions::check_ranges`] set, if the assembled tree breaks
/// one of its structural invariants.
pub fn convert(input: ResolvedUnit, options: ConvertOptions) -> Result<Dom, ConvertError> {
    let _span = tracing::debug_span!("dom", name = "convert").entered();
    let dom = Dom::build(input, options)?;
    tracing::debug!(
        nodes = dom.ast().len(),
        problems = dom.problems().len(),
        "converted compilation unit"
    );
    if options.check_ranges {
        if let Err(violation) = dom.check_invariants() {
            panic!("converted tree is inconsistent: {violation}");
        }
    }
    Ok(dom)
}
