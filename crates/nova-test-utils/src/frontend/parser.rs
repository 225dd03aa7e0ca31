//! Recursive-descent parser from tokens to an unattributed HIR.
//!
//! Error recovery is coarse: a construct that does not parse is reported,
//! the unit is flagged as recovered and the parser skips ahead one token at
//! a time until something familiar shows up.

use std::collections::HashMap;

use nova_hir::{
    Annotation, AnnotationId, AnnotationKind, AssignOp, BinaryOp, CatchClause, ClassDecl,
    ClassDeclId, CompilationUnit, EnumConstantDecl, Expr, ExprId, ExprKind, FieldDecl, Ident,
    ImportDecl, LambdaBody, LiteralKind, Member, MemberValuePair, MethodDecl, MethodDeclId,
    MethodRefKind, Modifiers, ModuleDecl, ModuleDirective, ModuleDirectiveKind, NameRef,
    NameSegment, PackageDecl, PostfixOp, ReceiverParam, Resolution, Stmt, StmtId, StmtKind,
    SwitchCase, TypeParamDecl, TypeRef, TypeRefId, TypeRefKind, TypeSegment, UnaryOp, VarDecl,
    VarDeclId, WildcardBoundKind,
};
use nova_syntax::{is_keyword, lex, Token, TokenKind};
use nova_types::{ClassKind, ConstValue, Modifiers as Flags, PrimitiveType, Span};

use super::literals;

/// A syntax error. Parsing always produces a unit; errors only describe
/// where the parser had to recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

/// Where a type-use annotation was written inside its type reference, or
/// inside the extra dimensions of a declarator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnnotationSlot {
    /// Before the name segment at this index; index 0 also covers
    /// primitive types and wildcards.
    Segment(usize),
    /// Before the array dimension at this index, leftmost first.
    Dimension(usize),
    Varargs,
}

pub(crate) struct Parsed {
    pub unit: CompilationUnit,
    pub slots: HashMap<AnnotationId, AnnotationSlot>,
    pub errors: Vec<ParseError>,
}

pub(crate) fn parse(source: &str) -> Parsed {
    let mut parser = Parser {
        source,
        tokens: lex(source),
        pos: 0,
        unit: CompilationUnit::new(Span::new(0, source.len())),
        slots: HashMap::new(),
        errors: Vec::new(),
    };
    parser.compilation_unit();
    Parsed {
        unit: parser.unit,
        slots: parser.slots,
        errors: parser.errors,
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    unit: CompilationUnit,
    slots: HashMap<AnnotationId, AnnotationSlot>,
    errors: Vec<ParseError>,
}

const MODIFIER_WORDS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "abstract",
    "final",
    "native",
    "synchronized",
    "transient",
    "volatile",
    "strictfp",
];

impl<'a> Parser<'a> {
    // --- cursor -------------------------------------------------------------

    fn token_at(&self, idx: usize) -> Option<Token> {
        self.tokens.get(idx).copied()
    }

    fn kind_at(&self, idx: usize) -> Option<TokenKind> {
        self.token_at(idx).map(|token| token.kind)
    }

    fn word_at(&self, idx: usize) -> Option<&'a str> {
        self.token_at(idx)
            .filter(|token| token.kind == TokenKind::Ident)
            .map(|token| token.text(self.source))
    }

    fn is_ident_at(&self, idx: usize) -> bool {
        self.word_at(idx).is_some_and(|word| !is_keyword(word))
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.kind_at(self.pos + n)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.nth_kind(0) == Some(kind)
    }

    fn nth_word(&self, n: usize, word: &str) -> bool {
        self.word_at(self.pos + n) == Some(word)
    }

    fn at_word(&self, word: &str) -> bool {
        self.nth_word(0, word)
    }

    fn at_ident(&self) -> bool {
        self.is_ident_at(self.pos)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Tokens `idx` and `idx + 1` touch, as in `>>`.
    fn adjacent(&self, idx: usize) -> bool {
        match (self.token_at(idx), self.token_at(idx + 1)) {
            (Some(a), Some(b)) => a.end() == b.start(),
            _ => false,
        }
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.token_at(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {what}"));
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let offset = self.start();
        self.errors.push(ParseError {
            message: message.into(),
            offset,
        });
        self.unit.recovered = true;
    }

    /// Start of the current token.
    fn start(&self) -> usize {
        self.token_at(self.pos)
            .map_or(self.source.len(), |token| token.start())
    }

    /// End of the last consumed token.
    fn last_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.token_at(prev).map_or(0, |token| token.end()),
            None => 0,
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end().max(start))
    }

    fn ident(&mut self) -> Ident {
        if self.at_ident() {
            if let Some(token) = self.bump() {
                return Ident::new(token.text(self.source), Span::new(token.start(), token.end()));
            }
        }
        self.error("expected an identifier");
        let at = self.start();
        Ident::new("", Span::new(at, at))
    }

    fn primitive_at(&self, idx: usize) -> Option<PrimitiveType> {
        PrimitiveType::from_keyword(self.word_at(idx)?)
    }

    // --- lookahead ----------------------------------------------------------

    /// Index after a run of annotations starting at `idx`.
    fn skip_annotations(&self, mut idx: usize) -> usize {
        while self.kind_at(idx) == Some(TokenKind::At) && self.word_at(idx + 1) != Some("interface") {
            idx += 2;
            while self.kind_at(idx) == Some(TokenKind::Dot) && self.is_ident_at(idx + 1) {
                idx += 2;
            }
            if self.kind_at(idx) == Some(TokenKind::LParen) {
                match self.matching(idx, TokenKind::LParen, TokenKind::RParen) {
                    Some(close) => idx = close + 1,
                    None => return idx,
                }
            }
        }
        idx
    }

    /// Index of the token closing the bracket opened at `idx`.
    fn matching(&self, idx: usize, open: TokenKind, close: TokenKind) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[idx..].iter().enumerate() {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + offset);
                }
            }
        }
        None
    }

    /// Index after a type starting at `idx`, without building anything.
    fn skip_type(&self, idx: usize) -> Option<usize> {
        let mut idx = self.skip_annotations(idx);
        if self.primitive_at(idx).is_some() || self.word_at(idx) == Some("void") {
            idx += 1;
        } else if self.is_ident_at(idx) {
            loop {
                idx += 1;
                if self.kind_at(idx) == Some(TokenKind::Lt) {
                    idx = self.skip_type_arguments(idx)?;
                }
                if self.kind_at(idx) == Some(TokenKind::Dot) {
                    let next = self.skip_annotations(idx + 1);
                    if self.is_ident_at(next) {
                        idx = next;
                        continue;
                    }
                }
                break;
            }
        } else {
            return None;
        }
        loop {
            let next = self.skip_annotations(idx);
            if self.kind_at(next) == Some(TokenKind::LBracket)
                && self.kind_at(next + 1) == Some(TokenKind::RBracket)
            {
                idx = next + 2;
            } else {
                break;
            }
        }
        Some(idx)
    }

    fn skip_type_arguments(&self, mut idx: usize) -> Option<usize> {
        idx += 1;
        if self.kind_at(idx) == Some(TokenKind::Gt) {
            return Some(idx + 1);
        }
        loop {
            let next = self.skip_annotations(idx);
            if self.kind_at(next) == Some(TokenKind::Question) {
                idx = next + 1;
                if matches!(self.word_at(idx), Some("extends" | "super")) {
                    idx = self.skip_type(idx + 1)?;
                }
            } else {
                idx = self.skip_type(idx)?;
            }
            match self.kind_at(idx)? {
                TokenKind::Comma => idx += 1,
                TokenKind::Gt => return Some(idx + 1),
                _ => return None,
            }
        }
    }

    /// Index after modifier keywords and annotations starting at `idx`.
    fn skip_modifiers(&self, mut idx: usize) -> usize {
        loop {
            let next = self.skip_annotations(idx);
            if next != idx {
                idx = next;
            } else if self.word_at(idx).is_some_and(|word| MODIFIER_WORDS.contains(&word)) {
                idx += 1;
            } else {
                return idx;
            }
        }
    }

    fn at_type_declaration(&self, idx: usize) -> bool {
        match self.word_at(idx) {
            Some("class" | "interface" | "enum") => true,
            Some("record") => {
                self.is_ident_at(idx + 1)
                    && matches!(self.kind_at(idx + 2), Some(TokenKind::LParen | TokenKind::Lt))
            }
            _ => {
                self.kind_at(idx) == Some(TokenKind::At) && self.word_at(idx + 1) == Some("interface")
            }
        }
    }

    fn at_local_class(&self) -> bool {
        self.at_type_declaration(self.skip_modifiers(self.pos))
    }

    fn at_local_var_decl(&self) -> bool {
        let idx = self.skip_modifiers(self.pos);
        if self.word_at(idx) == Some("var") && self.is_ident_at(idx + 1) {
            return true;
        }
        let Some(end) = self.skip_type(idx) else {
            return false;
        };
        self.is_ident_at(end)
            && matches!(
                self.kind_at(end + 1),
                Some(
                    TokenKind::Eq
                        | TokenKind::Semi
                        | TokenKind::Comma
                        | TokenKind::LBracket
                        | TokenKind::Colon
                        | TokenKind::RParen
                )
            )
    }

    fn at_lambda(&self) -> bool {
        if self.at_ident() && self.nth_kind(1) == Some(TokenKind::Arrow) {
            return true;
        }
        if self.at(TokenKind::LParen) {
            if let Some(close) = self.matching(self.pos, TokenKind::LParen, TokenKind::RParen) {
                return self.kind_at(close + 1) == Some(TokenKind::Arrow);
            }
        }
        false
    }

    fn at_cast(&self) -> bool {
        let first = self.pos + 1;
        if self.primitive_at(self.skip_annotations(first)).is_some() {
            return self
                .skip_type(first)
                .is_some_and(|end| self.kind_at(end) == Some(TokenKind::RParen));
        }
        let Some(mut end) = self.skip_type(first) else {
            return false;
        };
        while self.kind_at(end) == Some(TokenKind::Amp) {
            let Some(next) = self.skip_type(end + 1) else {
                return false;
            };
            end = next;
        }
        if self.kind_at(end) != Some(TokenKind::RParen) {
            return false;
        }
        match self.token_at(end + 1) {
            Some(token) => match token.kind {
                TokenKind::Ident => token.text(self.source) != "instanceof",
                TokenKind::LParen | TokenKind::Bang | TokenKind::Tilde => true,
                kind => kind.is_literal(),
            },
            None => false,
        }
    }

    // --- allocation ---------------------------------------------------------

    fn alloc_expr(&mut self, kind: ExprKind, start: usize) -> ExprId {
        let span = self.span_from(start);
        self.unit.exprs.alloc(Expr {
            kind,
            span,
            ty: None,
            recovered: false,
        })
    }

    fn error_expr(&mut self, message: &str) -> ExprId {
        self.error(message);
        let at = self.start();
        self.unit.exprs.alloc(Expr {
            kind: ExprKind::Error,
            span: Span::new(at, at),
            ty: None,
            recovered: true,
        })
    }

    fn alloc_stmt(&mut self, kind: StmtKind, start: usize) -> StmtId {
        let span = self.span_from(start);
        self.unit.stmts.alloc(Stmt {
            kind,
            span,
            recovered: false,
        })
    }

    fn alloc_var(
        &mut self,
        modifiers: Option<Modifiers>,
        ty: Option<TypeRefId>,
        name: Ident,
        start: usize,
    ) -> VarDeclId {
        let span = self.span_from(start);
        self.unit.vars.alloc(VarDecl {
            modifiers,
            ty,
            name,
            extra_dims: 0,
            extra_dim_annotations: Vec::new(),
            initializer: None,
            span,
            symbol: None,
            recovered: false,
        })
    }

    // --- compilation unit ---------------------------------------------------

    fn compilation_unit(&mut self) {
        let mut modifiers = self.modifiers();
        if self.at_word("package") {
            let start = modifiers.span.map_or(self.start(), |span| span.start);
            self.bump();
            let name = self.qualified_name();
            self.expect(TokenKind::Semi, "`;` after the package name");
            self.unit.package = Some(PackageDecl {
                annotations: std::mem::take(&mut modifiers.annotations),
                name,
                span: self.span_from(start),
                symbol: None,
            });
            modifiers = self.modifiers();
        }
        while self.at_word("import") {
            if !modifiers.is_empty() {
                self.error("modifiers on an import declaration");
            }
            self.import();
            modifiers = self.modifiers();
        }
        if self.at_word("module") || (self.at_word("open") && self.nth_word(1, "module")) {
            self.module(modifiers);
            modifiers = self.modifiers();
        }

        let mut pending = Some(modifiers);
        loop {
            let modifiers = match pending.take() {
                Some(modifiers) => modifiers,
                None => self.modifiers(),
            };
            if self.at_eof() {
                if !modifiers.is_empty() {
                    self.error("modifiers without a declaration");
                }
                break;
            }
            if modifiers.is_empty() && self.eat(TokenKind::Semi) {
                continue;
            }
            let before = self.pos;
            if self.at_type_declaration(self.pos) {
                let class = self.type_declaration(modifiers);
                self.unit.types.push(class);
            }
            if self.pos == before {
                self.error("expected a type declaration");
                self.bump();
            }
        }
    }

    fn import(&mut self) {
        let start = self.start();
        self.bump();
        let is_static = self.eat_word("static");
        let name = self.qualified_name();
        let is_star = self.at(TokenKind::Dot) && self.nth_kind(1) == Some(TokenKind::Star);
        if is_star {
            self.pos += 2;
        }
        self.expect(TokenKind::Semi, "`;` after an import");
        let span = self.span_from(start);
        self.unit.imports.push(ImportDecl {
            name,
            is_static,
            is_star,
            span,
        });
    }

    fn module(&mut self, modifiers: Modifiers) {
        let start = modifiers.span.map_or(self.start(), |span| span.start);
        if modifiers.flags != Flags::empty() {
            self.error("modifiers on a module declaration");
        }
        let open = self.eat_word("open");
        self.bump();
        let name = self.qualified_name();
        let mut directives = Vec::new();
        if self.expect(TokenKind::LBrace, "`{` after the module name") {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let before = self.pos;
                if let Some(directive) = self.module_directive() {
                    directives.push(directive);
                }
                if self.pos == before {
                    self.error("expected a module directive");
                    self.bump();
                }
            }
            self.expect(TokenKind::RBrace, "`}` closing the module");
        }
        self.unit.module = Some(ModuleDecl {
            annotations: modifiers.annotations,
            open,
            name,
            directives,
            span: self.span_from(start),
            symbol: None,
        });
    }

    fn module_directive(&mut self) -> Option<ModuleDirective> {
        let start = self.start();
        let word = self.word_at(self.pos)?;
        let kind = match word {
            "requires" => {
                self.bump();
                let mut modifiers = Vec::new();
                while matches!(self.word_at(self.pos), Some("transitive" | "static"))
                    && self.is_ident_at(self.pos + 1)
                {
                    let token = self.bump()?;
                    modifiers.push(Ident::new(
                        token.text(self.source),
                        Span::new(token.start(), token.end()),
                    ));
                }
                ModuleDirectiveKind::Requires {
                    modifiers,
                    module: self.qualified_name(),
                }
            }
            "exports" | "opens" => {
                self.bump();
                let package = self.qualified_name();
                let mut to = Vec::new();
                if self.eat_word("to") {
                    to.push(self.qualified_name());
                    while self.eat(TokenKind::Comma) {
                        to.push(self.qualified_name());
                    }
                }
                if word == "exports" {
                    ModuleDirectiveKind::Exports { package, to }
                } else {
                    ModuleDirectiveKind::Opens { package, to }
                }
            }
            "uses" => {
                self.bump();
                ModuleDirectiveKind::Uses {
                    service: self.qualified_name(),
                }
            }
            "provides" => {
                self.bump();
                let service = self.qualified_name();
                let mut with = Vec::new();
                if self.eat_word("with") {
                    with.push(self.qualified_name());
                    while self.eat(TokenKind::Comma) {
                        with.push(self.qualified_name());
                    }
                }
                ModuleDirectiveKind::Provides { service, with }
            }
            _ => return None,
        };
        self.expect(TokenKind::Semi, "`;` after a module directive");
        Some(ModuleDirective {
            kind,
            span: self.span_from(start),
        })
    }

    /// `a.b.c`; stops before a `.` that is not followed by an identifier.
    fn qualified_name(&mut self) -> NameRef {
        let start = self.start();
        let mut segments = vec![self.name_segment()];
        while self.at(TokenKind::Dot) && self.is_ident_at(self.pos + 1) {
            self.bump();
            segments.push(self.name_segment());
        }
        NameRef {
            segments,
            span: self.span_from(start),
        }
    }

    fn name_segment(&mut self) -> NameSegment {
        let ident = self.ident();
        NameSegment {
            name: ident.name,
            span: ident.span,
            resolution: Resolution::Unresolved,
        }
    }

    // --- modifiers and annotations ----------------------------------------

    fn modifiers(&mut self) -> Modifiers {
        let start = self.start();
        let first = self.pos;
        let mut out = Modifiers::default();
        loop {
            if self.at(TokenKind::At) && !self.nth_word(1, "interface") {
                let annotation = self.annotation();
                out.annotations.push(annotation);
                continue;
            }
            if let Some(flag) = self.modifier_keyword() {
                out.flags |= flag;
                continue;
            }
            break;
        }
        if self.pos > first {
            out.span = Some(self.span_from(start));
        }
        out
    }

    fn modifier_keyword(&mut self) -> Option<Flags> {
        let word = self.word_at(self.pos)?;
        if word == "non"
            && self.nth_kind(1) == Some(TokenKind::Minus)
            && self.nth_word(2, "sealed")
            && self.adjacent(self.pos)
            && self.adjacent(self.pos + 1)
        {
            self.pos += 3;
            return Some(Flags::NON_SEALED);
        }
        let flag = match word {
            // Contextual: only a modifier in front of another declaration token.
            "sealed" | "default" => {
                let next = self.pos + 1;
                if !(self.kind_at(next) == Some(TokenKind::Ident)
                    || self.kind_at(next) == Some(TokenKind::At)
                    || self.kind_at(next) == Some(TokenKind::Lt))
                {
                    return None;
                }
                Flags::from_keyword(word)?
            }
            _ if MODIFIER_WORDS.contains(&word) => Flags::from_keyword(word)?,
            _ => return None,
        };
        self.pos += 1;
        Some(flag)
    }

    fn annotation(&mut self) -> AnnotationId {
        let start = self.start();
        self.bump();
        let name = self.qualified_name();
        let kind = if self.eat(TokenKind::LParen) {
            let kind = if self.at(TokenKind::RParen) {
                AnnotationKind::Normal(Vec::new())
            } else if self.at_ident() && self.nth_kind(1) == Some(TokenKind::Eq) {
                let mut pairs = Vec::new();
                loop {
                    let pair_start = self.start();
                    let name = self.ident();
                    self.expect(TokenKind::Eq, "`=` in a member value pair");
                    let value = self.element_value();
                    pairs.push(MemberValuePair {
                        name,
                        value,
                        span: self.span_from(pair_start),
                        method: None,
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                AnnotationKind::Normal(pairs)
            } else {
                AnnotationKind::SingleMember(self.element_value())
            };
            self.expect(TokenKind::RParen, "`)` closing the annotation");
            kind
        } else {
            AnnotationKind::Marker
        };
        let span = self.span_from(start);
        self.unit.annotations.alloc(Annotation {
            name,
            kind,
            span,
            resolved: None,
            recovered: false,
        })
    }

    fn element_value(&mut self) -> ExprId {
        let start = self.start();
        if self.at(TokenKind::At) {
            let annotation = self.annotation();
            return self.alloc_expr(ExprKind::Annotation(annotation), start);
        }
        if self.at(TokenKind::LBrace) {
            self.bump();
            let mut values = Vec::new();
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                values.push(self.element_value());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "`}` closing the element values");
            return self.alloc_expr(ExprKind::ArrayInit(values), start);
        }
        self.ternary()
    }

    fn type_annotations(&mut self, into: &mut Vec<AnnotationId>, slot: AnnotationSlot) {
        while self.at(TokenKind::At) && !self.nth_word(1, "interface") {
            let annotation = self.annotation();
            self.slots.insert(annotation, slot);
            into.push(annotation);
        }
    }

    // --- types --------------------------------------------------------------

    /// A type. With `allow_var`, a leading `var` is the inferred type.
    fn type_ref(&mut self, allow_var: bool) -> TypeRefId {
        let start = self.start();
        let mut annotations = Vec::new();
        self.type_annotations(&mut annotations, AnnotationSlot::Segment(0));
        let kind = if let Some(primitive) = self.primitive_at(self.pos) {
            self.bump();
            TypeRefKind::Primitive(primitive)
        } else if self.at_word("void") {
            self.bump();
            TypeRefKind::Void
        } else if allow_var && self.at_word("var") && self.nth_kind(1) != Some(TokenKind::Dot) {
            self.bump();
            TypeRefKind::Var
        } else if self.at_ident() {
            TypeRefKind::Named(self.type_segments(&mut annotations))
        } else {
            self.error("expected a type");
            let mut missing = TypeRef::missing(Span::new(start, start));
            missing.annotations = annotations;
            return self.unit.type_refs.alloc(missing);
        };
        let dims = self.dims(&mut annotations);
        let span = self.span_from(start);
        self.unit.type_refs.alloc(TypeRef {
            kind,
            annotations,
            dims,
            varargs: false,
            span,
            ty: None,
            recovered: false,
        })
    }

    fn type_segments(&mut self, annotations: &mut Vec<AnnotationId>) -> Vec<TypeSegment> {
        let mut segments = Vec::new();
        loop {
            let name = self.ident();
            let args = if self.at(TokenKind::Lt) {
                Some(self.type_arguments())
            } else {
                None
            };
            segments.push(TypeSegment {
                name: name.name,
                span: name.span,
                args,
                resolution: Resolution::Unresolved,
            });
            if self.at(TokenKind::Dot) {
                let next = self.skip_annotations(self.pos + 1);
                if self.is_ident_at(next) {
                    self.bump();
                    self.type_annotations(annotations, AnnotationSlot::Segment(segments.len()));
                    continue;
                }
            }
            return segments;
        }
    }

    fn type_arguments(&mut self) -> Vec<TypeRefId> {
        self.bump();
        let mut args = Vec::new();
        if self.eat(TokenKind::Gt) {
            return args;
        }
        loop {
            let after = self.skip_annotations(self.pos);
            if self.kind_at(after) == Some(TokenKind::Question) {
                args.push(self.wildcard());
            } else {
                args.push(self.type_ref(false));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>` closing the type arguments");
        args
    }

    fn wildcard(&mut self) -> TypeRefId {
        let start = self.start();
        let mut annotations = Vec::new();
        self.type_annotations(&mut annotations, AnnotationSlot::Segment(0));
        self.bump();
        let bound = if self.eat_word("extends") {
            Some((WildcardBoundKind::Extends, self.type_ref(false)))
        } else if self.eat_word("super") {
            Some((WildcardBoundKind::Super, self.type_ref(false)))
        } else {
            None
        };
        let span = self.span_from(start);
        self.unit.type_refs.alloc(TypeRef {
            kind: TypeRefKind::Wildcard(bound),
            annotations,
            dims: 0,
            varargs: false,
            span,
            ty: None,
            recovered: false,
        })
    }

    /// `[]` pairs, each optionally preceded by annotations.
    fn dims(&mut self, annotations: &mut Vec<AnnotationId>) -> usize {
        let mut dims = 0;
        loop {
            let after = self.skip_annotations(self.pos);
            if self.kind_at(after) != Some(TokenKind::LBracket)
                || self.kind_at(after + 1) != Some(TokenKind::RBracket)
            {
                return dims;
            }
            self.type_annotations(annotations, AnnotationSlot::Dimension(dims));
            self.pos += 2;
            dims += 1;
        }
    }

    /// Extra dimensions after a declarator or method name.
    fn extra_dims(&mut self) -> (usize, Vec<AnnotationId>) {
        let mut annotations = Vec::new();
        let dims = self.dims(&mut annotations);
        (dims, annotations)
    }

    /// Turn `ty` into a variable arity type when `...` follows.
    fn varargs(&mut self, ty: TypeRefId) {
        let after = self.skip_annotations(self.pos);
        if self.kind_at(after) != Some(TokenKind::Ellipsis) {
            return;
        }
        let mut annotations = Vec::new();
        self.type_annotations(&mut annotations, AnnotationSlot::Varargs);
        self.bump();
        let end = self.last_end();
        if let Some(type_ref) = self.unit.type_refs.get_mut(ty) {
            type_ref.annotations.extend(annotations);
            type_ref.varargs = true;
            type_ref.span = Span::new(type_ref.span.start, end);
        }
    }

    fn type_list(&mut self) -> Vec<TypeRefId> {
        let mut types = vec![self.type_ref(false)];
        while self.eat(TokenKind::Comma) {
            types.push(self.type_ref(false));
        }
        types
    }

    fn type_parameters(&mut self) -> Vec<TypeParamDecl> {
        self.bump();
        let mut params = Vec::new();
        loop {
            let start = self.start();
            let mut annotations = Vec::new();
            while self.at(TokenKind::At) {
                annotations.push(self.annotation());
            }
            let name = self.ident();
            let mut bounds = Vec::new();
            if self.eat_word("extends") {
                bounds.push(self.type_ref(false));
                while self.eat(TokenKind::Amp) {
                    bounds.push(self.type_ref(false));
                }
            }
            params.push(TypeParamDecl {
                annotations,
                name,
                bounds,
                span: self.span_from(start),
                symbol: None,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>` closing the type parameters");
        params
    }

    // --- declarations -------------------------------------------------------

    /// Parses the declaration at the cursor, which must satisfy
    /// `at_type_declaration`.
    fn type_declaration(&mut self, modifiers: Modifiers) -> ClassDeclId {
        let start = modifiers.span.map_or(self.start(), |span| span.start);
        let kind = match self.word_at(self.pos) {
            Some("class") => ClassKind::Class,
            Some("interface") => ClassKind::Interface,
            Some("enum") => ClassKind::Enum,
            Some("record") => ClassKind::Record,
            _ => {
                self.bump();
                ClassKind::Annotation
            }
        };
        self.bump();
        let name = self.ident();
        let type_params = if self.at(TokenKind::Lt) {
            self.type_parameters()
        } else {
            Vec::new()
        };
        let record_components = if kind == ClassKind::Record && self.at(TokenKind::LParen) {
            self.formal_parameters().1
        } else {
            Vec::new()
        };
        let extends = if self.eat_word("extends") {
            self.type_list()
        } else {
            Vec::new()
        };
        let implements = if self.eat_word("implements") {
            self.type_list()
        } else {
            Vec::new()
        };
        let permits = if self.eat_word("permits") {
            self.type_list()
        } else {
            Vec::new()
        };
        let class_name = name.as_str().to_string();
        let (members, enum_constants, body_span) = self.class_body(kind, &class_name);
        let span = self.span_from(start);
        self.unit.classes.alloc(ClassDecl {
            kind,
            modifiers,
            name,
            type_params,
            extends,
            implements,
            permits,
            record_components,
            enum_constants,
            members,
            span,
            body_span,
            is_anonymous: false,
            symbol: None,
            recovered: false,
        })
    }

    fn anonymous_class(&mut self) -> ClassDeclId {
        let start = self.start();
        let (members, _, body_span) = self.class_body(ClassKind::Class, "");
        self.unit.classes.alloc(ClassDecl {
            kind: ClassKind::Class,
            modifiers: Modifiers::default(),
            name: Ident::new("", Span::new(start, start)),
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            permits: Vec::new(),
            record_components: Vec::new(),
            enum_constants: Vec::new(),
            members,
            span: body_span,
            body_span,
            is_anonymous: true,
            symbol: None,
            recovered: false,
        })
    }

    fn class_body(
        &mut self,
        kind: ClassKind,
        class_name: &str,
    ) -> (Vec<Member>, Vec<EnumConstantDecl>, Span) {
        let start = self.start();
        if !self.expect(TokenKind::LBrace, "`{` opening the class body") {
            return (Vec::new(), Vec::new(), Span::new(start, start));
        }
        let constants = if kind == ClassKind::Enum {
            self.enum_constants()
        } else {
            Vec::new()
        };
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let before = self.pos;
            if let Some(member) = self.member(kind, class_name) {
                members.push(member);
            }
            if self.pos == before {
                self.error("unexpected token in a class body");
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "`}` closing the class body");
        (members, constants, self.span_from(start))
    }

    fn enum_constants(&mut self) -> Vec<EnumConstantDecl> {
        let mut constants = Vec::new();
        loop {
            if self.eat(TokenKind::Semi) || self.at(TokenKind::RBrace) {
                break;
            }
            let start = self.start();
            let after_annotations = self.skip_annotations(self.pos);
            if !self.is_ident_at(after_annotations) {
                break;
            }
            let modifiers = self.modifiers();
            let name = self.ident();
            let args = if self.at(TokenKind::LParen) {
                Some(self.arguments())
            } else {
                None
            };
            let body = if self.at(TokenKind::LBrace) {
                Some(self.anonymous_class())
            } else {
                None
            };
            constants.push(EnumConstantDecl {
                modifiers,
                name,
                args,
                body,
                span: self.span_from(start),
                symbol: None,
                ctor: None,
            });
            if !self.eat(TokenKind::Comma) {
                self.eat(TokenKind::Semi);
                break;
            }
        }
        constants
    }

    fn member(&mut self, kind: ClassKind, class_name: &str) -> Option<Member> {
        let start = self.start();
        if self.at(TokenKind::LBrace) {
            let body = self.block();
            return Some(Member::Initializer {
                is_static: false,
                modifiers: Modifiers::default(),
                body,
                span: self.span_from(start),
            });
        }
        if self.at_word("static") && self.nth_kind(1) == Some(TokenKind::LBrace) {
            self.bump();
            let modifiers = Modifiers {
                flags: Flags::STATIC,
                annotations: Vec::new(),
                span: Some(self.span_from(start)),
            };
            let body = self.block();
            return Some(Member::Initializer {
                is_static: true,
                modifiers,
                body,
                span: self.span_from(start),
            });
        }

        let modifiers = self.modifiers();
        let start = modifiers.span.map_or(self.start(), |span| span.start);
        if self.at_type_declaration(self.pos) {
            return Some(Member::Class(self.type_declaration(modifiers)));
        }
        let type_params = if self.at(TokenKind::Lt) {
            self.type_parameters()
        } else {
            Vec::new()
        };
        if self.at_ident() && self.nth_kind(1) == Some(TokenKind::LParen) {
            let name = self.ident();
            let method = self.method_rest(start, modifiers, type_params, None, name, false);
            return Some(Member::Method(method));
        }
        if kind == ClassKind::Record
            && self.word_at(self.pos) == Some(class_name)
            && self.nth_kind(1) == Some(TokenKind::LBrace)
        {
            let name = self.ident();
            let method = self.method_rest(start, modifiers, type_params, None, name, true);
            return Some(Member::Method(method));
        }
        if self.at(TokenKind::RBrace) || self.at_eof() {
            if !modifiers.is_empty() {
                self.error("modifiers without a member");
            }
            return None;
        }

        let ty = self.type_ref(false);
        let name = self.ident();
        if self.at(TokenKind::LParen) {
            let method = self.method_rest(start, modifiers, type_params, Some(ty), name, false);
            return Some(Member::Method(method));
        }
        let declarators = self.declarators(name);
        self.expect(TokenKind::Semi, "`;` after a field declaration");
        let field = self.unit.fields.alloc(FieldDecl {
            modifiers,
            ty,
            declarators,
            span: self.span_from(start),
            recovered: false,
        });
        Some(Member::Field(field))
    }

    fn method_rest(
        &mut self,
        start: usize,
        modifiers: Modifiers,
        type_params: Vec<TypeParamDecl>,
        return_type: Option<TypeRefId>,
        name: Ident,
        is_compact_ctor: bool,
    ) -> MethodDeclId {
        let (receiver, params) = if is_compact_ctor {
            (None, Vec::new())
        } else {
            self.formal_parameters()
        };
        let (extra_dims, extra_dim_annotations) = self.extra_dims();
        let throws = if self.eat_word("throws") {
            self.type_list()
        } else {
            Vec::new()
        };
        let default_value = if self.eat_word("default") {
            Some(self.element_value())
        } else {
            None
        };
        let body = if self.at(TokenKind::LBrace) {
            Some(self.block())
        } else {
            self.expect(TokenKind::Semi, "`;` or a method body");
            None
        };
        let span = self.span_from(start);
        self.unit.methods.alloc(MethodDecl {
            modifiers,
            type_params,
            is_constructor: return_type.is_none(),
            return_type,
            name,
            receiver,
            params,
            extra_dims,
            extra_dim_annotations,
            throws,
            body,
            default_value,
            is_compact_ctor,
            span,
            symbol: None,
            recovered: false,
        })
    }

    fn formal_parameters(&mut self) -> (Option<ReceiverParam>, Vec<VarDeclId>) {
        let mut receiver = None;
        let mut params = Vec::new();
        if !self.expect(TokenKind::LParen, "`(` opening the parameters") {
            return (receiver, params);
        }
        if self.eat(TokenKind::RParen) {
            return (receiver, params);
        }
        loop {
            let start = self.start();
            let modifiers = self.modifiers();
            let ty = self.type_ref(false);
            self.varargs(ty);

            let mut qualifier_len = 0;
            while self.is_ident_at(self.pos + qualifier_len)
                && self.kind_at(self.pos + qualifier_len + 1) == Some(TokenKind::Dot)
            {
                qualifier_len += 2;
            }
            if self.word_at(self.pos + qualifier_len) == Some("this") {
                let qualifier = if qualifier_len > 0 {
                    Some(self.qualified_name())
                } else {
                    None
                };
                if qualifier.is_some() {
                    self.expect(TokenKind::Dot, "`.` before `this`");
                }
                self.bump();
                receiver = Some(ReceiverParam {
                    ty,
                    qualifier,
                    span: self.span_from(start),
                });
            } else {
                let name = self.ident();
                let (extra_dims, extra_dim_annotations) = self.extra_dims();
                let var = self.alloc_var(Some(modifiers), Some(ty), name, start);
                if let Some(decl) = self.unit.vars.get_mut(var) {
                    decl.extra_dims = extra_dims;
                    decl.extra_dim_annotations = extra_dim_annotations;
                }
                params.push(var);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` closing the parameters");
        (receiver, params)
    }

    fn declarators(&mut self, first: Ident) -> Vec<VarDeclId> {
        let mut declarators = vec![self.declarator(first)];
        while self.eat(TokenKind::Comma) {
            let name = self.ident();
            declarators.push(self.declarator(name));
        }
        declarators
    }

    fn declarator(&mut self, name: Ident) -> VarDeclId {
        let start = name.span.start;
        let (extra_dims, extra_dim_annotations) = self.extra_dims();
        let initializer = if self.eat(TokenKind::Eq) {
            Some(self.variable_initializer())
        } else {
            None
        };
        let span = self.span_from(start);
        self.unit.vars.alloc(VarDecl {
            modifiers: None,
            ty: None,
            name,
            extra_dims,
            extra_dim_annotations,
            initializer,
            span,
            symbol: None,
            recovered: false,
        })
    }

    fn variable_initializer(&mut self) -> ExprId {
        if self.at(TokenKind::LBrace) {
            self.array_initializer()
        } else {
            self.expression()
        }
    }

    fn array_initializer(&mut self) -> ExprId {
        let start = self.start();
        self.bump();
        let mut values = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            values.push(self.variable_initializer());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}` closing the array initializer");
        self.alloc_expr(ExprKind::ArrayInit(values), start)
    }

    // --- statements ---------------------------------------------------------

    fn block(&mut self) -> StmtId {
        let start = self.start();
        let mut stmts = Vec::new();
        if self.expect(TokenKind::LBrace, "`{`") {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let before = self.pos;
                stmts.push(self.block_statement());
                if self.pos == before {
                    self.bump();
                }
            }
            self.expect(TokenKind::RBrace, "`}` closing the block");
        }
        self.alloc_stmt(StmtKind::Block(stmts), start)
    }

    fn block_statement(&mut self) -> StmtId {
        let start = self.start();
        if self.at_local_class() {
            let modifiers = self.modifiers();
            let class = self.type_declaration(modifiers);
            return self.alloc_stmt(StmtKind::LocalClass(class), start);
        }
        if self.at_local_var_decl() {
            let modifiers = self.modifiers();
            let ty = self.type_ref(true);
            let name = self.ident();
            let declarators = self.declarators(name);
            self.expect(TokenKind::Semi, "`;` after a local variable declaration");
            return self.alloc_stmt(
                StmtKind::LocalVar {
                    modifiers,
                    ty,
                    declarators,
                },
                start,
            );
        }
        self.statement()
    }

    fn statement(&mut self) -> StmtId {
        let start = self.start();
        if self.at(TokenKind::LBrace) {
            return self.block();
        }
        if self.eat(TokenKind::Semi) {
            return self.alloc_stmt(StmtKind::Empty, start);
        }
        let kind = match self.word_at(self.pos) {
            Some("if") => {
                self.bump();
                let cond = self.paren_expression();
                let then_branch = self.statement();
                let else_branch = if self.eat_word("else") {
                    Some(self.statement())
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            Some("while") => {
                self.bump();
                let cond = self.paren_expression();
                let body = self.statement();
                StmtKind::While { cond, body }
            }
            Some("do") => {
                self.bump();
                let body = self.statement();
                if !self.eat_word("while") {
                    self.error("expected `while` after a `do` body");
                }
                let cond = self.paren_expression();
                self.expect(TokenKind::Semi, "`;` after `do ... while`");
                StmtKind::Do { body, cond }
            }
            Some("for") => self.for_statement(),
            Some("try") => self.try_statement(),
            Some("switch") => self.switch_statement(),
            Some("return") => {
                self.bump();
                let value = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.expression())
                };
                self.expect(TokenKind::Semi, "`;` after `return`");
                StmtKind::Return(value)
            }
            Some("throw") => {
                self.bump();
                let value = self.expression();
                self.expect(TokenKind::Semi, "`;` after `throw`");
                StmtKind::Throw(value)
            }
            Some(word @ ("break" | "continue")) => {
                self.bump();
                let label = if self.at_ident() {
                    Some(self.ident())
                } else {
                    None
                };
                self.expect(TokenKind::Semi, "`;` after a jump");
                if word == "break" {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            Some("synchronized") => {
                self.bump();
                let lock = self.paren_expression();
                let body = self.block();
                StmtKind::Synchronized { lock, body }
            }
            Some("assert") => {
                self.bump();
                let cond = self.expression();
                let message = if self.eat(TokenKind::Colon) {
                    Some(self.expression())
                } else {
                    None
                };
                self.expect(TokenKind::Semi, "`;` after `assert`");
                StmtKind::Assert { cond, message }
            }
            Some(word @ ("this" | "super")) if self.nth_kind(1) == Some(TokenKind::LParen) => {
                self.bump();
                let args = self.arguments();
                self.expect(TokenKind::Semi, "`;` after a constructor call");
                StmtKind::ConstructorCall {
                    is_super: word == "super",
                    qualifier: None,
                    type_args: Vec::new(),
                    args,
                    ctor: None,
                }
            }
            Some(_) if self.at_ident() && self.nth_kind(1) == Some(TokenKind::Colon) => {
                let label = self.ident();
                self.bump();
                let body = self.statement();
                StmtKind::Labeled { label, body }
            }
            _ => {
                let before = self.pos;
                let expr = self.expression();
                if self.pos == before {
                    let stmt = self.alloc_stmt(StmtKind::Error, start);
                    if let Some(stmt) = self.unit.stmts.get_mut(stmt) {
                        stmt.recovered = true;
                    }
                    return stmt;
                }
                self.expect(TokenKind::Semi, "`;` after an expression statement");
                StmtKind::Expr(expr)
            }
        };
        self.alloc_stmt(kind, start)
    }

    fn paren_expression(&mut self) -> ExprId {
        self.expect(TokenKind::LParen, "`(`");
        let expr = self.expression();
        self.expect(TokenKind::RParen, "`)`");
        expr
    }

    fn for_statement(&mut self) -> StmtKind {
        self.bump();
        self.expect(TokenKind::LParen, "`(` after `for`");
        let mut init = Vec::new();
        if self.at_local_var_decl() {
            let start = self.start();
            let modifiers = self.modifiers();
            let ty = self.type_ref(true);
            let name = self.ident();
            if self.eat(TokenKind::Colon) {
                let end = name.span.end;
                let param = self.unit.vars.alloc(VarDecl {
                    modifiers: Some(modifiers),
                    ty: Some(ty),
                    name,
                    extra_dims: 0,
                    extra_dim_annotations: Vec::new(),
                    initializer: None,
                    span: Span::new(start, end),
                    symbol: None,
                    recovered: false,
                });
                let iterable = self.expression();
                self.expect(TokenKind::RParen, "`)` closing the `for` header");
                let body = self.statement();
                return StmtKind::ForEach {
                    param,
                    iterable,
                    body,
                };
            }
            let declarators = self.declarators(name);
            init.push(self.alloc_expr(
                ExprKind::VarDeclExpr {
                    modifiers,
                    ty,
                    declarators,
                },
                start,
            ));
        } else if !self.at(TokenKind::Semi) {
            init = self.expression_list();
        }
        self.expect(TokenKind::Semi, "`;` in the `for` header");
        let cond = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.expression())
        };
        self.expect(TokenKind::Semi, "`;` in the `for` header");
        let update = if self.at(TokenKind::RParen) {
            Vec::new()
        } else {
            self.expression_list()
        };
        self.expect(TokenKind::RParen, "`)` closing the `for` header");
        let body = self.statement();
        StmtKind::For {
            init,
            cond,
            update,
            body,
        }
    }

    fn expression_list(&mut self) -> Vec<ExprId> {
        let mut exprs = vec![self.expression()];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.expression());
        }
        exprs
    }

    fn try_statement(&mut self) -> StmtKind {
        self.bump();
        let mut resources = Vec::new();
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                let start = self.start();
                if self.at_local_var_decl() {
                    let modifiers = self.modifiers();
                    let ty = self.type_ref(true);
                    let name = self.ident();
                    let declarator = self.declarator(name);
                    resources.push(self.alloc_expr(
                        ExprKind::VarDeclExpr {
                            modifiers,
                            ty,
                            declarators: vec![declarator],
                        },
                        start,
                    ));
                } else {
                    resources.push(self.expression());
                }
                if !self.eat(TokenKind::Semi) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "`)` closing the resources");
        }
        let body = self.block();
        let mut catches = Vec::new();
        while self.at_word("catch") {
            let start = self.start();
            self.bump();
            self.expect(TokenKind::LParen, "`(` after `catch`");
            let param_start = self.start();
            let modifiers = self.modifiers();
            let ty = self.catch_type();
            let name = self.ident();
            let param = self.alloc_var(Some(modifiers), Some(ty), name, param_start);
            self.expect(TokenKind::RParen, "`)` closing the catch parameter");
            let body = self.block();
            catches.push(CatchClause {
                param,
                body,
                span: self.span_from(start),
            });
        }
        let finally = if self.eat_word("finally") {
            Some(self.block())
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            self.error("`try` without `catch` or `finally`");
        }
        StmtKind::Try {
            resources,
            body,
            catches,
            finally,
        }
    }

    fn catch_type(&mut self) -> TypeRefId {
        let start = self.start();
        let first = self.type_ref(false);
        if !self.at(TokenKind::Pipe) {
            return first;
        }
        let mut parts = vec![first];
        while self.eat(TokenKind::Pipe) {
            parts.push(self.type_ref(false));
        }
        let span = self.span_from(start);
        self.unit.type_refs.alloc(TypeRef {
            kind: TypeRefKind::Union(parts),
            annotations: Vec::new(),
            dims: 0,
            varargs: false,
            span,
            ty: None,
            recovered: false,
        })
    }

    fn switch_statement(&mut self) -> StmtKind {
        self.bump();
        let selector = self.paren_expression();
        let mut cases = Vec::new();
        if self.expect(TokenKind::LBrace, "`{` opening the switch body") {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.start();
                let (labels, is_default) = if self.eat_word("default") {
                    (Vec::new(), true)
                } else if self.eat_word("case") {
                    let mut labels = vec![self.ternary()];
                    while self.eat(TokenKind::Comma) {
                        labels.push(self.ternary());
                    }
                    (labels, false)
                } else {
                    self.error("expected `case` or `default`");
                    self.bump();
                    continue;
                };
                let arrow = self.eat(TokenKind::Arrow);
                if !arrow {
                    self.expect(TokenKind::Colon, "`:` after a case label");
                }
                let span = self.span_from(start);
                let mut body = Vec::new();
                if arrow {
                    if self.at(TokenKind::LBrace) || self.at_word("throw") {
                        body.push(self.statement());
                    } else {
                        let stmt_start = self.start();
                        let expr = self.expression();
                        self.expect(TokenKind::Semi, "`;` after a case expression");
                        body.push(self.alloc_stmt(StmtKind::Expr(expr), stmt_start));
                    }
                } else {
                    while !self.at(TokenKind::RBrace)
                        && !self.at_eof()
                        && !self.at_word("case")
                        && !(self.at_word("default")
                            && matches!(self.nth_kind(1), Some(TokenKind::Colon | TokenKind::Arrow)))
                    {
                        let before = self.pos;
                        body.push(self.block_statement());
                        if self.pos == before {
                            self.bump();
                        }
                    }
                }
                cases.push(SwitchCase {
                    labels,
                    is_default,
                    arrow,
                    body,
                    span,
                });
            }
            self.expect(TokenKind::RBrace, "`}` closing the switch body");
        }
        StmtKind::Switch { selector, cases }
    }

    // --- expressions --------------------------------------------------------

    fn expression(&mut self) -> ExprId {
        if self.at_lambda() {
            return self.lambda();
        }
        let start = self.start();
        let lhs = self.ternary();
        if let Some((op, width)) = self.assign_op() {
            self.pos += width;
            let rhs = self.expression();
            return self.alloc_expr(ExprKind::Assign { op, lhs, rhs }, start);
        }
        lhs
    }

    fn ternary(&mut self) -> ExprId {
        let start = self.start();
        let cond = self.binary(1);
        if !self.eat(TokenKind::Question) {
            return cond;
        }
        let then_expr = self.expression();
        self.expect(TokenKind::Colon, "`:` in a conditional expression");
        let else_expr = if self.at_lambda() {
            self.lambda()
        } else {
            self.ternary()
        };
        self.alloc_expr(
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            },
            start,
        )
    }

    fn binary(&mut self, min_precedence: u8) -> ExprId {
        let start = self.start();
        let mut lhs = self.unary();
        loop {
            if self.at_word("instanceof") {
                if BinaryOp::Lt.precedence() < min_precedence {
                    break;
                }
                self.bump();
                self.eat_word("final");
                let ty = self.type_ref(false);
                lhs = self.alloc_expr(ExprKind::InstanceOf { expr: lhs, ty }, start);
                continue;
            }
            let Some((op, width)) = self.binary_op() else {
                break;
            };
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += width;
            let rhs = self.binary(op.precedence() + 1);
            lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, start);
        }
        lhs
    }

    /// The binary operator at the cursor and its width in tokens. `>` is
    /// always lexed alone, so shifts and `>=` are glued here.
    fn binary_op(&self) -> Option<(BinaryOp, usize)> {
        let at = self.pos;
        Some(match self.nth_kind(0)? {
            TokenKind::Star => (BinaryOp::Mul, 1),
            TokenKind::Slash => (BinaryOp::Div, 1),
            TokenKind::Percent => (BinaryOp::Rem, 1),
            TokenKind::Plus => (BinaryOp::Add, 1),
            TokenKind::Minus => (BinaryOp::Sub, 1),
            TokenKind::Shl => (BinaryOp::Shl, 1),
            TokenKind::Lt => (BinaryOp::Lt, 1),
            TokenKind::Le => (BinaryOp::Le, 1),
            TokenKind::EqEq => (BinaryOp::Eq, 1),
            TokenKind::BangEq => (BinaryOp::Ne, 1),
            TokenKind::Amp => (BinaryOp::BitAnd, 1),
            TokenKind::Caret => (BinaryOp::BitXor, 1),
            TokenKind::Pipe => (BinaryOp::BitOr, 1),
            TokenKind::AmpAmp => (BinaryOp::And, 1),
            TokenKind::PipePipe => (BinaryOp::Or, 1),
            TokenKind::Gt => {
                let glued = |n: usize, kind: TokenKind| {
                    self.adjacent(at + n - 1) && self.kind_at(at + n) == Some(kind)
                };
                if glued(1, TokenKind::Gt) {
                    if glued(2, TokenKind::Gt) {
                        if glued(3, TokenKind::Eq) {
                            return None;
                        }
                        (BinaryOp::UShr, 3)
                    } else if glued(2, TokenKind::Eq) {
                        return None;
                    } else {
                        (BinaryOp::Shr, 2)
                    }
                } else if glued(1, TokenKind::Eq) {
                    (BinaryOp::Ge, 2)
                } else {
                    (BinaryOp::Gt, 1)
                }
            }
            _ => return None,
        })
    }

    fn assign_op(&self) -> Option<(AssignOp, usize)> {
        let at = self.pos;
        Some(match self.nth_kind(0)? {
            TokenKind::Eq => (AssignOp::Assign, 1),
            TokenKind::PlusEq => (AssignOp::Add, 1),
            TokenKind::MinusEq => (AssignOp::Sub, 1),
            TokenKind::StarEq => (AssignOp::Mul, 1),
            TokenKind::SlashEq => (AssignOp::Div, 1),
            TokenKind::PercentEq => (AssignOp::Rem, 1),
            TokenKind::AmpEq => (AssignOp::BitAnd, 1),
            TokenKind::PipeEq => (AssignOp::BitOr, 1),
            TokenKind::CaretEq => (AssignOp::BitXor, 1),
            TokenKind::ShlEq => (AssignOp::Shl, 1),
            TokenKind::Gt => {
                let glued = |n: usize, kind: TokenKind| {
                    self.adjacent(at + n - 1) && self.kind_at(at + n) == Some(kind)
                };
                if !glued(1, TokenKind::Gt) {
                    return None;
                }
                if glued(2, TokenKind::Eq) {
                    (AssignOp::Shr, 3)
                } else if glued(2, TokenKind::Gt) && glued(3, TokenKind::Eq) {
                    (AssignOp::UShr, 4)
                } else {
                    return None;
                }
            }
            _ => return None,
        })
    }

    fn unary(&mut self) -> ExprId {
        let start = self.start();
        let op = match self.nth_kind(0) {
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            Some(TokenKind::Minus) => Some(UnaryOp::Minus),
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Tilde) => Some(UnaryOp::BitNot),
            Some(TokenKind::PlusPlus) => Some(UnaryOp::PreInc),
            Some(TokenKind::MinusMinus) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.unary();
            return self.alloc_expr(ExprKind::Unary { op, operand }, start);
        }
        if self.at(TokenKind::LParen) && self.at_cast() {
            self.bump();
            let first = self.type_ref(false);
            let ty = if self.at(TokenKind::Amp) {
                let mut parts = vec![first];
                while self.eat(TokenKind::Amp) {
                    parts.push(self.type_ref(false));
                }
                let span = self.span_from(self.unit.type_refs[first].span.start);
                self.unit.type_refs.alloc(TypeRef {
                    kind: TypeRefKind::Intersection(parts),
                    annotations: Vec::new(),
                    dims: 0,
                    varargs: false,
                    span,
                    ty: None,
                    recovered: false,
                })
            } else {
                first
            };
            self.expect(TokenKind::RParen, "`)` closing the cast");
            let expr = if self.at_lambda() {
                self.lambda()
            } else {
                self.unary()
            };
            return self.alloc_expr(ExprKind::Cast { ty, expr }, start);
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ExprId {
        let start = self.start();
        let mut expr = self.primary();
        loop {
            if self.at(TokenKind::Dot) {
                if self.nth_word(1, "new") {
                    self.bump();
                    expr = self.creator(Some(expr), start);
                    continue;
                }
                if self.nth_kind(1) == Some(TokenKind::Lt) {
                    self.bump();
                    let type_args = self.type_arguments();
                    let name = self.ident();
                    let args = self.arguments();
                    expr = self.alloc_expr(
                        ExprKind::MethodCall {
                            receiver: Some(expr),
                            type_args,
                            name,
                            args,
                            method: None,
                        },
                        start,
                    );
                    continue;
                }
                if self.is_ident_at(self.pos + 1) {
                    self.bump();
                    let name = self.ident();
                    let kind = if self.at(TokenKind::LParen) {
                        let args = self.arguments();
                        ExprKind::MethodCall {
                            receiver: Some(expr),
                            type_args: Vec::new(),
                            name,
                            args,
                            method: None,
                        }
                    } else {
                        ExprKind::FieldAccess {
                            receiver: expr,
                            name,
                            field: None,
                        }
                    };
                    expr = self.alloc_expr(kind, start);
                    continue;
                }
                break;
            }
            if self.eat(TokenKind::LBracket) {
                let index = self.expression();
                self.expect(TokenKind::RBracket, "`]` closing the index");
                expr = self.alloc_expr(ExprKind::ArrayAccess { array: expr, index }, start);
                continue;
            }
            if self.eat(TokenKind::ColonColon) {
                let type_args = if self.at(TokenKind::Lt) {
                    self.type_arguments()
                } else {
                    Vec::new()
                };
                let name = self.ident();
                expr = self.alloc_expr(
                    ExprKind::MethodRef {
                        kind: MethodRefKind::Expr(expr),
                        type_args,
                        name: Some(name),
                        method: None,
                    },
                    start,
                );
                continue;
            }
            let op = match self.nth_kind(0) {
                Some(TokenKind::PlusPlus) => PostfixOp::Inc,
                Some(TokenKind::MinusMinus) => PostfixOp::Dec,
                _ => break,
            };
            self.bump();
            expr = self.alloc_expr(ExprKind::Postfix { op, operand: expr }, start);
        }
        expr
    }

    fn primary(&mut self) -> ExprId {
        let start = self.start();
        let Some(token) = self.token_at(self.pos) else {
            return self.error_expr("expected an expression");
        };
        if token.kind.is_literal() {
            return self.literal();
        }
        match token.kind {
            TokenKind::LParen => {
                self.bump();
                let inner = self.expression();
                self.expect(TokenKind::RParen, "`)`");
                return self.alloc_expr(ExprKind::Paren(inner), start);
            }
            TokenKind::Ident => {}
            _ => return self.error_expr("expected an expression"),
        }
        let word = token.text(self.source);
        match word {
            "true" | "false" => {
                self.bump();
                self.alloc_expr(
                    ExprKind::Literal {
                        kind: LiteralKind::Bool,
                        value: Some(ConstValue::Bool(word == "true")),
                    },
                    start,
                )
            }
            "null" => {
                self.bump();
                self.alloc_expr(
                    ExprKind::Literal {
                        kind: LiteralKind::Null,
                        value: None,
                    },
                    start,
                )
            }
            "this" => {
                self.bump();
                self.alloc_expr(ExprKind::This { qualifier: None }, start)
            }
            "super" => {
                self.bump();
                self.super_member(None, start)
            }
            "new" => self.creator(None, start),
            _ if self.primitive_at(self.pos).is_some() || word == "void" => {
                let ty = self.type_ref(false);
                self.type_tail(ty, start)
            }
            _ if is_keyword(word) => self.error_expr("expected an expression"),
            _ => self.name_primary(start),
        }
    }

    /// `.class` or `::name` after a type written in expression position.
    fn type_tail(&mut self, ty: TypeRefId, start: usize) -> ExprId {
        if self.at(TokenKind::Dot) && self.nth_word(1, "class") {
            self.pos += 2;
            return self.alloc_expr(ExprKind::ClassLit(ty), start);
        }
        if self.eat(TokenKind::ColonColon) {
            let type_args = if self.at(TokenKind::Lt) {
                self.type_arguments()
            } else {
                Vec::new()
            };
            let (kind, name) = if self.eat_word("new") {
                (MethodRefKind::New(ty), None)
            } else {
                (MethodRefKind::Type(ty), Some(self.ident()))
            };
            return self.alloc_expr(
                ExprKind::MethodRef {
                    kind,
                    type_args,
                    name,
                    method: None,
                },
                start,
            );
        }
        self.error_expr("expected `.class` or `::` after a type")
    }

    fn super_member(&mut self, qualifier: Option<NameRef>, start: usize) -> ExprId {
        if self.eat(TokenKind::ColonColon) {
            let type_args = if self.at(TokenKind::Lt) {
                self.type_arguments()
            } else {
                Vec::new()
            };
            let name = self.ident();
            return self.alloc_expr(
                ExprKind::MethodRef {
                    kind: MethodRefKind::Super(qualifier),
                    type_args,
                    name: Some(name),
                    method: None,
                },
                start,
            );
        }
        self.expect(TokenKind::Dot, "`.` after `super`");
        let type_args = if self.at(TokenKind::Lt) {
            self.type_arguments()
        } else {
            Vec::new()
        };
        let name = self.ident();
        let kind = if self.at(TokenKind::LParen) {
            let args = self.arguments();
            ExprKind::SuperMethodCall {
                qualifier,
                type_args,
                name,
                args,
                method: None,
            }
        } else {
            ExprKind::SuperFieldAccess {
                qualifier,
                name,
                field: None,
            }
        };
        self.alloc_expr(kind, start)
    }

    fn name_primary(&mut self, start: usize) -> ExprId {
        if let Some(end) = self.skip_type(self.pos) {
            let plain = self.tokens[self.pos..end]
                .iter()
                .all(|token| matches!(token.kind, TokenKind::Ident | TokenKind::Dot));
            let method_ref = self.kind_at(end) == Some(TokenKind::ColonColon)
                && (!plain || self.word_at(end + 1) == Some("new"));
            let class_literal = self.kind_at(end) == Some(TokenKind::Dot)
                && self.word_at(end + 1) == Some("class");
            if method_ref || class_literal {
                let ty = self.type_ref(false);
                return self.type_tail(ty, start);
            }
        }

        if self.nth_kind(1) == Some(TokenKind::LParen) {
            let name = self.ident();
            let args = self.arguments();
            return self.alloc_expr(
                ExprKind::MethodCall {
                    receiver: None,
                    type_args: Vec::new(),
                    name,
                    args,
                    method: None,
                },
                start,
            );
        }

        let mut segments = vec![self.name_segment()];
        while self.at(TokenKind::Dot)
            && self.is_ident_at(self.pos + 1)
            && self.nth_kind(2) != Some(TokenKind::LParen)
        {
            self.bump();
            segments.push(self.name_segment());
        }
        let name = NameRef {
            segments,
            span: self.span_from(start),
        };
        if self.at(TokenKind::Dot) && self.nth_word(1, "this") {
            self.pos += 2;
            return self.alloc_expr(
                ExprKind::This {
                    qualifier: Some(name),
                },
                start,
            );
        }
        if self.at(TokenKind::Dot)
            && self.nth_word(1, "super")
            && matches!(self.nth_kind(2), Some(TokenKind::Dot | TokenKind::ColonColon))
        {
            self.pos += 2;
            return self.super_member(Some(name), start);
        }
        self.alloc_expr(ExprKind::Name(name), start)
    }

    fn creator(&mut self, outer: Option<ExprId>, start: usize) -> ExprId {
        self.bump();
        let type_args = if self.at(TokenKind::Lt) {
            self.type_arguments()
        } else {
            Vec::new()
        };
        let ty_start = self.start();
        let mut annotations = Vec::new();
        self.type_annotations(&mut annotations, AnnotationSlot::Segment(0));
        let kind = if let Some(primitive) = self.primitive_at(self.pos) {
            self.bump();
            TypeRefKind::Primitive(primitive)
        } else if self.at_ident() {
            TypeRefKind::Named(self.type_segments(&mut annotations))
        } else {
            self.error("expected a type after `new`");
            TypeRefKind::Missing
        };

        if self.kind_at(self.skip_annotations(self.pos)) == Some(TokenKind::LBracket) {
            let mut dims = 0;
            let mut dim_exprs = Vec::new();
            while self.kind_at(self.skip_annotations(self.pos)) == Some(TokenKind::LBracket) {
                self.type_annotations(&mut annotations, AnnotationSlot::Dimension(dims));
                self.bump();
                if !self.eat(TokenKind::RBracket) {
                    dim_exprs.push(self.expression());
                    self.expect(TokenKind::RBracket, "`]` closing the dimension");
                }
                dims += 1;
            }
            let span = self.span_from(ty_start);
            let ty = self.unit.type_refs.alloc(TypeRef {
                kind,
                annotations,
                dims,
                varargs: false,
                span,
                ty: None,
                recovered: false,
            });
            let initializer = if self.at(TokenKind::LBrace) {
                Some(self.array_initializer())
            } else {
                None
            };
            return self.alloc_expr(
                ExprKind::NewArray {
                    ty,
                    dim_exprs,
                    initializer,
                },
                start,
            );
        }

        let span = self.span_from(ty_start);
        let ty = self.unit.type_refs.alloc(TypeRef {
            kind,
            annotations,
            dims: 0,
            varargs: false,
            span,
            ty: None,
            recovered: false,
        });
        let args = self.arguments();
        let body = if self.at(TokenKind::LBrace) {
            Some(self.anonymous_class())
        } else {
            None
        };
        self.alloc_expr(
            ExprKind::New {
                outer,
                type_args,
                ty,
                args,
                body,
                ctor: None,
            },
            start,
        )
    }

    fn arguments(&mut self) -> Vec<ExprId> {
        let mut args = Vec::new();
        if !self.expect(TokenKind::LParen, "`(` opening the arguments") {
            return args;
        }
        if self.eat(TokenKind::RParen) {
            return args;
        }
        loop {
            args.push(self.expression());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` closing the arguments");
        args
    }

    fn lambda(&mut self) -> ExprId {
        let start = self.start();
        let mut params = Vec::new();
        let parenthesized = self.eat(TokenKind::LParen);
        if parenthesized {
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                let param_start = self.start();
                if self.at_ident()
                    && matches!(self.nth_kind(1), Some(TokenKind::Comma | TokenKind::RParen))
                {
                    let name = self.ident();
                    params.push(self.alloc_var(None, None, name, param_start));
                } else {
                    let modifiers = self.modifiers();
                    let ty = self.type_ref(true);
                    self.varargs(ty);
                    let name = self.ident();
                    let (extra_dims, extra_dim_annotations) = self.extra_dims();
                    let var = self.alloc_var(Some(modifiers), Some(ty), name, param_start);
                    if let Some(decl) = self.unit.vars.get_mut(var) {
                        decl.extra_dims = extra_dims;
                        decl.extra_dim_annotations = extra_dim_annotations;
                    }
                    params.push(var);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "`)` closing the lambda parameters");
        } else {
            let name = self.ident();
            params.push(self.alloc_var(None, None, name, start));
        }
        self.expect(TokenKind::Arrow, "`->`");
        let body = if self.at(TokenKind::LBrace) {
            LambdaBody::Block(self.block())
        } else {
            LambdaBody::Expr(self.expression())
        };
        self.alloc_expr(
            ExprKind::Lambda {
                params,
                parenthesized,
                body,
            },
            start,
        )
    }

    fn literal(&mut self) -> ExprId {
        let start = self.start();
        let Some(token) = self.bump() else {
            return self.error_expr("expected a literal");
        };
        let text = token.text(self.source);
        let (kind, value) = match token.kind {
            TokenKind::IntLiteral => (LiteralKind::Int, literals::int(text)),
            TokenKind::LongLiteral => (LiteralKind::Long, literals::long(text)),
            TokenKind::FloatLiteral => (LiteralKind::Float, literals::float(text)),
            TokenKind::DoubleLiteral => (LiteralKind::Double, literals::double(text)),
            TokenKind::CharLiteral => (LiteralKind::Char, literals::char(text)),
            TokenKind::StringLiteral => (LiteralKind::String, literals::string(text)),
            _ => (LiteralKind::TextBlock, literals::text_block(text)),
        };
        self.alloc_expr(ExprKind::Literal { kind, value }, start)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_ok(source: &str) -> Parsed {
        let parsed = parse(source);
        assert_eq!(parsed.errors, Vec::new(), "unexpected syntax errors");
        parsed
    }

    #[test]
    fn parses_header_and_members() {
        let parsed = parse_ok(
            "package p.q; import java.util.*; import static java.lang.Math.max;\n\
             public class A<T extends Comparable<T>> extends Object implements Runnable {\n\
                 private int x = 1, y[] = {2};\n\
                 public A() { super(); }\n\
                 public void run() { for (int i = 0; i < x; i++) { x += i; } }\n\
             }",
        );
        let unit = &parsed.unit;
        assert_eq!(unit.package.as_ref().map(|p| p.name.to_dotted()), Some("p.q".into()));
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[0].is_star);
        assert!(unit.imports[1].is_static);
        let class = unit.classes.get(unit.types[0]).unwrap();
        assert_eq!(class.name.as_str(), "A");
        assert_eq!(class.type_params.len(), 1);
        assert_eq!(class.members.len(), 3);
    }

    #[test]
    fn records_where_type_annotations_were_written() {
        let parsed = parse_ok("class A { java.lang.@X String @Y [] @Z [] f; }");
        let (_, field) = parsed.unit.fields.iter().next().unwrap();
        let ty = parsed.unit.type_refs.get(field.ty).unwrap();
        assert_eq!(ty.dims, 2);
        let slots: Vec<_> = ty.annotations.iter().map(|a| parsed.slots[a]).collect();
        assert_eq!(
            slots,
            vec![
                AnnotationSlot::Segment(2),
                AnnotationSlot::Dimension(0),
                AnnotationSlot::Dimension(1),
            ]
        );
    }

    #[test]
    fn shifts_are_glued_from_single_angle_tokens() {
        let parsed = parse_ok("class A { int f(int a) { return a >>> 2 >> 1; } }");
        let ops: Vec<_> = parsed
            .unit
            .exprs
            .iter()
            .filter_map(|(_, e)| match e.kind {
                ExprKind::Binary { op, .. } => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![BinaryOp::UShr, BinaryOp::Shr]);
    }

    #[test]
    fn distinguishes_casts_lambdas_and_parentheses() {
        let parsed = parse_ok(
            "class A { void f(Object o, int a) { Runnable r = (Runnable) () -> {}; int b = (a) + 1; } }",
        );
        let kinds: Vec<_> = parsed
            .unit
            .exprs
            .iter()
            .filter_map(|(_, e)| match e.kind {
                ExprKind::Cast { .. } => Some("cast"),
                ExprKind::Lambda { .. } => Some("lambda"),
                ExprKind::Paren(_) => Some("paren"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["lambda", "cast", "paren"]);
    }

    #[test]
    fn recovers_from_garbage() {
        let parsed = parse("class A { void f() { int x = ; } }");
        assert!(parsed.unit.recovered);
        assert!(!parsed.errors.is_empty());
        assert_eq!(parsed.unit.types.len(), 1);
    }
}
