//! Label, shape and frame policy for every node kind.
//!
//! [`rule`] is the single table deciding how a [`NodeKind`] is drawn and
//! whether entering it opens a new attachment frame. The visitor never
//! special-cases a kind outside of this table.

use std::borrow::Cow;

use cdot_core::NodeKind;

use crate::error::TraversalError;

/// Display shape of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Structural and control constructs.
    Box,
    /// Atoms and other verbatim leaves, drawn with the default shape.
    Blob,
}

impl Shape {
    /// Value of the DOT `shape` attribute, if one is written.
    pub fn dot_attribute(self) -> Option<&'static str> {
        match self {
            Shape::Box => Some("box"),
            Shape::Blob => None,
        }
    }
}

/// Where the label of a node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// A fixed string.
    Fixed(&'static str),
    /// The captured token, verbatim.
    Captured,
    /// The captured token between a fixed prefix and suffix.
    Template {
        prefix: &'static str,
        suffix: &'static str,
    },
    /// The verbatim source text of a terminal.
    Verbatim,
}

/// Drawing rule for one node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub label: LabelSource,
    pub shape: Shape,
    /// Whether entering the kind opens an attachment frame for its descendants.
    pub pushes: bool,
}

impl Rule {
    const fn frame(label: LabelSource) -> Self {
        Self {
            label,
            shape: Shape::Box,
            pushes: true,
        }
    }

    const fn fixed(label: &'static str) -> Self {
        Self::frame(LabelSource::Fixed(label))
    }

    const fn captured() -> Self {
        Self::frame(LabelSource::Captured)
    }

    const fn directive(prefix: &'static str, suffix: &'static str, pushes: bool) -> Self {
        Self {
            label: LabelSource::Template { prefix, suffix },
            shape: Shape::Box,
            pushes,
        }
    }

    const fn verbatim() -> Self {
        Self {
            label: LabelSource::Verbatim,
            shape: Shape::Blob,
            pushes: false,
        }
    }

    /// Build the label of a node of `kind` from `token`.
    ///
    /// `token` is the captured sub-token for [`LabelSource::Captured`] and
    /// [`LabelSource::Template`], the verbatim text for
    /// [`LabelSource::Verbatim`], and ignored for [`LabelSource::Fixed`].
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::MissingCapture`] or
    /// [`TraversalError::MissingText`] when the needed token is absent or
    /// empty, so that an empty label is never emitted.
    pub fn label<'a>(
        &self,
        kind: NodeKind,
        token: Option<&'a str>,
    ) -> Result<Cow<'a, str>, TraversalError> {
        let token = token.filter(|t| !t.is_empty());
        match (self.label, token) {
            (LabelSource::Fixed(label), _) => Ok(Cow::Borrowed(label)),
            (LabelSource::Captured, Some(token)) => Ok(Cow::Borrowed(token)),
            (LabelSource::Template { prefix, suffix }, Some(token)) => {
                Ok(Cow::Owned(format!("{prefix}{token}{suffix}")))
            }
            (LabelSource::Verbatim, Some(token)) => Ok(Cow::Borrowed(token)),
            (LabelSource::Verbatim, None) => Err(TraversalError::MissingText { kind }),
            (LabelSource::Captured | LabelSource::Template { .. }, None) => {
                Err(TraversalError::MissingCapture { kind })
            }
        }
    }
}

/// Rule for generic terminal tokens.
pub const GENERIC_TERMINAL: Rule = Rule::verbatim();

/// Look up the drawing rule of `kind`.
pub const fn rule(kind: NodeKind) -> Rule {
    match kind {
        NodeKind::Program => Rule::fixed("root"),

        // Preprocessor
        NodeKind::DefineFlag => Rule::directive("#define ", " (flag)", false),
        NodeKind::DefineConst => Rule::directive("#define ", " (constant)", true),
        NodeKind::DefineMacro => Rule::directive("#define ", " (macro)", true),
        NodeKind::MacroArgList => Rule::fixed("Macro args"),
        NodeKind::IfDef => Rule::directive("#ifdef ", "", true),
        NodeKind::IfNotDef => Rule::directive("#ifndef ", "", true),
        NodeKind::UnDef => Rule::directive("#undef ", "", false),
        NodeKind::IncludeFile => Rule::directive("#include ", "", false),

        // Statements
        NodeKind::Statement => Rule::fixed("Statement"),
        NodeKind::ReturnExpr => Rule::fixed("RETURN"),
        NodeKind::IfStmt => Rule::fixed("If (cond) pred"),
        NodeKind::ElseStmt => Rule::fixed("Else"),
        NodeKind::ForLoop => Rule::fixed("For (;;)"),
        NodeKind::WhileLoop => Rule::fixed("While (cond)"),
        NodeKind::Block => Rule::fixed("{ ... }"),
        NodeKind::Declaration => Rule::fixed("DECL"),
        NodeKind::MultDecl => Rule::fixed("DECL LIST"),
        NodeKind::SingleDef => Rule::fixed("="),
        NodeKind::ArrName => Rule::fixed("[]"),
        NodeKind::FnDeclaration | NodeKind::FnImplementation => Rule::fixed("FN"),
        NodeKind::TypeDefinition => Rule::fixed("TYPEDEF"),
        NodeKind::ArgDeclList => Rule::fixed("ARGS"),

        // Expressions
        NodeKind::SuffixOp
        | NodeKind::PrefixOp
        | NodeKind::MemberGet
        | NodeKind::MultOp
        | NodeKind::AddOp
        | NodeKind::ShiftOp
        | NodeKind::CompareOp
        | NodeKind::EqOp
        | NodeKind::SetVal => Rule::captured(),
        NodeKind::Call => Rule::fixed("CALL"),
        NodeKind::Subscript => Rule::fixed("[]"),
        NodeKind::CompLiteral => Rule::fixed("COMPLEX"),
        NodeKind::CCast => Rule::fixed("CAST"),
        NodeKind::BitAndOp => Rule::fixed("&"),
        NodeKind::BitXorOp => Rule::fixed("^"),
        NodeKind::BitOrOp => Rule::fixed("|"),
        NodeKind::LojAndOp => Rule::fixed("&&"),
        NodeKind::LojOrOp => Rule::fixed("||"),
        NodeKind::TernaryOp => Rule::fixed("?:"),

        // Types
        NodeKind::SimpleType => Rule::fixed("TYPE"),
        NodeKind::ArrayType => Rule::fixed("[] TYPE"),
        NodeKind::PtrType => Rule::fixed("* TYPE"),
        NodeKind::ConstType => Rule::fixed("CONST"),
        NodeKind::ComplexType | NodeKind::AnonType => Rule::captured(),
        NodeKind::FnPtrType => Rule::fixed("FN *"),

        // Terminals
        NodeKind::SimpleName
        | NodeKind::TypeName
        | NodeKind::NameAtom
        | NodeKind::IntAtom
        | NodeKind::FloatAtom
        | NodeKind::CharAtom
        | NodeKind::StrAtom => Rule::verbatim(),
    }
}
