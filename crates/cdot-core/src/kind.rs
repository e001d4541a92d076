//! The closed set of syntax node kinds.
//!
//! Every node of a [`SyntaxNode`](crate::tree::SyntaxNode) tree is tagged with
//! exactly one [`NodeKind`]. Consumers dispatch on it with an exhaustive
//! `match`, so adding a kind here surfaces every place that must handle it.

use std::fmt;

/// Broad grouping of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The whole translation unit.
    Program,
    /// `#define`, `#ifdef`, `#include` and friends.
    Preprocessor,
    /// Statements, declarations and function definitions.
    Statement,
    /// Operators, calls and other expression forms.
    Expression,
    /// Type expressions.
    Type,
    /// Leaves carrying verbatim source text.
    Terminal,
}

/// Kind tag of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of the tree.
    Program,

    // Preprocessor
    /// `#define NAME` with no value. Captures `NAME`.
    DefineFlag,
    /// `#define NAME value`. Captures `NAME`.
    DefineConst,
    /// `#define NAME(args) body`. Captures `NAME`.
    DefineMacro,
    /// Parameter list of a function-like macro.
    MacroArgList,
    /// `#ifdef NAME ... #endif`. Captures `NAME`.
    IfDef,
    /// `#ifndef NAME ... #endif`. Captures `NAME`.
    IfNotDef,
    /// `#undef NAME`. Captures `NAME`.
    UnDef,
    /// `#include <path>` or `#include "path"`. Captures the delimited path.
    IncludeFile,

    // Statements
    Statement,
    ReturnExpr,
    IfStmt,
    ElseStmt,
    ForLoop,
    WhileLoop,
    Block,
    Declaration,
    /// Several declarators sharing one declaration.
    MultDecl,
    /// Declarator with an initializer.
    SingleDef,
    /// Array declarator, `name[size]`.
    ArrName,
    FnDeclaration,
    FnImplementation,
    TypeDefinition,
    ArgDeclList,

    // Expressions
    /// Postfix `++` / `--`. Captures the operator.
    SuffixOp,
    Call,
    Subscript,
    /// `.` or `->` member access. Captures the operator.
    MemberGet,
    /// Brace-enclosed initializer list.
    CompLiteral,
    /// Unary prefix operator. Captures the operator.
    PrefixOp,
    CCast,
    MultOp,
    AddOp,
    ShiftOp,
    CompareOp,
    EqOp,
    BitAndOp,
    BitXorOp,
    BitOrOp,
    LojAndOp,
    LojOrOp,
    TernaryOp,
    /// Assignment or compound assignment. Captures the operator.
    SetVal,

    // Types
    SimpleType,
    ArrayType,
    PtrType,
    ConstType,
    /// Named `struct` / `union` / `enum`. Captures the keyword.
    ComplexType,
    /// Anonymous `struct` / `union` / `enum` body. Captures the keyword.
    AnonType,
    FnPtrType,

    // Terminals
    /// A declared name.
    SimpleName,
    /// Spelling of a simple type, such as `unsigned int` or a typedef name.
    TypeName,
    NameAtom,
    IntAtom,
    FloatAtom,
    CharAtom,
    StrAtom,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 57] = [
        NodeKind::Program,
        NodeKind::DefineFlag,
        NodeKind::DefineConst,
        NodeKind::DefineMacro,
        NodeKind::MacroArgList,
        NodeKind::IfDef,
        NodeKind::IfNotDef,
        NodeKind::UnDef,
        NodeKind::IncludeFile,
        NodeKind::Statement,
        NodeKind::ReturnExpr,
        NodeKind::IfStmt,
        NodeKind::ElseStmt,
        NodeKind::ForLoop,
        NodeKind::WhileLoop,
        NodeKind::Block,
        NodeKind::Declaration,
        NodeKind::MultDecl,
        NodeKind::SingleDef,
        NodeKind::ArrName,
        NodeKind::FnDeclaration,
        NodeKind::FnImplementation,
        NodeKind::TypeDefinition,
        NodeKind::ArgDeclList,
        NodeKind::SuffixOp,
        NodeKind::Call,
        NodeKind::Subscript,
        NodeKind::MemberGet,
        NodeKind::CompLiteral,
        NodeKind::PrefixOp,
        NodeKind::CCast,
        NodeKind::MultOp,
        NodeKind::AddOp,
        NodeKind::ShiftOp,
        NodeKind::CompareOp,
        NodeKind::EqOp,
        NodeKind::BitAndOp,
        NodeKind::BitXorOp,
        NodeKind::BitOrOp,
        NodeKind::LojAndOp,
        NodeKind::LojOrOp,
        NodeKind::TernaryOp,
        NodeKind::SetVal,
        NodeKind::SimpleType,
        NodeKind::ArrayType,
        NodeKind::PtrType,
        NodeKind::ConstType,
        NodeKind::ComplexType,
        NodeKind::AnonType,
        NodeKind::FnPtrType,
        NodeKind::SimpleName,
        NodeKind::TypeName,
        NodeKind::NameAtom,
        NodeKind::IntAtom,
        NodeKind::FloatAtom,
        NodeKind::CharAtom,
        NodeKind::StrAtom,
    ];

    /// Returns the broad [`Category`] of this kind.
    pub fn category(&self) -> Category {
        match self {
            NodeKind::Program => Category::Program,
            NodeKind::DefineFlag
            | NodeKind::DefineConst
            | NodeKind::DefineMacro
            | NodeKind::MacroArgList
            | NodeKind::IfDef
            | NodeKind::IfNotDef
            | NodeKind::UnDef
            | NodeKind::IncludeFile => Category::Preprocessor,
            NodeKind::Statement
            | NodeKind::ReturnExpr
            | NodeKind::IfStmt
            | NodeKind::ElseStmt
            | NodeKind::ForLoop
            | NodeKind::WhileLoop
            | NodeKind::Block
            | NodeKind::Declaration
            | NodeKind::MultDecl
            | NodeKind::SingleDef
            | NodeKind::ArrName
            | NodeKind::FnDeclaration
            | NodeKind::FnImplementation
            | NodeKind::TypeDefinition
            | NodeKind::ArgDeclList => Category::Statement,
            NodeKind::SuffixOp
            | NodeKind::Call
            | NodeKind::Subscript
            | NodeKind::MemberGet
            | NodeKind::CompLiteral
            | NodeKind::PrefixOp
            | NodeKind::CCast
            | NodeKind::MultOp
            | NodeKind::AddOp
            | NodeKind::ShiftOp
            | NodeKind::CompareOp
            | NodeKind::EqOp
            | NodeKind::BitAndOp
            | NodeKind::BitXorOp
            | NodeKind::BitOrOp
            | NodeKind::LojAndOp
            | NodeKind::LojOrOp
            | NodeKind::TernaryOp
            | NodeKind::SetVal => Category::Expression,
            NodeKind::SimpleType
            | NodeKind::ArrayType
            | NodeKind::PtrType
            | NodeKind::ConstType
            | NodeKind::ComplexType
            | NodeKind::AnonType
            | NodeKind::FnPtrType => Category::Type,
            NodeKind::SimpleName
            | NodeKind::TypeName
            | NodeKind::NameAtom
            | NodeKind::IntAtom
            | NodeKind::FloatAtom
            | NodeKind::CharAtom
            | NodeKind::StrAtom => Category::Terminal,
        }
    }

    /// Returns the name of the kind as written in the grammar.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::DefineFlag => "DefineFlag",
            NodeKind::DefineConst => "DefineConst",
            NodeKind::DefineMacro => "DefineMacro",
            NodeKind::MacroArgList => "MacroArgList",
            NodeKind::IfDef => "IfDef",
            NodeKind::IfNotDef => "IfNotDef",
            NodeKind::UnDef => "UnDef",
            NodeKind::IncludeFile => "IncludeFile",
            NodeKind::Statement => "Statement",
            NodeKind::ReturnExpr => "ReturnExpr",
            NodeKind::IfStmt => "IfStmt",
            NodeKind::ElseStmt => "ElseStmt",
            NodeKind::ForLoop => "ForLoop",
            NodeKind::WhileLoop => "WhileLoop",
            NodeKind::Block => "Block",
            NodeKind::Declaration => "Declaration",
            NodeKind::MultDecl => "MultDecl",
            NodeKind::SingleDef => "SingleDef",
            NodeKind::ArrName => "ArrName",
            NodeKind::FnDeclaration => "FnDeclaration",
            NodeKind::FnImplementation => "FnImplementation",
            NodeKind::TypeDefinition => "TypeDefinition",
            NodeKind::ArgDeclList => "ArgDeclList",
            NodeKind::SuffixOp => "SuffixOp",
            NodeKind::Call => "Call",
            NodeKind::Subscript => "Subscript",
            NodeKind::MemberGet => "MemberGet",
            NodeKind::CompLiteral => "CompLiteral",
            NodeKind::PrefixOp => "PrefixOp",
            NodeKind::CCast => "CCast",
            NodeKind::MultOp => "MultOp",
            NodeKind::AddOp => "AddOp",
            NodeKind::ShiftOp => "ShiftOp",
            NodeKind::CompareOp => "CompareOp",
            NodeKind::EqOp => "EqOp",
            NodeKind::BitAndOp => "BitAndOp",
            NodeKind::BitXorOp => "BitXorOp",
            NodeKind::BitOrOp => "BitOrOp",
            NodeKind::LojAndOp => "LojAndOp",
            NodeKind::LojOrOp => "LojOrOp",
            NodeKind::TernaryOp => "TernaryOp",
            NodeKind::SetVal => "SetVal",
            NodeKind::SimpleType => "SimpleType",
            NodeKind::ArrayType => "ArrayType",
            NodeKind::PtrType => "PtrType",
            NodeKind::ConstType => "ConstType",
            NodeKind::ComplexType => "ComplexType",
            NodeKind::AnonType => "AnonType",
            NodeKind::FnPtrType => "FnPtrType",
            NodeKind::SimpleName => "SimpleName",
            NodeKind::TypeName => "TypeName",
            NodeKind::NameAtom => "NameAtom",
            NodeKind::IntAtom => "IntAtom",
            NodeKind::FloatAtom => "FloatAtom",
            NodeKind::CharAtom => "CharAtom",
            NodeKind::StrAtom => "StrAtom",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
