//! Java syntax tree.
//!
//! Every node an edit may target carries a [`NodeId`]. Ranges are UTF-8 byte
//! offsets into the parsed text.

use std::fmt;

use jolt_core::TextRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
    pub range: TextRange,
}

impl CompilationUnit {
    /// The package name, empty for the default package.
    pub fn package_name(&self) -> &str {
        self.package.as_ref().map(|pkg| pkg.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    pub name: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub is_static: bool,
    pub is_star: bool,
    pub path: String,
    pub range: TextRange,
}

impl ImportDecl {
    /// Last path segment of a single-type import.
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_star {
            return None;
        }
        self.path.rsplit('.').next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub id: NodeId,
    pub kind: TypeKind,
    pub doc: Option<DocComment>,
    pub modifiers: Modifiers,
    pub name: Name,
    pub type_params: Vec<String>,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub body: ClassBody,
    pub range: TextRange,
}

impl TypeDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.body.methods()
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods().filter(|method| method.is_constructor())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBody {
    pub members: Vec<Member>,
    /// Includes both braces.
    pub range: TextRange,
}

impl ClassBody {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(Initializer),
    Type(TypeDecl),
    EnumConstant(EnumConstant),
}

impl Member {
    pub fn range(&self) -> TextRange {
        match self {
            Member::Field(field) => field.range,
            Member::Method(method) => method.range,
            Member::Initializer(init) => init.range,
            Member::Type(decl) => decl.range,
            Member::EnumConstant(constant) => constant.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub id: NodeId,
    pub name: Name,
    pub args: Option<ArgList>,
    pub body: Option<ClassBody>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub is_static: bool,
    pub body: Block,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub doc: Option<DocComment>,
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub vars: Vec<VarDeclarator>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDeclarator {
    pub name: Name,
    pub init: Option<Expr>,
    pub range: TextRange,
}

/// Java access levels, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Public,
        Visibility::Protected,
        Visibility::Package,
        Visibility::Private,
    ];

    /// Source keyword; package-private has none.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Private => Some("private"),
            Visibility::Package => None,
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or("package"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Default,
    Transient,
    Volatile,
    Strictfp,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub fn from_keyword(text: &str) -> Option<Modifier> {
        Some(match text {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "abstract" => Modifier::Abstract,
            "native" => Modifier::Native,
            "synchronized" => Modifier::Synchronized,
            "default" => Modifier::Default,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "strictfp" => Modifier::Strictfp,
            "sealed" => Modifier::Sealed,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Default => "default",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        }
    }

    pub fn visibility(self) -> Option<Visibility> {
        match self {
            Modifier::Public => Some(Visibility::Public),
            Modifier::Protected => Some(Visibility::Protected),
            Modifier::Private => Some(Visibility::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierKeyword {
    pub modifier: Modifier,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub keywords: Vec<ModifierKeyword>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.iter().any(|kw| kw.modifier == modifier)
    }

    /// The explicitly written access modifier, if any.
    pub fn visibility_keyword(&self) -> Option<&ModifierKeyword> {
        self.keywords.iter().find(|kw| kw.modifier.visibility().is_some())
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility_keyword()
            .and_then(|kw| kw.modifier.visibility())
            .unwrap_or(Visibility::Package)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub id: NodeId,
    pub kind: MethodKind,
    pub doc: Option<DocComment>,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub type_params_range: Option<TextRange>,
    /// `None` for constructors.
    pub return_ty: Option<TypeRef>,
    pub name: Name,
    pub params: ParamList,
    pub throws: Option<ThrowsClause>,
    pub body: Option<Block>,
    pub range: TextRange,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    /// Offset where a new leading modifier keyword would be written: in front of
    /// the first keyword, or in front of the type parameters / return type / name.
    pub fn modifier_insertion_offset(&self) -> usize {
        if let Some(first) = self.modifiers.keywords.first() {
            return first.range.start;
        }
        if let Some(range) = self.type_params_range {
            return range.start;
        }
        match &self.return_ty {
            Some(ty) => ty.range.start,
            None => self.name.range.start,
        }
    }

    /// First statement of the body when it is an explicit `this(..)` / `super(..)` call.
    pub fn explicit_constructor_call(&self) -> Option<&ConstructorCallExpr> {
        let first = self.body.as_ref()?.stmts.first()?;
        match first {
            Stmt::Expr(ExprStmt {
                expr: Expr::ConstructorCall(call),
                ..
            }) => Some(call),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamList {
    pub id: NodeId,
    pub params: Vec<Param>,
    /// Includes both parentheses.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub id: NodeId,
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub varargs: bool,
    pub name: Name,
    /// C-style dimensions written after the name (`int a[]`), from the name end.
    pub extra_dims: Option<TextRange>,
    pub extra_dim_count: usize,
    pub range: TextRange,
}

impl Param {
    /// Declared type including varargs and C-style dimensions.
    pub fn type_text(&self) -> String {
        let mut text = self.ty.text.clone();
        if self.varargs {
            text.push_str("...");
        }
        for _ in 0..self.extra_dim_count {
            text.push_str("[]");
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowsClause {
    pub types: Vec<TypeRef>,
    /// From the `throws` keyword to the end of the last type.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub id: NodeId,
    /// Source text with whitespace removed, e.g. `Map<String,Integer>[]`.
    pub text: String,
    pub range: TextRange,
}

impl TypeRef {
    /// Text up to the first `<` or `[`.
    pub fn base_name(&self) -> &str {
        base_type_name(&self.text)
    }

    pub fn simple_name(&self) -> &str {
        let base = self.base_name();
        base.rsplit('.').next().unwrap_or(base)
    }

    pub fn dims(&self) -> usize {
        self.text.matches('[').count()
    }
}

/// Text up to the first `<` or `[`, without a varargs marker.
pub fn base_type_name(text: &str) -> &str {
    let end = text
        .find(|c| c == '<' || c == '[')
        .unwrap_or(text.len());
    text[..end].trim_end_matches("...")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub id: NodeId,
    pub text: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    /// Includes both braces.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    LocalVar(LocalVarStmt),
    LocalType(Box<TypeDecl>),
    Expr(ExprStmt),
    Return(ReturnStmt),
    Throw(ThrowStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    Try(TryStmt),
    Switch(SwitchBlock),
    Sync(SyncStmt),
    Labeled(LabeledStmt),
    Assert(AssertStmt),
    Block(Block),
    /// `break`, `continue`.
    Jump(TextRange),
    Empty(TextRange),
}

impl Stmt {
    pub fn range(&self) -> TextRange {
        match self {
            Stmt::LocalVar(stmt) => stmt.range,
            Stmt::LocalType(decl) => decl.range,
            Stmt::Expr(stmt) => stmt.range,
            Stmt::Return(stmt) => stmt.range,
            Stmt::Throw(stmt) => stmt.range,
            Stmt::If(stmt) => stmt.range,
            Stmt::While(stmt) => stmt.range,
            Stmt::Do(stmt) => stmt.range,
            Stmt::For(stmt) => stmt.range,
            Stmt::ForEach(stmt) => stmt.range,
            Stmt::Try(stmt) => stmt.range,
            Stmt::Switch(stmt) => stmt.range,
            Stmt::Sync(stmt) => stmt.range,
            Stmt::Labeled(stmt) => stmt.range,
            Stmt::Assert(stmt) => stmt.range,
            Stmt::Block(block) => block.range,
            Stmt::Jump(range) | Stmt::Empty(range) => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVarStmt {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub vars: Vec<VarDeclarator>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub expr: Option<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStmt {
    pub body: Box<Stmt>,
    pub cond: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub init: Vec<Stmt>,
    pub cond: Option<Expr>,
    pub update: Vec<Expr>,
    pub body: Box<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForEachStmt {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Name,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryStmt {
    pub resources: Vec<Stmt>,
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchClause {
    pub types: Vec<TypeRef>,
    pub name: Name,
    pub body: Block,
    pub range: TextRange,
}

/// Shared by switch statements and switch expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBlock {
    pub selector: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    /// Empty for `default`.
    pub labels: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStmt {
    pub lock: Expr,
    pub body: Block,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledStmt {
    pub label: String,
    pub stmt: Box<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertStmt {
    pub cond: Expr,
    pub message: Option<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name(NameExpr),
    Literal(LiteralExpr),
    This(ThisExpr),
    Super(SuperExpr),
    FieldAccess(FieldAccessExpr),
    MethodCall(MethodCallExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    ArrayInit(ArrayInitExpr),
    ConstructorCall(ConstructorCallExpr),
    MethodRef(MethodRefExpr),
    Lambda(LambdaExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Conditional(ConditionalExpr),
    Cast(CastExpr),
    InstanceOf(InstanceOfExpr),
    ArrayAccess(ArrayAccessExpr),
    Paren(ParenExpr),
    ClassLiteral(ClassLiteralExpr),
    Switch(SwitchExpr),
    Missing(MissingExpr),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Name(expr) => expr.id,
            Expr::Literal(expr) => expr.id,
            Expr::This(expr) => expr.id,
            Expr::Super(expr) => expr.id,
            Expr::FieldAccess(expr) => expr.id,
            Expr::MethodCall(expr) => expr.id,
            Expr::New(expr) => expr.id,
            Expr::NewArray(expr) => expr.id,
            Expr::ArrayInit(expr) => expr.id,
            Expr::ConstructorCall(expr) => expr.id,
            Expr::MethodRef(expr) => expr.id,
            Expr::Lambda(expr) => expr.id,
            Expr::Unary(expr) => expr.id,
            Expr::Binary(expr) => expr.id,
            Expr::Assign(expr) => expr.id,
            Expr::Conditional(expr) => expr.id,
            Expr::Cast(expr) => expr.id,
            Expr::InstanceOf(expr) => expr.id,
            Expr::ArrayAccess(expr) => expr.id,
            Expr::Paren(expr) => expr.id,
            Expr::ClassLiteral(expr) => expr.id,
            Expr::Switch(expr) => expr.id,
            Expr::Missing(expr) => expr.id,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            Expr::Name(expr) => expr.range,
            Expr::Literal(expr) => expr.range,
            Expr::This(expr) => expr.range,
            Expr::Super(expr) => expr.range,
            Expr::FieldAccess(expr) => expr.range,
            Expr::MethodCall(expr) => expr.range,
            Expr::New(expr) => expr.range,
            Expr::NewArray(expr) => expr.range,
            Expr::ArrayInit(expr) => expr.range,
            Expr::ConstructorCall(expr) => expr.range,
            Expr::MethodRef(expr) => expr.range,
            Expr::Lambda(expr) => expr.range,
            Expr::Unary(expr) => expr.range,
            Expr::Binary(expr) => expr.range,
            Expr::Assign(expr) => expr.range,
            Expr::Conditional(expr) => expr.range,
            Expr::Cast(expr) => expr.range,
            Expr::InstanceOf(expr) => expr.range,
            Expr::ArrayAccess(expr) => expr.range,
            Expr::Paren(expr) => expr.range,
            Expr::ClassLiteral(expr) => expr.range,
            Expr::Switch(expr) => expr.block.range,
            Expr::Missing(expr) => expr.range,
        }
    }

    /// `a.b.c` style expressions flattened into a dotted name.
    pub fn as_qualified_name(&self) -> Option<String> {
        match self {
            Expr::Name(name) => Some(name.name.clone()),
            Expr::FieldAccess(access) => {
                let mut prefix = access.receiver.as_qualified_name()?;
                prefix.push('.');
                prefix.push_str(&access.name.text);
                Some(prefix)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameExpr {
    pub id: NodeId,
    pub name: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    TextBlock,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralExpr {
    pub id: NodeId,
    pub kind: LiteralKind,
    pub value: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThisExpr {
    pub id: NodeId,
    /// `Outer.this`.
    pub qualifier: Option<String>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperExpr {
    pub id: NodeId,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessExpr {
    pub id: NodeId,
    pub receiver: Box<Expr>,
    pub name: Name,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgList {
    pub id: NodeId,
    pub args: Vec<Expr>,
    /// Includes both parentheses.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCallExpr {
    pub id: NodeId,
    /// `None` for unqualified calls; `Expr::Super` for `super.m()`.
    pub receiver: Option<Box<Expr>>,
    pub name: Name,
    pub args: ArgList,
    pub range: TextRange,
}

impl MethodCallExpr {
    pub fn is_super_call(&self) -> bool {
        matches!(self.receiver.as_deref(), Some(Expr::Super(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpr {
    pub id: NodeId,
    pub outer: Option<Box<Expr>>,
    pub ty: TypeRef,
    pub args: ArgList,
    /// Anonymous class body.
    pub body: Option<ClassBody>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArrayExpr {
    pub id: NodeId,
    pub ty: TypeRef,
    pub dims: Vec<Expr>,
    pub init: Option<Box<Expr>>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInitExpr {
    pub id: NodeId,
    pub elements: Vec<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorCallKind {
    This,
    Super,
}

/// `this(..)` or `super(..)` as the first statement of a constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorCallExpr {
    pub id: NodeId,
    pub kind: ConstructorCallKind,
    pub args: ArgList,
    pub range: TextRange,
}

/// `Type::name`, `expr::name`, `Type::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRefExpr {
    pub id: NodeId,
    pub target: Box<Expr>,
    pub name: Name,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaParam {
    pub ty: Option<TypeRef>,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaExpr {
    pub id: NodeId,
    pub params: Vec<LambdaParam>,
    pub body: LambdaBody,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitNot,
    Plus,
    Minus,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Or
                | BinaryOp::And
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignExpr {
    pub id: NodeId,
    /// `=`, `+=`, `>>>=`, ...
    pub op: String,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpr {
    pub id: NodeId,
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastExpr {
    pub id: NodeId,
    pub ty: TypeRef,
    pub expr: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOfExpr {
    pub id: NodeId,
    pub expr: Box<Expr>,
    pub ty: TypeRef,
    /// Pattern binding: `x instanceof Foo f`.
    pub binding: Option<Name>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAccessExpr {
    pub id: NodeId,
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub id: NodeId,
    pub inner: Box<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLiteralExpr {
    pub id: NodeId,
    pub ty: TypeRef,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchExpr {
    pub id: NodeId,
    pub block: SwitchBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingExpr {
    pub id: NodeId,
    pub range: TextRange,
}

/// A `/** ... */` comment attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    pub range: TextRange,
    pub method_refs: Vec<DocMethodRef>,
}

/// `{@link Type#name(int, String s)}` / `@see #name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMethodRef {
    pub id: NodeId,
    pub qualifier: Option<TypeRef>,
    pub name: Name,
    /// `None` when the reference has no parenthesised parameter list.
    pub params: Option<DocParamList>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParamList {
    pub id: NodeId,
    pub params: Vec<DocParam>,
    /// Includes both parentheses.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub id: NodeId,
    pub ty: TypeRef,
    pub name: Option<Name>,
    pub range: TextRange,
}
