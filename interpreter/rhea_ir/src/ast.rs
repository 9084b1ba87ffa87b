//! AST node hierarchy.
//!
//! One enum per syntactic class (expressions and statements) instead of the
//! class-per-node arrangement a dynamic-dispatch design would use. Child
//! nodes are shared through `Arc` because a function body may be evaluated
//! many times, possibly from several threads at once.

use std::sync::Arc;

use crate::Token;

/// A function declaration, kept behind `Arc` so the Function value it
/// produces can reference the declaration site after the enclosing
/// expression tree is gone.
#[derive(Debug)]
pub struct FunctionDecl {
    /// The `func` keyword token; identifies the declaration site.
    pub address: Token,
    /// Parameter names, in order.
    pub parameters: Vec<Token>,
    /// The body expression, usually a block.
    pub body: Arc<Expr>,
}

/// Expression nodes. Every variant carries its address token for error
/// locations.
#[derive(Debug)]
pub enum Expr {
    ArrayLiteral {
        address: Token,
        elements: Vec<Arc<Expr>>,
    },
    ArrayAccess {
        address: Token,
        array: Arc<Expr>,
        index: Arc<Expr>,
    },
    Binary {
        address: Token,
        operator: String,
        left: Arc<Expr>,
        right: Arc<Expr>,
    },
    Block {
        address: Token,
        statements: Vec<Arc<Stmt>>,
    },
    BooleanLiteral {
        address: Token,
        value: bool,
    },
    NumberLiteral {
        address: Token,
        value: f64,
    },
    StringLiteral {
        address: Token,
        value: String,
    },
    NilLiteral {
        address: Token,
    },
    /// Regex literal; the pattern compiles on first evaluation.
    RegexLiteral {
        address: Token,
        pattern: String,
    },
    FunctionDecl(Arc<FunctionDecl>),
    FunctionCall {
        address: Token,
        callable: Arc<Expr>,
        arguments: Vec<Arc<Expr>>,
    },
    If {
        address: Token,
        condition: Arc<Expr>,
        then_branch: Arc<Expr>,
        else_branch: Option<Arc<Expr>>,
    },
    Unless {
        address: Token,
        condition: Arc<Expr>,
        then_branch: Arc<Expr>,
        else_branch: Option<Arc<Expr>>,
    },
    When {
        address: Token,
        expression: Arc<Expr>,
        cases: Vec<(Arc<Expr>, Arc<Expr>)>,
        default_case: Option<Arc<Expr>>,
    },
    Loop {
        address: Token,
        initial: Arc<Expr>,
        condition: Arc<Expr>,
        postexpr: Arc<Expr>,
        body: Arc<Expr>,
    },
    While {
        address: Token,
        condition: Arc<Expr>,
        body: Arc<Expr>,
    },
    /// Unbiased coin flip choosing between the branches on every evaluation.
    Random {
        address: Token,
        then_branch: Arc<Expr>,
        else_branch: Option<Arc<Expr>>,
    },
    Render {
        address: Token,
        to_error: bool,
        newline: bool,
        expression: Arc<Expr>,
    },
    Size {
        address: Token,
        expression: Arc<Expr>,
    },
    TypeOf {
        address: Token,
        expression: Arc<Expr>,
    },
    Unary {
        address: Token,
        operator: String,
        expression: Arc<Expr>,
    },
    /// The name is the address token's image.
    VariableAccess {
        address: Token,
    },
    VariableDecl {
        address: Token,
        declarations: Vec<(Token, Arc<Expr>)>,
    },
    /// `val name@"lib" = dotted.symbol;` — binds natives from a shared library.
    NativeDecl {
        address: Token,
        library: String,
        declarations: Vec<(Token, String)>,
    },
    Parallel {
        address: Token,
        expression: Arc<Expr>,
    },
    CatchHandle {
        address: Token,
        catch_block: Arc<Expr>,
        handler: Token,
        handle_block: Arc<Expr>,
        final_block: Option<Arc<Expr>>,
    },
    Lock {
        address: Token,
        name: Token,
        body: Arc<Expr>,
    },
    /// A statement in expression position; catches `ret` and yields its value.
    SingleStatement {
        address: Token,
        statement: Arc<Stmt>,
    },
}

/// Statement nodes.
#[derive(Debug)]
pub enum Stmt {
    Break {
        address: Token,
    },
    Continue {
        address: Token,
    },
    Return {
        address: Token,
        expression: Arc<Expr>,
    },
    Throw {
        address: Token,
        expression: Arc<Expr>,
    },
    /// Join every pending parallel task reachable from the current scope.
    Wait {
        address: Token,
    },
    Halt {
        address: Token,
    },
    Delete {
        address: Token,
        names: Vec<Token>,
    },
    Enum {
        address: Token,
        name: Token,
        items: Vec<(Token, Arc<Expr>)>,
    },
    Mod {
        address: Token,
        name: Token,
        members: Vec<(Token, Arc<Expr>)>,
    },
    /// `use name from "x.y.z";` — versioned module import.
    Use {
        address: Token,
        name: Token,
        version: Arc<Expr>,
    },
    /// `import "path";` — non-module file import into the current scope.
    Import {
        address: Token,
        path: Arc<Expr>,
    },
    Test {
        address: Token,
        name: Arc<Expr>,
        assertion: Arc<Expr>,
        body: Arc<Expr>,
    },
    Expression {
        expression: Arc<Expr>,
    },
}

impl Expr {
    /// The token identifying this node's source location.
    pub fn address(&self) -> &Token {
        match self {
            Expr::ArrayLiteral { address, .. }
            | Expr::ArrayAccess { address, .. }
            | Expr::Binary { address, .. }
            | Expr::Block { address, .. }
            | Expr::BooleanLiteral { address, .. }
            | Expr::NumberLiteral { address, .. }
            | Expr::StringLiteral { address, .. }
            | Expr::NilLiteral { address }
            | Expr::RegexLiteral { address, .. }
            | Expr::FunctionCall { address, .. }
            | Expr::If { address, .. }
            | Expr::Unless { address, .. }
            | Expr::When { address, .. }
            | Expr::Loop { address, .. }
            | Expr::While { address, .. }
            | Expr::Random { address, .. }
            | Expr::Render { address, .. }
            | Expr::Size { address, .. }
            | Expr::TypeOf { address, .. }
            | Expr::Unary { address, .. }
            | Expr::VariableAccess { address }
            | Expr::VariableDecl { address, .. }
            | Expr::NativeDecl { address, .. }
            | Expr::Parallel { address, .. }
            | Expr::CatchHandle { address, .. }
            | Expr::Lock { address, .. }
            | Expr::SingleStatement { address, .. } => address,
            Expr::FunctionDecl(decl) => &decl.address,
        }
    }
}

impl Stmt {
    /// The token identifying this node's source location.
    pub fn address(&self) -> &Token {
        match self {
            Stmt::Break { address }
            | Stmt::Continue { address }
            | Stmt::Return { address, .. }
            | Stmt::Throw { address, .. }
            | Stmt::Wait { address }
            | Stmt::Halt { address }
            | Stmt::Delete { address, .. }
            | Stmt::Enum { address, .. }
            | Stmt::Mod { address, .. }
            | Stmt::Use { address, .. }
            | Stmt::Import { address, .. }
            | Stmt::Test { address, .. } => address,
            Stmt::Expression { expression } => expression.address(),
        }
    }
}
