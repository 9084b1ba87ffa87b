//! Expression and statement productions.

use std::sync::Arc;

use rhea_ir::{Expr, FunctionDecl, Stmt, Token, TokenCategory};

use crate::{Parser, ParserError};

type ExprResult = Result<Arc<Expr>, ParserError>;
type StmtResult = Result<Arc<Stmt>, ParserError>;

const LOGIC_OR: &[&str] = &["||"];
const LOGIC_AND: &[&str] = &["&&"];
const BIT_OR: &[&str] = &["|", ".|"];
const BIT_XOR: &[&str] = &["^", ".^"];
const BIT_AND: &[&str] = &["&", ".&"];
const NIL_COALESCE: &[&str] = &["?"];
const EQUALITY: &[&str] = &["==", "!=", "::", "!:"];
const COMPARISON: &[&str] = &["<", ">", "<=", ">="];
const SHIFT: &[&str] = &["<<", ">>", ".<<", ".>>"];
const TERM: &[&str] = &["+", "-", ".+", ".-"];
const FACTOR: &[&str] = &["*", "/", "\\", "%", ".*", "./", ".%"];

impl Parser {
    // Expressions

    pub(crate) fn expression(&mut self) -> ExprResult {
        self.expr_assignment()
    }

    /// Assignment is right-associative; every other binary level is left.
    fn expr_assignment(&mut self) -> ExprResult {
        let left = self.expr_logic_or()?;

        if self.is_next_operator("=") {
            let address = self.consume_image("=")?;
            let right = self.expr_assignment()?;
            return Ok(Arc::new(Expr::Binary {
                address,
                operator: "=".to_string(),
                left,
                right,
            }));
        }
        Ok(left)
    }

    fn binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> ExprResult,
    ) -> ExprResult {
        let mut left = next(self)?;

        loop {
            let Some(&op) = operators.iter().find(|&&op| self.is_next_operator(op)) else {
                break;
            };
            let address = self.consume_image(op)?;
            let right = next(self)?;
            left = Arc::new(Expr::Binary {
                address,
                operator: op.to_string(),
                left,
                right,
            });
        }
        Ok(left)
    }

    fn expr_logic_or(&mut self) -> ExprResult {
        self.binary_level(LOGIC_OR, Self::expr_logic_and)
    }

    fn expr_logic_and(&mut self) -> ExprResult {
        self.binary_level(LOGIC_AND, Self::expr_bit_or)
    }

    fn expr_bit_or(&mut self) -> ExprResult {
        self.binary_level(BIT_OR, Self::expr_bit_xor)
    }

    fn expr_bit_xor(&mut self) -> ExprResult {
        self.binary_level(BIT_XOR, Self::expr_bit_and)
    }

    fn expr_bit_and(&mut self) -> ExprResult {
        self.binary_level(BIT_AND, Self::expr_nil_coalescing)
    }

    fn expr_nil_coalescing(&mut self) -> ExprResult {
        self.binary_level(NIL_COALESCE, Self::expr_equality)
    }

    fn expr_equality(&mut self) -> ExprResult {
        self.binary_level(EQUALITY, Self::expr_comparison)
    }

    fn expr_comparison(&mut self) -> ExprResult {
        self.binary_level(COMPARISON, Self::expr_shift)
    }

    fn expr_shift(&mut self) -> ExprResult {
        self.binary_level(SHIFT, Self::expr_term)
    }

    fn expr_term(&mut self) -> ExprResult {
        self.binary_level(TERM, Self::expr_factor)
    }

    fn expr_factor(&mut self) -> ExprResult {
        self.binary_level(FACTOR, Self::expr_unary)
    }

    fn expr_unary(&mut self) -> ExprResult {
        for op in ["+", "-", "!", "~", "*"] {
            if self.is_next_operator(op) {
                let address = self.consume_image(op)?;
                let expression = self.expr_unary()?;
                return Ok(Arc::new(Expr::Unary {
                    address,
                    operator: op.to_string(),
                    expression,
                }));
            }
        }
        self.expr_primary()
    }

    fn expr_primary(&mut self) -> ExprResult {
        let token = self.current()?.clone();

        let mut expr = match token.category() {
            TokenCategory::Digit => {
                self.advance();
                let value = rhea_lexer::translate_digit(token.image())
                    .map_err(|message| ParserError::new(Some(token.clone()), message))?;
                Arc::new(Expr::NumberLiteral {
                    address: token,
                    value,
                })
            }
            TokenCategory::String => {
                self.advance();
                let value = token.image().to_string();
                Arc::new(Expr::StringLiteral {
                    address: token,
                    value,
                })
            }
            TokenCategory::Regex => {
                self.advance();
                let pattern = token.image().to_string();
                Arc::new(Expr::RegexLiteral {
                    address: token,
                    pattern,
                })
            }
            TokenCategory::Identifier => {
                let address = self.consume_dotted_identifier()?;
                Arc::new(Expr::VariableAccess { address })
            }
            TokenCategory::Keyword => self.expr_keyword(&token)?,
            TokenCategory::Operator => match token.image() {
                "(" => {
                    self.advance();
                    let inner = self.expression()?;
                    self.consume_image(")")?;
                    inner
                }
                "[" => self.expr_array()?,
                "{" => self.expr_block()?,
                other => {
                    return Err(ParserError::new(
                        Some(token.clone()),
                        format!("Expecting expression, got `{other}`."),
                    ))
                }
            },
        };

        // Postfix: call and index chains bind tighter than any operator.
        loop {
            if self.is_next_operator("(") {
                expr = self.expr_function_call(expr)?;
            } else if self.is_next_operator("[") {
                expr = self.expr_array_access(expr)?;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn expr_keyword(&mut self, token: &Token) -> ExprResult {
        match token.image() {
            "true" | "false" => {
                self.advance();
                Ok(Arc::new(Expr::BooleanLiteral {
                    address: token.clone(),
                    value: token.image() == "true",
                }))
            }
            "nil" => {
                self.advance();
                Ok(Arc::new(Expr::NilLiteral {
                    address: token.clone(),
                }))
            }
            "if" => self.expr_if(),
            "unless" => self.expr_unless(),
            "when" => self.expr_when(),
            "while" => self.expr_while(),
            "loop" => self.expr_loop(),
            "func" => self.expr_function_decl(),
            "parallel" => self.expr_parallel(),
            "random" => self.expr_random(),
            "render" => self.expr_render(),
            "type" => self.expr_type(),
            "size" => self.expr_size(),
            "lock" => self.expr_lock(),
            "catch" => self.expr_catch_handle(),
            "val" => self.expr_val(),
            "break" | "continue" | "ret" | "throw" | "wait" | "halt" | "delete" | "enum"
            | "mod" | "use" | "import" | "test" => {
                let statement = self.statement()?;
                Ok(Arc::new(Expr::SingleStatement {
                    address: token.clone(),
                    statement,
                }))
            }
            other => Err(ParserError::new(
                Some(token.clone()),
                format!("Keyword `{other}` is not valid here."),
            )),
        }
    }

    fn expr_array(&mut self) -> ExprResult {
        let address = self.consume_image("[")?;
        let mut elements = Vec::new();

        while !self.is_next_operator("]") {
            elements.push(self.expression()?);
            if !self.is_next_operator("]") {
                self.consume_image(",")?;
            }
        }
        self.consume_image("]")?;

        Ok(Arc::new(Expr::ArrayLiteral { address, elements }))
    }

    fn expr_block(&mut self) -> ExprResult {
        let address = self.consume_image("{")?;
        let mut statements = Vec::new();

        while !self.is_next_operator("}") {
            statements.push(self.statement()?);
        }
        self.consume_image("}")?;

        Ok(Arc::new(Expr::Block {
            address,
            statements,
        }))
    }

    fn expr_if(&mut self) -> ExprResult {
        let address = self.consume_image("if")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;
        let then_branch = self.expression()?;

        let else_branch = if self.is_next_keyword("else") {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Arc::new(Expr::If {
            address,
            condition,
            then_branch,
            else_branch,
        }))
    }

    fn expr_unless(&mut self) -> ExprResult {
        let address = self.consume_image("unless")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;
        let then_branch = self.expression()?;

        let else_branch = if self.is_next_keyword("else") {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Arc::new(Expr::Unless {
            address,
            condition,
            then_branch,
            else_branch,
        }))
    }

    fn expr_when(&mut self) -> ExprResult {
        let address = self.consume_image("when")?;
        self.consume_image("(")?;
        let expression = self.expression()?;
        self.consume_image(")")?;
        self.consume_image("{")?;

        let mut cases = Vec::new();
        let mut default_case = None;

        while !self.is_next_operator("}") {
            if self.is_next_keyword("else") {
                self.advance();
                self.consume_image("=>")?;
                default_case = Some(self.expression()?);
            } else {
                let case = self.expression()?;
                self.consume_image("=>")?;
                let body = self.expression()?;
                cases.push((case, body));
            }

            if !self.is_next_operator("}") {
                self.consume_image(",")?;
            }
        }
        self.consume_image("}")?;

        Ok(Arc::new(Expr::When {
            address,
            expression,
            cases,
            default_case,
        }))
    }

    fn expr_while(&mut self) -> ExprResult {
        let address = self.consume_image("while")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;
        let body = self.expression()?;

        Ok(Arc::new(Expr::While {
            address,
            condition,
            body,
        }))
    }

    fn expr_loop(&mut self) -> ExprResult {
        let address = self.consume_image("loop")?;
        self.consume_image("(")?;
        let initial = self.expression()?;
        self.consume_image(";")?;
        let condition = self.expression()?;
        self.consume_image(";")?;
        let postexpr = self.expression()?;
        self.consume_image(")")?;
        let body = self.expression()?;

        Ok(Arc::new(Expr::Loop {
            address,
            initial,
            condition,
            postexpr,
            body,
        }))
    }

    fn expr_function_decl(&mut self) -> ExprResult {
        let address = self.consume_image("func")?;
        self.consume_image("(")?;

        let mut parameters = Vec::new();
        while !self.is_next_operator(")") {
            parameters.push(self.consume_category(TokenCategory::Identifier)?);
            if !self.is_next_operator(")") {
                self.consume_image(",")?;
            }
        }
        self.consume_image(")")?;
        let body = self.expression()?;

        Ok(Arc::new(Expr::FunctionDecl(Arc::new(FunctionDecl {
            address,
            parameters,
            body,
        }))))
    }

    fn expr_function_call(&mut self, callable: Arc<Expr>) -> ExprResult {
        let address = self.consume_image("(")?;
        let mut arguments = Vec::new();

        while !self.is_next_operator(")") {
            arguments.push(self.expression()?);
            if !self.is_next_operator(")") {
                self.consume_image(",")?;
            }
        }
        self.consume_image(")")?;

        Ok(Arc::new(Expr::FunctionCall {
            address,
            callable,
            arguments,
        }))
    }

    fn expr_array_access(&mut self, array: Arc<Expr>) -> ExprResult {
        let address = self.consume_image("[")?;
        let index = self.expression()?;
        self.consume_image("]")?;

        Ok(Arc::new(Expr::ArrayAccess {
            address,
            array,
            index,
        }))
    }

    fn expr_parallel(&mut self) -> ExprResult {
        let address = self.consume_image("parallel")?;
        let expression = self.expression()?;
        Ok(Arc::new(Expr::Parallel {
            address,
            expression,
        }))
    }

    fn expr_random(&mut self) -> ExprResult {
        let address = self.consume_image("random")?;
        let then_branch = self.expression()?;

        let else_branch = if self.is_next_keyword("else") {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Arc::new(Expr::Random {
            address,
            then_branch,
            else_branch,
        }))
    }

    fn expr_render(&mut self) -> ExprResult {
        let address = self.consume_image("render")?;
        let to_error = if self.is_next_operator("!") {
            self.advance();
            true
        } else {
            false
        };
        let expression = self.expression()?;

        Ok(Arc::new(Expr::Render {
            address,
            to_error,
            newline: true,
            expression,
        }))
    }

    fn expr_type(&mut self) -> ExprResult {
        let address = self.consume_image("type")?;
        let expression = self.expression()?;
        Ok(Arc::new(Expr::TypeOf {
            address,
            expression,
        }))
    }

    fn expr_size(&mut self) -> ExprResult {
        let address = self.consume_image("size")?;
        let expression = self.expression()?;
        Ok(Arc::new(Expr::Size {
            address,
            expression,
        }))
    }

    fn expr_lock(&mut self) -> ExprResult {
        let address = self.consume_image("lock")?;
        self.consume_image("(")?;
        let name = self.consume_category(TokenCategory::Identifier)?;
        self.consume_image(")")?;
        let body = self.expression()?;

        Ok(Arc::new(Expr::Lock {
            address,
            name,
            body,
        }))
    }

    fn expr_catch_handle(&mut self) -> ExprResult {
        let address = self.consume_image("catch")?;
        let catch_block = self.expression()?;
        self.consume_image("handle")?;
        self.consume_image("(")?;
        let handler = self.consume_category(TokenCategory::Identifier)?;
        self.consume_image(")")?;
        let handle_block = self.expression()?;

        let final_block = if self.is_next_image("final") {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Arc::new(Expr::CatchHandle {
            address,
            catch_block,
            handler,
            handle_block,
            final_block,
        }))
    }

    /// `val a = e, b = e;` or the native form `val f@"lib" = dotted.symbol;`.
    ///
    /// The library path after `@` applies to every binding of the
    /// declaration.
    fn expr_val(&mut self) -> ExprResult {
        let address = self.consume_image("val")?;
        let first = self.consume_category(TokenCategory::Identifier)?;

        if self.is_next_operator("@") {
            self.advance();
            let library = self
                .consume_category(TokenCategory::String)?
                .image()
                .to_string();

            let mut declarations = Vec::new();
            self.consume_image("=")?;
            let symbol = self.consume_dotted_identifier()?;
            declarations.push((first, symbol.image().to_string()));

            while self.is_next_operator(",") {
                self.advance();
                let name = self.consume_category(TokenCategory::Identifier)?;
                self.consume_image("=")?;
                let symbol = self.consume_dotted_identifier()?;
                declarations.push((name, symbol.image().to_string()));
            }

            return Ok(Arc::new(Expr::NativeDecl {
                address,
                library,
                declarations,
            }));
        }

        let mut declarations = Vec::new();
        self.consume_image("=")?;
        declarations.push((first, self.expression()?));

        while self.is_next_operator(",") {
            self.advance();
            let name = self.consume_category(TokenCategory::Identifier)?;
            self.consume_image("=")?;
            declarations.push((name, self.expression()?));
        }

        Ok(Arc::new(Expr::VariableDecl {
            address,
            declarations,
        }))
    }

    // Statements

    pub(crate) fn statement(&mut self) -> StmtResult {
        let token = self.current()?.clone();

        if token.category() == TokenCategory::Keyword {
            match token.image() {
                "break" => return self.stmt_break(),
                "continue" => return self.stmt_continue(),
                "ret" => return self.stmt_ret(),
                "throw" => return self.stmt_throw(),
                "wait" => return self.stmt_wait(),
                "halt" => return self.stmt_halt(),
                "delete" => return self.stmt_delete(),
                "enum" => return self.stmt_enum(),
                "mod" => return self.stmt_mod(),
                "use" => return self.stmt_use(),
                "import" => return self.stmt_import(),
                "test" => return self.stmt_test(),
                _ => {}
            }
        }

        let expression = self.expression()?;
        if self.is_next_operator(";") {
            self.advance();
        }
        Ok(Arc::new(Stmt::Expression { expression }))
    }

    fn stmt_break(&mut self) -> StmtResult {
        let address = self.consume_image("break")?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Break { address }))
    }

    fn stmt_continue(&mut self) -> StmtResult {
        let address = self.consume_image("continue")?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Continue { address }))
    }

    fn stmt_ret(&mut self) -> StmtResult {
        let address = self.consume_image("ret")?;
        let expression = self.expression()?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Return {
            address,
            expression,
        }))
    }

    fn stmt_throw(&mut self) -> StmtResult {
        let address = self.consume_image("throw")?;
        let expression = self.expression()?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Throw {
            address,
            expression,
        }))
    }

    fn stmt_wait(&mut self) -> StmtResult {
        let address = self.consume_image("wait")?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Wait { address }))
    }

    fn stmt_halt(&mut self) -> StmtResult {
        let address = self.consume_image("halt")?;
        self.consume_image(";")?;
        Ok(Arc::new(Stmt::Halt { address }))
    }

    fn stmt_delete(&mut self) -> StmtResult {
        let address = self.consume_image("delete")?;

        let mut names = vec![self.consume_dotted_identifier()?];
        while self.is_next_operator(",") {
            self.advance();
            names.push(self.consume_dotted_identifier()?);
        }
        self.consume_image(";")?;

        Ok(Arc::new(Stmt::Delete { address, names }))
    }

    fn stmt_enum(&mut self) -> StmtResult {
        let address = self.consume_image("enum")?;
        let name = self.consume_category(TokenCategory::Identifier)?;
        self.consume_image("{")?;

        let mut items = Vec::new();
        while !self.is_next_operator("}") {
            let item = self.consume_category(TokenCategory::Identifier)?;
            self.consume_image("=")?;
            items.push((item, self.expression()?));

            if !self.is_next_operator("}") {
                self.consume_image(",")?;
            }
        }
        self.consume_image("}")?;

        Ok(Arc::new(Stmt::Enum {
            address,
            name,
            items,
        }))
    }

    fn stmt_mod(&mut self) -> StmtResult {
        let address = self.consume_image("mod")?;
        let name = self.consume_category(TokenCategory::Identifier)?;
        self.consume_image("{")?;

        let mut members = Vec::new();
        while !self.is_next_operator("}") {
            let member = self.consume_category(TokenCategory::Identifier)?;
            self.consume_image("=")?;
            members.push((member, self.expression()?));
            self.consume_image(";")?;
        }
        self.consume_image("}")?;

        Ok(Arc::new(Stmt::Mod {
            address,
            name,
            members,
        }))
    }

    fn stmt_use(&mut self) -> StmtResult {
        let address = self.consume_image("use")?;
        let name = self.consume_dotted_identifier()?;
        self.consume_image("from")?;
        let version = self.expression()?;
        self.consume_image(";")?;

        Ok(Arc::new(Stmt::Use {
            address,
            name,
            version,
        }))
    }

    fn stmt_import(&mut self) -> StmtResult {
        let address = self.consume_image("import")?;
        let path = self.expression()?;
        self.consume_image(";")?;

        Ok(Arc::new(Stmt::Import { address, path }))
    }

    fn stmt_test(&mut self) -> StmtResult {
        let address = self.consume_image("test")?;
        let name = self.expression()?;
        self.consume_image("assert")?;
        let assertion = self.expression()?;
        let body = self.expression()?;
        if self.is_next_operator(";") {
            self.advance();
        }

        Ok(Arc::new(Stmt::Test {
            address,
            name,
            assertion,
            body,
        }))
    }
}
