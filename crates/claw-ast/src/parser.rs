use crate::{Expr, Literal, ParseResult, Param, Stmt};
use claw_token::{Token, TokenTag};

/// Parse a token stream into a top-level statement list plus a collected
/// error list. Never panics: unparseable statements are skipped via
/// panic-mode recovery (resynchronize at the next `;`, `}`, or a token that
/// starts a new statement) so one bad statement doesn't swallow the rest of
/// the document.
pub fn parse(tokens: &[Token]) -> ParseResult {
    let mut p = Parser { tokens, pos: 0, errors: Vec::new() };
    let mut statements = Vec::new();
    while !p.is_at_end() {
        match p.statement() {
            Ok(stmt) => statements.push(stmt),
            Err(msg) => {
                p.errors.push(msg);
                p.synchronize();
            }
        }
    }
    ParseResult { statements, errors: p.errors }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<String>,
}

type PResult<T> = Result<T, String>;

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_tag(&self) -> TokenTag {
        self.peek().tag
    }

    fn is_at_end(&self) -> bool {
        self.peek_tag() == TokenTag::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, tag: TokenTag) -> bool {
        self.peek_tag() == tag
    }

    fn match_tag(&mut self, tag: TokenTag) -> bool {
        if self.check(tag) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tag: TokenTag, what: &str) -> PResult<Token> {
        if self.check(tag) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(format!(
                "expected {} at line {}, column {} but found '{}'",
                what, found.line, found.column, found.lexeme
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<Token> {
        self.expect(TokenTag::Ident, what)
    }

    fn synchronize(&mut self) {
        while !self.is_at_end() {
            let was_semi = self.peek_tag() == TokenTag::Semicolon;
            let cur = self.advance();
            if was_semi {
                return;
            }
            if matches!(
                self.peek_tag(),
                TokenTag::Let
                    | TokenTag::Fn
                    | TokenTag::Class
                    | TokenTag::If
                    | TokenTag::While
                    | TokenTag::For
                    | TokenTag::Return
                    | TokenTag::RBrace
            ) {
                return;
            }
            let _ = cur;
        }
    }

    // ---- statements ----

    fn statement(&mut self) -> PResult<Stmt> {
        match self.peek_tag() {
            TokenTag::Let => self.let_statement(),
            TokenTag::Fn => self.fn_statement(),
            TokenTag::Class => self.class_statement(),
            TokenTag::LBrace => Ok(Stmt::Block(self.block()?)),
            TokenTag::Return => self.return_statement(),
            TokenTag::If => self.if_statement(),
            TokenTag::While => self.while_statement(),
            TokenTag::For => self.for_statement(),
            TokenTag::Run => self.run_until_statement(),
            TokenTag::Try => self.try_catch_statement(),
            TokenTag::Throw => self.throw_statement(),
            TokenTag::Break | TokenTag::Continue => self.loop_control_statement(),
            _ => self.expr_statement(),
        }
    }

    fn let_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Let, "'let'")?;
        let name_token = self.expect_ident("a binding name")?;
        let name = name_token.lexeme.clone();
        let init = if self.match_tag(TokenTag::Eq) { Some(self.expression()?) } else { None };
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::Let { name, name_token, init })
    }

    fn fn_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Fn, "'fn'")?;
        let name_token = self.expect_ident("a function name")?;
        let name = name_token.lexeme.clone();
        let params = self.param_list()?;
        let body = self.block()?;
        Ok(Stmt::Fn { name, name_token, params, body })
    }

    fn class_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Class, "'class'")?;
        let name_token = self.expect_ident("a class name")?;
        let name = name_token.lexeme.clone();
        self.expect(TokenTag::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !self.check(TokenTag::RBrace) && !self.is_at_end() {
            if self.check(TokenTag::Init) {
                let init_token = self.advance();
                let params = self.param_list()?;
                let body = self.block()?;
                methods.push(Stmt::Fn {
                    name: "init".to_string(),
                    name_token: init_token,
                    params,
                    body,
                });
            } else if self.check(TokenTag::Fn) {
                methods.push(self.fn_statement()?);
            } else {
                return Err(format!(
                    "expected a method definition inside class '{}' at line {}",
                    name,
                    self.peek().line
                ));
            }
        }
        self.expect(TokenTag::RBrace, "'}'")?;
        Ok(Stmt::Class { name, name_token, methods })
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenTag::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(TokenTag::RBrace) && !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(msg) => {
                    self.errors.push(msg);
                    self.synchronize();
                }
            }
        }
        self.expect(TokenTag::RBrace, "'}'")?;
        Ok(statements)
    }

    fn param_list(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenTag::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenTag::RParen) {
            loop {
                let tok = self.expect_ident("a parameter name")?;
                params.push((tok.lexeme.clone(), tok));
                if !self.match_tag(TokenTag::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenTag::RParen, "')'")?;
        Ok(params)
    }

    fn return_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Return, "'return'")?;
        let value = if self.check(TokenTag::Semicolon) || self.check(TokenTag::RBrace) {
            None
        } else {
            Some(self.expression()?)
        };
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::Return(value))
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::If, "'if'")?;
        self.expect(TokenTag::LParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenTag::RParen, "')'")?;
        let then_branch = self.block()?;
        let else_branch = if self.match_tag(TokenTag::Else) {
            if self.check(TokenTag::If) {
                Some(vec![self.if_statement()?])
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::While, "'while'")?;
        self.expect(TokenTag::LParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenTag::RParen, "')'")?;
        let body = self.block()?;
        Ok(Stmt::While { cond, body })
    }

    fn for_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::For, "'for'")?;
        self.expect(TokenTag::LParen, "'('")?;
        let init = if self.check(TokenTag::Semicolon) {
            self.advance();
            None
        } else {
            let s = if self.check(TokenTag::Let) { self.let_statement()? } else { self.expr_statement()? };
            Some(Box::new(s))
        };
        let cond = if self.check(TokenTag::Semicolon) { None } else { Some(self.expression()?) };
        self.expect(TokenTag::Semicolon, "';'")?;
        let step = if self.check(TokenTag::RParen) { None } else { Some(self.expression()?) };
        self.expect(TokenTag::RParen, "')'")?;
        let body = self.block()?;
        Ok(Stmt::For { init, cond, step, body })
    }

    /// `run { body } until ( cond )` is the language's post-condition loop.
    /// The analyzer has no dataflow notion of "runs at least once", so this
    /// lowers to `Stmt::While` — sound for symbol/reference collection even
    /// though it loses the do-while-once distinction.
    fn run_until_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Run, "'run'")?;
        let body = self.block()?;
        self.expect(TokenTag::Until, "'until'")?;
        self.expect(TokenTag::LParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenTag::RParen, "')'")?;
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::While { cond, body })
    }

    /// `try { body } catch ( name ) { body }` lowers to two sequential
    /// blocks; the caught name still becomes a local binding so references
    /// to it inside the catch block resolve the same way they would with a
    /// dedicated `Try` statement variant.
    fn try_catch_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Try, "'try'")?;
        let try_body = self.block()?;
        let mut stmts = vec![Stmt::Block(try_body)];
        if self.match_tag(TokenTag::Catch) {
            self.expect(TokenTag::LParen, "'('")?;
            let name_token = self.expect_ident("a caught exception name")?;
            self.expect(TokenTag::RParen, "')'")?;
            let mut catch_body = self.block()?;
            catch_body.insert(
                0,
                Stmt::Let { name: name_token.lexeme.clone(), name_token, init: None },
            );
            stmts.push(Stmt::Block(catch_body));
        }
        Ok(Stmt::Block(stmts))
    }

    fn throw_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenTag::Throw, "'throw'")?;
        let value = self.expression()?;
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::Expr(value))
    }

    /// `break`/`continue` carry no identifiers and this engine does no
    /// control-flow analysis, so they lower to a no-op expression statement.
    fn loop_control_statement(&mut self) -> PResult<Stmt> {
        self.advance();
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::Expr(Expr::Literal { value: Literal::Nil, token: self.peek().clone() }))
    }

    fn expr_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        self.match_tag(TokenTag::Semicolon);
        Ok(Stmt::Expr(expr))
    }

    // ---- expressions ----

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.or_expr()?;
        if self.check(TokenTag::Eq)
            || self.check(TokenTag::PlusEq)
            || self.check(TokenTag::MinusEq)
            || self.check(TokenTag::StarEq)
            || self.check(TokenTag::SlashEq)
        {
            let op = self.advance();
            let value = self.assignment()?;
            if let Expr::Variable { name, token } = expr {
                let value = if op.tag == TokenTag::Eq {
                    value
                } else {
                    Expr::Binary {
                        left: Box::new(Expr::Variable { name: name.clone(), token: token.clone() }),
                        op: op.clone(),
                        right: Box::new(value),
                    }
                };
                return Ok(Expr::Assign { name, token, value: Box::new(value) });
            }
            return Err(format!("invalid assignment target at line {}", op.line));
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.and_expr()?;
        while self.check(TokenTag::OrOr) {
            let op = self.advance();
            let right = self.and_expr()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.check(TokenTag::AndAnd) {
            let op = self.advance();
            let right = self.equality()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        while self.check(TokenTag::EqEq) || self.check(TokenTag::NotEq) {
            let op = self.advance();
            let right = self.comparison()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.additive()?;
        while matches!(self.peek_tag(), TokenTag::Lt | TokenTag::LtEq | TokenTag::Gt | TokenTag::GtEq) {
            let op = self.advance();
            let right = self.additive()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn additive(&mut self) -> PResult<Expr> {
        let mut expr = self.multiplicative()?;
        while matches!(self.peek_tag(), TokenTag::Plus | TokenTag::Minus) {
            let op = self.advance();
            let right = self.multiplicative()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        while matches!(self.peek_tag(), TokenTag::Star | TokenTag::Slash | TokenTag::Percent) {
            let op = self.advance();
            let right = self.unary()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.check(TokenTag::Minus) {
            let op = self.advance();
            let operand = self.unary()?;
            return Ok(Expr::Unary { op, operand: Box::new(operand) });
        }
        self.call_or_postfix()
    }

    fn call_or_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.check(TokenTag::LParen) {
                let paren = self.advance();
                let mut args = Vec::new();
                if !self.check(TokenTag::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if !self.match_tag(TokenTag::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenTag::RParen, "')'")?;
                expr = Expr::Call { callee: Box::new(expr), args, paren };
            } else if self.check(TokenTag::Dot) {
                self.advance();
                let name_token = self.expect_ident("a member name")?;
                expr = Expr::Member { object: Box::new(expr), name: name_token.lexeme.clone(), token: name_token };
            } else if self.check(TokenTag::LBracket) {
                self.advance();
                let index = self.expression()?;
                self.expect(TokenTag::RBracket, "']'")?;
                expr = Expr::Index { object: Box::new(expr), index: Box::new(index) };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        match tok.tag {
            TokenTag::Number => {
                self.advance();
                let value = tok.lexeme.parse::<f64>().unwrap_or(0.0);
                Ok(Expr::Literal { value: Literal::Number(value), token: tok })
            }
            TokenTag::Str => {
                self.advance();
                Ok(Expr::Literal { value: Literal::Str(unescape_string(&tok.lexeme)), token: tok })
            }
            TokenTag::Bool => {
                self.advance();
                Ok(Expr::Literal { value: Literal::Bool(tok.lexeme == "true"), token: tok })
            }
            TokenTag::Nil => {
                self.advance();
                Ok(Expr::Literal { value: Literal::Nil, token: tok })
            }
            TokenTag::Ident => {
                self.advance();
                Ok(Expr::Variable { name: tok.lexeme.clone(), token: tok })
            }
            TokenTag::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenTag::RParen, "')'")?;
                Ok(Expr::Grouping { inner: Box::new(inner) })
            }
            TokenTag::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenTag::RBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if !self.match_tag(TokenTag::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenTag::RBracket, "']'")?;
                Ok(Expr::Array { elements })
            }
            TokenTag::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(TokenTag::RBrace) {
                    loop {
                        let key = self.expression()?;
                        self.expect(TokenTag::Colon, "':'")?;
                        let value = self.expression()?;
                        entries.push((key, value));
                        if !self.match_tag(TokenTag::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenTag::RBrace, "'}'")?;
                Ok(Expr::HashMap { entries })
            }
            TokenTag::Fn => {
                self.advance();
                let params = self.param_list()?;
                let body = self.block()?;
                Ok(Expr::Function { params, body })
            }
            _ => Err(format!(
                "unexpected token '{}' at line {}, column {}",
                tok.lexeme, tok.line, tok.column
            )),
        }
    }
}

fn unescape_string(lexeme: &str) -> String {
    let inner = lexeme.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_lexer::lex;

    fn parse_src(src: &str) -> ParseResult {
        parse(&lex(src))
    }

    #[test]
    fn parses_let_with_literal_init() {
        let result = parse_src("let x = 42\n");
        assert!(result.errors.is_empty());
        assert_eq!(result.statements.len(), 1);
        assert!(matches!(result.statements[0], Stmt::Let { .. }));
    }

    #[test]
    fn parses_function_declaration() {
        let result = parse_src("fn add(a, b) { return a + b; }");
        assert!(result.errors.is_empty());
        match &result.statements[0] {
            Stmt::Fn { name, params, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params.len(), 2);
            }
            other => panic!("expected Fn, got {other:?}"),
        }
    }

    #[test]
    fn reports_error_and_recovers() {
        let result = parse_src("let = ;\nlet y = 1;\n");
        assert!(!result.errors.is_empty());
        assert!(result.statements.iter().any(|s| matches!(s, Stmt::Let { name, .. } if name == "y")));
    }

    #[test]
    fn lowers_run_until_to_while() {
        let result = parse_src("run { let a = 1; } until (a)");
        assert!(result.errors.is_empty());
        assert!(matches!(result.statements[0], Stmt::While { .. }));
    }
}
