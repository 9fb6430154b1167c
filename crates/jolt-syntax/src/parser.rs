use jolt_core::TextRange;

use crate::ast::{self, NodeId};
use crate::lexer::{Lexed, RawDoc, Token, TokenKind};
use crate::names::{is_keyword, is_primitive_type};
use crate::Diagnostic;

pub(crate) struct Parser<'t> {
    pub(crate) text: &'t str,
    tokens: Vec<Token>,
    docs: Vec<RawDoc>,
    pos: usize,
    next_id: u32,
    /// Set while parsing `case` labels, where `A -> ..` is not a lambda.
    no_lambda: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str, lexed: Lexed) -> Self {
        Parser {
            text,
            tokens: lexed.tokens,
            docs: lexed.docs,
            pos: 0,
            next_id: 0,
            no_lambda: false,
            diagnostics: lexed.errors,
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|diag| diag.range.map(|range| range.start).unwrap_or(0));
        self.diagnostics
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    pub(crate) fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.nth(n).map(|token| token.kind)
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.nth_kind(0) == Some(kind)
    }

    fn nth_is(&self, n: usize, kind: TokenKind) -> bool {
        self.nth_kind(n) == Some(kind)
    }

    fn nth_keyword(&self, n: usize, keyword: &str) -> bool {
        self.nth(n)
            .is_some_and(|token| token.kind == TokenKind::Ident && token.text == keyword)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.nth_keyword(0, keyword)
    }

    /// Identifier that may name a variable, method or type.
    fn nth_is_plain_ident(&self, n: usize) -> bool {
        self.nth(n)
            .is_some_and(|token| token.kind == TokenKind::Ident && !is_keyword(&token.text))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn current_start(&self) -> usize {
        self.peek().map(|token| token.range.start).unwrap_or(self.text.len())
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            return 0;
        }
        self.tokens
            .get(self.pos - 1)
            .map(|token| token.range.end)
            .unwrap_or(self.text.len())
    }

    fn range_from(&self, start: usize) -> TextRange {
        TextRange::new(start, self.prev_end().max(start))
    }

    /// Whether token `n` ends exactly where token `n + 1` starts.
    fn adjacent(&self, n: usize) -> bool {
        match (self.nth(n), self.nth(n + 1)) {
            (Some(a), Some(b)) => a.range.end == b.range.start,
            _ => false,
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let range = match self.peek() {
            Some(token) => token.range,
            None => TextRange::empty(self.text.len()),
        };
        self.diagnostics
            .push(Diagnostic::error("syntax-error", message, Some(range)));
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.at_kind(kind) {
            return self.bump();
        }
        self.error_here(format!("expected {what}"));
        None
    }

    fn name_from(&mut self, token: Token) -> ast::Name {
        ast::Name {
            id: self.alloc(),
            text: token.text,
            range: token.range,
        }
    }

    fn expect_name(&mut self) -> ast::Name {
        if self.nth_is_plain_ident(0) {
            if let Some(token) = self.bump() {
                return self.name_from(token);
            }
        }
        self.error_here("expected identifier");
        let at = self.current_start();
        ast::Name {
            id: self.alloc(),
            text: String::new(),
            range: TextRange::empty(at),
        }
    }

    fn missing(&mut self) -> ast::Expr {
        self.error_here("expected expression");
        let at = self.current_start();
        ast::Expr::Missing(ast::MissingExpr {
            id: self.alloc(),
            range: TextRange::empty(at),
        })
    }

    fn take_doc(&mut self) -> Option<ast::DocComment> {
        let index = self.peek()?.doc?;
        let raw = self.docs.get(index)?.clone();
        Some(self.parse_doc_comment(raw.range))
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    pub(crate) fn parse_compilation_unit(&mut self) -> ast::CompilationUnit {
        let package = if self.at_keyword("package") {
            Some(self.parse_package_decl())
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at_keyword("import") {
            imports.push(self.parse_import_decl());
        }

        let mut types = Vec::new();
        while !self.is_eof() {
            if self.at_kind(TokenKind::Semi) {
                self.bump();
                continue;
            }
            if let Some(decl) = self.parse_type_decl() {
                types.push(decl);
            } else {
                self.error_here("expected type declaration");
                self.bump();
            }
        }

        ast::CompilationUnit {
            package,
            imports,
            types,
            range: TextRange::new(0, self.text.len()),
        }
    }

    fn parse_package_decl(&mut self) -> ast::PackageDecl {
        let start = self.current_start();
        self.bump();
        let (name, _) = self.parse_qualified_name();
        self.expect(TokenKind::Semi, "`;`");
        ast::PackageDecl {
            name,
            range: self.range_from(start),
        }
    }

    fn parse_import_decl(&mut self) -> ast::ImportDecl {
        let start = self.current_start();
        self.bump();
        let is_static = if self.at_keyword("static") {
            self.bump();
            true
        } else {
            false
        };

        let mut parts = Vec::new();
        let mut is_star = false;
        if let Some(first) = self.expect(TokenKind::Ident, "import path") {
            parts.push(first.text);
        }
        while self.at_kind(TokenKind::Dot) {
            self.bump();
            if self.at_kind(TokenKind::Star) {
                self.bump();
                is_star = true;
                break;
            }
            match self.expect(TokenKind::Ident, "identifier") {
                Some(part) => parts.push(part.text),
                None => break,
            }
        }
        self.expect(TokenKind::Semi, "`;`");

        ast::ImportDecl {
            is_static,
            is_star,
            path: parts.join("."),
            range: self.range_from(start),
        }
    }

    fn parse_qualified_name(&mut self) -> (String, TextRange) {
        let start = self.current_start();
        let mut parts = Vec::new();
        if let Some(first) = self.expect(TokenKind::Ident, "name") {
            parts.push(first.text);
        }
        while self.at_kind(TokenKind::Dot) && self.nth_is(1, TokenKind::Ident) {
            self.bump();
            if let Some(part) = self.bump() {
                parts.push(part.text);
            }
        }
        (parts.join("."), self.range_from(start))
    }

    fn type_decl_kind_here(&self) -> Option<(ast::TypeKind, usize)> {
        if self.at_kind(TokenKind::At) && self.nth_keyword(1, "interface") {
            return Some((ast::TypeKind::Annotation, 2));
        }
        let token = self.peek()?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        match token.text.as_str() {
            "class" => Some((ast::TypeKind::Class, 1)),
            "interface" => Some((ast::TypeKind::Interface, 1)),
            "enum" => Some((ast::TypeKind::Enum, 1)),
            "record" if self.nth_is_plain_ident(1)
                && matches!(self.nth_kind(2), Some(TokenKind::LParen | TokenKind::Lt)) =>
            {
                Some((ast::TypeKind::Record, 1))
            }
            _ => None,
        }
    }

    fn parse_type_decl(&mut self) -> Option<ast::TypeDecl> {
        let start_pos = self.pos;
        let start = self.current_start();
        let doc = self.take_doc();
        let modifiers = self.parse_modifiers();

        let Some((kind, keyword_tokens)) = self.type_decl_kind_here() else {
            self.pos = start_pos;
            return None;
        };
        for _ in 0..keyword_tokens {
            self.bump();
        }

        let id = self.alloc();
        let name = self.expect_name();
        let type_params = if self.at_kind(TokenKind::Lt) {
            self.parse_type_params().0
        } else {
            Vec::new()
        };

        if kind == ast::TypeKind::Record && self.at_kind(TokenKind::LParen) {
            self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
        }

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        loop {
            if self.at_keyword("extends") {
                self.bump();
                extends = self.parse_type_list();
            } else if self.at_keyword("implements") {
                self.bump();
                implements = self.parse_type_list();
            } else if self.at_keyword("permits") {
                self.bump();
                self.parse_type_list();
            } else {
                break;
            }
        }

        let body = self.parse_class_body(kind, &name.text);
        Some(ast::TypeDecl {
            id,
            kind,
            doc,
            modifiers,
            name,
            type_params,
            extends,
            implements,
            range: TextRange::new(start, body.range.end.max(start)),
            body,
        })
    }

    fn parse_type_list(&mut self) -> Vec<ast::TypeRef> {
        let mut types = Vec::new();
        loop {
            match self.parse_type_ref(false) {
                Some(ty) => types.push(ty),
                None => {
                    self.error_here("expected type");
                    break;
                }
            }
            if self.at_kind(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        types
    }

    /// `<T, U extends Comparable<U>>`: returns the declared names and the range.
    fn parse_type_params(&mut self) -> (Vec<String>, TextRange) {
        let start = self.current_start();
        let mut names = Vec::new();
        self.bump();
        let mut depth = 1usize;
        let mut expect_name = true;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Comma if depth == 1 => expect_name = true,
                TokenKind::Ident if depth == 1 && expect_name => {
                    names.push(token.text);
                    expect_name = false;
                }
                _ => {}
            }
        }
        (names, self.range_from(start))
    }

    fn parse_modifiers(&mut self) -> ast::Modifiers {
        let mut modifiers = ast::Modifiers::default();
        loop {
            if self.at_kind(TokenKind::At) && !self.nth_keyword(1, "interface") {
                let start = self.current_start();
                self.bump();
                let (name, _) = self.parse_qualified_name();
                if self.at_kind(TokenKind::LParen) {
                    self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
                }
                modifiers.annotations.push(ast::Annotation {
                    name,
                    range: self.range_from(start),
                });
                continue;
            }

            if self.at_keyword("non")
                && self.nth_is(1, TokenKind::Minus)
                && self.nth_keyword(2, "sealed")
            {
                let start = self.current_start();
                self.bump();
                self.bump();
                self.bump();
                modifiers.keywords.push(ast::ModifierKeyword {
                    modifier: ast::Modifier::NonSealed,
                    range: self.range_from(start),
                });
                continue;
            }

            let Some(token) = self.peek() else { break };
            if token.kind != TokenKind::Ident {
                break;
            }
            let Some(modifier) = ast::Modifier::from_keyword(&token.text) else {
                break;
            };
            if modifier == ast::Modifier::Static && self.nth_is(1, TokenKind::LBrace) {
                break;
            }
            let range = token.range;
            self.bump();
            modifiers.keywords.push(ast::ModifierKeyword { modifier, range });
        }
        modifiers
    }

    /// `final` and annotations in front of parameters and locals.
    fn parse_variable_modifiers(&mut self) -> ast::Modifiers {
        let mut modifiers = ast::Modifiers::default();
        loop {
            if self.at_kind(TokenKind::At) {
                let start = self.current_start();
                self.bump();
                let (name, _) = self.parse_qualified_name();
                if self.at_kind(TokenKind::LParen) {
                    self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
                }
                modifiers.annotations.push(ast::Annotation {
                    name,
                    range: self.range_from(start),
                });
                continue;
            }
            if self.at_keyword("final") {
                if let Some(token) = self.bump() {
                    modifiers.keywords.push(ast::ModifierKeyword {
                        modifier: ast::Modifier::Final,
                        range: token.range,
                    });
                }
                continue;
            }
            break;
        }
        modifiers
    }

    fn parse_class_body(&mut self, kind: ast::TypeKind, type_name: &str) -> ast::ClassBody {
        let start = self.current_start();
        if self.expect(TokenKind::LBrace, "`{`").is_none() {
            return ast::ClassBody {
                members: Vec::new(),
                range: TextRange::empty(start),
            };
        }

        let mut members = Vec::new();
        if kind == ast::TypeKind::Enum {
            self.parse_enum_constants(&mut members);
        }

        while !self.is_eof() && !self.at_kind(TokenKind::RBrace) {
            if self.at_kind(TokenKind::Semi) {
                self.bump();
                continue;
            }
            let before = self.pos;
            if let Some(member) = self.parse_member_decl(type_name) {
                members.push(member);
            }
            if self.pos == before {
                self.error_here("unexpected token in class body");
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "`}`");

        ast::ClassBody {
            members,
            range: self.range_from(start),
        }
    }

    fn parse_enum_constants(&mut self, members: &mut Vec<ast::Member>) {
        loop {
            if self.at_kind(TokenKind::Semi) {
                self.bump();
                break;
            }
            if self.at_kind(TokenKind::RBrace) || self.is_eof() {
                break;
            }

            let start = self.current_start();
            self.parse_modifiers();
            if !self.nth_is_plain_ident(0) {
                break;
            }
            let id = self.alloc();
            let name = self.expect_name();
            let args = if self.at_kind(TokenKind::LParen) {
                Some(self.parse_arg_list())
            } else {
                None
            };
            let body = if self.at_kind(TokenKind::LBrace) {
                Some(self.parse_class_body(ast::TypeKind::Class, ""))
            } else {
                None
            };
            members.push(ast::Member::EnumConstant(ast::EnumConstant {
                id,
                name,
                args,
                body,
                range: self.range_from(start),
            }));

            if self.at_kind(TokenKind::Comma) {
                self.bump();
                continue;
            }
            if self.at_kind(TokenKind::Semi) {
                self.bump();
            }
            break;
        }
    }

    fn parse_member_decl(&mut self, type_name: &str) -> Option<ast::Member> {
        let start_pos = self.pos;
        let start = self.current_start();
        let doc = self.take_doc();
        let modifiers = self.parse_modifiers();

        if self.at_keyword("static") && self.nth_is(1, TokenKind::LBrace) {
            self.bump();
            let body = self.parse_block();
            return Some(ast::Member::Initializer(ast::Initializer {
                is_static: true,
                range: self.range_from(start),
                body,
            }));
        }

        if self.at_kind(TokenKind::LBrace) {
            let body = self.parse_block();
            return Some(ast::Member::Initializer(ast::Initializer {
                is_static: false,
                range: self.range_from(start),
                body,
            }));
        }

        if self.type_decl_kind_here().is_some() {
            self.pos = start_pos;
            return self.parse_type_decl().map(ast::Member::Type);
        }

        let (type_params, type_params_range) = if self.at_kind(TokenKind::Lt) {
            let (names, range) = self.parse_type_params();
            (names, Some(range))
        } else {
            (Vec::new(), None)
        };

        let at_own_name = !type_name.is_empty()
            && self
                .peek()
                .is_some_and(|token| token.kind == TokenKind::Ident && token.text == type_name);

        if at_own_name && self.nth_is(1, TokenKind::LParen) {
            let id = self.alloc();
            let name = self.expect_name();
            return Some(ast::Member::Method(self.finish_method(
                id,
                ast::MethodKind::Constructor,
                start,
                doc,
                modifiers,
                type_params,
                type_params_range,
                None,
                name,
            )));
        }

        if at_own_name && self.nth_is(1, TokenKind::LBrace) {
            // Compact canonical record constructor.
            self.bump();
            let body = self.parse_block();
            return Some(ast::Member::Initializer(ast::Initializer {
                is_static: false,
                range: self.range_from(start),
                body,
            }));
        }

        let ty = self.parse_type_ref_with(true, true)?;
        if !self.nth_is_plain_ident(0) {
            self.error_here("expected member name");
            return None;
        }

        if self.nth_is(1, TokenKind::LParen) {
            let id = self.alloc();
            let name = self.expect_name();
            return Some(ast::Member::Method(self.finish_method(
                id,
                ast::MethodKind::Method,
                start,
                doc,
                modifiers,
                type_params,
                type_params_range,
                Some(ty),
                name,
            )));
        }

        let vars = self.parse_declarators();
        self.expect(TokenKind::Semi, "`;`");
        Some(ast::Member::Field(ast::FieldDecl {
            doc,
            modifiers,
            ty,
            vars,
            range: self.range_from(start),
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_method(
        &mut self,
        id: NodeId,
        kind: ast::MethodKind,
        start: usize,
        doc: Option<ast::DocComment>,
        modifiers: ast::Modifiers,
        type_params: Vec<String>,
        type_params_range: Option<TextRange>,
        return_ty: Option<ast::TypeRef>,
        name: ast::Name,
    ) -> ast::MethodDecl {
        let params = self.parse_param_list();

        // Legacy array return syntax: `int m()[]`.
        while self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
            self.bump();
            self.bump();
        }

        let throws = if self.at_keyword("throws") {
            let throws_start = self.current_start();
            self.bump();
            let types = self.parse_type_list();
            Some(ast::ThrowsClause {
                types,
                range: self.range_from(throws_start),
            })
        } else {
            None
        };

        let body = if self.at_keyword("default") {
            // Annotation element default value.
            self.bump();
            while !self.is_eof() && !self.at_kind(TokenKind::Semi) {
                if self.at_kind(TokenKind::LBrace) {
                    self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace);
                    continue;
                }
                self.bump();
            }
            self.expect(TokenKind::Semi, "`;`");
            None
        } else if self.at_kind(TokenKind::LBrace) {
            Some(self.parse_block())
        } else {
            self.expect(TokenKind::Semi, "`;` or method body");
            None
        };

        ast::MethodDecl {
            id,
            kind,
            doc,
            modifiers,
            type_params,
            type_params_range,
            return_ty,
            name,
            params,
            throws,
            body,
            range: self.range_from(start),
        }
    }

    fn parse_param_list(&mut self) -> ast::ParamList {
        let id = self.alloc();
        let start = self.current_start();
        if self.expect(TokenKind::LParen, "`(`").is_none() {
            return ast::ParamList {
                id,
                params: Vec::new(),
                range: TextRange::empty(start),
            };
        }

        let mut params = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RParen) {
            let before = self.pos;
            let param_start = self.current_start();
            let modifiers = self.parse_variable_modifiers();
            if let Some(ty) = self.parse_type_ref(true) {
                let varargs = if self.at_kind(TokenKind::Ellipsis) {
                    self.bump();
                    true
                } else {
                    false
                };
                let param_id = self.alloc();
                let name = self.expect_name();
                let mut extra_dim_count = 0;
                while self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
                    self.bump();
                    self.bump();
                    extra_dim_count += 1;
                }
                let extra_dims =
                    (extra_dim_count > 0).then(|| TextRange::new(name.range.end, self.prev_end()));
                params.push(ast::Param {
                    id: param_id,
                    modifiers,
                    ty,
                    varargs,
                    name,
                    extra_dims,
                    extra_dim_count,
                    range: self.range_from(param_start),
                });
            } else {
                self.error_here("expected parameter");
            }

            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else if !self.at_kind(TokenKind::RParen) && self.pos == before {
                self.bump();
            }
        }
        self.expect(TokenKind::RParen, "`)`");

        ast::ParamList {
            id,
            params,
            range: self.range_from(start),
        }
    }

    fn parse_declarators(&mut self) -> Vec<ast::VarDeclarator> {
        let mut vars = Vec::new();
        loop {
            let start = self.current_start();
            let name = self.expect_name();
            while self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
                self.bump();
                self.bump();
            }
            let init = if self.at_kind(TokenKind::Eq) {
                self.bump();
                Some(self.parse_var_init())
            } else {
                None
            };
            vars.push(ast::VarDeclarator {
                name,
                init,
                range: self.range_from(start),
            });
            if self.at_kind(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        vars
    }

    fn parse_var_init(&mut self) -> ast::Expr {
        if self.at_kind(TokenKind::LBrace) {
            return self.parse_array_init();
        }
        self.parse_expr_or_missing()
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    pub(crate) fn parse_type_ref(&mut self, allow_dims: bool) -> Option<ast::TypeRef> {
        self.parse_type_ref_with(allow_dims, false)
    }

    fn parse_type_ref_with(&mut self, allow_dims: bool, allow_void: bool) -> Option<ast::TypeRef> {
        let start_pos = self.pos;
        // Type annotations are accepted and dropped.
        while self.at_kind(TokenKind::At) && !self.nth_keyword(1, "interface") {
            self.bump();
            self.parse_qualified_name();
            if self.at_kind(TokenKind::LParen) {
                self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
            }
        }

        let first = match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => token,
            _ => {
                self.pos = start_pos;
                return None;
            }
        };
        let usable = !is_keyword(&first.text)
            || is_primitive_type(&first.text)
            || (allow_void && first.text == "void");
        if !usable {
            self.pos = start_pos;
            return None;
        }
        let primitive = is_keyword(&first.text);

        let start = first.range.start;
        let mut text = first.text.clone();
        self.bump();

        if !primitive {
            loop {
                if self.at_kind(TokenKind::Lt) {
                    text.push_str(&self.collect_type_args());
                    continue;
                }
                if self.at_kind(TokenKind::Dot) && self.nth_is_plain_ident(1) {
                    self.bump();
                    if let Some(part) = self.bump() {
                        text.push('.');
                        text.push_str(&part.text);
                    }
                    continue;
                }
                break;
            }
        }

        if allow_dims {
            while self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
                self.bump();
                self.bump();
                text.push_str("[]");
            }
        }

        Some(ast::TypeRef {
            id: self.alloc(),
            text,
            range: self.range_from(start),
        })
    }

    /// Collect a balanced `<...>` group into normalized text.
    fn collect_type_args(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut prev_word = false;
        while let Some(token) = self.bump() {
            let is_word = matches!(token.kind, TokenKind::Ident | TokenKind::Question);
            if is_word && prev_word {
                text.push(' ');
            }
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth = depth.saturating_sub(1),
                TokenKind::Shl => depth += 2,
                _ => {}
            }
            text.push_str(&token.text);
            prev_word = is_word;
            if depth == 0 {
                break;
            }
        }
        if depth > 0 {
            self.error_here("unterminated type arguments");
        }
        text
    }

    pub(crate) fn parse_type_fragment(&mut self) -> Option<ast::TypeRef> {
        let ty = self.parse_type_ref_with(true, true)?;
        if !self.is_eof() || !self.diagnostics.is_empty() {
            return None;
        }
        Some(ty)
    }

    pub(crate) fn parse_expression_fragment(&mut self) -> Option<ast::Expr> {
        if self.is_eof() {
            return None;
        }
        let expr = self.parse_expr_or_missing();
        if !self.is_eof() || !self.diagnostics.is_empty() {
            return None;
        }
        Some(expr)
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    pub(crate) fn parse_block(&mut self) -> ast::Block {
        let id = self.alloc();
        let start = self.current_start();
        if self.expect(TokenKind::LBrace, "`{`").is_none() {
            return ast::Block {
                id,
                stmts: Vec::new(),
                range: TextRange::empty(start),
            };
        }
        let mut stmts = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RBrace) {
            let before = self.pos;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.pos == before {
                self.error_here("unexpected token in block");
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "`}`");
        ast::Block {
            id,
            stmts,
            range: self.range_from(start),
        }
    }

    fn parse_stmt(&mut self) -> Option<ast::Stmt> {
        let start = self.current_start();
        let (kind, keyword) = {
            let token = self.peek()?;
            (token.kind, token.text.clone())
        };
        match kind {
            TokenKind::Semi => {
                self.bump();
                return Some(ast::Stmt::Empty(self.range_from(start)));
            }
            TokenKind::LBrace => return Some(ast::Stmt::Block(self.parse_block())),
            TokenKind::Ident => {}
            _ => return Some(self.parse_expr_stmt(start)),
        }

        match keyword.as_str() {
            "if" => return Some(self.parse_if(start)),
            "while" => {
                self.bump();
                let cond = self.parse_paren_cond();
                let body = self.parse_body_stmt();
                return Some(ast::Stmt::While(ast::WhileStmt {
                    cond,
                    body,
                    range: self.range_from(start),
                }));
            }
            "do" => {
                self.bump();
                let body = self.parse_body_stmt();
                if self.at_keyword("while") {
                    self.bump();
                } else {
                    self.error_here("expected `while`");
                }
                let cond = self.parse_paren_cond();
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Do(ast::DoStmt {
                    body,
                    cond,
                    range: self.range_from(start),
                }));
            }
            "for" => return Some(self.parse_for(start)),
            "try" => return Some(self.parse_try(start)),
            "switch" if self.nth_is(1, TokenKind::LParen) => {
                return Some(ast::Stmt::Switch(self.parse_switch_block()));
            }
            "synchronized" if self.nth_is(1, TokenKind::LParen) => {
                self.bump();
                let lock = self.parse_paren_cond();
                let body = self.parse_block();
                return Some(ast::Stmt::Sync(ast::SyncStmt {
                    lock,
                    body,
                    range: self.range_from(start),
                }));
            }
            "return" => {
                self.bump();
                let expr = if self.at_kind(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr_or_missing())
                };
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Return(ast::ReturnStmt {
                    expr,
                    range: self.range_from(start),
                }));
            }
            "throw" => {
                self.bump();
                let expr = self.parse_expr_or_missing();
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Throw(ast::ThrowStmt {
                    expr,
                    range: self.range_from(start),
                }));
            }
            "break" | "continue" => {
                self.bump();
                if self.nth_is_plain_ident(0) {
                    self.bump();
                }
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Jump(self.range_from(start)));
            }
            "yield"
                if !matches!(
                    self.nth_kind(1),
                    Some(TokenKind::Eq | TokenKind::Dot | TokenKind::LParen)
                ) =>
            {
                self.bump();
                let expr = self.parse_expr_or_missing();
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Expr(ast::ExprStmt {
                    expr,
                    range: self.range_from(start),
                }));
            }
            "assert" => {
                self.bump();
                let cond = self.parse_expr_or_missing();
                let message = if self.at_kind(TokenKind::Colon) {
                    self.bump();
                    Some(self.parse_expr_or_missing())
                } else {
                    None
                };
                self.expect(TokenKind::Semi, "`;`");
                return Some(ast::Stmt::Assert(ast::AssertStmt {
                    cond,
                    message,
                    range: self.range_from(start),
                }));
            }
            _ => {}
        }

        if let Some(decl) = self.try_parse_local_type() {
            return Some(ast::Stmt::LocalType(Box::new(decl)));
        }

        if self.nth_is_plain_ident(0) && self.nth_is(1, TokenKind::Colon) {
            let label = self.bump().map(|token| token.text).unwrap_or_default();
            self.bump();
            let stmt = self.parse_body_stmt();
            return Some(ast::Stmt::Labeled(ast::LabeledStmt {
                label,
                stmt,
                range: self.range_from(start),
            }));
        }

        if let Some(local) = self.try_parse_local_var(true) {
            return Some(ast::Stmt::LocalVar(local));
        }

        Some(self.parse_expr_stmt(start))
    }

    fn parse_expr_stmt(&mut self, start: usize) -> ast::Stmt {
        let expr = self.parse_expr_or_missing();
        self.expect(TokenKind::Semi, "`;`");
        ast::Stmt::Expr(ast::ExprStmt {
            expr,
            range: self.range_from(start),
        })
    }

    fn parse_body_stmt(&mut self) -> Box<ast::Stmt> {
        let start = self.current_start();
        match self.parse_stmt() {
            Some(stmt) => Box::new(stmt),
            None => Box::new(ast::Stmt::Empty(TextRange::empty(start))),
        }
    }

    fn parse_paren_cond(&mut self) -> ast::Expr {
        self.expect(TokenKind::LParen, "`(`");
        let cond = self.parse_expr_or_missing();
        self.expect(TokenKind::RParen, "`)`");
        cond
    }

    fn parse_if(&mut self, start: usize) -> ast::Stmt {
        self.bump();
        let cond = self.parse_paren_cond();
        let then_branch = self.parse_body_stmt();
        let else_branch = if self.at_keyword("else") {
            self.bump();
            Some(self.parse_body_stmt())
        } else {
            None
        };
        ast::Stmt::If(ast::IfStmt {
            cond,
            then_branch,
            else_branch,
            range: self.range_from(start),
        })
    }

    fn parse_for(&mut self, start: usize) -> ast::Stmt {
        self.bump();
        self.expect(TokenKind::LParen, "`(`");

        let local = self.try_parse_local_var(false);
        if let Some(local) = local {
            if self.at_kind(TokenKind::Colon) {
                self.bump();
                let iterable = self.parse_expr_or_missing();
                self.expect(TokenKind::RParen, "`)`");
                let body = self.parse_body_stmt();
                let name = local
                    .vars
                    .into_iter()
                    .next()
                    .map(|var| var.name)
                    .unwrap_or_else(|| ast::Name {
                        id: NodeId(u32::MAX),
                        text: String::new(),
                        range: TextRange::empty(start),
                    });
                return ast::Stmt::ForEach(ast::ForEachStmt {
                    modifiers: local.modifiers,
                    ty: local.ty,
                    name,
                    iterable,
                    body,
                    range: self.range_from(start),
                });
            }
            return self.finish_for(start, vec![ast::Stmt::LocalVar(local)]);
        }

        let mut init = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::Semi) {
            let expr_start = self.current_start();
            let expr = self.parse_expr_or_missing();
            init.push(ast::Stmt::Expr(ast::ExprStmt {
                expr,
                range: self.range_from(expr_start),
            }));
            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_for(start, init)
    }

    fn finish_for(&mut self, start: usize, init: Vec<ast::Stmt>) -> ast::Stmt {
        self.expect(TokenKind::Semi, "`;`");
        let cond = if self.at_kind(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr_or_missing())
        };
        self.expect(TokenKind::Semi, "`;`");
        let mut update = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RParen) {
            update.push(self.parse_expr_or_missing());
            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`");
        let body = self.parse_body_stmt();
        ast::Stmt::For(ast::ForStmt {
            init,
            cond,
            update,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_try(&mut self, start: usize) -> ast::Stmt {
        self.bump();
        let mut resources = Vec::new();
        if self.at_kind(TokenKind::LParen) {
            self.bump();
            while !self.is_eof() && !self.at_kind(TokenKind::RParen) {
                let before = self.pos;
                let res_start = self.current_start();
                match self.try_parse_local_var(false) {
                    Some(local) => resources.push(ast::Stmt::LocalVar(local)),
                    None => {
                        let expr = self.parse_expr_or_missing();
                        resources.push(ast::Stmt::Expr(ast::ExprStmt {
                            expr,
                            range: self.range_from(res_start),
                        }));
                    }
                }
                if self.at_kind(TokenKind::Semi) {
                    self.bump();
                } else if self.pos == before {
                    self.bump();
                }
            }
            self.expect(TokenKind::RParen, "`)`");
        }

        let body = self.parse_block();
        let mut catches = Vec::new();
        while self.at_keyword("catch") {
            let catch_start = self.current_start();
            self.bump();
            self.expect(TokenKind::LParen, "`(`");
            self.parse_variable_modifiers();
            let mut types = Vec::new();
            loop {
                match self.parse_type_ref(false) {
                    Some(ty) => types.push(ty),
                    None => {
                        self.error_here("expected exception type");
                        break;
                    }
                }
                if self.at_kind(TokenKind::Pipe) {
                    self.bump();
                    continue;
                }
                break;
            }
            let name = self.expect_name();
            self.expect(TokenKind::RParen, "`)`");
            let block = self.parse_block();
            catches.push(ast::CatchClause {
                types,
                name,
                body: block,
                range: self.range_from(catch_start),
            });
        }
        let finally = if self.at_keyword("finally") {
            self.bump();
            Some(self.parse_block())
        } else {
            None
        };

        ast::Stmt::Try(ast::TryStmt {
            resources,
            body,
            catches,
            finally,
            range: self.range_from(start),
        })
    }

    fn parse_switch_block(&mut self) -> ast::SwitchBlock {
        let start = self.current_start();
        self.bump();
        let selector = Box::new(self.parse_paren_cond());
        let mut cases = Vec::new();
        if self.expect(TokenKind::LBrace, "`{`").is_some() {
            while !self.is_eof() && !self.at_kind(TokenKind::RBrace) {
                let case_start = self.current_start();
                let mut labels = Vec::new();
                if self.at_keyword("case") {
                    self.bump();
                    let saved = std::mem::replace(&mut self.no_lambda, true);
                    loop {
                        labels.push(self.parse_expr_or_missing());
                        if self.at_kind(TokenKind::Comma) {
                            self.bump();
                            continue;
                        }
                        break;
                    }
                    self.no_lambda = saved;
                } else if self.at_keyword("default") {
                    self.bump();
                } else {
                    self.error_here("expected `case` or `default`");
                    self.bump();
                    continue;
                }

                let mut body = Vec::new();
                if self.at_kind(TokenKind::Arrow) {
                    self.bump();
                    if let Some(stmt) = self.parse_stmt() {
                        body.push(stmt);
                    }
                } else {
                    self.expect(TokenKind::Colon, "`:` or `->`");
                    while !self.is_eof()
                        && !self.at_kind(TokenKind::RBrace)
                        && !self.at_keyword("case")
                        && !self.at_keyword("default")
                    {
                        let before = self.pos;
                        if let Some(stmt) = self.parse_stmt() {
                            body.push(stmt);
                        }
                        if self.pos == before {
                            self.bump();
                        }
                    }
                }
                cases.push(ast::SwitchCase {
                    labels,
                    body,
                    range: self.range_from(case_start),
                });
            }
            self.expect(TokenKind::RBrace, "`}`");
        }
        ast::SwitchBlock {
            selector,
            cases,
            range: self.range_from(start),
        }
    }

    fn try_parse_local_type(&mut self) -> Option<ast::TypeDecl> {
        let start_pos = self.pos;
        self.parse_modifiers();
        let is_type = self.type_decl_kind_here().is_some();
        self.pos = start_pos;
        if !is_type {
            return None;
        }
        self.parse_type_decl()
    }

    fn try_parse_local_var(&mut self, require_semi: bool) -> Option<ast::LocalVarStmt> {
        let start_pos = self.pos;
        let start = self.current_start();
        let modifiers = self.parse_variable_modifiers();

        let Some(ty) = self.parse_type_ref(true) else {
            self.pos = start_pos;
            return None;
        };
        let follows = self.nth_kind(1);
        let looks_like_decl = self.nth_is_plain_ident(0)
            && matches!(
                follows,
                Some(
                    TokenKind::Eq
                        | TokenKind::Semi
                        | TokenKind::Comma
                        | TokenKind::LBracket
                        | TokenKind::Colon
                        | TokenKind::RParen
                )
            );
        if !looks_like_decl {
            self.pos = start_pos;
            return None;
        }

        let vars = self.parse_declarators();
        if require_semi {
            self.expect(TokenKind::Semi, "`;`");
        }
        Some(ast::LocalVarStmt {
            modifiers,
            ty,
            vars,
            range: self.range_from(start),
        })
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn parse_expr_or_missing(&mut self) -> ast::Expr {
        match self.parse_expr() {
            Some(expr) => expr,
            None => self.missing(),
        }
    }

    fn parse_expr(&mut self) -> Option<ast::Expr> {
        if !self.no_lambda {
            if let Some(lambda) = self.try_parse_lambda() {
                return Some(lambda);
            }
        }

        let lhs = self.parse_conditional()?;
        let Some((op, tokens)) = self.assign_op_here() else {
            return Some(lhs);
        };
        for _ in 0..tokens {
            self.bump();
        }
        let rhs = self.parse_expr_or_missing();
        let range = TextRange::new(lhs.range().start, rhs.range().end.max(lhs.range().start));
        Some(ast::Expr::Assign(ast::AssignExpr {
            id: self.alloc(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            range,
        }))
    }

    fn assign_op_here(&self) -> Option<(String, usize)> {
        match self.nth_kind(0)? {
            TokenKind::Eq => Some(("=".to_string(), 1)),
            TokenKind::AssignOp => self.peek().map(|token| (token.text.clone(), 1)),
            TokenKind::Gt if self.adjacent(0) => match self.nth_kind(1)? {
                TokenKind::Ge => Some((">>=".to_string(), 2)),
                TokenKind::Gt if self.adjacent(1) && self.nth_is(2, TokenKind::Ge) => {
                    Some((">>>=".to_string(), 3))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn try_parse_lambda(&mut self) -> Option<ast::Expr> {
        let start = self.current_start();
        if self.nth_is_plain_ident(0) && self.nth_is(1, TokenKind::Arrow) {
            let token = self.bump()?;
            let name = self.name_from(token);
            self.bump();
            let params = vec![ast::LambdaParam { ty: None, name }];
            return Some(self.finish_lambda(start, params));
        }

        if !self.at_kind(TokenKind::LParen) {
            return None;
        }
        let close = self.matching_close(self.pos, TokenKind::LParen, TokenKind::RParen)?;
        if self.tokens.get(close + 1).map(|token| token.kind) != Some(TokenKind::Arrow) {
            return None;
        }

        self.bump();
        let mut params = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RParen) {
            let before = self.pos;
            self.parse_variable_modifiers();
            if self.nth_is_plain_ident(0)
                && matches!(self.nth_kind(1), Some(TokenKind::Comma | TokenKind::RParen))
            {
                let name = self.expect_name();
                params.push(ast::LambdaParam { ty: None, name });
            } else if let Some(ty) = self.parse_type_ref(true) {
                if self.at_kind(TokenKind::Ellipsis) {
                    self.bump();
                }
                let name = self.expect_name();
                params.push(ast::LambdaParam { ty: Some(ty), name });
            }
            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else if self.pos == before {
                self.bump();
            }
        }
        self.expect(TokenKind::RParen, "`)`");
        self.expect(TokenKind::Arrow, "`->`");
        Some(self.finish_lambda(start, params))
    }

    fn finish_lambda(&mut self, start: usize, params: Vec<ast::LambdaParam>) -> ast::Expr {
        let id = self.alloc();
        let body = if self.at_kind(TokenKind::LBrace) {
            ast::LambdaBody::Block(self.parse_block())
        } else {
            ast::LambdaBody::Expr(Box::new(self.parse_expr_or_missing()))
        };
        ast::Expr::Lambda(ast::LambdaExpr {
            id,
            params,
            body,
            range: self.range_from(start),
        })
    }

    /// Index of the token closing the group opened at `open_index`.
    fn matching_close(
        &self,
        open_index: usize,
        open: TokenKind,
        close: TokenKind,
    ) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open_index) {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }

    fn parse_conditional(&mut self) -> Option<ast::Expr> {
        let cond = self.parse_binary(1)?;
        if !self.at_kind(TokenKind::Question) {
            return Some(cond);
        }
        self.bump();
        let then_expr = self.parse_expr_or_missing();
        self.expect(TokenKind::Colon, "`:`");
        let else_expr = match self.try_parse_lambda() {
            Some(lambda) => lambda,
            None => match self.parse_conditional() {
                Some(expr) => expr,
                None => self.missing(),
            },
        };
        let start = cond.range().start;
        let range = TextRange::new(start, else_expr.range().end.max(start));
        Some(ast::Expr::Conditional(ast::ConditionalExpr {
            id: self.alloc(),
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            range,
        }))
    }

    /// `(op, precedence, token count)` for the binary operator at the cursor.
    fn binary_op_here(&self) -> Option<(Option<ast::BinaryOp>, u8, usize)> {
        use ast::BinaryOp as Op;
        let kind = self.nth_kind(0)?;
        let found = match kind {
            TokenKind::PipePipe => (Some(Op::Or), 1, 1),
            TokenKind::AmpAmp => (Some(Op::And), 2, 1),
            TokenKind::Pipe => (Some(Op::BitOr), 3, 1),
            TokenKind::Caret => (Some(Op::BitXor), 4, 1),
            TokenKind::Amp => (Some(Op::BitAnd), 5, 1),
            TokenKind::EqEq => (Some(Op::Eq), 6, 1),
            TokenKind::BangEq => (Some(Op::Ne), 6, 1),
            TokenKind::Lt => (Some(Op::Lt), 7, 1),
            TokenKind::Le => (Some(Op::Le), 7, 1),
            TokenKind::Ge => (Some(Op::Ge), 7, 1),
            TokenKind::Gt => {
                if self.adjacent(0) && self.nth_is(1, TokenKind::Gt) {
                    if self.adjacent(1) && self.nth_is(2, TokenKind::Gt) {
                        if self.adjacent(2) && self.nth_is(3, TokenKind::Ge) {
                            return None;
                        }
                        (Some(Op::UShr), 8, 3)
                    } else if self.adjacent(1) && self.nth_is(2, TokenKind::Ge) {
                        return None;
                    } else {
                        (Some(Op::Shr), 8, 2)
                    }
                } else if self.adjacent(0) && self.nth_is(1, TokenKind::Ge) {
                    return None;
                } else {
                    (Some(Op::Gt), 7, 1)
                }
            }
            TokenKind::Shl => (Some(Op::Shl), 8, 1),
            TokenKind::Plus => (Some(Op::Add), 9, 1),
            TokenKind::Minus => (Some(Op::Sub), 9, 1),
            TokenKind::Star => (Some(Op::Mul), 10, 1),
            TokenKind::Slash => (Some(Op::Div), 10, 1),
            TokenKind::Percent => (Some(Op::Rem), 10, 1),
            TokenKind::Ident if self.at_keyword("instanceof") => (None, 7, 1),
            _ => return None,
        };
        Some(found)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<ast::Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec, tokens)) = self.binary_op_here() {
            if prec < min_prec {
                break;
            }
            for _ in 0..tokens {
                self.bump();
            }

            let Some(op) = op else {
                // instanceof
                self.parse_variable_modifiers();
                let ty = match self.parse_type_ref(true) {
                    Some(ty) => ty,
                    None => {
                        self.error_here("expected type");
                        let at = self.current_start();
                        ast::TypeRef {
                            id: self.alloc(),
                            text: String::new(),
                            range: TextRange::empty(at),
                        }
                    }
                };
                let binding = if self.nth_is_plain_ident(0) {
                    Some(self.expect_name())
                } else {
                    None
                };
                let start = lhs.range().start;
                lhs = ast::Expr::InstanceOf(ast::InstanceOfExpr {
                    id: self.alloc(),
                    expr: Box::new(lhs),
                    ty,
                    binding,
                    range: self.range_from(start),
                });
                continue;
            };

            let rhs = match self.parse_binary(prec + 1) {
                Some(rhs) => rhs,
                None => self.missing(),
            };
            let start = lhs.range().start;
            let range = TextRange::new(start, rhs.range().end.max(start));
            lhs = ast::Expr::Binary(ast::BinaryExpr {
                id: self.alloc(),
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                range,
            });
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<ast::Expr> {
        let op = match self.nth_kind(0)? {
            TokenKind::Bang => Some(ast::UnaryOp::Not),
            TokenKind::Tilde => Some(ast::UnaryOp::BitNot),
            TokenKind::Plus => Some(ast::UnaryOp::Plus),
            TokenKind::Minus => Some(ast::UnaryOp::Minus),
            TokenKind::PlusPlus => Some(ast::UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(ast::UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.current_start();
            self.bump();
            let operand = match self.parse_unary() {
                Some(operand) => operand,
                None => self.missing(),
            };
            return Some(ast::Expr::Unary(ast::UnaryExpr {
                id: self.alloc(),
                op,
                operand: Box::new(operand),
                range: self.range_from(start),
            }));
        }

        if self.at_kind(TokenKind::LParen) {
            if let Some(cast) = self.try_parse_cast() {
                return Some(cast);
            }
        }
        self.parse_postfix()
    }

    fn try_parse_cast(&mut self) -> Option<ast::Expr> {
        let start_pos = self.pos;
        let start = self.current_start();
        self.bump();
        let Some(ty) = self.parse_type_ref(true) else {
            self.pos = start_pos;
            return None;
        };
        // Intersection casts: `(A & B) x`.
        while self.at_kind(TokenKind::Amp) {
            self.bump();
            if self.parse_type_ref(false).is_none() {
                self.pos = start_pos;
                return None;
            }
        }
        if !self.at_kind(TokenKind::RParen) {
            self.pos = start_pos;
            return None;
        }
        self.bump();

        let primitive = is_primitive_type(ty.base_name());
        let operand_follows = match self.peek() {
            None => false,
            Some(token) => match token.kind {
                TokenKind::Ident => token.text != "instanceof",
                TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::TextBlock
                | TokenKind::LParen
                | TokenKind::Bang
                | TokenKind::Tilde => true,
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus => primitive,
                _ => false,
            },
        };
        if !operand_follows {
            self.pos = start_pos;
            return None;
        }

        let expr = match self.try_parse_lambda() {
            Some(lambda) => lambda,
            None => match self.parse_unary() {
                Some(expr) => expr,
                None => self.missing(),
            },
        };
        Some(ast::Expr::Cast(ast::CastExpr {
            id: self.alloc(),
            ty,
            expr: Box::new(expr),
            range: self.range_from(start),
        }))
    }

    fn parse_postfix(&mut self) -> Option<ast::Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr.range().start;
            match self.nth_kind(0) {
                Some(TokenKind::Dot) => {
                    self.bump();
                    if self.at_kind(TokenKind::Lt) {
                        // Explicit type arguments: `Collections.<T>emptyList()`.
                        self.collect_type_args();
                    }
                    if self.at_keyword("class") {
                        self.bump();
                        let text = expr.as_qualified_name().unwrap_or_default();
                        let ty = ast::TypeRef {
                            id: self.alloc(),
                            text,
                            range: expr.range(),
                        };
                        expr = ast::Expr::ClassLiteral(ast::ClassLiteralExpr {
                            id: self.alloc(),
                            ty,
                            range: self.range_from(start),
                        });
                        continue;
                    }
                    if self.at_keyword("this") {
                        self.bump();
                        expr = ast::Expr::This(ast::ThisExpr {
                            id: self.alloc(),
                            qualifier: expr.as_qualified_name(),
                            range: self.range_from(start),
                        });
                        continue;
                    }
                    if self.at_keyword("new") {
                        expr = self.parse_new(Some(expr));
                        continue;
                    }
                    if self.at_keyword("super") {
                        let token = self.bump();
                        expr = ast::Expr::Super(ast::SuperExpr {
                            id: self.alloc(),
                            range: token
                                .map(|t| TextRange::new(start, t.range.end))
                                .unwrap_or_default(),
                        });
                        continue;
                    }
                    let name = self.expect_name();
                    if self.at_kind(TokenKind::LParen) {
                        let args = self.parse_arg_list();
                        expr = ast::Expr::MethodCall(ast::MethodCallExpr {
                            id: self.alloc(),
                            receiver: Some(Box::new(expr)),
                            name,
                            args,
                            range: self.range_from(start),
                        });
                    } else {
                        expr = ast::Expr::FieldAccess(ast::FieldAccessExpr {
                            id: self.alloc(),
                            receiver: Box::new(expr),
                            name,
                            range: self.range_from(start),
                        });
                    }
                }
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let index = self.parse_expr_or_missing();
                    self.expect(TokenKind::RBracket, "`]`");
                    expr = ast::Expr::ArrayAccess(ast::ArrayAccessExpr {
                        id: self.alloc(),
                        array: Box::new(expr),
                        index: Box::new(index),
                        range: self.range_from(start),
                    });
                }
                Some(kind @ (TokenKind::PlusPlus | TokenKind::MinusMinus)) => {
                    self.bump();
                    let op = if kind == TokenKind::PlusPlus {
                        ast::UnaryOp::PostInc
                    } else {
                        ast::UnaryOp::PostDec
                    };
                    expr = ast::Expr::Unary(ast::UnaryExpr {
                        id: self.alloc(),
                        op,
                        operand: Box::new(expr),
                        range: self.range_from(start),
                    });
                }
                Some(TokenKind::ColonColon) => {
                    self.bump();
                    let name = if self.at_keyword("new") {
                        match self.bump() {
                            Some(token) => self.name_from(token),
                            None => self.expect_name(),
                        }
                    } else {
                        self.expect_name()
                    };
                    expr = ast::Expr::MethodRef(ast::MethodRefExpr {
                        id: self.alloc(),
                        target: Box::new(expr),
                        name,
                        range: self.range_from(start),
                    });
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<ast::Expr> {
        let token = self.peek()?.clone();
        let start = token.range.start;
        let literal_kind = match token.kind {
            TokenKind::IntLiteral => Some(ast::LiteralKind::Int),
            TokenKind::LongLiteral => Some(ast::LiteralKind::Long),
            TokenKind::FloatLiteral => Some(ast::LiteralKind::Float),
            TokenKind::DoubleLiteral => Some(ast::LiteralKind::Double),
            TokenKind::CharLiteral => Some(ast::LiteralKind::Char),
            TokenKind::StringLiteral => Some(ast::LiteralKind::String),
            TokenKind::TextBlock => Some(ast::LiteralKind::TextBlock),
            TokenKind::Ident if token.text == "true" || token.text == "false" => {
                Some(ast::LiteralKind::Boolean)
            }
            TokenKind::Ident if token.text == "null" => Some(ast::LiteralKind::Null),
            _ => None,
        };
        if let Some(kind) = literal_kind {
            self.bump();
            return Some(ast::Expr::Literal(ast::LiteralExpr {
                id: self.alloc(),
                kind,
                value: token.text,
                range: token.range,
            }));
        }

        match token.kind {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr_or_missing();
                self.expect(TokenKind::RParen, "`)`");
                Some(ast::Expr::Paren(ast::ParenExpr {
                    id: self.alloc(),
                    inner: Box::new(inner),
                    range: self.range_from(start),
                }))
            }
            TokenKind::LBrace => Some(self.parse_array_init()),
            TokenKind::Ident => self.parse_ident_primary(token),
            TokenKind::RParen
            | TokenKind::RBrace
            | TokenKind::RBracket
            | TokenKind::Semi
            | TokenKind::Comma => Some(self.missing()),
            _ => {
                let missing = self.missing();
                self.bump();
                Some(missing)
            }
        }
    }

    fn parse_ident_primary(&mut self, token: Token) -> Option<ast::Expr> {
        let start = token.range.start;
        match token.text.as_str() {
            "this" | "super" => {
                self.bump();
                let kind = if token.text == "this" {
                    ast::ConstructorCallKind::This
                } else {
                    ast::ConstructorCallKind::Super
                };
                if self.at_kind(TokenKind::LParen) {
                    let args = self.parse_arg_list();
                    return Some(ast::Expr::ConstructorCall(ast::ConstructorCallExpr {
                        id: self.alloc(),
                        kind,
                        args,
                        range: self.range_from(start),
                    }));
                }
                let id = self.alloc();
                return Some(match kind {
                    ast::ConstructorCallKind::This => ast::Expr::This(ast::ThisExpr {
                        id,
                        qualifier: None,
                        range: token.range,
                    }),
                    ast::ConstructorCallKind::Super => ast::Expr::Super(ast::SuperExpr {
                        id,
                        range: token.range,
                    }),
                });
            }
            "new" => return Some(self.parse_new(None)),
            "switch" if self.nth_is(1, TokenKind::LParen) => {
                let block = self.parse_switch_block();
                return Some(ast::Expr::Switch(ast::SwitchExpr {
                    id: self.alloc(),
                    block,
                }));
            }
            _ => {}
        }

        if is_primitive_type(&token.text) || token.text == "void" {
            let ty = self.parse_type_ref_with(true, true)?;
            if self.at_kind(TokenKind::Dot) && self.nth_keyword(1, "class") {
                self.bump();
                self.bump();
                return Some(ast::Expr::ClassLiteral(ast::ClassLiteralExpr {
                    id: self.alloc(),
                    ty,
                    range: self.range_from(start),
                }));
            }
            if self.at_kind(TokenKind::ColonColon) {
                // `int[]::new`
                let target = ast::Expr::Name(ast::NameExpr {
                    id: self.alloc(),
                    name: ty.text,
                    range: ty.range,
                });
                return Some(target);
            }
            self.error_here("unexpected primitive type in expression");
            return Some(ast::Expr::Missing(ast::MissingExpr {
                id: self.alloc(),
                range: ty.range,
            }));
        }

        if is_keyword(&token.text) {
            let missing = self.missing();
            self.bump();
            return Some(missing);
        }

        self.bump();
        if self.at_kind(TokenKind::LParen) {
            let name = self.name_from(token);
            let args = self.parse_arg_list();
            return Some(ast::Expr::MethodCall(ast::MethodCallExpr {
                id: self.alloc(),
                receiver: None,
                name,
                args,
                range: self.range_from(start),
            }));
        }

        // `Foo[]::new` / `Foo[].class`
        if self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
            let mut text = token.text.clone();
            while self.at_kind(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
                self.bump();
                self.bump();
                text.push_str("[]");
            }
            return Some(ast::Expr::Name(ast::NameExpr {
                id: self.alloc(),
                name: text,
                range: self.range_from(start),
            }));
        }

        Some(ast::Expr::Name(ast::NameExpr {
            id: self.alloc(),
            name: token.text,
            range: token.range,
        }))
    }

    fn parse_new(&mut self, outer: Option<ast::Expr>) -> ast::Expr {
        let start = outer
            .as_ref()
            .map(|outer| outer.range().start)
            .unwrap_or_else(|| self.current_start());
        self.bump();
        if self.at_kind(TokenKind::Lt) {
            self.collect_type_args();
        }

        let Some(ty) = self.parse_type_ref(false) else {
            return self.missing();
        };

        if self.at_kind(TokenKind::LBracket) {
            let mut dims = Vec::new();
            while self.at_kind(TokenKind::LBracket) {
                self.bump();
                if !self.at_kind(TokenKind::RBracket) {
                    dims.push(self.parse_expr_or_missing());
                }
                self.expect(TokenKind::RBracket, "`]`");
            }
            let init = if self.at_kind(TokenKind::LBrace) {
                Some(Box::new(self.parse_array_init()))
            } else {
                None
            };
            return ast::Expr::NewArray(ast::NewArrayExpr {
                id: self.alloc(),
                ty,
                dims,
                init,
                range: self.range_from(start),
            });
        }

        let id = self.alloc();
        let args = self.parse_arg_list();
        let body = if self.at_kind(TokenKind::LBrace) {
            Some(self.parse_class_body(ast::TypeKind::Class, ""))
        } else {
            None
        };
        ast::Expr::New(ast::NewExpr {
            id,
            outer: outer.map(Box::new),
            ty,
            args,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_array_init(&mut self) -> ast::Expr {
        let start = self.current_start();
        let id = self.alloc();
        self.bump();
        let mut elements = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RBrace) {
            let before = self.pos;
            elements.push(self.parse_var_init());
            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else if self.pos == before {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`");
        ast::Expr::ArrayInit(ast::ArrayInitExpr {
            id,
            elements,
            range: self.range_from(start),
        })
    }

    fn parse_arg_list(&mut self) -> ast::ArgList {
        let id = self.alloc();
        let start = self.current_start();
        if self.expect(TokenKind::LParen, "`(`").is_none() {
            return ast::ArgList {
                id,
                args: Vec::new(),
                range: TextRange::empty(start),
            };
        }
        let mut args = Vec::new();
        while !self.is_eof() && !self.at_kind(TokenKind::RParen) {
            let before = self.pos;
            args.push(self.parse_expr_or_missing());
            if self.at_kind(TokenKind::Comma) {
                self.bump();
            } else if !self.at_kind(TokenKind::RParen) {
                self.error_here("expected `,` or `)`");
                if self.pos == before {
                    self.bump();
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`");
        ast::ArgList {
            id,
            args,
            range: self.range_from(start),
        }
    }

    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) {
        if !self.at_kind(open) {
            return;
        }
        self.bump();
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else { break };
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
            }
        }
    }
}
