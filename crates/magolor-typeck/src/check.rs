//! The two-phase checker walk.

use rustc_hash::{FxHashMap, FxHashSet};

use magolor_common::diagnostics::{codes, DiagnosticSink};
use magolor_common::span::Span;
use magolor_parser::ast::{
    BinOp, ClassDecl, Expr, ExprKind, FnDecl, MatchArm, Pattern, Program, Stmt, StmtKind, Type,
    UnOp,
};
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_stdlib::catalog;

use crate::env::ScopeStack;

/// A copied function signature. Hoisting copies signatures instead of
/// borrowing the AST so bodies can be annotated while the tables live.
#[derive(Debug, Clone)]
struct FnSig {
    params: Vec<Type>,
    ret: Type,
    is_public: bool,
    is_static: bool,
}

impl FnSig {
    fn of(decl: &FnDecl) -> Self {
        Self {
            params: decl.params.iter().map(|p| p.ty.clone()).collect(),
            ret: decl.ret.clone(),
            is_public: decl.is_public,
            is_static: decl.is_static,
        }
    }

    fn ty(&self) -> Type {
        Type::Function {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldInfo {
    name: String,
    ty: Type,
    is_public: bool,
}

/// A copied class shape: own fields and methods plus the declared parent.
#[derive(Debug, Clone)]
struct ClassInfo {
    parent: Option<String>,
    fields: Vec<FieldInfo>,
    methods: FxHashMap<String, FnSig>,
}

impl ClassInfo {
    fn of(decl: &ClassDecl) -> Self {
        Self {
            parent: decl.parent.clone(),
            fields: decl
                .fields
                .iter()
                .map(|f| FieldInfo {
                    name: f.name.clone(),
                    ty: f.ty.clone(),
                    is_public: f.is_public,
                })
                .collect(),
            methods: decl
                .methods
                .iter()
                .map(|m| (m.name.clone(), FnSig::of(m)))
                .collect(),
        }
    }
}

/// Check one module's AST in place, filling every expression's type slot.
pub fn check_module(module: &mut Module, registry: &ModuleRegistry, sink: &mut DiagnosticSink) {
    let mut checker = Checker {
        sink,
        registry,
        module_name: module.name.clone(),
        imports: module.imports.clone(),
        classes: FxHashMap::default(),
        functions: FxHashMap::default(),
        symbol_origin: FxHashMap::default(),
        used_imports: FxHashSet::default(),
        scopes: ScopeStack::new(),
        current_ret: Type::Void,
        current_class: None,
        in_static: false,
    };

    checker.hoist(&module.ast);
    for class in &mut module.ast.classes {
        checker.check_class(class);
    }
    for function in &mut module.ast.functions {
        checker.check_function(function);
    }
    checker.warn_unused_imports(&module.ast);
}

struct Checker<'a> {
    sink: &'a mut DiagnosticSink,
    registry: &'a ModuleRegistry,
    module_name: String,
    /// Resolved imports of the module under check (registry keys plus
    /// builtin module paths).
    imports: Vec<String>,
    /// Class shapes visible here: own classes plus public imported ones.
    classes: FxHashMap<String, ClassInfo>,
    /// Function signatures visible here: own plus public imported ones.
    functions: FxHashMap<String, FnSig>,
    /// Which import an imported symbol came from, for unused tracking.
    symbol_origin: FxHashMap<String, String>,
    used_imports: FxHashSet<String>,
    scopes: ScopeStack,
    current_ret: Type,
    current_class: Option<String>,
    in_static: bool,
}

impl Checker<'_> {
    // ── Phase A: hoist ─────────────────────────────────────────────────

    fn hoist(&mut self, program: &Program) {
        for class in &program.classes {
            if self.classes.contains_key(&class.name) {
                self.sink.error(
                    codes::NAME_DUPLICATE,
                    class.name_span,
                    format!("duplicate declaration of class `{}`", class.name),
                );
                continue;
            }
            self.classes.insert(class.name.clone(), ClassInfo::of(class));
        }
        for function in &program.functions {
            if self.functions.contains_key(&function.name) {
                self.sink.error(
                    codes::NAME_DUPLICATE,
                    function.name_span,
                    format!("duplicate declaration of function `{}`", function.name),
                );
                continue;
            }
            self.functions.insert(function.name.clone(), FnSig::of(function));
        }

        // Public surface of imported registry modules, bound unqualified.
        // Own declarations always win.
        for import in self.imports.clone() {
            let Some(imported) = self.registry.get(&import) else {
                continue; // builtin
            };
            for class in &imported.ast.classes {
                if class.is_public && !self.classes.contains_key(&class.name) {
                    self.classes.insert(class.name.clone(), ClassInfo::of(class));
                    self.symbol_origin.insert(class.name.clone(), import.clone());
                }
            }
            for function in &imported.ast.functions {
                if function.is_public && !self.functions.contains_key(&function.name) {
                    self.functions.insert(function.name.clone(), FnSig::of(function));
                    self.symbol_origin.insert(function.name.clone(), import.clone());
                }
            }
        }
    }

    // ── Phase B: declarations ──────────────────────────────────────────

    fn check_class(&mut self, class: &mut ClassDecl) {
        if let Some(parent) = class.parent.clone() {
            if !self.classes.contains_key(&parent) {
                self.sink.error(
                    codes::NAME_UNDECLARED,
                    class.name_span,
                    format!("unknown parent class `{parent}`"),
                );
            }
        }
        for field in &class.fields {
            self.validate_type(&field.ty, field.span);
        }

        self.current_class = Some(class.name.clone());
        let class_name = class.name.clone();
        for method in &mut class.methods {
            self.in_static = method.is_static;
            self.check_callable(method, Some(&class_name));
        }
        self.in_static = false;
        self.current_class = None;
    }

    fn check_function(&mut self, function: &mut FnDecl) {
        self.in_static = false;
        self.check_callable(function, None);
    }

    /// Shared body checking for functions and methods. For non-static
    /// methods the receiver's fields (own and inherited) are in scope.
    fn check_callable(&mut self, decl: &mut FnDecl, class: Option<&str>) {
        for param in &decl.params {
            self.validate_type(&param.ty, param.span);
        }
        self.validate_type(&decl.ret, decl.name_span);

        self.scopes.push();
        if let Some(class_name) = class {
            if !self.in_static {
                for (name, ty) in self.all_fields(class_name) {
                    self.scopes.define(name, ty, true);
                }
            }
        }
        for param in &decl.params {
            self.scopes.define(param.name.clone(), param.ty.clone(), false);
        }

        let saved_ret = std::mem::replace(&mut self.current_ret, decl.ret.clone());
        for stmt in &mut decl.body {
            self.check_stmt(stmt);
        }
        self.current_ret = saved_ret;
        self.scopes.pop();
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Let { name, name_span, ty, init, mutable } => {
                let name = name.clone();
                let name_span = *name_span;
                let mutable = *mutable;
                let annotation = ty.clone();
                let init_ty = self.check_expr(init);
                let bound_ty = match annotation {
                    Some(annotated) => {
                        self.validate_type(&annotated, name_span);
                        if !self.assignable(&init_ty, &annotated) {
                            let span = init.span;
                            self.type_mismatch(&annotated, &init_ty, span);
                        }
                        annotated
                    }
                    None => init_ty,
                };
                self.scopes.define(name, bound_ty, mutable);
            }
            StmtKind::Return(value) => {
                let expected = self.current_ret.clone();
                match value {
                    Some(expr) => {
                        let found = self.check_expr(expr);
                        if !self.assignable(&found, &expected) {
                            let span = expr.span;
                            self.sink.error(
                                codes::TYPE_MISMATCH,
                                span,
                                format!("return type mismatch: expected `{expected}`, found `{found}`"),
                            );
                        }
                    }
                    None => {
                        if expected != Type::Void && !expected.is_error() {
                            self.sink.error(
                                codes::TYPE_MISMATCH,
                                stmt.span,
                                format!("expected `{expected}` return value"),
                            );
                        }
                    }
                }
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::If { cond, then_body, else_body } => {
                let cond_ty = self.check_expr(cond);
                if cond_ty != Type::Bool && !cond_ty.is_error() {
                    let span = cond.span;
                    self.sink.error(
                        codes::TYPE_MISMATCH,
                        span,
                        format!("if condition must be `bool`, found `{cond_ty}`"),
                    );
                }
                self.check_body(then_body);
                self.check_body(else_body);
            }
            StmtKind::While { cond, body } => {
                let cond_ty = self.check_expr(cond);
                if cond_ty != Type::Bool && !cond_ty.is_error() {
                    let span = cond.span;
                    self.sink.error(
                        codes::TYPE_MISMATCH,
                        span,
                        format!("while condition must be `bool`, found `{cond_ty}`"),
                    );
                }
                self.check_body(body);
            }
            StmtKind::For { var, iterable, body, .. } => {
                let var = var.clone();
                let iter_ty = self.check_expr(iterable);
                let elem_ty = match iter_ty {
                    Type::Array(elem) => *elem,
                    Type::Error => Type::Error,
                    other => {
                        let span = iterable.span;
                        self.sink.error(
                            codes::TYPE_MISMATCH,
                            span,
                            format!("for loop requires an `Array`, found `{other}`"),
                        );
                        Type::Error
                    }
                };
                self.scopes.push();
                self.scopes.define(var, elem_ty, false);
                for inner in body {
                    self.check_stmt(inner);
                }
                self.scopes.pop();
            }
            StmtKind::Match { scrutinee, arms } => {
                let scrutinee_ty = self.check_expr(scrutinee);
                let scrutinee_span = scrutinee.span;
                self.check_match(scrutinee_ty, scrutinee_span, arms, stmt.span);
            }
            StmtKind::Block(stmts) => {
                self.check_body(stmts);
            }
            StmtKind::Raw(_) => {}
        }
    }

    fn check_body(&mut self, body: &mut Vec<Stmt>) {
        self.scopes.push();
        for stmt in body {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_match(
        &mut self,
        scrutinee_ty: Type,
        scrutinee_span: Span,
        arms: &mut Vec<MatchArm>,
        match_span: Span,
    ) {
        let inner = match &scrutinee_ty {
            Type::Option(inner) => Some((**inner).clone()),
            Type::Error => Some(Type::Error),
            other => {
                self.sink.error(
                    codes::TYPE_MISMATCH,
                    scrutinee_span,
                    format!("match requires an `Option` value, found `{other}`"),
                );
                None
            }
        };

        let mut has_some = false;
        let mut has_none = false;
        for arm in arms.iter_mut() {
            self.scopes.push();
            match &arm.pattern {
                Pattern::Some => {
                    has_some = true;
                    if let Some(binder) = arm.binder.clone() {
                        let bound = inner.clone().unwrap_or(Type::Error);
                        self.scopes.define(binder, bound, false);
                    }
                }
                Pattern::None => {
                    has_none = true;
                }
                Pattern::Name(name) => {
                    // Bare names compare by equality; they must exist and
                    // match the scrutinee's type.
                    match self.scopes.lookup(name).map(|v| v.ty.clone()) {
                        Some(ty) => {
                            if !self.assignable(&ty, &scrutinee_ty)
                                && !self.assignable(&scrutinee_ty, &ty)
                            {
                                self.sink.error(
                                    codes::TYPE_MISMATCH,
                                    arm.pattern_span,
                                    format!(
                                        "pattern type `{ty}` does not match scrutinee type `{scrutinee_ty}`"
                                    ),
                                );
                            }
                        }
                        None => {
                            self.sink.error(
                                codes::NAME_UNDECLARED,
                                arm.pattern_span,
                                format!("undeclared identifier `{name}` in match pattern"),
                            );
                        }
                    }
                }
            }
            for stmt in &mut arm.body {
                self.check_stmt(stmt);
            }
            self.scopes.pop();
        }

        // Missing arms are a warning only; exhaustiveness is not enforced.
        if matches!(scrutinee_ty, Type::Option(_)) && !(has_some && has_none) {
            let missing = if has_some { "None" } else { "Some" };
            self.sink.warning(
                codes::WARN_NON_EXHAUSTIVE_MATCH,
                match_span,
                format!("match on `{scrutinee_ty}` is missing a `{missing}` arm"),
            );
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn check_expr(&mut self, expr: &mut Expr) -> Type {
        let ty = self.expr_type(expr);
        expr.ty = Some(ty.clone());
        ty
    }

    fn expr_type(&mut self, expr: &mut Expr) -> Type {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Float(_) => Type::Float,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Str { value, interpolated } => {
                if *interpolated {
                    let value = value.clone();
                    self.check_interpolation(&value, span);
                }
                Type::String
            }
            ExprKind::Ident(name) => {
                let name = name.clone();
                self.ident_type(&name, span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;
                let lhs_ty = self.check_expr(lhs);
                let rhs_ty = self.check_expr(rhs);
                self.binary_type(op, &lhs_ty, &rhs_ty, span)
            }
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let operand_ty = self.check_expr(operand);
                self.unary_type(op, &operand_ty, span)
            }
            ExprKind::Call { callee, args } => {
                let callee_ty = self.check_expr(callee);
                let arg_tys: Vec<Type> = args.iter_mut().map(|a| self.check_expr(a)).collect();
                match callee_ty {
                    Type::Function { params, ret } => {
                        if params.len() != arg_tys.len() {
                            self.sink.error(
                                codes::TYPE_ARITY,
                                span,
                                format!(
                                    "expected {} argument{}, found {}",
                                    params.len(),
                                    if params.len() == 1 { "" } else { "s" },
                                    arg_tys.len()
                                ),
                            );
                        } else {
                            for (i, (param, arg)) in params.iter().zip(&arg_tys).enumerate() {
                                if !self.assignable(arg, param) {
                                    let arg_span = args[i].span;
                                    self.sink.error(
                                        codes::TYPE_MISMATCH,
                                        arg_span,
                                        format!(
                                            "argument {}: expected `{param}`, found `{arg}`",
                                            i + 1
                                        ),
                                    );
                                }
                            }
                        }
                        *ret
                    }
                    Type::Error => Type::Error,
                    other => {
                        self.sink.error(
                            codes::TYPE_NOT_CALLABLE,
                            callee.span,
                            format!("`{other}` is not callable"),
                        );
                        Type::Error
                    }
                }
            }
            ExprKind::Member { object, name, name_span } => {
                let name = name.clone();
                let name_span = *name_span;
                if let Some(path) = self.module_path_of(object) {
                    mark_module_path(object);
                    self.module_member_type(&path, &name, name_span)
                } else {
                    let object_ty = self.check_expr(object);
                    self.class_member_type(&object_ty, &name, name_span)
                }
            }
            ExprKind::Index { object, index } => {
                let object_ty = self.check_expr(object);
                let index_ty = self.check_expr(index);
                if index_ty != Type::Int && !index_ty.is_error() {
                    let index_span = index.span;
                    self.sink.error(
                        codes::TYPE_MISMATCH,
                        index_span,
                        format!("array index must be `int`, found `{index_ty}`"),
                    );
                }
                match object_ty {
                    Type::Array(elem) => *elem,
                    Type::Error => Type::Error,
                    other => {
                        let object_span = object.span;
                        self.sink.error(
                            codes::TYPE_BAD_OPERAND,
                            object_span,
                            format!("cannot index into `{other}`"),
                        );
                        Type::Error
                    }
                }
            }
            ExprKind::Lambda { params, ret, body } => {
                let param_tys: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
                for param in params.iter() {
                    self.validate_type(&param.ty, param.span);
                }
                let ret_ty = ret.clone().unwrap_or(Type::Void);
                self.scopes.push();
                let params_owned: Vec<(String, Type)> = params
                    .iter()
                    .map(|p| (p.name.clone(), p.ty.clone()))
                    .collect();
                for (name, ty) in params_owned {
                    self.scopes.define(name, ty, false);
                }
                let saved_ret = std::mem::replace(&mut self.current_ret, ret_ty.clone());
                for stmt in body {
                    self.check_stmt(stmt);
                }
                self.current_ret = saved_ret;
                self.scopes.pop();
                Type::Function {
                    params: param_tys,
                    ret: Box::new(ret_ty),
                }
            }
            ExprKind::New { class, args } => {
                let class = class.clone();
                let arg_tys: Vec<Type> = args.iter_mut().map(|a| self.check_expr(a)).collect();
                let arg_spans: Vec<Span> = args.iter().map(|a| a.span).collect();
                self.construct_type(&class, &arg_tys, &arg_spans, span)
            }
            ExprKind::Some(inner) => {
                let inner_ty = self.check_expr(inner);
                Type::Option(Box::new(inner_ty))
            }
            ExprKind::None => Type::Option(Box::new(Type::Error)),
            ExprKind::This => match self.current_class.clone() {
                Some(class) if !self.in_static => Type::Class(class),
                Some(_) => {
                    self.sink.error(
                        codes::NAME_UNDECLARED,
                        span,
                        "`this` is not available in a static method",
                    );
                    Type::Error
                }
                None => {
                    self.sink.error(
                        codes::NAME_UNDECLARED,
                        span,
                        "`this` is only available inside class methods",
                    );
                    Type::Error
                }
            },
            ExprKind::Array(elements) => {
                let mut common: Option<Type> = None;
                let tys: Vec<(Type, Span)> = elements
                    .iter_mut()
                    .map(|e| {
                        let span = e.span;
                        (self.check_expr(e), span)
                    })
                    .collect();
                for (ty, elem_span) in tys {
                    common = Some(match common {
                        None => ty,
                        Some(current) => {
                            if current.is_numeric() && ty.is_numeric() && current != ty {
                                Type::Float
                            } else {
                                if !self.assignable(&ty, &current) {
                                    self.sink.error(
                                        codes::TYPE_MISMATCH,
                                        elem_span,
                                        format!(
                                            "array element type `{ty}` does not match `{current}`"
                                        ),
                                    );
                                }
                                current
                            }
                        }
                    });
                }
                Type::Array(Box::new(common.unwrap_or(Type::Error)))
            }
        }
    }

    /// Resolve a bare identifier: scope, then hoisted functions, then class
    /// constructors, then symbols bound by builtin imports.
    fn ident_type(&mut self, name: &str, span: Span) -> Type {
        if let Some(var) = self.scopes.lookup(name) {
            return var.ty.clone();
        }
        if let Some(sig) = self.functions.get(name) {
            let ty = sig.ty();
            self.mark_symbol_used(name);
            return ty;
        }
        // Sibling methods are callable unqualified inside a method body,
        // matching the emitted member functions.
        if let Some(class_name) = self.current_class.clone() {
            if let Some(sig) = self.find_method(&class_name, name) {
                return sig.ty();
            }
        }
        if let Some(class) = self.classes.get(name) {
            // A class name in call position acts as its positional
            // constructor, matching the emitted target exactly.
            let ty = Type::Function {
                params: class.fields.iter().map(|f| f.ty.clone()).collect(),
                ret: Box::new(Type::Class(name.to_string())),
            };
            self.mark_symbol_used(name);
            return ty;
        }
        for import in self.imports.clone() {
            if !catalog().is_builtin_module(&import) {
                continue;
            }
            if let Some(symbol) = catalog().lookup(&import, name) {
                self.used_imports.insert(import);
                return symbol.ty.clone().unwrap_or(Type::Error);
            }
        }
        self.sink.error(
            codes::NAME_UNDECLARED,
            span,
            format!("undeclared identifier `{name}`"),
        );
        Type::Error
    }

    fn mark_symbol_used(&mut self, name: &str) {
        if let Some(origin) = self.symbol_origin.get(name) {
            self.used_imports.insert(origin.clone());
        }
    }

    fn binary_type(&mut self, op: BinOp, lhs: &Type, rhs: &Type, span: Span) -> Type {
        if lhs.is_error() || rhs.is_error() {
            return if op.is_arithmetic() { Type::Error } else { Type::Bool };
        }
        if op.is_logical() {
            if *lhs != Type::Bool || *rhs != Type::Bool {
                self.bad_operand(op, lhs, rhs, span);
            }
            return Type::Bool;
        }
        if op.is_equality() {
            let comparable =
                lhs == rhs || (lhs.is_numeric() && rhs.is_numeric());
            if !comparable {
                self.bad_operand(op, lhs, rhs, span);
            }
            return Type::Bool;
        }
        if op.is_ordering() {
            let comparable = (lhs.is_numeric() && rhs.is_numeric())
                || (*lhs == Type::String && *rhs == Type::String);
            if !comparable {
                self.bad_operand(op, lhs, rhs, span);
            }
            return Type::Bool;
        }
        // Arithmetic. `+` additionally concatenates strings, matching the
        // target's string semantics.
        if op == BinOp::Add && *lhs == Type::String && *rhs == Type::String {
            return Type::String;
        }
        if lhs.is_numeric() && rhs.is_numeric() {
            return if *lhs == Type::Float || *rhs == Type::Float {
                Type::Float
            } else {
                Type::Int
            };
        }
        self.bad_operand(op, lhs, rhs, span);
        Type::Error
    }

    fn unary_type(&mut self, op: UnOp, operand: &Type, span: Span) -> Type {
        if operand.is_error() {
            return Type::Error;
        }
        match op {
            UnOp::Not => {
                if *operand != Type::Bool {
                    self.sink.error(
                        codes::TYPE_BAD_OPERAND,
                        span,
                        format!("operator `!` requires `bool`, found `{operand}`"),
                    );
                    return Type::Error;
                }
                Type::Bool
            }
            UnOp::Neg => {
                if !operand.is_numeric() {
                    self.sink.error(
                        codes::TYPE_BAD_OPERAND,
                        span,
                        format!("operator `-` requires a numeric operand, found `{operand}`"),
                    );
                    return Type::Error;
                }
                operand.clone()
            }
        }
    }

    fn bad_operand(&mut self, op: BinOp, lhs: &Type, rhs: &Type, span: Span) {
        self.sink.error(
            codes::TYPE_BAD_OPERAND,
            span,
            format!("operator `{}` cannot be applied to `{lhs}` and `{rhs}`", op.as_str()),
        );
    }

    // ── Member access ──────────────────────────────────────────────────

    /// Dotted chain of identifiers that names a module rather than a value.
    fn module_path_of(&self, expr: &Expr) -> Option<String> {
        fn collect(expr: &Expr, segments: &mut Vec<String>) -> bool {
            match &expr.kind {
                ExprKind::Ident(name) => {
                    segments.push(name.clone());
                    true
                }
                ExprKind::Member { object, name, .. } => {
                    if !collect(object, segments) {
                        return false;
                    }
                    segments.push(name.clone());
                    true
                }
                _ => false,
            }
        }

        let mut segments = Vec::new();
        if !collect(expr, &mut segments) {
            return None;
        }
        // A chain shadowed by a local variable is a value, not a path.
        if self.scopes.lookup(&segments[0]).is_some() {
            return None;
        }
        let path = segments.join(".");
        if catalog().is_builtin_module(&path) {
            return Some(path);
        }
        if self.imports.iter().any(|i| *i == path) {
            return Some(path);
        }
        None
    }

    /// Type of `path.name` where `path` is a builtin or imported module.
    fn module_member_type(&mut self, path: &str, name: &str, span: Span) -> Type {
        if catalog().is_builtin_module(path) {
            // Accessing any `Std` surface keeps every builtin import alive.
            for import in &self.imports {
                if catalog().is_builtin_module(import) {
                    self.used_imports.insert(import.clone());
                }
            }
            // `Std.IO` inside `Std.IO.println` is an intermediate module
            // segment, not a symbol.
            let extended = format!("{path}.{name}");
            if catalog().is_builtin_module(&extended) {
                return Type::Void;
            }
            return match catalog().lookup(path, name) {
                Some(symbol) => symbol.ty.clone().unwrap_or(Type::Error),
                None => {
                    self.sink.error(
                        codes::TYPE_NO_SUCH_MEMBER,
                        span,
                        format!("module `{path}` has no symbol `{name}`"),
                    );
                    Type::Error
                }
            };
        }

        self.used_imports.insert(path.to_string());
        let Some(imported) = self.registry.get(path) else {
            return Type::Error;
        };
        if let Some(function) = imported.ast.find_function(name) {
            if !function.is_public {
                self.sink.error(
                    codes::IMPORT_PRIVATE_SYMBOL,
                    span,
                    format!("Cannot access private symbol `{name}` of module `{path}`"),
                );
                return Type::Error;
            }
            return FnSig::of(function).ty();
        }
        if let Some(class) = imported.ast.find_class(name) {
            if !class.is_public {
                self.sink.error(
                    codes::IMPORT_PRIVATE_SYMBOL,
                    span,
                    format!("Cannot access private symbol `{name}` of module `{path}`"),
                );
                return Type::Error;
            }
            let info = ClassInfo::of(class);
            return Type::Function {
                params: info.fields.iter().map(|f| f.ty.clone()).collect(),
                ret: Box::new(Type::Class(name.to_string())),
            };
        }
        self.sink.error(
            codes::TYPE_NO_SUCH_MEMBER,
            span,
            format!("module `{path}` has no symbol `{name}`"),
        );
        Type::Error
    }

    /// Type of `obj.name` where `obj` is a class instance. Private members
    /// are rejected outside their own class.
    fn class_member_type(&mut self, object_ty: &Type, name: &str, span: Span) -> Type {
        let class_name = match object_ty {
            Type::Class(class_name) => class_name.clone(),
            Type::Error => return Type::Error,
            other => {
                self.sink.error(
                    codes::TYPE_NO_SUCH_MEMBER,
                    span,
                    format!("type `{other}` has no members"),
                );
                return Type::Error;
            }
        };

        // Walk the declared parent chain.
        let mut current = Some(class_name.clone());
        let mut seen = FxHashSet::default();
        while let Some(cname) = current {
            if !seen.insert(cname.clone()) {
                break; // parent cycle; already diagnosed at declaration
            }
            let Some(info) = self.classes.get(&cname) else { break };
            if let Some(field) = info.fields.iter().find(|f| f.name == name) {
                let ty = field.ty.clone();
                let is_public = field.is_public;
                if !is_public && self.current_class.as_deref() != Some(cname.as_str()) {
                    self.sink.error(
                        codes::TYPE_PRIVATE_MEMBER,
                        span,
                        format!("Cannot access private member `{name}` of class `{cname}`"),
                    );
                }
                return ty;
            }
            if let Some(method) = info.methods.get(name) {
                let ty = method.ty();
                let is_public = method.is_public;
                if !is_public && self.current_class.as_deref() != Some(cname.as_str()) {
                    self.sink.error(
                        codes::TYPE_PRIVATE_MEMBER,
                        span,
                        format!("Cannot access private member `{name}` of class `{cname}`"),
                    );
                }
                return ty;
            }
            current = self.classes.get(&cname).and_then(|i| i.parent.clone());
        }

        self.sink.error(
            codes::TYPE_NO_SUCH_MEMBER,
            span,
            format!("class `{class_name}` has no member `{name}`"),
        );
        Type::Error
    }

    /// Type of `new Class(args)`: positional over the class's declared
    /// fields, in declaration order.
    fn construct_type(
        &mut self,
        class: &str,
        args: &[Type],
        arg_spans: &[Span],
        span: Span,
    ) -> Type {
        let Some(info) = self.classes.get(class).cloned() else {
            self.sink.error(
                codes::NAME_UNDECLARED,
                span,
                format!("unknown class `{class}`"),
            );
            return Type::Error;
        };
        self.mark_symbol_used(class);
        if info.fields.len() != args.len() {
            self.sink.error(
                codes::TYPE_ARITY,
                span,
                format!(
                    "constructor for `{class}` expects {} argument{}, found {}",
                    info.fields.len(),
                    if info.fields.len() == 1 { "" } else { "s" },
                    args.len()
                ),
            );
        } else {
            for (i, (field, arg)) in info.fields.iter().zip(args).enumerate() {
                if !self.assignable(arg, &field.ty) {
                    self.sink.error(
                        codes::TYPE_MISMATCH,
                        arg_spans[i],
                        format!(
                            "field `{}`: expected `{}`, found `{arg}`",
                            field.name, field.ty
                        ),
                    );
                }
            }
        }
        Type::Class(class.to_string())
    }

    // ── Interpolation ──────────────────────────────────────────────────

    /// Every `{name}` placeholder must resolve to a variable in scope.
    fn check_interpolation(&mut self, value: &str, span: Span) {
        let bytes = value.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'}' {
                    end += 1;
                }
                if end == bytes.len() {
                    break; // no closing brace; the text stays literal
                }
                let name = value[start..end].trim();
                if !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    && self.scopes.lookup(name).is_none()
                {
                    self.sink.error(
                        codes::NAME_UNDECLARED,
                        span,
                        format!("undeclared identifier `{name}` in string interpolation"),
                    );
                }
                i = end + 1;
            } else {
                i += 1;
            }
        }
    }

    // ── Types and assignability ────────────────────────────────────────

    /// Declared types must not mention unknown classes.
    fn validate_type(&mut self, ty: &Type, span: Span) {
        match ty {
            Type::Class(name) => {
                if !self.classes.contains_key(name) {
                    self.sink.error(
                        codes::NAME_UNDECLARED,
                        span,
                        format!("unknown type `{name}`"),
                    );
                } else {
                    self.mark_symbol_used(name);
                }
            }
            Type::Option(inner) | Type::Array(inner) => self.validate_type(inner, span),
            Type::Function { params, ret } => {
                for param in params {
                    self.validate_type(param, span);
                }
                self.validate_type(ret, span);
            }
            _ => {}
        }
    }

    /// Assignability: reflexive on all types; `Int -> Float` widening;
    /// a class is assignable to any declared ancestor; the error type is
    /// assignable in both directions; everything else is structural.
    fn assignable(&self, from: &Type, to: &Type) -> bool {
        if from.is_error() || to.is_error() {
            return true;
        }
        match (from, to) {
            (Type::Int, Type::Float) => true,
            (Type::Class(from_name), Type::Class(to_name)) => {
                from_name == to_name || self.is_ancestor(to_name, from_name)
            }
            (Type::Option(from_inner), Type::Option(to_inner)) => {
                self.assignable(from_inner, to_inner)
            }
            (Type::Array(from_elem), Type::Array(to_elem)) => {
                self.assignable(from_elem, to_elem)
            }
            (
                Type::Function { params: from_params, ret: from_ret },
                Type::Function { params: to_params, ret: to_ret },
            ) => {
                from_params.len() == to_params.len()
                    && from_params
                        .iter()
                        .zip(to_params)
                        .all(|(f, t)| self.assignable(t, f))
                    && self.assignable(from_ret, to_ret)
            }
            _ => from == to,
        }
    }

    /// Signature of a method on `class` or one of its ancestors.
    fn find_method(&self, class: &str, name: &str) -> Option<FnSig> {
        let mut seen = FxHashSet::default();
        let mut current = Some(class.to_string());
        while let Some(cname) = current {
            if !seen.insert(cname.clone()) {
                return None;
            }
            let info = self.classes.get(&cname)?;
            if let Some(sig) = info.methods.get(name) {
                return Some(sig.clone());
            }
            current = info.parent.clone();
        }
        None
    }

    /// Whether `ancestor` appears in `class`'s declared parent chain.
    fn is_ancestor(&self, ancestor: &str, class: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = self.classes.get(class).and_then(|i| i.parent.clone());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent.clone()) {
                return false;
            }
            current = self.classes.get(&parent).and_then(|i| i.parent.clone());
        }
        false
    }

    /// All fields visible on an instance of `class`, ancestors included.
    fn all_fields(&self, class: &str) -> Vec<(String, Type)> {
        let mut fields = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = Some(class.to_string());
        while let Some(cname) = current {
            if !seen.insert(cname.clone()) {
                break;
            }
            let Some(info) = self.classes.get(&cname) else { break };
            for field in &info.fields {
                fields.push((field.name.clone(), field.ty.clone()));
            }
            current = info.parent.clone();
        }
        fields
    }

    fn type_mismatch(&mut self, expected: &Type, found: &Type, span: Span) {
        self.sink.error(
            codes::TYPE_MISMATCH,
            span,
            format!("expected `{expected}`, found `{found}`"),
        );
    }

    // ── Unused imports ─────────────────────────────────────────────────

    /// Warn about registry-module imports nothing referenced. Builtin
    /// imports are exempt: the `Std` surface is shared across them.
    fn warn_unused_imports(&mut self, program: &Program) {
        for using in &program.usings {
            let path = using.dotted();
            let Some(resolved) = resolver::resolve_import(self.registry, &path, &self.module_name)
            else {
                continue; // already reported as unresolved
            };
            if catalog().is_builtin_module(&resolved) {
                continue;
            }
            if !self.used_imports.contains(&resolved) {
                self.sink.warning(
                    codes::WARN_UNUSED_IMPORT,
                    using.path_span,
                    format!("unused import `{path}`"),
                );
            }
        }
    }
}

/// Give every node of a module-path chain a type so annotation stays total.
/// Module paths are not values; `void` marks them inert.
fn mark_module_path(expr: &mut Expr) {
    expr.ty = Some(Type::Void);
    if let ExprKind::Member { object, .. } = &mut expr.kind {
        mark_module_path(object);
    }
}
