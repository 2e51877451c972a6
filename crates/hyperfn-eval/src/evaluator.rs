//! Core expression and statement evaluator.

use std::collections::BTreeMap;

use hyperfn_transform::MASK_PARAM;
use hyperfn_types::ast::*;

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Steps allowed per evaluator before [`EvalError::GasExhausted`].
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Nested calls allowed before [`EvalError::StackOverflow`].
pub const MAX_CALL_DEPTH: usize = 64;

/// Outcome of executing a statement.
enum Flow {
    Normal,
    Return(Value),
}

/// One step of an assignment target below its root variable.
enum Step {
    Field(String),
    Index(i64),
}

/// Walks the functions of one program and produces Values.
pub struct Evaluator<'p> {
    program: &'p Program,
    /// Variable environment (scoped). Top-level variables live in the globals.
    pub env: Environment,
    /// Gas counter. Limits total steps to stop runaway loops.
    pub gas: u64,
    pub gas_limit: u64,
    depth: usize,
}

impl<'p> Evaluator<'p> {
    /// Create an evaluator and run the program's top-level variable
    /// initializers in declaration order.
    pub fn new(program: &'p Program) -> EvalResult<Self> {
        Self::with_gas_limit(program, DEFAULT_GAS_LIMIT)
    }

    pub fn with_gas_limit(program: &'p Program, gas_limit: u64) -> EvalResult<Self> {
        let mut evaluator = Self {
            program,
            env: Environment::new(),
            gas: 0,
            gas_limit,
            depth: 0,
        };
        for item in &program.items {
            if let Item::Variable(var) = item {
                let value = match var.value {
                    Some(value) => evaluator.eval_expr(value)?,
                    None => Value::Null,
                };
                evaluator.env.define(&var.name.name, value);
            }
        }
        Ok(evaluator)
    }

    fn arena(&self) -> &'p Arena {
        &self.program.arena
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    /// Call a top-level function the way a native caller would: `None` (or
    /// a missing trailing argument) falls back to the parameter's
    /// initializer, evaluated after the earlier parameters are bound.
    pub fn call(&mut self, name: &str, args: Vec<Option<Value>>) -> EvalResult<Value> {
        let function = self.lookup(name)?;
        self.invoke(function, None, args).map(|(value, _)| value)
    }

    /// Call a rewritten function: every argument is passed positionally
    /// and `mask` is appended as the trailing supplied-parameters value.
    pub fn call_with_mask(&mut self, name: &str, args: Vec<Value>, mask: u64) -> EvalResult<Value> {
        let function = self.lookup(name)?;
        let takes_mask = function
            .params
            .last()
            .is_some_and(|p| p.name.name == MASK_PARAM);
        if !takes_mask {
            return Err(EvalError::TypeMismatch(format!(
                "'{name}' does not take a {MASK_PARAM} argument"
            )));
        }
        let mut full: Vec<Option<Value>> = args.into_iter().map(Some).collect();
        full.push(Some(Value::Int(mask as i64)));
        self.invoke(function, None, full).map(|(value, _)| value)
    }

    /// Resolve a function by host name first, then by declared identifier.
    fn lookup(&self, name: &str) -> EvalResult<&'p FunctionDecl> {
        let program = self.program;
        program
            .function(name)
            .or_else(|| program.functions().find(|f| f.name.name == name))
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
    }

    /// Run `function` in a fresh frame. Returns the result and, for
    /// methods, the receiver as the body left it.
    fn invoke(
        &mut self,
        function: &'p FunctionDecl,
        this: Option<Value>,
        args: Vec<Option<Value>>,
    ) -> EvalResult<(Value, Option<Value>)> {
        let name = function.resolved_name();
        if args.len() > function.params.len() {
            return Err(EvalError::ArityMismatch {
                function: name.to_string(),
                expected: function.params.len(),
                got: args.len(),
            });
        }
        let Some(body) = &function.body else {
            return Err(EvalError::UnknownFunction(format!("{name} is a host import")));
        };
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::StackOverflow);
        }

        self.depth += 1;
        let frame = self.env.enter_call();
        let has_this = this.is_some();
        if let Some(this) = this {
            self.env.define("this", this);
        }
        let result = self.run_body(function, body, args);
        let this_after = if has_this {
            self.env.get("this").cloned()
        } else {
            None
        };
        self.env.leave_call(frame);
        self.depth -= 1;
        result.map(|value| (value, this_after))
    }

    fn run_body(
        &mut self,
        function: &'p FunctionDecl,
        body: &'p Block,
        args: Vec<Option<Value>>,
    ) -> EvalResult<Value> {
        let mut args = args.into_iter();
        for param in &function.params {
            let value = match args.next().flatten() {
                Some(value) => value,
                None => match param.initializer {
                    Some(init) => self.eval_expr(init)?,
                    None => {
                        return Err(EvalError::MissingArgument {
                            function: function.resolved_name().to_string(),
                            parameter: param.name.name.clone(),
                        })
                    }
                },
            };
            self.env.define(&param.name.name, value);
        }
        match self.exec_stmts(&body.stmts)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec_stmts(&mut self, stmts: &[StmtId]) -> EvalResult<Flow> {
        for &stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, id: StmtId) -> EvalResult<Flow> {
        self.tick()?;
        let arena = self.arena();
        match &arena[id].kind {
            StmtKind::Block(block) => {
                self.env.push_scope();
                let flow = self.exec_stmts(&block.stmts);
                self.env.pop_scope();
                flow
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(*expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Local { name, value, .. } => {
                let value = match value {
                    Some(value) => self.eval_expr(*value)?,
                    None => Value::Null,
                };
                self.env.define(&name.name, value);
                Ok(Flow::Normal)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(*condition)?.is_truthy() {
                    self.exec_stmt(*then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(*else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { condition, body } => {
                while self.eval_expr(*condition)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_stmt(*body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval_expr(*value)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Throw(value) => Err(EvalError::Thrown(self.eval_expr(*value)?)),
            StmtKind::Empty => Ok(Flow::Normal),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, id: ExprId) -> EvalResult<Value> {
        self.tick()?;
        let arena = self.arena();
        match &arena[id].kind {
            ExprKind::Literal(literal) => self.eval_literal(literal),
            ExprKind::Identifier(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            ExprKind::This => self
                .env
                .get("this")
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable("this".to_string())),
            ExprKind::New { type_ann, args } => self.eval_new(type_ann, args),
            ExprKind::Call { callee, args, .. } => self.eval_call(*callee, args),
            ExprKind::Member { object, property } => {
                let object = self.eval_expr(*object)?;
                member(&object, &property.name)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(*object)?;
                let index = self.eval_expr(*index)?;
                let index = index.as_int().ok_or_else(|| {
                    EvalError::TypeMismatch(format!("index must be an integer, got {}", index.type_name()))
                })?;
                element(&object, index)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(*operand)?;
                unary(*op, value)
            }
            ExprKind::Assign { op, target, value } => self.eval_assign(*op, *target, *value),
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval_expr(*condition)?.is_truthy() {
                    self.eval_expr(*then)
                } else {
                    self.eval_expr(*otherwise)
                }
            }
            ExprKind::As { expr, type_ann } => {
                let value = self.eval_expr(*expr)?;
                Ok(cast(value, type_ann))
            }
            ExprKind::Paren(inner) => self.eval_expr(*inner),
        }
    }

    // ── Literals ──────────────────────────────────────────────────────────

    fn eval_literal(&mut self, literal: &'p Literal) -> EvalResult<Value> {
        Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            // u64 literals above i64::MAX keep their bit pattern.
            Literal::Integer { value, .. } => Value::Int(*value as i64),
            Literal::Float { value, .. } => Value::Float(*value),
            Literal::String(s) => Value::Str(s.clone()),
            Literal::Array(items) => Value::Array(self.eval_list(items)?),
            Literal::Object(entries) => {
                let mut fields = BTreeMap::new();
                for (key, value) in entries {
                    fields.insert(key.name.clone(), self.eval_expr(*value)?);
                }
                Value::Object {
                    class: None,
                    fields,
                }
            }
        })
    }

    fn eval_list(&mut self, items: &[ExprId]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(items.len());
        for &item in items {
            values.push(self.eval_expr(item)?);
        }
        Ok(values)
    }

    // ── Calls & construction ─────────────────────────────────────────────

    fn eval_call(&mut self, callee: ExprId, args: &[ExprId]) -> EvalResult<Value> {
        let arena = self.arena();
        match &arena[callee].kind {
            // Base constructors are not modeled.
            ExprKind::Identifier(name) if name == "super" => {
                self.eval_list(args)?;
                Ok(Value::Null)
            }
            ExprKind::Identifier(name) => {
                let function = self.lookup(name)?;
                let args = self.eval_list(args)?.into_iter().map(Some).collect();
                self.invoke(function, None, args).map(|(value, _)| value)
            }
            ExprKind::Member { object, property } => {
                let receiver = self.eval_expr(*object)?;
                let args = self.eval_list(args)?;
                let (result, receiver_after) = self.call_method(receiver, &property.name, args)?;
                if let Some(receiver_after) = receiver_after {
                    if let Ok((root, path)) = self.place(*object) {
                        self.store(&root, &path, receiver_after)?;
                    }
                }
                Ok(result)
            }
            _ => Err(EvalError::TypeMismatch("callee is not callable".to_string())),
        }
    }

    /// Returns the result and the receiver, when the call may have changed it.
    fn call_method(
        &mut self,
        receiver: Value,
        method: &str,
        args: Vec<Value>,
    ) -> EvalResult<(Value, Option<Value>)> {
        match receiver {
            Value::Object {
                class: Some(ref class),
                ..
            } => {
                let class = class.clone();
                let program = self.program;
                let decl = program
                    .class(&class)
                    .and_then(|c| c.methods.iter().find(|m| m.name.name == method))
                    .ok_or_else(|| EvalError::UnknownFunction(format!("{class}.{method}")))?;
                let args = args.into_iter().map(Some).collect();
                self.invoke(decl, Some(receiver), args)
            }
            Value::Array(mut items) => match method {
                "push" => {
                    items.extend(args);
                    let len = Value::Int(items.len() as i64);
                    Ok((len, Some(Value::Array(items))))
                }
                "includes" => {
                    let needle = args.first().unwrap_or(&Value::Null);
                    let found = items.iter().any(|item| loose_eq(item, needle));
                    Ok((Value::Bool(found), None))
                }
                "indexOf" => {
                    let needle = args.first().unwrap_or(&Value::Null);
                    let index = items
                        .iter()
                        .position(|item| loose_eq(item, needle))
                        .map_or(-1, |i| i as i64);
                    Ok((Value::Int(index), None))
                }
                _ => Err(EvalError::UnknownFunction(format!("array.{method}"))),
            },
            Value::Null => Err(EvalError::NullAccess(format!("cannot call '{method}' on null"))),
            other => Err(EvalError::UnknownFunction(format!(
                "{}.{method}",
                other.type_name()
            ))),
        }
    }

    /// `new T(args)`: fields start from their initializers (or the zero
    /// value of their type), then the constructor runs with `this` bound.
    fn eval_new(&mut self, type_ann: &'p TypeAnnotation, args: &[ExprId]) -> EvalResult<Value> {
        let name = type_ann.base_name().unwrap_or_default().to_string();
        let program = self.program;
        let class = program
            .class(&name)
            .ok_or_else(|| EvalError::UnknownClass(type_ann.to_string()))?;

        let mut fields = BTreeMap::new();
        for field in &class.fields {
            let value = match field.initializer {
                Some(init) => self.eval_expr(init)?,
                None => zero_value(&field.type_ann),
            };
            fields.insert(field.name.name.clone(), value);
        }
        let instance = Value::Object {
            class: Some(name.clone()),
            fields,
        };

        let args = self.eval_list(args)?;
        match class.methods.iter().find(|m| m.name.name == "constructor") {
            Some(ctor) => {
                let args = args.into_iter().map(Some).collect();
                let (_, this_after) = self.invoke(ctor, Some(instance.clone()), args)?;
                Ok(this_after.unwrap_or(instance))
            }
            None if args.is_empty() => Ok(instance),
            None => Err(EvalError::ArityMismatch {
                function: format!("{name}.constructor"),
                expected: 0,
                got: args.len(),
            }),
        }
    }

    // ── Operators ─────────────────────────────────────────────────────────

    fn eval_binary(&mut self, op: BinOp, left: ExprId, right: ExprId) -> EvalResult<Value> {
        let left = self.eval_expr(left)?;
        match op {
            BinOp::And if !left.is_truthy() => return Ok(left),
            BinOp::Or if left.is_truthy() => return Ok(left),
            BinOp::And | BinOp::Or => return self.eval_expr(right),
            _ => {}
        }
        let right = self.eval_expr(right)?;
        binary(op, left, right)
    }

    // ── Assignment ────────────────────────────────────────────────────────

    fn eval_assign(&mut self, op: Option<BinOp>, target: ExprId, value: ExprId) -> EvalResult<Value> {
        let (root, path) = self.place(target)?;
        let current = match op {
            Some(_) => Some(self.load(&root, &path)?),
            None => None,
        };
        let value = self.eval_expr(value)?;
        let value = match (op, current) {
            (Some(op), Some(current)) => binary(op, current, value)?,
            _ => value,
        };
        self.store(&root, &path, value.clone())?;
        Ok(value)
    }

    /// Resolve an assignment target to its root variable and the steps
    /// below it. Index expressions are evaluated here, once.
    fn place(&mut self, target: ExprId) -> EvalResult<(String, Vec<Step>)> {
        let arena = self.arena();
        match &arena[target].kind {
            ExprKind::Identifier(name) => Ok((name.clone(), Vec::new())),
            ExprKind::This => Ok(("this".to_string(), Vec::new())),
            ExprKind::Paren(inner) => self.place(*inner),
            ExprKind::Member { object, property } => {
                let (root, mut path) = self.place(*object)?;
                path.push(Step::Field(property.name.clone()));
                Ok((root, path))
            }
            ExprKind::Index { object, index } => {
                let (root, mut path) = self.place(*object)?;
                let index = self.eval_expr(*index)?;
                let index = index.as_int().ok_or_else(|| {
                    EvalError::TypeMismatch(format!("index must be an integer, got {}", index.type_name()))
                })?;
                path.push(Step::Index(index));
                Ok((root, path))
            }
            _ => Err(EvalError::TypeMismatch("invalid assignment target".to_string())),
        }
    }

    fn load(&self, root: &str, path: &[Step]) -> EvalResult<Value> {
        let mut current = self
            .env
            .get(root)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(root.to_string()))?;
        for step in path {
            current = match step {
                Step::Field(name) => member(&current, name)?,
                Step::Index(index) => element(&current, *index)?,
            };
        }
        Ok(current)
    }

    fn store(&mut self, root: &str, path: &[Step], value: Value) -> EvalResult<()> {
        let slot = self
            .env
            .get_mut(root)
            .ok_or_else(|| EvalError::UndefinedVariable(root.to_string()))?;
        let slot = path.iter().try_fold(slot, descend)?;
        *slot = value;
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Value operations
// ══════════════════════════════════════════════════════════════════════════

fn descend<'v>(slot: &'v mut Value, step: &Step) -> EvalResult<&'v mut Value> {
    match (slot, step) {
        (Value::Object { fields, .. }, Step::Field(name)) => {
            Ok(fields.entry(name.clone()).or_insert(Value::Null))
        }
        (Value::Array(items), Step::Index(index)) => {
            let len = items.len();
            usize::try_from(*index)
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or(EvalError::IndexOutOfBounds { index: *index, len })
        }
        (Value::Null, _) => Err(EvalError::NullAccess("cannot assign through null".to_string())),
        (other, _) => Err(EvalError::TypeMismatch(format!(
            "cannot assign into {}",
            other.type_name()
        ))),
    }
}

fn member(object: &Value, name: &str) -> EvalResult<Value> {
    match object {
        Value::Object { fields, class } => fields.get(name).cloned().ok_or_else(|| {
            EvalError::TypeMismatch(format!(
                "{} has no field '{name}'",
                class.as_deref().unwrap_or("object")
            ))
        }),
        Value::Array(items) if name == "length" => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) if name == "length" => Ok(Value::Int(s.encode_utf16().count() as i64)),
        Value::Null => Err(EvalError::NullAccess(format!(
            "cannot access field '{name}' on null"
        ))),
        other => Err(EvalError::TypeMismatch(format!(
            "{} has no field '{name}'",
            other.type_name()
        ))),
    }
}

fn element(object: &Value, index: i64) -> EvalResult<Value> {
    match object {
        Value::Array(items) => usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or(EvalError::IndexOutOfBounds {
                index,
                len: items.len(),
            }),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            usize::try_from(index)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::Str(c.to_string()))
                .ok_or(EvalError::IndexOutOfBounds {
                    index,
                    len: chars.len(),
                })
        }
        Value::Null => Err(EvalError::NullAccess(format!("cannot index null with {index}"))),
        other => Err(EvalError::TypeMismatch(format!(
            "cannot index {}",
            other.type_name()
        ))),
    }
}

/// Two numeric operands, widened to float when either side is a float.
enum Numbers {
    Int(i64, i64),
    Float(f64, f64),
}

fn numbers(op: BinOp, left: &Value, right: &Value) -> EvalResult<Numbers> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Numbers::Int(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Ok(Numbers::Float(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Ok(Numbers::Float(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Ok(Numbers::Float(*a, *b)),
        _ => Err(mismatch(op, left, right)),
    }
}

/// Integer view for bitwise operators. Booleans count as 0 or 1.
fn bits(op: BinOp, left: &Value, right: &Value) -> EvalResult<(i64, i64)> {
    let as_bits = |v: &Value| match v {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    match (as_bits(left), as_bits(right)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, left, right)),
    }
}

fn mismatch(op: BinOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{}' to {} and {}",
        op.as_str(),
        left.type_name(),
        right.type_name()
    ))
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        _ => left == right,
    }
}

fn binary(op: BinOp, left: Value, right: Value) -> EvalResult<Value> {
    use BinOp::*;
    match op {
        Eq | StrictEq => Ok(Value::Bool(loose_eq(&left, &right))),
        NotEq | StrictNotEq => Ok(Value::Bool(!loose_eq(&left, &right))),
        And => Ok(if left.is_truthy() { right } else { left }),
        Or => Ok(if left.is_truthy() { left } else { right }),
        Add => match (&left, &right) {
            (Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
            (a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => Ok(match numbers(op, &left, &right)? {
                Numbers::Int(a, b) => Value::Int(a.wrapping_add(b)),
                Numbers::Float(a, b) => Value::Float(a + b),
            }),
        },
        Sub => Ok(match numbers(op, &left, &right)? {
            Numbers::Int(a, b) => Value::Int(a.wrapping_sub(b)),
            Numbers::Float(a, b) => Value::Float(a - b),
        }),
        Mul => Ok(match numbers(op, &left, &right)? {
            Numbers::Int(a, b) => Value::Int(a.wrapping_mul(b)),
            Numbers::Float(a, b) => Value::Float(a * b),
        }),
        Div | Rem => match numbers(op, &left, &right)? {
            Numbers::Int(_, 0) => Err(EvalError::ArithmeticTrap("integer division by zero".to_string())),
            Numbers::Int(a, b) if op == Div => Ok(Value::Int(a.wrapping_div(b))),
            Numbers::Int(a, b) => Ok(Value::Int(a.wrapping_rem(b))),
            Numbers::Float(a, b) if op == Div => Ok(Value::Float(a / b)),
            Numbers::Float(a, b) => Ok(Value::Float(a % b)),
        },
        Less | Greater | LessEq | GreaterEq => {
            let ordering = match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => match numbers(op, &left, &right)? {
                    Numbers::Int(a, b) => Some(a.cmp(&b)),
                    Numbers::Float(a, b) => a.partial_cmp(&b),
                },
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match op {
                Less => ordering.is_lt(),
                Greater => ordering.is_gt(),
                LessEq => ordering.is_le(),
                _ => ordering.is_ge(),
            }))
        }
        BitAnd | BitOr | BitXor | Shl | Shr | ShrU => {
            let (a, b) = bits(op, &left, &right)?;
            let shift = (b & 63) as u32;
            Ok(Value::Int(match op {
                BitAnd => a & b,
                BitOr => a | b,
                BitXor => a ^ b,
                Shl => a.wrapping_shl(shift),
                Shr => a.wrapping_shr(shift),
                _ => ((a as u64) >> shift) as i64,
            }))
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Plus, value @ (Value::Int(_) | Value::Float(_))) => Ok(value),
        (UnaryOp::BitNot, Value::Int(i)) => Ok(Value::Int(!i)),
        (op, value) => Err(EvalError::TypeMismatch(format!(
            "cannot apply '{}' to {}",
            op.as_str(),
            value.type_name()
        ))),
    }
}

/// `value as T` for primitive targets. Integer targets wrap to their width.
fn cast(value: Value, type_ann: &TypeAnnotation) -> Value {
    let TypeKind::Named { segments, args } = &type_ann.kind else {
        return value;
    };
    if segments.len() != 1 || !args.is_empty() {
        return value;
    }
    let int = match &value {
        Value::Int(i) => Some(*i),
        Value::Float(f) => Some(*f as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    match (segments[0].name.as_str(), int) {
        ("i8", Some(i)) => Value::Int(i64::from(i as i8)),
        ("u8", Some(i)) => Value::Int(i64::from(i as u8)),
        ("i16", Some(i)) => Value::Int(i64::from(i as i16)),
        ("u16", Some(i)) => Value::Int(i64::from(i as u16)),
        ("i32" | "isize", Some(i)) => Value::Int(i64::from(i as i32)),
        ("u32" | "usize", Some(i)) => Value::Int(i64::from(i as u32)),
        ("i64" | "u64", Some(i)) => Value::Int(i),
        ("f32" | "f64", _) => match value {
            Value::Int(i) => Value::Float(i as f64),
            other => other,
        },
        ("bool", _) => Value::Bool(value.is_truthy()),
        _ => value,
    }
}

/// Value of a field declared without an initializer.
fn zero_value(type_ann: &TypeAnnotation) -> Value {
    match type_ann.base_name() {
        Some("i8" | "u8" | "i16" | "u16" | "i32" | "u32" | "i64" | "u64" | "isize" | "usize") => {
            Value::Int(0)
        }
        Some("f32" | "f64") => Value::Float(0.0),
        Some("bool") => Value::Bool(false),
        _ => Value::Null,
    }
}
