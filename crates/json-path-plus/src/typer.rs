//! Compile-time type discipline for filter expressions.
//!
//! Every filter sub-expression is either value-producing or
//! nodes-producing. Comparison operands must produce values (a path operand
//! is projected to a single scalar at run time); function parameters and
//! returns are checked against the signature table; strict RFC mode
//! additionally requires comparison and value-parameter paths to be
//! singular queries.
//!
//! Literal `match`/`search` patterns are compiled here and memoized in the
//! resulting [`RegexCache`].

use crate::error::CompileError;
use crate::functions::{self, FunctionDef, ParamKind, RegexCache, ReturnKind};
use crate::types::{ContextVar, FilterExpr, FnCall, Literal, Operand, Path, Segment, Selector};

/// Type-check all filters in `path` and precompile literal regex patterns.
pub(crate) fn check(path: &Path, strict: bool) -> Result<RegexCache, CompileError> {
    let mut checker = Checker {
        strict,
        regexes: RegexCache::default(),
    };
    checker.check_segments(&path.segments)?;
    Ok(checker.regexes)
}

struct Checker {
    strict: bool,
    regexes: RegexCache,
}

impl Checker {
    fn check_segments(&mut self, segments: &[Segment]) -> Result<(), CompileError> {
        for segment in segments {
            for selector in &segment.selectors {
                if let Selector::Filter(expr) = selector {
                    self.check_expr(expr)?;
                }
            }
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &FilterExpr) -> Result<(), CompileError> {
        match expr {
            FilterExpr::Or(left, right) | FilterExpr::And(left, right) => {
                self.check_expr(left)?;
                self.check_expr(right)
            }
            FilterExpr::Not(inner) => self.check_expr(inner),
            FilterExpr::Compare { left, right, .. } => {
                self.check_value_operand(left)?;
                self.check_value_operand(right)
            }
            FilterExpr::Exists(path) => self.check_segments(&path.segments),
            FilterExpr::Test(call) => {
                let def = self.check_call(call)?;
                if def.ret != ReturnKind::Logical {
                    return Err(CompileError::Type(
                        format!(
                            "function '{}' does not return a boolean and cannot be a filter test",
                            call.name
                        ),
                        call.offset,
                    ));
                }
                Ok(())
            }
        }
    }

    /// An operand used where a single value is required.
    fn check_value_operand(&mut self, operand: &Operand) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(_) | Operand::Var(_) => Ok(()),
            Operand::Path(path) => {
                if self.strict && !path.is_singular() {
                    return Err(CompileError::Type(
                        "comparison operand must be a singular query in strict mode".to_string(),
                        path.offset,
                    ));
                }
                self.check_segments(&path.segments)
            }
            Operand::Call(call) => {
                let def = self.check_call(call)?;
                if def.ret == ReturnKind::Logical {
                    return Err(CompileError::Type(
                        format!(
                            "function '{}' returns a boolean and cannot be a comparison operand",
                            call.name
                        ),
                        call.offset,
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_call(&mut self, call: &FnCall) -> Result<&'static FunctionDef, CompileError> {
        let def = functions::lookup(&call.name).ok_or_else(|| {
            CompileError::Type(format!("unknown function '{}'", call.name), call.offset)
        })?;
        if self.strict && def.extension {
            return Err(CompileError::ExtensionDisabled(
                call.name.clone(),
                call.offset,
            ));
        }
        if call.args.len() != def.params.len() {
            return Err(CompileError::Type(
                format!(
                    "function '{}' expects {} argument(s), got {}",
                    call.name,
                    def.params.len(),
                    call.args.len()
                ),
                call.offset,
            ));
        }

        for (param, arg) in def.params.iter().zip(&call.args) {
            match param {
                ParamKind::Value | ParamKind::Any => self.check_value_like(call, arg, *param)?,
                ParamKind::Nodes => match arg {
                    Operand::Path(path) => self.check_segments(&path.segments)?,
                    Operand::Var(ContextVar::Parent) => {}
                    _ => {
                        return Err(CompileError::Type(
                            format!("function '{}' expects a nodelist argument", call.name),
                            call.offset,
                        ))
                    }
                },
            }
        }

        // Literal patterns are compiled now; failures are type errors.
        if matches!(call.name.as_str(), "match" | "search") {
            if let Some(Operand::Literal(Literal::Str(pattern))) = call.args.get(1) {
                let anchored = call.name == "match";
                self.regexes.insert(anchored, pattern).map_err(|err| {
                    CompileError::Type(
                        format!("invalid regular expression '{pattern}': {err}"),
                        call.offset,
                    )
                })?;
            }
        }

        Ok(def)
    }

    fn check_value_like(
        &mut self,
        call: &FnCall,
        arg: &Operand,
        param: ParamKind,
    ) -> Result<(), CompileError> {
        match arg {
            Operand::Literal(_) | Operand::Var(_) => Ok(()),
            Operand::Path(path) => {
                if self.strict && param == ParamKind::Value && !path.is_singular() {
                    return Err(CompileError::Type(
                        format!(
                            "function '{}' requires a singular query argument in strict mode",
                            call.name
                        ),
                        path.offset,
                    ));
                }
                self.check_segments(&path.segments)
            }
            Operand::Call(inner) => {
                let def = self.check_call(inner)?;
                if def.ret == ReturnKind::Logical {
                    return Err(CompileError::Type(
                        format!(
                            "function '{}' returns a boolean and cannot be an argument of '{}'",
                            inner.name, call.name
                        ),
                        inner.offset,
                    ));
                }
                Ok(())
            }
        }
    }
}
