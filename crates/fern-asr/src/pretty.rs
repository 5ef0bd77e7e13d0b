//! Deterministic text dump of an ASR.
//! ASR 的确定性文本输出。
//!
//! Scopes print their table first (in name order) and then their body, one
//! statement per line, indented two spaces per nesting level:
//!
//! ```text
//! program main
//!   variable a: allocatable real(4)(:) [local]
//!   allocate(a(10))
//!   implicit deallocate(a)
//! ```

use std::fmt::Write;

use crate::Asr;
use crate::node::*;
use crate::ty::{ArrayDim, Ttype};

/// Render the whole translation unit. / 输出整个翻译单元。
pub fn render(asr: &Asr) -> String {
    let mut printer = Printer {
        asr,
        out: String::new(),
        indent: 0,
    };
    printer.symtab(asr.global_scope());
    printer.out
}

struct Printer<'a> {
    asr: &'a Asr,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn symtab(&mut self, id: SymtabId) {
        let symbols: Vec<_> = self.asr.symtab(id).symbols().collect();
        for symbol in symbols {
            self.symbol(symbol);
        }
    }

    fn symbol(&mut self, id: SymbolId) {
        let asr = self.asr;
        match &asr.symbol(id).kind {
            SymbolKind::Program(program) => {
                self.line(&format!("program {}", program.name));
                self.scope(program.symtab, &program.body);
            }
            SymbolKind::Function(function) => {
                let args: Vec<_> = function.args.iter().map(|a| self.expr(*a)).collect();
                let mut header = format!("function {}({})", function.name, args.join(", "));
                if let Some(result) = function.return_var {
                    let _ = write!(header, " result({})", self.expr(result));
                }
                self.line(&header);
                self.scope(function.symtab, &function.body);
            }
            SymbolKind::Variable(variable) => {
                let mut text = format!(
                    "variable {}: {} [{}]",
                    variable.name,
                    self.ttype(&variable.ttype),
                    variable.intent
                );
                if let Some(init) = variable.init {
                    let _ = write!(text, " = {}", self.expr(init));
                }
                self.line(&text);
            }
        }
    }

    fn scope(&mut self, table: SymtabId, body: &[StmtId]) {
        self.indent += 1;
        self.symtab(table);
        self.block(body);
        self.indent -= 1;
    }

    fn block(&mut self, body: &[StmtId]) {
        for &stmt in body {
            self.stmt(stmt);
        }
    }

    fn names(&self, vars: &[SymbolId]) -> String {
        let names: Vec<_> = vars.iter().map(|v| self.asr.symbol_name(*v)).collect();
        names.join(", ")
    }

    fn exprs(&self, ids: &[ExprId]) -> String {
        let parts: Vec<_> = ids.iter().map(|id| self.expr(*id)).collect();
        parts.join(", ")
    }

    fn stmt(&mut self, id: StmtId) {
        let asr = self.asr;
        match &asr.stmt(id).kind {
            StmtKind::Assignment { target, value } => {
                let text = format!("{} = {}", self.expr(*target), self.expr(*value));
                self.line(&text);
            }
            StmtKind::Allocate { args } => {
                let parts: Vec<_> = args
                    .iter()
                    .map(|arg| format!("{}({})", asr.symbol_name(arg.var), self.exprs(&arg.dims)))
                    .collect();
                self.line(&format!("allocate({})", parts.join(", ")));
            }
            StmtKind::ExplicitDeallocate { vars } => {
                let text = format!("deallocate({})", self.names(vars));
                self.line(&text);
            }
            StmtKind::ImplicitDeallocate { vars } => {
                let text = format!("implicit deallocate({})", self.names(vars));
                self.line(&text);
            }
            StmtKind::If { test, body, orelse } => {
                let text = format!("if {}", self.expr(*test));
                self.line(&text);
                self.indent += 1;
                self.block(body);
                self.indent -= 1;
                if !orelse.is_empty() {
                    self.line("else");
                    self.indent += 1;
                    self.block(orelse);
                    self.indent -= 1;
                }
            }
            StmtKind::DoLoop {
                var,
                start,
                end,
                increment,
                body,
            } => {
                let mut text = format!(
                    "do {} = {}, {}",
                    self.expr(*var),
                    self.expr(*start),
                    self.expr(*end)
                );
                if let Some(step) = increment {
                    let _ = write!(text, ", {}", self.expr(*step));
                }
                self.line(&text);
                self.indent += 1;
                self.block(body);
                self.indent -= 1;
            }
            StmtKind::SubroutineCall { name, args } => {
                let text = format!("call {}({})", asr.symbol_name(*name), self.exprs(args));
                self.line(&text);
            }
            StmtKind::Print { values } => {
                let text = format!("print {}", self.exprs(values));
                self.line(&text);
            }
            StmtKind::Return => self.line("return"),
        }
    }

    /// Fully parenthesized, so the text does not depend on precedence.
    fn expr(&self, id: ExprId) -> String {
        let asr = self.asr;
        match &asr.expr(id).kind {
            ExprKind::Var(symbol) => asr.symbol_name(*symbol).to_owned(),
            ExprKind::IntegerConstant { value, .. } => value.to_string(),
            ExprKind::RealConstant { value, .. } => format!("{value:?}"),
            ExprKind::LogicalConstant { value, .. } => {
                let text = if *value { ".true." } else { ".false." };
                text.to_owned()
            }
            ExprKind::StringConstant { value, .. } => format!("{value:?}"),
            ExprKind::BinOp {
                left, op, right, ..
            } => format!("({} {} {})", self.expr(*left), op.symbol(), self.expr(*right)),
            ExprKind::UnaryMinus { operand, .. } => format!("(-{})", self.expr(*operand)),
            ExprKind::Compare {
                left, op, right, ..
            } => format!("({} {} {})", self.expr(*left), op.symbol(), self.expr(*right)),
            ExprKind::LogicalBinOp {
                left, op, right, ..
            } => format!("({} {} {})", self.expr(*left), op.symbol(), self.expr(*right)),
            ExprKind::LogicalNot { operand, .. } => format!("(.not. {})", self.expr(*operand)),
            ExprKind::ArrayItem { var, indices, .. } => {
                format!("{}({})", asr.symbol_name(*var), self.exprs(indices))
            }
            ExprKind::FunctionCall { name, args, .. } => {
                format!("{}({})", asr.symbol_name(*name), self.exprs(args))
            }
        }
    }

    fn ttype(&self, ttype: &Ttype) -> String {
        match ttype {
            Ttype::Array { element, dims } => {
                let dims: Vec<_> = dims
                    .iter()
                    .map(|dim| match dim {
                        ArrayDim::Deferred => ":".to_owned(),
                        ArrayDim::Explicit(id) => self.expr(*id),
                    })
                    .collect();
                format!("{}({})", self.ttype(element), dims.join(","))
            }
            Ttype::Allocatable(inner) => format!("allocatable {}", self.ttype(inner)),
            scalar => scalar.to_string(),
        }
    }
}
