//! Peephole rewriting of operation bodies.
//!
//! A [`PeepholeRule`] looks at one instruction at a time and, when it matches, emits a
//! replacement run of instructions in its place. [`rewrite`] drives a rule over a whole
//! [`InstructionSequence`] in a single forward scan:
//!
//! ```text
//!   input:  ldarg.0  ldstr "Temp"  callvirt StartsWith(string)                 ret
//!   output: ldarg.0  ldstr "Temp"  ldc.i4.4  callvirt StartsWith(string, cmp)  ret
//! ```
//!
//! The output is assembled into a fresh sequence; the input is only read. Any error raised
//! by the rule aborts the scan and the partially built output is dropped, so callers either
//! get a fully rewritten body or an error, never something in between.
//!
//! [`CallSiteRewrite`] is the one rule this crate ships: it retargets every virtual call to
//! one operation onto another overload, pushing an extra constant argument first.

use crate::{
    assembly::{Instruction, InstructionSequence},
    metadata::token::Token,
    patch::{
        catalog::{STARTS_WITH, STARTS_WITH_COMPARISON},
        host::HostIntrospection,
    },
    Error, Result,
};

/// A local instruction substitution.
pub trait PeepholeRule {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Should `instruction` be replaced?
    ///
    /// # Errors
    ///
    /// Returns an error if the instruction cannot be inspected. The whole rewrite is
    /// abandoned.
    fn matches(&self, instruction: &Instruction) -> Result<bool>;

    /// Emits the replacement for a matched `instruction` into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid replacement can be produced.
    fn expand(&self, instruction: &Instruction, out: &mut InstructionSequence) -> Result<()>;

    /// Extra output capacity to reserve up front for rewriting `input`.
    fn growth(&self, _input: &InstructionSequence) -> usize {
        0
    }
}

/// Outcome of a successful [`rewrite`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    /// The rewritten body (identical to the input if nothing matched)
    pub sequence: InstructionSequence,
    /// Number of instructions the rule replaced
    pub sites: usize,
}

/// Applies `rule` to every instruction of `input` in one forward scan.
///
/// Instructions emitted by an expansion are not rescanned. Unmatched instructions are copied
/// in order.
///
/// # Errors
///
/// Returns the first error raised by the rule; no partial output is returned.
pub fn rewrite<R>(rule: &R, input: &InstructionSequence) -> Result<Rewritten>
where
    R: PeepholeRule + ?Sized,
{
    let mut sequence = InstructionSequence::with_capacity(input.len() + rule.growth(input));
    let mut sites = 0;

    for instruction in input {
        if rule.matches(instruction)? {
            rule.expand(instruction, &mut sequence)?;
            sites += 1;
        } else {
            sequence.push(instruction.clone());
        }
    }

    log::debug!(
        "{}: rewrote {} call-site(s), {} -> {} instructions",
        rule.name(),
        sites,
        input.len(),
        sequence.len()
    );
    Ok(Rewritten { sequence, sites })
}

/// Retargets `callvirt original` to `callvirt replacement`, preceded by `inserted`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSiteRewrite {
    original: Token,
    replacement: Token,
    inserted: Instruction,
}

impl CallSiteRewrite {
    /// Creates a call-site rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperandUnresolved`] if either token cannot name a method, and a
    /// rewrite error if both name the same method.
    pub fn new(original: Token, replacement: Token, inserted: Instruction) -> Result<Self> {
        for token in [original, replacement] {
            if !token.is_method() || token.is_null() {
                return Err(Error::OperandUnresolved(token));
            }
        }
        if original == replacement {
            return Err(rewrite_error!(
                "call-site rule maps {} onto itself",
                original
            ));
        }

        Ok(CallSiteRewrite {
            original,
            replacement,
            inserted,
        })
    }

    /// The rule that makes `String.StartsWith(string)` call-sites use ordinal comparison.
    ///
    /// Both overloads are resolved through `host`; `ordinal` is the host's value for the
    /// ordinal comparison mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotFound`] if the host lacks either overload.
    pub fn ordinal_starts_with<H>(host: &H, ordinal: i32) -> Result<Self>
    where
        H: HostIntrospection + ?Sized,
    {
        let original = host
            .resolve(&STARTS_WITH)
            .ok_or(Error::TargetNotFound(STARTS_WITH))?;
        let replacement = host
            .resolve(&STARTS_WITH_COMPARISON)
            .ok_or(Error::TargetNotFound(STARTS_WITH_COMPARISON))?;

        Self::new(
            original.token(),
            replacement.token(),
            Instruction::ldc_i4(ordinal),
        )
    }

    /// Token of the call being replaced.
    #[must_use]
    pub fn original(&self) -> Token {
        self.original
    }

    /// Token of the overload called instead.
    #[must_use]
    pub fn replacement(&self) -> Token {
        self.replacement
    }
}

impl PeepholeRule for CallSiteRewrite {
    fn name(&self) -> &'static str {
        "call_site_rewrite"
    }

    fn matches(&self, instruction: &Instruction) -> Result<bool> {
        // A callvirt without a token operand is simply not a site
        Ok(instruction.is_virtual_call() && instruction.call_target() == Some(self.original))
    }

    fn expand(&self, _instruction: &Instruction, out: &mut InstructionSequence) -> Result<()> {
        out.push(self.inserted.clone());
        out.push(Instruction::callvirt(self.replacement));
        Ok(())
    }

    fn growth(&self, input: &InstructionSequence) -> usize {
        input
            .iter()
            .filter(|instruction| self.matches(instruction).unwrap_or(false))
            .count()
    }
}
