//! The resumable package-initializer shell.
//!
//! Package initializers may call blocking functions, so each one is
//! emitted as a step machine rather than straight-line code. The shell
//! keeps its state in three locals:
//!
//! - the frame: the invocation record to resume from, if any
//! - the step index: which `case` of the dispatch switch runs next
//! - the saved result: the value a resumed step receives
//!
//! On entry a frame passed as `this` is unpacked into the locals. When a
//! step suspends, control falls out of the dispatch loop and the locals are
//! packed back into a frame that the scheduler resumes later. Caller init
//! fragments are spliced between [`InitShell::open`] and
//! [`InitShell::close`] and advance the step index themselves.

/// Names of the locals a package-initializer shell keeps its state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitShell {
    pub frame: &'static str,
    pub step: &'static str,
    pub result: &'static str,
}

impl Default for InitShell {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl InitShell {
    /// The names generated code and the runtime agree on.
    pub const STANDARD: Self = Self {
        frame: "$f",
        step: "$s",
        result: "$r",
    };

    /// Open the initializer and its dispatch loop, ready for step 0.
    #[must_use]
    pub fn open(&self) -> String {
        let Self {
            frame: f,
            step: s,
            result: r,
        } = self;
        format!(
            "\t$init = function() {{\n\
             \t\t$pkg.$init = function() {{}};\n\
             \t\tvar {f}, $c = false, {s} = 0, {r}; \
             if (this !== undefined && this.$blk !== undefined) {{ {f} = this; $c = true; {s} = {f}.$s; {r} = {f}.$r; }} \
             s: while (true) {{ switch ({s}) {{ case 0:\n"
        )
    }

    /// Close the dispatch loop, saving state into a frame on suspension.
    #[must_use]
    pub fn close(&self) -> String {
        let Self {
            frame: f,
            step: s,
            result: r,
        } = self;
        format!(
            "\t\t}} return; }} \
             if ({f} === undefined) {{ {f} = {{ $blk: $init }}; }} \
             {f}.$s = {s}; {f}.$r = {r}; return {f};\n\
             \t}};\n"
        )
    }
}

#[cfg(test)]
mod tests;
